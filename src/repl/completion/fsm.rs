//! Effective navigation state for multi-word input
//!
//! Words already typed on the line act like navigation: at the root a domain
//! name enters that domain, inside a domain an action enters that action. The
//! walk runs on a copy of the session's context and never touches the session
//! itself. Flags are skipped, together with the value of a value-taking flag.
//!
//! The walk also notes the first word naming a resource type of the reached
//! domain, which is what `--name` values are looked up for, and the plain
//! word after it, the instance name.

use std::collections::HashSet;

use crate::registry::{CommandTree, ResourceRegistry};
use crate::repl::navigation::{NavigationCommand, NavigationContext};

/// Lookup rules the walk consults
pub struct WalkRules<'a> {
    /// Maps a domain name or alias to its canonical name
    pub resolve_domain: &'a dyn Fn(&str) -> Option<String>,
    pub commands: &'a CommandTree,
    pub resources: &'a ResourceRegistry,
    /// Typed forms of value-taking flags
    pub value_flags: &'a HashSet<String>,
}

/// State of the walk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextWalk {
    /// Effective navigation context
    pub context: NavigationContext,
    /// Resource type named on the line, canonical API name
    pub resource_type: Option<String>,
    /// Instance name typed after the resource type
    pub instance: Option<String>,
    /// The next word is the value of the previous flag
    skip_value: bool,
}

impl ContextWalk {
    /// Walk the words from a starting context
    pub fn run(start: NavigationContext, words: &[String], rules: &WalkRules<'_>) -> Self {
        words.iter().fold(
            Self {
                context: start,
                ..Self::default()
            },
            |walk, word| walk.next(word, rules),
        )
    }

    /// Advance by one word
    pub fn next(mut self, word: &str, rules: &WalkRules<'_>) -> Self {
        if self.skip_value {
            self.skip_value = false;
            return self;
        }

        if word.starts_with('-') {
            self.skip_value = !word.contains('=') && rules.value_flags.contains(word);
            return self;
        }

        let command = NavigationCommand::interpret(
            word,
            &self.context,
            rules.resolve_domain,
            |w| rules.commands.is_action(w),
        );
        match command {
            Some(cmd @ (NavigationCommand::EnterDomain(_) | NavigationCommand::EnterAction(_))) => {
                cmd.apply(&mut self.context);
            }
            _ if self.resource_type.is_none() => {
                self.resource_type = self
                    .context
                    .domain()
                    .and_then(|domain| rules.resources.find_in_domain(domain, word))
                    .map(|rt| rt.name.clone());
            }
            _ => {
                if self.instance.is_none() {
                    self.instance = Some(word.to_string());
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DomainRegistry;

    fn walk(start: NavigationContext, words: &[&str]) -> ContextWalk {
        let resolve = |w: &str| DomainRegistry::builtin().resolve(w).map(str::to_string);
        let commands = CommandTree::builtin();
        let value_flags = commands.value_flags();
        let rules = WalkRules {
            resolve_domain: &resolve,
            commands,
            resources: ResourceRegistry::builtin(),
            value_flags: &value_flags,
        };
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        ContextWalk::run(start, &words, &rules)
    }

    #[test]
    fn test_no_words_keeps_start() {
        let mut start = NavigationContext::new();
        start.set_domain("dns");
        assert_eq!(walk(start.clone(), &[]).context, start);
    }

    #[test]
    fn test_domain_then_action() {
        let result = walk(NavigationContext::new(), &["lb", "get"]);
        assert_eq!(result.context.domain(), Some("load_balancer"));
        assert_eq!(result.context.action(), Some("get"));
    }

    #[test]
    fn test_flag_values_are_skipped() {
        let result = walk(NavigationContext::new(), &["-n", "dns", "security"]);
        assert_eq!(result.context.domain(), Some("security"));

        let result = walk(NavigationContext::new(), &["--namespace=x", "dns"]);
        assert_eq!(result.context.domain(), Some("dns"));
    }

    #[test]
    fn test_domain_word_inside_domain_is_not_navigation() {
        let mut start = NavigationContext::new();
        start.set_domain("dns");
        let result = walk(start, &["security"]);
        assert_eq!(result.context.domain(), Some("dns"));
        assert!(result.context.is_domain());
    }

    #[test]
    fn test_resource_type_recorded() {
        let result = walk(NavigationContext::new(), &["lb", "get", "origin-pool", "--name"]);
        assert_eq!(result.resource_type.as_deref(), Some("origin_pool"));

        let result = walk(NavigationContext::new(), &["dns", "get", "origin-pool"]);
        assert_eq!(result.resource_type, None);
    }

    #[test]
    fn test_instance_follows_resource_type() {
        let result = walk(NavigationContext::new(), &["lb", "get", "origin-pool"]);
        assert_eq!(result.instance, None);

        let result = walk(
            NavigationContext::new(),
            &["lb", "get", "origin-pool", "-n", "shop", "pool-a"],
        );
        assert_eq!(result.resource_type.as_deref(), Some("origin_pool"));
        assert_eq!(result.instance.as_deref(), Some("pool-a"));
    }
}

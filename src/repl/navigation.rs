//! Navigation context state machine
//!
//! The shell tracks where the user is: at the root, inside a domain, or inside
//! a domain and an action. States and transitions:
//!
//! ```text
//!            set_domain                 set_action
//!   Root  ─────────────▶  Domain  ─────────────────▶  Action
//!    ▲                     │  ▲                         │
//!    └──── navigate_up ────┘  └────── navigate_up ──────┘
//! ```
//!
//! `set_domain` is valid from any state and clears the action; `reset`
//! returns to `Root` from anywhere. An action can only be set while inside a
//! domain.

use std::fmt;

/// Where the session currently is in the root/domain/action hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationContext {
    domain: Option<String>,
    action: Option<String>,
}

/// State of a [`NavigationContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationState {
    Root,
    Domain,
    Action,
}

impl NavigationContext {
    /// A context at the root
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NavigationState {
        match (&self.domain, &self.action) {
            (None, _) => NavigationState::Root,
            (Some(_), None) => NavigationState::Domain,
            (Some(_), Some(_)) => NavigationState::Action,
        }
    }

    pub fn is_root(&self) -> bool {
        self.state() == NavigationState::Root
    }

    pub fn is_domain(&self) -> bool {
        self.state() == NavigationState::Domain
    }

    pub fn is_action(&self) -> bool {
        self.state() == NavigationState::Action
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Enter a domain from any state, clearing the action
    pub fn set_domain(&mut self, domain: impl Into<String>) {
        self.domain = Some(domain.into());
        self.action = None;
    }

    /// Enter an action
    ///
    /// # Returns
    /// * `bool` - false, leaving the state unchanged, unless currently in `Domain`
    pub fn set_action(&mut self, action: impl Into<String>) -> bool {
        if !self.is_domain() {
            return false;
        }
        self.action = Some(action.into());
        true
    }

    /// Move one level up
    ///
    /// # Returns
    /// * `bool` - Whether a transition occurred; false at the root
    pub fn navigate_up(&mut self) -> bool {
        if self.action.take().is_some() {
            return true;
        }
        self.domain.take().is_some()
    }

    /// Return to the root
    pub fn reset(&mut self) {
        self.domain = None;
        self.action = None;
    }
}

impl fmt::Display for NavigationContext {
    /// `domain/action`, `domain`, or empty at the root
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.domain, &self.action) {
            (Some(domain), Some(action)) => write!(f, "{domain}/{action}"),
            (Some(domain), None) => write!(f, "{domain}"),
            _ => Ok(()),
        }
    }
}

/// A navigation request recognised from a single input word
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationCommand {
    /// Leave the shell (`exit` at the root)
    Quit,
    /// Move one level up (`exit`, `back`, `..`)
    Up,
    /// Return to the root (`root`, `/`)
    Root,
    /// Enter a domain by canonical name
    EnterDomain(String),
    /// Enter an action of the current domain
    EnterAction(String),
}

impl NavigationCommand {
    /// Interpret a word as a navigation request
    ///
    /// # Arguments
    /// * `word` - The single word entered
    /// * `ctx` - Current navigation context
    /// * `resolve_domain` - Maps a domain name or alias to its canonical name
    /// * `is_action` - Whether a word is a valid action
    ///
    /// # Returns
    /// * `Option<NavigationCommand>` - None if the word is not a navigation request
    pub fn interpret(
        word: &str,
        ctx: &NavigationContext,
        resolve_domain: impl Fn(&str) -> Option<String>,
        is_action: impl Fn(&str) -> bool,
    ) -> Option<Self> {
        match word {
            "exit" if ctx.is_root() => Some(Self::Quit),
            "exit" | "back" | ".." => Some(Self::Up),
            "root" | "/" => Some(Self::Root),
            _ if ctx.is_root() => resolve_domain(word).map(Self::EnterDomain),
            _ if ctx.is_domain() && is_action(word) => Some(Self::EnterAction(word.to_string())),
            _ => None,
        }
    }

    /// Apply the request to the context
    ///
    /// # Returns
    /// * `bool` - Whether the context changed; always false for `Quit`
    pub fn apply(&self, ctx: &mut NavigationContext) -> bool {
        match self {
            Self::Quit => false,
            Self::Up => ctx.navigate_up(),
            Self::Root => {
                let changed = !ctx.is_root();
                ctx.reset();
                changed
            }
            Self::EnterDomain(domain) => {
                ctx.set_domain(domain.clone());
                true
            }
            Self::EnterAction(action) => ctx.set_action(action.clone()),
        }
    }
}

/// Build the full command path a line would run
///
/// A leading `/` escapes to the root and bypasses the context. Otherwise the
/// current domain and action are prepended unless the first word already
/// starts a full path. The session namespace is appended as `-n <ns>` when no
/// namespace flag is present.
pub fn resolve_command_path(
    args: &[String],
    ctx: &NavigationContext,
    namespace: &str,
    is_full_path: impl Fn(&str) -> bool,
) -> Vec<String> {
    let Some(first) = args.first() else {
        return Vec::new();
    };

    let mut path: Vec<String> = if let Some(stripped) = first.strip_prefix('/') {
        let mut rest = args.to_vec();
        if stripped.is_empty() {
            rest.remove(0);
        } else {
            rest[0] = stripped.to_string();
        }
        rest
    } else if ctx.is_root() || is_full_path(first) {
        args.to_vec()
    } else {
        ctx.domain()
            .into_iter()
            .chain(ctx.action())
            .map(str::to_string)
            .chain(args.iter().cloned())
            .collect()
    };

    let has_namespace = path.iter().any(|arg| {
        arg == "-n"
            || arg == "--namespace"
            || arg.starts_with("-n=")
            || arg.starts_with("--namespace=")
    });
    if !has_namespace && !path.is_empty() && !namespace.is_empty() {
        path.push("-n".to_string());
        path.push(namespace.to_string());
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(word: &str) -> Option<String> {
        match word {
            "dns" => Some("dns".to_string()),
            "lb" | "load_balancer" => Some("load_balancer".to_string()),
            _ => None,
        }
    }

    fn is_action(word: &str) -> bool {
        matches!(word, "list" | "get")
    }

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_navigate_up_sequence() {
        let mut ctx = NavigationContext::new();
        ctx.reset();
        ctx.set_domain("dns");
        assert!(ctx.set_action("list"));
        assert!(ctx.is_action());

        assert!(ctx.navigate_up());
        assert_eq!(ctx.state(), NavigationState::Domain);
        assert_eq!(ctx.domain(), Some("dns"));

        assert!(ctx.navigate_up());
        assert!(ctx.is_root());

        let before = ctx.clone();
        assert!(!ctx.navigate_up());
        assert_eq!(ctx, before);
    }

    #[test]
    fn test_set_action_requires_domain() {
        let mut ctx = NavigationContext::new();
        assert!(!ctx.set_action("list"));
        assert!(ctx.is_root());
        assert_eq!(ctx.action(), None);
    }

    #[test]
    fn test_set_domain_clears_action() {
        let mut ctx = NavigationContext::new();
        ctx.set_domain("dns");
        ctx.set_action("get");
        ctx.set_domain("load_balancer");
        assert!(ctx.is_domain());
        assert_eq!(ctx.action(), None);
    }

    #[test]
    fn test_display() {
        let mut ctx = NavigationContext::new();
        assert_eq!(ctx.to_string(), "");
        ctx.set_domain("dns");
        assert_eq!(ctx.to_string(), "dns");
        ctx.set_action("list");
        assert_eq!(ctx.to_string(), "dns/list");
    }

    #[test]
    fn test_interpret_exit_depends_on_state() {
        let mut ctx = NavigationContext::new();
        assert_eq!(
            NavigationCommand::interpret("exit", &ctx, resolve, is_action),
            Some(NavigationCommand::Quit)
        );
        ctx.set_domain("dns");
        assert_eq!(
            NavigationCommand::interpret("exit", &ctx, resolve, is_action),
            Some(NavigationCommand::Up)
        );
    }

    #[test]
    fn test_interpret_domain_alias_only_at_root() {
        let mut ctx = NavigationContext::new();
        assert_eq!(
            NavigationCommand::interpret("lb", &ctx, resolve, is_action),
            Some(NavigationCommand::EnterDomain("load_balancer".to_string()))
        );
        ctx.set_domain("dns");
        assert_eq!(NavigationCommand::interpret("lb", &ctx, resolve, is_action), None);
        assert_eq!(
            NavigationCommand::interpret("list", &ctx, resolve, is_action),
            Some(NavigationCommand::EnterAction("list".to_string()))
        );
        assert_eq!(NavigationCommand::interpret("bogus", &ctx, resolve, is_action), None);
    }

    #[test]
    fn test_apply_back_at_root_is_noop() {
        let mut ctx = NavigationContext::new();
        assert!(!NavigationCommand::Up.apply(&mut ctx));
        assert!(!NavigationCommand::Root.apply(&mut ctx));
        assert!(ctx.is_root());
    }

    #[test]
    fn test_command_path_prepends_context_and_namespace() {
        let mut ctx = NavigationContext::new();
        ctx.set_domain("dns");
        ctx.set_action("get");

        let path = resolve_command_path(&strings(&["--name", "z1"]), &ctx, "shop", |_| false);
        assert_eq!(path, strings(&["dns", "get", "--name", "z1", "-n", "shop"]));
    }

    #[test]
    fn test_command_path_escape_bypasses_context() {
        let mut ctx = NavigationContext::new();
        ctx.set_domain("dns");

        let path = resolve_command_path(&strings(&["/lb", "list", "-n", "x"]), &ctx, "shop", |_| false);
        assert_eq!(path, strings(&["lb", "list", "-n", "x"]));

        let path = resolve_command_path(&strings(&["/", "help"]), &ctx, "", |_| false);
        assert_eq!(path, strings(&["help"]));
    }

    #[test]
    fn test_command_path_keeps_full_path() {
        let mut ctx = NavigationContext::new();
        ctx.set_domain("dns");
        let path = resolve_command_path(
            &strings(&["security", "list", "--namespace=a"]),
            &ctx,
            "shop",
            |w| w == "security",
        );
        assert_eq!(path, strings(&["security", "list", "--namespace=a"]));
    }
}

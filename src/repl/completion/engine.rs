//! Completion engine - orchestrates the completion flow
//!
//! Raw input is tokenized, the words already typed are walked to find the
//! effective navigation state, a [`CompletionContext`] is chosen, and the
//! candidates for that context are fetched, prefix filtered and de-duplicated.
//!
//! Completion is total: every failure degrades to fewer suggestions.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::context::{CompletionContext, Suggestion, SuggestionCategory};
use super::fsm::{ContextWalk, WalkRules};
use super::input::{ParsedInput, Tokenizer};
use super::provider::CandidateProvider;
use crate::registry::{CommandNode, CommandTree, DomainRegistry, FlagSpec, ResourceRegistry};
use crate::repl::navigation::NavigationContext;
use crate::repl::shared_state::SessionState;

const BUILTINS: &[(&str, &str)] = &[
    ("quit", "Exit the shell"),
    ("help", "Show help information"),
    ("clear", "Clear the screen"),
    ("history", "Show command history"),
    ("namespace", "Set default namespace"),
    ("ns", "Set default namespace (alias)"),
    ("context", "Show current context"),
    ("ctx", "Show current context (alias)"),
];

const OUTPUT_FORMATS: &[(&str, &str)] = &[
    ("json", "JSON output"),
    ("yaml", "YAML output"),
    ("table", "Table output"),
];

const LIMIT_VALUES: &[&str] = &["10", "25", "50", "100"];

const LABEL_KEYS: &[&str] = &["environment", "application", "owner", "cost-center", "tier", "version"];

/// The read-only collaborators the engine consults
#[derive(Debug, Clone, Copy)]
pub struct Registries {
    pub domains: &'static DomainRegistry,
    pub resources: &'static ResourceRegistry,
    pub commands: &'static CommandTree,
}

impl Registries {
    /// The built-in tables
    pub fn builtin() -> Self {
        Self {
            domains: DomainRegistry::builtin(),
            resources: ResourceRegistry::builtin(),
            commands: CommandTree::builtin(),
        }
    }
}

/// Main completion engine
pub struct CompletionEngine {
    /// Candidate provider for dynamic values
    provider: Arc<dyn CandidateProvider>,
    registries: Registries,
    /// Session whose navigation context and namespace are consulted
    session: SessionState,
    tokenizer: Tokenizer,
    value_flags: HashSet<String>,
    /// Dynamically registered domains with their own command trees
    custom_domains: RwLock<Vec<CommandNode>>,
}

impl CompletionEngine {
    /// Create a new completion engine over the built-in tables
    ///
    /// # Arguments
    /// * `provider` - Candidate provider for dynamic values
    /// * `session` - Session state to read navigation and namespace from
    pub fn new(provider: Arc<dyn CandidateProvider>, session: SessionState) -> Self {
        Self::with_registries(provider, session, Registries::builtin())
    }

    /// Create a new completion engine over explicit tables
    pub fn with_registries(
        provider: Arc<dyn CandidateProvider>,
        session: SessionState,
        registries: Registries,
    ) -> Self {
        let value_flags = registries.commands.value_flags();
        Self {
            provider,
            registries,
            session,
            tokenizer: Tokenizer::new(value_flags.clone()),
            value_flags,
            custom_domains: RwLock::new(Vec::new()),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn registries(&self) -> Registries {
        self.registries
    }

    /// Register a custom domain, replacing one of the same name
    pub fn register_custom_domain(&self, node: CommandNode) {
        let mut domains = self
            .custom_domains
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        domains.retain(|d| d.name() != node.name());
        debug!("Registered custom domain '{}'", node.name());
        domains.push(node);
    }

    fn custom_domain(&self, name: &str) -> Option<CommandNode> {
        self.custom_domains
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|d| d.name() == name)
            .cloned()
    }

    pub fn is_custom_domain(&self, name: &str) -> bool {
        self.custom_domains
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|d| d.name() == name)
    }

    /// Resolve a word to a domain: custom domains by exact name, then the
    /// static table by name or alias
    pub fn resolve_domain(&self, word: &str) -> Option<String> {
        if self.is_custom_domain(word) {
            return Some(word.to_string());
        }
        self.registries.domains.resolve(word).map(str::to_string)
    }

    pub fn is_action(&self, word: &str) -> bool {
        self.registries.commands.is_action(word)
    }

    /// Tokenize a raw line
    pub fn parse(&self, line: &str) -> ParsedInput {
        self.tokenizer.tokenize(line)
    }

    /// Complete a raw input line
    ///
    /// # Arguments
    /// * `line` - Text before the cursor
    ///
    /// # Returns
    /// * `Vec<Suggestion>` - Ordered, de-duplicated suggestions
    pub async fn complete(&self, line: &str) -> Vec<Suggestion> {
        let parsed = self.parse(line);
        self.complete_parsed(&parsed).await
    }

    /// Complete already tokenized input
    pub async fn complete_parsed(&self, parsed: &ParsedInput) -> Vec<Suggestion> {
        let navigation = self.session.navigation();
        let context = self.context_for(parsed, &navigation);
        debug!("Completion context: {:?}", context);

        let candidates = self.candidates(&context, parsed).await;
        finish(candidates, &parsed.current_word)
    }

    /// Pick the completion context; the first matching branch wins
    pub fn context_for(&self, parsed: &ParsedInput, navigation: &NavigationContext) -> CompletionContext {
        if parsed.is_empty() {
            return CompletionContext::Navigation {
                state: navigation.clone(),
            };
        }

        let completed = parsed.completed();
        if parsed.is_escaped_to_root && completed.is_empty() {
            return CompletionContext::Navigation {
                state: NavigationContext::new(),
            };
        }

        if let Some(first) = completed.first().filter(|w| self.is_custom_domain(w)) {
            return CompletionContext::CustomDomain {
                domain: first.clone(),
                path: completed[1..].to_vec(),
            };
        }
        if !parsed.is_escaped_to_root {
            if let Some(domain) = navigation.domain().filter(|d| self.is_custom_domain(d)) {
                return CompletionContext::CustomDomain {
                    domain: domain.to_string(),
                    path: completed.to_vec(),
                };
            }
        }

        let start = if parsed.is_escaped_to_root {
            NavigationContext::new()
        } else {
            navigation.clone()
        };
        let walk = self.walk(start, completed);

        if parsed.is_completing_flag_value {
            let commands = self.registries.commands;
            let flag = parsed
                .current_flag
                .as_deref()
                .map(|typed| {
                    commands
                        .find_flag(walk.context.action(), typed)
                        .or_else(|| commands.find_flag_any(typed))
                        .map_or_else(|| typed.trim_start_matches('-').to_string(), |f| f.name.clone())
                })
                .unwrap_or_default();
            return CompletionContext::FlagValue {
                flag,
                state: walk.context,
                resource_type: walk.resource_type,
            };
        }

        if parsed.is_completing_flag {
            return CompletionContext::Flags {
                state: walk.context,
            };
        }

        let in_action = walk.context.action().is_some();
        match (walk.resource_type, walk.instance) {
            (Some(resource_type), None) if in_action => CompletionContext::ResourceName {
                state: walk.context,
                resource_type,
            },
            (Some(_), Some(_)) if in_action => CompletionContext::Flags {
                state: walk.context,
            },
            _ => CompletionContext::Navigation {
                state: walk.context,
            },
        }
    }

    fn walk(&self, start: NavigationContext, words: &[String]) -> ContextWalk {
        let resolve = |word: &str| self.resolve_domain(word);
        let rules = WalkRules {
            resolve_domain: &resolve,
            commands: self.registries.commands,
            resources: self.registries.resources,
            value_flags: &self.value_flags,
        };
        ContextWalk::run(start, words, &rules)
    }

    /// Fetch candidates for a context
    async fn candidates(&self, context: &CompletionContext, parsed: &ParsedInput) -> Vec<Suggestion> {
        match context {
            CompletionContext::Navigation { state } => {
                match state.domain().and_then(|d| self.custom_domain(d)) {
                    Some(node) => custom_suggestions(&node, &[], parsed),
                    None => self.base_suggestions(state),
                }
            }
            CompletionContext::CustomDomain { domain, path } => match self.custom_domain(domain) {
                Some(node) => custom_suggestions(&node, path, parsed),
                None => Vec::new(),
            },
            CompletionContext::FlagValue {
                flag,
                state,
                resource_type,
            } => {
                self.flag_values(flag, state, resource_type.as_deref(), parsed)
                    .await
            }
            CompletionContext::ResourceName {
                state,
                resource_type,
            } => self.resource_names(state, Some(resource_type.as_str()), parsed).await,
            CompletionContext::Flags { state } => self.flag_suggestions(state),
        }
    }

    fn base_suggestions(&self, state: &NavigationContext) -> Vec<Suggestion> {
        use SuggestionCategory::{Action, Builtin, Navigation};

        if state.is_root() {
            let mut suggestions = self.domain_suggestions();
            suggestions.extend(
                BUILTINS
                    .iter()
                    .map(|(text, desc)| Suggestion::new(*text, *desc, Builtin)),
            );
            return suggestions;
        }

        if state.is_domain() {
            let mut suggestions: Vec<Suggestion> = self
                .registries
                .commands
                .actions()
                .iter()
                .map(|a| Suggestion::new(&a.name, &a.description, Action))
                .collect();
            for text in ["exit", "back", ".."] {
                suggestions.push(Suggestion::new(text, "Go up to root context", Navigation));
            }
            suggestions.push(Suggestion::new("help", "Show context help", Builtin));
            return suggestions;
        }

        let mut suggestions = self.resource_type_suggestions(state);
        suggestions.extend(self.flag_suggestions(state));
        for text in ["exit", "back", ".."] {
            suggestions.push(Suggestion::new(text, "Go up to domain context", Navigation));
        }
        for text in ["root", "/"] {
            suggestions.push(Suggestion::new(text, "Go to root context", Navigation));
        }
        suggestions.push(Suggestion::new("help", "Show context help", Builtin));
        suggestions
    }

    /// Custom domains first, then static domains with their aliases. A static
    /// domain shadowed by a custom one is dropped together with its aliases.
    fn domain_suggestions(&self) -> Vec<Suggestion> {
        let custom = self
            .custom_domains
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut suggestions: Vec<Suggestion> = custom
            .iter()
            .map(|node| Suggestion::new(node.name(), node.description(), SuggestionCategory::Domain))
            .collect();

        for info in self.registries.domains.all() {
            if custom.iter().any(|node| node.name() == info.name) {
                continue;
            }
            suggestions.push(Suggestion::new(
                &info.name,
                &info.description,
                SuggestionCategory::Domain,
            ));
            suggestions.extend(info.aliases.iter().map(|alias| {
                Suggestion::new(
                    alias,
                    format!("{} (alias)", info.display_name),
                    SuggestionCategory::Domain,
                )
            }));
        }
        suggestions
    }

    /// Resource types of the domain that support the current action
    fn resource_type_suggestions(&self, state: &NavigationContext) -> Vec<Suggestion> {
        let (Some(domain), Some(action)) = (state.domain(), state.action()) else {
            return Vec::new();
        };
        self.registries
            .resources
            .by_domain(domain)
            .into_iter()
            .filter(|rt| rt.operations.allows(action))
            .map(|rt| Suggestion::new(&rt.cli_name, &rt.description, SuggestionCategory::Subcommand))
            .collect()
    }

    /// Action flags first, then base flags marked global
    fn flag_suggestions(&self, state: &NavigationContext) -> Vec<Suggestion> {
        let commands = self.registries.commands;
        let local: &[FlagSpec] = state
            .action()
            .and_then(|a| commands.action(a))
            .map(|a| a.flags.as_slice())
            .unwrap_or(&[]);

        let mut suggestions = flag_forms(local, "");
        suggestions.extend(flag_forms(commands.base_flags(), " (global)"));
        suggestions
    }

    async fn flag_values(
        &self,
        flag: &str,
        state: &NavigationContext,
        resource_type: Option<&str>,
        parsed: &ParsedInput,
    ) -> Vec<Suggestion> {
        use SuggestionCategory::FlagValue;

        match flag {
            "output-format" => OUTPUT_FORMATS
                .iter()
                .map(|(text, desc)| Suggestion::new(*text, *desc, FlagValue))
                .collect(),
            "namespace" => self
                .provider
                .namespaces()
                .await
                .into_iter()
                .map(|ns| Suggestion::new(ns, "Namespace", FlagValue))
                .collect(),
            "name" => self.resource_names(state, resource_type, parsed).await,
            "limit" => LIMIT_VALUES
                .iter()
                .map(|v| Suggestion::new(*v, "Maximum number of items", FlagValue))
                .collect(),
            "label" => LABEL_KEYS
                .iter()
                .map(|k| Suggestion::new(*k, "Label key", FlagValue))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Instance names of a resource type in the namespace named on the line,
    /// else the session namespace
    async fn resource_names(
        &self,
        state: &NavigationContext,
        resource_type: Option<&str>,
        parsed: &ParsedInput,
    ) -> Vec<Suggestion> {
        let Some(domain) = state.domain() else {
            return Vec::new();
        };
        let Some(rt) = resource_type.and_then(|name| self.registries.resources.get(name)) else {
            return Vec::new();
        };
        let namespace = parsed
            .flag_value(&["--namespace", "-n"])
            .map(str::to_string)
            .unwrap_or_else(|| self.session.namespace());

        self.provider
            .resource_names(&namespace, domain, rt)
            .await
            .into_iter()
            .map(|name| Suggestion::new(name, &rt.description, SuggestionCategory::ResourceName))
            .collect()
    }

    /// Start background resource-name fetches for a domain in the session
    /// namespace
    pub fn prefetch_domain(&self, domain: &str) {
        self.provider.prefetch_domain(&self.session.namespace(), domain);
    }

    /// Drop every cached lookup, e.g. after switching profiles
    pub fn clear_all(&self) {
        self.provider.clear_all();
    }

    pub fn clear_namespace_cache(&self, namespace: &str) {
        self.provider.clear_namespace_cache(namespace);
    }

    pub fn clear_resource_cache(&self, key: Option<&str>) {
        self.provider.clear_resource_cache(key);
    }
}

/// Long and short forms of every visible flag
fn flag_forms(flags: &[FlagSpec], suffix: &str) -> Vec<Suggestion> {
    flags
        .iter()
        .filter(|f| !f.hidden)
        .flat_map(|f| {
            let description = format!("{}{}", f.description, suffix);
            std::iter::once(f.long_form())
                .chain(f.short_form())
                .map(move |text| Suggestion::new(text, description.clone(), SuggestionCategory::Flag))
        })
        .collect()
}

/// Walk a custom domain tree along the completed words
fn custom_suggestions(node: &CommandNode, path: &[String], parsed: &ParsedInput) -> Vec<Suggestion> {
    if let CommandNode::Group { children, .. } = node {
        return match path.split_first() {
            None => children
                .iter()
                .map(|child| {
                    let category = if child.is_group() {
                        SuggestionCategory::Subcommand
                    } else {
                        SuggestionCategory::Command
                    };
                    Suggestion::new(child.name(), child.description(), category)
                })
                .collect(),
            Some((head, rest)) => node
                .child(head)
                .map(|child| custom_suggestions(child, rest, parsed))
                .unwrap_or_default(),
        };
    }

    if parsed.is_completing_flag {
        return flag_forms(node.flags(), "");
    }

    match node {
        CommandNode::Dynamic { completer, .. } => completer
            .complete(path, &parsed.current_word)
            .into_iter()
            .map(|value| Suggestion::new(value, "", SuggestionCategory::ResourceName))
            .collect(),
        _ => Vec::new(),
    }
}

/// Prefix filter, then drop repeated texts keeping the first
fn finish(candidates: Vec<Suggestion>, prefix: &str) -> Vec<Suggestion> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|s| s.matches_prefix(prefix))
        .filter(|s| seen.insert(s.text.clone()))
        .collect()
}

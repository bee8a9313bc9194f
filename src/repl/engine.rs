use std::sync::Arc;

use reedline::{
    ColumnarMenu, Emacs, FileBackedHistory, KeyCode, KeyModifiers, MenuBuilder, Reedline,
    ReedlineEvent, ReedlineMenu, Signal, default_emacs_keybindings,
};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, ShellError};

use super::completer::XcshCompleter;
use super::completion::CompletionEngine;
use super::navigation::{NavigationCommand, NavigationContext, resolve_command_path};
use super::prompt::XcshPrompt;

const COMPLETION_MENU: &str = "completion_menu";

/// What the read loop should do after a line has been dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Nothing to print; the prompt reflects any change
    Nothing,
    /// Leave the shell
    Quit,
    /// Clear the terminal
    ClearScreen,
    /// Print the command history
    ShowHistory,
    /// Print a message
    Output(String),
    /// A domain command resolved to its full path
    Command(Vec<String>),
}

/// Interprets complete input lines against the session
///
/// Holds no editor state, so every rule the read loop applies can be driven
/// directly.
pub struct LineDispatcher {
    engine: Arc<CompletionEngine>,
    prefetch_on_enter: bool,
}

impl LineDispatcher {
    /// Create a new dispatcher
    ///
    /// # Arguments
    /// * `engine` - Completion engine sharing the session state
    /// * `prefetch_on_enter` - Warm resource name caches when entering a domain
    pub fn new(engine: Arc<CompletionEngine>, prefetch_on_enter: bool) -> Self {
        Self {
            engine,
            prefetch_on_enter,
        }
    }

    /// Dispatch one input line
    ///
    /// # Arguments
    /// * `line` - Raw input line
    ///
    /// # Returns
    /// * `LineOutcome` - What the read loop should do next
    pub fn dispatch(&self, line: &str) -> LineOutcome {
        let parsed = self.engine.parse(line.trim());
        let session = self.engine.session();

        if parsed.tokens.is_empty() {
            if parsed.is_escaped_to_root {
                return self.navigate(NavigationCommand::Root);
            }
            return LineOutcome::Nothing;
        }

        if !parsed.is_escaped_to_root {
            if let Some(outcome) = self.builtin(&parsed.tokens) {
                return outcome;
            }
        }

        let navigation = if parsed.is_escaped_to_root {
            NavigationContext::new()
        } else {
            session.navigation()
        };

        if let [word] = parsed.tokens.as_slice() {
            let command = NavigationCommand::interpret(
                word,
                &navigation,
                |w| self.engine.resolve_domain(w),
                |w| self.engine.is_action(w),
            );
            if let Some(command) = command {
                if parsed.is_escaped_to_root {
                    session.update_navigation(NavigationContext::reset);
                }
                return self.navigate(command);
            }
        }

        let path = resolve_command_path(&parsed.tokens, &navigation, &session.namespace(), |w| {
            self.engine.resolve_domain(w).is_some()
        });
        debug!("Resolved command path: {:?}", path);
        LineOutcome::Command(path)
    }

    fn navigate(&self, command: NavigationCommand) -> LineOutcome {
        if command == NavigationCommand::Quit {
            return LineOutcome::Quit;
        }

        let changed = self
            .engine
            .session()
            .update_navigation(|ctx| command.apply(ctx));

        match command {
            NavigationCommand::Up if !changed => {
                LineOutcome::Output("Already at root context".to_string())
            }
            NavigationCommand::EnterDomain(domain) => {
                info!("Entered domain '{}'", domain);
                if self.prefetch_on_enter && !self.engine.is_custom_domain(&domain) {
                    self.engine.prefetch_domain(&domain);
                }
                LineOutcome::Nothing
            }
            _ => LineOutcome::Nothing,
        }
    }

    fn builtin(&self, tokens: &[String]) -> Option<LineOutcome> {
        let session = self.engine.session();
        let outcome = match tokens[0].as_str() {
            "quit" => LineOutcome::Quit,
            "clear" => LineOutcome::ClearScreen,
            "history" => LineOutcome::ShowHistory,
            "help" => LineOutcome::Output(self.help_text()),
            "context" | "ctx" => {
                let navigation = session.navigation();
                let location = if navigation.is_root() {
                    "root".to_string()
                } else {
                    navigation.to_string()
                };
                LineOutcome::Output(format!(
                    "Context: {}\nNamespace: {}",
                    location,
                    session.namespace()
                ))
            }
            "namespace" | "ns" => match tokens.get(1) {
                Some(namespace) => {
                    session.set_namespace(namespace.clone());
                    info!("Default namespace set to '{}'", namespace);
                    LineOutcome::Output(format!("Namespace set to {namespace}"))
                }
                None => LineOutcome::Output(format!("Namespace: {}", session.namespace())),
            },
            _ => return None,
        };
        Some(outcome)
    }

    fn help_text(&self) -> String {
        let registries = self.engine.registries();
        let navigation = self.engine.session().navigation();
        let mut lines = vec![
            "Navigation:".to_string(),
            "  <domain>        enter a domain".to_string(),
            "  <action>        enter an action inside a domain".to_string(),
            "  exit, back, ..  go up one level".to_string(),
            "  root, /         return to the root".to_string(),
            "  /<command>      run a command from the root".to_string(),
            String::new(),
            "Commands: quit, help, clear, history, namespace [ns], context".to_string(),
        ];

        if navigation.is_root() {
            lines.push(String::new());
            lines.push("Domains:".to_string());
            for domain in registries.domains.all() {
                lines.push(format!("  {:<24}{}", domain.name, domain.description));
            }
        } else {
            lines.push(String::new());
            lines.push("Actions:".to_string());
            for action in registries.commands.actions() {
                lines.push(format!("  {:<24}{}", action.name, action.description));
            }
        }
        lines.join("\n")
    }
}

/// REPL engine for interactive navigation
pub struct ReplEngine {
    /// Line editor for command input
    editor: Reedline,

    dispatcher: LineDispatcher,

    engine: Arc<CompletionEngine>,

    /// Whether to continue running
    running: bool,
}

impl ReplEngine {
    /// Create a new REPL engine
    ///
    /// # Arguments
    /// * `engine` - Completion engine sharing the session state
    /// * `config` - Loaded configuration
    ///
    /// # Returns
    /// * `Result<Self>` - New REPL engine or error
    pub fn new(engine: Arc<CompletionEngine>, config: &Config) -> Result<Self> {
        let history = FileBackedHistory::new(config.history.max_size)
            .map_err(|e| ShellError::Readline(e.to_string()))?;

        let completer = XcshCompleter::new(Arc::clone(&engine), config.fetch_budget());
        let menu = ColumnarMenu::default().with_name(COMPLETION_MENU);

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let editor = Reedline::create()
            .with_history(Box::new(history))
            .with_completer(Box::new(completer))
            .with_menu(ReedlineMenu::EngineCompleter(Box::new(menu)))
            .with_edit_mode(Box::new(Emacs::new(keybindings)));

        Ok(Self {
            editor,
            dispatcher: LineDispatcher::new(
                Arc::clone(&engine),
                config.completion.prefetch_on_enter,
            ),
            engine,
            running: true,
        })
    }

    /// Read a single line of input
    ///
    /// # Returns
    /// * `Result<Option<String>>` - Input line, empty on Ctrl-C, None on Ctrl-D
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let session = self.engine.session();
        let prompt = XcshPrompt::new(
            session.navigation(),
            session.namespace(),
            session.color_enabled(),
        );

        match self.editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => Ok(Some(line)),
            Ok(Signal::CtrlC) => Ok(Some(String::new())),
            Ok(Signal::CtrlD) => Ok(None),
            Err(err) => Err(ShellError::Readline(err.to_string())),
        }
    }

    /// Dispatch a line and perform the editor side effects it asks for
    ///
    /// # Returns
    /// * `Result<LineOutcome>` - The outcome, for the caller to print
    pub fn process_input(&mut self, line: &str) -> Result<LineOutcome> {
        let outcome = self.dispatcher.dispatch(line);
        match outcome {
            LineOutcome::Quit => self.running = false,
            LineOutcome::ClearScreen => self.editor.clear_screen()?,
            LineOutcome::ShowHistory => self.editor.print_history()?,
            _ => {}
        }
        Ok(outcome)
    }

    /// Check if REPL is still running
    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::client::FixtureClient;
    use crate::registry::{CommandNode, ResourceRegistry};
    use crate::repl::SessionState;
    use crate::repl::completion::ApiCandidateProvider;

    fn create_dispatcher() -> (LineDispatcher, SessionState) {
        let session = SessionState::new("default");
        let provider = Arc::new(ApiCandidateProvider::new(
            Arc::new(FixtureClient::unauthenticated()),
            ResourceRegistry::builtin(),
            Duration::from_secs(30),
        ));
        let engine = Arc::new(CompletionEngine::new(provider, session.clone()));
        (LineDispatcher::new(engine, true), session)
    }

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_enter_domain_by_alias_and_action() {
        let (dispatcher, session) = create_dispatcher();

        assert_eq!(dispatcher.dispatch("lb"), LineOutcome::Nothing);
        assert_eq!(session.navigation().domain(), Some("load_balancer"));

        assert_eq!(dispatcher.dispatch("list"), LineOutcome::Nothing);
        assert_eq!(session.navigation().to_string(), "load_balancer/list");
    }

    #[test]
    fn test_exit_walks_up_then_quits() {
        let (dispatcher, session) = create_dispatcher();
        dispatcher.dispatch("dns");
        dispatcher.dispatch("get");

        assert_eq!(dispatcher.dispatch("exit"), LineOutcome::Nothing);
        assert_eq!(session.navigation().to_string(), "dns");
        assert_eq!(dispatcher.dispatch(".."), LineOutcome::Nothing);
        assert!(session.navigation().is_root());
        assert_eq!(dispatcher.dispatch("exit"), LineOutcome::Quit);
    }

    #[test]
    fn test_back_at_root_reports() {
        let (dispatcher, _) = create_dispatcher();
        assert_eq!(
            dispatcher.dispatch("back"),
            LineOutcome::Output("Already at root context".to_string())
        );
    }

    #[test]
    fn test_root_and_slash_reset() {
        let (dispatcher, session) = create_dispatcher();
        dispatcher.dispatch("dns");
        dispatcher.dispatch("list");
        dispatcher.dispatch("/");
        assert!(session.navigation().is_root());

        dispatcher.dispatch("dns");
        dispatcher.dispatch("root");
        assert!(session.navigation().is_root());
    }

    #[test]
    fn test_command_in_context_is_prefixed() {
        let (dispatcher, _) = create_dispatcher();
        dispatcher.dispatch("dns");
        assert_eq!(
            dispatcher.dispatch("list --limit 10"),
            LineOutcome::Command(strings(&["dns", "list", "--limit", "10", "-n", "default"]))
        );
    }

    #[test]
    fn test_escaped_command_skips_context() {
        let (dispatcher, session) = create_dispatcher();
        dispatcher.dispatch("dns");
        assert_eq!(
            dispatcher.dispatch("/load_balancer list -n shop"),
            LineOutcome::Command(strings(&["load_balancer", "list", "-n", "shop"]))
        );
        assert_eq!(session.navigation().domain(), Some("dns"));
    }

    #[test]
    fn test_escaped_domain_navigates_from_root() {
        let (dispatcher, session) = create_dispatcher();
        dispatcher.dispatch("dns");
        dispatcher.dispatch("list");
        dispatcher.dispatch("/lb");
        assert_eq!(session.navigation().to_string(), "load_balancer");
    }

    #[test]
    fn test_namespace_builtin() {
        let (dispatcher, session) = create_dispatcher();
        assert_eq!(
            dispatcher.dispatch("ns"),
            LineOutcome::Output("Namespace: default".to_string())
        );
        dispatcher.dispatch("namespace shop");
        assert_eq!(session.namespace(), "shop");

        dispatcher.dispatch("dns");
        assert_eq!(dispatcher.dispatch("list"), LineOutcome::Nothing);
        assert_eq!(
            dispatcher.dispatch("--limit 5"),
            LineOutcome::Command(strings(&["dns", "list", "--limit", "5", "-n", "shop"]))
        );
    }

    #[test]
    fn test_context_builtin() {
        let (dispatcher, _) = create_dispatcher();
        assert_eq!(
            dispatcher.dispatch("ctx"),
            LineOutcome::Output("Context: root\nNamespace: default".to_string())
        );
        dispatcher.dispatch("dns");
        assert_eq!(
            dispatcher.dispatch("context"),
            LineOutcome::Output("Context: dns\nNamespace: default".to_string())
        );
    }

    #[test]
    fn test_editor_builtins() {
        let (dispatcher, _) = create_dispatcher();
        assert_eq!(dispatcher.dispatch("quit"), LineOutcome::Quit);
        assert_eq!(dispatcher.dispatch("clear"), LineOutcome::ClearScreen);
        assert_eq!(dispatcher.dispatch("history"), LineOutcome::ShowHistory);
        assert_eq!(dispatcher.dispatch("   "), LineOutcome::Nothing);
    }

    #[test]
    fn test_help_lists_domains_at_root_and_actions_inside() {
        let (dispatcher, _) = create_dispatcher();
        let LineOutcome::Output(root_help) = dispatcher.dispatch("help") else {
            panic!("help should print");
        };
        assert!(root_help.contains("load_balancer"));

        dispatcher.dispatch("dns");
        let LineOutcome::Output(domain_help) = dispatcher.dispatch("help") else {
            panic!("help should print");
        };
        assert!(domain_help.contains("add-labels"));
    }

    #[test]
    fn test_custom_domain_navigation() {
        let (dispatcher, session) = create_dispatcher();
        dispatcher.engine.register_custom_domain(CommandNode::group(
            "login",
            "Authentication",
            vec![CommandNode::command("profile", "Manage profiles", Vec::new())],
        ));

        dispatcher.dispatch("login");
        assert_eq!(session.navigation().domain(), Some("login"));
    }

    #[test]
    fn test_unknown_word_at_root_is_a_command() {
        let (dispatcher, _) = create_dispatcher();
        assert_eq!(
            dispatcher.dispatch("whoami"),
            LineOutcome::Command(strings(&["whoami", "-n", "default"]))
        );
    }
}

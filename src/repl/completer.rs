//! Completer for reedline - provides completion suggestions

use std::sync::Arc;
use std::time::Duration;

use reedline::{Completer, Span, Suggestion};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::debug;

use super::completion::CompletionEngine;

/// Reedline adapter over the completion engine
///
/// The line editor calls completion synchronously. The adapter drives the
/// async engine on the current runtime and waits at most `budget`; a lookup
/// still running after that keeps going in the background and serves the next
/// request from the cache.
pub struct XcshCompleter {
    engine: Arc<CompletionEngine>,
    budget: Duration,
}

impl XcshCompleter {
    /// Create a new completer
    ///
    /// # Arguments
    /// * `engine` - Completion engine
    /// * `budget` - How long to wait for a cold lookup
    ///
    /// # Returns
    /// * `Self` - New completer
    pub fn new(engine: Arc<CompletionEngine>, budget: Duration) -> Self {
        Self { engine, budget }
    }
}

impl Completer for XcshCompleter {
    /// Complete the input at the given cursor position
    ///
    /// # Arguments
    /// * `line` - The input line
    /// * `pos` - Cursor position (byte index)
    ///
    /// # Returns
    /// * `Vec<Suggestion>` - List of completion suggestions
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let before_cursor = line.get(..pos).unwrap_or(line);
        let parsed = self.engine.parse(before_cursor);

        // block_in_place needs a multi-threaded runtime
        let handle = match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => handle,
            _ => {
                debug!("No multi-threaded runtime available for completion");
                return Vec::new();
            }
        };

        let engine = Arc::clone(&self.engine);
        let budget = self.budget;
        let result = tokio::task::block_in_place(|| {
            handle.block_on(async {
                tokio::time::timeout(budget, engine.complete_parsed(&parsed)).await
            })
        });

        let suggestions = match result {
            Ok(suggestions) => suggestions,
            Err(_) => {
                debug!("Completion exceeded {:?}; lookup continues in background", budget);
                Vec::new()
            }
        };

        let span = Span::new(parsed.word_start.min(before_cursor.len()), before_cursor.len());
        suggestions
            .into_iter()
            .map(|s| Suggestion {
                value: s.text,
                description: (!s.description.is_empty()).then_some(s.description),
                span,
                ..Suggestion::default()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FixtureClient;
    use crate::registry::ResourceRegistry;
    use crate::repl::SessionState;
    use crate::repl::completion::ApiCandidateProvider;

    fn create_test_completer(client: FixtureClient, budget: Duration) -> XcshCompleter {
        let provider = Arc::new(ApiCandidateProvider::new(
            Arc::new(client),
            ResourceRegistry::builtin(),
            Duration::from_secs(30),
        ));
        let engine = Arc::new(CompletionEngine::new(provider, SessionState::new("default")));
        XcshCompleter::new(engine, budget)
    }

    fn fixture() -> FixtureClient {
        FixtureClient::from_json_str(r#"{"/api/web/namespaces": {"items": [{"name": "shop"}]}}"#).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_complete_domain_prefix() {
        let mut completer = create_test_completer(fixture(), Duration::from_millis(500));
        let suggestions = completer.complete("cd", 2);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].value, "cdn");
        assert_eq!(suggestions[0].span, Span::new(0, 2));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_span_covers_value_after_equals() {
        let mut completer = create_test_completer(fixture(), Duration::from_millis(500));
        let line = "dns list --output-format=ya";
        let suggestions = completer.complete(line, line.len());

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].value, "yaml");
        assert_eq!(suggestions[0].span, Span::new(line.len() - 2, line.len()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cursor_in_middle_uses_text_before_cursor() {
        let mut completer = create_test_completer(fixture(), Duration::from_millis(500));
        let suggestions = completer.complete("cdn trailing", 2);
        assert!(suggestions.iter().any(|s| s.value == "cdn"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_slow_lookup_returns_empty_then_warms_cache() {
        let client = fixture().with_latency(Duration::from_millis(200));
        let mut completer = create_test_completer(client, Duration::from_millis(20));

        assert!(completer.complete("-n ", 3).is_empty());

        tokio::time::sleep(Duration::from_millis(400)).await;
        let suggestions = completer.complete("-n ", 3);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].value, "shop");
    }

    #[test]
    fn test_no_runtime_gives_no_suggestions() {
        let mut completer = create_test_completer(fixture(), Duration::from_millis(20));
        assert!(completer.complete("cd", 2).is_empty());
    }
}

//! End-to-end completion tests through the public API

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use xcsh::client::{ApiClient, ApiResponse, ListData, ListItem};
use xcsh::error::Result;
use xcsh::registry::ResourceRegistry;
use xcsh::repl::completion::{ApiCandidateProvider, CompletionEngine, SuggestionCategory};
use xcsh::repl::{LineDispatcher, LineOutcome, SessionState};

/// API client that counts requests per path
struct CountingClient {
    responses: HashMap<String, Vec<&'static str>>,
    calls: Calls,
    latency: Duration,
}

type Calls = Mutex<HashMap<String, usize>>;

impl CountingClient {
    fn new(latency: Duration) -> Self {
        let responses = HashMap::from([
            ("/api/web/namespaces".to_string(), vec!["default", "shop", "staging"]),
            (
                "/api/config/dns/namespaces/shop/dns_zones".to_string(),
                vec!["example.com", "example.org"],
            ),
            (
                "/api/config/dns/namespaces/shop/dns_load_balancers".to_string(),
                vec!["geo-lb"],
            ),
        ]);
        Self {
            responses,
            calls: Calls::default(),
            latency,
        }
    }

    fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ApiClient for CountingClient {
    fn is_authenticated(&self) -> bool {
        true
    }

    async fn get(&self, path: &str) -> Result<ApiResponse> {
        *self.calls.lock().unwrap().entry(path.to_string()).or_default() += 1;
        tokio::time::sleep(self.latency).await;

        Ok(match self.responses.get(path) {
            Some(names) => ApiResponse {
                ok: true,
                data: ListData {
                    items: names
                        .iter()
                        .map(|name| ListItem {
                            name: Some(name.to_string()),
                            ..ListItem::default()
                        })
                        .collect(),
                },
            },
            None => ApiResponse::default(),
        })
    }
}

fn setup(latency: Duration, ttl: Duration) -> (Arc<CountingClient>, Arc<CompletionEngine>) {
    let client = Arc::new(CountingClient::new(latency));
    let provider = Arc::new(ApiCandidateProvider::new(
        client.clone(),
        ResourceRegistry::builtin(),
        ttl,
    ));
    let engine = Arc::new(CompletionEngine::new(provider, SessionState::new("shop")));
    (client, engine)
}

fn texts(suggestions: &[xcsh::repl::completion::Suggestion]) -> Vec<String> {
    suggestions.iter().map(|s| s.text.clone()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_namespace_completions_share_one_request() {
    let (client, engine) = setup(Duration::from_millis(50), Duration::from_secs(30));

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.complete("-n ").await })
        })
        .collect();

    for task in tasks {
        let suggestions = task.await.unwrap();
        assert_eq!(texts(&suggestions), vec!["default", "shop", "staging"]);
    }
    assert_eq!(client.calls("/api/web/namespaces"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_namespace_cache_refreshes_after_ttl() {
    let (client, engine) = setup(Duration::ZERO, Duration::from_secs(30));

    engine.complete("-n ").await;
    engine.complete("-n s").await;
    assert_eq!(client.calls("/api/web/namespaces"), 1);

    tokio::time::advance(Duration::from_secs(31)).await;
    let suggestions = engine.complete("-n s").await;
    assert_eq!(texts(&suggestions), vec!["shop", "staging"]);
    assert_eq!(client.calls("/api/web/namespaces"), 2);
}

#[tokio::test]
async fn test_navigation_then_resource_name_completion() {
    let (client, engine) = setup(Duration::ZERO, Duration::from_secs(30));
    let dispatcher = LineDispatcher::new(Arc::clone(&engine), false);

    assert_eq!(dispatcher.dispatch("dns"), LineOutcome::Nothing);
    assert_eq!(dispatcher.dispatch("get"), LineOutcome::Nothing);

    let suggestions = engine.complete("dns_zone --name ex").await;
    assert_eq!(texts(&suggestions), vec!["example.com", "example.org"]);
    assert!(suggestions.iter().all(|s| s.category == SuggestionCategory::ResourceName));
    assert_eq!(client.calls("/api/config/dns/namespaces/shop/dns_zones"), 1);
}

#[tokio::test]
async fn test_resource_type_then_positional_name() {
    let (client, engine) = setup(Duration::ZERO, Duration::from_secs(30));
    let dispatcher = LineDispatcher::new(Arc::clone(&engine), false);

    dispatcher.dispatch("dns");
    dispatcher.dispatch("get");

    let suggestions = engine.complete("").await;
    assert!(suggestions
        .iter()
        .any(|s| s.text == "dns-zone" && s.category == SuggestionCategory::Subcommand));

    let suggestions = engine.complete("dns-zone ex").await;
    assert_eq!(texts(&suggestions), vec!["example.com", "example.org"]);
    assert_eq!(client.calls("/api/config/dns/namespaces/shop/dns_zones"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_prefetch_on_domain_entry_warms_cache() {
    let (client, engine) = setup(Duration::from_millis(20), Duration::from_secs(30));
    let dispatcher = LineDispatcher::new(Arc::clone(&engine), true);

    dispatcher.dispatch("dns");
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(client.calls("/api/config/dns/namespaces/shop/dns_zones"), 1);
    assert_eq!(client.calls("/api/config/dns/namespaces/shop/dns_load_balancers"), 1);

    let suggestions = engine.complete("get dns_load_balancer --name ").await;
    assert_eq!(texts(&suggestions), vec!["geo-lb"]);
    assert_eq!(client.calls("/api/config/dns/namespaces/shop/dns_load_balancers"), 1);
}

#[tokio::test]
async fn test_clear_all_forces_refetch() {
    let (client, engine) = setup(Duration::ZERO, Duration::from_secs(30));

    engine.complete("-n ").await;
    engine.clear_all();
    engine.complete("-n ").await;
    assert_eq!(client.calls("/api/web/namespaces"), 2);
}

#[tokio::test]
async fn test_static_completion_without_api() {
    let (client, engine) = setup(Duration::ZERO, Duration::from_secs(30));

    let suggestions = engine.complete("dns list --").await;
    let texts = texts(&suggestions);
    assert!(texts.contains(&"--limit".to_string()));
    assert!(texts.contains(&"--namespace".to_string()));
    assert_eq!(client.calls("/api/web/namespaces"), 0);
}

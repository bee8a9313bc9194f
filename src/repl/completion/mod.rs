//! Completion system for the xcsh shell
//!
//! Completion is context aware: what is suggested depends on where the
//! session is (root, inside a domain, inside an action) and on the words
//! already typed on the line.
//!
//! # Architecture
//!
//! - **Input**: tokenizer that classifies the word being typed
//! - **FSM**: walks completed words to find the effective navigation state
//! - **Context**: what kind of completion is needed, and the suggestion types
//! - **Cache**: TTL cache coalescing concurrent fetches per key
//! - **Provider**: namespace and resource-name lookups through the cache
//! - **Engine**: orchestrates the entire completion flow
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use xcsh::client::FixtureClient;
//! use xcsh::registry::ResourceRegistry;
//! use xcsh::repl::SessionState;
//! use xcsh::repl::completion::{ApiCandidateProvider, CompletionEngine};
//!
//! # async fn run() {
//! let provider = Arc::new(ApiCandidateProvider::new(
//!     Arc::new(FixtureClient::unauthenticated()),
//!     ResourceRegistry::builtin(),
//!     Duration::from_secs(30),
//! ));
//! let engine = CompletionEngine::new(provider, SessionState::new("default"));
//!
//! // Domains and aliases starting with "cd"
//! let suggestions = engine.complete("cd").await;
//! # }
//! ```

mod cache;
mod context;
mod engine;
mod fsm;
mod input;
mod provider;

pub use cache::{CacheEntry, LookupCache, MAX_TTL};
pub use context::{CompletionContext, Suggestion, SuggestionCategory};
pub use engine::{CompletionEngine, Registries};
pub use fsm::{ContextWalk, WalkRules};
pub use input::{ParsedInput, Tokenizer};
pub use provider::{
    ApiCandidateProvider, CandidateProvider, fallback_namespaces, resource_key,
};

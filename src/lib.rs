//! xcsh Library
//!
//! Core of the xcsh interactive administration shell: hierarchical
//! navigation over a fixed set of domains and context-aware completion backed
//! by cached, de-duplicated API lookups.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `client`: API client abstraction and the fixture-backed client
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `registry`: Domain, resource type and command tables
//! - `repl`: Interactive REPL, navigation and completion
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use xcsh::client::FixtureClient;
//! use xcsh::registry::ResourceRegistry;
//! use xcsh::repl::SessionState;
//! use xcsh::repl::completion::{ApiCandidateProvider, CompletionEngine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = xcsh::Config::default();
//!     let provider = Arc::new(ApiCandidateProvider::new(
//!         Arc::new(FixtureClient::unauthenticated()),
//!         ResourceRegistry::builtin(),
//!         config.cache_ttl(),
//!     ));
//!     let engine = CompletionEngine::new(provider, SessionState::new("default"));
//!
//!     for suggestion in engine.complete("dns ").await {
//!         println!("{}", suggestion.text);
//!     }
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod registry;
pub mod repl;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, ShellError};
pub use repl::completion::CompletionEngine;
pub use repl::{ReplEngine, SessionState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}

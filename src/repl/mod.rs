//! REPL (Read-Eval-Print Loop) for xcsh
//!
//! This module provides the interactive shell:
//! - Line editing and in-memory history with reedline
//! - Hierarchical navigation (root, domain, action)
//! - Context-aware tab completion backed by cached API lookups
//! - Prompts that show the current context and namespace

mod completer;
pub mod completion;
mod engine;
pub mod navigation;
mod prompt;
mod shared_state;

pub use completer::XcshCompleter;
pub use engine::{LineDispatcher, LineOutcome, ReplEngine};
pub use navigation::{NavigationCommand, NavigationContext, NavigationState, resolve_command_path};
pub use prompt::XcshPrompt;
pub use shared_state::SessionState;

//! Read-only metadata registries
//!
//! The completion engine consults three collaborators and never mutates
//! them: the domain table with its alias index, the resource-type table, and
//! the command tree (actions, flags and custom domain trees).

pub mod commands;
pub mod domains;
pub mod resources;

pub use commands::{ActionSpec, ArgumentCompleter, CommandNode, CommandTree, FlagSpec};
pub use domains::{DomainInfo, DomainRegistry};
pub use resources::{ResourceOperations, ResourceRegistry, ResourceType};

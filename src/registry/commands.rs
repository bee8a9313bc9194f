//! Command tree
//!
//! Two shapes of command metadata live here:
//!
//! - The **action table**: the fixed verbs available inside every domain
//!   (`list`, `get`, ...) together with the flags each accepts, plus the base
//!   flags every action inherits.
//! - **Custom domains**: dynamically registered command trees modelled as a
//!   tagged [`CommandNode`] (group, command, or command with a dynamic argument
//!   completer). The suggestion engine walks them with one recursive dispatcher.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A flag accepted by a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    /// Long name without dashes, e.g. `namespace`
    pub name: String,
    /// Single-letter short form without the dash, e.g. `n`
    pub shorthand: Option<String>,
    /// Whether the flag consumes a value
    pub expects_value: bool,
    /// Hidden flags are accepted but never suggested
    pub hidden: bool,
    pub description: String,
}

impl FlagSpec {
    /// A flag that consumes a value
    pub fn value(name: &str, shorthand: Option<&str>, description: &str) -> Self {
        Self {
            name: name.to_string(),
            shorthand: shorthand.map(str::to_string),
            expects_value: true,
            hidden: false,
            description: description.to_string(),
        }
    }

    /// A boolean switch
    pub fn switch(name: &str, shorthand: Option<&str>, description: &str) -> Self {
        Self {
            expects_value: false,
            ..Self::value(name, shorthand, description)
        }
    }

    /// Mark the flag hidden
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// `--name`
    pub fn long_form(&self) -> String {
        format!("--{}", self.name)
    }

    /// `-s`, when the flag has a shorthand
    pub fn short_form(&self) -> Option<String> {
        self.shorthand.as_ref().map(|s| format!("-{s}"))
    }

    /// Check whether a typed word (`--namespace`, `-n`) names this flag
    pub fn matches(&self, typed: &str) -> bool {
        if let Some(long) = typed.strip_prefix("--") {
            return long == self.name;
        }
        match (typed.strip_prefix('-'), &self.shorthand) {
            (Some(short), Some(own)) => short == own,
            _ => false,
        }
    }
}

/// An action available inside a domain
#[derive(Debug, Clone)]
pub struct ActionSpec {
    pub name: String,
    pub description: String,
    pub flags: Vec<FlagSpec>,
}

/// Fixed action vocabulary with per-action flags
#[derive(Debug, Clone)]
pub struct CommandTree {
    base_flags: Vec<FlagSpec>,
    actions: Vec<ActionSpec>,
}

static BUILTIN: OnceLock<CommandTree> = OnceLock::new();

impl CommandTree {
    pub fn new(base_flags: Vec<FlagSpec>, actions: Vec<ActionSpec>) -> Self {
        Self {
            base_flags,
            actions,
        }
    }

    /// The process-wide built-in action table
    pub fn builtin() -> &'static CommandTree {
        BUILTIN.get_or_init(builtin_tree)
    }

    /// Flags inherited by every action
    pub fn base_flags(&self) -> &[FlagSpec] {
        &self.base_flags
    }

    /// All actions in declaration order
    pub fn actions(&self) -> &[ActionSpec] {
        &self.actions
    }

    pub fn action(&self, name: &str) -> Option<&ActionSpec> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn is_action(&self, name: &str) -> bool {
        self.action(name).is_some()
    }

    /// Find a flag by its typed form, searching the action's own flags first
    pub fn find_flag(&self, action: Option<&str>, typed: &str) -> Option<&FlagSpec> {
        let local = action
            .and_then(|a| self.action(a))
            .into_iter()
            .flat_map(|a| a.flags.iter());
        local
            .chain(self.base_flags.iter())
            .find(|f| f.matches(typed))
    }

    /// Find a flag by its typed form in the base flags or any action
    pub fn find_flag_any(&self, typed: &str) -> Option<&FlagSpec> {
        self.base_flags
            .iter()
            .chain(self.actions.iter().flat_map(|a| a.flags.iter()))
            .find(|f| f.matches(typed))
    }

    /// Every typed form (`--long` and `-s`) of every value-taking flag
    ///
    /// This is the set the tokenizer consults to recognise a word as a flag
    /// value.
    pub fn value_flags(&self) -> HashSet<String> {
        self.base_flags
            .iter()
            .chain(self.actions.iter().flat_map(|a| a.flags.iter()))
            .filter(|f| f.expects_value)
            .flat_map(|f| std::iter::once(f.long_form()).chain(f.short_form()))
            .collect()
    }
}

fn builtin_tree() -> CommandTree {
    let base_flags = vec![
        FlagSpec::value("namespace", Some("n"), "Namespace to operate in"),
        FlagSpec::value("output-format", Some("o"), "Output format (json, yaml, table)"),
        FlagSpec::switch("debug", None, "Print request details").hidden(),
    ];

    let name = || FlagSpec::value("name", None, "Resource name");
    let file = || FlagSpec::value("file", Some("f"), "Resource definition file");
    let label = || FlagSpec::value("label", Some("l"), "Label key or key=value");

    let action = |n: &str, description: &str, flags: Vec<FlagSpec>| ActionSpec {
        name: n.to_string(),
        description: description.to_string(),
        flags,
    };

    let actions = vec![
        action(
            "list",
            "List resources",
            vec![
                FlagSpec::value("limit", None, "Maximum number of items"),
                label(),
            ],
        ),
        action("get", "Show a single resource", vec![name()]),
        action("create", "Create a resource from a file", vec![file()]),
        action("delete", "Delete a resource", vec![name(), FlagSpec::switch("yes", Some("y"), "Skip confirmation")]),
        action("replace", "Replace a resource from a file", vec![file(), name()]),
        action("apply", "Create or update a resource from a file", vec![file()]),
        action("status", "Show resource status", vec![name()]),
        action("patch", "Patch fields of a resource", vec![file(), name()]),
        action("add-labels", "Add labels to a resource", vec![name(), label()]),
        action("remove-labels", "Remove labels from a resource", vec![name(), label()]),
    ];

    CommandTree::new(base_flags, actions)
}

/// Completion callback for a command's positional arguments
pub trait ArgumentCompleter: Send + Sync {
    /// Candidate values for the argument being typed
    ///
    /// # Arguments
    /// * `args` - Arguments already completed after the command name
    /// * `current` - The partial word being typed
    fn complete(&self, args: &[String], current: &str) -> Vec<String>;
}

impl<F> ArgumentCompleter for F
where
    F: Fn(&[String], &str) -> Vec<String> + Send + Sync,
{
    fn complete(&self, args: &[String], current: &str) -> Vec<String> {
        self(args, current)
    }
}

/// A node in a custom domain's command tree
#[derive(Clone)]
pub enum CommandNode {
    /// A named group of further nodes
    Group {
        name: String,
        description: String,
        children: Vec<CommandNode>,
    },
    /// A leaf command with flags
    Command {
        name: String,
        description: String,
        flags: Vec<FlagSpec>,
    },
    /// A leaf command whose positional arguments complete dynamically
    Dynamic {
        name: String,
        description: String,
        flags: Vec<FlagSpec>,
        completer: Arc<dyn ArgumentCompleter>,
    },
}

impl CommandNode {
    pub fn group(name: &str, description: &str, children: Vec<CommandNode>) -> Self {
        Self::Group {
            name: name.to_string(),
            description: description.to_string(),
            children,
        }
    }

    pub fn command(name: &str, description: &str, flags: Vec<FlagSpec>) -> Self {
        Self::Command {
            name: name.to_string(),
            description: description.to_string(),
            flags,
        }
    }

    pub fn dynamic(
        name: &str,
        description: &str,
        flags: Vec<FlagSpec>,
        completer: impl ArgumentCompleter + 'static,
    ) -> Self {
        Self::Dynamic {
            name: name.to_string(),
            description: description.to_string(),
            flags,
            completer: Arc::new(completer),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Group { name, .. } | Self::Command { name, .. } | Self::Dynamic { name, .. } => {
                name
            }
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Group { description, .. }
            | Self::Command { description, .. }
            | Self::Dynamic { description, .. } => description,
        }
    }

    /// Child nodes; empty for leaves
    pub fn children(&self) -> &[CommandNode] {
        match self {
            Self::Group { children, .. } => children,
            _ => &[],
        }
    }

    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.children().iter().find(|c| c.name() == name)
    }

    /// Flags of a leaf; empty for groups
    pub fn flags(&self) -> &[FlagSpec] {
        match self {
            Self::Command { flags, .. } | Self::Dynamic { flags, .. } => flags,
            Self::Group { .. } => &[],
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group { .. })
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group { name, children, .. } => f
                .debug_struct("Group")
                .field("name", name)
                .field("children", children)
                .finish(),
            Self::Command { name, flags, .. } => f
                .debug_struct("Command")
                .field("name", name)
                .field("flags", flags)
                .finish(),
            Self::Dynamic { name, flags, .. } => f
                .debug_struct("Dynamic")
                .field("name", name)
                .field("flags", flags)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_flags_include_both_forms() {
        let flags = CommandTree::builtin().value_flags();
        for expected in ["--namespace", "-n", "--output-format", "-o", "--name", "--file", "-f", "--limit", "--label", "-l"] {
            assert!(flags.contains(expected), "missing {expected}");
        }
        assert!(!flags.contains("--yes"));
        assert!(!flags.contains("--debug"));
    }

    #[test]
    fn test_find_flag_by_short_and_long_form() {
        let tree = CommandTree::builtin();
        assert_eq!(tree.find_flag(None, "-n").map(|f| f.name.as_str()), Some("namespace"));
        assert_eq!(
            tree.find_flag(Some("list"), "--limit").map(|f| f.name.as_str()),
            Some("limit")
        );
        assert!(tree.find_flag(None, "--limit").is_none());
        assert!(tree.find_flag(Some("get"), "--bogus").is_none());
    }

    #[test]
    fn test_action_vocabulary_order() {
        let names: Vec<&str> = CommandTree::builtin()
            .actions()
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(
            names,
            ["list", "get", "create", "delete", "replace", "apply", "status", "patch", "add-labels", "remove-labels"]
        );
    }

    #[test]
    fn test_command_node_accessors() {
        let tree = CommandNode::group(
            "cdn",
            "Custom CDN tools",
            vec![
                CommandNode::command("purge", "Purge cache", vec![FlagSpec::value("path", Some("p"), "Path")]),
                CommandNode::dynamic("inspect", "Inspect", vec![], |_: &[String], _: &str| {
                    vec!["edge-1".to_string()]
                }),
            ],
        );

        assert!(tree.is_group());
        assert_eq!(tree.children().len(), 2);
        assert_eq!(tree.child("purge").map(|c| c.flags().len()), Some(1));
        assert!(tree.child("nothing").is_none());
        match tree.child("inspect") {
            Some(CommandNode::Dynamic { completer, .. }) => {
                assert_eq!(completer.complete(&[], ""), vec!["edge-1"]);
            }
            other => panic!("expected dynamic node, got {other:?}"),
        }
    }
}

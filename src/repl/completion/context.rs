//! Completion context and suggestion types
//!
//! A [`CompletionContext`] is the decision of what kind of completion the
//! input needs; the engine turns it into [`Suggestion`]s.

use std::fmt;

use crate::repl::navigation::NavigationContext;

/// What a suggestion completes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionCategory {
    Domain,
    Action,
    Flag,
    FlagValue,
    Builtin,
    Navigation,
    Subcommand,
    Command,
    ResourceName,
}

impl fmt::Display for SuggestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Domain => "domain",
            Self::Action => "action",
            Self::Flag => "flag",
            Self::FlagValue => "flag-value",
            Self::Builtin => "builtin",
            Self::Navigation => "navigation",
            Self::Subcommand => "subcommand",
            Self::Command => "command",
            Self::ResourceName => "resource-name",
        };
        f.write_str(label)
    }
}

/// A completion suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub description: String,
    pub category: SuggestionCategory,
}

impl Suggestion {
    pub fn new(
        text: impl Into<String>,
        description: impl Into<String>,
        category: SuggestionCategory,
    ) -> Self {
        Self {
            text: text.into(),
            description: description.into(),
            category,
        }
    }

    /// Case-insensitive prefix match; an empty prefix matches everything
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        prefix.is_empty() || self.text.to_lowercase().starts_with(&prefix.to_lowercase())
    }
}

/// The kind of completion the input needs
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionContext {
    /// Base suggestions for a navigation state
    Navigation {
        /// State the suggestions are for
        state: NavigationContext,
    },

    /// Walk a custom domain's command tree
    CustomDomain {
        /// Custom domain name
        domain: String,
        /// Completed words below the domain
        path: Vec<String>,
    },

    /// Value of a flag
    FlagValue {
        /// Canonical flag name, e.g. `namespace`
        flag: String,
        /// Effective state the flag is used in
        state: NavigationContext,
        /// Resource type named on the line, for `--name` lookups
        resource_type: Option<String>,
    },

    /// Instance names of a resource type typed inside an action
    ResourceName {
        state: NavigationContext,
        /// Canonical API name of the resource type
        resource_type: String,
    },

    /// Flag names valid for a navigation state
    Flags {
        state: NavigationContext,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match_ignores_case() {
        let s = Suggestion::new("cdn", "", SuggestionCategory::Domain);
        assert!(s.matches_prefix("CD"));
        assert!(s.matches_prefix("cdn"));
        assert!(s.matches_prefix(""));
        assert!(!s.matches_prefix("bigip"));
        assert!(!s.matches_prefix("cdnx"));
    }

    #[test]
    fn test_category_display() {
        assert_eq!(SuggestionCategory::FlagValue.to_string(), "flag-value");
        assert_eq!(SuggestionCategory::ResourceName.to_string(), "resource-name");
    }
}

//! Custom prompt implementation for xcsh

use nu_ansi_term::{Color, Style};
use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

use super::navigation::NavigationContext;

/// Custom prompt for the xcsh REPL
///
/// Renders `xcsh@ns> ` at the root and `domain/action@ns> ` inside a domain.
pub struct XcshPrompt {
    /// Navigation context at the time of rendering
    navigation: NavigationContext,
    /// Default namespace
    namespace: String,
    /// Whether to color segments
    color: bool,
}

impl XcshPrompt {
    /// Create a new prompt
    ///
    /// # Arguments
    /// * `navigation` - Current navigation context
    /// * `namespace` - Default namespace
    /// * `color` - Whether to color segments
    ///
    /// # Returns
    /// * `Self` - New prompt
    pub fn new(navigation: NavigationContext, namespace: String, color: bool) -> Self {
        Self {
            navigation,
            namespace,
            color,
        }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.color {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Prompt for XcshPrompt {
    /// Render the left prompt (main prompt)
    fn render_prompt_left(&self) -> std::borrow::Cow<'_, str> {
        let mut prompt = match self.navigation.domain() {
            Some(domain) => {
                let mut path = self.paint(Color::Green.normal(), domain);
                if let Some(action) = self.navigation.action() {
                    path.push('/');
                    path.push_str(&self.paint(Color::Yellow.normal(), action));
                }
                path
            }
            None => self.paint(Style::new().bold(), "xcsh"),
        };

        if !self.namespace.is_empty() {
            prompt.push('@');
            prompt.push_str(&self.paint(Color::Magenta.normal(), &self.namespace));
        }

        format!("{prompt}> ").into()
    }

    /// Render the right prompt (empty in our case)
    fn render_prompt_right(&self) -> std::borrow::Cow<'_, str> {
        "".into()
    }

    /// Render the prompt indicator (empty since it is part of the left prompt)
    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> std::borrow::Cow<'_, str> {
        "".into()
    }

    fn render_prompt_multiline_indicator(&self) -> std::borrow::Cow<'_, str> {
        "... ".into()
    }

    /// Render the history search prompt
    ///
    /// # Arguments
    /// * `history_search` - History search state
    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> std::borrow::Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}

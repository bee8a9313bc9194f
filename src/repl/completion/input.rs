//! Input tokenizer for completion
//!
//! Splits the raw line into words the way the shell will later split it for
//! execution, then classifies the word under the cursor: a plain word, a
//! flag, or a flag value. Tokenizing never fails; an unterminated quote simply
//! runs to the end of the line.

use std::collections::HashSet;

/// Result of tokenizing one completion request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedInput {
    /// All words, including the word being typed when it is non-empty
    pub tokens: Vec<String>,
    /// The word being typed; empty when the line ends with whitespace.
    /// For `--flag=value` this is the part after `=`.
    pub current_word: String,
    /// The line started with `/`
    pub is_escaped_to_root: bool,
    /// The word being typed is a flag name
    pub is_completing_flag: bool,
    /// The word being typed is the value of `current_flag`
    pub is_completing_flag_value: bool,
    /// Flag whose value is being typed, as typed (`-n`, `--namespace`)
    pub current_flag: Option<String>,
    /// Byte offset in the raw line where the replaceable text starts
    pub word_start: usize,
    /// Number of leading entries of `tokens` that are completed words
    completed_len: usize,
}

impl ParsedInput {
    /// Words finished before the one being typed
    pub fn completed(&self) -> &[String] {
        &self.tokens[..self.completed_len]
    }

    /// Whether nothing at all has been typed
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.current_word.is_empty() && !self.is_escaped_to_root
    }

    /// Value of a flag among the completed words, in `-f v`, `--flag v` or
    /// `--flag=v` form
    ///
    /// # Arguments
    /// * `forms` - Typed forms of the flag, e.g. `["--namespace", "-n"]`
    pub fn flag_value(&self, forms: &[&str]) -> Option<&str> {
        let words = self.completed();
        for (i, word) in words.iter().enumerate() {
            if let Some((flag, value)) = word.split_once('=') {
                if forms.contains(&flag) && !value.is_empty() {
                    return Some(value);
                }
            } else if forms.contains(&word.as_str()) {
                if let Some(value) = words.get(i + 1) {
                    return Some(value);
                }
            }
        }
        None
    }
}

/// Splits raw input into a [`ParsedInput`]
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    /// Typed forms of value-taking flags, e.g. `--namespace` and `-n`
    value_flags: HashSet<String>,
}

impl Tokenizer {
    /// Create a tokenizer
    ///
    /// # Arguments
    /// * `value_flags` - Every typed form of every flag that consumes a value
    pub fn new(value_flags: HashSet<String>) -> Self {
        Self { value_flags }
    }

    /// Tokenize a raw input line
    pub fn tokenize(&self, text: &str) -> ParsedInput {
        let split = split_words(text);

        let mut tokens = split.completed;
        let mut completed_len = tokens.len();
        let (mut current, mut word_start) = match split.current {
            Some((word, start)) => (word, start),
            None => (String::new(), text.len()),
        };

        let mut is_escaped_to_root = false;
        if completed_len > 0 {
            if let Some(stripped) = tokens[0].strip_prefix('/') {
                is_escaped_to_root = true;
                if stripped.is_empty() {
                    tokens.remove(0);
                    completed_len -= 1;
                } else {
                    tokens[0] = stripped.to_string();
                }
            }
        } else if let Some(stripped) = current.strip_prefix('/') {
            is_escaped_to_root = true;
            current = stripped.to_string();
            word_start += 1;
        }

        let mut parsed = ParsedInput {
            is_escaped_to_root,
            word_start,
            completed_len,
            ..ParsedInput::default()
        };

        let previous = tokens.last().cloned();
        if let Some((flag, value)) = current
            .split_once('=')
            .filter(|(flag, _)| flag.starts_with('-'))
        {
            parsed.is_completing_flag_value = true;
            parsed.current_flag = Some(flag.to_string());
            parsed.word_start = text[word_start..]
                .find('=')
                .map_or(text.len(), |pos| word_start + pos + 1);
            parsed.current_word = value.to_string();
        } else if current.starts_with('-') {
            parsed.is_completing_flag = true;
            parsed.current_word = current.clone();
        } else {
            if let Some(prev) = previous.filter(|p| !p.contains('=') && self.value_flags.contains(p)) {
                parsed.is_completing_flag_value = true;
                parsed.current_flag = Some(prev);
            }
            parsed.current_word = current.clone();
        }

        if !current.is_empty() {
            tokens.push(current);
        }
        parsed.tokens = tokens;
        parsed
    }
}

struct SplitWords {
    completed: Vec<String>,
    /// The unfinished last word and its byte offset
    current: Option<(String, usize)>,
}

/// Split on unquoted whitespace. A quote character opens a span closed only
/// by the same character; the other quote character is literal inside it.
fn split_words(text: &str) -> SplitWords {
    let mut completed = Vec::new();
    let mut word = String::new();
    let mut start: Option<usize> = None;
    let mut quote: Option<char> = None;

    for (pos, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), c) => word.push(c),
            (None, '"' | '\'') => {
                start.get_or_insert(pos);
                quote = Some(ch);
            }
            (None, c) if c.is_whitespace() => {
                if start.take().is_some() && !word.is_empty() {
                    completed.push(std::mem::take(&mut word));
                }
            }
            (None, c) => {
                start.get_or_insert(pos);
                word.push(c);
            }
        }
    }

    let current = match start {
        Some(pos) if !word.is_empty() || quote.is_some() => Some((word, pos)),
        _ => None,
    };
    SplitWords { completed, current }
}

//! Error types for the filter engine.

use thiserror::Error;

/// A specialized Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while validating or parsing a filter string.
///
/// Security-gate rejections (`InputTooLong`, `InvalidCharacters`,
/// `RejectedInput`) deliberately carry generic messages: the gate never
/// reveals which check or pattern an input tripped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The input exceeds the maximum allowed length.
    #[error("filter exceeds the maximum length of {max} characters")]
    InputTooLong {
        /// Length of the rejected input, in characters.
        length: usize,
        /// The maximum allowed length.
        max: usize,
    },

    /// The input contains characters outside the allowed set.
    #[error("filter contains invalid characters")]
    InvalidCharacters,

    /// The input matched a disallowed pattern.
    #[error("invalid filter syntax")]
    RejectedInput,

    /// The input failed to tokenize or parse.
    #[error("{message} at position {position}")]
    Syntax {
        /// Human-readable description of the problem.
        message: String,
        /// Character offset of the offending token (input length for
        /// missing-token-at-end-of-input failures).
        position: usize,
        /// A snippet of the input around `position` with a `^` marker
        /// beneath the offending column.
        context: String,
    },
}

impl FilterError {
    /// Creates a syntax error with a context snippet derived from `input`.
    pub fn syntax(message: impl Into<String>, position: usize, input: &str) -> Self {
        FilterError::Syntax {
            message: message.into(),
            position,
            context: context_snippet(input, position),
        }
    }

    /// Returns the character offset of a syntax error, if this is one.
    pub fn position(&self) -> Option<usize> {
        match self {
            FilterError::Syntax { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// Window of input shown on either side of the error position.
const CONTEXT_RADIUS: usize = 20;

/// Builds a two-line diagnostic snippet: up to ~40 characters of input
/// around `position`, with a caret marking the offending column.
fn context_snippet(input: &str, position: usize) -> String {
    let chars: Vec<char> = input.chars().collect();
    let start = position.saturating_sub(CONTEXT_RADIUS);
    let end = (position + CONTEXT_RADIUS).min(chars.len());

    let line: String = chars[start..end].iter().collect();
    let caret_col = position - start;
    format!("{}\n{}^", line, " ".repeat(caret_col))
}

//! Error types for tag parsing and template evaluation

use thiserror::Error;

/// Result type for templating operations
pub type Result<T> = std::result::Result<T, TemplatingError>;

/// What was wrong with a tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("empty name")]
    EmptyName,

    #[error("missing index after ':'")]
    MissingIndex,

    #[error("index '{0}' is not a number")]
    InvalidIndex(String),

    /// Indices are 1-based
    #[error("index must be 1 or greater")]
    NonPositiveIndex,

    #[error("unterminated tag")]
    Unterminated,

    #[error("unexpected character '{0}'")]
    Unexpected(char),

    #[error("tag must be wrapped in '{{' and '}}'")]
    MissingBraces,
}

/// Errors that can occur while expanding or rendering templates
#[derive(Debug, Error)]
pub enum TemplatingError {
    /// Malformed tag syntax
    #[error("invalid tag at offset {offset}: {kind}")]
    Syntax { offset: usize, kind: SyntaxError },

    /// Fallback text that cannot be written as a Liquid string literal
    #[error("fallback contains both quote characters: {0}")]
    UnquotableFallback(String),

    /// Template parsing failed
    #[error("Template parsing failed: {0}")]
    Parse(String),

    /// Template rendering failed
    #[error("Template rendering failed: {0}")]
    Render(String),

    /// Sub-templates were not a flat mapping of names to text
    #[error("invalid sub-templates: {0}")]
    SubTemplates(String),
}

impl TemplatingError {
    pub(crate) fn syntax(offset: usize, kind: SyntaxError) -> Self {
        TemplatingError::Syntax { offset, kind }
    }
}

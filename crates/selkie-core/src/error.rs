pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse failure surfaced to callers.
///
/// `line` is 1-based; 0 means the problem is not tied to a single source
/// line (an empty document, or an invariant violation detected after the
/// whole text was consumed).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parse error at line {line}: {reason}")]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

impl ParseError {
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

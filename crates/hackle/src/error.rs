//! Error types for marshalling and unmarshalling.

use std::fmt;

use hackle_ast::Position;
use hackle_parse::ParseError;

/// An error from any hackle operation.
///
/// Carries a kind, an optional source position, and a stack of context
/// prefixes added as the error bubbles out (`failed to unmarshal block`,
/// `error parsing default value`, …). Renders as
/// `line:column: context: … : kind`.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    pos: Option<Position>,
    context: Vec<String>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            pos: None,
            context: Vec::new(),
        }
    }

    /// Shorthand for a free-form error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message(message.into()))
    }

    /// Annotate with a position, keeping an existing one if already set.
    pub fn with_pos(mut self, pos: Position) -> Self {
        if self.pos.is_none() && pos.is_known() {
            self.pos = Some(pos);
        }
        self
    }

    /// Prepend a context prefix.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.insert(0, context.into());
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn pos(&self) -> Option<Position> {
        self.pos
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pos) = self.pos {
            write!(f, "{pos}: ")?;
        }
        for context in &self.context {
            write!(f, "{context}: ")?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::new(ErrorKind::Syntax(err.kind.to_string())).with_pos(err.pos)
    }
}

/// The kinds of failure, per the error-handling contract: syntax errors,
/// structural conflicts, missing/extra fields, label mismatches, type and
/// decode failures, and enum/default violations.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("{0}")]
    Syntax(String),
    #[error("{second}: {key} cannot be both block and attribute")]
    BlockAttributeConflict { key: String, second: Position },
    #[error("duplicate field {key:?} at {second}")]
    DuplicateField { key: String, second: Position },
    #[error("missing required attribute {0:?}")]
    MissingRequired(String),
    #[error("found extra fields {0}")]
    ExtraFields(String),
    #[error("missing label {0:?}")]
    MissingLabel(String),
    #[error("too many labels for block {0:?}")]
    TooManyLabels(String),
    #[error("expected a block for {0:?} but got an attribute")]
    ExpectedBlock(String),
    #[error("expected an attribute for {0:?} but got a block")]
    ExpectedAttribute(String),
    #[error("{0}")]
    TypeMismatch(String),
    #[error("{0}")]
    ValueDecode(String),
    #[error("value {value} does not match anything within enum {options}")]
    EnumViolation { value: String, options: String },
    #[error("{0}")]
    DefaultParse(String),
    #[error("{0}")]
    Message(String),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_pos_and_context() {
        let err = Error::new(ErrorKind::MissingLabel("name".into()))
            .context("failed to unmarshal block")
            .with_pos(Position::new(4, 2, 5));
        assert_eq!(
            err.to_string(),
            "2:5: failed to unmarshal block: missing label \"name\""
        );
    }

    #[test]
    fn test_conflict_message() {
        let err = Error::new(ErrorKind::BlockAttributeConflict {
            key: "name".into(),
            second: Position::new(0, 3, 5),
        })
        .with_pos(Position::new(0, 2, 5));
        assert_eq!(
            err.to_string(),
            "2:5: 3:5: name cannot be both block and attribute"
        );
    }

    #[test]
    fn test_pos_not_overwritten() {
        let err = Error::message("x")
            .with_pos(Position::new(0, 1, 1))
            .with_pos(Position::new(0, 9, 9));
        assert_eq!(err.pos(), Some(Position::new(0, 1, 1)));
    }
}

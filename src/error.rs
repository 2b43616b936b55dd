use thiserror::Error;

use crate::quote::UnquoteError;
use crate::tag::Tag;

/// Classification of a malformed tag string.
///
/// Exactly one kind is reported per failed parse: the first one hit while
/// scanning left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    /// The key is not followed by `:` and at least one more character.
    #[error("invalid syntax for key value pair")]
    InvalidSyntax,
    /// The key is empty, e.g. the token starts with `:` or `"`.
    #[error("invalid key")]
    InvalidKey,
    /// The value is unquoted, unterminated, or contains a bad escape.
    #[error("invalid value, missing quotes around value")]
    InvalidValue,
    /// A comma appeared inside a key; pairs are separated by spaces.
    #[error("invalid separator, key value pairs should be separated by spaces")]
    InvalidSeparator,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidSyntax => "tag-invalid-syntax",
            ErrorKind::InvalidKey => "tag-invalid-key",
            ErrorKind::InvalidValue => "tag-invalid-value",
            ErrorKind::InvalidSeparator => "tag-invalid-separator",
        }
    }
}

/// A failed parse: what went wrong, where, and what was read before it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    pub kind: ErrorKind,
    /// Byte offset of the start of the offending key/value token.
    pub offset: usize,
    partial: Tag,
    /// Why the value could not be unescaped, for `InvalidValue` errors.
    #[source]
    cause: Option<UnquoteError>,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, offset: usize, partial: Tag) -> Self {
        ParseError {
            kind,
            offset,
            partial,
            cause: None,
        }
    }

    pub(crate) fn with_cause(mut self, cause: Option<UnquoteError>) -> Self {
        self.cause = cause;
        self
    }

    /// Pairs successfully read before the error.
    pub fn partial(&self) -> &Tag {
        &self.partial
    }

    pub fn into_partial(self) -> Tag {
        self.partial
    }
}

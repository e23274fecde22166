//! Structured, located parse/validation diagnostics.

use std::fmt;

/// The machine-readable error code of a [`ParseError`], per spec §4.2/§7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidModel,
    InvalidField,
    UnknownType,
    InvalidModifier,
    MissingPrimaryKey,
    DuplicateField,
    Validation,
}

impl ErrorCode {
    /// The kebab-case spelling used in CLI / JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidModel => "invalid-model",
            ErrorCode::InvalidField => "invalid-field",
            ErrorCode::UnknownType => "unknown-type",
            ErrorCode::InvalidModifier => "invalid-modifier",
            ErrorCode::MissingPrimaryKey => "missing-primary-key",
            ErrorCode::DuplicateField => "duplicate-field",
            ErrorCode::Validation => "validation",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single diagnostic produced while parsing or validating a schema file.
///
/// Parsing never aborts on the first error; callers collect a
/// `Vec<ParseError>` and decide how to present it (see `nexus-cli`'s
/// "Error:"/"Suggestion:" banner, spec §7).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ParseError {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// 1-based line number in the source file, if applicable.
    pub line: Option<usize>,
    /// The raw offending line, for "Error:" banner rendering with a caret.
    pub context: Option<String>,
    /// A "Did you mean ...?"-style suggestion, if one was computed.
    pub suggestion: Option<String>,
}

impl ParseError {
    /// Builds a diagnostic with only a code and message (no location).
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            line: None,
            context: None,
            suggestion: None,
        }
    }

    /// Builder: attaches a source line number and raw text.
    pub fn at_line(mut self, line: usize, context: impl Into<String>) -> Self {
        self.line = Some(line);
        self.context = Some(context.into());
        self
    }

    /// Builder: attaches a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

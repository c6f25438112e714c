//! Error types for the stackvm front-ends.

use stackvm_emitter::EmitError;
use thiserror::Error;

use crate::source::Span;

/// Errors produced while compiling source text to an image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A token was malformed or appeared where it is not allowed.
    #[error("{line}:{column}: syntax error at '{token}': {reason}")]
    Syntax {
        line: usize,
        column: usize,
        token: String,
        reason: String,
    },

    /// A character that is not part of the language.
    #[error("{line}:{column}: unknown command '{token}'")]
    UnknownCommand {
        line: usize,
        column: usize,
        token: String,
    },

    /// Blocks opened and closed out of order, or END misplaced.
    #[error(transparent)]
    Emit(#[from] EmitError),
}

impl CompileError {
    pub(crate) fn syntax(span: Span, token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Syntax {
            line: span.line,
            column: span.column,
            token: token.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown(span: Span, c: char) -> Self {
        Self::UnknownCommand {
            line: span.line,
            column: span.column,
            token: c.to_string(),
        }
    }

    /// Source position, if the error has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Syntax { line, column, .. } | Self::UnknownCommand { line, column, .. } => {
                Some(Span::new(*line, *column))
            }
            Self::Emit(_) => None,
        }
    }
}

/// A language name that does not match any front-end.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown language '{0}' (expected false, bf or arith)")]
pub struct UnknownLanguage(pub String);

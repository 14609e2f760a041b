//! JavaScript error types and error handling.
//!
//! Every failure the parser reports is a [`JsError`]: a kind, the message a
//! user sees, and the source position it is attached to.

use crate::SourcePosition;
use serde::Serialize;
use thiserror::Error;

/// The kind of JavaScript error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Grammar violation (unexpected token, unterminated literal, ...)
    SyntaxError,
    /// Static-semantics violation detected while building the tree
    EarlyError,
}

/// A JavaScript error with message and source position.
///
/// Displays as `message (line:column)` when a position is known.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError, SourcePosition};
///
/// let error = JsError {
///     kind: ErrorKind::EarlyError,
///     message: "Duplicate private element".to_string(),
///     source_position: Some(SourcePosition { line: 1, column: 19, offset: 19 }),
/// };
///
/// assert_eq!(error.to_string(), "Duplicate private element (1:19)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}{}", position_suffix(.source_position))]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Source position where the error occurred
    pub source_position: Option<SourcePosition>,
}

fn position_suffix(position: &Option<SourcePosition>) -> String {
    match position {
        Some(pos) => format!(" ({})", pos),
        None => String::new(),
    }
}

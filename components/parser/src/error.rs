//! Parser error types and helpers

use core_types::{ErrorKind, JsError, SourcePosition};
use thiserror::Error;

/// Create a syntax error at a given position
pub fn syntax_error(message: impl Into<String>, position: Option<SourcePosition>) -> JsError {
    JsError {
        kind: ErrorKind::SyntaxError,
        message: message.into(),
        source_position: position,
    }
}

/// Create an early (static semantics) error at a given position
pub fn early_error(message: impl Into<String>, position: Option<SourcePosition>) -> JsError {
    JsError {
        kind: ErrorKind::EarlyError,
        message: message.into(),
        source_position: position,
    }
}

/// Create an unexpected token error
pub fn unexpected_token(position: Option<SourcePosition>) -> JsError {
    syntax_error("Unexpected token", position)
}

/// Static-semantics violations involving private class elements.
///
/// The `Display` output is the message users see; [`PrivateNameError::at`]
/// attaches the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PrivateNameError {
    /// Same private name declared twice in one class body
    #[error("Duplicate private element")]
    DuplicateDeclaration,
    /// `#constructor` used as a member name
    #[error("Classes may not have a private method named constructor")]
    ReservedConstructor,
    /// Reference to a name no enclosing class declares
    #[error("Usage of undeclared private name")]
    Undeclared,
    /// `delete` applied to a private member access
    #[error("Private elements may not be deleted")]
    Deleted,
    /// `super(...)` inside a private method body
    #[error("A class method that is not a constructor may not contain a direct super")]
    DirectSuper,
}

impl PrivateNameError {
    /// Convert into a positioned early error
    pub fn at(self, position: SourcePosition) -> JsError {
        early_error(self.to_string(), Some(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error() {
        let err = syntax_error("test", None);
        assert!(matches!(err.kind, ErrorKind::SyntaxError));
    }

    #[test]
    fn test_unexpected_token() {
        let pos = SourcePosition {
            line: 1,
            column: 6,
            offset: 6,
        };
        let err = unexpected_token(Some(pos));
        assert_eq!(err.to_string(), "Unexpected token (1:6)");
    }

    #[test]
    fn test_private_name_error_at() {
        let pos = SourcePosition {
            line: 1,
            column: 19,
            offset: 19,
        };
        let err = PrivateNameError::DuplicateDeclaration.at(pos);
        assert_eq!(err.kind, ErrorKind::EarlyError);
        assert_eq!(err.to_string(), "Duplicate private element (1:19)");
    }

    #[test]
    fn test_private_name_error_messages() {
        assert_eq!(
            PrivateNameError::ReservedConstructor.to_string(),
            "Classes may not have a private method named constructor"
        );
        assert_eq!(
            PrivateNameError::Deleted.to_string(),
            "Private elements may not be deleted"
        );
    }
}

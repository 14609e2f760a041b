//! Unit tests for JsError and ErrorKind

use core_types::{ErrorKind, JsError, SourcePosition};

#[cfg(test)]
mod error_kind_tests {
    use super::*;

    #[test]
    fn test_error_kind_equality() {
        assert_eq!(ErrorKind::SyntaxError, ErrorKind::SyntaxError);
        assert_ne!(ErrorKind::SyntaxError, ErrorKind::EarlyError);
    }

    #[test]
    fn test_error_kind_debug() {
        let debug_str = format!("{:?}", ErrorKind::EarlyError);
        assert!(debug_str.contains("EarlyError"));
    }
}

#[cfg(test)]
mod js_error_tests {
    use super::*;

    #[test]
    fn test_js_error_without_position() {
        let error = JsError {
            kind: ErrorKind::SyntaxError,
            message: "Unexpected end of input".to_string(),
            source_position: None,
        };

        assert!(error.source_position.is_none());
        assert_eq!(error.to_string(), "Unexpected end of input");
    }

    #[test]
    fn test_js_error_with_source_position() {
        let error = JsError {
            kind: ErrorKind::EarlyError,
            message: "Usage of undeclared private name".to_string(),
            source_position: Some(SourcePosition {
                line: 1,
                column: 21,
                offset: 21,
            }),
        };

        assert_eq!(error.to_string(), "Usage of undeclared private name (1:21)");
    }

    #[test]
    fn test_js_error_is_std_error() {
        let error = JsError {
            kind: ErrorKind::SyntaxError,
            message: "Unexpected token".to_string(),
            source_position: None,
        };
        let boxed: Box<dyn std::error::Error> = Box::new(error);

        assert_eq!(boxed.to_string(), "Unexpected token");
    }

    #[test]
    fn test_js_error_serializes_kind_and_message() {
        let error = JsError {
            kind: ErrorKind::EarlyError,
            message: "Duplicate private element".to_string(),
            source_position: None,
        };
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["kind"], "EarlyError");
        assert_eq!(json["message"], "Duplicate private element");
        assert!(json["source_position"].is_null());
    }
}

//! Unit tests for SourcePosition and Span

use core_types::{SourcePosition, Span};

#[cfg(test)]
mod source_position_tests {
    use super::*;

    #[test]
    fn test_source_position_start_of_source() {
        let pos = SourcePosition::start_of_source();

        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 0);
        assert_eq!(pos.offset, 0);
    }

    #[test]
    fn test_source_position_large_values() {
        let pos = SourcePosition {
            line: u32::MAX,
            column: u32::MAX,
            offset: usize::MAX,
        };

        assert_eq!(pos.line, u32::MAX);
        assert_eq!(pos.column, u32::MAX);
        assert_eq!(pos.offset, usize::MAX);
    }

    #[test]
    fn test_source_position_equality() {
        let pos1 = SourcePosition {
            line: 42,
            column: 7,
            offset: 1000,
        };
        let pos2 = pos1.clone();

        assert_eq!(pos1, pos2);
        assert_ne!(pos1, SourcePosition::start_of_source());
    }

    #[test]
    fn test_source_position_serializes_fields() {
        let pos = SourcePosition {
            line: 2,
            column: 3,
            offset: 12,
        };
        let json = serde_json::to_value(&pos).unwrap();

        assert_eq!(json["line"], 2);
        assert_eq!(json["column"], 3);
        assert_eq!(json["offset"], 12);
    }
}

#[cfg(test)]
mod span_tests {
    use super::*;

    fn at(offset: usize) -> SourcePosition {
        SourcePosition {
            line: 1,
            column: offset as u32,
            offset,
        }
    }

    #[test]
    fn test_span_covers_range() {
        let span = Span::new(at(10), at(16));

        assert_eq!(span.start.offset, 10);
        assert_eq!(span.end.offset, 16);
        assert_eq!(span.len(), 6);
    }

    #[test]
    fn test_empty_span() {
        let span = Span::new(at(4), at(4));

        assert!(span.is_empty());
    }

    #[test]
    fn test_inverted_span_has_zero_len() {
        let span = Span::new(at(9), at(3));

        assert_eq!(span.len(), 0);
    }
}

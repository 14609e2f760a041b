//! Source position and span types for JavaScript error tracking.
//!
//! Positions follow the convention used by ESTree tooling: lines are
//! 1-indexed, columns are 0-indexed, and offsets count characters from the
//! start of the source.

use serde::Serialize;
use std::fmt;

/// Represents a position in source code.
///
/// Used for error reporting and for stamping syntax nodes.
///
/// # Examples
///
/// ```
/// use core_types::SourcePosition;
///
/// let pos = SourcePosition {
///     line: 1,
///     column: 21,
///     offset: 21,
/// };
///
/// assert_eq!(pos.to_string(), "1:21");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SourcePosition {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (0-indexed)
    pub column: u32,
    /// Character offset from the start of the source
    pub offset: usize,
}

impl SourcePosition {
    /// Position of the first character of a source text.
    pub fn start_of_source() -> Self {
        Self {
            line: 1,
            column: 0,
            offset: 0,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open source range `[start, end)`.
///
/// # Examples
///
/// ```
/// use core_types::{SourcePosition, Span};
///
/// let span = Span::new(
///     SourcePosition { line: 1, column: 6, offset: 6 },
///     SourcePosition { line: 1, column: 7, offset: 7 },
/// );
/// assert_eq!(span.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    /// Position of the first character
    pub start: SourcePosition,
    /// Position just past the last character
    pub end: SourcePosition,
}

impl Span {
    /// Create a span from its two endpoints
    pub fn new(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }

    /// Number of characters covered by the span
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    /// True when the span covers no characters
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

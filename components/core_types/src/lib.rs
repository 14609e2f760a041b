//! Source positions and error types shared by the parser components.
//!
//! # Overview
//!
//! - [`JsError`] - A positioned error aborting the current parse
//! - [`ErrorKind`] - Grammar error vs static-semantics error
//! - [`SourcePosition`] - Source code location
//! - [`Span`] - Range of source covered by a syntax node
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, JsError, SourcePosition};
//!
//! let error = JsError {
//!     kind: ErrorKind::SyntaxError,
//!     message: "Unexpected token".to_string(),
//!     source_position: Some(SourcePosition { line: 1, column: 6, offset: 6 }),
//! };
//! assert_eq!(error.to_string(), "Unexpected token (1:6)");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod source;

pub use error::{ErrorKind, JsError};
pub use source::{SourcePosition, Span};

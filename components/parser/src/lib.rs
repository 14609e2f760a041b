//! JavaScript Parser Component
//!
//! Provides a lexer and recursive descent parser producing an ESTree-like
//! AST, extensible through [`ParserPlugin`]. The [`PrivateNames`] plugin adds
//! private class elements (`#name`) and resolves every private member access
//! against the enclosing class bodies.
//!
//! # Overview
//!
//! - [`Lexer`] - Tokenizes JavaScript source code
//! - [`Token`] - Token types including identifiers, literals, keywords
//! - [`Parser`] - Recursive descent parser producing AST
//! - [`ParserPlugin`] - Hooks called by the parser at fixed grammar points
//! - [`PrivateNames`] - Private name scanning and resolution
//!
//! # Example
//!
//! ```
//! use parser::{Parser, ParserOptions, PrivateNames};
//!
//! let source = "class Counter { #count = 0; inc() { return ++this.#count; } }";
//! let mut parser = Parser::with_plugin(source, ParserOptions::default(), PrivateNames::new());
//! let program = parser.parse().unwrap();
//! assert_eq!(program.body.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod error;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod plugin;
pub mod private_names;

pub use ast::{Expression, PrivateName, Program, Statement};
pub use error::PrivateNameError;
pub use lexer::{Keyword, Lexer, Punctuator, Token, TokenRule};
pub use options::{AllowReserved, ParserOptions, SourceType};
pub use parser::{parse_with_private_names, Parser};
pub use plugin::{NoPlugin, ParserPlugin, PrivateMemberKind};
pub use private_names::PrivateNames;

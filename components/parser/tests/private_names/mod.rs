//! Integration tests for private class element resolution

mod test_ast_shape;
mod test_errors;
mod test_resolution;

use core_types::JsError;
use parser::{Parser, ParserOptions, PrivateNames, Program};

/// Parse with private names and explicit options
pub fn parse_with(source: &str, options: ParserOptions) -> Result<Program, JsError> {
    Parser::with_plugin(source, options, PrivateNames::new()).parse()
}

/// Error message with position, as users see it
pub fn error_of(source: &str) -> String {
    match parser::parse_with_private_names(source) {
        Ok(program) => panic!("expected `{}` to fail, got {:?}", source, program),
        Err(err) => err.to_string(),
    }
}

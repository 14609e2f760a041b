//! Private class elements (`#name`)
//!
//! [`PrivateNames`] is a [`ParserPlugin`] that scans `#name` tokens, tracks
//! which private names each open class declares, and resolves every
//! `obj.#name` against them. A class body may use a name before declaring
//! it, so unresolved uses are held per class and only reported once the
//! outermost class closes.
//!
//! It also rejects `delete obj.#name` and direct `super(...)` calls inside
//! private methods.
//!
//! # Examples
//!
//! ```
//! use parser::parse_with_private_names;
//!
//! assert!(parse_with_private_names("class A { a() { this.#a } #a() {} }").is_ok());
//!
//! let err = parse_with_private_names("class A { a() { this.#a } }").unwrap_err();
//! assert_eq!(err.to_string(), "Usage of undeclared private name (1:21)");
//! ```

mod scope;
mod token;

pub use scope::{BoundKind, ClassScopeStack};
pub use token::private_name_rule;

use crate::ast::{Expression, PrivateName, PropertyKey, UnaryOperator};
use crate::error::{syntax_error, PrivateNameError};
use crate::lexer::{Punctuator, Token, TokenRule};
use crate::options::{reserved_word_message, AllowReserved, ParserOptions};
use crate::plugin::{ParserPlugin, PrivateMemberKind};
use core_types::{JsError, SourcePosition};

/// Resolver for private class element names
#[derive(Debug, Default)]
pub struct PrivateNames {
    scopes: ClassScopeStack,
    in_private_method: bool,
}

impl PrivateNames {
    /// Create a resolver with no open classes
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of class bodies currently open
    pub fn depth(&self) -> usize {
        self.scopes.depth()
    }

    /// True while parsing the body of a method keyed by a private name
    pub fn in_private_method(&self) -> bool {
        self.in_private_method
    }
}

/// With `allow_reserved: never`, private names may not be spelled like
/// reserved words. Class bodies are strict code; modules also reserve `await`.
fn check_unreserved(name: &PrivateName, options: &ParserOptions) -> Result<(), JsError> {
    if options.allow_reserved != AllowReserved::Never {
        return Ok(());
    }
    match reserved_word_message(&name.name, true, options.source_type) {
        Some(message) => Err(syntax_error(message, Some(name.span.start.clone()))),
        None => Ok(()),
    }
}

impl ParserPlugin for PrivateNames {
    fn token_rules(&self) -> Vec<TokenRule> {
        vec![private_name_rule]
    }

    fn reset(&mut self) {
        self.scopes.clear();
        self.in_private_method = false;
    }

    fn enter_class(&mut self) {
        self.scopes.push();
    }

    fn exit_class(&mut self) -> Result<(), JsError> {
        self.scopes.pop()
    }

    fn declare_private_member(
        &mut self,
        name: &PrivateName,
        kind: PrivateMemberKind,
        element_start: &SourcePosition,
        options: &ParserOptions,
    ) -> Result<bool, JsError> {
        if !options.supports_private_names() {
            return Ok(false);
        }
        check_unreserved(name, options)?;
        if name.name == "constructor" {
            return Err(PrivateNameError::ReservedConstructor.at(element_start.clone()));
        }
        self.scopes
            .declare(&name.name, kind)
            .map_err(|err| err.at(element_start.clone()))?;
        Ok(true)
    }

    fn enter_method(&mut self, key: &PropertyKey) -> bool {
        let saved = self.in_private_method;
        self.in_private_method = matches!(key, PropertyKey::PrivateName(_));
        saved
    }

    fn exit_method(&mut self, saved: bool) {
        self.in_private_method = saved;
    }

    fn reference_private_name(
        &mut self,
        name: &PrivateName,
        options: &ParserOptions,
    ) -> Result<bool, JsError> {
        if !options.supports_private_names() || self.scopes.is_empty() {
            return Ok(false);
        }
        check_unreserved(name, options)?;
        Ok(self.scopes.reference(&name.name, name.span.start.clone()))
    }

    fn after_unary(&mut self, expr: &Expression) -> Result<(), JsError> {
        if let Expression::UnaryExpression {
            operator: UnaryOperator::Delete,
            argument,
            span,
        } = expr
        {
            if argument.is_private_member() {
                return Err(PrivateNameError::Deleted.at(span.start.clone()));
            }
        }
        Ok(())
    }

    fn after_atom(&mut self, atom: &Expression, next: &Token) -> Result<(), JsError> {
        if let Expression::Super { span } = atom {
            if self.in_private_method && *next == Token::Punctuator(Punctuator::LParen) {
                return Err(PrivateNameError::DirectSuper.at(span.start.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ErrorKind, Span};

    fn private_name(name: &str, offset: usize) -> PrivateName {
        let start = SourcePosition {
            line: 1,
            column: offset as u32,
            offset,
        };
        let end = SourcePosition {
            line: 1,
            column: (offset + name.len() + 1) as u32,
            offset: offset + name.len() + 1,
        };
        PrivateName {
            name: name.to_string(),
            span: Span::new(start, end),
        }
    }

    #[test]
    fn test_reset_clears_state() {
        let mut plugin = PrivateNames::new();
        plugin.enter_class();
        plugin.enter_method(&PropertyKey::PrivateName(private_name("m", 10)));
        assert!(plugin.in_private_method());
        plugin.reset();
        assert_eq!(plugin.depth(), 0);
        assert!(!plugin.in_private_method());
    }

    #[test]
    fn test_method_flag_save_restore() {
        let mut plugin = PrivateNames::new();
        let saved_outer = plugin.enter_method(&PropertyKey::PrivateName(private_name("m", 10)));
        assert!(!saved_outer);
        let saved_inner = plugin.enter_method(&PropertyKey::Identifier {
            name: "n".to_string(),
            span: Span::default(),
        });
        assert!(saved_inner);
        assert!(!plugin.in_private_method());
        plugin.exit_method(saved_inner);
        assert!(plugin.in_private_method());
        plugin.exit_method(saved_outer);
        assert!(!plugin.in_private_method());
    }

    #[test]
    fn test_constructor_rejected_at_element_start() {
        let mut plugin = PrivateNames::new();
        plugin.enter_class();
        let element_start = SourcePosition {
            line: 1,
            column: 10,
            offset: 10,
        };
        let err = plugin
            .declare_private_member(
                &private_name("constructor", 10),
                PrivateMemberKind::Method,
                &element_start,
                &ParserOptions::default(),
            )
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::EarlyError);
        assert_eq!(
            err.to_string(),
            "Classes may not have a private method named constructor (1:10)"
        );
    }

    #[test]
    fn test_old_ecma_version_declines() {
        let mut plugin = PrivateNames::new();
        plugin.enter_class();
        let options = ParserOptions {
            ecma_version: 7,
            ..Default::default()
        };
        let accepted = plugin
            .declare_private_member(
                &private_name("x", 10),
                PrivateMemberKind::Method,
                &SourcePosition::default(),
                &options,
            )
            .unwrap();
        assert!(!accepted);
        assert!(!plugin
            .reference_private_name(&private_name("x", 20), &options)
            .unwrap());
    }

    #[test]
    fn test_reference_outside_class_declined() {
        let mut plugin = PrivateNames::new();
        assert!(!plugin
            .reference_private_name(&private_name("x", 5), &ParserOptions::default())
            .unwrap());
    }

    #[test]
    fn test_reserved_word_with_never() {
        let mut plugin = PrivateNames::new();
        plugin.enter_class();
        let options = ParserOptions {
            allow_reserved: AllowReserved::Never,
            ..Default::default()
        };
        let err = plugin
            .declare_private_member(
                &private_name("enum", 10),
                PrivateMemberKind::Field,
                &SourcePosition::default(),
                &options,
            )
            .unwrap_err();
        assert_eq!(err.message, "The keyword 'enum' is reserved");

        // Tolerated under the default policy
        assert!(plugin
            .declare_private_member(
                &private_name("enum", 10),
                PrivateMemberKind::Field,
                &SourcePosition::default(),
                &ParserOptions::default(),
            )
            .unwrap());
    }
}

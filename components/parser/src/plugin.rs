//! Extension points of the parser
//!
//! A [`ParserPlugin`] is owned by the [`Parser`](crate::Parser) and called at
//! fixed points of the grammar. Every hook has a neutral default, so
//! [`NoPlugin`] parses plain ECMAScript.

use crate::ast::{Expression, PrivateName, PropertyKey};
use crate::lexer::{Token, TokenRule};
use crate::options::ParserOptions;
use core_types::{JsError, SourcePosition};

/// What a private class element declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateMemberKind {
    /// `#m() {}`, including async and generator methods
    Method,
    /// `get #m() {}`
    Get,
    /// `set #m(v) {}`
    Set,
    /// `#m = value;`
    Field,
}

/// Hooks the parser calls while building the tree.
pub trait ParserPlugin {
    /// Scanning rules consulted before the lexer's own, in order
    fn token_rules(&self) -> Vec<TokenRule> {
        Vec::new()
    }

    /// Called at the start of every parse
    fn reset(&mut self) {}

    /// Called before a class member list is parsed
    fn enter_class(&mut self) {}

    /// Called after a class member list, whether or not it parsed.
    fn exit_class(&mut self) -> Result<(), JsError> {
        Ok(())
    }

    /// A class element keyed by a private name.
    ///
    /// `Ok(false)` means the plugin does not accept private names and the
    /// parser reports the key as an unexpected token.
    fn declare_private_member(
        &mut self,
        _name: &PrivateName,
        _kind: PrivateMemberKind,
        _element_start: &SourcePosition,
        _options: &ParserOptions,
    ) -> Result<bool, JsError> {
        Ok(false)
    }

    /// Called before a class method's parameters and body; the returned
    /// value is handed back to [`exit_method`](Self::exit_method).
    fn enter_method(&mut self, _key: &PropertyKey) -> bool {
        false
    }

    /// Called after a class method body, whether or not it parsed
    fn exit_method(&mut self, _saved: bool) {}

    /// A private name used as the property of a member access.
    ///
    /// `Ok(false)` makes the parser report an unexpected token.
    fn reference_private_name(
        &mut self,
        _name: &PrivateName,
        _options: &ParserOptions,
    ) -> Result<bool, JsError> {
        Ok(false)
    }

    /// Called with every unary-level expression once it is built
    fn after_unary(&mut self, _expr: &Expression) -> Result<(), JsError> {
        Ok(())
    }

    /// Called with every primary expression and the token following it
    fn after_atom(&mut self, _atom: &Expression, _next: &Token) -> Result<(), JsError> {
        Ok(())
    }
}

/// Plugin that leaves the grammar unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlugin;

impl ParserPlugin for NoPlugin {}

//! Class scope bookkeeping for private names

use crate::error::PrivateNameError;
use crate::plugin::PrivateMemberKind;
use core_types::{JsError, SourcePosition};
use std::collections::HashMap;
use tracing::{debug, trace};

/// How a private name is bound in its class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// Method
    Method,
    /// Field
    Field,
    /// Getter only
    Get,
    /// Setter only
    Set,
    /// Getter and setter pair
    GetSet,
}

impl BoundKind {
    fn declared(kind: PrivateMemberKind) -> Self {
        match kind {
            PrivateMemberKind::Method => BoundKind::Method,
            PrivateMemberKind::Field => BoundKind::Field,
            PrivateMemberKind::Get => BoundKind::Get,
            PrivateMemberKind::Set => BoundKind::Set,
        }
    }

    /// Binding after a second declaration, or `None` if the two conflict
    fn redeclared(self, kind: PrivateMemberKind) -> Option<Self> {
        match (self, kind) {
            (BoundKind::Get, PrivateMemberKind::Set) | (BoundKind::Set, PrivateMemberKind::Get) => {
                Some(BoundKind::GetSet)
            }
            _ => None,
        }
    }
}

/// Private names of one class body being parsed
#[derive(Debug, Default)]
pub struct ClassScope {
    /// Index of the enclosing class scope
    parent: Option<usize>,
    bound_names: HashMap<String, BoundKind>,
    /// First unresolved reference to each name
    unresolved_names: HashMap<String, SourcePosition>,
}

/// Stack of class scopes, innermost last.
///
/// Name lookup follows `parent` links outward; parent tables are never
/// copied into a child.
#[derive(Debug, Default)]
pub struct ClassScopeStack {
    scopes: Vec<ClassScope>,
}

impl ClassScopeStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of classes currently open
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// True outside every class body
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Drop every open scope
    pub fn clear(&mut self) {
        self.scopes.clear();
    }

    /// Open a scope for a class body
    pub fn push(&mut self) {
        let parent = self.scopes.len().checked_sub(1);
        self.scopes.push(ClassScope {
            parent,
            ..ClassScope::default()
        });
        trace!(depth = self.scopes.len(), "enter class scope");
    }

    /// Close the innermost scope.
    ///
    /// Leftover references move to the enclosing scope; with none left the
    /// earliest of them is reported as undeclared.
    pub fn pop(&mut self) -> Result<(), JsError> {
        let Some(scope) = self.scopes.pop() else {
            debug!("class scope popped with none open");
            return Ok(());
        };
        trace!(
            depth = self.scopes.len(),
            unresolved = scope.unresolved_names.len(),
            "exit class scope"
        );

        match self.scopes.last_mut() {
            Some(outer) => {
                for (name, position) in scope.unresolved_names {
                    trace!(name = %name, offset = position.offset, "defer private name to outer class");
                    outer.unresolved_names.entry(name).or_insert(position);
                }
                Ok(())
            }
            None => {
                let earliest = scope
                    .unresolved_names
                    .into_iter()
                    .min_by_key(|(_, position)| position.offset);
                match earliest {
                    Some((name, position)) => {
                        debug!(name = %name, offset = position.offset, "undeclared private name");
                        Err(PrivateNameError::Undeclared.at(position))
                    }
                    None => Ok(()),
                }
            }
        }
    }

    /// Record a declaration in the innermost scope.
    ///
    /// Only that scope's own names are checked for conflicts, so a nested
    /// class may reuse an outer class's private names.
    pub fn declare(&mut self, name: &str, kind: PrivateMemberKind) -> Result<(), PrivateNameError> {
        let Some(scope) = self.scopes.last_mut() else {
            return Ok(());
        };

        let bound = match scope.bound_names.get(name) {
            Some(existing) => existing
                .redeclared(kind)
                .ok_or(PrivateNameError::DuplicateDeclaration)?,
            None => BoundKind::declared(kind),
        };
        trace!(name, ?bound, "declare private name");
        scope.bound_names.insert(name.to_string(), bound);
        scope.unresolved_names.remove(name);
        Ok(())
    }

    /// How `name` is bound, searching from the innermost scope outward
    pub fn lookup(&self, name: &str) -> Option<BoundKind> {
        let mut index = self.scopes.len().checked_sub(1);
        while let Some(current) = index {
            let scope = &self.scopes[current];
            if let Some(kind) = scope.bound_names.get(name) {
                return Some(*kind);
            }
            index = scope.parent;
        }
        None
    }

    /// Record a use of `name` at `position`.
    ///
    /// Returns `false` when no class is open. Unbound names are remembered
    /// in the innermost scope; the first use of a name is the one kept.
    pub fn reference(&mut self, name: &str, position: SourcePosition) -> bool {
        if self.lookup(name).is_some() {
            return true;
        }
        let Some(scope) = self.scopes.last_mut() else {
            return false;
        };
        trace!(name, offset = position.offset, "forward private name reference");
        scope
            .unresolved_names
            .entry(name.to_string())
            .or_insert(position);
        true
    }

    /// Unresolved names of the innermost scope, for inspection
    pub fn pending(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .scopes
            .last()
            .map(|scope| scope.unresolved_names.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offset: usize) -> SourcePosition {
        SourcePosition {
            line: 1,
            column: offset as u32,
            offset,
        }
    }

    #[test]
    fn test_forward_reference_resolved_by_later_declaration() {
        let mut stack = ClassScopeStack::new();
        stack.push();
        assert!(stack.reference("a", at(21)));
        assert_eq!(stack.pending(), vec!["a"]);
        stack.declare("a", PrivateMemberKind::Method).unwrap();
        assert!(stack.pending().is_empty());
        assert!(stack.pop().is_ok());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_undeclared_reports_earliest() {
        let mut stack = ClassScopeStack::new();
        stack.push();
        stack.reference("b", at(37));
        stack.reference("a", at(21));
        let err = stack.pop().unwrap_err();
        assert_eq!(err.to_string(), "Usage of undeclared private name (1:21)");
    }

    #[test]
    fn test_first_reference_wins() {
        let mut stack = ClassScopeStack::new();
        stack.push();
        stack.reference("a", at(5));
        stack.reference("a", at(30));
        let err = stack.pop().unwrap_err();
        assert_eq!(err.source_position, Some(at(5)));
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut stack = ClassScopeStack::new();
        stack.push();
        stack.declare("a", PrivateMemberKind::Method).unwrap();
        assert_eq!(
            stack.declare("a", PrivateMemberKind::Method),
            Err(PrivateNameError::DuplicateDeclaration)
        );
        assert_eq!(
            stack.declare("a", PrivateMemberKind::Get),
            Err(PrivateNameError::DuplicateDeclaration)
        );
    }

    #[test]
    fn test_getter_setter_pair() {
        let mut stack = ClassScopeStack::new();
        stack.push();
        stack.declare("a", PrivateMemberKind::Get).unwrap();
        stack.declare("a", PrivateMemberKind::Set).unwrap();
        assert_eq!(stack.lookup("a"), Some(BoundKind::GetSet));
        assert_eq!(
            stack.declare("a", PrivateMemberKind::Get),
            Err(PrivateNameError::DuplicateDeclaration)
        );
    }

    #[test]
    fn test_field_conflicts_with_accessor() {
        let mut stack = ClassScopeStack::new();
        stack.push();
        stack.declare("a", PrivateMemberKind::Field).unwrap();
        assert!(stack.declare("a", PrivateMemberKind::Set).is_err());
    }

    #[test]
    fn test_inner_scope_sees_outer_names() {
        let mut stack = ClassScopeStack::new();
        stack.push();
        stack.declare("x", PrivateMemberKind::Method).unwrap();
        stack.push();
        assert_eq!(stack.lookup("x"), Some(BoundKind::Method));
        assert!(stack.reference("x", at(40)));
        assert!(stack.pending().is_empty());
        // Shadowing in the inner class is not a duplicate
        stack.declare("x", PrivateMemberKind::Field).unwrap();
        stack.pop().unwrap();
        assert_eq!(stack.lookup("x"), Some(BoundKind::Method));
    }

    #[test]
    fn test_unresolved_merges_into_outer_scope() {
        let mut stack = ClassScopeStack::new();
        stack.push();
        stack.push();
        stack.reference("y", at(30));
        stack.pop().unwrap();
        assert_eq!(stack.pending(), vec!["y"]);
        stack.declare("y", PrivateMemberKind::Method).unwrap();
        assert!(stack.pop().is_ok());
    }

    #[test]
    fn test_merge_keeps_existing_outer_entry() {
        let mut stack = ClassScopeStack::new();
        stack.push();
        stack.reference("z", at(12));
        stack.push();
        stack.reference("z", at(30));
        stack.pop().unwrap();
        let err = stack.pop().unwrap_err();
        assert_eq!(err.source_position, Some(at(12)));
    }

    #[test]
    fn test_reference_outside_class() {
        let mut stack = ClassScopeStack::new();
        assert!(!stack.reference("a", at(0)));
        assert!(stack.pop().is_ok());
    }
}

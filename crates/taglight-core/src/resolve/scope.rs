//! Lexical scope tree used while resolving names

use crate::symbol::SymbolId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ScopeId(usize);

#[derive(Debug, Default)]
struct Scope {
    parent: Option<ScopeId>,
    names: HashMap<String, SymbolId>,
}

/// Arena of scopes linked to their parents.
///
/// Scopes are never popped: a resolver run creates one per block it
/// enters and drops the whole arena at the end.
#[derive(Debug, Default)]
pub(crate) struct Scopes {
    scopes: Vec<Scope>,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope with no parent
    pub fn root(&mut self) -> ScopeId {
        self.push(None)
    }

    /// A new scope nested in `parent`
    pub fn child(&mut self, parent: ScopeId) -> ScopeId {
        self.push(Some(parent))
    }

    fn push(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent,
            names: HashMap::new(),
        });
        id
    }

    /// Define `name` in `scope`. If the name already exists in that very
    /// scope the existing symbol is kept and returned as the error.
    pub fn define(&mut self, scope: ScopeId, name: &str, id: SymbolId) -> Result<(), SymbolId> {
        let names = &mut self.scopes[scope.0].names;
        if let Some(existing) = names.get(name) {
            return Err(*existing);
        }
        names.insert(name.to_string(), id);
        Ok(())
    }

    /// Find `name`, innermost scope first
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.0];
            if let Some(symbol) = scope.names.get(name) {
                return Some(*symbol);
            }
            current = scope.parent;
        }
        None
    }

    /// Find `name` in `scope` only
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes[scope.0].names.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward_and_shadowing_works() {
        let mut scopes = Scopes::new();
        let outer = scopes.root();
        let inner = scopes.child(outer);
        scopes.define(outer, "x", SymbolId(0)).unwrap();
        assert_eq!(scopes.lookup(inner, "x"), Some(SymbolId(0)));
        assert_eq!(scopes.lookup_local(inner, "x"), None);

        scopes.define(inner, "x", SymbolId(1)).unwrap();
        assert_eq!(scopes.lookup(inner, "x"), Some(SymbolId(1)));
        assert_eq!(scopes.lookup(outer, "x"), Some(SymbolId(0)));
    }

    #[test]
    fn test_redefinition_in_same_scope_keeps_first() {
        let mut scopes = Scopes::new();
        let root = scopes.root();
        scopes.define(root, "x", SymbolId(0)).unwrap();
        assert_eq!(scopes.define(root, "x", SymbolId(1)), Err(SymbolId(0)));
        assert_eq!(scopes.lookup(root, "x"), Some(SymbolId(0)));
    }
}

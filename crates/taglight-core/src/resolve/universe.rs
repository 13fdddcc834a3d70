//! Predeclared Go identifiers

use super::scope::{ScopeId, Scopes};
use super::types::{Ty, TypeTable};
use crate::symbol::{DeclScope, Symbol, SymbolId, SymbolIndex, SymbolKind};

const BASIC_TYPES: &[&str] = &[
    "bool", "byte", "complex64", "complex128", "float32", "float64", "int", "int8", "int16",
    "int32", "int64", "rune", "string", "uint", "uint8", "uint16", "uint32", "uint64", "uintptr",
];

const CONSTANTS: &[&str] = &["true", "false", "iota"];

/// Builtin functions and `nil`; none of these is a tagged kind
const OTHERS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max",
    "min", "new", "nil", "panic", "print", "println", "real", "recover",
];

fn declare(
    index: &mut SymbolIndex,
    scopes: &mut Scopes,
    scope: ScopeId,
    name: &str,
    kind: SymbolKind,
) -> SymbolId {
    let id = index.add_symbol(Symbol::new(name, kind, DeclScope::Universe, None));
    // names above are unique, so this cannot clash
    let _ = scopes.define(scope, name, id);
    id
}

/// Fill the universe scope
pub(crate) fn populate(
    index: &mut SymbolIndex,
    types: &mut TypeTable,
    scopes: &mut Scopes,
    scope: ScopeId,
) {
    for name in BASIC_TYPES {
        let id = declare(index, scopes, scope, name, SymbolKind::TypeName);
        types.set(id, Ty::Basic);
    }

    let error_method = index.add_symbol(Symbol::new(
        "Error",
        SymbolKind::Function,
        DeclScope::Member,
        None,
    ));
    types.set(error_method, Ty::Func(vec![Ty::Basic]));
    let error = declare(index, scopes, scope, "error", SymbolKind::TypeName);
    types.set(error, Ty::Interface(vec![error_method]));
    for name in ["any", "comparable"] {
        let id = declare(index, scopes, scope, name, SymbolKind::TypeName);
        types.set(id, Ty::Interface(Vec::new()));
    }

    for name in CONSTANTS {
        let id = declare(index, scopes, scope, name, SymbolKind::Constant);
        types.set(id, Ty::Basic);
    }
    for name in OTHERS {
        declare(index, scopes, scope, name, SymbolKind::Other);
    }
}

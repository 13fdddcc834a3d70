//! Just enough type structure to find selector targets and type shapes

use crate::symbol::{SymbolId, SymbolIndex, TypeShape};
use std::collections::{HashMap, HashSet};

/// Named-type chains and member lookups stop after this many steps, which
/// also cuts off cycles such as `type A B; type B A`.
const MAX_DEPTH: usize = 16;

/// A structural type, with named types kept as references
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Ty {
    /// A declared or predeclared type name
    Named(SymbolId),
    Pointer(Box<Ty>),
    /// Struct with its field symbols
    Struct(Vec<SymbolId>),
    /// Interface with its method symbols
    Interface(Vec<SymbolId>),
    /// Function with its result types
    Func(Vec<Ty>),
    /// Slice or array of the element type
    Slice(Box<Ty>),
    /// Map with the value type
    Map(Box<Ty>),
    Chan(Box<Ty>),
    /// Numbers, strings, booleans
    Basic,
    /// Comes from another package, or could not be worked out
    Opaque,
}

/// Types of symbols and method sets of named types
#[derive(Debug, Default)]
pub(crate) struct TypeTable {
    /// For type names the definition, for everything else the symbol's type
    types: HashMap<SymbolId, Ty>,
    methods: HashMap<SymbolId, Vec<SymbolId>>,
    embedded: HashSet<SymbolId>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: SymbolId, ty: Ty) {
        self.types.insert(id, ty);
    }

    pub fn get(&self, id: SymbolId) -> Option<&Ty> {
        self.types.get(&id)
    }

    pub fn add_method(&mut self, receiver: SymbolId, method: SymbolId) {
        self.methods.entry(receiver).or_default().push(method);
    }

    /// Mark a struct field as embedded, so its members are promoted
    pub fn mark_embedded(&mut self, field: SymbolId) {
        self.embedded.insert(field);
    }

    /// Expand named types until something structural shows up
    pub fn structural<'t>(&'t self, ty: &'t Ty) -> Option<&'t Ty> {
        let mut current = ty;
        for _ in 0..MAX_DEPTH {
            match current {
                Ty::Named(id) => current = self.types.get(id)?,
                other => return Some(other),
            }
        }
        None
    }

    /// Underlying shape, `None` when the type cannot be resolved
    pub fn shape(&self, ty: &Ty) -> Option<TypeShape> {
        match self.structural(ty)? {
            Ty::Interface(_) => Some(TypeShape::Interface),
            Ty::Struct(_) => Some(TypeShape::Struct),
            Ty::Func(_) => Some(TypeShape::Signature),
            Ty::Opaque => None,
            _ => Some(TypeShape::Other),
        }
    }

    /// Element type when indexing, ranging over values, or receiving
    pub fn elem(&self, ty: &Ty) -> Option<Ty> {
        match self.structural(ty)? {
            Ty::Slice(elem) | Ty::Map(elem) | Ty::Chan(elem) => Some((**elem).clone()),
            Ty::Basic => Some(Ty::Basic),
            _ => None,
        }
    }

    /// Types bound by `for k, v := range x`
    pub fn range_types(&self, ty: &Ty) -> Vec<Ty> {
        match self.structural(ty) {
            Some(Ty::Slice(elem)) => vec![Ty::Basic, (**elem).clone()],
            Some(Ty::Map(value)) => vec![Ty::Opaque, (**value).clone()],
            Some(Ty::Chan(elem)) => vec![(**elem).clone()],
            Some(Ty::Basic) => vec![Ty::Basic, Ty::Basic],
            _ => Vec::new(),
        }
    }

    /// Find the field or method `name` reachable from a value of type `ty`
    pub fn member(&self, ty: &Ty, name: &str, symbols: &SymbolIndex) -> Option<SymbolId> {
        self.member_at(ty, name, symbols, 0)
    }

    fn member_at(&self, ty: &Ty, name: &str, symbols: &SymbolIndex, depth: usize) -> Option<SymbolId> {
        if depth > MAX_DEPTH {
            return None;
        }
        let is_named = |id: &SymbolId| symbols.symbol(*id).is_some_and(|s| s.name == name);
        match ty {
            Ty::Pointer(inner) => self.member_at(inner, name, symbols, depth + 1),
            Ty::Named(id) => {
                if let Some(method) = self.methods.get(id).and_then(|ms| ms.iter().find(|m| is_named(m))) {
                    return Some(*method);
                }
                let def = self.types.get(id)?;
                self.member_at(def, name, symbols, depth + 1)
            }
            Ty::Struct(fields) => {
                if let Some(field) = fields.iter().find(|f| is_named(f)) {
                    return Some(*field);
                }
                fields
                    .iter()
                    .filter(|f| self.embedded.contains(f))
                    .filter_map(|f| self.types.get(f))
                    .find_map(|embedded| self.member_at(embedded, name, symbols, depth + 1))
            }
            Ty::Interface(methods) => methods.iter().find(|m| is_named(m)).copied(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{DeclScope, Symbol, SymbolKind};

    fn add(index: &mut SymbolIndex, name: &str, kind: SymbolKind) -> SymbolId {
        index.add_symbol(Symbol::new(name, kind, DeclScope::Package, None))
    }

    #[test]
    fn test_shape_follows_named_chain() {
        let mut index = SymbolIndex::new();
        let mut types = TypeTable::new();
        let a = add(&mut index, "A", SymbolKind::TypeName);
        let b = add(&mut index, "B", SymbolKind::TypeName);
        types.set(a, Ty::Named(b));
        types.set(b, Ty::Struct(vec![]));
        assert_eq!(types.shape(&Ty::Named(a)), Some(TypeShape::Struct));
    }

    #[test]
    fn test_cycles_are_unresolved() {
        let mut index = SymbolIndex::new();
        let mut types = TypeTable::new();
        let a = add(&mut index, "A", SymbolKind::TypeName);
        let b = add(&mut index, "B", SymbolKind::TypeName);
        types.set(a, Ty::Named(b));
        types.set(b, Ty::Named(a));
        assert_eq!(types.shape(&Ty::Named(a)), None);
    }

    #[test]
    fn test_member_lookup_through_pointer_and_embedding() {
        let mut index = SymbolIndex::new();
        let mut types = TypeTable::new();
        let base = add(&mut index, "Base", SymbolKind::TypeName);
        let id_field = add(&mut index, "ID", SymbolKind::Field);
        let outer = add(&mut index, "Outer", SymbolKind::TypeName);
        let embedded = add(&mut index, "Base", SymbolKind::Field);
        let method = add(&mut index, "Save", SymbolKind::Function);

        types.set(base, Ty::Struct(vec![id_field]));
        types.set(embedded, Ty::Pointer(Box::new(Ty::Named(base))));
        types.mark_embedded(embedded);
        types.set(outer, Ty::Struct(vec![embedded]));
        types.add_method(base, method);

        let value = Ty::Pointer(Box::new(Ty::Named(outer)));
        assert_eq!(types.member(&value, "ID", &index), Some(id_field));
        assert_eq!(types.member(&value, "Save", &index), Some(method));
        assert_eq!(types.member(&value, "Base", &index), Some(embedded));
        assert_eq!(types.member(&value, "Missing", &index), None);
    }
}

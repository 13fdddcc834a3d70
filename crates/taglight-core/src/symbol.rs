//! Resolved symbols and identifier occurrences
//!
//! A [`SymbolIndex`] is what a [`Resolver`](crate::Resolver) hands back: a
//! table of declarations plus every identifier occurrence that refers to one.

use std::collections::HashMap;

/// Index of a symbol inside a [`SymbolIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// What kind of declaration a symbol is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A constant (`const`, `true`, `iota`, ...)
    Constant,
    /// A function or method
    Function,
    /// A named type or type parameter
    TypeName,
    /// A variable or parameter
    Variable,
    /// A struct field
    Field,
    /// An imported package name
    PackageAlias,
    /// Anything else: builtins, `nil`, labels
    Other,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Constant => "constant",
            SymbolKind::Function => "function",
            SymbolKind::TypeName => "type",
            SymbolKind::Variable => "variable",
            SymbolKind::Field => "field",
            SymbolKind::PackageAlias => "package",
            SymbolKind::Other => "other",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scope a symbol was declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclScope {
    /// Predeclared by the language
    Universe,
    /// Top level of the package
    Package,
    /// File scope (imports)
    File,
    /// Any function, block or statement scope
    Local,
    /// No enclosing scope at all: methods, interface methods, struct fields
    Member,
}

/// Shape of a type once all names are expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Interface,
    Struct,
    Signature,
    Other,
}

/// A resolved declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub scope: DeclScope,
    /// Underlying shape of the symbol's type, `None` if it could not be resolved
    pub shape: Option<TypeShape>,
}

impl Symbol {
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        scope: DeclScope,
        shape: Option<TypeShape>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            scope,
            shape,
        }
    }
}

/// Whether an occurrence introduces its symbol or refers to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Definition,
    Use,
}

/// One textual appearance of an identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Index of the file in the batch that was resolved
    pub file: usize,
    /// Byte offset of the first byte of the name
    pub start: usize,
    /// Length of the name in bytes
    pub len: usize,
    pub name: String,
    pub role: Role,
    pub symbol: SymbolId,
}

/// Symbols and the occurrences that refer to them
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    symbols: Vec<Symbol>,
    occurrences: Vec<Occurrence>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol and return its id
    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub(crate) fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.0 as usize)
    }

    /// Record an occurrence of an existing symbol
    pub fn record(&mut self, occurrence: Occurrence) {
        debug_assert!((occurrence.symbol.0 as usize) < self.symbols.len());
        self.occurrences.push(occurrence);
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// Definitions only
    pub fn definitions(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences
            .iter()
            .filter(|o| o.role == Role::Definition)
    }

    /// Uses only
    pub fn uses(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences.iter().filter(|o| o.role == Role::Use)
    }

    /// Occurrences that fall in the given file, paired with their symbol
    pub fn in_file(&self, file: usize) -> impl Iterator<Item = (&Occurrence, &Symbol)> {
        self.occurrences
            .iter()
            .filter(move |o| o.file == file)
            .filter_map(|o| self.symbol(o.symbol).map(|s| (o, s)))
    }

    /// Count of occurrences per symbol kind
    pub fn kind_histogram(&self) -> HashMap<SymbolKind, usize> {
        let mut counts = HashMap::new();
        for occurrence in &self.occurrences {
            if let Some(symbol) = self.symbol(occurrence.symbol) {
                *counts.entry(symbol.kind).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }
}

//! Mapping resolved symbols to highlight tag kinds

use crate::symbol::{DeclScope, Symbol, SymbolKind, TypeShape};

/// The highlight category of an identifier occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagKind {
    Constant,
    Function,
    Interface,
    Field,
    PackageName,
    Struct,
    TypeName,
    Variable,
    Method,
}

impl TagKind {
    /// All kinds, in wire-character order
    pub const ALL: [TagKind; 9] = [
        TagKind::Constant,
        TagKind::Function,
        TagKind::Interface,
        TagKind::Field,
        TagKind::PackageName,
        TagKind::Struct,
        TagKind::TypeName,
        TagKind::Variable,
        TagKind::Method,
    ];

    /// The single character used for this kind on the wire
    pub fn as_char(&self) -> char {
        match self {
            TagKind::Constant => 'c',
            TagKind::Function => 'f',
            TagKind::Interface => 'i',
            TagKind::Field => 'm',
            TagKind::PackageName => 'p',
            TagKind::Struct => 's',
            TagKind::TypeName => 't',
            TagKind::Variable => 'v',
            TagKind::Method => 'F',
        }
    }

    /// Parse a wire character
    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_char() == c)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::Constant => "constant",
            TagKind::Function => "function",
            TagKind::Interface => "interface",
            TagKind::Field => "field",
            TagKind::PackageName => "package-name",
            TagKind::Struct => "struct",
            TagKind::TypeName => "type-name",
            TagKind::Variable => "variable",
            TagKind::Method => "method",
        }
    }
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a symbol. First matching rule wins; `None` means the
/// occurrence is not reported.
///
/// Local variables are never tagged: only names that matter across a file
/// (globals, fields, types, callables) are reported.
pub fn classify(symbol: &Symbol) -> Option<TagKind> {
    match symbol.kind {
        SymbolKind::Constant => Some(TagKind::Constant),
        SymbolKind::Function if symbol.scope == DeclScope::Member => Some(TagKind::Method),
        SymbolKind::Function => Some(TagKind::Function),
        SymbolKind::PackageAlias => Some(TagKind::PackageName),
        SymbolKind::TypeName => match symbol.shape? {
            TypeShape::Interface => Some(TagKind::Interface),
            TypeShape::Struct => Some(TagKind::Struct),
            TypeShape::Signature | TypeShape::Other => Some(TagKind::TypeName),
        },
        SymbolKind::Field => Some(TagKind::Field),
        SymbolKind::Variable => {
            if symbol.shape == Some(TypeShape::Signature) {
                Some(TagKind::Function)
            } else if symbol.scope == DeclScope::Package {
                Some(TagKind::Variable)
            } else {
                None
            }
        }
        SymbolKind::Other => None,
    }
}

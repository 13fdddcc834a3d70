//! Name resolution
//!
//! A [`Resolver`] turns the parsed files of one package into a
//! [`SymbolIndex`]. The only implementation shipped is [`GoResolver`], a
//! best-effort scope resolver working directly on tree-sitter trees. It
//! needs no compiler, tolerates syntax errors and never fails outright:
//! whatever it cannot resolve ends up as a [`Diagnostic`].

mod go;
mod scope;
mod types;
mod universe;

pub use go::GoResolver;

use crate::parse::ParsedFile;
use crate::position::Position;
use crate::symbol::SymbolIndex;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use tracing::{debug, error, warn};

/// What a diagnostic is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The parser had to skip or insert tokens
    Syntax,
    /// A name with no visible declaration
    Undeclared,
    /// A second declaration of a name in the same scope
    Redeclared,
    /// A subtree nested too deeply to resolve
    TooDeep,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Syntax => "syntax",
            DiagnosticKind::Undeclared => "undeclared",
            DiagnosticKind::Redeclared => "redeclared",
            DiagnosticKind::TooDeep => "too-deep",
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem found while resolving. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub offset: usize,
    /// 1-based position of `offset`, when it maps into the file
    pub position: Option<Position>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(pos) => write!(
                f,
                "{}:{}:{}: {}",
                self.path.display(),
                pos.line,
                pos.column,
                self.message
            ),
            None => write!(f, "{}@{}: {}", self.path.display(), self.offset, self.message),
        }
    }
}

/// Output of one resolver run
#[derive(Debug, Default)]
pub struct Resolution {
    pub index: SymbolIndex,
    pub diagnostics: Vec<Diagnostic>,
}

/// Semantic analysis of one package.
///
/// `files` are all files of the package; occurrence file indices in the
/// returned index point into this slice.
pub trait Resolver {
    fn resolve(&mut self, files: &[&ParsedFile]) -> Resolution;
}

/// Run `resolver` over a package, logging its diagnostics.
///
/// A resolver that panics is treated like one that resolved nothing: the
/// error is logged and an empty index comes back, so a single bad buffer
/// cannot take the process down.
pub fn resolve_package(resolver: &mut dyn Resolver, files: &[&ParsedFile]) -> SymbolIndex {
    let resolution = match catch_unwind(AssertUnwindSafe(|| resolver.resolve(files))) {
        Ok(resolution) => resolution,
        Err(_) => {
            error!("resolver panicked on a package of {} files", files.len());
            return SymbolIndex::new();
        }
    };

    for diagnostic in &resolution.diagnostics {
        warn!("{} ({})", diagnostic, diagnostic.kind);
    }
    let mut kinds: Vec<_> = resolution.index.kind_histogram().into_iter().collect();
    kinds.sort_by_key(|(kind, _)| kind.as_str());
    let kinds: Vec<String> = kinds
        .into_iter()
        .map(|(kind, count)| format!("{kind}={count}"))
        .collect();
    debug!(
        "resolved {} occurrences of {} symbols ({}), {} diagnostics",
        resolution.index.len(),
        resolution.index.symbols().len(),
        kinds.join(" "),
        resolution.diagnostics.len()
    );
    resolution.index
}

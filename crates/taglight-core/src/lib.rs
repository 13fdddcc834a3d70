//! taglight-core - Semantic identifier tagging for Go sources
//!
//! This crate provides the building blocks for:
//! - Discovering and parsing the Go files of a package directory
//! - Keeping a per-project cache of parsed files, with the file being
//!   edited merged in on every update
//! - Resolving identifiers to declarations with a [`Resolver`]
//! - Classifying resolved symbols into tag kinds and mapping them to
//!   line/column positions
//!
//! # Features
//!
//! - `parallel` - Parse discovered files in parallel (brings in `rayon`)
//!
//! # Tagging a Buffer
//!
//! ```
//! use std::path::Path;
//! use taglight_core::{GoResolver, MemorySources, Project, resolve_package, tag_file};
//!
//! let mut project = Project::load(
//!     "/proj",
//!     MemorySources::new().add("/proj/a.go", "package p\n"),
//! ).unwrap();
//!
//! let path = Path::new("/proj/a.go");
//! let package = project
//!     .merge_active_file(path, b"package p\nconst X = 1\n".to_vec())
//!     .unwrap();
//! let files = package.files();
//! let active = package.file_index(path).unwrap();
//!
//! let index = resolve_package(&mut GoResolver::new(), &files);
//! let records = tag_file(&index, active, &files[active].lines);
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].kind.as_char(), 'c');
//! assert_eq!(records[0].name, "X");
//! ```

mod cache;
mod classify;
mod parse;
mod position;
mod resolve;
mod sources;
mod symbol;
mod tags;

pub use cache::{CacheError, Package, PackageLookupError, Project, lookup_package};
pub use classify::{TagKind, classify};
pub use parse::{GoParser, ParseError, ParsedFile, SyntaxError};
pub use position::{LineIndex, Position, PositionRange};
pub use resolve::{
    Diagnostic, DiagnosticKind, GoResolver, Resolution, Resolver, resolve_package,
};
pub use sources::{DirSources, GO_EXTENSION, MemorySources, SourceSet, Sources, is_go_file};
pub use symbol::{
    DeclScope, Occurrence, Role, Symbol, SymbolId, SymbolIndex, SymbolKind, TypeShape,
};
pub use tags::{TagRecord, is_safe_name, tag_file, tag_occurrence};

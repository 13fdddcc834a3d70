//! Go parsing on top of tree-sitter
//!
//! Parsing is error tolerant: a file with syntax errors still produces a
//! tree, and everything before (and often after) the error is usable.

use crate::position::LineIndex;
use arborium::tree_sitter::{Node, Parser, Tree};
use std::path::{Path, PathBuf};

/// Errors from setting up or running the parser
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to load Go grammar: {0}")]
    Grammar(String),

    #[error("parser produced no tree for {}", .0.display())]
    NoTree(PathBuf),
}

/// A syntax error region found in a parsed tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Byte offset where the error region starts
    pub offset: usize,
    /// `true` if the parser inserted a missing token, `false` for skipped input
    pub missing: bool,
    /// Kind of the offending node
    pub node_kind: String,
}

/// One Go source file together with its syntax tree
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub source: Vec<u8>,
    pub tree: Tree,
    /// Line start table, the file's position records
    pub lines: LineIndex,
    /// Name from the `package` clause, if it parsed
    pub package_name: Option<String>,
}

impl ParsedFile {
    /// Whether the tree contains any error or missing nodes
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// All syntax error regions, outermost only
    pub fn syntax_errors(&self) -> Vec<SyntaxError> {
        let mut errors = Vec::new();
        if self.has_errors() {
            collect_errors(self.tree.root_node(), &mut errors);
        }
        errors
    }

    /// Text of a node in this file, if it is valid UTF-8
    pub fn text(&self, node: Node) -> Option<&str> {
        node.utf8_text(&self.source).ok()
    }

    /// File name without extension
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }
}

fn collect_errors(root: Node, errors: &mut Vec<SyntaxError>) {
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        if node.is_error() || node.is_missing() {
            errors.push(SyntaxError {
                offset: node.start_byte(),
                missing: node.is_missing(),
                node_kind: node.kind().to_string(),
            });
            continue;
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        pending.extend(children.into_iter().rev());
    }
}

/// Reusable Go parser
pub struct GoParser {
    parser: Parser,
}

impl std::fmt::Debug for GoParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoParser").finish_non_exhaustive()
    }
}

impl GoParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&arborium_go::language().into())
            .map_err(|e| ParseError::Grammar(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse `source` as the file at `path`. Always a full parse.
    pub fn parse(&mut self, path: &Path, source: Vec<u8>) -> Result<ParsedFile, ParseError> {
        let tree = self
            .parser
            .parse(&source, None)
            .ok_or_else(|| ParseError::NoTree(path.to_path_buf()))?;
        let package_name = package_name(tree.root_node(), &source);
        let lines = LineIndex::new(&source);
        Ok(ParsedFile {
            path: path.to_path_buf(),
            source,
            tree,
            lines,
            package_name,
        })
    }
}

/// Read the package clause of a Go source file
fn package_name(root: Node, source: &[u8]) -> Option<String> {
    let mut cursor = root.walk();
    let clause = root
        .named_children(&mut cursor)
        .find(|n| n.kind() == "package_clause")?;
    let mut cursor = clause.walk();
    let ident = clause
        .named_children(&mut cursor)
        .find(|n| n.kind() == "package_identifier")?;
    let name = ident.utf8_text(source).ok()?;
    (!name.is_empty()).then(|| name.to_string())
}

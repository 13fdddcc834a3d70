//! Scope resolver for Go syntax trees
//!
//! Resolution runs in passes over all files of a package:
//!
//! 1. imports go into each file's scope, package-level declarations into
//!    the package scope
//! 2. package-level types, functions and methods get their types, so
//!    method sets are complete before anything is looked up
//! 3. package-level constants and variables get their types, inferred from
//!    their values where no type is written
//! 4. every tree is walked, opening local scopes as blocks open, recording
//!    one occurrence per identifier that resolves
//!
//! Symbols created ahead of the walk are remembered by the position of
//! their name, so the walk picks the same symbol up when it gets there.

use super::scope::{ScopeId, Scopes};
use super::types::{Ty, TypeTable};
use super::universe;
use super::{Diagnostic, DiagnosticKind, Resolution, Resolver};
use crate::parse::ParsedFile;
use crate::symbol::{
    DeclScope, Occurrence, Role, Symbol, SymbolId, SymbolIndex, SymbolKind, TypeShape,
};
use arborium::tree_sitter::Node;
use std::collections::HashMap;

const TYPE_SPECS: &[&str] = &["type_spec", "type_alias"];

/// How deep walks and type lookups may nest before the subtree is skipped
const MAX_NESTING: usize = 128;

/// Best-effort resolver for Go.
///
/// Works on syntax alone: imported packages are never loaded, so anything
/// selected from an import stays unresolved, and only as much type
/// information is tracked as selector lookup needs.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoResolver;

impl GoResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Resolver for GoResolver {
    fn resolve(&mut self, files: &[&ParsedFile]) -> Resolution {
        let mut walker = Walker::new(files);
        walker.run();
        walker.finish()
    }
}

struct Walker<'a> {
    files: &'a [&'a ParsedFile],
    /// File currently being processed
    file: usize,
    index: SymbolIndex,
    types: TypeTable,
    scopes: Scopes,
    package_scope: ScopeId,
    file_scopes: Vec<ScopeId>,
    /// Symbols by (file, start byte of the declaring name)
    decls: HashMap<(usize, usize), SymbolId>,
    diagnostics: Vec<Diagnostic>,
    /// Current nesting of `walk`, `type_of` and `expr_ty`
    depth: usize,
    /// Files already diagnosed as nested too deeply
    too_deep: Vec<usize>,
}

impl<'a> Walker<'a> {
    fn new(files: &'a [&'a ParsedFile]) -> Self {
        let mut index = SymbolIndex::new();
        let mut types = TypeTable::new();
        let mut scopes = Scopes::new();
        let universe = scopes.root();
        universe::populate(&mut index, &mut types, &mut scopes, universe);
        let package_scope = scopes.child(universe);
        Self {
            files,
            file: 0,
            index,
            types,
            scopes,
            package_scope,
            file_scopes: Vec::new(),
            decls: HashMap::new(),
            diagnostics: Vec::new(),
            depth: 0,
            too_deep: Vec::new(),
        }
    }

    fn run(&mut self) {
        for file in 0..self.files.len() {
            self.file = file;
            for error in self.files[file].syntax_errors() {
                let message = if error.missing {
                    format!("missing {}", error.node_kind)
                } else {
                    "syntax error".to_string()
                };
                self.diagnostic(error.offset, DiagnosticKind::Syntax, message);
            }
            let scope = self.scopes.child(self.package_scope);
            self.file_scopes.push(scope);
            self.declare_imports(scope);
        }

        self.each_file(Self::declare_package_level);
        self.each_file(|w| w.type_package_level(false));
        self.each_file(|w| w.type_package_level(true));
        self.each_file(|w| {
            let scope = w.file_scopes[w.file];
            for node in named_children(w.root()) {
                w.walk(node, scope);
            }
        });
    }

    fn finish(mut self) -> Resolution {
        for i in 0..self.index.symbols().len() {
            let id = SymbolId(i as u32);
            let Some(kind) = self.kind_of(id) else {
                continue;
            };
            let shape = match kind {
                SymbolKind::TypeName => self.types.shape(&Ty::Named(id)),
                SymbolKind::Function => Some(TypeShape::Signature),
                SymbolKind::Variable | SymbolKind::Field | SymbolKind::Constant => {
                    self.types.get(id).and_then(|ty| self.types.shape(ty))
                }
                SymbolKind::PackageAlias | SymbolKind::Other => None,
            };
            if let Some(symbol) = self.index.symbol_mut(id) {
                symbol.shape = shape;
            }
        }
        Resolution {
            index: self.index,
            diagnostics: self.diagnostics,
        }
    }

    fn each_file(&mut self, mut pass: impl FnMut(&mut Self)) {
        for file in 0..self.files.len() {
            self.file = file;
            pass(self);
        }
    }

    fn root(&self) -> Node<'a> {
        let file: &'a ParsedFile = self.files[self.file];
        file.tree.root_node()
    }

    fn text(&self, node: Node<'a>) -> Option<&'a str> {
        let file: &'a ParsedFile = self.files[self.file];
        node.utf8_text(&file.source).ok()
    }

    fn kind_of(&self, id: SymbolId) -> Option<SymbolKind> {
        self.index.symbol(id).map(|s| s.kind)
    }

    fn decl_id(&self, name: Node<'a>) -> Option<SymbolId> {
        self.decls.get(&(self.file, name.start_byte())).copied()
    }

    fn diagnostic(&mut self, offset: usize, kind: DiagnosticKind, message: String) {
        let file = self.files[self.file];
        self.diagnostics.push(Diagnostic {
            path: file.path.clone(),
            offset,
            position: file.lines.position(offset),
            kind,
            message,
        });
    }

    /// Step one level deeper, or report the file once and refuse
    fn nest(&mut self, node: Node<'a>) -> bool {
        if self.depth < MAX_NESTING {
            self.depth += 1;
            return true;
        }
        if !self.too_deep.contains(&self.file) {
            self.too_deep.push(self.file);
            self.diagnostic(
                node.start_byte(),
                DiagnosticKind::TooDeep,
                format!("nested more than {MAX_NESTING} levels deep, skipped"),
            );
        }
        false
    }

    fn unnest(&mut self) {
        self.depth -= 1;
    }

    // ---- symbols and scopes ----

    /// The symbol declared by `name`, created on first call
    fn memo_symbol(
        &mut self,
        name: Node<'a>,
        kind: SymbolKind,
        scope: DeclScope,
    ) -> Option<(SymbolId, bool)> {
        let key = (self.file, name.start_byte());
        if let Some(id) = self.decls.get(&key) {
            return Some((*id, false));
        }
        let text = self.text(name)?;
        if text.is_empty() || text == "_" {
            return None;
        }
        let id = self.index.add_symbol(Symbol::new(text, kind, scope, None));
        self.decls.insert(key, id);
        Some((id, true))
    }

    fn define(&mut self, scope: ScopeId, offset: usize, name: &str, id: SymbolId) {
        if self.scopes.define(scope, name, id).is_err() {
            self.diagnostic(
                offset,
                DiagnosticKind::Redeclared,
                format!("{name} redeclared in this block"),
            );
        }
    }

    fn define_node(&mut self, scope: ScopeId, name: Node<'a>, id: SymbolId) {
        if let Some(text) = self.text(name) {
            self.define(scope, name.start_byte(), text, id);
        }
    }

    fn declare_in(
        &mut self,
        scope: ScopeId,
        name: Node<'a>,
        kind: SymbolKind,
        decl_scope: DeclScope,
    ) -> Option<SymbolId> {
        let (id, _) = self.memo_symbol(name, kind, decl_scope)?;
        self.define_node(scope, name, id);
        Some(id)
    }

    /// Declare a local and record its definition
    fn declare_local(
        &mut self,
        name: Node<'a>,
        kind: SymbolKind,
        scope: ScopeId,
        ty: Option<Ty>,
    ) -> Option<SymbolId> {
        let (id, created) = self.memo_symbol(name, kind, DeclScope::Local)?;
        if created && let Some(ty) = ty {
            self.types.set(id, ty);
        }
        self.define_node(scope, name, id);
        self.record(name, id, Role::Definition);
        Some(id)
    }

    fn record(&mut self, node: Node<'a>, symbol: SymbolId, role: Role) {
        let Some(name) = self.text(node) else {
            return;
        };
        if name.is_empty() || name == "_" {
            return;
        }
        self.index.record(Occurrence {
            file: self.file,
            start: node.start_byte(),
            len: name.len(),
            name: name.to_string(),
            role,
            symbol,
        });
    }

    /// Record the definition of a symbol created ahead of the walk
    fn record_decl(&mut self, name: Node<'a>) -> Option<SymbolId> {
        let id = self.decl_id(name)?;
        self.record(name, id, Role::Definition);
        Some(id)
    }

    fn resolve_use(&mut self, node: Node<'a>, scope: ScopeId) {
        let Some(name) = self.text(node) else {
            return;
        };
        if name.is_empty() || name == "_" {
            return;
        }
        match self.scopes.lookup(scope, name) {
            Some(id) => self.record(node, id, Role::Use),
            None => self.diagnostic(
                node.start_byte(),
                DiagnosticKind::Undeclared,
                format!("undeclared name: {name}"),
            ),
        }
    }

    // ---- declaration passes ----

    fn declare_imports(&mut self, scope: ScopeId) {
        let imports = named_children(self.root())
            .into_iter()
            .filter(|n| n.kind() == "import_declaration");
        for decl in imports {
            for spec in specs(decl, &["import_spec"]) {
                let Some(path) = spec.child_by_field_name("path").and_then(|p| self.text(p)) else {
                    continue;
                };
                let path = path.trim_matches(|c| c == '"' || c == '`');
                match spec.child_by_field_name("name") {
                    Some(name) if name.kind() == "package_identifier" => {
                        self.declare_in(scope, name, SymbolKind::PackageAlias, DeclScope::File);
                    }
                    // dot and blank imports bind no name
                    Some(_) => {}
                    None => {
                        let alias = import_name(path);
                        let id = self.index.add_symbol(Symbol::new(
                            alias,
                            SymbolKind::PackageAlias,
                            DeclScope::File,
                            None,
                        ));
                        self.define(scope, spec.start_byte(), alias, id);
                    }
                }
            }
        }
    }

    fn declare_package_level(&mut self) {
        let package = self.package_scope;
        for decl in named_children(self.root()) {
            match decl.kind() {
                "function_declaration" => {
                    let Some(name) = decl.child_by_field_name("name") else {
                        continue;
                    };
                    // any number of init functions may exist and none is visible
                    if self.text(name) == Some("init") {
                        self.memo_symbol(name, SymbolKind::Function, DeclScope::Package);
                    } else {
                        self.declare_in(package, name, SymbolKind::Function, DeclScope::Package);
                    }
                }
                "method_declaration" => {
                    if let Some(name) = decl.child_by_field_name("name") {
                        self.memo_symbol(name, SymbolKind::Function, DeclScope::Member);
                    }
                }
                "type_declaration" => {
                    for spec in specs(decl, TYPE_SPECS) {
                        if let Some(name) = spec.child_by_field_name("name") {
                            self.declare_in(package, name, SymbolKind::TypeName, DeclScope::Package);
                        }
                    }
                }
                "const_declaration" | "var_declaration" => {
                    let kind = if decl.kind() == "const_declaration" {
                        SymbolKind::Constant
                    } else {
                        SymbolKind::Variable
                    };
                    for spec in specs(decl, &["const_spec", "var_spec"]) {
                        for name in field_children(spec, "name") {
                            self.declare_in(package, name, kind, DeclScope::Package);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Attach types to package-level declarations. Run once for type-like
    /// declarations, then once more for values, whose inferred types may
    /// depend on function results.
    fn type_package_level(&mut self, values: bool) {
        let scope = self.file_scopes[self.file];
        for decl in named_children(self.root()) {
            match (decl.kind(), values) {
                ("type_declaration", false) => {
                    for spec in specs(decl, TYPE_SPECS) {
                        let Some(id) = spec.child_by_field_name("name").and_then(|n| self.decl_id(n))
                        else {
                            continue;
                        };
                        let inner = self.type_params(spec, scope, false);
                        let ty = spec
                            .child_by_field_name("type")
                            .map_or(Ty::Opaque, |t| self.type_of(t, inner));
                        self.types.set(id, ty);
                    }
                }
                ("function_declaration", false) => {
                    let Some(id) = decl.child_by_field_name("name").and_then(|n| self.decl_id(n))
                    else {
                        continue;
                    };
                    let inner = self.type_params(decl, scope, false);
                    let results = self.results(decl, inner);
                    self.types.set(id, Ty::Func(results));
                }
                ("method_declaration", false) => {
                    let Some(id) = decl.child_by_field_name("name").and_then(|n| self.decl_id(n))
                    else {
                        continue;
                    };
                    let results = self.results(decl, scope);
                    self.types.set(id, Ty::Func(results));
                    if let Some(receiver) = self.receiver_base(decl, scope) {
                        self.types.add_method(receiver, id);
                    }
                }
                ("const_declaration" | "var_declaration", true) => {
                    for spec in specs(decl, &["const_spec", "var_spec"]) {
                        let names = field_children(spec, "name");
                        let values = spec
                            .child_by_field_name("value")
                            .map(expressions)
                            .unwrap_or_default();
                        let tys = self.spec_types(spec, &values, names.len(), scope);
                        for (name, ty) in names.into_iter().zip(tys) {
                            if let (Some(id), Some(ty)) = (self.decl_id(name), ty) {
                                self.types.set(id, ty);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Named type a method is declared on
    fn receiver_base(&self, decl: Node<'a>, scope: ScopeId) -> Option<SymbolId> {
        let receiver = decl.child_by_field_name("receiver")?;
        let param = named_children(receiver)
            .into_iter()
            .find(|n| n.kind() == "parameter_declaration")?;
        let ty = strip_pointer(param.child_by_field_name("type")?);
        let ident = if ty.kind() == "generic_type" {
            ty.child_by_field_name("type")?
        } else {
            ty
        };
        let id = self.scopes.lookup(scope, self.text(ident)?)?;
        (self.kind_of(id) == Some(SymbolKind::TypeName)).then_some(id)
    }

    /// Open a scope holding the type parameters of `node`, if it has any.
    /// A type parameter is typed by its constraint, always an interface.
    fn type_params(&mut self, node: Node<'a>, scope: ScopeId, record: bool) -> ScopeId {
        let Some(list) = node.child_by_field_name("type_parameters") else {
            return scope;
        };
        let inner = self.scopes.child(scope);
        for decl in named_children(list) {
            if decl.kind() != "type_parameter_declaration" {
                continue;
            }
            let created: Vec<SymbolId> = field_children(decl, "name")
                .into_iter()
                .filter_map(|name| self.declare_type_param(name, inner, record))
                .collect();
            let constraint = decl.child_by_field_name("type");
            if !created.is_empty() {
                let bound = constraint
                    .map_or(Ty::Interface(Vec::new()), |c| self.constraint_ty(c, inner));
                for id in created {
                    self.types.set(id, bound.clone());
                }
            }
            if record && let Some(constraint) = constraint {
                self.walk(constraint, inner);
            }
        }
        inner
    }

    /// Declare a type parameter, returning it when this call created it
    fn declare_type_param(
        &mut self,
        name: Node<'a>,
        scope: ScopeId,
        record: bool,
    ) -> Option<SymbolId> {
        let (id, created) = self.memo_symbol(name, SymbolKind::TypeName, DeclScope::Local)?;
        if created {
            self.types.set(id, Ty::Interface(Vec::new()));
        }
        self.define_node(scope, name, id);
        if record {
            self.record(name, id, Role::Definition);
        }
        created.then_some(id)
    }

    /// Interface a constraint stands for; unions and `~T` terms give the
    /// empty interface
    fn constraint_ty(&mut self, node: Node<'a>, scope: ScopeId) -> Ty {
        let ty = self.type_of(node, scope);
        if matches!(self.types.structural(&ty), Some(Ty::Interface(_))) {
            ty
        } else {
            Ty::Interface(Vec::new())
        }
    }

    // ---- types ----

    /// Type denoted by a type expression
    fn type_of(&mut self, node: Node<'a>, scope: ScopeId) -> Ty {
        if !self.nest(node) {
            return Ty::Opaque;
        }
        let ty = self.type_of_node(node, scope);
        self.unnest();
        ty
    }

    fn type_of_node(&mut self, node: Node<'a>, scope: ScopeId) -> Ty {
        let first = |node: Node<'a>| first_named(node);
        match node.kind() {
            "type_identifier" | "identifier" => {
                match self.text(node).and_then(|t| self.scopes.lookup(scope, t)) {
                    Some(id) if self.kind_of(id) == Some(SymbolKind::TypeName) => Ty::Named(id),
                    _ => Ty::Opaque,
                }
            }
            "generic_type" => node
                .child_by_field_name("type")
                .map_or(Ty::Opaque, |t| self.type_of(t, scope)),
            "parenthesized_type" => first(node).map_or(Ty::Opaque, |t| self.type_of(t, scope)),
            "type_constraint" | "type_elem" => match named_children(node).as_slice() {
                [only] => self.type_of(*only, scope),
                _ => Ty::Opaque,
            },
            "pointer_type" => {
                let target = first(node).map_or(Ty::Opaque, |t| self.type_of(t, scope));
                Ty::Pointer(Box::new(target))
            }
            "slice_type" | "array_type" | "implicit_length_array_type" => {
                let elem = node
                    .child_by_field_name("element")
                    .map_or(Ty::Opaque, |t| self.type_of(t, scope));
                Ty::Slice(Box::new(elem))
            }
            "map_type" | "channel_type" => {
                let value = node
                    .child_by_field_name("value")
                    .map_or(Ty::Opaque, |t| self.type_of(t, scope));
                if node.kind() == "map_type" {
                    Ty::Map(Box::new(value))
                } else {
                    Ty::Chan(Box::new(value))
                }
            }
            "struct_type" => Ty::Struct(self.struct_fields(node, scope)),
            "interface_type" => Ty::Interface(self.interface_methods(node, scope)),
            "function_type" => Ty::Func(self.results(node, scope)),
            _ => Ty::Opaque,
        }
    }

    /// Result types of a function-like node
    fn results(&mut self, node: Node<'a>, scope: ScopeId) -> Vec<Ty> {
        let Some(result) = node.child_by_field_name("result") else {
            return Vec::new();
        };
        if result.kind() != "parameter_list" {
            return vec![self.type_of(result, scope)];
        }
        let mut results = Vec::new();
        for decl in named_children(result) {
            if !matches!(
                decl.kind(),
                "parameter_declaration" | "variadic_parameter_declaration"
            ) {
                continue;
            }
            let ty = decl
                .child_by_field_name("type")
                .map_or(Ty::Opaque, |t| self.type_of(t, scope));
            let count = field_children(decl, "name").len().max(1);
            results.extend(std::iter::repeat_n(ty, count));
        }
        results
    }

    fn struct_fields(&mut self, node: Node<'a>, scope: ScopeId) -> Vec<SymbolId> {
        let mut fields = Vec::new();
        for decl in field_declarations(node) {
            let ty_node = decl.child_by_field_name("type");
            let names = field_children(decl, "name");
            if names.is_empty() {
                let Some(ty_node) = ty_node else {
                    continue;
                };
                let Some(name) = embedded_name(ty_node) else {
                    continue;
                };
                let Some((id, created)) =
                    self.memo_symbol(name, SymbolKind::Field, DeclScope::Member)
                else {
                    continue;
                };
                if created {
                    let mut ty = self.type_of(ty_node, scope);
                    if has_token(decl, "*") {
                        ty = Ty::Pointer(Box::new(ty));
                    }
                    self.types.set(id, ty);
                    self.types.mark_embedded(id);
                }
                fields.push(id);
            } else {
                let ty = ty_node.map(|t| self.type_of(t, scope));
                for name in names {
                    let Some((id, created)) =
                        self.memo_symbol(name, SymbolKind::Field, DeclScope::Member)
                    else {
                        continue;
                    };
                    if created && let Some(ty) = &ty {
                        self.types.set(id, ty.clone());
                    }
                    fields.push(id);
                }
            }
        }
        fields
    }

    fn interface_methods(&mut self, node: Node<'a>, scope: ScopeId) -> Vec<SymbolId> {
        let mut methods = Vec::new();
        for elem in named_children(node) {
            if !matches!(elem.kind(), "method_elem" | "method_spec") {
                continue;
            }
            let Some(name) = elem.child_by_field_name("name") else {
                continue;
            };
            let Some((id, created)) =
                self.memo_symbol(name, SymbolKind::Function, DeclScope::Member)
            else {
                continue;
            };
            if created {
                let results = self.results(elem, scope);
                self.types.set(id, Ty::Func(results));
            }
            methods.push(id);
        }
        methods
    }

    /// Types for the names of a const or var spec
    fn spec_types(
        &mut self,
        spec: Node<'a>,
        values: &[Node<'a>],
        count: usize,
        scope: ScopeId,
    ) -> Vec<Option<Ty>> {
        match spec.child_by_field_name("type") {
            Some(ty) => vec![Some(self.type_of(ty, scope)); count],
            None => self.value_types(values, count, scope),
        }
    }

    /// Types of `count` names assigned from `values`
    fn value_types(&mut self, values: &[Node<'a>], count: usize, scope: ScopeId) -> Vec<Option<Ty>> {
        if let [value] = values
            && count > 1
        {
            let mut tys: Vec<Option<Ty>> = if value.kind() == "call_expression" {
                self.call_results(*value, scope).into_iter().map(Some).collect()
            } else {
                // comma-ok forms: map index, type assertion, receive
                vec![self.expr_ty(*value, scope), Some(Ty::Basic)]
            };
            tys.resize(count, None);
            return tys;
        }
        (0..count)
            .map(|i| values.get(i).and_then(|v| self.expr_ty(*v, scope)))
            .collect()
    }

    /// Type of an expression, where it can be worked out
    fn expr_ty(&mut self, node: Node<'a>, scope: ScopeId) -> Option<Ty> {
        if !self.nest(node) {
            return None;
        }
        let ty = self.expr_ty_node(node, scope);
        self.unnest();
        ty
    }

    fn expr_ty_node(&mut self, node: Node<'a>, scope: ScopeId) -> Option<Ty> {
        match node.kind() {
            "identifier" => {
                let id = self.scopes.lookup(scope, self.text(node)?)?;
                match self.kind_of(id)? {
                    SymbolKind::Variable
                    | SymbolKind::Constant
                    | SymbolKind::Field
                    | SymbolKind::Function => self.types.get(id).cloned(),
                    _ => None,
                }
            }
            "parenthesized_expression" => self.expr_ty(first_named(node)?, scope),
            "unary_expression" => {
                let inner = self.expr_ty(node.child_by_field_name("operand")?, scope)?;
                match node.child_by_field_name("operator").map(|o| o.kind()) {
                    Some("&") => Some(Ty::Pointer(Box::new(inner))),
                    Some("*") => match inner {
                        Ty::Pointer(target) => Some(*target),
                        _ => None,
                    },
                    Some("<-") => self.types.elem(&inner),
                    _ => Some(inner),
                }
            }
            "composite_literal" => Some(self.type_of(node.child_by_field_name("type")?, scope)),
            "func_literal" => Some(Ty::Func(self.results(node, scope))),
            "selector_expression" => {
                let id = self.selector_target(node, scope)?;
                self.types.get(id).cloned()
            }
            "call_expression" => self.call_results(node, scope).into_iter().next(),
            "index_expression" => {
                let operand = self.expr_ty(node.child_by_field_name("operand")?, scope)?;
                self.types.elem(&operand)
            }
            "slice_expression" => self.expr_ty(node.child_by_field_name("operand")?, scope),
            "type_assertion_expression" | "type_conversion_expression" => {
                Some(self.type_of(node.child_by_field_name("type")?, scope))
            }
            "interpreted_string_literal" | "raw_string_literal" | "int_literal"
            | "float_literal" | "imaginary_literal" | "rune_literal" | "true" | "false"
            | "binary_expression" => Some(Ty::Basic),
            _ => None,
        }
    }

    fn call_results(&mut self, node: Node<'a>, scope: ScopeId) -> Vec<Ty> {
        let Some(function) = node.child_by_field_name("function") else {
            return Vec::new();
        };
        let first_arg = node
            .child_by_field_name("arguments")
            .and_then(first_named);

        if function.kind() == "identifier" {
            let id = self
                .text(function)
                .and_then(|name| self.scopes.lookup(scope, name));
            if let Some(id) = id {
                match self.kind_of(id) {
                    // conversion
                    Some(SymbolKind::TypeName) => return vec![Ty::Named(id)],
                    Some(SymbolKind::Other) => {
                        let builtin = self.index.symbol(id).map(|s| s.name.clone());
                        return match (builtin.as_deref(), first_arg) {
                            (Some("new"), Some(arg)) => {
                                vec![Ty::Pointer(Box::new(self.type_of(arg, scope)))]
                            }
                            (Some("make"), Some(arg)) => vec![self.type_of(arg, scope)],
                            (Some("append"), Some(arg)) => {
                                self.expr_ty(arg, scope).into_iter().collect()
                            }
                            _ => vec![Ty::Basic],
                        };
                    }
                    _ => {}
                }
            }
        } else if is_type_node(function.kind()) {
            return vec![self.type_of(function, scope)];
        }

        let Some(ty) = self.expr_ty(function, scope) else {
            return Vec::new();
        };
        match self.types.structural(&ty) {
            Some(Ty::Func(results)) => results.clone(),
            _ => Vec::new(),
        }
    }

    /// Field or method a selector refers to. `None` for anything selected
    /// from an imported package.
    fn selector_target(&mut self, node: Node<'a>, scope: ScopeId) -> Option<SymbolId> {
        let operand = node.child_by_field_name("operand")?;
        let name = self.text(node.child_by_field_name("field")?)?;
        let ty = if operand.kind() == "identifier" {
            let id = self.scopes.lookup(scope, self.text(operand)?)?;
            match self.kind_of(id)? {
                SymbolKind::PackageAlias => return None,
                // method expression
                SymbolKind::TypeName => Ty::Named(id),
                _ => self.types.get(id)?.clone(),
            }
        } else {
            self.expr_ty(operand, scope)?
        };
        self.types.member(&ty, name, &self.index)
    }

    // ---- the walk ----

    /// Walk a subtree. Plain expression and statement nodes are expanded
    /// from a work list; only the nodes that open scopes or need their
    /// own handling nest.
    fn walk(&mut self, node: Node<'a>, scope: ScopeId) {
        if !self.nest(node) {
            return;
        }
        let mut pending = vec![(node, scope)];
        while let Some((node, scope)) = pending.pop() {
            if let Some(inner) = self.visit(node, scope) {
                let children = named_children(node);
                pending.extend(children.into_iter().rev().map(|child| (child, inner)));
            }
        }
        self.unnest();
    }

    /// Handle one node. Returns the scope its children are walked in when
    /// they are left to the caller.
    fn visit(&mut self, node: Node<'a>, scope: ScopeId) -> Option<ScopeId> {
        match node.kind() {
            "package_clause" | "comment" | "label_name" | "field_identifier"
            | "package_identifier" => {}
            "import_declaration" => {
                for spec in specs(node, &["import_spec"]) {
                    if let Some(name) = spec.child_by_field_name("name") {
                        self.record_decl(name);
                    }
                }
            }
            "identifier" | "type_identifier" => self.resolve_use(node, scope),
            "function_declaration" | "method_declaration" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.record_decl(name);
                }
                self.walk_signature(node, scope);
            }
            "func_literal" | "function_type" => self.walk_signature(node, scope),
            "type_declaration" => {
                for spec in specs(node, TYPE_SPECS) {
                    self.walk_type_spec(spec, scope);
                }
            }
            "const_declaration" => {
                for spec in specs(node, &["const_spec"]) {
                    self.walk_value_spec(spec, scope, SymbolKind::Constant);
                }
            }
            "var_declaration" => {
                for spec in specs(node, &["var_spec"]) {
                    self.walk_value_spec(spec, scope, SymbolKind::Variable);
                }
            }
            "short_var_declaration" => self.walk_short_var(node, scope),
            "range_clause" | "receive_statement" => {
                if !has_token(node, ":=") {
                    return Some(scope);
                }
                self.walk_short_var(node, scope);
            }
            "type_switch_statement" => self.walk_type_switch(node, scope),
            "block" | "if_statement" | "for_statement" | "expression_switch_statement"
            | "select_statement" | "expression_case" | "default_case" | "communication_case"
            | "type_case" => return Some(self.scopes.child(scope)),
            "selector_expression" => {
                if let Some(operand) = node.child_by_field_name("operand") {
                    self.walk(operand, scope);
                }
                if let Some(field) = node.child_by_field_name("field")
                    && let Some(id) = self.selector_target(node, scope)
                {
                    self.record(field, id, Role::Use);
                }
            }
            "qualified_type" => {
                if let Some(package) = node.child_by_field_name("package") {
                    self.resolve_use(package, scope);
                }
            }
            "composite_literal" => {
                let ty_node = node.child_by_field_name("type");
                if let Some(t) = ty_node {
                    self.walk(t, scope);
                }
                let ty = ty_node.map_or(Ty::Opaque, |t| self.type_of(t, scope));
                if let Some(body) = node.child_by_field_name("body") {
                    self.walk_literal(body, &ty, scope);
                }
            }
            "struct_type" => self.walk_struct(node, scope),
            "interface_type" => self.walk_interface(node, scope),
            _ => return Some(scope),
        }
        None
    }

    fn walk_children(&mut self, node: Node<'a>, scope: ScopeId) {
        for child in named_children(node) {
            self.walk(child, scope);
        }
    }

    /// Functions, methods, literals, function types and interface methods
    fn walk_signature(&mut self, node: Node<'a>, scope: ScopeId) {
        let inner = self.scopes.child(scope);
        let inner = self.type_params(node, inner, true);
        if let Some(receiver) = node.child_by_field_name("receiver") {
            self.walk_receiver(receiver, inner);
        }
        if let Some(params) = node.child_by_field_name("parameters") {
            self.walk_params(params, inner);
        }
        if let Some(result) = node.child_by_field_name("result") {
            if result.kind() == "parameter_list" {
                self.walk_params(result, inner);
            } else {
                self.walk(result, inner);
            }
        }
        // parameters and the outermost block share a scope
        if let Some(body) = node.child_by_field_name("body") {
            self.walk_children(body, inner);
        }
    }

    fn walk_params(&mut self, list: Node<'a>, scope: ScopeId) {
        for decl in named_children(list) {
            let variadic = decl.kind() == "variadic_parameter_declaration";
            if !variadic && decl.kind() != "parameter_declaration" {
                self.walk(decl, scope);
                continue;
            }
            let ty_node = decl.child_by_field_name("type");
            if let Some(t) = ty_node {
                self.walk(t, scope);
            }
            let mut ty = ty_node.map(|t| self.type_of(t, scope));
            if variadic {
                ty = ty.map(|t| Ty::Slice(Box::new(t)));
            }
            for name in field_children(decl, "name") {
                self.declare_local(name, SymbolKind::Variable, scope, ty.clone());
            }
        }
    }

    /// Receivers may name type parameters: `func (l *List[T]) Len() int`
    fn walk_receiver(&mut self, list: Node<'a>, scope: ScopeId) {
        for decl in named_children(list) {
            if decl.kind() != "parameter_declaration" {
                self.walk(decl, scope);
                continue;
            }
            let Some(ty_node) = decl.child_by_field_name("type") else {
                continue;
            };
            let base = strip_pointer(ty_node);
            if base.kind() == "generic_type" {
                if let Some(args) = base.child_by_field_name("type_arguments") {
                    for arg in named_children(args) {
                        let ident = if arg.kind() == "type_identifier" {
                            Some(arg)
                        } else {
                            named_children(arg)
                                .into_iter()
                                .find(|n| n.kind() == "type_identifier")
                        };
                        if let Some(ident) = ident {
                            self.declare_type_param(ident, scope, true);
                        }
                    }
                }
                if let Some(name) = base.child_by_field_name("type") {
                    self.resolve_use(name, scope);
                }
            } else {
                self.walk(ty_node, scope);
            }
            let ty = self.type_of(ty_node, scope);
            for name in field_children(decl, "name") {
                self.declare_local(name, SymbolKind::Variable, scope, Some(ty.clone()));
            }
        }
    }

    fn walk_type_spec(&mut self, spec: Node<'a>, scope: ScopeId) {
        let Some(name) = spec.child_by_field_name("name") else {
            self.walk_children(spec, scope);
            return;
        };
        // package-level types were typed before the walk; local ones are
        // declared before their definition so they can refer to themselves
        let local = match self.record_decl(name) {
            Some(_) => None,
            None => self.declare_local(name, SymbolKind::TypeName, scope, None),
        };
        let inner = self.type_params(spec, scope, true);
        if let Some(ty_node) = spec.child_by_field_name("type") {
            if let Some(id) = local {
                let ty = self.type_of(ty_node, inner);
                self.types.set(id, ty);
            }
            self.walk(ty_node, inner);
        }
    }

    fn walk_value_spec(&mut self, spec: Node<'a>, scope: ScopeId, kind: SymbolKind) {
        let names = field_children(spec, "name");
        if let Some(t) = spec.child_by_field_name("type") {
            self.walk(t, scope);
        }
        let values = spec
            .child_by_field_name("value")
            .map(expressions)
            .unwrap_or_default();
        for value in &values {
            self.walk(*value, scope);
        }

        let package_level = names.iter().all(|n| self.decl_id(*n).is_some());
        let tys = if package_level {
            Vec::new()
        } else {
            self.spec_types(spec, &values, names.len(), scope)
        };
        for (i, name) in names.into_iter().enumerate() {
            if self.record_decl(name).is_none() {
                let ty = tys.get(i).cloned().flatten();
                self.declare_local(name, kind, scope, ty);
            }
        }
    }

    /// `:=` in statements, range clauses and select cases. Only names new
    /// to the current scope are declared; the rest are assignments.
    fn walk_short_var(&mut self, node: Node<'a>, scope: ScopeId) {
        let right = node.child_by_field_name("right");
        let values = right.map(expressions).unwrap_or_default();
        for value in &values {
            self.walk(*value, scope);
        }

        let names = node
            .child_by_field_name("left")
            .map(expressions)
            .unwrap_or_default();
        let tys: Vec<Option<Ty>> = if node.kind() == "range_clause" {
            match right.and_then(|r| self.expr_ty(r, scope)) {
                Some(ty) => self.types.range_types(&ty).into_iter().map(Some).collect(),
                None => Vec::new(),
            }
        } else {
            self.value_types(&values, names.len(), scope)
        };

        for (i, name) in names.into_iter().enumerate() {
            if name.kind() != "identifier" {
                self.walk(name, scope);
                continue;
            }
            let Some(text) = self.text(name) else {
                continue;
            };
            if text == "_" {
                continue;
            }
            match self.scopes.lookup_local(scope, text) {
                Some(id) => self.record(name, id, Role::Use),
                None => {
                    let ty = tys.get(i).cloned().flatten();
                    self.declare_local(name, SymbolKind::Variable, scope, ty);
                }
            }
        }
    }

    /// Each clause of a type switch binds its own copy of the alias, typed
    /// by the clause's type when it lists exactly one.
    fn walk_type_switch(&mut self, node: Node<'a>, scope: ScopeId) {
        let outer = self.scopes.child(scope);
        if let Some(init) = node.child_by_field_name("initializer") {
            self.walk(init, outer);
        }
        let value = node.child_by_field_name("value");
        if let Some(value) = value {
            self.walk(value, outer);
        }
        let value_ty = value.and_then(|v| self.expr_ty(v, outer));
        let aliases = node
            .child_by_field_name("alias")
            .map(expressions)
            .unwrap_or_default();

        for case in named_children(node) {
            if !matches!(case.kind(), "type_case" | "default_case") {
                continue;
            }
            let inner = self.scopes.child(outer);
            let case_types = field_children(case, "type");
            let ty = match case_types.as_slice() {
                [single] => Some(self.type_of(*single, inner)),
                _ => value_ty.clone(),
            };
            for alias in &aliases {
                let Some(text) = self.text(*alias) else {
                    continue;
                };
                if text == "_" {
                    continue;
                }
                let id = self.index.add_symbol(Symbol::new(
                    text,
                    SymbolKind::Variable,
                    DeclScope::Local,
                    None,
                ));
                if let Some(ty) = ty.clone() {
                    self.types.set(id, ty);
                }
                self.define(inner, alias.start_byte(), text, id);
            }
            self.walk_children(case, inner);
        }
    }

    /// Keys of struct literals name fields; everything else is an expression
    fn walk_literal(&mut self, body: Node<'a>, ty: &Ty, scope: ScopeId) {
        let elem = self.types.elem(ty).unwrap_or(Ty::Opaque);
        let keyed_by_field = matches!(self.types.structural(ty), Some(Ty::Struct(_)));
        for child in named_children(body) {
            match child.kind() {
                "comment" => {}
                "keyed_element" => {
                    let parts: Vec<Node<'a>> = named_children(child)
                        .into_iter()
                        .filter(|n| n.kind() != "comment")
                        .collect();
                    let [key, value] = parts.as_slice() else {
                        self.walk_children(child, scope);
                        continue;
                    };
                    let key_inner = unwrap_element(*key);
                    if keyed_by_field
                        && matches!(key_inner.kind(), "identifier" | "field_identifier")
                    {
                        let field = self
                            .text(key_inner)
                            .and_then(|name| self.types.member(ty, name, &self.index));
                        if let Some(id) = field {
                            self.record(key_inner, id, Role::Use);
                        }
                    } else {
                        self.walk_element(*key, &Ty::Opaque, scope);
                    }
                    self.walk_element(*value, &elem, scope);
                }
                _ => self.walk_element(child, &elem, scope),
            }
        }
    }

    fn walk_element(&mut self, node: Node<'a>, ty: &Ty, scope: ScopeId) {
        let inner = unwrap_element(node);
        if inner.kind() == "literal_value" {
            self.walk_literal(inner, ty, scope);
        } else {
            self.walk(inner, scope);
        }
    }

    /// An embedded field is both a field definition and a use of its type,
    /// on the same identifier.
    fn walk_struct(&mut self, node: Node<'a>, scope: ScopeId) {
        self.struct_fields(node, scope);
        for decl in field_declarations(node) {
            let ty_node = decl.child_by_field_name("type");
            let names = field_children(decl, "name");
            if names.is_empty()
                && let Some(name) = ty_node.and_then(embedded_name)
            {
                self.record_decl(name);
            }
            for name in names {
                self.record_decl(name);
            }
            if let Some(t) = ty_node {
                self.walk(t, scope);
            }
        }
    }

    fn walk_interface(&mut self, node: Node<'a>, scope: ScopeId) {
        self.interface_methods(node, scope);
        for child in named_children(node) {
            match child.kind() {
                "method_elem" | "method_spec" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        self.record_decl(name);
                    }
                    self.walk_signature(child, scope);
                }
                _ => self.walk(child, scope),
            }
        }
    }
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let children = node.named_children(&mut cursor).collect();
    children
}

fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let children = node.children_by_field_name(field, &mut cursor).collect();
    children
}

fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    named_children(node)
        .into_iter()
        .find(|n| n.kind() != "comment")
}

/// Whether `node` has an anonymous child token `token`
fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == token);
    found
}

/// Members of an expression list, or the node itself
fn expressions(node: Node<'_>) -> Vec<Node<'_>> {
    if node.kind() == "expression_list" {
        named_children(node)
            .into_iter()
            .filter(|n| n.kind() != "comment")
            .collect()
    } else {
        vec![node]
    }
}

/// Specs of a declaration, looking through parenthesized spec lists
fn specs<'t>(decl: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    for child in named_children(decl) {
        if kinds.contains(&child.kind()) {
            out.push(child);
        } else if child.kind().ends_with("_list") {
            out.extend(
                named_children(child)
                    .into_iter()
                    .filter(|n| kinds.contains(&n.kind())),
            );
        }
    }
    out
}

fn field_declarations(struct_type: Node<'_>) -> Vec<Node<'_>> {
    named_children(struct_type)
        .into_iter()
        .filter(|n| n.kind() == "field_declaration_list")
        .flat_map(named_children)
        .filter(|n| n.kind() == "field_declaration")
        .collect()
}

fn strip_pointer(mut node: Node<'_>) -> Node<'_> {
    while matches!(node.kind(), "pointer_type" | "parenthesized_type") {
        match first_named(node) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// Identifier an embedded field is named after
fn embedded_name(ty: Node<'_>) -> Option<Node<'_>> {
    let ty = strip_pointer(ty);
    match ty.kind() {
        "type_identifier" => Some(ty),
        "qualified_type" => ty.child_by_field_name("name"),
        "generic_type" => ty.child_by_field_name("type").and_then(embedded_name),
        _ => None,
    }
}

fn unwrap_element(node: Node<'_>) -> Node<'_> {
    if matches!(node.kind(), "literal_element" | "element") {
        first_named(node).unwrap_or(node)
    } else {
        node
    }
}

fn is_type_node(kind: &str) -> bool {
    matches!(
        kind,
        "parenthesized_type"
            | "pointer_type"
            | "slice_type"
            | "array_type"
            | "map_type"
            | "channel_type"
            | "qualified_type"
            | "generic_type"
            | "function_type"
            | "interface_type"
            | "struct_type"
            | "type_identifier"
    )
}

/// Name an import binds when it has no explicit alias: the last path
/// element, skipping major-version suffixes (`/v2`, `yaml.v3`) and a `go-`
/// prefix.
fn import_name(path: &str) -> &str {
    let is_version = |s: &str| {
        s.len() > 1 && s.starts_with('v') && s[1..].bytes().all(|b| b.is_ascii_digit())
    };
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let name = if is_version(last) {
        segments.next().unwrap_or(last)
    } else {
        last
    };
    let name = match name.rsplit_once('.') {
        Some((base, version)) if is_version(version) => base,
        _ => name,
    };
    name.strip_prefix("go-").unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::GoParser;
    use std::path::Path;

    fn resolve(sources: &[(&str, &str)]) -> Resolution {
        let mut parser = GoParser::new().unwrap();
        let files: Vec<ParsedFile> = sources
            .iter()
            .map(|(path, src)| parser.parse(Path::new(path), src.as_bytes().to_vec()).unwrap())
            .collect();
        let refs: Vec<&ParsedFile> = files.iter().collect();
        GoResolver::new().resolve(&refs)
    }

    /// (role, symbol) of every occurrence spelled `name`
    fn occurrences<'r>(res: &'r Resolution, name: &str) -> Vec<(Role, &'r Symbol)> {
        res.index
            .occurrences()
            .iter()
            .filter(|o| o.name == name)
            .map(|o| (o.role, res.index.symbol(o.symbol).unwrap()))
            .collect()
    }

    fn defined<'r>(res: &'r Resolution, name: &str) -> &'r Symbol {
        occurrences(res, name)
            .into_iter()
            .find(|(role, _)| *role == Role::Definition)
            .map(|(_, s)| s)
            .unwrap_or_else(|| panic!("no definition of {name}"))
    }

    #[test]
    fn test_import_name() {
        assert_eq!(import_name("fmt"), "fmt");
        assert_eq!(import_name("net/http"), "http");
        assert_eq!(import_name("github.com/x/mod/v2"), "mod");
        assert_eq!(import_name("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(import_name("github.com/mattn/go-sqlite3"), "sqlite3");
    }

    #[test]
    fn test_package_level_declarations() {
        let res = resolve(&[(
            "a.go",
            "package p\n\
             const C = 1\n\
             var V int\n\
             type S struct{ F int }\n\
             type I interface{ M() }\n\
             func Fn() {}\n\
             func (s *S) Meth() {}\n",
        )]);

        let c = defined(&res, "C");
        assert_eq!((c.kind, c.scope), (SymbolKind::Constant, DeclScope::Package));
        let v = defined(&res, "V");
        assert_eq!((v.kind, v.shape), (SymbolKind::Variable, Some(TypeShape::Other)));
        assert_eq!(defined(&res, "S").shape, Some(TypeShape::Struct));
        assert_eq!(defined(&res, "I").shape, Some(TypeShape::Interface));
        let f = defined(&res, "F");
        assert_eq!((f.kind, f.scope), (SymbolKind::Field, DeclScope::Member));
        let m = defined(&res, "M");
        assert_eq!((m.kind, m.scope), (SymbolKind::Function, DeclScope::Member));
        let meth = defined(&res, "Meth");
        assert_eq!((meth.kind, meth.scope), (SymbolKind::Function, DeclScope::Member));
        let func = defined(&res, "Fn");
        assert_eq!((func.kind, func.scope), (SymbolKind::Function, DeclScope::Package));
        assert!(res.diagnostics.is_empty(), "{:?}", res.diagnostics);
    }

    #[test]
    fn test_selectors_resolve_through_types() {
        let res = resolve(&[(
            "a.go",
            "package p\n\
             type S struct{ F int }\n\
             func (s *S) Meth() *S { return s }\n\
             func use() {\n\
             \tvar s S\n\
             \ts.F = 1\n\
             \tp := &s\n\
             \tp.Meth().F = 2\n\
             }\n",
        )]);

        let field_uses: Vec<_> = occurrences(&res, "F")
            .into_iter()
            .filter(|(role, _)| *role == Role::Use)
            .collect();
        assert_eq!(field_uses.len(), 2);
        assert!(field_uses.iter().all(|(_, s)| s.kind == SymbolKind::Field));

        let meth_uses: Vec<_> = occurrences(&res, "Meth")
            .into_iter()
            .filter(|(role, _)| *role == Role::Use)
            .collect();
        assert_eq!(meth_uses.len(), 1);
        assert_eq!(meth_uses[0].1.scope, DeclScope::Member);
    }

    #[test]
    fn test_imported_selectors_are_opaque() {
        let res = resolve(&[(
            "a.go",
            "package p\nimport \"fmt\"\nfunc f() { fmt.Println(\"x\") }\n",
        )]);
        let fmt = occurrences(&res, "fmt");
        assert_eq!(fmt.len(), 1);
        assert_eq!(fmt[0].1.kind, SymbolKind::PackageAlias);
        assert!(occurrences(&res, "Println").is_empty());
    }

    #[test]
    fn test_short_var_redeclaration_reuses_existing() {
        let res = resolve(&[(
            "a.go",
            "package p\n\
             func two() (int, error) { return 0, nil }\n\
             func f() {\n\
             \ta, err := two()\n\
             \tb, err := two()\n\
             \t_, _ = a, b\n\
             }\n",
        )]);
        let err = occurrences(&res, "err");
        assert_eq!(err.len(), 2);
        assert_eq!(err[0].0, Role::Definition);
        assert_eq!(err[1].0, Role::Use);
        assert_eq!(err[0].1.kind, SymbolKind::Variable);
        assert_eq!(err[0].1.scope, DeclScope::Local);
    }

    #[test]
    fn test_composite_literal_keys_are_fields() {
        let res = resolve(&[(
            "a.go",
            "package p\n\
             type Point struct{ X, Y int }\n\
             var origin = Point{X: 0, Y: 0}\n\
             var pts = []Point{{X: 1}}\n",
        )]);
        let x_uses: Vec<_> = occurrences(&res, "X")
            .into_iter()
            .filter(|(role, _)| *role == Role::Use)
            .collect();
        assert_eq!(x_uses.len(), 2);
        assert!(x_uses.iter().all(|(_, s)| s.kind == SymbolKind::Field));
    }

    #[test]
    fn test_undeclared_names_are_diagnosed() {
        let res = resolve(&[("a.go", "package p\nfunc f() { missing() }\n")]);
        assert!(occurrences(&res, "missing").is_empty());
        assert!(
            res.diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::Undeclared && d.message.contains("missing"))
        );
    }

    #[test]
    fn test_declarations_are_shared_across_files() {
        let res = resolve(&[
            ("a.go", "package p\nconst Limit = 3\n"),
            ("b.go", "package p\nfunc f() int { return Limit }\n"),
        ]);
        let uses: Vec<_> = res
            .index
            .uses()
            .filter(|o| o.name == "Limit")
            .collect();
        assert_eq!(uses.len(), 1);
        assert_eq!(uses[0].file, 1);
        let def = res.index.definitions().find(|o| o.name == "Limit").unwrap();
        assert_eq!(def.file, 0);
        assert_eq!(def.symbol, uses[0].symbol);
    }

    #[test]
    fn test_embedded_field_defines_field_and_uses_type() {
        let res = resolve(&[(
            "a.go",
            "package p\ntype Base struct{ ID int }\ntype Outer struct{ *Base }\n\
             func f(o Outer) int { return o.ID }\n",
        )]);
        let base: Vec<_> = occurrences(&res, "Base")
            .into_iter()
            .map(|(role, s)| (role, s.kind))
            .collect();
        assert!(base.contains(&(Role::Definition, SymbolKind::Field)));
        assert!(base.contains(&(Role::Use, SymbolKind::TypeName)));
        let id_uses = res.index.uses().filter(|o| o.name == "ID").count();
        assert_eq!(id_uses, 1);
    }

    #[test]
    fn test_nesting_past_the_limit_is_skipped_and_diagnosed() {
        let depth = MAX_NESTING * 2;
        let mut src = String::from("package p\nconst X = 1\nfunc f() {\n");
        src.push_str(&"_ = func() {\n".repeat(depth));
        src.push_str("_ = X\n");
        src.push_str(&"}\n".repeat(depth));
        src.push_str("_ = X\n}\n");

        let res = resolve(&[("a.go", &src)]);
        let too_deep: Vec<_> = res
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::TooDeep)
            .collect();
        assert_eq!(too_deep.len(), 1);
        // the definition and the shallow use survive, the deep use does not
        let kinds: Vec<Role> = occurrences(&res, "X").into_iter().map(|(r, _)| r).collect();
        assert_eq!(kinds, vec![Role::Definition, Role::Use]);
    }

    #[test]
    fn test_type_parameters_are_typed_by_constraint() {
        let res = resolve(&[(
            "a.go",
            "package p\n\
             type Stringer interface{ String() string }\n\
             func F[T any](x T) T { return x }\n\
             func G[S Stringer](s S) string { return s.String() }\n",
        )]);
        assert_eq!(defined(&res, "T").shape, Some(TypeShape::Interface));
        assert_eq!(defined(&res, "S").shape, Some(TypeShape::Interface));
        // the method is found through the constraint
        assert_eq!(occurrences(&res, "String").len(), 2);
    }
}

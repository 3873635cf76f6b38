//! Declaration extraction
//!
//! Walks a parsed declaration document and produces the flat, source-ordered
//! list of named declarations together with a name index used for dependency
//! analysis. Declarations nested in `declare namespace`, `declare module` and
//! `declare global` blocks are extracted as well.

use crate::utils::swc::ParsedModule;
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::{Span, Spanned};
use deno_ast::swc::ecma_visit::{Visit, VisitWith};
use indexmap::IndexMap;
use std::fmt;
use std::ops::Range;

/// The kind of a top-level declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// `interface Name { ... }`
    Interface,
    /// `type Name = ...`
    Type,
    /// `declare class Name { ... }`
    Class,
    /// `declare enum Name { ... }`
    Enum,
    /// `declare var name: ...` (also `let` / `const`)
    Var,
    /// `declare function name(...)`
    Function,
}

impl DeclKind {
    /// Bindings are values in the global scope rather than type shapes
    pub fn is_binding(self) -> bool {
        matches!(self, DeclKind::Var | DeclKind::Function)
    }

    /// Get display string
    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Interface => "interface",
            DeclKind::Type => "type",
            DeclKind::Class => "class",
            DeclKind::Enum => "enum",
            DeclKind::Var => "var",
            DeclKind::Function => "function",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed syntax node of an extracted declaration
#[derive(Debug, Clone, Copy)]
pub enum DeclNode<'a> {
    Interface(&'a swc_ast::TsInterfaceDecl),
    TypeAlias(&'a swc_ast::TsTypeAliasDecl),
    Class(&'a swc_ast::ClassDecl),
    Enum(&'a swc_ast::TsEnumDecl),
    Var(&'a swc_ast::VarDecl),
    Function(&'a swc_ast::FnDecl),
}

impl<'a> DeclNode<'a> {
    /// Classify a declaration; namespaces and `using` declarations are not extracted
    pub fn from_decl(decl: &'a swc_ast::Decl) -> Option<Self> {
        match decl {
            swc_ast::Decl::TsInterface(iface) => Some(DeclNode::Interface(&**iface)),
            swc_ast::Decl::TsTypeAlias(alias) => Some(DeclNode::TypeAlias(&**alias)),
            swc_ast::Decl::Class(class) => Some(DeclNode::Class(class)),
            swc_ast::Decl::TsEnum(ts_enum) => Some(DeclNode::Enum(&**ts_enum)),
            swc_ast::Decl::Var(var) => Some(DeclNode::Var(&**var)),
            swc_ast::Decl::Fn(func) => Some(DeclNode::Function(func)),
            swc_ast::Decl::TsModule(_) | swc_ast::Decl::Using(_) => None,
        }
    }

    pub fn kind(&self) -> DeclKind {
        match self {
            DeclNode::Interface(_) => DeclKind::Interface,
            DeclNode::TypeAlias(_) => DeclKind::Type,
            DeclNode::Class(_) => DeclKind::Class,
            DeclNode::Enum(_) => DeclKind::Enum,
            DeclNode::Var(_) => DeclKind::Var,
            DeclNode::Function(_) => DeclKind::Function,
        }
    }

    /// Declared name; a variable statement is named after its first declarator
    pub fn name(&self) -> Option<String> {
        match self {
            DeclNode::Interface(n) => Some(n.id.sym.to_string()),
            DeclNode::TypeAlias(n) => Some(n.id.sym.to_string()),
            DeclNode::Class(n) => Some(n.ident.sym.to_string()),
            DeclNode::Enum(n) => Some(n.id.sym.to_string()),
            DeclNode::Var(n) => n.decls.first().and_then(|d| match &d.name {
                swc_ast::Pat::Ident(binding) => Some(binding.id.sym.to_string()),
                _ => None,
            }),
            DeclNode::Function(n) => Some(n.ident.sym.to_string()),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            DeclNode::Interface(n) => n.span,
            DeclNode::TypeAlias(n) => n.span,
            DeclNode::Class(n) => n.span(),
            DeclNode::Enum(n) => n.span,
            DeclNode::Var(n) => n.span,
            DeclNode::Function(n) => n.span(),
        }
    }

    /// Run a visitor over the whole declaration subtree
    pub fn visit_with<V: Visit + ?Sized>(&self, visitor: &mut V) {
        match self {
            DeclNode::Interface(n) => n.visit_with(visitor),
            DeclNode::TypeAlias(n) => n.visit_with(visitor),
            DeclNode::Class(n) => n.visit_with(visitor),
            DeclNode::Enum(n) => n.visit_with(visitor),
            DeclNode::Var(n) => n.visit_with(visitor),
            DeclNode::Function(n) => n.visit_with(visitor),
        }
    }
}

/// A named declaration with its source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The declared name
    pub name: String,
    /// The declaration kind
    pub kind: DeclKind,
    /// Source text, prefixed by the attached JSDoc block and a newline
    pub text: String,
    /// Byte range of the declaration proper in its document
    pub range: Range<usize>,
    /// Byte range of the attached JSDoc block
    pub doc: Option<Range<usize>>,
}

/// Index entry for a declared name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    /// Preferred kind; type-like kinds win over bindings
    pub kind: DeclKind,
    /// Positions of the declarations of the preferred kind class
    pub declarations: Vec<usize>,
}

/// All declarations of one document, in source order
#[derive(Debug)]
pub struct DeclarationSet<'a> {
    module: &'a ParsedModule,
    declarations: Vec<Declaration>,
    nodes: Vec<DeclNode<'a>>,
    index: IndexMap<String, NameEntry>,
}

impl<'a> DeclarationSet<'a> {
    /// Extract every declaration of a parsed document
    pub fn extract(module: &'a ParsedModule) -> Self {
        let mut set = Self {
            module,
            declarations: Vec::new(),
            nodes: Vec::new(),
            index: IndexMap::new(),
        };

        match module.program_ref() {
            deno_ast::ProgramRef::Module(m) => set.collect_items(&m.body),
            deno_ast::ProgramRef::Script(s) => {
                for stmt in &s.body {
                    if let swc_ast::Stmt::Decl(decl) = stmt {
                        set.collect_decl(decl, decl.span());
                    }
                }
            }
        }

        set
    }

    /// The document the declarations were extracted from
    pub fn module(&self) -> &'a ParsedModule {
        self.module
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Syntax node of the declaration at `position`
    pub fn node(&self, position: usize) -> DeclNode<'a> {
        self.nodes[position]
    }

    /// Look up the index entry of a name
    pub fn lookup(&self, name: &str) -> Option<&NameEntry> {
        self.index.get(name)
    }

    /// Preferred kind of a name
    pub fn kind_of(&self, name: &str) -> Option<DeclKind> {
        self.index.get(name).map(|entry| entry.kind)
    }

    /// Syntax nodes contributing to a name's dependencies
    pub fn nodes_for(&self, name: &str) -> impl Iterator<Item = DeclNode<'a>> + '_ {
        self.index
            .get(name)
            .into_iter()
            .flat_map(|entry| entry.declarations.iter().map(|&i| self.nodes[i]))
    }

    /// Var and function declarations
    pub fn bindings(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(|d| d.kind.is_binding())
    }

    fn collect_items(&mut self, items: &'a [swc_ast::ModuleItem]) {
        for item in items {
            match item {
                swc_ast::ModuleItem::Stmt(swc_ast::Stmt::Decl(decl)) => {
                    self.collect_decl(decl, decl.span());
                }
                // The export keyword stays part of the declaration text
                swc_ast::ModuleItem::ModuleDecl(swc_ast::ModuleDecl::ExportDecl(export)) => {
                    self.collect_decl(&export.decl, export.span);
                }
                _ => {}
            }
        }
    }

    fn collect_decl(&mut self, decl: &'a swc_ast::Decl, outer: Span) {
        if let swc_ast::Decl::TsModule(module) = decl {
            if let Some(body) = &module.body {
                self.collect_namespace(body);
            }
            return;
        }

        if let Some(node) = DeclNode::from_decl(decl) {
            self.push(node, outer);
        }
    }

    fn collect_namespace(&mut self, body: &'a swc_ast::TsNamespaceBody) {
        match body {
            swc_ast::TsNamespaceBody::TsModuleBlock(block) => self.collect_items(&block.body),
            swc_ast::TsNamespaceBody::TsNamespaceDecl(nested) => {
                self.collect_namespace(&nested.body)
            }
        }
    }

    fn push(&mut self, node: DeclNode<'a>, outer: Span) {
        let Some(name) = node.name() else {
            return;
        };

        let (start, key) = self.module.statement_start(outer);
        let end = self.module.statement_end(outer);
        let doc = self.module.jsdoc_before(key);

        let source = self.module.source_text();
        let mut text = String::new();
        if let Some(doc) = &doc {
            text.push_str(&source[doc.clone()]);
            text.push('\n');
        }
        text.push_str(&source[start..end]);

        let position = self.declarations.len();
        let kind = node.kind();
        self.index_name(&name, kind, position);
        self.declarations.push(Declaration {
            name,
            kind,
            text,
            range: start..end,
            doc,
        });
        self.nodes.push(node);
    }

    fn index_name(&mut self, name: &str, kind: DeclKind, position: usize) {
        match self.index.get_mut(name) {
            None => {
                self.index.insert(
                    name.to_string(),
                    NameEntry {
                        kind,
                        declarations: vec![position],
                    },
                );
            }
            Some(entry) if entry.kind.is_binding() && !kind.is_binding() => {
                entry.kind = kind;
                entry.declarations = vec![position];
            }
            Some(entry) if entry.kind.is_binding() == kind.is_binding() => {
                entry.declarations.push(position);
            }
            Some(_) => {}
        }
    }
}

//! Global-name reconciliation
//!
//! Decides which worker bindings are common globals: bindings the worker
//! library declares that the runtime types also declare in the global scope.

use crate::config::GeneratorConfig;
use crate::declaration::DeclarationSet;
use crate::utils::swc::ParsedModule;
use deno_ast::swc::ast as swc_ast;
use indexmap::IndexSet;

/// Where a declaration sits relative to module and `declare global` blocks
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    inside_module: bool,
    inside_global: bool,
}

impl Scope {
    fn is_global(self) -> bool {
        !self.inside_module || self.inside_global
    }

    fn enter(self, module: &swc_ast::TsModuleDecl) -> Self {
        let is_global = matches!(&module.id, swc_ast::TsModuleName::Ident(ident) if &*ident.sym == "global");
        Self {
            inside_module: self.inside_module || !is_global,
            inside_global: self.inside_global || is_global,
        }
    }
}

/// Names collected from the runtime type documents
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuntimeScan {
    /// Bindings visible in the global scope
    pub globals: IndexSet<String>,
    /// Interfaces, aliases, classes and enums of the primary package
    pub type_names: IndexSet<String>,
}

impl RuntimeScan {
    /// Create an empty scan
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the primary runtime package and any extra packages
    pub fn from_modules(primary: &[ParsedModule], extra: &[ParsedModule]) -> Self {
        let mut scan = Self::new();
        for module in primary {
            scan.add_module(module, true);
        }
        for module in extra {
            scan.add_module(module, false);
        }
        scan
    }

    /// Record the global bindings of one document, and optionally its type names
    pub fn add_module(&mut self, module: &ParsedModule, collect_types: bool) {
        let mut walker = RuntimeWalker {
            scan: self,
            collect_types,
        };
        match module.program_ref() {
            deno_ast::ProgramRef::Module(m) => walker.items(&m.body, Scope::default()),
            deno_ast::ProgramRef::Script(s) => {
                for stmt in &s.body {
                    if let swc_ast::Stmt::Decl(decl) = stmt {
                        walker.decl(decl, false, Scope::default());
                    }
                }
            }
        }
    }
}

struct RuntimeWalker<'s> {
    scan: &'s mut RuntimeScan,
    collect_types: bool,
}

impl RuntimeWalker<'_> {
    fn items(&mut self, items: &[swc_ast::ModuleItem], scope: Scope) {
        for item in items {
            match item {
                swc_ast::ModuleItem::Stmt(swc_ast::Stmt::Decl(decl)) => self.decl(decl, false, scope),
                swc_ast::ModuleItem::ModuleDecl(swc_ast::ModuleDecl::ExportDecl(export)) => {
                    self.decl(&export.decl, true, scope)
                }
                _ => {}
            }
        }
    }

    fn decl(&mut self, decl: &swc_ast::Decl, exported: bool, scope: Scope) {
        match decl {
            swc_ast::Decl::Var(var) => {
                if !exported && scope.is_global() {
                    if let Some(swc_ast::Pat::Ident(binding)) = var.decls.first().map(|d| &d.name) {
                        self.scan.globals.insert(binding.id.sym.to_string());
                    }
                }
            }
            swc_ast::Decl::Fn(func) => {
                if !exported && scope.is_global() {
                    self.scan.globals.insert(func.ident.sym.to_string());
                }
            }
            swc_ast::Decl::TsModule(module) => {
                let inner = scope.enter(module);
                if let Some(body) = &module.body {
                    self.namespace(body, inner);
                }
            }
            swc_ast::Decl::TsInterface(iface) => self.type_name(&iface.id),
            swc_ast::Decl::TsTypeAlias(alias) => self.type_name(&alias.id),
            swc_ast::Decl::Class(class) => self.type_name(&class.ident),
            swc_ast::Decl::TsEnum(ts_enum) => self.type_name(&ts_enum.id),
            swc_ast::Decl::Using(_) => {}
        }
    }

    fn namespace(&mut self, body: &swc_ast::TsNamespaceBody, scope: Scope) {
        match body {
            swc_ast::TsNamespaceBody::TsModuleBlock(block) => self.items(&block.body, scope),
            // `namespace A.B {}` nests a module inside a module
            swc_ast::TsNamespaceBody::TsNamespaceDecl(nested) => {
                let inner = Scope {
                    inside_module: true,
                    ..scope
                };
                self.namespace(&nested.body, inner)
            }
        }
    }

    fn type_name(&mut self, ident: &swc_ast::Ident) {
        if self.collect_types {
            self.scan.type_names.insert(ident.sym.to_string());
        }
    }
}

/// Curated exceptions applied on top of the automatic name matching
#[derive(Debug, Clone, Copy)]
pub struct GlobalLists<'c> {
    pub allow: &'c IndexSet<String>,
    pub excluded: &'c IndexSet<String>,
    pub unavailable: &'c IndexSet<String>,
    pub excluded_interfaces: &'c IndexSet<String>,
}

impl<'c> GlobalLists<'c> {
    pub fn from_config(config: &'c GeneratorConfig) -> Self {
        Self {
            allow: &config.allow_globals,
            excluded: &config.excluded_globals,
            unavailable: &config.unavailable_globals,
            excluded_interfaces: &config.excluded_interfaces,
        }
    }

    fn rejects(&self, name: &str) -> bool {
        self.excluded.contains(name)
            || self.unavailable.contains(name)
            || self.excluded_interfaces.contains(name)
    }
}

/// Worker bindings that are also runtime globals
///
/// A binding is common when the runtime declares it globally or it is on the
/// allow list, and no exclusion list names it. Matching is exact.
pub fn common_globals(
    worker: &DeclarationSet<'_>,
    runtime_globals: &IndexSet<String>,
    lists: GlobalLists<'_>,
) -> IndexSet<String> {
    worker
        .bindings()
        .map(|decl| decl.name.as_str())
        .filter(|name| !lists.rejects(name))
        .filter(|name| runtime_globals.contains(*name) || lists.allow.contains(*name))
        .map(str::to_string)
        .collect()
}

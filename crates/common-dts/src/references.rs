//! Reference extraction
//!
//! Collects the names a declaration depends on: every type reference (the
//! leftmost identifier for qualified names such as `WebAssembly.Module`) and
//! every identifier listed in an `extends` / `implements` heritage clause.

use crate::declaration::DeclNode;
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::ecma_visit::{Visit, VisitWith};
use indexmap::IndexSet;

/// Names referenced anywhere inside a declaration
pub fn references(node: DeclNode<'_>) -> IndexSet<String> {
    let mut collector = ReferenceCollector::default();
    node.visit_with(&mut collector);
    collector.names
}

/// Leftmost identifier of a possibly qualified name
pub fn entity_root(name: &swc_ast::TsEntityName) -> &swc_ast::Ident {
    match name {
        swc_ast::TsEntityName::Ident(ident) => ident,
        swc_ast::TsEntityName::TsQualifiedName(qualified) => entity_root(&qualified.left),
    }
}

#[derive(Default)]
struct ReferenceCollector {
    names: IndexSet<String>,
}

impl ReferenceCollector {
    fn insert_ident_expr(&mut self, expr: &swc_ast::Expr) {
        if let swc_ast::Expr::Ident(ident) = expr {
            self.names.insert(ident.sym.to_string());
        }
    }
}

impl Visit for ReferenceCollector {
    fn visit_ts_type_ref(&mut self, n: &swc_ast::TsTypeRef) {
        self.names.insert(entity_root(&n.type_name).sym.to_string());
        n.visit_children_with(self);
    }

    // interface `extends` and class `implements` entries
    fn visit_ts_expr_with_type_args(&mut self, n: &swc_ast::TsExprWithTypeArgs) {
        self.insert_ident_expr(&n.expr);
        n.visit_children_with(self);
    }

    fn visit_class(&mut self, n: &swc_ast::Class) {
        if let Some(super_class) = &n.super_class {
            self.insert_ident_expr(super_class);
        }
        n.visit_children_with(self);
    }
}

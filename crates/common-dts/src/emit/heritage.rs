//! Structural rewrites for excluded interfaces
//!
//! Edits are computed from syntax-node spans and expressed as byte ranges of
//! the source document, so they apply regardless of how the declaration is
//! formatted.

use crate::declaration::DeclNode;
use crate::references::entity_root;
use crate::utils::swc::ParsedModule;
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::{Span, Spanned};
use deno_ast::swc::ecma_visit::{Visit, VisitWith};
use indexmap::IndexSet;
use std::ops::Range;

/// Replacement of a byte range of the source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl Edit {
    fn remove(range: Range<usize>) -> Self {
        Self {
            range,
            replacement: String::new(),
        }
    }
}

/// All structural edits for one kept declaration
pub fn declaration_edits(
    module: &ParsedModule,
    node: DeclNode<'_>,
    excluded: &IndexSet<String>,
) -> Vec<Edit> {
    if excluded.is_empty() {
        return Vec::new();
    }

    let mut edits = Vec::new();
    if let DeclNode::Interface(iface) = node {
        edits.extend(heritage_edit(module, iface, excluded));
    }
    edits.extend(property_edits(module, node, excluded));
    edits
}

/// Drop excluded entries from an interface's `extends` clause
///
/// The remaining entries keep their order and are rejoined with `", "`. When
/// nothing remains the whole clause goes.
pub fn heritage_edit(
    module: &ParsedModule,
    iface: &swc_ast::TsInterfaceDecl,
    excluded: &IndexSet<String>,
) -> Option<Edit> {
    let (first, last) = (iface.extends.first()?, iface.extends.last()?);

    let kept: Vec<&str> = iface
        .extends
        .iter()
        .filter(|entry| !excluded.contains(base_name(module, entry)))
        .map(|entry| module.text_for_span(entry.span))
        .collect();

    if kept.len() == iface.extends.len() {
        return None;
    }

    if kept.is_empty() {
        let header_end = iface
            .type_params
            .as_ref()
            .map(|params| params.span.hi)
            .unwrap_or(iface.id.span.hi);
        return Some(Edit {
            range: module.byte_index(header_end)..module.byte_index(iface.body.span.lo),
            replacement: " ".to_string(),
        });
    }

    Some(Edit {
        range: module.byte_index(first.span.lo)..module.byte_index(last.span.hi),
        replacement: kept.join(", "),
    })
}

/// Name of a heritage entry without its generic arguments
fn base_name<'m>(module: &'m ParsedModule, entry: &swc_ast::TsExprWithTypeArgs) -> &'m str {
    module.text_for_span(entry.expr.span()).trim()
}

/// Remove property signatures typed as an excluded interface
///
/// Matches `name: Excluded` and `name: Excluded | null` at any depth inside
/// the declaration. The attached doc comment goes with the property; when the
/// property owns its lines, the lines go too.
pub fn property_edits(
    module: &ParsedModule,
    node: DeclNode<'_>,
    excluded: &IndexSet<String>,
) -> Vec<Edit> {
    let mut finder = ExcludedProperties {
        excluded,
        spans: Vec::new(),
    };
    node.visit_with(&mut finder);

    finder
        .spans
        .into_iter()
        .map(|span| Edit::remove(removal_range(module, span)))
        .collect()
}

struct ExcludedProperties<'e> {
    excluded: &'e IndexSet<String>,
    spans: Vec<Span>,
}

impl ExcludedProperties<'_> {
    fn is_excluded_ref(&self, ty: &swc_ast::TsType) -> bool {
        match ty {
            swc_ast::TsType::TsTypeRef(type_ref) => {
                type_ref.type_params.is_none()
                    && matches!(&type_ref.type_name, swc_ast::TsEntityName::Ident(_))
                    && self.excluded.contains(&*entity_root(&type_ref.type_name).sym)
            }
            _ => false,
        }
    }

    fn is_excluded_type(&self, ty: &swc_ast::TsType) -> bool {
        match ty {
            swc_ast::TsType::TsUnionOrIntersectionType(
                swc_ast::TsUnionOrIntersectionType::TsUnionType(union),
            ) => match union.types.as_slice() {
                [a, b] => {
                    (self.is_excluded_ref(a) && is_null(b)) || (is_null(a) && self.is_excluded_ref(b))
                }
                _ => false,
            },
            other => self.is_excluded_ref(other),
        }
    }
}

impl Visit for ExcludedProperties<'_> {
    fn visit_ts_property_signature(&mut self, n: &swc_ast::TsPropertySignature) {
        let excluded = n
            .type_ann
            .as_ref()
            .is_some_and(|ann| self.is_excluded_type(&ann.type_ann));
        if excluded {
            self.spans.push(n.span);
            return;
        }
        n.visit_children_with(self);
    }
}

fn is_null(ty: &swc_ast::TsType) -> bool {
    matches!(
        ty,
        swc_ast::TsType::TsKeywordType(keyword)
            if keyword.kind == swc_ast::TsKeywordTypeKind::TsNullKeyword
    )
}

/// Byte range removed for a property: doc comment, member, separator, and
/// the surrounding line when nothing else shares it
fn removal_range(module: &ParsedModule, span: Span) -> Range<usize> {
    let source = module.source_text();
    let start = module
        .jsdoc_before(span.lo)
        .map(|doc| doc.start)
        .unwrap_or_else(|| module.byte_index(span.lo));

    let mut end = module.byte_index(span.hi);
    let rest = &source[end..];
    let after_padding = rest.trim_start_matches([' ', '\t']);
    if after_padding.starts_with([';', ',']) {
        end += rest.len() - after_padding.len() + 1;
    }

    let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = source[end..]
        .find('\n')
        .map(|i| end + i + 1)
        .unwrap_or(source.len());

    if source[line_start..start].trim().is_empty() && source[end..line_end].trim().is_empty() {
        line_start..line_end
    } else {
        let trailing = &source[end..];
        end += trailing.len() - trailing.trim_start_matches([' ', '\t']).len();
        start..end
    }
}

/// Apply edits inside `range` of `source`
///
/// Edits outside the range, and edits nested in an earlier edit, are ignored.
pub fn apply_edits(source: &str, range: Range<usize>, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|edit| (edit.range.start, edit.range.end));

    let mut out = String::with_capacity(range.len());
    let mut cursor = range.start;
    for edit in edits {
        if edit.range.start < cursor || edit.range.end > range.end {
            continue;
        }
        out.push_str(&source[cursor..edit.range.start]);
        out.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    out.push_str(&source[cursor..range.end]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::DeclarationSet;
    use crate::utils::swc::parse_declaration_source;
    use pretty_assertions::assert_eq;

    fn excluded(names: &[&str]) -> IndexSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    /// Render the first declaration of `source` with structural edits applied
    fn rewrite(source: &str, names: &[&str]) -> String {
        let module = parse_declaration_source("/virtual/lib.webworker.d.ts", source).unwrap();
        let set = DeclarationSet::extract(&module);
        let decl = &set.declarations()[0];
        let edits = declaration_edits(&module, set.node(0), &excluded(names));
        apply_edits(module.source_text(), decl.range.clone(), edits)
    }

    #[test]
    fn test_extends_partially_removed() {
        let source = "interface WorkerNavigator extends NavigatorBadge, NavigatorConcurrentHardware, NavigatorLocks, NavigatorID {\n}\n";
        assert_eq!(
            rewrite(source, &["NavigatorBadge", "NavigatorLocks"]),
            "interface WorkerNavigator extends NavigatorConcurrentHardware, NavigatorID {\n}"
        );
    }

    #[test]
    fn test_extends_fully_removed() {
        let source = "interface Holder<T = any> extends ServiceWorkerContainer {\n    value: T;\n}\n";
        assert_eq!(
            rewrite(source, &["ServiceWorkerContainer"]),
            "interface Holder<T = any> {\n    value: T;\n}"
        );
    }

    #[test]
    fn test_extends_generic_arguments_ignored_for_matching() {
        let source = "interface A extends Excluded<string>, Kept<number> {}\n";
        assert_eq!(rewrite(source, &["Excluded"]), "interface A extends Kept<number> {}");
    }

    #[test]
    fn test_extends_untouched_without_match() {
        let source = "interface A extends B, C {}\n";
        assert_eq!(rewrite(source, &["Z"]), "interface A extends B, C {}");
    }

    #[test]
    fn test_property_line_removed() {
        let source = "interface Foo {\n    x: Bar;\n    y: number;\n}\n";
        assert_eq!(rewrite(source, &["Bar"]), "interface Foo {\n    y: number;\n}");
    }

    #[test]
    fn test_documented_nullable_property_removed_with_doc() {
        let source = r#"interface WorkerNavigator {
    /**
     * The service worker container.
     *
     * [MDN Reference](https://developer.mozilla.org/docs/Web/API/Navigator/serviceWorker)
     */
    readonly serviceWorker: ServiceWorkerContainer | null;
    readonly userAgent: string;
}
"#;
        assert_eq!(
            rewrite(source, &["ServiceWorkerContainer"]),
            "interface WorkerNavigator {\n    readonly userAgent: string;\n}"
        );
    }

    #[test]
    fn test_inline_property_removed() {
        let source = "interface Foo { x: Bar; y: number }\n";
        assert_eq!(rewrite(source, &["Bar"]), "interface Foo { y: number }");
    }

    #[test]
    fn test_generic_or_wider_unions_are_kept() {
        let source = "interface Foo {\n    a: Bar<string>;\n    b: Bar | string;\n    c: Baz;\n}\n";
        assert_eq!(rewrite(source, &["Bar"]), source.trim_end());
    }

    #[test]
    fn test_nested_type_literal_property() {
        let source = "declare var config: {\n    worker: ServiceWorker;\n    name: string;\n};\n";
        assert_eq!(
            rewrite(source, &["ServiceWorker"]),
            "declare var config: {\n    name: string;\n};"
        );
    }

    #[test]
    fn test_apply_edits_skips_nested() {
        let source = "0123456789";
        let edits = vec![
            Edit { range: 2..6, replacement: "x".into() },
            Edit { range: 3..4, replacement: "y".into() },
            Edit { range: 8..12, replacement: "z".into() },
        ];
        assert_eq!(apply_edits(source, 1..9, edits), "1x678");
    }
}

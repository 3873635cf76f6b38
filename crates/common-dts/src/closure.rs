//! Dependency closure
//!
//! Starting from the common globals, collects every declaration name the
//! output needs so that the emitted declarations only reference names that
//! are emitted too (or deliberately excluded).
//!
//! Two rules keep the closure small:
//! - type aliases are leaves; `type Transferable = OffscreenCanvas | ...` must
//!   not pull in every union member
//! - bindings are never dependencies; a `declare var` only reaches the output
//!   by being a common global itself

use crate::declaration::{DeclKind, DeclarationSet};
use crate::references::references;
use indexmap::IndexSet;
use std::collections::VecDeque;

/// Names reachable from `roots` through the reference graph
///
/// Each name is expanded once. Names without a declaration are kept but not
/// expanded.
pub fn build_closure(
    declarations: &DeclarationSet<'_>,
    roots: &IndexSet<String>,
    excluded_interfaces: &IndexSet<String>,
) -> IndexSet<String> {
    let mut worklist: VecDeque<String> = roots.iter().cloned().collect();
    let mut visited: IndexSet<String> = IndexSet::new();

    while let Some(name) = worklist.pop_front() {
        if !visited.insert(name.clone()) {
            continue;
        }

        match declarations.kind_of(&name) {
            None | Some(DeclKind::Type) => continue,
            Some(_) => {}
        }

        let referenced: IndexSet<String> = declarations.nodes_for(&name).flat_map(references).collect();
        for reference in referenced {
            let enqueue = match declarations.kind_of(&reference) {
                Some(kind) => {
                    !kind.is_binding()
                        && !visited.contains(&reference)
                        && !excluded_interfaces.contains(&reference)
                }
                None => false,
            };
            if enqueue {
                worklist.push_back(reference);
            }
        }
    }

    tracing::debug!(roots = roots.len(), closure = visited.len(), "built dependency closure");
    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::swc::parse_declaration_source;
    use crate::utils::swc::ParsedModule;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ParsedModule {
        parse_declaration_source("/virtual/lib.webworker.d.ts", source).unwrap()
    }

    fn set(names: &[&str]) -> IndexSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn sorted(names: IndexSet<String>) -> Vec<String> {
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        names
    }

    #[test]
    fn test_transitive_interfaces() {
        let module = parse(
            r#"
interface Foo { x: Bar }
interface Bar { y: Baz }
interface Baz {}
interface Unrelated {}
declare var Foo: { prototype: Foo; new(): Foo };
"#,
        );
        let decls = DeclarationSet::extract(&module);
        let closure = build_closure(&decls, &set(&["Foo"]), &IndexSet::new());
        assert_eq!(sorted(closure), vec!["Bar", "Baz", "Foo"]);
    }

    #[test]
    fn test_aliases_are_leaves() {
        let module = parse(
            r#"
type T = A | B | C;
interface A {}
interface B {}
interface C {}
interface Holder { t: T; a: A }
declare var holder: Holder;
"#,
        );
        let decls = DeclarationSet::extract(&module);
        let closure = build_closure(&decls, &set(&["holder"]), &IndexSet::new());
        assert_eq!(sorted(closure), vec!["A", "Holder", "T", "holder"]);
    }

    #[test]
    fn test_bindings_are_not_dependencies() {
        let module = parse(
            r#"
interface Worker { onmessage: typeof onmessage; port: MessagePortLike }
declare var onmessage: MessageHandler;
declare function MessagePortLike(): void;
interface MessageHandler {}
declare var Worker: { new(): Worker };
"#,
        );
        let decls = DeclarationSet::extract(&module);
        let closure = build_closure(&decls, &set(&["Worker"]), &IndexSet::new());
        assert_eq!(sorted(closure), vec!["Worker"]);
    }

    #[test]
    fn test_excluded_interfaces_stop_traversal() {
        let module = parse(
            r#"
interface Navigator extends NavigatorID, NavigatorStorage {}
interface NavigatorID { readonly userAgent: string }
interface NavigatorStorage { readonly storage: StorageManager }
interface StorageManager {}
declare var navigator: Navigator;
"#,
        );
        let decls = DeclarationSet::extract(&module);
        let closure = build_closure(&decls, &set(&["navigator"]), &set(&["NavigatorStorage"]));
        assert_eq!(sorted(closure), vec!["Navigator", "NavigatorID", "navigator"]);
    }

    #[test]
    fn test_roots_without_declarations_are_kept() {
        let module = parse("interface A {}\n");
        let decls = DeclarationSet::extract(&module);
        let closure = build_closure(&decls, &set(&["missing"]), &IndexSet::new());
        assert_eq!(sorted(closure), vec!["missing"]);
    }

    #[test]
    fn test_cycles_terminate() {
        let module = parse(
            "interface Node { parent: Node; children: NodeList }\ninterface NodeList { item(i: number): Node }\n",
        );
        let decls = DeclarationSet::extract(&module);
        let closure = build_closure(&decls, &set(&["Node"]), &IndexSet::new());
        assert_eq!(sorted(closure), vec!["Node", "NodeList"]);
    }
}

//! Output emission
//!
//! Selects the declarations to keep, rewrites them for the excluded
//! interfaces and assembles the final document:
//! - structural edits ([`heritage`]) on each kept declaration
//! - a fixed header
//! - the ordered text rules ([`rewrite`]) over the assembled lines

pub mod heritage;
pub mod rewrite;

pub use heritage::{apply_edits, declaration_edits, Edit};
pub use rewrite::{Replacement, RewriteRules, Rule};

use crate::declaration::DeclarationSet;
use crate::diagnostics::DtsResult;
use indexmap::IndexSet;

/// Lines preceding the declarations
pub const HEADER: &[&str] = &[
    "/*! *****************************************************************************",
    "This file contains type definitions derived from multiple sources:",
    "- TypeScript's lib.webworker.d.ts (Microsoft Corporation)",
    "- @types/node (DefinitelyTyped contributors)",
    "- undici-types (Undici contributors)",
    "",
    "Original TypeScript definitions:",
    "Copyright (c) Microsoft Corporation. All rights reserved.",
    "Licensed under the Apache License, Version 2.0.",
    "",
    "@types/node definitions:",
    "Definitions by DefinitelyTyped contributors",
    "Licensed under the MIT License.",
    "",
    "This derivative work is licensed under MIT-0.",
    "See individual source files for complete license terms.",
    "***************************************************************************** */",
    "",
    "/// <reference no-default-lib=\"true\"/>",
    "",
    "/////////////////////////////",
    "/// Common APIs",
    "/////////////////////////////",
    "",
];

/// Positions of the declarations to emit, in source order
///
/// A declaration is kept when its name is in the closure. Bindings must also
/// be common globals, and excluded interfaces are never kept.
pub fn select_declarations(
    declarations: &DeclarationSet<'_>,
    closure: &IndexSet<String>,
    bindings: &IndexSet<String>,
    excluded_interfaces: &IndexSet<String>,
) -> Vec<usize> {
    declarations
        .declarations()
        .iter()
        .enumerate()
        .filter(|(_, decl)| closure.contains(&decl.name))
        .filter(|(_, decl)| {
            if decl.kind.is_binding() {
                bindings.contains(&decl.name)
            } else {
                !excluded_interfaces.contains(&decl.name)
            }
        })
        .map(|(position, _)| position)
        .collect()
}

/// Renders kept declarations into the output document
#[derive(Debug)]
pub struct Emitter<'c> {
    excluded_interfaces: &'c IndexSet<String>,
    rules: RewriteRules,
}

impl<'c> Emitter<'c> {
    pub fn new(excluded_interfaces: &'c IndexSet<String>) -> DtsResult<Self> {
        Ok(Self {
            excluded_interfaces,
            rules: RewriteRules::new(excluded_interfaces)?,
        })
    }

    pub fn rules(&self) -> &RewriteRules {
        &self.rules
    }

    /// Text of one declaration with structural edits applied, trimmed
    pub fn render(&self, declarations: &DeclarationSet<'_>, position: usize) -> String {
        let decl = &declarations.declarations()[position];
        let module = declarations.module();
        let source = module.source_text();

        let edits = declaration_edits(module, declarations.node(position), self.excluded_interfaces);
        let body = apply_edits(source, decl.range.clone(), edits);

        let text = match &decl.doc {
            Some(doc) => format!("{}\n{}", &source[doc.clone()], body),
            None => body,
        };
        text.trim().to_string()
    }

    /// Assemble the document for the selected declarations
    ///
    /// Each declaration is followed by a blank line; the text rules run last.
    pub fn emit(&self, declarations: &DeclarationSet<'_>, selected: &[usize]) -> String {
        let mut lines: Vec<String> = HEADER.iter().map(|line| line.to_string()).collect();
        for &position in selected {
            lines.push(self.render(declarations, position));
            lines.push(String::new());
        }

        let document = lines.join("\n");
        tracing::debug!(
            declarations = selected.len(),
            rules = self.rules.len(),
            "applying rewrite rules"
        );
        self.rules.apply(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::swc::{parse_declaration_source, ParsedModule};
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ParsedModule {
        parse_declaration_source("/virtual/lib.webworker.d.ts", source).unwrap()
    }

    fn set(names: &[&str]) -> IndexSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_selection_rules() {
        let module = parse(
            r#"
interface Foo {}
declare var Foo: { new(): Foo };
declare var onmessage: any;
interface ServiceWorker {}
declare var ServiceWorker: { new(): ServiceWorker };
interface Other {}
"#,
        );
        let decls = DeclarationSet::extract(&module);
        let closure = set(&["Foo", "onmessage", "ServiceWorker"]);
        let bindings = set(&["Foo", "ServiceWorker"]);
        let selected = select_declarations(&decls, &closure, &bindings, &set(&["ServiceWorker"]));

        let names: Vec<(&str, &str)> = selected
            .iter()
            .map(|&i| {
                let decl = &decls.declarations()[i];
                (decl.name.as_str(), decl.kind.as_str())
            })
            .collect();
        assert_eq!(
            names,
            vec![("Foo", "interface"), ("Foo", "var"), ("ServiceWorker", "var")]
        );
    }

    #[test]
    fn test_emit_layout() {
        let module = parse(
            "/** A foo. */\ninterface Foo extends NavigatorLocks {\n    x: number;\n}\n\ndeclare var foo: WorkerNavigator;\n",
        );
        let decls = DeclarationSet::extract(&module);
        let excluded = set(&["NavigatorLocks"]);
        let emitter = Emitter::new(&excluded).unwrap();

        let text = emitter.emit(&decls, &[0, 1]);
        let mut expected: Vec<&str> = HEADER.to_vec();
        expected.extend([
            "/** A foo. */",
            "interface Foo {",
            "    x: number;",
            "}",
            "",
            "declare var foo: Navigator;",
            "",
        ]);
        assert_eq!(text, expected.join("\n"));
        assert!(text.starts_with("/*! ****"));
        assert!(text.ends_with(";\n"));
    }

    #[test]
    fn test_empty_selection_is_header_only() {
        let module = parse("interface Foo {}\n");
        let decls = DeclarationSet::extract(&module);
        let excluded = IndexSet::new();
        let emitter = Emitter::new(&excluded).unwrap();
        assert_eq!(emitter.emit(&decls, &[]), HEADER.join("\n"));
    }
}

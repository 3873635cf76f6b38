//! Declared-globals scan
//!
//! The smoke test consuming `common.d.ts` does not parse it: it collects
//! every `declare var NAME` / `declare function NAME` with a regular
//! expression and expects each name on `globalThis`. This module performs the
//! same scan so the generator can check the output before writing it.

use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DECLARED_GLOBAL: Regex = Regex::new(r"declare (var|function) (\w+)").unwrap();
}

/// Names the smoke test will look up on `globalThis`
pub fn declared_globals(text: &str) -> IndexSet<String> {
    DECLARED_GLOBAL
        .captures_iter(text)
        .map(|caps| caps[2].to_string())
        .collect()
}

/// Declared globals missing from `bindings`
pub fn uncommon_globals(text: &str, bindings: &IndexSet<String>) -> Vec<String> {
    declared_globals(text)
        .into_iter()
        .filter(|name| !bindings.contains(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_declared_globals() {
        let text = r#"
declare var navigator: Navigator;
declare function atob(data: string): string;
declare function atob(data: Uint8Array): string;
/** declare var inDocs */
interface Foo { declared: string }
"#;
        let names: Vec<String> = declared_globals(text).into_iter().collect();
        assert_eq!(names, vec!["navigator", "atob", "inDocs"]);
    }

    #[test]
    fn test_uncommon_globals() {
        let bindings: IndexSet<String> = ["navigator".to_string()].into_iter().collect();
        let text = "declare var navigator: Navigator;\ndeclare var importScripts: any;\n";
        assert_eq!(uncommon_globals(text, &bindings), vec!["importScripts"]);
    }
}

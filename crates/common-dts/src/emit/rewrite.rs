//! Ordered text substitution rules
//!
//! The rules run in a fixed order over every line of the assembled document.
//! Order matters: the union collapse must see a line only after documented
//! excluded properties are gone, and the `WorkerNavigator` rename must run
//! before the description rewrites that mention `Navigator`.

use crate::diagnostics::DtsResult;
use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::{Captures, NoExpand, Regex};
use std::borrow::Cow;

lazy_static! {
    static ref WORKER_NAVIGATOR: Regex = Regex::new(r"\bWorkerNavigator\b").unwrap();
    static ref NAVIGATOR_URL: Regex =
        Regex::new(&regex::escape("/API/WorkerGlobalScope/navigator")).unwrap();
    static ref MESSAGE_URL: Regex =
        Regex::new(&regex::escape("/API/DedicatedWorkerGlobalScope/message")).unwrap();
    static ref NAVIGATOR_DESCRIPTION: Regex = Regex::new(&regex::escape(
        "a subset of the Navigator interface allowed to be accessed from a Worker"
    ))
    .unwrap();
    static ref NAVIGATOR_VAR_DESCRIPTION: Regex = Regex::new(&regex::escape(
        "of the WorkerGlobalScope interface returns the Navigator associated with the worker"
    ))
    .unwrap();
}

/// How a rule rewrites its matches
#[derive(Debug, Clone)]
pub enum Replacement {
    /// Replace every match with fixed text
    Literal(&'static str),
    /// `(=|\|) Excluded (;|\|)`: drop the member, and drop the `|` too when
    /// the member ended the union
    CollapseUnion,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub description: &'static str,
    pattern: Regex,
    replacement: Replacement,
}

impl Rule {
    fn new(description: &'static str, pattern: Regex, replacement: Replacement) -> Self {
        Self {
            description,
            pattern,
            replacement,
        }
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Rewrite every match in one line
    pub fn apply<'t>(&self, line: &'t str) -> Cow<'t, str> {
        match &self.replacement {
            Replacement::Literal(text) => self.pattern.replace_all(line, NoExpand(text)),
            Replacement::CollapseUnion => self.pattern.replace_all(line, |caps: &Captures<'_>| {
                let (open, close) = (&caps[1], &caps[3]);
                if close == ";" && open == "|" {
                    close.to_string()
                } else {
                    format!("{open}{close}")
                }
            }),
        }
    }
}

/// The ordered rule list
#[derive(Debug, Clone)]
pub struct RewriteRules {
    rules: Vec<Rule>,
}

impl RewriteRules {
    /// Build the rule list for a set of excluded interfaces
    ///
    /// The two rules naming excluded interfaces are left out when the set is
    /// empty.
    pub fn new(excluded_interfaces: &IndexSet<String>) -> DtsResult<Self> {
        let mut rules = Vec::new();

        if !excluded_interfaces.is_empty() {
            let names = excluded_interfaces
                .iter()
                .map(|name| regex::escape(name))
                .collect::<Vec<_>>()
                .join("|");

            rules.push(Rule::new(
                "remove documented readonly properties typed as an excluded interface",
                Regex::new(&format!(
                    r"[^\S\r\n]*/\*\*([^*]|\*[^/])*\*/\s+readonly\s+\w+\s*:\s*({names})\s*(\|\s*null\s*)?;"
                ))?,
                Replacement::Literal(""),
            ));
            rules.push(Rule::new(
                "collapse union members naming an excluded interface",
                Regex::new(&format!(r"(=|\|)\s*({names})\s*(;|\|)"))?,
                Replacement::CollapseUnion,
            ));
        }

        rules.push(Rule::new(
            "rename WorkerNavigator to Navigator",
            WORKER_NAVIGATOR.clone(),
            Replacement::Literal("Navigator"),
        ));
        rules.push(Rule::new(
            "point navigator links at the Navigator page",
            NAVIGATOR_URL.clone(),
            Replacement::Literal("/API/Navigator"),
        ));
        rules.push(Rule::new(
            "point message links at the MessagePort page",
            MESSAGE_URL.clone(),
            Replacement::Literal("/API/MessagePort/message"),
        ));
        rules.push(Rule::new(
            "describe Navigator without the worker subset",
            NAVIGATOR_DESCRIPTION.clone(),
            Replacement::Literal("the state and the identity of the user agent"),
        ));
        rules.push(Rule::new(
            "describe the navigator global without the worker scope",
            NAVIGATOR_VAR_DESCRIPTION.clone(),
            Replacement::Literal("returns a reference to the Navigator object"),
        ));

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule, in order, to one line
    pub fn apply_line(&self, line: &str) -> String {
        let mut current = line.to_string();
        for rule in &self.rules {
            let replaced = match rule.apply(&current) {
                Cow::Borrowed(_) => None,
                Cow::Owned(text) => Some(text),
            };
            if let Some(text) = replaced {
                current = text;
            }
        }
        current
    }

    /// Apply the rules line by line; no match spans a line break
    pub fn apply(&self, text: &str) -> String {
        text.split('\n')
            .map(|line| self.apply_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_EXCLUDED_INTERFACES;
    use pretty_assertions::assert_eq;

    fn default_rules() -> RewriteRules {
        let excluded = DEFAULT_EXCLUDED_INTERFACES
            .iter()
            .map(|name| name.to_string())
            .collect();
        RewriteRules::new(&excluded).unwrap()
    }

    #[test]
    fn test_rule_count() {
        assert_eq!(default_rules().len(), 7);
        assert_eq!(RewriteRules::new(&IndexSet::new()).unwrap().len(), 5);
    }

    #[test]
    fn test_single_line_documented_property_removed() {
        let rules = default_rules();
        assert_eq!(
            rules.apply_line("    /** Docs */ readonly serviceWorker: ServiceWorkerContainer | null;"),
            ""
        );
        assert_eq!(
            rules.apply_line("    /** Docs */ readonly locks: NavigatorLocks;"),
            ""
        );
        assert_eq!(
            rules.apply_line("    /** Docs */ readonly name: string;"),
            "    /** Docs */ readonly name: string;"
        );
    }

    #[test]
    fn test_union_members_collapse() {
        let rules = default_rules();
        assert_eq!(
            rules.apply_line("type MessageEventSource = MessagePort | ServiceWorker;"),
            "type MessageEventSource = MessagePort;"
        );
        assert_eq!(
            rules.apply_line("type Source = ServiceWorker | MessagePort;"),
            "type Source =| MessagePort;"
        );
        assert_eq!(
            rules.apply_line("type Source = A | ServiceWorkerRegistration;"),
            "type Source = A | ServiceWorkerRegistration;"
        );
    }

    #[test]
    fn test_worker_navigator_renamed_on_word_boundaries() {
        let rules = default_rules();
        assert_eq!(
            rules.apply_line("declare var navigator: WorkerNavigator;"),
            "declare var navigator: Navigator;"
        );
        assert_eq!(
            rules.apply_line("interface WorkerNavigatorish {}"),
            "interface WorkerNavigatorish {}"
        );
    }

    #[test]
    fn test_documentation_rewrites() {
        let rules = default_rules();
        assert_eq!(
            rules.apply_line(" * [MDN Reference](https://developer.mozilla.org/docs/Web/API/WorkerGlobalScope/navigator)"),
            " * [MDN Reference](https://developer.mozilla.org/docs/Web/API/Navigator)"
        );
        assert_eq!(
            rules.apply_line(" * [MDN](https://developer.mozilla.org/docs/Web/API/DedicatedWorkerGlobalScope/message_event)"),
            " * [MDN](https://developer.mozilla.org/docs/Web/API/MessagePort/message_event)"
        );
        assert_eq!(
            rules.apply_line(" * The WorkerNavigator interface represents a subset of the Navigator interface allowed to be accessed from a Worker."),
            " * The Navigator interface represents the state and the identity of the user agent."
        );
        assert_eq!(
            rules.apply_line(" * The navigator read-only property of the WorkerGlobalScope interface returns the Navigator associated with the worker."),
            " * The navigator read-only property returns a reference to the Navigator object."
        );
    }

    #[test]
    fn test_rules_do_not_span_lines() {
        let rules = default_rules();
        let text = "    /** Docs */\n    readonly serviceWorker: ServiceWorker;";
        assert_eq!(rules.apply(text), text);
    }

    #[test]
    fn test_replacement_text_is_not_expanded() {
        let excluded: IndexSet<String> = ["$1".to_string()].into_iter().collect();
        let rules = RewriteRules::new(&excluded).unwrap();
        assert_eq!(rules.apply_line("type A = B | $1;"), "type A = B;");
    }
}

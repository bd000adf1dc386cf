//! Rule schema shared by the catalog and the analyzers.
//!
//! Every [`Issue`] is produced by [`Rule::issue`], which takes the rule, the
//! resolved location and the template bindings in one call. Rule id,
//! severity, message and suggestion therefore always travel together.

use super::{Category, Issue, Location, Severity};
use crate::language::Language;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Value shape inferred for a receiver from its last assignment.
pub enum Shape {
    Sequence,
    Text,
    Mapping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Receiver constraint of a member-call pattern.
pub enum Receiver {
    /// Fixed module path including the trailing separator (`os.path.`,
    /// `fs::`).
    Exact(&'static str),
    /// Any expression followed by `.method(`.
    Any,
    /// A plain identifier whose last assignment has the given shape.
    Inferred(Shape),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Matchers that need more than a regex: argument inspection, literal
/// context, or aggregation.
pub enum Structural {
    UnknownImport,
    CommandCall,
    CommandInjection,
    DestructiveCommand,
    ShellTrue,
    YamlLoad,
    SecretFileAccess,
    SocketBackdoor,
    DnsExfiltration,
    Credential,
    KnownSecret,
    InsecureUrl,
    SqlConstruction,
    PhraseDensity,
}

#[derive(Debug, Clone)]
pub enum Pattern {
    /// Case-insensitive substring.
    Literal(&'static str),
    Regex(Regex),
    /// Regex matched against code and against the text of string literals
    /// that sit in code; a literal hit anchors at its opening quote.
    Payload(Regex),
    /// Regex matched against comment and docstring text, plus string
    /// literal text when `in_strings`; every hit is its own issue.
    Marker { regex: Regex, in_strings: bool },
    /// `receiver.method(`; `regex` is compiled from the receiver and method.
    MemberCall {
        receiver: Receiver,
        method: &'static str,
        regex: Regex,
    },
    Structural(Structural),
}

#[derive(Debug, Clone)]
/// A named pattern-to-severity mapping within a category.
pub struct Rule {
    pub id: &'static str,
    pub category: Category,
    pub pattern: Pattern,
    /// Empty means every language.
    pub languages: &'static [Language],
    pub severity: Severity,
    /// Message template; `{name}` placeholders are filled from bindings.
    pub message: &'static str,
    pub suggestion: Option<&'static str>,
}

#[derive(Debug, Default, Clone)]
/// Placeholder values for message and suggestion templates.
pub struct Bindings {
    pairs: Vec<(&'static str, String)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.pairs.push((key, value.into()));
        self
    }

    pub fn render(&self, template: &str) -> String {
        let mut out = template.to_string();
        for (k, v) in &self.pairs {
            out = out.replace(&format!("{{{}}}", k), v);
        }
        out
    }
}

impl Rule {
    pub fn applies_to(&self, language: Language) -> bool {
        self.languages.is_empty() || self.languages.contains(&language)
    }

    /// Build the issue for a match of this rule.
    pub fn issue(&self, at: Location, bindings: &Bindings) -> Issue {
        Issue {
            severity: self.severity,
            message: bindings.render(self.message),
            line: at.line,
            column: at.column,
            rule: self.id.to_string(),
            suggestion: self.suggestion.map(|s| bindings.render(s)),
        }
    }

    /// Label used when listing the rule; the literal text for phrase rules.
    pub fn pattern_label(&self) -> String {
        match &self.pattern {
            Pattern::Literal(s) => (*s).to_string(),
            Pattern::Regex(re) | Pattern::Payload(re) | Pattern::Marker { regex: re, .. } => {
                re.as_str().to_string()
            }
            Pattern::MemberCall {
                receiver, method, ..
            } => match receiver {
                Receiver::Exact(r) => format!("{}{}(", r, method),
                Receiver::Any => format!(".{}(", method),
                Receiver::Inferred(shape) => format!("<{:?}>.{}(", shape, method).to_lowercase(),
            },
            Pattern::Structural(s) => format!("{:?}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(suggestion: Option<&'static str>) -> Rule {
        Rule {
            id: "api/test",
            category: Category::HallucinatedApi,
            pattern: Pattern::Literal("x"),
            languages: &[Language::Python],
            severity: Severity::High,
            message: "`{receiver}` has no `push`",
            suggestion,
        }
    }

    #[test]
    fn test_issue_factory_fills_every_field() {
        let at = Location {
            offset: 10,
            line: 3,
            column: 5,
        };
        let b = Bindings::new().with("receiver", "items");
        let is = rule(Some("use `{receiver}.append(...)`")).issue(at, &b);
        assert_eq!(is.rule, "api/test");
        assert_eq!(is.severity, Severity::High);
        assert_eq!(is.line, 3);
        assert_eq!(is.column, 5);
        assert_eq!(is.message, "`items` has no `push`");
        assert_eq!(is.suggestion.as_deref(), Some("use `items.append(...)`"));

        let none = rule(None).issue(at, &b);
        assert!(none.suggestion.is_none());
    }

    #[test]
    fn test_language_scope() {
        let r = rule(None);
        assert!(r.applies_to(Language::Python));
        assert!(!r.applies_to(Language::Rust));
        let any = Rule {
            languages: &[],
            ..rule(None)
        };
        assert!(any.applies_to(Language::Go));
    }
}

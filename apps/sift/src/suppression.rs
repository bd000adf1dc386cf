//! Inline suppression comments.
//!
//! ```text
//! x = eval(s)  # sift-ignore                 every rule, this line
//! x = eval(s)  # sift-ignore[sec/eval]       one rule, this line
//! // sift-ignore-next-line[a, b] reason      listed rules, next line
//! ```
//!
//! Directives only count inside comments, so a string that happens to
//! contain `sift-ignore` suppresses nothing.

use crate::analyzers::SourceUnit;
use crate::models::Issue;

const KEYWORD: &str = "sift-ignore";
const NEXT_LINE_SUFFIX: &str = "-next-line";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suppression {
    /// 1-based line the directive applies to.
    pub line: usize,
    /// `None` suppresses every rule.
    pub rule: Option<String>,
}

impl Suppression {
    pub fn covers(&self, issue: &Issue) -> bool {
        self.line == issue.line && self.rule.as_deref().map_or(true, |r| r == issue.rule)
    }
}

/// Directives found in the comments of `unit`.
pub fn parse_suppressions(unit: &SourceUnit) -> Vec<Suppression> {
    let text = unit.text;
    let mut out = Vec::new();
    for (offset, _) in text.match_indices(KEYWORD) {
        if !unit.map.classify(offset).is_comment() {
            continue;
        }
        let glued = unit
            .byte_before(offset)
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if glued {
            continue;
        }
        let line = unit.lines.line(offset);
        let rest = &text[offset + KEYWORD.len()..];
        let (line, rest) = match rest.strip_prefix(NEXT_LINE_SUFFIX) {
            Some(r) => (line + 1, r),
            None => (line, rest),
        };
        if rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            continue;
        }
        let ids = rest
            .strip_prefix('[')
            .and_then(|r| r.split(['\n', ']']).next().filter(|_| r.contains(']')));
        match ids {
            Some(list) => {
                let ids: Vec<&str> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect();
                if ids.is_empty() {
                    out.push(Suppression { line, rule: None });
                }
                out.extend(ids.into_iter().map(|id| Suppression {
                    line,
                    rule: Some(id.to_string()),
                }));
            }
            None => out.push(Suppression { line, rule: None }),
        }
    }
    out
}

/// Drop issues covered by any directive.
pub fn apply_suppressions(issues: Vec<Issue>, suppressions: &[Suppression]) -> Vec<Issue> {
    if suppressions.is_empty() {
        return issues;
    }
    issues
        .into_iter()
        .filter(|is| !suppressions.iter().any(|s| s.covers(is)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{profile, Language};

    fn parse(src: &str, lang: Language) -> Vec<Suppression> {
        let unit = SourceUnit::new("t", src, profile(lang));
        parse_suppressions(&unit)
    }

    #[test]
    fn test_same_line_and_next_line() {
        let src = "a = 1  # sift-ignore\n# sift-ignore-next-line[sec/eval, sec/exec] trusted input\neval(x)\n";
        let s = parse(src, Language::Python);
        assert_eq!(
            s,
            vec![
                Suppression { line: 1, rule: None },
                Suppression { line: 3, rule: Some("sec/eval".into()) },
                Suppression { line: 3, rule: Some("sec/exec".into()) },
            ]
        );
    }

    #[test]
    fn test_block_comment_directive() {
        let s = parse("eval(x); /* sift-ignore[sec/eval] */\n", Language::JavaScript);
        assert_eq!(s, vec![Suppression { line: 1, rule: Some("sec/eval".into()) }]);
    }

    #[test]
    fn test_directive_in_string_ignored() {
        assert!(parse("s = '# sift-ignore'\n", Language::Python).is_empty());
        assert!(parse("# not-sift-ignore\n# sift-ignored\n", Language::Python).is_empty());
    }

    #[test]
    fn test_apply() {
        let issue = |line: usize, rule: &str| Issue {
            severity: crate::models::Severity::High,
            message: String::new(),
            line,
            column: 1,
            rule: rule.into(),
            suggestion: None,
        };
        let sups = vec![Suppression { line: 2, rule: Some("sec/eval".into()) }];
        let kept = apply_suppressions(
            vec![issue(2, "sec/eval"), issue(2, "sec/exec"), issue(3, "sec/eval")],
            &sups,
        );
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|i| !(i.line == 2 && i.rule == "sec/eval")));
    }
}

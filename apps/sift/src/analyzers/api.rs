//! Hallucinated-API analyzer.
//!
//! Flags calls to members that do not exist on the receiver they are called
//! on, usually a spelling borrowed from another language (`json.parse` in
//! Python, `JSON.loads` in JavaScript), and imports of packages nobody has
//! heard of.

use super::{is_ident_byte, keep_highest_per_anchor, Analyzer, SourceUnit};
use crate::catalog::{KNOWN_JS_PACKAGES, KNOWN_PYTHON_MODULES};
use crate::language::Language;
use crate::models::rule::{Bindings, Pattern, Receiver, Rule, Shape, Structural};
use crate::models::{AnalyzerKind, Issue};
use regex::Regex;
use tracing::trace;

#[derive(Debug, Default)]
pub struct ApiAnalyzer;

impl Analyzer for ApiAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Code
    }

    fn analyze(&self, unit: &SourceUnit, rules: &[&Rule]) -> Vec<Issue> {
        let mut found = Vec::new();
        for (rank, rule) in rules.iter().enumerate() {
            let hits = match &rule.pattern {
                Pattern::MemberCall {
                    receiver, regex, ..
                } => member_calls(unit, *receiver, regex),
                Pattern::Structural(Structural::UnknownImport) => unknown_imports(unit),
                Pattern::Regex(regex) => unit
                    .code_matches(regex)
                    .map(|m| (m.start(), Bindings::new()))
                    .collect(),
                _ => Vec::new(),
            };
            for (offset, bindings) in hits {
                found.push((rank, rule.issue(unit.location(offset), &bindings)));
            }
        }
        trace!(path = unit.path, issues = found.len(), "api analyzer done");
        keep_highest_per_anchor(found)
    }
}

fn member_calls(unit: &SourceUnit, receiver: Receiver, regex: &Regex) -> Vec<(usize, Bindings)> {
    let mut hits = Vec::new();
    match receiver {
        Receiver::Exact(path) => {
            for m in regex.find_iter(unit.text) {
                let prev = unit.byte_before(m.start());
                if prev.is_some_and(|b| is_ident_byte(b) || b == b'.') {
                    continue;
                }
                if !unit.is_code_range(m.range()) {
                    continue;
                }
                let name = path.trim_end_matches(['.', ':']);
                hits.push((m.start(), Bindings::new().with("receiver", name)));
            }
        }
        Receiver::Any => {
            for m in regex.find_iter(unit.text) {
                if unit.is_code_range(m.range()) {
                    hits.push((m.start() + 1, Bindings::new()));
                }
            }
        }
        Receiver::Inferred(shape) => {
            for caps in regex.captures_iter(unit.text) {
                let (Some(all), Some(ident)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                if unit.byte_before(ident.start()) == Some(b'.') {
                    continue;
                }
                if !unit.is_code_range(all.range()) {
                    continue;
                }
                if inferred_shape(unit, ident.as_str(), ident.start()) == Some(shape) {
                    hits.push((
                        ident.start(),
                        Bindings::new().with("receiver", ident.as_str()),
                    ));
                }
            }
        }
    }
    hits
}

/// Shape of the value most recently assigned to `ident` before `before`.
fn inferred_shape(unit: &SourceUnit, ident: &str, before: usize) -> Option<Shape> {
    let pattern = format!(
        r"(?:^|[^\w$.]){}\s*(?::[^=\n;(]*)?:?=",
        regex::escape(ident)
    );
    let re = Regex::new(&pattern).ok()?;
    let head = unit.text.get(..before)?;
    let bytes = unit.text.as_bytes();
    let mut shape = None;
    for m in re.find_iter(head) {
        let eq = m.end();
        if bytes.get(eq) == Some(&b'=') {
            continue;
        }
        let name_at = m.as_str().find(ident).map_or(m.start(), |i| m.start() + i);
        if !unit.map.is_code(name_at) || !unit.map.is_code(eq - 1) {
            continue;
        }
        let value = head.get(eq..).unwrap_or("").trim_start_matches([' ', '\t']);
        let value_at = head.len() - value.len();
        if !unit.map.is_code(value_at) {
            continue;
        }
        shape = classify_value(value);
    }
    shape
}

fn classify_value(value: &str) -> Option<Shape> {
    const SEQUENCE: &[&str] = &[
        "[", "list(", "new Array", "Array(", "Array.of(", "Array.from(", "new ArrayList",
        "new LinkedList", "List.of(", "Arrays.asList(", "vec![", "Vec::new(",
    ];
    const TEXT: &[&str] = &["str(", "String(", "new String(", "String::from(", "\"", "'", "`"];
    const MAPPING: &[&str] = &["{", "dict(", "new Map(", "new HashMap", "Map.of(", "HashMap::new("];
    let starts = |set: &[&str]| set.iter().any(|p| value.starts_with(p));
    if starts(SEQUENCE) {
        return Some(Shape::Sequence);
    }
    if starts(MAPPING) {
        return Some(Shape::Mapping);
    }
    if starts(TEXT) {
        return Some(Shape::Text);
    }
    // String prefixes: f"..", r'..', b"..".
    let mut chars = value.chars();
    let first = chars.next()?;
    let rest = chars.as_str();
    if matches!(first, 'f' | 'r' | 'u' | 'b' | 'F' | 'R' | 'U' | 'B')
        && (rest.starts_with('"') || rest.starts_with('\''))
    {
        return Some(Shape::Text);
    }
    None
}

fn unknown_imports(unit: &SourceUnit) -> Vec<(usize, Bindings)> {
    let names = match unit.language() {
        Language::Python => python_imports(unit),
        Language::JavaScript | Language::TypeScript => js_imports(unit),
        _ => Vec::new(),
    };
    names
        .into_iter()
        .filter_map(|(offset, name)| {
            let known = match unit.language() {
                Language::Python => is_known(KNOWN_PYTHON_MODULES, &name),
                _ => is_known(KNOWN_JS_PACKAGES, &name),
            };
            (!known).then(|| (offset, Bindings::new().with("name", name)))
        })
        .collect()
}

fn is_known(list: &[&str], name: &str) -> bool {
    list.iter().any(|k| *k == name)
}

/// Top-level module names imported by Python statements, with offsets.
fn python_imports(unit: &SourceUnit) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut offset = 0;
    for line in unit.text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let indent = line.len() - line.trim_start().len();
        let stmt = &line[indent..];
        let at = line_start + indent;
        let (keyword, rest) = if let Some(r) = stmt.strip_prefix("from ") {
            ("from", r)
        } else if let Some(r) = stmt.strip_prefix("import ") {
            ("import", r)
        } else {
            continue;
        };
        if !unit.map.is_code(at) {
            continue;
        }
        let rest_at = at + keyword.len() + 1;
        let body_end = rest
            .find(['#', ';', '\n', '('])
            .unwrap_or(rest.len());
        let body = &rest[..body_end];
        let items: Vec<&str> = if keyword == "from" {
            body.split_whitespace().take(1).collect()
        } else {
            body.split(',').collect()
        };
        for item in items {
            let item_off = item.as_ptr() as usize - rest.as_ptr() as usize;
            let trimmed = item.trim_start();
            let name_at = rest_at + item_off + (item.len() - trimmed.len());
            let dotted = trimmed.split_whitespace().next().unwrap_or("");
            if dotted.is_empty() || dotted.starts_with('.') {
                continue;
            }
            let top = dotted.split('.').next().unwrap_or(dotted);
            if top.bytes().all(is_ident_byte) && !top.is_empty() {
                out.push((name_at, top.to_string()));
            }
        }
    }
    out
}

/// Package names imported by JS/TS `import`/`require`, with offsets.
fn js_imports(unit: &SourceUnit) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let bytes = unit.text.as_bytes();
    for lit in unit.map.literals() {
        if lit.interpolated || !unit.map.is_code(lit.start) {
            continue;
        }
        let head = unit.text.get(..lit.start).unwrap_or("").trim_end();
        let is_import = head.ends_with("from")
            || head.ends_with("import")
            || head.ends_with("require(")
            || head.ends_with("import(")
            || (head.ends_with('(') && head[..head.len() - 1].trim_end().ends_with("require"));
        if !is_import {
            continue;
        }
        // Keyword must itself be a whole word.
        let kw_end = head.len();
        let kw_start = head
            .trim_end_matches('(')
            .trim_end()
            .rfind(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '$')
            .map_or(0, |i| i + 1);
        if kw_start > 0 && bytes.get(kw_start - 1) == Some(&b'.') {
            continue;
        }
        if !unit.map.is_code(kw_end.saturating_sub(1)) {
            continue;
        }
        let spec = lit.text(unit.text);
        if let Some(name) = package_name(spec) {
            out.push((lit.content.start, name));
        }
    }
    out
}

/// Registry package for an import specifier; `None` for relative paths,
/// aliases and URLs.
fn package_name(spec: &str) -> Option<String> {
    let spec = spec.strip_prefix("node:").unwrap_or(spec);
    if spec.is_empty()
        || spec.starts_with(['.', '/', '~', '#'])
        || spec.starts_with("@/")
        || spec.contains(':')
    {
        return None;
    }
    let mut parts = spec.split('/');
    let first = parts.next()?;
    if first.starts_with('@') {
        let second = parts.next()?;
        Some(format!("{}/{}", first, second))
    } else {
        Some(first.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RuleCatalog;
    use crate::language::profile;
    use crate::models::Category;

    fn run(src: &str, lang: Language) -> Vec<Issue> {
        let catalog = RuleCatalog::builtin().unwrap();
        let rules = catalog.rules_for(lang, Category::HallucinatedApi);
        let unit = SourceUnit::new("t", src, profile(lang));
        ApiAnalyzer.analyze(&unit, &rules)
    }

    fn rule_ids(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.rule.as_str()).collect()
    }

    #[test]
    fn test_os_path_exist_flagged_once() {
        let issues = run("import os\nif os.path.exist(\"file.txt\"):\n    pass\n", Language::Python);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, "api/py-os-path-exist");
        assert_eq!((issues[0].line, issues[0].column), (2, 4));
        assert!(issues[0].suggestion.as_deref().unwrap().contains("exists"));
    }

    #[test]
    fn test_real_member_not_flagged() {
        let issues = run("import os\nos.path.exists('x')\nmy_os.path.exist('y')\n", Language::Python);
        assert!(issues.is_empty(), "{:?}", issues);
    }

    #[test]
    fn test_json_parse_and_stringify_suggestions() {
        let issues = run(
            "import json\na = json.parse('{\"key\": \"value\"}')\nb = json.stringify(data)\n",
            Language::Python,
        );
        assert_eq!(rule_ids(&issues), vec!["api/py-json-parse", "api/py-json-stringify"]);
        assert!(issues[0].suggestion.as_deref().unwrap().contains("loads"));
        assert!(issues[1].suggestion.as_deref().unwrap().contains("dumps"));
    }

    #[test]
    fn test_comment_and_string_mentions_ignored() {
        let js = "// arr.flatmap() example\nconst message = \"Use arr.push() instead of arr.append()\";\n";
        assert!(run(js, Language::JavaScript).is_empty());
        let py = "# os.path.exist(x)\ns = 'json.parse(y)'\n\"\"\"items.push(1)\"\"\"\n";
        assert!(run(py, Language::Python).is_empty());
    }

    #[test]
    fn test_inferred_receiver_shape() {
        let src = "items = []\nitems.push(1)\nname = 'x'\nname.push(2)\nother.push(3)\n";
        let issues = run(src, Language::Python);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, "api/py-list-push");
        assert_eq!(issues[0].line, 2);
        assert!(issues[0].message.contains("`items`"));
        assert_eq!(issues[0].suggestion.as_deref(), Some("use `items.append(...)`"));
    }

    #[test]
    fn test_reassignment_changes_shape() {
        let src = "v = []\nv = 'text'\nv.push(1)\nv.contains('e')\n";
        let issues = run(src, Language::Python);
        assert_eq!(rule_ids(&issues), vec!["api/py-str-contains"]);
    }

    #[test]
    fn test_js_array_append_and_flatmap() {
        let src = "const arr = [1, 2];\narr.append(3);\nconst out = arr.flatmap(f);\nJSON.loads(s);\n";
        let issues = run(src, Language::JavaScript);
        assert_eq!(
            rule_ids(&issues),
            vec!["api/js-array-append", "api/js-flatmap", "api/js-json-loads"]
        );
        assert!(issues[0].suggestion.as_deref().unwrap().contains("push"));
    }

    #[test]
    fn test_template_interpolation_is_checked() {
        let src = "const s = `n: ${list.flatmap(f)}`;\n";
        let issues = run(src, Language::TypeScript);
        assert_eq!(rule_ids(&issues), vec!["api/js-flatmap"]);
    }

    #[test]
    fn test_rust_path_call() {
        let src = "fn main() {\n    let s = std::fs::read_file(\"a\");\n    // fs::read_file(\"b\")\n}\n";
        let issues = run(src, Language::Rust);
        assert_eq!(rule_ids(&issues), vec!["api/rs-fs-read-file"]);
        assert_eq!(issues[0].line, 2);
    }

    #[test]
    fn test_python_unknown_imports() {
        let src = "import os, totally_fake_lib as t\nfrom requests import get\nfrom .local import x\nimport numpyy.linalg\n";
        let issues = run(src, Language::Python);
        let msgs: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            msgs,
            vec![
                "import of unknown module `totally_fake_lib`",
                "import of unknown module `numpyy`"
            ]
        );
        assert_eq!(issues[0].column, 12);
    }

    #[test]
    fn test_js_unknown_imports() {
        let src = "import fs from 'node:fs';\nimport x from \"left-padder\";\nconst r = require('./rel');\nconst s = require('@scope/ghost/sub');\nimport React from 'react';\n";
        let issues = run(src, Language::JavaScript);
        let msgs: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            msgs,
            vec![
                "import of unknown package `left-padder`",
                "import of unknown package `@scope/ghost`"
            ]
        );
    }

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("lodash/fp").as_deref(), Some("lodash"));
        assert_eq!(package_name("@a/b/c").as_deref(), Some("@a/b"));
        assert_eq!(package_name("../x"), None);
        assert_eq!(package_name("https://cdn/x.js"), None);
    }
}

//! Analyzer contract and the helpers analyzers share.
//!
//! An analyzer receives a lexed [`SourceUnit`] plus the catalog rules of its
//! category for the unit's language, and returns issues. Analyzers hold no
//! per-file state, never fail, and never see each other's output.

pub mod ai_text;
pub mod api;
pub mod security;

use crate::language::{Language, LanguageProfile};
use crate::lexer::{self, LexicalMap, Literal, LineIndex};
use crate::models::rule::Rule;
use crate::models::{AnalyzerKind, Issue, Location};
use regex::{Match, Regex};
use std::collections::BTreeMap;
use std::ops::Range;

pub use ai_text::AiTextAnalyzer;
pub use api::ApiAnalyzer;
pub use security::SecurityAnalyzer;

/// One source file, lexed once and shared read-only by every analyzer.
pub struct SourceUnit<'a> {
    pub path: &'a str,
    pub text: &'a str,
    pub profile: &'static LanguageProfile,
    pub map: LexicalMap,
    pub lines: LineIndex,
}

impl<'a> SourceUnit<'a> {
    pub fn new(path: &'a str, text: &'a str, profile: &'static LanguageProfile) -> Self {
        SourceUnit {
            path,
            text,
            profile,
            map: lexer::scan(text, profile),
            lines: LineIndex::new(text),
        }
    }

    pub fn language(&self) -> Language {
        self.profile.language
    }

    pub fn location(&self, offset: usize) -> Location {
        let (line, column) = self.lines.line_col(self.text, offset);
        Location {
            offset,
            line,
            column,
        }
    }

    /// True when every byte of `range` is code.
    pub fn is_code_range(&self, range: Range<usize>) -> bool {
        range.into_iter().all(|o| self.map.is_code(o))
    }

    pub fn slice(&self, range: Range<usize>) -> &'a str {
        self.text.get(range).unwrap_or("")
    }

    /// Byte before `offset`, if any.
    pub fn byte_before(&self, offset: usize) -> Option<u8> {
        offset
            .checked_sub(1)
            .and_then(|i| self.text.as_bytes().get(i).copied())
    }

    /// Regex matches lying entirely in code and not preceded by a member
    /// access (`.eval(` is some object's method, not the builtin).
    pub fn code_matches<'r>(&'r self, regex: &'r Regex) -> impl Iterator<Item = Match<'a>> + 'r {
        regex.find_iter(self.text).filter(move |m| {
            self.byte_before(m.start()) != Some(b'.') && self.is_code_range(m.range())
        })
    }

    /// Literals found in code, docstrings excluded.
    pub fn value_literals(&self) -> impl Iterator<Item = &Literal> {
        self.map
            .literals()
            .iter()
            .filter(|l| !l.doc && self.map.is_code(l.start))
    }

    /// Literals whose opening delimiter lies in `range`.
    pub fn literals_in(&self, range: Range<usize>) -> impl Iterator<Item = &Literal> {
        self.map
            .literals()
            .iter()
            .filter(move |l| range.contains(&l.start))
    }
}

/// Pluggable analysis pass over one source unit.
pub trait Analyzer: Send + Sync {
    fn kind(&self) -> AnalyzerKind;

    /// `rules` are already scoped to this analyzer's category and the
    /// unit's language, in catalog order.
    fn analyze(&self, unit: &SourceUnit, rules: &[&Rule]) -> Vec<Issue>;
}

pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Collapse issues sharing a line and column to the most severe one.
///
/// `found` pairs each issue with its rule's position in the rule slice;
/// equal severities keep the rule listed first.
pub(crate) fn keep_highest_per_anchor(found: Vec<(usize, Issue)>) -> Vec<Issue> {
    let mut best: BTreeMap<(usize, usize), (usize, Issue)> = BTreeMap::new();
    for (rank, issue) in found {
        let key = (issue.line, issue.column);
        let replace = match best.get(&key) {
            None => true,
            Some((kept_rank, kept)) => {
                issue.severity > kept.severity
                    || (issue.severity == kept.severity && rank < *kept_rank)
            }
        };
        if replace {
            best.insert(key, (rank, issue));
        }
    }
    best.into_values().map(|(_, issue)| issue).collect()
}

#[derive(Debug, Clone)]
/// A call site `callee(args)` found in code.
pub struct Call {
    /// Offset of the first byte of the callee text.
    pub start: usize,
    /// Offset of the opening parenthesis.
    pub open: usize,
    /// Offset of the closing parenthesis, or end of input when unbalanced.
    pub close: usize,
    /// Top-level arguments, trimmed.
    pub args: Vec<Range<usize>>,
}

/// Every call of `callee` whose text and parenthesis are code.
///
/// A callee starting with an identifier byte must not continue a longer
/// name or member path (`myos.system`, `x.os.system` do not match
/// `os.system`). A callee starting with `.` matches any receiver.
pub fn find_calls(unit: &SourceUnit, callee: &str) -> Vec<Call> {
    let bytes = unit.text.as_bytes();
    let check_boundary = callee.as_bytes().first().is_some_and(|b| is_ident_byte(*b));
    let mut calls = Vec::new();
    for (start, _) in unit.text.match_indices(callee) {
        if check_boundary {
            if let Some(prev) = unit.byte_before(start) {
                if is_ident_byte(prev) || prev == b'.' {
                    continue;
                }
            }
        }
        let mut open = start + callee.len();
        if bytes.get(open).is_some_and(|b| is_ident_byte(*b)) {
            continue;
        }
        while matches!(bytes.get(open), Some(b' ' | b'\t')) {
            open += 1;
        }
        if bytes.get(open) != Some(&b'(') || !unit.is_code_range(start..open + 1) {
            continue;
        }
        let (args, close) = split_arguments(unit, open + 1, b')');
        calls.push(Call {
            start,
            open,
            close,
            args,
        });
    }
    calls
}

/// Split the code from `from` up to the unmatched `closer` on top-level
/// commas. Only code bytes count toward nesting, so delimiters inside
/// literals and comments are ignored. Returns the trimmed pieces and the
/// offset of the closer (end of input when missing).
pub fn split_arguments(unit: &SourceUnit, from: usize, closer: u8) -> (Vec<Range<usize>>, usize) {
    let bytes = unit.text.as_bytes();
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut piece_start = from;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        if unit.map.is_code(i) {
            match b {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' if depth > 0 => depth -= 1,
                _ if b == closer && depth == 0 => break,
                b',' if depth == 0 => {
                    pieces.push(trim_range(unit.text, piece_start..i));
                    piece_start = i + 1;
                }
                _ => {}
            }
        }
        i += 1;
    }
    let last = trim_range(unit.text, piece_start..i);
    if !last.is_empty() {
        pieces.push(last);
    }
    pieces.retain(|r| !r.is_empty());
    (pieces, i)
}

pub(crate) fn trim_range(text: &str, range: Range<usize>) -> Range<usize> {
    let s = text.get(range.clone()).unwrap_or("");
    let lead = s.len() - s.trim_start().len();
    let trail = s.len() - s.trim_end().len();
    let start = range.start + lead;
    start..(range.end - trail).max(start)
}

/// If `range` is a list literal (`[...]`, `{...}`), its top-level elements.
pub fn list_elements(unit: &SourceUnit, range: Range<usize>) -> Option<Vec<Range<usize>>> {
    let bytes = unit.text.as_bytes();
    let first = *bytes.get(range.start)?;
    let closer = match first {
        b'[' => b']',
        b'{' => b'}',
        _ => return None,
    };
    if !unit.map.is_code(range.start) {
        return None;
    }
    let (items, close) = split_arguments(unit, range.start + 1, closer);
    (close + 1 == range.end).then_some(items)
}

/// True when `range` holds nothing but plain literals and numbers: no
/// identifiers, operators, calls, or interpolation.
pub fn is_static(unit: &SourceUnit, range: Range<usize>) -> bool {
    let mut code = String::new();
    let mut i = range.start;
    for lit in unit.literals_in(range.clone()) {
        if lit.interpolated {
            return false;
        }
        code.push_str(without_string_prefix(unit.slice(i..lit.start)));
        code.push(' ');
        i = lit.end.max(i);
    }
    if i < range.end {
        code.push_str(unit.slice(i..range.end));
    }
    code.chars()
        .filter(|c| !c.is_whitespace())
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '_'))
}

/// Drops prefix letters (`b"`, `rb'`) glued to the literal right after
/// `code`. A longer word is an identifier and is kept.
fn without_string_prefix(code: &str) -> &str {
    let trimmed = code.trim_end_matches(|c: char| {
        matches!(c, 'b' | 'r' | 'u' | 'f' | 'B' | 'R' | 'U' | 'F')
    });
    let glued = code.len() - trimmed.len();
    let word_before = trimmed.ends_with(|c: char| c.is_alphanumeric() || c == '_');
    if glued <= 2 && !word_before {
        trimmed
    } else {
        code
    }
}

/// Plain text of a static argument: the concatenated literal contents.
pub fn static_text(unit: &SourceUnit, range: Range<usize>) -> String {
    unit.literals_in(range)
        .map(|l| l.text(unit.text))
        .collect::<Vec<_>>()
        .concat()
}

//! Lexical context tracker.
//!
//! A single left-to-right pass splits source text into contiguous,
//! non-overlapping spans classified as code, comment, string or template
//! text, driven by a [`LanguageProfile`]. Analyzers consult the resulting
//! [`LexicalMap`] so a member name inside a comment or a string is never
//! mistaken for a call.
//!
//! Conventions:
//! - Comment markers belong to the comment span.
//! - Quote and template delimiters, and the opener / `}` of an
//!   interpolation (`${`, `#{`, f-string `{`), are code. Only literal
//!   content is `StringLiteral`/`TemplateLiteral`.
//! - Triple-quoted text is documentation only when it starts a statement.
//! - Block comments do not nest; the first end token closes them.
//! - Unterminated comments and literals extend to end of input.

use crate::language::{Interpolation, LanguageProfile};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Lexical classification of a byte offset.
pub enum Context {
    Code,
    LineComment,
    BlockComment,
    StringLiteral,
    TemplateLiteral,
}

impl Context {
    pub fn is_code(self) -> bool {
        self == Context::Code
    }

    pub fn is_comment(self) -> bool {
        matches!(self, Context::LineComment | Context::BlockComment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Half-open byte range with one classification.
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub context: Context,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Str,
    Raw,
    Char,
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One string/char/template literal found in code.
pub struct Literal {
    /// Offset of the opening delimiter (prefix letters excluded).
    pub start: usize,
    pub content: Range<usize>,
    /// Offset just past the closing delimiter.
    pub end: usize,
    pub kind: LiteralKind,
    /// Triple-quoted documentation text.
    pub doc: bool,
    /// Carries embedded expressions (`${..}`, `#{..}`, `f"{..}"`).
    pub interpolated: bool,
    pub terminated: bool,
}

impl Literal {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.content.clone()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A contiguous run of comment or documentation text.
pub struct TextBlock {
    pub range: Range<usize>,
    pub doc: bool,
}

#[derive(Debug, Clone, Default)]
/// Result of lexing one file.
pub struct LexicalMap {
    spans: Vec<Span>,
    literals: Vec<Literal>,
    len: usize,
}

impl LexicalMap {
    /// Classification of `offset`. Offsets past the end are reported as code.
    pub fn classify(&self, offset: usize) -> Context {
        let i = self.spans.partition_point(|s| s.end <= offset);
        match self.spans.get(i) {
            Some(s) if s.start <= offset => s.context,
            _ => Context::Code,
        }
    }

    pub fn is_code(&self, offset: usize) -> bool {
        self.classify(offset).is_code()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Literals in source order.
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Comment blocks and doc literals, ordered by start offset.
    ///
    /// Consecutive line comments separated only by whitespace form one
    /// block; each block comment and each doc literal stands alone.
    pub fn text_blocks(&self, text: &str) -> Vec<TextBlock> {
        let mut blocks: Vec<TextBlock> = Vec::new();
        let mut pending: Option<Range<usize>> = None;
        for span in &self.spans {
            match span.context {
                Context::LineComment => {
                    let joined = match pending.as_mut() {
                        Some(r) => {
                            let gap = text.get(r.end..span.start).unwrap_or("x");
                            if gap.trim().is_empty() {
                                r.end = span.end;
                                true
                            } else {
                                false
                            }
                        }
                        None => false,
                    };
                    if !joined {
                        if let Some(r) = pending.take() {
                            blocks.push(TextBlock { range: r, doc: false });
                        }
                        pending = Some(span.start..span.end);
                    }
                }
                Context::BlockComment => {
                    if let Some(r) = pending.take() {
                        blocks.push(TextBlock { range: r, doc: false });
                    }
                    blocks.push(TextBlock {
                        range: span.start..span.end,
                        doc: false,
                    });
                }
                _ => {}
            }
        }
        if let Some(r) = pending.take() {
            blocks.push(TextBlock { range: r, doc: false });
        }
        blocks.extend(self.literals.iter().filter(|l| l.doc).map(|l| TextBlock {
            range: l.content.clone(),
            doc: true,
        }));
        blocks.sort_by_key(|b| b.range.start);
        blocks
    }
}

/// Maps byte offsets to 1-based line/column pairs.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        LineIndex { starts }
    }

    pub fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|s| *s <= offset).max(1)
    }

    /// Line and character column of `offset`.
    pub fn line_col(&self, text: &str, offset: usize) -> (usize, usize) {
        let line = self.line(offset);
        let start = self.starts[line - 1];
        let col = text
            .get(start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(offset.saturating_sub(start));
        (line, col + 1)
    }

    /// Byte range of a 1-based line, newline excluded.
    pub fn line_range(&self, text: &str, line: usize) -> Range<usize> {
        let start = self.starts.get(line.wrapping_sub(1)).copied().unwrap_or(text.len());
        let end = self
            .starts
            .get(line)
            .map(|s| s - 1)
            .unwrap_or(text.len());
        start..end.max(start)
    }
}

/// Lex `text` according to `profile`.
pub fn scan(text: &str, profile: &LanguageProfile) -> LexicalMap {
    let scanner = Scanner {
        bytes: text.as_bytes(),
        profile,
        pos: 0,
        spans: Vec::new(),
        literals: Vec::new(),
        frames: Vec::new(),
    };
    scanner.run()
}

#[derive(Clone, Copy)]
/// How the text of one open literal is scanned.
struct Body<'a> {
    close: &'a [u8],
    escapes: bool,
    interpolation: Option<&'a Interpolation>,
    context: Context,
}

/// An open interpolation (`${`, `#{`, `{`) inside a literal.
struct Frame<'a> {
    depth: usize,
    literal: usize,
    body: Body<'a>,
}

struct Scanner<'a> {
    bytes: &'a [u8],
    profile: &'a LanguageProfile,
    pos: usize,
    spans: Vec<Span>,
    literals: Vec<Literal>,
    frames: Vec<Frame<'a>>,
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn utf8_len(b: u8) -> usize {
    match b {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}

impl<'a> Scanner<'a> {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn at(&self, pos: usize, tok: &str) -> bool {
        self.bytes
            .get(pos..)
            .is_some_and(|rest| rest.starts_with(tok.as_bytes()))
    }

    fn push(&mut self, start: usize, end: usize, context: Context) {
        let end = end.min(self.len());
        if start >= end {
            return;
        }
        if let Some(last) = self.spans.last_mut() {
            if last.context == context && last.end == start {
                last.end = end;
                return;
            }
        }
        self.spans.push(Span {
            start,
            end,
            context,
        });
    }

    fn find(&self, from: usize, tok: &str) -> Option<usize> {
        let needle = tok.as_bytes();
        if needle.is_empty() || from >= self.len() {
            return None;
        }
        self.bytes[from..]
            .windows(needle.len())
            .position(|w| w == needle)
            .map(|i| i + from)
    }

    fn run(mut self) -> LexicalMap {
        let mut code_start = 0;
        while self.pos < self.len() {
            let pos = self.pos;
            let b = self.bytes[pos];

            if let Some(frame) = self.frames.last_mut() {
                match b {
                    b'{' => {
                        frame.depth += 1;
                        self.pos += 1;
                        continue;
                    }
                    b'}' if frame.depth > 0 => {
                        frame.depth -= 1;
                        self.pos += 1;
                        continue;
                    }
                    b'}' => {
                        let (literal, body) = (frame.literal, frame.body);
                        self.frames.pop();
                        self.pos += 1;
                        self.push(code_start, self.pos, Context::Code);
                        code_start = self.literal_body(literal, body);
                        continue;
                    }
                    _ => {}
                }
            }

            let profile = self.profile;
            if profile.line_comments.iter().any(|t| self.at(pos, t)) {
                self.push(code_start, pos, Context::Code);
                let end = self.find(pos, "\n").unwrap_or(self.len());
                self.push(pos, end, Context::LineComment);
                self.pos = end;
                code_start = end;
                continue;
            }

            if let Some((open, close)) = profile.block_comment {
                if self.at(pos, open) {
                    self.push(code_start, pos, Context::Code);
                    let end = self
                        .find(pos + open.len(), close)
                        .map(|i| i + close.len())
                        .unwrap_or(self.len());
                    self.push(pos, end, Context::BlockComment);
                    self.pos = end;
                    code_start = end;
                    continue;
                }
            }

            if profile.raw_strings && b == b'r' {
                if let Some(hashes) = self.raw_string_hashes(pos) {
                    let content_start = pos + 1 + hashes + 1;
                    let mut close = String::from("\"");
                    close.extend(std::iter::repeat('#').take(hashes));
                    let (content_end, end, terminated) = match self.find(content_start, &close) {
                        Some(i) => (i, i + close.len(), true),
                        None => (self.len(), self.len(), false),
                    };
                    self.push(code_start, content_start, Context::Code);
                    self.push(content_start, content_end, Context::StringLiteral);
                    self.literals.push(Literal {
                        start: pos,
                        content: content_start..content_end,
                        end,
                        kind: LiteralKind::Raw,
                        doc: false,
                        interpolated: false,
                        terminated,
                    });
                    self.pos = end;
                    code_start = content_end;
                    continue;
                }
            }

            if profile.char_literals && b == b'\'' {
                match self.char_literal_end(pos) {
                    Some(end) => {
                        self.push(code_start, pos + 1, Context::Code);
                        self.push(pos + 1, end - 1, Context::StringLiteral);
                        self.literals.push(Literal {
                            start: pos,
                            content: pos + 1..end - 1,
                            end,
                            kind: LiteralKind::Char,
                            doc: false,
                            interpolated: false,
                            terminated: true,
                        });
                        self.pos = end;
                        code_start = end - 1;
                    }
                    // A lifetime or label; stays code.
                    None => self.pos += 1,
                }
                continue;
            }

            if let Some(rule) = profile.quotes.iter().find(|q| self.at(pos, q.delim)) {
                let prefix = self.prefix_before(pos);
                let interpolation = rule.interpolation.as_ref().filter(|i| {
                    i.prefixes.is_empty() || prefix.chars().any(|c| i.prefixes.contains(&c))
                });
                let doc = rule.doc && self.starts_statement(pos - prefix.len());
                let content_start = pos + rule.delim.len();
                self.push(code_start, content_start, Context::Code);
                self.literals.push(Literal {
                    start: pos,
                    content: content_start..content_start,
                    end: content_start,
                    kind: LiteralKind::Str,
                    doc,
                    interpolated: false,
                    terminated: false,
                });
                self.pos = content_start;
                let literal = self.literals.len() - 1;
                let body = Body {
                    close: rule.delim.as_bytes(),
                    escapes: rule.escapes,
                    interpolation,
                    context: Context::StringLiteral,
                };
                code_start = self.literal_body(literal, body);
                continue;
            }

            if let Some(t) = profile.template.as_ref() {
                if b == t.delim {
                    self.push(code_start, pos + 1, Context::Code);
                    self.pos = pos + 1;
                    self.literals.push(Literal {
                        start: pos,
                        content: pos + 1..pos + 1,
                        end: pos + 1,
                        kind: LiteralKind::Template,
                        doc: false,
                        interpolated: false,
                        terminated: false,
                    });
                    let literal = self.literals.len() - 1;
                    let body = Body {
                        close: std::slice::from_ref(&t.delim),
                        escapes: true,
                        interpolation: t.interpolation.as_ref(),
                        context: Context::TemplateLiteral,
                    };
                    code_start = self.literal_body(literal, body);
                    continue;
                }
            }

            self.pos += 1;
        }
        let len = self.len();
        self.push(code_start, len, Context::Code);
        LexicalMap {
            spans: self.spans,
            literals: self.literals,
            len,
        }
    }

    /// Scan literal text from `self.pos` until the closing delimiter or an
    /// interpolation opener. Returns where the next code region starts.
    fn literal_body(&mut self, literal: usize, body: Body<'a>) -> usize {
        let seg_start = self.pos;
        let mut p = self.pos;
        while p < self.len() {
            if body.escapes && self.bytes[p] == self.profile.escape {
                p += 2;
                continue;
            }
            if self.bytes[p..].starts_with(body.close) {
                let end = p + body.close.len();
                self.push(seg_start, p, body.context);
                let lit = &mut self.literals[literal];
                lit.content.end = p;
                lit.end = end;
                lit.terminated = true;
                self.pos = end;
                return p;
            }
            if let Some(interp) = body.interpolation {
                if self.at(p, interp.open) {
                    if interp.doubled_escape && self.at(p + interp.open.len(), interp.open) {
                        p += 2 * interp.open.len();
                        continue;
                    }
                    self.push(seg_start, p, body.context);
                    self.literals[literal].interpolated = true;
                    self.frames.push(Frame {
                        depth: 0,
                        literal,
                        body,
                    });
                    self.pos = p + interp.open.len();
                    return p;
                }
            }
            p += 1;
        }
        let len = self.len();
        self.push(seg_start, len, body.context);
        let lit = &mut self.literals[literal];
        lit.content.end = len;
        lit.end = len;
        self.pos = len;
        len
    }

    /// Only indentation precedes `at` on its line, and the previous
    /// non-blank byte does not leave an expression open.
    fn starts_statement(&self, at: usize) -> bool {
        let mut p = at;
        while p > 0 && matches!(self.bytes[p - 1], b' ' | b'\t') {
            p -= 1;
        }
        if p > 0 && !matches!(self.bytes[p - 1], b'\n' | b'\r') {
            return false;
        }
        while p > 0 && self.bytes[p - 1].is_ascii_whitespace() {
            p -= 1;
        }
        match p.checked_sub(1).map(|i| self.bytes[i]) {
            None => true,
            Some(b) => !matches!(b, b'=' | b'(' | b'[' | b'{' | b',' | b'+' | b'%' | b'\\'),
        }
    }

    /// Letters glued to the front of a quote (`f`, `rb`, ...).
    fn prefix_before(&self, quote: usize) -> &'a str {
        let mut start = quote;
        while start > 0 && quote - start < 3 && self.bytes[start - 1].is_ascii_alphabetic() {
            start -= 1;
        }
        if start > 0 && is_ident(self.bytes[start - 1]) {
            return "";
        }
        std::str::from_utf8(&self.bytes[start..quote]).unwrap_or("")
    }

    /// `r"`, `r#"`, `br"`: number of hashes when `pos` opens a raw string.
    fn raw_string_hashes(&self, pos: usize) -> Option<usize> {
        if pos > 0 {
            let prev = self.bytes[pos - 1];
            let byte_prefix = prev == b'b' && (pos < 2 || !is_ident(self.bytes[pos - 2]));
            if is_ident(prev) && !byte_prefix {
                return None;
            }
        }
        let mut p = pos + 1;
        while self.bytes.get(p) == Some(&b'#') {
            p += 1;
        }
        (self.bytes.get(p) == Some(&b'"')).then_some(p - pos - 1)
    }

    /// End offset (past the closing quote) of a char literal at `pos`.
    fn char_literal_end(&self, pos: usize) -> Option<usize> {
        let next = *self.bytes.get(pos + 1)?;
        if next == b'\\' {
            let limit = (pos + 14).min(self.len());
            return (pos + 3..limit)
                .find(|&i| self.bytes[i] == b'\'')
                .map(|i| i + 1);
        }
        if next == b'\'' || next == b'\n' {
            return None;
        }
        let close = pos + 1 + utf8_len(next);
        (self.bytes.get(close) == Some(&b'\'')).then_some(close + 1)
    }
}

//! Language profiles: comment and literal syntax expressed as data.
//!
//! The lexer is driven entirely by these records, so supporting a new
//! language means adding a profile here, not a new code path.

use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Source languages understood by the lexer.
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Rust,
    Go,
    Java,
    Ruby,
    Shell,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Java => "java",
            Language::Ruby => "ruby",
            Language::Shell => "shell",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
/// Embedded-expression syntax inside a literal; the region is closed by
/// the matching `}`.
pub struct Interpolation {
    pub open: &'static str,
    /// Prefix letters that switch it on (`f"..."`); empty means always.
    pub prefixes: &'static [char],
    /// A doubled opener (`{{`) is literal text.
    pub doubled_escape: bool,
}

const DOLLAR_BRACE: Interpolation = Interpolation {
    open: "${",
    prefixes: &[],
    doubled_escape: false,
};

const PY_FORMAT: Interpolation = Interpolation {
    open: "{",
    prefixes: &['f', 'F'],
    doubled_escape: true,
};

#[derive(Debug)]
/// A string delimiter. Profiles list longer delimiters first so `"""` wins
/// over `"`.
pub struct QuoteRule {
    pub delim: &'static str,
    /// Whether the escape character consumes the following byte.
    pub escapes: bool,
    /// Content is documentation text when the literal starts a statement
    /// (triple-quoted docstrings).
    pub doc: bool,
    pub interpolation: Option<Interpolation>,
}

#[derive(Debug)]
/// Template literal syntax (JS backticks).
pub struct TemplateRule {
    pub delim: u8,
    pub interpolation: Option<Interpolation>,
}

#[derive(Debug)]
/// Immutable lexical description of one language.
pub struct LanguageProfile {
    pub language: Language,
    pub extensions: &'static [&'static str],
    pub line_comments: &'static [&'static str],
    pub block_comment: Option<(&'static str, &'static str)>,
    pub quotes: &'static [QuoteRule],
    /// Rust raw strings: `r"..."`, `r#"..."#`.
    pub raw_strings: bool,
    /// `'` opens a char literal only when it closes right away; otherwise
    /// it is a lifetime and stays code.
    pub char_literals: bool,
    pub template: Option<TemplateRule>,
    pub escape: u8,
}

const C_QUOTES: &[QuoteRule] = &[
    QuoteRule {
        delim: "\"",
        escapes: true,
        doc: false,
        interpolation: None,
    },
    QuoteRule {
        delim: "'",
        escapes: true,
        doc: false,
        interpolation: None,
    },
];

static PROFILES: [LanguageProfile; 8] = [
    LanguageProfile {
        language: Language::Python,
        extensions: &["py", "pyi", "pyw"],
        line_comments: &["#"],
        block_comment: None,
        quotes: &[
            QuoteRule {
                delim: "\"\"\"",
                escapes: true,
                doc: true,
                interpolation: Some(PY_FORMAT),
            },
            QuoteRule {
                delim: "'''",
                escapes: true,
                doc: true,
                interpolation: Some(PY_FORMAT),
            },
            QuoteRule {
                delim: "\"",
                escapes: true,
                doc: false,
                interpolation: Some(PY_FORMAT),
            },
            QuoteRule {
                delim: "'",
                escapes: true,
                doc: false,
                interpolation: Some(PY_FORMAT),
            },
        ],
        raw_strings: false,
        char_literals: false,
        template: None,
        escape: b'\\',
    },
    LanguageProfile {
        language: Language::JavaScript,
        extensions: &["js", "jsx", "mjs", "cjs"],
        line_comments: &["//"],
        block_comment: Some(("/*", "*/")),
        quotes: C_QUOTES,
        raw_strings: false,
        char_literals: false,
        template: Some(TemplateRule {
            delim: b'`',
            interpolation: Some(DOLLAR_BRACE),
        }),
        escape: b'\\',
    },
    LanguageProfile {
        language: Language::TypeScript,
        extensions: &["ts", "tsx", "mts", "cts"],
        line_comments: &["//"],
        block_comment: Some(("/*", "*/")),
        quotes: C_QUOTES,
        raw_strings: false,
        char_literals: false,
        template: Some(TemplateRule {
            delim: b'`',
            interpolation: Some(DOLLAR_BRACE),
        }),
        escape: b'\\',
    },
    LanguageProfile {
        language: Language::Rust,
        extensions: &["rs"],
        line_comments: &["//"],
        block_comment: Some(("/*", "*/")),
        quotes: &[QuoteRule {
            delim: "\"",
            escapes: true,
            doc: false,
            interpolation: None,
        }],
        raw_strings: true,
        char_literals: true,
        template: None,
        escape: b'\\',
    },
    LanguageProfile {
        language: Language::Go,
        extensions: &["go"],
        line_comments: &["//"],
        block_comment: Some(("/*", "*/")),
        quotes: &[
            QuoteRule {
                delim: "\"",
                escapes: true,
                doc: false,
                interpolation: None,
            },
            QuoteRule {
                delim: "'",
                escapes: true,
                doc: false,
                interpolation: None,
            },
            QuoteRule {
                delim: "`",
                escapes: false,
                doc: false,
                interpolation: None,
            },
        ],
        raw_strings: false,
        char_literals: false,
        template: None,
        escape: b'\\',
    },
    LanguageProfile {
        language: Language::Java,
        extensions: &["java"],
        line_comments: &["//"],
        block_comment: Some(("/*", "*/")),
        quotes: &[
            QuoteRule {
                delim: "\"\"\"",
                escapes: true,
                doc: false,
                interpolation: None,
            },
            QuoteRule {
                delim: "\"",
                escapes: true,
                doc: false,
                interpolation: None,
            },
            QuoteRule {
                delim: "'",
                escapes: true,
                doc: false,
                interpolation: None,
            },
        ],
        raw_strings: false,
        char_literals: false,
        template: None,
        escape: b'\\',
    },
    LanguageProfile {
        language: Language::Ruby,
        extensions: &["rb", "rake"],
        line_comments: &["#"],
        block_comment: Some(("=begin", "=end")),
        quotes: &[
            QuoteRule {
                delim: "\"",
                escapes: true,
                doc: false,
                interpolation: Some(Interpolation {
                    open: "#{",
                    prefixes: &[],
                    doubled_escape: false,
                }),
            },
            QuoteRule {
                delim: "'",
                escapes: true,
                doc: false,
                interpolation: None,
            },
        ],
        raw_strings: false,
        char_literals: false,
        template: None,
        escape: b'\\',
    },
    LanguageProfile {
        language: Language::Shell,
        extensions: &["sh", "bash", "zsh"],
        line_comments: &["#"],
        block_comment: None,
        quotes: &[
            QuoteRule {
                delim: "\"",
                escapes: true,
                doc: false,
                interpolation: Some(DOLLAR_BRACE),
            },
            QuoteRule {
                delim: "'",
                escapes: false,
                doc: false,
                interpolation: None,
            },
        ],
        raw_strings: false,
        char_literals: false,
        template: None,
        escape: b'\\',
    },
];

/// Profile for a language.
pub fn profile(language: Language) -> &'static LanguageProfile {
    // The table holds exactly one entry per variant.
    PROFILES
        .iter()
        .find(|p| p.language == language)
        .unwrap_or(&PROFILES[0])
}

/// Look a profile up by file extension (case-insensitive, no dot).
pub fn profile_for_extension(ext: &str) -> Option<&'static LanguageProfile> {
    let ext = ext.to_ascii_lowercase();
    PROFILES
        .iter()
        .find(|p| p.extensions.iter().any(|e| *e == ext))
}

/// Look a profile up from a path's extension.
pub fn profile_for_path(path: &Path) -> Option<&'static LanguageProfile> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(profile_for_extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_extension() {
        assert_eq!(
            profile_for_path(Path::new("src/app.PY")).map(|p| p.language),
            Some(Language::Python)
        );
        assert_eq!(
            profile_for_path(Path::new("web/index.tsx")).map(|p| p.language),
            Some(Language::TypeScript)
        );
        assert!(profile_for_path(Path::new("README.md")).is_none());
        assert!(profile_for_path(Path::new("Makefile")).is_none());
    }

    #[test]
    fn test_every_language_has_a_profile() {
        for lang in [
            Language::Python,
            Language::JavaScript,
            Language::TypeScript,
            Language::Rust,
            Language::Go,
            Language::Java,
            Language::Ruby,
            Language::Shell,
        ] {
            assert_eq!(profile(lang).language, lang);
        }
    }

    #[test]
    fn test_longer_delimiters_listed_first() {
        for p in PROFILES.iter() {
            for w in p.quotes.windows(2) {
                assert!(w[0].delim.len() >= w[1].delim.len(), "{}", p.language);
            }
        }
    }
}

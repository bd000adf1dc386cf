//! sift core library.
//!
//! Lexical static analysis for source files: hallucinated API members,
//! security anti-patterns and machine-generated prose in comments. Nothing
//! is parsed; a per-language lexer classifies every byte as code, comment,
//! string or template, and the analyzers match catalog rules against that
//! map.
//!
//! High-level modules:
//! - `language`: Per-language comment and literal syntax as data.
//! - `lexer`: Context classification and line/column lookup.
//! - `models`: Issue, result and rule types.
//! - `catalog`: The built-in rule catalog.
//! - `analyzers`: The `code`, `text` and `security` analyzers.
//! - `suppression`: `sift-ignore` inline comments.
//! - `baseline`: Accepted-issue fingerprints in `.sift/baseline.json`.
//! - `engine`: Per-file orchestration and parallel runs.
//! - `config`: Discovery and effective configuration resolution.
//! - `scan`: Path, directory and glob expansion.
//! - `output`: Human/JSON printers.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `error`: Error types and tracing setup.
//! - `utils`: Supporting helpers.
pub mod analyzers;
pub mod baseline;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod language;
pub mod lexer;
pub mod models;
pub mod output;
pub mod scan;
pub mod suppression;
pub mod utils;

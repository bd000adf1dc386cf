//! Shared data models for analyzer output and the rule catalog.

pub mod rule;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Issue severity, ordered from least to most severe.
///
/// Serialized as the capitalized variant name (`"High"`); parsed from the
/// lowercase config/CLI spelling through [`Severity::parse`].
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Case-insensitive parse of `low|medium|high|critical`.
    pub fn parse(s: &str) -> Option<Severity> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
/// Rule family. Each family is served by exactly one analyzer.
pub enum Category {
    HallucinatedApi,
    Security,
    AiText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Analyzer names as spelled in config files and on the command line.
pub enum AnalyzerKind {
    /// Hallucinated API members and unknown imports.
    Code,
    /// Machine-generated prose in comments and docstrings.
    Text,
    Security,
}

impl AnalyzerKind {
    pub const ALL: [AnalyzerKind; 3] = [AnalyzerKind::Code, AnalyzerKind::Text, AnalyzerKind::Security];

    pub fn parse(s: &str) -> Option<AnalyzerKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" => Some(AnalyzerKind::Code),
            "text" => Some(AnalyzerKind::Text),
            "security" => Some(AnalyzerKind::Security),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::Code => "code",
            AnalyzerKind::Text => "text",
            AnalyzerKind::Security => "security",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            AnalyzerKind::Code => Category::HallucinatedApi,
            AnalyzerKind::Text => Category::AiText,
            AnalyzerKind::Security => Category::Security,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Resolved position of an issue anchor.
pub struct Location {
    /// Byte offset into the source text.
    pub offset: usize,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A single detected problem.
///
/// Analyzers never build this by hand; see [`rule::Rule::issue`].
pub struct Issue {
    pub severity: Severity,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub rule: String,
    pub suggestion: Option<String>,
}

impl Issue {
    /// Ordering key used by the engine: line, rule id, then column/message
    /// so repeated runs are byte-identical.
    pub fn sort_key(&self) -> (usize, &str, usize, &str) {
        (self.line, self.rule.as_str(), self.column, self.message.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Per-file result produced by the engine.
pub struct AnalysisResult {
    pub path: String,
    pub issues: Vec<Issue>,
    /// Present when the file was skipped (unsupported language, unreadable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl AnalysisResult {
    pub fn skipped(path: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        AnalysisResult {
            path: path.into(),
            issues: Vec::new(),
            diagnostic: Some(diagnostic.into()),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.diagnostic.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Aggregated counters used by printers and the exit code.
pub struct Summary {
    pub files: usize,
    pub skipped: usize,
    pub issues: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Results for a whole run, ordered by path.
pub struct Report {
    pub files: Vec<AnalysisResult>,
    pub summary: Summary,
}

impl Report {
    pub fn from_results(mut files: Vec<AnalysisResult>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let mut summary = Summary::default();
        for f in &files {
            if f.is_skipped() {
                summary.skipped += 1;
            } else {
                summary.files += 1;
            }
            for is in &f.issues {
                summary.issues += 1;
                match is.severity {
                    Severity::Critical => summary.critical += 1,
                    Severity::High => summary.high += 1,
                    Severity::Medium => summary.medium += 1,
                    Severity::Low => summary.low += 1,
                }
            }
        }
        Report { files, summary }
    }

    /// Exit code contract: 0 when nothing qualifies, 1 otherwise.
    ///
    /// Results are already filtered by minimum severity, so any remaining
    /// issue counts.
    pub fn exit_code(&self) -> i32 {
        if self.summary.issues > 0 {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(line: usize, rule: &str, severity: Severity) -> Issue {
        Issue {
            severity,
            message: "m".into(),
            line,
            column: 1,
            rule: rule.into(),
            suggestion: None,
        }
    }

    #[test]
    fn test_severity_order_and_parse() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
        assert_eq!(Severity::parse("HIGH"), Some(Severity::High));
        assert_eq!(Severity::parse(" low "), Some(Severity::Low));
        assert_eq!(Severity::parse("severe"), None);
    }

    #[test]
    fn test_severity_serializes_capitalized() {
        let v = serde_json::to_value(Severity::Critical).unwrap();
        assert_eq!(v, "Critical");
    }

    #[test]
    fn test_report_summary_and_exit_code() {
        let report = Report::from_results(vec![
            AnalysisResult {
                path: "b.py".into(),
                issues: vec![issue(1, "x", Severity::High), issue(2, "y", Severity::Low)],
                diagnostic: None,
            },
            AnalysisResult::skipped("a.txt", "unsupported language"),
        ]);
        assert_eq!(report.files[0].path, "a.txt");
        assert_eq!(report.summary.files, 1);
        assert_eq!(report.summary.skipped, 1);
        assert_eq!(report.summary.issues, 2);
        assert_eq!(report.summary.high, 1);
        assert_eq!(report.exit_code(), 1);

        let clean = Report::from_results(vec![AnalysisResult {
            path: "c.py".into(),
            issues: vec![],
            diagnostic: None,
        }]);
        assert_eq!(clean.exit_code(), 0);
    }

    #[test]
    fn test_skipped_serializes_diagnostic_only_when_present() {
        let ok = AnalysisResult {
            path: "a.py".into(),
            issues: vec![],
            diagnostic: None,
        };
        let v = serde_json::to_value(&ok).unwrap();
        assert!(v.get("diagnostic").is_none());
        let v = serde_json::to_value(AnalysisResult::skipped("b", "nope")).unwrap();
        assert_eq!(v["diagnostic"], "nope");
    }
}

//! Output rendering for `check` reports and the `rules` listing.
//!
//! Supports `human` (default) and `json`. The JSON form is
//! `{"files": [...], "summary": {...}}` with issues in engine order.

use crate::catalog::RuleCatalog;
use crate::config::OutputFormat;
use crate::models::{Report, Severity};
use crate::utils::{colors_enabled, plural};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(format: OutputFormat) -> bool {
    format != OutputFormat::Json && colors_enabled()
}

fn print_json(value: &JsonVal) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("{} {}", crate::utils::error_prefix(), e),
    }
}

/// Print a report in the requested format.
pub fn print_report(report: &Report, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&compose_report_json(report)),
        OutputFormat::Human => print!("{}", render_human(report, use_colors(format))),
    }
}

/// JSON document for a report.
pub fn compose_report_json(report: &Report) -> JsonVal {
    let files: Vec<JsonVal> = report
        .files
        .iter()
        .map(|f| {
            let mut entry = json!({
                "path": f.path,
                "issues": f.issues,
            });
            if let (Some(d), Some(obj)) = (&f.diagnostic, entry.as_object_mut()) {
                obj.insert("diagnostic".into(), json!(d));
            }
            entry
        })
        .collect();
    json!({
        "files": files,
        "summary": report.summary,
    })
}

fn severity_tag(sev: Severity, color: bool) -> String {
    let tag = format!("⟦{}⟧", sev.as_str());
    if !color {
        return tag;
    }
    match sev {
        Severity::Critical => tag.magenta().bold().to_string(),
        Severity::High => tag.red().bold().to_string(),
        Severity::Medium => tag.yellow().bold().to_string(),
        Severity::Low => tag.blue().bold().to_string(),
    }
}

fn severity_icon(sev: Severity, color: bool) -> String {
    let icon = match sev {
        Severity::Critical | Severity::High => "✖",
        Severity::Medium => "▲",
        Severity::Low => "◆",
    };
    if !color {
        return icon.to_string();
    }
    match sev {
        Severity::Critical => icon.magenta().to_string(),
        Severity::High => icon.red().to_string(),
        Severity::Medium => icon.yellow().to_string(),
        Severity::Low => icon.blue().to_string(),
    }
}

/// Human-readable report: one line per issue, a note per skipped file,
/// then the summary.
pub fn render_human(report: &Report, color: bool) -> String {
    let mut out = String::new();
    for f in &report.files {
        if let Some(diag) = &f.diagnostic {
            let label = if color {
                "skipped:".bright_black().to_string()
            } else {
                "skipped:".to_string()
            };
            out.push_str(&format!("{} {} ({})\n", label, f.path, diag));
            continue;
        }
        for is in &f.issues {
            let loc = format!("{}:{}:{}", f.path, is.line, is.column);
            let loc = if color { loc.bold().to_string() } else { loc };
            out.push_str(&format!(
                "{} {} {} ❲{}❳ — {}\n",
                severity_icon(is.severity, color),
                severity_tag(is.severity, color),
                loc,
                is.rule,
                is.message
            ));
            if let Some(s) = &is.suggestion {
                out.push_str(&format!("    ↳ {}\n", s));
            }
        }
    }
    let s = &report.summary;
    let summary = format!(
        "— Summary — {} in {} (critical={} high={} medium={} low={}, skipped={})",
        plural(s.issues, "issue"),
        plural(s.files, "file"),
        s.critical,
        s.high,
        s.medium,
        s.low,
        s.skipped
    );
    if color {
        out.push_str(&format!("{}\n", summary.bold()));
    } else {
        out.push_str(&summary);
        out.push('\n');
    }
    out
}

/// Print the rule catalog.
pub fn print_rules(catalog: &RuleCatalog, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&compose_rules_json(catalog)),
        OutputFormat::Human => {
            let color = use_colors(format);
            for r in catalog.iter() {
                let langs = if r.languages.is_empty() {
                    "all".to_string()
                } else {
                    r.languages
                        .iter()
                        .map(|l| l.as_str())
                        .collect::<Vec<_>>()
                        .join(",")
                };
                let id = if color {
                    r.id.bold().to_string()
                } else {
                    r.id.to_string()
                };
                println!(
                    "{} {} [{}] {}",
                    severity_tag(r.severity, color),
                    id,
                    langs,
                    r.message
                );
            }
            println!("{}", plural(catalog.len(), "rule"));
        }
    }
}

pub fn compose_rules_json(catalog: &RuleCatalog) -> JsonVal {
    let rules: Vec<JsonVal> = catalog
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "category": r.category,
                "severity": r.severity,
                "languages": r.languages,
                "pattern": r.pattern_label(),
                "message": r.message,
                "suggestion": r.suggestion,
            })
        })
        .collect();
    json!({ "rules": rules })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisResult, Issue};

    fn report() -> Report {
        Report::from_results(vec![
            AnalysisResult {
                path: "app.py".into(),
                issues: vec![Issue {
                    severity: Severity::High,
                    message: "`os.path.exist` does not exist".into(),
                    line: 3,
                    column: 1,
                    rule: "api/py-os-path-exist".into(),
                    suggestion: Some("use `os.path.exists(...)`".into()),
                }],
                diagnostic: None,
            },
            AnalysisResult::skipped("notes.txt", "unsupported language for notes.txt"),
        ])
    }

    #[test]
    fn test_report_json_shape() {
        let v = compose_report_json(&report());
        let files = v["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        let issue = &files[0]["issues"][0];
        assert_eq!(issue["severity"], "High");
        assert_eq!(issue["line"], 3);
        assert_eq!(issue["rule"], "api/py-os-path-exist");
        assert_eq!(issue["suggestion"], "use `os.path.exists(...)`");
        assert!(files[0].get("diagnostic").is_none());
        assert_eq!(files[1]["diagnostic"], "unsupported language for notes.txt");
        assert_eq!(v["summary"]["issues"], 1);
        let keys: Vec<&String> = issue.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["severity", "message", "line", "column", "rule", "suggestion"]
        );
    }

    #[test]
    fn test_human_render_without_color() {
        let text = render_human(&report(), false);
        assert!(text.contains("✖ ⟦high⟧ app.py:3:1 ❲api/py-os-path-exist❳"));
        assert!(text.contains("    ↳ use `os.path.exists(...)`"));
        assert!(text.contains("skipped: notes.txt"));
        assert!(text.trim_end().ends_with("skipped=1)"));
    }

    #[test]
    fn test_rules_json_lists_catalog() {
        let cat = RuleCatalog::builtin().unwrap();
        let v = compose_rules_json(&cat);
        let rules = v["rules"].as_array().unwrap();
        assert_eq!(rules.len(), cat.len());
        assert!(rules.iter().any(|r| r["id"] == "sec/eval" && r["severity"] == "High"));
    }
}

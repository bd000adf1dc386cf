use sift::catalog::RuleCatalog;
use sift::config::{resolve_effective, CliOverrides, OutputFormat};
use sift::engine::Engine;
use sift::error::Error;
use sift::models::{AnalyzerKind, Severity};
use sift::scan::{discover, read_inputs};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

const SAMPLE: &str = "import os\npassword = \"secret123\"\nos.system(\"rm -rf /tmp/dangerous\")\nurl = \"http://api.example.io\"\n";

fn write_config(root: &Path, name: &str, body: &str) {
    fs::create_dir_all(root.join(".sift")).unwrap();
    let mut f = fs::File::create(root.join(".sift").join(name)).unwrap();
    writeln!(f, "{}", body).unwrap();
}

fn write_sample(root: &Path) {
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/app.py"), SAMPLE).unwrap();
}

#[test]
fn cli_min_severity_beats_config() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_config(root, "config.yaml", "min_severity: low\noutput: json");
    write_sample(root);

    let from_config = resolve_effective(root.to_str(), &CliOverrides::default()).unwrap();
    assert_eq!(from_config.effective.min_severity, Severity::Low);
    assert_eq!(from_config.effective.output, OutputFormat::Json);

    let cli = CliOverrides {
        min_severity: Some("critical".into()),
        ..Default::default()
    };
    let resolved = resolve_effective(root.to_str(), &cli).unwrap();
    assert_eq!(resolved.effective.min_severity, Severity::Critical);
    assert_eq!(resolved.effective.output, OutputFormat::Json);

    let engine = Engine::new(RuleCatalog::builtin().unwrap());
    let files = discover(&[], &resolved.repo_root).unwrap();
    let report = engine.run_all(read_inputs(&files, &resolved.repo_root), &resolved.effective);
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].path, "src/app.py");
    assert!(!report.files[0].issues.is_empty());
    assert!(report.files[0]
        .issues
        .iter()
        .all(|i| i.severity == Severity::Critical));
}

#[test]
fn toml_config_selects_analyzers_and_ignores_rules() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_config(
        root,
        "config.toml",
        "analyzers = [\"security\"]\nignore_rules = [\"sec/insecure-url\"]",
    );
    write_sample(root);
    let resolved = resolve_effective(root.to_str(), &CliOverrides::default()).unwrap();
    assert_eq!(
        resolved.effective.analyzers.iter().copied().collect::<Vec<_>>(),
        vec![AnalyzerKind::Security]
    );
    let engine = Engine::new(RuleCatalog::builtin().unwrap());
    let files = discover(&["src".into()], &resolved.repo_root).unwrap();
    let report = engine.run_all(read_inputs(&files, &resolved.repo_root), &resolved.effective);
    let rules: Vec<&str> = report.files[0].issues.iter().map(|i| i.rule.as_str()).collect();
    assert!(rules.iter().all(|r| r.starts_with("sec/")));
    assert!(!rules.contains(&"sec/insecure-url"));
    assert!(rules.contains(&"sec/hardcoded-credential"));
}

#[test]
fn invalid_values_are_fatal() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_config(root, "config.yaml", "min_severity: severe");
    let err = resolve_effective(root.to_str(), &CliOverrides::default()).unwrap_err();
    assert!(matches!(err, Error::Config(ref e) if e.key == "min_severity"));

    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join(".git")).unwrap();
    let cli = CliOverrides {
        format: Some("xml".into()),
        ..Default::default()
    };
    let err = resolve_effective(dir.path().to_str(), &cli).unwrap_err();
    assert!(matches!(err, Error::Cli(ref e) if e.flag == "format" && e.value == "xml"));
}

#[test]
fn repeated_runs_are_identical() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_sample(root);
    fs::write(root.join("src/web.js"), "const x = JSON.loads(s);\neval(x);\n").unwrap();
    let resolved = resolve_effective(root.to_str(), &CliOverrides::default()).unwrap();
    let engine = Engine::new(RuleCatalog::builtin().unwrap());
    let once = || {
        let files = discover(&[], &resolved.repo_root).unwrap();
        let report = engine.run_all(read_inputs(&files, &resolved.repo_root), &resolved.effective);
        serde_json::to_string(&report).unwrap()
    };
    assert_eq!(once(), once());
}

#[test]
fn binary_exit_codes() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_sample(root);
    fs::write(root.join("clean.py"), "x = 1\n").unwrap();
    let sift = env!("CARGO_BIN_EXE_sift");

    let out = Command::new(sift)
        .args(["check", "--format", "json", "--repo-root"])
        .arg(root)
        .env("NO_COLOR", "1")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["summary"]["files"], 2);

    let out = Command::new(sift)
        .args(["check", "clean.py", "--repo-root"])
        .arg(root)
        .env("NO_COLOR", "1")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0));

    let out = Command::new(sift)
        .args(["check", "--min-severity", "extreme", "--repo-root"])
        .arg(root)
        .env("NO_COLOR", "1")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("--min-severity"));
}

#[test]
fn baseline_accepts_existing_issues() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_sample(root);
    let sift = env!("CARGO_BIN_EXE_sift");
    let run = |args: &[&str]| {
        Command::new(sift)
            .args(args)
            .arg("--repo-root")
            .arg(root)
            .env("NO_COLOR", "1")
            .output()
            .unwrap()
    };

    let out = run(&["baseline"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stderr).contains("info: Recorded"));
    assert!(root.join(".sift/baseline.json").is_file());

    assert_eq!(run(&["check"]).status.code(), Some(0));
    assert_eq!(run(&["check", "--no-baseline"]).status.code(), Some(1));

    let mut f = fs::OpenOptions::new()
        .append(true)
        .open(root.join("src/app.py"))
        .unwrap();
    writeln!(f, "eval(user_input)").unwrap();
    let out = run(&["check", "--format", "json"]);
    assert_eq!(out.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["summary"]["issues"], 1);

    assert_eq!(run(&["baseline", "--clear"]).status.code(), Some(0));
    assert!(!root.join(".sift/baseline.json").exists());
}

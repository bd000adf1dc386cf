//! Configuration discovery and effective settings resolution.
//!
//! sift reads `.sift/config.yaml|yml|toml` from the repository root (the
//! closest ancestor holding `.sift/` or `.git`) and merges it with CLI flags
//! into an [`EffectiveConfig`].
//! Defaults:
//! - `analyzers`: `[code, text, security]`
//! - `output`: `human`
//! - `min_severity`: `low`
//! - `ignore_rules`: none
//!
//! Overrides precedence: CLI > config file > defaults, field by field.

use crate::error::{CliError, ConfigError, Error};
use crate::models::{AnalyzerKind, Severity};
use serde_json::Value as Json;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR: &str = ".sift";
pub const CONFIG_FILES: [&str; 3] = ["config.yaml", "config.yml", "config.toml"];
const KNOWN_KEYS: [&str; 4] = ["analyzers", "output", "min_severity", "ignore_rules"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<OutputFormat> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Some(OutputFormat::Human),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Human => "human",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Config file syntax, chosen by extension.
pub enum Syntax {
    Yaml,
    Toml,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
/// Validated contents of `.sift/config.*`. Absent keys stay `None`.
pub struct ConfigFile {
    pub analyzers: Option<BTreeSet<AnalyzerKind>>,
    pub output: Option<OutputFormat>,
    pub min_severity: Option<Severity>,
    pub ignore_rules: Option<BTreeSet<String>>,
}

impl ConfigFile {
    /// Parse then validate config text.
    pub fn parse(text: &str, syntax: Syntax) -> Result<ConfigFile, ConfigError> {
        if text.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        let value: Json = match syntax {
            Syntax::Yaml => serde_yaml::from_str(text)
                .map_err(|e| ConfigError::new("<file>", format!("invalid YAML: {}", e)))?,
            Syntax::Toml => toml::from_str(text)
                .map_err(|e| ConfigError::new("<file>", format!("invalid TOML: {}", e)))?,
        };
        ConfigFile::from_value(&value)
    }

    /// Validate an already-parsed document. Unknown keys are errors.
    pub fn from_value(value: &Json) -> Result<ConfigFile, ConfigError> {
        let map = match value {
            Json::Null => return Ok(ConfigFile::default()),
            Json::Object(map) => map,
            _ => return Err(ConfigError::new("<root>", "expected a mapping of keys")),
        };
        let mut cfg = ConfigFile::default();
        for (key, v) in map {
            match key.as_str() {
                "analyzers" => {
                    let names = string_list(key, v)?;
                    let mut set = BTreeSet::new();
                    for n in names {
                        let kind = AnalyzerKind::parse(&n).ok_or_else(|| {
                            ConfigError::new(
                                key,
                                format!("unknown analyzer `{}` (expected code, text, security)", n),
                            )
                        })?;
                        set.insert(kind);
                    }
                    if set.is_empty() {
                        return Err(ConfigError::new(key, "must name at least one analyzer"));
                    }
                    cfg.analyzers = Some(set);
                }
                "output" => {
                    let s = string_value(key, v)?;
                    cfg.output = Some(OutputFormat::parse(s).ok_or_else(|| {
                        ConfigError::new(key, format!("expected json or human, got `{}`", s))
                    })?);
                }
                "min_severity" => {
                    let s = string_value(key, v)?;
                    cfg.min_severity = Some(Severity::parse(s).ok_or_else(|| {
                        ConfigError::new(
                            key,
                            format!("expected one of low, medium, high, critical, got `{}`", s),
                        )
                    })?);
                }
                "ignore_rules" => {
                    cfg.ignore_rules = Some(string_list(key, v)?.into_iter().collect());
                }
                other => {
                    return Err(ConfigError::new(
                        other,
                        format!("unknown key (expected one of {})", KNOWN_KEYS.join(", ")),
                    ))
                }
            }
        }
        Ok(cfg)
    }
}

fn string_value<'a>(key: &str, v: &'a Json) -> Result<&'a str, ConfigError> {
    v.as_str()
        .ok_or_else(|| ConfigError::new(key, "expected a string"))
}

/// A list of strings, or a single comma-separated string.
fn string_list(key: &str, v: &Json) -> Result<Vec<String>, ConfigError> {
    match v {
        Json::String(s) => Ok(split_list(s)),
        Json::Array(items) => items
            .iter()
            .map(|i| {
                i.as_str()
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| ConfigError::new(key, "expected a list of strings"))
            })
            .collect(),
        _ => Err(ConfigError::new(key, "expected a list of strings")),
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

#[derive(Debug, Default, Clone)]
/// Raw CLI values; validated during [`resolve`].
pub struct CliOverrides {
    pub min_severity: Option<String>,
    pub format: Option<String>,
    /// Comma-separated analyzer names.
    pub analyzers: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Defaults {
    pub analyzers: BTreeSet<AnalyzerKind>,
    pub output: OutputFormat,
    pub min_severity: Severity,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            analyzers: AnalyzerKind::ALL.into_iter().collect(),
            output: OutputFormat::Human,
            min_severity: Severity::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Fully-resolved settings used by the engine and printers.
pub struct EffectiveConfig {
    pub analyzers: BTreeSet<AnalyzerKind>,
    pub min_severity: Severity,
    pub output: OutputFormat,
    pub ignore_rules: BTreeSet<String>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        let d = Defaults::default();
        EffectiveConfig {
            analyzers: d.analyzers,
            min_severity: d.min_severity,
            output: d.output,
            ignore_rules: BTreeSet::new(),
        }
    }
}

/// Merge CLI values, the config file and defaults. Each field resolves on
/// its own; a bad CLI value fails even when the file would have supplied
/// a good one.
pub fn resolve(
    defaults: &Defaults,
    file: Option<&ConfigFile>,
    cli: &CliOverrides,
) -> Result<EffectiveConfig, Error> {
    let cli_severity = cli
        .min_severity
        .as_deref()
        .map(|s| {
            Severity::parse(s).ok_or_else(|| CliError {
                flag: "min-severity".into(),
                value: s.to_string(),
            })
        })
        .transpose()?;
    let cli_output = cli
        .format
        .as_deref()
        .map(|s| {
            OutputFormat::parse(s).ok_or_else(|| CliError {
                flag: "format".into(),
                value: s.to_string(),
            })
        })
        .transpose()?;
    let cli_analyzers = cli
        .analyzers
        .as_deref()
        .map(parse_analyzer_list)
        .transpose()?;

    let min_severity = cli_severity
        .or_else(|| file.and_then(|f| f.min_severity))
        .unwrap_or(defaults.min_severity);
    let output = cli_output
        .or_else(|| file.and_then(|f| f.output))
        .unwrap_or(defaults.output);
    let analyzers = cli_analyzers
        .or_else(|| file.and_then(|f| f.analyzers.clone()))
        .unwrap_or_else(|| defaults.analyzers.clone());
    let ignore_rules = file
        .and_then(|f| f.ignore_rules.clone())
        .unwrap_or_default();

    Ok(EffectiveConfig {
        analyzers,
        min_severity,
        output,
        ignore_rules,
    })
}

fn parse_analyzer_list(s: &str) -> Result<BTreeSet<AnalyzerKind>, CliError> {
    let err = || CliError {
        flag: "analyzers".into(),
        value: s.to_string(),
    };
    let names = split_list(s);
    if names.is_empty() {
        return Err(err());
    }
    names
        .iter()
        .map(|n| AnalyzerKind::parse(n).ok_or_else(err))
        .collect()
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `.sift/` directory or a `.git` entry is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if cur.join(CONFIG_DIR).is_dir() || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Path of the config file under `root`, if one exists.
pub fn config_path(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|f| root.join(CONFIG_DIR).join(f))
        .find(|p| p.is_file())
}

/// Load and validate the config file under `root`. A missing file is
/// `Ok(None)`.
pub fn load_config(root: &Path) -> Result<Option<ConfigFile>, Error> {
    let Some(path) = config_path(root) else {
        return Ok(None);
    };
    let text = fs::read_to_string(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    let syntax = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Syntax::Toml,
        _ => Syntax::Yaml,
    };
    Ok(Some(ConfigFile::parse(&text, syntax)?))
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub repo_root: PathBuf,
    pub config_found: bool,
    pub effective: EffectiveConfig,
}

/// Discover the repo root from `cli_repo_root` (default: current dir),
/// load its config and resolve against `cli`.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli: &CliOverrides,
) -> Result<Resolved, Error> {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let file = load_config(&repo_root)?;
    let effective = resolve(&Defaults::default(), file.as_ref(), cli)?;
    Ok(Resolved {
        repo_root,
        config_found: file.is_some(),
        effective,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_config(root: &Path, name: &str, body: &str) {
        fs::create_dir_all(root.join(CONFIG_DIR)).unwrap();
        let mut f = fs::File::create(root.join(CONFIG_DIR).join(name)).unwrap();
        writeln!(f, "{}", body).unwrap();
    }

    #[test]
    fn test_detect_and_load_yaml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_config(
            root,
            "config.yaml",
            r#"
analyzers: [code, security]
output: json
min_severity: medium
ignore_rules:
  - sec/insecure-url
"#,
        );
        let nested = root.join("src/pkg");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(detect_repo_root(&nested), root);

        let r = resolve_effective(root.to_str(), &CliOverrides::default()).unwrap();
        assert!(r.config_found);
        let eff = r.effective;
        assert_eq!(eff.output, OutputFormat::Json);
        assert_eq!(eff.min_severity, Severity::Medium);
        assert!(!eff.analyzers.contains(&AnalyzerKind::Text));
        assert!(eff.ignore_rules.contains("sec/insecure-url"));
    }

    #[test]
    fn test_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_config(
            root,
            "config.toml",
            r#"
analyzers = ["text"]
min_severity = "high"
"#,
        );
        let cfg = load_config(root).unwrap().unwrap();
        assert_eq!(cfg.min_severity, Some(Severity::High));
        assert_eq!(
            cfg.analyzers,
            Some([AnalyzerKind::Text].into_iter().collect())
        );
        assert_eq!(cfg.output, None);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let r = resolve_effective(dir.path().to_str(), &CliOverrides::default()).unwrap();
        assert!(!r.config_found);
        assert_eq!(r.effective, EffectiveConfig::default());
        assert_eq!(r.effective.analyzers.len(), 3);
    }

    #[test]
    fn test_cli_beats_file_per_field() {
        let file = ConfigFile::from_value(&json!({
            "min_severity": "low",
            "output": "json",
        }))
        .unwrap();
        let cli = CliOverrides {
            min_severity: Some("critical".into()),
            ..Default::default()
        };
        let eff = resolve(&Defaults::default(), Some(&file), &cli).unwrap();
        assert_eq!(eff.min_severity, Severity::Critical);
        // Not overridden on the CLI: file value stands.
        assert_eq!(eff.output, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_key_is_named() {
        let err = ConfigFile::from_value(&json!({"analyzers": ["code"], "colour": true}))
            .unwrap_err();
        assert_eq!(err.key, "colour");
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = ConfigFile::from_value(&json!({"min_severity": "severe"})).unwrap_err();
        assert_eq!(err.key, "min_severity");
        let err = ConfigFile::from_value(&json!({"analyzers": ["code", "lint"]})).unwrap_err();
        assert_eq!(err.key, "analyzers");
        let err = ConfigFile::from_value(&json!({"analyzers": []})).unwrap_err();
        assert_eq!(err.key, "analyzers");
        let err = ConfigFile::from_value(&json!({"output": 3})).unwrap_err();
        assert_eq!(err.key, "output");
        let err = ConfigFile::from_value(&json!(["a"])).unwrap_err();
        assert_eq!(err.key, "<root>");
    }

    #[test]
    fn test_bad_file_fails_resolution() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), "config.yml", "min_severity: [oops");
        let err = resolve_effective(dir.path().to_str(), &CliOverrides::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_bad_cli_values() {
        let d = Defaults::default();
        let cli = CliOverrides {
            format: Some("xml".into()),
            ..Default::default()
        };
        match resolve(&d, None, &cli) {
            Err(Error::Cli(e)) => assert_eq!(e.flag, "format"),
            other => panic!("unexpected {:?}", other),
        }
        let cli = CliOverrides {
            analyzers: Some("code,,bogus".into()),
            ..Default::default()
        };
        assert!(matches!(resolve(&d, None, &cli), Err(Error::Cli(_))));
        let cli = CliOverrides {
            analyzers: Some("text, code".into()),
            ..Default::default()
        };
        let eff = resolve(&d, None, &cli).unwrap();
        assert_eq!(eff.analyzers.len(), 2);
    }

    #[test]
    fn test_empty_yaml_is_empty_config() {
        assert_eq!(
            ConfigFile::parse("", Syntax::Yaml).unwrap(),
            ConfigFile::default()
        );
    }
}

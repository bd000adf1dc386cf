//! Error types and logging setup.

use std::path::PathBuf;

/// Top-level error for configuration, CLI and startup failures.
///
/// All of these are fatal: the binary reports them and exits with code 2
/// before any file is analyzed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cli(#[from] CliError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid baseline {}: {source}", path.display())]
    Baseline {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid path pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("tracing initialization error: {0}")]
    TracingInit(String),
}

/// A config file value that is present but invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid config key `{key}`: {reason}")]
pub struct ConfigError {
    pub key: String,
    pub reason: String,
}

impl ConfigError {
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// A command-line flag with an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value `{value}` for --{flag}")]
pub struct CliError {
    pub flag: String,
    pub value: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate rule id `{0}`")]
    Duplicate(String),

    #[error("rule `{id}` has an invalid pattern: {source}")]
    Pattern {
        id: String,
        #[source]
        source: regex::Error,
    },
}

/// Per-file failure. Never aborts a run; the file is reported as skipped.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unsupported language for {0}")]
    UnsupportedLanguage(String),
}

/// Install the stderr `tracing` subscriber.
///
/// `RUST_LOG` wins over the `verbose`/`quiet` flags when set.
pub fn init_tracing(verbose: bool, quiet: bool) -> Result<(), Error> {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::TracingInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let e: Error = ConfigError::new("min_severity", "expected one of low, medium, high, critical").into();
        assert_eq!(
            e.to_string(),
            "invalid config key `min_severity`: expected one of low, medium, high, critical"
        );
        let e: Error = CliError {
            flag: "format".into(),
            value: "xml".into(),
        }
        .into();
        assert_eq!(e.to_string(), "invalid value `xml` for --format");
    }

    #[test]
    fn test_init_tracing_twice_fails() {
        let _ = init_tracing(false, true);
        assert!(matches!(init_tracing(false, true), Err(Error::TracingInit(_))));
    }
}

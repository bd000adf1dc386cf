//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sift",
    version,
    about = "Lexical checks for hallucinated APIs, security issues and AI-generated prose",
    long_about = "sift scans source files without parsing them: it classifies code, comments and strings, then runs rule-driven analyzers over the result.\n\nConfiguration precedence: CLI > .sift/config.{yaml,yml,toml} > defaults.",
    after_help = "Examples:\n  sift check src/\n  sift check 'lib/**/*.py' --min-severity high\n  sift check --analyzers code,security --format json\n  sift baseline\n  sift rules --format json",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current sift version.")]
    Version,
    /// Analyze files
    #[command(
        about = "Analyze source files",
        long_about = "Run the enabled analyzers over every matched file. Exits 1 when any issue at or above the minimum severity remains, 2 on configuration errors.",
        after_help = "Examples:\n  sift check\n  sift check app.py web/ --format json\n  sift check --min-severity critical"
    )]
    Check {
        #[arg(help = "Files, directories or glob patterns (default: repository root)")]
        paths: Vec<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Minimum severity: low|medium|high|critical (default: low)")]
        min_severity: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        format: Option<String>,
        #[arg(long, help = "Comma-separated analyzers: code,text,security (default: all)")]
        analyzers: Option<String>,
        #[arg(long, short, action = clap::ArgAction::SetTrue, help = "Debug logging on stderr")]
        verbose: bool,
        #[arg(long, short, action = clap::ArgAction::SetTrue, conflicts_with = "verbose", help = "Only log errors")]
        quiet: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Report issues recorded in .sift/baseline.json too")]
        no_baseline: bool,
    },
    /// Record current issues as accepted
    #[command(
        about = "Record current issues as accepted",
        long_about = "Analyze the matched files and write a fingerprint of every issue to .sift/baseline.json. Later `check` runs hide those issues until the flagged line changes.",
        after_help = "Examples:\n  sift baseline\n  sift baseline src/ --analyzers security\n  sift baseline --clear"
    )]
    Baseline {
        #[arg(help = "Files, directories or glob patterns (default: repository root)")]
        paths: Vec<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Comma-separated analyzers: code,text,security (default: all)")]
        analyzers: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, conflicts_with = "paths", help = "Delete the baseline file instead")]
        clear: bool,
    },
    /// List built-in rules
    #[command(
        about = "List built-in rules",
        long_about = "Print every rule in the catalog with its severity, languages and message template."
    )]
    Rules {
        #[arg(long, help = "Output mode: human|json (default: human)")]
        format: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_args() {
        let cli = Cli::try_parse_from([
            "sift",
            "check",
            "src",
            "app.py",
            "--min-severity",
            "high",
            "--analyzers",
            "code,security",
            "-v",
        ])
        .unwrap();
        match cli.cmd {
            Commands::Check {
                paths,
                min_severity,
                analyzers,
                verbose,
                quiet,
                ..
            } => {
                assert_eq!(paths, vec!["src", "app.py"]);
                assert_eq!(min_severity.as_deref(), Some("high"));
                assert_eq!(analyzers.as_deref(), Some("code,security"));
                assert!(verbose);
                assert!(!quiet);
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_baseline_args() {
        let cli = Cli::try_parse_from(["sift", "baseline", "src", "--repo-root", "/r"]).unwrap();
        match cli.cmd {
            Commands::Baseline {
                paths,
                repo_root,
                clear,
                ..
            } => {
                assert_eq!(paths, vec!["src"]);
                assert_eq!(repo_root.as_deref(), Some("/r"));
                assert!(!clear);
            }
            _ => panic!("expected baseline"),
        }
        assert!(Cli::try_parse_from(["sift", "baseline", "src", "--clear"]).is_err());
        let cli = Cli::try_parse_from(["sift", "check", "--no-baseline"]).unwrap();
        assert!(matches!(cli.cmd, Commands::Check { no_baseline: true, .. }));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["sift", "check", "-v", "-q"]).is_err());
    }
}

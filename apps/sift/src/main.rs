//! sift CLI binary entry point.
//! Resolves configuration, discovers files, runs the engine and prints.

use clap::Parser;
use sift::baseline::{clear_baseline, load_baseline, save_baseline};
use sift::catalog::RuleCatalog;
use sift::cli::{Cli, Commands};
use sift::config::{self, CliOverrides, OutputFormat};
use sift::engine::Engine;
use sift::error::{init_tracing, CliError, Error};
use sift::utils::{error_prefix, info_prefix, note_prefix, plural};
use sift::{output, scan};
use tracing::info;

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Rules { format } => {
            let code = match rules(format.as_deref()) {
                Ok(()) => 0,
                Err(e) => fail(&e),
            };
            std::process::exit(code);
        }
        Commands::Check {
            paths,
            repo_root,
            min_severity,
            format,
            analyzers,
            verbose,
            quiet,
            no_baseline,
        } => {
            if let Err(e) = init_tracing(verbose, quiet) {
                eprintln!("{} {}", error_prefix(), e);
            }
            let overrides = CliOverrides {
                min_severity,
                format,
                analyzers,
            };
            let code = match check(&paths, repo_root.as_deref(), &overrides, !no_baseline) {
                Ok(code) => code,
                Err(e) => fail(&e),
            };
            std::process::exit(code);
        }
        Commands::Baseline {
            paths,
            repo_root,
            analyzers,
            clear,
        } => {
            let overrides = CliOverrides {
                analyzers,
                ..Default::default()
            };
            let code = match baseline(&paths, repo_root.as_deref(), &overrides, clear) {
                Ok(()) => 0,
                Err(e) => fail(&e),
            };
            std::process::exit(code);
        }
    }
}

fn fail(e: &Error) -> i32 {
    eprintln!("{} {}", error_prefix(), e);
    2
}

fn rules(format: Option<&str>) -> Result<(), Error> {
    let format = match format {
        None => OutputFormat::default(),
        Some(s) => OutputFormat::parse(s).ok_or_else(|| CliError {
            flag: "format".into(),
            value: s.to_string(),
        })?,
    };
    let catalog = RuleCatalog::builtin()?;
    output::print_rules(&catalog, format);
    Ok(())
}

fn check(
    paths: &[String],
    repo_root: Option<&str>,
    overrides: &CliOverrides,
    use_baseline: bool,
) -> Result<i32, Error> {
    let resolved = config::resolve_effective(repo_root, overrides)?;
    let eff = &resolved.effective;
    if !resolved.config_found && eff.output != OutputFormat::Json {
        eprintln!(
            "{} No .sift/config.{{yaml,yml,toml}} found; using defaults.",
            note_prefix()
        );
    }
    let mut engine = Engine::new(RuleCatalog::builtin()?);
    if use_baseline {
        if let Some(accepted) = load_baseline(&resolved.repo_root)? {
            info!(fingerprints = accepted.len(), "baseline loaded");
            engine = engine.with_baseline(accepted);
        }
    }
    let files = scan::discover(paths, &resolved.repo_root)?;
    info!(files = files.len(), root = %resolved.repo_root.display(), "starting analysis");
    let inputs = scan::read_inputs(&files, &resolved.repo_root);
    let report = engine.run_all(inputs, eff);
    output::print_report(&report, eff.output);
    Ok(report.exit_code())
}

fn baseline(
    paths: &[String],
    repo_root: Option<&str>,
    overrides: &CliOverrides,
    clear: bool,
) -> Result<(), Error> {
    let resolved = config::resolve_effective(repo_root, overrides)?;
    if clear {
        if clear_baseline(&resolved.repo_root)? {
            eprintln!("{} Baseline removed.", info_prefix());
        } else {
            eprintln!("{} No baseline to remove.", note_prefix());
        }
        return Ok(());
    }
    let engine = Engine::new(RuleCatalog::builtin()?);
    let files = scan::discover(paths, &resolved.repo_root)?;
    let inputs = scan::read_inputs(&files, &resolved.repo_root);
    let snapshot = engine.snapshot(&inputs, &resolved.effective);
    let written = save_baseline(&resolved.repo_root, &snapshot)?;
    eprintln!(
        "{} Recorded {} in {}.",
        info_prefix(),
        plural(snapshot.len(), "fingerprint"),
        written.display()
    );
    Ok(())
}

//! Orchestrator: one file in, one [`AnalysisResult`] out.
//!
//! The engine owns the rule catalog and the analyzer set. Each file is
//! lexed once; the enabled analyzers run over the same [`SourceUnit`] and
//! their issues are concatenated, then suppressions, the baseline,
//! ordering and the severity floor are applied.

use crate::analyzers::{AiTextAnalyzer, Analyzer, ApiAnalyzer, SecurityAnalyzer, SourceUnit};
use crate::baseline::{Baseline, Fingerprint};
use crate::catalog::RuleCatalog;
use crate::config::EffectiveConfig;
use crate::error::EngineError;
use crate::language::profile_for_path;
use crate::lexer::LineIndex;
use crate::models::{AnalysisResult, Issue, Report};
use crate::suppression::{apply_suppressions, parse_suppressions};
use rayon::prelude::*;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// A file handed to [`Engine::run_all`]; the read already happened.
#[derive(Debug)]
pub struct SourceInput {
    /// Display path, also used to pick the language.
    pub path: String,
    pub text: Result<String, io::Error>,
}

pub struct Engine {
    catalog: Arc<RuleCatalog>,
    analyzers: Vec<Box<dyn Analyzer>>,
    baseline: Option<Baseline>,
}

impl Engine {
    pub fn new(catalog: RuleCatalog) -> Self {
        Engine::with_analyzers(
            Arc::new(catalog),
            vec![
                Box::new(ApiAnalyzer),
                Box::new(AiTextAnalyzer::default()),
                Box::new(SecurityAnalyzer),
            ],
        )
    }

    pub fn with_analyzers(catalog: Arc<RuleCatalog>, analyzers: Vec<Box<dyn Analyzer>>) -> Self {
        Engine {
            catalog,
            analyzers,
            baseline: None,
        }
    }

    /// Drop issues whose fingerprint is in `baseline`.
    #[must_use]
    pub fn with_baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Analyze one file. Fails only when no language profile matches.
    pub fn run(
        &self,
        path: &str,
        text: &str,
        cfg: &EffectiveConfig,
    ) -> Result<AnalysisResult, EngineError> {
        self.analyze(path, text, cfg, self.baseline.as_ref())
    }

    fn analyze(
        &self,
        path: &str,
        text: &str,
        cfg: &EffectiveConfig,
        baseline: Option<&Baseline>,
    ) -> Result<AnalysisResult, EngineError> {
        let profile = profile_for_path(Path::new(path))
            .ok_or_else(|| EngineError::UnsupportedLanguage(path.to_string()))?;
        let unit = SourceUnit::new(path, text, profile);

        let mut issues: Vec<Issue> = Vec::new();
        for analyzer in &self.analyzers {
            let kind = analyzer.kind();
            if !cfg.analyzers.contains(&kind) {
                continue;
            }
            let rules: Vec<_> = self
                .catalog
                .rules_for(profile.language, kind.category())
                .into_iter()
                .filter(|r| !cfg.ignore_rules.contains(r.id))
                .collect();
            let found = analyzer.analyze(&unit, &rules);
            debug!(path, analyzer = kind.as_str(), issues = found.len(), "analyzed");
            issues.extend(found);
        }

        let mut issues = apply_suppressions(issues, &parse_suppressions(&unit));
        if let Some(baseline) = baseline {
            let before = issues.len();
            issues.retain(|is| !baseline.contains(&Fingerprint::of(path, is, text, &unit.lines)));
            debug!(path, accepted = before - issues.len(), "baseline applied");
        }
        issues.retain(|is| !cfg.ignore_rules.contains(&is.rule));
        issues.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        issues.retain(|is| is.severity >= cfg.min_severity);

        Ok(AnalysisResult {
            path: path.to_string(),
            issues,
            diagnostic: None,
        })
    }

    /// Analyze many files in parallel. Unsupported or unreadable files
    /// become skipped results; the run never aborts.
    pub fn run_all(&self, inputs: Vec<SourceInput>, cfg: &EffectiveConfig) -> Report {
        let results: Vec<AnalysisResult> = inputs
            .into_par_iter()
            .map(|input| match &input.text {
                Err(e) => {
                    warn!(path = %input.path, error = %e, "skipping unreadable file");
                    AnalysisResult::skipped(input.path, format!("read error: {}", e))
                }
                Ok(text) => match self.run(&input.path, text, cfg) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!(path = %input.path, "skipping: {}", e);
                        AnalysisResult::skipped(input.path, e.to_string())
                    }
                },
            })
            .collect();
        Report::from_results(results)
    }

    /// Fingerprint every issue the inputs produce, ignoring any loaded
    /// baseline. Skipped files contribute nothing.
    pub fn snapshot(&self, inputs: &[SourceInput], cfg: &EffectiveConfig) -> Baseline {
        let found: Vec<Vec<Fingerprint>> = inputs
            .par_iter()
            .filter_map(|input| {
                let text = input.text.as_ref().ok()?;
                let result = self.analyze(&input.path, text, cfg, None).ok()?;
                let lines = LineIndex::new(text);
                Some(
                    result
                        .issues
                        .iter()
                        .map(|is| Fingerprint::of(&input.path, is, text, &lines))
                        .collect(),
                )
            })
            .collect();
        let mut baseline = Baseline::new();
        for fingerprint in found.into_iter().flatten() {
            baseline.insert(fingerprint);
        }
        baseline
    }
}

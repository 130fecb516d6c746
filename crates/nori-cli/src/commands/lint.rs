//! `nori lint` - run the rule engine over PHP files

use std::fs;
use std::path::PathBuf;

use rayon::prelude::*;

use nori_core::config::NoriConfiguration;
use nori_core::diagnostics::{Diagnostic, DiagnosticRenderer, OutputFormat};
use nori_core::error::{NoriError, Result};
use nori_rules::LintEngine;

pub struct LintOptions {
    pub paths: Vec<PathBuf>,
    pub format: OutputFormat,
    pub colors: bool,
}

/// Returns the process exit code: 1 when any finding reaches the
/// configured `fail_on` threshold, 0 otherwise.
pub fn run(config: &NoriConfiguration, options: &LintOptions) -> Result<i32> {
    if !config.linter.enabled {
        tracing::warn!("the linter is disabled in nori.toml; nothing to do");
        return Ok(0);
    }
    let files = crate::discovery::FileDiscovery::new(&config.files)?.discover(&options.paths)?;
    tracing::info!("linting {} file(s)", files.len());

    let engine = LintEngine::new(config.linter.clone(), config.php_version);
    let per_file: Vec<Result<Vec<Diagnostic>>> = files
        .par_iter()
        .map(|path| {
            let source = fs::read_to_string(path).map_err(|e| NoriError::io(path.clone(), e))?;
            Ok(engine.lint_source(path, &source))
        })
        .collect();

    // files are already in path order; flattening keeps per-file sort
    let mut diagnostics = Vec::new();
    for result in per_file {
        diagnostics.extend(result?);
    }

    let mut renderer = DiagnosticRenderer::with_format(options.format);
    renderer.set_colors(options.colors);
    let rendered = renderer.render_diagnostics(&diagnostics);
    if !rendered.is_empty() {
        println!("{rendered}");
    }

    let worst = LintEngine::max_severity(&diagnostics);
    let failing = worst.is_some_and(|s| s.is_at_least(config.linter.fail_on));
    if failing {
        let count = diagnostics
            .iter()
            .filter(|d| d.severity.is_at_least(config.linter.fail_on))
            .count();
        tracing::debug!(
            "{count} finding(s) at or above {}",
            config.linter.fail_on.as_str()
        );
    }
    Ok(if failing { 1 } else { 0 })
}

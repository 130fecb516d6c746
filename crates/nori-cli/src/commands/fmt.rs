//! `nori fmt` - format PHP files

use std::fs;
use std::path::PathBuf;

use rayon::prelude::*;
use similar::TextDiff;

use nori_core::config::NoriConfiguration;
use nori_core::cst::format_source;
use nori_core::error::{NoriError, Result};
use nori_core::{Color, Console};

use crate::discovery::FileDiscovery;

pub struct FmtOptions {
    pub paths: Vec<PathBuf>,
    /// Report what would change without writing, exit 1 when dirty.
    pub check: bool,
    pub console: Console,
}

enum Outcome {
    Unchanged,
    Written,
    WouldChange { diff: String },
    /// Parse errors: the file was left untouched.
    Skipped,
}

/// Returns the process exit code.
pub fn run(config: &NoriConfiguration, options: &FmtOptions) -> Result<i32> {
    if !config.formatter.enabled {
        tracing::warn!("the formatter is disabled in nori.toml; nothing to do");
        return Ok(0);
    }
    let style = config.formatter.resolve()?;
    let version = config.php_version;
    let files = FileDiscovery::new(&config.files)?.discover(&options.paths)?;
    tracing::info!("formatting {} file(s)", files.len());

    let results: Vec<(PathBuf, Result<Outcome>)> = files
        .par_iter()
        .map(|path| {
            let outcome = (|| {
                let source =
                    fs::read_to_string(path).map_err(|e| NoriError::io(path.clone(), e))?;
                let result = format_source(&source, &style, version);
                if result.skipped {
                    return Ok(Outcome::Skipped);
                }
                if !result.changed {
                    return Ok(Outcome::Unchanged);
                }
                if options.check {
                    let diff = TextDiff::from_lines(&source, &result.formatted)
                        .unified_diff()
                        .header(
                            &format!("{} (original)", path.display()),
                            &format!("{} (formatted)", path.display()),
                        )
                        .to_string();
                    Ok(Outcome::WouldChange { diff })
                } else {
                    fs::write(path, &result.formatted)
                        .map_err(|e| NoriError::io(path.clone(), e))?;
                    Ok(Outcome::Written)
                }
            })();
            (path.clone(), outcome)
        })
        .collect();

    let console = &options.console;
    let mut written = 0usize;
    let mut dirty = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;
    for (path, outcome) in &results {
        match outcome {
            Ok(Outcome::Unchanged) => {}
            Ok(Outcome::Written) => {
                written += 1;
                eprintln!(
                    "{} {}",
                    console.colorize("formatted", Color::Green),
                    path.display()
                );
            }
            Ok(Outcome::WouldChange { diff }) => {
                dirty += 1;
                println!("{diff}");
            }
            Ok(Outcome::Skipped) => {
                skipped += 1;
                eprintln!(
                    "{} {} has syntax errors, left unchanged",
                    console.colorize("skipped:", Color::Yellow),
                    path.display()
                );
            }
            Err(err) => {
                failed += 1;
                eprintln!("{} {err}", console.colorize("error:", Color::Red));
            }
        }
    }

    if options.check {
        if dirty > 0 {
            eprintln!(
                "{} {dirty} file(s) would be reformatted",
                console.colorize("check failed:", Color::Red)
            );
        }
        return Ok(if dirty > 0 || skipped > 0 || failed > 0 { 1 } else { 0 });
    }

    tracing::debug!("wrote {written}, skipped {skipped}, failed {failed}");
    Ok(if failed > 0 { 1 } else { 0 })
}

//! File discovery
//!
//! Expands the paths given on the command line into the sorted list of PHP
//! files to process. Directories are walked with `walkdir` and filtered
//! through the `[files]` include/exclude globs from the configuration;
//! explicitly named files bypass the include filter but still honor the
//! excludes. The result is sorted so output order never depends on
//! traversal order.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use nori_core::config::FilesConfiguration;
use nori_core::error::{NoriError, Result};

pub struct FileDiscovery {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl FileDiscovery {
    pub fn new(files: &FilesConfiguration) -> Result<Self> {
        Ok(Self {
            include: compile_patterns(&files.include)?,
            exclude: compile_patterns(&files.exclude)?,
        })
    }

    /// Expand command-line paths (default: current directory) into files.
    pub fn discover(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let roots: Vec<PathBuf> = if paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            paths.to_vec()
        };

        let mut files = BTreeSet::new();
        for root in &roots {
            if root.is_file() {
                if !self.is_excluded(root) {
                    files.insert(root.clone());
                }
                continue;
            }
            if !root.is_dir() {
                return Err(NoriError::config(format!(
                    "path does not exist: {}",
                    root.display()
                )));
            }
            for entry in WalkDir::new(root).follow_links(false) {
                let entry = entry.map_err(|e| {
                    NoriError::config(format!("failed to walk {}: {e}", root.display()))
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                let relative = path.strip_prefix(root).unwrap_or(path);
                if self.matches(relative) {
                    files.insert(path.to_path_buf());
                }
            }
        }
        Ok(files.into_iter().collect())
    }

    fn matches(&self, relative: &Path) -> bool {
        self.include.iter().any(|p| p.matches_path(relative))
            && !self.exclude.iter().any(|p| p.matches_path(relative))
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_path(path))
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| NoriError::config(format!("invalid glob pattern '{p}': {e}")))
        })
        .collect()
}

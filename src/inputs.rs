//! Expands command-line paths into the list of source files to process.

use std::collections::BTreeSet;
use std::path::PathBuf;

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::config::ReorderConfig;
use crate::errors::ReorderError;

fn build_exclude_set(patterns: &[String]) -> Result<GlobSet, ReorderError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Explicit files are always kept. Directories are walked and filtered by
/// extension, exclude globs and size.
pub fn collect_source_files(
    paths: &[PathBuf],
    config: &ReorderConfig,
) -> Result<Vec<PathBuf>, ReorderError> {
    let exclude = build_exclude_set(&config.exclude)?;
    let mut files = BTreeSet::new();

    for path in paths {
        if path.is_file() {
            files.insert(path.clone());
            continue;
        }
        if !path.is_dir() {
            return Err(ReorderError::FileNotFound(path.clone()));
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file = entry.path();

            let has_extension = file
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| config.extensions.iter().any(|x| x == e));
            if !has_extension {
                continue;
            }

            let relative = file.strip_prefix(path).unwrap_or(file);
            if exclude.is_match(relative) || exclude.is_match(file) {
                tracing::debug!("Excluded {}", file.display());
                continue;
            }

            let size = entry.metadata()?.len();
            if size > config.max_file_size {
                tracing::warn!(
                    "Skipping {} ({size} bytes exceeds the {} byte limit)",
                    file.display(),
                    config.max_file_size
                );
                continue;
            }

            files.insert(file.to_path_buf());
        }
    }

    Ok(files.into_iter().collect())
}

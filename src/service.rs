//! # Reorder Service
//!
//! Runs the per-file pipeline: parse, plan edits for eligible constructors,
//! apply them to the original text and write the result back. Files are
//! processed one at a time and share no state.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::compdb::{CompilationDatabase, include_dirs_from_args};
use crate::config::ReorderConfig;
use crate::errors::ReorderError;
use crate::frontend::{CppFrontend, FrontendOptions};
use crate::reorder::plan_edits;
use crate::source::SpanResolver;
use crate::writer::{WriteOutcome, write_edited};

#[derive(Debug, Clone, Serialize)]
pub struct SkipRecord {
    pub constructor: String,
    pub location: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file_path: String,
    pub file_hash: String,
    pub constructors_seen: usize,
    pub constructors_eligible: usize,
    pub edits: usize,
    pub skipped: Vec<SkipRecord>,
    pub written: bool,
    pub changed: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub file_path: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
    pub total_edits: usize,
    pub files_written: usize,
}

impl RunSummary {
    /// 0 when every file was parsed and persisted, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.failures.is_empty() { 0 } else { 1 }
    }
}

#[derive(Debug, Clone)]
pub struct ReorderService {
    config: ReorderConfig,
    compilation_database: Option<CompilationDatabase>,
}

impl ReorderService {
    /// Create a service, loading `compile_commands.json` when a build path is configured.
    pub fn new(config: ReorderConfig) -> Result<Self, ReorderError> {
        let compilation_database = match &config.build_path {
            Some(dir) => {
                let db = CompilationDatabase::load(dir)?;
                tracing::info!("Loaded {} compile command(s) from {}", db.len(), dir.display());
                Some(db)
            }
            None => None,
        };
        Ok(Self {
            config,
            compilation_database,
        })
    }

    fn frontend_for(&self, path: &Path) -> CppFrontend {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut include_dirs = self.config.include_dirs.clone();
        include_dirs.extend(include_dirs_from_args(&self.config.compiler_args, &cwd));
        if let Some(db) = &self.compilation_database {
            include_dirs.extend(db.include_dirs_for(path));
        }
        CppFrontend::new(FrontendOptions {
            include_dirs,
            tolerate_parse_errors: self.config.tolerate_parse_errors,
        })
    }

    /// Reorder the initializer lists of every constructor defined in `path`.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn process_file(&self, path: &Path) -> Result<FileReport, ReorderError> {
        let tu = self.frontend_for(path).parse_file(path)?;
        let main_file = tu.main_file;

        let mut skipped: Vec<SkipRecord> = tu
            .skipped
            .iter()
            .filter(|s| s.location.file == main_file)
            .map(|s| {
                let location = tu.sources.describe(s.location);
                tracing::warn!("Skipping constructor {} at {location}: {}", s.name, s.reason);
                SkipRecord {
                    constructor: s.name.clone(),
                    location,
                    reason: s.reason.clone(),
                }
            })
            .collect();

        let plan = plan_edits(&tu, main_file)?;
        skipped.extend(plan.failures.iter().map(|f| SkipRecord {
            constructor: f.name.clone(),
            location: tu.sources.describe(f.location),
            reason: f.error.to_string(),
        }));

        let original = tu
            .sources
            .text(main_file)
            .ok_or(ReorderError::UnknownFile(main_file))?;
        let buffer = plan.edits.apply(original)?;
        let changed = buffer != original;

        let written = if self.config.dry_run {
            false
        } else {
            write_edited(path, plan.edits.len(), &buffer)? == WriteOutcome::Written
        };

        Ok(FileReport {
            file_path: path.display().to_string(),
            file_hash: format!("{:x}", Sha256::digest(original.as_bytes())),
            constructors_seen: plan.constructors_seen,
            constructors_eligible: plan.constructors_eligible,
            edits: plan.edits.len(),
            skipped,
            written,
            changed,
            dry_run: self.config.dry_run,
        })
    }

    /// Process each file in turn. A failing file is recorded and the run moves on.
    pub fn run(&self, paths: &[PathBuf]) -> RunSummary {
        let mut summary = RunSummary::default();
        for path in paths {
            match self.process_file(path) {
                Ok(report) => {
                    summary.total_edits += report.edits;
                    if report.written {
                        summary.files_written += 1;
                    }
                    summary.files.push(report);
                }
                Err(e) => {
                    tracing::error!("Failed to process {}: {e}", path.display());
                    summary.failures.push(FileFailure {
                        file_path: path.display().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
        summary
    }
}

//! # Configuration
//!
//! Runtime settings for a reorder run and the optional YAML project file
//! (`.reorder-initializers.yml`) that supplies defaults for them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ReorderError;

pub const PROJECT_CONFIG_NAMES: &[&str] =
    &[".reorder-initializers.yml", ".reorder-initializers.yaml"];

pub const DEFAULT_EXTENSIONS: &[&str] = &["cc", "cpp", "cxx", "c++", "h", "hh", "hpp", "hxx"];

#[derive(Debug, Clone)]
pub struct ReorderConfig {
    /// Directories searched for included headers
    pub include_dirs: Vec<PathBuf>,
    /// Extensions of files picked up when walking directories
    pub extensions: Vec<String>,
    /// Glob patterns of paths to leave alone when walking directories
    pub exclude: Vec<String>,
    /// Maximum file size to process (in bytes)
    pub max_file_size: u64,
    /// Compute edits without writing any file
    pub dry_run: bool,
    /// Skip only constructors that overlap syntax errors instead of the whole file
    pub tolerate_parse_errors: bool,
    /// Directory containing `compile_commands.json`
    pub build_path: Option<PathBuf>,
    /// Compiler arguments passed through after `--`
    pub compiler_args: Vec<String>,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            include_dirs: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            exclude: Vec::new(),
            max_file_size: 10 * 1024 * 1024, // 10MB
            dry_run: false,
            tolerate_parse_errors: false,
            build_path: None,
            compiler_args: Vec::new(),
        }
    }
}

impl ReorderConfig {
    /// Fill in settings from a project file. Values already set explicitly win;
    /// list settings are appended.
    pub fn merge_project(&mut self, project: ProjectConfig) {
        self.include_dirs.extend(project.include_dirs);
        if !project.extensions.is_empty() {
            self.extensions = project.extensions;
        }
        self.exclude.extend(project.exclude);
        if let Some(tolerate) = project.tolerate_parse_errors {
            self.tolerate_parse_errors |= tolerate;
        }
        if let Some(max) = project.max_file_size {
            self.max_file_size = max;
        }
        if self.build_path.is_none() {
            self.build_path = project.build_path;
        }
    }
}

/// Contents of `.reorder-initializers.yml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_dirs: Vec<PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerate_parse_errors: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_path: Option<PathBuf>,
}

impl ProjectConfig {
    /// Load configuration from a YAML file, resolving relative paths against
    /// the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ReorderError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ReorderError> {
        serde_yaml::from_str(yaml).map_err(ReorderError::from)
    }

    /// Find a project file by walking up from `start_dir`.
    pub fn discover(start_dir: &Path) -> Result<Option<(PathBuf, Self)>, ReorderError> {
        let mut current = Some(start_dir);
        while let Some(dir) = current {
            for name in PROJECT_CONFIG_NAMES {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    let config = Self::from_file(&candidate)?;
                    return Ok(Some((candidate, config)));
                }
            }
            current = dir.parent();
        }
        Ok(None)
    }

    /// The per-user fallback, `<config dir>/reorder-initializers/config.yml`.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("reorder-initializers").join("config.yml"))
    }

    pub fn resolve_paths(&mut self, config_dir: &Path) {
        self.include_dirs = self
            .include_dirs
            .iter()
            .map(|p| resolve_path(config_dir, p))
            .collect();
        self.build_path = self.build_path.as_ref().map(|p| resolve_path(config_dir, p));
    }
}

fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

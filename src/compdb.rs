//! # Compilation Database
//!
//! Reads `compile_commands.json` and pulls include directories out of
//! compiler arguments. Everything else in the command line is ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::ReorderError;

pub const COMPILE_COMMANDS: &str = "compile_commands.json";

#[derive(Debug, Clone, Deserialize)]
pub struct CompileCommand {
    pub directory: PathBuf,
    pub file: PathBuf,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default)]
    pub command: Option<String>,
}

impl CompileCommand {
    /// Arguments, split from `command` when `arguments` is absent.
    pub fn args(&self) -> Vec<String> {
        if !self.arguments.is_empty() {
            return self.arguments.clone();
        }
        self.command
            .as_deref()
            .and_then(shlex::split)
            .unwrap_or_default()
    }

    fn absolute_file(&self) -> PathBuf {
        if self.file.is_absolute() {
            self.file.clone()
        } else {
            self.directory.join(&self.file)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompilationDatabase {
    commands: Vec<CompileCommand>,
}

impl CompilationDatabase {
    /// Load `compile_commands.json` from a build directory.
    pub fn load(build_dir: &Path) -> Result<Self, ReorderError> {
        let path = build_dir.join(COMPILE_COMMANDS);
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ReorderError::FileNotFound(path.clone()),
            _ => ReorderError::Io(e),
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ReorderError> {
        let commands: Vec<CompileCommand> = serde_json::from_str(json)?;
        Ok(Self { commands })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn command_for(&self, file: &Path) -> Option<&CompileCommand> {
        let wanted = normalize(file);
        self.commands
            .iter()
            .find(|c| normalize(&c.absolute_file()) == wanted)
    }

    /// Include directories used to compile `file`, empty when it has no entry.
    pub fn include_dirs_for(&self, file: &Path) -> Vec<PathBuf> {
        self.command_for(file)
            .map(|c| include_dirs_from_args(&c.args(), &c.directory))
            .unwrap_or_default()
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

const INCLUDE_FLAGS: &[&str] = &["-I", "-iquote", "-isystem", "-idirafter"];

/// Extract include directories from compiler arguments, resolving relative
/// ones against `cwd`. Both `-Idir` and `-I dir` forms are accepted.
pub fn include_dirs_from_args(args: &[String], cwd: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let Some(flag) = INCLUDE_FLAGS
            .iter()
            .filter(|f| arg.starts_with(*f))
            .max_by_key(|f| f.len())
        else {
            continue;
        };
        let value = if arg.len() == flag.len() {
            match iter.next() {
                Some(next) => next.as_str(),
                None => break,
            }
        } else {
            &arg[flag.len()..]
        };
        let dir = Path::new(value);
        dirs.push(if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            cwd.join(dir)
        });
    }
    dirs
}

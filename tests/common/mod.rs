// Common test utilities
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use reorder_initializers::config::ReorderConfig;
use reorder_initializers::service::ReorderService;

pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

pub fn service() -> ReorderService {
    ReorderService::new(ReorderConfig::default()).unwrap()
}

/// A temp dir holding a single source file with the given content.
pub fn single_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), name, content);
    (dir, path)
}

//! # Source Management
//!
//! Owns the text of every file loaded for one translation unit and resolves
//! spans back to the literal text occupying them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::ReorderError;

/// Identifier of a file loaded into a [`SourceManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(u32);

impl FileId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// A byte offset into one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourceLocation {
    pub file: FileId,
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(file: FileId, offset: usize) -> Self {
        Self { file, offset }
    }
}

/// A half-open byte range `[start, end)` within one file.
///
/// Spans order by file, then start, then end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourceSpan {
    pub file: FileId,
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(file: FileId, start: usize, end: usize) -> Self {
        Self { file, start, end }
    }

    pub fn begin(&self) -> SourceLocation {
        SourceLocation::new(self.file, self.start)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overlaps(&self, other: &SourceSpan) -> bool {
        self.file == other.file && self.start < other.end && other.start < self.end
    }
}

/// Recovers text for spans and derives new spans from locations.
///
/// Frontends other than the tree-sitter one only need to provide this to
/// feed the reorderer.
pub trait SpanResolver {
    /// Literal text currently occupying `span`.
    fn resolve_text(&self, span: SourceSpan) -> Result<&str, ReorderError>;

    /// The span from `start` up to the position immediately preceding `end`.
    fn span_before(
        &self,
        start: SourceLocation,
        end: SourceLocation,
    ) -> Result<SourceSpan, ReorderError>;

    /// Human readable `path:line:col` for diagnostics.
    fn describe(&self, loc: SourceLocation) -> String;
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

/// All files read while building one translation unit.
#[derive(Debug, Default, Clone)]
pub struct SourceManager {
    files: Vec<SourceFile>,
    by_path: HashMap<PathBuf, FileId>,
}

impl SourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file, returning the existing id if the path is already loaded.
    pub fn add_file(&mut self, path: impl Into<PathBuf>, text: String) -> FileId {
        let path = path.into();
        if let Some(id) = self.by_path.get(&path) {
            return *id;
        }
        let id = FileId::new(self.files.len() as u32);
        self.by_path.insert(path.clone(), id);
        self.files.push(SourceFile { path, text });
        id
    }

    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        self.by_path.get(path).copied()
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index() as usize)
    }

    pub fn path(&self, id: FileId) -> Option<&Path> {
        self.file(id).map(|f| f.path.as_path())
    }

    pub fn text(&self, id: FileId) -> Option<&str> {
        self.file(id).map(|f| f.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// 1-based line and column of a location.
    pub fn line_col(&self, loc: SourceLocation) -> Option<(usize, usize)> {
        let text = self.text(loc.file)?;
        if loc.offset > text.len() || !text.is_char_boundary(loc.offset) {
            return None;
        }
        let before = &text[..loc.offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let col = before[line_start..].chars().count() + 1;
        Some((line, col))
    }
}

impl SpanResolver for SourceManager {
    fn resolve_text(&self, span: SourceSpan) -> Result<&str, ReorderError> {
        let text = self
            .text(span.file)
            .ok_or(ReorderError::UnresolvableSpan(span))?;
        if span.start > span.end {
            return Err(ReorderError::UnresolvableSpan(span));
        }
        text.get(span.start..span.end)
            .ok_or(ReorderError::UnresolvableSpan(span))
    }

    fn span_before(
        &self,
        start: SourceLocation,
        end: SourceLocation,
    ) -> Result<SourceSpan, ReorderError> {
        let span = SourceSpan::new(start.file, start.offset, end.offset);
        if start.file != end.file || start.offset > end.offset {
            return Err(ReorderError::UnresolvableSpan(span));
        }
        // Validate the derived span against the buffer before handing it out.
        self.resolve_text(span)?;
        Ok(span)
    }

    fn describe(&self, loc: SourceLocation) -> String {
        let path = self
            .path(loc.file)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("<file #{}>", loc.file.index()));
        match self.line_col(loc) {
            Some((line, col)) => format!("{path}:{line}:{col}"),
            None => format!("{path}:+{}", loc.offset),
        }
    }
}

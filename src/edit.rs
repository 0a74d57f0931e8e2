//! # Edit Application
//!
//! Collects span replacements for one file and applies them to an immutable
//! snapshot of its original text.

use crate::errors::ReorderError;
use crate::source::{FileId, SourceSpan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: SourceSpan,
    pub replacement: String,
}

impl Edit {
    pub fn new(span: SourceSpan, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }
}

/// Pairwise disjoint edits targeting a single file.
#[derive(Debug, Clone)]
pub struct EditSet {
    file: FileId,
    edits: Vec<Edit>,
}

impl EditSet {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            edits: Vec::new(),
        }
    }

    pub fn push(&mut self, edit: Edit) {
        debug_assert_eq!(edit.span.file, self.file, "edit targets another file");
        self.edits.push(edit);
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edit> {
        self.edits.iter()
    }

    /// Produce the rewritten buffer.
    ///
    /// Overlapping edits or edits for another file indicate a bug upstream and
    /// are reported as [`ReorderError::Internal`].
    pub fn apply(&self, original: &str) -> Result<String, ReorderError> {
        let mut edits: Vec<&Edit> = self.edits.iter().collect();
        edits.sort_by_key(|e| e.span);

        for pair in edits.windows(2) {
            if pair[0].span.overlaps(&pair[1].span) {
                return Err(ReorderError::Internal(format!(
                    "overlapping edits at bytes {}..{} and {}..{}",
                    pair[0].span.start, pair[0].span.end, pair[1].span.start, pair[1].span.end
                )));
            }
        }

        let mut result = original.to_string();
        // Apply edits in reverse order to maintain correct offsets
        for edit in edits.into_iter().rev() {
            let span = edit.span;
            if span.file != self.file
                || span.start > span.end
                || original.get(span.start..span.end).is_none()
            {
                return Err(ReorderError::Internal(format!(
                    "edit {}..{} does not fit the buffer",
                    span.start, span.end
                )));
            }
            result.replace_range(span.start..span.end, &edit.replacement);
        }

        Ok(result)
    }
}

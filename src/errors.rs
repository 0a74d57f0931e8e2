//! # Error Types
//!
//! Error handling for the initializer reordering pipeline.
//! Errors are split into constructor-local failures, which are reported and
//! skipped, and file-level failures, which abort processing of one file.

use std::fmt;
use std::path::PathBuf;

use crate::source::{FileId, SourceLocation, SourceSpan};

/// Error types that can occur while reordering initializer lists.
#[derive(Debug)]
pub enum ReorderError {
    /// The source file could not be parsed into a declaration tree
    ParserError(String),
    /// The literal text of a span could not be recovered
    UnresolvableSpan(SourceSpan),
    /// No start position could be determined for a constructor's written initializers
    NoStartPosition(SourceLocation),
    /// A constructor with written initializers has no body to anchor the replacement
    MissingBody(SourceLocation),
    /// A written initializer names neither a member, a base, nor the constructor's own type
    UnknownTarget { name: String, location: SourceLocation },
    /// A span or location refers to a file that is not loaded
    UnknownFile(FileId),
    /// Internal error with custom message
    Internal(String),
    /// I/O error reading/writing files
    Io(std::io::Error),
    /// Error walking directory trees during input discovery
    WalkDir(walkdir::Error),
    /// Error parsing YAML project configuration
    SerdeYaml(serde_yaml::Error),
    /// Error parsing JSON data (compilation databases)
    SerdeJson(serde_json::Error),
    /// Requested file not found
    FileNotFound(PathBuf),
    /// Glob pattern compilation error
    Glob(globset::Error),
}

impl ReorderError {
    /// Errors that only affect one constructor; the run continues with the next one.
    pub fn is_constructor_local(&self) -> bool {
        matches!(
            self,
            ReorderError::UnresolvableSpan(_)
                | ReorderError::NoStartPosition(_)
                | ReorderError::MissingBody(_)
                | ReorderError::UnknownTarget { .. }
        )
    }
}

impl fmt::Display for ReorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReorderError::ParserError(msg) => write!(f, "Parser error: {msg}"),
            ReorderError::UnresolvableSpan(span) => write!(
                f,
                "Failed to recover source text for bytes {}..{} of file #{}",
                span.start,
                span.end,
                span.file.index()
            ),
            ReorderError::NoStartPosition(loc) => write!(
                f,
                "No valid start position for the initializers of the constructor at byte {}",
                loc.offset
            ),
            ReorderError::MissingBody(loc) => write!(
                f,
                "Constructor at byte {} has written initializers but no body",
                loc.offset
            ),
            ReorderError::UnknownTarget { name, .. } => {
                write!(f, "Initializer `{name}` does not name a member or base")
            }
            ReorderError::UnknownFile(id) => write!(f, "Unknown file #{}", id.index()),
            ReorderError::Internal(msg) => write!(f, "Internal error: {msg}"),
            ReorderError::Io(err) => write!(f, "IO error: {err}"),
            ReorderError::WalkDir(err) => write!(f, "Directory traversal error: {err}"),
            ReorderError::SerdeYaml(err) => write!(f, "YAML parsing error: {err}"),
            ReorderError::SerdeJson(err) => write!(f, "JSON parsing error: {err}"),
            ReorderError::FileNotFound(path) => write!(f, "File not found: {}", path.display()),
            ReorderError::Glob(err) => write!(f, "Glob error: {err}"),
        }
    }
}

impl std::error::Error for ReorderError {}

impl From<std::io::Error> for ReorderError {
    fn from(err: std::io::Error) -> Self {
        ReorderError::Io(err)
    }
}

impl From<walkdir::Error> for ReorderError {
    fn from(err: walkdir::Error) -> Self {
        ReorderError::WalkDir(err)
    }
}

impl From<serde_yaml::Error> for ReorderError {
    fn from(err: serde_yaml::Error) -> Self {
        ReorderError::SerdeYaml(err)
    }
}

impl From<serde_json::Error> for ReorderError {
    fn from(err: serde_json::Error) -> Self {
        ReorderError::SerdeJson(err)
    }
}

impl From<globset::Error> for ReorderError {
    fn from(err: globset::Error) -> Self {
        ReorderError::Glob(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_local_classification() {
        let loc = SourceLocation::new(FileId::new(0), 4);
        assert!(ReorderError::NoStartPosition(loc).is_constructor_local());
        assert!(ReorderError::MissingBody(loc).is_constructor_local());
        assert!(
            ReorderError::UnknownTarget {
                name: "x".to_string(),
                location: loc
            }
            .is_constructor_local()
        );
        assert!(!ReorderError::ParserError("bad".to_string()).is_constructor_local());
        assert!(
            !ReorderError::Io(std::io::Error::other("disk full")).is_constructor_local()
        );
    }

    #[test]
    fn test_display_messages() {
        let err = ReorderError::UnknownTarget {
            name: "missing_".to_string(),
            location: SourceLocation::new(FileId::new(0), 0),
        };
        assert!(err.to_string().contains("missing_"));

        let err = ReorderError::FileNotFound(PathBuf::from("a.cpp"));
        assert_eq!(err.to_string(), "File not found: a.cpp");
    }
}

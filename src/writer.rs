//! Persists rewritten buffers back to their original files.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::errors::ReorderError;

/// Outcome of [`write_edited`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// No edits were applied; the file was not opened for writing
    Untouched,
    Written,
}

/// Replace the contents of `path` with `buffer` when at least one edit was
/// applied.
///
/// Symlinks are followed: the file they point at receives the new content.
/// The buffer goes to a temporary file next to that target and is renamed
/// over it, so a failure leaves the original content in place. Files with
/// several hard links are overwritten in place instead.
pub fn write_edited(
    path: &Path,
    edits_applied: usize,
    buffer: &str,
) -> Result<WriteOutcome, ReorderError> {
    if edits_applied == 0 {
        return Ok(WriteOutcome::Untouched);
    }

    let target = std::fs::canonicalize(path)?;
    let metadata = std::fs::metadata(&target)?;
    if has_other_links(&metadata) {
        // A rename would detach this name from the other hard links.
        std::fs::write(&target, buffer)?;
        tracing::info!("Rewrote {} in place ({} edit(s))", target.display(), edits_applied);
        return Ok(WriteOutcome::Written);
    }
    let permissions = metadata.permissions();
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(buffer.as_bytes())?;
    tmp.as_file().sync_all()?;
    std::fs::set_permissions(tmp.path(), permissions)?;
    tmp.persist(&target).map_err(|e| ReorderError::Io(e.error))?;

    tracing::info!("Rewrote {} ({} edit(s))", path.display(), edits_applied);
    Ok(WriteOutcome::Written)
}

#[cfg(unix)]
fn has_other_links(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    metadata.nlink() > 1
}

#[cfg(not(unix))]
fn has_other_links(_metadata: &std::fs::Metadata) -> bool {
    false
}

//! Decides which constructors belong to the file under edit.

use crate::model::Constructor;
use crate::source::FileId;

/// True when the constructor is declared in `file_under_edit` rather than in
/// a header it includes.
pub fn is_eligible(ctor: &Constructor, file_under_edit: FileId) -> bool {
    ctor.location.file == file_under_edit
}

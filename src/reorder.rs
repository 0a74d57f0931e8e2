//! # Initializer Reordering
//!
//! Turns each eligible constructor into at most one [`Edit`] that rewrites its
//! written initializers in member-declaration order. Planning is read-only:
//! the resulting [`EditSet`] is applied to the original text afterwards.

use crate::edit::{Edit, EditSet};
use crate::eligibility::is_eligible;
use crate::errors::ReorderError;
use crate::model::{Constructor, InitTarget, TranslationUnit};
use crate::source::{FileId, SourceLocation, SpanResolver};

/// Separator placed between reordered initializers.
pub const INITIALIZER_SEPARATOR: &str = ",\n";

pub struct InitializerReorderer<'a, R: SpanResolver> {
    resolver: &'a R,
}

impl<'a, R: SpanResolver> InitializerReorderer<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    /// Compute the replacement for one constructor, or `None` when it has no
    /// written initializers.
    pub fn reorder(&self, ctor: &Constructor) -> Result<Option<Edit>, ReorderError> {
        let written: Vec<_> = ctor.written_initializers().collect();
        if written.is_empty() {
            return Ok(None);
        }

        let mut texts = Vec::with_capacity(written.len());
        for init in &written {
            if let InitTarget::Unknown(name) = &init.target {
                return Err(ReorderError::UnknownTarget {
                    name: name.clone(),
                    location: init.span.map_or(ctor.location, |s| s.begin()),
                });
            }
            let span = init
                .span
                .ok_or(ReorderError::NoStartPosition(ctor.location))?;
            texts.push(self.resolver.resolve_text(span)?);
        }
        let replacement = texts.join(INITIALIZER_SEPARATOR);

        // The earliest written initializer, which need not be the first in
        // canonical order.
        let start = written
            .iter()
            .filter_map(|i| i.span)
            .map(|s| s.begin())
            .min()
            .ok_or(ReorderError::NoStartPosition(ctor.location))?;
        let body = ctor.body.ok_or(ReorderError::MissingBody(ctor.location))?;
        let span = self.resolver.span_before(start, body)?;

        Ok(Some(Edit::new(span, replacement)))
    }
}

/// A constructor that was reported and left untouched.
#[derive(Debug)]
pub struct ConstructorFailure {
    pub name: String,
    pub location: SourceLocation,
    pub error: ReorderError,
}

/// Edits planned for one file plus the constructors that had to be skipped.
#[derive(Debug)]
pub struct EditPlan {
    pub edits: EditSet,
    pub failures: Vec<ConstructorFailure>,
    pub constructors_seen: usize,
    pub constructors_eligible: usize,
}

/// Plan edits for every constructor of `tu` declared in `file_under_edit`.
///
/// Constructor-local failures are collected and the constructor is left
/// alone; any other error fails the whole file.
pub fn plan_edits(
    tu: &TranslationUnit,
    file_under_edit: FileId,
) -> Result<EditPlan, ReorderError> {
    plan_edits_with(&tu.sources, tu, file_under_edit)
}

fn plan_edits_with<R: SpanResolver>(
    resolver: &R,
    tu: &TranslationUnit,
    file_under_edit: FileId,
) -> Result<EditPlan, ReorderError> {
    let reorderer = InitializerReorderer::new(resolver);
    let mut edits = EditSet::new(file_under_edit);
    let mut failures = Vec::new();
    let mut constructors_eligible = 0;

    for ctor in tu
        .constructors
        .iter()
        .filter(|c| is_eligible(c, file_under_edit))
    {
        constructors_eligible += 1;
        match reorderer.reorder(ctor) {
            Ok(Some(edit)) => edits.push(edit),
            Ok(None) => {}
            Err(error) if !error.is_constructor_local() => return Err(error),
            Err(error) => {
                tracing::error!(
                    "Skipping constructor {} at {}: {error}",
                    ctor.name,
                    resolver.describe(ctor.location)
                );
                failures.push(ConstructorFailure {
                    name: ctor.name.clone(),
                    location: ctor.location,
                    error,
                });
            }
        }
    }

    Ok(EditPlan {
        edits,
        failures,
        constructors_seen: tu.constructors.len(),
        constructors_eligible,
    })
}

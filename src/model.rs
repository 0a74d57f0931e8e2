//! # Program Model
//!
//! Read-only view of one translation unit's declarations: records with their
//! ordered members and bases, and constructors with their initializer entries.

use serde::Serialize;

use crate::source::{FileId, SourceLocation, SourceManager, SourceSpan};

/// Index of a record inside [`TranslationUnit::records`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RecordId(pub usize);

/// A non-static data member, positioned in its record's declaration sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub index: usize,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseSpecifier {
    pub name: String,
    pub is_virtual: bool,
}

/// A `class`, `struct` or `union` definition.
#[derive(Debug, Clone)]
pub struct RecordDecl {
    /// Qualified name, e.g. `ns::Outer::Inner`
    pub name: String,
    pub members: Vec<Member>,
    pub bases: Vec<BaseSpecifier>,
    pub location: SourceLocation,
}

impl RecordDecl {
    /// Unqualified name of the record.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }

    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }

    /// Position of the base named by an initializer such as `Base`, `ns::Base`
    /// or `Base<T>`.
    pub fn base_index(&self, name: &str) -> Option<usize> {
        let key = base_key(name);
        self.bases.iter().position(|b| base_key(&b.name) == key)
    }
}

/// What an initializer entry initializes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitTarget {
    /// The constructor delegates to another constructor of its own type
    Delegated,
    Base(usize),
    Member(usize),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initializer {
    pub target: InitTarget,
    pub name: String,
    /// True when the programmer wrote the initializer, false when synthesized
    pub written: bool,
    pub span: Option<SourceSpan>,
}

impl Initializer {
    pub fn synthesized(target: InitTarget, name: impl Into<String>) -> Self {
        Self {
            target,
            name: name.into(),
            written: false,
            span: None,
        }
    }
}

/// An initializer as it appears in the source, before canonical ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenInitializer {
    pub name: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct Constructor {
    pub name: String,
    pub record: RecordId,
    pub location: SourceLocation,
    /// Entries in canonical order: delegation, virtual bases, bases, members.
    pub initializers: Vec<Initializer>,
    /// Opening brace of the body
    pub body: Option<SourceLocation>,
}

impl Constructor {
    /// Build a constructor whose initializer entries follow the record's
    /// declaration order, with synthesized entries for unwritten members.
    pub fn new(
        name: impl Into<String>,
        record_id: RecordId,
        record: &RecordDecl,
        location: SourceLocation,
        written: Vec<WrittenInitializer>,
        body: Option<SourceLocation>,
    ) -> Self {
        let mut slots: Vec<(InitTarget, WrittenInitializer)> = written
            .into_iter()
            .map(|w| (classify(record, &w.name), w))
            .collect();

        let mut initializers = Vec::with_capacity(slots.len() + record.members.len());
        let mut take = |target: &InitTarget, initializers: &mut Vec<Initializer>| -> bool {
            let mut found = false;
            // Preserve source order among duplicates of the same target.
            while let Some(pos) = slots.iter().position(|(t, _)| t == target) {
                let (target, w) = slots.remove(pos);
                initializers.push(Initializer {
                    target,
                    name: w.name,
                    written: true,
                    span: Some(w.span),
                });
                found = true;
            }
            found
        };

        take(&InitTarget::Delegated, &mut initializers);

        let virtual_first = record
            .bases
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_virtual)
            .chain(record.bases.iter().enumerate().filter(|(_, b)| !b.is_virtual));
        for (i, _) in virtual_first {
            take(&InitTarget::Base(i), &mut initializers);
        }

        for member in &record.members {
            let target = InitTarget::Member(member.index);
            if !take(&target, &mut initializers) {
                initializers.push(Initializer::synthesized(target, member.name.clone()));
            }
        }

        // Whatever is left could not be placed.
        initializers.extend(slots.into_iter().map(|(target, w)| Initializer {
            target,
            name: w.name,
            written: true,
            span: Some(w.span),
        }));

        Self {
            name: name.into(),
            record: record_id,
            location,
            initializers,
            body,
        }
    }

    pub fn written_initializers(&self) -> impl Iterator<Item = &Initializer> {
        self.initializers.iter().filter(|i| i.written)
    }
}

fn classify(record: &RecordDecl, name: &str) -> InitTarget {
    if let Some(i) = record.member_index(name) {
        return InitTarget::Member(i);
    }
    if base_key(name) == record.simple_name() {
        return InitTarget::Delegated;
    }
    match record.base_index(name) {
        Some(i) => InitTarget::Base(i),
        None => InitTarget::Unknown(name.to_string()),
    }
}

/// Last path component with template arguments and whitespace removed:
/// `ns::Base<int>` -> `Base`.
pub fn base_key(name: &str) -> String {
    let mut depth = 0usize;
    let mut stripped = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if depth == 0 && !c.is_whitespace() => stripped.push(c),
            _ => {}
        }
    }
    match stripped.rsplit_once("::") {
        Some((_, last)) => last.to_string(),
        None => stripped,
    }
}

/// A constructor the frontend found but could not model.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedConstructor {
    pub name: String,
    pub location: SourceLocation,
    pub reason: String,
}

/// Everything parsed for one primary file and the headers it includes.
#[derive(Debug)]
pub struct TranslationUnit {
    pub main_file: FileId,
    pub sources: SourceManager,
    pub records: Vec<RecordDecl>,
    pub constructors: Vec<Constructor>,
    pub skipped: Vec<SkippedConstructor>,
}

impl TranslationUnit {
    pub fn record(&self, id: RecordId) -> Option<&RecordDecl> {
        self.records.get(id.0)
    }

    pub fn find_record(&self, name: &str) -> Option<RecordId> {
        self.records.iter().position(|r| r.name == name).map(RecordId)
    }
}

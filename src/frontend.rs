//! # C++ Frontend
//!
//! Builds the [`TranslationUnit`] for one primary file from tree-sitter's C++
//! grammar. Quoted and angled includes that resolve to files on disk are
//! parsed too, so out-of-line constructors can find the record they belong to.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_core::{AstGrep, Node};
use ast_grep_language::SupportLang as Language;

use crate::errors::ReorderError;
use crate::model::{
    BaseSpecifier, Constructor, Member, RecordDecl, RecordId, SkippedConstructor,
    TranslationUnit, WrittenInitializer, base_key,
};
use crate::source::{FileId, SourceLocation, SourceManager, SourceSpan, SpanResolver};

type CppNode<'r> = Node<'r, StrDoc<Language>>;

const RECORD_KINDS: &[&str] = &["class_specifier", "struct_specifier", "union_specifier"];

const PREPROC_BLOCK_KINDS: &[&str] = &["preproc_if", "preproc_ifdef", "preproc_else", "preproc_elif"];

const DECLARATOR_KINDS: &[&str] = &[
    "field_identifier",
    "pointer_declarator",
    "reference_declarator",
    "array_declarator",
    "function_declarator",
    "parenthesized_declarator",
    "attributed_declarator",
];

#[derive(Debug, Clone, Default)]
pub struct FrontendOptions {
    /// Directories searched for included headers
    pub include_dirs: Vec<PathBuf>,
    /// Keep going when the primary file has syntax errors, skipping only the
    /// constructors that overlap them
    pub tolerate_parse_errors: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CppFrontend {
    options: FrontendOptions,
}

impl CppFrontend {
    pub fn new(options: FrontendOptions) -> Self {
        Self { options }
    }

    /// Read and parse `path` together with the headers it includes.
    pub fn parse_file(&self, path: &Path) -> Result<TranslationUnit, ReorderError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ReorderError::FileNotFound(path.to_path_buf()),
            _ => ReorderError::Io(e),
        })?;
        self.parse_source(path, text)
    }

    /// Parse already loaded text as the primary file.
    pub fn parse_source(&self, path: &Path, text: String) -> Result<TranslationUnit, ReorderError> {
        let mut sources = SourceManager::new();
        let main_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let main_file = sources.add_file(main_path, text);

        let mut records = Vec::new();
        let mut raw_constructors = Vec::new();
        let mut error_spans = Vec::new();
        let mut queue = VecDeque::from([main_file]);

        while let Some(file) = queue.pop_front() {
            let scan = scan_file(&sources, file)?;

            if let Some(first) = scan.errors.first() {
                let location = sources.describe(first.begin());
                if file == main_file && !self.options.tolerate_parse_errors {
                    return Err(ReorderError::ParserError(format!(
                        "{location}: syntax error ({} error node(s))",
                        scan.errors.len()
                    )));
                }
                tracing::warn!("Syntax error at {location}; overlapping constructors are skipped");
            }

            let includer = sources
                .path(file)
                .map(Path::to_path_buf)
                .ok_or(ReorderError::UnknownFile(file))?;
            for include in &scan.includes {
                let Some(resolved) = self.resolve_include(&includer, include) else {
                    tracing::debug!("Unresolved include {:?} in {}", include.name, includer.display());
                    continue;
                };
                if sources.file_id(&resolved).is_some() {
                    continue;
                }
                match std::fs::read_to_string(&resolved) {
                    Ok(text) => {
                        tracing::debug!("Loading header {}", resolved.display());
                        queue.push_back(sources.add_file(resolved, text));
                    }
                    Err(e) => tracing::warn!("Failed to read {}: {e}", resolved.display()),
                }
            }

            records.extend(scan.records);
            raw_constructors.extend(scan.constructors);
            error_spans.extend(scan.errors);
        }

        let mut index: HashMap<String, RecordId> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            index.entry(record.name.clone()).or_insert(RecordId(i));
        }

        let mut constructors = Vec::new();
        let mut skipped = Vec::new();
        for raw in raw_constructors {
            if error_spans.iter().any(|e| e.overlaps(&raw.range)) {
                skipped.push(SkippedConstructor {
                    name: raw.name,
                    location: raw.location,
                    reason: "constructor overlaps a syntax error".to_string(),
                });
                continue;
            }

            let found = match &raw.target {
                RecordRef::Exact(name) => index.get(name).copied(),
                RecordRef::Lookup { scope, path } => lookup_record(&index, &records, scope, path),
            };
            match found {
                Some(id) => constructors.push(Constructor::new(
                    raw.name,
                    id,
                    &records[id.0],
                    raw.location,
                    raw.initializers,
                    raw.body,
                )),
                None => skipped.push(SkippedConstructor {
                    reason: format!("enclosing type `{}` not found", raw.target.display_name()),
                    name: raw.name,
                    location: raw.location,
                }),
            }
        }

        Ok(TranslationUnit {
            main_file,
            sources,
            records,
            constructors,
            skipped,
        })
    }

    fn resolve_include(&self, includer: &Path, include: &IncludeDirective) -> Option<PathBuf> {
        let mut candidates = Vec::new();
        if include.quoted {
            if let Some(dir) = includer.parent() {
                candidates.push(dir.join(&include.name));
            }
        }
        candidates.extend(
            self.options
                .include_dirs
                .iter()
                .map(|dir| dir.join(&include.name)),
        );
        candidates
            .into_iter()
            .find(|p| p.is_file())
            .map(|p| p.canonicalize().unwrap_or(p))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct IncludeDirective {
    name: String,
    quoted: bool,
}

#[derive(Debug, Clone)]
enum RecordRef {
    /// Defined inside the record body; the qualified name is known
    Exact(String),
    /// Out-of-line definition: `path` as written, looked up from `scope` outwards
    Lookup { scope: Vec<String>, path: Vec<String> },
}

impl RecordRef {
    fn display_name(&self) -> String {
        match self {
            RecordRef::Exact(name) => name.clone(),
            RecordRef::Lookup { path, .. } => path.join("::"),
        }
    }
}

#[derive(Debug, Clone)]
struct RawConstructor {
    name: String,
    target: RecordRef,
    location: SourceLocation,
    range: SourceSpan,
    initializers: Vec<WrittenInitializer>,
    body: Option<SourceLocation>,
}

/// Declarations found in one file.
#[derive(Debug)]
struct FileScan {
    file: FileId,
    records: Vec<RecordDecl>,
    constructors: Vec<RawConstructor>,
    includes: Vec<IncludeDirective>,
    errors: Vec<SourceSpan>,
}

fn scan_file(sources: &SourceManager, file: FileId) -> Result<FileScan, ReorderError> {
    let text = sources.text(file).ok_or(ReorderError::UnknownFile(file))?;
    let ast = AstGrep::new(text, Language::Cpp);
    let root = ast.root();

    let mut scan = FileScan {
        file,
        records: Vec::new(),
        constructors: Vec::new(),
        includes: Vec::new(),
        errors: Vec::new(),
    };
    scan.errors = root
        .dfs()
        .filter(|n| n.kind() == "ERROR")
        .map(|n| scan.span(&n))
        .collect();

    let mut scope = Vec::new();
    scan.walk(&root, &mut scope, None);
    Ok(scan)
}

impl FileScan {
    fn span(&self, node: &CppNode<'_>) -> SourceSpan {
        let range = node.range();
        SourceSpan::new(self.file, range.start, range.end)
    }

    fn walk(&mut self, node: &CppNode<'_>, scope: &mut Vec<String>, enclosing: Option<&str>) {
        match &*node.kind() {
            "namespace_definition" => {
                let names = node
                    .field("name")
                    .map(|n| split_path(&n.text()))
                    .unwrap_or_default();
                let pushed = names.len();
                scope.extend(names);
                if let Some(body) = node.field("body") {
                    for child in body.children() {
                        self.walk(&child, scope, None);
                    }
                }
                scope.truncate(scope.len() - pushed);
            }
            "class_specifier" | "struct_specifier" | "union_specifier" => {
                self.visit_record(node, scope);
            }
            "function_definition" => {
                self.visit_constructor(node, scope, enclosing);
                self.visit_function_body(node, scope);
            }
            "preproc_include" => {
                if let Some(path) = node.field("path") {
                    let raw = path.text();
                    let name = raw.trim_matches(&['"', '<', '>'][..]);
                    self.includes.push(IncludeDirective {
                        name: name.to_string(),
                        quoted: raw.starts_with('"'),
                    });
                }
            }
            _ => {
                for child in node.children() {
                    self.walk(&child, scope, enclosing);
                }
            }
        }
    }

    fn visit_record(&mut self, node: &CppNode<'_>, scope: &mut Vec<String>) {
        let Some(body) = node.field("body") else {
            return;
        };
        let Some(name_node) = node.field("name") else {
            // Anonymous records contribute their members to the enclosing record.
            for child in body.children() {
                self.walk(&child, scope, None);
            }
            return;
        };

        let components = split_path(&name_node.text());
        let pushed = components.len();
        scope.extend(components);
        let qualified = scope.join("::");

        let mut members = Vec::new();
        self.collect_members(&body, &mut members);
        let bases = node
            .children()
            .find(|c| c.kind() == "base_class_clause")
            .map(|clause| collect_bases(&clause))
            .unwrap_or_default();

        self.records.push(RecordDecl {
            name: qualified.clone(),
            members,
            bases,
            location: SourceLocation::new(self.file, name_node.range().start),
        });

        for child in body.children() {
            self.walk(&child, scope, Some(qualified.as_str()));
        }
        scope.truncate(scope.len() - pushed);
    }

    fn collect_members(&self, body: &CppNode<'_>, members: &mut Vec<Member>) {
        for field in body.children() {
            // Members of every conditional branch keep their textual position.
            if PREPROC_BLOCK_KINDS.contains(&field.kind().as_ref()) {
                self.collect_members(&field, members);
                continue;
            }
            if field.kind() != "field_declaration" {
                continue;
            }
            let is_static = field
                .children()
                .any(|c| c.kind() == "storage_class_specifier" && c.text() == "static");
            if is_static {
                continue;
            }

            let mut has_declarator = false;
            for declarator in field
                .children()
                .filter(|c| DECLARATOR_KINDS.contains(&c.kind().as_ref()))
            {
                has_declarator = true;
                if let Some(name) = member_name(&declarator) {
                    members.push(Member {
                        name,
                        index: members.len(),
                        span: self.span(&declarator),
                    });
                }
            }

            if !has_declarator {
                let anonymous = field.children().find(|c| {
                    RECORD_KINDS.contains(&c.kind().as_ref()) && c.field("name").is_none()
                });
                if let Some(anon_body) = anonymous.and_then(|a| a.field("body")) {
                    self.collect_members(&anon_body, members);
                }
            }
        }
    }

    /// Local classes live in a scope named after the function and its offset,
    /// so equally named classes in different functions stay distinct.
    fn visit_function_body(&mut self, node: &CppNode<'_>, scope: &mut Vec<String>) {
        let Some(body) = node.field("body") else {
            return;
        };
        let name = node
            .field("declarator")
            .and_then(|d| d.field("declarator"))
            .and_then(|n| split_path(&n.text()).pop())
            .unwrap_or_default();
        scope.push(format!("{name}@{}", node.range().start));
        for child in body.children() {
            self.walk(&child, scope, None);
        }
        scope.pop();
    }

    fn visit_constructor(&mut self, node: &CppNode<'_>, scope: &[String], enclosing: Option<&str>) {
        let Some(declarator) = node.field("declarator") else {
            return;
        };
        if declarator.kind() != "function_declarator" {
            return;
        }
        let Some(name_node) = declarator.field("declarator") else {
            return;
        };

        let (name, target) = match &*name_node.kind() {
            "identifier" | "field_identifier" | "type_identifier" => {
                let Some(record) = enclosing else {
                    return;
                };
                let name = name_node.text();
                let simple = record.rsplit("::").next().unwrap_or(record);
                if &*name != simple {
                    return;
                }
                (name.to_string(), RecordRef::Exact(record.to_string()))
            }
            "qualified_identifier" => {
                let mut path = split_path(&name_node.text());
                if path.len() < 2 || path[path.len() - 1] != path[path.len() - 2] {
                    return;
                }
                let name = path.pop().unwrap_or_default();
                (
                    name,
                    RecordRef::Lookup {
                        scope: scope.to_vec(),
                        path,
                    },
                )
            }
            _ => return,
        };

        let initializers = node
            .children()
            .find(|c| c.kind() == "field_initializer_list")
            .map(|list| {
                list.children()
                    .filter(|c| c.kind() == "field_initializer")
                    .filter_map(|init| {
                        let target = init.children().find(|c| c.is_named())?;
                        Some(WrittenInitializer {
                            name: target.text().to_string(),
                            span: self.span(&init),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let body = node
            .field("body")
            .filter(|b| b.kind() == "compound_statement")
            .map(|b| SourceLocation::new(self.file, b.range().start));

        self.constructors.push(RawConstructor {
            name,
            target,
            location: SourceLocation::new(self.file, name_node.range().start),
            range: self.span(node),
            initializers,
            body,
        });
    }
}

/// Name of the data member introduced by a field declarator, `None` for
/// member function declarations.
fn member_name(declarator: &CppNode<'_>) -> Option<String> {
    if declarator.kind() == "function_declarator" {
        // `int (*fp)(int);` is a data member, `void f();` is not
        let inner = declarator.field("declarator")?;
        if inner.kind() != "parenthesized_declarator" {
            return None;
        }
    }
    declarator
        .dfs()
        .find(|n| n.kind() == "field_identifier")
        .map(|n| n.text().to_string())
}

fn collect_bases(clause: &CppNode<'_>) -> Vec<BaseSpecifier> {
    let mut bases = Vec::new();
    let mut is_virtual = false;
    for child in clause.children() {
        match &*child.kind() {
            "virtual" => is_virtual = true,
            "type_identifier" | "qualified_identifier" | "template_type" => {
                bases.push(BaseSpecifier {
                    name: child.text().to_string(),
                    is_virtual,
                });
                is_virtual = false;
            }
            "," => is_virtual = false,
            _ => {}
        }
    }
    bases
}

/// Split `a::b<c::d>::e` into `["a", "b", "e"]`.
fn split_path(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '<' => {
                depth += 1;
                current.push(c);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ':' if depth == 0 && chars.peek() == Some(&':') => {
                chars.next();
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
        .iter()
        .map(|p| base_key(p))
        .filter(|p| !p.is_empty())
        .collect()
}

fn lookup_record(
    index: &HashMap<String, RecordId>,
    records: &[RecordDecl],
    scope: &[String],
    path: &[String],
) -> Option<RecordId> {
    for depth in (0..=scope.len()).rev() {
        let candidate = scope[..depth]
            .iter()
            .chain(path)
            .cloned()
            .collect::<Vec<_>>()
            .join("::");
        if let Some(id) = index.get(&candidate) {
            return Some(*id);
        }
    }

    let suffix = path.join("::");
    let qualified_suffix = format!("::{suffix}");
    let mut matches = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.name == suffix || r.name.ends_with(&qualified_suffix));
    let (first, _) = matches.next()?;
    if matches.next().is_some() {
        tracing::debug!("Ambiguous record lookup for {suffix}");
        return None;
    }
    Some(RecordId(first))
}

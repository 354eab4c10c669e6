//! Project catalog schema.
//!
//! [`validate_catalog`] checks a parsed JSON document against the project
//! record shape and either returns the typed collection or the full list of
//! field-level violations. A document with any violation yields no projects.

use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path};

use serde_json::{Map, Value};

use crate::types::{Project, SubProject};

/// Outcome of validating a catalog document.
pub type Validation = Result<Vec<Project>, Vec<Violation>>;

const PROJECT_FIELDS: &[&str] = &[
    "id",
    "title",
    "summary",
    "details",
    "image",
    "images",
    "videos",
    "tools",
    "embed",
    "subProjects",
];

const NESTED_KEY: &str = "subProjects";

/// What rule a field broke.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// The document root is not an array.
    NotAnArray,
    /// A record is not a JSON object.
    NotAnObject,
    MissingField,
    UnknownField,
    WrongType { expected: &'static str },
    Empty,
    /// Id contains characters outside `[A-Za-z0-9_-]`.
    InvalidId,
    /// Id already used by the record at this index.
    DuplicateId { first: usize },
    /// Detail reference escapes the content root.
    UnsafePath,
    /// Embed reference is not an http(s) URL.
    InvalidUrl,
    /// Sub-projects cannot have sub-projects.
    NestingNotAllowed,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::NotAnArray => f.write_str("expected an array of projects"),
            ViolationKind::NotAnObject => f.write_str("expected an object"),
            ViolationKind::MissingField => f.write_str("missing required field"),
            ViolationKind::UnknownField => f.write_str("unknown field"),
            ViolationKind::WrongType { expected } => write!(f, "expected {expected}"),
            ViolationKind::Empty => f.write_str("must not be empty"),
            ViolationKind::InvalidId => {
                f.write_str("may only contain letters, digits, '-' and '_'")
            }
            ViolationKind::DuplicateId { first } => {
                write!(f, "duplicate id (first used by record {first})")
            }
            ViolationKind::UnsafePath => {
                f.write_str("must be a relative path inside the content root")
            }
            ViolationKind::InvalidUrl => f.write_str("must be an http or https URL"),
            ViolationKind::NestingNotAllowed => {
                f.write_str("sub-projects cannot contain sub-projects")
            }
        }
    }
}

/// A single field-level schema violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Index of the top-level record, `None` for document-level problems.
    pub record: Option<usize>,
    /// Id of the offending record when it could be read.
    pub id: Option<String>,
    /// Field path inside the record, e.g. `title` or `subProjects[0].image`.
    pub field: String,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.record, &self.id) {
            (None, _) => f.write_str("document")?,
            (Some(index), None) => write!(f, "record {index}")?,
            (Some(index), Some(id)) => write!(f, "record {index} ({id:?})")?,
        }
        if !self.field.is_empty() {
            write!(f, ": field {:?}", self.field)?;
        }
        write!(f, ": {}", self.kind)
    }
}

/// Validate a parsed catalog document.
///
/// Collects every violation in the document rather than stopping at the
/// first one. Record order is preserved.
pub fn validate_catalog(value: &Value) -> Validation {
    let Some(records) = value.as_array() else {
        return Err(vec![Violation {
            record: None,
            id: None,
            field: String::new(),
            kind: ViolationKind::NotAnArray,
        }]);
    };

    let mut violations = Vec::new();
    let mut projects = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        if let Some(project) = check_project(index, record, &mut violations) {
            projects.push(project);
        }
    }

    check_unique_ids(records, &mut violations);

    if violations.is_empty() {
        Ok(projects)
    } else {
        Err(violations)
    }
}

fn check_project(index: usize, record: &Value, out: &mut Vec<Violation>) -> Option<Project> {
    let mut rec = RecordCheck::new(index, "", record, out)?;

    rec.unknown_fields(PROJECT_FIELDS, None);
    let fields = rec.common_fields();
    let sub_projects = rec.sub_projects();

    if rec.failed {
        return None;
    }
    let fields = fields?;
    Some(Project {
        id: fields.id,
        title: fields.title,
        summary: fields.summary,
        details: fields.details,
        image: fields.image,
        images: fields.images,
        videos: fields.videos,
        tools: fields.tools,
        embed: fields.embed,
        sub_projects,
    })
}

/// Ids must be unique across every record and sub-record, valid or not.
fn check_unique_ids(records: &[Value], out: &mut Vec<Violation>) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        for (field, id) in record_ids(record) {
            if let Some(&first) = seen.get(id) {
                out.push(Violation {
                    record: Some(index),
                    id: Some(id.to_owned()),
                    field,
                    kind: ViolationKind::DuplicateId { first },
                });
            } else {
                seen.insert(id, index);
            }
        }
    }
}

/// Field path and id of a record and of each of its sub-records.
fn record_ids(record: &Value) -> Vec<(String, &str)> {
    let mut ids: Vec<(String, &str)> = raw_id(record)
        .map(|id| (String::from("id"), id))
        .into_iter()
        .collect();
    let nested = record.get(NESTED_KEY).and_then(Value::as_array);
    for (i, sub) in nested.into_iter().flatten().enumerate() {
        if let Some(id) = raw_id(sub) {
            ids.push((format!("{NESTED_KEY}[{i}].id"), id));
        }
    }
    ids
}

fn raw_id(record: &Value) -> Option<&str> {
    record
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
}

/// Fields shared by projects and sub-projects.
struct CommonFields {
    id: String,
    title: String,
    summary: String,
    details: String,
    image: String,
    images: Option<Vec<String>>,
    videos: Option<Vec<String>>,
    tools: Option<Vec<String>>,
    embed: Option<String>,
}

/// Violation collector scoped to one record (or one nested sub-record).
struct RecordCheck<'a> {
    index: usize,
    prefix: String,
    id: Option<String>,
    object: &'a Map<String, Value>,
    out: &'a mut Vec<Violation>,
    failed: bool,
}

impl<'a> RecordCheck<'a> {
    fn new(
        index: usize,
        prefix: &str,
        record: &'a Value,
        out: &'a mut Vec<Violation>,
    ) -> Option<Self> {
        let Some(object) = record.as_object() else {
            out.push(Violation {
                record: Some(index),
                id: None,
                field: prefix.trim_end_matches('.').to_owned(),
                kind: ViolationKind::NotAnObject,
            });
            return None;
        };
        let id = object
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Some(Self {
            index,
            prefix: prefix.to_owned(),
            id,
            object,
            out,
            failed: false,
        })
    }

    fn push(&mut self, field: &str, kind: ViolationKind) {
        self.failed = true;
        self.out.push(Violation {
            record: Some(self.index),
            id: self.id.clone(),
            field: format!("{}{field}", self.prefix),
            kind,
        });
    }

    fn unknown_fields(&mut self, allowed: &[&str], nested_forbidden: Option<&str>) {
        let unknown: Vec<(String, ViolationKind)> = self
            .object
            .keys()
            .filter(|key| !allowed.contains(&key.as_str()))
            .map(|key| {
                let kind = if Some(key.as_str()) == nested_forbidden {
                    ViolationKind::NestingNotAllowed
                } else {
                    ViolationKind::UnknownField
                };
                (key.clone(), kind)
            })
            .collect();
        for (key, kind) in unknown {
            self.push(&key, kind);
        }
    }

    fn required_str(&mut self, field: &str, allow_empty: bool) -> Option<String> {
        let object = self.object;
        match object.get(field) {
            None => {
                self.push(field, ViolationKind::MissingField);
                None
            }
            Some(Value::String(s)) if !allow_empty && s.trim().is_empty() => {
                self.push(field, ViolationKind::Empty);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.push(field, ViolationKind::WrongType { expected: "a string" });
                None
            }
        }
    }

    fn optional_str(&mut self, field: &str) -> Option<String> {
        let object = self.object;
        match object.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.push(field, ViolationKind::Empty);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.push(field, ViolationKind::WrongType { expected: "a string" });
                None
            }
        }
    }

    fn optional_str_list(&mut self, field: &str) -> Option<Vec<String>> {
        let object = self.object;
        let items = match object.get(field) {
            None | Some(Value::Null) => return None,
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.push(
                    field,
                    ViolationKind::WrongType {
                        expected: "an array of strings",
                    },
                );
                return None;
            }
        };

        let mut list = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let path = format!("{field}[{i}]");
            match item {
                Value::String(s) if s.trim().is_empty() => self.push(&path, ViolationKind::Empty),
                Value::String(s) => list.push(s.clone()),
                _ => self.push(&path, ViolationKind::WrongType { expected: "a string" }),
            }
        }
        Some(list)
    }

    fn common_fields(&mut self) -> Option<CommonFields> {
        let id = self.required_str("id", false);
        if let Some(id) = &id {
            if !is_valid_id(id) {
                self.push("id", ViolationKind::InvalidId);
            }
        }
        let title = self.required_str("title", false);
        let summary = self.required_str("summary", true);
        let details = self.required_str("details", false);
        if let Some(details) = &details {
            if !is_contained_path(details) {
                self.push("details", ViolationKind::UnsafePath);
            }
        }
        let image = self.required_str("image", false);
        let images = self.optional_str_list("images");
        let videos = self.optional_str_list("videos");
        let tools = self.optional_str_list("tools");
        let embed = self.optional_str("embed");
        if let Some(embed) = &embed {
            if !(embed.starts_with("https://") || embed.starts_with("http://")) {
                self.push("embed", ViolationKind::InvalidUrl);
            }
        }

        Some(CommonFields {
            id: id?,
            title: title?,
            summary: summary?,
            details: details?,
            image: image?,
            images,
            videos,
            tools,
            embed,
        })
    }

    fn sub_projects(&mut self) -> Option<Vec<SubProject>> {
        let object = self.object;
        let items = match object.get(NESTED_KEY) {
            None | Some(Value::Null) => return None,
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.push(
                    NESTED_KEY,
                    ViolationKind::WrongType {
                        expected: "an array of objects",
                    },
                );
                return None;
            }
        };

        let sub_fields = &PROJECT_FIELDS[..PROJECT_FIELDS.len() - 1];
        let mut subs = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let prefix = format!("{}{NESTED_KEY}[{i}].", self.prefix);
            let Some(mut nested) = RecordCheck::new(self.index, &prefix, item, self.out) else {
                self.failed = true;
                continue;
            };
            nested.unknown_fields(sub_fields, Some(NESTED_KEY));
            let fields = nested.common_fields();
            if nested.failed {
                self.failed = true;
                continue;
            }
            if let Some(fields) = fields {
                subs.push(SubProject {
                    id: fields.id,
                    title: fields.title,
                    summary: fields.summary,
                    details: fields.details,
                    image: fields.image,
                    images: fields.images,
                    videos: fields.videos,
                    tools: fields.tools,
                    embed: fields.embed,
                });
            }
        }
        Some(subs)
    }
}

fn is_valid_id(id: &str) -> bool {
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// True when `path` is relative and never climbs out of its base directory.
pub(crate) fn is_contained_path(path: &str) -> bool {
    let path = Path::new(path);
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && path.components().any(|c| matches!(c, Component::Normal(_)))
}

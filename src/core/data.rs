use std::{
    collections::HashMap,
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use tracing::{error, info, warn};

use crate::{
    core::schema::{validate_catalog, Violation},
    types::{Entry, Project},
};

/// Everything that can go wrong between the content file and a page.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content file {} not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("content file {} could not be read: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("content file {} is empty", .path.display())]
    EmptyData { path: PathBuf },

    #[error("content file {} is not valid JSON (line {line}, column {column}): {message}", .path.display())]
    MalformedJson {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("content file {} failed validation with {} violation(s)", .path.display(), .violations.len())]
    SchemaValidation {
        path: PathBuf,
        violations: Vec<Violation>,
    },

    #[error("details for project {id:?} could not be read from {}", .path.display())]
    ReferenceMissing { id: String, path: PathBuf },
}

impl ContentError {
    /// Short machine-readable name used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentError::NotFound { .. } => "not_found",
            ContentError::Io { .. } => "io",
            ContentError::EmptyData { .. } => "empty_data",
            ContentError::MalformedJson { .. } => "malformed_json",
            ContentError::SchemaValidation { .. } => "schema_validation",
            ContentError::ReferenceMissing { .. } => "reference_missing",
        }
    }
}

/// Where raw content text comes from.
///
/// The filesystem is the only production source; tests swap in sources that
/// count reads or change their answer between calls.
pub trait ContentSource: Send + Sync {
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Reads content straight from disk.
pub struct FsSource;

impl ContentSource for FsSource {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Reads and validates the project catalog file.
pub struct ContentLoader {
    path: PathBuf,
    source: Box<dyn ContentSource>,
}

impl ContentLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_source(path, FsSource)
    }

    pub fn with_source(path: impl Into<PathBuf>, source: impl ContentSource + 'static) -> Self {
        ContentLoader {
            path: path.into(),
            source: Box::new(source),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, parse and validate the catalog as a unit.
    ///
    /// Any violation fails the whole load; a partial catalog is never returned.
    pub fn load(&self) -> Result<Catalog, ContentError> {
        let path = &self.path;
        let buffer = match self.source.read(path) {
            Ok(buffer) => buffer,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                error!(path = %path.display(), "content file not found");
                return Err(ContentError::NotFound { path: path.clone() });
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "content file could not be read");
                return Err(ContentError::Io {
                    path: path.clone(),
                    source: err,
                });
            }
        };
        info!(path = %path.display(), size = buffer.len(), "read content file");

        if buffer.trim().is_empty() {
            warn!(path = %path.display(), "content file is empty");
            return Err(ContentError::EmptyData { path: path.clone() });
        }

        let document: serde_json::Value = match serde_json::from_str(&buffer) {
            Ok(document) => document,
            Err(err) => {
                error!(
                    path = %path.display(),
                    line = err.line(),
                    column = err.column(),
                    error = %err,
                    "content file is not valid JSON"
                );
                return Err(ContentError::MalformedJson {
                    path: path.clone(),
                    line: err.line(),
                    column: err.column(),
                    message: err.to_string(),
                });
            }
        };

        match validate_catalog(&document) {
            Ok(projects) => {
                info!(path = %path.display(), projects = projects.len(), "loaded project catalog");
                Ok(Catalog::new(projects))
            }
            Err(violations) => {
                for violation in &violations {
                    error!(path = %path.display(), "{violation}");
                }
                Err(ContentError::SchemaValidation {
                    path: path.clone(),
                    violations,
                })
            }
        }
    }
}

/// Validated, ordered and immutable project collection.
#[derive(Debug, Default)]
pub struct Catalog {
    projects: Vec<Project>,
    // id -> (top-level index, sub-project index)
    index: HashMap<String, (usize, Option<usize>)>,
}

impl Catalog {
    pub fn new(projects: Vec<Project>) -> Self {
        let mut index = HashMap::new();
        for (i, project) in projects.iter().enumerate() {
            index.insert(project.id.clone(), (i, None));
            for (j, sub) in project.sub_projects.iter().flatten().enumerate() {
                index.insert(sub.id.clone(), (i, Some(j)));
            }
        }
        Catalog { projects, index }
    }

    /// Projects in file order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Look up a top-level project or a sub-project.
    pub fn find_entry(&self, id: &str) -> Option<Entry<'_>> {
        let &(i, sub) = self.index.get(id)?;
        let project = self.projects.get(i)?;
        match sub {
            None => Some(Entry::Project(project)),
            Some(j) => {
                let sub = project.sub_projects.as_ref()?.get(j)?;
                Some(Entry::Sub {
                    parent: project,
                    sub,
                })
            }
        }
    }

    /// Every id with a detail page: top-level ids in file order, each
    /// followed by its sub-project ids.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::with_capacity(self.index.len());
        for project in &self.projects {
            ids.push(project.id.as_str());
            ids.extend(project.sub_projects.iter().flatten().map(|s| s.id.as_str()));
        }
        ids
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    pub(crate) const TWO_PROJECTS: &str = r#"[
        {"id": "a", "title": "Alpha", "summary": "First", "details": "a.md", "image": "/a.png"},
        {"id": "b", "title": "Beta", "summary": "Second", "details": "b.md", "image": "/b.png",
         "tools": ["Rust"],
         "subProjects": [
            {"id": "b-1", "title": "Beta One", "summary": "", "details": "b-1.md", "image": "/b1.png"}
         ]}
    ]"#;

    fn content_file(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_preserves_file_order() {
        let file = content_file(TWO_PROJECTS);
        let catalog = ContentLoader::new(file.path()).load().unwrap();

        let ids: Vec<&str> = catalog.projects().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_find_known_and_unknown_ids() {
        let file = content_file(TWO_PROJECTS);
        let catalog = ContentLoader::new(file.path()).load().unwrap();

        let entry = catalog.find_entry("b").unwrap();
        assert_eq!(entry.title(), "Beta");
        assert!(entry.parent().is_none());
        assert!(catalog.find_entry("c").is_none());
    }

    #[test]
    fn test_find_entry_resolves_sub_projects() {
        let file = content_file(TWO_PROJECTS);
        let catalog = ContentLoader::new(file.path()).load().unwrap();

        let entry = catalog.find_entry("b-1").unwrap();
        assert_eq!(entry.title(), "Beta One");
        assert_eq!(entry.parent().map(|p| p.id.as_str()), Some("b"));
        assert!(catalog.find_entry("zzz").is_none());
    }

    #[test]
    fn test_ids_include_nested_entries() {
        let file = content_file(TWO_PROJECTS);
        let catalog = ContentLoader::new(file.path()).load().unwrap();
        assert_eq!(catalog.ids(), vec!["a", "b", "b-1"]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentLoader::new(dir.path().join("projects.json"))
            .load()
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound { .. }));
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_empty_file_is_empty_data() {
        for text in ["", "  \n\t "] {
            let file = content_file(text);
            let err = ContentLoader::new(file.path()).load().unwrap_err();
            assert!(matches!(err, ContentError::EmptyData { .. }), "{err:?}");
        }
    }

    #[test]
    fn test_trailing_comma_is_malformed() {
        let file = content_file(
            r#"[{"id": "a", "title": "A", "summary": "", "details": "a.md", "image": "/a.png"},]"#,
        );
        let err = ContentLoader::new(file.path()).load().unwrap_err();
        match err {
            ContentError::MalformedJson { line, .. } => assert_eq!(line, 1),
            other => panic!("expected MalformedJson, got {other:?}"),
        }
    }

    #[test]
    fn test_schema_violation_fails_whole_load() {
        let file = content_file(
            r#"[
                {"id": "a", "title": "A", "summary": "", "details": "a.md", "image": "/a.png"},
                {"id": "b", "summary": "", "details": "b.md", "image": "/b.png"}
            ]"#,
        );
        let err = ContentLoader::new(file.path()).load().unwrap_err();
        let ContentError::SchemaValidation { violations, .. } = err else {
            panic!("expected SchemaValidation, got {err:?}");
        };
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].record, Some(1));
        assert_eq!(violations[0].field, "title");
    }
}

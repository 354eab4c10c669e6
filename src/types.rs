use serde::Serialize;

/// One portfolio entry, as served to pages and the JSON API.
///
/// Values of this type only come out of [`crate::core::schema::validate_catalog`],
/// so every field already satisfies the content rules.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub details: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_projects: Option<Vec<SubProject>>,
}

/// A grouped entry under a [`Project`]. Same shape, no further nesting.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubProject {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub details: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<String>,
}

/// Borrowed view over either a top-level project or a sub-project.
///
/// The detail page renders both the same way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entry<'a> {
    Project(&'a Project),
    Sub {
        parent: &'a Project,
        sub: &'a SubProject,
    },
}

impl<'a> Entry<'a> {
    pub fn id(&self) -> &'a str {
        match *self {
            Entry::Project(p) => &p.id,
            Entry::Sub { sub, .. } => &sub.id,
        }
    }

    pub fn title(&self) -> &'a str {
        match *self {
            Entry::Project(p) => &p.title,
            Entry::Sub { sub, .. } => &sub.title,
        }
    }

    pub fn summary(&self) -> &'a str {
        match *self {
            Entry::Project(p) => &p.summary,
            Entry::Sub { sub, .. } => &sub.summary,
        }
    }

    pub fn details(&self) -> &'a str {
        match *self {
            Entry::Project(p) => &p.details,
            Entry::Sub { sub, .. } => &sub.details,
        }
    }

    pub fn image(&self) -> &'a str {
        match *self {
            Entry::Project(p) => &p.image,
            Entry::Sub { sub, .. } => &sub.image,
        }
    }

    pub fn images(&self) -> &'a [String] {
        match *self {
            Entry::Project(p) => p.images.as_deref().unwrap_or_default(),
            Entry::Sub { sub, .. } => sub.images.as_deref().unwrap_or_default(),
        }
    }

    pub fn videos(&self) -> &'a [String] {
        match *self {
            Entry::Project(p) => p.videos.as_deref().unwrap_or_default(),
            Entry::Sub { sub, .. } => sub.videos.as_deref().unwrap_or_default(),
        }
    }

    pub fn tools(&self) -> &'a [String] {
        match *self {
            Entry::Project(p) => p.tools.as_deref().unwrap_or_default(),
            Entry::Sub { sub, .. } => sub.tools.as_deref().unwrap_or_default(),
        }
    }

    pub fn embed(&self) -> Option<&'a str> {
        match *self {
            Entry::Project(p) => p.embed.as_deref(),
            Entry::Sub { sub, .. } => sub.embed.as_deref(),
        }
    }

    pub fn sub_projects(&self) -> &'a [SubProject] {
        match *self {
            Entry::Project(p) => p.sub_projects.as_deref().unwrap_or_default(),
            Entry::Sub { .. } => &[],
        }
    }

    /// The top-level project this entry belongs to, if it is nested.
    pub fn parent(&self) -> Option<&'a Project> {
        match *self {
            Entry::Project(_) => None,
            Entry::Sub { parent, .. } => Some(parent),
        }
    }
}

use std::path::PathBuf;

use pulldown_cmark::{html, CowStr, Event, Options, Parser};
use tracing::{debug, warn};

use crate::{
    core::data::{ContentError, ContentSource, FsSource},
    types::Entry,
};

/// Rendered detail body of a project page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailBody {
    Html(String),
    /// The referenced document could not be read.
    Unavailable,
}

/// Resolves `details` references against the content root and renders them.
pub struct DetailStore {
    root: PathBuf,
    source: Box<dyn ContentSource>,
}

impl DetailStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DetailStore {
            root: root.into(),
            source: Box::new(FsSource),
        }
    }

    /// Read the Markdown behind `entry.details()`.
    pub fn load(&self, entry: &Entry<'_>) -> Result<String, ContentError> {
        let path = self.root.join(entry.details());
        self.source
            .read(&path)
            .map_err(|_| ContentError::ReferenceMissing {
                id: entry.id().to_owned(),
                path,
            })
    }

    /// Render the detail body, degrading to [`DetailBody::Unavailable`].
    pub fn render(&self, entry: &Entry<'_>) -> DetailBody {
        match self.load(entry) {
            Ok(markdown) => {
                debug!(id = entry.id(), bytes = markdown.len(), "rendering project details");
                DetailBody::Html(markdown_to_html(&markdown))
            }
            Err(err) => {
                warn!(error = %err, "project details unavailable");
                DetailBody::Unavailable
            }
        }
    }
}

/// Convert Markdown to HTML. Raw HTML in the source is escaped, not passed through.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(pulldown_cmark::Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(pulldown_cmark::Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("data:") {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

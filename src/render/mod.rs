//! HTML rendering for site pages.
//!
//! Renderers take already-validated content and produce complete documents.
//! They never fail: missing content renders as an empty or placeholder state.

pub mod pages;
pub mod project;
pub mod widgets;

use std::fmt::Write;

/// Top-level navigation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavItem {
    Home,
    About,
    Design,
    Developer,
    ThreeD,
    Contact,
}

impl NavItem {
    pub const ALL: [NavItem; 6] = [
        NavItem::Home,
        NavItem::About,
        NavItem::Design,
        NavItem::Developer,
        NavItem::ThreeD,
        NavItem::Contact,
    ];

    pub fn path(self) -> &'static str {
        match self {
            NavItem::Home => "/",
            NavItem::About => "/about",
            NavItem::Design => "/design",
            NavItem::Developer => "/developer",
            NavItem::ThreeD => "/3d",
            NavItem::Contact => "/contact",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NavItem::Home => "Home",
            NavItem::About => "About",
            NavItem::Design => "Design",
            NavItem::Developer => "Developer",
            NavItem::ThreeD => "3D",
            NavItem::Contact => "Contact",
        }
    }
}

/// Per-document metadata.
pub struct PageMeta<'a> {
    pub title: &'a str,
    pub description: &'a str,
    /// Path of this page, joined to the base URL for canonical links.
    pub path: &'a str,
    /// Navigation entry to mark as current, if any.
    pub active: Option<NavItem>,
}

/// Escape text for HTML element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap `body` in the shared document shell.
pub fn layout(base_url: &str, meta: &PageMeta<'_>, body: &str) -> String {
    let title = escape(meta.title);
    let description = escape(meta.description);
    let canonical = escape(&format!("{base_url}{}", meta.path));

    let mut nav = String::new();
    for item in NavItem::ALL {
        let current = if meta.active == Some(item) {
            r#" class="active" aria-current="page""#
        } else {
            ""
        };
        let _ = write!(
            nav,
            r#"<li><a href="{}"{current}>{}</a></li>"#,
            item.path(),
            item.label()
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<meta name="description" content="{description}">
<link rel="canonical" href="{canonical}">
<meta property="og:title" content="{title}">
<meta property="og:description" content="{description}">
<meta property="og:url" content="{canonical}">
</head>
<body>
<header><nav><ul class="nav">{nav}</ul></nav></header>
<main>
{body}
</main>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_layout_marks_active_link_and_canonical() {
        let meta = PageMeta {
            title: "About",
            description: "About me",
            path: "/about",
            active: Some(NavItem::About),
        };
        let html = layout("https://example.com", &meta, "<p>hi</p>");

        assert!(html.contains(r#"<a href="/about" class="active" aria-current="page">About</a>"#));
        assert!(html.contains(r#"<a href="/design">Design</a>"#));
        assert!(html.contains(r#"<link rel="canonical" href="https://example.com/about">"#));
        assert!(html.contains("<p>hi</p>"));
    }
}

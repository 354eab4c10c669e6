//! Home page and the static marketing pages.

use std::fmt::Write;

use crate::{
    core::data::Catalog,
    render::{escape, layout, widgets::Disclosure, NavItem, PageMeta},
    types::Project,
};

const SITE_NAME: &str = "Folio";

struct Milestone {
    heading: &'static str,
    period: &'static str,
    detail: &'static str,
}

const EXPERIENCE: &[Milestone] = &[
    Milestone {
        heading: "Freelance designer & developer",
        period: "2021 - present",
        detail: "Brand identities, product interfaces and the software behind them.",
    },
    Milestone {
        heading: "Studio 3D artist",
        period: "2018 - 2021",
        detail: "Modeling, lighting and look development for product visualization.",
    },
];

const EDUCATION: &[Milestone] = &[Milestone {
    heading: "B.A. Interaction Design",
    period: "2014 - 2018",
    detail: "Typography, motion and front-end prototyping.",
}];

const SERVICES: &[(&str, &str)] = &[
    ("Design", "Identity systems, layout and interface design."),
    ("Development", "Websites and tools built to last."),
    ("3D", "Product renders, scenes and motion."),
];

const ART: &[(&str, &str)] = &[
    ("/art/still-life.jpg", "Still life study"),
    ("/art/city-night.jpg", "City at night"),
    ("/art/portrait.jpg", "Portrait sketch"),
];

/// Home page. `catalog` is `None` when the project catalog failed to load.
pub fn home(base_url: &str, catalog: Option<&Catalog>, open_panel: Option<usize>) -> String {
    let mut body = String::new();

    body.push_str(
        r#"<section id="hero" class="hero"><h1>Design, code &amp; 3D</h1><p>I build brands, interfaces and the software behind them.</p><a class="cta" href="/contact">Get in touch</a></section>"#,
    );
    body.push_str(
        r#"<section id="about"><h2>About</h2><p>A multidisciplinary designer and developer working across print, screen and space.</p><a href="/about">More about me</a></section>"#,
    );

    body.push_str(r#"<section id="experience"><h2>Experience &amp; Education</h2>"#);
    for (i, (summary, items)) in [("Experience", EXPERIENCE), ("Education", EDUCATION)]
        .into_iter()
        .enumerate()
    {
        let mut panel = Disclosure::default();
        if open_panel == Some(i) {
            panel = panel.toggle();
        }
        body.push_str(&panel.render(summary, &milestones(items)));
    }
    body.push_str("</section>");

    body.push_str(r#"<section id="portfolio"><h2>Portfolio</h2>"#);
    match catalog {
        Some(catalog) if !catalog.is_empty() => body.push_str(&portfolio_grid(catalog.projects())),
        Some(_) => body.push_str(r#"<p class="empty">No projects yet.</p>"#),
        None => body.push_str(r#"<p class="empty">Projects are unavailable right now.</p>"#),
    }
    body.push_str("</section>");

    body.push_str(r#"<section id="art"><h2>Art</h2><ul class="gallery">"#);
    for (src, alt) in ART {
        let _ = write!(
            body,
            r#"<li><a href="{src}"><img src="{src}" alt="{alt}" loading="lazy"></a></li>"#
        );
    }
    body.push_str("</ul></section>");

    body.push_str(r#"<section id="services"><h2>Services</h2><ul class="services">"#);
    for (name, blurb) in SERVICES {
        let _ = write!(body, "<li><h3>{name}</h3><p>{blurb}</p></li>");
    }
    body.push_str("</ul></section>");

    body.push_str(r#"<section id="contact"><h2>Contact</h2>"#);
    body.push_str(CONTACT_FORM);
    body.push_str("</section>");

    let meta = PageMeta {
        title: SITE_NAME,
        description: "Portfolio of design, development and 3D work.",
        path: "/",
        active: Some(NavItem::Home),
    };
    layout(base_url, &meta, &body)
}

const CONTACT_FORM: &str = r#"<form class="contact" action="mailto:hello@example.com" method="post" enctype="text/plain"><label>Name <input name="name" required></label><label>Email <input type="email" name="email" required></label><label>Message <textarea name="message" rows="5" required></textarea></label><button type="submit">Send</button></form>"#;

fn milestones(items: &[Milestone]) -> String {
    let mut out = String::from("<ul>");
    for item in items {
        let _ = write!(
            out,
            r#"<li><h3>{}</h3><span class="period">{}</span><p>{}</p></li>"#,
            escape(item.heading),
            escape(item.period),
            escape(item.detail)
        );
    }
    out.push_str("</ul>");
    out
}

/// Grid of summary cards linking to project detail pages.
pub fn portfolio_grid(projects: &[Project]) -> String {
    let mut out = String::from(r#"<ul class="grid">"#);
    for project in projects {
        let _ = write!(
            out,
            r#"<li class="card"><a href="/projects/{id}"><img src="{image}" alt="{title}" loading="lazy"><h3>{title}</h3></a><p>{summary}</p>"#,
            id = escape(&project.id),
            image = escape(&project.image),
            title = escape(&project.title),
            summary = escape(&project.summary),
        );
        out.push_str(&tool_list(project.tools.as_deref().unwrap_or_default()));
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    out
}

/// Tool/technology labels; empty when there are none.
pub fn tool_list(tools: &[String]) -> String {
    if tools.is_empty() {
        return String::new();
    }
    let mut out = String::from(r#"<ul class="tools">"#);
    for tool in tools {
        let _ = write!(out, r#"<li class="tool">{}</li>"#, escape(tool));
    }
    out.push_str("</ul>");
    out
}

/// One of the static marketing pages; `None` for [`NavItem::Home`], which
/// is rendered by [`home`].
pub fn static_page(base_url: &str, item: NavItem) -> Option<String> {
    let (title, description, body) = match item {
        NavItem::Home => return None,
        NavItem::About => (
            "About",
            "Background, approach and tools.",
            r#"<h1>About</h1><p>I started in print design, moved to the web and picked up 3D along the way. Each discipline informs the others.</p>"#,
        ),
        NavItem::Design => (
            "Design",
            "Identity, editorial and interface design.",
            r#"<h1>Design</h1><p>Identity systems, editorial layouts and product interfaces, from first sketch to final files.</p>"#,
        ),
        NavItem::Developer => (
            "Developer",
            "Websites and software.",
            r#"<h1>Developer</h1><p>Fast, accessible websites and small tools, built with care for the details.</p>"#,
        ),
        NavItem::ThreeD => (
            "3D",
            "Modeling, lighting and rendering.",
            r#"<h1>3D</h1><p>Product visualization, environments and motion studies.</p>"#,
        ),
        NavItem::Contact => (
            "Contact",
            "Get in touch.",
            r#"<h1>Contact</h1><p>Tell me about your project.</p>"#,
        ),
    };

    let mut content = String::from(body);
    if item == NavItem::Contact {
        content.push_str(CONTACT_FORM);
    }

    let title = format!("{title} | {SITE_NAME}");
    let meta = PageMeta {
        title: &title,
        description,
        path: item.path(),
        active: Some(item),
    };
    Some(layout(base_url, &meta, &content))
}

/// Standard not-found page.
pub fn not_found(base_url: &str, path: &str) -> String {
    let meta = PageMeta {
        title: "Not found",
        description: "This page does not exist.",
        path,
        active: None,
    };
    layout(
        base_url,
        &meta,
        r#"<h1>Not found</h1><p>This page does not exist.</p><a href="/">Back home</a>"#,
    )
}

/// Shown when the project catalog cannot be loaded for a detail page.
pub fn unavailable(base_url: &str, path: &str) -> String {
    let meta = PageMeta {
        title: "Temporarily unavailable",
        description: "Project content is temporarily unavailable.",
        path,
        active: None,
    };
    layout(
        base_url,
        &meta,
        r#"<h1>Temporarily unavailable</h1><p>Projects are unavailable right now.</p><a href="/">Back home</a>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::validate_catalog;
    use serde_json::json;

    fn catalog() -> Catalog {
        let projects = validate_catalog(&json!([
            {"id": "a", "title": "Alpha <1>", "summary": "First", "details": "a.md", "image": "/a.png", "tools": ["Rust"]},
            {"id": "b", "title": "Beta", "summary": "Second", "details": "b.md", "image": "/b.png"},
        ]))
        .unwrap();
        Catalog::new(projects)
    }

    #[test]
    fn test_home_lists_projects_in_order() {
        let html = home("https://example.com", Some(&catalog()), None);
        let a = html.find(r#"href="/projects/a""#).unwrap();
        let b = html.find(r#"href="/projects/b""#).unwrap();
        assert!(a < b);
        assert!(html.contains("Alpha &lt;1&gt;"));
        assert!(html.contains(r#"<li class="tool">Rust</li>"#));
    }

    #[test]
    fn test_home_without_catalog_renders_fallback() {
        let html = home("https://example.com", None, None);
        assert!(html.contains("Projects are unavailable right now."));
        assert!(html.contains(r#"id="services""#));
        assert!(html.contains(r#"<form class="contact""#));
    }

    #[test]
    fn test_home_empty_catalog() {
        let html = home("https://example.com", Some(&Catalog::default()), None);
        assert!(html.contains("No projects yet."));
    }

    #[test]
    fn test_home_open_panel() {
        let html = home("https://example.com", None, Some(1));
        assert!(html.contains(r#"<details class="panel"><summary>Experience</summary>"#));
        assert!(html.contains(r#"<details class="panel" open><summary>Education</summary>"#));
    }

    #[test]
    fn test_static_pages_mark_active_nav() {
        for item in [NavItem::About, NavItem::Design, NavItem::Developer, NavItem::ThreeD, NavItem::Contact] {
            let html = static_page("https://example.com", item).unwrap();
            let active = format!(r#"<a href="{}" class="active""#, item.path());
            assert!(html.contains(&active), "{item:?}");
        }
        assert!(static_page("https://example.com", NavItem::Contact)
            .unwrap()
            .contains("<form"));
    }

    #[test]
    fn test_home_is_not_a_static_page() {
        assert_eq!(static_page("https://example.com", NavItem::Home), None);
    }
}

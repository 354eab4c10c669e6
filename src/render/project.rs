//! Project detail page.

use std::fmt::Write;

use crate::{
    core::markdown::DetailBody,
    render::{
        escape, layout,
        pages::tool_list,
        widgets::{Viewer, ViewerState},
        PageMeta,
    },
    types::Entry,
};

/// One item shown in the media viewer. Images come first, then videos.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Media<'a> {
    Image(&'a str),
    Video(&'a str),
}

pub fn media_items<'a>(entry: &Entry<'a>) -> Vec<Media<'a>> {
    entry
        .images()
        .iter()
        .map(|src| Media::Image(src))
        .chain(entry.videos().iter().map(|src| Media::Video(src)))
        .collect()
}

/// Render the detail page for `entry`. `view` opens the media viewer on that item.
pub fn detail(base_url: &str, entry: &Entry<'_>, body: &DetailBody, view: Option<usize>) -> String {
    let id = escape(entry.id());
    let title = escape(entry.title());
    let media = media_items(entry);
    let images = entry.images().len();

    let mut out = String::new();
    let _ = write!(out, r#"<article class="project" id="project-{id}">"#);
    if let Some(parent) = entry.parent() {
        let _ = write!(
            out,
            r#"<p class="breadcrumb"><a href="/projects/{}">{}</a></p>"#,
            escape(&parent.id),
            escape(&parent.title)
        );
    }
    let _ = write!(
        out,
        r#"<header><h1>{title}</h1><p class="summary">{}</p><img class="hero" src="{}" alt="{title}"></header>"#,
        escape(entry.summary()),
        escape(entry.image())
    );

    match body {
        DetailBody::Html(html) => {
            let _ = write!(out, r#"<section class="details">{html}</section>"#);
        }
        DetailBody::Unavailable => {
            out.push_str(r#"<section class="details"><p class="placeholder">Details unavailable.</p></section>"#);
        }
    }

    if images > 0 {
        out.push_str(r#"<section class="gallery"><h2>Gallery</h2><ul>"#);
        for (i, src) in entry.images().iter().enumerate() {
            let _ = write!(
                out,
                r#"<li><a href="/projects/{id}?view={i}"><img src="{}" alt="{title} image {}" loading="lazy"></a></li>"#,
                escape(src),
                i + 1
            );
        }
        out.push_str("</ul></section>");
    }

    if !entry.videos().is_empty() {
        out.push_str(r#"<section class="videos"><h2>Videos</h2><ul>"#);
        for (j, src) in entry.videos().iter().enumerate() {
            let _ = write!(
                out,
                r#"<li><video controls preload="metadata" src="{}"></video><a href="/projects/{id}?view={}">View</a></li>"#,
                escape(src),
                images + j
            );
        }
        out.push_str("</ul></section>");
    }

    if let Some(embed) = entry.embed() {
        let _ = write!(
            out,
            r#"<section class="embed"><iframe src="{}" title="{title}" allow="autoplay; fullscreen" allowfullscreen loading="lazy"></iframe></section>"#,
            escape(embed)
        );
    }

    let tools = tool_list(entry.tools());
    if !tools.is_empty() {
        let _ = write!(out, r#"<section class="tools"><h2>Tools</h2>{tools}</section>"#);
    }

    let subs = entry.sub_projects();
    if !subs.is_empty() {
        out.push_str(r#"<section class="sub-projects"><h2>Related work</h2><ul class="grid">"#);
        for sub in subs {
            let _ = write!(
                out,
                r#"<li class="card"><a href="/projects/{}"><img src="{}" alt="{}" loading="lazy"><h3>{}</h3></a><p>{}</p></li>"#,
                escape(&sub.id),
                escape(&sub.image),
                escape(&sub.title),
                escape(&sub.title),
                escape(&sub.summary)
            );
        }
        out.push_str("</ul></section>");
    }

    out.push_str(&viewer(&id, &media, Viewer::opened_at(media.len(), view)));
    out.push_str("</article>");

    let page_path = format!("/projects/{}", entry.id());
    let page_title = entry.title().to_owned();
    let meta = PageMeta {
        title: &page_title,
        description: entry.summary(),
        path: &page_path,
        active: None,
    };
    layout(base_url, &meta, &out)
}

fn viewer(id: &str, media: &[Media<'_>], viewer: Viewer) -> String {
    let ViewerState::Open { index } = viewer.state() else {
        return String::new();
    };

    let mut prev = viewer;
    prev.prev();
    let mut next = viewer;
    next.next();
    let link = |v: Viewer| match v.state() {
        ViewerState::Open { index } => format!("/projects/{id}?view={index}"),
        ViewerState::Closed => format!("/projects/{id}"),
    };

    let item = match media[index] {
        Media::Image(src) => format!(r#"<img src="{}" alt="">"#, escape(src)),
        Media::Video(src) => format!(r#"<video controls autoplay src="{}"></video>"#, escape(src)),
    };

    let mut close = viewer;
    close.close();
    format!(
        r#"<div class="viewer" role="dialog" aria-modal="true"><figure>{item}<figcaption>{} / {}</figcaption></figure><a class="prev" href="{}">Previous</a><a class="next" href="{}">Next</a><a class="close" href="{}">Close</a></div>"#,
        index + 1,
        media.len(),
        link(prev),
        link(next),
        link(close)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Project, SubProject};

    fn project() -> Project {
        Project {
            id: "a".to_owned(),
            title: "Alpha".to_owned(),
            summary: "First".to_owned(),
            details: "a.md".to_owned(),
            image: "/a.png".to_owned(),
            images: Some(vec!["/1.png".to_owned(), "/2.png".to_owned()]),
            videos: Some(vec!["/v.mp4".to_owned()]),
            tools: Some(vec!["Blender".to_owned()]),
            embed: Some("https://player.vimeo.com/video/1".to_owned()),
            sub_projects: Some(vec![SubProject {
                id: "a-1".to_owned(),
                title: "Alpha One".to_owned(),
                summary: String::new(),
                details: "a-1.md".to_owned(),
                image: "/a1.png".to_owned(),
                images: None,
                videos: None,
                tools: None,
                embed: None,
            }]),
        }
    }

    #[test]
    fn test_media_items_images_then_videos() {
        let p = project();
        assert_eq!(
            media_items(&Entry::Project(&p)),
            vec![
                Media::Image("/1.png"),
                Media::Image("/2.png"),
                Media::Video("/v.mp4")
            ]
        );
    }

    #[test]
    fn test_detail_sections() {
        let p = project();
        let body = DetailBody::Html("<p>Body</p>".to_owned());
        let html = detail("https://example.com", &Entry::Project(&p), &body, None);

        assert!(html.contains("<p>Body</p>"));
        assert!(html.contains(r#"href="/projects/a?view=1""#));
        assert!(html.contains(r#"href="/projects/a?view=2">View</a>"#));
        assert!(html.contains(r#"<iframe src="https://player.vimeo.com/video/1""#));
        assert!(html.contains(r#"<li class="tool">Blender</li>"#));
        assert!(html.contains(r#"href="/projects/a-1""#));
        assert!(html.contains(r#"href="https://example.com/projects/a""#));
        assert!(!html.contains(r#"class="viewer""#));
    }

    #[test]
    fn test_detail_placeholder() {
        let p = project();
        let html = detail("https://example.com", &Entry::Project(&p), &DetailBody::Unavailable, None);
        assert!(html.contains("Details unavailable."));
    }

    #[test]
    fn test_viewer_open_on_last_item_wraps() {
        let p = project();
        let html = detail("https://example.com", &Entry::Project(&p), &DetailBody::Unavailable, Some(2));

        assert!(html.contains(r#"<video controls autoplay src="/v.mp4">"#));
        assert!(html.contains("3 / 3"));
        assert!(html.contains(r#"<a class="prev" href="/projects/a?view=1">"#));
        assert!(html.contains(r#"<a class="next" href="/projects/a?view=0">"#));
        assert!(html.contains(r#"<a class="close" href="/projects/a">"#));
    }

    #[test]
    fn test_sub_project_links_parent() {
        let p = project();
        let sub = &p.sub_projects.as_ref().unwrap()[0];
        let entry = Entry::Sub { parent: &p, sub };
        let html = detail("https://example.com", &entry, &DetailBody::Unavailable, Some(0));

        assert!(html.contains(r#"<p class="breadcrumb"><a href="/projects/a">Alpha</a></p>"#));
        // no media, so the viewer stays closed
        assert!(!html.contains(r#"class="viewer""#));
    }
}

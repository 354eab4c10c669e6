//! Stateful page widgets, modeled as explicit finite states.
//!
//! The server renders a widget in one state per request; links and native
//! elements move it to the next state on the following request.

/// Expand-on-click panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Disclosure {
    #[default]
    Collapsed,
    Expanded,
}

impl Disclosure {
    pub fn toggle(self) -> Self {
        match self {
            Disclosure::Collapsed => Disclosure::Expanded,
            Disclosure::Expanded => Disclosure::Collapsed,
        }
    }

    pub fn is_open(self) -> bool {
        self == Disclosure::Expanded
    }

    /// Render as a native `<details>` element.
    pub fn render(self, summary: &str, body_html: &str) -> String {
        let open = if self.is_open() { " open" } else { "" };
        format!(
            r#"<details class="panel"{open}><summary>{}</summary><div class="panel-body">{body_html}</div></details>"#,
            super::escape(summary)
        )
    }
}

/// Modal image/video viewer over `len` media items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewer {
    len: usize,
    state: ViewerState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerState {
    Closed,
    Open { index: usize },
}

impl Viewer {
    pub fn new(len: usize) -> Self {
        Viewer {
            len,
            state: ViewerState::Closed,
        }
    }

    /// Viewer opened at `index`; out-of-range requests leave it closed.
    pub fn opened_at(len: usize, index: Option<usize>) -> Self {
        let mut viewer = Viewer::new(len);
        if let Some(index) = index {
            viewer.open(index);
        }
        viewer
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn open(&mut self, index: usize) {
        if index < self.len {
            self.state = ViewerState::Open { index };
        }
    }

    pub fn close(&mut self) {
        self.state = ViewerState::Closed;
    }

    /// Advance to the next item, wrapping to the first.
    pub fn next(&mut self) {
        if let ViewerState::Open { index } = self.state {
            self.state = ViewerState::Open {
                index: (index + 1) % self.len,
            };
        }
    }

    /// Step back to the previous item, wrapping to the last.
    pub fn prev(&mut self) {
        if let ViewerState::Open { index } = self.state {
            self.state = ViewerState::Open {
                index: (index + self.len - 1) % self.len,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disclosure_toggle() {
        let panel = Disclosure::default();
        assert!(!panel.is_open());
        assert_eq!(panel.toggle(), Disclosure::Expanded);
        assert_eq!(panel.toggle().toggle(), Disclosure::Collapsed);
    }

    #[test]
    fn test_disclosure_render() {
        let html = Disclosure::Expanded.render("Work & Study", "<p>x</p>");
        assert!(html.starts_with(r#"<details class="panel" open>"#));
        assert!(html.contains("<summary>Work &amp; Study</summary>"));
        assert!(!Disclosure::Collapsed.render("a", "").contains(" open"));
    }

    #[test]
    fn test_viewer_wraps() {
        let mut viewer = Viewer::opened_at(3, Some(2));
        viewer.next();
        assert_eq!(viewer.state(), ViewerState::Open { index: 0 });
        viewer.prev();
        viewer.prev();
        assert_eq!(viewer.state(), ViewerState::Open { index: 1 });
        viewer.close();
        assert_eq!(viewer.state(), ViewerState::Closed);
    }

    #[test]
    fn test_viewer_ignores_out_of_range() {
        assert_eq!(Viewer::opened_at(2, Some(2)).state(), ViewerState::Closed);
        assert_eq!(Viewer::opened_at(0, Some(0)).state(), ViewerState::Closed);

        let mut closed = Viewer::new(4);
        closed.next();
        assert_eq!(closed.state(), ViewerState::Closed);
    }
}

//! Live state of one navigable page.

#[cfg(test)]
#[path = "page_test.rs"]
mod page_test;

use crate::index::WidgetIndex;
use crate::model::Widget;
use crate::projection::{Projection, project};

/// One screen's worth of a sitemap: identity, title, and the live widget
/// index for its URL. `widgets` stays `None` until the first page push
/// arrives, which renders as the loading state.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub title: String,
    pub can_go_back: bool,
    widgets: Option<WidgetIndex>,
}

impl Page {
    #[must_use]
    pub fn new(url: String, title: String, can_go_back: bool) -> Self {
        Self { url, title, can_go_back, widgets: None }
    }

    /// Apply a whole-page push: replace all widgets and optionally the title.
    pub fn replace_widgets(&mut self, widgets: Vec<Widget>, title: Option<String>) {
        if let Some(title) = title {
            self.title = title;
        }
        match &mut self.widgets {
            Some(index) => index.replace_all(widgets),
            None => self.widgets = Some(WidgetIndex::from_widgets(widgets)),
        }
    }

    /// Apply a single-widget push. Returns whether anything changed; a
    /// widget unknown to the page (or a page that never loaded) is a no-op.
    pub fn update_widget(&mut self, widget: Widget) -> bool {
        match &mut self.widgets {
            Some(index) => index.upsert(widget),
            None => false,
        }
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
    }

    #[must_use]
    pub fn widget_index(&self) -> Option<&WidgetIndex> {
        self.widgets.as_ref()
    }

    /// Rebuild the renderable projection from current state.
    #[must_use]
    pub fn project(&self) -> Projection {
        project(self.widgets.as_ref())
    }
}

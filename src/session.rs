//! Session and navigation control for one display instance.
//!
//! A session owns a stack of screens. Real pages carry a live
//! [`WidgetIndex`](crate::index::WidgetIndex) and are addressable by URL
//! so server pushes can be routed to them; action sheets and selection
//! pickers are ephemeral and capture the originating item when opened.
//! Every handler re-derives what it needs from current widget state —
//! there is no retained view model between updates.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use crate::error::LoadError;
use crate::feed::{CommandSink, Preferences};
use crate::model::{Item, LinkedPage, Sitemap, Widget};
use crate::page::Page;
use crate::presentation::{ActionItem, Presentation, SelectionItem, classify};
use crate::projection::Projection;

const EMPTY_SITEMAP_LIST_MESSAGE: &str = "Sitemap list is empty";

/// One entry of the navigation stack.
#[derive(Debug, Clone)]
pub enum Screen {
    /// No data subscription result yet.
    Loading,
    /// Terminal failure view offering retry.
    Error { message: String, detail: Option<String> },
    /// Pick one of several available sitemaps.
    SitemapPicker(Vec<Sitemap>),
    /// A live widget page.
    Page(Page),
    /// Ephemeral sheet of discrete commands for one widget.
    ActionSheet {
        title: String,
        item: Option<Item>,
        actions: Vec<ActionItem>,
    },
    /// Ephemeral single-choice picker for one widget.
    Selection {
        title: String,
        item: Option<Item>,
        options: Vec<SelectionItem>,
        selected: Option<usize>,
    },
}

/// Declarative description of the current screen, consumed by the host
/// rendering surface and rebuilt from scratch after every change.
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    Loading,
    Error { message: String, detail: Option<String> },
    SitemapPicker { sitemaps: Vec<Sitemap> },
    WidgetList {
        title: String,
        can_go_back: bool,
        projection: Projection,
    },
    ActionSheet { title: String, actions: Vec<ActionItem> },
    Selection {
        title: String,
        options: Vec<SelectionItem>,
        selected: Option<usize>,
    },
}

/// Navigation state machine for one display instance.
pub struct Session {
    stack: Vec<Screen>,
    sitemaps: Option<Result<Vec<Sitemap>, LoadError>>,
    sink: Arc<dyn CommandSink>,
    prefs: Arc<dyn Preferences>,
}

impl Session {
    #[must_use]
    pub fn new(sink: Arc<dyn CommandSink>, prefs: Arc<dyn Preferences>) -> Self {
        let mut session = Self { stack: Vec::new(), sitemaps: None, sink, prefs };
        let root = session.root_screen();
        session.stack.push(root);
        session
    }

    // --- Feed handlers ---

    /// A new sitemap list (or lack thereof) arrived: the whole stack is
    /// reset to the root screen it resolves to.
    pub fn handle_sitemap_list(&mut self, result: Option<Result<Vec<Sitemap>, LoadError>>) {
        self.sitemaps = result;
        let root = self.root_screen();
        self.stack.clear();
        self.stack.push(root);
    }

    /// Whole-page push: routed to the open page with that URL, ignored
    /// otherwise.
    pub fn handle_page_replaced(
        &mut self,
        url: &str,
        title: Option<String>,
        widgets: Vec<Widget>,
    ) {
        match self.page_mut(url) {
            Some(page) => page.replace_widgets(widgets, title),
            None => tracing::debug!(%url, "page push for url not open; ignored"),
        }
    }

    /// Single-widget push: routed to the open page with that URL, ignored
    /// otherwise.
    pub fn handle_widget_replaced(&mut self, url: &str, widget: Widget) {
        match self.page_mut(url) {
            Some(page) => {
                if !page.update_widget(widget) {
                    tracing::debug!(%url, "widget push for unknown widget; ignored");
                }
            }
            None => tracing::debug!(%url, "widget push for url not open; ignored"),
        }
    }

    /// Title-only push for an open page.
    pub fn handle_title_changed(&mut self, url: &str, title: String) {
        if let Some(page) = self.page_mut(url) {
            page.set_title(title);
        }
    }

    /// Unrecoverable load failure: the stack collapses to an error view.
    pub fn handle_load_failure(&mut self, error: &LoadError) {
        self.stack.clear();
        self.stack.push(Self::error_screen(error));
    }

    // --- User interaction ---

    /// Activate a row on the current page. Depending on the widget's
    /// presentation this navigates into a linked page or opens an action
    /// sheet or selection picker; text and toggle rows do nothing here.
    pub fn open_row(&mut self, widget_id: &str) {
        let Some((presentation, title, item)) = self.widget_presentation(widget_id) else {
            return;
        };
        match presentation {
            Presentation::PageLink(page) => self.open_page(&page),
            Presentation::ActionList(actions) => {
                self.stack.push(Screen::ActionSheet { title, item, actions });
            }
            Presentation::Selection { options, selected } => {
                self.stack.push(Screen::Selection { title, item, options, selected });
            }
            Presentation::Toggle { .. } | Presentation::Text => {}
        }
    }

    /// Flip a toggle row: sends the literal `ON`/`OFF` for the new state.
    pub fn set_toggle(&mut self, widget_id: &str, checked: bool) {
        let Some((presentation, _, item)) = self.widget_presentation(widget_id) else {
            return;
        };
        if matches!(presentation, Presentation::Toggle { .. }) {
            self.send(item.as_ref(), if checked { "ON" } else { "OFF" });
        }
    }

    /// Choose an entry of the currently open action sheet or selection
    /// picker; its command goes to the command sink.
    pub fn choose(&mut self, index: usize) {
        let chosen: Option<(Option<Item>, String)> = match self.stack.last() {
            Some(Screen::ActionSheet { item, actions, .. }) => actions
                .get(index)
                .map(|action| (item.clone(), action.command().to_owned())),
            Some(Screen::Selection { item, options, .. }) => options
                .get(index)
                .map(|option| (item.clone(), option.command.clone())),
            _ => None,
        };
        if let Some((item, command)) = chosen {
            self.send(item.as_ref(), &command);
        }
    }

    /// Pick a sitemap from the picker: the choice is remembered and its
    /// homepage becomes the new root.
    pub fn select_sitemap(&mut self, index: usize) {
        let chosen = match self.stack.last() {
            Some(Screen::SitemapPicker(sitemaps)) => sitemaps.get(index).cloned(),
            _ => None,
        };
        let Some(sitemap) = chosen else {
            return;
        };
        self.prefs.set_default_sitemap(&sitemap.name);
        self.stack.clear();
        self.stack.push(Screen::Page(Page::new(
            sitemap.homepage_link,
            sitemap.label,
            false,
        )));
    }

    /// Leave the current sub-view. The root screen cannot be popped.
    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    // --- Queries ---

    /// URLs of all currently open pages, in stack order. The connection
    /// layer subscribes to exactly this set.
    #[must_use]
    pub fn page_urls(&self) -> Vec<String> {
        self.stack
            .iter()
            .filter_map(|screen| match screen {
                Screen::Page(page) => Some(page.url.clone()),
                _ => None,
            })
            .collect()
    }

    /// Render the top of the stack.
    #[must_use]
    pub fn template(&self) -> Template {
        match self.stack.last() {
            None | Some(Screen::Loading) => Template::Loading,
            Some(Screen::Error { message, detail }) => {
                Template::Error { message: message.clone(), detail: detail.clone() }
            }
            Some(Screen::SitemapPicker(sitemaps)) => {
                Template::SitemapPicker { sitemaps: sitemaps.clone() }
            }
            Some(Screen::Page(page)) => Template::WidgetList {
                title: page.title.clone(),
                can_go_back: page.can_go_back,
                projection: page.project(),
            },
            Some(Screen::ActionSheet { title, actions, .. }) => {
                Template::ActionSheet { title: title.clone(), actions: actions.clone() }
            }
            Some(Screen::Selection { title, options, selected, .. }) => Template::Selection {
                title: title.clone(),
                options: options.clone(),
                selected: *selected,
            },
        }
    }

    // --- Internals ---

    fn root_screen(&self) -> Screen {
        match &self.sitemaps {
            None => Screen::Loading,
            Some(Err(error)) => Self::error_screen(error),
            Some(Ok(sitemaps)) => {
                let remembered = self.prefs.default_sitemap();
                let chosen = sitemaps
                    .iter()
                    .find(|sitemap| remembered.as_deref() == Some(sitemap.name.as_str()))
                    .or_else(|| (sitemaps.len() == 1).then(|| &sitemaps[0]));
                match chosen {
                    Some(sitemap) => Screen::Page(Page::new(
                        sitemap.homepage_link.clone(),
                        sitemap.label.clone(),
                        false,
                    )),
                    None if sitemaps.is_empty() => Screen::Error {
                        message: EMPTY_SITEMAP_LIST_MESSAGE.to_owned(),
                        detail: None,
                    },
                    None => Screen::SitemapPicker(sitemaps.clone()),
                }
            }
        }
    }

    fn error_screen(error: &LoadError) -> Screen {
        Screen::Error {
            message: error.user_message().to_owned(),
            detail: Some(error.to_string()),
        }
    }

    fn open_page(&mut self, linked: &LinkedPage) {
        self.stack.push(Screen::Page(Page::new(
            linked.link.clone(),
            linked.title.clone(),
            true,
        )));
    }

    /// Current presentation of a widget on the top page, together with
    /// its display title and a copy of its linked item.
    fn widget_presentation(
        &self,
        widget_id: &str,
    ) -> Option<(Presentation, String, Option<Item>)> {
        let Some(Screen::Page(page)) = self.stack.last() else {
            return None;
        };
        let widget = page.widget_index()?.get(widget_id)?;
        Some((classify(widget), widget.title().to_owned(), widget.item.clone()))
    }

    fn page_mut(&mut self, url: &str) -> Option<&mut Page> {
        self.stack.iter_mut().find_map(|screen| match screen {
            Screen::Page(page) if page.url == url => Some(page),
            _ => None,
        })
    }

    fn send(&self, item: Option<&Item>, command: &str) {
        match item {
            Some(item) => self.sink.send_command(item, command),
            None => tracing::debug!(%command, "command for widget without linked item dropped"),
        }
    }
}

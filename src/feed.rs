//! Inbound feed events and the collaborator seams.
//!
//! The connection layer, command dispatcher, preference storage and icon
//! fetcher all live outside this crate; the engine talks to them through
//! the traits below. `FeedEvent` is the full vocabulary of server pushes
//! the engine consumes.

use async_trait::async_trait;

use crate::error::LoadError;
use crate::model::{Item, Sitemap, Widget};

/// One server push, routed to sessions by the service layer.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A fresh sitemap list (or the failure to obtain one). `None` means
    /// "loading": no result is available yet.
    SitemapList(Option<Result<Vec<Sitemap>, LoadError>>),
    /// Whole-page replacement for the page at `url`.
    PageReplaced {
        url: String,
        title: Option<String>,
        widgets: Vec<Widget>,
    },
    /// Single-widget replacement within the page at `url`.
    WidgetReplaced { url: String, widget: Widget },
    /// Title-only update for the page at `url`.
    PageTitleChanged { url: String, title: String },
    /// The data feed failed irrecoverably.
    LoadFailed(LoadError),
}

/// Dispatches item commands to the server. Fire-and-forget: the engine
/// never applies optimistic local state and relies on the next push to
/// reflect the outcome.
pub trait CommandSink: Send + Sync {
    fn send_command(&self, item: &Item, command: &str);
}

/// Persisted user preferences. A single key: the default sitemap name.
pub trait Preferences: Send + Sync {
    fn default_sitemap(&self) -> Option<String>;
    fn set_default_sitemap(&self, name: &str);
}

/// Hooks back into the connection layer.
pub trait ConnectionControl: Send + Sync {
    /// Re-trigger the upstream connectivity check (the error screen's
    /// retry action).
    fn restart_network_check(&self);

    /// Inform the connection layer which page URLs are currently open so
    /// it can subscribe to exactly those update streams.
    fn set_active_pages(&self, urls: Vec<String>);
}

/// Loads the initial sitemap list when a connection becomes active.
#[async_trait]
pub trait SitemapLoader: Send + Sync {
    async fn load_sitemaps(&self) -> Result<Vec<Sitemap>, LoadError>;
}

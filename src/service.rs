//! Multi-session host service.
//!
//! DESIGN
//! ======
//! One `HeadUnit` per process coordinates any number of display sessions
//! (e.g. several paired car displays). Every mutation — feed pushes, user
//! actions, connection changes — flows through a single mpsc queue drained
//! by one spawned task, so no two updates ever mutate the same page
//! concurrently and no locks are held across await points. Rendering
//! reads go through the shared `RwLock` and never block on I/O.
//!
//! The synchronous [`ServiceCore`] holds all state and logic so it can be
//! tested without the runtime; `HeadUnit` is the thin async shell that
//! owns the queue and the abortable initial-load job.
//!
//! CANCELLATION
//! ============
//! Switching the upstream connection aborts any in-flight sitemap load
//! and bumps a generation counter. Results are tagged with the generation
//! they were started under and discarded when stale, so a superseded
//! fetch can never clobber a newer one even if its result was already
//! queued (last-request-wins).

#[cfg(test)]
#[path = "service_test.rs"]
mod service_test;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::LoadError;
use crate::feed::{CommandSink, ConnectionControl, FeedEvent, Preferences, SitemapLoader};
use crate::model::Sitemap;
use crate::session::{Session, Template};

const EVENT_QUEUE_CAPACITY: usize = 64;

/// A user interaction on one session, applied on the serialized path.
#[derive(Debug, Clone)]
pub enum UserAction {
    OpenRow { widget_id: String },
    SetToggle { widget_id: String, checked: bool },
    Choose { index: usize },
    SelectSitemap { index: usize },
    Pop,
    Retry,
}

/// Everything the service task processes.
#[derive(Debug)]
pub enum ServiceEvent {
    Feed(FeedEvent),
    /// The active upstream connection changed; reload initial data.
    ConnectionChanged,
    /// Result of an initial load started under `generation`.
    InitLoaded {
        generation: u64,
        result: Result<Vec<Sitemap>, LoadError>,
    },
    User { session_id: Uuid, action: UserAction },
}

/// All session state and update logic, single-threaded.
pub struct ServiceCore {
    sessions: HashMap<Uuid, Session>,
    generation: u64,
    sink: Arc<dyn CommandSink>,
    prefs: Arc<dyn Preferences>,
    control: Arc<dyn ConnectionControl>,
    active_pages: Vec<String>,
}

impl ServiceCore {
    #[must_use]
    pub fn new(
        sink: Arc<dyn CommandSink>,
        prefs: Arc<dyn Preferences>,
        control: Arc<dyn ConnectionControl>,
    ) -> Self {
        Self {
            sessions: HashMap::new(),
            generation: 0,
            sink,
            prefs,
            control,
            active_pages: Vec::new(),
        }
    }

    /// Register a new display session.
    pub fn create_session(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .insert(id, Session::new(self.sink.clone(), self.prefs.clone()));
        info!(session_id = %id, "session created");
        id
    }

    /// Drop a session, releasing its page subscriptions.
    pub fn remove_session(&mut self, id: Uuid) {
        self.sessions.remove(&id);
        self.publish_pages();
    }

    /// Render the given session's current screen.
    #[must_use]
    pub fn template(&self, id: Uuid) -> Option<Template> {
        self.sessions.get(&id).map(Session::template)
    }

    /// Union of all sessions' open page URLs, deduplicated and ordered.
    #[must_use]
    pub fn open_page_urls(&self) -> Vec<String> {
        let urls: BTreeSet<String> = self
            .sessions
            .values()
            .flat_map(Session::page_urls)
            .collect();
        urls.into_iter().collect()
    }

    /// Start a new load generation: sessions drop back to loading and any
    /// later result from an older generation will be discarded. Returns
    /// the generation the caller must tag the load with.
    pub fn begin_reload(&mut self) -> u64 {
        self.generation += 1;
        debug!(generation = self.generation, "connection changed; reloading initial data");
        for session in self.sessions.values_mut() {
            session.handle_sitemap_list(None);
        }
        self.publish_pages();
        self.generation
    }

    /// Apply one event. Stale init results are dropped here, so the
    /// last-request-wins guarantee does not depend on task abort timing.
    pub fn handle_event(&mut self, event: ServiceEvent) {
        match event {
            ServiceEvent::Feed(feed) => self.apply_feed(feed),
            ServiceEvent::ConnectionChanged => {
                self.begin_reload();
            }
            ServiceEvent::InitLoaded { generation, result } => {
                if generation != self.generation {
                    debug!(generation, current = self.generation, "stale init result discarded");
                    return;
                }
                for session in self.sessions.values_mut() {
                    session.handle_sitemap_list(Some(result.clone()));
                }
                self.publish_pages();
            }
            ServiceEvent::User { session_id, action } => self.apply_user(session_id, action),
        }
    }

    fn apply_feed(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::SitemapList(result) => {
                for session in self.sessions.values_mut() {
                    session.handle_sitemap_list(result.clone());
                }
            }
            FeedEvent::PageReplaced { url, title, widgets } => {
                for session in self.sessions.values_mut() {
                    session.handle_page_replaced(&url, title.clone(), widgets.clone());
                }
            }
            FeedEvent::WidgetReplaced { url, widget } => {
                for session in self.sessions.values_mut() {
                    session.handle_widget_replaced(&url, widget.clone());
                }
            }
            FeedEvent::PageTitleChanged { url, title } => {
                for session in self.sessions.values_mut() {
                    session.handle_title_changed(&url, title.clone());
                }
            }
            FeedEvent::LoadFailed(error) => {
                for session in self.sessions.values_mut() {
                    session.handle_load_failure(&error);
                }
            }
        }
        self.publish_pages();
    }

    fn apply_user(&mut self, session_id: Uuid, action: UserAction) {
        if matches!(action, UserAction::Retry) {
            self.control.restart_network_check();
            return;
        }
        let Some(session) = self.sessions.get_mut(&session_id) else {
            debug!(%session_id, "user action for unknown session; ignored");
            return;
        };
        match action {
            UserAction::OpenRow { widget_id } => session.open_row(&widget_id),
            UserAction::SetToggle { widget_id, checked } => {
                session.set_toggle(&widget_id, checked);
            }
            UserAction::Choose { index } => session.choose(index),
            UserAction::SelectSitemap { index } => session.select_sitemap(index),
            UserAction::Pop => session.pop(),
            UserAction::Retry => {}
        }
        self.publish_pages();
    }

    /// Push the open-page set to the connection layer when it changed.
    fn publish_pages(&mut self) {
        let urls = self.open_page_urls();
        if urls != self.active_pages {
            self.active_pages = urls.clone();
            self.control.set_active_pages(urls);
        }
    }
}

/// Async shell around [`ServiceCore`]: owns the event queue, the spawned
/// update task, and the abortable initial-load job.
pub struct HeadUnit {
    core: Arc<RwLock<ServiceCore>>,
    events: mpsc::Sender<ServiceEvent>,
    task: JoinHandle<()>,
}

impl HeadUnit {
    /// Spawn the service task.
    #[must_use]
    pub fn spawn(
        loader: Arc<dyn SitemapLoader>,
        sink: Arc<dyn CommandSink>,
        prefs: Arc<dyn Preferences>,
        control: Arc<dyn ConnectionControl>,
    ) -> Self {
        let core = Arc::new(RwLock::new(ServiceCore::new(sink, prefs, control)));
        let (events, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let task = tokio::spawn(event_loop(core.clone(), rx, events.clone(), loader));
        Self { core, events, task }
    }

    /// Register a new display session and return its id.
    pub async fn create_session(&self) -> Uuid {
        self.core.write().await.create_session()
    }

    /// Drop a session.
    pub async fn remove_session(&self, id: Uuid) {
        self.core.write().await.remove_session(id);
    }

    /// Enqueue a server push.
    pub async fn push_event(&self, event: FeedEvent) {
        self.enqueue(ServiceEvent::Feed(event)).await;
    }

    /// The active upstream connection changed; cancel any in-flight load
    /// and start over.
    pub async fn connection_changed(&self) {
        self.enqueue(ServiceEvent::ConnectionChanged).await;
    }

    /// Enqueue a user interaction for one session.
    pub async fn user_action(&self, session_id: Uuid, action: UserAction) {
        self.enqueue(ServiceEvent::User { session_id, action }).await;
    }

    /// Render a session's current screen.
    pub async fn template(&self, session_id: Uuid) -> Option<Template> {
        self.core.read().await.template(session_id)
    }

    /// Union of open page URLs across all sessions.
    pub async fn open_page_urls(&self) -> Vec<String> {
        self.core.read().await.open_page_urls()
    }

    async fn enqueue(&self, event: ServiceEvent) {
        if self.events.send(event).await.is_err() {
            debug!("service task gone; event dropped");
        }
    }
}

impl Drop for HeadUnit {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The serialized update loop: drains the queue, intercepting connection
/// changes to manage the load job; everything else goes to the core.
async fn event_loop(
    core: Arc<RwLock<ServiceCore>>,
    mut rx: mpsc::Receiver<ServiceEvent>,
    tx: mpsc::Sender<ServiceEvent>,
    loader: Arc<dyn SitemapLoader>,
) {
    let mut load_job: Option<JoinHandle<()>> = None;
    while let Some(event) = rx.recv().await {
        match event {
            ServiceEvent::ConnectionChanged => {
                if let Some(job) = load_job.take() {
                    job.abort();
                }
                let generation = core.write().await.begin_reload();
                let tx = tx.clone();
                let loader = loader.clone();
                load_job = Some(tokio::spawn(async move {
                    let result = loader.load_sitemaps().await;
                    if tx
                        .send(ServiceEvent::InitLoaded { generation, result })
                        .await
                        .is_err()
                    {
                        debug!("service task gone before init load completed");
                    }
                }));
            }
            other => core.write().await.handle_event(other),
        }
    }
}

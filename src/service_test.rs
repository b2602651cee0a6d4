use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::*;
use crate::feed::test_helpers::{FixedLoader, MemoryPreferences, RecordingControl, RecordingSink};
use crate::model::WidgetKind;

fn make_core() -> (ServiceCore, Arc<RecordingSink>, Arc<RecordingControl>) {
    let sink = Arc::new(RecordingSink::default());
    let prefs = Arc::new(MemoryPreferences::default());
    let control = Arc::new(RecordingControl::default());
    (ServiceCore::new(sink.clone(), prefs, control.clone()), sink, control)
}

fn make_sitemap(name: &str) -> Sitemap {
    Sitemap {
        name: name.to_owned(),
        label: format!("{name} dashboard"),
        homepage_link: format!("http://server/rest/sitemaps/{name}/{name}"),
    }
}

fn sitemap_push(names: &[&str]) -> FeedEvent {
    FeedEvent::SitemapList(Some(Ok(names.iter().map(|n| make_sitemap(n)).collect())))
}

fn make_widget(id: &str) -> crate::model::Widget {
    crate::model::Widget {
        id: id.to_owned(),
        parent_id: None,
        kind: WidgetKind::Text,
        label: id.to_owned(),
        icon: None,
        visibility: true,
        item: None,
        mappings: Vec::new(),
        linked_page: None,
    }
}

// =============================================================
// Fan-out and page-set publication
// =============================================================

#[test]
fn feed_events_fan_out_to_all_sessions() {
    let (mut core, _, _) = make_core();
    let first = core.create_session();
    let second = core.create_session();
    core.handle_event(ServiceEvent::Feed(sitemap_push(&["home"])));
    assert!(matches!(core.template(first), Some(Template::WidgetList { .. })));
    assert!(matches!(core.template(second), Some(Template::WidgetList { .. })));
}

#[test]
fn open_page_urls_are_deduplicated_across_sessions() {
    let (mut core, _, _) = make_core();
    core.create_session();
    core.create_session();
    core.handle_event(ServiceEvent::Feed(sitemap_push(&["home"])));
    assert_eq!(core.open_page_urls(), ["http://server/rest/sitemaps/home/home"]);
}

#[test]
fn page_set_changes_are_published_to_the_connection_layer() {
    let (mut core, _, control) = make_core();
    core.create_session();
    core.handle_event(ServiceEvent::Feed(sitemap_push(&["home"])));
    let sets = control.page_sets.lock().expect("control lock").clone();
    assert_eq!(
        sets.last().expect("a published set"),
        &["http://server/rest/sitemaps/home/home".to_owned()]
    );
}

#[test]
fn removing_a_session_releases_its_pages() {
    let (mut core, _, control) = make_core();
    let id = core.create_session();
    core.handle_event(ServiceEvent::Feed(sitemap_push(&["home"])));
    core.remove_session(id);
    assert!(core.open_page_urls().is_empty());
    let sets = control.page_sets.lock().expect("control lock").clone();
    assert_eq!(sets.last().expect("a published set"), &Vec::<String>::new());
}

#[test]
fn pushes_for_urls_outside_the_open_set_are_noops() {
    let (mut core, _, _) = make_core();
    let id = core.create_session();
    core.handle_event(ServiceEvent::Feed(sitemap_push(&["home"])));
    let before = core.template(id);
    core.handle_event(ServiceEvent::Feed(FeedEvent::WidgetReplaced {
        url: "http://server/rest/sitemaps/other/other".to_owned(),
        widget: make_widget("w"),
    }));
    core.handle_event(ServiceEvent::Feed(FeedEvent::PageReplaced {
        url: "http://server/rest/sitemaps/other/other".to_owned(),
        title: None,
        widgets: vec![make_widget("w")],
    }));
    assert_eq!(core.template(id), before);
}

// =============================================================
// User actions
// =============================================================

#[test]
fn retry_restarts_the_network_check() {
    let (mut core, _, control) = make_core();
    let id = core.create_session();
    core.handle_event(ServiceEvent::User { session_id: id, action: UserAction::Retry });
    assert_eq!(control.restarts.load(Ordering::SeqCst), 1);
}

#[test]
fn actions_for_unknown_sessions_are_ignored() {
    let (mut core, _, _) = make_core();
    core.handle_event(ServiceEvent::User {
        session_id: Uuid::new_v4(),
        action: UserAction::Pop,
    });
}

#[test]
fn sitemap_selection_routes_to_the_session() {
    let (mut core, _, _) = make_core();
    let id = core.create_session();
    core.handle_event(ServiceEvent::Feed(sitemap_push(&["a", "b"])));
    assert!(matches!(core.template(id), Some(Template::SitemapPicker { .. })));
    core.handle_event(ServiceEvent::User {
        session_id: id,
        action: UserAction::SelectSitemap { index: 0 },
    });
    assert!(matches!(core.template(id), Some(Template::WidgetList { .. })));
    assert_eq!(core.open_page_urls(), ["http://server/rest/sitemaps/a/a"]);
}

// =============================================================
// Reload generations
// =============================================================

#[test]
fn reload_drops_sessions_back_to_loading() {
    let (mut core, _, _) = make_core();
    let id = core.create_session();
    core.handle_event(ServiceEvent::Feed(sitemap_push(&["home"])));
    core.begin_reload();
    assert!(matches!(core.template(id), Some(Template::Loading)));
    assert!(core.open_page_urls().is_empty());
}

#[test]
fn stale_init_results_are_discarded() {
    let (mut core, _, _) = make_core();
    let id = core.create_session();
    let superseded = core.begin_reload();
    let current = core.begin_reload();

    core.handle_event(ServiceEvent::InitLoaded {
        generation: superseded,
        result: Ok(vec![make_sitemap("stale")]),
    });
    assert!(matches!(core.template(id), Some(Template::Loading)));

    core.handle_event(ServiceEvent::InitLoaded {
        generation: current,
        result: Ok(vec![make_sitemap("fresh")]),
    });
    let Some(Template::WidgetList { title, .. }) = core.template(id) else {
        panic!("expected widget list");
    };
    assert_eq!(title, "fresh dashboard");
}

// =============================================================
// Async shell
// =============================================================

async fn template_eventually(unit: &HeadUnit, id: Uuid) -> Option<Template> {
    for _ in 0..200 {
        match unit.template(id).await {
            Some(Template::Loading) | None => {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            other => return other,
        }
    }
    unit.template(id).await
}

#[tokio::test]
async fn connection_change_loads_and_applies_sitemaps() {
    let loader = Arc::new(FixedLoader { result: Ok(vec![make_sitemap("home")]) });
    let unit = HeadUnit::spawn(
        loader,
        Arc::new(RecordingSink::default()),
        Arc::new(MemoryPreferences::default()),
        Arc::new(RecordingControl::default()),
    );
    let id = unit.create_session().await;
    unit.connection_changed().await;

    let template = template_eventually(&unit, id).await;
    assert!(matches!(template, Some(Template::WidgetList { .. })));
    assert_eq!(
        unit.open_page_urls().await,
        ["http://server/rest/sitemaps/home/home"]
    );
}

#[tokio::test]
async fn failed_load_surfaces_the_error_screen() {
    let loader = Arc::new(FixedLoader { result: Err(LoadError::NoServerInfo) });
    let unit = HeadUnit::spawn(
        loader,
        Arc::new(RecordingSink::default()),
        Arc::new(MemoryPreferences::default()),
        Arc::new(RecordingControl::default()),
    );
    let id = unit.create_session().await;
    unit.connection_changed().await;

    let template = template_eventually(&unit, id).await;
    let Some(Template::Error { message, .. }) = template else {
        panic!("expected error template");
    };
    assert_eq!(message, "openHAB server not reachable");
}

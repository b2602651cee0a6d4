//! List projection: turning a page's widget index into renderable rows.
//!
//! The projection is rebuilt from scratch on every change; there is no
//! retained view model to diff against. Frames act as section headers:
//! when any frame is visible the page renders as named sections, each
//! holding the frame's visible direct children. Visible widgets outside
//! every frame collect into a trailing unlabeled section so a partially
//! framed page never drops rows. Without visible frames the page is a
//! single flat list in server order.

#[cfg(test)]
#[path = "projection_test.rs"]
mod projection_test;

use std::collections::HashSet;

use crate::index::WidgetIndex;
use crate::model::{Widget, WidgetKind};
use crate::presentation::{Presentation, classify};
use crate::visibility::should_show;

/// One renderable row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub widget_id: String,
    pub title: String,
    /// Secondary text, from the label's state part.
    pub detail: Option<String>,
    pub accessory: RowAccessory,
}

/// The interaction affordance shown on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAccessory {
    /// Nothing; the row is informational.
    None,
    /// An inline on/off control.
    Toggle { checked: bool },
    /// A navigation indicator; activating opens a sub-view.
    Browse,
}

/// A named group of rows backed by a frame widget.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Frame label; `None` for the trailing unframed group.
    pub label: Option<String>,
    pub rows: Vec<Row>,
}

/// The renderable shape of one page.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// No data has ever been received for the page.
    Loading,
    Flat(Vec<Row>),
    Grouped(Vec<Section>),
}

/// Project a page's widgets into rows.
#[must_use]
pub fn project(index: Option<&WidgetIndex>) -> Projection {
    let Some(index) = index else {
        return Projection::Loading;
    };

    let visible: Vec<&Widget> = index
        .ordered()
        .iter()
        .filter(|widget| should_show(widget, index))
        .collect();
    let frames: Vec<&Widget> = visible
        .iter()
        .copied()
        .filter(|widget| widget.kind == WidgetKind::Frame)
        .collect();

    if frames.is_empty() {
        return Projection::Flat(visible.iter().copied().map(build_row).collect());
    }

    let mut sections: Vec<Section> = frames
        .iter()
        .map(|frame| Section {
            label: Some(frame.title().to_owned()),
            rows: visible
                .iter()
                .copied()
                .filter(|widget| widget.parent_id.as_deref() == Some(frame.id.as_str()))
                .map(build_row)
                .collect(),
        })
        .collect();

    let frame_ids: HashSet<&str> = frames.iter().map(|frame| frame.id.as_str()).collect();
    let unframed: Vec<Row> = visible
        .iter()
        .copied()
        .filter(|widget| {
            widget.kind != WidgetKind::Frame
                && !widget
                    .parent_id
                    .as_deref()
                    .is_some_and(|parent| frame_ids.contains(parent))
        })
        .map(build_row)
        .collect();
    if !unframed.is_empty() {
        sections.push(Section { label: None, rows: unframed });
    }

    Projection::Grouped(sections)
}

/// Build the row for one visible widget.
#[must_use]
pub fn build_row(widget: &Widget) -> Row {
    let accessory = match classify(widget) {
        Presentation::Toggle { checked } => RowAccessory::Toggle { checked },
        Presentation::Text => RowAccessory::None,
        Presentation::PageLink(_) | Presentation::Selection { .. } | Presentation::ActionList(_) => {
            RowAccessory::Browse
        }
    };
    Row {
        widget_id: widget.id.clone(),
        title: widget.title().to_owned(),
        detail: widget.state_from_label().map(|state| state.replace('\n', " ")),
        accessory,
    }
}

//! Presentation classification: which interactive role a widget takes.
//!
//! Every widget maps to exactly one [`Presentation`]. The classification
//! is re-derived from current widget state on every render and on every
//! interaction; nothing here is cached or stateful, and nothing here
//! sends commands — the session wires row activation to the command sink.

#[cfg(test)]
#[path = "presentation_test.rs"]
mod presentation_test;

use crate::icon::IconResource;
use crate::model::{Item, ItemKind, ItemState, LabeledValue, LinkedPage, Widget, WidgetKind};

/// The derived interactive role of a widget for one render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    /// Non-interactive row.
    Text,
    /// Navigates to a linked sub-page.
    PageLink(LinkedPage),
    /// Boolean on/off control; flipping sends `ON` or `OFF`.
    Toggle { checked: bool },
    /// Opens a single-choice picker over an ordered option list.
    Selection {
        options: Vec<SelectionItem>,
        selected: Option<usize>,
    },
    /// Opens a sheet of discrete commands.
    ActionList(Vec<ActionItem>),
}

/// One selectable entry of a selection picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    pub label: String,
    pub command: String,
}

/// A fixed, client-defined action with static label and icon identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalAction {
    pub label: &'static str,
    pub icon: &'static str,
    pub command: &'static str,
}

/// One entry of an action sheet: either a server-supplied mapping or a
/// built-in action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionItem {
    Mapping(LabeledValue),
    Internal(InternalAction),
}

/// How an action entry is decorated.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionIcon {
    /// Server-resolved icon, fetched via its URL.
    Server(IconResource),
    /// Bundled asset referenced by a static identifier.
    Builtin(&'static str),
}

impl ActionItem {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Mapping(mapping) => &mapping.label,
            Self::Internal(action) => action.label,
        }
    }

    /// The literal command string sent when this entry is chosen.
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Mapping(mapping) => &mapping.value,
            Self::Internal(action) => action.command,
        }
    }

    #[must_use]
    pub fn icon(&self) -> Option<ActionIcon> {
        match self {
            Self::Mapping(mapping) => mapping
                .icon
                .as_deref()
                .and_then(IconResource::oh2)
                .map(ActionIcon::Server),
            Self::Internal(action) => Some(ActionIcon::Builtin(action.icon)),
        }
    }
}

/// Roller-shutter transport: up, stop, down.
pub const ROLLERSHUTTER_ACTIONS: [InternalAction; 3] = [
    InternalAction { label: "Open", icon: "ic_arrow_up", command: "UP" },
    InternalAction { label: "Stop", icon: "ic_clear", command: "STOP" },
    InternalAction { label: "Close", icon: "ic_arrow_down", command: "DOWN" },
];

/// Media transport: previous, play, pause, next.
pub const PLAYER_ACTIONS: [InternalAction; 4] = [
    InternalAction { label: "Previous track", icon: "ic_previous_track", command: "PREVIOUS" },
    InternalAction { label: "Play", icon: "ic_play", command: "PLAY" },
    InternalAction { label: "Pause", icon: "ic_pause", command: "PAUSE" },
    InternalAction { label: "Next track", icon: "ic_next_track", command: "NEXT" },
];

/// Classify a widget into its presentation.
///
/// Switch widgets follow a strict precedence: player transport beats
/// server mappings, mappings beat the plain toggle, the plain toggle
/// applies to Switch-typed items, roller shutters get their fixed action
/// set, any remaining option source becomes an action sheet, and a bare
/// Switch widget degenerates to a toggle.
#[must_use]
pub fn classify(widget: &Widget) -> Presentation {
    match widget.kind {
        WidgetKind::Switch => classify_switch(widget),
        WidgetKind::Selection => classify_selection(widget),
        _ => match &widget.linked_page {
            Some(page) => Presentation::PageLink(page.clone()),
            None => Presentation::Text,
        },
    }
}

fn classify_switch(widget: &Widget) -> Presentation {
    if widget.should_render_as_player() {
        return Presentation::ActionList(PLAYER_ACTIONS.map(ActionItem::Internal).to_vec());
    }
    if !widget.mappings.is_empty() {
        return mapping_actions(&widget.mappings);
    }
    let item = widget.item.as_ref();
    if item.is_some_and(|i| i.is_of_kind_or_group_kind(ItemKind::Switch)) {
        return toggle(widget);
    }
    if item.is_some_and(|i| i.is_of_kind_or_group_kind(ItemKind::Rollershutter)) {
        return Presentation::ActionList(ROLLERSHUTTER_ACTIONS.map(ActionItem::Internal).to_vec());
    }
    let options = widget.mappings_or_item_options();
    if !options.is_empty() {
        return mapping_actions(options);
    }
    toggle(widget)
}

fn classify_selection(widget: &Widget) -> Presentation {
    let options: Vec<SelectionItem> = widget
        .mappings_or_item_options()
        .iter()
        .map(|option| SelectionItem { label: option.label.clone(), command: option.value.clone() })
        .collect();
    let state = widget.item.as_ref().and_then(Item::defined_state);
    let selected = state.and_then(|state| {
        options
            .iter()
            .position(|option| option.command == state.as_str())
    });
    Presentation::Selection { options, selected }
}

fn mapping_actions(mappings: &[LabeledValue]) -> Presentation {
    Presentation::ActionList(mappings.iter().cloned().map(ActionItem::Mapping).collect())
}

fn toggle(widget: &Widget) -> Presentation {
    let checked = widget
        .item
        .as_ref()
        .and_then(|item| item.state.as_ref())
        .is_some_and(ItemState::as_bool);
    Presentation::Toggle { checked }
}

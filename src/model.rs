//! Sitemap data model: widgets, items, and their states as pushed by the
//! openHAB server.
//!
//! These are the wire-shaped types the connection layer deserializes and
//! feeds into the engine. A `Widget` is one node of a page tree; it links
//! to an optional `Item` (the domain object whose state it displays or
//! commands) and optionally to a sub-page. Parent/child relationships are
//! expressed through `parent_id` and resolved by the
//! [`WidgetIndex`](crate::index::WidgetIndex); widgets themselves never own
//! other widgets.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use serde::{Deserialize, Serialize};

use crate::icon::{IconResource, widget_icon};

/// The rendering type of a widget, as declared in the sitemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WidgetKind {
    Chart,
    Colorpicker,
    Default,
    Frame,
    Group,
    Image,
    Mapview,
    Selection,
    Setpoint,
    Slider,
    Switch,
    Text,
    Video,
    Webview,
    /// Any widget type this client does not know. Rendered as plain text.
    Unknown,
}

impl From<String> for WidgetKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Chart" => Self::Chart,
            "Colorpicker" => Self::Colorpicker,
            "Default" => Self::Default,
            "Frame" => Self::Frame,
            "Group" => Self::Group,
            "Image" => Self::Image,
            "Mapview" => Self::Mapview,
            "Selection" => Self::Selection,
            "Setpoint" => Self::Setpoint,
            "Slider" => Self::Slider,
            "Switch" => Self::Switch,
            "Text" => Self::Text,
            "Video" => Self::Video,
            "Webview" => Self::Webview,
            _ => Self::Unknown,
        }
    }
}

impl From<WidgetKind> for String {
    fn from(value: WidgetKind) -> Self {
        format!("{value:?}")
    }
}

/// The semantic type of a linked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemKind {
    Color,
    Contact,
    DateTime,
    Dimmer,
    Group,
    Image,
    Location,
    Number,
    /// A `Number:<dimension>` item carrying a unit of measure.
    NumberWithDimension,
    Player,
    Rollershutter,
    StringItem,
    Switch,
    Unknown,
}

impl From<String> for ItemKind {
    fn from(value: String) -> Self {
        if value.starts_with("Number:") {
            return Self::NumberWithDimension;
        }
        match value.as_str() {
            "Color" => Self::Color,
            "Contact" => Self::Contact,
            "DateTime" => Self::DateTime,
            "Dimmer" => Self::Dimmer,
            "Group" => Self::Group,
            "Image" => Self::Image,
            "Location" => Self::Location,
            "Number" => Self::Number,
            "Player" => Self::Player,
            "Rollershutter" => Self::Rollershutter,
            "String" => Self::StringItem,
            "Switch" => Self::Switch,
            _ => Self::Unknown,
        }
    }
}

impl From<ItemKind> for String {
    fn from(value: ItemKind) -> Self {
        match value {
            ItemKind::NumberWithDimension => "Number:Dimensionless".to_owned(),
            ItemKind::StringItem => "String".to_owned(),
            other => format!("{other:?}"),
        }
    }
}

/// A numeric item state split into value and optional unit.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberState {
    pub value: f64,
    pub unit: Option<String>,
}

impl NumberState {
    /// Format the numeric value the way the server expects it back:
    /// integral values without a fraction part, everything else verbatim.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn format_value(&self) -> String {
        if self.value.fract() == 0.0 && self.value.abs() < 1e15 {
            format!("{}", self.value as i64)
        } else {
            format!("{}", self.value)
        }
    }
}

/// An item state as transmitted by the server, with typed accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemState(String);

impl ItemState {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `NULL` and `UNDEF` are placeholder states without a value.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        self.0 == "NULL" || self.0 == "UNDEF"
    }

    /// Boolean interpretation: `ON`, a positive number, or a color state
    /// with non-zero brightness.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        if self.0 == "ON" {
            return true;
        }
        if let Some((_, _, brightness)) = self.as_hsv() {
            return brightness > 0.0;
        }
        self.as_number().is_some_and(|n| n.value > 0.0)
    }

    /// Parse a `<value>` or `<value> <unit>` state.
    #[must_use]
    pub fn as_number(&self) -> Option<NumberState> {
        if self.is_undefined() {
            return None;
        }
        let mut parts = self.0.splitn(2, ' ');
        let value = parts.next()?.parse::<f64>().ok()?;
        let unit = parts
            .next()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(ToOwned::to_owned);
        Some(NumberState { value, unit })
    }

    /// Parse a `<hue>,<saturation>,<brightness>` color state.
    #[must_use]
    pub fn as_hsv(&self) -> Option<(f64, f64, f64)> {
        let mut parts = self.0.split(',');
        let hue = parts.next()?.trim().parse::<f64>().ok()?;
        let saturation = parts.next()?.trim().parse::<f64>().ok()?;
        let brightness = parts.next()?.trim().parse::<f64>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((hue, saturation, brightness))
    }

    /// Brightness in percent: the brightness component of a color state,
    /// or a plain numeric state clamped to 0..=100.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_brightness(&self) -> Option<i32> {
        if let Some((_, _, brightness)) = self.as_hsv() {
            Some(brightness.round() as i32)
        } else {
            self.as_number()
                .map(|n| n.value.round().clamp(0.0, 100.0) as i32)
        }
    }
}

/// A server-supplied (label, command value) pair offered as a discrete
/// choice, from either a widget mapping or an item option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledValue {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A domain item linked to a widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub group_kind: Option<ItemKind>,
    #[serde(default)]
    pub state: Option<ItemState>,
    /// Options advertised by the item's command/state description.
    #[serde(default)]
    pub options: Vec<LabeledValue>,
}

impl Item {
    /// Whether the item is of the given kind, or a group of that kind.
    #[must_use]
    pub fn is_of_kind_or_group_kind(&self, kind: ItemKind) -> bool {
        self.kind == kind || (self.kind == ItemKind::Group && self.group_kind == Some(kind))
    }

    /// The item's state, unless it is the `NULL`/`UNDEF` placeholder.
    #[must_use]
    pub fn defined_state(&self) -> Option<&ItemState> {
        self.state.as_ref().filter(|s| !s.is_undefined())
    }
}

/// Reference to a sub-page a widget navigates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedPage {
    pub link: String,
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// One control/display node within a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    /// Raw label, possibly carrying a `[state]` suffix.
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Server-computed visibility flag.
    #[serde(default = "default_visibility")]
    pub visibility: bool,
    #[serde(default)]
    pub item: Option<Item>,
    #[serde(default)]
    pub mappings: Vec<LabeledValue>,
    #[serde(default)]
    pub linked_page: Option<LinkedPage>,
}

fn default_visibility() -> bool {
    true
}

impl Widget {
    /// Display title: the label with any `[state]` part stripped.
    #[must_use]
    pub fn title(&self) -> &str {
        match self.label.split_once('[') {
            Some((head, _)) => head.trim_end(),
            None => self.label.trim_end(),
        }
    }

    /// The `[state]` part of the label, if present and non-empty.
    #[must_use]
    pub fn state_from_label(&self) -> Option<&str> {
        let start = self.label.find('[')?;
        let end = self.label.rfind(']')?;
        if end <= start + 1 {
            return None;
        }
        Some(&self.label[start + 1..end])
    }

    /// The widget's mappings, falling back to the linked item's options
    /// when no mappings are defined.
    #[must_use]
    pub fn mappings_or_item_options(&self) -> &[LabeledValue] {
        if !self.mappings.is_empty() {
            &self.mappings
        } else if let Some(item) = &self.item {
            &item.options
        } else {
            &[]
        }
    }

    /// Media-transport convention: a Switch widget over a Player item is
    /// rendered as transport controls instead of an on/off toggle.
    #[must_use]
    pub fn should_render_as_player(&self) -> bool {
        self.kind == WidgetKind::Switch
            && self
                .item
                .as_ref()
                .is_some_and(|item| item.is_of_kind_or_group_kind(ItemKind::Player))
    }

    /// Resolve the widget's icon, optionally carrying the state needed
    /// for dynamic server-side icon rendering.
    #[must_use]
    pub fn icon_resource(&self, use_state: bool) -> Option<IconResource> {
        widget_icon(
            self.icon.as_deref(),
            self.item.as_ref(),
            self.kind,
            !self.mappings.is_empty(),
            use_state,
        )
    }
}

/// A named, server-defined root page tree for a dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sitemap {
    pub name: String,
    pub label: String,
    pub homepage_link: String,
}

//! Icon resource resolution.
//!
//! Sitemap widgets reference icons by name. Depending on the server
//! generation the name resolves to a static OH1 image path or to an OH2
//! icon servlet URL; `material:`/`f7:` prefixed names resolve to the
//! Iconify CDN instead. OH2 icons can additionally carry a state so the
//! server renders a state-dependent variant (a dimmed bulb, a temperature
//! color); [`widget_icon`] derives that state from the linked item.

#[cfg(test)]
#[path = "icon_test.rs"]
mod icon_test;

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;

use crate::model::{Item, ItemKind, WidgetKind};

pub const ICONIFY_API_URL: &str = "api.iconify.design";

/// Characters escaped in URL path segments and query values.
const URL_ESCAPED: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'=')
    .add(b'/');

static NONE_ICON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^(oh:([a-z]+:)?)?none$").expect("static pattern"));

fn encode(value: &str) -> String {
    utf8_percent_encode(value, URL_ESCAPED).to_string()
}

/// Whether an icon name is one of the "none" placeholders.
#[must_use]
pub fn is_none_icon(name: &str) -> bool {
    NONE_ICON.is_match(name)
}

/// Requested raster/vector format for servlet-rendered icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconFormat {
    Png,
    Svg,
}

/// A resolvable widget or mapping icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconResource {
    icon: String,
    is_oh2: bool,
    custom_state: String,
}

impl IconResource {
    /// Icon referenced by an OH1 server. `None` for empty or placeholder names.
    #[must_use]
    pub fn oh1(icon: &str) -> Option<Self> {
        if icon.is_empty() || is_none_icon(icon) {
            return None;
        }
        Some(Self { icon: icon.to_owned(), is_oh2: false, custom_state: String::new() })
    }

    /// Icon referenced by an OH2 server. `None` for empty or placeholder names.
    #[must_use]
    pub fn oh2(icon: &str) -> Option<Self> {
        if icon.is_empty() || is_none_icon(icon) {
            return None;
        }
        Some(Self { icon: icon.to_owned(), is_oh2: true, custom_state: String::new() })
    }

    /// The same icon with a state attached for dynamic rendering.
    #[must_use]
    pub fn with_custom_state(&self, state: &str) -> Self {
        Self { icon: self.icon.clone(), is_oh2: self.is_oh2, custom_state: state.to_owned() }
    }

    /// Build the fetchable URL for this icon.
    ///
    /// OH1 icons map to a fixed image path. OH2 names are split into
    /// `source[:set]:name` segments; Iconify-backed sources produce an
    /// absolute CDN URL, everything else a server-relative servlet URL.
    /// Unknown sources degrade to the classic `none` icon.
    #[must_use]
    pub fn to_url(&self, include_state: bool, format: IconFormat, desired_size_px: u32) -> String {
        if !self.is_oh2 {
            return format!("images/{}.png", self.icon);
        }

        let mut source = "oh".to_owned();
        let mut icon_set = "classic".to_owned();
        let mut icon_name = "none".to_owned();

        let segments: Vec<&str> = self.icon.splitn(3, ':').collect();
        match segments.as_slice() {
            [name] => icon_name = (*name).to_owned(),
            [src, name] => {
                source = (*src).to_owned();
                icon_name = (*name).to_owned();
                if source == "material" {
                    icon_set = "baseline".to_owned();
                }
            }
            [src, set, name] => {
                source = (*src).to_owned();
                icon_set = (*set).to_owned();
                icon_name = (*name).to_owned();
            }
            _ => {}
        }

        match source.as_str() {
            "material" => {
                source = "iconify".to_owned();
                icon_name = format!("{icon_set}-{}", icon_name.replace('_', "-"));
                icon_set = "ic".to_owned();
            }
            "f7" => {
                source = "iconify".to_owned();
                icon_set = "f7".to_owned();
                icon_name = icon_name.replace('_', "-");
            }
            _ => {}
        }

        match source.as_str() {
            "if" | "iconify" => format!(
                "https://{ICONIFY_API_URL}/{}/{}.svg?height={desired_size_px}",
                encode(&icon_set),
                encode(&icon_name)
            ),
            _ => {
                let suffix = match format {
                    IconFormat::Png => "PNG",
                    IconFormat::Svg => "SVG",
                };

                if source != "oh" {
                    icon_set = "classic".to_owned();
                    icon_name = "none".to_owned();
                }

                let mut url = format!(
                    "icon/{}?format={suffix}&anyFormat=true&iconset={}",
                    encode(&icon_name),
                    encode(&icon_set)
                );
                if include_state && !self.custom_state.is_empty() {
                    url.push_str("&state=");
                    url.push_str(&encode(&self.custom_state));
                }
                url
            }
        }
    }
}

/// Resolve a widget's icon, attaching the state the icon servlet needs to
/// render state-dependent variants.
#[must_use]
pub fn widget_icon(
    icon: Option<&str>,
    item: Option<&Item>,
    widget_kind: WidgetKind,
    has_mappings: bool,
    use_state: bool,
) -> Option<IconResource> {
    let resource = IconResource::oh2(icon?)?;
    match widget_icon_state(item, widget_kind, has_mappings, use_state) {
        Some(state) => Some(resource.with_custom_state(&state)),
        None => Some(resource),
    }
}

/// The state string to request a widget's icon with, if any.
fn widget_icon_state(
    item: Option<&Item>,
    widget_kind: WidgetKind,
    has_mappings: bool,
    use_state: bool,
) -> Option<String> {
    if !use_state {
        return None;
    }
    let item = item?;

    // NULL states are sent as the literal string 'null'.
    let Some(state) = item.defined_state() else {
        return Some("null".to_owned());
    };

    if item.is_of_kind_or_group_kind(ItemKind::Number)
        || item.is_of_kind_or_group_kind(ItemKind::NumberWithDimension)
    {
        // Number items follow the format "<value>" or "<value> <unit>".
        return state.as_number().map(|number| match &number.unit {
            Some(unit) => format!("{} {unit}", number.format_value()),
            None => number.format_value(),
        });
    }

    if item.is_of_kind_or_group_kind(ItemKind::Color) {
        // Color sliders just use the brightness part of the color.
        if widget_kind == WidgetKind::Slider {
            return Some(
                state
                    .as_brightness()
                    .map_or_else(|| "null".to_owned(), |b| b.to_string()),
            );
        }
        // Color toggles use ON/OFF derived from the brightness value.
        if widget_kind == WidgetKind::Switch && !has_mappings {
            let off = state.as_brightness() == Some(0);
            return Some(if off { "OFF" } else { "ON" }.to_owned());
        }
        if let Some((h, s, v)) = state.as_hsv() {
            let (r, g, b) = hsv_to_rgb(h, s, v);
            return Some(format!("#{r:02x}{g:02x}{b:02x}"));
        }
        return Some(state.as_str().to_owned());
    }

    if widget_kind == WidgetKind::Switch
        && !has_mappings
        && !item.is_of_kind_or_group_kind(ItemKind::Rollershutter)
    {
        // Plain ON/OFF switches may control dimmers whose state is a
        // percentage; normalize so the servlet picks the right variant.
        let off = state.as_str() == "0" || state.as_str() == "OFF";
        return Some(if off { "OFF" } else { "ON" }.to_owned());
    }

    Some(state.as_str().to_owned())
}

/// Convert hue (degrees), saturation and value (both percent) to RGB.
#[allow(clippy::many_single_char_names, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let s = (s / 100.0).clamp(0.0, 1.0);
    let v = (v / 100.0).clamp(0.0, 1.0);
    let sector = h.rem_euclid(360.0) / 60.0;
    let f = sector - sector.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match sector as u32 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let channel = |x: f64| (x * 255.0).round() as u8;
    (channel(r), channel(g), channel(b))
}

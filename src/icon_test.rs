use super::*;
use crate::model::{Item, ItemKind, ItemState};

fn make_item(kind: ItemKind, state: Option<&str>) -> Item {
    Item {
        name: "item".to_owned(),
        kind,
        group_kind: None,
        state: state.map(ItemState::new),
        options: Vec::new(),
    }
}

// =============================================================
// None-icon rejection
// =============================================================

#[test]
fn none_icons_are_rejected() {
    assert!(IconResource::oh2("none").is_none());
    assert!(IconResource::oh2("oh:none").is_none());
    assert!(IconResource::oh2("oh:classic:none").is_none());
    assert!(IconResource::oh2("").is_none());
    assert!(IconResource::oh1("none").is_none());
}

#[test]
fn none_prefix_is_not_a_none_icon() {
    assert!(!is_none_icon("nonexistent"));
    assert!(IconResource::oh2("nonexistent").is_some());
}

// =============================================================
// URL building
// =============================================================

#[test]
fn oh1_icon_is_a_static_image_path() {
    let url = IconResource::oh1("light").unwrap().to_url(true, IconFormat::Png, 24);
    assert_eq!(url, "images/light.png");
}

#[test]
fn oh2_plain_name_uses_the_icon_servlet() {
    let url = IconResource::oh2("light").unwrap().to_url(false, IconFormat::Svg, 24);
    assert_eq!(url, "icon/light?format=SVG&anyFormat=true&iconset=classic");
}

#[test]
fn oh2_three_segment_name_selects_the_icon_set() {
    let url = IconResource::oh2("oh:sundown:light").unwrap().to_url(false, IconFormat::Png, 24);
    assert_eq!(url, "icon/light?format=PNG&anyFormat=true&iconset=sundown");
}

#[test]
fn material_names_map_to_iconify() {
    let url = IconResource::oh2("material:lightbulb_outline")
        .unwrap()
        .to_url(false, IconFormat::Svg, 24);
    assert_eq!(url, "https://api.iconify.design/ic/baseline-lightbulb-outline.svg?height=24");
}

#[test]
fn f7_names_map_to_iconify() {
    let url = IconResource::oh2("f7:lightbulb_fill")
        .unwrap()
        .to_url(false, IconFormat::Svg, 48);
    assert_eq!(url, "https://api.iconify.design/f7/lightbulb-fill.svg?height=48");
}

#[test]
fn unknown_source_degrades_to_classic_none() {
    let url = IconResource::oh2("foo:bar").unwrap().to_url(false, IconFormat::Png, 24);
    assert_eq!(url, "icon/none?format=PNG&anyFormat=true&iconset=classic");
}

#[test]
fn state_is_appended_and_escaped() {
    let url = IconResource::oh2("light")
        .unwrap()
        .with_custom_state("21.5 °C")
        .to_url(true, IconFormat::Svg, 24);
    assert_eq!(
        url,
        "icon/light?format=SVG&anyFormat=true&iconset=classic&state=21.5%20%C2%B0C"
    );
}

#[test]
fn state_is_omitted_when_not_requested() {
    let url = IconResource::oh2("light")
        .unwrap()
        .with_custom_state("ON")
        .to_url(false, IconFormat::Svg, 24);
    assert!(!url.contains("state="));
}

// =============================================================
// Widget icon state derivation
// =============================================================

#[test]
fn number_state_round_trips_into_the_url() {
    let item = make_item(ItemKind::Number, Some("21.5 °C"));
    let resource =
        widget_icon(Some("temperature"), Some(&item), WidgetKind::Text, false, true).unwrap();
    let url = resource.to_url(true, IconFormat::Svg, 24);
    assert_eq!(
        url,
        "icon/temperature?format=SVG&anyFormat=true&iconset=classic&state=21.5%20%C2%B0C"
    );
}

#[test]
fn dimensioned_number_behaves_like_number() {
    let item = make_item(ItemKind::NumberWithDimension, Some("20 W"));
    let resource = widget_icon(Some("energy"), Some(&item), WidgetKind::Text, false, true).unwrap();
    let url = resource.to_url(true, IconFormat::Png, 24);
    assert!(url.ends_with("&state=20%20W"));
}

#[test]
fn null_state_is_sent_literally() {
    let item = make_item(ItemKind::Switch, Some("NULL"));
    let resource = widget_icon(Some("light"), Some(&item), WidgetKind::Text, false, true).unwrap();
    let url = resource.to_url(true, IconFormat::Png, 24);
    assert!(url.ends_with("&state=null"));
}

#[test]
fn switch_over_dimmer_normalizes_to_on_off() {
    let off = make_item(ItemKind::Dimmer, Some("0"));
    let on = make_item(ItemKind::Dimmer, Some("75"));
    let off_url = widget_icon(Some("light"), Some(&off), WidgetKind::Switch, false, true)
        .unwrap()
        .to_url(true, IconFormat::Png, 24);
    let on_url = widget_icon(Some("light"), Some(&on), WidgetKind::Switch, false, true)
        .unwrap()
        .to_url(true, IconFormat::Png, 24);
    assert!(off_url.ends_with("&state=OFF"));
    assert!(on_url.ends_with("&state=ON"));
}

#[test]
fn switch_over_rollershutter_keeps_the_raw_state() {
    let item = make_item(ItemKind::Rollershutter, Some("50"));
    let url = widget_icon(Some("blinds"), Some(&item), WidgetKind::Switch, false, true)
        .unwrap()
        .to_url(true, IconFormat::Png, 24);
    assert!(url.ends_with("&state=50"));
}

#[test]
fn color_slider_uses_brightness() {
    let item = make_item(ItemKind::Color, Some("120,100,75"));
    let url = widget_icon(Some("light"), Some(&item), WidgetKind::Slider, false, true)
        .unwrap()
        .to_url(true, IconFormat::Png, 24);
    assert!(url.ends_with("&state=75"));
}

#[test]
fn color_toggle_uses_on_off_from_brightness() {
    let off = make_item(ItemKind::Color, Some("120,100,0"));
    let on = make_item(ItemKind::Color, Some("120,100,50"));
    let off_url = widget_icon(Some("light"), Some(&off), WidgetKind::Switch, false, true)
        .unwrap()
        .to_url(true, IconFormat::Png, 24);
    let on_url = widget_icon(Some("light"), Some(&on), WidgetKind::Switch, false, true)
        .unwrap()
        .to_url(true, IconFormat::Png, 24);
    assert!(off_url.ends_with("&state=OFF"));
    assert!(on_url.ends_with("&state=ON"));
}

#[test]
fn color_state_renders_as_hex_elsewhere() {
    let red = make_item(ItemKind::Color, Some("0,100,100"));
    let navy = make_item(ItemKind::Color, Some("240,100,50"));
    let red_url = widget_icon(Some("light"), Some(&red), WidgetKind::Text, false, true)
        .unwrap()
        .to_url(true, IconFormat::Png, 24);
    let navy_url = widget_icon(Some("light"), Some(&navy), WidgetKind::Text, false, true)
        .unwrap()
        .to_url(true, IconFormat::Png, 24);
    assert!(red_url.ends_with("&state=%23ff0000"));
    assert!(navy_url.ends_with("&state=%23000080"));
}

#[test]
fn state_derivation_can_be_disabled() {
    let item = make_item(ItemKind::Switch, Some("ON"));
    let url = widget_icon(Some("light"), Some(&item), WidgetKind::Switch, false, false)
        .unwrap()
        .to_url(true, IconFormat::Png, 24);
    assert!(!url.contains("state="));
}

#[test]
fn missing_icon_name_resolves_to_nothing() {
    assert!(widget_icon(None, None, WidgetKind::Text, false, true).is_none());
    assert!(widget_icon(Some("none"), None, WidgetKind::Text, false, true).is_none());
}

//! Widget visibility resolution.

#[cfg(test)]
#[path = "visibility_test.rs"]
mod visibility_test;

use std::collections::HashSet;

use crate::index::WidgetIndex;
use crate::model::{Widget, WidgetKind};

/// Whether a widget should be displayed.
///
/// A widget is hidden when its own visibility flag is off. A frame is
/// additionally hidden unless at least one direct child is flagged
/// visible, since an empty section has nothing to show. Otherwise
/// visibility follows the ancestor chain: a widget whose parent is
/// hidden is hidden too. A parent id that resolves to nothing terminates
/// the walk as visible, so orphaned nodes are not silently dropped.
///
/// The walk is iterative with a visited set; the parent graph comes from
/// the server and a malformed cyclic chain must not hang the render path.
/// Widgets on a cycle resolve to hidden.
#[must_use]
pub fn should_show<'a>(widget: &'a Widget, index: &'a WidgetIndex) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = widget;
    loop {
        if !current.visibility {
            return false;
        }
        if current.kind == WidgetKind::Frame
            && !index.children_of(&current.id).any(|child| child.visibility)
        {
            return false;
        }
        if !visited.insert(current.id.as_str()) {
            tracing::warn!(widget_id = %widget.id, "cycle in widget parent chain; hiding widget");
            return false;
        }
        let Some(parent_id) = &current.parent_id else {
            return true;
        };
        match index.get(parent_id) {
            Some(parent) => current = parent,
            None => return true,
        }
    }
}

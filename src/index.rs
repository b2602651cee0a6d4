//! In-memory widget index for one page.
//!
//! The index owns the page's widget list in server order and maintains two
//! derived lookup structures: widget id to position, and parent id to the
//! ids of its direct children. Full page pushes rebuild everything in one
//! pass; single-widget pushes patch in place. All mutation happens on the
//! session's serialized update path, so no internal locking is needed.

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;

use std::collections::HashMap;

use crate::model::Widget;

/// Flat widget collection with id and parent-id lookups.
#[derive(Debug, Clone, Default)]
pub struct WidgetIndex {
    widgets: Vec<Widget>,
    by_id: HashMap<String, usize>,
    by_parent: HashMap<String, Vec<String>>,
}

impl WidgetIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a full widget list.
    #[must_use]
    pub fn from_widgets(widgets: Vec<Widget>) -> Self {
        let mut index = Self::new();
        index.replace_all(widgets);
        index
    }

    /// Discard and rebuild both lookup structures from scratch.
    pub fn replace_all(&mut self, widgets: Vec<Widget>) {
        self.by_id.clear();
        self.by_parent.clear();
        for (position, widget) in widgets.iter().enumerate() {
            self.by_id.insert(widget.id.clone(), position);
            if let Some(parent_id) = &widget.parent_id {
                self.by_parent
                    .entry(parent_id.clone())
                    .or_default()
                    .push(widget.id.clone());
            }
        }
        self.widgets = widgets;
    }

    /// Replace a single widget by id, re-linking it under its parent.
    ///
    /// The widget is removed from its previous parent bucket first, so a
    /// parent change never leaves a stale child reference behind. Returns
    /// `false` (and changes nothing) when the id is not present.
    pub fn upsert(&mut self, widget: Widget) -> bool {
        let Some(&position) = self.by_id.get(&widget.id) else {
            return false;
        };
        let old_parent = self.widgets[position].parent_id.clone();
        if let Some(parent_id) = &old_parent {
            if let Some(children) = self.by_parent.get_mut(parent_id) {
                children.retain(|id| id != &widget.id);
            }
        }
        if let Some(parent_id) = &widget.parent_id {
            self.by_parent
                .entry(parent_id.clone())
                .or_default()
                .push(widget.id.clone());
        }
        self.widgets[position] = widget;
        true
    }

    /// Look up a widget by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Widget> {
        self.by_id.get(id).map(|&position| &self.widgets[position])
    }

    /// The direct children of a widget, in insertion order of the bucket.
    pub fn children_of(&self, parent_id: &str) -> impl Iterator<Item = &Widget> + '_ {
        self.by_parent
            .get(parent_id)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.get(id))
    }

    /// All widgets in server order.
    #[must_use]
    pub fn ordered(&self) -> &[Widget] {
        &self.widgets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

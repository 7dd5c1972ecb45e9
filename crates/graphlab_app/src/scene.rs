// SPDX-License-Identifier: MIT OR Apache-2.0
//! Presentation-side scene table.
//!
//! Mirrors what would be drawn: one entry per node and edge, keyed by the
//! element's stable id, holding its current display color and highlight.

use graphlab_graph::{Color, Element, GraphEvent, GraphSnapshot, Presenter};
use indexmap::IndexMap;
use serde::Serialize;

/// Display state of one drawn element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SceneEntry {
    /// Color currently shown
    pub color: Color,
    /// Drawn with highlight emphasis
    pub highlighted: bool,
}

impl SceneEntry {
    fn new(color: Color) -> Self {
        Self {
            color,
            highlighted: false,
        }
    }
}

/// A scene entry tagged with its element, for serialized output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SceneRow {
    /// Which element
    pub element: Element,
    /// How it is shown
    #[serde(flatten)]
    pub entry: SceneEntry,
}

/// Every drawn element and the current selection
#[derive(Debug, Default)]
pub struct SceneTable {
    entries: IndexMap<Element, SceneEntry>,
    selected: Option<Element>,
}

impl SceneTable {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add entries for new elements and drop entries for removed ones
    ///
    /// Existing entries keep their display state.
    pub fn sync(&mut self, snapshot: &GraphSnapshot) {
        let live: IndexMap<Element, Color> = snapshot
            .nodes
            .iter()
            .map(|n| (Element::Node(n.id), n.color))
            .chain(snapshot.edges.iter().map(|e| (Element::Edge(e.id), e.color)))
            .collect();

        self.entries.retain(|element, _| live.contains_key(element));
        for (element, color) in live {
            self.entries
                .entry(element)
                .or_insert_with(|| SceneEntry::new(color));
        }
        if self.selected.is_some_and(|s| !self.entries.contains_key(&s)) {
            self.selected = None;
        }
        tracing::trace!(elements = self.entries.len(), "scene synced");
    }

    /// Track selection notifications
    pub fn apply_event(&mut self, event: &GraphEvent) {
        match event {
            GraphEvent::NodeSelected { node, .. } => self.selected = Some(Element::Node(*node)),
            GraphEvent::EdgeSelected { edge } => self.selected = Some(Element::Edge(*edge)),
            GraphEvent::SelectionCleared => self.selected = None,
            _ => {}
        }
    }

    /// Display state of an element
    pub fn entry(&self, element: Element) -> Option<&SceneEntry> {
        self.entries.get(&element)
    }

    /// Currently selected element
    pub fn selected(&self) -> Option<Element> {
        self.selected
    }

    /// Number of drawn elements
    pub fn element_count(&self) -> usize {
        self.entries.len()
    }

    /// Highlighted elements in draw order
    pub fn highlighted(&self) -> Vec<Element> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.highlighted)
            .map(|(element, _)| *element)
            .collect()
    }

    /// All rows in draw order
    pub fn rows(&self) -> Vec<SceneRow> {
        self.entries
            .iter()
            .map(|(element, entry)| SceneRow {
                element: *element,
                entry: *entry,
            })
            .collect()
    }
}

impl Presenter for SceneTable {
    fn set_color(&mut self, element: Element, color: Color) {
        self.entries
            .entry(element)
            .and_modify(|entry| entry.color = color)
            .or_insert_with(|| SceneEntry::new(color));
    }

    fn set_highlight(&mut self, element: Element, highlighted: bool) {
        match self.entries.get_mut(&element) {
            Some(entry) => entry.highlighted = highlighted,
            None => tracing::warn!(?element, "highlight for unknown element"),
        }
    }
}

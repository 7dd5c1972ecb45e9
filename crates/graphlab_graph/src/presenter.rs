// SPDX-License-Identifier: MIT OR Apache-2.0
//! Narrow interface to whatever draws the graph.
//!
//! The core never touches rendering objects directly; it asks the presenter
//! to recolor or highlight an element addressed by its stable id.

use crate::edge::EdgeId;
use crate::graph::GraphStore;
use crate::node::{Color, NodeId};
use serde::{Deserialize, Serialize};

/// Category palette used for component and coloring results
pub const PALETTE: [Color; 10] = [
    Color::rgb(0x1f, 0x77, 0xb4),
    Color::rgb(0xff, 0x7f, 0x0e),
    Color::rgb(0x2c, 0xa0, 0x2c),
    Color::rgb(0xd6, 0x27, 0x28),
    Color::rgb(0x94, 0x67, 0xbd),
    Color::rgb(0x8c, 0x56, 0x4b),
    Color::rgb(0xe3, 0x77, 0xc2),
    Color::rgb(0x7f, 0x7f, 0x7f),
    Color::rgb(0xbc, 0xbd, 0x22),
    Color::rgb(0x17, 0xbe, 0xcf),
];

/// Palette entry for a class index, wrapping around
pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

/// A drawable element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    /// A node
    Node(NodeId),
    /// An edge
    Edge(EdgeId),
}

/// Receiver of visual changes requested by the core
pub trait Presenter {
    /// Set the display color of an element
    fn set_color(&mut self, element: Element, color: Color);

    /// Mark or unmark an element as highlighted
    fn set_highlight(&mut self, element: Element, highlighted: bool);
}

/// Restore every element to its own color and drop all highlights
pub fn reset_to_defaults(graph: &GraphStore, presenter: &mut dyn Presenter) {
    for node in graph.nodes() {
        presenter.set_color(Element::Node(node.id), node.color);
        presenter.set_highlight(Element::Node(node.id), false);
    }
    for edge in graph.edges() {
        presenter.set_color(Element::Edge(edge.id), edge.color);
        presenter.set_highlight(Element::Edge(edge.id), false);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;

    /// Presenter that just records the last request per element
    #[derive(Debug, Default)]
    pub struct RecordingPresenter {
        pub colors: HashMap<Element, Color>,
        pub highlights: HashMap<Element, bool>,
    }

    impl RecordingPresenter {
        pub fn highlighted(&self) -> Vec<Element> {
            let mut on: Vec<Element> = self
                .highlights
                .iter()
                .filter(|(_, on)| **on)
                .map(|(element, _)| *element)
                .collect();
            on.sort();
            on
        }
    }

    impl Presenter for RecordingPresenter {
        fn set_color(&mut self, element: Element, color: Color) {
            self.colors.insert(element, color);
        }

        fn set_highlight(&mut self, element: Element, highlighted: bool) {
            self.highlights.insert(element, highlighted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingPresenter;
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn test_palette_wraps() {
        assert_eq!(palette_color(0), palette_color(PALETTE.len()));
        assert_ne!(palette_color(0), palette_color(1));
    }

    #[test]
    fn test_reset_restores_own_colors() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Vec3::ZERO);
        graph.set_node_color(a, Color::rgb(1, 2, 3)).unwrap();
        let e = graph.add_edge(a, a).unwrap();

        let mut presenter = RecordingPresenter::default();
        presenter.set_highlight(Element::Edge(e), true);
        reset_to_defaults(&graph, &mut presenter);

        assert_eq!(presenter.colors[&Element::Node(a)], Color::rgb(1, 2, 3));
        assert_eq!(presenter.colors[&Element::Edge(e)], Color::EDGE_DEFAULT);
        assert!(presenter.highlighted().is_empty());
    }
}

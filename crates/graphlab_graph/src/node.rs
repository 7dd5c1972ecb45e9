// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the multigraph.

use crate::math::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a node
///
/// Distinct from the node's display label, which is renumbered on deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An RGB display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub [u8; 3]);

impl Color {
    /// Default node color (soft blue)
    pub const NODE_DEFAULT: Self = Self([0x4a, 0x90, 0xd9]);
    /// Default edge color (light grey)
    pub const EDGE_DEFAULT: Self = Self([0xcc, 0xcc, 0xcc]);
    /// Highlight color for bridges and selection
    pub const HIGHLIGHT: Self = Self([0xff, 0x45, 0x00]);

    /// Create a color from components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// A node in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Stable identity
    pub id: NodeId,
    /// Position in the scene
    pub position: Vec3,
    /// Display label (`v1`, `v2`, ...)
    pub label: String,
    /// Display color
    pub color: Color,
}

impl Node {
    /// Create a node with the default label for the given display index
    pub fn new(id: NodeId, position: Vec3, display_index: usize) -> Self {
        Self {
            id,
            position,
            label: Self::default_label(display_index),
            color: Color::NODE_DEFAULT,
        }
    }

    /// Default label for a 1-based display index
    pub fn default_label(display_index: usize) -> String {
        format!("v{display_index}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_label() {
        let node = Node::new(NodeId(7), Vec3::ZERO, 3);
        assert_eq!(node.label, "v3");
        assert_eq!(node.color, Color::NODE_DEFAULT);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::rgb(255, 128, 0).to_string(), "#ff8000");
        assert_eq!(Color::NODE_DEFAULT.to_string(), "#4a90d9");
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge definitions for the multigraph.

use crate::node::{Color, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An edge between two nodes (possibly the same node)
///
/// `from`/`to` are ordered only for arrowhead orientation when the graph is
/// directed; everything structural treats the pair as unordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Stable identity
    pub id: EdgeId,
    /// First endpoint (arrow tail when directed)
    pub from: NodeId,
    /// Second endpoint (arrow head when directed)
    pub to: NodeId,
    /// Signed perpendicular offset within a parallel family; zero for loops
    pub offset: f32,
    /// Set by the last bridge analysis
    pub is_bridge: bool,
    /// Display label (`e1`, `e2`, ...)
    pub label: String,
    /// Display color
    pub color: Color,
}

impl Edge {
    /// Create a new edge with the default label for the given display index
    pub fn new(id: EdgeId, from: NodeId, to: NodeId, offset: f32, display_index: usize) -> Self {
        Self {
            id,
            from,
            to,
            offset,
            is_bridge: false,
            label: Self::default_label(display_index),
            color: Color::EDGE_DEFAULT,
        }
    }

    /// Default label for a 1-based display index
    pub fn default_label(display_index: usize) -> String {
        format!("e{display_index}")
    }

    /// Whether both endpoints are the same node
    pub fn is_loop(&self) -> bool {
        self.from == self.to
    }

    /// Check if this edge touches a node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from == node_id || self.to == node_id
    }

    /// Endpoint pair in canonical (sorted) order
    pub fn key(&self) -> PairKey {
        PairKey::new(self.from, self.to)
    }

    /// The endpoint opposite `node_id`
    pub fn other(&self, node_id: NodeId) -> Option<NodeId> {
        if self.from == node_id {
            Some(self.to)
        } else if self.to == node_id {
            Some(self.from)
        } else {
            None
        }
    }
}

/// Unordered endpoint pair, stored low id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    /// Smaller endpoint id
    pub low: NodeId,
    /// Larger endpoint id
    pub high: NodeId,
}

impl PairKey {
    /// Build the canonical key for a pair
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Whether the pair is a loop
    pub fn is_loop(&self) -> bool {
        self.low == self.high
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Read-only views of the graph for presentation and serialization.

use crate::edge::EdgeId;
use crate::interaction::{InteractionController, InteractionState};
use crate::layout::Arrow;
use crate::math::Vec3;
use crate::node::{Color, NodeId};
use serde::{Deserialize, Serialize};

/// What a presentation layer needs to draw one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    /// Stable id
    pub id: NodeId,
    /// World position
    pub position: Vec3,
    /// Display label
    pub label: String,
    /// Own color
    pub color: Color,
    /// Incident edge count
    pub degree: usize,
}

/// What a presentation layer needs to draw one edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeView {
    /// Stable id
    pub id: EdgeId,
    /// Start node
    pub from: NodeId,
    /// End node
    pub to: NodeId,
    /// Display label
    pub label: String,
    /// Own color
    pub color: Color,
    /// Self-loop
    pub is_loop: bool,
    /// Shares its endpoints with another edge
    pub is_parallel: bool,
    /// Flagged by the last bridge analysis
    pub is_bridge: bool,
    /// Perpendicular offset within its family
    pub offset: f32,
    /// Sampled path
    pub points: Vec<Vec3>,
    /// Label position
    pub label_anchor: Vec3,
    /// Arrowhead, in directed display
    pub arrow: Option<Arrow>,
}

/// Full picture of the controller at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Directed display
    pub directed: bool,
    /// Interaction mode
    pub state: InteractionState,
    /// Nodes in insertion order
    pub nodes: Vec<NodeView>,
    /// Edges in insertion order
    pub edges: Vec<EdgeView>,
}

impl GraphSnapshot {
    /// Node view by id
    pub fn node(&self, id: NodeId) -> Option<&NodeView> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edge view by id
    pub fn edge(&self, id: EdgeId) -> Option<&EdgeView> {
        self.edges.iter().find(|e| e.id == id)
    }
}

impl InteractionController {
    /// Capture nodes, edges with geometry, and the current mode
    pub fn snapshot(&self) -> GraphSnapshot {
        let graph = self.graph();
        let nodes = graph
            .nodes()
            .map(|node| NodeView {
                id: node.id,
                position: node.position,
                label: node.label.clone(),
                color: node.color,
                degree: graph.degree(node.id),
            })
            .collect();

        let edges = graph
            .edges()
            .map(|edge| {
                let geometry = self.layout().geometry(edge.id);
                EdgeView {
                    id: edge.id,
                    from: edge.from,
                    to: edge.to,
                    label: edge.label.clone(),
                    color: edge.color,
                    is_loop: edge.is_loop(),
                    is_parallel: graph.is_parallel(edge.id),
                    is_bridge: edge.is_bridge,
                    offset: edge.offset,
                    points: geometry.map(|g| g.points.clone()).unwrap_or_default(),
                    label_anchor: geometry.map_or(Vec3::ZERO, |g| g.label_anchor),
                    arrow: geometry.and_then(|g| g.arrow),
                }
            })
            .collect();

        GraphSnapshot {
            directed: self.layout().directed(),
            state: self.state(),
            nodes,
            edges,
        }
    }
}

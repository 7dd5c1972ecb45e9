// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph store: the authoritative set of nodes and edges.
//!
//! Structural rules enforced here:
//! - no dangling edges (removing a node removes every incident edge)
//! - at most one loop per node
//! - parallel siblings carry centered, consecutive offsets
//! - labels are `v1..vN` / `e1..eM` in insertion order after every deletion

use crate::edge::{Edge, EdgeId, PairKey};
use crate::events::{EventBus, GraphEvent};
use crate::layout::{centered_offsets, initial_offset};
use crate::math::Vec3;
use crate::node::{Color, Node, NodeId};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::sync::mpsc;

/// Default spacing between parallel siblings
pub const DEFAULT_BASE_OFFSET: f32 = 1.0;

/// A node together with the edges removed alongside it
#[derive(Debug, Clone)]
pub struct NodeRemoval {
    /// The removed node
    pub node: Node,
    /// Incident edges removed by the cascade
    pub edges: Vec<Edge>,
}

/// Owner of all nodes and edges
#[derive(Debug)]
pub struct GraphStore {
    /// Nodes in insertion order
    nodes: IndexMap<NodeId, Node>,
    /// Edges in insertion order
    edges: IndexMap<EdgeId, Edge>,
    next_node_id: u32,
    next_edge_id: u32,
    base_offset: f32,
    events: EventBus,
}

impl GraphStore {
    /// Create an empty store with the default sibling spacing
    pub fn new() -> Self {
        Self::with_base_offset(DEFAULT_BASE_OFFSET)
    }

    /// Create an empty store with a custom sibling spacing
    pub fn with_base_offset(base_offset: f32) -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            next_node_id: 0,
            next_edge_id: 0,
            base_offset,
            events: EventBus::new(),
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&mut self) -> mpsc::Receiver<GraphEvent> {
        let receiver = self.events.subscribe();
        tracing::debug!(subscribers = self.events.subscriber_count(), "subscriber added");
        receiver
    }

    /// Publish a notification to every subscriber
    pub fn publish(&mut self, event: GraphEvent) {
        self.events.publish(event);
    }

    fn notify_changed(&mut self) {
        let event = GraphEvent::GraphChanged {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
        };
        self.events.publish(event);
    }

    /// Add a node; it is labeled with the new node count
    pub fn add_node(&mut self, position: Vec3) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        let node = Node::new(id, position, self.nodes.len() + 1);
        tracing::debug!(node = %id, label = %node.label, "node added");
        self.nodes.insert(id, node);
        self.notify_changed();
        id
    }

    /// Add an edge between two nodes (the same node for a loop)
    ///
    /// Non-loop edges join the parallel family of their unordered pair, which
    /// is then re-centered.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<EdgeId, GraphError> {
        if !self.nodes.contains_key(&from) {
            return Err(GraphError::NodeNotFound(from));
        }
        if !self.nodes.contains_key(&to) {
            return Err(GraphError::NodeNotFound(to));
        }

        let offset = if from == to {
            if let Some(existing) = self.loop_on(from) {
                return Err(GraphError::DuplicateLoop {
                    node: from,
                    existing,
                });
            }
            0.0
        } else {
            let siblings = self.parallel_family(from, to).len();
            initial_offset(siblings, self.base_offset)
        };

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        let edge = Edge::new(id, from, to, offset, self.edges.len() + 1);
        tracing::debug!(edge = %id, %from, %to, offset, label = %edge.label, "edge added");
        self.edges.insert(id, edge);

        if from != to {
            self.recenter_family(PairKey::new(from, to));
        }
        self.notify_changed();
        Ok(id)
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<NodeRemoval> {
        let Some(node) = self.nodes.shift_remove(&node_id) else {
            tracing::warn!(node = %node_id, "cannot remove unknown node");
            return None;
        };

        let incident: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| e.involves_node(node_id))
            .map(|e| e.id)
            .collect();
        let edges: Vec<Edge> = incident
            .iter()
            .filter_map(|id| self.edges.shift_remove(id))
            .collect();

        tracing::debug!(node = %node_id, cascaded = edges.len(), "node removed");
        self.relabel_nodes();
        self.relabel_edges();
        self.notify_changed();
        Some(NodeRemoval { node, edges })
    }

    /// Remove an edge, re-centering whatever siblings remain
    pub fn remove_edge(&mut self, edge_id: EdgeId) -> Option<Edge> {
        let Some(edge) = self.edges.shift_remove(&edge_id) else {
            tracing::warn!(edge = %edge_id, "cannot remove unknown edge");
            return None;
        };
        if !edge.is_loop() {
            self.recenter_family(edge.key());
        }
        tracing::debug!(edge = %edge_id, "edge removed");
        self.relabel_edges();
        self.notify_changed();
        Some(edge)
    }

    /// Remove everything and restart id allocation
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.next_node_id = 0;
        self.next_edge_id = 0;
        tracing::debug!("graph cleared");
        self.notify_changed();
    }

    /// Number of edge entities touching a node; a loop counts once
    pub fn degree(&self, node_id: NodeId) -> usize {
        self.incident_edges(node_id).count()
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(&edge_id)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All node IDs in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// All edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the store holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insertion index of a node, used by analyses for dense indexing
    pub fn node_index(&self, node_id: NodeId) -> Option<usize> {
        self.nodes.get_index_of(&node_id)
    }

    /// Edges touching a node, loops included
    pub fn incident_edges(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.involves_node(node_id))
    }

    /// Distinct neighbors of a node (itself if it has a loop)
    pub fn neighbors(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut seen = BTreeSet::new();
        self.incident_edges(node_id)
            .filter_map(|e| e.other(node_id))
            .filter(|n| seen.insert(*n))
            .collect()
    }

    /// Non-loop edges joining the unordered pair `{a, b}`, in insertion order
    pub fn parallel_family(&self, a: NodeId, b: NodeId) -> Vec<EdgeId> {
        let key = PairKey::new(a, b);
        if key.is_loop() {
            return Vec::new();
        }
        self.edges
            .values()
            .filter(|e| e.key() == key)
            .map(|e| e.id)
            .collect()
    }

    /// Whether another edge joins the same pair of distinct nodes
    pub fn is_parallel(&self, edge_id: EdgeId) -> bool {
        self.edge(edge_id)
            .is_some_and(|e| self.parallel_family(e.from, e.to).len() > 1)
    }

    /// The loop edge on a node, if any
    pub fn loop_on(&self, node_id: NodeId) -> Option<EdgeId> {
        self.edges
            .values()
            .find(|e| e.is_loop() && e.from == node_id)
            .map(|e| e.id)
    }

    /// Move a node; callers recompute incident edge geometry
    pub fn set_node_position(&mut self, node_id: NodeId, position: Vec3) -> bool {
        match self.nodes.get_mut(&node_id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Change a node's display color
    pub fn set_node_color(&mut self, node_id: NodeId, color: Color) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        node.color = color;
        Ok(())
    }

    /// Change a node's display label (until the next renumbering)
    pub fn set_node_label(
        &mut self,
        node_id: NodeId,
        label: impl Into<String>,
    ) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        node.label = label.into();
        Ok(())
    }

    /// Store bridge flags from an analysis run; every other edge is cleared
    pub fn set_bridge_flags(&mut self, bridges: &BTreeSet<EdgeId>) {
        for edge in self.edges.values_mut() {
            edge.is_bridge = bridges.contains(&edge.id);
        }
    }

    /// Clear every bridge flag
    pub fn clear_bridge_flags(&mut self) {
        for edge in self.edges.values_mut() {
            edge.is_bridge = false;
        }
    }

    /// Reassign centered offsets to a family, keeping sibling order
    fn recenter_family(&mut self, key: PairKey) {
        let mut family: Vec<(usize, EdgeId, f32)> = self
            .edges
            .values()
            .enumerate()
            .filter(|(_, e)| e.key() == key && !e.is_loop())
            .map(|(index, e)| (index, e.id, e.offset))
            .collect();
        family.sort_by(|a, b| a.2.total_cmp(&b.2).then(a.0.cmp(&b.0)));

        let offsets = centered_offsets(family.len(), self.base_offset);
        for ((_, edge_id, _), offset) in family.into_iter().zip(offsets) {
            if let Some(edge) = self.edges.get_mut(&edge_id) {
                edge.offset = offset;
            }
        }
    }

    fn relabel_nodes(&mut self) {
        for (index, node) in self.nodes.values_mut().enumerate() {
            node.label = Node::default_label(index + 1);
        }
    }

    fn relabel_edges(&mut self) {
        for (index, edge) in self.edges.values_mut().enumerate() {
            edge.label = Edge::default_label(index + 1);
        }
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejected graph operation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Edge not found
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// The node already carries a loop
    #[error("Node {node} already has a loop ({existing})")]
    DuplicateLoop {
        /// Node the loop was requested on
        node: NodeId,
        /// The loop already present
        existing: EdgeId,
    },
}

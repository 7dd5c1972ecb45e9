// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interaction state machine: turns abstract input into graph edits.
//!
//! Exactly one mode is active at a time and every event is fully handled
//! before the next one. Selection is a single node or a single edge, never
//! both.
//!
//! Click policy: clicking the node that is already selected connects it to
//! itself (creating its loop) and deselects. Right-click deselects.

use crate::config::{GraphSettings, InteractionSettings};
use crate::edge::EdgeId;
use crate::events::GraphEvent;
use crate::graph::{GraphError, GraphStore};
use crate::layout::EdgeLayout;
use crate::math::{Ray, Vec3};
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::sync::mpsc;

/// A keyboard key, as far as the controller cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A printable character (matched case-insensitively)
    Char(char),
    /// Delete
    Delete,
    /// Backspace
    Backspace,
    /// Escape
    Escape,
    /// Enter / Return
    Enter,
}

impl Key {
    /// Whether a pressed key triggers this binding
    pub fn matches(&self, pressed: Key) -> bool {
        match (self, pressed) {
            (Key::Char(a), Key::Char(b)) => a.eq_ignore_ascii_case(&b),
            (a, b) => *a == b,
        }
    }
}

/// Abstract input from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Primary click along a ray
    PointerPick(Ray),
    /// Pointer moved; the ray follows it
    PointerMove(Ray),
    /// Secondary (right) click
    SecondaryAction(Ray),
    /// Wheel delta (positive pushes the preview away)
    Scroll(f32),
    /// Key pressed
    KeyDown(Key),
    /// Primary button released
    PointerRelease,
}

/// Translucent node following the pointer until placed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePreview {
    /// Where the node would be placed
    pub position: Vec3,
    /// Distance along the pointer ray
    pub distance: f32,
}

/// The single active interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum InteractionState {
    /// Nothing selected
    #[default]
    Idle,
    /// One node selected
    NodeSelected(NodeId),
    /// One edge selected
    EdgeSelected(EdgeId),
    /// Placing a new node
    NodeCreationPreview(NodePreview),
    /// Moving a node across its horizontal plane
    Dragging(NodeId),
}

/// What a pointer ray hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// A node sphere
    Node(NodeId),
    /// An edge path
    Edge(EdgeId),
}

/// Owns the graph and its layout and drives both from input events
#[derive(Debug)]
pub struct InteractionController {
    pub(crate) graph: GraphStore,
    pub(crate) layout: EdgeLayout,
    pub(crate) settings: GraphSettings,
    state: InteractionState,
    /// Preview distance survives between previews
    preview_distance: f32,
    last_ray: Option<Ray>,
}

impl InteractionController {
    /// Create a controller over an empty graph
    pub fn new(settings: GraphSettings) -> Self {
        Self {
            graph: GraphStore::with_base_offset(settings.layout.base_offset),
            layout: EdgeLayout::new(settings.layout.clone()),
            preview_distance: settings
                .interaction
                .preview_distance
                .max(settings.interaction.min_preview_distance),
            settings,
            state: InteractionState::Idle,
            last_ray: None,
        }
    }

    /// The graph being edited
    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// Current edge geometry
    pub fn layout(&self) -> &EdgeLayout {
        &self.layout
    }

    /// Active settings
    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    fn interaction(&self) -> &InteractionSettings {
        &self.settings.interaction
    }

    /// Current mode
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Selected node, including while it is being dragged
    pub fn selected_node(&self) -> Option<NodeId> {
        match self.state {
            InteractionState::NodeSelected(id) | InteractionState::Dragging(id) => Some(id),
            _ => None,
        }
    }

    /// Selected edge
    pub fn selected_edge(&self) -> Option<EdgeId> {
        match self.state {
            InteractionState::EdgeSelected(id) => Some(id),
            _ => None,
        }
    }

    /// Node creation preview, when active
    pub fn preview(&self) -> Option<NodePreview> {
        match self.state {
            InteractionState::NodeCreationPreview(preview) => Some(preview),
            _ => None,
        }
    }

    /// Subscribe to graph and selection notifications
    pub fn subscribe(&mut self) -> mpsc::Receiver<GraphEvent> {
        self.graph.subscribe()
    }

    /// Add a node directly, bypassing the preview
    pub fn add_node(&mut self, position: Vec3) -> NodeId {
        self.graph.add_node(position)
    }

    /// Connect two nodes directly and lay out the affected family
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<EdgeId, GraphError> {
        let edge_id = self.graph.add_edge(from, to)?;
        self.relayout_pair(from, to, edge_id);
        Ok(edge_id)
    }

    /// Handle one input event to completion
    pub fn handle(&mut self, event: InputEvent) {
        tracing::trace!(?event, state = ?self.state, "input");
        match event {
            InputEvent::PointerPick(ray) => {
                self.last_ray = Some(ray);
                self.on_pick(ray);
            }
            InputEvent::PointerMove(ray) => {
                self.last_ray = Some(ray);
                self.on_move(ray);
            }
            InputEvent::SecondaryAction(ray) => {
                self.last_ray = Some(ray);
                self.on_secondary();
            }
            InputEvent::Scroll(delta) => self.on_scroll(delta),
            InputEvent::KeyDown(key) => self.on_key(key),
            InputEvent::PointerRelease => self.on_release(),
        }
    }

    /// What the ray hits: the nearest node sphere, else the nearest edge path
    ///
    /// Nodes take priority because every edge path starts inside a node.
    pub fn pick(&self, ray: &Ray) -> Option<Pick> {
        let radius = self.settings.layout.node_radius;
        let node_hit = self
            .graph
            .nodes()
            .filter_map(|node| ray.intersect_sphere(node.position, radius).map(|t| (node.id, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((node_id, _)) = node_hit {
            return Some(Pick::Node(node_id));
        }
        self.layout
            .pick(ray, self.interaction().edge_pick_tolerance)
            .map(|(edge_id, _)| Pick::Edge(edge_id))
    }

    fn on_pick(&mut self, ray: Ray) {
        match self.state {
            InteractionState::NodeCreationPreview(preview) => {
                let node_id = self.graph.add_node(preview.position);
                tracing::debug!(node = %node_id, "preview confirmed");
                self.state = InteractionState::Idle;
            }
            InteractionState::Dragging(_) => {}
            InteractionState::Idle
            | InteractionState::NodeSelected(_)
            | InteractionState::EdgeSelected(_) => match self.pick(&ray) {
                Some(Pick::Node(node_id)) => self.click_node(node_id),
                Some(Pick::Edge(edge_id)) => self.click_edge(edge_id),
                None => {}
            },
        }
    }

    fn click_node(&mut self, node_id: NodeId) {
        match self.state {
            InteractionState::NodeSelected(first) => {
                if let Err(err) = self.connect(first, node_id) {
                    tracing::warn!(%err, "connection rejected");
                }
                self.clear_selection();
            }
            _ => self.select_node(node_id),
        }
    }

    fn click_edge(&mut self, edge_id: EdgeId) {
        if self.state == InteractionState::EdgeSelected(edge_id) {
            self.clear_selection();
        } else {
            self.select_edge(edge_id);
        }
    }

    fn on_move(&mut self, ray: Ray) {
        match self.state {
            InteractionState::NodeCreationPreview(mut preview) => {
                preview.position = ray.at(preview.distance);
                self.state = InteractionState::NodeCreationPreview(preview);
            }
            InteractionState::Dragging(node_id) => {
                let Some(height) = self.graph.node(node_id).map(|n| n.position.y) else {
                    tracing::warn!(node = %node_id, "dragged node vanished");
                    self.state = InteractionState::Idle;
                    return;
                };
                if let Some(target) = ray.intersect_horizontal_plane(height) {
                    self.graph.set_node_position(node_id, target);
                    self.layout.recompute_incident(&self.graph, node_id);
                }
            }
            _ => {}
        }
    }

    fn on_secondary(&mut self) {
        match self.state {
            InteractionState::NodeCreationPreview(_) => {
                tracing::debug!("preview canceled");
                self.state = InteractionState::Idle;
            }
            InteractionState::NodeSelected(_) | InteractionState::EdgeSelected(_) => {
                self.clear_selection();
            }
            InteractionState::Idle | InteractionState::Dragging(_) => {}
        }
    }

    fn on_scroll(&mut self, delta: f32) {
        if let InteractionState::NodeCreationPreview(mut preview) = self.state {
            let settings = self.interaction();
            preview.distance = (preview.distance + delta * settings.scroll_step)
                .max(settings.min_preview_distance);
            if let Some(ray) = self.last_ray {
                preview.position = ray.at(preview.distance);
            }
            self.preview_distance = preview.distance;
            self.state = InteractionState::NodeCreationPreview(preview);
        }
    }

    fn on_key(&mut self, key: Key) {
        let keys = self.settings.interaction.keys.clone();
        if keys.begin_node_creation.matches(key) {
            self.begin_preview();
        } else if keys.enable_drag.matches(key) {
            if let InteractionState::NodeSelected(node_id) = self.state {
                tracing::debug!(node = %node_id, "drag enabled");
                self.state = InteractionState::Dragging(node_id);
            }
        } else if keys.delete.matches(key) {
            self.delete_selected();
        }
    }

    fn on_release(&mut self) {
        if let InteractionState::Dragging(node_id) = self.state {
            tracing::debug!(node = %node_id, "drag finished");
            self.state = InteractionState::NodeSelected(node_id);
        }
    }

    fn begin_preview(&mut self) {
        match self.state {
            InteractionState::NodeCreationPreview(_) | InteractionState::Dragging(_) => return,
            InteractionState::NodeSelected(_) | InteractionState::EdgeSelected(_) => {
                self.clear_selection();
            }
            InteractionState::Idle => {}
        }
        let distance = self.preview_distance;
        let position = self.last_ray.map_or(Vec3::ZERO, |ray| ray.at(distance));
        tracing::debug!(distance, "node creation preview");
        self.state = InteractionState::NodeCreationPreview(NodePreview { position, distance });
    }

    /// Delete whatever is selected, including a node mid-drag; no-op when nothing is
    pub fn delete_selected(&mut self) {
        match self.state {
            InteractionState::NodeSelected(node_id) | InteractionState::Dragging(node_id) => {
                match self.graph.remove_node(node_id) {
                    Some(removal) => {
                        for edge in &removal.edges {
                            self.layout.remove(edge.id);
                        }
                    }
                    None => tracing::warn!(node = %node_id, "selected node no longer exists"),
                }
                self.clear_selection();
            }
            InteractionState::EdgeSelected(edge_id) => {
                match self.graph.remove_edge(edge_id) {
                    Some(edge) => {
                        self.layout.remove(edge_id);
                        if !edge.is_loop() {
                            self.layout.recompute_family(&self.graph, edge.key());
                        }
                    }
                    None => tracing::warn!(edge = %edge_id, "selected edge no longer exists"),
                }
                self.clear_selection();
            }
            _ => {}
        }
    }

    fn select_node(&mut self, node_id: NodeId) {
        let degree = self.graph.degree(node_id);
        tracing::debug!(node = %node_id, degree, "node selected");
        self.state = InteractionState::NodeSelected(node_id);
        self.graph.publish(GraphEvent::NodeSelected {
            node: node_id,
            degree,
        });
    }

    fn select_edge(&mut self, edge_id: EdgeId) {
        if self.graph.edge(edge_id).is_none() {
            tracing::warn!(edge = %edge_id, "cannot select removed edge");
            return;
        }
        tracing::debug!(edge = %edge_id, "edge selected");
        self.state = InteractionState::EdgeSelected(edge_id);
        self.graph.publish(GraphEvent::EdgeSelected { edge: edge_id });
    }

    /// Drop any selection; idempotent
    pub fn clear_selection(&mut self) {
        if matches!(
            self.state,
            InteractionState::NodeSelected(_)
                | InteractionState::EdgeSelected(_)
                | InteractionState::Dragging(_)
        ) {
            self.state = InteractionState::Idle;
            self.graph.publish(GraphEvent::SelectionCleared);
        }
    }

    /// Force the controller back to idle (used when the graph is cleared)
    pub(crate) fn reset_state(&mut self) {
        self.clear_selection();
        self.state = InteractionState::Idle;
    }

    fn relayout_pair(&mut self, from: NodeId, to: NodeId, edge_id: EdgeId) {
        if from == to {
            self.layout.recompute_edge(&self.graph, edge_id);
        } else {
            self.layout
                .recompute_family(&self.graph, crate::edge::PairKey::new(from, to));
        }
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(GraphSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ray straight down onto a ground point
    fn down_at(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 20.0, z), -Vec3::Y)
    }

    fn click(controller: &mut InteractionController, x: f32, z: f32) {
        controller.handle(InputEvent::PointerPick(down_at(x, z)));
    }

    fn key(controller: &mut InteractionController, key: Key) {
        controller.handle(InputEvent::KeyDown(key));
    }

    fn three_nodes() -> (InteractionController, [NodeId; 3]) {
        let mut controller = InteractionController::default();
        let a = controller.add_node(Vec3::new(0.0, 0.0, 0.0));
        let b = controller.add_node(Vec3::new(6.0, 0.0, 0.0));
        let c = controller.add_node(Vec3::new(0.0, 0.0, 6.0));
        (controller, [a, b, c])
    }

    #[test]
    fn test_key_matching_ignores_case() {
        assert!(Key::Char('N').matches(Key::Char('n')));
        assert!(!Key::Char('N').matches(Key::Char('g')));
        assert!(Key::Delete.matches(Key::Delete));
        assert!(!Key::Delete.matches(Key::Backspace));
    }

    #[test]
    fn test_preview_place_and_cancel() {
        let mut controller = InteractionController::default();
        controller.handle(InputEvent::PointerMove(Ray::new(Vec3::ZERO, Vec3::Z)));
        key(&mut controller, Key::Char('n'));
        let preview = controller.preview().unwrap();
        assert_eq!(preview.position, Vec3::new(0.0, 0.0, 10.0));

        // Second begin key while previewing changes nothing
        key(&mut controller, Key::Char('N'));
        assert_eq!(controller.preview(), Some(preview));

        controller.handle(InputEvent::PointerMove(Ray::new(Vec3::ZERO, Vec3::X)));
        assert_eq!(controller.preview().unwrap().position, Vec3::new(10.0, 0.0, 0.0));

        controller.handle(InputEvent::PointerPick(Ray::new(Vec3::ZERO, Vec3::X)));
        assert_eq!(controller.state(), InteractionState::Idle);
        assert_eq!(controller.graph().node_count(), 1);
        assert_eq!(
            controller.graph().nodes().next().unwrap().position,
            Vec3::new(10.0, 0.0, 0.0)
        );

        key(&mut controller, Key::Char('n'));
        controller.handle(InputEvent::SecondaryAction(Ray::new(Vec3::ZERO, Vec3::X)));
        assert_eq!(controller.state(), InteractionState::Idle);
        assert_eq!(controller.graph().node_count(), 1);
    }

    #[test]
    fn test_scroll_clamps_preview_distance() {
        let mut controller = InteractionController::default();
        controller.handle(InputEvent::PointerMove(Ray::new(Vec3::ZERO, Vec3::X)));
        key(&mut controller, Key::Char('n'));

        controller.handle(InputEvent::Scroll(4.0));
        assert_eq!(controller.preview().unwrap().distance, 12.0);
        assert_eq!(controller.preview().unwrap().position, Vec3::new(12.0, 0.0, 0.0));

        controller.handle(InputEvent::Scroll(-100.0));
        assert_eq!(controller.preview().unwrap().distance, 1.0);

        // Distance carries over to the next preview
        controller.handle(InputEvent::SecondaryAction(Ray::new(Vec3::ZERO, Vec3::X)));
        key(&mut controller, Key::Char('n'));
        assert_eq!(controller.preview().unwrap().distance, 1.0);
    }

    #[test]
    fn test_click_two_nodes_connects() {
        let (mut controller, [a, b, _]) = three_nodes();
        let events = controller.subscribe();

        click(&mut controller, 0.0, 0.0);
        assert_eq!(controller.state(), InteractionState::NodeSelected(a));
        click(&mut controller, 6.0, 0.0);
        assert_eq!(controller.state(), InteractionState::Idle);

        let edge = controller.graph().edges().next().unwrap();
        assert_eq!((edge.from, edge.to), (a, b));
        assert!(controller.layout().geometry(edge.id).is_some());

        let received: Vec<GraphEvent> = events.try_iter().collect();
        assert_eq!(
            received,
            vec![
                GraphEvent::NodeSelected { node: a, degree: 0 },
                GraphEvent::GraphChanged { node_count: 3, edge_count: 1 },
                GraphEvent::SelectionCleared,
            ]
        );
    }

    #[test]
    fn test_click_selected_node_creates_loop_once() {
        let (mut controller, [a, _, _]) = three_nodes();
        click(&mut controller, 0.0, 0.0);
        click(&mut controller, 0.0, 0.0);
        assert_eq!(controller.state(), InteractionState::Idle);
        assert!(controller.graph().loop_on(a).is_some());

        // A second loop is rejected; selection still clears
        click(&mut controller, 0.0, 0.0);
        click(&mut controller, 0.0, 0.0);
        assert_eq!(controller.graph().edge_count(), 1);
        assert_eq!(controller.state(), InteractionState::Idle);
    }

    #[test]
    fn test_edge_selection_is_exclusive() {
        let (mut controller, [a, b, _]) = three_nodes();
        let edge = controller.connect(a, b).unwrap();

        click(&mut controller, 0.0, 0.0);
        assert_eq!(controller.selected_node(), Some(a));

        // Edge midpoint, away from both node spheres
        click(&mut controller, 3.0, 0.0);
        assert_eq!(controller.selected_edge(), Some(edge));
        assert_eq!(controller.selected_node(), None);

        // Clicking the same edge toggles it off
        click(&mut controller, 3.0, 0.0);
        assert_eq!(controller.state(), InteractionState::Idle);

        click(&mut controller, 3.0, 0.0);
        click(&mut controller, 6.0, 0.0);
        assert_eq!(controller.selected_node(), Some(b));
        assert_eq!(controller.selected_edge(), None);
    }

    #[test]
    fn test_empty_click_and_right_click() {
        let (mut controller, _) = three_nodes();
        click(&mut controller, 50.0, 50.0);
        assert_eq!(controller.state(), InteractionState::Idle);

        click(&mut controller, 0.0, 0.0);
        controller.handle(InputEvent::SecondaryAction(down_at(50.0, 50.0)));
        assert_eq!(controller.state(), InteractionState::Idle);

        let events = controller.subscribe();
        controller.handle(InputEvent::SecondaryAction(down_at(50.0, 50.0)));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_drag_moves_node_on_its_plane() {
        let mut controller = InteractionController::default();
        let a = controller.add_node(Vec3::new(0.0, 2.0, 0.0));
        let b = controller.add_node(Vec3::new(6.0, 0.0, 0.0));
        let edge = controller.connect(a, b).unwrap();

        // Drag key without selection does nothing
        key(&mut controller, Key::Char('g'));
        assert_eq!(controller.state(), InteractionState::Idle);

        click(&mut controller, 0.0, 0.0);
        key(&mut controller, Key::Char('g'));
        assert_eq!(controller.state(), InteractionState::Dragging(a));

        controller.handle(InputEvent::PointerMove(down_at(-4.0, 3.0)));
        let moved = controller.graph().node(a).unwrap().position;
        assert_eq!(moved, Vec3::new(-4.0, 2.0, 3.0));
        assert_eq!(controller.layout().geometry(edge).unwrap().points[0], moved);

        // Clicks are ignored mid-drag
        click(&mut controller, 6.0, 0.0);
        assert_eq!(controller.state(), InteractionState::Dragging(a));

        controller.handle(InputEvent::PointerRelease);
        assert_eq!(controller.state(), InteractionState::NodeSelected(a));
    }

    #[test]
    fn test_delete_node_cascades() {
        let (mut controller, [a, b, c]) = three_nodes();
        controller.connect(a, b).unwrap();
        controller.connect(a, c).unwrap();
        let kept = controller.connect(b, c).unwrap();

        click(&mut controller, 0.0, 0.0);
        key(&mut controller, Key::Delete);
        assert_eq!(controller.state(), InteractionState::Idle);
        assert_eq!(controller.graph().node_count(), 2);
        assert_eq!(controller.graph().edge_count(), 1);
        assert_eq!(controller.layout().len(), 1);
        assert!(controller.layout().geometry(kept).is_some());
        assert_eq!(controller.graph().edge(kept).unwrap().label, "e1");
    }

    #[test]
    fn test_delete_while_dragging() {
        let (mut controller, [a, b, _]) = three_nodes();
        controller.connect(a, b).unwrap();
        let events = controller.subscribe();

        click(&mut controller, 0.0, 0.0);
        key(&mut controller, Key::Char('g'));
        assert_eq!(controller.selected_node(), Some(a));

        key(&mut controller, Key::Delete);
        assert_eq!(controller.state(), InteractionState::Idle);
        assert!(controller.graph().node(a).is_none());
        assert_eq!(controller.graph().edge_count(), 0);
        assert!(controller.layout().is_empty());
        assert_eq!(events.try_iter().last(), Some(GraphEvent::SelectionCleared));

        // Release after the node is gone stays idle
        controller.handle(InputEvent::PointerRelease);
        assert_eq!(controller.state(), InteractionState::Idle);
    }

    #[test]
    fn test_delete_edge_recenters_family() {
        let (mut controller, [a, b, _]) = three_nodes();
        let first = controller.connect(a, b).unwrap();
        let second = controller.connect(a, b).unwrap();
        assert_eq!(controller.graph().edge(first).unwrap().offset, -0.5);

        let midpoint = controller.layout().geometry(second).unwrap().label_anchor;
        click(&mut controller, midpoint.x, midpoint.z);
        assert_eq!(controller.selected_edge(), Some(second));

        key(&mut controller, Key::Delete);
        assert_eq!(controller.graph().edge(first).unwrap().offset, 0.0);
        assert_eq!(controller.layout().geometry(first).unwrap().points.len(), 2);
        assert!(controller.layout().geometry(second).is_none());
    }

    #[test]
    fn test_delete_without_selection_is_noop() {
        let (mut controller, [a, b, _]) = three_nodes();
        controller.connect(a, b).unwrap();
        key(&mut controller, Key::Delete);
        assert_eq!(controller.graph().node_count(), 3);
        assert_eq!(controller.graph().edge_count(), 1);
    }

    #[test]
    fn test_node_selection_reports_degree() {
        let (mut controller, [a, b, c]) = three_nodes();
        controller.connect(a, b).unwrap();
        controller.connect(a, c).unwrap();
        controller.connect(a, a).unwrap();
        let events = controller.subscribe();

        click(&mut controller, 0.0, 0.0);
        assert_eq!(
            events.try_recv().unwrap(),
            GraphEvent::NodeSelected { node: a, degree: 3 }
        );
    }

    #[test]
    fn test_begin_preview_clears_selection() {
        let (mut controller, _) = three_nodes();
        click(&mut controller, 0.0, 0.0);
        key(&mut controller, Key::Char('n'));
        assert!(controller.preview().is_some());
        assert_eq!(controller.selected_node(), None);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge geometry: straight segments, fanned parallel curves and loops.
//!
//! Paths are a pure function of node positions and stored offsets. The
//! layout keeps one [`EdgeGeometry`] per edge, keyed by the same stable id
//! as the store, and is told what to recompute after each mutation.

use crate::config::LayoutSettings;
use crate::edge::{Edge, EdgeId, PairKey};
use crate::graph::GraphStore;
use crate::math::{Ray, Vec3};
use crate::node::NodeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Offset for a new sibling joining a family that already has `existing`
/// non-loop edges: `0, +b, -b, +2b, -2b, ...`
pub fn initial_offset(existing: usize, base: f32) -> f32 {
    if existing == 0 {
        return 0.0;
    }
    let magnitude = existing.div_ceil(2) as f32 * base;
    if existing % 2 == 1 {
        magnitude
    } else {
        -magnitude
    }
}

/// Consecutive multiples of `base` centered on zero, ascending
///
/// Two siblings get `[-b/2, +b/2]`, three get `[-b, 0, +b]`.
pub fn centered_offsets(count: usize, base: f32) -> Vec<f32> {
    let center = (count as f32 - 1.0) / 2.0;
    (0..count).map(|i| (i as f32 - center) * base).collect()
}

/// Arrowhead placement for directed display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    /// Tip position, on the target node's surface
    pub tip: Vec3,
    /// Unit direction the arrow points in
    pub direction: Vec3,
    /// Arrowhead length
    pub size: f32,
}

/// Sampled path of one edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeGeometry {
    /// Polyline from the `from` node to the `to` node
    pub points: Vec<Vec3>,
    /// Where the edge label goes
    pub label_anchor: Vec3,
    /// Present only when the graph is displayed as directed
    pub arrow: Option<Arrow>,
}

/// Geometry cache for every edge in a [`GraphStore`]
#[derive(Debug, Clone, Default)]
pub struct EdgeLayout {
    settings: LayoutSettings,
    geometry: IndexMap<EdgeId, EdgeGeometry>,
}

impl EdgeLayout {
    /// Create an empty layout
    pub fn new(settings: LayoutSettings) -> Self {
        Self {
            settings,
            geometry: IndexMap::new(),
        }
    }

    /// Current layout settings
    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Whether arrows are being placed
    pub fn directed(&self) -> bool {
        self.settings.directed
    }

    /// Toggle directed display; rebuilds arrows only
    pub fn set_directed(&mut self, graph: &GraphStore, directed: bool) {
        self.settings.directed = directed;
        self.recompute_arrows(graph);
    }

    /// Change the arrowhead size; rebuilds arrows only
    pub fn set_arrow_size(&mut self, graph: &GraphStore, size: f32) {
        self.settings.arrow_size = size.max(0.0);
        self.recompute_arrows(graph);
    }

    /// Geometry for an edge
    pub fn geometry(&self, edge_id: EdgeId) -> Option<&EdgeGeometry> {
        self.geometry.get(&edge_id)
    }

    /// All cached geometry
    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, &EdgeGeometry)> {
        self.geometry.iter().map(|(id, geometry)| (*id, geometry))
    }

    /// Number of cached paths
    pub fn len(&self) -> usize {
        self.geometry.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
    }

    /// Drop geometry for a removed edge
    pub fn remove(&mut self, edge_id: EdgeId) {
        self.geometry.shift_remove(&edge_id);
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.geometry.clear();
    }

    /// Recompute one edge
    pub fn recompute_edge(&mut self, graph: &GraphStore, edge_id: EdgeId) {
        let Some(edge) = graph.edge(edge_id) else {
            self.remove(edge_id);
            return;
        };
        if let Some(geometry) = self.build(graph, edge) {
            self.geometry.insert(edge_id, geometry);
        }
    }

    /// Recompute every edge touching a node (used while dragging)
    pub fn recompute_incident(&mut self, graph: &GraphStore, node_id: NodeId) {
        let incident: Vec<EdgeId> = graph.incident_edges(node_id).map(|e| e.id).collect();
        for edge_id in incident {
            self.recompute_edge(graph, edge_id);
        }
    }

    /// Recompute a whole parallel family after a sibling was added or removed
    pub fn recompute_family(&mut self, graph: &GraphStore, key: PairKey) {
        for edge_id in graph.parallel_family(key.low, key.high) {
            self.recompute_edge(graph, edge_id);
        }
    }

    /// Bring the cache in line with the store: drop stale paths, rebuild the rest
    pub fn recompute_all(&mut self, graph: &GraphStore) {
        self.geometry.retain(|id, _| graph.edge(*id).is_some());
        let ids: Vec<EdgeId> = graph.edges().map(|e| e.id).collect();
        for edge_id in ids {
            self.recompute_edge(graph, edge_id);
        }
    }

    /// Rebuild arrow placement without touching paths
    pub fn recompute_arrows(&mut self, graph: &GraphStore) {
        let directed = self.settings.directed;
        let radius = self.settings.node_radius;
        let size = self.settings.arrow_size;
        for (edge_id, geometry) in self.geometry.iter_mut() {
            geometry.arrow = match graph.edge(*edge_id) {
                Some(edge) if directed => graph
                    .node(edge.to)
                    .map(|target| place_arrow(&geometry.points, target.position, radius, size)),
                _ => None,
            };
        }
    }

    /// Nearest edge whose path passes within `tolerance` of the ray
    ///
    /// Returns the edge and the distance along the ray to the closest approach.
    pub fn pick(&self, ray: &Ray, tolerance: f32) -> Option<(EdgeId, f32)> {
        let mut best: Option<(EdgeId, f32)> = None;
        for (edge_id, geometry) in &self.geometry {
            for segment in geometry.points.windows(2) {
                let (distance, along) = ray.distance_to_segment(segment[0], segment[1]);
                if distance <= tolerance && best.map_or(true, |(_, t)| along < t) {
                    best = Some((*edge_id, along));
                }
            }
        }
        best
    }

    fn build(&self, graph: &GraphStore, edge: &Edge) -> Option<EdgeGeometry> {
        let from = graph.node(edge.from)?.position;
        let to = graph.node(edge.to)?.position;

        let (points, label_anchor) = if edge.is_loop() {
            self.loop_path(from)
        } else if edge.offset == 0.0 {
            (vec![from, to], from.midpoint(to))
        } else {
            // Perpendicular frame is taken from the canonical pair order so
            // siblings stored in either direction fan out consistently.
            let key = edge.key();
            let low = graph.node(key.low)?.position;
            let high = graph.node(key.high)?.position;
            self.curve_path(from, to, low, high, edge.offset)
        };

        let arrow = self.settings.directed.then(|| {
            place_arrow(&points, to, self.settings.node_radius, self.settings.arrow_size)
        });

        Some(EdgeGeometry {
            points,
            label_anchor,
            arrow,
        })
    }

    /// Quadratic curve from `from` to `to` bulging by `offset` at its midpoint
    fn curve_path(&self, from: Vec3, to: Vec3, low: Vec3, high: Vec3, offset: f32) -> (Vec<Vec3>, Vec3) {
        let along = (high - low).horizontal();
        let perpendicular = Vec3::new(-along.z, 0.0, along.x)
            .try_normalize()
            .unwrap_or(Vec3::X);
        let mid = from.midpoint(to);
        // B(0.5) = (from + 2c + to) / 4, so the control point sits twice as far out
        let control = mid + perpendicular * (2.0 * offset);

        let samples = self.settings.curve_samples.max(2);
        let points = (0..samples)
            .map(|i| {
                let t = i as f32 / (samples - 1) as f32;
                quadratic(from, control, to, t)
            })
            .collect();
        (points, quadratic(from, control, to, 0.5))
    }

    /// Teardrop arc leaving and re-entering the node, bulging outward
    fn loop_path(&self, center: Vec3) -> (Vec<Vec3>, Vec3) {
        let radius = (self.settings.node_radius * self.settings.loop_radius_factor).max(0.0);
        let bulge = self.settings.loop_bulge;
        let outward = center.horizontal().try_normalize().unwrap_or(Vec3::X);
        let segments = self.settings.loop_segments.max(3);

        let point_at = |theta: f32| {
            let sweep = theta.sin();
            let reach = 2.0 * radius * sweep * (1.0 + bulge * sweep);
            let alpha = theta - PI / 2.0;
            center + (outward * alpha.cos() + Vec3::Y * alpha.sin()) * reach
        };

        let mut points: Vec<Vec3> = (0..=segments)
            .map(|i| point_at(PI * i as f32 / segments as f32))
            .collect();
        // sin(PI) is not exactly zero in f32
        if let Some(last) = points.last_mut() {
            *last = center;
        }
        (points, point_at(PI / 2.0))
    }
}

fn quadratic(p0: Vec3, p1: Vec3, p2: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

/// Put the arrow tip where the path enters the target sphere
fn place_arrow(points: &[Vec3], target: Vec3, radius: f32, size: f32) -> Arrow {
    let outside = points
        .iter()
        .rev()
        .find(|p| p.distance(target) > radius)
        .copied();

    match outside {
        Some(tail) => {
            let direction = (target - tail).try_normalize().unwrap_or(Vec3::X);
            Arrow {
                tip: target - direction * radius,
                direction,
                size,
            }
        }
        None => {
            let start = points.first().copied().unwrap_or(target);
            let direction = (target - start).try_normalize().unwrap_or(Vec3::X);
            Arrow {
                tip: target,
                direction,
                size,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn store_with_pair() -> (GraphStore, NodeId, NodeId) {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Vec3::new(0.0, 0.0, 0.0));
        let b = graph.add_node(Vec3::new(4.0, 0.0, 0.0));
        (graph, a, b)
    }

    #[test]
    fn test_initial_offsets_alternate() {
        let offsets: Vec<f32> = (0..5).map(|k| initial_offset(k, 1.0)).collect();
        assert_eq!(offsets, vec![0.0, 1.0, -1.0, 2.0, -2.0]);
    }

    #[test]
    fn test_centered_offsets() {
        assert_eq!(centered_offsets(1, 1.0), vec![0.0]);
        assert_eq!(centered_offsets(2, 1.0), vec![-0.5, 0.5]);
        assert_eq!(centered_offsets(3, 2.0), vec![-2.0, 0.0, 2.0]);
        assert!(centered_offsets(0, 1.0).is_empty());
    }

    #[test]
    fn test_straight_edge() {
        let (mut graph, a, b) = store_with_pair();
        let e = graph.add_edge(a, b).unwrap();
        let mut layout = EdgeLayout::default();
        layout.recompute_all(&graph);

        let geometry = layout.geometry(e).unwrap();
        assert_eq!(geometry.points.len(), 2);
        assert_eq!(geometry.label_anchor, Vec3::new(2.0, 0.0, 0.0));
        assert!(geometry.arrow.is_none());
    }

    #[test]
    fn test_parallel_curves_fan_out() {
        let (mut graph, a, b) = store_with_pair();
        let e1 = graph.add_edge(a, b).unwrap();
        let e2 = graph.add_edge(b, a).unwrap();
        let mut layout = EdgeLayout::default();
        layout.recompute_all(&graph);

        let g1 = layout.geometry(e1).unwrap();
        let g2 = layout.geometry(e2).unwrap();
        assert_eq!(g1.points.len(), 20);
        assert_eq!(g2.points.len(), 20);

        // Offsets -0.5 / +0.5 put the label anchors on opposite sides
        assert!(approx(g1.label_anchor.z + g2.label_anchor.z, 0.0));
        assert!(approx(g1.label_anchor.z.abs(), 0.5));
        assert!(approx(g1.label_anchor.x, 2.0));

        // Endpoints stay anchored on the nodes
        assert_eq!(g1.points[0], Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(g2.points[0], Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_loop_is_closed_and_outward() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Vec3::new(3.0, 1.0, 0.0));
        let e = graph.add_edge(a, a).unwrap();
        let mut layout = EdgeLayout::default();
        layout.recompute_all(&graph);

        let geometry = layout.geometry(e).unwrap();
        assert_eq!(geometry.points.len(), 33);
        assert_eq!(geometry.points[0], Vec3::new(3.0, 1.0, 0.0));
        assert_eq!(*geometry.points.last().unwrap(), Vec3::new(3.0, 1.0, 0.0));
        // Apex sits on the far side of the node from the origin
        assert!(geometry.label_anchor.x > 3.0);
    }

    #[test]
    fn test_drag_recomputes_incident() {
        let (mut graph, a, b) = store_with_pair();
        let e = graph.add_edge(a, b).unwrap();
        let mut layout = EdgeLayout::default();
        layout.recompute_all(&graph);

        graph.set_node_position(b, Vec3::new(0.0, 0.0, 8.0));
        layout.recompute_incident(&graph, b);
        assert_eq!(layout.geometry(e).unwrap().points[1], Vec3::new(0.0, 0.0, 8.0));
    }

    #[test]
    fn test_arrows_follow_directed_flag() {
        let (mut graph, a, b) = store_with_pair();
        let e = graph.add_edge(a, b).unwrap();
        let mut layout = EdgeLayout::default();
        layout.recompute_all(&graph);
        let before = layout.geometry(e).unwrap().points.clone();

        layout.set_directed(&graph, true);
        let arrow = layout.geometry(e).unwrap().arrow.unwrap();
        assert!(approx(arrow.tip.x, 3.5));
        assert!(approx(arrow.direction.x, 1.0));
        assert_eq!(layout.geometry(e).unwrap().points, before);

        layout.set_arrow_size(&graph, 0.9);
        assert!(approx(layout.geometry(e).unwrap().arrow.unwrap().size, 0.9));

        layout.set_directed(&graph, false);
        assert!(layout.geometry(e).unwrap().arrow.is_none());
    }

    #[test]
    fn test_pick_edge() {
        let (mut graph, a, b) = store_with_pair();
        let e = graph.add_edge(a, b).unwrap();
        let mut layout = EdgeLayout::default();
        layout.recompute_all(&graph);

        let hit = Ray::new(Vec3::new(2.0, 5.0, 0.1), -Vec3::Y);
        assert_eq!(layout.pick(&hit, 0.25).map(|(id, _)| id), Some(e));

        let miss = Ray::new(Vec3::new(2.0, 5.0, 2.0), -Vec3::Y);
        assert!(layout.pick(&miss, 0.25).is_none());
    }

    #[test]
    fn test_stale_geometry_dropped() {
        let (mut graph, a, b) = store_with_pair();
        let e = graph.add_edge(a, b).unwrap();
        let mut layout = EdgeLayout::default();
        layout.recompute_all(&graph);

        graph.remove_edge(e);
        layout.recompute_all(&graph);
        assert!(layout.is_empty());
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Control panel commands.
//!
//! These run outside the input state machine: toggling directed display,
//! editing the selected node, triggering analyses and clearing the graph.

use crate::analysis::{
    check_bipartite, chromatic_number, connected_components, find_bridges, BipartiteResult,
    BridgeReport, ChromaticResult, ComponentPartition,
};
use crate::events::GraphEvent;
use crate::interaction::InteractionController;
use crate::node::Color;
use crate::presenter::{reset_to_defaults, Element, Presenter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which analysis to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisKind {
    /// Connected components
    Components,
    /// Bridge edges
    Bridges,
    /// Bipartite 2-coloring
    Bipartite,
    /// Chromatic number
    Chromatic,
}

impl AnalysisKind {
    /// All analyses, in panel order
    pub const ALL: [AnalysisKind; 4] = [
        AnalysisKind::Components,
        AnalysisKind::Bridges,
        AnalysisKind::Bipartite,
        AnalysisKind::Chromatic,
    ];

    /// Button label
    pub fn name(&self) -> &'static str {
        match self {
            Self::Components => "Connected components",
            Self::Bridges => "Bridges",
            Self::Bipartite => "Bipartite check",
            Self::Chromatic => "Chromatic number",
        }
    }
}

/// Result of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalysisReport {
    /// Component partition
    Components(ComponentPartition),
    /// Bridge set
    Bridges(BridgeReport),
    /// 2-coloring outcome
    Bipartite(BipartiteResult),
    /// Minimum coloring outcome
    Chromatic(ChromaticResult),
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Components(partition) => write!(f, "{} connected component(s)", partition.len()),
            Self::Bridges(report) => write!(f, "{} bridge(s)", report.len()),
            Self::Bipartite(result) if result.is_bipartite => write!(f, "bipartite"),
            Self::Bipartite(_) => write!(f, "not bipartite"),
            Self::Chromatic(result) => match result.chromatic_number {
                Some(k) if result.exact => write!(f, "chromatic number {k}"),
                Some(k) => write!(f, "chromatic number at most {k}"),
                None => write!(f, "no proper coloring (self-loop)"),
            },
        }
    }
}

/// A control panel action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PanelCommand {
    /// Toggle arrowheads
    SetDirected(bool),
    /// Change arrowhead size
    SetArrowSize(f32),
    /// Recolor the selected node
    SetSelectedColor(Color),
    /// Relabel the selected node
    SetSelectedLabel(String),
    /// Run an analysis and apply it
    RunAnalysis(AnalysisKind),
    /// Drop analysis colors and bridge flags
    ResetHighlights,
    /// Remove every node and edge
    ClearGraph,
}

impl InteractionController {
    /// Run a panel command; analyses return their report
    pub fn execute(
        &mut self,
        command: PanelCommand,
        presenter: &mut dyn Presenter,
    ) -> Option<AnalysisReport> {
        tracing::debug!(?command, "panel command");
        match command {
            PanelCommand::SetDirected(directed) => self.set_directed(directed),
            PanelCommand::SetArrowSize(size) => self.set_arrow_size(size),
            PanelCommand::SetSelectedColor(color) => {
                self.set_selected_color(color, presenter);
            }
            PanelCommand::SetSelectedLabel(label) => {
                self.set_selected_label(label);
            }
            PanelCommand::RunAnalysis(kind) => return Some(self.run_analysis(kind, presenter)),
            PanelCommand::ResetHighlights => self.reset_highlights(presenter),
            PanelCommand::ClearGraph => self.clear_graph(),
        }
        None
    }

    /// Toggle directed display; only arrow placement is rebuilt
    pub fn set_directed(&mut self, directed: bool) {
        self.settings.layout.directed = directed;
        self.layout.set_directed(&self.graph, directed);
        self.publish_arrows();
    }

    /// Change arrow size; only arrow placement is rebuilt
    pub fn set_arrow_size(&mut self, size: f32) {
        self.layout.set_arrow_size(&self.graph, size);
        self.settings.layout.arrow_size = self.layout.settings().arrow_size;
        self.publish_arrows();
    }

    fn publish_arrows(&mut self) {
        let event = GraphEvent::ArrowsChanged {
            directed: self.layout.directed(),
            arrow_size: self.layout.settings().arrow_size,
        };
        self.graph.publish(event);
    }

    /// Recolor the selected node; returns whether a node was selected
    pub fn set_selected_color(&mut self, color: Color, presenter: &mut dyn Presenter) -> bool {
        let Some(node_id) = self.selected_node() else {
            tracing::warn!("no node selected to recolor");
            return false;
        };
        match self.graph.set_node_color(node_id, color) {
            Ok(()) => {
                presenter.set_color(Element::Node(node_id), color);
                true
            }
            Err(err) => {
                tracing::warn!(%err, "recolor rejected");
                false
            }
        }
    }

    /// Relabel the selected node; returns whether a node was selected
    pub fn set_selected_label(&mut self, label: impl Into<String>) -> bool {
        let Some(node_id) = self.selected_node() else {
            tracing::warn!("no node selected to relabel");
            return false;
        };
        match self.graph.set_node_label(node_id, label) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, "relabel rejected");
                false
            }
        }
    }

    /// Run an analysis on the current graph and apply it for display
    pub fn run_analysis(&mut self, kind: AnalysisKind, presenter: &mut dyn Presenter) -> AnalysisReport {
        let report = match kind {
            AnalysisKind::Components => {
                let partition = connected_components(&self.graph);
                partition.apply(&self.graph, presenter);
                AnalysisReport::Components(partition)
            }
            AnalysisKind::Bridges => {
                let report = find_bridges(&self.graph);
                self.graph.set_bridge_flags(&report.bridges);
                report.apply(&self.graph, presenter);
                AnalysisReport::Bridges(report)
            }
            AnalysisKind::Bipartite => {
                let result = check_bipartite(&self.graph);
                result.apply(&self.graph, presenter);
                AnalysisReport::Bipartite(result)
            }
            AnalysisKind::Chromatic => {
                let budget = self.settings.analysis.chromatic_step_budget;
                let result = chromatic_number(&self.graph, budget);
                result.apply(&self.graph, presenter);
                AnalysisReport::Chromatic(result)
            }
        };
        tracing::info!(analysis = kind.name(), result = %report, "analysis applied");
        report
    }

    /// Clear bridge flags and restore every element's own color
    pub fn reset_highlights(&mut self, presenter: &mut dyn Presenter) {
        self.graph.clear_bridge_flags();
        reset_to_defaults(&self.graph, presenter);
        self.graph.publish(GraphEvent::HighlightsReset);
    }

    /// Remove every node and edge and return to idle
    pub fn clear_graph(&mut self) {
        self.reset_state();
        self.graph.clear();
        self.layout.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::BipartiteConflict;
    use crate::interaction::{InputEvent, InteractionState};
    use crate::math::{Ray, Vec3};
    use crate::node::NodeId;
    use crate::presenter::testing::RecordingPresenter;

    fn controller_with(n: usize, pairs: &[(usize, usize)]) -> (InteractionController, Vec<NodeId>) {
        let mut controller = InteractionController::default();
        let nodes: Vec<NodeId> = (0..n)
            .map(|i| controller.add_node(Vec3::new(i as f32 * 5.0, 0.0, (i % 2) as f32 * 5.0)))
            .collect();
        for &(a, b) in pairs {
            controller.connect(nodes[a], nodes[b]).unwrap();
        }
        (controller, nodes)
    }

    #[test]
    fn test_triangle_scenario() {
        let (mut controller, _) = controller_with(3, &[(0, 1), (1, 2), (2, 0)]);
        let mut presenter = RecordingPresenter::default();

        let components = controller.run_analysis(AnalysisKind::Components, &mut presenter);
        assert!(matches!(components, AnalysisReport::Components(ref p) if p.len() == 1));

        let bridges = controller.run_analysis(AnalysisKind::Bridges, &mut presenter);
        assert!(matches!(bridges, AnalysisReport::Bridges(ref r) if r.is_empty()));
        assert!(controller.graph().edges().all(|e| !e.is_bridge));

        let bipartite = controller.run_analysis(AnalysisKind::Bipartite, &mut presenter);
        assert_eq!(bipartite.to_string(), "not bipartite");
    }

    #[test]
    fn test_single_edge_scenario() {
        let (mut controller, nodes) = controller_with(2, &[(0, 1)]);
        let mut presenter = RecordingPresenter::default();

        controller.run_analysis(AnalysisKind::Bridges, &mut presenter);
        assert!(controller.graph().edges().all(|e| e.is_bridge));

        let AnalysisReport::Bipartite(result) =
            controller.run_analysis(AnalysisKind::Bipartite, &mut presenter)
        else {
            panic!("expected bipartite report");
        };
        assert!(result.is_bipartite);
        assert_ne!(result.side(nodes[0]), result.side(nodes[1]));
        assert_ne!(
            presenter.colors[&Element::Node(nodes[0])],
            presenter.colors[&Element::Node(nodes[1])]
        );
    }

    #[test]
    fn test_parallel_scenario() {
        let (mut controller, _) = controller_with(2, &[(0, 1), (0, 1)]);
        let mut presenter = RecordingPresenter::default();
        let report = controller.run_analysis(AnalysisKind::Bridges, &mut presenter);
        assert_eq!(report.to_string(), "0 bridge(s)");

        let mut offsets: Vec<f32> = controller.graph().edges().map(|e| e.offset).collect();
        offsets.sort_by(f32::total_cmp);
        assert_eq!(offsets, vec![-0.5, 0.5]);
    }

    #[test]
    fn test_loop_blocks_coloring() {
        let (mut controller, nodes) = controller_with(2, &[(0, 1), (0, 0)]);
        let mut presenter = RecordingPresenter::default();

        let AnalysisReport::Bipartite(result) =
            controller.run_analysis(AnalysisKind::Bipartite, &mut presenter)
        else {
            panic!("expected bipartite report");
        };
        assert!(matches!(result.conflict, Some(BipartiteConflict::SelfLoop { node, .. }) if node == nodes[0]));

        let chromatic = controller.run_analysis(AnalysisKind::Chromatic, &mut presenter);
        assert_eq!(chromatic.to_string(), "no proper coloring (self-loop)");
    }

    #[test]
    fn test_reset_highlights_clears_flags() {
        let (mut controller, _) = controller_with(2, &[(0, 1)]);
        let mut presenter = RecordingPresenter::default();
        controller.run_analysis(AnalysisKind::Bridges, &mut presenter);
        assert_eq!(presenter.highlighted().len(), 1);

        controller.execute(PanelCommand::ResetHighlights, &mut presenter);
        assert!(controller.graph().edges().all(|e| !e.is_bridge));
        assert!(presenter.highlighted().is_empty());
        assert!(presenter.colors.values().all(|c| *c == Color::NODE_DEFAULT || *c == Color::EDGE_DEFAULT));
    }

    #[test]
    fn test_directed_toggle_rebuilds_arrows_only() {
        let (mut controller, _) = controller_with(2, &[(0, 1)]);
        let events = controller.subscribe();
        let mut presenter = RecordingPresenter::default();
        let edge = controller.graph().edges().next().unwrap().id;
        let path = controller.layout().geometry(edge).unwrap().points.clone();

        controller.execute(PanelCommand::SetDirected(true), &mut presenter);
        controller.execute(PanelCommand::SetArrowSize(0.75), &mut presenter);

        let geometry = controller.layout().geometry(edge).unwrap();
        assert_eq!(geometry.points, path);
        assert_eq!(geometry.arrow.unwrap().size, 0.75);
        assert!(controller.settings().layout.directed);
        assert_eq!(
            events.try_iter().last(),
            Some(GraphEvent::ArrowsChanged {
                directed: true,
                arrow_size: 0.75
            })
        );
    }

    #[test]
    fn test_selected_node_edits() {
        let (mut controller, nodes) = controller_with(2, &[]);
        let mut presenter = RecordingPresenter::default();
        assert!(!controller.set_selected_label("orphan"));

        controller.handle(InputEvent::PointerPick(Ray::new(
            Vec3::new(0.0, 10.0, 0.0),
            -Vec3::Y,
        )));
        assert_eq!(controller.state(), InteractionState::NodeSelected(nodes[0]));

        let red = Color::rgb(255, 0, 0);
        controller.execute(PanelCommand::SetSelectedColor(red), &mut presenter);
        controller.execute(PanelCommand::SetSelectedLabel("hub".into()), &mut presenter);

        let node = controller.graph().node(nodes[0]).unwrap();
        assert_eq!(node.color, red);
        assert_eq!(node.label, "hub");
        assert_eq!(presenter.colors[&Element::Node(nodes[0])], red);
    }

    #[test]
    fn test_clear_graph_resets_everything() {
        let (mut controller, _) = controller_with(3, &[(0, 1), (1, 2)]);
        controller.handle(InputEvent::PointerPick(Ray::new(
            Vec3::new(0.0, 10.0, 0.0),
            -Vec3::Y,
        )));
        let events = controller.subscribe();
        let mut presenter = RecordingPresenter::default();

        controller.execute(PanelCommand::ClearGraph, &mut presenter);
        assert_eq!(controller.state(), InteractionState::Idle);
        assert_eq!(controller.graph().node_count(), 0);
        assert!(controller.layout().is_empty());
        assert_eq!(
            events.try_iter().collect::<Vec<_>>(),
            vec![
                GraphEvent::SelectionCleared,
                GraphEvent::GraphChanged {
                    node_count: 0,
                    edge_count: 0
                },
            ]
        );
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Control panel - display toggles, selection editing and analyses.

use graphlab_graph::{
    AnalysisKind, AnalysisReport, Color, GraphSnapshot, InteractionState, NodeId, PanelCommand,
};

/// Buffered edits for the selected node
#[derive(Debug, Clone, PartialEq)]
struct NodeEdit {
    node: NodeId,
    label: String,
    color: [u8; 3],
}

/// The control panel; emits [`PanelCommand`]s instead of touching the graph
#[derive(Debug)]
pub struct ControlPanel {
    editing: Option<NodeEdit>,
    arrow_size: f32,
    /// Summary of the last analysis
    status: Option<String>,
}

impl ControlPanel {
    /// Create a panel starting from the configured arrow size
    pub fn new(arrow_size: f32) -> Self {
        Self {
            editing: None,
            arrow_size,
            status: None,
        }
    }

    /// Show an analysis summary under the buttons
    pub fn set_report(&mut self, report: &AnalysisReport) {
        self.status = Some(report.to_string());
    }

    /// Last analysis summary
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Render the panel and collect what the user asked for
    pub fn ui(&mut self, ui: &mut egui::Ui, snapshot: &GraphSnapshot) -> Vec<PanelCommand> {
        let mut commands = Vec::new();

        ui.heading("Graph");
        ui.label(format!(
            "{} nodes, {} edges",
            snapshot.nodes.len(),
            snapshot.edges.len()
        ));
        ui.separator();

        self.display_section(ui, snapshot, &mut commands);
        ui.separator();
        self.selection_section(ui, snapshot, &mut commands);
        ui.separator();
        self.analysis_section(ui, &mut commands);

        commands
    }

    fn display_section(
        &mut self,
        ui: &mut egui::Ui,
        snapshot: &GraphSnapshot,
        commands: &mut Vec<PanelCommand>,
    ) {
        let mut directed = snapshot.directed;
        if ui.checkbox(&mut directed, "Directed").changed() {
            commands.push(PanelCommand::SetDirected(directed));
        }

        ui.horizontal(|ui| {
            ui.label("Arrow size");
            let response = ui.add_enabled(
                directed,
                egui::DragValue::new(&mut self.arrow_size)
                    .speed(0.01)
                    .range(0.0..=5.0),
            );
            if response.changed() {
                commands.push(PanelCommand::SetArrowSize(self.arrow_size));
            }
        });
    }

    fn selection_section(
        &mut self,
        ui: &mut egui::Ui,
        snapshot: &GraphSnapshot,
        commands: &mut Vec<PanelCommand>,
    ) {
        match snapshot.state {
            InteractionState::NodeSelected(node_id) | InteractionState::Dragging(node_id) => {
                let Some(view) = snapshot.node(node_id) else {
                    self.editing = None;
                    return;
                };
                if self.editing.as_ref().map(|e| e.node) != Some(node_id) {
                    self.editing = Some(NodeEdit {
                        node: node_id,
                        label: view.label.clone(),
                        color: view.color.0,
                    });
                }
                let Some(edit) = self.editing.as_mut() else {
                    return;
                };

                ui.label(format!("Node {node_id}, degree {}", view.degree));
                ui.horizontal(|ui| {
                    ui.label("Label");
                    if ui.text_edit_singleline(&mut edit.label).changed() {
                        commands.push(PanelCommand::SetSelectedLabel(edit.label.clone()));
                    }
                });
                ui.horizontal(|ui| {
                    ui.label("Color");
                    if egui::color_picker::color_edit_button_srgb(ui, &mut edit.color).changed() {
                        commands.push(PanelCommand::SetSelectedColor(Color(edit.color)));
                    }
                });
            }
            InteractionState::EdgeSelected(edge_id) => {
                self.editing = None;
                if let Some(view) = snapshot.edge(edge_id) {
                    ui.label(format!("Edge {} ({} - {})", view.label, view.from, view.to));
                    if view.is_loop {
                        ui.label("Self-loop");
                    } else if view.is_parallel {
                        ui.label(format!("Parallel, offset {:.2}", view.offset));
                    }
                }
            }
            InteractionState::NodeCreationPreview(preview) => {
                self.editing = None;
                ui.label(format!("Placing node at distance {:.1}", preview.distance));
            }
            InteractionState::Idle => {
                self.editing = None;
                ui.label("Nothing selected");
            }
        }
    }

    fn analysis_section(&mut self, ui: &mut egui::Ui, commands: &mut Vec<PanelCommand>) {
        ui.heading("Analysis");
        for kind in AnalysisKind::ALL {
            if ui.button(kind.name()).clicked() {
                commands.push(PanelCommand::RunAnalysis(kind));
            }
        }
        ui.horizontal(|ui| {
            if ui.button("Reset highlights").clicked() {
                commands.push(PanelCommand::ResetHighlights);
            }
            if ui.button("Clear graph").clicked() {
                commands.push(PanelCommand::ClearGraph);
            }
        });
        if let Some(status) = &self.status {
            ui.label(status);
        }
    }
}

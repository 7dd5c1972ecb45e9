// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless script runner.
//!
//! A script is a RON list of steps replayed against an
//! [`InteractionController`], with the scene table, event console and
//! control panel kept in sync exactly as an interactive frontend would.

use crate::console::EventConsole;
use crate::panel::ControlPanel;
use crate::scene::{SceneRow, SceneTable};
use graphlab_graph::{
    AnalysisKind, AnalysisReport, GraphEvent, GraphSettings, GraphSnapshot, InputEvent,
    InteractionController, Key, NodeId, PanelCommand, Ray, SettingsError, Vec3,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Script loading and output errors
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Could not read the script file
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    /// Script text is not valid RON for a [`Script`]
    #[error("failed to parse script: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// Settings file problem
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Could not encode the outcome
    #[error("failed to encode outcome: {0}")]
    Output(#[from] serde_json::Error),
}

/// One scripted action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptStep {
    /// Add a node at a position, bypassing the preview
    AddNode(Vec3),
    /// Connect two nodes directly
    Connect {
        /// Start node
        from: NodeId,
        /// End node
        to: NodeId,
    },
    /// Feed an input event to the state machine
    Input(InputEvent),
    /// Run a control panel command
    Command(PanelCommand),
}

/// An ordered list of steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl Script {
    /// Load a script from a RON file
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Parse a script from RON text
    pub fn from_ron(text: &str) -> Result<Self, ScriptError> {
        Ok(ron::from_str(text)?)
    }

    /// Built-in demo: a triangle with a pendant node, a parallel pair and a loop,
    /// built partly by clicking, then every analysis
    pub fn demo() -> Self {
        let down_at = |x: f32, z: f32| Ray::new(Vec3::new(x, 10.0, z), -Vec3::Y);
        let mut steps = vec![
            ScriptStep::AddNode(Vec3::new(0.0, 0.0, 0.0)),
            ScriptStep::AddNode(Vec3::new(4.0, 0.0, 0.0)),
            ScriptStep::AddNode(Vec3::new(2.0, 0.0, 3.0)),
            ScriptStep::Connect {
                from: NodeId(0),
                to: NodeId(1),
            },
            ScriptStep::Connect {
                from: NodeId(1),
                to: NodeId(2),
            },
            // Click v3 then v1 to close the triangle
            ScriptStep::Input(InputEvent::PointerPick(down_at(2.0, 3.0))),
            ScriptStep::Input(InputEvent::PointerPick(down_at(0.0, 0.0))),
            // Preview a fourth node and place it
            ScriptStep::Input(InputEvent::PointerMove(Ray::new(
                Vec3::new(8.0, 10.0, 0.0),
                Vec3::new(0.0, -1.0, 0.0),
            ))),
            ScriptStep::Input(InputEvent::KeyDown(Key::Char('N'))),
            ScriptStep::Input(InputEvent::PointerPick(down_at(8.0, 0.0))),
            ScriptStep::Connect {
                from: NodeId(1),
                to: NodeId(3),
            },
            ScriptStep::Connect {
                from: NodeId(3),
                to: NodeId(1),
            },
            ScriptStep::Connect {
                from: NodeId(3),
                to: NodeId(3),
            },
            ScriptStep::Command(PanelCommand::SetDirected(true)),
        ];
        steps.extend(
            AnalysisKind::ALL
                .into_iter()
                .map(|kind| ScriptStep::Command(PanelCommand::RunAnalysis(kind))),
        );
        Self { steps }
    }
}

/// Everything a script run produced
#[derive(Debug, Clone, Serialize)]
pub struct ScriptOutcome {
    /// Steps executed
    pub steps_run: usize,
    /// Final graph
    pub snapshot: GraphSnapshot,
    /// Analysis reports, in run order
    pub reports: Vec<AnalysisReport>,
    /// Retained event history
    pub events: Vec<GraphEvent>,
    /// Final display state of every element
    pub scene: Vec<SceneRow>,
    /// Panel status line
    pub status: Option<String>,
}

/// Drives a controller and its presentation collaborators from script steps
pub struct ScriptRunner {
    controller: InteractionController,
    scene: SceneTable,
    console: EventConsole,
    panel: ControlPanel,
    ctx: egui::Context,
    reports: Vec<AnalysisReport>,
    steps_run: usize,
}

impl ScriptRunner {
    /// Create a runner over an empty graph
    pub fn new(settings: GraphSettings) -> Self {
        let arrow_size = settings.layout.arrow_size;
        let mut controller = InteractionController::new(settings);
        let console = EventConsole::new(controller.subscribe());
        Self {
            controller,
            scene: SceneTable::new(),
            console,
            panel: ControlPanel::new(arrow_size),
            ctx: egui::Context::default(),
            reports: Vec::new(),
            steps_run: 0,
        }
    }

    /// The controller being driven
    #[cfg(test)]
    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// The presentation-side scene
    #[cfg(test)]
    pub fn scene(&self) -> &SceneTable {
        &self.scene
    }

    /// Execute one step and bring the presentation up to date
    pub fn step(&mut self, step: ScriptStep) {
        tracing::debug!(?step, "script step");
        match step {
            ScriptStep::AddNode(position) => {
                self.controller.add_node(position);
            }
            ScriptStep::Connect { from, to } => {
                if let Err(err) = self.controller.connect(from, to) {
                    tracing::warn!(%err, "scripted connect rejected");
                }
            }
            ScriptStep::Input(event) => self.controller.handle(event),
            ScriptStep::Command(command) => self.command(command),
        }
        self.steps_run += 1;
        self.present();
    }

    fn command(&mut self, command: PanelCommand) {
        if let Some(report) = self.controller.execute(command, &mut self.scene) {
            self.panel.set_report(&report);
            self.reports.push(report);
        }
    }

    /// Drain events into the scene, then run one headless panel frame
    fn present(&mut self) {
        for event in self.console.drain() {
            self.scene.apply_event(&event);
        }
        if self.console.take_structure_changed() {
            self.scene.sync(&self.controller.snapshot());
        }

        let selection = self.scene.selected().and_then(|s| self.scene.entry(s));
        tracing::trace!(
            elements = self.scene.element_count(),
            highlighted = self.scene.highlighted().len(),
            selection_color = ?selection.map(|entry| entry.color),
            "scene presented"
        );

        let snapshot = self.controller.snapshot();
        let mut commands = Vec::new();
        let panel = &mut self.panel;
        let console = &self.console;
        let _ = self.ctx.run(egui::RawInput::default(), |ctx| {
            egui::SidePanel::right("control_panel").show(ctx, |ui| {
                commands = panel.ui(ui, &snapshot);
            });
            egui::CentralPanel::default().show(ctx, |ui| {
                console.ui(ui);
            });
        });
        for command in commands {
            self.command(command);
        }
    }

    /// Run every step of a script and collect the outcome
    pub fn run(mut self, script: Script) -> ScriptOutcome {
        for step in script.steps {
            self.step(step);
        }
        tracing::info!(steps = self.steps_run, reports = self.reports.len(), "script finished");
        ScriptOutcome {
            steps_run: self.steps_run,
            snapshot: self.controller.snapshot(),
            reports: self.reports,
            events: self.console.history().cloned().collect(),
            scene: self.scene.rows(),
            status: self.panel.status().map(str::to_owned),
        }
    }
}

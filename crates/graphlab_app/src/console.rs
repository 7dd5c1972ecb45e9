// SPDX-License-Identifier: MIT OR Apache-2.0
//! Event console - logs graph event bus traffic.

use graphlab_graph::GraphEvent;
use std::collections::VecDeque;
use std::sync::mpsc;

/// Default number of events kept for display
const DEFAULT_CAPACITY: usize = 256;

/// Drains a graph event subscription, logs it and keeps a bounded history
#[derive(Debug)]
pub struct EventConsole {
    receiver: mpsc::Receiver<GraphEvent>,
    history: VecDeque<GraphEvent>,
    capacity: usize,
    /// Set when a structural change arrives; cleared by [`Self::take_structure_changed`]
    structure_changed: bool,
}

impl EventConsole {
    /// Wrap a subscription
    pub fn new(receiver: mpsc::Receiver<GraphEvent>) -> Self {
        Self::with_capacity(receiver, DEFAULT_CAPACITY)
    }

    /// Wrap a subscription with a custom history length
    pub fn with_capacity(receiver: mpsc::Receiver<GraphEvent>, capacity: usize) -> Self {
        Self {
            receiver,
            history: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity: capacity.max(1),
            structure_changed: false,
        }
    }

    /// Pull every pending event; returns the newly received ones
    pub fn drain(&mut self) -> Vec<GraphEvent> {
        let received: Vec<GraphEvent> = self.receiver.try_iter().collect();
        for event in &received {
            tracing::info!(target: "graphlab_app::events", "{}", describe(event));
            if matches!(event, GraphEvent::GraphChanged { .. }) {
                self.structure_changed = true;
            }
            if self.history.len() == self.capacity {
                self.history.pop_front();
            }
            self.history.push_back(event.clone());
        }
        received
    }

    /// Whether nodes or edges changed since the last call
    pub fn take_structure_changed(&mut self) -> bool {
        std::mem::take(&mut self.structure_changed)
    }

    /// Retained events, oldest first
    pub fn history(&self) -> impl Iterator<Item = &GraphEvent> {
        self.history.iter()
    }

    /// Render the history as a scrolling log
    pub fn ui(&self, ui: &mut egui::Ui) {
        ui.label(format!("{} events", self.history.len()));
        ui.separator();
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for event in &self.history {
                    ui.monospace(describe(event));
                }
            });
    }
}

/// One-line human description of an event
pub fn describe(event: &GraphEvent) -> String {
    match event {
        GraphEvent::GraphChanged {
            node_count,
            edge_count,
        } => format!("graph changed: {node_count} nodes, {edge_count} edges"),
        GraphEvent::NodeSelected { node, degree } => {
            format!("selected node {node} (degree {degree})")
        }
        GraphEvent::EdgeSelected { edge } => format!("selected edge {edge}"),
        GraphEvent::SelectionCleared => "selection cleared".to_string(),
        GraphEvent::ArrowsChanged {
            directed,
            arrow_size,
        } => {
            if *directed {
                format!("directed display, arrow size {arrow_size}")
            } else {
                "undirected display".to_string()
            }
        }
        GraphEvent::HighlightsReset => "highlights reset".to_string(),
    }
}

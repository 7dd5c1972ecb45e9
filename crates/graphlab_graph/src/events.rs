// SPDX-License-Identifier: MIT OR Apache-2.0
//! Change notifications for the presentation layer.
//!
//! Subscribers receive [`GraphEvent`]s over an `mpsc` channel and drain them
//! at their own pace (typically once per frame). Dropped receivers are pruned
//! on the next publish.

use crate::edge::EdgeId;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::sync::mpsc;

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphEvent {
    /// A node or edge was added or removed; counts and labels may have shifted
    GraphChanged {
        /// Nodes after the change
        node_count: usize,
        /// Edges after the change
        edge_count: usize,
    },
    /// A node became the selection
    NodeSelected {
        /// Selected node
        node: NodeId,
        /// Its degree at selection time
        degree: usize,
    },
    /// An edge became the selection
    EdgeSelected {
        /// Selected edge
        edge: EdgeId,
    },
    /// Nothing is selected any more
    SelectionCleared,
    /// The directed flag or arrow size changed; arrow geometry was rebuilt
    ArrowsChanged {
        /// Current directed flag
        directed: bool,
        /// Current arrow size
        arrow_size: f32,
    },
    /// Analysis highlights were reset to defaults
    HighlightsReset,
}

/// Fan-out publisher for [`GraphEvent`]s
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<mpsc::Sender<GraphEvent>>,
}

impl EventBus {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&mut self) -> mpsc::Receiver<GraphEvent> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Deliver an event to every live subscriber
    pub fn publish(&mut self, event: GraphEvent) {
        tracing::trace!(?event, subscribers = self.subscribers.len(), "publish");
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    /// Number of live subscribers (as of the last publish)
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

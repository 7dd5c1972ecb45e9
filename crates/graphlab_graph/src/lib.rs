// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interactive multigraph engine for `GraphLab`.
//!
//! This crate holds everything that is not drawing:
//! - An undirected multigraph store with parallel edges and self-loops
//! - Curved edge geometry so parallel edges and loops stay visible
//! - An input-driven state machine for selecting, connecting, creating,
//!   dragging and deleting
//! - Structural analyses: components, bridges, bipartiteness and chromatic number
//!
//! ## Architecture
//!
//! [`InteractionController`] owns a [`GraphStore`] and its [`EdgeLayout`].
//! Rendering layers consume [`GraphSnapshot`]s and receive recolor and
//! highlight requests through the [`Presenter`] trait; they learn about
//! changes through [`GraphEvent`] subscriptions.

pub mod analysis;
pub mod commands;
pub mod config;
pub mod edge;
pub mod events;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod math;
pub mod node;
pub mod presenter;
pub mod snapshot;

pub use analysis::{
    check_bipartite, chromatic_number, connected_components, find_bridges, BipartiteResult,
    BridgeReport, ChromaticResult, ComponentPartition,
};
pub use commands::{AnalysisKind, AnalysisReport, PanelCommand};
pub use config::{GraphSettings, SettingsError};
pub use edge::{Edge, EdgeId, PairKey};
pub use events::{EventBus, GraphEvent};
pub use graph::{GraphError, GraphStore};
pub use interaction::{InputEvent, InteractionController, InteractionState, Key};
pub use layout::{EdgeGeometry, EdgeLayout};
pub use math::{Ray, Vec3};
pub use node::{Color, Node, NodeId};
pub use presenter::{Element, Presenter};
pub use snapshot::{EdgeView, GraphSnapshot, NodeView};

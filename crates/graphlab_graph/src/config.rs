// SPDX-License-Identifier: MIT OR Apache-2.0
//! Settings for layout, interaction and analysis.
//!
//! Stored as RON. Every field has a default, so partial files are fine.

use crate::interaction::Key;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Could not read or write the settings file
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON for [`GraphSettings`]
    #[error("Settings parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serializing the settings failed
    #[error("Settings serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// A value is out of range
    #[error("Invalid setting `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Edge geometry parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Spacing unit between parallel siblings
    pub base_offset: f32,
    /// Visual radius of a node sphere
    pub node_radius: f32,
    /// Loop radius as a multiple of the node radius
    pub loop_radius_factor: f32,
    /// Extra outward bulge of loop arcs (fraction of the radius)
    pub loop_bulge: f32,
    /// Points sampled along a curved parallel edge
    pub curve_samples: usize,
    /// Segments sampled along a loop
    pub loop_segments: usize,
    /// Arrowhead length when directed
    pub arrow_size: f32,
    /// Whether edges are drawn with arrowheads
    pub directed: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            base_offset: 1.0,
            node_radius: 0.5,
            loop_radius_factor: 1.6,
            loop_bulge: 0.35,
            curve_samples: 20,
            loop_segments: 32,
            arrow_size: 0.3,
            directed: false,
        }
    }
}

/// Key bindings for the interaction state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Enter node creation preview
    pub begin_node_creation: Key,
    /// Start dragging the selected node
    pub enable_drag: Key,
    /// Delete the selected node or edge
    pub delete: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            begin_node_creation: Key::Char('N'),
            enable_drag: Key::Char('G'),
            delete: Key::Delete,
        }
    }
}

/// Pointer and keyboard behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Initial distance of the creation preview along the pointer ray
    pub preview_distance: f32,
    /// The preview never comes closer than this
    pub min_preview_distance: f32,
    /// Distance change per scroll unit
    pub scroll_step: f32,
    /// Maximum ray distance from an edge path that still counts as a hit
    pub edge_pick_tolerance: f32,
    /// Key bindings
    pub keys: KeyBindings,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            preview_distance: 10.0,
            min_preview_distance: 1.0,
            scroll_step: 0.5,
            edge_pick_tolerance: 0.25,
            keys: KeyBindings::default(),
        }
    }
}

/// Analysis limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Backtracking steps allowed before chromatic search falls back to greedy
    pub chromatic_step_budget: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            chromatic_step_budget: 2_000_000,
        }
    }
}

/// All `GraphLab` settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Edge geometry
    pub layout: LayoutSettings,
    /// Input handling
    pub interaction: InteractionSettings,
    /// Analysis limits
    pub analysis: AnalysisSettings,
}

impl GraphSettings {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Parse and validate settings from a RON string
    pub fn from_ron(content: &str) -> Result<Self, SettingsError> {
        let settings: GraphSettings = ron::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), SettingsError> {
        let layout = &self.layout;
        if layout.node_radius <= 0.0 {
            return Err(SettingsError::Invalid {
                field: "layout.node_radius",
                reason: "must be positive",
            });
        }
        if layout.base_offset <= 0.0 {
            return Err(SettingsError::Invalid {
                field: "layout.base_offset",
                reason: "must be positive",
            });
        }
        if layout.curve_samples < 2 {
            return Err(SettingsError::Invalid {
                field: "layout.curve_samples",
                reason: "need at least two points",
            });
        }
        if layout.loop_segments < 3 {
            return Err(SettingsError::Invalid {
                field: "layout.loop_segments",
                reason: "need at least three segments",
            });
        }
        if self.interaction.min_preview_distance <= 0.0 {
            return Err(SettingsError::Invalid {
                field: "interaction.min_preview_distance",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GraphSettings::default();
        assert_eq!(settings.layout.base_offset, 1.0);
        assert_eq!(settings.layout.curve_samples, 20);
        assert_eq!(settings.layout.loop_segments, 32);
        assert_eq!(settings.interaction.keys.delete, Key::Delete);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_serialization() {
        let mut settings = GraphSettings::default();
        settings.layout.directed = true;
        let ron_str =
            ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::default()).unwrap();
        let loaded = GraphSettings::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded = GraphSettings::from_ron("(layout: (arrow_size: 0.8))").unwrap();
        assert_eq!(loaded.layout.arrow_size, 0.8);
        assert_eq!(loaded.layout.node_radius, 0.5);
        assert_eq!(loaded.interaction, InteractionSettings::default());
    }

    #[test]
    fn test_invalid_radius_rejected() {
        let err = GraphSettings::from_ron("(layout: (node_radius: 0.0))").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "layout.node_radius", .. }));
    }
}

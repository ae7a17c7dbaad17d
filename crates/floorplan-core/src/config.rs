//! Editor tuning constants.

use serde::{Deserialize, Serialize};

/// View and interaction constants for a canvas session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Size of one grid cell in pixels at zoom 1.0.
    pub base_cell_size: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Multiplier applied per wheel notch when zooming in.
    pub zoom_step: f64,
    /// Wall stroke thickness in pixels at zoom 1.0.
    pub base_wall_thickness: f64,
    /// Hit tolerance as a multiple of the current wall thickness.
    pub hit_tolerance_factor: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            base_cell_size: 24.0,
            min_zoom: 0.25,
            max_zoom: 4.0,
            zoom_step: 1.1,
            base_wall_thickness: 6.0,
            hit_tolerance_factor: 1.5,
        }
    }
}

impl EditorConfig {
    /// Wall thickness in pixels at the given zoom.
    pub fn wall_thickness(&self, zoom: f64) -> f64 {
        self.base_wall_thickness * zoom
    }

    /// Maximum pointer-to-wall distance, in pixels, that still counts as a hit.
    pub fn hit_tolerance(&self, zoom: f64) -> f64 {
        self.wall_thickness(zoom) * self.hit_tolerance_factor
    }

    /// Parse from JSON; missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

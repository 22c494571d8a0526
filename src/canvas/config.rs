//! Configuration for the canvas engines

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a canvas configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read canvas config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse canvas config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables for grouping, alignment, stacks and auto-scroll.
///
/// Every field has a default; a TOML file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Grid unit final positions and sizes are rounded to
    pub grid_size: f64,

    /// Minimum widget size (width, height)
    pub min_size: (f64, f64),

    /// Height of a collapsed widget without its own override
    pub collapsed_height: f64,

    /// Maximum width and height difference for two widgets to stack
    pub size_similarity: f64,

    /// Edge inset applied before the stacking overlap test
    pub overlap_inset: f64,

    /// Maximum distance for an alignment snap
    pub snap_threshold: f64,

    /// Per-layer offset of ghost cards behind the active member
    pub ghost_offset: (f64, f64),

    /// Per-layer scale reduction of ghost cards
    pub ghost_scale_step: f64,

    /// Smallest ghost scale
    pub ghost_min_scale: f64,

    /// Opacity of the first ghost layer
    pub ghost_opacity_start: f64,

    /// Opacity reduction per further ghost layer
    pub ghost_opacity_step: f64,

    /// Smallest ghost opacity
    pub ghost_min_opacity: f64,

    /// Blur of the first ghost layer, in pixels
    pub ghost_blur_start: f64,

    /// Blur increase per further ghost layer
    pub ghost_blur_step: f64,

    /// Paint order of the first ghost layer
    pub ghost_base_z: i64,

    /// Horizontal gap between a stack and a member unlinked from it
    pub unlink_gap: f64,

    /// Distance from a viewport edge that triggers auto-scroll
    pub scroll_edge: f64,

    /// Pixels scrolled per animation frame
    pub scroll_speed: f64,

    /// Extra surface height added below the viewport while scrolling down
    pub scroll_growth: f64,

    /// Padding below the lowest widget when sizing the surface
    pub surface_padding: f64,

    /// Delay between hiding guides and dropping them
    #[serde(with = "millis")]
    pub guide_fade: Duration,

    /// Z boost applied to active cards while edit mode is on
    pub edit_z_boost: i64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_size: 10.0,
            min_size: (280.0, 180.0),
            collapsed_height: 60.0,
            size_similarity: 40.0,
            overlap_inset: 20.0,
            snap_threshold: 10.0,
            ghost_offset: (18.0, 14.0),
            ghost_scale_step: 0.02,
            ghost_min_scale: 0.9,
            ghost_opacity_start: 0.75,
            ghost_opacity_step: 0.15,
            ghost_min_opacity: 0.35,
            ghost_blur_start: 1.0,
            ghost_blur_step: 0.5,
            ghost_base_z: 10,
            unlink_gap: 260.0,
            scroll_edge: 90.0,
            scroll_speed: 22.0,
            scroll_growth: 500.0,
            surface_padding: 220.0,
            guide_fade: Duration::from_millis(150),
            edit_z_boost: 1000,
        }
    }
}

impl CanvasConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the grid unit
    pub fn with_grid_size(mut self, grid: f64) -> Self {
        self.grid_size = grid;
        self
    }

    /// Set the minimum widget size
    pub fn with_min_size(mut self, width: f64, height: f64) -> Self {
        self.min_size = (width, height);
        self
    }

    /// Set the alignment snap threshold
    pub fn with_snap_threshold(mut self, threshold: f64) -> Self {
        self.snap_threshold = threshold;
        self
    }

    /// Set the stacking size tolerance and overlap inset
    pub fn with_grouping(mut self, size_similarity: f64, overlap_inset: f64) -> Self {
        self.size_similarity = size_similarity;
        self.overlap_inset = overlap_inset;
        self
    }

    /// Set the auto-scroll edge zone and speed
    pub fn with_scroll(mut self, edge: f64, speed: f64) -> Self {
        self.scroll_edge = edge;
        self.scroll_speed = speed;
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CanvasConfig::default();
        assert_eq!(config.grid_size, 10.0);
        assert_eq!(config.min_size, (280.0, 180.0));
        assert_eq!(config.size_similarity, 40.0);
        assert_eq!(config.overlap_inset, 20.0);
        assert_eq!(config.snap_threshold, 10.0);
        assert_eq!(config.ghost_offset, (18.0, 14.0));
        assert_eq!(config.scroll_edge, 90.0);
        assert_eq!(config.scroll_speed, 22.0);
        assert_eq!(config.guide_fade, Duration::from_millis(150));
    }

    #[test]
    fn test_builder_pattern() {
        let config = CanvasConfig::new()
            .with_grid_size(20.0)
            .with_snap_threshold(6.0)
            .with_scroll(60.0, 10.0);

        assert_eq!(config.grid_size, 20.0);
        assert_eq!(config.snap_threshold, 6.0);
        assert_eq!(config.scroll_edge, 60.0);
        assert_eq!(config.scroll_speed, 10.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CanvasConfig::from_str(
            r#"
grid_size = 20.0
min_size = [300.0, 200.0]
guide_fade = 300
"#,
        )
        .expect("Should parse");
        assert_eq!(config.grid_size, 20.0);
        assert_eq!(config.min_size, (300.0, 200.0));
        assert_eq!(config.guide_fade, Duration::from_millis(300));
        assert_eq!(config.snap_threshold, 10.0);
    }

    #[test]
    fn test_invalid_toml_error() {
        assert!(CanvasConfig::from_str("grid_size = {{{").is_err());
    }
}

//! Widget Canvas - a free-form dashboard canvas engine
//!
//! Widgets sit on a 2D surface at arbitrary positions. Widgets of similar size
//! that overlap are grouped into stacks, drawn as one active card with faded
//! ghost cards underneath. In edit mode widgets can be dragged and resized
//! with grid snapping, edge alignment guides and auto-scroll.
//!
//! The engine owns no data. It reads widget records through a
//! [`LayoutStore`] and writes layout changes back through it.
//!
//! # Example
//!
//! ```rust
//! use widget_canvas::render;
//!
//! let snapshot = r#"{
//!     "instances": {
//!         "clock": {"instanceId": "clock", "type": "clock", "layout": {"x": 0, "y": 0, "w": 300, "h": 200}}
//!     },
//!     "layout": ["clock"]
//! }"#;
//! let svg = render(snapshot, "edit on\ndrag clock to 43, 58").unwrap();
//! assert!(svg.contains(r#"translate(40 60)"#));
//! ```

pub mod canvas;
pub mod error;
pub mod geometry;
pub mod model;
pub mod renderer;
pub mod script;
pub mod store;
pub mod theme;

pub use canvas::{Canvas, CanvasConfig, ConfigError, CycleDirection, Frame, PointerEvent, Stack};
pub use error::ScriptError;
pub use geometry::{snap, Point, Rect};
pub use model::{GroupId, Snapshot, SnapshotError, WidgetId, WidgetInstance};
pub use renderer::{render_svg, BodyRenderer, DefaultBodyRenderer, SvgConfig};
pub use script::{parse, replay, ReplayReport, Script};
pub use store::{LayoutPatch, LayoutStore, MemoryStore, ZOrder};

use thiserror::Error;
use tracing::{debug, info};

// Re-export Theme for public API
pub use theme::{Theme, ThemeError};

/// Errors that can occur while loading inputs or running a script
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("theme error: {0}")]
    Theme(#[from] ThemeError),

    /// Syntax errors in an interaction script
    #[error("script errors: {}", format_script_errors(.0))]
    Script(Vec<ScriptError>),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<Vec<ScriptError>> for CanvasError {
    fn from(errors: Vec<ScriptError>) -> Self {
        CanvasError::Script(errors)
    }
}

fn format_script_errors(errors: &[ScriptError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration for the complete pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Canvas behaviour
    pub canvas: CanvasConfig,
    /// SVG output configuration
    pub svg: SvgConfig,
    /// Palette for rendered output
    pub theme: Theme,
}

impl PipelineConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canvas configuration
    pub fn with_canvas(mut self, config: CanvasConfig) -> Self {
        self.canvas = config;
        self
    }

    /// Set the SVG configuration
    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    /// Set the theme
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

/// Load a snapshot into a canvas and replay `script` against it.
///
/// Unknown widgets and refused commands do not fail the run; they are
/// reported in the returned [`ReplayReport`].
pub fn run(
    snapshot: Snapshot,
    script: &str,
    config: &PipelineConfig,
) -> Result<(Canvas<MemoryStore>, ReplayReport), CanvasError> {
    let parsed = parse(script)?;
    debug!(commands = parsed.commands.len(), "script parsed");

    let mut canvas = Canvas::new(MemoryStore::new(snapshot), config.canvas.clone());
    let report = replay(&mut canvas, &parsed);
    info!(
        executed = report.executed,
        skipped = report.warnings.len(),
        "script replayed"
    );
    Ok((canvas, report))
}

/// Render the current frame of a canvas with the default body renderer
pub fn render_canvas<S: LayoutStore>(canvas: &Canvas<S>, config: &PipelineConfig) -> String {
    let body = DefaultBodyRenderer::new(config.svg.class_prefix.clone().unwrap_or_default());
    render_svg(
        &canvas.frame(),
        canvas.store(),
        &body,
        &config.svg,
        &config.theme,
    )
}

/// Replay a script over a JSON snapshot and render the result to SVG
pub fn render(snapshot_json: &str, script: &str) -> Result<String, CanvasError> {
    render_with_config(snapshot_json, script, &PipelineConfig::default())
}

/// Replay a script over a JSON snapshot and render the result with custom configuration
pub fn render_with_config(
    snapshot_json: &str,
    script: &str,
    config: &PipelineConfig,
) -> Result<String, CanvasError> {
    let snapshot = Snapshot::from_json(snapshot_json)?;
    let (canvas, _) = run(snapshot, script, config)?;
    Ok(render_canvas(&canvas, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CLOCKS: &str = r#"{
        "instances": {
            "a": {"instanceId": "a", "type": "clock", "layout": {"x": 0, "y": 0, "w": 360, "h": 260}},
            "b": {"instanceId": "b", "type": "clock", "layout": {"x": 10, "y": 10, "w": 360, "h": 260}}
        },
        "layout": ["a", "b"]
    }"#;

    #[test]
    fn test_render_empty_script() {
        let svg = render(TWO_CLOCKS, "").unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains(r#"id="card-a""#));
        assert!(svg.contains(r#"id="ghost-b""#));
    }

    #[test]
    fn test_render_after_cycle() {
        let svg = render(TWO_CLOCKS, "cycle a next").unwrap();
        assert!(svg.contains(r#"id="card-b""#));
        assert!(svg.contains(r#"id="ghost-a""#));
    }

    #[test]
    fn test_run_reports_unknown_widgets() {
        let snapshot = Snapshot::from_json(TWO_CLOCKS).unwrap();
        let (_, report) = run(snapshot, "select nope\ncycle a", &PipelineConfig::default()).unwrap();
        assert_eq!(report.unknown(), 1);
        assert_eq!(report.executed, 1);
    }

    #[test]
    fn test_script_syntax_error() {
        let result = render(TWO_CLOCKS, "grab a to 1, 2");
        assert!(matches!(result, Err(CanvasError::Script(_))));
    }

    #[test]
    fn test_bad_snapshot_error() {
        let result = render("{not json", "");
        assert!(matches!(result, Err(CanvasError::Snapshot(_))));
    }
}

//! Widget Canvas CLI
//!
//! Usage:
//!   widget-canvas [OPTIONS] <SNAPSHOT>
//!
//! Options:
//!   -c, --config <FILE>    Canvas configuration (TOML)
//!   -t, --theme <FILE>     Color palette for SVG output (TOML)
//!   -s, --script <FILE>    Interaction script to replay before output
//!   -f, --format <FORMAT>  svg, json, stacks or frame
//!   -d, --debug            Debug logging (overridden by RUST_LOG)
//!   -h, --help             Print help

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use widget_canvas::{
    parse, render_canvas, replay, Canvas, CanvasConfig, MemoryStore, PipelineConfig, Snapshot, Theme,
};

#[derive(Parser)]
#[command(name = "widget-canvas")]
#[command(about = "Free-form dashboard canvas: stacking, snapping and alignment guides")]
struct Cli {
    /// Dashboard snapshot (JSON, or TOML with a .toml extension)
    snapshot: PathBuf,

    /// Canvas configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Color palette for SVG output (TOML format)
    #[arg(short, long)]
    theme: Option<PathBuf>,

    /// Interaction script to replay against the canvas
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// What to print once the script has run
    #[arg(short, long, value_enum, default_value_t = Format::Svg)]
    format: Format,

    /// Debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Rendered frame as SVG
    Svg,
    /// Updated snapshot as JSON
    Json,
    /// One line per stack
    Stacks,
    /// Frame model as JSON
    Frame,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let snapshot = Snapshot::from_file(&cli.snapshot)
        .unwrap_or_else(|e| fail(&format!("Error loading snapshot '{}': {}", cli.snapshot.display(), e)));

    let canvas_config = match &cli.config {
        Some(path) => CanvasConfig::from_file(path)
            .unwrap_or_else(|e| fail(&format!("Error loading config '{}': {}", path.display(), e))),
        None => CanvasConfig::default(),
    };

    let theme = match &cli.theme {
        Some(path) => Theme::from_file(path)
            .unwrap_or_else(|e| fail(&format!("Error loading theme '{}': {}", path.display(), e)))
            .merged_with_default(),
        None => Theme::default(),
    };

    let config = PipelineConfig::new()
        .with_canvas(canvas_config.clone())
        .with_theme(theme);

    let mut canvas = Canvas::new(MemoryStore::new(snapshot), canvas_config);
    if let Some(path) = &cli.script {
        run_script(&mut canvas, path);
    }

    let output = match cli.format {
        Format::Svg => render_canvas(&canvas, &config),
        Format::Stacks => canvas.frame().summary(),
        Format::Frame => serde_json::to_string_pretty(&canvas.frame())
            .unwrap_or_else(|e| fail(&format!("Error serializing frame: {}", e))),
        Format::Json => canvas
            .into_store()
            .into_snapshot()
            .to_json()
            .unwrap_or_else(|e| fail(&format!("Error serializing snapshot: {}", e))),
    };
    println!("{}", output);
}

/// Parse and replay a script, printing reports for anything that went wrong
fn run_script(canvas: &mut Canvas<MemoryStore>, path: &Path) {
    let source = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(&format!("Error reading script '{}': {}", path.display(), e)));
    let filename = path.display().to_string();

    let script = match parse(&source) {
        Ok(script) => script,
        Err(errors) => {
            for error in &errors {
                eprintln!("{}", error.format(&source, &filename));
            }
            std::process::exit(1);
        }
    };

    let report = replay(canvas, &script);
    for warning in &report.warnings {
        eprintln!("{}", warning.format(&source, &filename));
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

//! Configuration for SVG rendering

/// Configuration options for SVG output
#[derive(Debug, Clone)]
pub struct SvgConfig {
    /// Padding around the viewBox
    pub viewbox_padding: f64,

    /// Whether to include XML declaration and standalone attributes
    pub standalone: bool,

    /// Whether to format output with indentation
    pub pretty_print: bool,

    /// Prefix for CSS class names and defs ids (e.g., "wc-" for "wc-card")
    pub class_prefix: Option<String>,

    /// Corner radius of cards and ghost layers
    pub corner_radius: f64,

    /// Height of the title strip at the top of every card
    pub header_height: f64,

    /// Width of a card thumbnail in the stack browse overlay
    pub thumbnail_width: f64,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            viewbox_padding: 20.0,
            standalone: true,
            pretty_print: true,
            class_prefix: Some("wc-".to_string()),
            corner_radius: 8.0,
            header_height: 36.0,
            thumbnail_width: 240.0,
        }
    }
}

impl SvgConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the viewBox padding
    pub fn with_viewbox_padding(mut self, padding: f64) -> Self {
        self.viewbox_padding = padding;
        self
    }

    /// Set whether output is standalone
    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set the CSS class prefix
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    /// Remove the CSS class prefix
    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    /// Set the card corner radius
    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    /// Set the title strip height; card bodies start below it
    pub fn with_header_height(mut self, height: f64) -> Self {
        self.header_height = height.max(0.0);
        self
    }

    /// Set the thumbnail width used by the browse overlay
    pub fn with_thumbnail_width(mut self, width: f64) -> Self {
        self.thumbnail_width = width.max(1.0);
        self
    }
}

//! Color palette for rendered canvases
//!
//! Themes map symbolic tokens (`card-fill`, `guide`, ...) to concrete colors.
//! The SVG renderer emits every token as a CSS custom property, so a host can
//! restyle a rendered frame without re-rendering it.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur when loading or parsing themes
#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("failed to read theme file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse theme TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A palette mapping symbolic tokens to concrete values
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Token name -> color (or font family for `font-family`)
    pub colors: HashMap<String, String>,
}

#[derive(Deserialize)]
struct TomlTheme {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    colors: HashMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

/// Light palette with a blue accent for guides and selection
const DEFAULT_PALETTE: &str = r##"
[colors]
# Surface
surface = "#f7f8fa"
grid = "#e3e6eb"

# Active cards
card-fill = "#ffffff"
card-stroke = "#d0d5dd"
card-title = "#1f2933"
card-body = "#52606d"

# Ghost layers behind the active card
ghost-fill = "#ffffff"
ghost-stroke = "#c4cad4"
ghost-title = "#9aa5b1"

# Interaction feedback
guide = "#2196f3"
drag-stroke = "#2196f3"
lock = "#e67e22"
badge-fill = "#1f2933"
badge-text = "#ffffff"

font-family = "system-ui, sans-serif"
"##;

impl Theme {
    /// Load a theme from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ThemeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a theme from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ThemeError> {
        let parsed: TomlTheme = toml::from_str(content)?;
        let (name, description) = match parsed.metadata {
            Some(meta) => (meta.name, meta.description),
            None => (None, None),
        };
        Ok(Self {
            name,
            description,
            colors: parsed.colors,
        })
    }

    /// Look up a token in this theme only
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.colors.get(token).map(String::as_str)
    }

    /// Resolve a token with fallbacks:
    /// 1. this theme
    /// 2. the default palette
    /// 3. a family default picked from the token prefix
    pub fn resolve_or_default(&self, token: &str) -> String {
        if let Some(color) = self.resolve(token) {
            return color.to_string();
        }

        let default = Self::default();
        if let Some(color) = default.resolve(token) {
            return color.to_string();
        }

        if token.starts_with("card") || token.starts_with("ghost") {
            return "#ffffff".to_string();
        }
        if token.starts_with("guide") || token.starts_with("drag") {
            return "#2196f3".to_string();
        }
        "#333333".to_string()
    }

    /// Theme with every default token overridden by `self` where present
    pub fn merged_with_default(&self) -> Self {
        let mut merged = Self::default();
        merged.name = self.name.clone();
        merged.description = self.description.clone();
        for (token, value) in &self.colors {
            merged.colors.insert(token.clone(), value.clone());
        }
        merged
    }
}

impl Default for Theme {
    fn default() -> Self {
        match Self::from_str(DEFAULT_PALETTE) {
            Ok(theme) => theme,
            Err(e) => {
                warn!(error = %e, "built-in palette failed to parse");
                Self {
                    name: None,
                    description: None,
                    colors: HashMap::new(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> Theme {
        Theme {
            name: None,
            description: None,
            colors: HashMap::new(),
        }
    }

    #[test]
    fn test_default_theme_has_canvas_tokens() {
        let theme = Theme::default();
        for token in ["surface", "grid", "card-fill", "ghost-fill", "guide", "lock"] {
            assert!(theme.colors.contains_key(token), "missing {}", token);
        }
        assert_eq!(theme.resolve("guide"), Some("#2196f3"));
    }

    #[test]
    fn test_resolve_missing_token() {
        assert_eq!(Theme::default().resolve("nonexistent"), None);
    }

    #[test]
    fn test_resolve_or_default_falls_back_to_palette() {
        assert_eq!(empty().resolve_or_default("card-title"), "#1f2933");
    }

    #[test]
    fn test_resolve_or_default_family_fallback() {
        assert_eq!(empty().resolve_or_default("card-shadow"), "#ffffff");
        assert_eq!(empty().resolve_or_default("guide-dim"), "#2196f3");
        assert_eq!(empty().resolve_or_default("whatever"), "#333333");
    }

    #[test]
    fn test_parse_toml_with_metadata() {
        let toml_str = r##"
[metadata]
name = "Night"
description = "Dark surface"

[colors]
surface = "#101418"
"##;
        let theme = Theme::from_str(toml_str).expect("Should parse");
        assert_eq!(theme.name, Some("Night".to_string()));
        assert_eq!(theme.description, Some("Dark surface".to_string()));
        assert_eq!(theme.resolve("surface"), Some("#101418"));
    }

    #[test]
    fn test_merge_keeps_overrides() {
        let theme = Theme::from_str("[colors]\nguide = \"#ff00ff\"\n").expect("Should parse");
        let merged = theme.merged_with_default();
        assert_eq!(merged.resolve("guide"), Some("#ff00ff"));
        assert_eq!(merged.resolve("card-fill"), Some("#ffffff"));
    }

    #[test]
    fn test_invalid_toml_error() {
        assert!(Theme::from_str("this is not valid toml {{{{").is_err());
    }
}

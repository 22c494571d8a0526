//! Widget body rendering
//!
//! The canvas does not know what a widget shows. Hosts plug in a
//! [`BodyRenderer`] that turns an instance into an SVG fragment, drawn in the
//! card's coordinate space below the title strip.

use crate::model::WidgetInstance;

use super::svg::escape_xml;

/// Produces the SVG fragment for a widget's content
pub trait BodyRenderer {
    /// Fragment for `instance`, positioned relative to the body's top-left.
    ///
    /// The fragment is inserted verbatim; implementations escape any text
    /// they take from the instance.
    fn render_body(&self, instance: &WidgetInstance) -> String;
}

impl<F> BodyRenderer for F
where
    F: Fn(&WidgetInstance) -> String,
{
    fn render_body(&self, instance: &WidgetInstance) -> String {
        self(instance)
    }
}

/// Shows the widget's type tag
#[derive(Debug, Clone, Default)]
pub struct DefaultBodyRenderer {
    /// Prefix for CSS class names, usually the renderer's
    pub class_prefix: String,
}

impl DefaultBodyRenderer {
    pub fn new(class_prefix: impl Into<String>) -> Self {
        Self {
            class_prefix: class_prefix.into(),
        }
    }
}

impl BodyRenderer for DefaultBodyRenderer {
    fn render_body(&self, instance: &WidgetInstance) -> String {
        format!(
            r#"<text class="{}body-text" x="12" y="20">{}</text>"#,
            self.class_prefix,
            escape_xml(&instance.kind)
        )
    }
}

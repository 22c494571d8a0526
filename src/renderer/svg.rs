//! SVG generation from canvas frames

use tracing::debug;

use crate::canvas::{Frame, GhostLayer, StackView};
use crate::geometry::Rect;
use crate::store::LayoutStore;
use crate::theme::Theme;

use super::{BodyRenderer, SvgConfig};

/// Static rules mapping classes onto theme tokens
const BASE_RULES: &[&str] = &[
    ".{p}surface { fill: var(--surface); }",
    ".{p}grid-line { fill: none; stroke: var(--grid); stroke-width: 1; }",
    ".{p}card { fill: var(--card-fill); stroke: var(--card-stroke); }",
    ".{p}ghost { fill: var(--ghost-fill); stroke: var(--ghost-stroke); }",
    ".{p}title { fill: var(--card-title); font-size: 14px; font-weight: 600; }",
    ".{p}ghost-title { fill: var(--ghost-title); font-size: 14px; }",
    ".{p}body-text { fill: var(--card-body); font-size: 12px; }",
    ".{p}dragging .{p}card { stroke: var(--drag-stroke); stroke-width: 2; }",
    ".{p}guide { stroke: var(--guide); stroke-width: 1; stroke-dasharray: 4 4; }",
    ".{p}lock { fill: var(--lock); }",
    ".{p}badge { fill: var(--badge-fill); }",
    ".{p}badge-text { fill: var(--badge-text); font-size: 11px; }",
    ".{p}backdrop { fill: var(--card-title); fill-opacity: 0.35; }",
    "text { font-family: var(--font-family); }",
];

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    defs: Vec<String>,
    styles: Vec<String>,
    elements: Vec<String>,
    /// Drawn above every card (guides, browse overlay)
    overlay: Vec<String>,
    /// Blur amounts that already have a filter, by filter index
    blur_filters: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            defs: vec![],
            styles: vec![],
            elements: vec![],
            overlay: vec![],
            blur_filters: vec![],
            indent: 1,
        }
    }

    /// Add CSS custom properties from a theme, followed by the class rules
    pub fn add_theme(&mut self, theme: &Theme) {
        let mut tokens: Vec<(&String, &String)> = theme.colors.iter().collect();
        tokens.sort();

        let mut css = String::from(":root {\n");
        for (token, value) in tokens {
            css.push_str(&format!("      --{}: {};\n", token, value));
        }
        css.push_str("    }");
        self.styles.push(css);

        let prefix = self.prefix();
        for rule in BASE_RULES {
            self.styles.push(rule.replace("{p}", &prefix));
        }
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn class_list(&self, classes: &[&str]) -> String {
        let prefix = self.prefix();
        classes
            .iter()
            .map(|class| format!("{}{}", prefix, class))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add the grid pattern drawn behind cards in edit mode
    pub fn add_grid_pattern(&mut self, size: f64) {
        let prefix = self.prefix();
        self.defs.push(format!(
            r#"<pattern id="{prefix}grid" width="{size}" height="{size}" patternUnits="userSpaceOnUse"><path class="{prefix}grid-line" d="M {size} 0 L 0 0 0 {size}"/></pattern>"#
        ));
    }

    /// Id of a Gaussian blur filter with the given deviation, defined on first use
    pub fn blur_filter(&mut self, std_dev: f64) -> String {
        let prefix = self.prefix();
        let key = std_dev.to_string();
        let index = match self.blur_filters.iter().position(|k| *k == key) {
            Some(index) => index,
            None => {
                self.defs.push(format!(
                    r#"<filter id="{prefix}blur-{}"><feGaussianBlur stdDeviation="{}"/></filter>"#,
                    self.blur_filters.len(),
                    key
                ));
                self.blur_filters.push(key);
                self.blur_filters.len() - 1
            }
        };
        format!("{}blur-{}", prefix, index)
    }

    /// Add a rectangle element
    pub fn add_rect(&mut self, id: Option<&str>, rect: Rect, classes: &[&str], attrs: &str) {
        let id_attr = id
            .map(|i| format!(r#" id="{}""#, escape_xml(i)))
            .unwrap_or_default();
        self.elements.push(format!(
            r#"{}<rect{} class="{}" x="{}" y="{}" width="{}" height="{}"{}/>"#,
            self.indent_str(),
            id_attr,
            self.class_list(classes),
            rect.x,
            rect.y,
            rect.w,
            rect.h,
            attrs
        ));
    }

    /// Add a text element
    pub fn add_text(&mut self, text: &str, x: f64, y: f64, classes: &[&str], attrs: &str) {
        self.elements.push(format!(
            r#"{}<text class="{}" x="{}" y="{}"{}>{}</text>"#,
            self.indent_str(),
            self.class_list(classes),
            x,
            y,
            attrs,
            escape_xml(text)
        ));
    }

    /// Add a pre-rendered fragment verbatim
    pub fn add_fragment(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        self.elements
            .push(format!("{}{}", self.indent_str(), fragment));
    }

    /// Add a group element with optional ID, classes and extra attributes
    pub fn start_group(&mut self, id: Option<&str>, classes: &[&str], attrs: &str) {
        let id_attr = id
            .map(|i| format!(r#" id="{}""#, escape_xml(i)))
            .unwrap_or_default();
        let class_attr = if classes.is_empty() {
            String::new()
        } else {
            format!(r#" class="{}""#, self.class_list(classes))
        };

        self.elements.push(format!(
            "{}<g{}{}{}>",
            self.indent_str(),
            id_attr,
            class_attr,
            attrs
        ));
        self.indent += 1;
    }

    /// Close a group element
    pub fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.elements.push(format!("{}</g>", self.indent_str()));
    }

    /// Add a line to the overlay
    pub fn add_overlay_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, classes: &[&str]) {
        self.overlay.push(format!(
            r#"{}<line class="{}" x1="{}" y1="{}" x2="{}" y2="{}"/>"#,
            self.indent_str(),
            self.class_list(classes),
            x1,
            y1,
            x2,
            y2
        ));
    }

    /// Move everything added since `mark` into the overlay
    pub fn lift_into_overlay(&mut self, mark: usize) {
        let lifted: Vec<String> = self.elements.drain(mark..).collect();
        self.overlay.extend(lifted);
    }

    /// Number of elements added so far
    pub fn mark(&self) -> usize {
        self.elements.len()
    }

    /// Build the final SVG string
    pub fn build(self, viewbox: Rect) -> String {
        let padding = self.config.viewbox_padding;
        let vb_x = viewbox.x - padding;
        let vb_y = viewbox.y - padding;
        let vb_w = viewbox.w + 2.0 * padding;
        let vb_h = viewbox.h + 2.0 * padding;

        let nl = self.newline();

        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            vb_x, vb_y, vb_w, vb_h
        ));
        svg.push_str(nl);

        if !self.styles.is_empty() {
            svg.push_str("  <style>");
            svg.push_str(nl);
            for style in &self.styles {
                svg.push_str("    ");
                svg.push_str(style);
                svg.push_str(nl);
            }
            svg.push_str("  </style>");
            svg.push_str(nl);
        }

        if !self.defs.is_empty() {
            svg.push_str("  <defs>");
            svg.push_str(nl);
            for def in &self.defs {
                svg.push_str("    ");
                svg.push_str(def);
                svg.push_str(nl);
            }
            svg.push_str("  </defs>");
            svg.push_str(nl);
        }

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        for elem in &self.overlay {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");

        svg
    }
}

/// Render a frame to an SVG string.
///
/// Stacks are painted in frame order. Within a stack the ghost layers go
/// first (lowest paint order at the bottom), then the active card. Guides and
/// the browse overlay go on top of everything.
pub fn render_svg(
    frame: &Frame,
    store: &impl LayoutStore,
    body: &dyn BodyRenderer,
    config: &SvgConfig,
    theme: &Theme,
) -> String {
    let mut builder = SvgBuilder::new(config.clone());
    builder.add_theme(theme);

    let extent = frame_extent(frame);
    builder.add_rect(None, extent, &["surface"], "");

    if frame.edit_mode && frame.grid_size > 0.0 {
        builder.add_grid_pattern(frame.grid_size);
        let fill = format!(r#" fill="url(#{}grid)""#, config.class_prefix.as_deref().unwrap_or(""));
        builder.add_rect(None, extent, &["grid"], &fill);
    }

    for view in &frame.stacks {
        render_stack(view, store, body, config, &mut builder);
    }

    if frame.guides.visible {
        for x in &frame.guides.vertical {
            builder.add_overlay_line(*x, extent.top(), *x, extent.bottom(), &["guide"]);
        }
        for y in &frame.guides.horizontal {
            builder.add_overlay_line(extent.left(), *y, extent.right(), *y, &["guide"]);
        }
    }

    if let Some(view) = frame.expanded.as_ref().and_then(|group| frame.stack(group)) {
        render_browse(view, frame, extent, store, config, &mut builder);
    }

    builder.build(extent)
}

/// Area covered by the surface and everything drawn on it
fn frame_extent(frame: &Frame) -> Rect {
    let (right, bottom) = frame
        .stacks
        .iter()
        .flat_map(|view| {
            std::iter::once(view.rect).chain(view.layers.iter().map(|layer| layer.rect))
        })
        .fold(
            (frame.surface.width, frame.surface.height),
            |(right, bottom), rect| (right.max(rect.right()), bottom.max(rect.bottom())),
        );
    Rect::new(0.0, 0.0, right, bottom)
}

fn render_stack(
    view: &StackView,
    store: &impl LayoutStore,
    body: &dyn BodyRenderer,
    config: &SvgConfig,
    builder: &mut SvgBuilder,
) {
    let Some(active) = store.instance(&view.active) else {
        debug!(id = %view.active, "active member missing from store, stack not drawn");
        return;
    };

    let mut classes = vec!["stack"];
    if view.locked {
        classes.push("locked");
    }
    if view.dragging {
        classes.push("dragging");
    }
    let attrs = format!(
        r#" data-count="{}" data-direction="{}""#,
        view.count(),
        view.direction
    );
    builder.start_group(Some(&format!("stack-{}", view.group_id)), &classes, &attrs);

    let mut layers: Vec<&GhostLayer> = view.layers.iter().collect();
    layers.sort_by_key(|layer| layer.z);
    for layer in layers {
        render_ghost(layer, store, config, builder);
    }

    let rect = view.rect;
    let transform = format!(r#" transform="translate({} {})""#, rect.x, rect.y);
    builder.start_group(Some(&format!("card-{}", view.active)), &["card-group"], &transform);
    builder.add_rect(
        None,
        Rect::new(0.0, 0.0, rect.w, rect.h),
        &["card"],
        &corner_attrs(config),
    );
    builder.add_text(active.display_title(), 12.0, 23.0, &["title"], "");

    if !active.is_collapsed {
        let fragment = body.render_body(active);
        if !fragment.is_empty() {
            let offset = format!(r#" transform="translate(0 {})""#, config.header_height);
            builder.start_group(None, &["body"], &offset);
            builder.add_fragment(&fragment);
            builder.end_group();
        }
    }

    let mut badge_right = rect.w - 8.0;
    if view.is_stacked() {
        let position = view
            .members
            .iter()
            .position(|id| *id == view.active)
            .map(|i| i + 1)
            .unwrap_or(1);
        builder.add_rect(
            None,
            Rect::new(badge_right - 36.0, 8.0, 36.0, 20.0),
            &["badge"],
            r#" rx="10""#,
        );
        builder.add_text(
            &format!("{}/{}", position, view.count()),
            badge_right - 18.0,
            22.0,
            &["badge-text"],
            r#" text-anchor="middle""#,
        );
        badge_right -= 44.0;
    }
    if view.locked {
        builder.add_rect(
            None,
            Rect::new(badge_right - 16.0, 10.0, 16.0, 16.0),
            &["lock"],
            r#" rx="3""#,
        );
    }

    builder.end_group();
    builder.end_group();
}

fn render_ghost(layer: &GhostLayer, store: &impl LayoutStore, config: &SvgConfig, builder: &mut SvgBuilder) {
    let mut attrs = format!(
        r#" transform="translate({} {}) scale({})" opacity="{}""#,
        layer.rect.x, layer.rect.y, layer.scale, layer.opacity
    );
    if layer.blur > 0.0 {
        let filter = builder.blur_filter(layer.blur);
        attrs.push_str(&format!(r#" filter="url(#{})""#, filter));
    }

    builder.start_group(Some(&format!("ghost-{}", layer.id)), &["ghost-layer"], &attrs);
    builder.add_rect(
        None,
        Rect::new(0.0, 0.0, layer.rect.w, layer.rect.h),
        &["ghost"],
        &corner_attrs(config),
    );
    if let Some(inst) = store.instance(&layer.id) {
        builder.add_text(inst.display_title(), 12.0, 23.0, &["ghost-title"], "");
    }
    builder.end_group();
}

/// Thumbnails of every member in a row across the top of the viewport
fn render_browse(
    view: &StackView,
    frame: &Frame,
    extent: Rect,
    store: &impl LayoutStore,
    config: &SvgConfig,
    builder: &mut SvgBuilder,
) {
    let mark = builder.mark();
    builder.start_group(Some(&format!("browse-{}", view.group_id)), &["browse"], "");
    builder.add_rect(None, extent, &["backdrop"], "");

    let gap = 24.0;
    let thumb_w = config.thumbnail_width;
    for (i, id) in view.members.iter().enumerate() {
        let (Some(inst), Some(rect)) = (store.instance(id), store.layout_of(id)) else {
            continue;
        };
        let scale = if rect.w > 0.0 { thumb_w / rect.w } else { 1.0 };
        let x = gap + i as f64 * (thumb_w + gap);
        let y = frame.scroll_top + gap;
        let mut classes = vec!["thumbnail"];
        if *id == view.active {
            classes.push("active");
        }
        let transform = format!(r#" transform="translate({} {}) scale({})""#, x, y, scale);
        builder.start_group(Some(&format!("thumb-{}", id)), &classes, &transform);
        builder.add_rect(None, Rect::new(0.0, 0.0, rect.w, rect.h), &["card"], &corner_attrs(config));
        builder.add_text(inst.display_title(), 12.0, 23.0, &["title"], "");
        builder.end_group();
    }

    builder.end_group();
    builder.lift_into_overlay(mark);
}

fn corner_attrs(config: &SvgConfig) -> String {
    if config.corner_radius > 0.0 {
        format!(r#" rx="{}""#, config.corner_radius)
    } else {
        String::new()
    }
}

/// Escape special XML characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, CanvasConfig};
    use crate::model::{Snapshot, WidgetInstance};
    use crate::renderer::DefaultBodyRenderer;
    use crate::store::MemoryStore;

    fn render(canvas: &Canvas<MemoryStore>) -> String {
        render_svg(
            &canvas.frame(),
            canvas.store(),
            &DefaultBodyRenderer::new("wc-"),
            &SvgConfig::default(),
            &Theme::default(),
        )
    }

    fn canvas(instances: Vec<WidgetInstance>) -> Canvas<MemoryStore> {
        let mut snapshot = Snapshot::new();
        for inst in instances {
            snapshot.push(inst);
        }
        Canvas::new(MemoryStore::new(snapshot), CanvasConfig::default())
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn test_single_card_has_title_and_body() {
        let canvas = canvas(vec![
            WidgetInstance::new("c1", "clock", Rect::new(20.0, 20.0, 300.0, 200.0)).with_title("Clock")
        ]);
        let svg = render(&canvas);
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"<g id="card-c1" class="wc-card-group" transform="translate(20 20)">"#));
        assert!(svg.contains(r#">Clock</text>"#));
        assert!(svg.contains(r#"<text class="wc-body-text" x="12" y="20">clock</text>"#));
        assert!(!svg.contains("wc-badge"));
    }

    #[test]
    fn test_grid_only_in_edit_mode() {
        let mut canvas = canvas(vec![WidgetInstance::new("c1", "clock", Rect::new(0.0, 0.0, 300.0, 200.0))]);
        assert!(!render(&canvas).contains(r#"<pattern id="wc-grid""#));
        canvas.set_edit_mode(true);
        let svg = render(&canvas);
        assert!(svg.contains(r#"<pattern id="wc-grid" width="10" height="10""#));
        assert!(svg.contains(r#"fill="url(#wc-grid)""#));
    }

    #[test]
    fn test_stack_draws_ghosts_and_badge() {
        let canvas = canvas(vec![
            WidgetInstance::new("a", "todo", Rect::new(0.0, 0.0, 360.0, 260.0)),
            WidgetInstance::new("b", "todo", Rect::new(10.0, 10.0, 360.0, 260.0)),
        ]);
        let svg = render(&canvas);
        assert!(svg.contains(r#"<g id="ghost-b" class="wc-ghost-layer" transform="translate(18 14) scale("#));
        assert!(svg.contains(r#"opacity="0.75" filter="url(#wc-blur-0)">"#));
        assert!(svg.contains(r#"<filter id="wc-blur-0"><feGaussianBlur stdDeviation="1"/></filter>"#));
        assert!(svg.contains(">1/2</text>"));
        let ghost = svg.find("ghost-b").expect("ghost drawn");
        let card = svg.find("card-a").expect("card drawn");
        assert!(ghost < card, "ghost must be painted below the active card");
    }

    #[test]
    fn test_card_geometry_follows_config() {
        let mut canvas = canvas(vec![
            WidgetInstance::new("a", "todo", Rect::new(0.0, 0.0, 360.0, 260.0)),
            WidgetInstance::new("b", "todo", Rect::new(10.0, 10.0, 360.0, 260.0)),
        ]);
        assert!(canvas.expand_stack(&crate::model::GroupId::new("a|b")));
        let svg = render_svg(
            &canvas.frame(),
            canvas.store(),
            &DefaultBodyRenderer::new("wc-"),
            &SvgConfig::new().with_header_height(48.0).with_thumbnail_width(180.0),
            &Theme::default(),
        );
        assert!(svg.contains(r#"<g class="wc-body" transform="translate(0 48)">"#));
        assert!(svg.contains(r#"<g id="thumb-a" class="wc-thumbnail wc-active" transform="translate(24 24) scale(0.5)">"#));
        assert!(svg.contains(r#"<g id="thumb-b" class="wc-thumbnail" transform="translate(228 24) scale(0.5)">"#));
    }

    #[test]
    fn test_collapsed_card_skips_body() {
        let mut inst = WidgetInstance::new("c1", "clock", Rect::new(0.0, 0.0, 300.0, 60.0));
        inst.is_collapsed = true;
        let svg = render(&canvas(vec![inst]));
        assert!(!svg.contains("wc-body-text"));
    }

    #[test]
    fn test_theme_tokens_are_sorted() {
        let svg = render(&canvas(vec![]));
        let badge = svg.find("--badge-fill").expect("token emitted");
        let surface = svg.find("--surface").expect("token emitted");
        assert!(badge < surface);
    }

    #[test]
    fn test_compact_output() {
        let canvas = canvas(vec![WidgetInstance::new("c1", "clock", Rect::new(0.0, 0.0, 300.0, 200.0))]);
        let svg = render_svg(
            &canvas.frame(),
            canvas.store(),
            &DefaultBodyRenderer::default(),
            &SvgConfig::new().with_pretty_print(false).with_standalone(false),
            &Theme::default(),
        );
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"</style><rect class="wc-surface""#));
    }
}

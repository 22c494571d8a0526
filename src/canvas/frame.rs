//! A snapshot of everything the canvas would draw
//!
//! Frames are plain data. Renderers (the SVG renderer in this crate, or a
//! host UI) read them without touching the canvas state.

use serde::Serialize;

use crate::geometry::Rect;
use crate::model::{GroupId, WidgetId};
use crate::store::LayoutStore;

use super::stack::GhostLayer;

/// One stack as it appears on screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackView {
    pub group_id: GroupId,
    pub active: WidgetId,
    /// Member whose position the stack is shown at
    pub anchor: WidgetId,
    /// Where the active card is drawn, including any live drag or resize
    pub rect: Rect,
    pub members: Vec<WidgetId>,
    pub layers: Vec<GhostLayer>,
    pub locked: bool,
    /// Slide direction of the last cycle
    pub direction: i8,
    /// Paint order of the active card
    pub z: i64,
    /// Whether a drag or resize is manipulating this stack
    pub dragging: bool,
}

impl StackView {
    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn is_stacked(&self) -> bool {
        self.members.len() > 1
    }
}

/// Guide lines in a frame
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GuideLines {
    pub vertical: Vec<f64>,
    pub horizontal: Vec<f64>,
    pub visible: bool,
}

/// Size of the scrollable surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

/// Everything needed to draw the canvas once
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Stacks in paint order, bottom first
    pub stacks: Vec<StackView>,
    pub guides: GuideLines,
    pub surface: Surface,
    pub scroll_top: f64,
    pub edit_mode: bool,
    /// Grid unit drawn behind the cards in edit mode
    pub grid_size: f64,
    /// Stack whose browse view is open
    pub expanded: Option<GroupId>,
}

impl Frame {
    pub fn stack(&self, group: &GroupId) -> Option<&StackView> {
        self.stacks.iter().find(|view| &view.group_id == group)
    }

    /// View of the stack containing a widget
    pub fn stack_containing(&self, id: &WidgetId) -> Option<&StackView> {
        self.stacks.iter().find(|view| view.members.contains(id))
    }

    /// One line per stack in paint order, for logs and the CLI
    pub fn summary(&self) -> String {
        self.stacks
            .iter()
            .map(|view| {
                let members = view
                    .members
                    .iter()
                    .map(WidgetId::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut line = format!(
                    "{} active={} at {},{} {}x{} [{}]",
                    view.group_id,
                    view.active,
                    view.rect.x,
                    view.rect.y,
                    view.rect.w,
                    view.rect.h,
                    members
                );
                if view.locked {
                    line.push_str(" locked");
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Right-most and bottom-most extent of every visible widget
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CanvasBounds {
    pub max_right: f64,
    pub max_bottom: f64,
}

impl CanvasBounds {
    pub fn of(store: &impl LayoutStore) -> Self {
        store
            .visible_instances()
            .iter()
            .filter_map(|inst| inst.layout)
            .fold(Self::default(), |bounds, rect| bounds.include(&rect))
    }

    pub fn include(self, rect: &Rect) -> Self {
        Self {
            max_right: self.max_right.max(rect.right()),
            max_bottom: self.max_bottom.max(rect.bottom()),
        }
    }

    /// Surface height needed to show everything with `padding` below it
    pub fn surface_height(&self, viewport_height: f64, padding: f64) -> f64 {
        viewport_height.max(self.max_bottom + padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Snapshot, WidgetInstance};
    use crate::store::MemoryStore;

    #[test]
    fn test_bounds_cover_visible_widgets() {
        let store = MemoryStore::new(
            Snapshot::new()
                .with_instance(WidgetInstance::new("a", "todo", Rect::new(20.0, 20.0, 360.0, 260.0)))
                .with_instance(WidgetInstance::new("b", "todo", Rect::new(400.0, 300.0, 300.0, 200.0)))
                .with_instance(WidgetInstance::new("c", "todo", Rect::new(0.0, 2000.0, 300.0, 200.0)).disabled()),
        );
        let bounds = CanvasBounds::of(&store);
        assert_eq!(bounds.max_right, 700.0);
        assert_eq!(bounds.max_bottom, 500.0);
        assert_eq!(bounds.surface_height(800.0, 220.0), 800.0);
        assert_eq!(bounds.surface_height(400.0, 220.0), 720.0);
    }

    #[test]
    fn test_summary_lists_stacks_in_paint_order() {
        let view = |group: &str, active: &str, members: &[&str], locked: bool| StackView {
            group_id: GroupId::new(group),
            active: WidgetId::new(active),
            anchor: WidgetId::new(active),
            rect: Rect::new(20.0, 20.0, 360.0, 260.0),
            members: members.iter().map(|m| WidgetId::new(*m)).collect(),
            layers: Vec::new(),
            locked,
            direction: 1,
            z: 0,
            dragging: false,
        };
        let frame = Frame {
            stacks: vec![
                view("a|b", "b", &["a", "b"], true),
                view("standalone:c", "c", &["c"], false),
            ],
            guides: GuideLines::default(),
            surface: Surface::default(),
            scroll_top: 0.0,
            edit_mode: false,
            grid_size: 10.0,
            expanded: None,
        };
        assert_eq!(
            frame.summary(),
            "a|b active=b at 20,20 360x260 [a, b] locked\nstandalone:c active=c at 20,20 360x260 [c]"
        );
    }
}

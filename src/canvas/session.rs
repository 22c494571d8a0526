//! Drag and resize sessions
//!
//! A session lives from pointer-down to pointer-up. While it runs the only
//! output is a live preview rectangle plus guide lines; the store is written
//! once, when the session finishes.

use tracing::trace;

use crate::geometry::{snap, Point, Rect};
use crate::model::{GroupId, WidgetId};
use crate::store::LayoutPatch;

use super::alignment::{compute_drag_alignment, compute_resize_alignment, DragAlignment, ResizeAlignment};
use super::config::CanvasConfig;

/// Pointer input fed to the canvas.
///
/// Pointer coordinates are relative to the viewport; the canvas adds the
/// scroll offset to get surface coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    DragStart { id: WidgetId, pointer: Point },
    DragMove { pointer: Point },
    DragEnd { pointer: Point },
    ResizeStart { id: WidgetId, pointer: Point },
    ResizeMove { width: f64, height: f64, pointer: Point },
    ResizeEnd { width: f64, height: f64, pointer: Point },
    Cancel,
}

impl PointerEvent {
    /// Viewport pointer position carried by the event
    pub fn pointer(&self) -> Option<Point> {
        match self {
            PointerEvent::DragStart { pointer, .. }
            | PointerEvent::DragMove { pointer }
            | PointerEvent::DragEnd { pointer }
            | PointerEvent::ResizeStart { pointer, .. }
            | PointerEvent::ResizeMove { pointer, .. }
            | PointerEvent::ResizeEnd { pointer, .. } => Some(*pointer),
            PointerEvent::Cancel => None,
        }
    }
}

/// Interaction state machine
#[derive(Debug, Clone, Default)]
pub enum Session {
    #[default]
    Idle,
    Dragging(DragSession),
    Resizing(ResizeSession),
}

impl Session {
    pub fn is_idle(&self) -> bool {
        matches!(self, Session::Idle)
    }

    /// Group being manipulated
    pub fn group(&self) -> Option<&GroupId> {
        match self {
            Session::Idle => None,
            Session::Dragging(drag) => Some(&drag.group),
            Session::Resizing(resize) => Some(&resize.group),
        }
    }

    /// Live rectangle of the manipulated widget
    pub fn preview(&self) -> Option<Rect> {
        match self {
            Session::Idle => None,
            Session::Dragging(drag) => Some(drag.preview),
            Session::Resizing(resize) => Some(resize.preview),
        }
    }

    /// Last viewport pointer seen by the running session
    pub fn last_pointer(&self) -> Option<Point> {
        match self {
            Session::Idle => None,
            Session::Dragging(drag) => Some(drag.last_pointer),
            Session::Resizing(resize) => Some(resize.last_pointer),
        }
    }
}

/// State of a drag in progress
#[derive(Debug, Clone)]
pub struct DragSession {
    pub id: WidgetId,
    pub group: GroupId,
    /// Displayed rectangle when the drag started
    pub origin: Rect,
    /// Pointer position relative to the rectangle's top-left, surface space
    offset: Point,
    /// Other stack members and their stored rectangles
    members: Vec<(WidgetId, Rect)>,
    /// Snap targets outside the dragged stack
    targets: Vec<Rect>,
    pub preview: Rect,
    pub last_pointer: Point,
}

impl DragSession {
    pub fn begin(
        id: WidgetId,
        group: GroupId,
        origin: Rect,
        pointer: Point,
        surface_pointer: Point,
        members: Vec<(WidgetId, Rect)>,
        targets: Vec<Rect>,
    ) -> Self {
        trace!(%id, %group, ?origin, "drag start");
        Self {
            id,
            group,
            origin,
            offset: Point::new(surface_pointer.x - origin.x, surface_pointer.y - origin.y),
            members,
            targets,
            preview: origin,
            last_pointer: pointer,
        }
    }

    /// Position the rectangle under the pointer, clamped to the surface
    fn raw_rect(&self, surface_pointer: Point, surface_width: f64) -> Rect {
        let mut x = surface_pointer.x - self.offset.x;
        if surface_width > 0.0 {
            x = x.min(surface_width - self.origin.w);
        }
        let y = surface_pointer.y - self.offset.y;
        self.origin.with_origin(x.max(0.0), y.max(0.0))
    }

    /// Update the live preview; returns the alignment used for it
    pub fn moved(
        &mut self,
        pointer: Point,
        surface_pointer: Point,
        surface_width: f64,
        threshold: f64,
    ) -> DragAlignment {
        let raw = self.raw_rect(surface_pointer, surface_width);
        let alignment = compute_drag_alignment(&raw, &self.targets, threshold);
        self.preview = raw.with_origin(alignment.snapped_x, alignment.snapped_y);
        self.last_pointer = pointer;
        alignment
    }

    /// Final writes: the dragged widget lands on the grid, the rest of its
    /// stack follows by the same delta without being re-snapped.
    pub fn finish(
        &mut self,
        pointer: Point,
        surface_pointer: Point,
        surface_width: f64,
        config: &CanvasConfig,
    ) -> Vec<(WidgetId, LayoutPatch)> {
        self.moved(pointer, surface_pointer, surface_width, config.snap_threshold);

        let final_x = snap(self.preview.x, config.grid_size).max(0.0);
        let final_y = snap(self.preview.y, config.grid_size).max(0.0);
        let dx = final_x - self.origin.x;
        let dy = final_y - self.origin.y;
        trace!(id = %self.id, final_x, final_y, dx, dy, "drag end");

        let mut writes: Vec<(WidgetId, LayoutPatch)> = self
            .members
            .iter()
            .map(|(id, rect)| {
                let moved = rect.translate(dx, dy).clamp_non_negative();
                (id.clone(), LayoutPatch::position(moved.x, moved.y))
            })
            .collect();
        writes.push((self.id.clone(), LayoutPatch::position(final_x, final_y)));
        writes
    }
}

/// State of a resize in progress
#[derive(Debug, Clone)]
pub struct ResizeSession {
    pub id: WidgetId,
    pub group: GroupId,
    pub origin: Rect,
    targets: Vec<Rect>,
    pub preview: Rect,
    pub last_pointer: Point,
}

impl ResizeSession {
    pub fn begin(id: WidgetId, group: GroupId, origin: Rect, pointer: Point, targets: Vec<Rect>) -> Self {
        trace!(%id, %group, ?origin, "resize start");
        Self {
            id,
            group,
            origin,
            targets,
            preview: origin,
            last_pointer: pointer,
        }
    }

    pub fn moved(
        &mut self,
        width: f64,
        height: f64,
        pointer: Point,
        config: &CanvasConfig,
    ) -> ResizeAlignment {
        let (min_w, min_h) = config.min_size;
        let raw = self.origin.with_size(width.max(min_w), height.max(min_h));
        let alignment =
            compute_resize_alignment(&raw, &self.targets, config.snap_threshold, config.min_size);
        self.preview = raw.with_size(alignment.snapped_w, alignment.snapped_h);
        self.last_pointer = pointer;
        alignment
    }

    /// Final write: position and size land on the grid together
    pub fn finish(
        &mut self,
        width: f64,
        height: f64,
        pointer: Point,
        config: &CanvasConfig,
    ) -> (WidgetId, LayoutPatch) {
        self.moved(width, height, pointer, config);
        let (min_w, min_h) = config.min_size;
        let grid = config.grid_size;
        let rect = Rect::new(
            snap(self.preview.x, grid).max(0.0),
            snap(self.preview.y, grid).max(0.0),
            snap(self.preview.w, grid).max(min_w),
            snap(self.preview.h, grid).max(min_h),
        );
        trace!(id = %self.id, ?rect, "resize end");
        (self.id.clone(), LayoutPatch::rect(rect))
    }
}

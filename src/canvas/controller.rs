//! The canvas controller
//!
//! [`Canvas`] owns every piece of interaction state (edit mode, the running
//! session, stack selections, guides, auto-scroll) and talks to the host only
//! through its [`LayoutStore`]. Stacks are never cached: they are derived from
//! the store whenever they are needed.

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::geometry::{snap, Point, Rect};
use crate::model::{GroupId, WidgetId};
use crate::store::{LayoutPatch, LayoutStore, ZOrder};

use super::autoscroll::{AutoScroll, ScrollTarget, Viewport};
use super::config::CanvasConfig;
use super::frame::{CanvasBounds, Frame, GuideLines, StackView, Surface};
use super::grouping::{compute_stacks, stack_of, Stack};
use super::guides::GuideOverlay;
use super::session::{DragSession, PointerEvent, ResizeSession, Session};
use super::stack::{anchor_of, effective_lock, ghost_layers, relink, CycleDirection, StackState};

/// Interactive widget canvas over a layout store
#[derive(Debug)]
pub struct Canvas<S: LayoutStore> {
    store: S,
    config: CanvasConfig,
    edit_mode: bool,
    viewport: Viewport,
    stacks: StackState,
    session: Session,
    guides: GuideOverlay,
    autoscroll: AutoScroll,
}

impl<S: LayoutStore> Canvas<S> {
    pub fn new(store: S, config: CanvasConfig) -> Self {
        let autoscroll = AutoScroll::new(&config);
        Self {
            store,
            config,
            edit_mode: false,
            viewport: Viewport::default(),
            stacks: StackState::new(),
            session: Session::Idle,
            guides: GuideOverlay::new(),
            autoscroll,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access for host-side edits between interactions
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Toggle edit mode. Leaving edit mode cancels a running interaction.
    pub fn set_edit_mode(&mut self, on: bool) {
        if !on && !self.session.is_idle() {
            self.cancel();
        }
        debug!(on, "edit mode");
        self.edit_mode = on;
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Resize the viewport. A zero size means unknown: no x clamping and no
    /// auto-scroll.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport.width = width.max(0.0);
        self.viewport.height = height.max(0.0);
        self.sync_surface();
        self.viewport.clamp_scroll();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current stacks, derived from the store
    pub fn stacks(&self) -> Vec<Stack> {
        let stacks = compute_stacks(&self.store.visible_instances(), &self.config);
        trace!(count = stacks.len(), "stacks recomputed");
        stacks
    }

    /// The stack containing a widget
    pub fn stack_of(&self, id: &WidgetId) -> Option<Stack> {
        stack_of(&self.stacks(), id).cloned()
    }

    fn find_stack(&self, group: &GroupId) -> Option<Stack> {
        let found = self.stacks().into_iter().find(|stack| &stack.group_id == group);
        if found.is_none() {
            debug!(%group, "no stack with this id");
        }
        found
    }

    /// Active member of a stack and the rectangle it is shown at
    fn displayed(&self, stack: &Stack) -> Option<(WidgetId, Rect)> {
        let active = self.stacks.active_in(&self.store, stack)?;
        let (_, anchor) = anchor_of(&self.store, stack)?;
        let size = self.store.layout_of(&active)?;
        Some((active, Rect::new(anchor.x, anchor.y, size.w, size.h)))
    }

    /// Stored rectangles of every visible widget outside `stack`, hidden
    /// members of other stacks included
    fn snap_targets(&self, stack: &Stack) -> Vec<Rect> {
        self.store
            .visible_instances()
            .into_iter()
            .filter(|inst| !stack.contains(&inst.instance_id))
            .filter_map(|inst| inst.layout)
            .collect()
    }

    fn surface_pointer(&self, pointer: Point) -> Point {
        Point::new(pointer.x, pointer.y + self.viewport.scroll_top)
    }

    /// Width drags are clamped to; zero when the viewport is unknown
    fn surface_width(&self) -> f64 {
        if self.viewport.width <= 0.0 {
            return 0.0;
        }
        self.viewport.width.max(CanvasBounds::of(&self.store).max_right)
    }

    fn sync_surface(&mut self) {
        let needed = CanvasBounds::of(&self.store)
            .surface_height(self.viewport.height, self.config.surface_padding);
        self.viewport.grow_to(needed);
    }

    /// Feed one pointer event into the interaction state machine.
    ///
    /// Returns whether the event was accepted.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        trace!(?event, "pointer event");
        match event {
            PointerEvent::DragStart { id, pointer } => self.begin_drag(&id, pointer),
            PointerEvent::DragMove { pointer } => self.drag_move(pointer),
            PointerEvent::DragEnd { pointer } => self.drag_end(pointer),
            PointerEvent::ResizeStart { id, pointer } => self.begin_resize(&id, pointer),
            PointerEvent::ResizeMove {
                width,
                height,
                pointer,
            } => self.resize_move(width, height, pointer),
            PointerEvent::ResizeEnd {
                width,
                height,
                pointer,
            } => self.resize_end(width, height, pointer),
            PointerEvent::Cancel => self.cancel(),
        }
    }

    /// The stack an interaction on `id` would manipulate, if one may start
    fn interaction_target(&self, id: &WidgetId, what: &str) -> Option<Stack> {
        if !self.edit_mode {
            debug!(%id, what, "interaction refused: edit mode is off");
            return None;
        }
        if !self.session.is_idle() {
            debug!(%id, what, "interaction ignored: another one is running");
            return None;
        }
        let stacks = self.stacks();
        let Some(stack) = stack_of(&stacks, id).cloned() else {
            debug!(%id, what, "interaction skipped: widget missing or not placed");
            return None;
        };
        if effective_lock(&self.store, &stack) {
            debug!(%id, group = %stack.group_id, what, "interaction refused: stack is locked");
            return None;
        }
        Some(stack)
    }

    fn begin_drag(&mut self, id: &WidgetId, pointer: Point) -> bool {
        let Some(stack) = self.interaction_target(id, "drag") else {
            return false;
        };
        let Some((active, origin)) = self.displayed(&stack) else {
            return false;
        };

        let members = stack
            .instance_ids
            .iter()
            .filter(|member| **member != active)
            .filter_map(|member| self.store.layout_of(member).map(|rect| (member.clone(), rect)))
            .collect();
        let targets = self.snap_targets(&stack);
        let surface_pointer = self.surface_pointer(pointer);

        self.sync_surface();
        self.session = Session::Dragging(DragSession::begin(
            active,
            stack.group_id,
            origin,
            pointer,
            surface_pointer,
            members,
            targets,
        ));
        true
    }

    fn drag_move(&mut self, pointer: Point) -> bool {
        let surface_pointer = self.surface_pointer(pointer);
        let surface_width = self.surface_width();
        let threshold = self.config.snap_threshold;
        let Session::Dragging(drag) = &mut self.session else {
            return false;
        };
        let alignment = drag.moved(pointer, surface_pointer, surface_width, threshold);
        let preview = drag.preview;

        self.guides
            .show(alignment.vertical_guides, alignment.horizontal_guides);
        self.grow_surface_for(&preview);
        self.autoscroll.update(pointer.y, self.viewport.height);
        true
    }

    fn drag_end(&mut self, pointer: Point) -> bool {
        let surface_pointer = self.surface_pointer(pointer);
        let surface_width = self.surface_width();
        let mut drag = match std::mem::take(&mut self.session) {
            Session::Dragging(drag) => drag,
            other => {
                self.session = other;
                return false;
            }
        };

        let writes = drag.finish(pointer, surface_pointer, surface_width, &self.config);
        for (id, patch) in writes {
            self.store.update_layout(&id, patch);
        }
        debug!(id = %drag.id, group = %drag.group, "drag committed");

        // Keep the dropped widget on top of whatever stack it now belongs to
        if let Some(stack) = self.stack_of(&drag.id) {
            self.stacks.remember(stack.group_id, drag.id);
        }
        self.finish_interaction();
        true
    }

    fn begin_resize(&mut self, id: &WidgetId, pointer: Point) -> bool {
        let Some(stack) = self.interaction_target(id, "resize") else {
            return false;
        };
        let Some((active, origin)) = self.displayed(&stack) else {
            return false;
        };
        if self.store.instance(&active).map(|inst| inst.is_collapsed).unwrap_or(false) {
            debug!(id = %active, "resize refused: widget is collapsed");
            return false;
        }
        let targets = self.snap_targets(&stack);

        self.sync_surface();
        self.session = Session::Resizing(ResizeSession::begin(
            active,
            stack.group_id,
            origin,
            pointer,
            targets,
        ));
        true
    }

    fn resize_move(&mut self, width: f64, height: f64, pointer: Point) -> bool {
        let Session::Resizing(resize) = &mut self.session else {
            return false;
        };
        let alignment = resize.moved(width, height, pointer, &self.config);
        let preview = resize.preview;

        self.guides
            .show(alignment.vertical_guides, alignment.horizontal_guides);
        self.grow_surface_for(&preview);
        self.autoscroll.update(pointer.y, self.viewport.height);
        true
    }

    fn resize_end(&mut self, width: f64, height: f64, pointer: Point) -> bool {
        let mut resize = match std::mem::take(&mut self.session) {
            Session::Resizing(resize) => resize,
            other => {
                self.session = other;
                return false;
            }
        };
        let (id, patch) = resize.finish(width, height, pointer, &self.config);
        self.store.update_layout(&id, patch);
        debug!(%id, ?patch, "resize committed");
        self.finish_interaction();
        true
    }

    /// Abort the running interaction without writing anything
    fn cancel(&mut self) -> bool {
        if self.session.is_idle() {
            return false;
        }
        debug!(group = ?self.session.group(), "interaction cancelled");
        self.session = Session::Idle;
        self.finish_interaction();
        true
    }

    fn finish_interaction(&mut self) {
        self.guides.clear(self.config.guide_fade);
        self.autoscroll.stop();
        self.sync_surface();
    }

    fn grow_surface_for(&mut self, rect: &Rect) {
        let needed = CanvasBounds::default()
            .include(rect)
            .surface_height(self.viewport.height, self.config.surface_padding);
        self.viewport.grow_to(needed);
    }

    /// Whether the host should keep calling [`Canvas::animation_frame`]
    pub fn wants_frame(&self) -> bool {
        self.autoscroll.is_running() || self.guides.is_fading()
    }

    /// Advance time by one animation frame.
    ///
    /// Scrolls while the pointer rests in an edge zone; a drag preview follows
    /// the scroll since its pointer is fixed in viewport space.
    pub fn animation_frame(&mut self, elapsed: Duration) -> bool {
        self.guides.advance(elapsed);

        if !self.session.is_idle() {
            self.sync_surface();
            if let Some(scrolled) = self.autoscroll.on_frame(&mut self.viewport) {
                trace!(scrolled, scroll_top = self.viewport.scroll_top, "auto-scroll step");
                let drag_pointer = match &self.session {
                    Session::Dragging(drag) if scrolled != 0.0 => Some(drag.last_pointer),
                    _ => None,
                };
                if let Some(pointer) = drag_pointer {
                    self.drag_move(pointer);
                }
            }
        }
        self.wants_frame()
    }

    /// Cycle the active member of a stack
    pub fn cycle_stack(&mut self, group: &GroupId, direction: CycleDirection) -> Option<WidgetId> {
        let stack = self.find_stack(group)?;
        if !stack.is_stacked() {
            debug!(%group, "cycle skipped: single member");
            return None;
        }
        self.stacks.cycle(&mut self.store, &stack, direction)
    }

    /// Jump to a member from the browse view
    pub fn set_active_in_group(&mut self, group: &GroupId, id: &WidgetId) -> bool {
        let Some(stack) = self.find_stack(group) else {
            return false;
        };
        self.stacks.set_active(&mut self.store, &stack, id)
    }

    /// Open the browse view of a multi-member stack
    pub fn expand_stack(&mut self, group: &GroupId) -> bool {
        match self.find_stack(group) {
            Some(stack) if stack.is_stacked() => {
                self.stacks.expand(stack.group_id);
                true
            }
            _ => false,
        }
    }

    pub fn close_expanded(&mut self) {
        self.stacks.close_expanded();
    }

    pub fn unlink_from_stack(&mut self, group: &GroupId, id: &WidgetId) -> bool {
        let Some(stack) = self.find_stack(group) else {
            return false;
        };
        if !stack.is_stacked() {
            debug!(%group, %id, "unlink skipped: not stacked");
            return false;
        }
        self.stacks.unlink(&mut self.store, &stack, id, &self.config)
    }

    pub fn relink_to_stacks(&mut self, id: &WidgetId) -> bool {
        if self.store.instance(id).is_none() {
            debug!(%id, "relink skipped: unknown widget");
            return false;
        }
        relink(&mut self.store, id);
        true
    }

    /// Flip the lock of a stack; returns the new state
    pub fn toggle_group_lock(&mut self, group: &GroupId) -> bool {
        let locked = !self.store.is_group_locked(group);
        self.store.set_group_lock(group, locked);
        debug!(%group, locked, "group lock toggled");
        locked
    }

    /// Flip the lock of one widget; `None` for unknown widgets
    pub fn toggle_instance_lock(&mut self, id: &WidgetId) -> Option<bool> {
        let locked = !self.store.instance(id)?.is_locked;
        self.store.set_instance_lock(id, locked);
        debug!(%id, locked, "widget lock toggled");
        Some(locked)
    }

    /// Change paint order; unknown widgets are ignored
    pub fn reorder(&mut self, id: &WidgetId, op: ZOrder) -> bool {
        if self.store.instance(id).is_none() {
            warn!(%id, %op, "z-order change for unknown widget");
            return false;
        }
        self.store.set_z_order(id, op);
        true
    }

    /// Collapse or expand a widget; returns the new collapsed state
    pub fn toggle_collapse(&mut self, id: &WidgetId) -> Option<bool> {
        let inst = self.store.instance(id)?;
        let Some(layout) = inst.layout else {
            debug!(%id, "collapse skipped: widget not placed");
            return None;
        };

        if inst.is_collapsed {
            let (_, min_h) = self.config.min_size;
            let restored = inst
                .saved_expanded_height
                .map(|h| snap(h, self.config.grid_size))
                .unwrap_or(min_h)
                .max(min_h);
            self.store.set_collapsed(id, false, None);
            self.store.update_layout(id, LayoutPatch::height(restored));
            debug!(%id, restored, "widget expanded");
            Some(false)
        } else {
            let collapsed = inst.collapsed_height.unwrap_or(self.config.collapsed_height);
            self.store.set_collapsed(id, true, Some(layout.h));
            self.store.update_layout(id, LayoutPatch::height(collapsed));
            debug!(%id, saved = layout.h, "widget collapsed");
            Some(true)
        }
    }

    /// Everything that would be drawn right now
    pub fn frame(&self) -> Frame {
        let stacks = self.stacks();
        let manipulated = self.session.group();

        let mut views: Vec<StackView> = stacks
            .iter()
            .filter_map(|stack| self.stack_view(stack, manipulated))
            .collect();
        views.sort_by(|a, b| {
            a.dragging
                .cmp(&b.dragging)
                .then(a.z.cmp(&b.z))
                .then_with(|| a.group_id.cmp(&b.group_id))
        });

        let mut bounds = CanvasBounds::of(&self.store);
        if let Some(preview) = self.session.preview() {
            bounds = bounds.include(&preview);
        }
        let height = bounds
            .surface_height(self.viewport.height, self.config.surface_padding)
            .max(self.viewport.surface_height);

        Frame {
            stacks: views,
            guides: GuideLines {
                vertical: self.guides.vertical.clone(),
                horizontal: self.guides.horizontal.clone(),
                visible: self.guides.visible,
            },
            surface: Surface {
                width: self.viewport.width.max(bounds.max_right),
                height,
            },
            scroll_top: self.viewport.scroll_top,
            edit_mode: self.edit_mode,
            grid_size: self.config.grid_size,
            expanded: self.stacks.expanded().cloned(),
        }
    }

    fn stack_view(&self, stack: &Stack, manipulated: Option<&GroupId>) -> Option<StackView> {
        let (active, displayed) = self.displayed(stack)?;
        let (anchor, _) = anchor_of(&self.store, stack)?;
        let dragging = manipulated == Some(&stack.group_id);
        let rect = if dragging {
            self.session.preview().unwrap_or(displayed)
        } else {
            displayed
        };

        let z = self.store.instance(&active).map(|inst| inst.z_index).unwrap_or_default();
        let z = if self.edit_mode { z + self.config.edit_z_boost } else { z };

        Some(StackView {
            layers: ghost_layers(&self.store, stack, &active, rect, (rect.w, rect.h), &self.config),
            locked: effective_lock(&self.store, stack),
            direction: self.stacks.direction(&stack.group_id),
            group_id: stack.group_id.clone(),
            members: stack.instance_ids.clone(),
            active,
            anchor,
            rect,
            z,
            dragging,
        })
    }
}

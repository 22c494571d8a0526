//! Stack presentation and cycling
//!
//! A stack shows one active member at its anchor position, with the other
//! members drawn as faded "ghost" cards underneath. Cycling changes which
//! member is active without moving the stack.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::geometry::{snap, Rect};
use crate::model::{GroupId, WidgetId};
use crate::store::{LayoutPatch, LayoutStore};

use super::config::CanvasConfig;
use super::grouping::Stack;

/// Direction of a stack cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Next,
    Prev,
}

impl CycleDirection {
    /// Slide direction hint for the transition animation
    pub fn hint(self) -> i8 {
        match self {
            CycleDirection::Next => 1,
            CycleDirection::Prev => -1,
        }
    }
}

/// A non-interactive preview card beneath the active member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GhostLayer {
    pub id: WidgetId,
    pub rect: Rect,
    pub scale: f64,
    pub opacity: f64,
    pub blur: f64,
    pub z: i64,
}

/// The anchor of a stack: the member with the smallest `y`, then smallest `x`.
///
/// Remaining ties go to the smallest id so the answer never depends on the
/// order members are visited in.
pub fn anchor_of(store: &impl LayoutStore, stack: &Stack) -> Option<(WidgetId, Rect)> {
    stack
        .instance_ids
        .iter()
        .filter_map(|id| store.layout_of(id).map(|rect| (id, rect)))
        .min_by(|(id_a, a), (id_b, b)| {
            a.y.partial_cmp(&b.y)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
                .then_with(|| id_a.cmp(id_b))
        })
        .map(|(id, rect)| (id.clone(), rect))
}

/// The member appearing earliest in the store's persisted order
pub fn default_active(store: &impl LayoutStore, stack: &Stack) -> Option<WidgetId> {
    stack
        .instance_ids
        .iter()
        .min_by_key(|id| (store.order_index(id), (*id).clone()))
        .cloned()
}

/// Effective lock of a stack.
///
/// A multi-member stack is locked by its group lock or by any locked member;
/// a singleton only by its own flag.
pub fn effective_lock(store: &impl LayoutStore, stack: &Stack) -> bool {
    let member_locked = |id: &WidgetId| store.instance(id).map(|i| i.is_locked).unwrap_or(false);
    if stack.is_stacked() {
        store.is_group_locked(&stack.group_id) || stack.instance_ids.iter().any(member_locked)
    } else {
        stack.instance_ids.iter().any(member_locked)
    }
}

/// Ghost cards for every non-active member, tallest first.
///
/// Layer `k` (1-based) sits `k` offsets down-right of the anchor and takes the
/// active member's size.
pub fn ghost_layers(
    store: &impl LayoutStore,
    stack: &Stack,
    active: &WidgetId,
    anchor: Rect,
    active_size: (f64, f64),
    config: &CanvasConfig,
) -> Vec<GhostLayer> {
    if !stack.is_stacked() {
        return Vec::new();
    }

    let mut background: Vec<(&WidgetId, f64)> = stack
        .instance_ids
        .iter()
        .filter(|id| *id != active)
        .filter_map(|id| store.layout_of(id).map(|rect| (id, rect.h)))
        .collect();
    background.sort_by(|(id_a, h_a), (id_b, h_b)| {
        h_b.partial_cmp(h_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| id_a.cmp(id_b))
    });

    let (offset_x, offset_y) = config.ghost_offset;
    let (w, h) = active_size;
    background
        .into_iter()
        .enumerate()
        .map(|(i, (id, _))| {
            let k = (i + 1) as f64;
            GhostLayer {
                id: id.clone(),
                rect: Rect::new(anchor.x + offset_x * k, anchor.y + offset_y * k, w, h),
                scale: (1.0 - k * config.ghost_scale_step).max(config.ghost_min_scale),
                opacity: (config.ghost_opacity_start - i as f64 * config.ghost_opacity_step)
                    .max(config.ghost_min_opacity),
                blur: config.ghost_blur_start + i as f64 * config.ghost_blur_step,
                z: config.ghost_base_z + i as i64,
            }
        })
        .collect()
}

/// Per-stack presentation state owned by the canvas
#[derive(Debug, Clone, Default)]
pub struct StackState {
    active: HashMap<GroupId, WidgetId>,
    direction: HashMap<GroupId, i8>,
    expanded: Option<GroupId>,
}

impl StackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active member: an explicit selection that is still a member, or
    /// the default.
    pub fn active_in(&self, store: &impl LayoutStore, stack: &Stack) -> Option<WidgetId> {
        match self.active.get(&stack.group_id) {
            Some(id) if stack.contains(id) => Some(id.clone()),
            _ => default_active(store, stack),
        }
    }

    /// Last slide direction recorded for a stack, forward by default
    pub fn direction(&self, group: &GroupId) -> i8 {
        self.direction.get(group).copied().unwrap_or(1)
    }

    /// Stack whose browse view is open
    pub fn expanded(&self) -> Option<&GroupId> {
        self.expanded.as_ref()
    }

    pub fn expand(&mut self, group: GroupId) {
        self.expanded = Some(group);
    }

    pub fn close_expanded(&mut self) {
        self.expanded = None;
    }

    /// Record `id` as the active member of `group` without moving anything
    pub fn remember(&mut self, group: GroupId, id: WidgetId) {
        self.active.insert(group, id);
    }

    /// Move the active pointer one member along the stack's member list.
    ///
    /// The incoming member is moved onto the anchor first, so the stack does
    /// not drift as it is cycled. Returns the new active member.
    pub fn cycle(
        &mut self,
        store: &mut impl LayoutStore,
        stack: &Stack,
        direction: CycleDirection,
    ) -> Option<WidgetId> {
        let current = self.active_in(store, stack)?;
        let ids = &stack.instance_ids;
        let index = ids.iter().position(|id| *id == current)?;
        let len = ids.len();
        let next_index = match direction {
            CycleDirection::Next => (index + 1) % len,
            CycleDirection::Prev => (index + len - 1) % len,
        };
        let next = ids[next_index].clone();

        align_to_anchor(store, stack, &next);

        trace!(group = %stack.group_id, from = %current, to = %next, "cycle stack");
        self.direction.insert(stack.group_id.clone(), direction.hint());
        self.active.insert(stack.group_id.clone(), next.clone());
        Some(next)
    }

    /// Jump straight to a member, as chosen from the browse view.
    ///
    /// Closes the browse view. Returns false if `id` is not a member.
    pub fn set_active(&mut self, store: &mut impl LayoutStore, stack: &Stack, id: &WidgetId) -> bool {
        if !stack.contains(id) {
            debug!(group = %stack.group_id, %id, "set active skipped: not a member");
            return false;
        }
        align_to_anchor(store, stack, id);
        self.direction.insert(stack.group_id.clone(), 1);
        self.active.insert(stack.group_id.clone(), id.clone());
        self.expanded = None;
        true
    }

    /// Take a member out of automatic grouping and park it beside the stack.
    pub fn unlink(
        &mut self,
        store: &mut impl LayoutStore,
        stack: &Stack,
        id: &WidgetId,
        config: &CanvasConfig,
    ) -> bool {
        if !stack.contains(id) || store.layout_of(id).is_none() {
            debug!(group = %stack.group_id, %id, "unlink skipped");
            return false;
        }
        let Some((_, anchor)) = anchor_of(store, stack) else {
            return false;
        };

        store.set_group_disabled(id, true);
        let x = snap(anchor.x + anchor.w + config.unlink_gap, config.grid_size);
        let y = snap(anchor.y, config.grid_size);
        store.update_layout(id, LayoutPatch::position(x, y));
        self.active.remove(&stack.group_id);
        debug!(group = %stack.group_id, %id, x, y, "unlinked from stack");
        true
    }
}

/// Give a widget back to automatic grouping. Its position is left alone.
pub fn relink(store: &mut impl LayoutStore, id: &WidgetId) {
    store.set_group_disabled(id, false);
}

/// Move a member onto the stack's anchor position if it is elsewhere
fn align_to_anchor(store: &mut impl LayoutStore, stack: &Stack, id: &WidgetId) {
    let Some((_, anchor)) = anchor_of(store, stack) else {
        return;
    };
    let Some(current) = store.layout_of(id) else {
        return;
    };
    if current.x != anchor.x || current.y != anchor.y {
        store.update_layout(id, LayoutPatch::position(anchor.x, anchor.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Snapshot, WidgetInstance};
    use crate::store::MemoryStore;

    fn stack(ids: &[&str]) -> Stack {
        let mut members: Vec<WidgetId> = ids.iter().map(|id| WidgetId::new(*id)).collect();
        members.sort();
        Stack {
            group_id: GroupId::from_members(&members),
            instance_ids: members,
        }
    }

    fn store(widgets: &[(&str, f64, f64, f64)]) -> MemoryStore {
        let mut snapshot = Snapshot::new();
        for (id, x, y, h) in widgets {
            snapshot.push(WidgetInstance::new(*id, "todo", Rect::new(*x, *y, 360.0, *h)));
        }
        MemoryStore::new(snapshot)
    }

    #[test]
    fn test_anchor_is_top_then_left() {
        let store = store(&[("a", 30.0, 20.0, 260.0), ("b", 20.0, 20.0, 260.0), ("c", 0.0, 24.0, 260.0)]);
        let (id, rect) = anchor_of(&store, &stack(&["a", "b", "c"])).expect("has members");
        assert_eq!(id.as_str(), "b");
        assert_eq!(rect.origin(), crate::geometry::Point::new(20.0, 20.0));
    }

    #[test]
    fn test_default_active_follows_persisted_order() {
        let store = store(&[("z", 0.0, 0.0, 260.0), ("a", 4.0, 4.0, 260.0)]);
        assert_eq!(
            default_active(&store, &stack(&["a", "z"])),
            Some(WidgetId::new("z"))
        );
    }

    #[test]
    fn test_cycle_moves_incoming_member_onto_anchor() {
        let mut store = store(&[("a", 20.0, 20.0, 260.0), ("b", 25.0, 24.0, 260.0)]);
        let s = stack(&["a", "b"]);
        let mut state = StackState::new();

        let next = state.cycle(&mut store, &s, CycleDirection::Next);
        assert_eq!(next, Some(WidgetId::new("b")));
        assert_eq!(
            store.layout_of(&WidgetId::new("b")).map(|r| r.origin()),
            Some(crate::geometry::Point::new(20.0, 20.0))
        );
        assert_eq!(state.direction(&s.group_id), 1);
    }

    #[test]
    fn test_cycle_prev_wraps() {
        let mut store = store(&[("a", 0.0, 0.0, 260.0), ("b", 0.0, 0.0, 260.0), ("c", 0.0, 0.0, 260.0)]);
        let s = stack(&["a", "b", "c"]);
        let mut state = StackState::new();
        assert_eq!(state.cycle(&mut store, &s, CycleDirection::Prev), Some(WidgetId::new("c")));
        assert_eq!(state.direction(&s.group_id), -1);
    }

    #[test]
    fn test_ghost_layers_order_and_styling() {
        let store = store(&[("a", 0.0, 0.0, 260.0), ("b", 0.0, 0.0, 300.0), ("c", 0.0, 0.0, 280.0)]);
        let s = stack(&["a", "b", "c"]);
        let layers = ghost_layers(
            &store,
            &s,
            &WidgetId::new("a"),
            Rect::new(100.0, 50.0, 360.0, 260.0),
            (360.0, 260.0),
            &CanvasConfig::default(),
        );
        let ids: Vec<&str> = layers.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(layers[0].rect, Rect::new(118.0, 64.0, 360.0, 260.0));
        assert_eq!(layers[1].rect, Rect::new(136.0, 78.0, 360.0, 260.0));
        assert!((layers[0].scale - 0.98).abs() < 1e-9);
        assert!((layers[1].opacity - 0.6).abs() < 1e-9);
        assert_eq!(layers[1].blur, 1.5);
        assert_eq!((layers[0].z, layers[1].z), (10, 11));
    }

    #[test]
    fn test_ghost_scale_and_opacity_floors() {
        let mut widgets = Vec::new();
        let names: Vec<String> = (0..8).map(|i| format!("w{}", i)).collect();
        for name in &names {
            widgets.push((name.as_str(), 0.0, 0.0, 260.0));
        }
        let store = store(&widgets);
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let s = stack(&refs);
        let layers = ghost_layers(
            &store,
            &s,
            &WidgetId::new("w0"),
            Rect::new(0.0, 0.0, 360.0, 260.0),
            (360.0, 260.0),
            &CanvasConfig::default(),
        );
        assert_eq!(layers.len(), 7);
        let last = &layers[6];
        assert_eq!(last.scale, 0.9);
        assert_eq!(last.opacity, 0.35);
    }

    #[test]
    fn test_effective_lock() {
        let mut store = store(&[("a", 0.0, 0.0, 260.0), ("b", 0.0, 0.0, 260.0)]);
        let s = stack(&["a", "b"]);
        assert!(!effective_lock(&store, &s));
        store.set_instance_lock(&WidgetId::new("b"), true);
        assert!(effective_lock(&store, &s));
        store.set_instance_lock(&WidgetId::new("b"), false);
        store.set_group_lock(&s.group_id, true);
        assert!(effective_lock(&store, &s));

        // A group lock recorded for a singleton id has no effect
        let single = stack(&["a"]);
        store.set_group_lock(&single.group_id, true);
        assert!(!effective_lock(&store, &single));
    }

    #[test]
    fn test_unlink_parks_beside_anchor() {
        let mut store = store(&[("a", 20.0, 20.0, 260.0), ("b", 25.0, 24.0, 260.0)]);
        let s = stack(&["a", "b"]);
        let mut state = StackState::new();
        assert!(state.unlink(&mut store, &s, &WidgetId::new("b"), &CanvasConfig::default()));
        let b = store.instance(&WidgetId::new("b")).expect("exists");
        assert!(b.group_disabled);
        assert_eq!(b.layout.map(|r| (r.x, r.y)), Some((640.0, 20.0)));

        relink(&mut store, &WidgetId::new("b"));
        let b = store.instance(&WidgetId::new("b")).expect("exists");
        assert!(!b.group_disabled);
        assert_eq!(b.layout.map(|r| (r.x, r.y)), Some((640.0, 20.0)));
    }
}

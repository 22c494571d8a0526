//! The boundary between the canvas and the host's layout record store
//!
//! The canvas reads widget records through [`LayoutStore`] and requests a
//! narrow set of mutations on it. [`MemoryStore`] is a host-side
//! implementation over a [`Snapshot`].

use std::fmt;

use tracing::{debug, trace};

use crate::geometry::Rect;
use crate::model::{GroupId, Snapshot, WidgetId, WidgetInstance};

/// Partial update of a widget's layout rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub w: Option<f64>,
    pub h: Option<f64>,
}

impl LayoutPatch {
    /// Move without resizing
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Resize without moving
    pub fn size(w: f64, h: f64) -> Self {
        Self {
            w: Some(w),
            h: Some(h),
            ..Self::default()
        }
    }

    pub fn height(h: f64) -> Self {
        Self {
            h: Some(h),
            ..Self::default()
        }
    }

    /// Replace all four components
    pub fn rect(rect: Rect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            w: Some(rect.w),
            h: Some(rect.h),
        }
    }

    /// Apply the patch to a rectangle
    pub fn apply(&self, rect: Rect) -> Rect {
        Rect::new(
            self.x.unwrap_or(rect.x),
            self.y.unwrap_or(rect.y),
            self.w.unwrap_or(rect.w),
            self.h.unwrap_or(rect.h),
        )
    }
}

/// Paint-order operations; each renormalises z to a dense 1..N sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    Front,
    Back,
    Forward,
    Backward,
}

impl fmt::Display for ZOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZOrder::Front => write!(f, "front"),
            ZOrder::Back => write!(f, "back"),
            ZOrder::Forward => write!(f, "forward"),
            ZOrder::Backward => write!(f, "backward"),
        }
    }
}

/// Read access to widget records plus the mutations the canvas may request.
///
/// Mutations addressed at unknown ids are no-ops.
pub trait LayoutStore {
    /// Persisted total order over instance ids
    fn order(&self) -> &[WidgetId];

    fn instance(&self, id: &WidgetId) -> Option<&WidgetInstance>;

    fn is_group_locked(&self, group: &GroupId) -> bool;

    fn update_layout(&mut self, id: &WidgetId, patch: LayoutPatch);

    fn set_z_order(&mut self, id: &WidgetId, op: ZOrder);

    fn set_group_disabled(&mut self, id: &WidgetId, disabled: bool);

    fn set_group_lock(&mut self, group: &GroupId, locked: bool);

    fn set_instance_lock(&mut self, id: &WidgetId, locked: bool);

    /// Record collapse state; `saved_expanded_height` is only overwritten when `Some`
    fn set_collapsed(&mut self, id: &WidgetId, collapsed: bool, saved_expanded_height: Option<f64>);

    /// Instances in persisted order that are enabled and placed
    fn visible_instances(&self) -> Vec<&WidgetInstance> {
        self.order()
            .iter()
            .filter_map(|id| self.instance(id))
            .filter(|inst| inst.enabled && inst.layout.is_some())
            .collect()
    }

    /// Layout rectangle of a widget, if it exists and is placed
    fn layout_of(&self, id: &WidgetId) -> Option<Rect> {
        self.instance(id).and_then(|inst| inst.layout)
    }

    /// Position of an id in the persisted order; unknown ids sort last
    fn order_index(&self, id: &WidgetId) -> usize {
        self.order()
            .iter()
            .position(|other| other == id)
            .unwrap_or(usize::MAX)
    }
}

/// In-memory store over a [`Snapshot`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Snapshot,
}

impl MemoryStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    fn instance_mut(&mut self, id: &WidgetId) -> Option<&mut WidgetInstance> {
        let found = self.snapshot.instances.get_mut(id);
        if found.is_none() {
            debug!(%id, "store mutation skipped: unknown widget");
        }
        found
    }
}

impl From<Snapshot> for MemoryStore {
    fn from(snapshot: Snapshot) -> Self {
        Self::new(snapshot)
    }
}

impl LayoutStore for MemoryStore {
    fn order(&self) -> &[WidgetId] {
        &self.snapshot.layout
    }

    fn instance(&self, id: &WidgetId) -> Option<&WidgetInstance> {
        self.snapshot.instances.get(id)
    }

    fn is_group_locked(&self, group: &GroupId) -> bool {
        self.snapshot
            .locked_groups
            .get(group)
            .copied()
            .unwrap_or(false)
    }

    fn update_layout(&mut self, id: &WidgetId, patch: LayoutPatch) {
        if let Some(inst) = self.instance_mut(id) {
            let Some(current) = inst.layout else {
                debug!(%id, "layout update skipped: widget not placed");
                return;
            };
            let next = patch.apply(current);
            trace!(%id, ?current, ?next, "update layout");
            inst.layout = Some(next);
        }
    }

    fn set_z_order(&mut self, id: &WidgetId, op: ZOrder) {
        if !self.snapshot.instances.contains_key(id) {
            debug!(%id, "z-order change skipped: unknown widget");
            return;
        }
        let sequence = reorder_z(&self.snapshot, id, op);
        for (z, member) in sequence.iter().enumerate() {
            if let Some(inst) = self.snapshot.instances.get_mut(member) {
                inst.z_index = z as i64 + 1;
            }
        }
        trace!(%id, %op, "z-order renormalised");
    }

    fn set_group_disabled(&mut self, id: &WidgetId, disabled: bool) {
        if let Some(inst) = self.instance_mut(id) {
            inst.group_disabled = disabled;
        }
    }

    fn set_group_lock(&mut self, group: &GroupId, locked: bool) {
        self.snapshot.locked_groups.insert(group.clone(), locked);
    }

    fn set_instance_lock(&mut self, id: &WidgetId, locked: bool) {
        if let Some(inst) = self.instance_mut(id) {
            inst.is_locked = locked;
        }
    }

    fn set_collapsed(&mut self, id: &WidgetId, collapsed: bool, saved_expanded_height: Option<f64>) {
        if let Some(inst) = self.instance_mut(id) {
            inst.is_collapsed = collapsed;
            if saved_expanded_height.is_some() {
                inst.saved_expanded_height = saved_expanded_height;
            }
        }
    }
}

/// Compute the paint sequence (bottom to top) after applying `op` to `id`.
///
/// The current sequence sorts every instance by z-index, ties broken by the
/// persisted order, so the result is dense and deterministic even when the
/// stored z values are sparse or duplicated.
pub fn reorder_z(snapshot: &Snapshot, id: &WidgetId, op: ZOrder) -> Vec<WidgetId> {
    let position_in_order = |candidate: &WidgetId| {
        snapshot
            .layout
            .iter()
            .position(|other| other == candidate)
            .unwrap_or(usize::MAX)
    };

    let mut sequence: Vec<&WidgetInstance> = snapshot.instances.values().collect();
    sequence.sort_by(|a, b| {
        a.z_index
            .cmp(&b.z_index)
            .then_with(|| position_in_order(&a.instance_id).cmp(&position_in_order(&b.instance_id)))
            .then_with(|| a.instance_id.cmp(&b.instance_id))
    });
    let mut sequence: Vec<WidgetId> = sequence
        .into_iter()
        .map(|inst| inst.instance_id.clone())
        .collect();

    let Some(index) = sequence.iter().position(|other| other == id) else {
        return sequence;
    };

    match op {
        ZOrder::Front => {
            let item = sequence.remove(index);
            sequence.push(item);
        }
        ZOrder::Back => {
            let item = sequence.remove(index);
            sequence.insert(0, item);
        }
        ZOrder::Forward => {
            if index + 1 < sequence.len() {
                sequence.swap(index, index + 1);
            }
        }
        ZOrder::Backward => {
            if index > 0 {
                sequence.swap(index, index - 1);
            }
        }
    }
    sequence
}

//! Widget records and the persisted dashboard snapshot
//!
//! The canvas never creates or deletes widgets. It reads these records from a
//! [`LayoutStore`](crate::store::LayoutStore) and asks the store to mutate a
//! handful of fields on them.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Rect;

/// Stable unique identifier of a placed widget
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(pub String);

impl WidgetId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id can take part in a joined [`GroupId`] without ambiguity.
    ///
    /// An id containing [`GROUP_SEPARATOR`] would collide with the group id of
    /// a stack (`a|b` alone reads the same as the stack of `a` and `b`).
    pub fn is_groupable_name(&self) -> bool {
        !self.0.contains(GROUP_SEPARATOR)
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for WidgetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WidgetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Prefix reserved for singleton stacks of widgets that opted out of grouping
pub const STANDALONE_PREFIX: &str = "standalone:";

/// Separator between member ids in a multi-member group id
pub const GROUP_SEPARATOR: &str = "|";

/// Derived identifier of a stack.
///
/// Built from the sorted member ids, so the same membership always yields the
/// same id and any change in membership yields a different one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Group id for a set of members; `sorted_members` must already be sorted
    pub fn from_members(sorted_members: &[WidgetId]) -> Self {
        let joined = sorted_members
            .iter()
            .map(WidgetId::as_str)
            .collect::<Vec<_>>()
            .join(GROUP_SEPARATOR);
        Self(joined)
    }

    /// Group id of a widget that does not participate in clustering
    pub fn standalone(id: &WidgetId) -> Self {
        Self(format!("{}{}", STANDALONE_PREFIX, id))
    }

    pub fn is_standalone(&self) -> bool {
        self.0.starts_with(STANDALONE_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for GroupId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One placed widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetInstance {
    pub instance_id: WidgetId,
    /// Opaque tag selecting the host's body renderer
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// `None` while the widget has not been placed yet
    #[serde(default)]
    pub layout: Option<Rect>,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub group_disabled: bool,
    #[serde(default)]
    pub is_collapsed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_expanded_height: Option<f64>,
}

fn default_enabled() -> bool {
    true
}

impl WidgetInstance {
    /// A new enabled, unlocked widget
    pub fn new(id: impl Into<String>, kind: impl Into<String>, layout: Rect) -> Self {
        Self {
            instance_id: WidgetId::new(id),
            kind: kind.into(),
            title: None,
            enabled: true,
            layout: Some(layout),
            z_index: 0,
            is_locked: false,
            group_disabled: false,
            is_collapsed: false,
            collapsed_height: None,
            saved_expanded_height: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_z_index(mut self, z: i64) -> Self {
        self.z_index = z;
        self
    }

    pub fn locked(mut self) -> Self {
        self.is_locked = true;
        self
    }

    pub fn group_disabled(mut self) -> Self {
        self.group_disabled = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn without_layout(mut self) -> Self {
        self.layout = None;
        self
    }

    /// Title shown on cards and ghost previews, falling back to the type tag
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.kind)
    }
}

/// Errors that can occur when loading or saving snapshots
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("failed to read snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse snapshot TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("widget id '{0}' contains the reserved separator '{sep}'", sep = GROUP_SEPARATOR)]
    ReservedId(WidgetId),
}

/// The persisted dashboard state handed to the canvas by its host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub instances: BTreeMap<WidgetId, WidgetInstance>,
    /// Persisted total order over instance ids
    #[serde(default)]
    pub layout: Vec<WidgetId>,
    #[serde(default)]
    pub locked_groups: BTreeMap<GroupId, bool>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a widget to the instance map and the persisted order
    pub fn with_instance(mut self, instance: WidgetInstance) -> Self {
        self.push(instance);
        self
    }

    pub fn push(&mut self, instance: WidgetInstance) {
        let id = instance.instance_id.clone();
        if !self.layout.contains(&id) {
            self.layout.push(id.clone());
        }
        self.instances.insert(id, instance);
    }

    /// Load a snapshot from a file, choosing TOML for `.toml` and JSON otherwise
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content),
            _ => Self::from_json(&content),
        }
    }

    pub fn from_json(content: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(content)?;
        snapshot.validated()
    }

    pub fn from_toml(content: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = toml::from_str(content)?;
        snapshot.validated()
    }

    /// Group ids are joined member ids, so no member id may contain the separator
    fn validated(self) -> Result<Self, SnapshotError> {
        if let Some(id) = self.instances.keys().find(|id| !id.is_groupable_name()) {
            return Err(SnapshotError::ReservedId(id.clone()));
        }
        Ok(self)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

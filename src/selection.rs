//! Selection model: object handles, type signatures, merge style, snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

/// Stable identity of an editable object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Field visibility mask used to include or exclude fields of a type.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FieldFlags(u32);

impl FieldFlags {
    pub const NONE: FieldFlags = FieldFlags(0);
    pub const VISIBLE: FieldFlags = FieldFlags(1);
    pub const EDITABLE: FieldFlags = FieldFlags(1 << 1);
    pub const ADVANCED: FieldFlags = FieldFlags(1 << 2);
    pub const HIDDEN: FieldFlags = FieldFlags(1 << 3);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn union(self, other: FieldFlags) -> Self {
        Self(self.0 | other.0)
    }

    /// True if every bit of `other` is set in `self`.
    pub const fn contains(self, other: FieldFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: FieldFlags) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for FieldFlags {
    type Output = FieldFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// The effective type of an object as seen by the property sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSignature {
    pub type_name: Arc<str>,
    pub include: FieldFlags,
    pub exclude: FieldFlags,
}

impl TypeSignature {
    pub fn new(type_name: impl Into<Arc<str>>) -> Self {
        Self {
            type_name: type_name.into(),
            include: FieldFlags::VISIBLE,
            exclude: FieldFlags::HIDDEN,
        }
    }

    pub fn with_flags(mut self, include: FieldFlags, exclude: FieldFlags) -> Self {
        self.include = include;
        self.exclude = exclude;
        self
    }
}

/// An object that can appear in the property panel.
///
/// Implementations are read from worker threads and must not be mutated
/// while a generation job may still hold them (see
/// [`GenerationOrchestrator::sync_threads`](crate::generation::GenerationOrchestrator::sync_threads)).
pub trait Inspectable: Send + Sync {
    fn object_id(&self) -> ObjectId;

    fn type_signature(&self) -> TypeSignature;

    /// Current value of a field, if the object exposes one.
    fn field_value(&self, _field: &str) -> Option<serde_json::Value> {
        None
    }
}

/// Shared handle to a selected object.
pub type Handle = Arc<dyn Inspectable>;

/// How fields of differently typed objects are combined into one sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// Only fields every selected type has.
    #[default]
    Intersection,
    /// Every field any selected type has.
    Union,
}

impl Style {
    pub fn as_str(self) -> &'static str {
        match self {
            Style::Intersection => "intersection",
            Style::Union => "union",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "intersection" => Ok(Style::Intersection),
            "union" => Ok(Style::Union),
            other => Err(format!(
                "Invalid style: {} (must be 'intersection' or 'union')",
                other
            )),
        }
    }
}

/// Immutable copy of the selection taken when a job is submitted.
#[derive(Clone)]
pub struct SelectionSnapshot(Arc<[Handle]>);

impl SelectionSnapshot {
    pub fn capture(handles: &[Handle]) -> Self {
        Self(handles.iter().cloned().collect())
    }

    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.0.iter().map(|h| h.object_id()).collect()
    }
}

impl Deref for SelectionSnapshot {
    type Target = [Handle];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for SelectionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.object_ids()).finish()
    }
}

//! Control sets: the per-field editing controls that make up a property sheet.

use crate::selection::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifier of an editable field, unique within a type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FieldId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Set of field identifiers, ordered for deterministic output.
pub type FieldSet = BTreeSet<FieldId>;

/// Shared value of a field across the objects a control is bound to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ControlValue {
    /// Every bound object reports this value.
    Uniform(serde_json::Value),
    /// Bound objects disagree.
    Mixed,
    /// No bound object exposes a value.
    Unset,
}

impl ControlValue {
    /// Combine the values of two controls bound to disjoint object groups.
    pub fn combine(&self, other: &ControlValue) -> ControlValue {
        match (self, other) {
            (ControlValue::Unset, ControlValue::Unset) => ControlValue::Unset,
            (ControlValue::Uniform(a), ControlValue::Uniform(b)) if a == b => {
                ControlValue::Uniform(a.clone())
            }
            _ => ControlValue::Mixed,
        }
    }
}

impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlValue::Uniform(value) => write!(f, "{}", value),
            ControlValue::Mixed => f.write_str("<mixed>"),
            ControlValue::Unset => f.write_str("-"),
        }
    }
}

/// A single editing control bound to one or more objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub field: FieldId,
    /// Widget kind the layout engine should create (e.g. "slider", "color").
    pub widget: String,
    pub bindings: Vec<ObjectId>,
    pub value: ControlValue,
}

impl Control {
    pub fn new(field: impl Into<FieldId>, widget: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            widget: widget.into(),
            bindings: Vec::new(),
            value: ControlValue::Unset,
        }
    }

    pub fn bound_to(mut self, bindings: Vec<ObjectId>) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn with_value(mut self, value: ControlValue) -> Self {
        self.value = value;
        self
    }
}

/// Ordered collection of controls, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Control>", into = "Vec<Control>")]
pub struct ControlSet {
    controls: Vec<Control>,
    index: BTreeMap<FieldId, usize>,
}

impl ControlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a control; a control for an already present field replaces it in place.
    pub fn push(&mut self, control: Control) {
        match self.index.get(&control.field) {
            Some(&slot) => self.controls[slot] = control,
            None => {
                self.index.insert(control.field.clone(), self.controls.len());
                self.controls.push(control);
            }
        }
    }

    pub fn get(&self, field: &FieldId) -> Option<&Control> {
        self.index.get(field).map(|&slot| &self.controls[slot])
    }

    pub fn contains(&self, field: &FieldId) -> bool {
        self.index.contains_key(field)
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Control> {
        self.controls.iter()
    }

    pub fn field_set(&self) -> FieldSet {
        self.index.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

impl FromIterator<Control> for ControlSet {
    fn from_iter<T: IntoIterator<Item = Control>>(iter: T) -> Self {
        let mut set = ControlSet::new();
        for control in iter {
            set.push(control);
        }
        set
    }
}

impl From<Vec<Control>> for ControlSet {
    fn from(value: Vec<Control>) -> Self {
        value.into_iter().collect()
    }
}

impl From<ControlSet> for Vec<Control> {
    fn from(value: ControlSet) -> Self {
        value.controls
    }
}

impl<'a> IntoIterator for &'a ControlSet {
    type Item = &'a Control;
    type IntoIter = std::slice::Iter<'a, Control>;

    fn into_iter(self) -> Self::IntoIter {
        self.controls.iter()
    }
}

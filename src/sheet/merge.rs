//! Merge policy: combine per-bucket field sets into one sheet.

use crate::selection::Style;
use crate::sheet::controls::{Control, ControlSet, FieldSet};

/// Combine field sets per style.
///
/// Intersection of zero sets is empty.
pub fn merge_field_sets(sets: &[FieldSet], style: Style) -> FieldSet {
    match style {
        Style::Union => sets.iter().flatten().cloned().collect(),
        Style::Intersection => {
            let Some((first, rest)) = sets.split_first() else {
                return FieldSet::new();
            };
            first
                .iter()
                .filter(|field| rest.iter().all(|set| set.contains(*field)))
                .cloned()
                .collect()
        }
    }
}

impl ControlSet {
    /// Merge per-bucket control sets, given in bucket key order.
    ///
    /// Field order follows first appearance. A merged control uses the widget
    /// of the first bucket that has the field, binds every contributing
    /// bucket's objects, and combines their values.
    pub fn merge(sets: Vec<ControlSet>, style: Style) -> ControlSet {
        if sets.len() == 1 {
            return sets.into_iter().next().unwrap_or_default();
        }

        let field_sets: Vec<FieldSet> = sets.iter().map(ControlSet::field_set).collect();
        let keep = merge_field_sets(&field_sets, style);

        let mut merged = ControlSet::new();
        for set in &sets {
            for control in set {
                if !keep.contains(&control.field) {
                    continue;
                }
                let combined = match merged.get(&control.field) {
                    Some(existing) => {
                        let mut bindings = existing.bindings.clone();
                        bindings.extend(control.bindings.iter().cloned());
                        Control {
                            field: existing.field.clone(),
                            widget: existing.widget.clone(),
                            bindings,
                            value: existing.value.combine(&control.value),
                        }
                    }
                    None => control.clone(),
                };
                merged.push(combined);
            }
        }
        merged
    }
}

//! Property-based tests for determinism guarantees

use proptest::prelude::*;
use propsheet::schema::SceneObject;
use propsheet::selection::{FieldFlags, Handle, Inspectable, ObjectId, Style, TypeSignature};
use propsheet::sheet::{bucket, merge_field_sets, FieldId, FieldSet};
use std::sync::Arc;

const TYPES: &[&str] = &["Camera", "Light", "Mesh"];

struct Flagged {
    id: String,
    signature: TypeSignature,
}

impl Inspectable for Flagged {
    fn object_id(&self) -> ObjectId {
        ObjectId::new(self.id.clone())
    }

    fn type_signature(&self) -> TypeSignature {
        self.signature.clone()
    }
}

fn selection(spec: &[(usize, u32)]) -> Vec<Handle> {
    spec.iter()
        .enumerate()
        .map(|(i, (type_index, include))| {
            let signature = TypeSignature::new(TYPES[*type_index])
                .with_flags(FieldFlags::from_bits(*include), FieldFlags::HIDDEN);
            Arc::new(Flagged {
                id: format!("obj-{}", i),
                signature,
            }) as Handle
        })
        .collect()
}

fn field_set(names: &[u8]) -> FieldSet {
    names.iter().map(|n| FieldId::new(format!("f{}", n))).collect()
}

fn ids(handles: &[Handle]) -> Vec<ObjectId> {
    handles.iter().map(|h| h.object_id()).collect()
}

/// Same selection always yields the same buckets in the same order
#[test]
fn test_bucketing_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec((0..TYPES.len(), 0u32..4), 0..24),
            |spec| {
                let handles = selection(&spec);
                let first = bucket(&handles);
                let second = bucket(&handles);

                let first_layout: Vec<_> = first.iter().map(|(k, v)| (k.clone(), ids(v))).collect();
                let second_layout: Vec<_> =
                    second.iter().map(|(k, v)| (k.clone(), ids(v))).collect();
                assert_eq!(first_layout, second_layout);

                // Keys come out sorted.
                let keys: Vec<_> = first.keys().cloned().collect();
                let mut sorted = keys.clone();
                sorted.sort();
                assert_eq!(keys, sorted);

                Ok(())
            },
        )
        .unwrap();
}

/// Every handle lands in exactly one bucket, in selection order
#[test]
fn test_bucketing_preserves_handles_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec((0..TYPES.len(), 0u32..4), 0..24),
            |spec| {
                let handles = selection(&spec);
                let buckets = bucket(&handles);

                let total: usize = buckets.values().map(Vec::len).sum();
                assert_eq!(total, handles.len());

                for (key, members) in &buckets {
                    let expected: Vec<ObjectId> = handles
                        .iter()
                        .filter(|h| {
                            let signature = h.type_signature();
                            signature.type_name == key.type_name
                                && signature.include == key.include
                                && signature.exclude == key.exclude
                        })
                        .map(|h| h.object_id())
                        .collect();
                    assert_eq!(ids(members), expected);
                }

                Ok(())
            },
        )
        .unwrap();
}

/// Intersection is contained in every set; every set is contained in the union
#[test]
fn test_merge_bounds_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec(prop::collection::vec(0u8..12, 0..8), 1..6),
            |raw| {
                let sets: Vec<FieldSet> = raw.iter().map(|names| field_set(names)).collect();
                let intersection = merge_field_sets(&sets, Style::Intersection);
                let union = merge_field_sets(&sets, Style::Union);

                for set in &sets {
                    assert!(intersection.is_subset(set));
                    assert!(set.is_subset(&union));
                }

                Ok(())
            },
        )
        .unwrap();
}

/// Merge result does not depend on bucket order
#[test]
fn test_merge_order_independence_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec(prop::collection::vec(0u8..12, 0..8), 0..6),
            |raw| {
                let sets: Vec<FieldSet> = raw.iter().map(|names| field_set(names)).collect();
                let mut reversed = sets.clone();
                reversed.reverse();

                for style in [Style::Intersection, Style::Union] {
                    assert_eq!(
                        merge_field_sets(&sets, style),
                        merge_field_sets(&reversed, style)
                    );
                }

                Ok(())
            },
        )
        .unwrap();
}

/// Scene objects of one type share a bucket
#[test]
fn test_scene_objects_of_one_type_share_a_bucket() {
    let handles: Vec<Handle> = (0..5)
        .map(|i| Arc::new(SceneObject::new(format!("L{}", i), "Light")) as Handle)
        .collect();

    let buckets = bucket(&handles);
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets.values().next().map(Vec::len), Some(5));
}

/// Intersection of nothing is empty
#[test]
fn test_merge_of_no_sets_is_empty() {
    assert!(merge_field_sets(&[], Style::Intersection).is_empty());
    assert!(merge_field_sets(&[], Style::Union).is_empty());
}

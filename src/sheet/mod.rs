//! Sheet domain: control sets, type bucketing, and the field merge policy.
//! Pure data and functions; generation scheduling lives in `generation`.

pub mod bucket;
pub mod controls;
pub mod merge;

pub use bucket::{bucket, Buckets, TypeBucketKey};
pub use controls::{Control, ControlSet, ControlValue, FieldId, FieldSet};
pub use merge::merge_field_sets;

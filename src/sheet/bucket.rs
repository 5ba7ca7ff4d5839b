//! Type bucketing: partition a selection into groups sharing an effective type.

use crate::selection::{FieldFlags, Handle, TypeSignature};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Key identifying one bucket. Ordered by type name, then include flags,
/// then exclude flags; the order decides sheet layout across buckets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeBucketKey {
    pub type_name: Arc<str>,
    pub include: FieldFlags,
    pub exclude: FieldFlags,
}

impl From<TypeSignature> for TypeBucketKey {
    fn from(signature: TypeSignature) -> Self {
        Self {
            type_name: signature.type_name,
            include: signature.include,
            exclude: signature.exclude,
        }
    }
}

impl fmt::Display for TypeBucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[+{:#x} -{:#x}]",
            self.type_name,
            self.include.bits(),
            self.exclude.bits()
        )
    }
}

/// Selection grouped by bucket key, iterated in key order.
pub type Buckets = BTreeMap<TypeBucketKey, Vec<Handle>>;

/// Group handles by their effective type signature.
///
/// Handles keep their selection order inside each bucket.
pub fn bucket(selection: &[Handle]) -> Buckets {
    let mut buckets = Buckets::new();
    for handle in selection {
        let key = TypeBucketKey::from(handle.type_signature());
        buckets.entry(key).or_default().push(Arc::clone(handle));
    }
    buckets
}

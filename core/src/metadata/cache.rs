//! # Metadata Cache
//!
//! Memoizes one [`RecordDescriptor`] per record type.

use super::RecordDescriptor;
use crate::error::CodecResult;
use crate::record::Record;
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;

/// Concurrent descriptor cache keyed by record type.
///
/// Descriptors are built outside any shard lock. Two first-time lookups of
/// the same type may both build; the first insert wins and every caller gets
/// the retained descriptor. Failed builds are not stored.
#[derive(Debug, Default)]
pub struct MetadataCache {
    descriptors: DashMap<TypeId, Arc<RecordDescriptor>>,
}

impl MetadataCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the descriptor of `R`, building it on first use.
    pub fn get<R: Record>(&self) -> CodecResult<Arc<RecordDescriptor>> {
        let key = TypeId::of::<R>();
        if let Some(hit) = self.descriptors.get(&key) {
            tracing::trace!(record = R::type_name(), "descriptor cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        let built = Arc::new(RecordDescriptor::build::<R>()?);
        let retained = Arc::clone(self.descriptors.entry(key).or_insert(built).value());
        tracing::debug!(
            record = R::type_name(),
            fields = retained.fields().len(),
            "cached record descriptor"
        );
        Ok(retained)
    }

    /// Whether the descriptor of `R` has been built.
    pub fn contains<R: Record>(&self) -> bool {
        self.descriptors.contains_key(&TypeId::of::<R>())
    }

    /// Number of cached descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

//! # Marshaler
//!
//! Walks a record through its cached descriptor and produces the nested
//! value tree the encoder writes out.

use crate::error::{CodecError, CodecResult};
use crate::metadata::MetadataCache;
use crate::path::FieldPath;
use crate::record::{FieldKind, Record};
use crate::value::{ParamMap, ParamValue};

/// State shared by one marshal call.
#[derive(Debug, Clone, Copy)]
pub struct MarshalContext<'a> {
    cache: &'a MetadataCache,
}

impl<'a> MarshalContext<'a> {
    /// Creates a context over a descriptor cache.
    pub fn new(cache: &'a MetadataCache) -> Self {
        Self { cache }
    }

    /// The descriptor cache.
    pub fn cache(&self) -> &'a MetadataCache {
        self.cache
    }
}

/// Marshals the parameter fields of `record` into a mapping keyed by wire name.
///
/// Body fields are not part of the parameter tree and are skipped.
pub fn marshal_record<R: Record>(
    record: &R,
    cx: &MarshalContext<'_>,
    path: &FieldPath,
) -> CodecResult<ParamMap> {
    let descriptor = cx.cache.get::<R>()?;
    let mut out = ParamMap::with_capacity(descriptor.fields().len());

    for field in descriptor.fields().iter().filter(|f| !f.is_body()) {
        let field_path = path.field(field.source_name);
        let value = record
            .field(field.source_name)
            .ok_or_else(|| CodecError::UnsupportedType {
                path: field_path.to_string(),
                reason: format!("{} has no accessor for this field", descriptor.type_name()),
            })?;

        if field.omit_default && value.is_default_value() {
            continue;
        }

        match value.marshal_value(cx, &field_path)? {
            Some(ParamValue::Map(entries)) if field.embedded => {
                for (key, entry) in entries {
                    out.entry(key).or_insert(entry);
                }
            }
            Some(value) => {
                out.insert(field.wire_name.clone(), value);
            }
            None if field.kind == FieldKind::List && field.required() => {
                out.insert(field.wire_name.clone(), ParamValue::List(Vec::new()));
            }
            None => {}
        }
    }
    Ok(out)
}

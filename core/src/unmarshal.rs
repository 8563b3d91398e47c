//! # Unmarshaler
//!
//! Binds a nested value tree onto a record through its cached descriptor.
//! Missing keys leave fields at their defaults; shape mismatches fail with
//! the full field path.

use crate::convert::ConverterRegistry;
use crate::error::{CodecError, CodecResult};
use crate::metadata::MetadataCache;
use crate::path::FieldPath;
use crate::record::Record;
use crate::value::{ParamMap, ParamValue};
use std::borrow::Cow;

/// State shared by one unmarshal call.
#[derive(Debug, Clone, Copy)]
pub struct UnmarshalContext<'a> {
    cache: &'a MetadataCache,
    converters: &'a ConverterRegistry,
}

impl<'a> UnmarshalContext<'a> {
    /// Creates a context over a descriptor cache and a converter registry.
    pub fn new(cache: &'a MetadataCache, converters: &'a ConverterRegistry) -> Self {
        Self { cache, converters }
    }

    /// The descriptor cache.
    pub fn cache(&self) -> &'a MetadataCache {
        self.cache
    }

    /// The converter registry used for leaf conversions.
    pub fn converters(&self) -> &'a ConverterRegistry {
        self.converters
    }
}

/// The text of a leaf value. Lists, maps and binaries are a type mismatch:
/// nested values are never stringified.
pub fn leaf_text<'v>(value: &'v ParamValue, path: &FieldPath) -> CodecResult<Cow<'v, str>> {
    value.scalar_text().ok_or_else(|| CodecError::TypeMismatch {
        path: path.to_string(),
        expected: "scalar",
        found: value.shape_name(),
    })
}

/// Populates `record` from a mapping keyed by wire name.
pub fn unmarshal_record<R: Record>(
    record: &mut R,
    map: &ParamMap,
    cx: &UnmarshalContext<'_>,
    path: &FieldPath,
) -> CodecResult<()> {
    let descriptor = cx.cache.get::<R>()?;

    for field in descriptor.fields() {
        let field_path = path.field(field.source_name);
        let target = record
            .field_mut(field.source_name)
            .ok_or_else(|| CodecError::UnsupportedType {
                path: field_path.to_string(),
                reason: format!("{} has no accessor for this field", descriptor.type_name()),
            })?;

        if field.embedded {
            // A same-named sub-mapping wins; otherwise the embedded record
            // sees the whole current level.
            match map.get(&field.wire_name) {
                Some(ParamValue::Map(sub)) => target.unmarshal_map(sub, cx, &field_path)?,
                _ => target.unmarshal_map(map, cx, &field_path)?,
            }
            continue;
        }

        if let Some(value) = map.get(&field.wire_name) {
            target.unmarshal_value(value, cx, &field_path)?;
        }
    }
    Ok(())
}

/// Populates a record-shaped field from a tree value, which must be a mapping.
pub fn unmarshal_record_value<R: Record>(
    record: &mut R,
    value: &ParamValue,
    cx: &UnmarshalContext<'_>,
    path: &FieldPath,
) -> CodecResult<()> {
    match value {
        ParamValue::Map(map) => unmarshal_record(record, map, cx, path),
        other => Err(CodecError::TypeMismatch {
            path: path.to_string(),
            expected: "map",
            found: other.shape_name(),
        }),
    }
}

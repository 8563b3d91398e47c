//! Top-level shape normalization applied before unmarshaling decoded
//! parameters: a scalar bound to a list field becomes a one-element list, a
//! flat `k,v,k,v` list bound to a record field becomes a mapping and a
//! comma-split text list bound to a leaf field is joined back.

use crate::metadata::FieldDescriptor;
use crate::record::FieldKind;
use crate::value::{ParamMap, ParamValue};

/// Normalizes one value against the shape of its field.
pub(crate) fn normalize_value(value: ParamValue, kind: FieldKind) -> ParamValue {
    match (kind, value) {
        (FieldKind::List, value) if value.is_scalar() => ParamValue::List(vec![value]),
        (FieldKind::Record, ParamValue::List(items))
            if items.len() % 2 == 0 && items.iter().all(ParamValue::is_scalar) =>
        {
            let mut map = ParamMap::with_capacity(items.len() / 2);
            let mut iter = items.into_iter();
            while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
                if let Some(key) = key.scalar_text() {
                    map.insert(key.into_owned(), value);
                }
            }
            ParamValue::Map(map)
        }
        (FieldKind::Leaf, ParamValue::List(items))
            if !items.is_empty() && items.iter().all(|item| item.as_str().is_some()) =>
        {
            let parts: Vec<&str> = items.iter().filter_map(ParamValue::as_str).collect();
            ParamValue::String(parts.join(","))
        }
        (_, value) => value,
    }
}

/// Normalizes the entries of `map` bound to `fields`.
pub(crate) fn normalize_map(mut map: ParamMap, fields: &[FieldDescriptor]) -> ParamMap {
    for field in fields {
        if let Some(slot) = map.get_mut(&field.wire_name) {
            let value = std::mem::replace(slot, ParamValue::List(Vec::new()));
            *slot = normalize_value(value, field.kind);
        }
    }
    map
}

//! Keyless (simple, label) and matrix decoding.

use super::pairs::unescape;
use super::ShapeHint;
use crate::error::{CodecError, CodecResult};
use crate::value::{ParamMap, ParamValue};
use indexmap::IndexMap;

fn unescape_all(parts: &[&str]) -> CodecResult<Vec<String>> {
    parts.iter().map(|part| unescape(part, false)).collect()
}

fn strings(values: Vec<String>) -> ParamValue {
    ParamValue::List(values.into_iter().map(ParamValue::String).collect())
}

/// `k=v` for every part, or `None`.
fn key_value_parts(parts: &[&str]) -> CodecResult<Option<ParamMap>> {
    if parts.is_empty() || !parts.iter().all(|part| part.contains('=')) {
        return Ok(None);
    }
    let mut map = ParamMap::with_capacity(parts.len());
    for part in parts {
        let (key, value) = part.split_once('=').unwrap_or((part, ""));
        map.insert(unescape(key, false)?, ParamValue::String(unescape(value, false)?));
    }
    Ok(Some(map))
}

/// Alternating `k,v,k,v` pairs.
fn alternating_pairs(values: Vec<String>) -> ParamValue {
    let mut map = ParamMap::with_capacity(values.len() / 2);
    let mut iter = values.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        map.insert(key, ParamValue::String(value));
    }
    ParamValue::Map(map)
}

/// simple: comma-split into a list when the value contains `,`, else a scalar.
pub(crate) fn decode_simple(raw: &str, explode: bool, hint: ShapeHint) -> CodecResult<ParamValue> {
    let parts: Vec<&str> = raw.split(',').collect();

    if hint == ShapeHint::Object {
        if explode {
            if let Some(map) = key_value_parts(&parts)? {
                return Ok(ParamValue::Map(map));
            }
        }
        let values = unescape_all(&parts)?;
        if values.len() % 2 == 0 {
            return Ok(alternating_pairs(values));
        }
        return Ok(strings(values));
    }

    if parts.len() == 1 {
        return unescape(raw, false).map(ParamValue::String);
    }
    Ok(strings(unescape_all(&parts)?))
}

/// label: strip the leading `.`, split on `.` (exploded) or `,`.
///
/// All `k=v` parts (exploded) form a map; an even count above one forms a
/// map of alternating pairs; anything else is a list. A leaf hint keeps a
/// single part as a scalar and a list hint never pairs.
pub(crate) fn decode_label(raw: &str, explode: bool, hint: ShapeHint) -> CodecResult<ParamValue> {
    let body = raw.strip_prefix('.').unwrap_or(raw);
    let separator = if explode { '.' } else { ',' };
    let parts: Vec<&str> = body.split(separator).collect();
    let pairs_allowed = matches!(hint, ShapeHint::Any | ShapeHint::Object);

    if explode && pairs_allowed {
        if let Some(map) = key_value_parts(&parts)? {
            return Ok(ParamValue::Map(map));
        }
    }
    if parts.len() == 1 && hint == ShapeHint::Scalar {
        return unescape(body, false).map(ParamValue::String);
    }

    let values = unescape_all(&parts)?;
    if values.len() > 1 && values.len() % 2 == 0 && pairs_allowed {
        return Ok(alternating_pairs(values));
    }
    Ok(strings(values))
}

/// matrix: strip the leading `;`, then `;`-separated `key=value` pairs.
/// Exploded repeated keys accumulate; a non-exploded value is comma-split.
pub(crate) fn decode_matrix(raw: &str, explode: bool) -> CodecResult<ParamMap> {
    let body = raw.strip_prefix(';').unwrap_or(raw);
    let mut grouped: IndexMap<String, Vec<&str>> = IndexMap::new();

    for segment in body.split(';').filter(|s| !s.is_empty()) {
        let Some((key, value)) = segment.split_once('=') else {
            return Err(CodecError::format(segment, "matrix parameter is missing '='"));
        };
        if key.is_empty() {
            return Err(CodecError::format(segment, "matrix parameter has an empty name"));
        }
        grouped.entry(unescape(key, false)?).or_default().push(value);
    }

    let mut out = ParamMap::with_capacity(grouped.len());
    for (key, raw_values) in grouped {
        let value = match raw_values.as_slice() {
            [single] if !explode && single.contains(',') => {
                strings(unescape_all(&single.split(',').collect::<Vec<_>>())?)
            }
            [single] => ParamValue::String(unescape(single, false)?),
            many => strings(unescape_all(many)?),
        };
        out.insert(key, value);
    }
    Ok(out)
}

//! deepObject decoding: `user[profile][name]=x` nests, `ids[]=1` appends.

use super::pairs::{split_pairs, strip_query_prefix, unescape};
use super::tree::Tree;
use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};
use crate::value::{ParamMap, ParamValue};

/// Decodes deepObject pairs into a nested mapping.
pub(crate) fn decode_deep_object(raw: &str, config: &CodecConfig) -> CodecResult<ParamMap> {
    let mut tree = Tree::new(config.max_depth);
    for (raw_key, value) in split_pairs(strip_query_prefix(raw), '&') {
        let key = unescape(raw_key, true)?;
        let (segments, append) = parse_bracket_key(&key)?;
        tree.insert(&key, &segments, value, append)?;
    }
    tree.finish(&finish_leaf)
}

fn finish_leaf(_key: &str, raw: Vec<String>, force_list: bool) -> CodecResult<ParamValue> {
    let mut values = raw
        .iter()
        .map(|value| unescape(value, true).map(ParamValue::String))
        .collect::<CodecResult<Vec<_>>>()?;
    if values.len() == 1 && !force_list {
        return Ok(values.remove(0));
    }
    Ok(ParamValue::List(values))
}

/// Splits `base[a][b]` into `["base", "a", "b"]`. A trailing `[]` sets the
/// append flag.
pub(crate) fn parse_bracket_key(key: &str) -> CodecResult<(Vec<String>, bool)> {
    let Some(open) = key.find('[') else {
        if key.contains(']') {
            return Err(CodecError::format(key, "']' without a matching '['"));
        }
        return Ok((vec![key.to_string()], false));
    };

    let base = &key[..open];
    if base.is_empty() {
        return Err(CodecError::format(key, "missing name before '['"));
    }
    if base.contains(']') {
        return Err(CodecError::format(key, "']' without a matching '['"));
    }

    let mut segments = vec![base.to_string()];
    let mut rest = &key[open..];
    while !rest.is_empty() {
        let Some(inner_and_tail) = rest.strip_prefix('[') else {
            return Err(CodecError::format(key, "unexpected characters after ']'"));
        };
        let Some(close) = inner_and_tail.find(']') else {
            return Err(CodecError::format(key, "unclosed '['"));
        };
        let inner = &inner_and_tail[..close];
        rest = &inner_and_tail[close + 1..];

        if inner.contains('[') {
            return Err(CodecError::format(key, "'[' inside brackets"));
        }
        if inner.is_empty() {
            if rest.is_empty() {
                return Ok((segments, true));
            }
            return Err(CodecError::format(key, "empty brackets before the end of the key"));
        }
        segments.push(inner.to_string());
    }
    Ok((segments, false))
}

//! Form, spaceDelimited and pipeDelimited decoding.

use super::pairs::{split_pairs, strip_query_prefix, unescape};
use super::tree::Tree;
use crate::config::CodecConfig;
use crate::error::CodecResult;
use crate::style::Style;
use crate::value::{ParamMap, ParamValue};
use indexmap::IndexMap;

/// Input syntax of a form-encoded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormSyntax {
    /// `a=1&b=2`, `+` is a space.
    Query,
    /// `a=1; b=2` as in a `Cookie` header.
    Cookie,
}

impl FormSyntax {
    fn separator(self) -> char {
        match self {
            FormSyntax::Query => '&',
            FormSyntax::Cookie => ';',
        }
    }

    fn plus_as_space(self) -> bool {
        self == FormSyntax::Query
    }
}

/// Decodes `key=value` pairs. Dotted keys nest, repeated keys become lists
/// and a single value containing `,` is split into a list.
pub(crate) fn decode_form(raw: &str, syntax: FormSyntax, config: &CodecConfig) -> CodecResult<ParamMap> {
    let raw = match syntax {
        FormSyntax::Query => strip_query_prefix(raw),
        FormSyntax::Cookie => raw,
    };
    let plus = syntax.plus_as_space();
    let mut tree = Tree::new(config.max_depth);

    for (key, value) in split_pairs(raw, syntax.separator()) {
        let segments = key
            .split('.')
            .map(|segment| unescape(segment, plus))
            .collect::<CodecResult<Vec<_>>>()?;
        tree.insert(key, &segments, value.trim_end(), false)?;
    }

    let finish = |key: &str, raw: Vec<String>, _force_list: bool| -> CodecResult<ParamValue> {
        finish_form_leaf(key, raw, plus)
    };
    tree.finish(&finish)
}

fn finish_form_leaf(_key: &str, raw: Vec<String>, plus: bool) -> CodecResult<ParamValue> {
    if let [single] = raw.as_slice() {
        if !single.contains(',') {
            return unescape(single, plus).map(ParamValue::String);
        }
        return split_list(single, &[","], plus);
    }
    raw.iter()
        .map(|value| unescape(value, plus).map(ParamValue::String))
        .collect::<CodecResult<Vec<_>>>()
        .map(ParamValue::List)
}

/// Decodes spaceDelimited / pipeDelimited pairs. Keys are flat and every
/// value is a list.
pub(crate) fn decode_delimited(raw: &str, style: Style) -> CodecResult<ParamMap> {
    let separators: &[&str] = match style {
        Style::PipeDelimited => &["|", "%7C", "%7c"],
        _ => &[" ", "+", "%20"],
    };

    let mut grouped: IndexMap<String, Vec<ParamValue>> = IndexMap::new();
    for (key, value) in split_pairs(strip_query_prefix(raw), '&') {
        let key = unescape(key, true)?;
        let ParamValue::List(items) = split_list(value, separators, true)? else {
            continue;
        };
        grouped.entry(key).or_default().extend(items);
    }
    Ok(grouped
        .into_iter()
        .map(|(key, items)| (key, ParamValue::List(items)))
        .collect())
}

/// Splits a raw value on any of `separators` before unescaping each piece.
/// An empty value is an empty list.
pub(crate) fn split_list(raw: &str, separators: &[&str], plus: bool) -> CodecResult<ParamValue> {
    if raw.is_empty() {
        return Ok(ParamValue::List(Vec::new()));
    }
    let mut pieces = vec![raw];
    for separator in separators {
        pieces = pieces
            .into_iter()
            .flat_map(|piece| piece.split(separator))
            .collect();
    }
    // '+' was consumed as a separator when listed; never turn it into a space.
    let plus = plus && !separators.contains(&"+");
    pieces
        .into_iter()
        .map(|piece| unescape(piece, plus).map(ParamValue::String))
        .collect::<CodecResult<Vec<_>>>()
        .map(ParamValue::List)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form(raw: &str) -> CodecResult<ParamMap> {
        decode_form(raw, FormSyntax::Query, &CodecConfig::default())
    }

    fn map(entries: Vec<(&str, ParamValue)>) -> ParamMap {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_repeated_keys_become_list() {
        assert_eq!(
            form("ids=1&ids=2&ids=3").unwrap(),
            map(vec![("ids", ParamValue::from(vec!["1", "2", "3"]))])
        );
    }

    #[test]
    fn test_single_value_comma_split() {
        assert_eq!(
            form("?ids=1,2,3&name=a%2Cb").unwrap(),
            map(vec![
                ("ids", ParamValue::from(vec!["1", "2", "3"])),
                ("name", ParamValue::from("a,b")),
            ])
        );
    }

    #[test]
    fn test_dotted_keys_nest() {
        let decoded = form("filter.type=car&filter.color=red&q=hello+world").unwrap();
        let filter = decoded["filter"].as_map().unwrap();
        assert_eq!(filter["type"], ParamValue::from("car"));
        assert_eq!(filter["color"], ParamValue::from("red"));
        assert_eq!(decoded["q"], ParamValue::from("hello world"));
    }

    #[test]
    fn test_leaf_prefix_conflict() {
        let err = form("a=1&a.b=2").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_missing_value_is_empty() {
        assert_eq!(form("flag").unwrap(), map(vec![("flag", ParamValue::from(""))]));
    }

    #[test]
    fn test_cookie_syntax() {
        let decoded = decode_form("session=abc; ids=1,2; name=a+b", FormSyntax::Cookie, &CodecConfig::default())
            .unwrap();
        assert_eq!(decoded["session"], ParamValue::from("abc"));
        assert_eq!(decoded["ids"], ParamValue::from(vec!["1", "2"]));
        assert_eq!(decoded["name"], ParamValue::from("a+b"));
    }

    #[test]
    fn test_depth_limit() {
        let config = CodecConfig {
            max_depth: 2,
            ..CodecConfig::default()
        };
        assert!(decode_form("a.b=1", FormSyntax::Query, &config).is_ok());
        assert!(decode_form("a.b.c=1", FormSyntax::Query, &config).is_err());
    }

    #[test]
    fn test_space_delimited_separators() {
        let decoded = decode_delimited("ids=1%202+3 4", Style::SpaceDelimited).unwrap();
        assert_eq!(decoded["ids"], ParamValue::from(vec!["1", "2", "3", "4"]));
    }

    #[test]
    fn test_pipe_delimited() {
        let decoded = decode_delimited("ids=1|2%7C3&one=x", Style::PipeDelimited).unwrap();
        assert_eq!(decoded["ids"], ParamValue::from(vec!["1", "2", "3"]));
        assert_eq!(decoded["one"], ParamValue::from(vec!["x"]));
    }

    #[test]
    fn test_delimited_empty_value() {
        let decoded = decode_delimited("ids=", Style::PipeDelimited).unwrap();
        assert_eq!(decoded["ids"], ParamValue::List(Vec::new()));
    }
}

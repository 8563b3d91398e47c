//! # Encoder
//!
//! The inverse of the decoder: writes a nested value tree out as a raw
//! parameter string for one `(location, style, explode)`.
//!
//! Keyed styles take a mapping of parameter name to value. Keyless styles
//! (simple, label) take the value itself.

mod escape;
mod keyed;
mod keyless;

use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};
use crate::options::Options;
use crate::style::{ParameterLocation, Style};
use crate::value::{ParamMap, ParamValue};
use escape::EscapeSet;
use std::borrow::Cow;

/// Path used in errors about the value as a whole.
const ROOT: &str = "$";

/// Encodes `value` according to `options`.
///
/// A query-location result gets a leading `?` when
/// [`CodecConfig::query_prefix`] is set.
///
/// # Examples
/// ```
/// use oas_params_core::{encode, CodecConfig, Options, ParamMap, ParamValue};
///
/// let mut params = ParamMap::new();
/// params.insert("ids".into(), ParamValue::from(vec!["1", "2", "3"]));
/// let raw = encode(&ParamValue::Map(params), &Options::default(), &CodecConfig::default()).unwrap();
/// assert_eq!(raw, "ids=1&ids=2&ids=3");
/// ```
pub fn encode(value: &ParamValue, options: &Options, config: &CodecConfig) -> CodecResult<String> {
    let encoded = encode_bare(value, options, config)?;
    if config.query_prefix && options.location() == ParameterLocation::Query && !encoded.is_empty() {
        return Ok(format!("?{}", encoded));
    }
    Ok(encoded)
}

/// Encodes without the `?` prefix.
pub(crate) fn encode_bare(
    value: &ParamValue,
    options: &Options,
    config: &CodecConfig,
) -> CodecResult<String> {
    let writer = Writer::new(options, config);
    match options.style() {
        Style::Simple => writer.simple(value),
        Style::Label => writer.label(value),
        Style::Form => writer.form(named(value, options.style())?),
        Style::SpaceDelimited | Style::PipeDelimited => {
            writer.delimited(named(value, options.style())?)
        }
        Style::DeepObject => writer.deep_object(named(value, options.style())?),
        Style::Matrix => writer.matrix(named(value, options.style())?),
    }
}

fn named(value: &ParamValue, style: Style) -> CodecResult<&ParamMap> {
    value.as_map().ok_or_else(|| CodecError::UnsupportedType {
        path: ROOT.to_string(),
        reason: format!(
            "style '{}' encodes a mapping of named parameters, found {}",
            style,
            value.shape_name()
        ),
    })
}

/// Shared state of one encode call.
pub(crate) struct Writer {
    location: ParameterLocation,
    style: Style,
    explode: bool,
    escape: EscapeSet,
}

impl Writer {
    fn new(options: &Options, config: &CodecConfig) -> Self {
        let escape = match (options.style(), options.location()) {
            (Style::Label, _) => EscapeSet::Label,
            (_, ParameterLocation::Query) if config.allow_reserved => EscapeSet::Reserved,
            _ => EscapeSet::Component,
        };
        Self {
            location: options.location(),
            style: options.style(),
            explode: options.explode(),
            escape,
        }
    }

    fn esc(&self, text: &str) -> String {
        self.escape.escape(text)
    }

    /// The escaped text of a scalar.
    fn scalar(&self, value: &ParamValue, path: &str) -> CodecResult<String> {
        leaf(value, path).map(|text| self.esc(&text))
    }

    /// Escaped scalars of a list.
    fn scalars(&self, items: &[ParamValue], path: &str) -> CodecResult<Vec<String>> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.scalar(item, &format!("{}[{}]", path, i)))
            .collect()
    }

    /// Escaped `key, value` texts of a flat mapping.
    fn flat_pairs(&self, map: &ParamMap, path: &str) -> CodecResult<Vec<(String, String)>> {
        map.iter()
            .map(|(key, value)| Ok((self.esc(key), self.scalar(value, &child(path, key))?)))
            .collect()
    }
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() || path == ROOT {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// The text of a leaf. Containers and binaries cannot be written here.
fn leaf<'v>(value: &'v ParamValue, path: &str) -> CodecResult<Cow<'v, str>> {
    if let ParamValue::Binary(_) = value {
        return Err(CodecError::UnsupportedType {
            path: path.to_string(),
            reason: "binary content cannot be written into a parameter string".into(),
        });
    }
    value.scalar_text().ok_or_else(|| CodecError::UnsupportedType {
        path: path.to_string(),
        reason: format!("a {} cannot be written at this position", value.shape_name()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;
    use crate::error::ErrorKind;
    use crate::value::FilePart;
    use pretty_assertions::assert_eq;

    fn opts(location: ParameterLocation, style: Style, explode: bool) -> Options {
        Options::new(location, style, Some(explode)).unwrap()
    }

    fn params(entries: Vec<(&str, ParamValue)>) -> ParamValue {
        ParamValue::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn nested() -> ParamValue {
        params(vec![(
            "filter",
            params(vec![("type", "car".into()), ("color", "red".into())]),
        )])
    }

    #[test]
    fn test_form_explode_symmetry() {
        let value = params(vec![("ids", ParamValue::from(vec!["1", "2", "3"]))]);
        let config = CodecConfig::default();
        for (explode, expected) in [(true, "ids=1&ids=2&ids=3"), (false, "ids=1,2,3")] {
            let options = opts(ParameterLocation::Query, Style::Form, explode);
            let raw = encode(&value, &options, &config).unwrap();
            assert_eq!(raw, expected);
            assert_eq!(decode(&raw, &options, &config).unwrap(), value);
        }
    }

    #[test]
    fn test_deep_object_brackets() {
        let options = opts(ParameterLocation::Query, Style::DeepObject, true);
        let config = CodecConfig::default();
        let raw = encode(&nested(), &options, &config).unwrap();
        assert!(raw.contains("filter%5Btype%5D=car"));
        assert!(raw.contains("filter%5Bcolor%5D=red"));
        assert_eq!(decode(&raw, &options, &config).unwrap(), nested());
    }

    #[test]
    fn test_form_objects() {
        let config = CodecConfig::default();
        let exploded = encode(&nested(), &opts(ParameterLocation::Query, Style::Form, true), &config)
            .unwrap();
        assert_eq!(exploded, "filter.type=car&filter.color=red");
        let flat = encode(&nested(), &opts(ParameterLocation::Query, Style::Form, false), &config)
            .unwrap();
        assert_eq!(flat, "filter=type,car,color,red");
    }

    #[test]
    fn test_dotted_form_keys_rejected() {
        let config = CodecConfig::default();
        let exploded = opts(ParameterLocation::Query, Style::Form, true);
        let inner = params(vec![("filter", params(vec![("a.b", "1".into())]))]);
        let err = encode(&inner, &exploded, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
        assert!(err.to_string().contains("filter.a.b"));

        let top = params(vec![("utm.source", "x".into())]);
        for explode in [true, false] {
            let options = opts(ParameterLocation::Query, Style::Form, explode);
            assert_eq!(
                encode(&top, &options, &config).unwrap_err().kind(),
                ErrorKind::UnsupportedType
            );
        }

        let deep = opts(ParameterLocation::Query, Style::DeepObject, true);
        assert_eq!(encode(&inner, &deep, &config).unwrap(), "filter%5Ba.b%5D=1");
    }

    #[test]
    fn test_values_are_escaped() {
        let value = params(vec![("q", "a b&c,d".into())]);
        let raw = encode(&value, &Options::default(), &CodecConfig::default()).unwrap();
        assert_eq!(raw, "q=a%20b%26c%2Cd");
    }

    #[test]
    fn test_allow_reserved_and_prefix() {
        let value = params(vec![("path", "/a/b".into())]);
        let config = CodecConfig {
            allow_reserved: true,
            query_prefix: true,
            ..CodecConfig::default()
        };
        assert_eq!(encode(&value, &Options::default(), &config).unwrap(), "?path=/a/b");
    }

    #[test]
    fn test_delimited() {
        let value = params(vec![("ids", ParamValue::from(vec!["1", "2"]))]);
        let config = CodecConfig::default();
        let space = opts(ParameterLocation::Query, Style::SpaceDelimited, false);
        assert_eq!(encode(&value, &space, &config).unwrap(), "ids=1%202");
        let pipe = opts(ParameterLocation::Query, Style::PipeDelimited, false);
        assert_eq!(encode(&value, &pipe, &config).unwrap(), "ids=1|2");
        assert_eq!(decode("ids=1|2", &pipe, &config).unwrap(), value);
    }

    #[test]
    fn test_path_styles() {
        let list = ParamValue::from(vec!["1", "2", "3"]);
        let config = CodecConfig::default();
        let cases = [
            (Style::Simple, false, "1,2,3"),
            (Style::Label, true, ".1.2.3"),
            (Style::Label, false, ".1,2,3"),
        ];
        for (style, explode, expected) in cases {
            let options = opts(ParameterLocation::Path, style, explode);
            assert_eq!(encode(&list, &options, &config).unwrap(), expected);
            assert_eq!(decode(expected, &options, &config).unwrap(), list);
        }

        let matrix = opts(ParameterLocation::Path, Style::Matrix, true);
        let value = params(vec![("ids", list.clone())]);
        assert_eq!(encode(&value, &matrix, &config).unwrap(), ";ids=1;ids=2;ids=3");
        let matrix = opts(ParameterLocation::Path, Style::Matrix, false);
        assert_eq!(encode(&value, &matrix, &config).unwrap(), ";ids=1,2,3");
    }

    #[test]
    fn test_path_objects() {
        let object = params(vec![("role", "admin".into()), ("name", "Alex".into())]);
        let config = CodecConfig::default();
        let cases = [
            (Style::Simple, true, "role=admin,name=Alex"),
            (Style::Simple, false, "role,admin,name,Alex"),
            (Style::Label, true, ".role=admin.name=Alex"),
            (Style::Label, false, ".role,admin,name,Alex"),
        ];
        for (style, explode, expected) in cases {
            let options = opts(ParameterLocation::Path, style, explode);
            assert_eq!(encode(&object, &options, &config).unwrap(), expected);
        }
        let matrix = opts(ParameterLocation::Path, Style::Matrix, true);
        let value = params(vec![("color", object.clone())]);
        assert_eq!(encode(&value, &matrix, &config).unwrap(), ";role=admin;name=Alex");
    }

    #[test]
    fn test_cookie_join() {
        let value = params(vec![("a", "1".into()), ("b", "x y".into())]);
        let raw = encode(
            &value,
            &Options::for_location(ParameterLocation::Cookie),
            &CodecConfig::default(),
        )
        .unwrap();
        assert_eq!(raw, "a=1; b=x%20y");
    }

    #[test]
    fn test_typed_scalars() {
        let value = params(vec![
            ("n", ParamValue::Int(-3)),
            ("ok", ParamValue::Bool(true)),
            ("f", ParamValue::Float(1.5)),
        ]);
        let raw = encode(&value, &Options::default(), &CodecConfig::default()).unwrap();
        assert_eq!(raw, "n=-3&ok=true&f=1.5");
    }

    #[test]
    fn test_unsupported_values() {
        let config = CodecConfig::default();
        let binary = params(vec![("file", FilePart::new(b"x".to_vec()).into())]);
        let err = encode(&binary, &Options::default(), &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);

        let err = encode(&"x".into(), &Options::default(), &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);

        let nested_list = params(vec![("m", ParamValue::List(vec![ParamValue::List(vec![])]))]);
        assert!(encode(&nested_list, &Options::default(), &config).is_err());
    }
}

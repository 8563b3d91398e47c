//! # Decoder
//!
//! Style-specific parsers turning a raw parameter string into a nested
//! value tree.
//!
//! Keyed styles (form, spaceDelimited, pipeDelimited, deepObject, matrix)
//! produce a mapping keyed by parameter name. Keyless styles (simple, label)
//! produce the value itself: a scalar, a list or a mapping.

mod deep_object;
mod form;
mod pairs;
mod path_styles;
mod tree;

pub(crate) use pairs::retain_query_roots;

use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};
use crate::options::Options;
use crate::style::{ParameterLocation, Style};
use crate::value::{ParamMap, ParamValue};

/// The shape the decoded value is headed for. Resolves the even-count
/// ambiguity of label/simple values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ShapeHint {
    /// No expectation.
    #[default]
    Any,
    /// A leaf field.
    Scalar,
    /// A list-shaped field.
    List,
    /// A record-shaped field.
    Object,
}

/// Decodes `raw` according to `options`.
///
/// # Examples
/// ```
/// use oas_params_core::{decode, CodecConfig, Options, ParamValue, ParameterLocation, Style};
///
/// let opts = Options::new(ParameterLocation::Path, Style::Matrix, Some(true)).unwrap();
/// let tree = decode(";ids=1;ids=2", &opts, &CodecConfig::default()).unwrap();
/// assert_eq!(tree.as_map().unwrap()["ids"], ParamValue::from(vec!["1", "2"]));
/// ```
pub fn decode(raw: &str, options: &Options, config: &CodecConfig) -> CodecResult<ParamValue> {
    decode_with_hint(raw, options, config, ShapeHint::Any)
}

pub(crate) fn decode_with_hint(
    raw: &str,
    options: &Options,
    config: &CodecConfig,
    hint: ShapeHint,
) -> CodecResult<ParamValue> {
    match options.style() {
        Style::Simple => path_styles::decode_simple(raw, options.explode(), hint),
        Style::Label => path_styles::decode_label(raw, options.explode(), hint),
        _ => decode_named(raw, options, config).map(ParamValue::Map),
    }
}

/// Decodes a keyed style into its mapping of parameter name to value.
pub(crate) fn decode_named(
    raw: &str,
    options: &Options,
    config: &CodecConfig,
) -> CodecResult<ParamMap> {
    let explode = options.explode();
    match options.style() {
        Style::Form => decode_form(raw, options.location(), config),
        // Exploded delimited arrays are written as repeated keys; the form
        // decoder already reads those into lists.
        Style::SpaceDelimited | Style::PipeDelimited if explode => {
            decode_form(raw, options.location(), config)
        }
        style @ (Style::SpaceDelimited | Style::PipeDelimited) => form::decode_delimited(raw, style),
        Style::DeepObject => deep_object::decode_deep_object(raw, config),
        Style::Matrix => path_styles::decode_matrix(raw, explode),
        style @ (Style::Simple | Style::Label) => Err(CodecError::InvalidOptions {
            location: options.location(),
            style,
            reason: "the style carries no parameter names".into(),
        }),
    }
}

/// Form decoding with the pair syntax of `location`.
pub(crate) fn decode_form(
    raw: &str,
    location: ParameterLocation,
    config: &CodecConfig,
) -> CodecResult<ParamMap> {
    let syntax = match location {
        ParameterLocation::Cookie => form::FormSyntax::Cookie,
        _ => form::FormSyntax::Query,
    };
    form::decode_form(raw, syntax, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn opts(location: ParameterLocation, style: Style, explode: bool) -> Options {
        Options::new(location, style, Some(explode)).unwrap()
    }

    #[test]
    fn test_dispatch_keyed_and_keyless() {
        let config = CodecConfig::default();
        let tree = decode("ids=1&ids=2", &opts(ParameterLocation::Query, Style::Form, true), &config)
            .unwrap();
        assert_eq!(tree.as_map().unwrap()["ids"], ParamValue::from(vec!["1", "2"]));

        let tree = decode("1,2", &opts(ParameterLocation::Header, Style::Simple, false), &config)
            .unwrap();
        assert_eq!(tree, ParamValue::from(vec!["1", "2"]));
    }

    #[test]
    fn test_exploded_pipe_reads_repeated_keys() {
        let tree = decode(
            "ids=1&ids=2",
            &opts(ParameterLocation::Query, Style::PipeDelimited, true),
            &CodecConfig::default(),
        )
        .unwrap();
        assert_eq!(tree.as_map().unwrap()["ids"], ParamValue::from(vec!["1", "2"]));
    }

    #[test]
    fn test_cookie_form_uses_semicolons() {
        let tree = decode(
            "a=1; b=2",
            &Options::for_location(ParameterLocation::Cookie),
            &CodecConfig::default(),
        )
        .unwrap();
        assert_eq!(tree.as_map().unwrap().len(), 2);
    }

    #[test]
    fn test_hint_resolves_label_pairs() {
        let options = opts(ParameterLocation::Path, Style::Label, false);
        let config = CodecConfig::default();
        let as_list = decode_with_hint(".a,b", &options, &config, ShapeHint::List).unwrap();
        assert_eq!(as_list, ParamValue::from(vec!["a", "b"]));
        let as_map = decode_with_hint(".a,b", &options, &config, ShapeHint::Object).unwrap();
        assert!(as_map.as_map().is_some());
    }

    #[test]
    fn test_deep_object_error_kind() {
        let err = decode(
            "a[b=1",
            &opts(ParameterLocation::Query, Style::DeepObject, true),
            &CodecConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }
}

//! Structured body decoders and content-type helpers.

use crate::error::{CodecError, CodecResult};
use crate::value::ParamValue;

/// `application/x-www-form-urlencoded`, decoded with the form decoder.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// `multipart/form-data`.
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Decodes a structured body into a value tree.
///
/// Implementations are selected by the request's content type. Register
/// extra formats (XML, CBOR, ...) with `CodecBuilder::body_decoder`.
pub trait BodyDecoder: Send + Sync {
    /// Whether this decoder handles the (lower-cased, parameter-free) MIME type.
    fn accepts(&self, mime: &str) -> bool;

    /// Decodes the body bytes.
    fn decode(&self, body: &[u8]) -> CodecResult<ParamValue>;
}

/// JSON bodies through `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBodyDecoder;

impl BodyDecoder for JsonBodyDecoder {
    fn accepts(&self, mime: &str) -> bool {
        mime == "application/json" || mime.ends_with("+json")
    }

    fn decode(&self, body: &[u8]) -> CodecResult<ParamValue> {
        let json: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| CodecError::body("application/json", e.to_string()))?;
        ParamValue::from_json(&json)
    }
}

/// The lower-cased MIME type without parameters.
pub fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// A parameter of a content type (`boundary`, `charset`), unquoted.
pub fn mime_param(content_type: &str, name: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

#![deny(missing_docs)]

//! # Value Tree
//!
//! The intermediate representation shared by decoders, encoders, the
//! marshaler and the unmarshaler.

use crate::error::{CodecError, CodecResult};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::fmt;
use std::io::Cursor;

/// An insertion-ordered mapping from wire keys to values.
///
/// Equality ignores order.
pub type ParamMap = IndexMap<String, ParamValue>;

/// One node of the nested value tree.
///
/// Decoders only produce `String`, `List`, `Map` and `Binary`. The typed
/// scalars come from the marshaler and are stringified by the encoder.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A textual leaf.
    String(String),
    /// A boolean leaf.
    Bool(bool),
    /// A signed integer leaf.
    Int(i64),
    /// An unsigned integer leaf.
    UInt(u64),
    /// A floating point leaf.
    Float(f64),
    /// An ordered list.
    List(Vec<ParamValue>),
    /// A nested mapping.
    Map(ParamMap),
    /// File content from a multipart part or a file body.
    Binary(FilePart),
}

impl ParamValue {
    /// Short name of the value's shape, used in error messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            ParamValue::String(_) => "string",
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) | ParamValue::UInt(_) => "integer",
            ParamValue::Float(_) => "number",
            ParamValue::List(_) => "list",
            ParamValue::Map(_) => "map",
            ParamValue::Binary(_) => "binary",
        }
    }

    /// Whether the value is a leaf that can be written as text.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ParamValue::String(_)
                | ParamValue::Bool(_)
                | ParamValue::Int(_)
                | ParamValue::UInt(_)
                | ParamValue::Float(_)
        )
    }

    /// The wire text of a scalar leaf, `None` for containers and binaries.
    pub fn scalar_text(&self) -> Option<Cow<'_, str>> {
        match self {
            ParamValue::String(s) => Some(Cow::Borrowed(s)),
            ParamValue::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            ParamValue::Int(i) => Some(Cow::Owned(i.to_string())),
            ParamValue::UInt(u) => Some(Cow::Owned(u.to_string())),
            ParamValue::Float(f) => Some(Cow::Owned(f.to_string())),
            _ => None,
        }
    }

    /// Borrows the text of a `String` leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrows the elements of a `List`.
    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrows the entries of a `Map`.
    pub fn as_map(&self) -> Option<&ParamMap> {
        match self {
            ParamValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Converts the tree into JSON. Scalars keep their type; binaries become
    /// an object describing the part (the bytes are not inlined).
    pub fn to_json(&self) -> JsonValue {
        match self {
            ParamValue::String(s) => JsonValue::String(s.clone()),
            ParamValue::Bool(b) => JsonValue::Bool(*b),
            ParamValue::Int(i) => JsonValue::from(*i),
            ParamValue::UInt(u) => JsonValue::from(*u),
            ParamValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(f.to_string())),
            ParamValue::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            ParamValue::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            ParamValue::Binary(part) => serde_json::json!({
                "fileName": part.file_name,
                "contentType": part.content_type,
                "size": part.data.len(),
            }),
        }
    }

    /// Converts JSON into a tree.
    ///
    /// Numbers keep their type. `null` object members are dropped (absent
    /// data is never an error); a `null` list element or top-level `null` is
    /// rejected since the tree has no null leaf.
    pub fn from_json(json: &JsonValue) -> CodecResult<Self> {
        from_json_at(json, "$")
    }

    /// Parses JSON text into a tree.
    pub fn from_json_slice(bytes: &[u8]) -> CodecResult<Self> {
        let json: JsonValue = serde_json::from_slice(bytes)?;
        Self::from_json(&json)
    }
}

fn from_json_at(json: &JsonValue, path: &str) -> CodecResult<ParamValue> {
    Ok(match json {
        JsonValue::Null => {
            return Err(CodecError::InvalidElement {
                path: path.to_string(),
                reason: "null has no representation in a parameter tree".into(),
            })
        }
        JsonValue::Bool(b) => ParamValue::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                ParamValue::Int(i)
            } else if let Some(u) = n.as_u64() {
                ParamValue::UInt(u)
            } else {
                ParamValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(s) => ParamValue::String(s.clone()),
        JsonValue::Array(items) => ParamValue::List(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| from_json_at(item, &format!("{}[{}]", path, i)))
                .collect::<CodecResult<_>>()?,
        ),
        JsonValue::Object(obj) => {
            let mut map = ParamMap::with_capacity(obj.len());
            for (key, value) in obj {
                if value.is_null() {
                    continue;
                }
                map.insert(key.clone(), from_json_at(value, &format!("{}.{}", path, key))?);
            }
            ParamValue::Map(map)
        }
    })
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scalar_text() {
            Some(text) => f.write_str(&text),
            None => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<ParamMap> for ParamValue {
    fn from(map: ParamMap) -> Self {
        ParamValue::Map(map)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(items: Vec<T>) -> Self {
        ParamValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<FilePart> for ParamValue {
    fn from(part: FilePart) -> Self {
        ParamValue::Binary(part)
    }
}

/// File content carried by a multipart part or a file body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilePart {
    /// The `filename` of the part's `Content-Disposition`, if any.
    pub file_name: Option<String>,
    /// The part's (or body's) content type, if any.
    pub content_type: Option<String>,
    /// The raw bytes.
    pub data: Vec<u8>,
}

impl FilePart {
    /// Creates a part from raw bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    /// A byte-stream handle over the content.
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(&self.data)
    }

    /// Size of the content in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the content is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

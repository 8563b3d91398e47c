//! Routes each field of a record to its location in a transport request,
//! and back.

use super::body::{mime_essence, BodyDecoder, FORM_URLENCODED};
use super::multipart::parse_multipart;
use super::normalize::{normalize_map, normalize_value};
use super::{EncodedParts, PathParams, TransportRequest};
use crate::config::CodecConfig;
use crate::decode::{decode_form, decode_named, decode_with_hint, retain_query_roots, ShapeHint};
use crate::encode::encode_bare;
use crate::error::{CodecError, CodecResult};
use crate::metadata::{FieldDescriptor, MetadataCache, RecordDescriptor};
use crate::options::Options;
use crate::record::FieldKind;
use crate::style::{BodyKind, ParameterLocation, Style};
use crate::value::{FilePart, ParamMap, ParamValue};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// The request-level collaborators of one `Codec`.
pub(crate) struct Demux<'a> {
    pub(crate) cache: &'a MetadataCache,
    pub(crate) config: &'a CodecConfig,
    pub(crate) bodies: &'a [Box<dyn BodyDecoder>],
}

pub(crate) fn hint_for(kind: FieldKind) -> ShapeHint {
    match kind {
        FieldKind::List => ShapeHint::List,
        FieldKind::Record => ShapeHint::Object,
        FieldKind::Leaf => ShapeHint::Scalar,
        FieldKind::File => ShapeHint::Any,
    }
}

impl Demux<'_> {
    /// Collects every parameter and the body of `request` into one mapping
    /// keyed by wire name.
    pub(crate) fn collect<T: TransportRequest + ?Sized>(
        &self,
        request: &T,
        path_params: &PathParams,
        descriptor: &RecordDescriptor,
    ) -> CodecResult<ParamMap> {
        let mut out = ParamMap::new();
        let mut query_groups: HashMap<(Style, bool), ParamMap> = HashMap::new();
        let mut cookies: Option<ParamMap> = None;
        let fields = descriptor.flattened_params(self.cache)?;

        // Undeclared query keys are dropped before any style decoding.
        let query_names: HashSet<&str> = fields
            .iter()
            .filter(|field| field.location() == Some(ParameterLocation::Query))
            .map(|field| field.wire_name.as_str())
            .collect();
        let query = retain_query_roots(request.query_string(), |root| query_names.contains(root));

        for field in &fields {
            let Some(param) = field.param() else {
                continue;
            };
            let options = param.options;
            tracing::trace!(
                field = field.source_name,
                location = %options.location(),
                style = %options.style(),
                "routing parameter"
            );

            let value = match options.location() {
                ParameterLocation::Query => {
                    let decoded = match query_groups.entry((options.style(), options.explode())) {
                        Entry::Occupied(entry) => entry.into_mut(),
                        Entry::Vacant(entry) => {
                            entry.insert(decode_named(&query, &options, self.config)?)
                        }
                    };
                    decoded.get(&field.wire_name).cloned()
                }
                ParameterLocation::Path => match path_params.get(&field.wire_name) {
                    Some(raw) => self.path_value(raw, &options, field)?,
                    None => None,
                },
                ParameterLocation::Header => match request.header(&field.wire_name) {
                    Some(raw) => Some(decode_with_hint(&raw, &options, self.config, hint_for(field.kind))?),
                    None => None,
                },
                ParameterLocation::Cookie => {
                    if cookies.is_none() {
                        let header = request.cookie_header().unwrap_or_default();
                        cookies = Some(decode_form(&header, ParameterLocation::Cookie, self.config)?);
                    }
                    cookies.as_ref().and_then(|jar| jar.get(&field.wire_name)).cloned()
                }
            };

            if let Some(value) = value {
                let value = normalize_value(value, field.kind);
                insert_first(&mut out, field, options.location().as_str(), value);
            }
        }

        if let Some(field) = descriptor.body_field() {
            if let Some(value) = self.body_value(request, field)? {
                insert_first(&mut out, field, "body", value);
            }
        }
        Ok(out)
    }

    fn path_value(
        &self,
        raw: &str,
        options: &Options,
        field: &FieldDescriptor,
    ) -> CodecResult<Option<ParamValue>> {
        if options.style() != Style::Matrix {
            return decode_with_hint(raw, options, self.config, hint_for(field.kind)).map(Some);
        }
        let mut decoded = decode_named(raw, options, self.config)?;
        if let Some(value) = decoded.shift_remove(&field.wire_name) {
            return Ok(Some(value));
        }
        // An exploded matrix object names its properties, not the parameter.
        if field.kind == FieldKind::Record && options.explode() && !decoded.is_empty() {
            return Ok(Some(ParamValue::Map(decoded)));
        }
        Ok(None)
    }

    fn body_value<T: TransportRequest + ?Sized>(
        &self,
        request: &T,
        field: &FieldDescriptor,
    ) -> CodecResult<Option<ParamValue>> {
        let body = request.body();
        if body.is_empty() {
            return Ok(None);
        }
        let content_type = request.content_type().map(|ct| ct.into_owned()).unwrap_or_default();
        if body.len() > self.config.max_body_bytes {
            return Err(CodecError::body(
                content_type,
                format!(
                    "body of {} bytes exceeds the limit of {} bytes",
                    body.len(),
                    self.config.max_body_bytes
                ),
            ));
        }

        let kind = field.body().map_or(BodyKind::Structured, |b| b.kind);
        let value = match kind {
            BodyKind::File => ParamValue::Binary(FilePart {
                file_name: None,
                content_type: (!content_type.is_empty()).then_some(content_type),
                data: body.to_vec(),
            }),
            BodyKind::Multipart => ParamValue::Map(parse_multipart(&content_type, body)?),
            BodyKind::Structured => self.structured(&content_type, body)?,
        };
        // Parts and form fields arrive as text; shape them like parameters.
        let value = match (normalize_value(value, field.kind), field.nested_descriptor(self.cache)?) {
            (ParamValue::Map(map), Some(nested)) => ParamValue::Map(normalize_map(map, nested.fields())),
            (value, _) => value,
        };
        Ok(Some(value))
    }

    fn structured(&self, content_type: &str, body: &[u8]) -> CodecResult<ParamValue> {
        let mime = match mime_essence(content_type) {
            mime if mime.is_empty() => "application/json".to_string(),
            mime => mime,
        };
        if mime == FORM_URLENCODED {
            let text = std::str::from_utf8(body)
                .map_err(|_| CodecError::body(content_type, "form body is not valid UTF-8"))?;
            return decode_form(text, ParameterLocation::Query, self.config).map(ParamValue::Map);
        }
        let decoder = self
            .bodies
            .iter()
            .find(|decoder| decoder.accepts(&mime))
            .ok_or_else(|| {
                CodecError::body(content_type, format!("no body decoder accepts '{}'", mime))
            })?;
        decoder.decode(body)
    }

    /// Marshaled record values encoded per field location.
    pub(crate) fn encode_parts(
        &self,
        tree: &ParamMap,
        descriptor: &RecordDescriptor,
    ) -> CodecResult<EncodedParts> {
        let mut parts = EncodedParts::default();
        let mut query = Vec::new();

        for field in descriptor.flattened_params(self.cache)? {
            let (Some(param), Some(value)) = (field.param(), tree.get(&field.wire_name)) else {
                continue;
            };
            let options = param.options;
            let named = || {
                let mut single = ParamMap::with_capacity(1);
                single.insert(field.wire_name.clone(), value.clone());
                ParamValue::Map(single)
            };

            match options.location() {
                ParameterLocation::Query => {
                    let encoded = encode_bare(&named(), &options, self.config)?;
                    if !encoded.is_empty() {
                        query.push(encoded);
                    }
                }
                ParameterLocation::Path => {
                    let encoded = if options.style() == Style::Matrix {
                        encode_bare(&named(), &options, self.config)?
                    } else {
                        encode_bare(value, &options, self.config)?
                    };
                    parts.path.insert(field.wire_name.clone(), encoded);
                }
                ParameterLocation::Header => {
                    let encoded = encode_bare(value, &options, self.config)?;
                    parts.headers.push((field.wire_name.clone(), encoded));
                }
                ParameterLocation::Cookie => {
                    let encoded = encode_bare(&named(), &options, self.config)?;
                    if !encoded.is_empty() {
                        parts.cookies.push(encoded);
                    }
                }
            }
        }
        parts.query = query.join("&");
        Ok(parts)
    }
}

fn insert_first(out: &mut ParamMap, field: &FieldDescriptor, source: &str, value: ParamValue) {
    if out.contains_key(&field.wire_name) {
        tracing::warn!(
            key = %field.wire_name,
            field = field.source_name,
            source,
            "parameter key already bound by another location, keeping the first value"
        );
        return;
    }
    out.insert(field.wire_name.clone(), value);
}

#![deny(missing_docs)]

//! # Codec
//!
//! The facade composing decoder + unmarshaler (request to record) and
//! marshaler + encoder (record to parameter string). One `Codec` owns its
//! descriptor cache, converter registry, body decoders and configuration,
//! and is meant to be built once and shared across threads.

use crate::config::CodecConfig;
use crate::convert::ConverterRegistry;
use crate::decode::{decode_with_hint, ShapeHint};
use crate::encode;
use crate::error::{CodecError, CodecResult};
use crate::marshal::{marshal_record, MarshalContext};
use crate::metadata::{MetadataCache, RecordDescriptor};
use crate::options::Options;
use crate::path::FieldPath;
use crate::record::Record;
use crate::request::demux::Demux;
use crate::request::normalize::normalize_map;
use crate::request::{BodyDecoder, EncodedParts, JsonBodyDecoder, PathParams, TransportRequest};
use crate::style::ParameterLocation;
use crate::unmarshal::{unmarshal_record, UnmarshalContext};
use crate::value::{ParamMap, ParamValue};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// The parameter codec.
pub struct Codec {
    cache: MetadataCache,
    converters: ConverterRegistry,
    bodies: Vec<Box<dyn BodyDecoder>>,
    config: CodecConfig,
}

impl Default for Codec {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("cached_descriptors", &self.cache.len())
            .field("converters", &self.converters)
            .field("body_decoders", &self.bodies.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Codec {
    /// A codec with default configuration, converters and body decoders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a configured codec.
    pub fn builder() -> CodecBuilder {
        CodecBuilder::default()
    }

    /// The configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// The converter registry. Converters can still be registered through it.
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// The cached descriptor of record type `R`.
    pub fn descriptor<R: Record>(&self) -> CodecResult<Arc<RecordDescriptor>> {
        self.cache.get::<R>()
    }

    /// Decodes a raw parameter string into a value tree.
    pub fn decode(&self, raw: &str, options: &Options) -> CodecResult<ParamValue> {
        crate::decode::decode(raw, options, &self.config)
    }

    /// Encodes a value tree into a raw parameter string.
    pub fn encode(&self, value: &ParamValue, options: &Options) -> CodecResult<String> {
        encode::encode(value, options, &self.config)
    }

    /// Appends the query encoding of `value` to `url`'s query.
    pub fn encode_into_url(&self, url: &mut Url, value: &ParamValue, options: &Options) -> CodecResult<()> {
        if options.location() != ParameterLocation::Query {
            return Err(CodecError::InvalidOptions {
                location: options.location(),
                style: options.style(),
                reason: "only query parameters can be appended to a URL".into(),
            });
        }
        let parts = EncodedParts {
            query: encode::encode_bare(value, options, &self.config)?,
            ..EncodedParts::default()
        };
        parts.apply_to_url(url);
        Ok(())
    }

    /// Marshals a record into a value tree keyed by wire name.
    pub fn marshal<R: Record>(&self, record: &R) -> CodecResult<ParamMap> {
        marshal_record(record, &MarshalContext::new(&self.cache), &FieldPath::root())
    }

    /// Unmarshals a value tree into a new record. Shapes are not normalized.
    pub fn unmarshal<R: Record>(&self, tree: &ParamMap) -> CodecResult<R> {
        let mut record = R::default();
        let cx = UnmarshalContext::new(&self.cache, &self.converters);
        unmarshal_record(&mut record, tree, &cx, &FieldPath::root())?;
        Ok(record)
    }

    /// Decodes a raw parameter string and unmarshals it into `R`.
    ///
    /// Keyed styles map parameter names to fields. Keyless styles (simple,
    /// label) decode the whole value as the record.
    pub fn decode_record<R: Record>(&self, raw: &str, options: &Options) -> CodecResult<R> {
        let descriptor = self.descriptor::<R>()?;
        let tree = match decode_with_hint(raw, options, &self.config, ShapeHint::Object)? {
            ParamValue::Map(map) => map,
            other => {
                return Err(CodecError::TypeMismatch {
                    path: R::type_name().to_string(),
                    expected: "map",
                    found: other.shape_name(),
                })
            }
        };
        let fields = descriptor.flattened_params(&self.cache)?;
        self.unmarshal(&normalize_map(tree, &fields))
    }

    /// Marshals `record` and encodes it with one set of options.
    pub fn encode_record<R: Record>(&self, record: &R, options: &Options) -> CodecResult<String> {
        let tree = self.marshal(record)?;
        self.encode(&ParamValue::Map(tree), options)
    }

    /// Decodes every parameter and the body of a transport request into `R`,
    /// each field from its own location with its own style.
    pub fn decode_request<R, T>(&self, request: &T, path_params: &PathParams) -> CodecResult<R>
    where
        R: Record,
        T: TransportRequest + ?Sized,
    {
        let descriptor = self.descriptor::<R>()?;
        let tree = self.demux().collect(request, path_params, &descriptor)?;
        self.unmarshal(&tree)
    }

    /// Encodes every parameter field of `record` with its own location, style
    /// and explode flag. Body fields are not encoded.
    pub fn encode_parts<R: Record>(&self, record: &R) -> CodecResult<EncodedParts> {
        let descriptor = self.descriptor::<R>()?;
        let tree = self.marshal(record)?;
        self.demux().encode_parts(&tree, &descriptor)
    }

    fn demux(&self) -> Demux<'_> {
        Demux {
            cache: &self.cache,
            config: &self.config,
            bodies: &self.bodies,
        }
    }
}

/// Builder for [`Codec`].
pub struct CodecBuilder {
    config: CodecConfig,
    converters: ConverterRegistry,
    bodies: Vec<Box<dyn BodyDecoder>>,
}

impl Default for CodecBuilder {
    fn default() -> Self {
        Self {
            config: CodecConfig::default(),
            converters: ConverterRegistry::with_defaults(),
            bodies: vec![Box::new(JsonBodyDecoder)],
        }
    }
}

impl CodecBuilder {
    /// Sets the configuration.
    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the converter registry.
    pub fn converters(mut self, converters: ConverterRegistry) -> Self {
        self.converters = converters;
        self
    }

    /// Adds a structured body decoder. Decoders added later are consulted
    /// first.
    pub fn body_decoder(mut self, decoder: impl BodyDecoder + 'static) -> Self {
        self.bodies.insert(0, Box::new(decoder));
        self
    }

    /// Builds the codec.
    pub fn build(self) -> Codec {
        Codec {
            cache: MetadataCache::new(),
            converters: self.converters,
            bodies: self.bodies,
            config: self.config,
        }
    }
}

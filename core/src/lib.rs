#![deny(missing_docs)]

//! # OAS Params Core
//!
//! OpenAPI 3.x parameter serialization. Decodes query, path, header and
//! cookie values (plus the request body) into typed records according to
//! each field's `(location, style, explode)`, and encodes records back.
//!
//! ```
//! use oas_params_core::{decode, encode, CodecConfig, Options, ParameterLocation, Style};
//!
//! let config = CodecConfig::default();
//! let options = Options::new(ParameterLocation::Query, Style::DeepObject, None).unwrap();
//! let tree = decode("filter[type]=car&filter[color]=red", &options, &config).unwrap();
//! assert_eq!(
//!     encode(&tree, &options, &config).unwrap(),
//!     "filter%5Btype%5D=car&filter%5Bcolor%5D=red"
//! );
//! ```

/// The codec facade.
pub mod codec;

/// Codec configuration.
pub mod config;

/// String converters and wire scalars.
pub mod convert;

/// Raw parameter string to value tree.
pub mod decode;

/// Value tree to raw parameter string.
pub mod encode;

/// Shared error types.
pub mod error;

/// Record to value tree.
pub mod marshal;

/// Field descriptors and their cache.
pub mod metadata;

/// Validated `(location, style, explode)` triples.
pub mod options;

/// Field paths for error reporting.
pub mod path;

/// The record and field-shape traits.
pub mod record;

/// Transport requests and bodies.
pub mod request;

/// Locations, styles and body kinds.
pub mod style;

/// Value tree to record.
pub mod unmarshal;

/// The nested value tree.
pub mod value;

pub use codec::{Codec, CodecBuilder};
pub use config::CodecConfig;
pub use convert::{Converted, ConverterRegistry, WireScalar};
pub use decode::decode;
pub use encode::encode;
pub use error::{CodecError, CodecResult, ErrorKind};
pub use marshal::MarshalContext;
pub use metadata::{
    BodyBinding, FieldBinding, FieldDescriptor, MetadataCache, ParamBinding, RecordDescriptor,
};
pub use options::Options;
pub use path::FieldPath;
pub use record::{Annotation, DescriptorFn, FieldDecl, FieldKind, ParamField, Record};
pub use request::{
    BodyDecoder, EncodedParts, JsonBodyDecoder, PathParams, RawRequest, TransportRequest,
};
pub use style::{
    allowed_styles, default_explode, default_style, is_style_allowed, BodyKind,
    ParameterLocation, Style,
};
pub use unmarshal::UnmarshalContext;
pub use value::{FilePart, ParamMap, ParamValue};

#[cfg(feature = "derive")]
pub use oas_params_derive::ParamRecord;

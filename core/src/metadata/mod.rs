//! # Field Metadata
//!
//! Parses field annotations into descriptors and caches one
//! [`RecordDescriptor`] per record type.

pub mod annotation;
pub mod cache;
pub mod descriptor;

pub use cache::MetadataCache;
pub use descriptor::{
    build_field, BodyBinding, FieldBinding, FieldDescriptor, ParamBinding, RecordDescriptor,
};

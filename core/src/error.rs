#![deny(missing_docs)]

//! # Error Handling
//!
//! Provides the `CodecError` enum shared by every stage of the codec.
//!
//! Each variant maps to one entry of the error taxonomy and carries the
//! structured context (field path, offending key, location/style) needed to
//! diagnose a failure without string matching.

use crate::style::{ParameterLocation, Style};
use derive_more::{Display, From};

/// The codec error enum.
///
/// We use `derive_more` for boilerplate. Only the wrapped foreign errors get
/// `From` conversions; everything else is constructed explicitly so the
/// context fields are always filled in.
#[derive(Debug, Display, From)]
pub enum CodecError {
    /// A location token that is not one of `query`, `path`, `header`, `cookie`.
    #[display("Unsupported location '{_0}'")]
    UnsupportedLocation(String),

    /// A style that is not legal for the location.
    #[display("Style '{style}' is not allowed for location '{location}'")]
    UnsupportedStyle {
        /// The location the style was requested for.
        location: ParameterLocation,
        /// The rejected style.
        style: Style,
    },

    /// A style token that does not name any known style.
    #[display("Invalid style '{_0}'")]
    InvalidStyle(String),

    /// Malformed wire syntax.
    #[display("Invalid format for key '{key}': {reason}")]
    InvalidFormat {
        /// The key (or raw segment) that could not be parsed.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A value or record shape the marshaler/unmarshaler/encoder cannot handle.
    #[display("Unsupported type at '{path}': {reason}")]
    UnsupportedType {
        /// Field path of the offending value.
        path: String,
        /// Description of the unsupported shape.
        reason: String,
    },

    /// A tree value whose shape does not match the target field.
    #[display("Type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Field path of the offending value.
        path: String,
        /// The shape the field requires.
        expected: &'static str,
        /// The shape found in the tree.
        found: &'static str,
    },

    /// A list element that is itself invalid (e.g. a `None` element).
    #[display("Invalid element at '{path}': {reason}")]
    InvalidElement {
        /// Field path including the element index.
        path: String,
        /// What was wrong with the element.
        reason: String,
    },

    /// A list whose elements have a shape lists cannot hold.
    #[display("Unsupported slice element type at '{path}': {element}")]
    UnsupportedSliceElementType {
        /// Field path of the list element.
        path: String,
        /// Shape of the rejected element.
        element: &'static str,
    },

    /// `Options` construction was rejected.
    #[display("Invalid options ({location}, {style}): {reason}")]
    InvalidOptions {
        /// Requested location.
        location: ParameterLocation,
        /// Requested style.
        style: Style,
        /// Why the combination was rejected.
        reason: String,
    },

    /// A converter rejected a string value.
    #[display("Cannot convert '{value}' to {target} at '{path}': {reason}")]
    Conversion {
        /// Field path of the leaf.
        path: String,
        /// The raw wire string.
        value: String,
        /// Target type name.
        target: &'static str,
        /// Converter message.
        reason: String,
    },

    /// A field annotation could not be turned into a descriptor.
    #[display("Invalid descriptor for {record}.{field}: {reason}")]
    InvalidDescriptor {
        /// Record type name.
        record: String,
        /// Source field name.
        field: String,
        /// What was wrong with the annotation.
        reason: String,
    },

    /// A request body could not be decoded.
    #[display("Body error ({content_type}): {reason}")]
    Body {
        /// Declared content type (empty when absent).
        content_type: String,
        /// What went wrong.
        reason: String,
    },

    /// Configuration text could not be parsed.
    #[display("Config Error: {_0}")]
    Config(String),

    /// Wrapper for standard IO errors (configuration loading).
    #[from]
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Wrapper for JSON errors.
    #[from]
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),
}

/// Fieldless classification of a [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`CodecError::UnsupportedLocation`].
    UnsupportedLocation,
    /// See [`CodecError::UnsupportedStyle`].
    UnsupportedStyle,
    /// See [`CodecError::InvalidStyle`].
    InvalidStyle,
    /// See [`CodecError::InvalidFormat`].
    InvalidFormat,
    /// See [`CodecError::UnsupportedType`].
    UnsupportedType,
    /// See [`CodecError::TypeMismatch`].
    TypeMismatch,
    /// See [`CodecError::InvalidElement`].
    InvalidElement,
    /// See [`CodecError::UnsupportedSliceElementType`].
    UnsupportedSliceElementType,
    /// See [`CodecError::InvalidOptions`].
    InvalidOptions,
    /// See [`CodecError::Conversion`].
    Conversion,
    /// See [`CodecError::InvalidDescriptor`].
    InvalidDescriptor,
    /// See [`CodecError::Body`].
    Body,
    /// See [`CodecError::Config`].
    Config,
    /// See [`CodecError::Io`].
    Io,
    /// See [`CodecError::Json`].
    Json,
}

impl CodecError {
    /// Returns the taxonomy entry of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::UnsupportedLocation(_) => ErrorKind::UnsupportedLocation,
            CodecError::UnsupportedStyle { .. } => ErrorKind::UnsupportedStyle,
            CodecError::InvalidStyle(_) => ErrorKind::InvalidStyle,
            CodecError::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            CodecError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            CodecError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            CodecError::InvalidElement { .. } => ErrorKind::InvalidElement,
            CodecError::UnsupportedSliceElementType { .. } => {
                ErrorKind::UnsupportedSliceElementType
            }
            CodecError::InvalidOptions { .. } => ErrorKind::InvalidOptions,
            CodecError::Conversion { .. } => ErrorKind::Conversion,
            CodecError::InvalidDescriptor { .. } => ErrorKind::InvalidDescriptor,
            CodecError::Body { .. } => ErrorKind::Body,
            CodecError::Config(_) => ErrorKind::Config,
            CodecError::Io(_) => ErrorKind::Io,
            CodecError::Json(_) => ErrorKind::Json,
        }
    }

    /// Shorthand for an [`CodecError::InvalidFormat`] error.
    pub fn format(key: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::InvalidFormat {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`CodecError::Body`] error.
    pub fn body(content_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::Body {
            content_type: content_type.into(),
            reason: reason.into(),
        }
    }
}

/// Manual implementation of the standard Error trait.
///
/// The `String`-carrying variants do not implement `std::error::Error`, so
/// only the wrapped foreign errors report a source.
impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Io(e) => Some(e),
            CodecError::Json(e) => Some(e),
            _ => None,
        }
    }
}

/// Helper type alias for Result using CodecError.
pub type CodecResult<T> = Result<T, CodecError>;

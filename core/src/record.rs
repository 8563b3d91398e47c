#![deny(missing_docs)]

//! # Records and Field Shapes
//!
//! The traits the marshaler and unmarshaler walk instead of inspecting types
//! at runtime.
//!
//! - [`Record`]: one impl per record type, usually generated by
//!   `#[derive(ParamRecord)]`. It declares the fields (name, annotation,
//!   shape) and hands out accessors by source field name.
//! - [`ParamField`]: one impl per field shape. Leaves, `Option`, `Vec`,
//!   `Box`, [`FilePart`], [`Converted`] and every record.

use crate::convert::{Converted, WireScalar};
use crate::error::{CodecError, CodecResult};
use crate::marshal::MarshalContext;
use crate::metadata::{MetadataCache, RecordDescriptor};
use crate::path::FieldPath;
use crate::unmarshal::{leaf_text, UnmarshalContext};
use crate::value::{FilePart, ParamMap, ParamValue};
use std::fmt;
use std::sync::Arc;

/// Resolves the descriptor of a nested record type through a cache.
pub type DescriptorFn = fn(&MetadataCache) -> CodecResult<Arc<RecordDescriptor>>;

/// The structural shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A scalar converted from/to text.
    Leaf,
    /// An ordered list.
    List,
    /// A nested record.
    Record,
    /// File content.
    File,
}

impl FieldKind {
    /// Name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Leaf => "scalar",
            FieldKind::List => "list",
            FieldKind::Record => "map",
            FieldKind::File => "binary",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declarative annotation attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    /// No annotation: all parameter defaults apply.
    None,
    /// A parameter annotation, `name[,option]*` or `-`.
    Param(&'static str),
    /// A body annotation, `kind[,required]`.
    Body(&'static str),
}

/// A field as declared by its record type, before the annotation is parsed.
#[derive(Debug, Clone, Copy)]
pub struct FieldDecl {
    /// Source field name.
    pub name: &'static str,
    /// Declared annotation.
    pub annotation: Annotation,
    /// Shape of the field type.
    pub kind: FieldKind,
    /// Whether the field type is an optional wrapper.
    pub optional: bool,
    /// Descriptor resolver for record-shaped fields (and lists/options of them).
    pub nested: Option<DescriptorFn>,
}

impl FieldDecl {
    /// Declares field `name` of type `T`.
    pub fn of<T: ParamField>(name: &'static str, annotation: Annotation) -> Self {
        Self {
            name,
            annotation,
            kind: T::kind(),
            optional: T::is_optional(),
            nested: T::nested_descriptor(),
        }
    }
}

/// A type the marshaler and unmarshaler can walk.
pub trait ParamField {
    /// The field shape.
    fn kind() -> FieldKind
    where
        Self: Sized;

    /// Whether this is an optional wrapper (absent value marshals to nothing).
    fn is_optional() -> bool
    where
        Self: Sized,
    {
        false
    }

    /// Descriptor resolver when the shape (or its element) is a record.
    fn nested_descriptor() -> Option<DescriptorFn>
    where
        Self: Sized,
    {
        None
    }

    /// Whether the current value is the zero/default value of the shape.
    fn is_default_value(&self) -> bool;

    /// Produces the tree value, `None` when there is nothing to emit.
    fn marshal_value(
        &self,
        cx: &MarshalContext<'_>,
        path: &FieldPath,
    ) -> CodecResult<Option<ParamValue>>;

    /// Populates the field from a tree value.
    fn unmarshal_value(
        &mut self,
        value: &ParamValue,
        cx: &UnmarshalContext<'_>,
        path: &FieldPath,
    ) -> CodecResult<()>;

    /// Populates a record-shaped field straight from a mapping.
    fn unmarshal_map(
        &mut self,
        map: &ParamMap,
        cx: &UnmarshalContext<'_>,
        path: &FieldPath,
    ) -> CodecResult<()> {
        let _ = (map, cx);
        Err(CodecError::UnsupportedType {
            path: path.to_string(),
            reason: "only record-shaped fields can receive a mapping".into(),
        })
    }
}

/// A structured record with annotated fields.
pub trait Record: ParamField + Default + Send + Sync + 'static {
    /// Type name used in descriptors and errors.
    fn type_name() -> &'static str;

    /// Field declarations in source order.
    fn declare_fields() -> Vec<FieldDecl>;

    /// Accessor by source field name.
    fn field(&self, name: &str) -> Option<&dyn ParamField>;

    /// Mutable accessor by source field name.
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn ParamField>;
}

/// [`DescriptorFn`] for record type `R`.
pub fn descriptor_of<R: Record>(cache: &MetadataCache) -> CodecResult<Arc<RecordDescriptor>> {
    cache.get::<R>()
}

/// A record is at its default when every declared field is.
pub fn is_default_record<R: Record>(record: &R) -> bool {
    R::declare_fields().iter().all(|decl| {
        record
            .field(decl.name)
            .map_or(true, |field| field.is_default_value())
    })
}

/// Implements [`ParamField`] for a type that implements [`Record`].
///
/// `#[derive(ParamRecord)]` emits this; hand-written `Record` impls invoke
/// it themselves.
#[macro_export]
macro_rules! impl_record_field {
    ($ty:ty) => {
        impl $crate::ParamField for $ty {
            fn kind() -> $crate::FieldKind {
                $crate::FieldKind::Record
            }

            fn nested_descriptor() -> ::std::option::Option<$crate::DescriptorFn> {
                ::std::option::Option::Some(
                    $crate::record::descriptor_of::<$ty> as $crate::DescriptorFn,
                )
            }

            fn is_default_value(&self) -> bool {
                $crate::record::is_default_record(self)
            }

            fn marshal_value(
                &self,
                cx: &$crate::MarshalContext<'_>,
                path: &$crate::FieldPath,
            ) -> $crate::CodecResult<::std::option::Option<$crate::ParamValue>> {
                $crate::marshal::marshal_record(self, cx, path)
                    .map(|map| ::std::option::Option::Some($crate::ParamValue::Map(map)))
            }

            fn unmarshal_value(
                &mut self,
                value: &$crate::ParamValue,
                cx: &$crate::UnmarshalContext<'_>,
                path: &$crate::FieldPath,
            ) -> $crate::CodecResult<()> {
                $crate::unmarshal::unmarshal_record_value(self, value, cx, path)
            }

            fn unmarshal_map(
                &mut self,
                map: &$crate::ParamMap,
                cx: &$crate::UnmarshalContext<'_>,
                path: &$crate::FieldPath,
            ) -> $crate::CodecResult<()> {
                $crate::unmarshal::unmarshal_record(self, map, cx, path)
            }
        }
    };
}

macro_rules! scalar_field {
    ($($t:ty),*) => {$(
        impl ParamField for $t {
            fn kind() -> FieldKind {
                FieldKind::Leaf
            }

            fn is_default_value(&self) -> bool {
                *self == <$t>::default()
            }

            fn marshal_value(
                &self,
                _cx: &MarshalContext<'_>,
                _path: &FieldPath,
            ) -> CodecResult<Option<ParamValue>> {
                Ok(Some(WireScalar::to_wire(self)))
            }

            fn unmarshal_value(
                &mut self,
                value: &ParamValue,
                cx: &UnmarshalContext<'_>,
                path: &FieldPath,
            ) -> CodecResult<()> {
                let text = leaf_text(value, path)?;
                *self = cx.converters().convert_scalar::<$t>(&text).map_err(|reason| {
                    CodecError::Conversion {
                        path: path.to_string(),
                        value: text.to_string(),
                        target: <$t as WireScalar>::TYPE_NAME,
                        reason,
                    }
                })?;
                Ok(())
            }
        }
    )*};
}

scalar_field!(
    String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl<T: ParamField + Default> ParamField for Option<T> {
    fn kind() -> FieldKind {
        T::kind()
    }

    fn is_optional() -> bool {
        true
    }

    fn nested_descriptor() -> Option<DescriptorFn> {
        T::nested_descriptor()
    }

    fn is_default_value(&self) -> bool {
        self.is_none()
    }

    fn marshal_value(
        &self,
        cx: &MarshalContext<'_>,
        path: &FieldPath,
    ) -> CodecResult<Option<ParamValue>> {
        match self {
            Some(inner) => inner.marshal_value(cx, path),
            None => Ok(None),
        }
    }

    fn unmarshal_value(
        &mut self,
        value: &ParamValue,
        cx: &UnmarshalContext<'_>,
        path: &FieldPath,
    ) -> CodecResult<()> {
        self.get_or_insert_with(T::default)
            .unmarshal_value(value, cx, path)
    }

    fn unmarshal_map(
        &mut self,
        map: &ParamMap,
        cx: &UnmarshalContext<'_>,
        path: &FieldPath,
    ) -> CodecResult<()> {
        self.get_or_insert_with(T::default).unmarshal_map(map, cx, path)
    }
}

impl<T: ParamField + Default> ParamField for Vec<T> {
    fn kind() -> FieldKind {
        FieldKind::List
    }

    fn nested_descriptor() -> Option<DescriptorFn> {
        T::nested_descriptor()
    }

    fn is_default_value(&self) -> bool {
        self.is_empty()
    }

    fn marshal_value(
        &self,
        cx: &MarshalContext<'_>,
        path: &FieldPath,
    ) -> CodecResult<Option<ParamValue>> {
        if T::kind() == FieldKind::List {
            return Err(CodecError::UnsupportedSliceElementType {
                path: path.index(0).to_string(),
                element: "list",
            });
        }
        let mut items = Vec::with_capacity(self.len());
        for (i, item) in self.iter().enumerate() {
            let item_path = path.index(i);
            match item.marshal_value(cx, &item_path)? {
                Some(value) => items.push(value),
                None => {
                    return Err(CodecError::InvalidElement {
                        path: item_path.to_string(),
                        reason: "element has no value".into(),
                    })
                }
            }
        }
        Ok(Some(ParamValue::List(items)))
    }

    fn unmarshal_value(
        &mut self,
        value: &ParamValue,
        cx: &UnmarshalContext<'_>,
        path: &FieldPath,
    ) -> CodecResult<()> {
        let ParamValue::List(items) = value else {
            return Err(CodecError::TypeMismatch {
                path: path.to_string(),
                expected: "list",
                found: value.shape_name(),
            });
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_path = path.index(i);
            if matches!(item, ParamValue::List(_)) && T::kind() != FieldKind::List {
                return Err(CodecError::UnsupportedSliceElementType {
                    path: item_path.to_string(),
                    element: "list",
                });
            }
            let mut element = T::default();
            element.unmarshal_value(item, cx, &item_path)?;
            out.push(element);
        }
        *self = out;
        Ok(())
    }
}

impl<T: ParamField> ParamField for Box<T> {
    fn kind() -> FieldKind {
        T::kind()
    }

    fn is_optional() -> bool {
        T::is_optional()
    }

    fn nested_descriptor() -> Option<DescriptorFn> {
        T::nested_descriptor()
    }

    fn is_default_value(&self) -> bool {
        (**self).is_default_value()
    }

    fn marshal_value(
        &self,
        cx: &MarshalContext<'_>,
        path: &FieldPath,
    ) -> CodecResult<Option<ParamValue>> {
        (**self).marshal_value(cx, path)
    }

    fn unmarshal_value(
        &mut self,
        value: &ParamValue,
        cx: &UnmarshalContext<'_>,
        path: &FieldPath,
    ) -> CodecResult<()> {
        (**self).unmarshal_value(value, cx, path)
    }

    fn unmarshal_map(
        &mut self,
        map: &ParamMap,
        cx: &UnmarshalContext<'_>,
        path: &FieldPath,
    ) -> CodecResult<()> {
        (**self).unmarshal_map(map, cx, path)
    }
}

impl ParamField for FilePart {
    fn kind() -> FieldKind {
        FieldKind::File
    }

    fn is_default_value(&self) -> bool {
        *self == FilePart::default()
    }

    fn marshal_value(
        &self,
        _cx: &MarshalContext<'_>,
        _path: &FieldPath,
    ) -> CodecResult<Option<ParamValue>> {
        Ok(Some(ParamValue::Binary(self.clone())))
    }

    fn unmarshal_value(
        &mut self,
        value: &ParamValue,
        _cx: &UnmarshalContext<'_>,
        path: &FieldPath,
    ) -> CodecResult<()> {
        match value {
            ParamValue::Binary(part) => *self = part.clone(),
            // A text part sent where a file is expected.
            ParamValue::String(text) => *self = FilePart::new(text.as_bytes()),
            other => {
                return Err(CodecError::TypeMismatch {
                    path: path.to_string(),
                    expected: "binary",
                    found: other.shape_name(),
                })
            }
        }
        Ok(())
    }
}

impl<T> ParamField for Converted<T>
where
    T: fmt::Display + Default + PartialEq + Send + Sync + 'static,
{
    fn kind() -> FieldKind {
        FieldKind::Leaf
    }

    fn is_default_value(&self) -> bool {
        self.0 == T::default()
    }

    fn marshal_value(
        &self,
        _cx: &MarshalContext<'_>,
        _path: &FieldPath,
    ) -> CodecResult<Option<ParamValue>> {
        Ok(Some(ParamValue::String(self.0.to_string())))
    }

    fn unmarshal_value(
        &mut self,
        value: &ParamValue,
        cx: &UnmarshalContext<'_>,
        path: &FieldPath,
    ) -> CodecResult<()> {
        let text = leaf_text(value, path)?;
        let converted = cx.converters().convert::<T>(&text).ok_or_else(|| {
            CodecError::UnsupportedType {
                path: path.to_string(),
                reason: format!(
                    "no converter registered for {}",
                    std::any::type_name::<T>()
                ),
            }
        })?;
        self.0 = converted.map_err(|reason| CodecError::Conversion {
            path: path.to_string(),
            value: text.to_string(),
            target: std::any::type_name::<T>(),
            reason,
        })?;
        Ok(())
    }
}

#![deny(missing_docs)]

//! # Converters
//!
//! String-to-leaf conversion. Primitive leaf types implement [`WireScalar`];
//! the [`ConverterRegistry`] maps a type identity to a boxed conversion
//! function and is consulted first, so callers can override a primitive or
//! teach the codec a foreign type (through [`Converted`]).

use crate::value::ParamValue;
use arc_swap::ArcSwap;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A leaf type with a canonical wire text form.
pub trait WireScalar: Sized + Send + Sync + 'static {
    /// Type name used in conversion errors.
    const TYPE_NAME: &'static str;

    /// Parses the wire text.
    fn from_wire(raw: &str) -> Result<Self, String>;

    /// The tree leaf for this value.
    fn to_wire(&self) -> ParamValue;
}

macro_rules! signed_scalar {
    ($($t:ty),*) => {$(
        impl WireScalar for $t {
            const TYPE_NAME: &'static str = stringify!($t);

            fn from_wire(raw: &str) -> Result<Self, String> {
                raw.parse::<$t>().map_err(|e| e.to_string())
            }

            fn to_wire(&self) -> ParamValue {
                ParamValue::Int(*self as i64)
            }
        }
    )*};
}

macro_rules! unsigned_scalar {
    ($($t:ty),*) => {$(
        impl WireScalar for $t {
            const TYPE_NAME: &'static str = stringify!($t);

            fn from_wire(raw: &str) -> Result<Self, String> {
                raw.parse::<$t>().map_err(|e| e.to_string())
            }

            fn to_wire(&self) -> ParamValue {
                ParamValue::UInt(*self as u64)
            }
        }
    )*};
}

// Types that do not fit the tree's 64-bit scalars travel as text.
macro_rules! text_scalar {
    ($($t:ty),*) => {$(
        impl WireScalar for $t {
            const TYPE_NAME: &'static str = stringify!($t);

            fn from_wire(raw: &str) -> Result<Self, String> {
                raw.parse::<$t>().map_err(|e| e.to_string())
            }

            fn to_wire(&self) -> ParamValue {
                ParamValue::String(self.to_string())
            }
        }
    )*};
}

signed_scalar!(i8, i16, i32, i64, isize);
unsigned_scalar!(u8, u16, u32, u64, usize);
text_scalar!(i128, u128, f32);

impl WireScalar for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn from_wire(raw: &str) -> Result<Self, String> {
        raw.parse::<f64>().map_err(|e| e.to_string())
    }

    fn to_wire(&self) -> ParamValue {
        ParamValue::Float(*self)
    }
}

impl WireScalar for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_wire(raw: &str) -> Result<Self, String> {
        if raw.eq_ignore_ascii_case("true") || raw == "1" {
            Ok(true)
        } else if raw.eq_ignore_ascii_case("false") || raw == "0" {
            Ok(false)
        } else {
            Err(format!("'{}' is not a boolean", raw))
        }
    }

    fn to_wire(&self) -> ParamValue {
        ParamValue::Bool(*self)
    }
}

impl WireScalar for char {
    const TYPE_NAME: &'static str = "char";

    fn from_wire(raw: &str) -> Result<Self, String> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(format!("expected exactly one character, got {}", raw.chars().count())),
        }
    }

    fn to_wire(&self) -> ParamValue {
        ParamValue::String(self.to_string())
    }
}

impl WireScalar for String {
    const TYPE_NAME: &'static str = "String";

    fn from_wire(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }

    fn to_wire(&self) -> ParamValue {
        ParamValue::String(self.clone())
    }
}

/// Boxed conversion function stored in the registry.
pub type ConvertFn = dyn Fn(&str) -> Result<Box<dyn Any + Send>, String> + Send + Sync;

#[derive(Clone)]
struct ConverterEntry {
    type_name: &'static str,
    convert: Arc<ConvertFn>,
}

type ConverterTable = HashMap<TypeId, ConverterEntry>;

/// Type-identity keyed table of string converters.
///
/// Lookups are lock-free loads of the current table; registration swaps in
/// an updated copy, so it can interleave with concurrent lookups.
pub struct ConverterRegistry {
    table: ArcSwap<ConverterTable>,
}

impl ConverterRegistry {
    /// A registry with no entries. Primitive leaves still convert through
    /// their [`WireScalar`] impl.
    pub fn empty() -> Self {
        Self {
            table: ArcSwap::from_pointee(ConverterTable::new()),
        }
    }

    /// A registry pre-populated with the primitive numeric, boolean,
    /// character and string converters.
    pub fn with_defaults() -> Self {
        let registry = Self::empty();
        registry.register_scalar::<String>();
        registry.register_scalar::<bool>();
        registry.register_scalar::<char>();
        registry.register_scalar::<i8>();
        registry.register_scalar::<i16>();
        registry.register_scalar::<i32>();
        registry.register_scalar::<i64>();
        registry.register_scalar::<i128>();
        registry.register_scalar::<isize>();
        registry.register_scalar::<u8>();
        registry.register_scalar::<u16>();
        registry.register_scalar::<u32>();
        registry.register_scalar::<u64>();
        registry.register_scalar::<u128>();
        registry.register_scalar::<usize>();
        registry.register_scalar::<f32>();
        registry.register_scalar::<f64>();
        registry
    }

    fn register_scalar<T: WireScalar>(&self) {
        self.insert::<T>(T::TYPE_NAME, Arc::new(|raw: &str| {
            T::from_wire(raw).map(|v| Box::new(v) as Box<dyn Any + Send>)
        }));
    }

    /// Adds or replaces the converter for `T`.
    ///
    /// # Examples
    /// ```
    /// use oas_params_core::ConverterRegistry;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Cents(u64);
    ///
    /// let registry = ConverterRegistry::empty();
    /// registry.register::<Cents, _>(|raw| {
    ///     raw.parse::<u64>().map(Cents).map_err(|e| e.to_string())
    /// });
    /// assert_eq!(registry.convert::<Cents>("125"), Some(Ok(Cents(125))));
    /// ```
    pub fn register<T, F>(&self, convert: F)
    where
        T: Send + 'static,
        F: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        self.insert::<T>(
            std::any::type_name::<T>(),
            Arc::new(move |raw: &str| convert(raw).map(|v| Box::new(v) as Box<dyn Any + Send>)),
        );
    }

    fn insert<T: 'static>(&self, type_name: &'static str, convert: Arc<ConvertFn>) {
        let entry = ConverterEntry { type_name, convert };
        self.table.rcu(|current| {
            let mut next = ConverterTable::clone(current);
            next.insert(TypeId::of::<T>(), entry.clone());
            next
        });
        tracing::debug!(target_type = type_name, "registered converter");
    }

    /// Whether a converter is registered for `T`.
    pub fn contains<T: 'static>(&self) -> bool {
        self.table.load().contains_key(&TypeId::of::<T>())
    }

    /// Number of registered converters.
    pub fn len(&self) -> usize {
        self.table.load().len()
    }

    /// Whether no converter is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs the registered converter for `T`, `None` when there is none.
    pub fn convert<T: 'static>(&self, raw: &str) -> Option<Result<T, String>> {
        let table = self.table.load();
        let entry = table.get(&TypeId::of::<T>())?;
        Some((entry.convert)(raw).and_then(|boxed| {
            boxed.downcast::<T>().map(|v| *v).map_err(|_| {
                format!("converter registered for {} produced another type", entry.type_name)
            })
        }))
    }

    /// Converts a primitive leaf: the registered entry wins, the
    /// [`WireScalar`] impl is the fallback.
    pub fn convert_scalar<T: WireScalar>(&self, raw: &str) -> Result<T, String> {
        match self.convert::<T>(raw) {
            Some(result) => result,
            None => T::from_wire(raw),
        }
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.load();
        let mut names: Vec<&str> = table.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        f.debug_struct("ConverterRegistry")
            .field("types", &names)
            .finish()
    }
}

/// A leaf whose conversion comes only from the [`ConverterRegistry`].
///
/// Use it for foreign types that cannot implement the crate's traits; the
/// marshaler writes them with `Display`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Converted<T>(pub T);

impl<T> Converted<T> {
    /// Unwraps the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Converted<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

//! Capabilities attached to a type's [`TypeInfo`](crate::info::TypeInfo).
//!
//! ## Menu
//!
//! - [`TypeTrait`]: a capability supported by a type, usually a table of function pointers.
//! - [`FromType`]: creates a `TypeTrait` from a concrete type.
//! - [`TypeTraits`]: the table stored in [`StructInfo`] and [`OpaqueInfo`].
//! - [`TypeTraitSerialize`] / [`TypeTraitDeserialize`]: `serde` bridges, attached with
//!   `#[reflect(serialize, deserialize)]`.
//!
//! Other crates define their own traits (e.g. custom JSON codecs) and attach them with
//! `#[reflect(type_trait(Path))]`.
//!
//! [`StructInfo`]: crate::info::StructInfo
//! [`OpaqueInfo`]: crate::info::OpaqueInfo

use core::any::{Any, TypeId};

use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Reflect, Typed};

// -----------------------------------------------------------------------------
// TypeTrait

/// A capability supported by a type.
///
/// Automatically implemented for every `Clone + Send + Sync + 'static` type.
pub trait TypeTrait: Any + Send + Sync {
    /// Clones the capability into a new box.
    fn clone_type_trait(&self) -> Box<dyn TypeTrait>;
}

impl<T: Clone + Send + Sync + 'static> TypeTrait for T {
    #[inline]
    fn clone_type_trait(&self) -> Box<dyn TypeTrait> {
        Box::new(self.clone())
    }
}

/// Trait used to generate a [`TypeTrait`] for a concrete type.
///
/// This is used by the `#[derive(Reflect)]` macro to fill the trait table
/// of the generated `TypeInfo`.
///
/// # Example
///
/// ```
/// use vc_json_reflect::traits::{FromType, TypeTraitSerialize};
///
/// let _ = <TypeTraitSerialize as FromType<serde_json::Value>>::from_type();
/// ```
pub trait FromType<T: Typed> {
    fn from_type() -> Self;
}

// -----------------------------------------------------------------------------
// TypeTraits

/// A small table of [`TypeTrait`]s keyed by their [`TypeId`].
///
/// Tables hold a handful of entries at most, a linear scan beats hashing.
#[derive(Default)]
pub struct TypeTraits {
    table: Vec<(TypeId, Box<dyn TypeTrait>)>,
}

impl TypeTraits {
    /// Creates an empty table.
    #[inline]
    pub const fn new() -> Self {
        Self { table: Vec::new() }
    }

    /// Returns a shared empty table.
    #[inline]
    pub fn empty() -> &'static TypeTraits {
        static EMPTY: TypeTraits = TypeTraits::new();
        &EMPTY
    }

    /// Inserts a type trait, replacing a previous one of the same type.
    pub fn insert<T: TypeTrait>(&mut self, type_trait: T) {
        let id = TypeId::of::<T>();
        let boxed: Box<dyn TypeTrait> = Box::new(type_trait);
        match self.table.iter_mut().find(|(k, _)| *k == id) {
            Some((_, slot)) => *slot = boxed,
            None => self.table.push((id, boxed)),
        }
    }

    /// Returns the type trait `T`, if present.
    ///
    /// ```
    /// use vc_json_reflect::Typed;
    /// use vc_json_reflect::traits::{TypeTraitDeserialize, TypeTraitSerialize};
    ///
    /// let traits = serde_json::Value::type_info().type_traits();
    ///
    /// assert!(traits.get::<TypeTraitSerialize>().is_some());
    /// assert!(traits.get::<TypeTraitDeserialize>().is_some());
    /// assert!(i32::type_info().type_traits().get::<TypeTraitSerialize>().is_none());
    /// ```
    pub fn get<T: TypeTrait>(&self) -> Option<&T> {
        let id = TypeId::of::<T>();
        self.table
            .iter()
            .find(|(k, _)| *k == id)
            .and_then(|(_, v)| <dyn Any>::downcast_ref::<T>(&**v))
    }

    /// Returns `true` if the type trait `T` is present.
    #[inline]
    pub fn contains<T: TypeTrait>(&self) -> bool {
        let id = TypeId::of::<T>();
        self.table.iter().any(|(k, _)| *k == id)
    }

    /// Returns the number of type traits.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Clone for TypeTraits {
    fn clone(&self) -> Self {
        Self {
            table: self
                .table
                .iter()
                .map(|(k, v)| (*k, (**v).clone_type_trait()))
                .collect(),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeTraitSerialize

/// A container providing `serde` serialization support for reflected types.
///
/// Internally stores a function pointer for a specific type. When given a reflected
/// value, it downcasts to the concrete type and exposes its `serde` implementation.
///
/// # Examples
///
/// ```
/// use vc_json_reflect::traits::{FromType, TypeTraitSerialize};
///
/// let processor = <TypeTraitSerialize as FromType<serde_json::Value>>::from_type();
/// let input = serde_json::json!({ "value": 123 });
///
/// let mut output = Vec::new();
/// let mut serializer = serde_json::Serializer::new(&mut output);
/// processor.serialize(&input, &mut serializer).unwrap();
///
/// assert_eq!(output, br#"{"value":123}"#);
/// ```
#[derive(Clone)]
pub struct TypeTraitSerialize {
    fun: fn(value: &dyn Reflect) -> Option<&dyn erased_serde::Serialize>,
}

impl<T: Serialize + Typed> FromType<T> for TypeTraitSerialize {
    fn from_type() -> Self {
        Self {
            fun: |value| {
                value
                    .downcast_ref::<T>()
                    .map(|val| val as &dyn erased_serde::Serialize)
            },
        }
    }
}

impl TypeTraitSerialize {
    /// Returns the value as a `serde` serializable, or `None` on type mismatch.
    #[inline(always)]
    pub fn erased<'a>(&self, value: &'a dyn Reflect) -> Option<&'a dyn erased_serde::Serialize> {
        (self.fun)(value)
    }

    /// Call T's [`Serialize`].
    ///
    /// Returns a custom error on type mismatch.
    pub fn serialize<S: Serializer>(
        &self,
        value: &dyn Reflect,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match (self.fun)(value) {
            Some(val) => erased_serde::serialize(val, serializer),
            None => Err(<S::Error as serde_core::ser::Error>::custom(format_args!(
                "serialize type mismatched, value type: {}",
                value.reflect_type_info().type_path(),
            ))),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeTraitDeserialize

/// A container providing `serde` deserialization support for reflected types.
///
/// # Examples
///
/// ```
/// use vc_json_reflect::traits::{FromType, TypeTraitDeserialize};
///
/// let processor = <TypeTraitDeserialize as FromType<serde_json::Value>>::from_type();
///
/// let mut deserializer = serde_json::Deserializer::from_str("[1,2]");
/// let val = processor.deserialize(&mut deserializer).unwrap();
///
/// assert_eq!(val.take::<serde_json::Value>().unwrap(), serde_json::json!([1, 2]));
/// ```
#[derive(Clone)]
pub struct TypeTraitDeserialize {
    func: fn(
        deserializer: &mut dyn erased_serde::Deserializer,
    ) -> Result<Box<dyn Reflect>, erased_serde::Error>,
    func_into: fn(
        target: &mut dyn Reflect,
        deserializer: &mut dyn erased_serde::Deserializer,
    ) -> Result<(), erased_serde::Error>,
}

impl TypeTraitDeserialize {
    /// Deserializes a reflected value.
    #[inline(always)]
    pub fn deserialize<'de, D: Deserializer<'de>>(
        &self,
        deserializer: D,
    ) -> Result<Box<dyn Reflect>, D::Error> {
        let mut erased = <dyn erased_serde::Deserializer>::erase(deserializer);
        (self.func)(&mut erased).map_err(<D::Error as serde_core::de::Error>::custom)
    }

    /// Deserializes into an existing value, replacing it.
    ///
    /// Returns a custom error on type mismatch.
    ///
    /// ```
    /// use vc_json_reflect::traits::{FromType, TypeTraitDeserialize};
    ///
    /// let processor = <TypeTraitDeserialize as FromType<serde_json::Value>>::from_type();
    /// let mut value = serde_json::Value::Null;
    ///
    /// let mut deserializer = serde_json::Deserializer::from_str("true");
    /// processor.deserialize_into(&mut value, &mut deserializer).unwrap();
    ///
    /// assert_eq!(value, serde_json::Value::Bool(true));
    /// ```
    pub fn deserialize_into<'de, D: Deserializer<'de>>(
        &self,
        target: &mut dyn Reflect,
        deserializer: D,
    ) -> Result<(), D::Error> {
        let mut erased = <dyn erased_serde::Deserializer>::erase(deserializer);
        (self.func_into)(target, &mut erased).map_err(<D::Error as serde_core::de::Error>::custom)
    }
}

impl<T: for<'a> Deserialize<'a> + Typed> FromType<T> for TypeTraitDeserialize {
    fn from_type() -> Self {
        Self {
            func: |deserializer| Ok(Box::new(T::deserialize(deserializer)?)),
            func_into: |target, deserializer| match target.downcast_mut::<T>() {
                Some(slot) => {
                    *slot = T::deserialize(deserializer)?;
                    Ok(())
                }
                None => Err(<erased_serde::Error as serde_core::de::Error>::custom(
                    format_args!(
                        "deserialize type mismatched, target type: {}",
                        target.reflect_type_info().type_path(),
                    ),
                )),
            },
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeTraits;

    #[derive(Clone, Debug, PartialEq)]
    struct Label(&'static str);

    #[test]
    fn clone_table() {
        let mut traits = TypeTraits::new();
        traits.insert(Label("first"));
        traits.insert(7_u32);
        traits.insert(Label("second"));

        let cloned = traits.clone();
        assert_eq!(cloned.len(), 2);
        assert_eq!(cloned.get::<Label>(), Some(&Label("second")));
        assert_eq!(cloned.get::<u32>(), Some(&7));
        assert!(!cloned.contains::<i64>());
    }
}

use core::any::{Any, TypeId};

use crate::info::{Type, TypeInfo};
use crate::{Reflect, Typed};

// -----------------------------------------------------------------------------
// ListInfo

/// A container for compile-time list-like info.
///
/// # Examples
///
/// ```
/// use vc_json_reflect::Typed;
///
/// let info = <Vec<i32>>::type_info().as_list().unwrap();
///
/// assert!(info.item_is::<i32>());
/// ```
#[derive(Clone, Debug)]
pub struct ListInfo {
    ty: Type,
    item_id: TypeId,
    // `TypeInfo` is created on the first visit, use function pointers to delay it.
    item_info: fn() -> &'static TypeInfo,
}

impl ListInfo {
    /// Creates a new [`ListInfo`].
    #[inline]
    pub fn new<TList: Reflect + Default, TItem: Typed>() -> Self {
        Self {
            ty: Type::of::<TList>(),
            item_id: TypeId::of::<TItem>(),
            item_info: TItem::type_info,
        }
    }

    /// Returns the [`Type`].
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the [`TypeId`] of list items.
    #[inline]
    pub const fn item_id(&self) -> TypeId {
        self.item_id
    }

    /// Returns `true` if the item type is `T`.
    #[inline]
    pub fn item_is<T: Any>(&self) -> bool {
        self.item_id == TypeId::of::<T>()
    }

    /// Returns the [`TypeInfo`] of list items.
    #[inline]
    pub fn item_info(&self) -> &'static TypeInfo {
        (self.item_info)()
    }
}

// -----------------------------------------------------------------------------
// ArrayInfo

/// A container for compile-time fixed-size array info.
///
/// ```
/// use vc_json_reflect::Typed;
///
/// let info = <[u8; 4]>::type_info().as_array().unwrap();
///
/// assert!(info.item_is::<u8>());
/// assert_eq!(info.capacity(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct ArrayInfo {
    ty: Type,
    item_id: TypeId,
    item_info: fn() -> &'static TypeInfo,
    capacity: usize,
}

impl ArrayInfo {
    /// Creates a new [`ArrayInfo`] with an explicit [`Type`].
    ///
    /// Arrays longer than 32 have no [`Default`], so the caller supplies the constructor.
    #[inline]
    pub fn new<TItem: Typed>(ty: Type, capacity: usize) -> Self {
        Self {
            ty,
            item_id: TypeId::of::<TItem>(),
            item_info: TItem::type_info,
            capacity,
        }
    }

    /// Returns the [`Type`].
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the [`TypeId`] of array items.
    #[inline]
    pub const fn item_id(&self) -> TypeId {
        self.item_id
    }

    /// Returns `true` if the item type is `T`.
    #[inline]
    pub fn item_is<T: Any>(&self) -> bool {
        self.item_id == TypeId::of::<T>()
    }

    /// Returns the [`TypeInfo`] of array items.
    #[inline]
    pub fn item_info(&self) -> &'static TypeInfo {
        (self.item_info)()
    }

    /// Returns the fixed length.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

// -----------------------------------------------------------------------------
// MapInfo

/// A container for compile-time map-like info.
///
/// ```
/// use std::collections::BTreeMap;
/// use vc_json_reflect::Typed;
///
/// let info = <BTreeMap<String, f64>>::type_info().as_map().unwrap();
///
/// assert!(info.key_is::<String>());
/// assert!(info.value_is::<f64>());
/// ```
#[derive(Clone, Debug)]
pub struct MapInfo {
    ty: Type,
    key_id: TypeId,
    key_info: fn() -> &'static TypeInfo,
    value_id: TypeId,
    value_info: fn() -> &'static TypeInfo,
}

impl MapInfo {
    /// Creates a new [`MapInfo`].
    #[inline]
    pub fn new<TMap: Reflect + Default, TKey: Typed, TValue: Typed>() -> Self {
        Self {
            ty: Type::of::<TMap>(),
            key_id: TypeId::of::<TKey>(),
            key_info: TKey::type_info,
            value_id: TypeId::of::<TValue>(),
            value_info: TValue::type_info,
        }
    }

    /// Returns the [`Type`].
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the [`TypeId`] of keys.
    #[inline]
    pub const fn key_id(&self) -> TypeId {
        self.key_id
    }

    /// Returns `true` if the key type is `T`.
    #[inline]
    pub fn key_is<T: Any>(&self) -> bool {
        self.key_id == TypeId::of::<T>()
    }

    /// Returns the [`TypeInfo`] of keys.
    #[inline]
    pub fn key_info(&self) -> &'static TypeInfo {
        (self.key_info)()
    }

    /// Returns the [`TypeId`] of values.
    #[inline]
    pub const fn value_id(&self) -> TypeId {
        self.value_id
    }

    /// Returns `true` if the value type is `T`.
    #[inline]
    pub fn value_is<T: Any>(&self) -> bool {
        self.value_id == TypeId::of::<T>()
    }

    /// Returns the [`TypeInfo`] of values.
    #[inline]
    pub fn value_info(&self) -> &'static TypeInfo {
        (self.value_info)()
    }
}

// -----------------------------------------------------------------------------
// PointerInfo

/// A container for compile-time pointer info.
///
/// `Option<T>` is a nullable pointer, `Box<T>` always points to a value.
///
/// ```
/// use vc_json_reflect::Typed;
///
/// let info = <Option<i64>>::type_info().as_pointer().unwrap();
/// assert!(info.target_is::<i64>());
/// assert!(info.is_nullable());
///
/// let info = <Box<i64>>::type_info().as_pointer().unwrap();
/// assert!(!info.is_nullable());
/// ```
#[derive(Clone, Debug)]
pub struct PointerInfo {
    ty: Type,
    target_id: TypeId,
    target_info: fn() -> &'static TypeInfo,
    nullable: bool,
}

impl PointerInfo {
    /// Creates a new [`PointerInfo`].
    #[inline]
    pub fn new<TPtr: Reflect + Default, TTarget: Typed>(nullable: bool) -> Self {
        Self {
            ty: Type::of::<TPtr>(),
            target_id: TypeId::of::<TTarget>(),
            target_info: TTarget::type_info,
            nullable,
        }
    }

    /// Returns the [`Type`].
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the [`TypeId`] of the pointee.
    #[inline]
    pub const fn target_id(&self) -> TypeId {
        self.target_id
    }

    /// Returns `true` if the pointee type is `T`.
    #[inline]
    pub fn target_is<T: Any>(&self) -> bool {
        self.target_id == TypeId::of::<T>()
    }

    /// Returns the [`TypeInfo`] of the pointee.
    #[inline]
    pub fn target_info(&self) -> &'static TypeInfo {
        (self.target_info)()
    }

    /// Returns `true` if the pointer can be absent.
    #[inline]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }
}

// -----------------------------------------------------------------------------
// DynamicInfo

/// Compile-time info of a dynamic slot, `Box<dyn Reflect>`.
///
/// The concrete type is only known per value, through [`Dynamic::inner`].
///
/// [`Dynamic::inner`]: crate::ops::Dynamic::inner
#[derive(Clone, Debug)]
pub struct DynamicInfo {
    ty: Type,
}

impl DynamicInfo {
    /// Creates a new [`DynamicInfo`], the [`Type`] carries the empty-slot constructor.
    #[inline]
    pub const fn new(ty: Type) -> Self {
        Self { ty }
    }

    /// Returns the [`Type`].
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }
}

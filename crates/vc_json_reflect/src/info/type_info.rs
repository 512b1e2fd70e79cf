use core::any::{Any, TypeId};
use core::{error, fmt};

use crate::Reflect;
use crate::info::{ArrayInfo, DynamicInfo, ListInfo, MapInfo, PointerInfo};
use crate::info::{OpaqueInfo, ScalarInfo, StructInfo};
use crate::traits::TypeTraits;

// -----------------------------------------------------------------------------
// Type

/// Identity of a reflected type: its [`TypeId`], its path and a way to build its zero value.
///
/// The zero value plays the role of an uninitialized destination during decoding,
/// so every reflected type must be able to produce one.
#[derive(Clone, Copy)]
pub struct Type {
    id: TypeId,
    path: &'static str,
    construct: fn() -> Box<dyn Reflect>,
}

impl Type {
    /// Creates the [`Type`] of `T`, using [`Default`] as its zero value.
    #[inline]
    pub fn of<T: Reflect + Default>() -> Self {
        Self::with_constructor::<T>(|| Box::new(T::default()))
    }

    /// Creates the [`Type`] of `T` with an explicit zero-value constructor.
    #[inline]
    pub fn with_constructor<T: Reflect>(construct: fn() -> Box<dyn Reflect>) -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: core::any::type_name::<T>(),
            construct,
        }
    }

    /// Returns the [`TypeId`].
    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the full type path, e.g. `alloc::vec::Vec<i32>`.
    #[inline]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Returns the type name without module path of the outermost type.
    ///
    /// ```
    /// use vc_json_reflect::info::Type;
    ///
    /// assert_eq!(Type::of::<Vec<i32>>().name(), "Vec<i32>");
    /// assert_eq!(Type::of::<u8>().name(), "u8");
    /// ```
    pub fn name(&self) -> &'static str {
        let head = match self.path.find('<') {
            Some(end) => &self.path[..end],
            None => self.path,
        };
        match head.rfind("::") {
            Some(start) => &self.path[start + 2..],
            None => self.path,
        }
    }

    /// Check if the given type matches this one.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Creates a new zero value of this type.
    #[inline]
    pub fn zero_value(&self) -> Box<dyn Reflect> {
        (self.construct)()
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.path)
    }
}

/// A zero-check function for comparable types, see [`StructInfo::with_zero_check`].
///
/// Returns `false` when `value` is not a `T`.
pub fn zero_check<T: PartialEq + Default + Any>(value: &dyn Reflect) -> bool {
    value.downcast_ref::<T>().is_some_and(|v| *v == T::default())
}

// -----------------------------------------------------------------------------
// ReflectKind

/// An enumeration of the "kinds" of a reflected type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReflectKind {
    Struct,
    List,
    Array,
    Map,
    Pointer,
    Dynamic,
    Scalar,
    Opaque,
}

impl fmt::Display for ReflectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Struct => f.pad("Struct"),
            Self::List => f.pad("List"),
            Self::Array => f.pad("Array"),
            Self::Map => f.pad("Map"),
            Self::Pointer => f.pad("Pointer"),
            Self::Dynamic => f.pad("Dynamic"),
            Self::Scalar => f.pad("Scalar"),
            Self::Opaque => f.pad("Opaque"),
        }
    }
}

/// Error returned when a value or `TypeInfo` is not the expected [`ReflectKind`].
#[derive(Debug)]
pub struct ReflectKindError {
    pub expected: ReflectKind,
    pub received: ReflectKind,
}

impl fmt::Display for ReflectKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reflect kind mismatch: expected {}, received {}",
            self.expected, self.received
        )
    }
}

impl error::Error for ReflectKindError {}

// -----------------------------------------------------------------------------
// TypeInfo

/// Compile-time type information for reflected types.
///
/// Obtained through [`Typed::type_info`](crate::Typed::type_info) when the type is
/// known statically, or [`Reflect::reflect_type_info`] from a `dyn Reflect`.
pub enum TypeInfo {
    Struct(StructInfo),
    List(ListInfo),
    Array(ArrayInfo),
    Map(MapInfo),
    Pointer(PointerInfo),
    Dynamic(DynamicInfo),
    Scalar(ScalarInfo),
    Opaque(OpaqueInfo),
}

// Helper macro that implements type-safe accessor methods like `as_struct`.
macro_rules! impl_cast_method {
    ($name:ident : $kind:ident => $info:ident) => {
        /// Convert [`TypeInfo`] to specific type information.
        pub const fn $name(&self) -> Result<&$info, ReflectKindError> {
            match self {
                Self::$kind(info) => Ok(info),
                _ => Err(ReflectKindError {
                    expected: ReflectKind::$kind,
                    received: self.kind(),
                }),
            }
        }
    };
}

impl TypeInfo {
    impl_cast_method!(as_struct: Struct => StructInfo);
    impl_cast_method!(as_list: List => ListInfo);
    impl_cast_method!(as_array: Array => ArrayInfo);
    impl_cast_method!(as_map: Map => MapInfo);
    impl_cast_method!(as_pointer: Pointer => PointerInfo);
    impl_cast_method!(as_dynamic: Dynamic => DynamicInfo);
    impl_cast_method!(as_scalar: Scalar => ScalarInfo);
    impl_cast_method!(as_opaque: Opaque => OpaqueInfo);

    /// Returns the underlying [`Type`] metadata.
    pub const fn ty(&self) -> &Type {
        match self {
            Self::Struct(info) => info.ty(),
            Self::List(info) => info.ty(),
            Self::Array(info) => info.ty(),
            Self::Map(info) => info.ty(),
            Self::Pointer(info) => info.ty(),
            Self::Dynamic(info) => info.ty(),
            Self::Scalar(info) => info.ty(),
            Self::Opaque(info) => info.ty(),
        }
    }

    /// Returns the [`TypeId`].
    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.ty().id()
    }

    /// Returns the full type path.
    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.ty().path()
    }

    /// Check if the described type is `T`.
    #[inline]
    pub fn type_is<T: Any>(&self) -> bool {
        self.ty().is::<T>()
    }

    /// Returns the [`ReflectKind`] for this `TypeInfo` (a fast discriminator).
    ///
    /// ```
    /// use vc_json_reflect::{Typed, info::ReflectKind};
    ///
    /// assert_eq!(i32::type_info().kind(), ReflectKind::Scalar);
    /// assert_eq!(<Option<i32>>::type_info().kind(), ReflectKind::Pointer);
    /// ```
    pub const fn kind(&self) -> ReflectKind {
        match self {
            Self::Struct(_) => ReflectKind::Struct,
            Self::List(_) => ReflectKind::List,
            Self::Array(_) => ReflectKind::Array,
            Self::Map(_) => ReflectKind::Map,
            Self::Pointer(_) => ReflectKind::Pointer,
            Self::Dynamic(_) => ReflectKind::Dynamic,
            Self::Scalar(_) => ReflectKind::Scalar,
            Self::Opaque(_) => ReflectKind::Opaque,
        }
    }

    /// Returns the type traits attached to this type.
    ///
    /// Only struct and opaque types carry traits, others return an empty table.
    pub fn type_traits(&self) -> &TypeTraits {
        match self {
            Self::Struct(info) => info.type_traits(),
            Self::Opaque(info) => info.type_traits(),
            _ => TypeTraits::empty(),
        }
    }

    /// Tests whether `value` equals the zero value of this type.
    ///
    /// Returns `None` when the type is not comparable.
    pub fn is_zero(&self, value: &dyn Reflect) -> Option<bool> {
        let check = match self {
            Self::Struct(info) => info.zero_check(),
            Self::Scalar(info) => Some(info.zero_check()),
            Self::Opaque(info) => info.zero_check(),
            _ => None,
        };
        check.map(|f| f(value))
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeInfo::{}({})", self.kind(), self.type_path())
    }
}

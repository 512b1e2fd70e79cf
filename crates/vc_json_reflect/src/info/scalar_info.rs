use core::fmt;

use crate::Reflect;
use crate::info::{Type, zero_check};
use crate::traits::{TypeTrait, TypeTraits};

// -----------------------------------------------------------------------------
// ScalarKind

/// The primitive shapes a codec knows how to write without help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    String,
    /// A UTC timestamp, written as a formatted string.
    Time,
}

impl ScalarKind {
    /// Returns `true` for signed integer kinds.
    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::Isize
        )
    }

    /// Returns `true` for unsigned integer kinds.
    #[inline]
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::U8 | Self::U16 | Self::U32 | Self::U64 | Self::Usize
        )
    }

    /// Returns `true` for floating point kinds.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Returns `true` for any number kind.
    #[inline]
    pub const fn is_number(self) -> bool {
        self.is_signed() || self.is_unsigned() || self.is_float()
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
            Self::Time => "time",
        };
        f.pad(name)
    }
}

// -----------------------------------------------------------------------------
// ScalarInfo

/// A container for compile-time scalar info.
///
/// ```
/// use vc_json_reflect::{Typed, info::ScalarKind};
///
/// let info = u16::type_info().as_scalar().unwrap();
///
/// assert_eq!(info.kind(), ScalarKind::U16);
/// assert!(u16::type_info().is_zero(&0_u16).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct ScalarInfo {
    ty: Type,
    kind: ScalarKind,
    zero_check: fn(&dyn Reflect) -> bool,
}

impl ScalarInfo {
    /// Creates a new [`ScalarInfo`].
    #[inline]
    pub fn new<T: Reflect + Default + PartialEq>(kind: ScalarKind) -> Self {
        Self {
            ty: Type::of::<T>(),
            kind,
            zero_check: zero_check::<T>,
        }
    }

    /// Returns the [`Type`].
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the [`ScalarKind`].
    #[inline]
    pub const fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Returns the zero-check.
    #[inline]
    pub const fn zero_check(&self) -> fn(&dyn Reflect) -> bool {
        self.zero_check
    }
}

// -----------------------------------------------------------------------------
// OpaqueInfo

/// A container for compile-time opaque info.
///
/// The content of an opaque type is invisible to reflection: a codec can only be
/// built from its [type traits](crate::traits).
pub struct OpaqueInfo {
    ty: Type,
    zero_check: Option<fn(&dyn Reflect) -> bool>,
    type_traits: TypeTraits,
}

impl OpaqueInfo {
    /// Creates a new [`OpaqueInfo`].
    #[inline]
    pub fn new<T: Reflect + Default>() -> Self {
        Self {
            ty: Type::of::<T>(),
            zero_check: None,
            type_traits: TypeTraits::new(),
        }
    }

    /// Attaches a zero-check, see [`zero_check`](crate::info::zero_check).
    #[inline]
    pub fn with_zero_check(mut self, check: fn(&dyn Reflect) -> bool) -> Self {
        self.zero_check = Some(check);
        self
    }

    /// Attaches a type trait.
    #[inline]
    pub fn with_trait<R: TypeTrait>(mut self, type_trait: R) -> Self {
        self.type_traits.insert(type_trait);
        self
    }

    /// Returns the [`Type`].
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the zero-check, if the type is comparable.
    #[inline]
    pub fn zero_check(&self) -> Option<fn(&dyn Reflect) -> bool> {
        self.zero_check
    }

    /// Returns the attached type traits.
    #[inline]
    pub fn type_traits(&self) -> &TypeTraits {
        &self.type_traits
    }
}

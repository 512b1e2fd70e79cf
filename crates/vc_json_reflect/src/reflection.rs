use core::any::{Any, TypeId};

use crate::info::TypeInfo;
use crate::ops::{ReflectMut, ReflectRef};

// -----------------------------------------------------------------------------
// Reflect

/// The foundational trait for dynamic value access.
///
/// A `&dyn Reflect` can report its static [`TypeInfo`] and be cast into one of the
/// kind-specific views ([`ReflectRef`]/[`ReflectMut`]). Codecs are built once from the
/// `TypeInfo` and then walk values through these views, so no memory layout
/// knowledge is ever required.
///
/// It's strongly recommended to use [the derive macro](crate::derive::Reflect) rather
/// than implementing this trait manually.
///
/// # Type Identification
///
/// [`Any::type_id`] on a `Box<dyn Reflect>` returns the id of the box itself.
/// Use [`Reflect::ty_id`] or [`TypeInfo::type_id`] instead:
///
/// ```
/// use core::any::TypeId;
/// use vc_json_reflect::Reflect;
///
/// let x: Box<dyn Reflect> = Box::new(32_i32);
/// assert!((*x).ty_id() == TypeId::of::<i32>());
/// assert!((*x).reflect_type_info().type_id() == TypeId::of::<i32>());
///
/// // `Box<dyn Reflect>` is itself a reflected (dynamic) type.
/// assert!(x.reflect_type_info().type_id() == TypeId::of::<Box<dyn Reflect>>());
/// ```
pub trait Reflect: Any + Send + Sync {
    /// Returns the static [`TypeInfo`] of the underlying type.
    fn reflect_type_info(&self) -> &'static TypeInfo;

    /// Casts this value into its kind-specific immutable view.
    fn reflect_ref(&self) -> ReflectRef<'_>;

    /// Casts this value into its kind-specific mutable view.
    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// Casts this type to a fully-reflected value.
    #[inline(always)]
    fn as_reflect(&self) -> &dyn Reflect
    where
        Self: Sized,
    {
        self
    }

    /// Casts this type to a mutable, fully-reflected value.
    #[inline(always)]
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect
    where
        Self: Sized,
    {
        self
    }

    /// Return the [`TypeId`] of underlying type.
    #[inline]
    fn ty_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}

impl dyn Reflect {
    /// Returns `true` if the underlying value is of type `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.ty_id() == TypeId::of::<T>()
    }

    /// Downcasts the value to type `T` by reference.
    ///
    /// ```
    /// use vc_json_reflect::Reflect;
    ///
    /// let x: Box<dyn Reflect> = Box::new(10_u8);
    /// assert_eq!(x.downcast_ref::<u8>(), Some(&10));
    /// assert_eq!(x.downcast_ref::<i8>(), None);
    /// ```
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        <dyn Any>::downcast_ref(self)
    }

    /// Downcasts the value to type `T` by mutable reference.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        <dyn Any>::downcast_mut(self)
    }

    /// Downcasts a boxed value to type `T`, returning the box untouched on mismatch.
    pub fn take<T: Any>(self: Box<dyn Reflect>) -> Result<T, Box<dyn Reflect>> {
        if !self.is::<T>() {
            return Err(self);
        }
        let any: Box<dyn Any> = self;
        match any.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => unreachable!("type id checked above"),
        }
    }
}

impl core::fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "dyn Reflect({})", self.reflect_type_info().type_path())
    }
}

// -----------------------------------------------------------------------------
// Typed

/// A static accessor to compile-time type information.
///
/// Automatically implemented by [`#[derive(Reflect)]`](crate::derive::Reflect).
///
/// The returned reference is built once (see [`NonGenericTypeInfoCell`] and
/// [`GenericTypeInfoCell`]) and lives for the rest of the program.
///
/// [`NonGenericTypeInfoCell`]: crate::NonGenericTypeInfoCell
/// [`GenericTypeInfoCell`]: crate::GenericTypeInfoCell
pub trait Typed: Reflect + Sized {
    /// Returns the compile-time [`TypeInfo`] for this type.
    fn type_info() -> &'static TypeInfo;
}

// -----------------------------------------------------------------------------
// Helpers

// Implements the three required `Reflect` methods for a type that is also `Typed`
// and implements the kind trait named by `$kind`.
macro_rules! impl_reflect_cast_fn {
    ($kind:ident) => {
        #[inline]
        fn reflect_type_info(&self) -> &'static $crate::info::TypeInfo {
            <Self as $crate::Typed>::type_info()
        }

        #[inline]
        fn reflect_ref(&self) -> $crate::ops::ReflectRef<'_> {
            $crate::ops::ReflectRef::$kind(self)
        }

        #[inline]
        fn reflect_mut(&mut self) -> $crate::ops::ReflectMut<'_> {
            $crate::ops::ReflectMut::$kind(self)
        }
    };
}

pub(crate) use impl_reflect_cast_fn;

use crate::Reflect;

// -----------------------------------------------------------------------------
// Pointer

/// A trait used to power pointer operations via [reflection].
///
/// Implemented by `Option<T>` (nullable) and `Box<T>` (always points to a value).
///
/// ```
/// use vc_json_reflect::ops::Pointer;
///
/// let mut ptr: Option<i32> = None;
/// assert!(ptr.target().is_none());
///
/// *ptr.target_or_default().downcast_mut::<i32>().unwrap() = 3;
/// assert_eq!(ptr, Some(3));
///
/// ptr.set_null();
/// assert_eq!(ptr, None);
/// ```
///
/// [reflection]: crate
pub trait Pointer: Reflect {
    /// Returns the pointee, `None` when absent.
    fn target(&self) -> Option<&dyn Reflect>;

    /// Returns the pointee mutably, `None` when absent.
    fn target_mut(&mut self) -> Option<&mut dyn Reflect>;

    /// Returns the pointee, allocating a zero value first when absent.
    fn target_or_default(&mut self) -> &mut dyn Reflect;

    /// Makes the pointer absent. Non-nullable pointers reset the pointee to zero.
    fn set_null(&mut self);

    /// Returns `true` when the pointer can be absent.
    fn is_nullable(&self) -> bool;
}

// -----------------------------------------------------------------------------
// Dynamic

/// A trait used to power operations on `Box<dyn Reflect>` via [reflection].
///
/// ```
/// use vc_json_reflect::{Reflect, ops::Dynamic};
///
/// let mut slot: Box<dyn Reflect> = Box::new(1_u8);
/// assert!(Dynamic::inner(&slot).is::<u8>());
///
/// Dynamic::replace(&mut slot, Box::new(String::from("x")));
/// assert!(Dynamic::inner(&slot).is::<String>());
/// ```
///
/// [reflection]: crate
pub trait Dynamic: Reflect {
    /// Returns the held value.
    fn inner(&self) -> &dyn Reflect;

    /// Returns the held value mutably.
    fn inner_mut(&mut self) -> &mut dyn Reflect;

    /// Replaces the held value.
    fn replace(&mut self, value: Box<dyn Reflect>);
}

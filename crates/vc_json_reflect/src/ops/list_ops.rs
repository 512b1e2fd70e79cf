use crate::Reflect;

// -----------------------------------------------------------------------------
// List

/// A trait used to power [list-like] operations via [reflection].
///
/// # Example
///
/// ```
/// use vc_json_reflect::ops::List;
///
/// let mut list: Vec<i32> = vec![1];
///
/// *List::push_default(&mut list).downcast_mut::<i32>().unwrap() = 2;
/// assert_eq!(List::len(&list), 2);
/// assert_eq!(List::get(&list, 1).unwrap().downcast_ref::<i32>(), Some(&2));
///
/// List::clear(&mut list);
/// assert!(list.is_empty());
/// ```
///
/// [list-like]: https://doc.rust-lang.org/book/ch08-01-vectors.html
/// [reflection]: crate
pub trait List: Reflect {
    /// Returns the number of items.
    fn len(&self) -> usize;

    /// Returns `true` if the list has no items.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a reference to the item at `index`.
    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    /// Returns a mutable reference to the item at `index`.
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Appends a zero item and returns it for in-place filling.
    fn push_default(&mut self) -> &mut dyn Reflect;

    /// Removes all items, keeping the allocation.
    fn clear(&mut self);
}

// -----------------------------------------------------------------------------
// Array

/// A trait used to power [array-like] operations via [reflection].
///
/// The length never changes.
///
/// [array-like]: https://doc.rust-lang.org/book/ch03-02-data-types.html#the-array-type
/// [reflection]: crate
pub trait Array: Reflect {
    /// Returns the fixed number of items.
    fn len(&self) -> usize;

    /// Returns `true` for zero-length arrays.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a reference to the item at `index`.
    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    /// Returns a mutable reference to the item at `index`.
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

use crate::Reflect;

/// A trait used to power [struct-like] operations via [reflection].
///
/// Fields are addressed by their declaration index, see
/// [`StructInfo::index_of`](crate::info::StructInfo::index_of) for the name lookup.
///
/// This trait is automatically implemented by `#[derive(Reflect)]`.
///
/// # Example
///
/// ```
/// use vc_json_reflect::{derive::Reflect, ops::Struct};
///
/// #[derive(Reflect, Default)]
/// struct Foo {
///     bar: u32,
/// }
///
/// let mut foo = Foo { bar: 123 };
///
/// assert_eq!(foo.field_len(), 1);
/// assert_eq!(foo.field("bar").unwrap().downcast_ref::<u32>(), Some(&123));
///
/// *foo.field_at_mut(0).unwrap().downcast_mut::<u32>().unwrap() = 7;
/// assert_eq!(foo.bar, 7);
/// ```
///
/// [struct-like]: https://doc.rust-lang.org/book/ch05-01-defining-structs.html
/// [reflection]: crate
pub trait Struct: Reflect {
    /// Returns a reference to the field at `index`.
    fn field_at(&self, index: usize) -> Option<&dyn Reflect>;

    /// Returns a mutable reference to the field at `index`.
    fn field_at_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Returns the number of fields.
    fn field_len(&self) -> usize;

    /// Returns a reference to the field named `name`.
    fn field(&self, name: &str) -> Option<&dyn Reflect> {
        let index = self.reflect_type_info().as_struct().ok()?.index_of(name)?;
        self.field_at(index)
    }

    /// Returns a mutable reference to the field named `name`.
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Reflect> {
        let index = self.reflect_type_info().as_struct().ok()?.index_of(name)?;
        self.field_at_mut(index)
    }
}

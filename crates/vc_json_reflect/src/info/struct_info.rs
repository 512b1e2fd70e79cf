use core::any::TypeId;

use foldhash::fast::FixedState;
use hashbrown::HashMap;

use crate::info::{Type, TypeInfo};
use crate::traits::{TypeTrait, TypeTraits};
use crate::{Reflect, Typed};

// -----------------------------------------------------------------------------
// NamedField

/// Information for a named struct field.
///
/// Besides the field type, a field carries its raw annotations: a list of
/// `key -> value` pairs written with `#[tag(...)]`, similar to a struct tag.
/// Annotations are **not** interpreted here; the codec parses them when it builds
/// a codec for the owning struct.
///
/// # Examples
///
/// ```
/// use vc_json_reflect::{Typed, derive::Reflect};
///
/// #[derive(Reflect, Default)]
/// struct Foo {
///     #[tag(json = "Name,omitempty", sqlx = "primaryKey")]
///     name: String,
/// }
///
/// let field = Foo::type_info().as_struct().unwrap().field_at(0).unwrap();
///
/// assert!(field.type_is::<String>());
/// assert_eq!(field.name(), "name");
/// assert_eq!(field.tag("json"), Some("Name,omitempty"));
/// assert_eq!(field.tag("default"), None);
/// ```
#[derive(Clone)]
pub struct NamedField {
    name: &'static str,
    index: usize,
    ty_id: TypeId,
    // `TypeInfo` is created on first access, recursive types rely on this.
    type_info: fn() -> &'static TypeInfo,
    tags: &'static [(&'static str, &'static str)],
    embedded: bool,
}

impl NamedField {
    /// Creates a new [`NamedField`] for field `name` with type `T` at declaration `index`.
    #[inline]
    pub fn new<T: Typed>(name: &'static str, index: usize) -> Self {
        Self {
            name,
            index,
            ty_id: TypeId::of::<T>(),
            type_info: T::type_info,
            tags: &[],
            embedded: false,
        }
    }

    /// Attaches raw annotations.
    #[inline]
    pub const fn with_tags(mut self, tags: &'static [(&'static str, &'static str)]) -> Self {
        self.tags = tags;
        self
    }

    /// Marks the field as embedded: its own fields are flattened into the owner.
    #[inline]
    pub const fn with_embedded(mut self, embedded: bool) -> Self {
        self.embedded = embedded;
        self
    }

    /// Returns the field name, without any `r#` prefix.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declaration index, as accepted by [`Struct::field_at`].
    ///
    /// [`Struct::field_at`]: crate::ops::Struct::field_at
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the `TypeId`.
    #[inline]
    pub const fn ty_id(&self) -> TypeId {
        self.ty_id
    }

    /// Check if the given type matches this one.
    #[inline]
    pub fn type_is<T: core::any::Any>(&self) -> bool {
        self.ty_id == TypeId::of::<T>()
    }

    /// Returns the field's [`TypeInfo`].
    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        (self.type_info)()
    }

    /// Looks up the raw annotation for `key`.
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find_map(|(k, v)| if *k == key { Some(*v) } else { None })
    }

    /// Returns all raw annotations in declaration order.
    #[inline]
    pub const fn tags(&self) -> &'static [(&'static str, &'static str)] {
        self.tags
    }

    /// Returns `true` if the field was declared with `#[reflect(embed)]`.
    #[inline]
    pub const fn is_embedded(&self) -> bool {
        self.embedded
    }
}

impl core::fmt::Debug for NamedField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NamedField")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("tags", &self.tags)
            .field("embedded", &self.embedded)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// StructInfo

/// A container for compile-time named struct info.
///
/// The order of fields is the declaration order.
///
/// # Examples
///
/// ```
/// use vc_json_reflect::{Typed, derive::Reflect};
///
/// #[derive(Reflect, Default, PartialEq)]
/// #[reflect(partial_eq)]
/// struct A {
///     val: f32,
/// }
///
/// let info = A::type_info().as_struct().unwrap();
///
/// assert_eq!(info.field_len(), 1);
/// assert_eq!(info.index_of("val"), Some(0));
/// assert_eq!(A::type_info().is_zero(&A::default()), Some(true));
/// ```
pub struct StructInfo {
    ty: Type,
    fields: Box<[NamedField]>,
    indices: HashMap<&'static str, usize, FixedState>,
    zero_check: Option<fn(&dyn Reflect) -> bool>,
    type_traits: TypeTraits,
}

impl StructInfo {
    /// Create a new [`StructInfo`].
    pub fn new<T: Reflect + Default>(fields: &[NamedField]) -> Self {
        let indices = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.name(), index))
            .collect();

        Self {
            ty: Type::of::<T>(),
            fields: fields.into(),
            indices,
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

    /// Returns the [`NamedField`] for the given `name`, if present.
    pub fn field(&self, name: &str) -> Option<&NamedField> {
        self.fields.get(*self.indices.get(name)?)
    }

    /// Returns the [`NamedField`] at the given position, if present.
    #[inline]
    pub fn field_at(&self, index: usize) -> Option<&NamedField> {
        self.fields.get(index)
    }

    /// Returns the fields in **declaration order**.
    #[inline]
    pub fn fields(&self) -> &[NamedField] {
        &self.fields
    }

    /// Returns the position of the field `name`, if present.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    /// Returns the number of fields.
    #[inline]
    pub fn field_len(&self) -> usize {
        self.fields.len()
    }

    /// Returns the zero-check, if the struct is comparable.
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

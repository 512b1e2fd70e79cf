use core::{error, fmt};

use crate::Reflect;

/// Error returned by [`Map::insert_default`] when the key is not the map's key type.
///
/// The rejected key is handed back.
#[derive(Debug)]
pub struct MapInsertError {
    pub key: Box<dyn Reflect>,
    pub expected: &'static str,
}

impl MapInsertError {
    /// Returns the type path of the rejected key.
    #[inline]
    pub fn received(&self) -> &'static str {
        (*self.key).reflect_type_info().type_path()
    }
}

impl fmt::Display for MapInsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "map key type mismatch: expected {}, received {}",
            self.expected,
            self.received()
        )
    }
}

impl error::Error for MapInsertError {}

/// A trait used to power [map-like] operations via [reflection].
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use vc_json_reflect::ops::Map;
///
/// let mut map: BTreeMap<String, i32> = BTreeMap::new();
///
/// let value = map.insert_default(Box::new(String::from("a"))).unwrap();
/// *value.downcast_mut::<i32>().unwrap() = 5;
///
/// assert_eq!(Map::len(&map), 1);
/// assert_eq!(map["a"], 5);
/// assert!(map.insert_default(Box::new(1_u8)).is_err());
/// ```
///
/// [map-like]: https://doc.rust-lang.org/book/ch08-03-hash-maps.html
/// [reflection]: crate
pub trait Map: Reflect {
    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the map is empty.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the entries, in the map's own order.
    fn iter(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_>;

    /// Stores a zero value under `key`, replacing any existing entry, and returns it
    /// for in-place filling.
    fn insert_default(&mut self, key: Box<dyn Reflect>) -> Result<&mut dyn Reflect, MapInsertError>;

    /// Removes all entries.
    fn clear(&mut self);
}

use core::hash::{BuildHasher, Hash};
use std::collections::btree_map::Entry as BTreeEntry;
use std::collections::hash_map::Entry as StdEntry;
use std::collections::{BTreeMap, HashMap};

use hashbrown::HashMap as HashbrownMap;
use hashbrown::hash_map::Entry as HashbrownEntry;

use crate::info::{MapInfo, TypeInfo};
use crate::ops::{Map, MapInsertError};
use crate::reflection::impl_reflect_cast_fn;
use crate::{GenericTypeInfoCell, Reflect, Typed};

// Downcasts a boxed key into the map's key type.
fn take_key<K: Typed>(key: Box<dyn Reflect>) -> Result<K, MapInsertError> {
    key.take::<K>().map_err(|key| MapInsertError {
        key,
        expected: K::type_info().type_path(),
    })
}

// -----------------------------------------------------------------------------
// HashMap<K, V, S>

macro_rules! impl_reflect_for_hash_map {
    ($map:ident, $entry:ident) => {
        impl<K, V, S> Typed for $map<K, V, S>
        where
            K: Typed + Hash + Eq,
            V: Typed + Default,
            S: BuildHasher + Default + Send + Sync + 'static,
        {
            fn type_info() -> &'static TypeInfo {
                static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
                CELL.get_or_insert::<Self>(|| TypeInfo::Map(MapInfo::new::<Self, K, V>()))
            }
        }

        impl<K, V, S> Reflect for $map<K, V, S>
        where
            K: Typed + Hash + Eq,
            V: Typed + Default,
            S: BuildHasher + Default + Send + Sync + 'static,
        {
            impl_reflect_cast_fn!(Map);
        }

        impl<K, V, S> Map for $map<K, V, S>
        where
            K: Typed + Hash + Eq,
            V: Typed + Default,
            S: BuildHasher + Default + Send + Sync + 'static,
        {
            #[inline]
            fn len(&self) -> usize {
                $map::len(self)
            }

            fn iter(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
                Box::new(
                    $map::iter(self).map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect)),
                )
            }

            fn insert_default(
                &mut self,
                key: Box<dyn Reflect>,
            ) -> Result<&mut dyn Reflect, MapInsertError> {
                let value = match self.entry(take_key::<K>(key)?) {
                    $entry::Occupied(entry) => {
                        let slot = entry.into_mut();
                        *slot = V::default();
                        slot
                    }
                    $entry::Vacant(entry) => entry.insert(V::default()),
                };
                Ok(value)
            }

            #[inline]
            fn clear(&mut self) {
                $map::clear(self);
            }
        }
    };
}

impl_reflect_for_hash_map!(HashMap, StdEntry);
impl_reflect_for_hash_map!(HashbrownMap, HashbrownEntry);

// -----------------------------------------------------------------------------
// BTreeMap<K, V>

impl<K, V> Typed for BTreeMap<K, V>
where
    K: Typed + Ord,
    V: Typed + Default,
{
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::Map(MapInfo::new::<Self, K, V>()))
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: Typed + Ord,
    V: Typed + Default,
{
    impl_reflect_cast_fn!(Map);
}

impl<K, V> Map for BTreeMap<K, V>
where
    K: Typed + Ord,
    V: Typed + Default,
{
    #[inline]
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
        Box::new(BTreeMap::iter(self).map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect)))
    }

    fn insert_default(&mut self, key: Box<dyn Reflect>) -> Result<&mut dyn Reflect, MapInsertError> {
        let value = match self.entry(take_key::<K>(key)?) {
            BTreeEntry::Occupied(entry) => {
                let slot = entry.into_mut();
                *slot = V::default();
                slot
            }
            BTreeEntry::Vacant(entry) => entry.insert(V::default()),
        };
        Ok(value)
    }

    #[inline]
    fn clear(&mut self) {
        BTreeMap::clear(self);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use crate::Typed;
    use crate::ops::Map;

    #[test]
    fn insert_default_replaces() {
        let mut map: HashMap<String, Vec<i32>> = HashMap::new();
        map.insert("a".into(), vec![1, 2]);

        let slot = map.insert_default(Box::new(String::from("a"))).unwrap();
        assert!(slot.downcast_ref::<Vec<i32>>().unwrap().is_empty());
        assert_eq!(Map::len(&map), 1);
    }

    #[test]
    fn insert_default_rejects_foreign_key() {
        let mut map: BTreeMap<i64, bool> = BTreeMap::new();
        let err = map.insert_default(Box::new(1_i32)).unwrap_err();
        assert!(err.expected.ends_with("i64"));
        assert!(err.received().ends_with("i32"));
        assert_eq!(err.key.take::<i32>().ok(), Some(1));
    }

    #[test]
    fn iterate_in_map_order() {
        let map: BTreeMap<u8, String> = [(2, "y".to_owned()), (1, "x".to_owned())].into();
        let keys: Vec<u8> = Map::iter(&map)
            .map(|(k, _)| *k.downcast_ref::<u8>().unwrap())
            .collect();
        assert_eq!(keys, [1, 2]);

        let info = <BTreeMap<u8, String>>::type_info().as_map().unwrap();
        assert!(info.key_is::<u8>());
        assert!(info.value_is::<String>());
    }
}

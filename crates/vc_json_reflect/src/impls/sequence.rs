use crate::info::{ArrayInfo, ListInfo, Type, TypeInfo};
use crate::ops::{Array, List};
use crate::reflection::impl_reflect_cast_fn;
use crate::{GenericTypeInfoCell, Reflect, Typed};

// -----------------------------------------------------------------------------
// Vec<T>

impl<T: Typed + Default> Typed for Vec<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::List(ListInfo::new::<Self, T>()))
    }
}

impl<T: Typed + Default> Reflect for Vec<T> {
    impl_reflect_cast_fn!(List);
}

impl<T: Typed + Default> List for Vec<T> {
    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        <[T]>::get(self, index).map(Reflect::as_reflect)
    }

    #[inline]
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        <[T]>::get_mut(self, index).map(Reflect::as_reflect_mut)
    }

    fn push_default(&mut self) -> &mut dyn Reflect {
        self.push(T::default());
        let index = <[T]>::len(self) - 1;
        &mut self[index]
    }

    #[inline]
    fn clear(&mut self) {
        Vec::clear(self);
    }
}

// -----------------------------------------------------------------------------
// [T; N]

impl<T: Typed + Default, const N: usize> Typed for [T; N] {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| {
            let ty = Type::with_constructor::<Self>(|| {
                Box::new(core::array::from_fn::<T, N, _>(|_| T::default()))
            });
            TypeInfo::Array(ArrayInfo::new::<T>(ty, N))
        })
    }
}

impl<T: Typed + Default, const N: usize> Reflect for [T; N] {
    impl_reflect_cast_fn!(Array);
}

impl<T: Typed + Default, const N: usize> Array for [T; N] {
    #[inline]
    fn len(&self) -> usize {
        N
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        <[T]>::get(self, index).map(Reflect::as_reflect)
    }

    #[inline]
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        <[T]>::get_mut(self, index).map(Reflect::as_reflect_mut)
    }
}

#[cfg(test)]
mod tests {
    use crate::Typed;
    use crate::ops::{Array, List, ReflectMut};

    #[test]
    fn list_push_and_clear() {
        let mut list: Vec<String> = Vec::new();

        let ReflectMut::List(ops) = crate::Reflect::reflect_mut(&mut list) else {
            panic!("expected a list view");
        };
        *ops.push_default().downcast_mut::<String>().unwrap() = "a".into();
        ops.push_default();
        assert_eq!(ops.len(), 2);
        ops.clear();
        assert!(ops.is_empty());
    }

    #[test]
    fn array_info_and_zero() {
        let info = <[u8; 40]>::type_info();
        let array = info.as_array().unwrap();
        assert_eq!(array.capacity(), 40);

        let zero = info.ty().zero_value();
        let zero = zero.take::<[u8; 40]>().unwrap();
        assert_eq!(Array::len(&zero), 40);
        assert!(zero.iter().all(|v| *v == 0));
    }

    #[test]
    fn generic_cells_are_distinct() {
        let a = <Vec<i32>>::type_info();
        let b = <Vec<u32>>::type_info();
        assert!(a.type_is::<Vec<i32>>());
        assert!(b.type_is::<Vec<u32>>());
        assert!(core::ptr::eq(a, <Vec<i32>>::type_info()));
        assert!(a.as_list().unwrap().item_is::<i32>());
    }

    #[test]
    fn list_get() {
        let list = vec![1_i64, 2, 3];
        assert_eq!(List::get(&list, 2).unwrap().downcast_ref::<i64>(), Some(&3));
        assert!(List::get(&list, 3).is_none());
    }
}

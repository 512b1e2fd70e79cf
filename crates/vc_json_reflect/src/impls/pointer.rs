use crate::info::{PointerInfo, TypeInfo};
use crate::ops::Pointer;
use crate::reflection::impl_reflect_cast_fn;
use crate::{GenericTypeInfoCell, Reflect, Typed};

// -----------------------------------------------------------------------------
// Option<T>

impl<T: Typed + Default> Typed for Option<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::Pointer(PointerInfo::new::<Self, T>(true)))
    }
}

impl<T: Typed + Default> Reflect for Option<T> {
    impl_reflect_cast_fn!(Pointer);
}

impl<T: Typed + Default> Pointer for Option<T> {
    #[inline]
    fn target(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(Reflect::as_reflect)
    }

    #[inline]
    fn target_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().map(Reflect::as_reflect_mut)
    }

    #[inline]
    fn target_or_default(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }

    #[inline]
    fn set_null(&mut self) {
        *self = None;
    }

    #[inline]
    fn is_nullable(&self) -> bool {
        true
    }
}

// -----------------------------------------------------------------------------
// Box<T>

impl<T: Typed + Default> Typed for Box<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::Pointer(PointerInfo::new::<Self, T>(false)))
    }
}

impl<T: Typed + Default> Reflect for Box<T> {
    impl_reflect_cast_fn!(Pointer);
}

impl<T: Typed + Default> Pointer for Box<T> {
    #[inline]
    fn target(&self) -> Option<&dyn Reflect> {
        Some(&**self)
    }

    #[inline]
    fn target_mut(&mut self) -> Option<&mut dyn Reflect> {
        Some(&mut **self)
    }

    #[inline]
    fn target_or_default(&mut self) -> &mut dyn Reflect {
        &mut **self
    }

    #[inline]
    fn set_null(&mut self) {
        **self = T::default();
    }

    #[inline]
    fn is_nullable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::Typed;
    use crate::ops::Pointer;

    #[test]
    fn option_is_nullable() {
        let mut value: Option<Vec<u8>> = None;
        assert!(value.target().is_none());

        value
            .target_or_default()
            .downcast_mut::<Vec<u8>>()
            .unwrap()
            .push(1);
        assert_eq!(value, Some(vec![1]));

        // an existing target is reused
        value.target_or_default();
        assert_eq!(value, Some(vec![1]));

        value.set_null();
        assert!(value.is_none());
    }

    #[test]
    fn box_is_never_null() {
        let mut value: Box<i32> = Box::new(4);
        assert_eq!(value.target().unwrap().downcast_ref::<i32>(), Some(&4));

        value.set_null();
        assert_eq!(*value, 0);
        assert!(!<Box<i32>>::type_info().as_pointer().unwrap().is_nullable());
    }
}

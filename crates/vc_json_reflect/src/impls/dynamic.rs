use crate::info::{DynamicInfo, Type, TypeInfo};
use crate::ops::Dynamic;
use crate::reflection::impl_reflect_cast_fn;
use crate::{NonGenericTypeInfoCell, Reflect, Typed};

// A fresh slot holds a JSON `null`.
fn empty_slot() -> Box<dyn Reflect> {
    let slot: Box<dyn Reflect> = Box::new(serde_json::Value::Null);
    Box::new(slot)
}

impl Typed for Box<dyn Reflect> {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            TypeInfo::Dynamic(DynamicInfo::new(Type::with_constructor::<Self>(empty_slot)))
        })
    }
}

impl Reflect for Box<dyn Reflect> {
    impl_reflect_cast_fn!(Dynamic);
}

impl Dynamic for Box<dyn Reflect> {
    #[inline]
    fn inner(&self) -> &dyn Reflect {
        &**self
    }

    #[inline]
    fn inner_mut(&mut self) -> &mut dyn Reflect {
        &mut **self
    }

    #[inline]
    fn replace(&mut self, value: Box<dyn Reflect>) {
        *self = value;
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use crate::info::ReflectKind;
    use crate::ops::{Dynamic, ReflectRef};
    use crate::{Reflect, Typed};

    #[test]
    fn zero_slot_holds_null() {
        let info = <Box<dyn Reflect>>::type_info();
        assert_eq!(info.kind(), ReflectKind::Dynamic);

        let zero = info.ty().zero_value();
        assert_eq!((*zero).ty_id(), TypeId::of::<Box<dyn Reflect>>());

        let slot = zero.take::<Box<dyn Reflect>>().unwrap();
        assert!(slot.inner().is::<serde_json::Value>());
    }

    #[test]
    fn dynamic_view() {
        let mut slot: Box<dyn Reflect> = Box::new(3_u16);
        let ReflectRef::Dynamic(dynamic) = slot.reflect_ref() else {
            panic!("expected a dynamic view");
        };
        assert_eq!(dynamic.inner().reflect_ref().kind(), ReflectKind::Scalar);

        slot.replace(Box::new(vec![1_u8]));
        assert!(slot.inner().is::<Vec<u8>>());
    }
}

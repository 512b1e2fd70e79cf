use chrono::{DateTime, Utc};

use crate::info::{ScalarInfo, ScalarKind, TypeInfo};
use crate::reflection::impl_reflect_cast_fn;
use crate::{NonGenericTypeInfoCell, Reflect, Typed};

macro_rules! impl_reflect_for_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl Typed for $ty {
            fn type_info() -> &'static TypeInfo {
                static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| TypeInfo::Scalar(ScalarInfo::new::<Self>(ScalarKind::$kind)))
            }
        }

        impl Reflect for $ty {
            impl_reflect_cast_fn!(Scalar);
        }
    )*};
}

impl_reflect_for_scalar!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
    DateTime<Utc> => Time,
);

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use crate::info::{ReflectKind, ScalarKind};
    use crate::ops::ReflectRef;
    use crate::{Reflect, Typed};

    #[test]
    fn scalar_kinds() {
        let kind = |info: &crate::info::TypeInfo| info.as_scalar().unwrap().kind();

        assert_eq!(kind(bool::type_info()), ScalarKind::Bool);
        assert_eq!(kind(i64::type_info()), ScalarKind::I64);
        assert_eq!(kind(usize::type_info()), ScalarKind::Usize);
        assert_eq!(kind(f32::type_info()), ScalarKind::F32);
        assert_eq!(kind(String::type_info()), ScalarKind::String);
        assert_eq!(kind(<DateTime<Utc>>::type_info()), ScalarKind::Time);
    }

    #[test]
    fn scalar_zero() {
        let info = String::type_info();
        assert_eq!(info.is_zero(&String::new()), Some(true));
        assert_eq!(info.is_zero(&String::from("x")), Some(false));
        // mismatched value is never zero
        assert_eq!(info.is_zero(&0_i32), Some(false));

        let time = <DateTime<Utc>>::type_info();
        assert_eq!(time.is_zero(&DateTime::<Utc>::default()), Some(true));
    }

    #[test]
    fn scalar_views() {
        let mut value = 5_u8;
        assert_eq!(value.reflect_ref().kind(), ReflectKind::Scalar);

        let ReflectRef::Scalar(scalar) = value.reflect_ref() else {
            panic!("expected a scalar view");
        };
        assert_eq!(scalar.downcast_ref::<u8>(), Some(&5));

        *value.as_reflect_mut().downcast_mut::<u8>().unwrap() = 9;
        assert_eq!(value, 9);
    }
}

use serde_json::Value;

use crate::info::{OpaqueInfo, TypeInfo, zero_check};
use crate::reflection::impl_reflect_cast_fn;
use crate::traits::{FromType, TypeTraitDeserialize, TypeTraitSerialize};
use crate::{NonGenericTypeInfoCell, Reflect, Typed};

impl Typed for Value {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            TypeInfo::Opaque(
                OpaqueInfo::new::<Self>()
                    .with_zero_check(zero_check::<Self>)
                    .with_trait(<TypeTraitSerialize as FromType<Self>>::from_type())
                    .with_trait(<TypeTraitDeserialize as FromType<Self>>::from_type()),
            )
        })
    }
}

impl Reflect for Value {
    impl_reflect_cast_fn!(Opaque);
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use crate::Typed;
    use crate::traits::TypeTraitDeserialize;

    #[test]
    fn null_is_zero() {
        let info = Value::type_info();
        assert_eq!(info.is_zero(&Value::Null), Some(true));
        assert_eq!(info.is_zero(&json!(0)), Some(false));
    }

    #[test]
    fn deserialize_through_trait() {
        let de = Value::type_info()
            .type_traits()
            .get::<TypeTraitDeserialize>()
            .unwrap();

        let mut deserializer = serde_json::Deserializer::from_str(r#"{"a":[true]}"#);
        let value = de.deserialize(&mut deserializer).unwrap();
        assert_eq!(value.take::<Value>().unwrap(), json!({ "a": [true] }));
    }
}

use std::collections::BTreeMap;

use crate::core::{BaseError, Result, Value};
use crate::object::ObjectRef;

/// Conversion between a parameter field type and [`Value`].
pub trait ParamType: Sized {
    fn to_value(&self) -> Value;
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(expected: &str, got: &Value) -> BaseError {
    BaseError::TypeMismatch(format!("expected {expected}, got {}", got.type_name()))
}

impl ParamType for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl ParamType for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        value.as_bool().ok_or_else(|| mismatch("BOOL", &value))
    }
}

macro_rules! int_param {
    ($($ty:ty),*) => {
        $(
            impl ParamType for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(*self as i64)
                }

                fn from_value(value: Value) -> Result<Self> {
                    let raw = value.as_i64().ok_or_else(|| mismatch("INT", &value))?;
                    <$ty>::try_from(raw).map_err(|_| {
                        BaseError::TypeMismatch(format!(
                            "{raw} does not fit in {}",
                            stringify!($ty)
                        ))
                    })
                }
            }
        )*
    };
}

int_param!(i32, i64, u32, u64, usize);

impl ParamType for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        value.as_f64().ok_or_else(|| mismatch("FLOAT", &value))
    }
}

impl ParamType for f32 {
    fn to_value(&self) -> Value {
        Value::Float(*self as f64)
    }

    fn from_value(value: Value) -> Result<Self> {
        value
            .as_f64()
            .map(|f| f as f32)
            .ok_or_else(|| mismatch("FLOAT", &value))
    }
}

impl ParamType for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(mismatch("TEXT", &other)),
        }
    }
}

impl ParamType for ObjectRef {
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(obj) => Ok(obj),
            other => Err(mismatch("OBJECT", &other)),
        }
    }
}

impl<T: ParamType> ParamType for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ParamType::to_value)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ParamType> ParamType for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ParamType::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("LIST", &other)),
        }
    }
}

impl<T: ParamType> ParamType for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(map) => map
                .into_iter()
                .map(|(k, v)| Ok((k, T::from_value(v)?)))
                .collect(),
            other => Err(mismatch("MAP", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_range_checked() {
        assert_eq!(u32::from_value(Value::Int(7)).unwrap(), 7);
        assert!(matches!(
            u32::from_value(Value::Int(-1)),
            Err(BaseError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_float_accepts_int() {
        assert_eq!(f64::from_value(Value::Int(2)).unwrap(), 2.0);
        assert!(i64::from_value(Value::Float(2.0)).is_err());
    }

    #[test]
    fn test_option_and_collections() {
        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Some(3_i64).to_value(), Value::Int(3));
        let list = vec!["a".to_string(), "b".to_string()];
        assert_eq!(Vec::<String>::from_value(list.to_value()).unwrap(), list);
        assert!(Vec::<i64>::from_value(Value::Int(1)).is_err());
    }

    #[test]
    fn test_mismatch_names_kinds() {
        let err = String::from_value(Value::Bool(true)).unwrap_err();
        assert_eq!(err.to_string(), "Type mismatch: expected TEXT, got BOOL");
    }
}

//! Conversions between Rust values and SQLite values.

use basemodel_core::{Error, Result};
use rusqlite::types::{FromSql, ToSql, ToSqlOutput, Value, ValueRef};

/// Values that can be bound as a query parameter.
///
/// Implemented for the scalar types entity columns use, plus `&str` so that
/// `col("name").eq("a")` reads naturally.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

macro_rules! integer_into_value {
    ($($t:ty),*) => {
        $(
            impl IntoValue for $t {
                fn into_value(self) -> Value {
                    Value::Integer(i64::from(self))
                }
            }
        )*
    };
}

integer_into_value!(i8, i16, i32, i64, u8, u16, u32, bool);

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Real(f64::from(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Real(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Value {
        Value::Text(self.clone())
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Blob(self)
    }
}

impl IntoValue for &[u8] {
    fn into_value(self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

/// Convert a column field into an owned SQLite value.
pub fn to_value<T: ToSql + ?Sized>(field: &T) -> Result<Value> {
    match field.to_sql().map_err(Error::database)? {
        ToSqlOutput::Borrowed(v) => Ok(Value::from(v)),
        ToSqlOutput::Owned(v) => Ok(v),
        #[allow(unreachable_patterns)]
        other => Err(Error::database(format!(
            "unsupported parameter output: {other:?}"
        ))),
    }
}

/// Convert an owned SQLite value back into a column field.
pub fn from_value<T: FromSql>(value: &Value) -> Result<T> {
    T::column_result(ValueRef::from(value)).map_err(Error::database)
}

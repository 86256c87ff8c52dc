use std::os::raw::c_int;

use indexmap::IndexMap;

use crate::{sys, Error, Result};

/// A host value crossing the ABI.
///
/// `Bool` only exists on the way in: the engine stores it as an integer and reads return
/// [`Value::Integer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Array(Vec<Value>),
}

/// One row of a columnar table: column name to value, in column order.
pub type Row = IndexMap<String, Value>;

/// Build a [`Row`] from `name => value` pairs.
///
/// ```
/// let row = quiverdb::row! { "date_time" => "2024-01-01T00:00:00", "value" => 1.5 };
/// assert_eq!(row.len(), 2);
/// ```
#[macro_export]
macro_rules! row {
    ($($name:expr => $value:expr),* $(,)?) => {{
        let mut row = $crate::Row::new();
        $( row.insert(::std::string::String::from($name), $crate::Value::from($value)); )*
        row
    }};
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Value::Array(v.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

/// Column/attribute storage type as reported by metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    Float,
    String,
    DateTime,
    Null,
}

impl DataType {
    pub fn from_raw(tag: c_int) -> Result<Self> {
        Ok(match tag {
            sys::QUIVER_DATA_TYPE_INTEGER => DataType::Integer,
            sys::QUIVER_DATA_TYPE_FLOAT => DataType::Float,
            sys::QUIVER_DATA_TYPE_STRING => DataType::String,
            sys::QUIVER_DATA_TYPE_DATE_TIME => DataType::DateTime,
            sys::QUIVER_DATA_TYPE_NULL => DataType::Null,
            other => return Err(Error::protocol(format!("unknown data type tag {other}"))),
        })
    }

    pub fn to_raw(self) -> c_int {
        match self {
            DataType::Integer => sys::QUIVER_DATA_TYPE_INTEGER,
            DataType::Float => sys::QUIVER_DATA_TYPE_FLOAT,
            DataType::String => sys::QUIVER_DATA_TYPE_STRING,
            DataType::DateTime => sys::QUIVER_DATA_TYPE_DATE_TIME,
            DataType::Null => sys::QUIVER_DATA_TYPE_NULL,
        }
    }
}

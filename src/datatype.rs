// used for persistence
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

// used for bulk loading, where values may be any JSON scalar
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as Json;

// used to print out readable forms of a value
use std::fmt;

use crate::error::{EavError, Result};

/// The value half of a fact.
///
/// Values are opaque strings. Numbers and booleans are accepted for
/// convenience but are stored in their textual form, so `30` and `"30"`
/// read back identically.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Value(String);

impl Value {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Self(value)
    }
}
impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}
macro_rules! textual_value {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )+
    };
}
textual_value!(i32, i64, u32, u64, usize, f64, bool);

// Only scalars make sense as a single fact, arrays and objects would
// have to be flattened into several attributes by the caller.
impl TryFrom<Json> for Value {
    type Error = EavError;
    fn try_from(json: Json) -> Result<Self> {
        match json {
            Json::String(s) => Ok(Self(s)),
            Json::Number(n) => Ok(Self(n.to_string())),
            Json::Bool(b) => Ok(Self(b.to_string())),
            Json::Null => Err(EavError::Validation(
                "null is not a valid attribute value".into(),
            )),
            Json::Array(_) | Json::Object(_) => Err(EavError::Validation(format!(
                "attribute values must be scalars, got {json}"
            ))),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        Value::try_from(json).map_err(D::Error::custom)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}
impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        // numeric cells can show up in tables written by other tools
        match value {
            ValueRef::Integer(i) => Ok(Value::from(i)),
            ValueRef::Real(r) => Ok(Value::from(r)),
            _ => value.as_str().map(Value::from),
        }
    }
}

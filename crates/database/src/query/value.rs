//! Scalar values flowing between query inputs and bind parameters.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// A single bindable scalar. Everything the filter vocabulary and the input
/// structs carry bottoms out in one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
    Json(serde_json::Value),
    Null,
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attach this value as the next bind parameter of `query`.
    pub(crate) fn bind_to<'q>(
        self,
        query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            Self::Text(v) => query.bind(v),
            Self::Int(v) => query.bind(v),
            Self::Float(v) => query.bind(v),
            Self::Bool(v) => query.bind(v),
            Self::DateTime(v) => query.bind(v.to_rfc3339()),
            Self::Json(v) => query.bind(v.to_string()),
            Self::Null => query.bind(Option::<String>::None),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(v) => serde_json::Value::String(v.clone()),
            Self::Int(v) => serde_json::Value::from(*v),
            Self::Float(v) => serde_json::Value::from(*v),
            Self::Bool(v) => serde_json::Value::Bool(*v),
            Self::DateTime(v) => serde_json::Value::String(v.to_rfc3339()),
            Self::Json(v) => v.clone(),
            Self::Null => serde_json::Value::Null,
        }
    }

    /// Inverse of [`Self::to_json`] for plain key values (used when relation
    /// keys are read back out of projected rows).
    pub(crate) fn from_json_key(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Int(i))
                } else {
                    n.as_f64().map(Self::Float)
                }
            }
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            _ => None,
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<DateTime<Utc>> for ScalarValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl From<serde_json::Value> for ScalarValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T> From<Option<T>> for ScalarValue
where
    T: Into<ScalarValue>,
{
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

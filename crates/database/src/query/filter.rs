//! Scalar filter vocabulary.
//!
//! Per-scalar match conditions: equality, membership, range comparisons where
//! the type is ordered, string matching with an optional case-insensitive
//! mode, null checks for nullable columns, and a recursive `not`. These are
//! pure data shapes; rendering to SQL happens in [`crate::query::sql`].

use chrono::{DateTime, Utc};

use super::ScalarValue;

/// The untyped condition a filter lowers into. One instance describes every
/// operator applied to a single column; unset operators do not constrain.
#[derive(Debug, Clone, Default)]
pub struct FieldCondition {
    pub equals: Option<ScalarValue>,
    pub in_list: Option<Vec<ScalarValue>>,
    pub not_in: Option<Vec<ScalarValue>>,
    pub lt: Option<ScalarValue>,
    pub lte: Option<ScalarValue>,
    pub gt: Option<ScalarValue>,
    pub gte: Option<ScalarValue>,
    pub contains: Option<String>,
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
    pub case_insensitive: bool,
    /// `Some(true)` matches NULL, `Some(false)` matches NOT NULL.
    pub null: Option<bool>,
    pub not: Option<Box<FieldCondition>>,
}

/// Conversion from a typed filter into the condition the renderer consumes.
pub trait IntoFieldCondition {
    fn into_condition(self) -> FieldCondition;
}

impl IntoFieldCondition for FieldCondition {
    fn into_condition(self) -> FieldCondition {
        self
    }
}

/// Marker for entity enums so they can participate in filters.
pub trait EnumValue: Copy {
    fn as_str(&self) -> &'static str;
}

macro_rules! common_ops {
    ($ty:ty) => {
        pub fn equals(mut self, v: impl Into<$ty>) -> Self {
            self.0.equals = Some(Self::wrap(v.into()));
            self
        }

        pub fn is_in(mut self, vs: Vec<$ty>) -> Self {
            self.0.in_list = Some(vs.into_iter().map(Self::wrap).collect());
            self
        }

        pub fn not_in(mut self, vs: Vec<$ty>) -> Self {
            self.0.not_in = Some(vs.into_iter().map(Self::wrap).collect());
            self
        }

        /// Negate another filter of the same shape.
        pub fn not(mut self, other: Self) -> Self {
            self.0.not = Some(Box::new(other.0));
            self
        }

        /// Match NULL. Only meaningful on nullable columns.
        pub fn is_null(mut self) -> Self {
            self.0.null = Some(true);
            self
        }

        pub fn is_not_null(mut self) -> Self {
            self.0.null = Some(false);
            self
        }
    };
}

macro_rules! range_ops {
    ($ty:ty) => {
        pub fn lt(mut self, v: impl Into<$ty>) -> Self {
            self.0.lt = Some(Self::wrap(v.into()));
            self
        }

        pub fn lte(mut self, v: impl Into<$ty>) -> Self {
            self.0.lte = Some(Self::wrap(v.into()));
            self
        }

        pub fn gt(mut self, v: impl Into<$ty>) -> Self {
            self.0.gt = Some(Self::wrap(v.into()));
            self
        }

        pub fn gte(mut self, v: impl Into<$ty>) -> Self {
            self.0.gte = Some(Self::wrap(v.into()));
            self
        }
    };
}

#[derive(Debug, Clone, Default)]
pub struct StringFilter(FieldCondition);

impl StringFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn wrap(v: String) -> ScalarValue {
        ScalarValue::Text(v)
    }

    common_ops!(String);
    range_ops!(String);

    pub fn contains(mut self, v: impl Into<String>) -> Self {
        self.0.contains = Some(v.into());
        self
    }

    pub fn starts_with(mut self, v: impl Into<String>) -> Self {
        self.0.starts_with = Some(v.into());
        self
    }

    pub fn ends_with(mut self, v: impl Into<String>) -> Self {
        self.0.ends_with = Some(v.into());
        self
    }

    /// Case-insensitive matching for the string operators of this filter.
    pub fn insensitive(mut self) -> Self {
        self.0.case_insensitive = true;
        self
    }
}

impl IntoFieldCondition for StringFilter {
    fn into_condition(self) -> FieldCondition {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntFilter(FieldCondition);

impl IntFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn wrap(v: i64) -> ScalarValue {
        ScalarValue::Int(v)
    }

    common_ops!(i64);
    range_ops!(i64);
}

impl IntoFieldCondition for IntFilter {
    fn into_condition(self) -> FieldCondition {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct FloatFilter(FieldCondition);

impl FloatFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn wrap(v: f64) -> ScalarValue {
        ScalarValue::Float(v)
    }

    common_ops!(f64);
    range_ops!(f64);
}

impl IntoFieldCondition for FloatFilter {
    fn into_condition(self) -> FieldCondition {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoolFilter(FieldCondition);

impl BoolFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn wrap(v: bool) -> ScalarValue {
        ScalarValue::Bool(v)
    }

    common_ops!(bool);
}

impl IntoFieldCondition for BoolFilter {
    fn into_condition(self) -> FieldCondition {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct DateTimeFilter(FieldCondition);

impl DateTimeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn wrap(v: DateTime<Utc>) -> ScalarValue {
        ScalarValue::DateTime(v)
    }

    common_ops!(DateTime<Utc>);
    range_ops!(DateTime<Utc>);
}

impl IntoFieldCondition for DateTimeFilter {
    fn into_condition(self) -> FieldCondition {
        self.0
    }
}

/// Equality-only filter over a JSON column.
#[derive(Debug, Clone, Default)]
pub struct JsonFilter(FieldCondition);

impl JsonFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(mut self, v: serde_json::Value) -> Self {
        self.0.equals = Some(ScalarValue::Json(v));
        self
    }

    pub fn not(mut self, other: Self) -> Self {
        self.0.not = Some(Box::new(other.0));
        self
    }

    pub fn is_null(mut self) -> Self {
        self.0.null = Some(true);
        self
    }

    pub fn is_not_null(mut self) -> Self {
        self.0.null = Some(false);
        self
    }
}

impl IntoFieldCondition for JsonFilter {
    fn into_condition(self) -> FieldCondition {
        self.0
    }
}

/// Filter over an entity enum column, stored as its canonical string form.
#[derive(Debug, Clone)]
pub struct EnumFilter<T: EnumValue>(FieldCondition, std::marker::PhantomData<T>);

impl<T: EnumValue> Default for EnumFilter<T> {
    fn default() -> Self {
        Self(FieldCondition::default(), std::marker::PhantomData)
    }
}

impl<T: EnumValue> EnumFilter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn wrap(v: T) -> ScalarValue {
        ScalarValue::Text(v.as_str().to_string())
    }

    pub fn equals(mut self, v: T) -> Self {
        self.0.equals = Some(Self::wrap(v));
        self
    }

    pub fn is_in(mut self, vs: Vec<T>) -> Self {
        self.0.in_list = Some(vs.into_iter().map(Self::wrap).collect());
        self
    }

    pub fn not_in(mut self, vs: Vec<T>) -> Self {
        self.0.not_in = Some(vs.into_iter().map(Self::wrap).collect());
        self
    }

    pub fn not(mut self, other: Self) -> Self {
        self.0.not = Some(Box::new(other.0));
        self
    }
}

impl<T: EnumValue> IntoFieldCondition for EnumFilter<T> {
    fn into_condition(self) -> FieldCondition {
        self.0
    }
}

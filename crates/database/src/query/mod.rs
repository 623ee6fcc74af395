//! Query input building: scalar filters, where trees, ordering, projection,
//! and pagination arguments, plus their rendering into parameterized SQL.

pub mod filter;
pub mod input;
pub(crate) mod sql;
mod value;

pub use filter::{
    BoolFilter, DateTimeFilter, EnumFilter, EnumValue, FieldCondition, FloatFilter,
    IntFilter, IntoFieldCondition, JsonFilter, StringFilter,
};
pub use input::{
    Aggregates, GroupByQuery, NullsOrder, OrderBy, Projection, Query, SortOrder, UniqueWhere,
    Where,
};
pub use value::ScalarValue;

//! Query input shapes: where trees, ordering, projection, pagination.

use super::filter::{FieldCondition, IntoFieldCondition};
use super::ScalarValue;
use crate::types::{DatabaseError, DatabaseResult};

/// Boolean combination of per-column conditions.
#[derive(Debug, Clone)]
pub enum Where {
    And(Vec<Where>),
    Or(Vec<Where>),
    Not(Box<Where>),
    Field(String, FieldCondition),
}

impl Where {
    pub fn field(column: impl Into<String>, filter: impl IntoFieldCondition) -> Self {
        Self::Field(column.into(), filter.into_condition())
    }

    pub fn and(parts: Vec<Where>) -> Self {
        Self::And(parts)
    }

    pub fn or(parts: Vec<Where>) -> Self {
        Self::Or(parts)
    }

    pub fn not(inner: Where) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Every column name referenced anywhere in the tree.
    pub(crate) fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::And(parts) | Self::Or(parts) => {
                for p in parts {
                    p.collect_columns(out);
                }
            }
            Self::Not(inner) => inner.collect_columns(out),
            Self::Field(column, _) => out.push(column),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub(crate) fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

#[derive(Debug, Clone)]
pub struct OrderBy {
    pub column: String,
    pub order: SortOrder,
    pub nulls: Option<NullsOrder>,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            order: SortOrder::Asc,
            nulls: None,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            order: SortOrder::Desc,
            nulls: None,
        }
    }

    pub fn nulls(mut self, placement: NullsOrder) -> Self {
        self.nulls = Some(placement);
        self
    }
}

/// Field-level vs relation-level projection. `Select` and `Include` are
/// mutually exclusive; [`Query::projection`] enforces that before any SQL
/// runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Select(Vec<String>),
    Include(Vec<String>),
}

/// Arguments for the multi-row read operations.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub(crate) filter: Option<Where>,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) cursor: Option<ScalarValue>,
    pub(crate) skip: Option<u64>,
    pub(crate) take: Option<i64>,
    select: Option<Vec<String>>,
    include: Option<Vec<String>>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Where) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    /// Anchor pagination on the row whose id equals `id`. The cursor row is
    /// included in the page; combine with `skip(1)` to exclude it.
    pub fn cursor(mut self, id: impl Into<ScalarValue>) -> Self {
        self.cursor = Some(id.into());
        self
    }

    pub fn skip(mut self, n: u64) -> Self {
        self.skip = Some(n);
        self
    }

    /// Page size. Negative values page backward from the cursor.
    pub fn take(mut self, n: i64) -> Self {
        self.take = Some(n);
        self
    }

    pub fn select(mut self, columns: Vec<&str>) -> Self {
        self.select = Some(columns.into_iter().map(String::from).collect());
        self
    }

    pub fn include(mut self, relations: Vec<&str>) -> Self {
        self.include = Some(relations.into_iter().map(String::from).collect());
        self
    }

    /// Resolve the projection, rejecting the select+include combination.
    pub fn projection(&self) -> DatabaseResult<Projection> {
        match (&self.select, &self.include) {
            (Some(_), Some(_)) => Err(DatabaseError::InvalidQuery(
                "`select` and `include` cannot be combined in one query".to_string(),
            )),
            (Some(columns), None) => Ok(Projection::Select(columns.clone())),
            (None, Some(relations)) => Ok(Projection::Include(relations.clone())),
            (None, None) => Ok(Projection::All),
        }
    }
}

/// Lookup key matching exactly one row: the id or a declared unique column.
#[derive(Debug, Clone)]
pub struct UniqueWhere {
    pub(crate) column: String,
    pub(crate) value: ScalarValue,
}

impl UniqueWhere {
    pub fn id(value: impl Into<ScalarValue>) -> Self {
        Self {
            column: "id".to_string(),
            value: value.into(),
        }
    }

    pub fn column(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Which aggregates to compute over the matched rows.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    pub(crate) count: bool,
    pub(crate) min: Vec<String>,
    pub(crate) max: Vec<String>,
    pub(crate) avg: Vec<String>,
    pub(crate) sum: Vec<String>,
}

impl Aggregates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(mut self) -> Self {
        self.count = true;
        self
    }

    pub fn min(mut self, columns: Vec<&str>) -> Self {
        self.min = columns.into_iter().map(String::from).collect();
        self
    }

    pub fn max(mut self, columns: Vec<&str>) -> Self {
        self.max = columns.into_iter().map(String::from).collect();
        self
    }

    pub fn avg(mut self, columns: Vec<&str>) -> Self {
        self.avg = columns.into_iter().map(String::from).collect();
        self
    }

    pub fn sum(mut self, columns: Vec<&str>) -> Self {
        self.sum = columns.into_iter().map(String::from).collect();
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        !self.count
            && self.min.is_empty()
            && self.max.is_empty()
            && self.avg.is_empty()
            && self.sum.is_empty()
    }
}

/// Arguments for `group_by`: grouping key columns plus optional filtering,
/// post-aggregation filtering, ordering, and pagination.
#[derive(Debug, Clone, Default)]
pub struct GroupByQuery {
    pub(crate) by: Vec<String>,
    pub(crate) filter: Option<Where>,
    pub(crate) having: Option<Where>,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) skip: Option<u64>,
    pub(crate) take: Option<i64>,
}

impl GroupByQuery {
    pub fn by(columns: Vec<&str>) -> Self {
        Self {
            by: columns.into_iter().map(String::from).collect(),
            ..Self::default()
        }
    }

    pub fn filter(mut self, filter: Where) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Post-aggregation filter. May reference the grouping key columns and
    /// the `_count` pseudo-column only.
    pub fn having(mut self, having: Where) -> Self {
        self.having = Some(having);
        self
    }

    /// May reference the grouping key columns and `_count` only.
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn skip(mut self, n: u64) -> Self {
        self.skip = Some(n);
        self
    }

    pub fn take(mut self, n: i64) -> Self {
        self.take = Some(n);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::StringFilter;

    #[test]
    fn projection_defaults_to_all() {
        assert_eq!(Query::new().projection().unwrap(), Projection::All);
    }

    #[test]
    fn select_and_include_together_are_rejected() {
        let query = Query::new()
            .select(vec!["id", "email"])
            .include(vec!["listings"]);

        let err = query.projection().unwrap_err();
        assert!(err.is_invalid_query());
    }

    #[test]
    fn where_tree_reports_all_columns() {
        let filter = Where::and(vec![
            Where::field("city", StringFilter::new().equals("Istanbul")),
            Where::or(vec![
                Where::field("district", StringFilter::new().contains("Kadik")),
                Where::not(Where::field("status", StringFilter::new().equals("PASSIVE"))),
            ]),
        ]);

        let mut columns = filter.columns();
        columns.sort_unstable();
        assert_eq!(columns, vec!["city", "district", "status"]);
    }
}

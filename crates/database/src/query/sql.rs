//! Rendering of query inputs into parameterized SQL fragments.
//!
//! Column names never reach the SQL text unchecked: every reference goes
//! through a resolver that validates it against the entity schema (or, for
//! group-by, against the grouping key set) and yields the SQL expression to
//! emit. Values always travel as bind parameters.

use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::filter::FieldCondition;
use super::input::{NullsOrder, OrderBy, Where};
use super::ScalarValue;
use crate::schema::{ColumnDef, EntitySchema, ScalarType};
use crate::types::{DatabaseError, DatabaseResult};

/// Maps a referenced column name to the SQL expression it renders as, or
/// fails with `InvalidQuery` when the name is not usable in this position.
pub(crate) type ColumnResolver<'a> = dyn Fn(&str) -> DatabaseResult<String> + 'a;

/// Resolver that accepts exactly the columns of `schema`.
pub(crate) fn schema_resolver(schema: &EntitySchema) -> impl Fn(&str) -> DatabaseResult<String> + '_ {
    move |column: &str| {
        schema
            .column(column)
            .map(|c| c.name.to_string())
            .ok_or_else(|| {
                DatabaseError::InvalidQuery(format!(
                    "unknown column `{}` on `{}`",
                    column, schema.table
                ))
            })
    }
}

pub(crate) fn render_where(
    filter: &Where,
    resolve: &ColumnResolver<'_>,
    binds: &mut Vec<ScalarValue>,
) -> DatabaseResult<String> {
    match filter {
        Where::And(parts) => render_parts(parts, "AND", "1 = 1", resolve, binds),
        Where::Or(parts) => render_parts(parts, "OR", "1 = 0", resolve, binds),
        Where::Not(inner) => Ok(format!("NOT ({})", render_where(inner, resolve, binds)?)),
        Where::Field(column, condition) => {
            let expr = resolve(column)?;
            Ok(format!("({})", render_condition(&expr, condition, binds)))
        }
    }
}

fn render_parts(
    parts: &[Where],
    joiner: &str,
    empty: &str,
    resolve: &ColumnResolver<'_>,
    binds: &mut Vec<ScalarValue>,
) -> DatabaseResult<String> {
    if parts.is_empty() {
        return Ok(empty.to_string());
    }
    let rendered = parts
        .iter()
        .map(|p| render_where(p, resolve, binds))
        .collect::<DatabaseResult<Vec<_>>>()?;
    Ok(format!("({})", rendered.join(&format!(" {} ", joiner))))
}

fn render_condition(expr: &str, cond: &FieldCondition, binds: &mut Vec<ScalarValue>) -> String {
    let mut clauses: Vec<String> = Vec::new();

    if let Some(v) = &cond.equals {
        if v.is_null() {
            clauses.push(format!("{expr} IS NULL"));
        } else {
            clauses.push(format!("{expr} = ?"));
            binds.push(v.clone());
        }
    }

    if let Some(vs) = &cond.in_list {
        if vs.is_empty() {
            // IN over an empty list matches nothing.
            clauses.push("1 = 0".to_string());
        } else {
            clauses.push(format!("{expr} IN ({})", placeholders(vs.len())));
            binds.extend(vs.iter().cloned());
        }
    }

    if let Some(vs) = &cond.not_in {
        if !vs.is_empty() {
            clauses.push(format!("{expr} NOT IN ({})", placeholders(vs.len())));
            binds.extend(vs.iter().cloned());
        }
    }

    for (op, value) in [
        ("<", &cond.lt),
        ("<=", &cond.lte),
        (">", &cond.gt),
        (">=", &cond.gte),
    ] {
        if let Some(v) = value {
            clauses.push(format!("{expr} {op} ?"));
            binds.push(v.clone());
        }
    }

    for (pattern, value) in [
        (Pattern::Contains, &cond.contains),
        (Pattern::StartsWith, &cond.starts_with),
        (Pattern::EndsWith, &cond.ends_with),
    ] {
        if let Some(v) = value {
            if cond.case_insensitive {
                clauses.push(format!("LOWER({expr}) LIKE LOWER(?) ESCAPE '\\'"));
            } else {
                clauses.push(format!("{expr} LIKE ? ESCAPE '\\'"));
            }
            binds.push(ScalarValue::Text(pattern.apply(v)));
        }
    }

    match cond.null {
        Some(true) => clauses.push(format!("{expr} IS NULL")),
        Some(false) => clauses.push(format!("{expr} IS NOT NULL")),
        None => {}
    }

    if let Some(inner) = &cond.not {
        let negated = render_condition(expr, inner, binds);
        clauses.push(format!("NOT ({negated})"));
    }

    if clauses.is_empty() {
        "1 = 1".to_string()
    } else {
        clauses.join(" AND ")
    }
}

#[derive(Clone, Copy)]
enum Pattern {
    Contains,
    StartsWith,
    EndsWith,
}

impl Pattern {
    fn apply(self, needle: &str) -> String {
        let escaped = needle
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        match self {
            Self::Contains => format!("%{escaped}%"),
            Self::StartsWith => format!("{escaped}%"),
            Self::EndsWith => format!("%{escaped}"),
        }
    }
}

pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Renders `ORDER BY ...`, or an empty string when no ordering is requested.
/// `reverse` flips every direction and nulls placement (backward paging).
pub(crate) fn render_order_by(
    order_by: &[OrderBy],
    resolve: &ColumnResolver<'_>,
    reverse: bool,
) -> DatabaseResult<String> {
    if order_by.is_empty() {
        return Ok(String::new());
    }

    let mut terms = Vec::with_capacity(order_by.len());
    for item in order_by {
        let expr = resolve(&item.column)?;
        let order = if reverse {
            item.order.reversed()
        } else {
            item.order
        };
        let mut term = format!("{} {}", expr, order.as_sql());
        if let Some(nulls) = item.nulls {
            let placement = match (nulls, reverse) {
                (NullsOrder::First, false) | (NullsOrder::Last, true) => "NULLS FIRST",
                (NullsOrder::Last, false) | (NullsOrder::First, true) => "NULLS LAST",
            };
            term.push(' ');
            term.push_str(placement);
        }
        terms.push(term);
    }

    Ok(format!("ORDER BY {}", terms.join(", ")))
}

/// Decode one row into a JSON document using the schema's column types.
pub(crate) fn row_to_document(
    schema: &EntitySchema,
    row: &SqliteRow,
) -> DatabaseResult<Map<String, Value>> {
    let mut doc = Map::new();
    for column in schema.columns {
        doc.insert(
            column.name.to_string(),
            decode_column(schema.entity, row, column)?,
        );
    }
    Ok(doc)
}

pub(crate) fn decode_column(
    entity: &'static str,
    row: &SqliteRow,
    column: &ColumnDef,
) -> DatabaseResult<Value> {
    let decode_err = |e: sqlx::Error| DatabaseError::Decode {
        entity,
        message: format!("{}: {}", column.name, e),
    };

    let value = match column.ty {
        ScalarType::Text | ScalarType::DateTime => row
            .try_get::<Option<String>, _>(column.name)
            .map_err(decode_err)?
            .map(Value::String)
            .unwrap_or(Value::Null),
        ScalarType::Int => row
            .try_get::<Option<i64>, _>(column.name)
            .map_err(decode_err)?
            .map(Value::from)
            .unwrap_or(Value::Null),
        ScalarType::Float => row
            .try_get::<Option<f64>, _>(column.name)
            .map_err(decode_err)?
            .map(Value::from)
            .unwrap_or(Value::Null),
        ScalarType::Bool => row
            .try_get::<Option<bool>, _>(column.name)
            .map_err(decode_err)?
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        ScalarType::Json => {
            let raw = row
                .try_get::<Option<String>, _>(column.name)
                .map_err(decode_err)?;
            match raw {
                Some(text) => serde_json::from_str(&text).map_err(|e| DatabaseError::Decode {
                    entity,
                    message: format!("{}: invalid JSON: {}", column.name, e),
                })?,
                None => Value::Null,
            }
        }
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{IntFilter, StringFilter};
    use crate::schema::IdKind;

    static TEST_SCHEMA: EntitySchema = EntitySchema {
        entity: "Sample",
        table: "samples",
        id: IdKind::Cuid,
        columns: &[
            ColumnDef {
                name: "id",
                ty: ScalarType::Text,
                nullable: false,
            },
            ColumnDef {
                name: "city",
                ty: ScalarType::Text,
                nullable: false,
            },
            ColumnDef {
                name: "price",
                ty: ScalarType::Float,
                nullable: false,
            },
        ],
        uniques: &[],
        relations: &[],
    };

    fn render(filter: &Where) -> DatabaseResult<(String, usize)> {
        let resolve = schema_resolver(&TEST_SCHEMA);
        let mut binds = Vec::new();
        let sql = render_where(filter, &resolve, &mut binds)?;
        Ok((sql, binds.len()))
    }

    #[test]
    fn renders_conjunction_with_binds() {
        let filter = Where::and(vec![
            Where::field("city", StringFilter::new().equals("Ankara")),
            Where::field("price", IntFilter::new().gte(100).lt(500)),
        ]);

        let (sql, binds) = render(&filter).unwrap();
        // Range operators render in a fixed lt, lte, gt, gte order.
        assert_eq!(sql, "((city = ?) AND (price < ? AND price >= ?))");
        assert_eq!(binds, 3);
    }

    #[test]
    fn unknown_column_is_rejected() {
        let filter = Where::field("nope", StringFilter::new().equals("x"));
        let err = render(&filter).unwrap_err();
        assert!(err.is_invalid_query());
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let filter = Where::field("city", StringFilter::new().is_in(vec![]));
        let (sql, binds) = render(&filter).unwrap();
        assert_eq!(sql, "(1 = 0)");
        assert_eq!(binds, 0);
    }

    #[test]
    fn like_patterns_escape_wildcards() {
        assert_eq!(Pattern::Contains.apply("50%"), "%50\\%%");
        assert_eq!(Pattern::StartsWith.apply("a_b"), "a\\_b%");
        assert_eq!(Pattern::EndsWith.apply("c\\d"), "%c\\\\d");
    }

    #[test]
    fn negation_wraps_recursively() {
        let filter = Where::field(
            "city",
            StringFilter::new().not(StringFilter::new().contains("test")),
        );
        let (sql, binds) = render(&filter).unwrap();
        assert_eq!(sql, "(NOT (city LIKE ? ESCAPE '\\'))");
        assert_eq!(binds, 1);
    }

    #[test]
    fn order_by_renders_directions_and_nulls() {
        let resolve = schema_resolver(&TEST_SCHEMA);
        let order = vec![
            OrderBy::desc("price").nulls(NullsOrder::Last),
            OrderBy::asc("city"),
        ];

        let sql = render_order_by(&order, &resolve, false).unwrap();
        assert_eq!(sql, "ORDER BY price DESC NULLS LAST, city ASC");

        let reversed = render_order_by(&order, &resolve, true).unwrap();
        assert_eq!(reversed, "ORDER BY price ASC NULLS FIRST, city DESC");
    }
}

//! Generic repository over an entity schema.
//!
//! One [`Repository`] type serves all ten entities; the schema drives SQL
//! generation, id handling, and row decoding. Every operation exists in two
//! forms: a pool-based method, and a `*_in` variant taking an explicit
//! connection so interactive transactions can run typed operations.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::entities::schema_for_table;
use crate::query::sql::{
    decode_column, placeholders, render_order_by, render_where, row_to_document, schema_resolver,
};
use crate::query::{
    Aggregates, GroupByQuery, Projection, Query, ScalarValue, SortOrder, UniqueWhere, Where,
};
use crate::schema::{ColumnDef, CreateInput, Entity, IdKind, RelationKind, ScalarType, UpdateInput};
use crate::types::{DatabaseError, DatabaseResult};

/// Aggregation outcome keyed by column name per aggregate function.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct AggregateResult {
    pub count: Option<i64>,
    pub min: BTreeMap<String, Value>,
    pub max: BTreeMap<String, Value>,
    pub avg: BTreeMap<String, Value>,
    pub sum: BTreeMap<String, Value>,
}

pub struct Repository<E: Entity> {
    pool: SqlitePool,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _marker: PhantomData,
        }
    }
}

pub(crate) fn map_write_err(e: sqlx::Error) -> DatabaseError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DatabaseError::UniqueViolation(db.message().to_string())
        }
        _ => DatabaseError::Sqlx(e),
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    fn check_unique(&self, unique: &UniqueWhere) -> DatabaseResult<()> {
        let schema = E::schema();
        if schema.is_unique_column(&unique.column) {
            Ok(())
        } else {
            Err(DatabaseError::InvalidQuery(format!(
                "column `{}` is not unique on `{}`",
                unique.column, schema.table
            )))
        }
    }

    fn not_found() -> DatabaseError {
        DatabaseError::NotFound { entity: E::ENTITY }
    }

    /// Assemble `SELECT {select_list} ... ORDER BY ... LIMIT ...` for a read
    /// query. Returns the SQL, its binds, and whether the page was read in
    /// reverse and must be flipped back.
    fn build_read(
        &self,
        query: &Query,
        select_list: &str,
    ) -> DatabaseResult<(String, Vec<ScalarValue>, bool)> {
        let schema = E::schema();
        let resolve = schema_resolver(schema);
        let mut binds = Vec::new();
        let mut conditions: Vec<String> = Vec::new();

        if let Some(filter) = &query.filter {
            conditions.push(render_where(filter, &resolve, &mut binds)?);
        }

        let backward = matches!(query.take, Some(n) if n < 0);

        if let Some(cursor) = &query.cursor {
            // The cursor anchors on the id column, so the ordering must lead
            // with id (or be absent, which defaults to id ASC).
            let id_order = match query.order_by.first() {
                None => SortOrder::Asc,
                Some(o) if o.column == "id" => o.order,
                Some(_) => {
                    return Err(DatabaseError::InvalidQuery(
                        "cursor pagination requires ordering by id".to_string(),
                    ))
                }
            };
            let op = match (id_order, backward) {
                (SortOrder::Asc, false) | (SortOrder::Desc, true) => ">=",
                (SortOrder::Desc, false) | (SortOrder::Asc, true) => "<=",
            };
            conditions.push(format!("id {op} ?"));
            binds.push(cursor.clone());
        }

        let mut sql = format!("SELECT {select_list} FROM {}", schema.table);
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if query.order_by.is_empty() {
            sql.push_str(if backward {
                " ORDER BY id DESC"
            } else {
                " ORDER BY id ASC"
            });
        } else {
            sql.push(' ');
            sql.push_str(&render_order_by(&query.order_by, &resolve, backward)?);
        }

        let limit = query.take.map(|n| n.unsigned_abs());
        match (limit, query.skip) {
            (Some(l), Some(s)) => sql.push_str(&format!(" LIMIT {l} OFFSET {s}")),
            (Some(l), None) => sql.push_str(&format!(" LIMIT {l}")),
            (None, Some(s)) => sql.push_str(&format!(" LIMIT -1 OFFSET {s}")),
            (None, None) => {}
        }

        Ok((sql, binds, backward))
    }

    // ---- single-row reads ----

    pub async fn find_unique_in(
        &self,
        conn: &mut SqliteConnection,
        unique: &UniqueWhere,
    ) -> DatabaseResult<Option<E>> {
        self.check_unique(unique)?;
        let schema = E::schema();
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            schema.column_list(),
            schema.table,
            unique.column
        );
        let row = unique
            .value
            .clone()
            .bind_to(sqlx::query(&sql))
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref().map(E::from_row).transpose()
    }

    /// Like [`Self::find_unique_in`] but a missing row is an error, not an
    /// empty result. Callers rely on the two staying distinct.
    pub async fn find_unique_required_in(
        &self,
        conn: &mut SqliteConnection,
        unique: &UniqueWhere,
    ) -> DatabaseResult<E> {
        self.find_unique_in(conn, unique)
            .await?
            .ok_or_else(Self::not_found)
    }

    pub async fn find_first_in(
        &self,
        conn: &mut SqliteConnection,
        query: &Query,
    ) -> DatabaseResult<Option<E>> {
        let mut first = query.clone();
        first.take = Some(if matches!(query.take, Some(n) if n < 0) {
            -1
        } else {
            1
        });
        Ok(self.find_many_in(conn, &first).await?.into_iter().next())
    }

    pub async fn find_first_required_in(
        &self,
        conn: &mut SqliteConnection,
        query: &Query,
    ) -> DatabaseResult<E> {
        self.find_first_in(conn, query)
            .await?
            .ok_or_else(Self::not_found)
    }

    // ---- multi-row reads ----

    pub async fn find_many_in(
        &self,
        conn: &mut SqliteConnection,
        query: &Query,
    ) -> DatabaseResult<Vec<E>> {
        if query.projection()? != Projection::All {
            return Err(DatabaseError::InvalidQuery(
                "typed reads return full records; use find_many_projected for select/include"
                    .to_string(),
            ));
        }
        let schema = E::schema();
        let columns = schema.column_list();
        let (sql, binds, backward) = self.build_read(query, &columns)?;
        let mut q = sqlx::query(&sql);
        for b in binds {
            q = b.bind_to(q);
        }
        let rows = q.fetch_all(&mut *conn).await?;
        let mut records = rows
            .iter()
            .map(E::from_row)
            .collect::<DatabaseResult<Vec<_>>>()?;
        if backward {
            records.reverse();
        }
        Ok(records)
    }

    /// Document-shaped read honoring the query's projection: `Select` limits
    /// the returned columns, `Include` embeds related rows (fetched with one
    /// batched lookup per relation). Supplying both is rejected before any
    /// SQL runs.
    pub async fn find_many_projected_in(
        &self,
        conn: &mut SqliteConnection,
        query: &Query,
    ) -> DatabaseResult<Vec<Value>> {
        let schema = E::schema();
        let projection = query.projection()?;

        match projection {
            Projection::All => {
                let columns = schema.column_list();
                let (sql, binds, backward) = self.build_read(query, &columns)?;
                let mut q = sqlx::query(&sql);
                for b in binds {
                    q = b.bind_to(q);
                }
                let rows = q.fetch_all(&mut *conn).await?;
                let mut docs = rows
                    .iter()
                    .map(|r| row_to_document(schema, r))
                    .collect::<DatabaseResult<Vec<_>>>()?;
                if backward {
                    docs.reverse();
                }
                Ok(docs.into_iter().map(Value::Object).collect())
            }
            Projection::Select(columns) => {
                let mut defs = Vec::with_capacity(columns.len());
                for name in &columns {
                    let def = schema.column(name).ok_or_else(|| {
                        DatabaseError::InvalidQuery(format!(
                            "unknown column `{}` on `{}`",
                            name, schema.table
                        ))
                    })?;
                    defs.push(def);
                }
                let select_list = columns.join(", ");
                let (sql, binds, backward) = self.build_read(query, &select_list)?;
                let mut q = sqlx::query(&sql);
                for b in binds {
                    q = b.bind_to(q);
                }
                let rows = q.fetch_all(&mut *conn).await?;
                let mut docs = Vec::with_capacity(rows.len());
                for row in &rows {
                    let mut doc = Map::new();
                    for &def in &defs {
                        doc.insert(
                            def.name.to_string(),
                            decode_column(schema.entity, row, def)?,
                        );
                    }
                    docs.push(doc);
                }
                if backward {
                    docs.reverse();
                }
                Ok(docs.into_iter().map(Value::Object).collect())
            }
            Projection::Include(relations) => {
                let columns = schema.column_list();
                let (sql, binds, backward) = self.build_read(query, &columns)?;
                let mut q = sqlx::query(&sql);
                for b in binds {
                    q = b.bind_to(q);
                }
                let rows = q.fetch_all(&mut *conn).await?;
                let mut docs = rows
                    .iter()
                    .map(|r| row_to_document(schema, r))
                    .collect::<DatabaseResult<Vec<_>>>()?;
                if backward {
                    docs.reverse();
                }

                for rel_name in &relations {
                    let rel = schema.relation(rel_name).ok_or_else(|| {
                        DatabaseError::InvalidQuery(format!(
                            "unknown relation `{}` on `{}`",
                            rel_name, schema.table
                        ))
                    })?;
                    let target = schema_for_table(rel.table).ok_or_else(|| {
                        DatabaseError::InvalidQuery(format!(
                            "relation `{}` targets unknown table `{}`",
                            rel.name, rel.table
                        ))
                    })?;

                    let mut keys: Vec<ScalarValue> = Vec::new();
                    for doc in &docs {
                        if let Some(key) = doc
                            .get(rel.local_key)
                            .and_then(ScalarValue::from_json_key)
                        {
                            if !keys.contains(&key) {
                                keys.push(key);
                            }
                        }
                    }

                    let related: Vec<Map<String, Value>> = if keys.is_empty() {
                        Vec::new()
                    } else {
                        let sql = format!(
                            "SELECT {} FROM {} WHERE {} IN ({})",
                            target.column_list(),
                            target.table,
                            rel.foreign_key,
                            placeholders(keys.len())
                        );
                        let mut q = sqlx::query(&sql);
                        for k in keys {
                            q = k.bind_to(q);
                        }
                        let rows = q.fetch_all(&mut *conn).await?;
                        rows.iter()
                            .map(|r| row_to_document(target, r))
                            .collect::<DatabaseResult<Vec<_>>>()?
                    };

                    for doc in &mut docs {
                        let local = doc.get(rel.local_key).cloned().unwrap_or(Value::Null);
                        let embedded = match rel.kind {
                            RelationKind::HasMany => Value::Array(
                                related
                                    .iter()
                                    .filter(|r| r.get(rel.foreign_key) == Some(&local))
                                    .cloned()
                                    .map(Value::Object)
                                    .collect(),
                            ),
                            RelationKind::BelongsTo => {
                                if local.is_null() {
                                    Value::Null
                                } else {
                                    related
                                        .iter()
                                        .find(|r| r.get(rel.foreign_key) == Some(&local))
                                        .cloned()
                                        .map(Value::Object)
                                        .unwrap_or(Value::Null)
                                }
                            }
                        };
                        doc.insert(rel.name.to_string(), embedded);
                    }
                }

                Ok(docs.into_iter().map(Value::Object).collect())
            }
        }
    }

    // ---- writes ----

    pub async fn create_in(
        &self,
        conn: &mut SqliteConnection,
        data: &E::Create,
    ) -> DatabaseResult<E> {
        let schema = E::schema();
        let now = Utc::now();

        let mut columns: Vec<&'static str> = Vec::new();
        let mut values: Vec<ScalarValue> = Vec::new();
        let mut new_id: Option<String> = None;

        if let IdKind::Cuid = schema.id {
            let id = cuid2::create_id();
            columns.push("id");
            values.push(id.clone().into());
            new_id = Some(id);
        }
        for (column, value) in data.values() {
            columns.push(column);
            values.push(value);
        }
        columns.push("created_at");
        values.push(now.into());
        columns.push("updated_at");
        values.push(now.into());

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            schema.table,
            columns.join(", "),
            placeholders(columns.len())
        );
        let mut q = sqlx::query(&sql);
        for v in values {
            q = v.bind_to(q);
        }
        let result = q.execute(&mut *conn).await.map_err(map_write_err)?;

        let key = match new_id {
            Some(id) => UniqueWhere::id(id),
            None => UniqueWhere::id(result.last_insert_rowid()),
        };
        self.find_unique_required_in(conn, &key).await
    }

    /// Bulk insert returning the inserted count. With `skip_duplicates`,
    /// rows conflicting on a unique column are silently left out instead of
    /// failing the whole batch.
    pub async fn create_many_in(
        &self,
        conn: &mut SqliteConnection,
        data: &[E::Create],
        skip_duplicates: bool,
    ) -> DatabaseResult<u64> {
        if data.is_empty() {
            return Ok(0);
        }
        let schema = E::schema();
        let now = Utc::now();

        let mut columns: Vec<&'static str> = Vec::new();
        if let IdKind::Cuid = schema.id {
            columns.push("id");
        }
        columns.extend(data[0].values().iter().map(|(c, _)| *c));
        columns.push("created_at");
        columns.push("updated_at");

        let row_placeholders = format!("({})", placeholders(columns.len()));
        let all_placeholders = vec![row_placeholders; data.len()].join(", ");
        let verb = if skip_duplicates {
            "INSERT OR IGNORE"
        } else {
            "INSERT"
        };
        let sql = format!(
            "{verb} INTO {} ({}) VALUES {}",
            schema.table,
            columns.join(", "),
            all_placeholders
        );

        let mut q = sqlx::query(&sql);
        for item in data {
            if let IdKind::Cuid = schema.id {
                q = ScalarValue::Text(cuid2::create_id()).bind_to(q);
            }
            for (_, value) in item.values() {
                q = value.bind_to(q);
            }
            q = ScalarValue::DateTime(now).bind_to(q);
            q = ScalarValue::DateTime(now).bind_to(q);
        }
        let result = q.execute(&mut *conn).await.map_err(map_write_err)?;
        Ok(result.rows_affected())
    }

    pub async fn update_in(
        &self,
        conn: &mut SqliteConnection,
        unique: &UniqueWhere,
        data: &E::Update,
    ) -> DatabaseResult<E> {
        self.check_unique(unique)?;
        let schema = E::schema();
        let changes = data.changes();
        if changes.is_empty() {
            return self.find_unique_required_in(conn, unique).await;
        }

        let mut assignments: Vec<String> = Vec::new();
        let mut values: Vec<ScalarValue> = Vec::new();
        for (column, value) in changes {
            assignments.push(format!("{column} = ?"));
            values.push(value);
        }
        assignments.push("updated_at = ?".to_string());
        values.push(Utc::now().into());

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            schema.table,
            assignments.join(", "),
            unique.column
        );
        let mut q = sqlx::query(&sql);
        for v in values {
            q = v.bind_to(q);
        }
        q = unique.value.clone().bind_to(q);
        let result = q.execute(&mut *conn).await.map_err(map_write_err)?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found());
        }

        // The update may have moved the lookup key itself.
        let key = data
            .changes()
            .into_iter()
            .find(|(c, _)| *c == unique.column)
            .map(|(_, v)| UniqueWhere::column(unique.column.clone(), v))
            .unwrap_or_else(|| unique.clone());
        self.find_unique_required_in(conn, &key).await
    }

    /// Bulk partial update. A filter matching zero rows is not an error; the
    /// affected count is simply 0.
    pub async fn update_many_in(
        &self,
        conn: &mut SqliteConnection,
        filter: Option<&Where>,
        data: &E::Update,
    ) -> DatabaseResult<u64> {
        let schema = E::schema();
        let changes = data.changes();
        if changes.is_empty() {
            return Ok(0);
        }

        let mut assignments: Vec<String> = Vec::new();
        let mut values: Vec<ScalarValue> = Vec::new();
        for (column, value) in changes {
            assignments.push(format!("{column} = ?"));
            values.push(value);
        }
        assignments.push("updated_at = ?".to_string());
        values.push(Utc::now().into());

        let mut sql = format!("UPDATE {} SET {}", schema.table, assignments.join(", "));
        if let Some(filter) = filter {
            let resolve = schema_resolver(schema);
            let mut binds = Vec::new();
            let predicate = render_where(filter, &resolve, &mut binds)?;
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
            values.extend(binds);
        }

        let mut q = sqlx::query(&sql);
        for v in values {
            q = v.bind_to(q);
        }
        let result = q.execute(&mut *conn).await.map_err(map_write_err)?;
        Ok(result.rows_affected())
    }

    /// Update-if-exists else create, in one statement
    /// (`INSERT .. ON CONFLICT DO UPDATE .. RETURNING id`).
    pub async fn upsert_in(
        &self,
        conn: &mut SqliteConnection,
        unique: &UniqueWhere,
        create: &E::Create,
        update: &E::Update,
    ) -> DatabaseResult<E> {
        self.check_unique(unique)?;
        let schema = E::schema();
        let now = Utc::now();

        let mut columns: Vec<&'static str> = Vec::new();
        let mut values: Vec<ScalarValue> = Vec::new();
        if unique.column == "id" {
            columns.push("id");
            values.push(unique.value.clone());
        } else if let IdKind::Cuid = schema.id {
            columns.push("id");
            values.push(cuid2::create_id().into());
        }
        for (column, value) in create.values() {
            if column == unique.column {
                // The insert branch must land on the lookup key.
                values.push(unique.value.clone());
            } else {
                values.push(value);
            }
            columns.push(column);
        }
        columns.push("created_at");
        values.push(now.into());
        columns.push("updated_at");
        values.push(now.into());

        let mut assignments: Vec<String> = Vec::new();
        let mut update_values: Vec<ScalarValue> = Vec::new();
        for (column, value) in update.changes() {
            assignments.push(format!("{column} = ?"));
            update_values.push(value);
        }
        assignments.push("updated_at = ?".to_string());
        update_values.push(now.into());

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) DO UPDATE SET {} RETURNING id",
            schema.table,
            columns.join(", "),
            placeholders(columns.len()),
            unique.column,
            assignments.join(", ")
        );
        let mut q = sqlx::query(&sql);
        for v in values {
            q = v.bind_to(q);
        }
        for v in update_values {
            q = v.bind_to(q);
        }
        let row = q.fetch_one(&mut *conn).await.map_err(map_write_err)?;

        let id = match schema.id {
            IdKind::Cuid => ScalarValue::Text(row.try_get("id")?),
            IdKind::AutoIncrement => ScalarValue::Int(row.try_get("id")?),
        };
        self.find_unique_required_in(conn, &UniqueWhere::id(id))
            .await
    }

    /// Delete one row, returning it. A missing row is a `NotFound` error.
    pub async fn delete_in(
        &self,
        conn: &mut SqliteConnection,
        unique: &UniqueWhere,
    ) -> DatabaseResult<E> {
        let existing = self.find_unique_required_in(conn, unique).await?;
        let schema = E::schema();
        let sql = format!("DELETE FROM {} WHERE {} = ?", schema.table, unique.column);
        let result = unique
            .value
            .clone()
            .bind_to(sqlx::query(&sql))
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found());
        }
        Ok(existing)
    }

    pub async fn delete_many_in(
        &self,
        conn: &mut SqliteConnection,
        filter: Option<&Where>,
    ) -> DatabaseResult<u64> {
        let schema = E::schema();
        let mut sql = format!("DELETE FROM {}", schema.table);
        let mut binds = Vec::new();
        if let Some(filter) = filter {
            let resolve = schema_resolver(schema);
            let predicate = render_where(filter, &resolve, &mut binds)?;
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }
        let mut q = sqlx::query(&sql);
        for b in binds {
            q = b.bind_to(q);
        }
        let result = q.execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    // ---- analytics ----

    pub async fn count_in(
        &self,
        conn: &mut SqliteConnection,
        filter: Option<&Where>,
    ) -> DatabaseResult<i64> {
        let schema = E::schema();
        let mut sql = format!("SELECT COUNT(*) FROM {}", schema.table);
        let mut binds = Vec::new();
        if let Some(filter) = filter {
            let resolve = schema_resolver(schema);
            let predicate = render_where(filter, &resolve, &mut binds)?;
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }
        let mut q = sqlx::query(&sql);
        for b in binds {
            q = b.bind_to(q);
        }
        let row = q.fetch_one(&mut *conn).await?;
        Ok(row.try_get(0)?)
    }

    pub async fn aggregate_in(
        &self,
        conn: &mut SqliteConnection,
        filter: Option<&Where>,
        aggregates: &Aggregates,
    ) -> DatabaseResult<AggregateResult> {
        let schema = E::schema();
        if aggregates.is_empty() {
            return Err(DatabaseError::InvalidQuery(
                "at least one aggregate must be requested".to_string(),
            ));
        }

        let mut select_parts: Vec<String> = Vec::new();
        let mut selected: Vec<(&'static str, &ColumnDef)> = Vec::new();
        if aggregates.count {
            select_parts.push("COUNT(*) AS agg_count".to_string());
        }
        for (func, columns, numeric_only) in [
            ("min", &aggregates.min, false),
            ("max", &aggregates.max, false),
            ("avg", &aggregates.avg, true),
            ("sum", &aggregates.sum, true),
        ] {
            for name in columns {
                let def = schema.column(name).ok_or_else(|| {
                    DatabaseError::InvalidQuery(format!(
                        "unknown column `{}` on `{}`",
                        name, schema.table
                    ))
                })?;
                let numeric = matches!(def.ty, ScalarType::Int | ScalarType::Float);
                if numeric_only && !numeric {
                    return Err(DatabaseError::InvalidQuery(format!(
                        "{func} requires a numeric column, `{name}` is {:?}",
                        def.ty
                    )));
                }
                if !numeric_only
                    && !matches!(
                        def.ty,
                        ScalarType::Int | ScalarType::Float | ScalarType::Text | ScalarType::DateTime
                    )
                {
                    return Err(DatabaseError::InvalidQuery(format!(
                        "{func} requires an orderable column, `{name}` is {:?}",
                        def.ty
                    )));
                }
                select_parts.push(format!("{}({name}) AS {func}_{name}", func.to_uppercase()));
                selected.push((func, def));
            }
        }

        let mut sql = format!("SELECT {} FROM {}", select_parts.join(", "), schema.table);
        let mut binds = Vec::new();
        if let Some(filter) = filter {
            let resolve = schema_resolver(schema);
            let predicate = render_where(filter, &resolve, &mut binds)?;
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }
        let mut q = sqlx::query(&sql);
        for b in binds {
            q = b.bind_to(q);
        }
        let row = q.fetch_one(&mut *conn).await?;

        let mut result = AggregateResult::default();
        if aggregates.count {
            result.count = Some(row.try_get("agg_count")?);
        }
        for (func, def) in selected {
            let alias = format!("{func}_{}", def.name);
            let value = match (func, def.ty) {
                ("avg", _) | ("sum", ScalarType::Float) => row
                    .try_get::<Option<f64>, _>(alias.as_str())?
                    .map(Value::from)
                    .unwrap_or(Value::Null),
                (_, ScalarType::Int) => row
                    .try_get::<Option<i64>, _>(alias.as_str())?
                    .map(Value::from)
                    .unwrap_or(Value::Null),
                (_, ScalarType::Float) => row
                    .try_get::<Option<f64>, _>(alias.as_str())?
                    .map(Value::from)
                    .unwrap_or(Value::Null),
                _ => row
                    .try_get::<Option<String>, _>(alias.as_str())?
                    .map(Value::String)
                    .unwrap_or(Value::Null),
            };
            let bucket = match func {
                "min" => &mut result.min,
                "max" => &mut result.max,
                "avg" => &mut result.avg,
                _ => &mut result.sum,
            };
            bucket.insert(def.name.to_string(), value);
        }

        Ok(result)
    }

    /// Group rows by a key column set, returning one document per group with
    /// the key columns and a `_count`. Every column referenced in `order_by`
    /// or `having` must appear in the grouping key set (`_count` excepted);
    /// violations are rejected before any SQL runs.
    pub async fn group_by_in(
        &self,
        conn: &mut SqliteConnection,
        query: &GroupByQuery,
    ) -> DatabaseResult<Vec<Value>> {
        let schema = E::schema();
        if query.by.is_empty() {
            return Err(DatabaseError::InvalidQuery(
                "group_by requires at least one grouping column".to_string(),
            ));
        }
        let mut key_defs = Vec::with_capacity(query.by.len());
        for name in &query.by {
            let def = schema.column(name).ok_or_else(|| {
                DatabaseError::InvalidQuery(format!(
                    "unknown column `{}` on `{}`",
                    name, schema.table
                ))
            })?;
            key_defs.push(def);
        }

        // Post-aggregation positions may reference the grouping key and the
        // `_count` pseudo-column only.
        let grouped = |name: &str| -> DatabaseResult<String> {
            if name == "_count" {
                Ok("COUNT(*)".to_string())
            } else if query.by.iter().any(|b| b == name) {
                Ok(name.to_string())
            } else {
                Err(DatabaseError::InvalidQuery(format!(
                    "column `{name}` must appear in the group_by key set"
                )))
            }
        };

        let mut binds: Vec<ScalarValue> = Vec::new();
        let mut sql = format!(
            "SELECT {}, COUNT(*) AS _count FROM {}",
            query.by.join(", "),
            schema.table
        );
        if let Some(filter) = &query.filter {
            let resolve = schema_resolver(schema);
            let predicate = render_where(filter, &resolve, &mut binds)?;
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }
        sql.push_str(" GROUP BY ");
        sql.push_str(&query.by.join(", "));
        if let Some(having) = &query.having {
            let predicate = render_where(having, &grouped, &mut binds)?;
            sql.push_str(" HAVING ");
            sql.push_str(&predicate);
        }
        if !query.order_by.is_empty() {
            sql.push(' ');
            sql.push_str(&render_order_by(&query.order_by, &grouped, false)?);
        }
        let limit = query.take.map(|n| n.unsigned_abs());
        match (limit, query.skip) {
            (Some(l), Some(s)) => sql.push_str(&format!(" LIMIT {l} OFFSET {s}")),
            (Some(l), None) => sql.push_str(&format!(" LIMIT {l}")),
            (None, Some(s)) => sql.push_str(&format!(" LIMIT -1 OFFSET {s}")),
            (None, None) => {}
        }

        let mut q = sqlx::query(&sql);
        for b in binds {
            q = b.bind_to(q);
        }
        let rows = q.fetch_all(&mut *conn).await?;

        let mut groups = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut doc = Map::new();
            for &def in &key_defs {
                doc.insert(
                    def.name.to_string(),
                    decode_column(schema.entity, row, def)?,
                );
            }
            doc.insert(
                "_count".to_string(),
                Value::from(row.try_get::<i64, _>("_count")?),
            );
            groups.push(Value::Object(doc));
        }
        Ok(groups)
    }

    // ---- pool-based wrappers ----

    pub async fn find_unique(&self, unique: &UniqueWhere) -> DatabaseResult<Option<E>> {
        let mut conn = self.pool.acquire().await?;
        self.find_unique_in(&mut conn, unique).await
    }

    pub async fn find_unique_required(&self, unique: &UniqueWhere) -> DatabaseResult<E> {
        let mut conn = self.pool.acquire().await?;
        self.find_unique_required_in(&mut conn, unique).await
    }

    pub async fn find_first(&self, query: &Query) -> DatabaseResult<Option<E>> {
        let mut conn = self.pool.acquire().await?;
        self.find_first_in(&mut conn, query).await
    }

    pub async fn find_first_required(&self, query: &Query) -> DatabaseResult<E> {
        let mut conn = self.pool.acquire().await?;
        self.find_first_required_in(&mut conn, query).await
    }

    pub async fn find_many(&self, query: &Query) -> DatabaseResult<Vec<E>> {
        let mut conn = self.pool.acquire().await?;
        self.find_many_in(&mut conn, query).await
    }

    pub async fn find_many_projected(&self, query: &Query) -> DatabaseResult<Vec<Value>> {
        let mut conn = self.pool.acquire().await?;
        self.find_many_projected_in(&mut conn, query).await
    }

    pub async fn create(&self, data: &E::Create) -> DatabaseResult<E> {
        let mut conn = self.pool.acquire().await?;
        self.create_in(&mut conn, data).await
    }

    pub async fn create_many(
        &self,
        data: &[E::Create],
        skip_duplicates: bool,
    ) -> DatabaseResult<u64> {
        let mut conn = self.pool.acquire().await?;
        self.create_many_in(&mut conn, data, skip_duplicates).await
    }

    pub async fn update(&self, unique: &UniqueWhere, data: &E::Update) -> DatabaseResult<E> {
        let mut conn = self.pool.acquire().await?;
        self.update_in(&mut conn, unique, data).await
    }

    pub async fn update_many(
        &self,
        filter: Option<&Where>,
        data: &E::Update,
    ) -> DatabaseResult<u64> {
        let mut conn = self.pool.acquire().await?;
        self.update_many_in(&mut conn, filter, data).await
    }

    pub async fn upsert(
        &self,
        unique: &UniqueWhere,
        create: &E::Create,
        update: &E::Update,
    ) -> DatabaseResult<E> {
        let mut conn = self.pool.acquire().await?;
        self.upsert_in(&mut conn, unique, create, update).await
    }

    pub async fn delete(&self, unique: &UniqueWhere) -> DatabaseResult<E> {
        let mut conn = self.pool.acquire().await?;
        self.delete_in(&mut conn, unique).await
    }

    pub async fn delete_many(&self, filter: Option<&Where>) -> DatabaseResult<u64> {
        let mut conn = self.pool.acquire().await?;
        self.delete_many_in(&mut conn, filter).await
    }

    pub async fn count(&self, filter: Option<&Where>) -> DatabaseResult<i64> {
        let mut conn = self.pool.acquire().await?;
        self.count_in(&mut conn, filter).await
    }

    pub async fn aggregate(
        &self,
        filter: Option<&Where>,
        aggregates: &Aggregates,
    ) -> DatabaseResult<AggregateResult> {
        let mut conn = self.pool.acquire().await?;
        self.aggregate_in(&mut conn, filter, aggregates).await
    }

    pub async fn group_by(&self, query: &GroupByQuery) -> DatabaseResult<Vec<Value>> {
        let mut conn = self.pool.acquire().await?;
        self.group_by_in(&mut conn, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        CreateListing, CreateTeamMember, CreateUser, Listing, ListingStatus, ListingType,
        TeamMember, UpdateListing, UpdateUser, User, UserRole,
    };
    use crate::query::{
        Aggregates, EnumFilter, FloatFilter, GroupByQuery, IntFilter, OrderBy, Query, StringFilter,
        UniqueWhere, Where,
    };
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .unwrap();
        crate::migrations::MIGRATOR.run(&pool).await.unwrap();
        pool
    }

    fn user_input(email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Agent,
            name: Some("Ayse Yilmaz".to_string()),
            phone: None,
        }
    }

    fn listing_input(title: &str, price: f64, city: &str) -> CreateListing {
        CreateListing::new(title, price, ListingType::SatilikDaire, city)
    }

    #[tokio::test]
    async fn test_create_and_find_unique_round_trip() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool);

        let created = users.create(&user_input("ayse@emlak.com")).await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.role, UserRole::Agent);

        let by_id = users
            .find_unique(&UniqueWhere::id(created.id.clone()))
            .await
            .unwrap();
        assert_eq!(by_id.as_ref(), Some(&created));

        let by_email = users
            .find_unique(&UniqueWhere::column("email", "ayse@emlak.com"))
            .await
            .unwrap();
        assert_eq!(by_email, Some(created));
    }

    #[tokio::test]
    async fn test_missing_row_is_none_but_required_is_not_found() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool);

        let missing = users.find_unique(&UniqueWhere::id("nope")).await.unwrap();
        assert!(missing.is_none());

        let err = users
            .find_unique_required(&UniqueWhere::id("nope"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_find_unique_rejects_non_unique_column() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool);

        let err = users
            .find_unique(&UniqueWhere::column("name", "Ayse"))
            .await
            .unwrap_err();
        assert!(err.is_invalid_query());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool);

        users.create(&user_input("dup@emlak.com")).await.unwrap();
        let err = users.create(&user_input("dup@emlak.com")).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_update_changes_fields_and_missing_row_is_not_found() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool);

        let created = users.create(&user_input("u@emlak.com")).await.unwrap();
        let data = UpdateUser {
            name: Some(None),
            phone: Some(Some("+90 555 000 0000".to_string())),
            ..Default::default()
        };
        let updated = users
            .update(&UniqueWhere::id(created.id.clone()), &data)
            .await
            .unwrap();
        assert_eq!(updated.name, None);
        assert_eq!(updated.phone.as_deref(), Some("+90 555 000 0000"));
        assert!(updated.updated_at >= created.updated_at);

        let err = users
            .update(&UniqueWhere::id("missing"), &data)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_many_matching_nothing_affects_zero() {
        let pool = test_pool().await;
        let listings: Repository<Listing> = Repository::new(pool);

        listings
            .create(&listing_input("Daire", 100.0, "Istanbul"))
            .await
            .unwrap();

        let filter = Where::field("city", StringFilter::new().equals("Ankara"));
        let data = UpdateListing {
            status: Some(ListingStatus::Passive),
            ..Default::default()
        };
        let affected = listings.update_many(Some(&filter), &data).await.unwrap();
        assert_eq!(affected, 0);

        let filter = Where::field("city", StringFilter::new().equals("Istanbul"));
        let affected = listings.update_many(Some(&filter), &data).await.unwrap();
        assert_eq!(affected, 1);
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool);

        let key = UniqueWhere::column("email", "up@emlak.com");
        let create = user_input("up@emlak.com");
        let update = UpdateUser {
            role: Some(UserRole::Admin),
            ..Default::default()
        };

        let first = users.upsert(&key, &create, &update).await.unwrap();
        assert_eq!(first.role, UserRole::Agent);

        let second = users.upsert(&key, &create, &update).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.role, UserRole::Admin);
        assert_eq!(users.count(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_returns_record_and_missing_is_not_found() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool);

        let created = users.create(&user_input("bye@emlak.com")).await.unwrap();
        let deleted = users
            .delete(&UniqueWhere::id(created.id.clone()))
            .await
            .unwrap();
        assert_eq!(deleted, created);

        let err = users
            .delete(&UniqueWhere::id(created.id))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_many_skip_duplicates() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool);

        users.create(&user_input("taken@emlak.com")).await.unwrap();

        let batch = vec![
            user_input("taken@emlak.com"),
            user_input("new1@emlak.com"),
            user_input("new2@emlak.com"),
        ];
        let err = users.create_many(&batch, false).await.unwrap_err();
        assert!(err.is_unique_violation());

        let inserted = users.create_many(&batch, true).await.unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(users.count(None).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_find_many_filters_and_orders() {
        let pool = test_pool().await;
        let listings: Repository<Listing> = Repository::new(pool);

        for (title, price, city) in [
            ("A", 300.0, "Istanbul"),
            ("B", 100.0, "Istanbul"),
            ("C", 200.0, "Ankara"),
        ] {
            listings
                .create(&listing_input(title, price, city))
                .await
                .unwrap();
        }

        let query = Query::new()
            .filter(Where::field("city", StringFilter::new().equals("Istanbul")))
            .order_by(OrderBy::desc("price"));
        let page = listings.find_many(&query).await.unwrap();
        let titles: Vec<&str> = page.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);

        let query = Query::new().filter(Where::field(
            "price",
            FloatFilter::new().gte(150.0).lt(250.0),
        ));
        let page = listings.find_many(&query).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "C");
    }

    #[tokio::test]
    async fn test_contains_treats_wildcards_literally() {
        let pool = test_pool().await;
        let listings: Repository<Listing> = Repository::new(pool);

        listings
            .create(&listing_input("50% indirimli daire", 100.0, "Izmir"))
            .await
            .unwrap();
        listings
            .create(&listing_input("500 metrekare arsa", 100.0, "Izmir"))
            .await
            .unwrap();

        let query = Query::new().filter(Where::field(
            "title",
            StringFilter::new().contains("50%"),
        ));
        let page = listings.find_many(&query).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "50% indirimli daire");
    }

    #[tokio::test]
    async fn test_enum_filter_in_list() {
        let pool = test_pool().await;
        let listings: Repository<Listing> = Repository::new(pool);

        let mut arsa = listing_input("Arsa", 50.0, "Bursa");
        arsa.listing_type = ListingType::SatilikArsa;
        listings.create(&arsa).await.unwrap();
        listings
            .create(&listing_input("Daire", 100.0, "Bursa"))
            .await
            .unwrap();

        let query = Query::new().filter(Where::field(
            "listing_type",
            EnumFilter::new().is_in(vec![ListingType::SatilikArsa, ListingType::Tarla]),
        ));
        let page = listings.find_many(&query).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].listing_type, ListingType::SatilikArsa);
    }

    #[tokio::test]
    async fn test_skip_take_window() {
        let pool = test_pool().await;
        let listings: Repository<Listing> = Repository::new(pool);

        for i in 0..5 {
            listings
                .create(&listing_input(&format!("L{i}"), 100.0 + i as f64, "Izmir"))
                .await
                .unwrap();
        }

        let query = Query::new().order_by(OrderBy::asc("price")).skip(1).take(2);
        let page = listings.find_many(&query).await.unwrap();
        let titles: Vec<&str> = page.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["L1", "L2"]);
    }

    #[tokio::test]
    async fn test_cursor_pagination_walks_pages_without_gaps() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool);

        for i in 0..7 {
            users.create(&user_input(&format!("u{i}@emlak.com"))).await.unwrap();
        }

        let mut seen: Vec<String> = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut query = Query::new().order_by(OrderBy::asc("id")).take(3);
            if let Some(c) = &cursor {
                query = query.cursor(c.clone()).skip(1);
            }
            let page = users.find_many(&query).await.unwrap();
            if page.is_empty() {
                break;
            }
            cursor = Some(page.last().unwrap().id.clone());
            seen.extend(page.into_iter().map(|u| u.id));
        }

        assert_eq!(seen.len(), 7);
        let mut sorted = seen.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, seen);
    }

    #[tokio::test]
    async fn test_negative_take_pages_backward_in_forward_order() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool);

        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(users.create(&user_input(&format!("b{i}@emlak.com"))).await.unwrap().id);
        }
        ids.sort();

        // Last two rows at or before the anchor, still ascending.
        let query = Query::new()
            .order_by(OrderBy::asc("id"))
            .cursor(ids[3].clone())
            .take(-2);
        let page = users.find_many(&query).await.unwrap();
        let got: Vec<&String> = page.iter().map(|u| &u.id).collect();
        assert_eq!(got, vec![&ids[2], &ids[3]]);
    }

    #[tokio::test]
    async fn test_cursor_requires_id_ordering() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool);

        let query = Query::new()
            .order_by(OrderBy::asc("email"))
            .cursor("anything")
            .take(2);
        let err = users.find_many(&query).await.unwrap_err();
        assert!(err.is_invalid_query());
    }

    #[tokio::test]
    async fn test_typed_find_many_rejects_projection() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool);

        let query = Query::new().select(vec!["id", "email"]);
        let err = users.find_many(&query).await.unwrap_err();
        assert!(err.is_invalid_query());
    }

    #[tokio::test]
    async fn test_projected_select_returns_requested_columns_only() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool);
        users.create(&user_input("sel@emlak.com")).await.unwrap();

        let query = Query::new().select(vec!["email", "role"]);
        let docs = users.find_many_projected(&query).await.unwrap();
        assert_eq!(docs.len(), 1);
        let doc = docs[0].as_object().unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["email"], "sel@emlak.com");
        assert_eq!(doc["role"], "AGENT");
    }

    #[tokio::test]
    async fn test_projected_select_unknown_column_is_rejected() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool);

        let query = Query::new().select(vec!["email", "shoe_size"]);
        let err = users.find_many_projected(&query).await.unwrap_err();
        assert!(err.is_invalid_query());
    }

    #[tokio::test]
    async fn test_include_embeds_related_rows() {
        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool.clone());
        let listings: Repository<Listing> = Repository::new(pool);

        let agent = users.create(&user_input("agent@emlak.com")).await.unwrap();
        for title in ["One", "Two"] {
            let mut input = listing_input(title, 100.0, "Istanbul");
            input.agent_id = Some(agent.id.clone());
            listings.create(&input).await.unwrap();
        }
        listings
            .create(&listing_input("Orphan", 100.0, "Istanbul"))
            .await
            .unwrap();

        let query = Query::new().include(vec!["listings"]);
        let docs = users.find_many_projected(&query).await.unwrap();
        assert_eq!(docs.len(), 1);
        let embedded = docs[0]["listings"].as_array().unwrap();
        assert_eq!(embedded.len(), 2);

        let query = Query::new().include(vec!["agent"]);
        let docs = listings.find_many_projected(&query).await.unwrap();
        assert_eq!(docs.len(), 3);
        let with_agent = docs
            .iter()
            .filter(|d| d["agent"].is_object())
            .count();
        assert_eq!(with_agent, 2);
    }

    #[tokio::test]
    async fn test_count_and_aggregate() {
        let pool = test_pool().await;
        let listings: Repository<Listing> = Repository::new(pool);

        for price in [100.0, 200.0, 300.0] {
            listings
                .create(&listing_input("L", price, "Istanbul"))
                .await
                .unwrap();
        }

        let filter = Where::field("price", FloatFilter::new().gte(150.0));
        assert_eq!(listings.count(Some(&filter)).await.unwrap(), 2);

        let aggregates = Aggregates::new()
            .count()
            .min(vec!["price"])
            .max(vec!["price"])
            .avg(vec!["price"])
            .sum(vec!["price"]);
        let result = listings.aggregate(None, &aggregates).await.unwrap();
        assert_eq!(result.count, Some(3));
        assert_eq!(result.min["price"], 100.0);
        assert_eq!(result.max["price"], 300.0);
        assert_eq!(result.avg["price"], 200.0);
        assert_eq!(result.sum["price"], 600.0);
    }

    #[tokio::test]
    async fn test_aggregate_decodes_int_and_text_columns() {
        let pool = test_pool().await;
        let listings: Repository<Listing> = Repository::new(pool);

        for (title, area) in [("A", Some(50)), ("B", Some(70)), ("C", None)] {
            let mut input = listing_input(title, 100.0, "Istanbul");
            input.area_gross = area;
            listings.create(&input).await.unwrap();
        }

        let aggregates = Aggregates::new()
            .min(vec!["title"])
            .max(vec!["area_gross"])
            .sum(vec!["area_gross"]);
        let result = listings.aggregate(None, &aggregates).await.unwrap();
        assert_eq!(result.min["title"], "A");
        assert_eq!(result.max["area_gross"], 70);
        assert_eq!(result.sum["area_gross"], 120);
    }

    #[tokio::test]
    async fn test_aggregate_avg_on_text_column_is_rejected() {
        let pool = test_pool().await;
        let listings: Repository<Listing> = Repository::new(pool);

        let aggregates = Aggregates::new().avg(vec!["title"]);
        let err = listings.aggregate(None, &aggregates).await.unwrap_err();
        assert!(err.is_invalid_query());
    }

    #[tokio::test]
    async fn test_group_by_counts_per_key() {
        let pool = test_pool().await;
        let listings: Repository<Listing> = Repository::new(pool);

        for city in ["Istanbul", "Istanbul", "Ankara"] {
            listings
                .create(&listing_input("L", 100.0, city))
                .await
                .unwrap();
        }

        let query = GroupByQuery::by(vec!["city"])
            .having(Where::field("_count", IntFilter::new().gte(2)))
            .order_by(OrderBy::desc("_count"));
        let groups = listings.group_by(&query).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0]["city"], "Istanbul");
        assert_eq!(groups[0]["_count"], 2);
    }

    #[tokio::test]
    async fn test_group_by_rejects_columns_outside_key_set() {
        let pool = test_pool().await;
        let listings: Repository<Listing> = Repository::new(pool);

        let query = GroupByQuery::by(vec!["city"]).order_by(OrderBy::asc("price"));
        let err = listings.group_by(&query).await.unwrap_err();
        assert!(err.is_invalid_query());

        let query =
            GroupByQuery::by(vec!["city"]).having(Where::field("price", FloatFilter::new().gt(0.0)));
        let err = listings.group_by(&query).await.unwrap_err();
        assert!(err.is_invalid_query());
    }

    #[tokio::test]
    async fn test_deleting_agent_detaches_listings_and_cascades_notes() {
        use crate::entities::{AdminNote, AdminNotePriority, AdminNoteType, CreateAdminNote};

        let pool = test_pool().await;
        let users: Repository<User> = Repository::new(pool.clone());
        let listings: Repository<Listing> = Repository::new(pool.clone());
        let notes: Repository<AdminNote> = Repository::new(pool);

        let agent = users.create(&user_input("fk@emlak.com")).await.unwrap();
        let mut input = listing_input("Daire", 100.0, "Istanbul");
        input.agent_id = Some(agent.id.clone());
        let listing = listings.create(&input).await.unwrap();
        notes
            .create(&CreateAdminNote {
                listing_id: listing.id.clone(),
                content: "Sahibi aranacak".to_string(),
                note_type: AdminNoteType::Reminder,
                priority: AdminNotePriority::High,
                is_private: false,
                created_by: agent.id.clone(),
            })
            .await
            .unwrap();

        // Removing the agent detaches the listing instead of deleting it.
        users.delete(&UniqueWhere::id(agent.id)).await.unwrap();
        let detached = listings
            .find_unique_required(&UniqueWhere::id(listing.id.clone()))
            .await
            .unwrap();
        assert_eq!(detached.agent_id, None);

        // Removing the listing takes its notes with it.
        listings.delete(&UniqueWhere::id(listing.id)).await.unwrap();
        assert_eq!(notes.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_autoincrement_entity_assigns_rowid() {
        let pool = test_pool().await;
        let team: Repository<TeamMember> = Repository::new(pool);

        let input = CreateTeamMember {
            name: "Mehmet".to_string(),
            title: "Danisman".to_string(),
            photo_url: None,
            phone: None,
            email: None,
            sort_order: 1,
        };
        let first = team.create(&input).await.unwrap();
        let second = team.create(&input).await.unwrap();
        assert!(first.id >= 1);
        assert_eq!(second.id, first.id + 1);

        let found = team.find_unique(&UniqueWhere::id(first.id)).await.unwrap();
        assert_eq!(found, Some(first));
    }
}

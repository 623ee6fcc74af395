//! Top-level database client.
//!
//! [`EmlakClient`] owns the connection pool and hands out typed
//! repositories, raw SQL escape hatches, and interactive transactions.

use std::time::Duration;

use emlak_config::DatabaseConfig;
use futures_util::future::BoxFuture;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqliteConnection, SqlitePool, TypeInfo, ValueRef};
use tracing::{debug, info};

use crate::connection::prepare_database;
use crate::entities::{
    AdminNote, CareerApplication, ContactMessage, Feature, Image, Listing, Location, Reference,
    TeamMember, User,
};
use crate::migrations::run_migrations;
use crate::query::ScalarValue;
use crate::repo::{map_write_err, Repository};
use crate::types::{DatabaseError, DatabaseResult};

/// SQLite transaction start behavior. `Immediate` and `Exclusive` take the
/// write lock up front, which is the closest SQLite gets to stricter
/// isolation levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxBehavior {
    #[default]
    Deferred,
    Immediate,
    Exclusive,
}

impl TxBehavior {
    fn begin_sql(self) -> &'static str {
        match self {
            TxBehavior::Deferred => "BEGIN DEFERRED",
            TxBehavior::Immediate => "BEGIN IMMEDIATE",
            TxBehavior::Exclusive => "BEGIN EXCLUSIVE",
        }
    }
}

/// Options for an interactive transaction: how long to wait for a pooled
/// connection, how long the callback may run, and the lock behavior.
#[derive(Debug, Clone, Copy)]
pub struct TxOptions {
    pub max_wait: Duration,
    pub timeout: Duration,
    pub behavior: TxBehavior,
}

impl Default for TxOptions {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_millis(2000),
            timeout: Duration::from_millis(5000),
            behavior: TxBehavior::Deferred,
        }
    }
}

impl TxOptions {
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn behavior(mut self, behavior: TxBehavior) -> Self {
        self.behavior = behavior;
        self
    }
}

/// One parameterized SQL statement for [`EmlakClient::batch`].
#[derive(Debug, Clone)]
pub struct RawStatement {
    sql: String,
    params: Vec<ScalarValue>,
}

impl RawStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<ScalarValue>) -> Self {
        self.params.push(value.into());
        self
    }
}

#[derive(Clone)]
pub struct EmlakClient {
    pool: SqlitePool,
}

impl EmlakClient {
    /// Connect to the configured database and bring the schema up to date.
    pub async fn connect(config: &DatabaseConfig) -> DatabaseResult<Self> {
        let pool = prepare_database(config)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        run_migrations(&pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;
        info!("database client ready");
        Ok(Self { pool })
    }

    /// Wrap an existing pool. Migrations are assumed to have been applied.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    // ---- typed repositories ----

    pub fn users(&self) -> Repository<User> {
        Repository::new(self.pool.clone())
    }

    pub fn listings(&self) -> Repository<Listing> {
        Repository::new(self.pool.clone())
    }

    pub fn locations(&self) -> Repository<Location> {
        Repository::new(self.pool.clone())
    }

    pub fn images(&self) -> Repository<Image> {
        Repository::new(self.pool.clone())
    }

    pub fn features(&self) -> Repository<Feature> {
        Repository::new(self.pool.clone())
    }

    pub fn references(&self) -> Repository<Reference> {
        Repository::new(self.pool.clone())
    }

    pub fn team_members(&self) -> Repository<TeamMember> {
        Repository::new(self.pool.clone())
    }

    pub fn contact_messages(&self) -> Repository<ContactMessage> {
        Repository::new(self.pool.clone())
    }

    pub fn career_applications(&self) -> Repository<CareerApplication> {
        Repository::new(self.pool.clone())
    }

    pub fn admin_notes(&self) -> Repository<AdminNote> {
        Repository::new(self.pool.clone())
    }

    // ---- raw SQL ----

    /// Run a parameterized SELECT and return untyped documents. Column types
    /// come from SQLite's own storage classes.
    pub async fn query_raw(
        &self,
        sql: &str,
        params: Vec<ScalarValue>,
    ) -> DatabaseResult<Vec<Value>> {
        let mut q = sqlx::query(sql);
        for p in params {
            q = p.bind_to(q);
        }
        let rows = q.fetch_all(&self.pool).await?;
        let mut docs = Vec::with_capacity(rows.len());
        for row in &rows {
            docs.push(Value::Object(raw_row_to_document(row)?));
        }
        Ok(docs)
    }

    /// Run a parameterized write statement and return the affected row count.
    pub async fn execute_raw(&self, sql: &str, params: Vec<ScalarValue>) -> DatabaseResult<u64> {
        let mut q = sqlx::query(sql);
        for p in params {
            q = p.bind_to(q);
        }
        let result = q.execute(&self.pool).await.map_err(map_write_err)?;
        Ok(result.rows_affected())
    }

    /// Run a sequence of statements inside one transaction. Any failure
    /// rolls back everything already executed.
    pub async fn batch(&self, statements: Vec<RawStatement>) -> DatabaseResult<Vec<u64>> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN DEFERRED").execute(&mut *conn).await?;

        let mut affected = Vec::with_capacity(statements.len());
        for statement in statements {
            let mut q = sqlx::query(&statement.sql);
            for p in statement.params {
                q = p.bind_to(q);
            }
            match q.execute(&mut *conn).await {
                Ok(result) => affected.push(result.rows_affected()),
                Err(e) => {
                    let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                    return Err(map_write_err(e));
                }
            }
        }

        sqlx::query("COMMIT").execute(&mut *conn).await?;
        debug!(statements = affected.len(), "batch committed");
        Ok(affected)
    }

    /// Interactive transaction. The callback receives a dedicated connection
    /// with an open transaction; returning `Ok` commits, returning `Err` or
    /// overrunning `timeout` rolls back. Waiting longer than `max_wait` for
    /// a pooled connection fails without starting the transaction.
    pub async fn transaction<T, F>(&self, options: TxOptions, callback: F) -> DatabaseResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, DatabaseResult<T>> + Send,
    {
        let mut conn = tokio::time::timeout(options.max_wait, self.pool.acquire())
            .await
            .map_err(|_| DatabaseError::PoolTimeout(options.max_wait))??;

        sqlx::query(options.behavior.begin_sql())
            .execute(&mut *conn)
            .await?;

        match tokio::time::timeout(options.timeout, callback(&mut conn)).await {
            Ok(Ok(value)) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(value)
            }
            Ok(Err(e)) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(e)
            }
            Err(_) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(DatabaseError::TransactionTimeout(options.timeout))
            }
        }
    }
}

fn raw_row_to_document(row: &SqliteRow) -> DatabaseResult<Map<String, Value>> {
    let mut doc = Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => Value::from(row.try_get::<i64, _>(index)?),
                "REAL" => Value::from(row.try_get::<f64, _>(index)?),
                "BLOB" => {
                    let bytes: Vec<u8> = row.try_get(index)?;
                    Value::Array(bytes.into_iter().map(Value::from).collect())
                }
                _ => Value::String(row.try_get::<String, _>(index)?),
            }
        };
        doc.insert(column.name().to_string(), value);
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CreateUser, UserRole};
    use crate::query::UniqueWhere;

    async fn test_client() -> EmlakClient {
        let config = DatabaseConfig {
            url: "sqlite://:memory:".to_string(),
            max_connections: 1,
        };
        EmlakClient::connect(&config).await.unwrap()
    }

    fn sample_user(email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Agent,
            name: Some("Test Agent".to_string()),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_query_raw_decodes_storage_classes() {
        let client = test_client().await;
        let rows = client
            .query_raw(
                "SELECT 1 AS n, 2.5 AS f, 'hi' AS s, NULL AS missing",
                vec![],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["n"], 1);
        assert_eq!(rows[0]["f"], 2.5);
        assert_eq!(rows[0]["s"], "hi");
        assert!(rows[0]["missing"].is_null());
    }

    #[tokio::test]
    async fn test_execute_raw_reports_affected_rows() {
        let client = test_client().await;
        client.users().create(&sample_user("a@emlak.com")).await.unwrap();
        client.users().create(&sample_user("b@emlak.com")).await.unwrap();

        let affected = client
            .execute_raw(
                "UPDATE users SET name = ? WHERE role = ?",
                vec!["Renamed".into(), "AGENT".into()],
            )
            .await
            .unwrap();
        assert_eq!(affected, 2);
    }

    #[tokio::test]
    async fn test_batch_rolls_back_on_failure() {
        let client = test_client().await;
        let user = client.users().create(&sample_user("a@emlak.com")).await.unwrap();

        // Second statement violates the unique email, so the first insertless
        // update must not stick either.
        let result = client
            .batch(vec![
                RawStatement::new("UPDATE users SET name = ? WHERE id = ?")
                    .bind("Changed")
                    .bind(user.id.clone()),
                RawStatement::new("INSERT INTO users (id, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)")
                    .bind("dup")
                    .bind("a@emlak.com")
                    .bind("x")
                    .bind("USER")
                    .bind("2026-01-01T00:00:00Z")
                    .bind("2026-01-01T00:00:00Z"),
            ])
            .await;
        assert!(matches!(result, Err(DatabaseError::UniqueViolation(_))));

        let reloaded = client
            .users()
            .find_unique_required(&UniqueWhere::id(user.id))
            .await
            .unwrap();
        assert_eq!(reloaded.name.as_deref(), Some("Test Agent"));
    }

    #[tokio::test]
    async fn test_transaction_commit() {
        let client = test_client().await;
        let users = client.users();

        let created = client
            .transaction(TxOptions::default(), |conn| {
                let users = users.clone();
                Box::pin(async move {
                    users.create_in(conn, &sample_user("tx@emlak.com")).await
                })
            })
            .await
            .unwrap();

        let found = users
            .find_unique(&UniqueWhere::column("email", "tx@emlak.com"))
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_transaction_rollback_on_error() {
        let client = test_client().await;
        let users = client.users();

        let result: DatabaseResult<()> = client
            .transaction(TxOptions::default(), |conn| {
                let users = users.clone();
                Box::pin(async move {
                    users.create_in(conn, &sample_user("gone@emlak.com")).await?;
                    Err(DatabaseError::InvalidQuery("boom".to_string()))
                })
            })
            .await;
        assert!(result.is_err());

        let found = users
            .find_unique(&UniqueWhere::column("email", "gone@emlak.com"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_transaction_callback_timeout() {
        let client = test_client().await;
        let options = TxOptions::default().timeout(Duration::from_millis(20));

        let result: DatabaseResult<()> = client
            .transaction(options, |_conn| {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok(())
                })
            })
            .await;
        assert!(matches!(result, Err(DatabaseError::TransactionTimeout(_))));
    }

    #[tokio::test]
    async fn test_transaction_pool_timeout() {
        let client = test_client().await;
        // The pool has a single connection. Holding it makes acquisition
        // overrun max_wait.
        let held = client.pool().acquire().await.unwrap();

        let options = TxOptions::default().max_wait(Duration::from_millis(20));
        let result: DatabaseResult<()> = client
            .transaction(options, |_conn| Box::pin(async move { Ok(()) }))
            .await;
        assert!(matches!(result, Err(DatabaseError::PoolTimeout(_))));
        drop(held);
    }

    #[tokio::test]
    async fn test_immediate_behavior_commits() {
        let client = test_client().await;
        let users = client.users();

        client
            .transaction(
                TxOptions::default().behavior(TxBehavior::Immediate),
                |conn| {
                    let users = users.clone();
                    Box::pin(async move {
                        users.create_in(conn, &sample_user("imm@emlak.com")).await?;
                        Ok(())
                    })
                },
            )
            .await
            .unwrap();

        assert_eq!(users.count(None).await.unwrap(), 1);
    }
}

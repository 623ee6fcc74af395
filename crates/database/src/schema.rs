//! Entity schema definitions.
//!
//! One static [`EntitySchema`] per entity is the source of truth the query
//! builder and the generic repository derive from: column names and types,
//! nullability, unique columns, and declared relations. The schemas carry no
//! runtime behavior of their own.

use sqlx::sqlite::SqliteRow;

use crate::query::ScalarValue;
use crate::types::DatabaseResult;

/// Scalar type of a column, as stored in SQLite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Text,
    Int,
    Float,
    Bool,
    /// RFC 3339 text.
    DateTime,
    /// JSON-serialized text.
    Json,
}

/// How the surrogate id of a table is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// Text id generated with cuid2 at insert time.
    Cuid,
    /// `INTEGER PRIMARY KEY AUTOINCREMENT`, assigned by the engine.
    AutoIncrement,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ScalarType,
    pub nullable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    HasMany,
    BelongsTo,
}

#[derive(Debug, Clone, Copy)]
pub struct RelationDef {
    /// Name used in `include(...)`.
    pub name: &'static str,
    /// Table the relation points at.
    pub table: &'static str,
    pub kind: RelationKind,
    /// Key column on this entity's table.
    pub local_key: &'static str,
    /// Key column on the target table.
    pub foreign_key: &'static str,
}

/// Static description of one entity table.
#[derive(Debug)]
pub struct EntitySchema {
    pub entity: &'static str,
    pub table: &'static str,
    pub id: IdKind,
    pub columns: &'static [ColumnDef],
    /// Unique columns besides the id.
    pub uniques: &'static [&'static str],
    pub relations: &'static [RelationDef],
}

impl EntitySchema {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// A column usable in a `WhereUnique` lookup: the id or a declared unique.
    pub fn is_unique_column(&self, name: &str) -> bool {
        name == "id" || self.uniques.contains(&name)
    }

    /// Comma-separated column list for SELECT statements.
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Binds a record struct to its schema, row decoding, and input types.
pub trait Entity: Send + Sync + Unpin + Sized + 'static {
    type Create: CreateInput;
    type Update: UpdateInput;

    /// Display name used in error messages, e.g. `"Listing"`.
    const ENTITY: &'static str;

    fn schema() -> &'static EntitySchema;

    fn from_row(row: &SqliteRow) -> DatabaseResult<Self>;
}

/// Column values supplied when inserting a record. The repository adds the
/// generated id and both timestamps itself; inputs never include them.
pub trait CreateInput: Send + Sync {
    fn values(&self) -> Vec<(&'static str, ScalarValue)>;
}

/// Partial column assignments for an update. Absent fields are left
/// untouched; the repository bumps `updated_at` itself.
pub trait UpdateInput: Send + Sync {
    fn changes(&self) -> Vec<(&'static str, ScalarValue)>;
}

//! User entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;

use super::{get_col, get_datetime, get_enum};
use crate::query::{EnumValue, ScalarValue};
use crate::schema::{
    ColumnDef, CreateInput, Entity, EntitySchema, IdKind, RelationDef, RelationKind, ScalarType,
    UpdateInput,
};
use crate::types::DatabaseResult;

/// Login identity. Owns zero or more listings through `listings.agent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    Agent,
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Agent => "AGENT",
            UserRole::User => "USER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(UserRole::Admin),
            "AGENT" => Some(UserRole::Agent),
            "USER" => Some(UserRole::User),
            _ => None,
        }
    }
}

impl EnumValue for UserRole {
    fn as_str(&self) -> &'static str {
        UserRole::as_str(self)
    }
}

static SCHEMA: EntitySchema = EntitySchema {
    entity: "User",
    table: "users",
    id: IdKind::Cuid,
    columns: &[
        ColumnDef { name: "id", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "email", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "password_hash", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "role", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "name", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "phone", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "created_at", ty: ScalarType::DateTime, nullable: false },
        ColumnDef { name: "updated_at", ty: ScalarType::DateTime, nullable: false },
    ],
    uniques: &["email"],
    relations: &[RelationDef {
        name: "listings",
        table: "listings",
        kind: RelationKind::HasMany,
        local_key: "id",
        foreign_key: "agent_id",
    }],
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl CreateInput for CreateUser {
    fn values(&self) -> Vec<(&'static str, ScalarValue)> {
        vec![
            ("email", self.email.clone().into()),
            ("password_hash", self.password_hash.clone().into()),
            ("role", self.role.as_str().into()),
            ("name", self.name.clone().into()),
            ("phone", self.phone.clone().into()),
        ]
    }
}

/// Absent fields stay untouched; `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
    pub name: Option<Option<String>>,
    pub phone: Option<Option<String>>,
}

impl UpdateInput for UpdateUser {
    fn changes(&self) -> Vec<(&'static str, ScalarValue)> {
        let mut out = Vec::new();
        if let Some(v) = &self.email {
            out.push(("email", v.clone().into()));
        }
        if let Some(v) = &self.password_hash {
            out.push(("password_hash", v.clone().into()));
        }
        if let Some(v) = &self.role {
            out.push(("role", v.as_str().into()));
        }
        if let Some(v) = &self.name {
            out.push(("name", v.clone().into()));
        }
        if let Some(v) = &self.phone {
            out.push(("phone", v.clone().into()));
        }
        out
    }
}

impl Entity for User {
    type Create = CreateUser;
    type Update = UpdateUser;

    const ENTITY: &'static str = "User";

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn from_row(row: &SqliteRow) -> DatabaseResult<Self> {
        Ok(Self {
            id: get_col(row, "id", Self::ENTITY)?,
            email: get_col(row, "email", Self::ENTITY)?,
            password_hash: get_col(row, "password_hash", Self::ENTITY)?,
            role: get_enum(row, "role", Self::ENTITY, UserRole::parse)?,
            name: get_col(row, "name", Self::ENTITY)?,
            phone: get_col(row, "phone", Self::ENTITY)?,
            created_at: get_datetime(row, "created_at", Self::ENTITY)?,
            updated_at: get_datetime(row, "updated_at", Self::ENTITY)?,
        })
    }
}

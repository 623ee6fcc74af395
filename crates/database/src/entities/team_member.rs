//! Team member entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;

use super::{get_col, get_datetime};
use crate::query::ScalarValue;
use crate::schema::{
    ColumnDef, CreateInput, Entity, EntitySchema, IdKind, ScalarType, UpdateInput,
};
use crate::types::DatabaseResult;

/// Staff profile. The one entity with an integer autoincrement id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub photo_url: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

static SCHEMA: EntitySchema = EntitySchema {
    entity: "TeamMember",
    table: "team_members",
    id: IdKind::AutoIncrement,
    columns: &[
        ColumnDef { name: "id", ty: ScalarType::Int, nullable: false },
        ColumnDef { name: "name", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "title", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "photo_url", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "phone", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "email", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "sort_order", ty: ScalarType::Int, nullable: false },
        ColumnDef { name: "created_at", ty: ScalarType::DateTime, nullable: false },
        ColumnDef { name: "updated_at", ty: ScalarType::DateTime, nullable: false },
    ],
    uniques: &[],
    relations: &[],
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeamMember {
    pub name: String,
    pub title: String,
    pub photo_url: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub sort_order: i64,
}

impl CreateInput for CreateTeamMember {
    fn values(&self) -> Vec<(&'static str, ScalarValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("title", self.title.clone().into()),
            ("photo_url", self.photo_url.clone().into()),
            ("phone", self.phone.clone().into()),
            ("email", self.email.clone().into()),
            ("sort_order", self.sort_order.into()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTeamMember {
    pub name: Option<String>,
    pub title: Option<String>,
    pub photo_url: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub sort_order: Option<i64>,
}

impl UpdateInput for UpdateTeamMember {
    fn changes(&self) -> Vec<(&'static str, ScalarValue)> {
        let mut out = Vec::new();
        if let Some(v) = &self.name {
            out.push(("name", v.clone().into()));
        }
        if let Some(v) = &self.title {
            out.push(("title", v.clone().into()));
        }
        if let Some(v) = &self.photo_url {
            out.push(("photo_url", v.clone().into()));
        }
        if let Some(v) = &self.phone {
            out.push(("phone", v.clone().into()));
        }
        if let Some(v) = &self.email {
            out.push(("email", v.clone().into()));
        }
        if let Some(v) = self.sort_order {
            out.push(("sort_order", v.into()));
        }
        out
    }
}

impl Entity for TeamMember {
    type Create = CreateTeamMember;
    type Update = UpdateTeamMember;

    const ENTITY: &'static str = "TeamMember";

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn from_row(row: &SqliteRow) -> DatabaseResult<Self> {
        Ok(Self {
            id: get_col(row, "id", Self::ENTITY)?,
            name: get_col(row, "name", Self::ENTITY)?,
            title: get_col(row, "title", Self::ENTITY)?,
            photo_url: get_col(row, "photo_url", Self::ENTITY)?,
            phone: get_col(row, "phone", Self::ENTITY)?,
            email: get_col(row, "email", Self::ENTITY)?,
            sort_order: get_col(row, "sort_order", Self::ENTITY)?,
            created_at: get_datetime(row, "created_at", Self::ENTITY)?,
            updated_at: get_datetime(row, "updated_at", Self::ENTITY)?,
        })
    }
}

//! Reference entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;

use super::{get_col, get_datetime};
use crate::query::ScalarValue;
use crate::schema::{
    ColumnDef, CreateInput, Entity, EntitySchema, IdKind, ScalarType, UpdateInput,
};
use crate::types::DatabaseResult;

/// Company showcase record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// REFERENCES is reserved in SQL, hence the trailing underscore.
static SCHEMA: EntitySchema = EntitySchema {
    entity: "Reference",
    table: "references_",
    id: IdKind::Cuid,
    columns: &[
        ColumnDef { name: "id", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "name", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "description", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "logo_url", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "created_at", ty: ScalarType::DateTime, nullable: false },
        ColumnDef { name: "updated_at", ty: ScalarType::DateTime, nullable: false },
    ],
    uniques: &[],
    relations: &[],
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReference {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

impl CreateInput for CreateReference {
    fn values(&self) -> Vec<(&'static str, ScalarValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("description", self.description.clone().into()),
            ("logo_url", self.logo_url.clone().into()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateReference {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub logo_url: Option<Option<String>>,
}

impl UpdateInput for UpdateReference {
    fn changes(&self) -> Vec<(&'static str, ScalarValue)> {
        let mut out = Vec::new();
        if let Some(v) = &self.name {
            out.push(("name", v.clone().into()));
        }
        if let Some(v) = &self.description {
            out.push(("description", v.clone().into()));
        }
        if let Some(v) = &self.logo_url {
            out.push(("logo_url", v.clone().into()));
        }
        out
    }
}

impl Entity for Reference {
    type Create = CreateReference;
    type Update = UpdateReference;

    const ENTITY: &'static str = "Reference";

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn from_row(row: &SqliteRow) -> DatabaseResult<Self> {
        Ok(Self {
            id: get_col(row, "id", Self::ENTITY)?,
            name: get_col(row, "name", Self::ENTITY)?,
            description: get_col(row, "description", Self::ENTITY)?,
            logo_url: get_col(row, "logo_url", Self::ENTITY)?,
            created_at: get_datetime(row, "created_at", Self::ENTITY)?,
            updated_at: get_datetime(row, "updated_at", Self::ENTITY)?,
        })
    }
}

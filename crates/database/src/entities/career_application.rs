//! Career application entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;

use super::{get_col, get_datetime};
use crate::query::ScalarValue;
use crate::schema::{
    ColumnDef, CreateInput, Entity, EntitySchema, IdKind, ScalarType, UpdateInput,
};
use crate::types::DatabaseResult;

/// Job application. `status` is deliberately free text, not an enum: the
/// upstream schema leaves it unconstrained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerApplication {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub status: String,
    pub cv_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

static SCHEMA: EntitySchema = EntitySchema {
    entity: "CareerApplication",
    table: "career_applications",
    id: IdKind::Cuid,
    columns: &[
        ColumnDef { name: "id", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "name", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "email", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "phone", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "position", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "status", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "cv_url", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "notes", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "created_at", ty: ScalarType::DateTime, nullable: false },
        ColumnDef { name: "updated_at", ty: ScalarType::DateTime, nullable: false },
    ],
    uniques: &[],
    relations: &[],
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCareerApplication {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub status: String,
    pub cv_url: Option<String>,
    pub notes: Option<String>,
}

impl CreateInput for CreateCareerApplication {
    fn values(&self) -> Vec<(&'static str, ScalarValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("email", self.email.clone().into()),
            ("phone", self.phone.clone().into()),
            ("position", self.position.clone().into()),
            ("status", self.status.clone().into()),
            ("cv_url", self.cv_url.clone().into()),
            ("notes", self.notes.clone().into()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCareerApplication {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub position: Option<String>,
    pub status: Option<String>,
    pub cv_url: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl UpdateInput for UpdateCareerApplication {
    fn changes(&self) -> Vec<(&'static str, ScalarValue)> {
        let mut out = Vec::new();
        if let Some(v) = &self.name {
            out.push(("name", v.clone().into()));
        }
        if let Some(v) = &self.email {
            out.push(("email", v.clone().into()));
        }
        if let Some(v) = &self.phone {
            out.push(("phone", v.clone().into()));
        }
        if let Some(v) = &self.position {
            out.push(("position", v.clone().into()));
        }
        if let Some(v) = &self.status {
            out.push(("status", v.clone().into()));
        }
        if let Some(v) = &self.cv_url {
            out.push(("cv_url", v.clone().into()));
        }
        if let Some(v) = &self.notes {
            out.push(("notes", v.clone().into()));
        }
        out
    }
}

impl Entity for CareerApplication {
    type Create = CreateCareerApplication;
    type Update = UpdateCareerApplication;

    const ENTITY: &'static str = "CareerApplication";

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn from_row(row: &SqliteRow) -> DatabaseResult<Self> {
        Ok(Self {
            id: get_col(row, "id", Self::ENTITY)?,
            name: get_col(row, "name", Self::ENTITY)?,
            email: get_col(row, "email", Self::ENTITY)?,
            phone: get_col(row, "phone", Self::ENTITY)?,
            position: get_col(row, "position", Self::ENTITY)?,
            status: get_col(row, "status", Self::ENTITY)?,
            cv_url: get_col(row, "cv_url", Self::ENTITY)?,
            notes: get_col(row, "notes", Self::ENTITY)?,
            created_at: get_datetime(row, "created_at", Self::ENTITY)?,
            updated_at: get_datetime(row, "updated_at", Self::ENTITY)?,
        })
    }
}

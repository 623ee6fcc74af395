//! Feature entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;

use super::{get_col, get_datetime};
use crate::query::ScalarValue;
use crate::schema::{
    ColumnDef, CreateInput, Entity, EntitySchema, IdKind, ScalarType, UpdateInput,
};
use crate::types::DatabaseResult;

/// Ad-hoc name/value attribute keyed by a raw `listing_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub name: String,
    pub value: String,
    pub listing_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

static SCHEMA: EntitySchema = EntitySchema {
    entity: "Feature",
    table: "features",
    id: IdKind::Cuid,
    columns: &[
        ColumnDef { name: "id", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "name", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "value", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "listing_id", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "created_at", ty: ScalarType::DateTime, nullable: false },
        ColumnDef { name: "updated_at", ty: ScalarType::DateTime, nullable: false },
    ],
    uniques: &[],
    relations: &[],
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeature {
    pub name: String,
    pub value: String,
    pub listing_id: String,
}

impl CreateInput for CreateFeature {
    fn values(&self) -> Vec<(&'static str, ScalarValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("value", self.value.clone().into()),
            ("listing_id", self.listing_id.clone().into()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFeature {
    pub name: Option<String>,
    pub value: Option<String>,
    pub listing_id: Option<String>,
}

impl UpdateInput for UpdateFeature {
    fn changes(&self) -> Vec<(&'static str, ScalarValue)> {
        let mut out = Vec::new();
        if let Some(v) = &self.name {
            out.push(("name", v.clone().into()));
        }
        if let Some(v) = &self.value {
            out.push(("value", v.clone().into()));
        }
        if let Some(v) = &self.listing_id {
            out.push(("listing_id", v.clone().into()));
        }
        out
    }
}

impl Entity for Feature {
    type Create = CreateFeature;
    type Update = UpdateFeature;

    const ENTITY: &'static str = "Feature";

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn from_row(row: &SqliteRow) -> DatabaseResult<Self> {
        Ok(Self {
            id: get_col(row, "id", Self::ENTITY)?,
            name: get_col(row, "name", Self::ENTITY)?,
            value: get_col(row, "value", Self::ENTITY)?,
            listing_id: get_col(row, "listing_id", Self::ENTITY)?,
            created_at: get_datetime(row, "created_at", Self::ENTITY)?,
            updated_at: get_datetime(row, "updated_at", Self::ENTITY)?,
        })
    }
}

//! Image entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;

use super::{get_col, get_datetime};
use crate::query::ScalarValue;
use crate::schema::{
    ColumnDef, CreateInput, Entity, EntitySchema, IdKind, ScalarType, UpdateInput,
};
use crate::types::DatabaseResult;

/// Listing photo. `listing_id` is a raw key on purpose: the upstream type
/// surface declares no relation object for images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub url: String,
    pub listing_id: String,
    pub is_main: bool,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

static SCHEMA: EntitySchema = EntitySchema {
    entity: "Image",
    table: "images",
    id: IdKind::Cuid,
    columns: &[
        ColumnDef { name: "id", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "url", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "listing_id", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "is_main", ty: ScalarType::Bool, nullable: false },
        ColumnDef { name: "sort_order", ty: ScalarType::Int, nullable: false },
        ColumnDef { name: "created_at", ty: ScalarType::DateTime, nullable: false },
        ColumnDef { name: "updated_at", ty: ScalarType::DateTime, nullable: false },
    ],
    uniques: &[],
    relations: &[],
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateImage {
    pub url: String,
    pub listing_id: String,
    pub is_main: bool,
    pub sort_order: i64,
}

impl CreateInput for CreateImage {
    fn values(&self) -> Vec<(&'static str, ScalarValue)> {
        vec![
            ("url", self.url.clone().into()),
            ("listing_id", self.listing_id.clone().into()),
            ("is_main", self.is_main.into()),
            ("sort_order", self.sort_order.into()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateImage {
    pub url: Option<String>,
    pub listing_id: Option<String>,
    pub is_main: Option<bool>,
    pub sort_order: Option<i64>,
}

impl UpdateInput for UpdateImage {
    fn changes(&self) -> Vec<(&'static str, ScalarValue)> {
        let mut out = Vec::new();
        if let Some(v) = &self.url {
            out.push(("url", v.clone().into()));
        }
        if let Some(v) = &self.listing_id {
            out.push(("listing_id", v.clone().into()));
        }
        if let Some(v) = self.is_main {
            out.push(("is_main", v.into()));
        }
        if let Some(v) = self.sort_order {
            out.push(("sort_order", v.into()));
        }
        out
    }
}

impl Entity for Image {
    type Create = CreateImage;
    type Update = UpdateImage;

    const ENTITY: &'static str = "Image";

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn from_row(row: &SqliteRow) -> DatabaseResult<Self> {
        Ok(Self {
            id: get_col(row, "id", Self::ENTITY)?,
            url: get_col(row, "url", Self::ENTITY)?,
            listing_id: get_col(row, "listing_id", Self::ENTITY)?,
            is_main: get_col(row, "is_main", Self::ENTITY)?,
            sort_order: get_col(row, "sort_order", Self::ENTITY)?,
            created_at: get_datetime(row, "created_at", Self::ENTITY)?,
            updated_at: get_datetime(row, "updated_at", Self::ENTITY)?,
        })
    }
}

//! Location entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;

use super::{get_col, get_datetime};
use crate::query::ScalarValue;
use crate::schema::{
    ColumnDef, CreateInput, Entity, EntitySchema, IdKind, ScalarType, UpdateInput,
};
use crate::types::DatabaseResult;

/// Standalone city/district/neighborhood record, no relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub city: String,
    pub district: String,
    pub neighborhood: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

static SCHEMA: EntitySchema = EntitySchema {
    entity: "Location",
    table: "locations",
    id: IdKind::Cuid,
    columns: &[
        ColumnDef { name: "id", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "city", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "district", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "neighborhood", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "address", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "latitude", ty: ScalarType::Float, nullable: true },
        ColumnDef { name: "longitude", ty: ScalarType::Float, nullable: true },
        ColumnDef { name: "created_at", ty: ScalarType::DateTime, nullable: false },
        ColumnDef { name: "updated_at", ty: ScalarType::DateTime, nullable: false },
    ],
    uniques: &[],
    relations: &[],
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLocation {
    pub city: String,
    pub district: String,
    pub neighborhood: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CreateInput for CreateLocation {
    fn values(&self) -> Vec<(&'static str, ScalarValue)> {
        vec![
            ("city", self.city.clone().into()),
            ("district", self.district.clone().into()),
            ("neighborhood", self.neighborhood.clone().into()),
            ("address", self.address.clone().into()),
            ("latitude", self.latitude.into()),
            ("longitude", self.longitude.into()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLocation {
    pub city: Option<String>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub address: Option<Option<String>>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
}

impl UpdateInput for UpdateLocation {
    fn changes(&self) -> Vec<(&'static str, ScalarValue)> {
        let mut out = Vec::new();
        if let Some(v) = &self.city {
            out.push(("city", v.clone().into()));
        }
        if let Some(v) = &self.district {
            out.push(("district", v.clone().into()));
        }
        if let Some(v) = &self.neighborhood {
            out.push(("neighborhood", v.clone().into()));
        }
        if let Some(v) = &self.address {
            out.push(("address", v.clone().into()));
        }
        if let Some(v) = &self.latitude {
            out.push(("latitude", (*v).into()));
        }
        if let Some(v) = &self.longitude {
            out.push(("longitude", (*v).into()));
        }
        out
    }
}

impl Entity for Location {
    type Create = CreateLocation;
    type Update = UpdateLocation;

    const ENTITY: &'static str = "Location";

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn from_row(row: &SqliteRow) -> DatabaseResult<Self> {
        Ok(Self {
            id: get_col(row, "id", Self::ENTITY)?,
            city: get_col(row, "city", Self::ENTITY)?,
            district: get_col(row, "district", Self::ENTITY)?,
            neighborhood: get_col(row, "neighborhood", Self::ENTITY)?,
            address: get_col(row, "address", Self::ENTITY)?,
            latitude: get_col(row, "latitude", Self::ENTITY)?,
            longitude: get_col(row, "longitude", Self::ENTITY)?,
            created_at: get_datetime(row, "created_at", Self::ENTITY)?,
            updated_at: get_datetime(row, "updated_at", Self::ENTITY)?,
        })
    }
}

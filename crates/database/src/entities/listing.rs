//! Listing entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;

use super::{get_col, get_datetime, get_enum, get_json_opt};
use crate::query::{EnumValue, ScalarValue};
use crate::schema::{
    ColumnDef, CreateInput, Entity, EntitySchema, IdKind, RelationDef, RelationKind, ScalarType,
    UpdateInput,
};
use crate::types::DatabaseResult;

/// Real-estate property record. `agent_id` is nullable (listings may be
/// unassigned); `images` is an open-ended JSON blob with no structural
/// contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub listing_type: ListingType,
    pub status: ListingStatus,
    pub city: String,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub area_gross: Option<i64>,
    pub area_net: Option<i64>,
    pub rooms: Option<String>,
    pub bathrooms: Option<i64>,
    pub floor: Option<i64>,
    pub total_floors: Option<i64>,
    pub building_age: Option<i64>,
    pub heating: Option<String>,
    pub furnished: bool,
    pub balcony: bool,
    pub elevator: bool,
    pub parking: bool,
    pub site_name: Option<String>,
    pub dues: Option<f64>,
    pub deposit: Option<f64>,
    pub credit_eligible: bool,
    pub swap_eligible: bool,
    pub images: Option<serde_json::Value>,
    pub agent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingType {
    SatilikDaire,
    KiralikDaire,
    SatilikArsa,
    Tarla,
    SatilikIsYeri,
    KiralikIsYeri,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::SatilikDaire => "SATILIK_DAIRE",
            ListingType::KiralikDaire => "KIRALIK_DAIRE",
            ListingType::SatilikArsa => "SATILIK_ARSA",
            ListingType::Tarla => "TARLA",
            ListingType::SatilikIsYeri => "SATILIK_IS_YERI",
            ListingType::KiralikIsYeri => "KIRALIK_IS_YERI",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SATILIK_DAIRE" => Some(ListingType::SatilikDaire),
            "KIRALIK_DAIRE" => Some(ListingType::KiralikDaire),
            "SATILIK_ARSA" => Some(ListingType::SatilikArsa),
            "TARLA" => Some(ListingType::Tarla),
            "SATILIK_IS_YERI" => Some(ListingType::SatilikIsYeri),
            "KIRALIK_IS_YERI" => Some(ListingType::KiralikIsYeri),
            _ => None,
        }
    }
}

impl EnumValue for ListingType {
    fn as_str(&self) -> &'static str {
        ListingType::as_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    Active,
    Passive,
    Sold,
    Rented,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "ACTIVE",
            ListingStatus::Passive => "PASSIVE",
            ListingStatus::Sold => "SOLD",
            ListingStatus::Rented => "RENTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(ListingStatus::Active),
            "PASSIVE" => Some(ListingStatus::Passive),
            "SOLD" => Some(ListingStatus::Sold),
            "RENTED" => Some(ListingStatus::Rented),
            _ => None,
        }
    }
}

impl EnumValue for ListingStatus {
    fn as_str(&self) -> &'static str {
        ListingStatus::as_str(self)
    }
}

static SCHEMA: EntitySchema = EntitySchema {
    entity: "Listing",
    table: "listings",
    id: IdKind::Cuid,
    columns: &[
        ColumnDef { name: "id", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "title", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "description", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "price", ty: ScalarType::Float, nullable: false },
        ColumnDef { name: "listing_type", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "status", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "city", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "district", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "neighborhood", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "address", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "latitude", ty: ScalarType::Float, nullable: true },
        ColumnDef { name: "longitude", ty: ScalarType::Float, nullable: true },
        ColumnDef { name: "area_gross", ty: ScalarType::Int, nullable: true },
        ColumnDef { name: "area_net", ty: ScalarType::Int, nullable: true },
        ColumnDef { name: "rooms", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "bathrooms", ty: ScalarType::Int, nullable: true },
        ColumnDef { name: "floor", ty: ScalarType::Int, nullable: true },
        ColumnDef { name: "total_floors", ty: ScalarType::Int, nullable: true },
        ColumnDef { name: "building_age", ty: ScalarType::Int, nullable: true },
        ColumnDef { name: "heating", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "furnished", ty: ScalarType::Bool, nullable: false },
        ColumnDef { name: "balcony", ty: ScalarType::Bool, nullable: false },
        ColumnDef { name: "elevator", ty: ScalarType::Bool, nullable: false },
        ColumnDef { name: "parking", ty: ScalarType::Bool, nullable: false },
        ColumnDef { name: "site_name", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "dues", ty: ScalarType::Float, nullable: true },
        ColumnDef { name: "deposit", ty: ScalarType::Float, nullable: true },
        ColumnDef { name: "credit_eligible", ty: ScalarType::Bool, nullable: false },
        ColumnDef { name: "swap_eligible", ty: ScalarType::Bool, nullable: false },
        ColumnDef { name: "images", ty: ScalarType::Json, nullable: true },
        ColumnDef { name: "agent_id", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "created_at", ty: ScalarType::DateTime, nullable: false },
        ColumnDef { name: "updated_at", ty: ScalarType::DateTime, nullable: false },
    ],
    uniques: &[],
    relations: &[
        RelationDef {
            name: "agent",
            table: "users",
            kind: RelationKind::BelongsTo,
            local_key: "agent_id",
            foreign_key: "id",
        },
        RelationDef {
            name: "admin_notes",
            table: "admin_notes",
            kind: RelationKind::HasMany,
            local_key: "id",
            foreign_key: "listing_id",
        },
    ],
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListing {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub listing_type: ListingType,
    pub status: ListingStatus,
    pub city: String,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub area_gross: Option<i64>,
    pub area_net: Option<i64>,
    pub rooms: Option<String>,
    pub bathrooms: Option<i64>,
    pub floor: Option<i64>,
    pub total_floors: Option<i64>,
    pub building_age: Option<i64>,
    pub heating: Option<String>,
    pub furnished: bool,
    pub balcony: bool,
    pub elevator: bool,
    pub parking: bool,
    pub site_name: Option<String>,
    pub dues: Option<f64>,
    pub deposit: Option<f64>,
    pub credit_eligible: bool,
    pub swap_eligible: bool,
    pub images: Option<serde_json::Value>,
    pub agent_id: Option<String>,
}

impl CreateListing {
    /// Minimal listing with everything optional left empty.
    pub fn new(
        title: impl Into<String>,
        price: f64,
        listing_type: ListingType,
        city: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            price,
            listing_type,
            status: ListingStatus::Active,
            city: city.into(),
            district: None,
            neighborhood: None,
            address: None,
            latitude: None,
            longitude: None,
            area_gross: None,
            area_net: None,
            rooms: None,
            bathrooms: None,
            floor: None,
            total_floors: None,
            building_age: None,
            heating: None,
            furnished: false,
            balcony: false,
            elevator: false,
            parking: false,
            site_name: None,
            dues: None,
            deposit: None,
            credit_eligible: false,
            swap_eligible: false,
            images: None,
            agent_id: None,
        }
    }
}

impl CreateInput for CreateListing {
    fn values(&self) -> Vec<(&'static str, ScalarValue)> {
        vec![
            ("title", self.title.clone().into()),
            ("description", self.description.clone().into()),
            ("price", self.price.into()),
            ("listing_type", self.listing_type.as_str().into()),
            ("status", self.status.as_str().into()),
            ("city", self.city.clone().into()),
            ("district", self.district.clone().into()),
            ("neighborhood", self.neighborhood.clone().into()),
            ("address", self.address.clone().into()),
            ("latitude", self.latitude.into()),
            ("longitude", self.longitude.into()),
            ("area_gross", self.area_gross.into()),
            ("area_net", self.area_net.into()),
            ("rooms", self.rooms.clone().into()),
            ("bathrooms", self.bathrooms.into()),
            ("floor", self.floor.into()),
            ("total_floors", self.total_floors.into()),
            ("building_age", self.building_age.into()),
            ("heating", self.heating.clone().into()),
            ("furnished", self.furnished.into()),
            ("balcony", self.balcony.into()),
            ("elevator", self.elevator.into()),
            ("parking", self.parking.into()),
            ("site_name", self.site_name.clone().into()),
            ("dues", self.dues.into()),
            ("deposit", self.deposit.into()),
            ("credit_eligible", self.credit_eligible.into()),
            ("swap_eligible", self.swap_eligible.into()),
            ("images", self.images.clone().into()),
            ("agent_id", self.agent_id.clone().into()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateListing {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub listing_type: Option<ListingType>,
    pub status: Option<ListingStatus>,
    pub city: Option<String>,
    pub district: Option<Option<String>>,
    pub neighborhood: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
    pub area_gross: Option<Option<i64>>,
    pub area_net: Option<Option<i64>>,
    pub rooms: Option<Option<String>>,
    pub bathrooms: Option<Option<i64>>,
    pub floor: Option<Option<i64>>,
    pub total_floors: Option<Option<i64>>,
    pub building_age: Option<Option<i64>>,
    pub heating: Option<Option<String>>,
    pub furnished: Option<bool>,
    pub balcony: Option<bool>,
    pub elevator: Option<bool>,
    pub parking: Option<bool>,
    pub site_name: Option<Option<String>>,
    pub dues: Option<Option<f64>>,
    pub deposit: Option<Option<f64>>,
    pub credit_eligible: Option<bool>,
    pub swap_eligible: Option<bool>,
    pub images: Option<Option<serde_json::Value>>,
    pub agent_id: Option<Option<String>>,
}

impl UpdateInput for UpdateListing {
    fn changes(&self) -> Vec<(&'static str, ScalarValue)> {
        let mut out = Vec::new();
        if let Some(v) = &self.title {
            out.push(("title", v.clone().into()));
        }
        if let Some(v) = &self.description {
            out.push(("description", v.clone().into()));
        }
        if let Some(v) = self.price {
            out.push(("price", v.into()));
        }
        if let Some(v) = self.listing_type {
            out.push(("listing_type", v.as_str().into()));
        }
        if let Some(v) = self.status {
            out.push(("status", v.as_str().into()));
        }
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
        if let Some(v) = &self.area_gross {
            out.push(("area_gross", (*v).into()));
        }
        if let Some(v) = &self.area_net {
            out.push(("area_net", (*v).into()));
        }
        if let Some(v) = &self.rooms {
            out.push(("rooms", v.clone().into()));
        }
        if let Some(v) = &self.bathrooms {
            out.push(("bathrooms", (*v).into()));
        }
        if let Some(v) = &self.floor {
            out.push(("floor", (*v).into()));
        }
        if let Some(v) = &self.total_floors {
            out.push(("total_floors", (*v).into()));
        }
        if let Some(v) = &self.building_age {
            out.push(("building_age", (*v).into()));
        }
        if let Some(v) = &self.heating {
            out.push(("heating", v.clone().into()));
        }
        if let Some(v) = self.furnished {
            out.push(("furnished", v.into()));
        }
        if let Some(v) = self.balcony {
            out.push(("balcony", v.into()));
        }
        if let Some(v) = self.elevator {
            out.push(("elevator", v.into()));
        }
        if let Some(v) = self.parking {
            out.push(("parking", v.into()));
        }
        if let Some(v) = &self.site_name {
            out.push(("site_name", v.clone().into()));
        }
        if let Some(v) = &self.dues {
            out.push(("dues", (*v).into()));
        }
        if let Some(v) = &self.deposit {
            out.push(("deposit", (*v).into()));
        }
        if let Some(v) = self.credit_eligible {
            out.push(("credit_eligible", v.into()));
        }
        if let Some(v) = self.swap_eligible {
            out.push(("swap_eligible", v.into()));
        }
        if let Some(v) = &self.images {
            out.push(("images", v.clone().into()));
        }
        if let Some(v) = &self.agent_id {
            out.push(("agent_id", v.clone().into()));
        }
        out
    }
}

impl Entity for Listing {
    type Create = CreateListing;
    type Update = UpdateListing;

    const ENTITY: &'static str = "Listing";

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn from_row(row: &SqliteRow) -> DatabaseResult<Self> {
        Ok(Self {
            id: get_col(row, "id", Self::ENTITY)?,
            title: get_col(row, "title", Self::ENTITY)?,
            description: get_col(row, "description", Self::ENTITY)?,
            price: get_col(row, "price", Self::ENTITY)?,
            listing_type: get_enum(row, "listing_type", Self::ENTITY, ListingType::parse)?,
            status: get_enum(row, "status", Self::ENTITY, ListingStatus::parse)?,
            city: get_col(row, "city", Self::ENTITY)?,
            district: get_col(row, "district", Self::ENTITY)?,
            neighborhood: get_col(row, "neighborhood", Self::ENTITY)?,
            address: get_col(row, "address", Self::ENTITY)?,
            latitude: get_col(row, "latitude", Self::ENTITY)?,
            longitude: get_col(row, "longitude", Self::ENTITY)?,
            area_gross: get_col(row, "area_gross", Self::ENTITY)?,
            area_net: get_col(row, "area_net", Self::ENTITY)?,
            rooms: get_col(row, "rooms", Self::ENTITY)?,
            bathrooms: get_col(row, "bathrooms", Self::ENTITY)?,
            floor: get_col(row, "floor", Self::ENTITY)?,
            total_floors: get_col(row, "total_floors", Self::ENTITY)?,
            building_age: get_col(row, "building_age", Self::ENTITY)?,
            heating: get_col(row, "heating", Self::ENTITY)?,
            furnished: get_col(row, "furnished", Self::ENTITY)?,
            balcony: get_col(row, "balcony", Self::ENTITY)?,
            elevator: get_col(row, "elevator", Self::ENTITY)?,
            parking: get_col(row, "parking", Self::ENTITY)?,
            site_name: get_col(row, "site_name", Self::ENTITY)?,
            dues: get_col(row, "dues", Self::ENTITY)?,
            deposit: get_col(row, "deposit", Self::ENTITY)?,
            credit_eligible: get_col(row, "credit_eligible", Self::ENTITY)?,
            swap_eligible: get_col(row, "swap_eligible", Self::ENTITY)?,
            images: get_json_opt(row, "images", Self::ENTITY)?,
            agent_id: get_col(row, "agent_id", Self::ENTITY)?,
            created_at: get_datetime(row, "created_at", Self::ENTITY)?,
            updated_at: get_datetime(row, "updated_at", Self::ENTITY)?,
        })
    }
}

//! Admin note entity definitions

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

/// Internal annotation attached to a listing. The relation is mandatory and
/// cascades: deleting a listing removes its notes. `created_by` is a plain
/// author string, not a relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminNote {
    pub id: String,
    pub listing_id: String,
    pub content: String,
    pub note_type: AdminNoteType,
    pub priority: AdminNotePriority,
    pub is_private: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminNoteType {
    General,
    Viewing,
    Negotiation,
    Document,
    Reminder,
    Important,
}

impl AdminNoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminNoteType::General => "GENERAL",
            AdminNoteType::Viewing => "VIEWING",
            AdminNoteType::Negotiation => "NEGOTIATION",
            AdminNoteType::Document => "DOCUMENT",
            AdminNoteType::Reminder => "REMINDER",
            AdminNoteType::Important => "IMPORTANT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GENERAL" => Some(AdminNoteType::General),
            "VIEWING" => Some(AdminNoteType::Viewing),
            "NEGOTIATION" => Some(AdminNoteType::Negotiation),
            "DOCUMENT" => Some(AdminNoteType::Document),
            "REMINDER" => Some(AdminNoteType::Reminder),
            "IMPORTANT" => Some(AdminNoteType::Important),
            _ => None,
        }
    }
}

impl EnumValue for AdminNoteType {
    fn as_str(&self) -> &'static str {
        AdminNoteType::as_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminNotePriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl AdminNotePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminNotePriority::Low => "LOW",
            AdminNotePriority::Medium => "MEDIUM",
            AdminNotePriority::High => "HIGH",
            AdminNotePriority::Urgent => "URGENT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(AdminNotePriority::Low),
            "MEDIUM" => Some(AdminNotePriority::Medium),
            "HIGH" => Some(AdminNotePriority::High),
            "URGENT" => Some(AdminNotePriority::Urgent),
            _ => None,
        }
    }
}

impl EnumValue for AdminNotePriority {
    fn as_str(&self) -> &'static str {
        AdminNotePriority::as_str(self)
    }
}

static SCHEMA: EntitySchema = EntitySchema {
    entity: "AdminNote",
    table: "admin_notes",
    id: IdKind::Cuid,
    columns: &[
        ColumnDef { name: "id", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "listing_id", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "content", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "note_type", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "priority", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "is_private", ty: ScalarType::Bool, nullable: false },
        ColumnDef { name: "created_by", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "created_at", ty: ScalarType::DateTime, nullable: false },
        ColumnDef { name: "updated_at", ty: ScalarType::DateTime, nullable: false },
    ],
    uniques: &[],
    relations: &[RelationDef {
        name: "listing",
        table: "listings",
        kind: RelationKind::BelongsTo,
        local_key: "listing_id",
        foreign_key: "id",
    }],
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdminNote {
    pub listing_id: String,
    pub content: String,
    pub note_type: AdminNoteType,
    pub priority: AdminNotePriority,
    pub is_private: bool,
    pub created_by: String,
}

impl CreateInput for CreateAdminNote {
    fn values(&self) -> Vec<(&'static str, ScalarValue)> {
        vec![
            ("listing_id", self.listing_id.clone().into()),
            ("content", self.content.clone().into()),
            ("note_type", self.note_type.as_str().into()),
            ("priority", self.priority.as_str().into()),
            ("is_private", self.is_private.into()),
            ("created_by", self.created_by.clone().into()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAdminNote {
    pub content: Option<String>,
    pub note_type: Option<AdminNoteType>,
    pub priority: Option<AdminNotePriority>,
    pub is_private: Option<bool>,
}

impl UpdateInput for UpdateAdminNote {
    fn changes(&self) -> Vec<(&'static str, ScalarValue)> {
        let mut out = Vec::new();
        if let Some(v) = &self.content {
            out.push(("content", v.clone().into()));
        }
        if let Some(v) = self.note_type {
            out.push(("note_type", v.as_str().into()));
        }
        if let Some(v) = self.priority {
            out.push(("priority", v.as_str().into()));
        }
        if let Some(v) = self.is_private {
            out.push(("is_private", v.into()));
        }
        out
    }
}

impl Entity for AdminNote {
    type Create = CreateAdminNote;
    type Update = UpdateAdminNote;

    const ENTITY: &'static str = "AdminNote";

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn from_row(row: &SqliteRow) -> DatabaseResult<Self> {
        Ok(Self {
            id: get_col(row, "id", Self::ENTITY)?,
            listing_id: get_col(row, "listing_id", Self::ENTITY)?,
            content: get_col(row, "content", Self::ENTITY)?,
            note_type: get_enum(row, "note_type", Self::ENTITY, AdminNoteType::parse)?,
            priority: get_enum(row, "priority", Self::ENTITY, AdminNotePriority::parse)?,
            is_private: get_col(row, "is_private", Self::ENTITY)?,
            created_by: get_col(row, "created_by", Self::ENTITY)?,
            created_at: get_datetime(row, "created_at", Self::ENTITY)?,
            updated_at: get_datetime(row, "updated_at", Self::ENTITY)?,
        })
    }
}

//! Contact message entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;

use super::{get_col, get_datetime, get_enum};
use crate::query::{EnumValue, ScalarValue};
use crate::schema::{
    ColumnDef, CreateInput, Entity, EntitySchema, IdKind, ScalarType, UpdateInput,
};
use crate::types::DatabaseResult;

/// Inbound contact-form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub body: String,
    pub status: ContactMessageStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactMessageStatus {
    New,
    Read,
    Replied,
    Archived,
}

impl ContactMessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactMessageStatus::New => "NEW",
            ContactMessageStatus::Read => "READ",
            ContactMessageStatus::Replied => "REPLIED",
            ContactMessageStatus::Archived => "ARCHIVED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(ContactMessageStatus::New),
            "READ" => Some(ContactMessageStatus::Read),
            "REPLIED" => Some(ContactMessageStatus::Replied),
            "ARCHIVED" => Some(ContactMessageStatus::Archived),
            _ => None,
        }
    }
}

impl EnumValue for ContactMessageStatus {
    fn as_str(&self) -> &'static str {
        ContactMessageStatus::as_str(self)
    }
}

static SCHEMA: EntitySchema = EntitySchema {
    entity: "ContactMessage",
    table: "contact_messages",
    id: IdKind::Cuid,
    columns: &[
        ColumnDef { name: "id", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "name", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "email", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "phone", ty: ScalarType::Text, nullable: true },
        ColumnDef { name: "subject", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "body", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "status", ty: ScalarType::Text, nullable: false },
        ColumnDef { name: "created_at", ty: ScalarType::DateTime, nullable: false },
        ColumnDef { name: "updated_at", ty: ScalarType::DateTime, nullable: false },
    ],
    uniques: &[],
    relations: &[],
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub body: String,
    pub status: ContactMessageStatus,
}

impl CreateInput for CreateContactMessage {
    fn values(&self) -> Vec<(&'static str, ScalarValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("email", self.email.clone().into()),
            ("phone", self.phone.clone().into()),
            ("subject", self.subject.clone().into()),
            ("body", self.body.clone().into()),
            ("status", self.status.as_str().into()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateContactMessage {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub status: Option<ContactMessageStatus>,
}

impl UpdateInput for UpdateContactMessage {
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
        if let Some(v) = &self.subject {
            out.push(("subject", v.clone().into()));
        }
        if let Some(v) = &self.body {
            out.push(("body", v.clone().into()));
        }
        if let Some(v) = self.status {
            out.push(("status", v.as_str().into()));
        }
        out
    }
}

impl Entity for ContactMessage {
    type Create = CreateContactMessage;
    type Update = UpdateContactMessage;

    const ENTITY: &'static str = "ContactMessage";

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn from_row(row: &SqliteRow) -> DatabaseResult<Self> {
        Ok(Self {
            id: get_col(row, "id", Self::ENTITY)?,
            name: get_col(row, "name", Self::ENTITY)?,
            email: get_col(row, "email", Self::ENTITY)?,
            phone: get_col(row, "phone", Self::ENTITY)?,
            subject: get_col(row, "subject", Self::ENTITY)?,
            body: get_col(row, "body", Self::ENTITY)?,
            status: get_enum(row, "status", Self::ENTITY, ContactMessageStatus::parse)?,
            created_at: get_datetime(row, "created_at", Self::ENTITY)?,
            updated_at: get_datetime(row, "updated_at", Self::ENTITY)?,
        })
    }
}

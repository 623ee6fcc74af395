//! Entity definitions: record structs, enums, create/update inputs, and the
//! static schemas the query builder and repository work from.

pub mod admin_note;
pub mod career_application;
pub mod contact_message;
pub mod feature;
pub mod image;
pub mod listing;
pub mod location;
pub mod reference;
pub mod team_member;
pub mod user;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::schema::EntitySchema;
use crate::types::{DatabaseError, DatabaseResult};

pub use admin_note::{AdminNote, AdminNotePriority, AdminNoteType, CreateAdminNote, UpdateAdminNote};
pub use career_application::{CareerApplication, CreateCareerApplication, UpdateCareerApplication};
pub use contact_message::{ContactMessage, ContactMessageStatus, CreateContactMessage, UpdateContactMessage};
pub use feature::{CreateFeature, Feature, UpdateFeature};
pub use image::{CreateImage, Image, UpdateImage};
pub use listing::{CreateListing, Listing, ListingStatus, ListingType, UpdateListing};
pub use location::{CreateLocation, Location, UpdateLocation};
pub use reference::{CreateReference, Reference, UpdateReference};
pub use team_member::{CreateTeamMember, TeamMember, UpdateTeamMember};
pub use user::{CreateUser, UpdateUser, User, UserRole};

/// Schema lookup by table name, used when `include` follows a relation.
pub(crate) fn schema_for_table(table: &str) -> Option<&'static EntitySchema> {
    use crate::schema::Entity;

    [
        User::schema(),
        Listing::schema(),
        Location::schema(),
        Image::schema(),
        Feature::schema(),
        Reference::schema(),
        TeamMember::schema(),
        ContactMessage::schema(),
        CareerApplication::schema(),
        AdminNote::schema(),
    ]
    .into_iter()
    .find(|s| s.table == table)
}

pub(crate) fn get_col<'r, T>(
    row: &'r SqliteRow,
    column: &str,
    entity: &'static str,
) -> DatabaseResult<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(|e| DatabaseError::Decode {
        entity,
        message: format!("{column}: {e}"),
    })
}

pub(crate) fn get_datetime(
    row: &SqliteRow,
    column: &str,
    entity: &'static str,
) -> DatabaseResult<DateTime<Utc>> {
    let raw: String = get_col(row, column, entity)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Decode {
            entity,
            message: format!("{column}: {e}"),
        })
}

pub(crate) fn get_json_opt(
    row: &SqliteRow,
    column: &str,
    entity: &'static str,
) -> DatabaseResult<Option<serde_json::Value>> {
    let raw: Option<String> = get_col(row, column, entity)?;
    match raw {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| DatabaseError::Decode {
                entity,
                message: format!("{column}: invalid JSON: {e}"),
            }),
        None => Ok(None),
    }
}

/// Decode an enum column strictly: an unknown stored value is a decode
/// error, not a silent fallback.
pub(crate) fn get_enum<T>(
    row: &SqliteRow,
    column: &str,
    entity: &'static str,
    parse: fn(&str) -> Option<T>,
) -> DatabaseResult<T> {
    let raw: String = get_col(row, column, entity)?;
    parse(&raw).ok_or_else(|| DatabaseError::Decode {
        entity,
        message: format!("{column}: unknown value `{raw}`"),
    })
}

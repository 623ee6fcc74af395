//! Emlak Database Crate
//!
//! Typed data-access layer for the real-estate listing backend: connection
//! management, migrations, a schema-driven generic repository, and the
//! [`EmlakClient`] facade with raw SQL and interactive transactions.

use sqlx::SqlitePool;

use emlak_config::DatabaseConfig;

pub mod client;
pub mod connection;
pub mod entities;
pub mod migrations;
pub mod query;
pub mod repo;
pub mod schema;
pub mod types;

pub use client::{EmlakClient, RawStatement, TxBehavior, TxOptions};
pub use connection::prepare_database;
pub use migrations::run_migrations;
pub use repo::{AggregateResult, Repository};

// Re-export entities
pub use entities::{
    admin_note::{AdminNote, AdminNotePriority, AdminNoteType, CreateAdminNote, UpdateAdminNote},
    career_application::{CareerApplication, CreateCareerApplication, UpdateCareerApplication},
    contact_message::{
        ContactMessage, ContactMessageStatus, CreateContactMessage, UpdateContactMessage,
    },
    feature::{CreateFeature, Feature, UpdateFeature},
    image::{CreateImage, Image, UpdateImage},
    listing::{CreateListing, Listing, ListingStatus, ListingType, UpdateListing},
    location::{CreateLocation, Location, UpdateLocation},
    reference::{CreateReference, Reference, UpdateReference},
    team_member::{CreateTeamMember, TeamMember, UpdateTeamMember},
    user::{CreateUser, UpdateUser, User, UserRole},
};

// Re-export query inputs
pub use query::{
    Aggregates, BoolFilter, DateTimeFilter, EnumFilter, FieldCondition, FloatFilter, GroupByQuery,
    IntFilter, NullsOrder, OrderBy, Projection, Query, ScalarValue, SortOrder, StringFilter,
    UniqueWhere, Where,
};

// Re-export types
pub use types::{errors::DatabaseError, DatabaseResult};

pub use schema::{Entity, EntitySchema};

/// Re-export commonly used types for convenience
pub use sqlx::Pool;

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite:{}", db_path.display());

        let config = DatabaseConfig {
            url: db_url,
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();
        sqlx::query("SELECT 1").fetch_one(&pool).await.unwrap();
    }
}

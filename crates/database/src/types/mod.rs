//! Shared types and result aliases for the database layer

pub mod errors;

pub use errors::DatabaseError;

pub type DatabaseResult<T> = Result<T, DatabaseError>;

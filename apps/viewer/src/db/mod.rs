//! Local SQLite cache of resolved binders.

pub mod error;
pub mod repository;
pub mod schema;

pub use error::DbError;
pub use repository::{CachedBinder, SqliteRepository};

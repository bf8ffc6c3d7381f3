//! Record store
//!
//! One SQLite file behind an r2d2 pool, plus the versioned schema.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};

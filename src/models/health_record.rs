//! Uploaded health record bookkeeping

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: i64,
    pub user_id: i64,
    pub file_name: String,
    pub file_path: String,
    pub upload_date: String,
}

impl HealthRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            file_name: row.get("file_name")?,
            file_path: row.get("file_path")?,
            upload_date: row.get("upload_date")?,
        })
    }

    pub fn create(conn: &Connection, user_id: i64, file_name: &str, file_path: &str) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO health_records (user_id, file_name, file_path) VALUES (?1, ?2, ?3)",
            params![user_id, file_name, file_path],
        )?;

        let id = conn.last_insert_rowid();
        let result = conn.query_row("SELECT * FROM health_records WHERE id = ?1", [id], Self::from_row);
        match result {
            Ok(record) => Ok(record),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(DbError::NotFound(format!("health record {}", id))),
            Err(e) => Err(e.into()),
        }
    }

    /// Newest upload first
    pub fn list_for_user(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM health_records WHERE user_id = ?1 ORDER BY upload_date DESC, id DESC",
        )?;
        let records = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// The user's most recent record with this stored file name
    pub fn find(conn: &Connection, user_id: i64, file_name: &str) -> DbResult<Option<Self>> {
        let result = conn.query_row(
            "SELECT * FROM health_records WHERE user_id = ?1 AND file_name = ?2 ORDER BY id DESC LIMIT 1",
            params![user_id, file_name],
            Self::from_row,
        );
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

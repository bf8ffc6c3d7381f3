//! Saved due-date calculations

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PregnancyRecord {
    pub id: i64,
    pub user_id: i64,
    pub date_type: String,
    pub input_date: String,
    pub calculated_due_date: String,
    pub created_at: String,
}

impl PregnancyRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date_type: row.get("date_type")?,
            input_date: row.get("input_date")?,
            calculated_due_date: row.get("calculated_due_date")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(
        conn: &Connection,
        user_id: i64,
        date_type: &str,
        input_date: &str,
        calculated_due_date: &str,
    ) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO pregnancy_records (user_id, date_type, input_date, calculated_due_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, date_type, input_date, calculated_due_date],
        )?;

        let id = conn.last_insert_rowid();
        let result = conn.query_row("SELECT * FROM pregnancy_records WHERE id = ?1", [id], Self::from_row);
        match result {
            Ok(record) => Ok(record),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(DbError::NotFound(format!("pregnancy record {}", id))),
            Err(e) => Err(e.into()),
        }
    }

    /// Newest first
    pub fn list_for_user(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM pregnancy_records WHERE user_id = ?1 ORDER BY id DESC")?;
        let records = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

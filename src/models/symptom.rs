//! Symptom chat exchanges
//!
//! Every question and reply is kept. Rows with `in_context` set form the
//! conversation the chatbot sees; clearing the chat only unsets the flag.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symptom {
    pub id: i64,
    pub user_id: i64,
    pub symptom: String,
    pub advice: String,
    pub in_context: bool,
    pub created_at: String,
}

impl Symptom {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            symptom: row.get("symptom")?,
            advice: row.get("advice")?,
            in_context: row.get::<_, i32>("in_context")? != 0,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, user_id: i64, symptom: &str, advice: &str) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO symptoms (user_id, symptom, advice) VALUES (?1, ?2, ?3)",
            params![user_id, symptom, advice],
        )?;

        let id = conn.last_insert_rowid();
        let result = conn.query_row("SELECT * FROM symptoms WHERE id = ?1", [id], Self::from_row);
        match result {
            Ok(symptom) => Ok(symptom),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(DbError::NotFound(format!("symptom {}", id))),
            Err(e) => Err(e.into()),
        }
    }

    /// All exchanges, newest first
    pub fn list_recent(conn: &Connection, user_id: i64, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM symptoms WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let symptoms = stmt
            .query_map(params![user_id, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(symptoms)
    }

    /// The last `limit` in-context exchanges, oldest first
    pub fn context_window(conn: &Connection, user_id: i64, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM (
                SELECT * FROM symptoms WHERE user_id = ?1 AND in_context = 1
                ORDER BY id DESC LIMIT ?2
             ) ORDER BY id ASC",
        )?;
        let symptoms = stmt
            .query_map(params![user_id, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(symptoms)
    }

    /// Drop the user's exchanges from the conversation. Returns rows affected.
    pub fn clear_context(conn: &Connection, user_id: i64) -> DbResult<usize> {
        let rows = conn.execute(
            "UPDATE symptoms SET in_context = 0 WHERE user_id = ?1 AND in_context = 1",
            [user_id],
        )?;
        Ok(rows)
    }
}

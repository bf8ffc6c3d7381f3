//! Hospital appointments

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// Stored `date` + `time` format
pub const SLOT_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Completed => "Completed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "cancelled" | "canceled" => AppointmentStatus::Cancelled,
            "completed" => AppointmentStatus::Completed,
            _ => AppointmentStatus::Scheduled,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub user_id: i64,
    pub hospital_name: String,
    pub specialization: String,
    pub date: String,
    pub time: String,
    pub status: AppointmentStatus,
    pub reminder_sent: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentCreate {
    pub user_id: i64,
    pub hospital_name: String,
    pub specialization: String,
    pub date: String,
    pub time: String,
}

impl Appointment {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            hospital_name: row.get("hospital_name")?,
            specialization: row.get("specialization")?,
            date: row.get("date")?,
            time: row.get("time")?,
            status: AppointmentStatus::from_str(&row.get::<_, String>("status")?),
            reminder_sent: row.get::<_, i32>("reminder_sent")? != 0,
            created_at: row.get("created_at")?,
        })
    }

    /// Start of the appointment, if the stored date and time parse
    pub fn slot(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&format!("{} {}", self.date, self.time), SLOT_FORMAT).ok()
    }

    pub fn create(conn: &Connection, data: &AppointmentCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO appointments (user_id, hospital_name, specialization, date, time, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                data.user_id,
                data.hospital_name,
                data.specialization,
                data.date,
                data.time,
                AppointmentStatus::Scheduled.as_str(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("appointment {}", id)))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let result = conn.query_row("SELECT * FROM appointments WHERE id = ?1", [id], Self::from_row);
        match result {
            Ok(appointment) => Ok(Some(appointment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Soonest first
    pub fn list_for_user(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM appointments WHERE user_id = ?1 ORDER BY date, time, id",
        )?;
        let appointments = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(appointments)
    }

    /// Cancel one of the user's appointments. `None` if it isn't theirs.
    pub fn cancel(conn: &Connection, user_id: i64, id: i64) -> DbResult<Option<Self>> {
        let rows = conn.execute(
            "UPDATE appointments SET status = ?1 WHERE id = ?2 AND user_id = ?3",
            params![AppointmentStatus::Cancelled.as_str(), id, user_id],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        Self::get_by_id(conn, id)
    }

    /// Scheduled, un-reminded appointments starting between `from` and `to`, inclusive.
    /// Stored dates and times are zero-padded, so the slot text compares in time order.
    pub fn awaiting_reminder(conn: &Connection, from: NaiveDateTime, to: NaiveDateTime) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM appointments
             WHERE status = 'Scheduled' AND reminder_sent = 0
               AND (date || ' ' || time) BETWEEN ?1 AND ?2
             ORDER BY date, time, id",
        )?;
        let appointments = stmt
            .query_map(
                params![from.format(SLOT_FORMAT).to_string(), to.format(SLOT_FORMAT).to_string()],
                Self::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(appointments)
    }

    pub fn mark_reminder_sent(conn: &Connection, id: i64) -> DbResult<()> {
        conn.execute("UPDATE appointments SET reminder_sent = 1 WHERE id = ?1", [id])?;
        Ok(())
    }
}

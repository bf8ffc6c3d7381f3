//! Pregnancy profile
//!
//! One row per user. Saving only touches the fields that were supplied.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use rmcp::schemars;
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PregnancyProfile {
    pub id: i64,
    pub user_id: i64,
    pub due_date: Option<String>,
    pub last_menstrual_period: Option<String>,
    pub previous_pregnancies: i64,
    pub live_births: i64,
    pub miscarriages: i64,
    pub current_week: i64,
    pub doctor_name: Option<String>,
    pub doctor_contact: Option<String>,
    pub hospital_name: Option<String>,
    pub hospital_contact: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub pre_existing_conditions: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub diet: Option<String>,
    pub exercise: Option<String>,
    pub smoking_status: Option<String>,
    pub alcohol_consumption: Option<String>,
    pub caffeine_intake: Option<String>,
    pub stress_levels: Option<String>,
    pub emotional_wellbeing: Option<String>,
    pub partner_name: Option<String>,
    pub partner_contact: Option<String>,
    pub emergency_contact: Option<String>,
    pub birth_preferences: Option<String>,
    pub additional_notes: Option<String>,
    pub updated_at: String,
}

/// Profile fields to save; `None` leaves the stored value alone
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ProfileUpdate {
    pub due_date: Option<String>,
    pub last_menstrual_period: Option<String>,
    pub previous_pregnancies: Option<i64>,
    pub live_births: Option<i64>,
    pub miscarriages: Option<i64>,
    pub current_week: Option<i64>,
    pub doctor_name: Option<String>,
    pub doctor_contact: Option<String>,
    pub hospital_name: Option<String>,
    pub hospital_contact: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub pre_existing_conditions: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub diet: Option<String>,
    pub exercise: Option<String>,
    pub smoking_status: Option<String>,
    pub alcohol_consumption: Option<String>,
    pub caffeine_intake: Option<String>,
    pub stress_levels: Option<String>,
    pub emotional_wellbeing: Option<String>,
    pub partner_name: Option<String>,
    pub partner_contact: Option<String>,
    pub emergency_contact: Option<String>,
    pub birth_preferences: Option<String>,
    pub additional_notes: Option<String>,
}

fn text(v: &Option<String>) -> Option<Value> {
    v.clone().map(Value::Text)
}

fn int(v: Option<i64>) -> Option<Value> {
    v.map(Value::Integer)
}

fn real(v: Option<f64>) -> Option<Value> {
    v.map(Value::Real)
}

impl ProfileUpdate {
    /// Supplied fields as (column, value)
    fn assignments(&self) -> Vec<(&'static str, Value)> {
        let all = [
            ("due_date", text(&self.due_date)),
            ("last_menstrual_period", text(&self.last_menstrual_period)),
            ("previous_pregnancies", int(self.previous_pregnancies)),
            ("live_births", int(self.live_births)),
            ("miscarriages", int(self.miscarriages)),
            ("current_week", int(self.current_week)),
            ("doctor_name", text(&self.doctor_name)),
            ("doctor_contact", text(&self.doctor_contact)),
            ("hospital_name", text(&self.hospital_name)),
            ("hospital_contact", text(&self.hospital_contact)),
            ("blood_type", text(&self.blood_type)),
            ("allergies", text(&self.allergies)),
            ("medications", text(&self.medications)),
            ("pre_existing_conditions", text(&self.pre_existing_conditions)),
            ("weight", real(self.weight)),
            ("height", real(self.height)),
            ("diet", text(&self.diet)),
            ("exercise", text(&self.exercise)),
            ("smoking_status", text(&self.smoking_status)),
            ("alcohol_consumption", text(&self.alcohol_consumption)),
            ("caffeine_intake", text(&self.caffeine_intake)),
            ("stress_levels", text(&self.stress_levels)),
            ("emotional_wellbeing", text(&self.emotional_wellbeing)),
            ("partner_name", text(&self.partner_name)),
            ("partner_contact", text(&self.partner_contact)),
            ("emergency_contact", text(&self.emergency_contact)),
            ("birth_preferences", text(&self.birth_preferences)),
            ("additional_notes", text(&self.additional_notes)),
        ];
        all.into_iter()
            .filter_map(|(column, value)| value.map(|v| (column, v)))
            .collect()
    }
}

impl PregnancyProfile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            due_date: row.get("due_date")?,
            last_menstrual_period: row.get("last_menstrual_period")?,
            previous_pregnancies: row.get("previous_pregnancies")?,
            live_births: row.get("live_births")?,
            miscarriages: row.get("miscarriages")?,
            current_week: row.get("current_week")?,
            doctor_name: row.get("doctor_name")?,
            doctor_contact: row.get("doctor_contact")?,
            hospital_name: row.get("hospital_name")?,
            hospital_contact: row.get("hospital_contact")?,
            blood_type: row.get("blood_type")?,
            allergies: row.get("allergies")?,
            medications: row.get("medications")?,
            pre_existing_conditions: row.get("pre_existing_conditions")?,
            weight: row.get("weight")?,
            height: row.get("height")?,
            diet: row.get("diet")?,
            exercise: row.get("exercise")?,
            smoking_status: row.get("smoking_status")?,
            alcohol_consumption: row.get("alcohol_consumption")?,
            caffeine_intake: row.get("caffeine_intake")?,
            stress_levels: row.get("stress_levels")?,
            emotional_wellbeing: row.get("emotional_wellbeing")?,
            partner_name: row.get("partner_name")?,
            partner_contact: row.get("partner_contact")?,
            emergency_contact: row.get("emergency_contact")?,
            birth_preferences: row.get("birth_preferences")?,
            additional_notes: row.get("additional_notes")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn get(conn: &Connection, user_id: i64) -> DbResult<Option<Self>> {
        let result = conn.query_row(
            "SELECT * FROM pregnancy_profile WHERE user_id = ?1",
            [user_id],
            Self::from_row,
        );
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Create the user's profile or update the supplied fields of it
    pub fn save(conn: &Connection, user_id: i64, data: &ProfileUpdate) -> DbResult<Self> {
        let assignments = data.assignments();

        let mut columns = vec!["user_id"];
        let mut values = vec![Value::Integer(user_id)];
        for (column, value) in assignments {
            columns.push(column);
            values.push(value);
        }

        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let mut updates: Vec<String> = columns[1..]
            .iter()
            .map(|c| format!("{c} = excluded.{c}"))
            .collect();
        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "INSERT INTO pregnancy_profile ({}) VALUES ({})
             ON CONFLICT(user_id) DO UPDATE SET {}",
            columns.join(", "),
            placeholders.join(", "),
            updates.join(", ")
        );
        conn.execute(&sql, params_from_iter(values))?;

        Self::get(conn, user_id)?.ok_or_else(|| DbError::NotFound(format!("profile for user {}", user_id)))
    }
}

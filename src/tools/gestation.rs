//! Due date calculator tools

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::calculators::gestation::DATE_FORMAT;
use crate::calculators::{compute_gestation, DatingInput, GestationForm};
use crate::db::Database;
use crate::models::PregnancyRecord;

use super::Outcome;

/// How dates are shown in calculator output, e.g. "September 27, 2024"
const DISPLAY_DATE: &str = "%B %d, %Y";

#[derive(Debug, Serialize)]
pub struct GestationResponse {
    pub due_date: String,
    pub current_week: i64,
    pub trimester: &'static str,
    pub baby_size: String,
    pub conception_date: String,
    pub days_remaining: i64,
    pub message: &'static str,
    /// Set when the calculation was saved to the user's history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PregnancyRecordSummary {
    pub id: i64,
    pub date_type: String,
    pub input_date: String,
    pub calculated_due_date: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ListPregnancyRecordsResponse {
    pub records: Vec<PregnancyRecordSummary>,
    pub total: usize,
}

/// Run the due date calculator as of `today`, saving the result for `user_id` if given
pub fn calculate_due_date(
    db: &Database,
    form: &GestationForm,
    user_id: Option<i64>,
    today: NaiveDate,
) -> Result<Outcome<GestationResponse>, String> {
    let input = match DatingInput::from_form(form) {
        Ok(input) => input,
        Err(e) => {
            debug!("Rejected calculator input: {}", e);
            return Ok(Outcome::failed(e.to_string()));
        }
    };

    let result = match compute_gestation(&input, today) {
        Ok(result) => result,
        Err(e) => return Ok(Outcome::failed(e.to_string())),
    };

    let record_id = match user_id {
        Some(user_id) => {
            let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
            let record = PregnancyRecord::create(
                &conn,
                user_id,
                input.method.as_str(),
                &input.reference_date.format(DATE_FORMAT).to_string(),
                &result.due_date.format(DATE_FORMAT).to_string(),
            )
            .map_err(|e| format!("Failed to save calculation: {}", e))?;
            info!("Saved pregnancy record {} for user {}", record.id, user_id);
            Some(record.id)
        }
        None => None,
    };

    Ok(Outcome::Done(GestationResponse {
        due_date: result.due_date.format(DISPLAY_DATE).to_string(),
        current_week: result.current_week,
        trimester: result.trimester.as_str(),
        baby_size: result.fetal_size_description,
        conception_date: result.conception_date.format(DISPLAY_DATE).to_string(),
        days_remaining: result.days_remaining,
        message: result.week_message,
        record_id,
    }))
}

pub fn list_pregnancy_records(db: &Database, user_id: i64) -> Result<ListPregnancyRecordsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let records = PregnancyRecord::list_for_user(&conn, user_id)
        .map_err(|e| format!("Failed to list records: {}", e))?;

    let records: Vec<_> = records
        .into_iter()
        .map(|r| PregnancyRecordSummary {
            id: r.id,
            date_type: r.date_type,
            input_date: r.input_date,
            calculated_due_date: r.calculated_due_date,
            created_at: r.created_at,
        })
        .collect();

    Ok(ListPregnancyRecordsResponse {
        total: records.len(),
        records,
    })
}

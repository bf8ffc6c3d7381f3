//! Hospital search and appointment tools

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::{info, warn};

use crate::db::Database;
use crate::models::{Appointment, AppointmentCreate, User};
use crate::services::places::specializations;
use crate::services::{Hospital, Mailer, PlacesClient};

/// Reminders go out for appointments starting this many minutes ahead, inclusive
pub const REMINDER_WINDOW_MINUTES: (i64, i64) = (15, 120);

#[derive(Debug, Serialize)]
pub struct FindHospitalsResponse {
    pub source: &'static str,
    pub hospitals: Vec<Hospital>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub appointment: Appointment,
    pub confirmation_sent: bool,
}

#[derive(Debug, Serialize)]
pub struct ListAppointmentsResponse {
    pub appointments: Vec<Appointment>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct SpecializationsResponse {
    pub specializations: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ReminderRunResponse {
    pub checked: usize,
    pub sent: usize,
    pub failed: usize,
    /// No email on file; marked so they are not picked up again
    pub skipped: usize,
}

pub async fn find_hospitals(
    places: &dyn PlacesClient,
    location: &str,
    specialization: &str,
) -> Result<FindHospitalsResponse, String> {
    let location = location.trim();
    if location.is_empty() {
        return Err("Location is required".to_string());
    }

    let hospitals = places
        .find_hospitals(location, specialization.trim())
        .await
        .map_err(|e| format!("Hospital search failed: {}", e))?;
    info!("Found {} hospitals near '{}' via {}", hospitals.len(), location, places.source());

    Ok(FindHospitalsResponse {
        source: places.source(),
        count: hospitals.len(),
        hospitals,
    })
}

pub fn list_specializations() -> SpecializationsResponse {
    SpecializationsResponse {
        specializations: specializations(),
    }
}

/// Book a slot and mail a confirmation when the user has an address.
/// A failed mail is logged; the booking stands.
pub async fn book_appointment(
    db: &Database,
    mailer: &dyn Mailer,
    user_id: i64,
    hospital_name: &str,
    specialization: &str,
    date: &str,
    time: &str,
) -> Result<BookingResponse, String> {
    let hospital_name = hospital_name.trim();
    if hospital_name.is_empty() {
        return Err("Hospital name is required".to_string());
    }
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}'. Use YYYY-MM-DD.", date))?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|_| format!("Invalid time '{}'. Use HH:MM.", time))?;

    let (appointment, user) = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        let user = User::require(&conn, user_id).map_err(|e| e.to_string())?;
        let appointment = Appointment::create(
            &conn,
            &AppointmentCreate {
                user_id,
                hospital_name: hospital_name.to_string(),
                specialization: specialization.trim().to_string(),
                date: date.format("%Y-%m-%d").to_string(),
                time: time.format("%H:%M").to_string(),
            },
        )
        .map_err(|e| format!("Failed to book appointment: {}", e))?;
        (appointment, user)
    };
    info!("Booked appointment {} for user {}", appointment.id, user_id);

    let mut confirmation_sent = false;
    if let Some(email) = user.email.as_deref() {
        let body = format!(
            "Hi {},\n\nYour appointment at {} has been confirmed for {} {}.\n\nThank you!",
            user.name, appointment.hospital_name, appointment.date, appointment.time
        );
        match mailer.send(email, "Appointment Confirmation", &body).await {
            Ok(()) => confirmation_sent = true,
            Err(e) => warn!("Confirmation for appointment {} not sent: {}", appointment.id, e),
        }
    }

    Ok(BookingResponse {
        appointment,
        confirmation_sent,
    })
}

pub fn list_appointments(db: &Database, user_id: i64) -> Result<ListAppointmentsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let appointments = Appointment::list_for_user(&conn, user_id)
        .map_err(|e| format!("Failed to list appointments: {}", e))?;

    Ok(ListAppointmentsResponse {
        total: appointments.len(),
        appointments,
    })
}

/// `None` when the appointment doesn't exist or isn't the user's
pub fn cancel_appointment(db: &Database, user_id: i64, appointment_id: i64) -> Result<Option<Appointment>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let cancelled = Appointment::cancel(&conn, user_id, appointment_id)
        .map_err(|e| format!("Failed to cancel appointment: {}", e))?;
    if let Some(appointment) = &cancelled {
        info!("Cancelled appointment {} for user {}", appointment.id, user_id);
    }
    Ok(cancelled)
}

fn in_reminder_window(slot: NaiveDateTime, now: NaiveDateTime) -> bool {
    let (from, to) = REMINDER_WINDOW_MINUTES;
    slot >= now + Duration::minutes(from) && slot <= now + Duration::minutes(to)
}

/// Send one reminder per scheduled appointment starting soon after `now`.
/// Users without an email are skipped and their appointment is marked as reminded.
pub async fn send_appointment_reminders(
    db: &Database,
    mailer: &dyn Mailer,
    now: NaiveDateTime,
) -> Result<ReminderRunResponse, String> {
    let (from, to) = REMINDER_WINDOW_MINUTES;
    let due: Vec<(Appointment, User)> = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        let pending = Appointment::awaiting_reminder(&conn, now + Duration::minutes(from), now + Duration::minutes(to))
            .map_err(|e| format!("Failed to load appointments: {}", e))?;

        let mut due = Vec::new();
        for appointment in pending {
            // Stored slots have minute precision; `now` may not
            if !appointment.slot().is_some_and(|slot| in_reminder_window(slot, now)) {
                continue;
            }
            let user = User::get_by_id(&conn, appointment.user_id)
                .map_err(|e| format!("Failed to load user: {}", e))?;
            if let Some(user) = user {
                due.push((appointment, user));
            }
        }
        due
    };

    let mut response = ReminderRunResponse {
        checked: due.len(),
        sent: 0,
        failed: 0,
        skipped: 0,
    };

    for (appointment, user) in due {
        let Some(email) = user.email.as_deref() else {
            let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
            Appointment::mark_reminder_sent(&conn, appointment.id)
                .map_err(|e| format!("Failed to update appointment: {}", e))?;
            response.skipped += 1;
            continue;
        };
        let body = format!(
            "Hi {},\n\nThis is a reminder for your appointment at {} on {} at {}.\n\nThank you!",
            user.name, appointment.hospital_name, appointment.date, appointment.time
        );
        match mailer.send(email, "Appointment Reminder", &body).await {
            Ok(()) => {
                let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
                Appointment::mark_reminder_sent(&conn, appointment.id)
                    .map_err(|e| format!("Failed to update appointment: {}", e))?;
                response.sent += 1;
            }
            Err(e) => {
                warn!("Reminder for appointment {} not sent: {}", appointment.id, e);
                response.failed += 1;
            }
        }
    }

    if response.sent > 0 || response.skipped > 0 {
        info!(
            "Sent {} appointment reminders, skipped {} without email",
            response.sent, response.skipped
        );
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::testing::temp_database;
    use crate::services::mail::testing::MemoryMailer;
    use crate::services::OfflineDirectory;
    use crate::tools::accounts;

    fn user_with_email(db: &Database) -> i64 {
        let user = accounts::register(db, "Asha", "555-0100", "pw", Some("asha@example.com"))
            .unwrap()
            .done()
            .unwrap();
        user.user_id
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[tokio::test]
    async fn test_find_hospitals_offline() {
        let found = find_hospitals(&OfflineDirectory, "Springfield", "Gynecologist").await.unwrap();
        assert_eq!(found.source, "Offline directory");
        assert_eq!(found.count, found.hospitals.len());
        assert!(found.count > 0);

        assert!(find_hospitals(&OfflineDirectory, "  ", "Gynecologist").await.is_err());
    }

    #[tokio::test]
    async fn test_booking_sends_confirmation() {
        let (_dir, db) = temp_database();
        let user_id = user_with_email(&db);
        let mailer = MemoryMailer::default();

        let booked = book_appointment(&db, &mailer, user_id, "City General Hospital", "Gynecologist", "2025-06-01", "09:30")
            .await
            .unwrap();
        assert!(booked.confirmation_sent);
        assert_eq!(booked.appointment.date, "2025-06-01");

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "asha@example.com");
        assert_eq!(
            sent[0].body,
            "Hi Asha,\n\nYour appointment at City General Hospital has been confirmed for 2025-06-01 09:30.\n\nThank you!"
        );
    }

    #[tokio::test]
    async fn test_booking_validates_slot() {
        let (_dir, db) = temp_database();
        let user_id = user_with_email(&db);
        let mailer = MemoryMailer::default();

        assert!(book_appointment(&db, &mailer, user_id, "City", "ENT", "06/01/2025", "09:30").await.is_err());
        assert!(book_appointment(&db, &mailer, user_id, "City", "ENT", "2025-06-01", "9.30am").await.is_err());
        assert!(list_appointments(&db, user_id).unwrap().appointments.is_empty());
    }

    #[tokio::test]
    async fn test_reminder_window_and_single_send() {
        let (_dir, db) = temp_database();
        let user_id = user_with_email(&db);
        let mailer = MemoryMailer::default();

        for time in ["10:10", "10:15", "12:00", "12:01"] {
            book_appointment(&db, &mailer, user_id, "City", "ENT", "2025-06-01", time).await.unwrap();
        }
        let confirmations = mailer.sent().len();

        let run = send_appointment_reminders(&db, &mailer, at("2025-06-01 10:00")).await.unwrap();
        assert_eq!(run.sent, 2);

        let reminders: Vec<_> = mailer.sent().into_iter().skip(confirmations).collect();
        assert!(reminders.iter().all(|m| m.subject == "Appointment Reminder"));

        let again = send_appointment_reminders(&db, &mailer, at("2025-06-01 10:00")).await.unwrap();
        assert_eq!(again.sent, 0);
    }

    #[tokio::test]
    async fn test_reminders_without_email_are_skipped_once() {
        let (_dir, db) = temp_database();
        let user_id = accounts::register(&db, "Mira", "555-0101", "pw", None)
            .unwrap()
            .done()
            .unwrap()
            .user_id;
        let mailer = MemoryMailer::default();

        book_appointment(&db, &mailer, user_id, "City", "ENT", "2025-06-01", "10:30").await.unwrap();
        assert!(mailer.sent().is_empty());

        let run = send_appointment_reminders(&db, &mailer, at("2025-06-01 10:00")).await.unwrap();
        assert_eq!((run.checked, run.sent, run.skipped), (1, 0, 1));

        let again = send_appointment_reminders(&db, &mailer, at("2025-06-01 10:05")).await.unwrap();
        assert_eq!(again.checked, 0);
        assert!(mailer.sent().is_empty());
        assert!(list_appointments(&db, user_id).unwrap().appointments[0].reminder_sent);
    }

    #[tokio::test]
    async fn test_past_appointments_are_not_loaded() {
        let (_dir, db) = temp_database();
        let user_id = user_with_email(&db);
        let mailer = MemoryMailer::default();

        book_appointment(&db, &mailer, user_id, "City", "ENT", "2025-05-30", "09:00").await.unwrap();
        book_appointment(&db, &mailer, user_id, "City", "ENT", "2025-06-01", "10:14").await.unwrap();
        book_appointment(&db, &mailer, user_id, "City", "ENT", "2025-06-02", "10:30").await.unwrap();

        let run = send_appointment_reminders(&db, &mailer, at("2025-06-01 10:00")).await.unwrap();
        assert_eq!((run.checked, run.sent, run.failed, run.skipped), (0, 0, 0, 0));
    }

    #[tokio::test]
    async fn test_cancelled_appointments_get_no_reminder() {
        let (_dir, db) = temp_database();
        let user_id = user_with_email(&db);
        let mailer = MemoryMailer::default();

        let booked = book_appointment(&db, &mailer, user_id, "City", "ENT", "2025-06-01", "11:00").await.unwrap();
        assert!(cancel_appointment(&db, user_id + 1, booked.appointment.id).unwrap().is_none());
        assert!(cancel_appointment(&db, user_id, booked.appointment.id).unwrap().is_some());

        let run = send_appointment_reminders(&db, &mailer, at("2025-06-01 10:00")).await.unwrap();
        assert_eq!(run.checked, 0);
    }

    #[test]
    fn test_specialization_list() {
        let list = list_specializations().specializations;
        assert_eq!(list.len(), 21);
        assert!(list.contains(&"Gynecologist"));
    }
}

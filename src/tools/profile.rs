//! Pregnancy profile tools

use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::models::{PregnancyProfile, ProfileUpdate, User};

#[derive(Debug, Serialize)]
pub struct SaveProfileResponse {
    pub success: bool,
    pub profile: PregnancyProfile,
}

/// The user's profile, `None` if they haven't filled one in
pub fn get_profile(db: &Database, user_id: i64) -> Result<Option<PregnancyProfile>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    PregnancyProfile::get(&conn, user_id).map_err(|e| format!("Failed to load profile: {}", e))
}

pub fn save_profile(db: &Database, user_id: i64, fields: &ProfileUpdate) -> Result<SaveProfileResponse, String> {
    for (name, value) in [
        ("previous_pregnancies", fields.previous_pregnancies),
        ("live_births", fields.live_births),
        ("miscarriages", fields.miscarriages),
        ("current_week", fields.current_week),
    ] {
        if value.is_some_and(|v| v < 0) {
            return Err(format!("{} cannot be negative", name));
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    User::require(&conn, user_id).map_err(|e| e.to_string())?;
    let profile = PregnancyProfile::save(&conn, user_id, fields)
        .map_err(|e| format!("Failed to save profile: {}", e))?;
    info!("Saved profile for user {}", user_id);

    Ok(SaveProfileResponse { success: true, profile })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::testing::temp_database;
    use crate::tools::accounts;

    #[test]
    fn test_save_is_partial() {
        let (_dir, db) = temp_database();
        let user_id = accounts::register(&db, "Asha", "555-0100", "pw", None).unwrap().done().unwrap().user_id;
        assert!(get_profile(&db, user_id).unwrap().is_none());

        save_profile(
            &db,
            user_id,
            &ProfileUpdate {
                blood_type: Some("O+".into()),
                current_week: Some(12),
                ..Default::default()
            },
        )
        .unwrap();

        let saved = save_profile(
            &db,
            user_id,
            &ProfileUpdate {
                doctor_name: Some("Dr. Rao".into()),
                ..Default::default()
            },
        )
        .unwrap()
        .profile;

        assert_eq!(saved.blood_type.as_deref(), Some("O+"));
        assert_eq!(saved.current_week, 12);
        assert_eq!(saved.doctor_name.as_deref(), Some("Dr. Rao"));
    }

    #[test]
    fn test_rejects_negative_counts() {
        let (_dir, db) = temp_database();
        let user_id = accounts::register(&db, "Asha", "555-0100", "pw", None).unwrap().done().unwrap().user_id;
        let fields = ProfileUpdate {
            miscarriages: Some(-1),
            ..Default::default()
        };
        assert!(save_profile(&db, user_id, &fields).is_err());
    }

    #[test]
    fn test_unknown_user() {
        let (_dir, db) = temp_database();
        assert!(save_profile(&db, 42, &ProfileUpdate::default()).is_err());
    }
}

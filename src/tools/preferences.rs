//! Display preference tools

use crate::db::Database;
use crate::models::{PreferencesUpdate, User, UserPreferences};

pub fn get_preferences(db: &Database, user_id: i64) -> Result<UserPreferences, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    UserPreferences::get(&conn, user_id).map_err(|e| format!("Failed to load preferences: {}", e))
}

/// Fields left out keep their stored (or default) value
pub fn save_preferences(db: &Database, user_id: i64, update: &PreferencesUpdate) -> Result<UserPreferences, String> {
    if update.theme_color.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err("Theme color cannot be empty".to_string());
    }
    if update.language.as_deref().is_some_and(|l| l.trim().is_empty()) {
        return Err("Language cannot be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    User::require(&conn, user_id).map_err(|e| e.to_string())?;
    UserPreferences::save(&conn, user_id, update).map_err(|e| format!("Failed to save preferences: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::testing::temp_database;
    use crate::tools::accounts;

    #[test]
    fn test_defaults_and_merge() {
        let (_dir, db) = temp_database();
        let user_id = accounts::register(&db, "Asha", "555-0100", "pw", None).unwrap().done().unwrap().user_id;

        let defaults = get_preferences(&db, user_id).unwrap();
        assert!(!defaults.dark_mode);
        assert_eq!(defaults.theme_color, "blue");
        assert_eq!(defaults.language, "en");

        let saved = save_preferences(
            &db,
            user_id,
            &PreferencesUpdate {
                dark_mode: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(saved.dark_mode);
        assert_eq!(saved.theme_color, "blue");
        assert_eq!(get_preferences(&db, user_id).unwrap(), saved);
    }

    #[test]
    fn test_rejects_blank_values() {
        let (_dir, db) = temp_database();
        let user_id = accounts::register(&db, "Asha", "555-0100", "pw", None).unwrap().done().unwrap().user_id;
        let update = PreferencesUpdate {
            language: Some(" ".into()),
            ..Default::default()
        };
        assert!(save_preferences(&db, user_id, &update).is_err());
    }
}

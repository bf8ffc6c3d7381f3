//! Per-user display preferences

use rusqlite::{params, Connection, Row};
use rmcp::schemars;
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: i64,
    pub dark_mode: bool,
    pub theme_color: String,
    pub show_nsfw: bool,
    pub language: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PreferencesUpdate {
    pub dark_mode: Option<bool>,
    pub theme_color: Option<String>,
    pub show_nsfw: Option<bool>,
    pub language: Option<String>,
}

impl UserPreferences {
    pub fn defaults(user_id: i64) -> Self {
        Self {
            user_id,
            dark_mode: false,
            theme_color: "blue".to_string(),
            show_nsfw: false,
            language: "en".to_string(),
        }
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get("user_id")?,
            dark_mode: row.get::<_, i32>("dark_mode")? != 0,
            theme_color: row.get("theme_color")?,
            show_nsfw: row.get::<_, i32>("show_nsfw")? != 0,
            language: row.get("language")?,
        })
    }

    /// Stored preferences, or the defaults if none were saved
    pub fn get(conn: &Connection, user_id: i64) -> DbResult<Self> {
        let result = conn.query_row(
            "SELECT * FROM user_preferences WHERE user_id = ?1",
            [user_id],
            Self::from_row,
        );
        match result {
            Ok(prefs) => Ok(prefs),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Self::defaults(user_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Merge `update` over the current preferences and store the result
    pub fn save(conn: &Connection, user_id: i64, update: &PreferencesUpdate) -> DbResult<Self> {
        let current = Self::get(conn, user_id)?;
        let merged = Self {
            user_id,
            dark_mode: update.dark_mode.unwrap_or(current.dark_mode),
            theme_color: update.theme_color.clone().unwrap_or(current.theme_color),
            show_nsfw: update.show_nsfw.unwrap_or(current.show_nsfw),
            language: update.language.clone().unwrap_or(current.language),
        };

        conn.execute(
            r#"
            INSERT INTO user_preferences (user_id, dark_mode, theme_color, show_nsfw, language)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id) DO UPDATE SET
                dark_mode = excluded.dark_mode,
                theme_color = excluded.theme_color,
                show_nsfw = excluded.show_nsfw,
                language = excluded.language
            "#,
            params![
                merged.user_id,
                merged.dark_mode as i32,
                merged.theme_color,
                merged.show_nsfw as i32,
                merged.language,
            ],
        )?;

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::testing::temp_database;
    use crate::models::{User, UserCreate};

    #[test]
    fn test_defaults_then_partial_save() {
        let (_dir, db) = temp_database();
        db.with_conn(|conn| {
            let user = User::create(
                conn,
                &UserCreate {
                    name: "Ivy".into(),
                    phone: "555-0105".into(),
                    password: "pw".into(),
                    email: None,
                },
            )?
            .unwrap();

            assert_eq!(UserPreferences::get(conn, user.id)?, UserPreferences::defaults(user.id));

            UserPreferences::save(
                conn,
                user.id,
                &PreferencesUpdate {
                    dark_mode: Some(true),
                    ..Default::default()
                },
            )?;
            let saved = UserPreferences::save(
                conn,
                user.id,
                &PreferencesUpdate {
                    language: Some("hi".into()),
                    ..Default::default()
                },
            )?;

            assert!(saved.dark_mode);
            assert_eq!(saved.language, "hi");
            assert_eq!(saved.theme_color, "blue");
            assert_eq!(UserPreferences::get(conn, user.id)?, saved);
            Ok(())
        })
        .unwrap();
    }
}

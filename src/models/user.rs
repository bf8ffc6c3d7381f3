//! User accounts

use rusqlite::{params, Connection, ErrorCode, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub email: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub phone: String,
    pub password: String,
    pub email: Option<String>,
}

impl User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            phone: row.get("phone")?,
            password: row.get("password")?,
            email: row.get("email")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a user. A taken phone number comes back as `Ok(None)`.
    pub fn create(conn: &Connection, data: &UserCreate) -> DbResult<Option<Self>> {
        let inserted = conn.execute(
            "INSERT INTO users (name, phone, password, email) VALUES (?1, ?2, ?3, ?4)",
            params![data.name, data.phone, data.password, data.email],
        );

        match inserted {
            Ok(_) => Self::get_by_id(conn, conn.last_insert_rowid()),
            Err(e) if is_constraint_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let result = conn.query_row("SELECT * FROM users WHERE id = ?1", [id], Self::from_row);
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_by_phone(conn: &Connection, phone: &str) -> DbResult<Option<Self>> {
        let result = conn.query_row("SELECT * FROM users WHERE phone = ?1", [phone], Self::from_row);
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The user with this phone and password, if both match
    pub fn authenticate(conn: &Connection, phone: &str, password: &str) -> DbResult<Option<Self>> {
        Ok(Self::find_by_phone(conn, phone)?.filter(|user| user.password == password))
    }

    pub fn update_email(conn: &Connection, id: i64, email: Option<&str>) -> DbResult<Self> {
        let rows = conn.execute("UPDATE users SET email = ?1 WHERE id = ?2", params![email, id])?;
        if rows == 0 {
            return Err(DbError::NotFound(format!("user {}", id)));
        }
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("user {}", id)))
    }

    /// Fails with `NotFound` for an unknown id
    pub fn require(conn: &Connection, id: i64) -> DbResult<Self> {
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("user {}", id)))
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::testing::temp_database;

    fn new_user(phone: &str) -> UserCreate {
        UserCreate {
            name: "Asha".into(),
            phone: phone.into(),
            password: "secret".into(),
            email: None,
        }
    }

    #[test]
    fn test_create_and_authenticate() {
        let (_dir, db) = temp_database();
        db.with_conn(|conn| {
            let user = User::create(conn, &new_user("555-0100"))?.unwrap();
            assert_eq!(user.name, "Asha");

            assert!(User::authenticate(conn, "555-0100", "secret")?.is_some());
            assert!(User::authenticate(conn, "555-0100", "wrong")?.is_none());
            assert!(User::authenticate(conn, "555-0199", "secret")?.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_duplicate_phone() {
        let (_dir, db) = temp_database();
        db.with_conn(|conn| {
            assert!(User::create(conn, &new_user("555-0100"))?.is_some());
            assert!(User::create(conn, &new_user("555-0100"))?.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_update_email() {
        let (_dir, db) = temp_database();
        db.with_conn(|conn| {
            let user = User::create(conn, &new_user("555-0100"))?.unwrap();
            let updated = User::update_email(conn, user.id, Some("asha@example.com"))?;
            assert_eq!(updated.email.as_deref(), Some("asha@example.com"));
            assert!(matches!(User::update_email(conn, 999, None), Err(DbError::NotFound(_))));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_password_not_serialized() {
        let (_dir, db) = temp_database();
        let user = db.with_conn(|conn| Ok(User::create(conn, &new_user("555-0100"))?.unwrap())).unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
    }
}

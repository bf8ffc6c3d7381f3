//! Account tools

use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::models::{User, UserCreate};

use super::Outcome;

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub name: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateEmailResponse {
    pub success: bool,
    pub user_id: i64,
    pub email: Option<String>,
}

fn non_empty(value: &str, field: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    Ok(trimmed.to_string())
}

/// Create an account. A phone number can only be registered once.
pub fn register(
    db: &Database,
    name: &str,
    phone: &str,
    password: &str,
    email: Option<&str>,
) -> Result<Outcome<RegisterResponse>, String> {
    let data = UserCreate {
        name: non_empty(name, "Name")?,
        phone: non_empty(phone, "Phone")?,
        password: non_empty(password, "Password")?,
        email: email.map(str::trim).filter(|e| !e.is_empty()).map(String::from),
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let created = User::create(&conn, &data).map_err(|e| format!("Failed to register: {}", e))?;

    Ok(match created {
        Some(user) => {
            info!("Registered user {}", user.id);
            Outcome::Done(RegisterResponse {
                user_id: user.id,
                name: user.name,
                message: "Registration successful! Please login.".to_string(),
            })
        }
        None => Outcome::failed("Phone number already registered"),
    })
}

pub fn login(db: &Database, phone: &str, password: &str) -> Result<Outcome<LoginResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = User::authenticate(&conn, phone.trim(), password)
        .map_err(|e| format!("Failed to check credentials: {}", e))?;

    Ok(match user {
        Some(user) => Outcome::Done(LoginResponse {
            user_id: user.id,
            name: user.name,
            email: user.email,
        }),
        None => Outcome::failed("Invalid credentials"),
    })
}

/// Set or clear the address used for appointment mail
pub fn update_email(db: &Database, user_id: i64, email: Option<&str>) -> Result<UpdateEmailResponse, String> {
    let email = email.map(str::trim).filter(|e| !e.is_empty());
    if let Some(address) = email {
        if !address.contains('@') {
            return Err(format!("'{}' is not an email address", address));
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = User::update_email(&conn, user_id, email).map_err(|e| format!("Failed to update email: {}", e))?;

    Ok(UpdateEmailResponse {
        success: true,
        user_id: user.id,
        email: user.email,
    })
}

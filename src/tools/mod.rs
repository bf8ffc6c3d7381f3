//! Bloom tools
//!
//! One module per feature. Each function takes the database and any
//! collaborators it needs and returns a serializable response. `Err` is
//! reserved for failures the caller cannot fix by changing its input.

use serde::Serialize;

pub mod accounts;
pub mod appointments;
pub mod diet;
pub mod exercises;
pub mod gestation;
pub mod preferences;
pub mod profile;
pub mod records;
pub mod status;
pub mod symptoms;
pub mod weight_gain;

/// A result the user sees either way: the value, or `{"error": "..."}`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Done(T),
    Failed { error: String },
}

impl<T> Outcome<T> {
    pub fn failed(message: impl Into<String>) -> Self {
        Outcome::Failed { error: message.into() }
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Done(_) => None,
            Outcome::Failed { error } => Some(error),
        }
    }
}

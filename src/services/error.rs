//! Errors from the external collaborators

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned status {status}: {message}")]
    Api {
        service: &'static str,
        status: String,
        message: String,
    },

    #[error("Unexpected response: {0}")]
    Parse(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

//! External collaborators
//!
//! Chat completion, hospital lookup and outbound mail sit behind traits so the
//! server can be wired with the real adapters or with in-memory ones.

pub mod chat;
pub mod error;
pub mod mail;
pub mod places;

pub use chat::{ChatClient, ChatRole, ChatTurn, GeminiClient};
pub use error::{ServiceError, ServiceResult};
pub use mail::{LogMailer, Mailer};
pub use places::{GoogleMapsPlaces, Hospital, OfflineDirectory, PlacesClient};

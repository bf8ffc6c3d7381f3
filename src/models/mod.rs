//! Stored records
//!
//! One struct per table, each with its own CRUD on a borrowed connection.

mod appointment;
mod exercise;
mod health_record;
mod preferences;
mod pregnancy_record;
mod profile;
mod symptom;
mod user;

pub use appointment::{Appointment, AppointmentCreate, AppointmentStatus, SLOT_FORMAT};
pub use exercise::Exercise;
pub use health_record::HealthRecord;
pub use preferences::{PreferencesUpdate, UserPreferences};
pub use pregnancy_record::PregnancyRecord;
pub use profile::{PregnancyProfile, ProfileUpdate};
pub use symptom::Symptom;
pub use user::{User, UserCreate};

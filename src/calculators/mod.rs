//! Pregnancy calculators
//!
//! Pure functions over plain values: no storage, no network.

pub mod diet;
pub mod error;
pub mod fetal_size;
pub mod form;
pub mod gestation;
pub mod weight_gain;

pub use diet::{compose_diet_plan, Cuisine, DietPreferences, DietType, HealthCondition, MealPlan, MealSlot};
pub use error::{CalcError, CalcResult};
pub use fetal_size::FetalSize;
pub use form::FormValue;
pub use gestation::{compute_gestation, DatingInput, DatingMethod, GestationForm, GestationResult, Trimester};
pub use weight_gain::{compute_weight_gain, BmiCategory, BodyMetrics, WeightGainForm, WeightGainResult};

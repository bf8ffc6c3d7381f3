//! Bloom MCP Server Implementation
//!
//! Implements the MCP server with all Bloom tools.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::calculators::{FormValue, GestationForm, WeightGainForm};
use crate::db::Database;
use crate::models::{PreferencesUpdate, ProfileUpdate};
use crate::services::{ChatClient, Mailer, PlacesClient};
use crate::tools::status::StatusTracker;
use crate::tools::{
    accounts, appointments, diet, exercises, gestation, preferences, profile, records, symptoms, weight_gain,
};

/// Everything the server needs, built once at startup
pub struct BloomContext {
    pub database_path: PathBuf,
    pub database: Database,
    pub upload_dir: PathBuf,
    pub context_awareness: bool,
    /// `None` when no chat API key is configured
    pub chat: Option<Arc<dyn ChatClient>>,
    pub places: Arc<dyn PlacesClient>,
    pub mailer: Arc<dyn Mailer>,
}

/// Bloom MCP Service
#[derive(Clone)]
pub struct BloomService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    upload_dir: PathBuf,
    context_awareness: bool,
    chat: Option<Arc<dyn ChatClient>>,
    places: Arc<dyn PlacesClient>,
    mailer: Arc<dyn Mailer>,
    tool_router: ToolRouter<BloomService>,
}

impl BloomService {
    pub fn new(context: BloomContext) -> Self {
        let tracker = StatusTracker::new(
            context.database_path,
            context.chat.is_some(),
            context.places.source(),
        );
        Self {
            status_tracker: Arc::new(Mutex::new(tracker)),
            database: context.database,
            upload_dir: context.upload_dir,
            context_awareness: context.context_awareness,
            chat: context.chat,
            places: context.places,
            mailer: context.mailer,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(what: &str, key: &str, value: serde_json::Value) -> Result<CallToolResult, McpError> {
    let mut body = serde_json::Map::new();
    body.insert("error".to_string(), format!("{} not found", what).into());
    body.insert(key.to_string(), value);
    to_json(&body)
}

// ============================================================================
// Account Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RegisterUserParams {
    pub name: String,
    pub phone: String,
    pub password: String,
    /// Needed for appointment confirmations and reminders
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LoginUserParams {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateEmailParams {
    pub user_id: i64,
    /// New address; omit or send empty to clear
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserParams {
    pub user_id: i64,
}

// ============================================================================
// Calculator Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateDueDateParams {
    /// LMP, Conception Date, Due Date, IVF Transfer Date or Ultrasound
    pub date_type: String,
    /// YYYY-MM-DD
    pub input_date: String,
    /// Ultrasound: gestational weeks at the scan (default 0)
    pub us_weeks: Option<FormValue>,
    /// Ultrasound: extra days at the scan (default 0)
    pub us_days: Option<FormValue>,
    /// LMP: cycle length in days (default 28)
    pub cycle_length: Option<FormValue>,
    /// IVF: embryo age in days (default 3)
    pub embryo_age: Option<FormValue>,
    /// Save the result to this user's history
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateDietPlanParams {
    /// First Trimester, Second Trimester or Third Trimester
    #[serde(default)]
    pub trimester: String,
    /// None, Gestational Diabetes, Hypertension, Anemia, Nausea or Constipation
    #[serde(default)]
    pub condition: String,
    /// Vegetarian, Non-Vegetarian or Vegan
    #[serde(default)]
    pub diet: String,
    /// Indian, Mediterranean, Western or Asian
    #[serde(default)]
    pub culture: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateWeightGainParams {
    pub height_ft: Option<FormValue>,
    pub height_in: Option<FormValue>,
    /// Pounds
    pub pre_pregnancy_weight: Option<FormValue>,
    /// Pounds
    pub current_weight: Option<FormValue>,
    /// Current gestational week
    pub week: Option<FormValue>,
    /// Expecting twins
    pub twins: Option<FormValue>,
}

// ============================================================================
// Health Record Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UploadHealthRecordParams {
    pub user_id: i64,
    /// Path of a local file to copy in
    pub source_path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetHealthRecordParams {
    pub user_id: i64,
    /// Stored name as returned by list_health_records
    pub file_name: String,
}

// ============================================================================
// Symptom Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SymptomChatParams {
    pub user_id: i64,
    pub message: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListSymptomsParams {
    pub user_id: i64,
    #[serde(default = "default_symptom_limit")]
    pub limit: i64,
}

fn default_symptom_limit() -> i64 { 20 }

// ============================================================================
// Appointment Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FindHospitalsParams {
    /// City, neighbourhood or address
    pub location: String,
    /// One of list_specializations; empty for any hospital
    #[serde(default)]
    pub specialization: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BookAppointmentParams {
    pub user_id: i64,
    pub hospital_name: String,
    #[serde(default)]
    pub specialization: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM, 24 hour
    pub time: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CancelAppointmentParams {
    pub user_id: i64,
    pub appointment_id: i64,
}

// ============================================================================
// Profile, Preference and Exercise Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveProfileParams {
    pub user_id: i64,
    /// Only the fields sent are changed
    #[serde(flatten)]
    pub fields: ProfileUpdate,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SavePreferencesParams {
    pub user_id: i64,
    #[serde(flatten)]
    pub update: PreferencesUpdate,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListExercisesParams {
    /// First, Second or Third; omit for the whole catalogue
    pub trimester: Option<String>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl BloomService {
    // --- Status ---

    #[tool(description = "Get the current status of the Bloom service including build info, database status, and process information")]
    async fn bloom_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get the usage guide for the Bloom tools. Call this first when unsure which tool to use or what a field means.")]
    fn bloom_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(INSTRUCTIONS)]))
    }

    // --- Accounts ---

    #[tool(description = "Register a new user. A phone number can only be registered once.")]
    fn register_user(&self, Parameters(p): Parameters<RegisterUserParams>) -> Result<CallToolResult, McpError> {
        let result = accounts::register(&self.database, &p.name, &p.phone, &p.password, p.email.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Log in with phone and password; returns the user_id the other tools take")]
    fn login_user(&self, Parameters(p): Parameters<LoginUserParams>) -> Result<CallToolResult, McpError> {
        let result = accounts::login(&self.database, &p.phone, &p.password)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Set or clear the email address used for appointment confirmations and reminders")]
    fn update_email(&self, Parameters(p): Parameters<UpdateEmailParams>) -> Result<CallToolResult, McpError> {
        let result = accounts::update_email(&self.database, p.user_id, p.email.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Calculators ---

    #[tool(description = "Calculate due date, current week, trimester and baby size from an LMP, conception, due, IVF transfer or ultrasound date. Pass user_id to save the result.")]
    fn calculate_due_date(&self, Parameters(p): Parameters<CalculateDueDateParams>) -> Result<CallToolResult, McpError> {
        let form = GestationForm {
            date_type: Some(p.date_type),
            input_date: Some(p.input_date),
            us_weeks: p.us_weeks,
            us_days: p.us_days,
            cycle_length: p.cycle_length,
            embryo_age: p.embryo_age,
        };
        let today = Local::now().date_naive();
        let result = gestation::calculate_due_date(&self.database, &form, p.user_id, today)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List a user's saved due date calculations, newest first")]
    fn list_pregnancy_records(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = gestation::list_pregnancy_records(&self.database, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Build a day of meals from trimester, health condition, diet type and cuisine. Later choices override earlier ones for the same meal.")]
    fn generate_diet_plan(&self, Parameters(p): Parameters<GenerateDietPlanParams>) -> Result<CallToolResult, McpError> {
        to_json(&diet::generate_diet_plan(&p.trimester, &p.condition, &p.diet, &p.culture))
    }

    #[tool(description = "List the trimester, condition, diet and cuisine labels generate_diet_plan accepts")]
    fn diet_options(&self) -> Result<CallToolResult, McpError> {
        to_json(&diet::diet_options())
    }

    #[tool(description = "Calculate BMI and the recommended and expected pregnancy weight gain. Heights in feet/inches, weights in pounds.")]
    fn calculate_weight_gain(&self, Parameters(p): Parameters<CalculateWeightGainParams>) -> Result<CallToolResult, McpError> {
        let form = WeightGainForm {
            height_ft: p.height_ft,
            height_in: p.height_in,
            current_weight: p.current_weight,
            pre_pregnancy_weight: p.pre_pregnancy_weight,
            week: p.week,
            twins: p.twins,
        };
        to_json(&weight_gain::calculate_weight_gain(&form))
    }

    // --- Health Records ---

    #[tool(description = "Copy a local file into the user's health records")]
    fn upload_health_record(&self, Parameters(p): Parameters<UploadHealthRecordParams>) -> Result<CallToolResult, McpError> {
        let source = PathBuf::from(&p.source_path);
        let result = records::upload_health_record(&self.database, &self.upload_dir, p.user_id, &source)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List a user's uploaded health records")]
    fn list_health_records(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = records::list_health_records(&self.database, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get where one of the user's health records is stored")]
    fn get_health_record(&self, Parameters(p): Parameters<GetHealthRecordParams>) -> Result<CallToolResult, McpError> {
        let result = records::get_health_record(&self.database, p.user_id, &p.file_name)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(location) => to_json(&location),
            None => not_found("Health record", "file_name", p.file_name.into()),
        }
    }

    // --- Symptoms ---

    #[tool(description = "Ask the symptom checker about a pregnancy symptom. Answers are general information, not medical advice.")]
    async fn symptom_chat(&self, Parameters(p): Parameters<SymptomChatParams>) -> Result<CallToolResult, McpError> {
        let result = symptoms::symptom_chat(
            &self.database,
            self.chat.as_deref(),
            self.context_awareness,
            p.user_id,
            &p.message,
        )
        .await
        .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Start a new symptom conversation. Past questions stay in list_symptoms.")]
    fn clear_symptom_chat(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = symptoms::clear_symptom_chat(&self.database, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List a user's past symptom questions and answers, newest first")]
    fn list_symptoms(&self, Parameters(p): Parameters<ListSymptomsParams>) -> Result<CallToolResult, McpError> {
        let result = symptoms::list_symptoms(&self.database, p.user_id, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Appointments ---

    #[tool(description = "List the specializations find_hospitals and book_appointment accept")]
    fn list_specializations(&self) -> Result<CallToolResult, McpError> {
        to_json(&appointments::list_specializations())
    }

    #[tool(description = "Find hospitals near a location, optionally for one specialization")]
    async fn find_hospitals(&self, Parameters(p): Parameters<FindHospitalsParams>) -> Result<CallToolResult, McpError> {
        let result = appointments::find_hospitals(self.places.as_ref(), &p.location, &p.specialization)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Book a hospital appointment. Sends a confirmation email when the user has one.")]
    async fn book_appointment(&self, Parameters(p): Parameters<BookAppointmentParams>) -> Result<CallToolResult, McpError> {
        let result = appointments::book_appointment(
            &self.database,
            self.mailer.as_ref(),
            p.user_id,
            &p.hospital_name,
            &p.specialization,
            &p.date,
            &p.time,
        )
        .await
        .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List a user's appointments, soonest first")]
    fn list_appointments(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = appointments::list_appointments(&self.database, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Cancel one of the user's appointments")]
    fn cancel_appointment(&self, Parameters(p): Parameters<CancelAppointmentParams>) -> Result<CallToolResult, McpError> {
        let result = appointments::cancel_appointment(&self.database, p.user_id, p.appointment_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(appointment) => to_json(&appointment),
            None => not_found("Appointment", "appointment_id", p.appointment_id.into()),
        }
    }

    #[tool(description = "Email reminders for appointments starting in the next 15 to 120 minutes. Each appointment is reminded once.")]
    async fn send_appointment_reminders(&self) -> Result<CallToolResult, McpError> {
        let now = Local::now().naive_local();
        let result = appointments::send_appointment_reminders(&self.database, self.mailer.as_ref(), now)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Profile, Preferences, Exercises ---

    #[tool(description = "Get the user's pregnancy profile")]
    fn get_profile(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = profile::get_profile(&self.database, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(profile) => to_json(&profile),
            None => not_found("Profile", "user_id", p.user_id.into()),
        }
    }

    #[tool(description = "Create or update the user's pregnancy profile. Only the fields sent are changed.")]
    fn save_profile(&self, Parameters(p): Parameters<SaveProfileParams>) -> Result<CallToolResult, McpError> {
        let result = profile::save_profile(&self.database, p.user_id, &p.fields)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get the user's display preferences (defaults if never saved)")]
    fn get_preferences(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = preferences::get_preferences(&self.database, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Save display preferences. Fields left out keep their current value.")]
    fn save_preferences(&self, Parameters(p): Parameters<SavePreferencesParams>) -> Result<CallToolResult, McpError> {
        let result = preferences::save_preferences(&self.database, p.user_id, &p.update)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List prenatal exercises, optionally only those suited to a trimester")]
    fn list_exercises(&self, Parameters(p): Parameters<ListExercisesParams>) -> Result<CallToolResult, McpError> {
        let result = exercises::list_exercises(&self.database, p.trimester.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for BloomService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "bloom".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Bloom Pregnancy Companion".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Bloom - pregnancy dating, diet plans, weight gain, symptom questions and hospital appointments. \
                 IMPORTANT: Call bloom_instructions for the usage guide. \
                 Accounts: register_user/login_user/update_email; most tools take the returned user_id. \
                 Calculators: calculate_due_date, list_pregnancy_records, generate_diet_plan, diet_options, calculate_weight_gain. \
                 Records: upload/list/get_health_record. \
                 Symptoms: symptom_chat, clear_symptom_chat, list_symptoms. \
                 Appointments: list_specializations, find_hospitals, book/list/cancel_appointment, send_appointment_reminders. \
                 Profile: get/save_profile, get/save_preferences, list_exercises."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::testing::temp_database;
    use crate::services::mail::testing::MemoryMailer;
    use crate::services::OfflineDirectory;

    fn service(db: Database, dir: &std::path::Path) -> BloomService {
        BloomService::new(BloomContext {
            database_path: dir.join("bloom.db"),
            database: db,
            upload_dir: dir.join("uploads"),
            context_awareness: false,
            chat: None,
            places: Arc::new(OfflineDirectory),
            mailer: Arc::new(MemoryMailer::default()),
        })
    }

    #[test]
    fn test_server_info() {
        let (dir, db) = temp_database();
        let info = service(db, dir.path()).get_info();
        assert_eq!(info.server_info.name, "bloom");
        assert!(info.instructions.unwrap().contains("bloom_instructions"));
    }

    #[test]
    fn test_every_tool_is_routed() {
        let (dir, db) = temp_database();
        let service = service(db, dir.path());
        let names: Vec<String> = service.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        for tool in [
            "bloom_status",
            "calculate_due_date",
            "generate_diet_plan",
            "calculate_weight_gain",
            "symptom_chat",
            "find_hospitals",
            "book_appointment",
            "send_appointment_reminders",
            "save_profile",
            "list_exercises",
        ] {
            assert!(names.iter().any(|n| n == tool), "{} not routed", tool);
        }
    }

    fn documented_labels(schema: &serde_json::Map<String, serde_json::Value>, field: &str) -> Vec<String> {
        let description = schema["properties"][field]["description"].as_str().unwrap();
        let labels = description.split(';').next().unwrap();
        labels
            .split(", ")
            .flat_map(|part| part.split(" or "))
            .map(|label| label.trim().to_string())
            .collect()
    }

    #[test]
    fn test_documented_labels_are_accepted() {
        use crate::calculators::diet::{Cuisine, DietType, HealthCondition};
        use crate::calculators::gestation::Trimester;

        let (dir, db) = temp_database();
        let tools = service(db, dir.path()).tool_router.list_all();
        let schema = |name: &str| tools.iter().find(|t| t.name == name).unwrap().input_schema.clone();

        let diet_plan = schema("generate_diet_plan");
        let conditions = documented_labels(&diet_plan, "condition");
        assert_eq!(conditions.len(), HealthCondition::ALL.len());
        for label in &conditions {
            assert!(HealthCondition::from_str(label).is_some(), "condition '{}'", label);
        }
        let cuisines = documented_labels(&diet_plan, "culture");
        assert_eq!(cuisines.len(), Cuisine::ALL.len());
        for label in &cuisines {
            assert!(Cuisine::from_str(label).is_some(), "culture '{}'", label);
        }
        for label in documented_labels(&diet_plan, "diet") {
            assert!(DietType::from_str(&label).is_some(), "diet '{}'", label);
        }
        for label in documented_labels(&diet_plan, "trimester") {
            assert!(Trimester::from_str(&label).is_some(), "trimester '{}'", label);
        }
        for label in documented_labels(&schema("list_exercises"), "trimester") {
            assert!(Trimester::from_str(&label).is_some(), "exercise trimester '{}'", label);
        }
    }

    #[test]
    fn test_form_params_accept_numbers_and_text() {
        let params: CalculateWeightGainParams = serde_json::from_value(serde_json::json!({
            "height_ft": "5",
            "height_in": 5,
            "pre_pregnancy_weight": 130,
            "current_weight": "140.5",
            "week": 20,
            "twins": "on"
        }))
        .unwrap();
        assert_eq!(params.height_ft, Some(FormValue::Text("5".into())));
        assert_eq!(params.height_in, Some(FormValue::Number(5.0)));
    }

    #[test]
    fn test_profile_params_flatten() {
        let params: SaveProfileParams = serde_json::from_value(serde_json::json!({
            "user_id": 3,
            "blood_type": "A-",
            "current_week": 14
        }))
        .unwrap();
        assert_eq!(params.user_id, 3);
        assert_eq!(params.fields.blood_type.as_deref(), Some("A-"));
        assert_eq!(params.fields.current_week, Some(14));
    }
}

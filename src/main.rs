//! Bloom
//!
//! An MCP server for pregnancy tracking, diet plans and appointments.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bloom::build_info;
use bloom::config::Config;
use bloom::db::{self, Database};
use bloom::mcp::{BloomContext, BloomService};
use bloom::services::{
    ChatClient, GeminiClient, GoogleMapsPlaces, LogMailer, Mailer, OfflineDirectory, PlacesClient,
};
use bloom::tools::appointments;

/// How often the background task looks for appointments to remind
const REMINDER_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("bloom=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = Config::load();
    eprintln!("Database path: {}", config.database_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::create_dir_all(&config.upload_dir)?;

    eprintln!("Initializing database...");
    let database = Database::open_migrated(&config.database_path)?;
    database.with_conn(|conn| {
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let chat: Option<Arc<dyn ChatClient>> = config
        .gemini_api_key
        .as_ref()
        .map(|key| Arc::new(GeminiClient::new(key.clone(), config.gemini_model.clone())) as Arc<dyn ChatClient>);

    let places: Arc<dyn PlacesClient> = match &config.google_maps_api_key {
        Some(key) => Arc::new(GoogleMapsPlaces::new(key.clone())),
        None => Arc::new(OfflineDirectory),
    };

    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new(config.sender_email.clone()));

    // Appointment reminders run for as long as the server does
    let reminder_db = database.clone();
    let reminder_mailer = Arc::clone(&mailer);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(REMINDER_INTERVAL);
        loop {
            ticker.tick().await;
            let now = Local::now().naive_local();
            match appointments::send_appointment_reminders(&reminder_db, reminder_mailer.as_ref(), now).await {
                Ok(run) if run.sent > 0 || run.failed > 0 || run.skipped > 0 => {
                    info!("Reminder run: {} sent, {} failed, {} skipped", run.sent, run.failed, run.skipped)
                }
                Ok(_) => {}
                Err(e) => warn!("Reminder run failed: {}", e),
            }
        }
    });

    let service = BloomService::new(BloomContext {
        database_path: config.database_path.clone(),
        database,
        upload_dir: config.upload_dir.clone(),
        context_awareness: config.context_awareness,
        chat,
        places,
        mailer,
    });

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}

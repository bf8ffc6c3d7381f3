//! Symptom checker tools

use serde::Serialize;
use tracing::{info, warn};

use crate::db::Database;
use crate::models::{Symptom, User};
use crate::services::{ChatClient, ChatTurn};

/// Exchanges sent as context: five question/answer pairs, ten turns
pub const CONTEXT_EXCHANGES: i64 = 5;
/// Exchanges returned with each reply: twenty turns
pub const HISTORY_EXCHANGES: i64 = 10;

pub const NOT_CONFIGURED_REPLY: &str = "AI service not properly configured. Please contact support.";
pub const SERVICE_FAILURE_REPLY: &str =
    "I apologize, but I'm having trouble connecting to the AI service right now. Please try again in a few moments.";
pub const EMPTY_REPLY: &str =
    "I'm sorry, I couldn't generate a proper response. Please try again or contact support if the issue persists.";

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ClearChatResponse {
    pub success: bool,
    pub cleared: usize,
}

#[derive(Debug, Serialize)]
pub struct SymptomSummary {
    pub id: i64,
    pub symptom: String,
    pub advice: String,
    pub in_context: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ListSymptomsResponse {
    pub symptoms: Vec<SymptomSummary>,
    pub total: usize,
}

fn turns(exchanges: &[Symptom]) -> Vec<ChatTurn> {
    exchanges
        .iter()
        .flat_map(|s| [ChatTurn::user(s.symptom.clone()), ChatTurn::assistant(s.advice.clone())])
        .collect()
}

/// Ask the chatbot about a symptom and store the exchange.
///
/// With `context_awareness` the recent conversation goes along with the
/// question. Chat failures never surface as errors; the user gets a canned reply.
pub async fn symptom_chat(
    db: &Database,
    chat: Option<&dyn ChatClient>,
    context_awareness: bool,
    user_id: i64,
    message: &str,
) -> Result<ChatResponse, String> {
    let message = message.trim();
    if message.is_empty() {
        return Err("No message provided".to_string());
    }

    let context = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        User::require(&conn, user_id).map_err(|e| e.to_string())?;
        if context_awareness {
            let window = Symptom::context_window(&conn, user_id, CONTEXT_EXCHANGES)
                .map_err(|e| format!("Failed to load conversation: {}", e))?;
            turns(&window)
        } else {
            Vec::new()
        }
    };

    let reply = match chat {
        None => NOT_CONFIGURED_REPLY.to_string(),
        Some(client) => match client.complete(message, &context).await {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!("Chat service error: {}", e);
                SERVICE_FAILURE_REPLY.to_string()
            }
        },
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Symptom::create(&conn, user_id, message, &reply).map_err(|e| format!("Failed to save symptom: {}", e))?;
    info!("Answered symptom question for user {} ({} context turns)", user_id, context.len());

    let history = Symptom::context_window(&conn, user_id, HISTORY_EXCHANGES)
        .map_err(|e| format!("Failed to load conversation: {}", e))?;

    Ok(ChatResponse {
        reply,
        history: turns(&history),
    })
}

/// Start a fresh conversation. Past exchanges stay listed in the history.
pub fn clear_symptom_chat(db: &Database, user_id: i64) -> Result<ClearChatResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let cleared = Symptom::clear_context(&conn, user_id).map_err(|e| format!("Failed to clear chat: {}", e))?;
    Ok(ClearChatResponse { success: true, cleared })
}

pub fn list_symptoms(db: &Database, user_id: i64, limit: i64) -> Result<ListSymptomsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let symptoms = Symptom::list_recent(&conn, user_id, limit.max(1))
        .map_err(|e| format!("Failed to list symptoms: {}", e))?;

    let symptoms: Vec<_> = symptoms
        .into_iter()
        .map(|s| SymptomSummary {
            id: s.id,
            symptom: s.symptom,
            advice: s.advice,
            in_context: s.in_context,
            created_at: s.created_at,
        })
        .collect();

    Ok(ListSymptomsResponse {
        total: symptoms.len(),
        symptoms,
    })
}

//! Chat completion for the symptom checker

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::error::{ServiceError, ServiceResult};

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const SYSTEM_INSTRUCTION: &str = "You are a helpful medical assistant specializing in pregnancy-related symptoms.
Provide helpful information, potential causes, and general guidance. Include
a disclaimer that this is general information and the person should consult with
their healthcare provider for personalized medical advice.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Answer `message`, given the earlier turns (empty for a standalone question)
    async fn complete(&self, message: &str, history: &[ChatTurn]) -> ServiceResult<String>;
}

/// Prompt text for a question. With no history the standalone template is
/// used; otherwise the prior turns are listed before the current question.
pub fn build_prompt(message: &str, history: &[ChatTurn]) -> String {
    if history.is_empty() {
        return format!(
            "You are a helpful medical assistant specializing in pregnancy-related symptoms.
Please provide information about the following pregnancy symptom or concern:

{message}

Provide helpful information, potential causes, and general guidance. Include
a disclaimer that this is general information and the person should consult with
their healthcare provider for personalized medical advice."
        );
    }

    let transcript = history
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{SYSTEM_INSTRUCTION}\n\nConversation history:\n{transcript}\n\nCurrent question: {message}")
}

/// Gemini `generateContent` over REST
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl ChatClient for GeminiClient {
    async fn complete(&self, message: &str, history: &[ChatTurn]) -> ServiceResult<String> {
        let prompt = build_prompt(message, history);
        debug!("Sending {} char prompt to {}", prompt.len(), self.model);

        let response = self
            .http
            .post(format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("unknown error").to_string();
            return Err(ServiceError::Api {
                service: "Gemini",
                status: status.to_string(),
                message,
            });
        }

        extract_text(&body)
    }
}

/// Concatenated text parts of the first candidate
pub fn extract_text(body: &Value) -> ServiceResult<String> {
    let parts = body["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| ServiceError::Parse("response has no candidate parts".to_string()))?;

    Ok(parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect::<Vec<_>>()
        .join(""))
}

//! Runtime configuration
//!
//! Read from the environment, optionally seeded from a `.env` file in the
//! working directory. Every setting has a usable default; missing keys for the
//! external services simply disable them.

use std::env;
use std::path::PathBuf;

use tracing::{info, warn};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    pub upload_dir: PathBuf,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Send recent chat turns along with each symptom question
    pub context_awareness: bool,
    pub google_maps_api_key: Option<String>,
    pub sender_email: Option<String>,
}

impl Config {
    /// Load `.env` (if present) and then the process environment
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Failed to read .env file: {e}"),
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_path = get("BLOOM_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir().join("bloom.db"));

        let upload_dir = get("BLOOM_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir().join("uploads"));

        let gemini_api_key = get("GEMINI_API_KEY");
        if gemini_api_key.is_none() {
            warn!("GEMINI_API_KEY not set, symptom chat will reply with a configuration notice");
        }

        let gemini_model = get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        let context_awareness = match get("CONTEXT_AWARENESS") {
            None => false,
            Some(raw) => parse_flag(&raw).unwrap_or_else(|| {
                warn!("Invalid CONTEXT_AWARENESS value '{raw}', using false");
                false
            }),
        };
        info!(
            "Context awareness is {}",
            if context_awareness { "enabled" } else { "disabled" }
        );

        let google_maps_api_key = get("GOOGLE_MAPS_API_KEY");
        if google_maps_api_key.is_none() {
            info!("GOOGLE_MAPS_API_KEY not set, using the offline hospital directory");
        }

        Self {
            database_path,
            upload_dir,
            gemini_api_key,
            gemini_model,
            context_awareness,
            google_maps_api_key,
            sender_email: get("SENDER_EMAIL"),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `data/` next to the project root when running from `target/{debug,release}`,
/// otherwise next to the executable
pub fn data_dir() -> PathBuf {
    let mut path = env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(root) = path.parent().and_then(|p| p.parent()) {
            path = root.to_path_buf();
        }
    }

    path.push("data");
    path
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert!(config.database_path.ends_with("data/bloom.db"));
        assert!(config.upload_dir.ends_with("data/uploads"));
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert!(!config.context_awareness);
        assert_eq!(config.gemini_api_key, None);
        assert_eq!(config.google_maps_api_key, None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BLOOM_DATABASE_PATH", "/tmp/b.db"),
            ("GEMINI_API_KEY", "key"),
            ("GEMINI_MODEL", "gemini-pro"),
            ("CONTEXT_AWARENESS", "TRUE"),
            ("SENDER_EMAIL", "clinic@example.com"),
        ]);
        assert_eq!(config.database_path, PathBuf::from("/tmp/b.db"));
        assert_eq!(config.gemini_api_key.as_deref(), Some("key"));
        assert_eq!(config.gemini_model, "gemini-pro");
        assert!(config.context_awareness);
        assert_eq!(config.sender_email.as_deref(), Some("clinic@example.com"));
    }

    #[test]
    fn test_blank_and_invalid_values_fall_back() {
        let config = config_from(&[("GEMINI_API_KEY", "  "), ("CONTEXT_AWARENESS", "maybe")]);
        assert_eq!(config.gemini_api_key, None);
        assert!(!config.context_awareness);
    }
}

//! Outbound email

use async_trait::async_trait;
use tracing::{info, warn};

use super::error::ServiceResult;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> ServiceResult<()>;
}

/// Writes each message to the log instead of delivering it.
///
/// Without a configured sender address the message is dropped with a warning.
pub struct LogMailer {
    sender: Option<String>,
}

impl LogMailer {
    pub fn new(sender: Option<String>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> ServiceResult<()> {
        let Some(sender) = &self.sender else {
            warn!("Email sender not configured, dropping '{}' to {}", subject, to);
            return Ok(());
        };
        info!(from = %sender, to = %to, subject = %subject, "Email: {}", body);
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SentMail {
        pub to: String,
        pub subject: String,
        pub body: String,
    }

    /// Keeps every message in memory
    #[derive(Default)]
    pub struct MemoryMailer {
        pub sent: Mutex<Vec<SentMail>>,
    }

    impl MemoryMailer {
        pub fn sent(&self) -> Vec<SentMail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for MemoryMailer {
        async fn send(&self, to: &str, subject: &str, body: &str) -> ServiceResult<()> {
            self.sent.lock().unwrap().push(SentMail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_never_fails() {
        assert!(LogMailer::new(None).send("a@b.c", "Hi", "Body").await.is_ok());
        assert!(LogMailer::new(Some("clinic@example.com".into()))
            .send("a@b.c", "Hi", "Body")
            .await
            .is_ok());
    }
}

// src/utils/notifier.rs

use async_trait::async_trait;

use crate::error::AppResult;

/// Out-of-band delivery of one-time codes.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_code(&self, recipient: &str, code: u32) -> AppResult<()>;
}

/// Writes the code to the log instead of an inbox. Suitable for development.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_code(&self, recipient: &str, code: u32) -> AppResult<()> {
        tracing::info!(recipient, code, "verification code issued");
        Ok(())
    }
}

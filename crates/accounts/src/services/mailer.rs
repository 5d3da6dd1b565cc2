//! Outbound account mail.
//!
//! Delivery itself happens outside this workspace; the trait is the seam the
//! account service dispatches through.

use std::sync::Arc;

use feedline_config::MailerConfig;
use feedline_database::Account;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Trait for the mail delivery subsystem
pub trait Mailer {
    async fn send_password_reset_email(
        &self,
        account: &Account,
        token: &str,
    ) -> Result<(), MailError>;
}

/// Dispatch stand-in that writes the mail into the log stream.
///
/// Keeps password-reset flows observable in development setups where no
/// delivery transport is wired up.
pub struct LogMailer {
    config: MailerConfig,
}

impl LogMailer {
    pub fn new(config: MailerConfig) -> Self {
        Self { config }
    }
}

impl Mailer for LogMailer {
    async fn send_password_reset_email(
        &self,
        account: &Account,
        token: &str,
    ) -> Result<(), MailError> {
        info!(
            to = %account.email,
            from = %self.config.sender,
            reset_url = %format!("{}/{}", self.config.reset_url_base, token),
            "password reset email dispatched"
        );
        Ok(())
    }
}

/// Mail double for tests: records every dispatch, optionally fails
#[derive(Clone)]
pub struct MockMailer {
    deliveries: Arc<RwLock<Vec<(String, String)>>>,
    fail_delivery: Arc<RwLock<bool>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self {
            deliveries: Arc::new(RwLock::new(Vec::new())),
            fail_delivery: Arc::new(RwLock::new(false)),
        }
    }

    /// Every (recipient email, token) pair dispatched so far
    pub async fn deliveries(&self) -> Vec<(String, String)> {
        self.deliveries.read().await.clone()
    }

    pub async fn set_fail_delivery(&self, fail: bool) {
        *self.fail_delivery.write().await = fail;
    }
}

impl Default for MockMailer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailer for MockMailer {
    async fn send_password_reset_email(
        &self,
        account: &Account,
        token: &str,
    ) -> Result<(), MailError> {
        if *self.fail_delivery.read().await {
            return Err(MailError::DeliveryFailed("mock delivery failure".to_string()));
        }

        self.deliveries
            .write()
            .await
            .push((account.email.clone(), token.to_string()));
        Ok(())
    }
}

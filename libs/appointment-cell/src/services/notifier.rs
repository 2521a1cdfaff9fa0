// libs/appointment-cell/src/services/notifier.rs
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::models::ConfirmationNotice;

/// Delivery of booking confirmations. Failures are reported, never rolled back.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// `Ok(true)` once the notice has been handed to a delivery channel.
    async fn notify(&self, notice: &ConfirmationNotice) -> Result<bool>;
}

/// Posts the confirmation as JSON to the email service endpoint.
pub struct HttpNotifier {
    client: Client,
    endpoint: String,
}

impl HttpNotifier {
    const TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Self::TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, notice: &ConfirmationNotice) -> Result<bool> {
        debug!("Sending confirmation {} to {}", notice.unique_id, self.endpoint);

        let response = self.client
            .post(&self.endpoint)
            .json(notice)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Notification service error ({}): {}", status, error_text));
        }

        info!("Confirmation {} handed to notification service", notice.unique_id);
        Ok(true)
    }
}

/// Used when no notification endpoint is configured.
#[derive(Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: &ConfirmationNotice) -> Result<bool> {
        info!(
            "Confirmation {} for {} with {} at {} (no notification endpoint configured)",
            notice.unique_id,
            notice.user_email.as_deref().unwrap_or("unknown requester"),
            notice.doctor_name,
            notice.appointment_time
        );
        Ok(false)
    }
}

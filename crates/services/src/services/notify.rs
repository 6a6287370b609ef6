use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("Notification endpoint returned {0}")]
    Status(reqwest::StatusCode),
}

/// Payload posted to the agency's notification endpoint after a tenancy
/// application lands. Field names follow the endpoint's contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationNotification {
    pub property_name: String,
    pub unit_name: String,
    pub area_name: String,
    pub address: String,
    pub monthly_price: f64,
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub current_address: String,
    pub employment_status: String,
    pub monthly_income: f64,
}

/// Outbound notifications. Callers decide whether a failure matters; the
/// application flow spawns this and only logs.
#[derive(Clone)]
pub struct NotifyService {
    client: reqwest::Client,
}

impl NotifyService {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub async fn send_application(
        &self,
        endpoint: &str,
        notification: &ApplicationNotification,
    ) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(endpoint)
            .json(notification)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status()));
        }
        tracing::debug!(
            "Application notification delivered for {}",
            notification.applicant_name
        );
        Ok(())
    }
}

impl Default for NotifyService {
    fn default() -> Self {
        Self::new()
    }
}

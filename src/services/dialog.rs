use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::error::ServiceError;
use super::types::{ConverseRequest, ConverseResponse, DialogSummary};

/// Stateful scripted dialog backend.
#[async_trait]
pub trait DialogService: Send + Sync {
    async fn list_dialogs(&self) -> Result<Vec<DialogSummary>, ServiceError>;

    async fn converse(&self, request: &ConverseRequest) -> Result<ConverseResponse, ServiceError>;
}

#[derive(Clone)]
pub struct HttpDialogClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct ConverseBody<'a> {
    input: &'a str,
    conversation_id: u64,
    client_id: u64,
}

impl HttpDialogClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DialogService for HttpDialogClient {
    async fn list_dialogs(&self) -> Result<Vec<DialogSummary>, ServiceError> {
        let response = self
            .client
            .get(format!("{}/dialogs", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    async fn converse(&self, request: &ConverseRequest) -> Result<ConverseResponse, ServiceError> {
        let body = ConverseBody {
            input: &request.input,
            conversation_id: request.conversation_id,
            client_id: request.client_id,
        };

        let response = self
            .client
            .post(format!(
                "{}/dialogs/{}/converse",
                self.base_url, request.dialog_id
            ))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

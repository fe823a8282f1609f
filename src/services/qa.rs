use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::error::ServiceError;
use super::types::AskResponse;

/// Question answering through a named pipeline.
#[async_trait]
pub trait QaService: Send + Sync {
    async fn ask(&self, pipeline: &str, question: &str) -> Result<AskResponse, ServiceError>;
}

#[derive(Clone)]
pub struct HttpQaClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct AskBody<'a> {
    question: &'a str,
}

impl HttpQaClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl QaService for HttpQaClient {
    async fn ask(&self, pipeline: &str, question: &str) -> Result<AskResponse, ServiceError> {
        let response = self
            .client
            .post(format!("{}/pipelines/{}/ask", self.base_url, pipeline))
            .json(&AskBody { question })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

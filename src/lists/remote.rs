use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use crate::{db::StorageError, domain::SafetyList};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error while fetching safety list: {0}")]
    Network(#[from] reqwest::Error),
    #[error("safety list request failed with HTTP status {0}")]
    HttpStatus(StatusCode),
    #[error("safety list document is malformed: {0}")]
    Schema(#[from] serde_json::Error),
    #[error("failed to persist refreshed safety list: {0}")]
    Persist(#[from] StorageError),
}

/// Where fresh safe lists come from.
#[async_trait]
pub trait ListSource: Send + Sync {
    async fn fetch(&self) -> Result<SafetyList, FetchError>;

    fn describe(&self) -> String;
}

pub struct HttpListSource {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl HttpListSource {
    pub fn new(client: Client, url: Url, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }
}

#[async_trait]
impl ListSource for HttpListSource {
    async fn fetch(&self) -> Result<SafetyList, FetchError> {
        let response = self
            .client
            .get(self.url.clone())
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status));
        }

        let body = response.bytes().await?;
        Ok(SafetyList::from_json(&body)?)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

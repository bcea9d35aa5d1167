pub mod orders;

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;

pub use crate::execution::errors::FetcherError;

/// HTTP capability. Implementations must reject non-2xx responses with
/// [`FetcherError::Http`], keeping the backend's payload intact.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<Value, FetcherError>;
    async fn post(&self, url: &str, body: &Value) -> Result<Value, FetcherError>;
}

// ==================================================
// REQWEST FETCHER
// ==================================================

#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl Default for ReqwestFetcher {
    fn default() -> Self {
        Self::with_client(Client::new())
    }
}

impl ReqwestFetcher {
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetcherError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetcherError::Network(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self::with_client(client))
    }

    async fn read_response(response: reqwest::Response) -> Result<Value, FetcherError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FetcherError::Network(e.to_string()))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(json) => json,
                Err(_) if !status.is_success() => Value::String(text),
                Err(e) => return Err(FetcherError::Decode(e.to_string())),
            }
        };

        if !status.is_success() {
            return Err(FetcherError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<Value, FetcherError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetcherError::Network(e.to_string()))?;
        Self::read_response(response).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, FetcherError> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| FetcherError::Network(e.to_string()))?;
        Self::read_response(response).await
    }
}

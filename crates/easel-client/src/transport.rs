//! Lock transport
//!
//! `LockTransport` is the seam between the session driver and the server: an
//! HTTP implementation for real use, mocks in tests. Conflict (409) answers
//! are decoded into typed responses, never surfaced as errors.

use std::time::Duration;

use async_trait::async_trait;
use easel_common::model::{LockGrant, LockRequest, LockStatus, RefreshReceipt, ReleaseReceipt};
use reqwest::{Client, Response, StatusCode};
use tracing::error;

use crate::error::{ClientError, Result};

/// Outcome of an acquire call.
#[derive(Clone, Debug, PartialEq)]
pub enum AcquireResponse {
    Granted(LockGrant),
    Conflict(LockStatus),
}

/// Outcome of a refresh call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshResponse {
    Refreshed { expires_at: i64 },
    NotHeld,
}

/// Wire seam for lock operations.
#[async_trait]
pub trait LockTransport: Send + Sync {
    async fn acquire(&self, resource_id: &str, holder: Option<&str>) -> Result<AcquireResponse>;
    async fn refresh(&self, resource_id: &str, holder: Option<&str>) -> Result<RefreshResponse>;
    async fn release(&self, resource_id: &str, holder: Option<&str>) -> Result<bool>;
    async fn status(&self, resource_id: &str) -> Result<LockStatus>;
}

/// Configuration for the HTTP transport
#[derive(Clone, Debug)]
pub struct LockClientConfig {
    /// Server address to connect to
    pub server_addr: String,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Context path (e.g., "/easel")
    pub context_path: String,
}

impl Default for LockClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "http://127.0.0.1:8642".to_string(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 30000,
            context_path: String::new(),
        }
    }
}

impl LockClientConfig {
    /// Create a new config with a server address
    pub fn new(server_addr: &str) -> Self {
        Self {
            server_addr: server_addr.to_string(),
            ..Default::default()
        }
    }

    /// Set timeouts
    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.connect_timeout_ms = connect_ms;
        self.read_timeout_ms = read_ms;
        self
    }

    /// Set context path
    pub fn with_context_path(mut self, path: &str) -> Self {
        self.context_path = path.to_string();
        self
    }
}

/// HTTP implementation of `LockTransport`.
pub struct HttpLockTransport {
    client: Client,
    config: LockClientConfig,
}

impl HttpLockTransport {
    pub fn new(config: LockClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    /// Build full URL with context path
    fn build_url(&self, path: &str) -> String {
        let base_url = &self.config.server_addr;
        let context_path = &self.config.context_path;

        if context_path.is_empty() {
            format!("{}{}", base_url, path)
        } else {
            format!(
                "{}/{}{}",
                base_url,
                context_path.trim_start_matches('/'),
                path
            )
        }
    }

    async fn unexpected_status(&self, response: Response) -> ClientError {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        error!("Request failed with status {}: {}", status, message);
        ClientError::ServerError {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl LockTransport for HttpLockTransport {
    async fn acquire(&self, resource_id: &str, holder: Option<&str>) -> Result<AcquireResponse> {
        let url = self.build_url(&format!("/lock/{}", resource_id));
        let body = LockRequest {
            holder: holder.map(str::to_string),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        match response.status() {
            StatusCode::OK => Ok(AcquireResponse::Granted(response.json().await?)),
            StatusCode::CONFLICT => Ok(AcquireResponse::Conflict(response.json().await?)),
            _ => Err(self.unexpected_status(response).await),
        }
    }

    async fn refresh(&self, resource_id: &str, holder: Option<&str>) -> Result<RefreshResponse> {
        let url = self.build_url(&format!("/lock/{}/refresh", resource_id));
        let body = LockRequest {
            holder: holder.map(str::to_string),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        match response.status() {
            StatusCode::OK => {
                let receipt: RefreshReceipt = response.json().await?;
                Ok(RefreshResponse::Refreshed {
                    expires_at: receipt.expires_at,
                })
            }
            StatusCode::CONFLICT => Ok(RefreshResponse::NotHeld),
            _ => Err(self.unexpected_status(response).await),
        }
    }

    async fn release(&self, resource_id: &str, holder: Option<&str>) -> Result<bool> {
        let url = self.build_url(&format!("/lock/{}", resource_id));

        let mut request = self.client.delete(&url);
        if let Some(holder) = holder {
            request = request.query(&[(easel_common::HOLDER, holder)]);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::OK => {
                let receipt: ReleaseReceipt = response.json().await?;
                Ok(receipt.released)
            }
            _ => Err(self.unexpected_status(response).await),
        }
    }

    async fn status(&self, resource_id: &str) -> Result<LockStatus> {
        let url = self.build_url(&format!("/lock/{}/status", resource_id));

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            _ => Err(self.unexpected_status(response).await),
        }
    }
}

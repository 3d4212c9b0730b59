//! API client for communicating with the price server

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// Failure reported by the server
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{error_kind} (HTTP {status}): {details}")]
    Api {
        status: u16,
        error_kind: String,
        details: String,
    },

    #[error("unexpected response (HTTP {status}): {body}")]
    Unexpected { status: u16, body: String },
}

/// API client for the price server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    pub async fn predict(&self, request: &PriceRequest) -> Result<PriceEstimate> {
        let url = self.url("api/predict_home_price")?;
        self.send(self.client.post(url).json(request), false).await
    }

    pub async fn locations(&self) -> Result<LocationList> {
        let url = self.url("api/get_location_names")?;
        self.send(self.client.get(url), false).await
    }

    /// Health is reported with 503 while the server is not ready; that is
    /// still a valid report.
    pub async fn health(&self) -> Result<HealthReport> {
        let url = self.url("api/health")?;
        self.send(self.client.get(url), true).await
    }

    pub async fn reload(&self) -> Result<HealthReport> {
        let url = self.url("api/reload")?;
        self.send(self.client.post(url), false).await
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).context("Invalid path")
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        accept_unavailable: bool,
    ) -> Result<T> {
        let response = request.send().await.context("Failed to send request")?;
        let status = response.status();

        if status.is_success() || (accept_unavailable && status == StatusCode::SERVICE_UNAVAILABLE) {
            return response.json().await.context("Failed to parse response");
        }

        let body = response.text().await.unwrap_or_default();
        let err = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => ClientError::Api {
                status: status.as_u16(),
                error_kind: parsed.error_kind,
                details: parsed.details,
            },
            Err(_) => ClientError::Unexpected {
                status: status.as_u16(),
                body,
            },
        };
        Err(err.into())
    }
}

// API request/response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRequest {
    pub location: String,
    pub total_sqft: f64,
    pub bhk: u32,
    pub bath: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub estimated_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationList {
    pub locations: Vec<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub state: String,
    pub ready: bool,
    pub last_transition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub fingerprint: String,
    pub created_at: String,
    pub feature_count: usize,
    pub model_width: usize,
    pub model_kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_kind: String,
    pub details: String,
}

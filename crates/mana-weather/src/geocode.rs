//! Forward geocoding through the weather proxy: free text to candidate locations.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use mana_core::{ApiConfig, ReqwestErrorExt};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::types::{GeoLocation, GeocodingResponse, LookupError};

const GEOCODE_PATH: &str = "api/geocode";

/// The proxy rejects limits outside this range.
const MAX_RESULT_LIMIT: u8 = 5;

/// A cancellable forward-geocoding lookup.
///
/// Implementations must resolve with [`LookupError::Cancelled`] once `cancel`
/// fires, and should stop any in-flight transfer when it does.
pub trait GeocodingClient: Send + Sync + 'static {
    fn search(
        &self,
        query: &str,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Vec<GeoLocation>, LookupError>> + Send;
}

/// Geocoding client for the proxy's `GET /api/geocode` endpoint.
#[derive(Debug, Clone)]
pub struct HttpGeocodingClient {
    client: Arc<Client>,
    endpoint: Url,
    limit: u8,
}

impl HttpGeocodingClient {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        // Keep any path prefix on the base URL when joining.
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)
            .and_then(|u| u.join(GEOCODE_PATH))
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;

        Ok(Self {
            client: Arc::new(client),
            endpoint,
            limit: MAX_RESULT_LIMIT,
        })
    }

    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        Self::new(
            &api.base_url,
            Duration::from_secs(api.timeout_secs),
            &api.user_agent,
        )
    }

    /// Number of candidates to request, clamped to what the proxy accepts.
    #[must_use]
    pub fn with_limit(mut self, limit: u8) -> Self {
        self.limit = limit.clamp(1, MAX_RESULT_LIMIT);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn fetch(&self, query: &str) -> Result<Vec<GeoLocation>, LookupError> {
        let limit = self.limit.to_string();
        tracing::debug!("Geocoding {:?} (limit {})", query, limit);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string(),
            });
        }

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Transport(e.into_network_error()))?;

        tracing::debug!("Geocoding {:?} returned {} results", query, body.results.len());
        Ok(body.results)
    }
}

impl GeocodingClient for HttpGeocodingClient {
    async fn search(
        &self,
        query: &str,
        cancel: CancellationToken,
    ) -> Result<Vec<GeoLocation>, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        if cancel.is_cancelled() {
            return Err(LookupError::Cancelled);
        }

        // Losing the race drops the request future, which closes the connection.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Geocoding {:?} aborted", query);
                Err(LookupError::Cancelled)
            }
            result = self.fetch(query) => result,
        }
    }
}

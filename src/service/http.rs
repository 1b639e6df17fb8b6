//! HTTP client for the recommendation endpoint
//!
//! Posts `{ "message", "expand" }` as JSON and reads the `response` field
//! from the reply. Non-success statuses and transport failures become
//! errors; a success body of any other shape yields a reply without text.

use crate::config::ServiceConfig;
use crate::error::{DormGuideError, Result};
use crate::service::{Recommendation, RecommendationRequest, RecommendationService};

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// reqwest-backed recommendation client
///
/// # Examples
///
/// ```no_run
/// use dormguide::config::ServiceConfig;
/// use dormguide::service::{HttpRecommendationClient, RecommendationRequest, RecommendationService};
///
/// # async fn example() -> dormguide::error::Result<()> {
/// let client = HttpRecommendationClient::new(ServiceConfig::default())?;
/// let reply = client
///     .recommend(&RecommendationRequest::brief("Quiet dorm close to classes"))
///     .await?;
/// println!("{:?}", reply.text);
/// # Ok(())
/// # }
/// ```
pub struct HttpRecommendationClient {
    client: Client,
    config: ServiceConfig,
}

impl HttpRecommendationClient {
    /// Create a new client for the configured endpoint
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use dormguide::config::ServiceConfig;
    /// use dormguide::service::HttpRecommendationClient;
    ///
    /// let client = HttpRecommendationClient::new(ServiceConfig::default());
    /// assert!(client.is_ok());
    /// ```
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("dormguide/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DormGuideError::Service(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized recommendation client: endpoint={}, timeout={}s",
            config.endpoint,
            config.timeout_seconds
        );

        Ok(Self { client, config })
    }
}

#[async_trait]
impl RecommendationService for HttpRecommendationClient {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Recommendation> {
        tracing::debug!(
            "Sending recommendation request: expand={}, {} chars",
            request.expand,
            request.message.len()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Recommendation request failed: {}", e);
                DormGuideError::Service(format!("Recommendation request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Recommendation service returned {}: {}", status, body);
            return Err(DormGuideError::ServiceStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read recommendation body: {}", e);
            DormGuideError::Service(format!("Failed to read recommendation body: {}", e))
        })?;

        let reply = match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(value) => Recommendation::from_body(&value),
            Err(e) => {
                tracing::warn!("Recommendation body is not JSON: {}", e);
                Recommendation::default()
            }
        };

        tracing::debug!(
            "Recommendation reply: has_text={}, truncated={:?}",
            reply.text.is_some(),
            reply.truncated
        );

        Ok(reply)
    }

    fn endpoint(&self) -> String {
        self.config.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpRecommendationClient::new(ServiceConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_reports_endpoint() {
        let config = ServiceConfig {
            endpoint: "http://127.0.0.1:8002/query".to_string(),
            timeout_seconds: 30,
        };
        let client = HttpRecommendationClient::new(config).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:8002/query");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let config = ServiceConfig {
            endpoint: "http://127.0.0.1:1/query".to_string(),
            timeout_seconds: 2,
        };
        let client = HttpRecommendationClient::new(config).unwrap();
        let result = client
            .recommend(&RecommendationRequest::brief("anything"))
            .await;
        assert!(result.is_err());
    }
}

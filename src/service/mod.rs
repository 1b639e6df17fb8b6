//! Recommendation service client
//!
//! The recommendation backend is an external collaborator. This module
//! defines the request/response contract the chat controller relies on and
//! the trait every client implements; `http` holds the reqwest-backed client.

pub mod http;

pub use http::HttpRecommendationClient;

use crate::config::ServiceConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body sent to the recommendation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    /// The user's question, already trimmed
    pub message: String,
    /// Ask for the full, untruncated answer
    pub expand: bool,
}

impl RecommendationRequest {
    /// Regular (possibly truncated) recommendation request
    pub fn brief(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expand: false,
        }
    }

    /// Request for the full answer to a previous question
    pub fn expanded(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expand: true,
        }
    }
}

/// Usable content extracted from a successful service reply
///
/// A reply whose body has no string `response` field still counts as a
/// success; it simply carries no text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recommendation {
    /// Reply text, `None` when the body had no usable `response`
    pub text: Option<String>,
    /// Explicit truncation flag, when the service sent one
    pub truncated: Option<bool>,
}

impl Recommendation {
    /// Reply with text and no truncation flag
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            truncated: None,
        }
    }

    /// Extracts the reply from an arbitrary JSON body
    ///
    /// # Examples
    ///
    /// ```
    /// use dormguide::service::Recommendation;
    /// use serde_json::json;
    ///
    /// let reply = Recommendation::from_body(&json!({"response": "Try Cobb.", "truncated": true}));
    /// assert_eq!(reply.text.as_deref(), Some("Try Cobb."));
    /// assert_eq!(reply.truncated, Some(true));
    ///
    /// let empty = Recommendation::from_body(&json!(["not", "an", "object"]));
    /// assert!(empty.text.is_none());
    /// ```
    pub fn from_body(body: &serde_json::Value) -> Self {
        Self {
            text: body
                .get("response")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
            truncated: body.get("truncated").and_then(serde_json::Value::as_bool),
        }
    }

    /// Reply text when present and not blank
    pub fn usable_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.trim().is_empty())
    }
}

/// Client for the remote recommendation endpoint
///
/// Any transport failure or non-success status is returned as an error;
/// the controller decides how each failure is surfaced.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Sends one request and waits for the reply
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Recommendation>;

    /// Human-readable endpoint description for banners and logs
    fn endpoint(&self) -> String {
        "unknown".to_string()
    }
}

/// Create the configured service client
///
/// # Errors
///
/// Returns error if the HTTP client cannot be initialized
pub fn create_service(config: &ServiceConfig) -> Result<Box<dyn RecommendationService>> {
    Ok(Box::new(HttpRecommendationClient::new(config.clone())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_message_and_expand() {
        let body = serde_json::to_value(RecommendationRequest::brief("Quiet dorm")).unwrap();
        assert_eq!(body, json!({"message": "Quiet dorm", "expand": false}));

        let body = serde_json::to_value(RecommendationRequest::expanded("Quiet dorm")).unwrap();
        assert_eq!(body, json!({"message": "Quiet dorm", "expand": true}));
    }

    #[test]
    fn test_from_body_reads_response_field() {
        let reply = Recommendation::from_body(&json!({"response": "Try Teague Hall."}));
        assert_eq!(reply.usable_text(), Some("Try Teague Hall."));
        assert_eq!(reply.truncated, None);
    }

    #[test]
    fn test_from_body_non_string_response_has_no_text() {
        let reply = Recommendation::from_body(&json!({"response": 42}));
        assert!(reply.text.is_none());
    }

    #[test]
    fn test_from_body_missing_response_has_no_text() {
        let reply = Recommendation::from_body(&json!({"detail": "oops"}));
        assert!(reply.usable_text().is_none());
    }

    #[test]
    fn test_blank_response_is_not_usable() {
        let reply = Recommendation::text("   ");
        assert!(reply.usable_text().is_none());
    }

    #[test]
    fn test_create_service_uses_configured_endpoint() {
        let config = ServiceConfig {
            endpoint: "http://localhost:9999/query".to_string(),
            timeout_seconds: 5,
        };
        let service = create_service(&config).unwrap();
        assert_eq!(service.endpoint(), "http://localhost:9999/query");
    }
}

//! Test utilities for Dorm Guide
//!
//! This module provides a scripted recommendation service and assertion
//! helpers shared by unit tests.

use crate::error::{DormGuideError, Result};
use crate::service::{Recommendation, RecommendationRequest, RecommendationService};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Recommendation service that replays queued outcomes
///
/// Clones share the same queue and request log, so a test can keep one
/// handle while the controller owns another. When the queue is empty the
/// service fails as if the endpoint were unreachable.
#[derive(Clone, Default)]
pub struct ScriptedService {
    outcomes: Arc<Mutex<VecDeque<std::result::Result<Recommendation, String>>>>,
    requests: Arc<Mutex<Vec<RecommendationRequest>>>,
}

impl ScriptedService {
    /// Create a service with nothing queued
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn push_reply(&self, reply: Recommendation) {
        self.outcomes.lock().unwrap().push_back(Ok(reply));
    }

    /// Queue a failure
    pub fn push_error(&self, error: DormGuideError) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(error.to_string()));
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<RecommendationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecommendationService for ScriptedService {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Recommendation> {
        self.requests.lock().unwrap().push(request.clone());
        match self.outcomes.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(DormGuideError::Service(message).into()),
            None => Err(DormGuideError::Service("connection refused".to_string()).into()),
        }
    }

    fn endpoint(&self) -> String {
        "scripted".to_string()
    }
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(DormGuideError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[tokio::test]
    async fn test_scripted_service_replays_in_order() {
        let service = ScriptedService::new();
        service.push_reply(Recommendation::text("first"));
        service.push_error(DormGuideError::Service("down".to_string()));

        let request = RecommendationRequest::brief("q");
        let first = service.recommend(&request).await.unwrap();
        assert_eq!(first.text.as_deref(), Some("first"));
        assert!(service.recommend(&request).await.is_err());
        // Exhausted queue behaves like an unreachable endpoint.
        assert!(service.recommend(&request).await.is_err());
        assert_eq!(service.requests().len(), 3);
    }
}

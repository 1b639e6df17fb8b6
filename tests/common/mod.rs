use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use dormguide::error::{DormGuideError, Result};
use dormguide::service::{Recommendation, RecommendationRequest, RecommendationService};
use dormguide::storage::SqliteStorage;

#[allow(dead_code)]
pub fn create_temp_storage() -> (SqliteStorage, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("sessions.db");
    let storage =
        SqliteStorage::new_with_path(db_path).expect("failed to create sqlite storage with path");
    (storage, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Service double that answers every question with the same reply.
#[allow(dead_code)]
#[derive(Clone)]
pub struct FixedService {
    reply: Option<Recommendation>,
    pub requests: Arc<Mutex<Vec<RecommendationRequest>>>,
}

#[allow(dead_code)]
impl FixedService {
    pub fn replying(text: &str, truncated: Option<bool>) -> Self {
        Self {
            reply: Some(Recommendation {
                text: Some(text.to_string()),
                truncated,
            }),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reply: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl RecommendationService for FixedService {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Recommendation> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(DormGuideError::Service("connection refused".to_string()).into()),
        }
    }
}

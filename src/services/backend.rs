use crate::core::{DelegateError, ScoringDelegate};
use crate::models::{Assignment, CandidateProfile, TaskRequirement};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the platform backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid service API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// User record as exposed by the backend's internal user-lookup API
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub full_name: String,
}

/// Client for the platform backend's internal API
///
/// Covers the collaborators the core depends on:
/// - user lookup (identity resolution for connecting peers)
/// - task requirement and member skill-profile fetches
/// - assignment persistence
/// - the optional external scoring delegate
pub struct BackendClient {
    base_url: String,
    api_key: String,
    delegate_path: String,
    client: Client,
}

impl BackendClient {
    pub fn new(base_url: String, api_key: String, delegate_path: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            delegate_path,
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Look up a user by the subject of their access token
    pub async fn get_user(&self, subject: &str) -> Result<UserRecord, BackendError> {
        let url = self.url(&format!("/internal/users/{}", subject));

        tracing::debug!("Fetching user record from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Service-Key", &self.api_key)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            reqwest::StatusCode::NOT_FOUND => {
                return Err(BackendError::NotFound(format!("User {} not found", subject)));
            }
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                return Err(BackendError::Unauthorized);
            }
            status => {
                return Err(BackendError::ApiError(format!(
                    "Failed to fetch user: {}",
                    status
                )));
            }
        }

        let json: Value = response.json().await?;
        serde_json::from_value(json)
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse user: {}", e)))
    }

    /// Fetch requirement records for a batch of tasks
    pub async fn get_task_requirements(
        &self,
        task_ids: &[i64],
    ) -> Result<Vec<TaskRequirement>, BackendError> {
        let ids = task_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = self.url("/internal/tasks");

        let response = self
            .client
            .get(&url)
            .query(&[("ids", ids.as_str())])
            .header("X-Service-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::ApiError(format!(
                "Failed to fetch task requirements: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        let tasks = json
            .get("tasks")
            .and_then(|t| t.as_array())
            .ok_or_else(|| BackendError::InvalidResponse("Missing tasks array".into()))?;

        let requirements: Vec<TaskRequirement> = tasks
            .iter()
            .filter_map(|doc| serde_json::from_value(doc.clone()).ok())
            .collect();

        tracing::debug!("Fetched {} task requirements", requirements.len());

        Ok(requirements)
    }

    /// Fetch a project's members with their skill profiles
    pub async fn get_project_candidates(
        &self,
        project_id: i64,
    ) -> Result<Vec<CandidateProfile>, BackendError> {
        let url = self.url(&format!("/internal/projects/{}/members", project_id));

        let response = self
            .client
            .get(&url)
            .query(&[("include", "skills")])
            .header("X-Service-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!(
                "Failed to fetch members for project {}: {} - {}",
                project_id,
                status,
                body
            );
            return Err(BackendError::ApiError(format!(
                "Failed to fetch project members: {}",
                status
            )));
        }

        let json: Value = response.json().await?;
        let members = json
            .get("members")
            .and_then(|m| m.as_array())
            .ok_or_else(|| BackendError::InvalidResponse("Missing members array".into()))?;

        let candidates: Vec<CandidateProfile> = members
            .iter()
            .filter_map(|doc| serde_json::from_value(doc.clone()).ok())
            .collect();

        tracing::debug!(
            "Fetched {} candidates for project {}",
            candidates.len(),
            project_id
        );

        Ok(candidates)
    }

    /// Persist assignment results on the corresponding tasks
    pub async fn apply_assignments(&self, assignments: &[Assignment]) -> Result<(), BackendError> {
        let url = self.url("/internal/tasks/assignments");

        let response = self
            .client
            .post(&url)
            .header("X-Service-Key", &self.api_key)
            .json(&json!({ "assignments": assignments }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::ApiError(format!(
                "Failed to apply assignments: {}",
                response.status()
            )));
        }

        tracing::debug!("Applied {} assignments", assignments.len());

        Ok(())
    }

    /// Call the external scoring delegate with the full candidate and task
    /// lists. Callers fall back to the local algorithm on any error.
    pub async fn delegate_assignments(
        &self,
        candidates: &[CandidateProfile],
        tasks: &[TaskRequirement],
    ) -> Result<Vec<Assignment>, BackendError> {
        let url = self.url(&self.delegate_path);

        let response = self
            .client
            .post(&url)
            .header("X-Service-Key", &self.api_key)
            .json(&json!({ "members": candidates, "tasks": tasks }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::ApiError(format!(
                "Delegate returned error: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        let assignments = json
            .get("assignments")
            .and_then(|a| a.as_array())
            .ok_or_else(|| BackendError::InvalidResponse("Missing assignments array".into()))?;

        assignments
            .iter()
            .map(|doc| {
                serde_json::from_value(doc.clone()).map_err(|e| {
                    BackendError::InvalidResponse(format!("Failed to parse assignment: {}", e))
                })
            })
            .collect()
    }
}

impl ScoringDelegate for BackendClient {
    async fn score(
        &self,
        candidates: &[CandidateProfile],
        tasks: &[TaskRequirement],
    ) -> Result<Vec<Assignment>, DelegateError> {
        self.delegate_assignments(candidates, tasks)
            .await
            .map_err(|e| DelegateError(e.to_string()))
    }
}

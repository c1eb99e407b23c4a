use serde::{Deserialize, Serialize};
use crate::models::domain::Assignment;

/// Response for the task assignment endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignTasksResponse {
    pub assignments: Vec<Assignment>,
    pub total_tasks: usize,
}

/// Live view of a signaling room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfoResponse {
    pub room_id: String,
    pub participant_count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to match a batch of tasks to project members
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignTasksRequest {
    #[validate(range(min = 1))]
    pub project_id: i64,
    #[validate(length(min = 1))]
    pub task_ids: Vec<i64>,
}

/// Query parameters accepted by the signaling WebSocket endpoint
///
/// `token` is the normal credential; `user_id`/`user_name` form the explicit
/// fallback identity used when no valid token is supplied.
#[derive(Debug, Clone, Deserialize)]
pub struct SignalingQuery {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use super::AppState;
use crate::models::{AssignTasksRequest, AssignTasksResponse, ErrorResponse};

/// Configure task assignment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/tasks").route("/assign", web::post().to(assign_tasks)));
}

/// Match a batch of tasks to project members
///
/// POST /api/tasks/assign
///
/// Request body:
/// ```json
/// {
///   "project_id": 12,
///   "task_ids": [3, 4, 5]
/// }
/// ```
///
/// Requirements and candidate skill profiles come from the platform backend;
/// scoring goes through the external delegate when enabled and always falls
/// back to the local algorithm on delegate failure. The resulting assignments
/// are persisted on the tasks and returned.
async fn assign_tasks(
    state: web::Data<AppState>,
    req: web::Json<AssignTasksRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for assign_tasks request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    tracing::info!(
        "Assigning {} tasks for project {}",
        req.task_ids.len(),
        req.project_id
    );

    let tasks = match state.backend.get_task_requirements(&req.task_ids).await {
        Ok(tasks) => tasks,
        Err(e) => {
            tracing::error!("Failed to fetch task requirements: {}", e);
            return HttpResponse::BadGateway().json(ErrorResponse {
                error: "Failed to fetch task requirements".to_string(),
                message: e.to_string(),
                status_code: 502,
            });
        }
    };

    let candidates = match state.backend.get_project_candidates(req.project_id).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!(
                "Failed to fetch members for project {}: {}",
                req.project_id,
                e
            );
            return HttpResponse::BadGateway().json(ErrorResponse {
                error: "Failed to fetch project members".to_string(),
                message: e.to_string(),
                status_code: 502,
            });
        }
    };

    if tasks.is_empty() || candidates.is_empty() {
        tracing::info!(
            "Nothing to assign (tasks: {}, candidates: {})",
            tasks.len(),
            candidates.len()
        );
        return HttpResponse::Ok().json(AssignTasksResponse {
            assignments: vec![],
            total_tasks: tasks.len(),
        });
    }

    let delegate = state.delegate_enabled.then(|| state.backend.as_ref());
    let assignments = state
        .matcher
        .assign_with_delegate(delegate, &candidates, &tasks)
        .await;

    if let Err(e) = state.backend.apply_assignments(&assignments).await {
        tracing::error!("Failed to persist assignments: {}", e);
        return HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Failed to persist assignments".to_string(),
            message: e.to_string(),
            status_code: 500,
        });
    }

    tracing::info!(
        "Assigned {} of {} tasks for project {}",
        assignments.len(),
        tasks.len(),
        req.project_id
    );

    HttpResponse::Ok().json(AssignTasksResponse {
        total_tasks: tasks.len(),
        assignments,
    })
}

// Route exports
pub mod assignments;
pub mod signaling;

use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

use crate::core::{RoomRegistry, TaskMatcher};
use crate::models::HealthResponse;
use crate::services::{BackendClient, IdentityResolver};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub backend: Arc<BackendClient>,
    pub identity: Arc<IdentityResolver>,
    pub matcher: TaskMatcher,
    pub delegate_enabled: bool,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_check))
            .configure(assignments::configure)
            .configure(signaling::configure),
    );
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

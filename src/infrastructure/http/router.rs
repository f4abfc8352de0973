use crate::infrastructure::http::controllers::{events, health, jobs, technician};
use crate::infrastructure::http::middleware::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Job lifecycle
        .route("/api/jobs", post(jobs::create_job))
        .route("/api/jobs/active", get(jobs::get_active_job))
        .route("/api/jobs/active/cancel", post(jobs::cancel_active_job))
        .route("/api/jobs/history", get(jobs::list_history))
        .route("/api/jobs/otp-readiness", post(jobs::otp_readiness))
        .route("/api/jobs/:id/events", post(jobs::post_job_event))
        // Technician and tracking
        .route("/api/technician", get(technician::get_technician))
        .route(
            "/api/technician/availability",
            put(technician::set_availability),
        )
        .route("/api/tracking", get(technician::get_tracking))
        // Admin feed
        .route("/api/summary", get(jobs::get_summary))
        .route("/api/events", get(events::event_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

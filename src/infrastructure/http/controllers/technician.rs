use crate::application::services::{TechnicianStatus, TrackingSnapshot};
use crate::infrastructure::http::middleware::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SetAvailabilityRequest {
    pub online: bool,
}

/// GET /api/technician
pub async fn get_technician(State(state): State<AppState>) -> Json<TechnicianStatus> {
    Json(state.dispatch_service.technician_status().await)
}

/// PUT /api/technician/availability - Go online or offline
pub async fn set_availability(
    State(state): State<AppState>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Json<TechnicianStatus> {
    Json(
        state
            .dispatch_service
            .set_technician_online(request.online)
            .await,
    )
}

/// GET /api/tracking - Both positions, distance and ETA
pub async fn get_tracking(State(state): State<AppState>) -> Json<TrackingSnapshot> {
    Json(state.dispatch_service.tracking().await)
}

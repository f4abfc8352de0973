use serde::Serialize;

use crate::domain::entities::{GeoLocation, Job, JobStatus};

/// Events published by the dispatch engine to UI and admin subscribers
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchEvent {
    JobCreated {
        job: Job,
        timestamp: String, // ISO 8601
    },
    JobStatusChanged {
        job: Job,
        previous: JobStatus,
        timestamp: String, // ISO 8601
    },
    NoTechnicianFound {
        job_id: String,
        message: String,
        timestamp: String, // ISO 8601
    },
    OfferDeclined {
        job_id: String,
        requeued: bool,
        timestamp: String, // ISO 8601
    },
    HistoryAppended {
        job: Job,
        history_len: usize,
        timestamp: String, // ISO 8601
    },
    TechnicianAvailabilityChanged {
        technician_id: String,
        online: bool,
        timestamp: String, // ISO 8601
    },
    TechnicianMoved {
        job_id: String,
        position: GeoLocation,
        distance_km: f64,
        timestamp: String, // ISO 8601
    },
}

impl DispatchEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DispatchEvent::JobCreated { .. } => "job_created",
            DispatchEvent::JobStatusChanged { .. } => "job_status_changed",
            DispatchEvent::NoTechnicianFound { .. } => "no_technician_found",
            DispatchEvent::OfferDeclined { .. } => "offer_declined",
            DispatchEvent::HistoryAppended { .. } => "history_appended",
            DispatchEvent::TechnicianAvailabilityChanged { .. } => {
                "technician_availability_changed"
            }
            DispatchEvent::TechnicianMoved { .. } => "technician_moved",
        }
    }
}

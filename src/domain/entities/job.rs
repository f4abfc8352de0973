use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::entities::GeoLocation;
use crate::domain::services::pricing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Searching,
    Offered,
    Accepted,
    Arrived,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Searching => "SEARCHING",
            JobStatus::Offered => "OFFERED",
            JobStatus::Accepted => "ACCEPTED",
            JobStatus::Arrived => "ARRIVED",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Cancelled => "CANCELLED",
        }
    }

    /// Statuses in which the technician's live position is tracked
    pub fn is_trackable(&self) -> bool {
        matches!(
            self,
            JobStatus::Accepted | JobStatus::Arrived | JobStatus::InProgress
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    TubePatch,
    TubelessPlug,
    Tow,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [
        ServiceType::TubePatch,
        ServiceType::TubelessPlug,
        ServiceType::Tow,
    ];
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::TubePatch => write!(f, "TUBE_PATCH"),
            ServiceType::TubelessPlug => write!(f, "TUBELESS_PLUG"),
            ServiceType::Tow => write!(f, "TOW"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Bike,
    Car,
}

impl VehicleType {
    pub const ALL: [VehicleType; 2] = [VehicleType::Bike, VehicleType::Car];
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleType::Bike => write!(f, "BIKE"),
            VehicleType::Car => write!(f, "CAR"),
        }
    }
}

/// Commands that drive a job through its lifecycle.
///
/// `Offer` is raised by the offer timer only and cannot be submitted over
/// the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    #[serde(skip_deserializing)]
    Offer,
    Decline,
    Accept { technician_id: String },
    Arrive,
    Start,
    Complete { otp: String },
    Cancel,
}

impl JobEvent {
    pub fn name(&self) -> &'static str {
        match self {
            JobEvent::Offer => "offer",
            JobEvent::Decline => "decline",
            JobEvent::Accept { .. } => "accept",
            JobEvent::Arrive => "arrive",
            JobEvent::Start => "start",
            JobEvent::Complete { .. } => "complete",
            JobEvent::Cancel => "cancel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub customer_id: String,
    pub technician_id: Option<String>,
    pub status: JobStatus,
    pub service_type: ServiceType,
    pub vehicle_type: VehicleType,
    pub location: GeoLocation,
    pub price: u32,
    pub otp: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Build a fresh job in SEARCHING with its price and OTP stamped once
    pub fn new(
        customer_id: String,
        service_type: ServiceType,
        vehicle_type: VehicleType,
        location: GeoLocation,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("JOB-{}", Uuid::new_v4()),
            customer_id,
            technician_id: None,
            status: JobStatus::Searching,
            service_type,
            vehicle_type,
            location,
            price: pricing::price(service_type, vehicle_type),
            otp: generate_otp(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Four-digit numeric code in 1000..=9999
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(1000..=9999u16).to_string()
}

pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::services::{
    CreateJobRequest, DispatchService, DispatchSummary, TechnicianPresence, TechnicianStatus,
    TrackingSnapshot,
};
pub use config::{Config, DeclinePolicy, DispatchConfig};
pub use domain::entities::{GeoLocation, Job, JobEvent, JobStatus, ServiceType, VehicleType};
pub use domain::errors::{DispatchError, DispatchResult};
pub use domain::events::DispatchEvent;
pub use shared::events::LocalEventBus;

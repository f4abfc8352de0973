pub mod dispatch_service;
pub mod geo_tracker;
pub mod offer_timer;
pub mod technician_presence;

pub use dispatch_service::{CreateJobRequest, DispatchService, DispatchSummary, TechnicianStatus};
pub use geo_tracker::{GeoTracker, TrackingHandle, TrackingSnapshot};
pub use offer_timer::OfferTimer;
pub use technician_presence::TechnicianPresence;

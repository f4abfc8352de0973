use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::application::services::geo_tracker::{GeoTracker, TrackingHandle, TrackingSnapshot};
use crate::application::services::offer_timer::OfferTimer;
use crate::config::{DeclinePolicy, DispatchConfig};
use crate::domain::entities::{GeoLocation, Job, JobEvent, JobStatus, ServiceType, VehicleType};
use crate::domain::errors::{DispatchError, DispatchResult};
use crate::domain::events::DispatchEvent;
use crate::domain::ports::availability::TechnicianAvailability;
use crate::domain::ports::event_bus::{EventBus, EventStream};
use crate::domain::ports::location_source::LocationSource;
use crate::domain::ports::task_spawner::TaskSpawner;
use crate::domain::ports::time_service::TimeService;
use crate::domain::services::state_machine::{self, Transition};

const NO_TECHNICIAN_MESSAGE: &str = "No online technicians found nearby.";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobRequest {
    pub customer_id: String,
    pub service_type: ServiceType,
    pub vehicle_type: VehicleType,
    pub location: GeoLocation,
}

#[derive(Debug, Clone, Serialize)]
pub struct TechnicianStatus {
    pub technician_id: String,
    pub online: bool,
    pub position: GeoLocation,
}

/// Admin view over the slot and history
#[derive(Debug, Clone, Serialize)]
pub struct DispatchSummary {
    pub active_job: Option<Job>,
    pub completed_jobs: usize,
    pub revenue: u64,
    pub technician_online: bool,
}

struct ActiveJob {
    job: Job,
    offer_timer: Option<OfferTimer>,
    tracking: Option<TrackingHandle>,
}

impl ActiveJob {
    fn stop_background(&mut self) {
        if let Some(timer) = self.offer_timer.take() {
            timer.cancel();
        }
        if let Some(tracking) = self.tracking.take() {
            tracking.cancel();
        }
    }
}

/// Everything guarded by the single-writer lock
struct DispatchSlot {
    active: Option<ActiveJob>,
    /// Completed jobs, most recent first
    history: VecDeque<Job>,
    tracker: GeoTracker,
}

impl DispatchSlot {
    fn active_with_id(&mut self, job_id: &str) -> Option<&mut ActiveJob> {
        self.active.as_mut().filter(|active| active.job.id == job_id)
    }

    fn clear_active(&mut self) -> Option<Job> {
        self.active.take().map(|mut active| {
            active.stop_background();
            active.job
        })
    }
}

/// Owns the active job slot and drives it with the offer timer, the
/// tracking loop and caller-issued events.
#[derive(Clone)]
pub struct DispatchService {
    slot: Arc<Mutex<DispatchSlot>>,
    config: Arc<DispatchConfig>,
    event_bus: Arc<dyn EventBus>,
    task_spawner: Arc<dyn TaskSpawner>,
    time_service: Arc<dyn TimeService>,
    availability: Arc<dyn TechnicianAvailability>,
    location_source: Arc<dyn LocationSource>,
}

impl DispatchService {
    pub fn new(
        config: DispatchConfig,
        event_bus: Arc<dyn EventBus>,
        task_spawner: Arc<dyn TaskSpawner>,
        time_service: Arc<dyn TimeService>,
        availability: Arc<dyn TechnicianAvailability>,
        location_source: Arc<dyn LocationSource>,
    ) -> Self {
        let slot = DispatchSlot {
            active: None,
            history: VecDeque::new(),
            tracker: GeoTracker::new(&config),
        };

        Self {
            slot: Arc::new(Mutex::new(slot)),
            config: Arc::new(config),
            event_bus,
            task_spawner,
            time_service,
            availability,
            location_source,
        }
    }

    /// Open a new job in SEARCHING and arm its offer timer
    pub async fn create_job(&self, request: CreateJobRequest) -> DispatchResult<Job> {
        let mut slot = self.slot.lock().await;

        if let Some(active) = &slot.active {
            tracing::warn!(
                "Rejecting new job for customer {}: job {} is still active",
                request.customer_id,
                active.job.id
            );
            return Err(DispatchError::JobAlreadyActive(active.job.id.clone()));
        }

        let job = Job::new(
            request.customer_id,
            request.service_type,
            request.vehicle_type,
            request.location,
            self.time_service.now(),
        );

        let technician_start = self.technician_start(job.location);
        slot.tracker.relocate_customer(job.location);
        slot.tracker.relocate_technician(technician_start);

        let offer_timer = self.arm_offer_timer(job.id.clone());
        slot.active = Some(ActiveJob {
            job: job.clone(),
            offer_timer: Some(offer_timer),
            tracking: None,
        });

        metrics::counter!("dispatch_jobs_created_total").increment(1);
        tracing::info!(
            "Job {} created: {} for {} at ({:.4}, {:.4}), price {}",
            job.id,
            job.service_type,
            job.vehicle_type,
            job.location.lat,
            job.location.lng,
            job.price
        );

        self.event_bus.publish(DispatchEvent::JobCreated {
            job: job.clone(),
            timestamp: self.timestamp(),
        });

        Ok(job)
    }

    /// Apply a lifecycle event to the active job
    pub async fn update_status(&self, job_id: &str, event: JobEvent) -> DispatchResult<Job> {
        let mut slot = self.slot.lock().await;
        self.apply_event(&mut slot, job_id, &event)
    }

    /// Customer cancellation of the active job while it is still searching.
    /// Cancelled jobs never reach history.
    pub async fn cancel_job(&self) -> DispatchResult<Job> {
        let mut slot = self.slot.lock().await;
        let job_id = slot
            .active
            .as_ref()
            .map(|active| active.job.id.clone())
            .ok_or(DispatchError::NoActiveJob)?;

        self.apply_event(&mut slot, &job_id, &JobEvent::Cancel)
    }

    /// Toggle the technician's availability. Coming online relocates the
    /// technician to the location source's fix, or the default location.
    pub async fn set_technician_online(&self, online: bool) -> TechnicianStatus {
        let going_online = online && !self.availability.is_available();
        let fix = if going_online {
            match self.location_source.current_location().await {
                Some(location) => Some(location),
                None => {
                    tracing::info!("No technician position available, using default location");
                    Some(self.config.default_location)
                }
            }
        } else {
            None
        };

        let mut slot = self.slot.lock().await;
        let previous = self.availability.set_available(online);

        if let (Some(location), false) = (fix, previous) {
            slot.tracker.relocate_technician(location);
        }

        if previous != online {
            tracing::info!(
                "Technician {} is now {}",
                self.availability.technician_id(),
                if online { "online" } else { "offline" }
            );
            self.event_bus
                .publish(DispatchEvent::TechnicianAvailabilityChanged {
                    technician_id: self.availability.technician_id().to_string(),
                    online,
                    timestamp: self.timestamp(),
                });
        }

        TechnicianStatus {
            technician_id: self.availability.technician_id().to_string(),
            online,
            position: slot.tracker.technician(),
        }
    }

    pub async fn active_job(&self) -> Option<Job> {
        let slot = self.slot.lock().await;
        slot.active.as_ref().map(|active| active.job.clone())
    }

    /// Completed jobs, most recent first
    pub async fn history(&self) -> Vec<Job> {
        let slot = self.slot.lock().await;
        slot.history.iter().cloned().collect()
    }

    pub async fn tracking(&self) -> TrackingSnapshot {
        let slot = self.slot.lock().await;
        slot.tracker.snapshot()
    }

    pub async fn technician_status(&self) -> TechnicianStatus {
        let slot = self.slot.lock().await;
        TechnicianStatus {
            technician_id: self.availability.technician_id().to_string(),
            online: self.availability.is_available(),
            position: slot.tracker.technician(),
        }
    }

    pub async fn summary(&self) -> DispatchSummary {
        let slot = self.slot.lock().await;
        DispatchSummary {
            active_job: slot.active.as_ref().map(|active| active.job.clone()),
            completed_jobs: slot.history.len(),
            revenue: slot.history.iter().map(|job| u64::from(job.price)).sum(),
            technician_online: self.availability.is_available(),
        }
    }

    pub fn subscribe(&self) -> EventStream {
        self.event_bus.subscribe()
    }

    fn apply_event(
        &self,
        slot: &mut DispatchSlot,
        job_id: &str,
        event: &JobEvent,
    ) -> DispatchResult<Job> {
        let active = slot
            .active_with_id(job_id)
            .ok_or_else(|| DispatchError::JobNotFound(job_id.to_string()))?;

        // The offer only ever goes to the configured technician
        if let JobEvent::Accept { technician_id } = event {
            if technician_id != self.availability.technician_id() {
                tracing::warn!(
                    "Rejected accept for job {} from unknown technician {}",
                    job_id,
                    technician_id
                );
                return Err(DispatchError::InvalidTransition {
                    from: active.job.status,
                    event: event.name(),
                });
            }
        }

        let transition =
            match state_machine::apply_transition(&active.job, event, self.time_service.now()) {
                Ok(transition) => transition,
                Err(e) => {
                    if e == DispatchError::OtpMismatch {
                        metrics::counter!("dispatch_otp_mismatch_total").increment(1);
                    }
                    tracing::warn!("Rejected {} for job {}: {}", event.name(), job_id, e);
                    return Err(e);
                }
            };

        active.job = transition.job.clone();
        self.publish_transition(&transition);

        match transition.job.status {
            JobStatus::Searching => self.handle_decline(slot, job_id),
            JobStatus::Accepted => {
                let tracking = self.start_tracking(job_id.to_string());
                if let Some(active) = slot.active_with_id(job_id) {
                    active.tracking = Some(tracking);
                }
            }
            JobStatus::Completed => {
                slot.clear_active();
                slot.history.push_front(transition.job.clone());

                metrics::counter!("dispatch_jobs_completed_total").increment(1);
                tracing::info!(
                    "Job {} completed and archived ({} in history)",
                    job_id,
                    slot.history.len()
                );
                self.event_bus.publish(DispatchEvent::HistoryAppended {
                    job: transition.job.clone(),
                    history_len: slot.history.len(),
                    timestamp: self.timestamp(),
                });
            }
            JobStatus::Cancelled => {
                slot.clear_active();
                metrics::counter!("dispatch_jobs_cancelled_total").increment(1);
                tracing::info!("Job {} cancelled by customer", job_id);
            }
            JobStatus::Offered | JobStatus::Arrived | JobStatus::InProgress => {}
        }

        Ok(transition.job)
    }

    fn handle_decline(&self, slot: &mut DispatchSlot, job_id: &str) {
        let requeued = match self.config.decline_policy {
            DeclinePolicy::Requeue => {
                let timer = self.arm_offer_timer(job_id.to_string());
                if let Some(active) = slot.active_with_id(job_id) {
                    active.offer_timer = Some(timer);
                }
                true
            }
            DeclinePolicy::Discard => {
                slot.clear_active();
                false
            }
        };

        tracing::info!(
            "Offer for job {} declined, {}",
            job_id,
            if requeued { "searching again" } else { "job discarded" }
        );
        self.event_bus.publish(DispatchEvent::OfferDeclined {
            job_id: job_id.to_string(),
            requeued,
            timestamp: self.timestamp(),
        });
    }

    fn arm_offer_timer(&self, job_id: String) -> OfferTimer {
        let service = self.clone();
        OfferTimer::arm(
            self.task_spawner.as_ref(),
            self.time_service.clone(),
            self.config.offer_delay,
            move |token| async move {
                service.on_offer_timer_fired(&job_id, &token).await;
            },
        )
    }

    async fn on_offer_timer_fired(&self, job_id: &str, token: &CancellationToken) {
        let mut slot = self.slot.lock().await;

        if token.is_cancelled() {
            return;
        }

        let searching = matches!(
            &slot.active,
            Some(active) if active.job.id == job_id && active.job.status == JobStatus::Searching
        );
        if !searching {
            tracing::debug!("Offer timer for job {} expired on a stale job", job_id);
            return;
        }

        if !self.availability.is_available() {
            slot.clear_active();
            metrics::counter!("dispatch_no_technician_total").increment(1);
            tracing::info!("No technician available for job {}, job discarded", job_id);
            self.event_bus.publish(DispatchEvent::NoTechnicianFound {
                job_id: job_id.to_string(),
                message: NO_TECHNICIAN_MESSAGE.to_string(),
                timestamp: self.timestamp(),
            });
            return;
        }

        let now = self.time_service.now();
        let Some(active) = slot.active_with_id(job_id) else {
            return;
        };
        active.offer_timer = None;

        match state_machine::apply_transition(&active.job, &JobEvent::Offer, now) {
            Ok(transition) => {
                active.job = transition.job.clone();
                tracing::info!(
                    "Job {} offered to technician {}",
                    job_id,
                    self.availability.technician_id()
                );
                self.publish_transition(&transition);
            }
            Err(e) => tracing::error!("Offer for job {} failed: {}", job_id, e),
        }
    }

    fn start_tracking(&self, job_id: String) -> TrackingHandle {
        let service = self.clone();
        TrackingHandle::start(
            self.task_spawner.as_ref(),
            self.time_service.clone(),
            self.config.tracking_tick,
            move |token| {
                let service = service.clone();
                let job_id = job_id.clone();
                async move { service.on_tracking_tick(&job_id, &token).await }
            },
        )
    }

    /// One tracker step; returns whether the loop should keep running
    async fn on_tracking_tick(&self, job_id: &str, token: &CancellationToken) -> bool {
        let mut slot = self.slot.lock().await;

        if token.is_cancelled() {
            return false;
        }

        let trackable = matches!(
            &slot.active,
            Some(active) if active.job.id == job_id && active.job.status.is_trackable()
        );
        if !trackable {
            return false;
        }

        if let Some(position) = slot.tracker.tick() {
            let distance_km = slot.tracker.distance_km();
            tracing::debug!(
                "Technician for job {} at ({:.5}, {:.5}), {:.2} km away",
                job_id,
                position.lat,
                position.lng,
                distance_km
            );
            self.event_bus.publish(DispatchEvent::TechnicianMoved {
                job_id: job_id.to_string(),
                position,
                distance_km,
                timestamp: self.timestamp(),
            });
        }

        true
    }

    fn publish_transition(&self, transition: &Transition) {
        metrics::counter!(
            "dispatch_transitions_total",
            "status" => transition.job.status.as_str()
        )
        .increment(1);

        tracing::info!(
            "Job {} moved from {} to {}",
            transition.job.id,
            transition.previous,
            transition.job.status
        );

        self.event_bus.publish(DispatchEvent::JobStatusChanged {
            job: transition.job.clone(),
            previous: transition.previous,
            timestamp: self.timestamp(),
        });
    }

    /// Technician start point: the job location plus uniform jitter per axis
    fn technician_start(&self, location: GeoLocation) -> GeoLocation {
        let jitter = self.config.technician_start_jitter_deg;
        if !(jitter > 0.0 && jitter.is_finite()) {
            return location;
        }
        let mut rng = rand::thread_rng();
        location.offset(rng.gen_range(-jitter..jitter), rng.gen_range(-jitter..jitter))
    }

    fn timestamp(&self) -> String {
        self.time_service.now().to_rfc3339()
    }
}

use fixdispatch::application::services::{CreateJobRequest, DispatchService, TechnicianPresence};
use fixdispatch::config::DispatchConfig;
use fixdispatch::domain::entities::{GeoLocation, Job, JobEvent, ServiceType, VehicleType};
use fixdispatch::domain::events::DispatchEvent;
use fixdispatch::domain::ports::availability::TechnicianAvailability;
use fixdispatch::domain::ports::event_bus::{EventBus, EventStream};
use fixdispatch::domain::ports::time_service::TimeService;
use fixdispatch::infrastructure::providers::location_provider::StaticLocationSource;
use fixdispatch::infrastructure::runtime::tokio::{TokioTaskSpawner, TokioTimeService};
use fixdispatch::LocalEventBus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;

pub const OFFER_DELAY: Duration = Duration::from_millis(3000);
pub const TICK: Duration = Duration::from_millis(1000);

pub struct TestHarness {
    pub service: DispatchService,
    pub bus: Arc<LocalEventBus>,
    pub presence: Arc<TechnicianPresence>,
}

pub fn harness() -> TestHarness {
    harness_with(DispatchConfig::default(), None)
}

pub fn harness_with(config: DispatchConfig, technician_fix: Option<GeoLocation>) -> TestHarness {
    harness_with_clock(config, technician_fix, Arc::new(TokioTimeService::new()))
}

/// Tokio sleeps with a wall clock frozen at one instant
pub struct FixedClock(pub DateTime<Utc>);

#[async_trait]
impl TimeService for FixedClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn harness_with_clock(
    config: DispatchConfig,
    technician_fix: Option<GeoLocation>,
    time_service: Arc<dyn TimeService>,
) -> TestHarness {
    let bus = Arc::new(LocalEventBus::new(1000));
    let presence = Arc::new(TechnicianPresence::new(config.technician_id.clone()));

    let service = DispatchService::new(
        config,
        bus.clone() as Arc<dyn EventBus>,
        Arc::new(TokioTaskSpawner::new()),
        time_service,
        presence.clone() as Arc<dyn TechnicianAvailability>,
        Arc::new(StaticLocationSource::new(technician_fix)),
    );

    TestHarness {
        service,
        bus,
        presence,
    }
}

pub fn customer_location() -> GeoLocation {
    GeoLocation::new(31.51, 74.34)
}

pub fn car_patch_request() -> CreateJobRequest {
    CreateJobRequest {
        customer_id: "cust_123".to_string(),
        service_type: ServiceType::TubePatch,
        vehicle_type: VehicleType::Car,
        location: customer_location(),
    }
}

pub fn bike_patch_request() -> CreateJobRequest {
    CreateJobRequest {
        vehicle_type: VehicleType::Bike,
        ..car_patch_request()
    }
}

pub fn accept() -> JobEvent {
    JobEvent::Accept {
        technician_id: "tech_001".to_string(),
    }
}

pub fn wrong_otp(job: &Job) -> String {
    if job.otp == "1000" {
        "1001".to_string()
    } else {
        "1000".to_string()
    }
}

/// Sleep just past the offer delay so the timer has fired
pub async fn wait_for_offer() {
    tokio::time::sleep(OFFER_DELAY + Duration::from_millis(1)).await;
}

/// Create a job and walk it to ACCEPTED
pub async fn accepted_job(harness: &TestHarness, request: CreateJobRequest) -> Job {
    let job = harness.service.create_job(request).await.unwrap();
    wait_for_offer().await;
    harness.service.update_status(&job.id, accept()).await.unwrap()
}

/// Create a job and walk it to IN_PROGRESS
pub async fn in_progress_job(harness: &TestHarness, request: CreateJobRequest) -> Job {
    let job = accepted_job(harness, request).await;
    harness
        .service
        .update_status(&job.id, JobEvent::Arrive)
        .await
        .unwrap();
    harness
        .service
        .update_status(&job.id, JobEvent::Start)
        .await
        .unwrap()
}

/// Everything already published on `events`, without waiting for timers
pub async fn drain_events(events: &mut EventStream) -> Vec<DispatchEvent> {
    let mut received = Vec::new();
    while let Ok(Some(Ok(event))) =
        tokio::time::timeout(Duration::from_millis(10), events.next()).await
    {
        received.push(event);
    }
    received
}

pub fn event_names(events: &[DispatchEvent]) -> Vec<&'static str> {
    events
        .iter()
        .filter(|event| !matches!(event, DispatchEvent::TechnicianMoved { .. }))
        .map(|event| event.name())
        .collect()
}

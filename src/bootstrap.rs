use crate::application::listeners::run_activity_listener;
use crate::application::services::{DispatchService, TechnicianPresence};
use crate::config::Config;
use crate::domain::ports::availability::TechnicianAvailability;
use crate::domain::ports::event_bus::EventBus;
use crate::domain::ports::location_source::LocationSource;
use crate::domain::ports::task_spawner::TaskSpawner;
use crate::domain::ports::time_service::TimeService;
use crate::infrastructure::http::middleware::AppState;
use crate::infrastructure::providers::location_provider::StaticLocationSource;
use crate::infrastructure::runtime::tokio::{TokioTaskSpawner, TokioTimeService};
use crate::shared::events::LocalEventBus;
use std::sync::Arc;

/// Wire the dispatch engine to its tokio adapters and start the activity
/// listener. Must run inside a tokio runtime.
pub fn build_app_state(config: &Config) -> AppState {
    let task_spawner = Arc::new(TokioTaskSpawner::new()) as Arc<dyn TaskSpawner>;
    let time_service = Arc::new(TokioTimeService::new()) as Arc<dyn TimeService>;

    let event_bus = Arc::new(LocalEventBus::new(config.event_bus_capacity)) as Arc<dyn EventBus>;
    tracing::info!(
        "Event bus initialized with capacity {}",
        config.event_bus_capacity
    );

    let availability = Arc::new(TechnicianPresence::new(
        config.dispatch.technician_id.clone(),
    )) as Arc<dyn TechnicianAvailability>;

    let location_source =
        Arc::new(StaticLocationSource::new(config.technician_gps)) as Arc<dyn LocationSource>;

    let dispatch_service = DispatchService::new(
        config.dispatch.clone(),
        event_bus.clone(),
        task_spawner.clone(),
        time_service,
        availability,
        location_source,
    );
    tracing::info!(
        "Dispatch service initialized (offer delay {:?}, tracking tick {:?}, decline policy {:?})",
        config.dispatch.offer_delay,
        config.dispatch.tracking_tick,
        config.dispatch.decline_policy
    );

    task_spawner.spawn(Box::pin(run_activity_listener(event_bus)));

    AppState { dispatch_service }
}

use crate::domain::events::DispatchEvent;
use crate::domain::ports::event_bus::EventBus;
use std::sync::Arc;
use tokio_stream::StreamExt;

/// Admin-side consumer of the dispatch event stream: logs every event and
/// counts it by type. Runs until the bus is dropped.
pub async fn run_activity_listener(event_bus: Arc<dyn EventBus>) {
    tracing::info!("Activity listener started");

    let mut receiver = event_bus.subscribe();

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(event) => {
                metrics::counter!("dispatch_events_total", "event" => event.name()).increment(1);
                record(&event);
            }
            Err(e) => {
                tracing::warn!("Activity listener lagged behind the event bus: {}", e);
            }
        }
    }

    tracing::info!("Activity listener stopped");
}

fn record(event: &DispatchEvent) {
    match event {
        DispatchEvent::JobCreated { job, timestamp } => {
            tracing::info!(
                "Activity: job {} requested by {} ({} / {}, Rs. {}) at {}",
                job.id,
                job.customer_id,
                job.vehicle_type,
                job.service_type,
                job.price,
                timestamp
            );
        }
        DispatchEvent::JobStatusChanged {
            job,
            previous,
            timestamp,
        } => {
            tracing::info!(
                "Activity: job {} {} -> {} at {}",
                job.id,
                previous,
                job.status,
                timestamp
            );
        }
        DispatchEvent::NoTechnicianFound {
            job_id,
            message,
            timestamp,
        } => {
            tracing::warn!("Activity: job {} unmatched ({}) at {}", job_id, message, timestamp);
        }
        DispatchEvent::OfferDeclined {
            job_id,
            requeued,
            timestamp,
        } => {
            tracing::info!(
                "Activity: offer for job {} declined (requeued: {}) at {}",
                job_id,
                requeued,
                timestamp
            );
        }
        DispatchEvent::HistoryAppended {
            job,
            history_len,
            timestamp,
        } => {
            tracing::info!(
                "Activity: job {} archived, Rs. {} earned, {} completed jobs at {}",
                job.id,
                job.price,
                history_len,
                timestamp
            );
        }
        DispatchEvent::TechnicianAvailabilityChanged {
            technician_id,
            online,
            timestamp,
        } => {
            tracing::info!(
                "Activity: technician {} online={} at {}",
                technician_id,
                online,
                timestamp
            );
        }
        DispatchEvent::TechnicianMoved {
            job_id,
            distance_km,
            ..
        } => {
            tracing::trace!("Activity: job {} technician {:.2} km away", job_id, distance_km);
        }
    }
}

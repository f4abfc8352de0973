use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::DispatchConfig;
use crate::domain::entities::GeoLocation;
use crate::domain::ports::task_spawner::TaskSpawner;
use crate::domain::ports::time_service::TimeService;

/// Positions of the two parties of a job.
///
/// The customer (service location) is stationary; the technician approaches
/// it by a fixed fraction of the remaining gap per tick, so movement decays
/// and never overshoots. Once within the arrival threshold the technician
/// is frozen, independently of the job status.
#[derive(Debug, Clone)]
pub struct GeoTracker {
    customer: GeoLocation,
    technician: GeoLocation,
    step_fraction: f64,
    arrival_threshold_deg: f64,
    km_per_degree: f64,
    average_speed_kmh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingSnapshot {
    pub customer: GeoLocation,
    pub technician: GeoLocation,
    pub distance_km: f64,
    pub eta_minutes: Option<f64>,
    pub arrived: bool,
}

impl GeoTracker {
    /// Customer at the default location, technician a short hop away
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            customer: config.default_location,
            technician: config.default_location.offset(0.01, 0.01),
            step_fraction: config.step_fraction,
            arrival_threshold_deg: config.arrival_threshold_deg,
            km_per_degree: config.km_per_degree,
            average_speed_kmh: config.average_speed_kmh,
        }
    }

    pub fn customer(&self) -> GeoLocation {
        self.customer
    }

    pub fn technician(&self) -> GeoLocation {
        self.technician
    }

    pub fn relocate_customer(&mut self, location: GeoLocation) {
        self.customer = location;
    }

    pub fn relocate_technician(&mut self, location: GeoLocation) {
        self.technician = location;
    }

    pub fn distance_degrees(&self) -> f64 {
        self.technician.distance_degrees(&self.customer)
    }

    pub fn distance_km(&self) -> f64 {
        self.technician.distance_km(&self.customer, self.km_per_degree)
    }

    pub fn has_arrived(&self) -> bool {
        self.distance_degrees() < self.arrival_threshold_deg
    }

    /// Minutes to cover the straight-line gap at the configured average speed
    pub fn eta_minutes(&self) -> Option<f64> {
        if self.has_arrived() {
            return Some(0.0);
        }
        if self.average_speed_kmh > 0.0 {
            Some(self.distance_km() / self.average_speed_kmh * 60.0)
        } else {
            None
        }
    }

    /// Advance the technician one step. Returns the new position, or `None`
    /// when already within the arrival threshold.
    pub fn tick(&mut self) -> Option<GeoLocation> {
        if self.has_arrived() {
            return None;
        }
        self.technician = self.technician.step_toward(&self.customer, self.step_fraction);
        Some(self.technician)
    }

    pub fn snapshot(&self) -> TrackingSnapshot {
        TrackingSnapshot {
            customer: self.customer,
            technician: self.technician,
            distance_km: self.distance_km(),
            eta_minutes: self.eta_minutes(),
            arrived: self.has_arrived(),
        }
    }
}

/// Handle to a running periodic tracking loop
#[derive(Debug)]
pub struct TrackingHandle {
    token: CancellationToken,
}

impl TrackingHandle {
    /// Call `on_tick` every `period` until it returns `false` or the handle is
    /// cancelled. `on_tick` receives the loop's token so it can re-check
    /// cancellation inside its own critical section.
    pub fn start<F, Fut>(
        spawner: &dyn TaskSpawner,
        time_service: Arc<dyn TimeService>,
        period: Duration,
        mut on_tick: F,
    ) -> Self
    where
        F: FnMut(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let token = CancellationToken::new();
        let task_token = token.clone();

        spawner.spawn(Box::pin(async move {
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = time_service.sleep(period) => {
                        if !on_tick(task_token.clone()).await {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Tracking loop stopped");
        }));

        Self { token }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> GeoTracker {
        let mut tracker = GeoTracker::new(&DispatchConfig::default());
        tracker.relocate_customer(GeoLocation::new(31.51, 74.34));
        tracker.relocate_technician(GeoLocation::new(31.52, 74.35));
        tracker
    }

    #[test]
    fn test_initial_technician_offset() {
        let config = DispatchConfig::default();
        let tracker = GeoTracker::new(&config);
        assert_eq!(tracker.customer(), config.default_location);
        assert!((tracker.technician().lat - (config.default_location.lat + 0.01)).abs() < 1e-12);
        assert!((tracker.technician().lng - (config.default_location.lng + 0.01)).abs() < 1e-12);
    }

    #[test]
    fn test_tick_moves_five_percent_of_gap() {
        let mut tracker = tracker();
        let before = tracker.distance_degrees();
        tracker.tick().unwrap();
        let after = tracker.distance_degrees();
        assert!((after - before * 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_distance_km_and_eta() {
        let tracker = tracker();
        let expected_km = (0.01f64 * 0.01 * 2.0).sqrt() * 111.0;
        assert!((tracker.distance_km() - expected_km).abs() < 1e-9);
        let eta = tracker.eta_minutes().unwrap();
        assert!((eta - expected_km / 20.0 * 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_frozen_inside_threshold() {
        let mut tracker = tracker();
        tracker.relocate_technician(GeoLocation::new(31.5102, 74.3402));
        assert!(tracker.has_arrived());
        let before = tracker.technician();
        assert!(tracker.tick().is_none());
        assert_eq!(tracker.technician(), before);
        assert_eq!(tracker.eta_minutes(), Some(0.0));
    }

    #[test]
    fn test_zero_speed_has_no_eta() {
        let config = DispatchConfig {
            average_speed_kmh: 0.0,
            ..DispatchConfig::default()
        };
        let tracker = GeoTracker::new(&config);
        assert!(tracker.eta_minutes().is_none());
    }
}

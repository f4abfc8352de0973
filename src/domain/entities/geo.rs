use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
}

impl GeoLocation {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.lat + d_lat, self.lng + d_lng)
    }

    /// Planar Euclidean distance in degrees
    pub fn distance_degrees(&self, other: &GeoLocation) -> f64 {
        let d_lat = other.lat - self.lat;
        let d_lng = other.lng - self.lng;
        (d_lat * d_lat + d_lng * d_lng).sqrt()
    }

    /// Flat-earth kilometre approximation; only meaningful over a few km.
    pub fn distance_km(&self, other: &GeoLocation, km_per_degree: f64) -> f64 {
        self.distance_degrees(other) * km_per_degree
    }

    /// Move `fraction` of the way toward `target` on each axis independently.
    pub fn step_toward(&self, target: &GeoLocation, fraction: f64) -> Self {
        Self::new(
            self.lat + (target.lat - self.lat) * fraction,
            self.lng + (target.lng - self.lng) * fraction,
        )
    }
}

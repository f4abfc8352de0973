use crate::domain::entities::GeoLocation;
use crate::domain::ports::location_source::LocationSource;
use async_trait::async_trait;

/// Location source backed by a fixed, optional fix (e.g. from configuration).
/// `None` models a device without a GPS fix.
#[derive(Clone, Debug, Default)]
pub struct StaticLocationSource {
    fix: Option<GeoLocation>,
}

impl StaticLocationSource {
    pub fn new(fix: Option<GeoLocation>) -> Self {
        Self { fix }
    }
}

#[async_trait]
impl LocationSource for StaticLocationSource {
    async fn current_location(&self) -> Option<GeoLocation> {
        self.fix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_configured_fix() {
        let fix = GeoLocation::new(31.6, 74.4);
        let source = StaticLocationSource::new(Some(fix));
        assert_eq!(source.current_location().await, Some(fix));
    }

    #[tokio::test]
    async fn test_unavailable_has_no_fix() {
        assert_eq!(StaticLocationSource::new(None).current_location().await, None);
    }
}

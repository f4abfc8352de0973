use crate::domain::entities::GeoLocation;
use async_trait::async_trait;

/// External position source (device GPS in a real deployment)
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Current fix, or `None` when no position is available
    async fn current_location(&self) -> Option<GeoLocation>;
}

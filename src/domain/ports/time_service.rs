use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Clock used for offer delays, tracking periods and job timestamps
#[async_trait]
pub trait TimeService: Send + Sync {
    async fn sleep(&self, duration: Duration);

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

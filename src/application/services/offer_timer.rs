use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::domain::ports::task_spawner::TaskSpawner;
use crate::domain::ports::time_service::TimeService;

/// A single delayed, cancellable offer action for a job in SEARCHING.
///
/// Cancelling only stops the sleep; the fire callback receives the token and
/// must re-check it under the same lock the canceller holds, which is what
/// makes cancellation race-free.
#[derive(Debug)]
pub struct OfferTimer {
    token: CancellationToken,
}

impl OfferTimer {
    pub fn arm<F, Fut>(
        spawner: &dyn TaskSpawner,
        time_service: Arc<dyn TimeService>,
        delay: Duration,
        on_fire: F,
    ) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let task_token = token.clone();

        spawner.spawn(Box::pin(async move {
            tokio::select! {
                _ = task_token.cancelled() => {
                    tracing::debug!("Offer timer cancelled before expiry");
                }
                _ = time_service.sleep(delay) => {
                    on_fire(task_token.clone()).await;
                }
            }
        }));

        Self { token }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[cfg(test)]
    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

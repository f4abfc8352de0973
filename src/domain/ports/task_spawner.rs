use futures::future::BoxFuture;

/// Runs offer timers and tracking loops off the caller's task
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, future: BoxFuture<'static, ()>);
}

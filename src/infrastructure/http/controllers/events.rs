use crate::infrastructure::http::middleware::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use std::convert::Infallible;
use tokio_stream::StreamExt;

/// GET /api/events - Server-sent stream of dispatch events
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!("SSE subscriber connected");

    let stream = state
        .dispatch_service
        .subscribe()
        .filter_map(|msg| match msg {
            Ok(event) => {
                let json_data = serde_json::to_string(&event).unwrap_or_else(|e| {
                    tracing::error!("Failed to serialize dispatch event: {}", e);
                    "{}".to_string()
                });
                Some(Ok(Event::default().event(event.name()).data(json_data)))
            }
            Err(e) => {
                tracing::warn!("SSE subscriber lagged: {}", e);
                None
            }
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Real-time notification stream (SSE)
///
/// Streams lifecycle events addressed to the authenticated user using
/// Server-Sent Events. The server filters by recipient before anything is
/// written to the wire, so a client only ever sees its own events.
///
/// Delivery is best-effort and at-most-once: a disconnected client loses
/// the events published while it was away, and a client that lags far
/// behind has its oldest undelivered events dropped.
///
/// # Endpoint
///
/// `GET /v1/notifications/stream`
///
/// # SSE Event Format
///
/// ```text
/// event: task_event
/// data: {"kind":"assigned","task_id":"…","recipient":"…","payload":{…}}
/// ```
///
/// # Example
///
/// ```bash
/// curl -N -H "Authorization: Bearer <token>" \
///   "http://localhost:8080/v1/notifications/stream"
/// ```

use crate::app::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tasktrack_shared::auth::middleware::AuthContext;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

/// Streams the caller's notifications
pub async fn stream_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(user_id = %auth.user_id, "Opening notification stream");

    let receiver = state.dispatcher.subscribe(auth.user_id);

    let stream = BroadcastStream::new(receiver).filter_map(|result| {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(data) => Some(Ok(Event::default().event("task_event").data(data))),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize event");
                    None
                }
            },
            // Lagged receiver: dropped events are gone, keep streaming
            Err(_) => None,
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(25))
            .text("heartbeat"),
    )
}

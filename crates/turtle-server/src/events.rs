//! Server-sent event stream of actor updates.
//!
//! Clients connect to `GET /events` and receive one `data:` event per
//! registry mutation, each carrying the full actor record as JSON. There
//! is no backlog: a new client only sees updates published after it
//! connected and fetches the current state from `/turtles`.
//!
//! When the client goes away Axum drops the response stream, which drops
//! the [`Subscription`](turtle_core::Subscription) and removes the
//! subscriber from the hub. Cancelling [`AppState::shutdown`] ends every
//! open stream so graceful shutdown does not wait on idle viewers.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::state::AppState;

/// Open a push stream for the caller.
///
/// # Route
///
/// `GET /events`
pub async fn events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.hub.subscribe().await;
    debug!(subscriber = %subscription.id(), "Event stream opened");

    let stream = futures::stream::unfold(subscription, |mut subscription| async move {
        loop {
            let Some(record) = subscription.recv().await else {
                debug!(subscriber = %subscription.id(), "Event stream closed by hub");
                return None;
            };
            match Event::default().json_data(&record) {
                Ok(event) => return Some((Ok::<_, Infallible>(event), subscription)),
                Err(e) => {
                    warn!(actor = %record.client_ip, "Failed to serialize actor record: {e}");
                }
            }
        }
    })
    .take_until(state.shutdown.clone().cancelled_owned());

    Sse::new(stream).keep_alive(KeepAlive::new().interval(state.keep_alive))
}

//! HTTP ingestion: snapshot fetch and push-stream reader.
//!
//! Ingestion runs on its own task and only enqueues [`MirrorOp`]s; the
//! render loop applies them. Every connection opens the event stream
//! first and then fetches a snapshot, so an update published before the
//! subscription is covered by the snapshot and anything later arrives as
//! a push. The mirror skips snapshot records older than what it already
//! holds.

use std::fmt::Display;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};
use turtle_types::ActorRecord;

use crate::error::ViewerError;
use crate::scheduler::{MirrorOp, OpSender};
use crate::sse::SseDecoder;

/// Client for the turtle server's read endpoints.
#[derive(Debug, Clone)]
pub struct TurtleClient {
    http: reqwest::Client,
    base_url: String,
}

impl TurtleClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Server base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch recently active actors from `GET /turtles`.
    pub async fn fetch_snapshot(&self) -> Result<Vec<ActorRecord>, ViewerError> {
        let url = format!("{}/turtles", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ViewerError::Http(format!("snapshot request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ViewerError::Http(format!("snapshot returned {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ViewerError::Http(format!("snapshot body read failed: {e}")))?;

        Ok(serde_json::from_slice(&body)?)
    }

    /// Open `GET /events` without reading from it yet.
    ///
    /// The server registers the subscription before it answers, so every
    /// update published after this returns is delivered on the stream.
    pub async fn open_events(&self) -> Result<reqwest::Response, ViewerError> {
        let url = format!("{}/events", self.base_url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(|e| ViewerError::Stream(format!("failed to open {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ViewerError::Stream(format!("{url} returned {status}")));
        }

        info!(url = url, "Event stream opened");
        Ok(response)
    }
}

/// Decode an event-stream byte stream and enqueue one push per record.
///
/// Malformed payloads are logged and skipped. Fails when the byte stream
/// errors, a line or event outgrows the decoder, or the queue's receiver
/// is gone.
pub async fn forward_events<S, B, E>(stream: S, ops: &OpSender) -> Result<usize, ViewerError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = SseDecoder::new();
    let mut forwarded: usize = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ViewerError::Stream(format!("read failed: {e}")))?;

        for event in decoder.feed(chunk.as_ref())? {
            let record = match serde_json::from_str::<ActorRecord>(&event.data) {
                Ok(record) => record,
                Err(e) => {
                    warn!(payload = %event.data, "Skipping malformed event: {e}");
                    continue;
                }
            };
            debug!(actor = %record.client_ip, x = record.x, y = record.y, "Push received");
            if ops.send(MirrorOp::Push(record)).is_err() {
                return Err(ViewerError::QueueClosed);
            }
            forwarded = forwarded.saturating_add(1);
        }
    }

    Ok(forwarded)
}

/// Ingestion task body: subscribe, resync from a snapshot, forward pushes.
///
/// A failed snapshot is logged and the stream is read anyway. When the
/// stream ends or cannot be opened the whole sequence is retried after
/// `reconnect_delay`. Returns when the render loop drops the queue.
pub async fn run_ingestion(client: TurtleClient, ops: OpSender, reconnect_delay: Duration) {
    loop {
        match connect_once(&client, &ops).await {
            Ok(forwarded) => info!(forwarded, "Event stream ended"),
            Err(ViewerError::QueueClosed) => {
                debug!("Render loop gone, stopping ingestion");
                return;
            }
            Err(e) => warn!("Event stream failed: {e}"),
        }

        if ops.is_closed() {
            return;
        }
        debug!(delay_secs = reconnect_delay.as_secs(), "Reconnecting event stream");
        tokio::time::sleep(reconnect_delay).await;
    }
}

/// One connection: subscribe, enqueue a snapshot, then forward pushes.
async fn connect_once(client: &TurtleClient, ops: &OpSender) -> Result<usize, ViewerError> {
    let events = client.open_events().await?;

    match client.fetch_snapshot().await {
        Ok(records) => {
            info!(count = records.len(), "Snapshot loaded");
            if ops.send(MirrorOp::Bootstrap(records)).is_err() {
                return Err(ViewerError::QueueClosed);
            }
        }
        Err(e) => warn!("Snapshot fetch failed, continuing with push stream only: {e}"),
    }

    forward_events(events.bytes_stream(), ops).await
}

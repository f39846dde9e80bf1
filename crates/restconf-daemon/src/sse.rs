//! Server-sent-event delivery for notification subscriptions.
//!
//! One subscription is one response body stream backed by a bounded
//! channel: the notification producer's callback formats a frame and
//! pushes it onto the channel (a full or closed channel surfaces as a
//! send error, standing in for the bounded error channel the original
//! design uses for panic recovery); the stream half feeds frames to the
//! HTTP body until the client disconnects or the producer stops.

use std::pin::Pin;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::http::{HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;
use futures::Stream;
use restconf_browser::{Notification, NotifySink, Selection};
use restconf_core::error::RestconfError;
use restconf_core::wire::WireFormat;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::DropGuard;

/// Process-wide count of currently open notification subscriptions.
/// Advisory only: relaxed ordering is enough since it only feeds
/// observability, never a correctness decision.
#[derive(Default)]
pub struct SubscribeCounter(AtomicI64);

impl SubscribeCounter {
    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }

    fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

const CHANNEL_CAPACITY: usize = 64;

/// Subscribes to `selection`'s notifications and returns an SSE response
/// streaming them until the connection closes or the subscription source
/// stops delivering.
pub async fn serve(
    selection: Selection,
    wire: Box<dyn WireFormat>,
    namespace: String,
    disable_wrapper: bool,
    counter: Arc<SubscribeCounter>,
) -> axum::response::Response {
    let (tx, rx) = mpsc::channel::<Result<Bytes, std::io::Error>>(CHANNEL_CAPACITY);

    let sink_tx = tx.clone();
    let sink: NotifySink = Arc::new(move |event: Notification| {
        let mut frame = String::from("data: ");
        if !disable_wrapper {
            wire.write_notification_start(&mut frame, &namespace, &event.event_time);
        }
        frame.push_str(&restconf_core::encode::to_json_string(&event.event));
        if !disable_wrapper {
            wire.write_notification_end(&mut frame);
        }
        frame.push_str("\n\n");
        sink_tx
            .try_send(Ok(Bytes::from(frame)))
            .map_err(|e| RestconfError::operation_failed(format!("notification send failed: {e}")))
    });

    let ctx = selection.ctx.clone();
    let closer = match selection.notify(sink).await {
        Ok(closer) => closer,
        Err(err) => return render_subscribe_error(err),
    };

    counter.inc();
    let watcher_counter = counter.clone();
    tokio::spawn(async move {
        ctx.cancelled().await;
        closer.close();
        watcher_counter.dec();
    });

    let guard = selection.ctx.clone().drop_guard();
    let body_stream = GuardedStream {
        inner: ReceiverStream::new(rx),
        _guard: guard,
    };

    let mut response = Response::new(Body::from_stream(body_stream));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert("content-type", HeaderValue::from_static("text/event-stream"));
    headers.insert("cache-control", HeaderValue::from_static("no-cache"));
    headers.insert("connection", HeaderValue::from_static("keep-alive"));
    headers.insert("x-accel-buffering", HeaderValue::from_static("no"));
    headers.insert("transfer-encoding", HeaderValue::from_static("identity"));
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    response
}

fn render_subscribe_error(err: RestconfError) -> axum::response::Response {
    (StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), err.to_string())
        .into_response()
}

/// Wraps a frame stream together with the [`DropGuard`] that cancels the
/// subscription's context when the HTTP body is dropped (client
/// disconnect, server shutdown, or normal completion).
struct GuardedStream<S> {
    inner: S,
    _guard: DropGuard,
}

impl<S> Stream for GuardedStream<S>
where
    S: Stream + Unpin,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        Pin::new(&mut this.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_tracks_open_subscriptions() {
        let counter = SubscribeCounter::default();
        counter.inc();
        counter.inc();
        assert_eq!(counter.get(), 2);
        counter.dec();
        assert_eq!(counter.get(), 1);
    }
}

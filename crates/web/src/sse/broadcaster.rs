//! Broadcast channel for viewer screens

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

use super::events::SessionEvent;

pub const DEFAULT_CAPACITY: usize = 100;

/// Fans session events out to every viewer subscribed to one named topic.
///
/// Delivery is best effort and in publish order. A subscriber only sees
/// events published after it subscribed; there is no backlog.
#[derive(Clone)]
pub struct Broadcaster {
    topic: Arc<str>,
    tx: broadcast::Sender<SessionEvent>,
}

impl Broadcaster {
    /// Create a broadcaster for `topic`
    ///
    /// # Arguments
    ///
    /// * `capacity` - Events buffered per subscriber before a slow viewer starts
    ///   missing updates
    pub fn new(topic: impl Into<Arc<str>>, capacity: usize) -> Self {
        let topic = topic.into();
        let (tx, _) = broadcast::channel(capacity.max(1));
        info!("Broadcaster for topic '{}' initialized with capacity {}", topic, capacity);
        Self { topic, tx }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publish to all current subscribers. Returns how many were reached;
    /// having none is not an error.
    pub fn publish(&self, event: SessionEvent) -> usize {
        let kind = event.kind();
        match self.tx.send(event) {
            Ok(count) => {
                debug!("Published {} to {} viewer(s) on '{}'", kind, count, self.topic);
                count
            }
            Err(_) => {
                debug!("Published {} on '{}' with no viewers connected", kind, self.topic);
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Event stream for one viewer. Events a lagging viewer missed are skipped.
    pub fn subscribe_stream(&self) -> impl Stream<Item = Result<Event, Infallible>> + use<> {
        let stream = BroadcastStream::new(self.tx.subscribe());

        stream.filter_map(|result| async move {
            match result {
                Ok(event) => match Event::default().event(event.kind()).json_data(&event) {
                    Ok(sse_event) => Some(Ok(sse_event)),
                    Err(e) => {
                        warn!("Failed to serialize {} event: {}", event.kind(), e);
                        None
                    }
                },
                Err(e) => {
                    warn!("Viewer fell behind: {:?}", e);
                    None
                }
            }
        })
    }

    /// Axum SSE response for a viewer connecting to this topic
    pub fn sse_response(&self) -> Sse<impl Stream<Item = Result<Event, Infallible>> + use<>> {
        info!(
            "Viewer connected to '{}', total viewers: {}",
            self.topic,
            self.subscriber_count() + 1
        );

        Sse::new(self.subscribe_stream()).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("keep-alive"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    fn update(remaining_seconds: u32) -> SessionEvent {
        SessionEvent::TimerUpdate { remaining_seconds }
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let broadcaster = Broadcaster::new("match_updates", 8);
        assert_eq!(broadcaster.publish(update(10)), 0);
        assert_eq!(broadcaster.topic(), "match_updates");
    }

    #[test]
    fn test_every_subscriber_receives_in_publish_order() {
        let broadcaster = Broadcaster::new("match_updates", 8);
        let mut first = broadcaster.subscribe();
        let mut second = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);

        assert_eq!(broadcaster.publish(update(3)), 2);
        broadcaster.publish(update(2));
        broadcaster.publish(update(1));

        for rx in [&mut first, &mut second] {
            let received: Vec<u32> = (0..3)
                .map(|_| rx.try_recv().unwrap().remaining_seconds().unwrap())
                .collect();
            assert_eq!(received, vec![3, 2, 1]);
            assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        }
    }

    #[test]
    fn test_late_subscriber_gets_no_replay() {
        let broadcaster = Broadcaster::new("match_updates", 8);
        let _early = broadcaster.subscribe();
        broadcaster.publish(update(5));

        let mut late = broadcaster.subscribe();
        assert!(matches!(late.try_recv(), Err(TryRecvError::Empty)));

        broadcaster.publish(update(4));
        assert_eq!(late.try_recv().unwrap(), update(4));
    }

    #[test]
    fn test_dropped_subscriber_is_forgotten() {
        let broadcaster = Broadcaster::new("match_updates", 8);
        let rx = broadcaster.subscribe();
        drop(rx);

        assert_eq!(broadcaster.subscriber_count(), 0);
        assert_eq!(broadcaster.publish(update(1)), 0);
    }

    #[tokio::test]
    async fn test_stream_skips_lagged_events() {
        let broadcaster = Broadcaster::new("match_updates", 2);
        let mut stream = Box::pin(broadcaster.subscribe_stream());

        for remaining in [4, 3, 2, 1] {
            broadcaster.publish(update(remaining));
        }
        drop(broadcaster);

        let mut delivered = 0;
        while stream.next().await.is_some() {
            delivered += 1;
        }
        assert_eq!(delivered, 2);
    }
}

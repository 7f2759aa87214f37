//! Connection registry and status fan-out.
//!
//! One registry is constructed at startup and shared by every connection
//! handler. Producers (subjects) and consumers (observers) live behind a
//! single lock, which is never held while delivering.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use smartsession_models::{ConnectionId, StatusUpdate};
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

/// Failure to hand a payload to an observer.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Connection closed")]
    Closed,

    #[error("Delivery failed: {0}")]
    Failed(String),
}

/// Outbound side of an observer connection.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn deliver(&self, payload: Arc<str>) -> Result<(), DeliveryError>;
}

/// Sink that forwards payloads to a writer task over a bounded channel.
///
/// A full channel makes `deliver` wait, which the broadcast timeout bounds.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Arc<str>>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Arc<str>>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl StatusSink for ChannelSink {
    async fn deliver(&self, payload: Arc<str>) -> Result<(), DeliveryError> {
        self.tx.send(payload).await.map_err(|_| DeliveryError::Closed)
    }
}

/// Summary of one broadcast.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BroadcastOutcome {
    pub delivered: usize,
    pub failed: usize,
    pub timed_out: usize,
    /// Consumers removed because of this broadcast
    pub pruned: Vec<ConnectionId>,
}

impl BroadcastOutcome {
    pub fn recipients(&self) -> usize {
        self.delivered + self.failed + self.timed_out
    }
}

type Consumer = (ConnectionId, Arc<dyn StatusSink>);

#[derive(Default)]
struct Members {
    producers: Vec<ConnectionId>,
    consumers: Vec<Consumer>,
}

/// Live producer and consumer membership.
pub struct BroadcastRegistry {
    members: RwLock<Members>,
    send_timeout: Duration,
}

impl BroadcastRegistry {
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            members: RwLock::new(Members::default()),
            send_timeout,
        }
    }

    pub async fn register_producer(&self) -> ConnectionId {
        let id = ConnectionId::new();
        self.members.write().await.producers.push(id.clone());
        debug!(connection_id = %id, "Producer registered");
        id
    }

    pub async fn register_consumer(&self, sink: Arc<dyn StatusSink>) -> ConnectionId {
        let id = ConnectionId::new();
        self.members.write().await.consumers.push((id.clone(), sink));
        debug!(connection_id = %id, "Consumer registered");
        id
    }

    /// Remove a connection from both collections.
    ///
    /// Returns whether anything was removed; unknown ids are a no-op.
    pub async fn unregister(&self, id: &ConnectionId) -> bool {
        let mut members = self.members.write().await;
        let before = members.producers.len() + members.consumers.len();
        members.producers.retain(|p| p != id);
        members.consumers.retain(|(c, _)| c != id);
        let removed = members.producers.len() + members.consumers.len() != before;
        if removed {
            debug!(connection_id = %id, "Connection unregistered");
        }
        removed
    }

    pub async fn producer_count(&self) -> usize {
        self.members.read().await.producers.len()
    }

    pub async fn consumer_count(&self) -> usize {
        self.members.read().await.consumers.len()
    }

    pub async fn is_registered(&self, id: &ConnectionId) -> bool {
        let members = self.members.read().await;
        members.producers.contains(id) || members.consumers.iter().any(|(c, _)| c == id)
    }

    /// Deliver `update` to every consumer registered when the call starts.
    ///
    /// Deliveries run concurrently, each bounded by the send timeout. A
    /// consumer that fails or times out is unregistered as soon as its own
    /// delivery settles, without waiting for the rest of the fan-out; the
    /// other deliveries are unaffected and nothing is retried.
    pub async fn broadcast(&self, update: &StatusUpdate) -> BroadcastOutcome {
        let payload: Arc<str> = match serde_json::to_string(update) {
            Ok(json) => json.into(),
            Err(e) => {
                warn!(error = %e, "Failed to serialize status update");
                return BroadcastOutcome::default();
            }
        };

        let recipients: Vec<Consumer> = self.members.read().await.consumers.clone();
        if recipients.is_empty() {
            return BroadcastOutcome::default();
        }

        let deliveries = recipients
            .iter()
            .map(|(id, sink)| self.deliver_one(id, sink.as_ref(), Arc::clone(&payload)));

        let mut outcome = BroadcastOutcome::default();
        for (id, delivery) in join_all(deliveries).await {
            match delivery {
                Delivery::Delivered => outcome.delivered += 1,
                Delivery::Failed => {
                    outcome.failed += 1;
                    outcome.pruned.push(id.clone());
                }
                Delivery::TimedOut => {
                    outcome.timed_out += 1;
                    outcome.pruned.push(id.clone());
                }
            }
        }

        outcome
    }

    async fn deliver_one<'a>(
        &self,
        id: &'a ConnectionId,
        sink: &dyn StatusSink,
        payload: Arc<str>,
    ) -> (&'a ConnectionId, Delivery) {
        let delivery = match tokio::time::timeout(self.send_timeout, sink.deliver(payload)).await {
            Ok(Ok(())) => return (id, Delivery::Delivered),
            Ok(Err(e)) => {
                warn!(connection_id = %id, error = %e, "Dropping observer after failed delivery");
                Delivery::Failed
            }
            Err(_) => {
                warn!(
                    connection_id = %id,
                    timeout_ms = self.send_timeout.as_millis() as u64,
                    "Dropping observer after delivery timeout"
                );
                Delivery::TimedOut
            }
        };

        self.members
            .write()
            .await
            .consumers
            .retain(|(c, _)| c != id);
        (id, delivery)
    }
}

/// How one delivery in a broadcast ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Delivered,
    Failed,
    TimedOut,
}

impl std::fmt::Debug for BroadcastRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastRegistry")
            .field("send_timeout", &self.send_timeout)
            .finish_non_exhaustive()
    }
}

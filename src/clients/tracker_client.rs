use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::domain::{Order, OrderBuckets};
use crate::error::TrackerError;
use crate::messages::TrackerRequest;

/// Returned by [`TrackerClient::start_polling`]. Polling keeps going until the handle is
/// passed to [`TrackerClient::stop_polling`]; dropping it does not stop anything.
#[derive(Debug, Clone)]
pub struct PollingHandle {
    schedule_id: u64,
    token: CancellationToken,
}

impl PollingHandle {
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Handle to the [`TrackerService`](crate::tracker_actor::TrackerService).
#[derive(Clone)]
pub struct TrackerClient {
    sender: mpsc::Sender<TrackerRequest>,
    updates: watch::Receiver<OrderBuckets>,
}

impl TrackerClient {
    pub fn new(sender: mpsc::Sender<TrackerRequest>, updates: watch::Receiver<OrderBuckets>) -> Self {
        Self { sender, updates }
    }

    /// Receives the bucketed order list after every successful poll, scheduled or not.
    pub fn subscribe(&self) -> watch::Receiver<OrderBuckets> {
        self.updates.clone()
    }

    /// The order view regained focus: refresh right away.
    pub async fn on_focus(&self) -> Result<OrderBuckets, TrackerError> {
        self.poll().await
    }

    #[instrument(skip(self))]
    pub async fn start_polling(&self, interval: Duration) -> Result<PollingHandle, TrackerError> {
        debug!("Sending request");
        let token = CancellationToken::new();
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TrackerRequest::StartPolling { interval, token: token.clone(), respond_to })
            .await
            .map_err(|_| TrackerError::ActorCommunicationError("Actor closed".to_string()))?;
        let schedule_id = response
            .await
            .map_err(|_| TrackerError::ActorCommunicationError("Actor dropped".to_string()))??;
        Ok(PollingHandle { schedule_id, token })
    }

    /// Idempotent. Cancels the schedule immediately, including a poll already waiting on
    /// the backend, then tells the service to drop it.
    #[instrument(skip(self, handle), fields(schedule_id = handle.schedule_id))]
    pub async fn stop_polling(&self, handle: &PollingHandle) {
        if handle.token.is_cancelled() {
            debug!("Already stopped");
            return;
        }
        handle.token.cancel();
        let _ = self.sender.send(TrackerRequest::StopPolling { schedule_id: handle.schedule_id }).await;
    }

    pub async fn shutdown(&self) -> Result<(), TrackerError> {
        self.sender
            .send(TrackerRequest::Shutdown)
            .await
            .map_err(|_| TrackerError::ActorCommunicationError("Actor closed".to_string()))
    }
}

client_method!(
    /// Fetches the full order list, diffs it, notifies, and returns the buckets.
    TrackerClient => fn poll() -> OrderBuckets as TrackerRequest::Poll, Error = TrackerError
);
client_method!(
    /// Buckets from the last successful poll, without hitting the backend.
    TrackerClient => fn orders() -> OrderBuckets as TrackerRequest::Orders, Error = TrackerError
);
client_method!(
    /// Folds a change this client made itself (a cancel) into the snapshot.
    TrackerClient => fn acknowledge(order: Order) -> () as TrackerRequest::Acknowledge, Error = TrackerError
);
#[cfg(test)]
client_method!(TrackerClient => fn get_snapshot() -> Option<Vec<Order>> as TrackerRequest::GetSnapshot, Error = TrackerError);

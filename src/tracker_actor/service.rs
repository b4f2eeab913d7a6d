use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::diff::{status_changes, OrderSnapshot};
use crate::backend::SharedBackend;
use crate::clients::TrackerClient;
use crate::config::ClientConfig;
use crate::domain::{Notification, Order, OrderBuckets};
use crate::error::{FetchError, TrackerError};
use crate::messages::{ServiceResponse, TrackerRequest};
use crate::notifier::SharedNotifier;

// =============================================================================
// FETCH SETTINGS
// =============================================================================

/// How a poll pages through `GET /Order/all`.
#[derive(Debug, Clone, Copy)]
pub struct FetchSettings {
    pub page_size: u32,
    pub max_pages: u32,
    /// Upper bound on each page request.
    pub timeout: Duration,
}

impl From<&ClientConfig> for FetchSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            page_size: config.page_size.max(1),
            max_pages: config.max_pages.max(1),
            timeout: config.request_timeout,
        }
    }
}

struct Schedule {
    id: u64,
    interval: Interval,
    token: CancellationToken,
}

// =============================================================================
// TRACKER SERVICE
// =============================================================================

/// Owns the order snapshot. Polls run inline in the service loop, so only one is ever
/// in flight; manual polls queue behind it and scheduled ticks that fall due meanwhile
/// are skipped.
pub struct TrackerService {
    receiver: mpsc::Receiver<TrackerRequest>,
    backend: SharedBackend,
    notifier: SharedNotifier,
    settings: FetchSettings,
    snapshot: Option<OrderSnapshot>,
    schedule: Option<Schedule>,
    next_schedule_id: u64,
    updates: watch::Sender<OrderBuckets>,
}

impl TrackerService {
    pub fn new(
        buffer_size: usize,
        backend: SharedBackend,
        notifier: SharedNotifier,
        settings: FetchSettings,
    ) -> (Self, TrackerClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (updates, subscription) = watch::channel(OrderBuckets::default());
        let service = Self {
            receiver,
            backend,
            notifier,
            settings,
            snapshot: None,
            schedule: None,
            next_schedule_id: 1,
            updates,
        };
        let client = TrackerClient::new(sender, subscription);
        (service, client)
    }

    #[instrument(name = "order_tracker", skip(self))]
    pub async fn run(mut self) {
        info!("OrderTracker starting");
        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(TrackerRequest::Shutdown) | None => {
                        info!("OrderTracker shutting down");
                        break;
                    }
                    Some(msg) => self.handle(msg).await,
                },
                Some(token) = next_tick(self.schedule.as_mut()) => {
                    self.handle_scheduled_poll(token).await;
                }
            }
        }
        if let Some(schedule) = self.schedule.take() {
            schedule.token.cancel();
        }
        info!("OrderTracker stopped");
    }

    async fn handle(&mut self, msg: TrackerRequest) {
        match msg {
            TrackerRequest::Poll { respond_to } => self.handle_poll(respond_to).await,
            TrackerRequest::StartPolling { interval, token, respond_to } => {
                self.handle_start_polling(interval, token, respond_to);
            }
            TrackerRequest::StopPolling { schedule_id } => self.handle_stop_polling(schedule_id),
            TrackerRequest::Orders { respond_to } => {
                let buckets = self.snapshot.as_ref().map(OrderSnapshot::buckets).unwrap_or_default();
                let _ = respond_to.send(Ok(buckets));
            }
            TrackerRequest::Acknowledge { order, respond_to } => {
                self.handle_acknowledge(order);
                let _ = respond_to.send(Ok(()));
            }
            TrackerRequest::Shutdown => {}
            #[cfg(test)]
            TrackerRequest::GetSnapshot { respond_to } => {
                let orders = self.snapshot.as_ref().map(|s| s.orders().to_vec());
                let _ = respond_to.send(Ok(orders));
            }
        }
    }

    #[instrument(skip(self, respond_to))]
    async fn handle_poll(&mut self, respond_to: ServiceResponse<OrderBuckets, TrackerError>) {
        debug!("Processing poll request");
        let result = match self.fetch_all().await {
            Ok(orders) => Ok(self.apply(orders)),
            Err(e) => {
                warn!(error = %e, "Poll failed, keeping previous snapshot");
                Err(TrackerError::Fetch(e))
            }
        };
        let _ = respond_to.send(result);
    }

    #[instrument(skip(self, token, respond_to))]
    fn handle_start_polling(
        &mut self,
        period: Duration,
        token: CancellationToken,
        respond_to: ServiceResponse<u64, TrackerError>,
    ) {
        if period.is_zero() {
            warn!("Rejecting zero polling interval");
            let _ = respond_to.send(Err(TrackerError::InvalidInterval));
            return;
        }
        if let Some(previous) = self.schedule.take() {
            info!(schedule_id = previous.id, "Replacing existing polling schedule");
            previous.token.cancel();
        }

        let id = self.next_schedule_id;
        self.next_schedule_id += 1;
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.schedule = Some(Schedule { id, interval, token });

        info!(schedule_id = id, interval_ms = period.as_millis() as u64, "Polling started");
        let _ = respond_to.send(Ok(id));
    }

    #[instrument(skip(self))]
    fn handle_stop_polling(&mut self, schedule_id: u64) {
        match &self.schedule {
            Some(schedule) if schedule.id == schedule_id => {
                schedule.token.cancel();
                self.schedule = None;
                info!("Polling stopped");
            }
            _ => debug!("Schedule already stopped"),
        }
    }

    /// Records a status the user already knows about, so the next poll does not report it
    /// again. Before the first poll there is no baseline to update.
    #[instrument(fields(order_id = order.order_id, status = %order.status), skip(self, order))]
    fn handle_acknowledge(&mut self, order: Order) {
        let Some(snapshot) = self.snapshot.as_mut() else {
            debug!("No baseline yet, nothing to update");
            return;
        };
        snapshot.upsert(order);
        self.updates.send_replace(snapshot.buckets());
        info!("Snapshot updated with local change");
    }

    /// A poll that is cancelled while waiting on the backend is dropped unapplied.
    #[instrument(skip(self, token))]
    async fn handle_scheduled_poll(&mut self, token: CancellationToken) {
        if token.is_cancelled() {
            self.schedule = None;
            return;
        }
        debug!("Scheduled poll");
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = self.fetch_all() => Some(result),
        };
        match outcome {
            None => {
                info!("Polling stopped mid-flight, discarding result");
                self.schedule = None;
            }
            Some(Ok(orders)) => {
                self.apply(orders);
            }
            Some(Err(e)) => warn!(error = %e, "Scheduled poll failed, keeping previous snapshot"),
        }
    }

    /// Pulls pages until one comes back short or `max_pages` is reached.
    async fn fetch_all(&self) -> Result<Vec<Order>, FetchError> {
        let FetchSettings { page_size, max_pages, timeout } = self.settings;
        let mut orders = Vec::new();
        for page in 1..=max_pages {
            let batch = tokio::time::timeout(timeout, self.backend.list_orders(page, page_size))
                .await
                .map_err(|_| FetchError::Timeout { timeout_ms: timeout.as_millis() as u64 })??;
            let short = (batch.len() as u32) < page_size;
            orders.extend(batch);
            if short {
                return Ok(orders);
            }
        }
        // Older orders beyond this point fall out of the snapshot.
        warn!(max_pages, page_size, "Order list truncated at max_pages");
        Ok(orders)
    }

    /// Diffs against the previous snapshot, notifies, then swaps the snapshot in.
    fn apply(&mut self, orders: Vec<Order>) -> OrderBuckets {
        let current = OrderSnapshot::from_orders(orders);
        let changes = status_changes(self.snapshot.as_ref(), &current);
        for change in &changes {
            if let Some(order) = current.get(change.order_id) {
                info!(order_id = change.order_id, status = %change.status, "Order status changed");
                self.notifier.notify(Notification::status_changed(order));
            }
        }
        let buckets = current.buckets();
        debug!(orders = current.len(), changes = changes.len(), "Snapshot replaced");
        self.snapshot = Some(current);
        self.updates.send_replace(buckets.clone());
        buckets
    }
}

/// Resolves on the next tick of the active schedule; never resolves without one.
async fn next_tick(schedule: Option<&mut Schedule>) -> Option<CancellationToken> {
    match schedule {
        Some(schedule) => {
            schedule.interval.tick().await;
            Some(schedule.token.clone())
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NotificationKind, OrderStatus};
    use crate::mock_framework::{create_mock_backend, expect_list_orders, BackendRequest};
    use crate::notifier::ChannelNotifier;
    use std::sync::Arc;
    use tokio::sync::mpsc::{Receiver, UnboundedReceiver};

    struct Harness {
        tracker: TrackerClient,
        backend_rx: Receiver<BackendRequest>,
        notifications: UnboundedReceiver<Notification>,
    }

    fn settings() -> FetchSettings {
        FetchSettings { page_size: 10, max_pages: 3, timeout: Duration::from_secs(5) }
    }

    fn start() -> Harness {
        let (backend, backend_rx) = create_mock_backend(10);
        let (notifier, notifications) = ChannelNotifier::new();
        let (service, tracker) = TrackerService::new(10, backend, Arc::new(notifier), settings());
        tokio::spawn(service.run());
        Harness { tracker, backend_rx, notifications }
    }

    fn order(order_id: i64, status: OrderStatus) -> Order {
        Order::new(order_id, 1, status)
    }

    /// Runs one manual poll, answering the single page with `orders`.
    async fn poll_with(h: &mut Harness, orders: Vec<Order>) -> Result<OrderBuckets, TrackerError> {
        let tracker = h.tracker.clone();
        let task = tokio::spawn(async move { tracker.poll().await });
        let (page, _, responder) = expect_list_orders(&mut h.backend_rx).await.expect("Expected list_orders");
        assert_eq!(page, 1);
        responder.send(Ok(orders)).unwrap();
        task.await.unwrap()
    }

    #[tokio::test]
    async fn status_transition_notifies_once() {
        let mut h = start();
        poll_with(&mut h, vec![order(1, OrderStatus::Pending)]).await.unwrap();
        assert!(h.notifications.try_recv().is_err());

        let buckets = poll_with(&mut h, vec![order(1, OrderStatus::Processing)]).await.unwrap();

        assert_eq!(buckets.processing.len(), 1);
        let n = h.notifications.try_recv().unwrap();
        assert_eq!(n.order_id, Some(1));
        assert_eq!(n.kind, NotificationKind::StatusChanged(OrderStatus::Processing));
        assert!(h.notifications.try_recv().is_err());
    }

    #[tokio::test]
    async fn first_poll_is_baseline_only() {
        let mut h = start();
        poll_with(&mut h, vec![order(2, OrderStatus::Pending), order(3, OrderStatus::Completed)])
            .await
            .unwrap();
        assert!(h.notifications.try_recv().is_err());
    }

    #[tokio::test]
    async fn unchanged_poll_is_silent() {
        let mut h = start();
        poll_with(&mut h, vec![order(3, OrderStatus::Processing)]).await.unwrap();
        poll_with(&mut h, vec![order(3, OrderStatus::Processing)]).await.unwrap();
        assert!(h.notifications.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_poll_keeps_snapshot_and_stays_silent() {
        let mut h = start();
        poll_with(&mut h, vec![order(1, OrderStatus::Pending)]).await.unwrap();
        let before = h.tracker.get_snapshot().await.unwrap();

        let tracker = h.tracker.clone();
        let task = tokio::spawn(async move { tracker.poll().await });
        let (_, _, responder) = expect_list_orders(&mut h.backend_rx).await.unwrap();
        responder.send(Err(FetchError::Request("connection reset".into()))).unwrap();
        let result = task.await.unwrap();

        assert_eq!(result, Err(TrackerError::Fetch(FetchError::Request("connection reset".into()))));
        assert_eq!(h.tracker.get_snapshot().await.unwrap(), before);
        assert!(h.notifications.try_recv().is_err());

        // The next good poll still diffs against the pre-failure baseline.
        poll_with(&mut h, vec![order(1, OrderStatus::Completed)]).await.unwrap();
        assert_eq!(h.notifications.try_recv().unwrap().order_id, Some(1));
    }

    #[tokio::test]
    async fn full_pages_are_followed() {
        let mut h = start();
        let tracker = h.tracker.clone();
        let task = tokio::spawn(async move { tracker.poll().await });

        let (page, size, responder) = expect_list_orders(&mut h.backend_rx).await.unwrap();
        assert_eq!((page, size), (1, 10));
        responder.send(Ok((1..=10).map(|id| order(id, OrderStatus::Pending)).collect())).unwrap();

        let (page, _, responder) = expect_list_orders(&mut h.backend_rx).await.unwrap();
        assert_eq!(page, 2);
        responder.send(Ok(vec![order(11, OrderStatus::Completed)])).unwrap();

        let buckets = task.await.unwrap().unwrap();
        assert_eq!(buckets.pending.len(), 10);
        assert_eq!(buckets.completed.len(), 1);
    }

    #[tokio::test]
    async fn orders_and_subscribers_reflect_last_poll() {
        let mut h = start();
        let mut updates = h.tracker.subscribe();
        assert!(h.tracker.orders().await.unwrap().is_empty());

        poll_with(&mut h, vec![order(1, OrderStatus::Pending), order(2, OrderStatus::Cancelled)])
            .await
            .unwrap();

        updates.changed().await.unwrap();
        assert_eq!(updates.borrow().cancelled.len(), 1);
        assert_eq!(h.tracker.orders().await.unwrap().pending.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_polls_run_until_stopped() {
        let mut h = start();
        let handle = h.tracker.start_polling(Duration::from_secs(5)).await.unwrap();

        let (_, _, responder) = expect_list_orders(&mut h.backend_rx).await.expect("immediate poll");
        responder.send(Ok(vec![order(1, OrderStatus::Pending)])).unwrap();

        let (_, _, responder) = expect_list_orders(&mut h.backend_rx).await.expect("second poll");
        responder.send(Ok(vec![order(1, OrderStatus::Processing)])).unwrap();

        let n = h.notifications.recv().await.unwrap();
        assert_eq!(n.kind, NotificationKind::StatusChanged(OrderStatus::Processing));

        h.tracker.stop_polling(&handle).await;
        h.tracker.stop_polling(&handle).await;
        assert!(handle.is_stopped());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(h.backend_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_discards_in_flight_poll() {
        let mut h = start();
        poll_with(&mut h, vec![order(1, OrderStatus::Pending)]).await.unwrap();

        let handle = h.tracker.start_polling(Duration::from_secs(5)).await.unwrap();
        let (_, _, responder) = expect_list_orders(&mut h.backend_rx).await.expect("scheduled poll");

        h.tracker.stop_polling(&handle).await;
        let _ = responder.send(Ok(vec![order(1, OrderStatus::Completed)]));

        let snapshot = h.tracker.get_snapshot().await.unwrap().unwrap();
        assert_eq!(snapshot[0].status, OrderStatus::Pending);
        assert!(h.notifications.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn focus_poll_waits_for_scheduled_poll() {
        let mut h = start();
        let handle = h.tracker.start_polling(Duration::from_secs(30)).await.unwrap();
        let (_, _, scheduled) = expect_list_orders(&mut h.backend_rx).await.expect("scheduled poll");

        let tracker = h.tracker.clone();
        let focus = tokio::spawn(async move { tracker.on_focus().await });
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(h.backend_rx.try_recv().is_err(), "second fetch started while one was in flight");

        scheduled.send(Ok(vec![order(1, OrderStatus::Pending)])).unwrap();
        let (_, _, responder) = expect_list_orders(&mut h.backend_rx).await.expect("focus poll");
        responder.send(Ok(vec![order(1, OrderStatus::Processing)])).unwrap();

        // Diffed against the scheduled poll's result, not an empty baseline
        let buckets = focus.await.unwrap().unwrap();
        assert_eq!(buckets.processing.len(), 1);
        let n = h.notifications.try_recv().unwrap();
        assert_eq!(n.kind, NotificationKind::StatusChanged(OrderStatus::Processing));
        assert!(h.notifications.try_recv().is_err());

        h.tracker.stop_polling(&handle).await;
    }

    #[tokio::test]
    async fn paging_stops_at_max_pages() {
        let mut h = start();
        let tracker = h.tracker.clone();
        let task = tokio::spawn(async move { tracker.poll().await });

        for expected in 1..=3u32 {
            let (page, size, responder) = expect_list_orders(&mut h.backend_rx).await.unwrap();
            assert_eq!(page, expected);
            let first = ((page - 1) * size) as i64;
            let batch = (first + 1..=first + size as i64).map(|id| order(id, OrderStatus::Pending)).collect();
            responder.send(Ok(batch)).unwrap();
        }

        assert_eq!(task.await.unwrap().unwrap().pending.len(), 30);
        assert!(h.backend_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn acknowledged_cancel_is_not_reported_by_next_poll() {
        let mut h = start();
        poll_with(&mut h, vec![order(5, OrderStatus::Pending)]).await.unwrap();

        h.tracker.acknowledge(order(5, OrderStatus::Cancelled)).await.unwrap();
        assert_eq!(h.tracker.orders().await.unwrap().cancelled.len(), 1);

        poll_with(&mut h, vec![order(5, OrderStatus::Cancelled)]).await.unwrap();
        assert!(h.notifications.try_recv().is_err());
    }

    #[tokio::test]
    async fn acknowledge_before_first_poll_is_ignored() {
        let mut h = start();
        h.tracker.acknowledge(order(5, OrderStatus::Cancelled)).await.unwrap();
        assert_eq!(h.tracker.get_snapshot().await.unwrap(), None);

        poll_with(&mut h, vec![order(5, OrderStatus::Cancelled)]).await.unwrap();
        assert!(h.notifications.try_recv().is_err());
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let h = start();
        let result = h.tracker.start_polling(Duration::ZERO).await;
        assert!(matches!(result, Err(TrackerError::InvalidInterval)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out() {
        let mut h = start();
        let tracker = h.tracker.clone();
        let task = tokio::spawn(async move { tracker.poll().await });
        let (_, _, _responder) = expect_list_orders(&mut h.backend_rx).await.unwrap();

        let result = task.await.unwrap();
        assert_eq!(result, Err(TrackerError::Fetch(FetchError::Timeout { timeout_ms: 5_000 })));
    }
}

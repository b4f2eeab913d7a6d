use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::backend::SharedBackend;
use crate::clients::{CartClient, TrackerClient};
use crate::config::ClientConfig;
use crate::domain::{NewOrder, Notification, Order, OrderId, OrderStatus, StatusUpdate};
use crate::error::{FetchError, OrderError};
use crate::notifier::SharedNotifier;

/// Checkout and per-order actions.
///
/// Orchestrates the cart, the backend, the tracker and the notifier; holds no state of
/// its own.
#[derive(Clone)]
pub struct OrderClient {
    backend: SharedBackend,
    cart: CartClient,
    tracker: TrackerClient,
    notifier: SharedNotifier,
    location_id: i64,
    robot_id: i64,
}

impl OrderClient {
    pub fn new(
        backend: SharedBackend,
        cart: CartClient,
        tracker: TrackerClient,
        notifier: SharedNotifier,
        config: &ClientConfig,
    ) -> Self {
        Self {
            backend,
            cart,
            tracker,
            notifier,
            location_id: config.location_id,
            robot_id: config.robot_id,
        }
    }

    /// Places an order for the first cart line.
    ///
    /// The cart is emptied before the request goes out, so lines added while it is in
    /// flight are kept and a concurrent checkout finds nothing to order. If the order is
    /// not placed, the taken lines go back. Only one recipe goes into an order; any
    /// further lines are discarded.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<NewOrder, OrderError> {
        info!("Processing checkout");

        // Step 1: Take the cart contents
        let taken = self.cart.take().await?;
        let Some(line) = taken.first().cloned() else {
            warn!("Checkout with empty cart");
            return Err(OrderError::EmptyCart);
        };
        if taken.len() > 1 {
            warn!(dropped_lines = taken.len() - 1, "Only the first cart line is ordered");
        }

        // Step 2: Build the request
        let order = NewOrder {
            recipe_id: line.item_id,
            location_id: self.location_id,
            robot_id: self.robot_id,
            ordered_time: Utc::now(),
            status: OrderStatus::Pending,
            instruction: line.instruction.clone(),
        };

        // Step 3: Send it to the kitchen queue
        let failure = match self.backend.create_order(&order).await {
            Ok(()) => {
                info!(recipe_id = order.recipe_id, "Order accepted");
                self.notifier.notify(Notification::order_placed(&order, &line.name));
                return Ok(order);
            }
            Err(FetchError::Status { status, message }) => {
                error!(status, message = %message, "Order rejected");
                OrderError::CreateRejected(message)
            }
            Err(e) => {
                error!(error = %e, "Order request failed");
                OrderError::from(e)
            }
        };

        // Step 4: Not placed, so hand the lines back
        if let Err(e) = self.cart.restore(taken.items).await {
            error!(error = %e, "Could not return lines to cart");
        }
        Err(failure)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        Ok(self.backend.get_order(order_id).await?)
    }

    /// Cancels an order that is still pending. Anything further along is refused locally.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        let mut order = self.backend.get_order(order_id).await?;
        if order.status != OrderStatus::Pending {
            warn!(status = %order.status, "Order cannot be cancelled");
            return Err(OrderError::NotCancellable { order_id, status: order.status });
        }

        let update = StatusUpdate { order_id, status: OrderStatus::Cancelled };
        self.backend.update_order_status(&update).await.map_err(|e| {
            error!(error = %e, "Failed to cancel order");
            OrderError::from(e)
        })?;

        info!("Order cancelled");
        order.status = OrderStatus::Cancelled;
        self.notifier.notify(Notification::cancelled_by_user(order_id));
        // The user has been told; keep the next poll from telling them again.
        if let Err(e) = self.tracker.acknowledge(order.clone()).await {
            warn!(error = %e, "Tracker did not take the cancellation");
        }
        Ok(order)
    }
}

use std::time::Duration;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::domain::{CartItem, CartSnapshot, Order, OrderBuckets, Recipe, RecipeId};
use crate::error::{CartError, TrackerError};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed message enums for actor communication. Each variant includes parameters
/// and a oneshot channel for responses.

// =============================================================================
// CART MESSAGES
// =============================================================================

#[derive(Debug)]
pub enum CartRequest {
    Add {
        item: Recipe,
        quantity: u32,
        instruction: Option<String>,
        respond_to: ServiceResponse<CartSnapshot, CartError>,
    },
    Remove {
        item_id: RecipeId,
        respond_to: ServiceResponse<CartSnapshot, CartError>,
    },
    Clear {
        respond_to: ServiceResponse<CartSnapshot, CartError>,
    },
    /// Empties the cart and hands back what it held, in one step.
    Take {
        respond_to: ServiceResponse<CartSnapshot, CartError>,
    },
    /// Returns lines from a failed checkout.
    Restore {
        items: Vec<CartItem>,
        respond_to: ServiceResponse<CartSnapshot, CartError>,
    },
    Snapshot {
        respond_to: ServiceResponse<CartSnapshot, CartError>,
    },
    Shutdown,
}

// =============================================================================
// TRACKER MESSAGES
// =============================================================================

#[derive(Debug)]
pub enum TrackerRequest {
    /// Fetch now. Queues behind a poll that is already running.
    Poll {
        respond_to: ServiceResponse<OrderBuckets, TrackerError>,
    },
    StartPolling {
        interval: Duration,
        token: CancellationToken,
        respond_to: ServiceResponse<u64, TrackerError>,
    },
    StopPolling {
        schedule_id: u64,
    },
    Orders {
        respond_to: ServiceResponse<OrderBuckets, TrackerError>,
    },
    /// A status change this client caused itself and has already told the user about.
    Acknowledge {
        order: Order,
        respond_to: ServiceResponse<(), TrackerError>,
    },
    Shutdown,
    #[cfg(test)]
    GetSnapshot {
        respond_to: ServiceResponse<Option<Vec<Order>>, TrackerError>,
    },
}

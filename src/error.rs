use thiserror::Error;

use crate::domain::{OrderId, OrderStatus, RecipeId};

/// Rejections from the cart. The cart is left untouched whenever one is returned.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Item unavailable: recipe {0} is not active")]
    ItemUnavailable(RecipeId),
    #[error("Cart full: holding recipe {held}, cannot add recipe {requested}")]
    CartFull { held: RecipeId, requested: RecipeId },
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

/// Network or backend failure. Always safe to retry.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Could not decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Cart is empty")]
    EmptyCart,
    /// The backend refused the order; the message is shown to the user as-is.
    #[error("{0}")]
    CreateRejected(String),
    #[error("Order {order_id} cannot be cancelled while {status}")]
    NotCancellable { order_id: OrderId, status: OrderStatus },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrackerError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Polling interval must be greater than zero")]
    InvalidInterval,
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

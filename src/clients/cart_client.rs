use tokio::sync::{mpsc, watch};

use crate::domain::{CartItem, CartSnapshot, Recipe, RecipeId};
use crate::error::CartError;
use crate::messages::CartRequest;

/// Handle to the [`CartService`](crate::cart_actor::CartService). Clone it into every
/// consumer that needs the cart.
#[derive(Clone)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
    updates: watch::Receiver<CartSnapshot>,
}

impl CartClient {
    pub fn new(sender: mpsc::Sender<CartRequest>, updates: watch::Receiver<CartSnapshot>) -> Self {
        Self { sender, updates }
    }

    /// Receives the cart contents after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.updates.clone()
    }

    pub async fn shutdown(&self) -> Result<(), CartError> {
        self.sender
            .send(CartRequest::Shutdown)
            .await
            .map_err(|_| CartError::ActorCommunicationError("Actor closed".to_string()))
    }
}

client_method!(
    /// Adds `quantity` of `item`, merging with an existing line for the same recipe.
    CartClient => fn add(item: Recipe, quantity: u32, instruction: Option<String>) -> CartSnapshot as CartRequest::Add, Error = CartError
);
client_method!(
    /// Removes the line for `item_id`; absent ids are ignored.
    CartClient => fn remove(item_id: RecipeId) -> CartSnapshot as CartRequest::Remove, Error = CartError
);
client_method!(CartClient => fn clear() -> CartSnapshot as CartRequest::Clear, Error = CartError);
client_method!(
    /// Empties the cart and returns what it held. Lines added afterwards stay put.
    CartClient => fn take() -> CartSnapshot as CartRequest::Take, Error = CartError
);
client_method!(
    /// Returns lines from [`take`](Self::take) after a checkout that did not go through.
    CartClient => fn restore(items: Vec<CartItem>) -> CartSnapshot as CartRequest::Restore, Error = CartError
);
client_method!(CartClient => fn snapshot() -> CartSnapshot as CartRequest::Snapshot, Error = CartError);

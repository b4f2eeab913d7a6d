use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

use super::policy::{add_line, restore_lines};
use crate::clients::CartClient;
use crate::config::CartPolicy;
use crate::domain::{CartItem, CartSnapshot, Recipe, RecipeId};
use crate::error::CartError;
use crate::messages::{CartRequest, ServiceResponse};

/// Owns the cart lines. All reads and writes go through [`CartClient`], so checkout
/// and the cart screen always see the same state.
pub struct CartService {
    receiver: mpsc::Receiver<CartRequest>,
    items: Vec<CartItem>,
    policy: CartPolicy,
    updates: watch::Sender<CartSnapshot>,
}

impl CartService {
    pub fn new(buffer_size: usize, policy: CartPolicy) -> (Self, CartClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (updates, subscription) = watch::channel(CartSnapshot::default());
        let service = Self {
            receiver,
            items: Vec::new(),
            policy,
            updates,
        };
        let client = CartClient::new(sender, subscription);
        (service, client)
    }

    #[instrument(name = "cart_service", skip(self), fields(policy = ?self.policy))]
    pub async fn run(mut self) {
        info!("CartService starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CartRequest::Add { item, quantity, instruction, respond_to } => {
                    self.handle_add(item, quantity, instruction, respond_to);
                }
                CartRequest::Remove { item_id, respond_to } => {
                    self.handle_remove(item_id, respond_to);
                }
                CartRequest::Clear { respond_to } => {
                    self.handle_clear(respond_to);
                }
                CartRequest::Take { respond_to } => {
                    self.handle_take(respond_to);
                }
                CartRequest::Restore { items, respond_to } => {
                    self.handle_restore(items, respond_to);
                }
                CartRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.snapshot()));
                }
                CartRequest::Shutdown => {
                    info!("CartService shutting down");
                    break;
                }
            }
        }
        info!("CartService stopped");
    }

    #[instrument(fields(item_id = item.recipe_id), skip(self, item, instruction, respond_to))]
    fn handle_add(
        &mut self,
        item: Recipe,
        quantity: u32,
        instruction: Option<String>,
        respond_to: ServiceResponse<CartSnapshot, CartError>,
    ) {
        debug!("Processing add request");
        let result = match add_line(&mut self.items, self.policy, &item, quantity, instruction) {
            Ok(()) => {
                info!(item_name = %item.recipe_name, lines = self.items.len(), "Added to cart");
                Ok(self.publish())
            }
            Err(e) => {
                warn!(error = %e, "Add rejected");
                Err(e)
            }
        };
        let _ = respond_to.send(result);
    }

    #[instrument(skip(self, respond_to))]
    fn handle_remove(&mut self, item_id: RecipeId, respond_to: ServiceResponse<CartSnapshot, CartError>) {
        debug!("Processing remove request");
        let before = self.items.len();
        self.items.retain(|line| line.item_id != item_id);
        if self.items.len() < before {
            info!("Removed from cart");
        } else {
            debug!("Item not in cart");
        }
        let _ = respond_to.send(Ok(self.publish()));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_clear(&mut self, respond_to: ServiceResponse<CartSnapshot, CartError>) {
        debug!("Processing clear request");
        self.items.clear();
        info!("Cart cleared");
        let _ = respond_to.send(Ok(self.publish()));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_take(&mut self, respond_to: ServiceResponse<CartSnapshot, CartError>) {
        debug!("Processing take request");
        let taken = CartSnapshot { items: std::mem::take(&mut self.items) };
        if !taken.is_empty() {
            info!(lines = taken.len(), "Cart taken for checkout");
            self.publish();
        }
        let _ = respond_to.send(Ok(taken));
    }

    #[instrument(fields(lines = items.len()), skip(self, items, respond_to))]
    fn handle_restore(&mut self, items: Vec<CartItem>, respond_to: ServiceResponse<CartSnapshot, CartError>) {
        debug!("Processing restore request");
        let dropped = restore_lines(&mut self.items, self.policy, items);
        for line in &dropped {
            warn!(item_id = line.item_id, "Cart now holds another recipe, dropping returned line");
        }
        info!(lines = self.items.len(), "Lines returned to cart");
        let _ = respond_to.send(Ok(self.publish()));
    }

    fn snapshot(&self) -> CartSnapshot {
        CartSnapshot { items: self.items.clone() }
    }

    /// Pushes the current contents to subscribers and returns them.
    fn publish(&self) -> CartSnapshot {
        let snapshot = self.snapshot();
        self.updates.send_replace(snapshot.clone());
        snapshot
    }
}

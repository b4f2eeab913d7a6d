//! # Mock Framework
//!
//! Utilities for testing services against a scripted backend.
//!
//! Use [`create_mock_backend`] to get an [`OrderBackend`] and a receiver. Every backend
//! call shows up on the receiver as a [`BackendRequest`] carrying a oneshot responder, so
//! a test decides exactly when and how each call completes (success, failure, or never).

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::backend::{OrderBackend, SharedBackend};
use crate::domain::{NewOrder, Order, OrderId, Recipe, RecipeId, StatusUpdate};
use crate::error::FetchError;

// =============================================================================
// MOCK BACKEND
// =============================================================================

pub type Responder<T> = oneshot::Sender<Result<T, FetchError>>;

#[derive(Debug)]
pub enum BackendRequest {
    ListRecipes { page: u32, page_size: u32, respond_to: Responder<Vec<Recipe>> },
    GetRecipe { id: RecipeId, respond_to: Responder<Recipe> },
    CreateOrder { order: NewOrder, respond_to: Responder<()> },
    GetOrder { id: OrderId, respond_to: Responder<Order> },
    UpdateOrderStatus { update: StatusUpdate, respond_to: Responder<()> },
    ListOrders { page: u32, page_size: u32, respond_to: Responder<Vec<Order>> },
}

pub struct MockBackend {
    sender: mpsc::Sender<BackendRequest>,
}

impl MockBackend {
    async fn call<T>(&self, make: impl FnOnce(Responder<T>) -> BackendRequest) -> Result<T, FetchError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| FetchError::Request("Mock backend closed".to_string()))?;
        response.await.map_err(|_| FetchError::Request("Mock responder dropped".to_string()))?
    }
}

#[async_trait]
impl OrderBackend for MockBackend {
    async fn list_recipes(&self, page: u32, page_size: u32) -> Result<Vec<Recipe>, FetchError> {
        self.call(|respond_to| BackendRequest::ListRecipes { page, page_size, respond_to }).await
    }

    async fn get_recipe(&self, id: RecipeId) -> Result<Recipe, FetchError> {
        self.call(|respond_to| BackendRequest::GetRecipe { id, respond_to }).await
    }

    async fn create_order(&self, order: &NewOrder) -> Result<(), FetchError> {
        let order = order.clone();
        self.call(|respond_to| BackendRequest::CreateOrder { order, respond_to }).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, FetchError> {
        self.call(|respond_to| BackendRequest::GetOrder { id, respond_to }).await
    }

    async fn update_order_status(&self, update: &StatusUpdate) -> Result<(), FetchError> {
        let update = update.clone();
        self.call(|respond_to| BackendRequest::UpdateOrderStatus { update, respond_to }).await
    }

    async fn list_orders(&self, page: u32, page_size: u32) -> Result<Vec<Order>, FetchError> {
        self.call(|respond_to| BackendRequest::ListOrders { page, page_size, respond_to }).await
    }
}

/// Creates a mock backend and a receiver for asserting requests.
pub fn create_mock_backend(buffer_size: usize) -> (SharedBackend, mpsc::Receiver<BackendRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (Arc::new(MockBackend { sender }), receiver)
}

// =============================================================================
// EXPECTATION HELPERS
// =============================================================================

/// Helper to verify that the next call is `list_orders`
pub async fn expect_list_orders(
    receiver: &mut mpsc::Receiver<BackendRequest>,
) -> Option<(u32, u32, Responder<Vec<Order>>)> {
    match receiver.recv().await {
        Some(BackendRequest::ListOrders { page, page_size, respond_to }) => Some((page, page_size, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next call is `list_recipes`
pub async fn expect_list_recipes(
    receiver: &mut mpsc::Receiver<BackendRequest>,
) -> Option<(u32, u32, Responder<Vec<Recipe>>)> {
    match receiver.recv().await {
        Some(BackendRequest::ListRecipes { page, page_size, respond_to }) => Some((page, page_size, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next call is `get_recipe`
pub async fn expect_get_recipe(receiver: &mut mpsc::Receiver<BackendRequest>) -> Option<(RecipeId, Responder<Recipe>)> {
    match receiver.recv().await {
        Some(BackendRequest::GetRecipe { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next call is `create_order`
pub async fn expect_create_order(receiver: &mut mpsc::Receiver<BackendRequest>) -> Option<(NewOrder, Responder<()>)> {
    match receiver.recv().await {
        Some(BackendRequest::CreateOrder { order, respond_to }) => Some((order, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next call is `get_order`
pub async fn expect_get_order(receiver: &mut mpsc::Receiver<BackendRequest>) -> Option<(OrderId, Responder<Order>)> {
    match receiver.recv().await {
        Some(BackendRequest::GetOrder { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next call is `update_order_status`
pub async fn expect_update_order_status(
    receiver: &mut mpsc::Receiver<BackendRequest>,
) -> Option<(StatusUpdate, Responder<()>)> {
    match receiver.recv().await {
        Some(BackendRequest::UpdateOrderStatus { update, respond_to }) => Some((update, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderStatus;

    #[tokio::test]
    async fn test_mock_backend() {
        let (backend, mut receiver) = create_mock_backend(10);

        let task = tokio::spawn(async move { backend.get_order(5).await });

        let (id, responder) = expect_get_order(&mut receiver).await.expect("Expected GetOrder request");
        assert_eq!(id, 5);
        responder.send(Ok(Order::new(5, 2, OrderStatus::Pending))).unwrap();

        let order = task.await.unwrap().unwrap();
        assert_eq!(order.recipe_id, 2);
    }

    #[tokio::test]
    async fn dropped_responder_surfaces_as_fetch_error() {
        let (backend, mut receiver) = create_mock_backend(10);
        let task = tokio::spawn(async move { backend.list_orders(1, 10).await });

        let (_, _, responder) = expect_list_orders(&mut receiver).await.unwrap();
        drop(responder);

        assert!(matches!(task.await.unwrap(), Err(FetchError::Request(_))));
    }
}

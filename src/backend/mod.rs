//! The REST backend the core calls out to.
//!
//! [`OrderBackend`] is the seam: production code talks to [`RestBackend`], tests swap in
//! the channel-driven mock from `mock_framework`.

mod rest;

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{NewOrder, Order, OrderId, Recipe, RecipeId, StatusUpdate};
use crate::error::FetchError;

pub use rest::RestBackend;

#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// `GET /Recipe/all?page=&pageSize=`
    async fn list_recipes(&self, page: u32, page_size: u32) -> Result<Vec<Recipe>, FetchError>;

    /// `GET /Recipe/{id}`
    async fn get_recipe(&self, id: RecipeId) -> Result<Recipe, FetchError>;

    /// `POST /Order/create-and-send-to-queue`. A refusal comes back as
    /// [`FetchError::Status`] carrying the backend's message.
    async fn create_order(&self, order: &NewOrder) -> Result<(), FetchError>;

    /// `GET /Order/{orderId}`
    async fn get_order(&self, id: OrderId) -> Result<Order, FetchError>;

    /// `PUT /Order/update-order-status`
    async fn update_order_status(&self, update: &StatusUpdate) -> Result<(), FetchError>;

    /// `GET /Order/all?sort=true&page=&pageSize=`
    async fn list_orders(&self, page: u32, page_size: u32) -> Result<Vec<Order>, FetchError>;
}

pub type SharedBackend = Arc<dyn OrderBackend>;

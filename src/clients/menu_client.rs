use tracing::{info, instrument};

use crate::backend::SharedBackend;
use crate::clients::CartClient;
use crate::domain::{CartSnapshot, Recipe, RecipeId};
use crate::error::{FetchError, OrderError};

/// Catalog lookups, plus the fetch-then-add flow of the item detail screen.
#[derive(Clone)]
pub struct MenuClient {
    backend: SharedBackend,
    cart: CartClient,
}

impl MenuClient {
    pub fn new(backend: SharedBackend, cart: CartClient) -> Self {
        Self { backend, cart }
    }

    #[instrument(skip(self))]
    pub async fn menu(&self, page: u32, page_size: u32) -> Result<Vec<Recipe>, FetchError> {
        let recipes = self.backend.list_recipes(page, page_size).await?;
        info!(count = recipes.len(), "Menu loaded");
        Ok(recipes)
    }

    #[instrument(skip(self))]
    pub async fn recipe(&self, recipe_id: RecipeId) -> Result<Recipe, FetchError> {
        self.backend.get_recipe(recipe_id).await
    }

    /// Looks the recipe up fresh so a sold-out dish is caught before it reaches the cart.
    #[instrument(skip(self, instruction))]
    pub async fn add_to_cart(
        &self,
        recipe_id: RecipeId,
        quantity: u32,
        instruction: Option<String>,
    ) -> Result<CartSnapshot, OrderError> {
        let recipe = self.backend.get_recipe(recipe_id).await?;
        Ok(self.cart.add(recipe, quantity, instruction).await?)
    }
}

use super::{Recipe, RecipeId};

/// A line in the cart: one catalog recipe with a requested quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub item_id: RecipeId,
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub instruction: Option<String>,
}

impl CartItem {
    pub fn from_recipe(recipe: &Recipe, quantity: u32, instruction: Option<String>) -> Self {
        Self {
            item_id: recipe.recipe_id,
            name: recipe.recipe_name.clone(),
            image_url: recipe.image_url.clone(),
            quantity,
            instruction,
        }
    }
}

/// Immutable view of the cart handed to checkout and to subscribers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn first(&self) -> Option<&CartItem> {
        self.items.first()
    }
}

use serde::{Deserialize, Serialize};

/// Backend identifier of a catalog recipe.
pub type RecipeId = i64;

/// A dish on the menu, as served by `GET /Recipe/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub recipe_id: RecipeId,
    #[serde(default)]
    pub recipe_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_active() -> bool {
    true
}

/// One page of `GET /Recipe/all`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePage {
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

impl Recipe {
    pub fn new(recipe_id: RecipeId, recipe_name: impl Into<String>) -> Self {
        Self {
            recipe_id,
            recipe_name: recipe_name.into(),
            image_url: None,
            ingredients: None,
            is_active: true,
            description: None,
        }
    }

    /// Marks the recipe as sold out.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

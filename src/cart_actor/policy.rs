use crate::config::CartPolicy;
use crate::domain::{CartItem, Recipe};
use crate::error::CartError;

/// Applies an add under `policy`. Every check runs before `items` is touched, so an
/// `Err` leaves the cart exactly as it was.
///
/// Re-adding a recipe already in the cart bumps its quantity under either policy; a
/// newer instruction replaces the old one.
pub fn add_line(
    items: &mut Vec<CartItem>,
    policy: CartPolicy,
    recipe: &Recipe,
    quantity: u32,
    instruction: Option<String>,
) -> Result<(), CartError> {
    if !recipe.is_active {
        return Err(CartError::ItemUnavailable(recipe.recipe_id));
    }
    if quantity == 0 {
        return Err(CartError::InvalidQuantity(quantity));
    }

    if let Some(line) = items.iter_mut().find(|line| line.item_id == recipe.recipe_id) {
        line.quantity = line
            .quantity
            .checked_add(quantity)
            .ok_or(CartError::InvalidQuantity(quantity))?;
        if instruction.is_some() {
            line.instruction = instruction;
        }
        return Ok(());
    }

    if policy == CartPolicy::SingleItem {
        if let Some(held) = items.first() {
            return Err(CartError::CartFull { held: held.item_id, requested: recipe.recipe_id });
        }
    }

    items.push(CartItem::from_recipe(recipe, quantity, instruction));
    Ok(())
}

/// Puts lines taken for a failed checkout back in front of whatever was added since.
///
/// A returning line merges into a newer line for the same recipe. Under `SingleItem` a
/// returning line for a different recipe than the one now held is dropped, and the newer
/// choice wins. Returns the dropped lines.
pub fn restore_lines(items: &mut Vec<CartItem>, policy: CartPolicy, taken: Vec<CartItem>) -> Vec<CartItem> {
    let mut dropped = Vec::new();
    let mut front = 0;
    for line in taken {
        if let Some(existing) = items.iter_mut().find(|existing| existing.item_id == line.item_id) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
            if existing.instruction.is_none() {
                existing.instruction = line.instruction;
            }
            continue;
        }
        if policy == CartPolicy::SingleItem && !items.is_empty() {
            dropped.push(line);
            continue;
        }
        items.insert(front, line);
        front += 1;
    }
    dropped
}

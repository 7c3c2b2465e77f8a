//! # Grocery List Generation
//!
//! Runs a grocery list request through the full pipeline: validate the
//! request, fetch and check the recipes, flatten their ingredient groups,
//! consolidate, categorize, number the items and hand them to storage.

use crate::categorizer::CategoryTable;
use crate::config::GroceryConfig;
use crate::consolidator::Consolidator;
use crate::grocery_errors::GroceryListError;
use crate::ingredient_model::{format_quantity, GroceryList, GroceryListEntry, RawIngredient};
use crate::store::{GroceryListStore, RecipeSource};
use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A request to build a grocery list from recipes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryListRequest {
    /// Requesting user; `None` for trusted local callers, which skips access checks
    #[serde(default)]
    pub user_id: Option<i64>,
    pub recipe_ids: Vec<i64>,
    pub servings_multiplier: f64,
}

impl GroceryListRequest {
    pub fn new(user_id: Option<i64>, recipe_ids: Vec<i64>, servings_multiplier: f64) -> Self {
        Self {
            user_id,
            recipe_ids,
            servings_multiplier,
        }
    }
}

/// Builds grocery lists from recipes
#[derive(Debug, Clone, Default)]
pub struct GroceryListGenerator {
    consolidator: Consolidator,
    categories: CategoryTable,
    config: GroceryConfig,
}

impl GroceryListGenerator {
    pub fn new(consolidator: Consolidator, categories: CategoryTable, config: GroceryConfig) -> Self {
        Self {
            consolidator,
            categories,
            config,
        }
    }

    /// Build a generator from configuration, loading any configured tables
    pub fn from_config(config: GroceryConfig) -> Result<Self> {
        let folding = config.load_folding_table()?;
        let categories = config.load_category_table()?;
        info!(
            folding_version = folding.version,
            category_version = categories.version(),
            "Grocery list generator ready"
        );
        Ok(Self::new(Consolidator::new(folding), categories, config))
    }

    /// Check a request and return its distinct recipe ids in request order
    pub fn validate_request(&self, request: &GroceryListRequest) -> Result<Vec<i64>, GroceryListError> {
        let multiplier = request.servings_multiplier;
        if !multiplier.is_finite()
            || multiplier <= 0.0
            || multiplier > self.config.max_servings_multiplier
        {
            return Err(GroceryListError::Validation(format!(
                "servings multiplier must be greater than 0 and at most {}, got {}",
                self.config.max_servings_multiplier, multiplier
            )));
        }

        if request.recipe_ids.is_empty() {
            return Err(GroceryListError::Validation(
                "at least one recipe is required".to_string(),
            ));
        }

        let mut recipe_ids: Vec<i64> = Vec::with_capacity(request.recipe_ids.len());
        for &recipe_id in &request.recipe_ids {
            if recipe_id <= 0 {
                return Err(GroceryListError::Validation(format!(
                    "invalid recipe id {recipe_id}"
                )));
            }
            if recipe_ids.contains(&recipe_id) {
                debug!(recipe_id, "Dropping duplicate recipe id");
                continue;
            }
            recipe_ids.push(recipe_id);
        }

        if recipe_ids.len() > self.config.max_recipes {
            return Err(GroceryListError::Validation(format!(
                "too many recipes: {} requested, at most {} allowed",
                recipe_ids.len(),
                self.config.max_recipes
            )));
        }

        Ok(recipe_ids)
    }

    /// Fetch the requested recipes and flatten them into raw ingredients
    ///
    /// Recipes are read in request order and ingredients keep their order
    /// within each recipe.
    pub fn collect_ingredients(
        &self,
        source: &dyn RecipeSource,
        user_id: Option<i64>,
        recipe_ids: &[i64],
    ) -> Result<Vec<RawIngredient>, GroceryListError> {
        let mut raw_ingredients = Vec::new();

        for &recipe_id in recipe_ids {
            let recipe = source.fetch_recipe(recipe_id)?.ok_or_else(|| {
                GroceryListError::Validation(format!("recipe {recipe_id} does not exist"))
            })?;

            if let Some(user_id) = user_id {
                if !recipe.is_accessible_by(user_id) {
                    warn!(user_id, recipe_id, "User may not use recipe");
                    return Err(GroceryListError::Permission(format!(
                        "recipe {recipe_id} is not available to user {user_id}"
                    )));
                }
            }

            for ingredient in recipe.flatten() {
                if !ingredient.quantity.is_finite() || ingredient.quantity < 0.0 {
                    return Err(GroceryListError::Validation(format!(
                        "ingredient '{}' in recipe {} has invalid quantity {}",
                        ingredient.name, recipe_id, ingredient.quantity
                    )));
                }
                raw_ingredients.push(ingredient);
            }
        }

        debug!(
            recipes = recipe_ids.len(),
            ingredients = raw_ingredients.len(),
            "Collected raw ingredients"
        );
        Ok(raw_ingredients)
    }

    /// Build a categorized, numbered grocery list without storing it
    pub fn build(
        &self,
        source: &dyn RecipeSource,
        request: &GroceryListRequest,
    ) -> Result<GroceryList, GroceryListError> {
        let recipe_ids = self.validate_request(request)?;
        let raw_ingredients = self.collect_ingredients(source, request.user_id, &recipe_ids)?;

        let mut items = self
            .consolidator
            .consolidate(&raw_ingredients, request.servings_multiplier);
        self.categories
            .categorize_items(&mut items, self.consolidator.folding_table());

        let entries: Vec<GroceryListEntry> = items
            .into_iter()
            .enumerate()
            .map(|(position, item)| GroceryListEntry { position, item })
            .collect();

        info!(
            recipes = recipe_ids.len(),
            raw_ingredients = raw_ingredients.len(),
            items = entries.len(),
            servings_multiplier = request.servings_multiplier,
            "Built grocery list"
        );

        Ok(GroceryList {
            list_id: None,
            generated_at: Utc::now(),
            servings_multiplier: request.servings_multiplier,
            items: entries,
        })
    }

    /// Build a grocery list and store it as the items of `list_id`
    pub fn generate(
        &self,
        source: &dyn RecipeSource,
        store: &mut dyn GroceryListStore,
        list_id: i64,
        request: &GroceryListRequest,
    ) -> Result<GroceryList, GroceryListError> {
        let mut list = self.build(source, request)?;

        if let Err(err) = store.replace_items(list_id, &list.items) {
            warn!(list_id, error = %err, retryable = err.is_retryable(), "Failed to store grocery list");
            return Err(err);
        }

        info!(list_id, items = list.items.len(), "Stored grocery list");
        list.list_id = Some(list_id);
        Ok(list)
    }
}

/// Format a grocery list for display, grouped by category
///
/// Categories appear in the order of their first item; items keep their
/// list order inside each category.
pub fn format_grocery_list(list: &GroceryList) -> String {
    let mut categories: Vec<(&str, Vec<&GroceryListEntry>)> = Vec::new();
    for entry in &list.items {
        let category = entry.item.category.as_str();
        match categories.iter_mut().find(|(name, _)| *name == category) {
            Some((_, entries)) => entries.push(entry),
            None => categories.push((category, vec![entry])),
        }
    }

    let mut output = String::new();
    output.push_str(&format!(
        "🛒 Grocery List ({} items, x{} servings)\n",
        list.items.len(),
        format_quantity(list.servings_multiplier)
    ));

    for (category, entries) in categories {
        output.push_str(&format!("\n{}\n", category));
        for entry in entries {
            output.push_str(&format!("  • {}\n", entry.item));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredient_model::Recipe;
    use crate::store::{InMemoryGroceryListStore, InMemoryRecipeSource};

    fn recipes() -> InMemoryRecipeSource {
        InMemoryRecipeSource::new(vec![
            Recipe::new(1, 10).with_group(
                None,
                vec![("tomatoes", 2.0, None), ("olive oil", 2.0, Some("tbsp"))],
            ),
            Recipe::new(2, 10).with_group(
                Some("Sauce"),
                vec![("tomato", 3.0, None), ("olive oil", 1.0, Some("tbsp"))],
            ),
        ])
    }

    #[test]
    fn test_full_generation_pipeline() {
        let generator = GroceryListGenerator::default();
        let mut store = InMemoryGroceryListStore::new();
        let request = GroceryListRequest::new(Some(10), vec![1, 2], 1.0);

        let list = generator
            .generate(&recipes(), &mut store, 77, &request)
            .unwrap();

        assert_eq!(list.list_id, Some(77));
        assert_eq!(list.len(), 2);
        assert_eq!(list.items[0].position, 0);
        assert_eq!(list.items[0].item.name, "tomatoes");
        assert_eq!(list.items[0].item.quantity, 5.0);
        assert_eq!(list.items[0].item.category, "Produce");
        assert_eq!(list.items[1].position, 1);
        assert_eq!(list.items[1].item.quantity, 3.0);
        assert_eq!(list.items[1].item.unit.as_deref(), Some("tbsp"));
        assert_eq!(list.items[1].item.category, "Oils & Vinegars");
        assert_eq!(store.items(77).map(|items| items.len()), Some(2));
    }

    #[test]
    fn test_format_grocery_list() {
        let generator = GroceryListGenerator::default();
        let request = GroceryListRequest::new(Some(10), vec![1, 2], 1.0);
        let list = generator.build(&recipes(), &request).unwrap();

        let text = format_grocery_list(&list);

        assert!(text.contains("2 items, x1 servings"));
        assert!(text.contains("Produce\n  • 5 tomatoes\n"));
        assert!(text.contains("Oils & Vinegars\n  • 3 tbsp olive oil\n"));
    }
}

//! Collaborator seams for grocery list generation.
//!
//! The recipe store and the grocery list persistence layer live outside this
//! crate; these traits describe what generation needs from them. The
//! in-memory implementations back the command-line tool and the tests.

use crate::grocery_errors::GroceryListError;
use crate::ingredient_model::{GroceryListEntry, Recipe};
use anyhow::{Context, Result};
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Supplies recipes by id
pub trait RecipeSource {
    /// Fetch a recipe; `Ok(None)` when no such recipe exists
    fn fetch_recipe(&self, recipe_id: i64) -> Result<Option<Recipe>, GroceryListError>;
}

/// Stores the items of a grocery list
pub trait GroceryListStore {
    /// Replace every item of `list_id` with `entries`, in the order given
    fn replace_items(
        &mut self,
        list_id: i64,
        entries: &[GroceryListEntry],
    ) -> Result<(), GroceryListError>;
}

/// Recipes held in memory, in insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecipeSource {
    recipes: Vec<Recipe>,
}

impl InMemoryRecipeSource {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// Parse a JSON array of recipes
    pub fn from_json_str(json: &str) -> Result<Self> {
        let recipes: Vec<Recipe> =
            serde_json::from_str(json).context("Failed to parse recipes JSON")?;
        Ok(Self::new(recipes))
    }

    /// Load a JSON array of recipes from a file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipes file {}", path.display()))?;
        let source = Self::from_json_str(&json)
            .with_context(|| format!("Invalid recipes file {}", path.display()))?;
        debug!("Loaded {} recipes from {}", source.recipes.len(), path.display());
        Ok(source)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Ids of every recipe, in insertion order
    pub fn recipe_ids(&self) -> Vec<i64> {
        self.recipes.iter().map(|recipe| recipe.id).collect()
    }
}

impl RecipeSource for InMemoryRecipeSource {
    fn fetch_recipe(&self, recipe_id: i64) -> Result<Option<Recipe>, GroceryListError> {
        Ok(self
            .recipes
            .iter()
            .find(|recipe| recipe.id == recipe_id)
            .cloned())
    }
}

/// Grocery lists held in memory, keyed by list id
#[derive(Debug, Clone, Default)]
pub struct InMemoryGroceryListStore {
    lists: HashMap<i64, Vec<GroceryListEntry>>,
}

impl InMemoryGroceryListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored items of a list, if it was ever written
    pub fn items(&self, list_id: i64) -> Option<&[GroceryListEntry]> {
        self.lists.get(&list_id).map(Vec::as_slice)
    }
}

impl GroceryListStore for InMemoryGroceryListStore {
    fn replace_items(
        &mut self,
        list_id: i64,
        entries: &[GroceryListEntry],
    ) -> Result<(), GroceryListError> {
        debug!("Storing {} items on grocery list {}", entries.len(), list_id);
        self.lists.insert(list_id, entries.to_vec());
        Ok(())
    }
}

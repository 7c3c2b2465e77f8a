//! # Grocery
//!
//! Builds grocery lists from recipes: ingredient lines from several recipes
//! are merged by normalized name and unit family, converted, scaled by a
//! servings multiplier and sorted into shopping categories.

pub mod categorizer;
pub mod config;
pub mod consolidator;
pub mod grocery_errors;
pub mod grocery_list;
pub mod ingredient_model;
pub mod name_folding;
pub mod store;
pub mod unit_conversion;

pub use consolidator::{consolidate, Consolidator};
pub use grocery_errors::GroceryListError;
pub use grocery_list::{format_grocery_list, GroceryListGenerator, GroceryListRequest};
pub use ingredient_model::{ConsolidatedItem, GroceryList, RawIngredient, Recipe};

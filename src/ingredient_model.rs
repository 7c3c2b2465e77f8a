//! # Ingredient and Grocery List Data Model
//!
//! This module defines the data structures that flow through grocery list
//! generation: recipes as the recipe store hands them over, the raw ingredient
//! lines flattened out of them, and the consolidated shopping-list items built
//! from those lines.
//!
//! ## Core Concepts
//!
//! - **Raw ingredient**: a single ingredient line from one recipe, before merging
//! - **Consolidated item**: a merged, deduplicated shopping-list line
//! - **Unit**: a recognized measurement unit (cups, tablespoons, grams, etc.)
//! - **Unit family**: units that convert into one another
//!
//! ## Usage
//!
//! ```rust
//! use grocery::ingredient_model::{RawIngredient, Recipe};
//!
//! let milk = RawIngredient::new("milk", 1.0, 7).with_unit("cup");
//! assert_eq!(milk.unit.as_deref(), Some("cup"));
//!
//! let recipe = Recipe::new(7, 1).with_group(None, vec![("milk", 1.0, Some("cup"))]);
//! assert_eq!(recipe.flatten(), vec![milk]);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned to items before the category table has been consulted
pub const DEFAULT_CATEGORY: &str = "Other";

/// A single ingredient line as it appears in one recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIngredient {
    /// The ingredient name as written in the recipe (e.g., "Tomatoes")
    pub name: String,

    /// Numeric quantity, before the servings multiplier
    pub quantity: f64,

    /// Unit string as written in the recipe; `None` for counted items
    #[serde(default)]
    pub unit: Option<String>,

    /// Recipe the line was taken from
    pub recipe_id: i64,
}

/// A merged shopping-list line aggregating one or more raw ingredients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedItem {
    /// Display name, the most common spelling among the merged lines
    pub name: String,

    /// Summed quantity in `unit`, rounded for its unit family
    pub quantity: f64,

    /// Display unit; `None` for counted items
    pub unit: Option<String>,

    /// Shopping category
    pub category: String,

    /// Every contributing recipe id, once each, in first-seen order
    pub source_recipe_ids: Vec<i64>,
}

/// Families of units that can be converted into one another
///
/// Two raw ingredients are only ever merged when their units share a family.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitFamily {
    /// Volume units, base unit millilitres
    Volume,
    /// Mass units, base unit grams
    Mass,
    /// Explicit piece units (piece, dozen), base unit pieces
    Piece,
    /// No unit at all ("2 eggs")
    Count,
    /// A recognized unit without conversions (clove, can, pinch), keyed by symbol
    Named(String),
    /// An unrecognized unit string, keyed by its lower-cased literal
    Unrecognized(String),
}

/// Measuring system a unit belongs to, used to pick display units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementSystem {
    /// Millilitres, litres, grams, kilograms
    Metric,
    /// Teaspoons, cups, ounces, pounds
    Customary,
    /// Units that belong to no measuring system
    Neutral,
}

/// Measurement units with normalization support
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    // Volume units
    /// Teaspoons
    Teaspoons,
    /// Tablespoons
    Tablespoons,
    /// Fluid ounces
    FluidOunces,
    /// Cups
    Cups,
    /// Pints
    Pints,
    /// Quarts
    Quarts,
    /// Gallons
    Gallons,
    /// Milliliters
    Milliliters,
    /// Centiliters
    Centiliters,
    /// Deciliters
    Deciliters,
    /// Liters
    Liters,

    // Weight units
    /// Milligrams
    Milligrams,
    /// Grams
    Grams,
    /// Kilograms
    Kilograms,
    /// Ounces
    Ounces,
    /// Pounds
    Pounds,

    // Count/piece units
    /// Individual pieces/items
    Pieces,
    /// Dozen
    Dozen,

    // Specialized units
    /// Pinches (very small amounts)
    Pinches,
    /// Dashes (small amounts)
    Dashes,
    /// Cloves (for garlic)
    Cloves,
    /// Cans
    Cans,
    /// Bottles
    Bottles,
    /// Packages/containers
    Packages,
    /// Slices
    Slices,
    /// Bunches (herbs, greens)
    Bunches,
    /// Sprigs
    Sprigs,
    /// Sticks (butter, cinnamon)
    Sticks,

    /// Unrecognized unit, holding the trimmed original spelling
    Unknown(String),
}

impl Unit {
    /// Canonical singular symbol used for display and as a grouping key
    pub fn symbol(&self) -> &str {
        match self {
            Unit::Teaspoons => "tsp",
            Unit::Tablespoons => "tbsp",
            Unit::FluidOunces => "fl oz",
            Unit::Cups => "cup",
            Unit::Pints => "pint",
            Unit::Quarts => "quart",
            Unit::Gallons => "gallon",
            Unit::Milliliters => "ml",
            Unit::Centiliters => "cl",
            Unit::Deciliters => "dl",
            Unit::Liters => "l",
            Unit::Milligrams => "mg",
            Unit::Grams => "g",
            Unit::Kilograms => "kg",
            Unit::Ounces => "oz",
            Unit::Pounds => "lb",
            Unit::Pieces => "piece",
            Unit::Dozen => "dozen",
            Unit::Pinches => "pinch",
            Unit::Dashes => "dash",
            Unit::Cloves => "clove",
            Unit::Cans => "can",
            Unit::Bottles => "bottle",
            Unit::Packages => "package",
            Unit::Slices => "slice",
            Unit::Bunches => "bunch",
            Unit::Sprigs => "sprig",
            Unit::Sticks => "stick",
            Unit::Unknown(original) => original,
        }
    }

    /// Check if this is a volume unit
    pub fn is_volume(&self) -> bool {
        matches!(
            self,
            Unit::Teaspoons
                | Unit::Tablespoons
                | Unit::FluidOunces
                | Unit::Cups
                | Unit::Pints
                | Unit::Quarts
                | Unit::Gallons
                | Unit::Milliliters
                | Unit::Centiliters
                | Unit::Deciliters
                | Unit::Liters
        )
    }

    /// Check if this is a weight unit
    pub fn is_weight(&self) -> bool {
        matches!(
            self,
            Unit::Milligrams | Unit::Grams | Unit::Kilograms | Unit::Ounces | Unit::Pounds
        )
    }

    /// Check if this is an explicit piece unit
    pub fn is_piece(&self) -> bool {
        matches!(self, Unit::Pieces | Unit::Dozen)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl RawIngredient {
    /// Create a raw ingredient without a unit
    pub fn new(name: &str, quantity: f64, recipe_id: i64) -> Self {
        Self {
            name: name.to_string(),
            quantity,
            unit: None,
            recipe_id,
        }
    }

    /// Attach a unit string to this ingredient
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }
}

/// One `{ name, quantity, unit }` entry inside a recipe's ingredient group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

/// A titled section of a recipe's ingredients ("For the sauce")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientGroup {
    #[serde(default)]
    pub name: Option<String>,
    pub ingredients: Vec<RecipeIngredient>,
}

/// A recipe as supplied by the recipe store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub owner_id: i64,
    #[serde(default)]
    pub is_public: bool,
    pub ingredient_groups: Vec<IngredientGroup>,
}

impl Recipe {
    /// Create an empty private recipe
    pub fn new(id: i64, owner_id: i64) -> Self {
        Self {
            id,
            owner_id,
            is_public: false,
            ingredient_groups: Vec::new(),
        }
    }

    /// Mark the recipe as shared with every user
    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }

    /// Append an ingredient group built from `(name, quantity, unit)` triples
    pub fn with_group(mut self, name: Option<&str>, ingredients: Vec<(&str, f64, Option<&str>)>) -> Self {
        self.ingredient_groups.push(IngredientGroup {
            name: name.map(str::to_string),
            ingredients: ingredients
                .into_iter()
                .map(|(name, quantity, unit)| RecipeIngredient {
                    name: name.to_string(),
                    quantity,
                    unit: unit.map(str::to_string),
                })
                .collect(),
        });
        self
    }

    /// Check whether `user_id` may put this recipe on a grocery list
    pub fn is_accessible_by(&self, user_id: i64) -> bool {
        self.is_public || self.owner_id == user_id
    }

    /// Flatten every ingredient group into raw ingredient lines, in order
    pub fn flatten(&self) -> Vec<RawIngredient> {
        self.ingredient_groups
            .iter()
            .flat_map(|group| group.ingredients.iter())
            .map(|ingredient| RawIngredient {
                name: ingredient.name.clone(),
                quantity: ingredient.quantity,
                unit: ingredient.unit.clone(),
                recipe_id: self.id,
            })
            .collect()
    }
}

/// A consolidated item with its display position on a grocery list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryListEntry {
    pub position: usize,
    #[serde(flatten)]
    pub item: ConsolidatedItem,
}

/// A generated grocery list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryList {
    /// Target list id, when the list was persisted
    pub list_id: Option<i64>,
    pub generated_at: DateTime<Utc>,
    pub servings_multiplier: f64,
    pub items: Vec<GroceryListEntry>,
}

impl GroceryList {
    /// Number of items on the list
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether the list has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Format a quantity without trailing zeros ("2", "0.5", "1.25")
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{:.0}", quantity)
    } else {
        format!("{}", quantity)
    }
}

impl fmt::Display for ConsolidatedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_quantity(self.quantity))?;

        if let Some(unit) = &self.unit {
            write!(f, " {}", unit)?;
        }

        write!(f, " {}", self.name)
    }
}

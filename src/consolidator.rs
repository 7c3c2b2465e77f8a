//! # Ingredient Consolidator
//!
//! Merges raw ingredient lines from several recipes into one deduplicated,
//! unit-converted shopping list.
//!
//! Two lines merge when they share a [`MatchingKey`]: the folded ingredient
//! name plus the unit family. Within a group every quantity is converted to
//! the family base unit, scaled by the servings multiplier and summed, then
//! shown in a single display unit chosen for the whole group.
//!
//! Consolidation is a pure function of its input. It never fails, keeps no
//! state between calls, and returns identical output for identical input.
//!
//! ```rust
//! use grocery::consolidator::consolidate;
//! use grocery::ingredient_model::RawIngredient;
//!
//! let raw = vec![
//!     RawIngredient::new("tomato", 2.0, 1),
//!     RawIngredient::new("tomatoes", 3.0, 2),
//! ];
//! let items = consolidate(&raw, 1.0);
//!
//! assert_eq!(items.len(), 1);
//! assert_eq!(items[0].name, "tomato");
//! assert_eq!(items[0].quantity, 5.0);
//! assert_eq!(items[0].unit, None);
//! assert_eq!(items[0].source_recipe_ids, vec![1, 2]);
//! ```

use crate::ingredient_model::{
    ConsolidatedItem, RawIngredient, Unit, UnitFamily, DEFAULT_CATEGORY,
};
use crate::name_folding::FoldingTable;
use crate::unit_conversion::{choose_display_unit, family_of, parse_unit};
use log::{debug, trace};
use std::collections::HashMap;

/// Decides which raw ingredients merge: equal keys merge, nothing else does
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchingKey {
    /// Folded ingredient name
    pub name: String,
    /// Unit family of the ingredient's unit
    pub family: UnitFamily,
}

/// Consolidate raw ingredients with the built-in folding table
///
/// See [`Consolidator::consolidate`].
pub fn consolidate(
    raw_ingredients: &[RawIngredient],
    servings_multiplier: f64,
) -> Vec<ConsolidatedItem> {
    Consolidator::default().consolidate(raw_ingredients, servings_multiplier)
}

/// Ingredient consolidator configured with a name folding table
#[derive(Debug, Clone, Default)]
pub struct Consolidator {
    folding: FoldingTable,
}

/// Running totals for one matching key
struct Group {
    /// Unit of the first contributing line; fixes display family and system
    first_unit: Option<Unit>,
    /// Sum in the family base unit, multiplier applied
    base_total: f64,
    /// Display spellings with their counts, in first-seen order
    spellings: Vec<(String, usize)>,
    recipe_ids: Vec<i64>,
}

impl Group {
    fn new(first_unit: Option<Unit>) -> Self {
        Self {
            first_unit,
            base_total: 0.0,
            spellings: Vec::new(),
            recipe_ids: Vec::new(),
        }
    }

    fn add(&mut self, spelling: String, base_quantity: f64, recipe_id: i64) {
        self.base_total += base_quantity;

        match self.spellings.iter_mut().find(|(known, _)| *known == spelling) {
            Some((_, count)) => *count += 1,
            None => self.spellings.push((spelling, 1)),
        }

        if !self.recipe_ids.contains(&recipe_id) {
            self.recipe_ids.push(recipe_id);
        }
    }

    /// Most frequent spelling; the first seen wins a tie
    fn display_name(&self) -> String {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.spellings {
            match best {
                Some((_, count)) if entry.1 <= *count => {}
                _ => best = Some(entry),
            }
        }
        best.map(|(spelling, _)| spelling.clone()).unwrap_or_default()
    }

    fn finish(self) -> ConsolidatedItem {
        let display = choose_display_unit(self.first_unit.as_ref(), self.base_total);

        ConsolidatedItem {
            name: self.display_name(),
            quantity: display.present(self.base_total),
            unit: display.unit.map(|unit| unit.symbol().to_string()),
            category: DEFAULT_CATEGORY.to_string(),
            source_recipe_ids: self.recipe_ids,
        }
    }
}

// Spelling used for display-name voting: trimmed, single spaces
fn display_spelling(name: &str) -> String {
    name.split_whitespace().collect::<Vec<&str>>().join(" ")
}

impl Consolidator {
    /// Create a consolidator using a specific folding table
    pub fn new(folding: FoldingTable) -> Self {
        Self { folding }
    }

    /// The folding table used to derive matching names
    pub fn folding_table(&self) -> &FoldingTable {
        &self.folding
    }

    /// Matching key of a single raw ingredient
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grocery::consolidator::Consolidator;
    /// use grocery::ingredient_model::{RawIngredient, UnitFamily};
    ///
    /// let consolidator = Consolidator::default();
    /// let key = consolidator.matching_key(&RawIngredient::new("Cloves of Garlic", 2.0, 1));
    /// assert_eq!(key.name, "clove of garlic");
    /// assert_eq!(key.family, UnitFamily::Count);
    ///
    /// let key = consolidator.matching_key(&RawIngredient::new("flour", 2.0, 1).with_unit("cups"));
    /// assert_eq!(key.family, UnitFamily::Volume);
    /// ```
    pub fn matching_key(&self, ingredient: &RawIngredient) -> MatchingKey {
        self.parse(ingredient).1
    }

    fn parse(&self, ingredient: &RawIngredient) -> (Option<Unit>, MatchingKey) {
        let unit = parse_unit(ingredient.unit.as_deref());
        let key = MatchingKey {
            name: self.folding.matching_name(&ingredient.name),
            family: family_of(unit.as_ref()),
        };
        (unit, key)
    }

    /// Merge raw ingredient lines into consolidated shopping-list items
    ///
    /// Every quantity is multiplied by `servings_multiplier` before merging.
    /// Items come back in the order their first contributing line appears in
    /// `raw_ingredients`, each with the default category; categorization is
    /// left to the caller.
    ///
    /// Zero and negative quantities are carried through unchanged, and
    /// non-finite quantities must be rejected before calling.
    pub fn consolidate(
        &self,
        raw_ingredients: &[RawIngredient],
        servings_multiplier: f64,
    ) -> Vec<ConsolidatedItem> {
        debug!(
            "Consolidating {} raw ingredients with servings multiplier {} (folding table v{})",
            raw_ingredients.len(),
            servings_multiplier,
            self.folding.version
        );

        let mut groups: Vec<Group> = Vec::new();
        let mut index: HashMap<MatchingKey, usize> = HashMap::new();

        for ingredient in raw_ingredients {
            let (unit, key) = self.parse(ingredient);
            let base_quantity = ingredient.quantity
                * unit.as_ref().map_or(1.0, Unit::base_factor)
                * servings_multiplier;

            trace!(
                "'{}' ({} {:?}, recipe {}) -> {:?}, {} base units",
                ingredient.name,
                ingredient.quantity,
                ingredient.unit,
                ingredient.recipe_id,
                key,
                base_quantity
            );

            let slot = *index.entry(key).or_insert_with(|| {
                groups.push(Group::new(unit));
                groups.len() - 1
            });
            groups[slot].add(
                display_spelling(&ingredient.name),
                base_quantity,
                ingredient.recipe_id,
            );
        }

        let items: Vec<ConsolidatedItem> = groups.into_iter().map(Group::finish).collect();

        debug!(
            "Consolidated {} raw ingredients into {} items",
            raw_ingredients.len(),
            items.len()
        );
        items
    }
}

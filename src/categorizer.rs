//! Ingredient categorization for shopping list grouping.
//!
//! Maps ingredient names to grocery store aisle categories by keyword
//! containment. The built-in keyword table is compiled in from
//! `data/categories.json`; callers can load their own table instead.

use crate::ingredient_model::ConsolidatedItem;
use crate::name_folding::FoldingTable;
use anyhow::{Context, Result};
use log::{debug, trace};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

const BUILTIN_TABLE_JSON: &str = include_str!("../data/categories.json");

static BUILTIN_TABLE: LazyLock<CategoryTable> = LazyLock::new(|| {
    CategoryTable::from_json_str(BUILTIN_TABLE_JSON)
        .expect("Built-in category table should be valid")
});

fn default_category() -> String {
    crate::ingredient_model::DEFAULT_CATEGORY.to_string()
}

/// The raw JSON structure of a category table file.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryTableData {
    version: u32,
    #[serde(default = "default_category")]
    default_category: String,
    categories: HashMap<String, String>,
}

/// Immutable keyword → category lookup
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    version: u32,
    default_category: String,
    /// Sorted by keyword length (longest first) so specific keywords win
    keywords: Vec<(String, String)>,
}

impl CategoryTable {
    /// The table shipped with the crate
    pub fn builtin() -> &'static CategoryTable {
        &BUILTIN_TABLE
    }

    /// Parse a category table from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let data: CategoryTableData =
            serde_json::from_str(json).context("Failed to parse category table JSON")?;

        let mut keywords: Vec<(String, String)> = data
            .categories
            .into_iter()
            .map(|(keyword, category)| (keyword.to_lowercase(), category))
            .collect();
        // Secondary sort on the keyword keeps the order deterministic.
        keywords.sort_by(|a, b| {
            b.0.chars()
                .count()
                .cmp(&a.0.chars().count())
                .then_with(|| a.0.cmp(&b.0))
        });

        Ok(Self {
            version: data.version,
            default_category: data.default_category,
            keywords,
        })
    }

    /// Load a category table from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read category table {}", path.display()))?;
        let table = Self::from_json_str(&json)
            .with_context(|| format!("Invalid category table {}", path.display()))?;
        debug!(
            "Loaded category table version {} with {} keywords from {}",
            table.version,
            table.keywords.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    fn lookup(&self, candidate: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|(keyword, _)| candidate.contains(keyword.as_str()))
            .map(|(_, category)| category.as_str())
    }

    /// Categorize an ingredient by name.
    ///
    /// Returns the default category when no keyword is contained in the
    /// lower-cased name.
    pub fn categorize(&self, name: &str) -> &str {
        self.lookup(&name.to_lowercase())
            .unwrap_or(&self.default_category)
    }

    /// Assign a category to every consolidated item
    ///
    /// The display name is tried first, then its folded matching name, so
    /// "Tomatoes" and "ripe tomato (halved)" both find `tomato`.
    pub fn categorize_items(&self, items: &mut [ConsolidatedItem], folding: &FoldingTable) {
        for item in items.iter_mut() {
            let category = self
                .lookup(&item.name.to_lowercase())
                .or_else(|| self.lookup(&folding.matching_name(&item.name)))
                .unwrap_or(&self.default_category);

            trace!("Categorized '{}' as '{}'", item.name, category);
            item.category = category.to_string();
        }
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        BUILTIN_TABLE.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredient_model::DEFAULT_CATEGORY;

    fn categorize(name: &str) -> &'static str {
        CategoryTable::builtin().categorize(name)
    }

    #[test]
    fn test_produce() {
        assert_eq!(categorize("chicken breast"), "Meat & Seafood");
        assert_eq!(categorize("Olive Oil"), "Oils & Vinegars");
        assert_eq!(categorize("tomatoes"), "Produce");
        assert_eq!(categorize("Fresh Basil"), "Produce");
        assert_eq!(categorize("dried basil"), "Spices & Seasonings");
        assert_eq!(categorize("eggplant"), "Produce");
    }

    #[test]
    fn test_dairy() {
        assert_eq!(categorize("butter"), "Dairy & Eggs");
        assert_eq!(categorize("eggs"), "Dairy & Eggs");
        assert_eq!(categorize("lait"), "Dairy & Eggs");
        assert_eq!(categorize("laitue"), "Produce");
    }

    #[test]
    fn test_cheese() {
        assert_eq!(categorize("parmesan cheese"), "Cheese");
        assert_eq!(categorize("mozzarella"), "Cheese");
        assert_eq!(categorize("cream cheese"), "Cheese");
        assert_eq!(categorize("peanut butter"), "Condiments & Sauces");
    }

    #[test]
    fn test_unknown() {
        assert_eq!(categorize("xyzfoobar123"), DEFAULT_CATEGORY);
        assert_eq!(categorize(""), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_custom_table_default_category() {
        let table = CategoryTable::from_json_str(
            r#"{ "version": 1, "defaultCategory": "Misc", "categories": { "Kimchi": "Asian" } }"#,
        )
        .unwrap();

        assert_eq!(table.version(), 1);
        assert_eq!(table.categorize("kimchi jar"), "Asian");
        assert_eq!(table.categorize("tofu"), "Misc");
    }

    #[test]
    fn test_categorize_items_uses_folded_name() {
        let table = CategoryTable::from_json_str(
            r#"{ "version": 1, "categories": { "leaf": "Produce" } }"#,
        )
        .unwrap();
        let mut items = vec![ConsolidatedItem {
            name: "Bay Leaves".to_string(),
            quantity: 2.0,
            unit: None,
            category: DEFAULT_CATEGORY.to_string(),
            source_recipe_ids: vec![1],
        }];

        table.categorize_items(&mut items, FoldingTable::builtin());

        assert_eq!(items[0].category, "Produce");
    }
}

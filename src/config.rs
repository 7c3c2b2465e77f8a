//! # Grocery List Configuration Module
//!
//! Request limits, table locations and logging settings for grocery list
//! generation. Values come from the environment (after loading `.env`) and
//! fall back to the defaults below.

use crate::categorizer::CategoryTable;
use crate::name_folding::FoldingTable;
use anyhow::{bail, Context, Result};
use log::info;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

// Constants for grocery list configuration
pub const DEFAULT_MAX_RECIPES: usize = 20;
pub const DEFAULT_MAX_SERVINGS_MULTIPLIER: f64 = 100.0;

pub const ENV_MAX_RECIPES: &str = "GROCERY_MAX_RECIPES";
pub const ENV_MAX_SERVINGS_MULTIPLIER: &str = "GROCERY_MAX_SERVINGS_MULTIPLIER";
pub const ENV_FOLDING_TABLE: &str = "GROCERY_FOLDING_TABLE";
pub const ENV_CATEGORY_TABLE: &str = "GROCERY_CATEGORY_TABLE";
pub const ENV_LOG_FORMAT: &str = "GROCERY_LOG_FORMAT";

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Plain `env_logger` output
    #[default]
    Text,
    /// JSON lines through `tracing-subscriber`
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => bail!("Unknown log format '{other}' (expected 'text' or 'json')"),
        }
    }
}

/// Configuration structure for grocery list generation
#[derive(Debug, Clone, PartialEq)]
pub struct GroceryConfig {
    /// Maximum number of distinct recipes on one list
    pub max_recipes: usize,
    /// Largest accepted servings multiplier (inclusive)
    pub max_servings_multiplier: f64,
    /// Folding table to load instead of the built-in one
    pub folding_table_path: Option<PathBuf>,
    /// Category table to load instead of the built-in one
    pub category_table_path: Option<PathBuf>,
    /// Log output format for the command-line tool
    pub log_format: LogFormat,
}

impl Default for GroceryConfig {
    fn default() -> Self {
        Self {
            max_recipes: DEFAULT_MAX_RECIPES,
            max_servings_multiplier: DEFAULT_MAX_SERVINGS_MULTIPLIER,
            folding_table_path: None,
            category_table_path: None,
            log_format: LogFormat::Text,
        }
    }
}

impl GroceryConfig {
    /// Build a configuration from the process environment
    ///
    /// Loads `.env` first when present. Unset variables keep their defaults;
    /// set but unparsable variables are an error.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let max_recipes = match lookup(ENV_MAX_RECIPES) {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("{ENV_MAX_RECIPES} must be a positive integer, got '{value}'"))?,
            None => defaults.max_recipes,
        };
        if max_recipes == 0 {
            bail!("{ENV_MAX_RECIPES} must be at least 1");
        }

        let max_servings_multiplier = match lookup(ENV_MAX_SERVINGS_MULTIPLIER) {
            Some(value) => value
                .trim()
                .parse::<f64>()
                .with_context(|| format!("{ENV_MAX_SERVINGS_MULTIPLIER} must be a number, got '{value}'"))?,
            None => defaults.max_servings_multiplier,
        };
        if !max_servings_multiplier.is_finite() || max_servings_multiplier <= 0.0 {
            bail!("{ENV_MAX_SERVINGS_MULTIPLIER} must be a positive number");
        }

        let log_format = match lookup(ENV_LOG_FORMAT) {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };

        let non_empty_path = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        };

        Ok(Self {
            max_recipes,
            max_servings_multiplier,
            folding_table_path: non_empty_path(ENV_FOLDING_TABLE),
            category_table_path: non_empty_path(ENV_CATEGORY_TABLE),
            log_format,
        })
    }

    /// The configured folding table, or the built-in one
    pub fn load_folding_table(&self) -> Result<FoldingTable> {
        match &self.folding_table_path {
            Some(path) => {
                info!("Loading folding table from {}", path.display());
                FoldingTable::from_path(path)
            }
            None => Ok(FoldingTable::default()),
        }
    }

    /// The configured category table, or the built-in one
    pub fn load_category_table(&self) -> Result<CategoryTable> {
        match &self.category_table_path {
            Some(path) => {
                info!("Loading category table from {}", path.display());
                CategoryTable::from_path(path)
            }
            None => Ok(CategoryTable::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = GroceryConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, GroceryConfig::default());
        assert_eq!(config.max_recipes, 20);
        assert_eq!(config.max_servings_multiplier, 100.0);
    }

    #[test]
    fn test_overrides() {
        let config = GroceryConfig::from_lookup(lookup_from(&[
            (ENV_MAX_RECIPES, "5"),
            (ENV_MAX_SERVINGS_MULTIPLIER, "12.5"),
            (ENV_FOLDING_TABLE, "/etc/grocery/folding.json"),
            (ENV_CATEGORY_TABLE, "  "),
            (ENV_LOG_FORMAT, "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.max_recipes, 5);
        assert_eq!(config.max_servings_multiplier, 12.5);
        assert_eq!(
            config.folding_table_path,
            Some(PathBuf::from("/etc/grocery/folding.json"))
        );
        assert_eq!(config.category_table_path, None);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values() {
        assert!(GroceryConfig::from_lookup(lookup_from(&[(ENV_MAX_RECIPES, "many")])).is_err());
        assert!(GroceryConfig::from_lookup(lookup_from(&[(ENV_MAX_RECIPES, "0")])).is_err());
        assert!(
            GroceryConfig::from_lookup(lookup_from(&[(ENV_MAX_SERVINGS_MULTIPLIER, "-1")])).is_err()
        );
        assert!(GroceryConfig::from_lookup(lookup_from(&[(ENV_LOG_FORMAT, "xml")])).is_err());
    }

    #[test]
    fn test_builtin_tables_without_paths() {
        let config = GroceryConfig::default();
        assert_eq!(
            config.load_folding_table().unwrap().version,
            FoldingTable::builtin().version
        );
        assert_eq!(
            config.load_category_table().unwrap().version(),
            CategoryTable::builtin().version()
        );
    }
}

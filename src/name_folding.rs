//! # Ingredient Name Folding
//!
//! Turns an ingredient name as written in a recipe into the name part of its
//! matching key, so that "Tomatoes", "tomato" and "ripe tomatoes, diced" all
//! land on `tomato`.
//!
//! The heuristics live in a [`FoldingTable`], a versioned piece of data
//! rather than code. The built-in table is compiled in from
//! `data/folding.json`; a replacement can be loaded from JSON so changes to
//! the folding rules can be reviewed and tested on their own.
//!
//! ## Folding steps
//!
//! 1. Lower-case, drop parenthetical notes, keep only the text before the first comma
//! 2. Drop one leading article or preposition ("the", "de", "l'")
//! 3. Drop descriptive modifiers ("fresh", "chopped") while a word remains
//! 4. Fold each word to its singular form
//! 5. Join with single spaces

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

const BUILTIN_TABLE_JSON: &str = include_str!("../data/folding.json");

lazy_static! {
    static ref PARENTHETICAL_REGEX: Regex =
        Regex::new(r"\([^)]*\)|\[[^\]]*\]").expect("Parenthetical pattern should be valid");
}

static BUILTIN_TABLE: LazyLock<FoldingTable> = LazyLock::new(|| {
    FoldingTable::from_json_str(BUILTIN_TABLE_JSON).expect("Built-in folding table should be valid")
});

/// Replaces a plural suffix with its singular form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuffixRule {
    pub suffix: String,
    pub replacement: String,
    /// Words shorter than this (in characters) are left alone
    #[serde(default)]
    pub min_length: usize,
}

/// Name folding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldingTable {
    /// Table revision, bumped whenever matching behaviour changes
    pub version: u32,
    /// Leading articles and prepositions; entries ending in `'` attach to the next word
    #[serde(default)]
    pub articles: Vec<String>,
    /// Descriptive words that never distinguish one ingredient from another
    #[serde(default)]
    pub modifiers: HashSet<String>,
    /// Words whose plural and singular forms are spelled the same
    #[serde(default)]
    pub invariant: HashSet<String>,
    /// Plural forms the suffix rules get wrong
    #[serde(default)]
    pub irregular: HashMap<String, String>,
    /// Suffix rules, first match wins
    #[serde(default)]
    pub suffix_rules: Vec<SuffixRule>,
}

impl FoldingTable {
    /// The table shipped with the crate
    pub fn builtin() -> &'static FoldingTable {
        &BUILTIN_TABLE
    }

    /// Parse a folding table from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let table: FoldingTable =
            serde_json::from_str(json).context("Failed to parse folding table JSON")?;
        Ok(table.lowercased())
    }

    /// Load a folding table from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read folding table {}", path.display()))?;
        let table = Self::from_json_str(&json)
            .with_context(|| format!("Invalid folding table {}", path.display()))?;
        debug!(
            "Loaded folding table version {} from {}",
            table.version,
            path.display()
        );
        Ok(table)
    }

    // Entries are compared against lower-cased names
    fn lowercased(self) -> Self {
        Self {
            version: self.version,
            articles: self.articles.iter().map(|a| a.to_lowercase()).collect(),
            modifiers: self.modifiers.iter().map(|m| m.to_lowercase()).collect(),
            invariant: self.invariant.iter().map(|w| w.to_lowercase()).collect(),
            irregular: self
                .irregular
                .iter()
                .map(|(plural, singular)| (plural.to_lowercase(), singular.to_lowercase()))
                .collect(),
            suffix_rules: self
                .suffix_rules
                .into_iter()
                .map(|rule| SuffixRule {
                    suffix: rule.suffix.to_lowercase(),
                    replacement: rule.replacement.to_lowercase(),
                    min_length: rule.min_length,
                })
                .collect(),
        }
    }

    /// Fold a single lower-case word to its singular form
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grocery::name_folding::FoldingTable;
    ///
    /// let table = FoldingTable::builtin();
    /// assert_eq!(table.fold_word("tomatoes"), "tomato");
    /// assert_eq!(table.fold_word("berries"), "berry");
    /// assert_eq!(table.fold_word("leaves"), "leaf");
    /// assert_eq!(table.fold_word("asparagus"), "asparagus");
    /// ```
    pub fn fold_word(&self, word: &str) -> String {
        if self.invariant.contains(word) {
            return word.to_string();
        }

        if let Some(singular) = self.irregular.get(word) {
            return singular.clone();
        }

        let length = word.chars().count();
        for rule in &self.suffix_rules {
            if length >= rule.min_length && word.ends_with(&rule.suffix) {
                let stem = &word[..word.len() - rule.suffix.len()];
                return format!("{}{}", stem, rule.replacement);
            }
        }

        word.to_string()
    }

    /// Derive the name part of an ingredient's matching key
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grocery::name_folding::FoldingTable;
    ///
    /// let table = FoldingTable::builtin();
    /// assert_eq!(table.matching_name("  Ripe TOMATOES, diced "), "tomato");
    /// assert_eq!(table.matching_name("tomato"), "tomato");
    /// assert_eq!(table.matching_name("de pommes de terre"), "pomme de terre");
    /// ```
    pub fn matching_name(&self, name: &str) -> String {
        let lower = name.to_lowercase();
        let without_notes = PARENTHETICAL_REGEX.replace_all(&lower, " ");

        // "onion, finely chopped" -> "onion"
        let head = match without_notes.split_once(',') {
            Some((before, _)) if !before.trim().is_empty() => before,
            _ => &without_notes[..],
        };

        let collapsed = head.split_whitespace().collect::<Vec<&str>>().join(" ");
        let collapsed = collapsed
            .trim_end_matches(|c: char| !c.is_alphanumeric())
            .to_string();
        let stripped = self.strip_article(&collapsed);

        let words: Vec<&str> = stripped.split_whitespace().collect();
        let kept: Vec<&str> = words
            .iter()
            .copied()
            .filter(|word| !self.modifiers.contains(*word))
            .collect();
        let kept = if kept.is_empty() { words } else { kept };

        let folded = kept
            .iter()
            .map(|word| self.fold_word(word))
            .collect::<Vec<String>>()
            .join(" ");

        trace!("Folded ingredient name '{}' -> '{}'", name, folded);
        folded
    }

    // Only one article is removed, and never the whole name
    fn strip_article<'a>(&self, name: &'a str) -> &'a str {
        for article in &self.articles {
            let rest = if article.ends_with('\'') {
                name.strip_prefix(article.as_str())
            } else {
                name.strip_prefix(article.as_str())
                    .and_then(|rest| rest.strip_prefix(' '))
            };

            if let Some(rest) = rest {
                let rest = rest.trim_start();
                if !rest.is_empty() {
                    return rest;
                }
            }
        }
        name
    }
}

impl Default for FoldingTable {
    fn default() -> Self {
        BUILTIN_TABLE.clone()
    }
}

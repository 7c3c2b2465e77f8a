//! # Consolidation Tests
//!
//! End-to-end checks of ingredient consolidation through the public API:
//! merging across recipes, unit families, scaling and provenance.

use grocery::consolidator::{consolidate, Consolidator, MatchingKey};
use grocery::ingredient_model::{ConsolidatedItem, RawIngredient};
use grocery::name_folding::FoldingTable;
use grocery::unit_conversion::parse_unit;
use std::collections::HashMap;

fn raw(name: &str, quantity: f64, unit: Option<&str>, recipe_id: i64) -> RawIngredient {
    let ingredient = RawIngredient::new(name, quantity, recipe_id);
    match unit {
        Some(unit) => ingredient.with_unit(unit),
        None => ingredient,
    }
}

fn weekly_menu() -> Vec<RawIngredient> {
    vec![
        raw("Tomatoes", 2.0, None, 1),
        raw("milk", 1.0, Some("cup"), 1),
        raw("garlic", 2.0, Some("cloves"), 1),
        raw("flour", 750.0, Some("g"), 1),
        raw("tomato", 3.0, None, 2),
        raw("Milk", 240.0, Some("ml"), 2),
        raw("Garlic", 1.0, Some("clove"), 3),
        raw("flour", 0.5, Some("kg"), 3),
        raw("spinach", 2.0, Some("handful"), 3),
    ]
}

// Key of a consolidated item, derived from its display name and unit
fn item_key(consolidator: &Consolidator, item: &ConsolidatedItem) -> MatchingKey {
    consolidator.matching_key(&raw(&item.name, item.quantity, item.unit.as_deref(), 0))
}

// Item quantity back in its family base unit (ml, g, pieces)
fn base_quantity(item: &ConsolidatedItem) -> f64 {
    item.quantity * parse_unit(item.unit.as_deref()).map_or(1.0, |unit| unit.base_factor())
}

fn base_totals(
    consolidator: &Consolidator,
    batches: &[Vec<ConsolidatedItem>],
) -> HashMap<MatchingKey, f64> {
    let mut totals = HashMap::new();
    for item in batches.iter().flatten() {
        *totals.entry(item_key(consolidator, item)).or_insert(0.0) += base_quantity(item);
    }
    totals
}

fn find<'a>(items: &'a [ConsolidatedItem], name: &str) -> &'a ConsolidatedItem {
    items
        .iter()
        .find(|item| item.name.eq_ignore_ascii_case(name))
        .unwrap_or_else(|| panic!("no item named {name}"))
}

#[test]
fn test_weekly_menu_consolidation() {
    let items = consolidate(&weekly_menu(), 1.0);

    assert_eq!(items.len(), 5);

    let tomato = find(&items, "tomatoes");
    assert_eq!(tomato.quantity, 5.0);
    assert_eq!(tomato.unit, None);
    assert_eq!(tomato.source_recipe_ids, vec![1, 2]);

    let milk = find(&items, "milk");
    assert_eq!(milk.quantity, 2.0);
    assert_eq!(milk.unit.as_deref(), Some("cup"));

    let garlic = find(&items, "garlic");
    assert_eq!(garlic.quantity, 3.0);
    assert_eq!(garlic.unit.as_deref(), Some("clove"));
    assert_eq!(garlic.source_recipe_ids, vec![1, 3]);

    let flour = find(&items, "flour");
    assert_eq!(flour.quantity, 1.25);
    assert_eq!(flour.unit.as_deref(), Some("kg"));

    let spinach = find(&items, "spinach");
    assert_eq!(spinach.unit.as_deref(), Some("handful"));
    assert_eq!(spinach.source_recipe_ids, vec![3]);
}

#[test]
fn test_consolidation_is_deterministic() {
    let first = consolidate(&weekly_menu(), 1.5);
    let second = consolidate(&weekly_menu(), 1.5);
    assert_eq!(first, second);
}

#[test]
fn test_reconsolidating_output_is_stable() {
    let items = consolidate(&weekly_menu(), 1.0);
    let again: Vec<RawIngredient> = items
        .iter()
        .map(|item| raw(&item.name, item.quantity, item.unit.as_deref(), 1))
        .collect();

    let regrouped = consolidate(&again, 1.0);

    assert_eq!(regrouped.len(), items.len());
    for (before, after) in items.iter().zip(&regrouped) {
        assert_eq!(before.name, after.name);
        assert_eq!(before.quantity, after.quantity);
        assert_eq!(before.unit, after.unit);
    }
}

#[test]
fn test_split_consolidation_sums_to_the_same_totals() {
    let consolidator = Consolidator::default();
    let lines = weekly_menu();
    let (first, second) = lines.split_at(4);

    let together = base_totals(&consolidator, &[consolidator.consolidate(&lines, 1.0)]);
    let apart = base_totals(
        &consolidator,
        &[
            consolidator.consolidate(first, 1.0),
            consolidator.consolidate(second, 1.0),
        ],
    );

    assert_eq!(together.len(), 5);
    assert_eq!(apart.len(), together.len());
    for (key, total) in &together {
        let split_total = apart[key];
        assert!(
            (split_total - total).abs() < 1e-6,
            "{key:?}: {split_total} apart vs {total} together"
        );
    }
}

#[test]
fn test_multiplier_scales_linearly() {
    let lines = vec![
        raw("butter", 100.0, Some("g"), 1),
        raw("butter", 50.0, Some("g"), 2),
        raw("stock", 200.0, Some("ml"), 2),
    ];

    let single = consolidate(&lines, 1.0);
    let double = consolidate(&lines, 2.0);

    assert_eq!(single[0].quantity, 150.0);
    assert_eq!(double[0].quantity, 300.0);
    assert_eq!(single[1].quantity, 200.0);
    assert_eq!(double[1].quantity, 400.0);
}

#[test]
fn test_families_never_merge() {
    let items = consolidate(
        &[
            raw("sugar", 100.0, Some("g"), 1),
            raw("sugar", 1.0, Some("cup"), 2),
            raw("sugar", 2.0, None, 3),
            raw("sugar", 1.0, Some("pinch"), 4),
        ],
        1.0,
    );

    assert_eq!(items.len(), 4);
    for (item, recipe_id) in items.iter().zip(1..) {
        assert_eq!(item.source_recipe_ids, vec![recipe_id]);
    }
}

#[test]
fn test_every_recipe_is_credited() {
    let consolidator = Consolidator::default();
    let lines = weekly_menu();
    let items = consolidator.consolidate(&lines, 1.0);

    for item in &items {
        let key = item_key(&consolidator, item);
        let mut expected: Vec<i64> = Vec::new();
        for line in &lines {
            if consolidator.matching_key(line) == key && !expected.contains(&line.recipe_id) {
                expected.push(line.recipe_id);
            }
        }
        assert_eq!(item.source_recipe_ids, expected, "provenance of {}", item.name);
    }
}

#[test]
fn test_descriptive_names_merge() {
    let items = consolidate(
        &[
            raw("chopped onions", 1.0, None, 1),
            raw("Onion", 1.0, None, 2),
            raw("butter (softened)", 20.0, Some("g"), 1),
            raw("butter, cubed", 30.0, Some("grams"), 2),
        ],
        1.0,
    );

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].quantity, 2.0);
    assert_eq!(items[1].quantity, 50.0);
    assert_eq!(items[1].unit.as_deref(), Some("g"));
}

#[test]
fn test_customary_units_scale_up() {
    let items = consolidate(
        &[
            raw("salt", 1.0, Some("tsp"), 1),
            raw("salt", 2.0, Some("tsp"), 2),
            raw("cheese", 1.0, Some("lb"), 1),
            raw("cheese", 8.0, Some("oz"), 2),
        ],
        1.0,
    );

    assert_eq!(items[0].quantity, 1.0);
    assert_eq!(items[0].unit.as_deref(), Some("tbsp"));
    assert_eq!(items[1].quantity, 1.5);
    assert_eq!(items[1].unit.as_deref(), Some("lb"));
}

#[test]
fn test_small_amounts_stay_visible() {
    let items = consolidate(
        &[
            raw("saffron", 40.0, Some("mg"), 1),
            raw("vanilla extract", 0.125, Some("tsp"), 1),
            raw("cayenne", 0.02, Some("g"), 2),
        ],
        1.0,
    );

    assert_eq!(items[0].quantity, 40.0);
    assert_eq!(items[0].unit.as_deref(), Some("mg"));
    assert_eq!(items[1].quantity, 0.125);
    assert_eq!(items[1].unit.as_deref(), Some("tsp"));
    assert_eq!(items[2].quantity, 20.0);
    assert_eq!(items[2].unit.as_deref(), Some("mg"));
}

#[test]
fn test_french_che_plurals_merge() {
    let items = consolidate(
        &[
            raw("pêche", 1.0, None, 1),
            raw("pêches", 2.0, None, 2),
            raw("quiches", 2.0, None, 1),
            raw("quiche", 1.0, None, 2),
            raw("brioche", 1.0, None, 1),
            raw("brioches", 1.0, None, 2),
            raw("pois chiches", 200.0, Some("g"), 1),
            raw("pois chiche", 100.0, Some("g"), 2),
        ],
        1.0,
    );

    assert_eq!(items.len(), 4);
    for item in &items {
        assert_eq!(item.source_recipe_ids, vec![1, 2]);
    }
    assert_eq!(items[0].quantity, 3.0);
    assert_eq!(items[3].quantity, 300.0);
}

#[test]
fn test_custom_folding_table() {
    let table = FoldingTable::from_json_str(
        r#"{ "version": 9, "irregular": { "tomatoes": "tomato" } }"#,
    )
    .unwrap();
    let consolidator = Consolidator::new(table);

    let items = consolidator.consolidate(
        &[
            raw("tomatoes", 1.0, None, 1),
            raw("tomato", 1.0, None, 2),
            raw("carrots", 1.0, None, 1),
            raw("carrot", 1.0, None, 2),
        ],
        1.0,
    );

    // Without suffix rules only the irregular entry folds
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].quantity, 2.0);
}

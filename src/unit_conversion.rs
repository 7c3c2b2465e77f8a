//! # Unit Catalogue
//!
//! Recognizes unit spellings (English and French), sorts units into
//! families, converts quantities to each family's base unit, and picks the
//! display unit and rounding used on a shopping list.
//!
//! ## Conversion factors
//!
//! Volume is stored in millilitres using kitchen measures: tsp 5, tbsp 15,
//! fl oz 30, cup 240, pint 480, quart 960, gallon 3840. Mass is stored in
//! grams: oz 28.35, lb 453.6. A dozen is 12 pieces.
//!
//! ## Display units and rounding
//!
//! | family / system     | display unit                          | rounding          |
//! |---------------------|---------------------------------------|-------------------|
//! | volume, metric      | `l` from 1000 ml, else `ml`            | 2 / 1 decimals    |
//! | volume, customary   | `cup` from 60 ml, `tbsp` from 15 ml, else `tsp` | 2 / 2 / 3 decimals |
//! | mass, metric        | `kg` from 1000 g, `g` from 1 g, else `mg` | 2 / 1 / 1 decimals |
//! | mass, customary     | `lb` from 453.6 g, else `oz`           | 2 / 1 decimals    |
//! | piece               | `piece`                                | whole, rounded up |
//! | count (no unit)     | none                                   | whole, rounded up |
//! | named / unknown     | the unit itself                        | 2 decimals        |
//!
//! A nonzero total that would round to 0 at these decimals is kept to two
//! significant figures instead, so a pinch of saffron never shows as `0 g`.

use crate::ingredient_model::{MeasurementSystem, Unit, UnitFamily};
use log::trace;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const ML_PER_TEASPOON: f64 = 5.0;
pub const ML_PER_TABLESPOON: f64 = 15.0;
pub const ML_PER_FLUID_OUNCE: f64 = 30.0;
pub const ML_PER_CUP: f64 = 240.0;
pub const ML_PER_PINT: f64 = 480.0;
pub const ML_PER_QUART: f64 = 960.0;
pub const ML_PER_GALLON: f64 = 3840.0;
pub const ML_PER_LITER: f64 = 1000.0;
pub const GRAMS_PER_OUNCE: f64 = 28.35;
pub const GRAMS_PER_POUND: f64 = 453.6;
pub const GRAMS_PER_KILOGRAM: f64 = 1000.0;
pub const PIECES_PER_DOZEN: f64 = 12.0;

// Quantities this close below a whole number are treated as that number
const ROUNDING_EPSILON: f64 = 1e-9;

// Precision kept for totals too small for their unit's decimals
const SMALL_QUANTITY_SIGNIFICANT_DIGITS: i32 = 2;

/// Common unit spellings and their canonical unit
static UNIT_MAPPINGS: LazyLock<HashMap<&'static str, Unit>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Volume units
    map.insert("tsp", Unit::Teaspoons);
    map.insert("tsps", Unit::Teaspoons);
    map.insert("teaspoon", Unit::Teaspoons);
    map.insert("teaspoons", Unit::Teaspoons);
    map.insert("tbsp", Unit::Tablespoons);
    map.insert("tbsps", Unit::Tablespoons);
    map.insert("tbs", Unit::Tablespoons);
    map.insert("tablespoon", Unit::Tablespoons);
    map.insert("tablespoons", Unit::Tablespoons);
    map.insert("cup", Unit::Cups);
    map.insert("cups", Unit::Cups);
    map.insert("c", Unit::Cups);
    map.insert("fl oz", Unit::FluidOunces);
    map.insert("floz", Unit::FluidOunces);
    map.insert("fluid ounce", Unit::FluidOunces);
    map.insert("fluid ounces", Unit::FluidOunces);
    map.insert("pint", Unit::Pints);
    map.insert("pints", Unit::Pints);
    map.insert("pt", Unit::Pints);
    map.insert("quart", Unit::Quarts);
    map.insert("quarts", Unit::Quarts);
    map.insert("qt", Unit::Quarts);
    map.insert("gallon", Unit::Gallons);
    map.insert("gallons", Unit::Gallons);
    map.insert("gal", Unit::Gallons);
    map.insert("ml", Unit::Milliliters);
    map.insert("milliliter", Unit::Milliliters);
    map.insert("milliliters", Unit::Milliliters);
    map.insert("millilitre", Unit::Milliliters);
    map.insert("millilitres", Unit::Milliliters);
    map.insert("cl", Unit::Centiliters);
    map.insert("centiliter", Unit::Centiliters);
    map.insert("centiliters", Unit::Centiliters);
    map.insert("centilitre", Unit::Centiliters);
    map.insert("centilitres", Unit::Centiliters);
    map.insert("dl", Unit::Deciliters);
    map.insert("deciliter", Unit::Deciliters);
    map.insert("deciliters", Unit::Deciliters);
    map.insert("décilitre", Unit::Deciliters);
    map.insert("décilitres", Unit::Deciliters);
    map.insert("l", Unit::Liters);
    map.insert("liter", Unit::Liters);
    map.insert("liters", Unit::Liters);
    map.insert("litre", Unit::Liters);
    map.insert("litres", Unit::Liters);

    // Weight units
    map.insert("mg", Unit::Milligrams);
    map.insert("milligram", Unit::Milligrams);
    map.insert("milligrams", Unit::Milligrams);
    map.insert("g", Unit::Grams);
    map.insert("gr", Unit::Grams);
    map.insert("gram", Unit::Grams);
    map.insert("grams", Unit::Grams);
    map.insert("kg", Unit::Kilograms);
    map.insert("kilo", Unit::Kilograms);
    map.insert("kilos", Unit::Kilograms);
    map.insert("kilogram", Unit::Kilograms);
    map.insert("kilograms", Unit::Kilograms);
    map.insert("oz", Unit::Ounces);
    map.insert("ounce", Unit::Ounces);
    map.insert("ounces", Unit::Ounces);
    map.insert("lb", Unit::Pounds);
    map.insert("lbs", Unit::Pounds);
    map.insert("pound", Unit::Pounds);
    map.insert("pounds", Unit::Pounds);

    // Count units
    map.insert("piece", Unit::Pieces);
    map.insert("pieces", Unit::Pieces);
    map.insert("pc", Unit::Pieces);
    map.insert("pcs", Unit::Pieces);
    map.insert("item", Unit::Pieces);
    map.insert("items", Unit::Pieces);
    map.insert("dozen", Unit::Dozen);
    map.insert("doz", Unit::Dozen);

    // Specialized units
    map.insert("pinch", Unit::Pinches);
    map.insert("pinches", Unit::Pinches);
    map.insert("dash", Unit::Dashes);
    map.insert("dashes", Unit::Dashes);
    map.insert("clove", Unit::Cloves);
    map.insert("cloves", Unit::Cloves);
    map.insert("can", Unit::Cans);
    map.insert("cans", Unit::Cans);
    map.insert("tin", Unit::Cans);
    map.insert("tins", Unit::Cans);
    map.insert("bottle", Unit::Bottles);
    map.insert("bottles", Unit::Bottles);
    map.insert("package", Unit::Packages);
    map.insert("packages", Unit::Packages);
    map.insert("pkg", Unit::Packages);
    map.insert("packet", Unit::Packages);
    map.insert("packets", Unit::Packages);
    map.insert("slice", Unit::Slices);
    map.insert("slices", Unit::Slices);
    map.insert("bunch", Unit::Bunches);
    map.insert("bunches", Unit::Bunches);
    map.insert("sprig", Unit::Sprigs);
    map.insert("sprigs", Unit::Sprigs);
    map.insert("stick", Unit::Sticks);
    map.insert("sticks", Unit::Sticks);

    // French units
    map.insert("cuillère à café", Unit::Teaspoons);
    map.insert("cuillères à café", Unit::Teaspoons);
    map.insert("càc", Unit::Teaspoons);
    map.insert("cac", Unit::Teaspoons);
    map.insert("cuillère à soupe", Unit::Tablespoons);
    map.insert("cuillères à soupe", Unit::Tablespoons);
    map.insert("càs", Unit::Tablespoons);
    map.insert("cas", Unit::Tablespoons);
    map.insert("tasse", Unit::Cups);
    map.insert("tasses", Unit::Cups);
    map.insert("gramme", Unit::Grams);
    map.insert("grammes", Unit::Grams);
    map.insert("kilogramme", Unit::Kilograms);
    map.insert("kilogrammes", Unit::Kilograms);
    map.insert("pièce", Unit::Pieces);
    map.insert("pièces", Unit::Pieces);
    map.insert("douzaine", Unit::Dozen);
    map.insert("douzaines", Unit::Dozen);
    map.insert("pincée", Unit::Pinches);
    map.insert("pincées", Unit::Pinches);
    map.insert("gousse", Unit::Cloves);
    map.insert("gousses", Unit::Cloves);
    map.insert("boîte", Unit::Cans);
    map.insert("boîtes", Unit::Cans);
    map.insert("bouteille", Unit::Bottles);
    map.insert("bouteilles", Unit::Bottles);
    map.insert("paquet", Unit::Packages);
    map.insert("paquets", Unit::Packages);
    map.insert("sachet", Unit::Packages);
    map.insert("sachets", Unit::Packages);
    map.insert("tranche", Unit::Slices);
    map.insert("tranches", Unit::Slices);
    map.insert("bouquet", Unit::Bunches);
    map.insert("bouquets", Unit::Bunches);
    map.insert("brin", Unit::Sprigs);
    map.insert("brins", Unit::Sprigs);
    map.insert("bâton", Unit::Sticks);
    map.insert("bâtons", Unit::Sticks);

    map
});

/// Parse a unit string into a canonical unit
///
/// Matching ignores case, surrounding whitespace and abbreviation periods
/// ("Tbsp." is a tablespoon, "fl. oz." a fluid ounce). A missing or blank
/// unit returns `None`, which marks a counted ingredient. Anything
/// unrecognized comes back as `Unit::Unknown` holding the trimmed original
/// spelling.
///
/// # Examples
///
/// ```rust
/// use grocery::ingredient_model::Unit;
/// use grocery::unit_conversion::parse_unit;
///
/// assert_eq!(parse_unit(Some("Tbsp.")), Some(Unit::Tablespoons));
/// assert_eq!(parse_unit(Some("cuillères à soupe")), Some(Unit::Tablespoons));
/// assert_eq!(parse_unit(Some("  ")), None);
/// assert_eq!(parse_unit(Some("handful")), Some(Unit::Unknown("handful".to_string())));
/// ```
pub fn parse_unit(unit: Option<&str>) -> Option<Unit> {
    let trimmed = unit?.trim();
    if trimmed.is_empty() {
        return None;
    }

    let key = trimmed
        .replace('.', " ")
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_lowercase();

    match UNIT_MAPPINGS.get(key.as_str()) {
        Some(unit) => Some(unit.clone()),
        None => {
            trace!("Unrecognized unit '{}', keeping it as its own family", trimmed);
            Some(Unit::Unknown(trimmed.to_string()))
        }
    }
}

/// Family of an optional unit; a missing unit is the count family
pub fn family_of(unit: Option<&Unit>) -> UnitFamily {
    match unit {
        Some(unit) => unit.family(),
        None => UnitFamily::Count,
    }
}

impl Unit {
    /// Family this unit converts within
    pub fn family(&self) -> UnitFamily {
        if self.is_volume() {
            UnitFamily::Volume
        } else if self.is_weight() {
            UnitFamily::Mass
        } else if self.is_piece() {
            UnitFamily::Piece
        } else if let Unit::Unknown(original) = self {
            UnitFamily::Unrecognized(original.to_lowercase())
        } else {
            UnitFamily::Named(self.symbol().to_string())
        }
    }

    /// Measuring system this unit belongs to
    pub fn system(&self) -> MeasurementSystem {
        match self {
            Unit::Milliliters
            | Unit::Centiliters
            | Unit::Deciliters
            | Unit::Liters
            | Unit::Milligrams
            | Unit::Grams
            | Unit::Kilograms => MeasurementSystem::Metric,
            Unit::Teaspoons
            | Unit::Tablespoons
            | Unit::FluidOunces
            | Unit::Cups
            | Unit::Pints
            | Unit::Quarts
            | Unit::Gallons
            | Unit::Ounces
            | Unit::Pounds => MeasurementSystem::Customary,
            _ => MeasurementSystem::Neutral,
        }
    }

    /// How many base units (ml, g, pieces) one of this unit holds
    ///
    /// Units without conversions are their own base, so the factor is 1.
    pub fn base_factor(&self) -> f64 {
        match self {
            Unit::Teaspoons => ML_PER_TEASPOON,
            Unit::Tablespoons => ML_PER_TABLESPOON,
            Unit::FluidOunces => ML_PER_FLUID_OUNCE,
            Unit::Cups => ML_PER_CUP,
            Unit::Pints => ML_PER_PINT,
            Unit::Quarts => ML_PER_QUART,
            Unit::Gallons => ML_PER_GALLON,
            Unit::Milliliters => 1.0,
            Unit::Centiliters => 10.0,
            Unit::Deciliters => 100.0,
            Unit::Liters => ML_PER_LITER,
            Unit::Milligrams => 0.001,
            Unit::Grams => 1.0,
            Unit::Kilograms => GRAMS_PER_KILOGRAM,
            Unit::Ounces => GRAMS_PER_OUNCE,
            Unit::Pounds => GRAMS_PER_POUND,
            Unit::Dozen => PIECES_PER_DOZEN,
            _ => 1.0,
        }
    }
}

/// How a displayed quantity is rounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Whole units, rounded up (you cannot buy half an egg)
    WholeUp,
    /// Half away from zero at this many decimal places
    Decimals(u32),
}

/// The unit a consolidated quantity is shown in
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayUnit {
    /// Unit to show; `None` for counted items
    pub unit: Option<Unit>,
    /// Base units per display unit
    pub base_per_unit: f64,
    /// Rounding applied after converting to the display unit
    pub rounding: Rounding,
}

impl DisplayUnit {
    fn new(unit: Option<Unit>, rounding: Rounding) -> Self {
        let base_per_unit = unit.as_ref().map_or(1.0, Unit::base_factor);
        Self {
            unit,
            base_per_unit,
            rounding,
        }
    }

    /// Convert a base-unit quantity into this unit and round it
    ///
    /// Never turns a nonzero quantity into 0.
    pub fn present(&self, base_quantity: f64) -> f64 {
        let quantity = base_quantity / self.base_per_unit;
        let rounded = round_quantity(quantity, self.rounding);
        if rounded == 0.0 && quantity != 0.0 && self.rounding != Rounding::WholeUp {
            round_significant(quantity, SMALL_QUANTITY_SIGNIFICANT_DIGITS)
        } else {
            rounded
        }
    }
}

/// Choose the display unit for a group
///
/// `first_unit` is the unit of the group's first contributing ingredient.
/// It fixes the family and, for volume and mass, the measuring system whose
/// scale of units is used. `base_quantity` is the group total in base units.
pub fn choose_display_unit(first_unit: Option<&Unit>, base_quantity: f64) -> DisplayUnit {
    let Some(unit) = first_unit else {
        return DisplayUnit::new(None, Rounding::WholeUp);
    };

    let magnitude = base_quantity.abs();
    let metric = unit.system() == MeasurementSystem::Metric;

    let chosen = match unit.family() {
        UnitFamily::Volume if metric => {
            if magnitude >= ML_PER_LITER {
                DisplayUnit::new(Some(Unit::Liters), Rounding::Decimals(2))
            } else {
                DisplayUnit::new(Some(Unit::Milliliters), Rounding::Decimals(1))
            }
        }
        UnitFamily::Volume => {
            if magnitude >= ML_PER_CUP / 4.0 {
                DisplayUnit::new(Some(Unit::Cups), Rounding::Decimals(2))
            } else if magnitude >= ML_PER_TABLESPOON {
                DisplayUnit::new(Some(Unit::Tablespoons), Rounding::Decimals(2))
            } else {
                DisplayUnit::new(Some(Unit::Teaspoons), Rounding::Decimals(3))
            }
        }
        UnitFamily::Mass if metric => {
            if magnitude >= GRAMS_PER_KILOGRAM {
                DisplayUnit::new(Some(Unit::Kilograms), Rounding::Decimals(2))
            } else if magnitude >= 1.0 || magnitude == 0.0 {
                DisplayUnit::new(Some(Unit::Grams), Rounding::Decimals(1))
            } else {
                DisplayUnit::new(Some(Unit::Milligrams), Rounding::Decimals(1))
            }
        }
        UnitFamily::Mass => {
            if magnitude >= GRAMS_PER_POUND {
                DisplayUnit::new(Some(Unit::Pounds), Rounding::Decimals(2))
            } else {
                DisplayUnit::new(Some(Unit::Ounces), Rounding::Decimals(1))
            }
        }
        UnitFamily::Piece => DisplayUnit::new(Some(Unit::Pieces), Rounding::WholeUp),
        UnitFamily::Count => DisplayUnit::new(None, Rounding::WholeUp),
        UnitFamily::Named(_) | UnitFamily::Unrecognized(_) => {
            DisplayUnit::new(Some(unit.clone()), Rounding::Decimals(2))
        }
    };

    trace!(
        "Display unit for {} base units starting from '{}': {:?}",
        base_quantity,
        unit,
        chosen.unit
    );
    chosen
}

/// Round a quantity according to `rounding`
pub fn round_quantity(quantity: f64, rounding: Rounding) -> f64 {
    let rounded = match rounding {
        Rounding::WholeUp => (quantity - ROUNDING_EPSILON).ceil(),
        Rounding::Decimals(places) => {
            let scale = 10f64.powi(places as i32);
            (quantity * scale).round() / scale
        }
    };

    // Keep -0.0 out of the output
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Round to `digits` significant figures
pub fn round_significant(quantity: f64, digits: i32) -> f64 {
    if quantity == 0.0 || !quantity.is_finite() {
        return quantity;
    }
    let magnitude = quantity.abs().log10().floor() as i32;
    let scale = 10f64.powi(digits - 1 - magnitude);
    (quantity * scale).round() / scale
}

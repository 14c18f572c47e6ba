use std::collections::HashMap;

use serde::Serialize;

use crate::convert::{ConversionRules, round_to};
use crate::error::RecipeError;
use crate::models::{IngredientInfo, IngredientRecord};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationReport {
    pub basis_flour: f64,
    pub water: f64,
    /// `water / basis_flour`, rounded to 3 decimals.
    pub hydration: f64,
    /// Non-flour basis ingredients missing from the hydration table.
    pub unknown: Vec<String>,
}

/// Dough hydration of the basis groups, using the ingredient hydration table.
///
/// Each basis-group ingredient found in `table` (case-insensitive name match)
/// contributes `weight * hydration` grams of water.
pub fn dough_hydration(
    ingredients: &[IngredientRecord],
    table: &[IngredientInfo],
    rules: &ConversionRules,
) -> Result<HydrationReport, RecipeError> {
    let basis_flour = rules.basis_flour(ingredients);
    if basis_flour <= 0.0 {
        return Err(RecipeError::NoBasisFlour);
    }

    let lookup: HashMap<String, f64> = table
        .iter()
        .map(|info| (info.name.trim().to_lowercase(), info.hydration))
        .collect();

    let mut water = 0.0;
    let mut unknown = Vec::new();
    for ing in ingredients.iter().filter(|i| rules.is_basis(&i.group)) {
        match lookup.get(&ing.name.trim().to_lowercase()) {
            Some(h) => water += ing.weight_or_zero() * h,
            None if !rules.is_flour(&ing.name) => unknown.push(ing.name.clone()),
            None => {}
        }
    }

    Ok(HydrationReport {
        basis_flour,
        water: round_to(water, 1),
        hydration: round_to(water / basis_flour, 3),
        unknown,
    })
}

use serde::{Deserialize, Serialize};

use crate::error::RecipeError;
use crate::percent::PercentInput;

/// Stored token for a switched-on convection/steam flag.
pub const YES_MARKER: &str = "是";
pub const NO_MARKER: &str = "否";

/// One ingredient line of a recipe, as stored and as presented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRecord {
    #[serde(default)]
    pub group: String,
    pub name: String,
    #[serde(default)]
    pub weight: Option<f64>,
    /// Baker's percentage as a fraction (0.65 == 65 %).
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default, rename = "desc")]
    pub description: Option<String>,
}

impl IngredientRecord {
    #[must_use]
    pub fn weight_or_zero(&self) -> f64 {
        self.weight.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BakingInfo {
    #[serde(default)]
    pub top_heat: Option<i64>,
    #[serde(default)]
    pub bottom_heat: Option<i64>,
    /// Bake time in minutes.
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub convection: bool,
    #[serde(default)]
    pub steam: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub title: String,
    pub steps: Option<String>,
    pub timestamp: Option<String>,
    pub baking_info: BakingInfo,
    pub ingredients: Vec<IngredientRecord>,
}

/// A persisted ingredient row together with the per-recipe columns it was saved with.
#[derive(Debug, Clone)]
pub struct StoredRow {
    pub id: i64,
    pub title: String,
    pub ingredient: IngredientRecord,
    pub steps: Option<String>,
    pub timestamp: Option<String>,
    pub upper_temp: Option<i64>,
    pub lower_temp: Option<i64>,
    pub bake_time: Option<i64>,
    pub convection: Option<String>,
    pub steam: Option<String>,
}

/// Ingredient as submitted for saving. `percent` is still in its raw form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewIngredient {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub percent: Option<PercentInput>,
    #[serde(default)]
    pub desc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<NewIngredient>,
    #[serde(default)]
    pub steps: Option<String>,
    #[serde(default)]
    pub baking_info: BakingInfo,
    #[serde(default)]
    pub is_update: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub title: String,
    pub updated: bool,
    pub rows: usize,
}

impl SaveOutcome {
    #[must_use]
    pub fn message(&self) -> String {
        let verb = if self.updated { "updated" } else { "created" };
        format!("Recipe '{}' {verb}", self.title)
    }
}

/// Entry of the ingredient hydration table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientInfo {
    pub name: String,
    /// Water content as a fraction of the ingredient's weight.
    pub hydration: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_field_names)]
pub struct RecipeStats {
    pub recipe_count: i64,
    pub ingredient_rows: i64,
    pub distinct_ingredients: i64,
    pub known_ingredients: i64,
}

#[must_use]
pub fn marker(flag: bool) -> &'static str {
    if flag { YES_MARKER } else { NO_MARKER }
}

#[must_use]
pub fn is_yes(token: Option<&str>) -> bool {
    token == Some(YES_MARKER)
}

pub fn validate_title(title: &str) -> Result<String, RecipeError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(RecipeError::InvalidInput(
            "Recipe title must not be empty".to_string(),
        ));
    }
    Ok(title.to_string())
}

/// Validate a save request: title and a non-empty ingredient list are required,
/// and the ingredients must pass [`validate_ingredients`].
pub fn validate_new_recipe(recipe: &NewRecipe) -> Result<String, RecipeError> {
    let title = validate_title(&recipe.title)?;
    if recipe.ingredients.is_empty() {
        return Err(RecipeError::InvalidInput(format!(
            "Recipe '{title}' has no ingredients"
        )));
    }
    validate_ingredients(&recipe.ingredients)?;
    Ok(title)
}

/// Every ingredient needs a name; weights, when given, must be finite and non-negative.
pub fn validate_ingredients(ingredients: &[NewIngredient]) -> Result<(), RecipeError> {
    for (idx, ing) in ingredients.iter().enumerate() {
        if ing.name.trim().is_empty() {
            return Err(RecipeError::InvalidInput(format!(
                "Ingredient #{} has no name",
                idx + 1
            )));
        }
        if ing.weight.is_some_and(|w| !w.is_finite() || w < 0.0) {
            return Err(RecipeError::InvalidInput(format!(
                "Weight of '{}' must be a non-negative number",
                ing.name
            )));
        }
    }
    Ok(())
}

pub fn validate_hydration(hydration: f64) -> Result<(), RecipeError> {
    if !hydration.is_finite() || hydration < 0.0 {
        return Err(RecipeError::InvalidInput(
            "hydration must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

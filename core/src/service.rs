use std::path::Path;

use chrono::Local;

use crate::convert::{self, ConversionResult, ConversionRules};
use crate::db::{Database, RecipeHeader};
use crate::error::RecipeError;
use crate::hydration::{self, HydrationReport};
use crate::models::{
    IngredientInfo, IngredientRecord, NewIngredient, NewRecipe, Recipe, RecipeStats, SaveOutcome,
    validate_hydration, validate_ingredients, validate_new_recipe, validate_title,
};
use crate::percent::normalize_percent;
use crate::shape::{shape_recipe, shape_recipes};

/// Entry point shared by the CLI and the HTTP server.
pub struct RecipeService {
    db: Database,
}

impl RecipeService {
    pub fn new(db_path: &Path) -> Result<Self, RecipeError> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self, RecipeError> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    // --- Reading ---

    pub fn list_recipes(&self) -> Result<Vec<Recipe>, RecipeError> {
        let rows = self.db.all_recipe_rows()?;
        Ok(shape_recipes(&rows))
    }

    pub fn list_titles(&self) -> Result<Vec<String>, RecipeError> {
        Ok(self.db.list_titles()?)
    }

    pub fn get_recipe(&self, title: &str) -> Result<Recipe, RecipeError> {
        let title = validate_title(title)?;
        let rows = self.db.get_recipe_rows(&title)?;
        shape_recipe(&rows).ok_or_else(|| RecipeError::NotFound(format!("recipe '{title}'")))
    }

    // --- Writing ---

    /// Validate, normalize and persist a recipe.
    ///
    /// With `is_update` the stored rows for the title are replaced as a whole
    /// (a missing title is simply created). Without it, an existing title is
    /// rejected rather than appended to.
    pub fn save_recipe(&mut self, recipe: &NewRecipe) -> Result<SaveOutcome, RecipeError> {
        let title = validate_new_recipe(recipe)?;
        if !recipe.is_update && self.db.recipe_exists(&title)? {
            return Err(RecipeError::InvalidInput(format!(
                "Recipe '{title}' already exists; save it as an update instead"
            )));
        }

        let records: Vec<IngredientRecord> = recipe.ingredients.iter().map(to_record).collect();
        let timestamp = Local::now().to_rfc3339();
        let steps = recipe
            .steps
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let header = RecipeHeader {
            title: &title,
            steps,
            timestamp: &timestamp,
            baking: &recipe.baking_info,
        };

        let rows = if recipe.is_update {
            self.db.replace_recipe(&header, &records)?
        } else {
            self.db.insert_recipe(&header, &records)?
        };

        tracing::info!(title = %title, rows, updated = recipe.is_update, "recipe saved");
        Ok(SaveOutcome {
            title,
            updated: recipe.is_update,
            rows,
        })
    }

    pub fn delete_recipe(&self, title: &str) -> Result<(), RecipeError> {
        let title = validate_title(title)?;
        if !self.db.delete_recipe(&title)? {
            return Err(RecipeError::NotFound(format!("recipe '{title}'")));
        }
        tracing::info!(title = %title, "recipe deleted");
        Ok(())
    }

    // --- Scaling ---

    pub fn convert_recipe(
        &self,
        title: &str,
        target_flour: f64,
        include_outside_basis: bool,
        rules: &ConversionRules,
    ) -> Result<ConversionResult, RecipeError> {
        let recipe = self.get_recipe(title)?;
        tracing::debug!(title = %recipe.title, target_flour, include_outside_basis, "converting recipe");
        convert::convert(&recipe.ingredients, target_flour, include_outside_basis, rules)
    }

    /// Scale an ad-hoc ingredient list that was never saved.
    pub fn convert_ingredients(
        &self,
        ingredients: &[NewIngredient],
        target_flour: f64,
        include_outside_basis: bool,
        rules: &ConversionRules,
    ) -> Result<ConversionResult, RecipeError> {
        if ingredients.is_empty() {
            return Err(RecipeError::InvalidInput(
                "No ingredients to convert".to_string(),
            ));
        }
        validate_ingredients(ingredients)?;
        let records: Vec<IngredientRecord> = ingredients.iter().map(to_record).collect();
        convert::convert(&records, target_flour, include_outside_basis, rules)
    }

    pub fn recipe_hydration(
        &self,
        title: &str,
        rules: &ConversionRules,
    ) -> Result<HydrationReport, RecipeError> {
        let recipe = self.get_recipe(title)?;
        let table = self.db.list_ingredient_infos()?;
        let report = hydration::dough_hydration(&recipe.ingredients, &table, rules)?;
        if !report.unknown.is_empty() {
            tracing::debug!(title = %recipe.title, unknown = ?report.unknown, "ingredients missing from hydration table");
        }
        Ok(report)
    }

    // --- Ingredient hydration table ---

    pub fn list_ingredient_infos(&self) -> Result<Vec<IngredientInfo>, RecipeError> {
        Ok(self.db.list_ingredient_infos()?)
    }

    pub fn set_ingredient_hydration(
        &self,
        name: &str,
        hydration: f64,
    ) -> Result<IngredientInfo, RecipeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RecipeError::InvalidInput(
                "Ingredient name must not be empty".to_string(),
            ));
        }
        validate_hydration(hydration)?;
        let info = self.db.upsert_ingredient_info(name, hydration)?;
        tracing::info!(name = %info.name, hydration, "ingredient hydration set");
        Ok(info)
    }

    pub fn remove_ingredient_info(&self, name: &str) -> Result<(), RecipeError> {
        let name = name.trim();
        if !self.db.delete_ingredient_info(name)? {
            return Err(RecipeError::NotFound(format!("ingredient '{name}'")));
        }
        Ok(())
    }

    pub fn stats(&self) -> Result<RecipeStats, RecipeError> {
        Ok(self.db.count_stats()?)
    }
}

fn to_record(ing: &NewIngredient) -> IngredientRecord {
    IngredientRecord {
        group: ing.group.trim().to_string(),
        name: ing.name.trim().to_string(),
        weight: ing.weight,
        percent: normalize_percent(ing.percent.as_ref()),
        description: ing
            .desc
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
    }
}

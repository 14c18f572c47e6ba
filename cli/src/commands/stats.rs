use anyhow::Result;

use crumb_core::service::RecipeService;

pub(crate) fn cmd_stats(service: &RecipeService, json: bool) -> Result<()> {
    let stats = service.stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Recipes:              {}", stats.recipe_count);
    println!("Ingredient rows:      {}", stats.ingredient_rows);
    println!("Distinct ingredients: {}", stats.distinct_ingredients);
    println!("Hydration table:      {}", stats.known_ingredients);
    Ok(())
}

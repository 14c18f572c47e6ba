use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use crumb_core::models::{BakingInfo, IngredientRecord, NewRecipe, Recipe};
use crumb_core::service::RecipeService;

use super::helpers::{parse_ingredient_spec, print_ingredient_table, truncate};

pub(crate) fn cmd_list(service: &RecipeService, json: bool) -> Result<()> {
    let recipes = service.list_recipes()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
        return Ok(());
    }

    if recipes.is_empty() {
        println!("No recipes yet. Add one with: crumb add <title> -i \"group|name|weight\"");
        return Ok(());
    }

    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Ingredients")]
        ingredients: usize,
        #[tabled(rename = "Total (g)")]
        total: String,
        #[tabled(rename = "Saved")]
        saved: String,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            title: truncate(&r.title, 35),
            ingredients: r.ingredients.len(),
            total: format!(
                "{:.0}",
                r.ingredients
                    .iter()
                    .map(IngredientRecord::weight_or_zero)
                    .sum::<f64>()
            ),
            saved: r
                .timestamp
                .as_deref()
                .map(|t| t.chars().take(16).collect())
                .unwrap_or_default(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_titles(service: &RecipeService, json: bool) -> Result<()> {
    let titles = service.list_titles()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&titles)?);
    } else {
        for title in &titles {
            println!("{title}");
        }
    }
    Ok(())
}

pub(crate) fn cmd_show(service: &RecipeService, title: &str, json: bool) -> Result<()> {
    let recipe = service.get_recipe(title)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
        return Ok(());
    }

    print_recipe(&recipe);
    Ok(())
}

fn print_recipe(recipe: &Recipe) {
    let title = &recipe.title;
    println!("=== {title} ===");
    if let Some(ts) = &recipe.timestamp {
        println!("  Saved: {ts}");
    }
    println!("  {}\n", describe_baking(&recipe.baking_info));

    print_ingredient_table(&recipe.ingredients);

    if let Some(steps) = &recipe.steps {
        println!("\n  STEPS:");
        for line in steps.lines() {
            println!("    {line}");
        }
    }
}

fn describe_baking(info: &BakingInfo) -> String {
    let temp = |t: Option<i64>| t.map_or("-".to_string(), |v| format!("{v}°C"));
    let mut parts = vec![
        format!("Top: {}", temp(info.top_heat)),
        format!("Bottom: {}", temp(info.bottom_heat)),
        format!(
            "Time: {}",
            info.time.map_or("-".to_string(), |m| format!("{m} min"))
        ),
    ];
    if info.convection {
        parts.push("convection".to_string());
    }
    if info.steam {
        parts.push("steam".to_string());
    }
    parts.join("  |  ")
}

/// Options for `crumb add` that are not ingredient lines.
pub(crate) struct AddOptions {
    pub steps: Option<String>,
    pub baking_info: BakingInfo,
    pub update: bool,
}

pub(crate) fn cmd_add(
    service: &mut RecipeService,
    title: &str,
    ingredient_specs: &[String],
    options: AddOptions,
    json: bool,
) -> Result<()> {
    let ingredients = ingredient_specs
        .iter()
        .map(|s| parse_ingredient_spec(s))
        .collect::<Result<Vec<_>>>()?;

    let recipe = NewRecipe {
        title: title.to_string(),
        ingredients,
        steps: options.steps,
        baking_info: options.baking_info,
        is_update: options.update,
    };
    let outcome = service.save_recipe(&recipe)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "status": "success", "message": outcome.message() })
        );
    } else {
        let rows = outcome.rows;
        println!("{} ({rows} ingredients)", outcome.message());
    }
    Ok(())
}

pub(crate) fn cmd_delete(service: &RecipeService, title: &str, json: bool) -> Result<()> {
    service.delete_recipe(title)?;
    if json {
        println!("{}", serde_json::json!({ "deleted": title }));
    } else {
        println!("Deleted recipe '{title}'");
    }
    Ok(())
}

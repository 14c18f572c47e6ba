use anyhow::Result;

use crumb_core::convert::ConversionRules;
use crumb_core::service::RecipeService;

use super::helpers::print_ingredient_table;

pub(crate) fn cmd_convert(
    service: &RecipeService,
    title: &str,
    target_flour: f64,
    include_all: bool,
    rules: &ConversionRules,
    json: bool,
) -> Result<()> {
    let result = service.convert_recipe(title, target_flour, include_all, rules)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let original = result.original_flour;
    let target = result.target_flour;
    let ratio = result.ratio;
    println!("=== {title} ===");
    println!("  Basis flour: {original:.1}g -> {target:.1}g  (x{ratio})");
    if !include_all {
        println!("  Only basis groups scaled ({}).", rules.basis_groups.join(", "));
    }
    println!();
    print_ingredient_table(&result.ingredients);
    Ok(())
}

pub(crate) fn cmd_hydration(
    service: &RecipeService,
    title: &str,
    rules: &ConversionRules,
    json: bool,
) -> Result<()> {
    let report = service.recipe_hydration(title, rules)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let flour = report.basis_flour;
    let water = report.water;
    let pct = report.hydration * 100.0;
    println!("{title}: {pct:.1}% hydration ({water:.1}g water / {flour:.1}g flour)");
    if !report.unknown.is_empty() {
        println!(
            "  Not in ingredient table: {} (set with: crumb ingredient set <name> <hydration>)",
            report.unknown.join(", ")
        );
    }
    Ok(())
}

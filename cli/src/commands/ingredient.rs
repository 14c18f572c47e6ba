use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use crumb_core::service::RecipeService;

pub(crate) fn cmd_ingredient_list(service: &RecipeService, json: bool) -> Result<()> {
    let infos = service.list_ingredient_infos()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    if infos.is_empty() {
        println!("Ingredient table is empty. Add with: crumb ingredient set <name> <hydration>");
        return Ok(());
    }

    #[derive(Tabled)]
    struct InfoRow {
        #[tabled(rename = "Ingredient")]
        name: String,
        #[tabled(rename = "Hydration")]
        hydration: String,
    }

    let rows: Vec<InfoRow> = infos
        .iter()
        .map(|i| InfoRow {
            name: i.name.clone(),
            hydration: format!("{:.1}%", i.hydration * 100.0),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(1)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_ingredient_set(
    service: &RecipeService,
    name: &str,
    hydration: f64,
    json: bool,
) -> Result<()> {
    let info = service.set_ingredient_hydration(name, hydration)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        let pct = info.hydration * 100.0;
        println!("{}: {pct:.1}% water", info.name);
    }
    Ok(())
}

pub(crate) fn cmd_ingredient_remove(service: &RecipeService, name: &str, json: bool) -> Result<()> {
    service.remove_ingredient_info(name)?;
    if json {
        println!("{}", serde_json::json!({ "removed": name }));
    } else {
        println!("Removed '{name}' from the ingredient table");
    }
    Ok(())
}

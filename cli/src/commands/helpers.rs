use anyhow::{Context, Result, bail};
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use crumb_core::models::{IngredientRecord, NewIngredient};
use crumb_core::percent::PercentInput;

/// Parse an ingredient given on the command line as
/// `group|name|weight[|percent[|desc]]`. Weight may be left empty.
pub(crate) fn parse_ingredient_spec(spec: &str) -> Result<NewIngredient> {
    let parts: Vec<&str> = spec.split('|').map(str::trim).collect();
    if parts.len() < 3 || parts.len() > 5 {
        bail!("Invalid ingredient '{spec}'. Use 'group|name|weight[|percent[|desc]]'");
    }
    if parts[1].is_empty() {
        bail!("Ingredient '{spec}' has no name");
    }

    let weight = match parts[2] {
        "" => None,
        w => Some(
            w.trim_end_matches('g')
                .trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid weight '{w}' in '{spec}'"))?,
        ),
    };
    let percent = parts
        .get(3)
        .filter(|p| !p.is_empty())
        .map(|p| PercentInput::from(*p));
    let desc = parts
        .get(4)
        .filter(|d| !d.is_empty())
        .map(|d| (*d).to_string());

    Ok(NewIngredient {
        group: parts[0].to_string(),
        name: parts[1].to_string(),
        weight,
        percent,
        desc,
    })
}

pub(crate) fn fmt_weight(weight: Option<f64>) -> String {
    weight.map_or("-".into(), |w| format!("{w:.1}"))
}

pub(crate) fn fmt_percent(percent: Option<f64>) -> String {
    percent.map_or("-".into(), |p| format!("{:.1}%", p * 100.0))
}

pub(crate) fn print_ingredient_table(ingredients: &[IngredientRecord]) {
    #[derive(Tabled)]
    struct IngredientRow {
        #[tabled(rename = "Group")]
        group: String,
        #[tabled(rename = "Ingredient")]
        name: String,
        #[tabled(rename = "Weight (g)")]
        weight: String,
        #[tabled(rename = "%")]
        percent: String,
        #[tabled(rename = "Note")]
        note: String,
    }

    let rows: Vec<IngredientRow> = ingredients
        .iter()
        .map(|i| IngredientRow {
            group: i.group.clone(),
            name: truncate(&i.name, 30),
            weight: fmt_weight(i.weight),
            percent: fmt_percent(i.percent),
            note: i
                .description
                .as_deref()
                .map(|d| truncate(d, 30))
                .unwrap_or_default(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        status: &'static str,
        error: &'a str,
    }
    serde_json::to_string(&CliError {
        status: "error",
        error: message,
    })
    .unwrap_or_else(|_| format!("{{\"status\":\"error\",\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

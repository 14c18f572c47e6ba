use crate::models::{BakingInfo, Recipe, StoredRow, is_yes};

/// Fold stored rows into one `Recipe` per title.
///
/// Rows are ordered by `(title, id)` first, so recipes come out sorted by title
/// and each recipe keeps its ingredients in insertion order. Steps, timestamp and
/// baking parameters come from the first row of each title; later rows with
/// different values are not reconciled.
#[must_use]
pub fn shape_recipes(rows: &[StoredRow]) -> Vec<Recipe> {
    let mut ordered: Vec<&StoredRow> = rows.iter().collect();
    ordered.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

    ordered.into_iter().fold(Vec::new(), |mut recipes: Vec<Recipe>, row| {
        if let Some(current) = recipes.last_mut().filter(|r| r.title == row.title) {
            current.ingredients.push(row.ingredient.clone());
        } else {
            recipes.push(start_recipe(row));
        }
        recipes
    })
}

/// Shape rows that are all known to belong to one title.
#[must_use]
pub fn shape_recipe(rows: &[StoredRow]) -> Option<Recipe> {
    shape_recipes(rows).into_iter().next()
}

fn start_recipe(first: &StoredRow) -> Recipe {
    Recipe {
        title: first.title.clone(),
        steps: first.steps.clone(),
        timestamp: first.timestamp.clone(),
        baking_info: baking_info(first),
        ingredients: vec![first.ingredient.clone()],
    }
}

fn baking_info(row: &StoredRow) -> BakingInfo {
    BakingInfo {
        top_heat: row.upper_temp,
        bottom_heat: row.lower_temp,
        time: row.bake_time,
        convection: is_yes(row.convection.as_deref()),
        steam: is_yes(row.steam.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IngredientRecord;

    fn row(id: i64, title: &str, name: &str) -> StoredRow {
        StoredRow {
            id,
            title: title.to_string(),
            ingredient: IngredientRecord {
                group: "主麵團".to_string(),
                name: name.to_string(),
                weight: Some(100.0),
                percent: None,
                description: None,
            },
            steps: Some(format!("steps for {title}")),
            timestamp: Some("2024-06-15T10:00:00+08:00".to_string()),
            upper_temp: Some(180),
            lower_temp: Some(200),
            bake_time: Some(30),
            convection: Some("是".to_string()),
            steam: Some("否".to_string()),
        }
    }

    #[test]
    fn test_groups_by_title_in_row_order() {
        // Storage order interleaves titles; A's rows must still come out together.
        let rows = vec![
            row(1, "A", "a1"),
            row(2, "B", "b1"),
            row(3, "A", "a2"),
        ];
        let recipes = shape_recipes(&rows);
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].title, "A");
        let names: Vec<_> = recipes[0].ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a1", "a2"]);
        assert_eq!(recipes[1].title, "B");
        assert_eq!(recipes[1].ingredients.len(), 1);
    }

    #[test]
    fn test_sorts_titles_and_ids_regardless_of_input_order() {
        let rows = vec![
            row(9, "C", "c2"),
            row(3, "A", "a2"),
            row(5, "C", "c1"),
            row(1, "A", "a1"),
        ];
        let recipes = shape_recipes(&rows);
        let titles: Vec<_> = recipes.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
        let names: Vec<_> = recipes[1].ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["c1", "c2"]);
    }

    #[test]
    fn test_baking_info_from_markers() {
        let recipe = shape_recipe(&[row(1, "A", "a1")]).unwrap();
        assert_eq!(recipe.baking_info.top_heat, Some(180));
        assert_eq!(recipe.baking_info.bottom_heat, Some(200));
        assert_eq!(recipe.baking_info.time, Some(30));
        assert!(recipe.baking_info.convection);
        assert!(!recipe.baking_info.steam);
        assert_eq!(recipe.steps.as_deref(), Some("steps for A"));
    }

    #[test]
    fn test_unknown_or_missing_markers_are_false() {
        let mut r = row(1, "A", "a1");
        r.convection = Some("yes".to_string());
        r.steam = None;
        let recipe = shape_recipe(&[r]).unwrap();
        assert!(!recipe.baking_info.convection);
        assert!(!recipe.baking_info.steam);
    }

    #[test]
    fn test_first_row_wins_and_divergence_is_not_detected() {
        let first = row(1, "A", "a1");
        let mut second = row(2, "A", "a2");
        second.steps = Some("different steps".to_string());
        second.upper_temp = Some(250);
        second.steam = Some("是".to_string());

        let recipe = shape_recipe(&[second, first]).unwrap();
        assert_eq!(recipe.steps.as_deref(), Some("steps for A"));
        assert_eq!(recipe.baking_info.top_heat, Some(180));
        assert!(!recipe.baking_info.steam);
        assert_eq!(recipe.ingredients.len(), 2);
    }

    #[test]
    fn test_empty_rows() {
        assert!(shape_recipes(&[]).is_empty());
        assert!(shape_recipe(&[]).is_none());
    }
}

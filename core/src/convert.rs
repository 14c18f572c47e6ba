use serde::{Deserialize, Serialize};

use crate::error::RecipeError;
use crate::models::IngredientRecord;

/// Group labels whose flour defines the percentage basis.
pub const DEFAULT_BASIS_GROUPS: &[&str] = &["中種", "主麵團"];

/// Name fragments that mark an ingredient as flour.
pub const DEFAULT_FLOUR_KEYWORDS: &[&str] = &[
    "麵粉", "高筋粉", "中筋粉", "低筋粉", "全麥粉", "裸麥粉", "flour",
];

/// Classification rules used when scaling a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRules {
    pub flour_keywords: Vec<String>,
    pub basis_groups: Vec<String>,
}

impl Default for ConversionRules {
    fn default() -> Self {
        Self {
            flour_keywords: DEFAULT_FLOUR_KEYWORDS.iter().map(|s| (*s).to_string()).collect(),
            basis_groups: DEFAULT_BASIS_GROUPS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl ConversionRules {
    /// Default rules with any non-empty override lists swapped in.
    #[must_use]
    pub fn with_overrides(flour_keywords: Vec<String>, basis_groups: Vec<String>) -> Self {
        let mut rules = Self::default();
        if !flour_keywords.is_empty() {
            rules.flour_keywords = flour_keywords;
        }
        if !basis_groups.is_empty() {
            rules.basis_groups = basis_groups;
        }
        rules
    }

    #[must_use]
    pub fn is_flour(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.flour_keywords
            .iter()
            .filter(|k| !k.is_empty())
            .any(|k| name.contains(&k.to_lowercase()))
    }

    #[must_use]
    pub fn is_basis(&self, group: &str) -> bool {
        let group = group.trim();
        self.basis_groups.iter().any(|g| g == group)
    }

    /// Total weight of ingredients that are both flour and in a basis group.
    #[must_use]
    pub fn basis_flour(&self, ingredients: &[IngredientRecord]) -> f64 {
        ingredients
            .iter()
            .filter(|i| self.is_basis(&i.group) && self.is_flour(&i.name))
            .map(IngredientRecord::weight_or_zero)
            .sum()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub original_flour: f64,
    pub target_flour: f64,
    /// Rounded to 3 decimals for display; weights are scaled with the exact ratio.
    pub ratio: f64,
    pub include_outside_basis: bool,
    pub ingredients: Vec<IngredientRecord>,
}

/// Round half away from zero to `places` decimals.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Rescale a recipe so its basis flour weighs `target_flour` grams.
///
/// Basis-group ingredients are always scaled; the rest only when
/// `include_outside_basis` is set. Output order matches input order.
pub fn convert(
    ingredients: &[IngredientRecord],
    target_flour: f64,
    include_outside_basis: bool,
    rules: &ConversionRules,
) -> Result<ConversionResult, RecipeError> {
    if !target_flour.is_finite() || target_flour <= 0.0 {
        return Err(RecipeError::InvalidInput(
            "Target flour weight must be a number greater than 0".to_string(),
        ));
    }

    let original_flour = rules.basis_flour(ingredients);
    if original_flour <= 0.0 {
        return Err(RecipeError::NoBasisFlour);
    }

    let ratio = target_flour / original_flour;
    let ingredients = ingredients
        .iter()
        .map(|ing| {
            let mut scaled = ing.clone();
            if include_outside_basis || rules.is_basis(&ing.group) {
                scaled.weight = Some(round_to(ing.weight_or_zero() * ratio, 1));
            }
            scaled
        })
        .collect();

    Ok(ConversionResult {
        original_flour,
        target_flour,
        ratio: round_to(ratio, 3),
        include_outside_basis,
        ingredients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ing(group: &str, name: &str, weight: Option<f64>) -> IngredientRecord {
        IngredientRecord {
            group: group.to_string(),
            name: name.to_string(),
            weight,
            percent: None,
            description: None,
        }
    }

    fn soy_milk_loaf() -> Vec<IngredientRecord> {
        vec![
            ing("主麵團", "高筋麵粉", Some(500.0)),
            ing("主麵團", "水", Some(350.0)),
        ]
    }

    #[test]
    fn test_soy_milk_loaf_scenario() {
        let result = convert(&soy_milk_loaf(), 600.0, false, &ConversionRules::default()).unwrap();
        assert!((result.original_flour - 500.0).abs() < f64::EPSILON);
        assert!((result.target_flour - 600.0).abs() < f64::EPSILON);
        assert!((result.ratio - 1.2).abs() < f64::EPSILON);
        assert_eq!(result.ingredients[0].weight, Some(600.0));
        assert_eq!(result.ingredients[1].weight, Some(420.0));
    }

    #[test]
    fn test_sponge_and_main_dough_flour_both_count() {
        let ingredients = vec![
            ing("中種", "高筋麵粉", Some(300.0)),
            ing("中種", "水", Some(180.0)),
            ing("主麵團", "低筋粉", Some(200.0)),
            ing("主麵團", "糖", Some(50.0)),
        ];
        let result = convert(&ingredients, 1000.0, false, &ConversionRules::default()).unwrap();
        assert!((result.original_flour - 500.0).abs() < f64::EPSILON);
        assert!((result.ratio - 2.0).abs() < f64::EPSILON);
        let weights: Vec<_> = result.ingredients.iter().map(|i| i.weight).collect();
        assert_eq!(
            weights,
            vec![Some(600.0), Some(360.0), Some(400.0), Some(100.0)]
        );
    }

    #[test]
    fn test_outside_basis_left_alone_by_default() {
        let mut ingredients = soy_milk_loaf();
        ingredients.push(ing("內餡", "紅豆餡", Some(200.0)));
        ingredients.push(ing("裝飾", "杏仁粉 flour", Some(30.0)));

        let result = convert(&ingredients, 1000.0, false, &ConversionRules::default()).unwrap();
        // Flour outside a basis group does not count toward the basis.
        assert!((result.original_flour - 500.0).abs() < f64::EPSILON);
        assert_eq!(result.ingredients[2].weight, Some(200.0));
        assert_eq!(result.ingredients[3].weight, Some(30.0));

        let result = convert(&ingredients, 1000.0, true, &ConversionRules::default()).unwrap();
        assert!(result.include_outside_basis);
        assert_eq!(result.ingredients[2].weight, Some(400.0));
        assert_eq!(result.ingredients[3].weight, Some(60.0));
    }

    #[test]
    fn test_order_and_other_fields_preserved() {
        let mut ingredients = soy_milk_loaf();
        ingredients[1].percent = Some(0.7);
        ingredients[1].description = Some("cold".to_string());
        let result = convert(&ingredients, 250.0, false, &ConversionRules::default()).unwrap();
        assert_eq!(result.ingredients[0].name, "高筋麵粉");
        assert_eq!(result.ingredients[1].name, "水");
        assert_eq!(result.ingredients[1].percent, Some(0.7));
        assert_eq!(result.ingredients[1].description.as_deref(), Some("cold"));
        assert_eq!(result.ingredients[1].weight, Some(175.0));
    }

    #[test]
    fn test_idempotent_at_current_flour() {
        let ingredients = soy_milk_loaf();
        let result = convert(&ingredients, 500.0, true, &ConversionRules::default()).unwrap();
        assert!((result.ratio - 1.0).abs() < f64::EPSILON);
        for (before, after) in ingredients.iter().zip(&result.ingredients) {
            assert_eq!(before.weight, after.weight);
        }
    }

    #[test]
    fn test_no_flour_is_domain_error() {
        let ingredients = vec![ing("主麵團", "水", Some(350.0)), ing("主麵團", "鹽", Some(5.0))];
        let err = convert(&ingredients, 600.0, false, &ConversionRules::default()).unwrap_err();
        assert!(matches!(err, RecipeError::NoBasisFlour));
    }

    #[test]
    fn test_flour_only_outside_basis_is_domain_error() {
        let ingredients = vec![ing("其他", "高筋麵粉", Some(500.0))];
        let err = convert(&ingredients, 600.0, true, &ConversionRules::default()).unwrap_err();
        assert_eq!(err.kind(), "no_basis_flour");
    }

    #[test]
    fn test_zero_weight_flour_is_domain_error() {
        let ingredients = vec![ing("主麵團", "高筋麵粉", None)];
        let err = convert(&ingredients, 600.0, false, &ConversionRules::default()).unwrap_err();
        assert!(matches!(err, RecipeError::NoBasisFlour));
    }

    #[test]
    fn test_empty_recipe_is_domain_error() {
        let err = convert(&[], 600.0, false, &ConversionRules::default()).unwrap_err();
        assert!(matches!(err, RecipeError::NoBasisFlour));
    }

    #[test]
    fn test_bad_target_rejected_before_scaling() {
        let rules = ConversionRules::default();
        for target in [0.0, -100.0, f64::NAN, f64::INFINITY] {
            let err = convert(&soy_milk_loaf(), target, false, &rules).unwrap_err();
            assert_eq!(err.kind(), "invalid_input");
        }
        // Target validation comes first, even for flour-less recipes.
        let err = convert(&[], 0.0, false, &rules).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_missing_weight_scales_to_zero() {
        let mut ingredients = soy_milk_loaf();
        ingredients.push(ing("主麵團", "酵母", None));
        ingredients.push(ing("內餡", "奶油", None));
        let result = convert(&ingredients, 1000.0, false, &ConversionRules::default()).unwrap();
        assert_eq!(result.ingredients[2].weight, Some(0.0));
        // Not scaled, so left exactly as it was.
        assert_eq!(result.ingredients[3].weight, None);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert!((round_to(0.25, 1) - 0.3).abs() < f64::EPSILON);
        assert!((round_to(-0.25, 1) + 0.3).abs() < f64::EPSILON);
        assert!((round_to(2.5, 0) - 3.0).abs() < f64::EPSILON);
        assert!((round_to(0.0625, 3) - 0.063).abs() < f64::EPSILON);
        assert!((round_to(1.04, 1) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weight_tie_rounds_up() {
        // 0.5 * 0.5 = 0.25 exactly, which is a tie at one decimal.
        let ingredients = vec![
            ing("主麵團", "高筋麵粉", Some(2.0)),
            ing("主麵團", "鹽", Some(0.5)),
        ];
        let result = convert(&ingredients, 1.0, false, &ConversionRules::default()).unwrap();
        assert_eq!(result.ingredients[1].weight, Some(0.3));
    }

    #[test]
    fn test_ratio_tie_rounds_up() {
        let ingredients = vec![ing("主麵團", "高筋麵粉", Some(1000.0))];
        let result = convert(&ingredients, 62.5, false, &ConversionRules::default()).unwrap();
        assert!((result.ratio - 0.063).abs() < f64::EPSILON);
        assert_eq!(result.ingredients[0].weight, Some(62.5));
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let rules = ConversionRules::default();
        assert!(rules.is_flour("Bread Flour"));
        assert!(rules.is_flour("法國麵粉"));
        assert!(!rules.is_flour("水"));
        assert!(rules.is_basis(" 主麵團 "));
        assert!(!rules.is_basis("內餡"));
    }

    #[test]
    fn test_rule_overrides() {
        let rules = ConversionRules::with_overrides(vec!["flour".to_string()], vec![]);
        assert!(!rules.is_flour("高筋麵粉"));
        assert!(rules.is_basis("中種"));

        let rules = ConversionRules::with_overrides(vec![], vec!["dough".to_string()]);
        assert!(rules.is_flour("高筋麵粉"));
        assert!(!rules.is_basis("主麵團"));
        assert!(rules.is_basis("dough"));
    }

    #[test]
    fn test_empty_keyword_never_matches() {
        let rules = ConversionRules::with_overrides(vec![String::new()], vec![]);
        assert!(!rules.is_flour("水"));
    }

    proptest! {
        #[test]
        fn prop_basis_weights_scale_by_ratio(
            flour in 1.0f64..5000.0,
            water in 0.0f64..5000.0,
            filling in 0.0f64..5000.0,
            target in 1.0f64..5000.0,
            include in any::<bool>(),
        ) {
            let ingredients = vec![
                ing("主麵團", "高筋麵粉", Some(flour)),
                ing("主麵團", "水", Some(water)),
                ing("內餡", "紅豆餡", Some(filling)),
            ];
            let result = convert(&ingredients, target, include, &ConversionRules::default()).unwrap();
            let ratio = target / flour;

            prop_assert_eq!(result.ingredients[0].weight, Some(round_to(flour * ratio, 1)));
            prop_assert_eq!(result.ingredients[1].weight, Some(round_to(water * ratio, 1)));
            let expected_filling = if include { round_to(filling * ratio, 1) } else { filling };
            prop_assert_eq!(result.ingredients[2].weight, Some(expected_filling));
            prop_assert!((result.ratio - round_to(ratio, 3)).abs() < f64::EPSILON);
            for i in &result.ingredients {
                prop_assert!(i.weight_or_zero().is_finite());
            }
        }

        #[test]
        fn prop_converting_to_own_flour_keeps_weights(
            flour in 1.0f64..5000.0,
            water in 0.0f64..5000.0,
        ) {
            let flour = round_to(flour, 1);
            let water = round_to(water, 1);
            let ingredients = vec![
                ing("主麵團", "高筋麵粉", Some(flour)),
                ing("主麵團", "水", Some(water)),
            ];
            let result = convert(&ingredients, flour, false, &ConversionRules::default()).unwrap();
            prop_assert!((result.ratio - 1.0).abs() < f64::EPSILON);
            prop_assert!((result.ingredients[0].weight_or_zero() - flour).abs() < 1e-9);
            prop_assert!((result.ingredients[1].weight_or_zero() - water).abs() < 1e-9);
        }

        #[test]
        fn prop_flourless_recipes_never_scale(
            water in 0.0f64..5000.0,
            target in 0.1f64..5000.0,
        ) {
            let ingredients = vec![ing("主麵團", "水", Some(water))];
            let err = convert(&ingredients, target, true, &ConversionRules::default()).unwrap_err();
            prop_assert!(matches!(err, RecipeError::NoBasisFlour));
        }
    }
}

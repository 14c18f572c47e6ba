use serde::{Deserialize, Serialize};

/// A baker's percentage as it arrives from a form or import: `"65%"`, `65`, `0.65`, `"0.65"`.
///
/// Any other JSON shape lands in `Other` so a bad percent never fails the whole payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PercentInput {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<f64> for PercentInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for PercentInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Normalize a percentage to a decimal fraction.
///
/// Strings ending in `%` (or `％`) are divided by 100. Bare numbers greater than 1
/// are taken as percent units and divided by 100; numbers up to and including 1
/// are already fractions, so `1` means 100 %. Anything unparseable, non-finite or
/// negative yields `None`.
#[must_use]
pub fn normalize_percent(value: Option<&PercentInput>) -> Option<f64> {
    let n = match value? {
        PercentInput::Number(n) => from_units(*n),
        PercentInput::Text(s) => parse_percent_text(s),
        PercentInput::Other(_) => None,
    }?;
    (n.is_finite() && n >= 0.0).then_some(n)
}

fn parse_percent_text(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(stripped) = s.strip_suffix('%').or_else(|| s.strip_suffix('％')) {
        let n: f64 = stripped.trim().parse().ok()?;
        return Some(n / 100.0);
    }
    from_units(s.parse().ok()?)
}

fn from_units(n: f64) -> Option<f64> {
    if n > 1.0 { Some(n / 100.0) } else { Some(n) }
}

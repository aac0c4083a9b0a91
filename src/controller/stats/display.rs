use serde_json::Value;

use crate::controller::stats::{AST_PCT, REB_PCT, TS_PCT, USG_PCT};
use crate::model::StatRow;

/// Derived percentages are computed on a 0-100 scale already.
const ALREADY_SCALED: [&str; 4] = [TS_PCT, USG_PCT, AST_PCT, REB_PCT];

#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Scales upstream `*_PCT` ratios to percentages, whether sent as floats or
/// as whole numbers, and rounds every float column to one decimal. Other
/// integer columns and text columns are left alone.
pub fn format_for_display(rows: &mut [StatRow]) {
    for row in rows.iter_mut() {
        for (key, value) in &mut row.0 {
            let is_ratio = key.ends_with("_PCT") && !ALREADY_SCALED.contains(&key.as_str());
            if !(value.is_f64() || (is_ratio && value.is_number())) {
                continue;
            }
            let raw = value.as_f64().unwrap_or(0.0);
            let scaled = if is_ratio { raw * 100.0 } else { raw };
            *value = Value::from(round1(scaled));
        }
    }
}

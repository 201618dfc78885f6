use crate::models::{ChartView, Timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ratio to percent text. Below 10% in magnitude two decimals are kept, otherwise one.
/// Absent and non-finite input renders as an empty string.
pub fn format_percent(ratio: Option<f64>) -> String {
    let pct = match ratio.filter(|r| r.is_finite()) {
        Some(r) => r * 100.0,
        None => return String::new(),
    };
    // -0.0 would otherwise print as "-0.00%"
    let pct = if pct == 0.0 { 0.0 } else { pct };

    let digits = if pct.abs() < 10.0 { 2 } else { 1 };
    format!("{}%", to_fixed(pct, digits))
}

/// Fixed-point text where an exact tie rounds away from zero.
///
/// `{:.N}` rounds exact binary ties to even. A double sits exactly halfway at
/// `digits` places iff `|value| * 2^(digits + 1)` is an odd integer; such values
/// are nudged up one ulp so the tie resolves to the larger magnitude.
fn to_fixed(value: f64, digits: usize) -> String {
    let magnitude = value.abs();
    let scaled = magnitude * 2f64.powi(digits as i32 + 1);
    let magnitude = if scaled.fract() == 0.0 && scaled % 2.0 == 1.0 {
        f64::from_bits(magnitude.to_bits() + 1)
    } else {
        magnitude
    };
    let sign = if value.is_sign_negative() { "-" } else { "" };
    format!("{}{:.*}", sign, digits, magnitude)
}

pub fn format_raw(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// How a chart renders its numeric values. Ticks and tooltips share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    Raw,
    Percent,
}

impl ValueFormat {
    pub fn for_view(view: ChartView) -> Self {
        if view.is_percent() { ValueFormat::Percent } else { ValueFormat::Raw }
    }

    pub fn format(&self, value: Option<f64>) -> String {
        match self {
            ValueFormat::Raw => format_raw(value),
            ValueFormat::Percent => format_percent(value),
        }
    }
}

/// Four-digit year, used for time-axis ticks.
pub fn year_label(ts: &Timestamp) -> String {
    match ts {
        Timestamp::Instant(dt) => dt.format("%Y").to_string(),
        Timestamp::Raw(raw) => raw.clone(),
    }
}

/// "January 2020", used for tooltip titles.
pub fn month_year_label(ts: &Timestamp) -> String {
    match ts {
        Timestamp::Instant(dt) => dt.format("%B %Y").to_string(),
        Timestamp::Raw(raw) => raw.clone(),
    }
}

/// `YYYY-MM-DD` in UTC, for the range "From"/"To" labels.
pub fn input_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

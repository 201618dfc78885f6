use crate::models::PeriodKind;

/// Frequency assumed when the backend sends no metadata.
pub const DEFAULT_FREQUENCY: &str = "Monthly";

/// Backend field names holding one series' level and transforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformKeys {
    pub level: String,
    pub period: String,
    pub yoy: String,
    pub period_kind: PeriodKind,
}

impl TransformKeys {
    /// Quarter-over-quarter when the frequency label starts with "Q" (any case),
    /// month-over-month otherwise, including when the label is absent.
    pub fn select(code: &str, frequency: Option<&str>) -> Self {
        let period_kind = frequency
            .and_then(|f| f.chars().next())
            .filter(|c| c.eq_ignore_ascii_case(&'q'))
            .map(|_| PeriodKind::QuarterOverQuarter)
            .unwrap_or(PeriodKind::MonthOverMonth);

        TransformKeys {
            level: code.to_string(),
            period: format!("{}_{}", period_kind.prefix(), code),
            yoy: format!("YoY_{}", code),
            period_kind,
        }
    }
}

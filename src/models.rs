use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Observation date as delivered by the backend.
/// Dates that could not be parsed are passed through as the original string.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Timestamp {
    Instant(DateTime<Utc>),
    Raw(String),
}

impl Timestamp {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Instant(ts) => Some(*ts),
            Timestamp::Raw(_) => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ObservationPoint {
    pub timestamp: Timestamp,
    /// `None` is a gap, never zero.
    pub value: Option<f64>,
}

impl ObservationPoint {
    pub fn new(timestamp: DateTime<Utc>, value: Option<f64>) -> Self {
        Self { timestamp: Timestamp::Instant(timestamp), value }
    }
}

/// Which native-period change the backend computed for a series.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    MonthOverMonth,
    QuarterOverQuarter,
}

impl PeriodKind {
    /// Field prefix used by the backend (`MoM_GDP`, `QoQ_GDP`).
    pub fn prefix(&self) -> &'static str {
        match self {
            PeriodKind::MonthOverMonth => "MoM",
            PeriodKind::QuarterOverQuarter => "QoQ",
        }
    }
}

/// Descriptive fields from the backend's `meta` record.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SeriesMeta {
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub seasonal_adjustment: Option<String>,
}

/// One fetched series. `level`, `period_change` and `yoy_change` are index-aligned
/// on the date axis of a single response. Replaced wholesale, never edited.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SeriesBundle {
    pub code: String,
    pub frequency: String,
    pub period_kind: PeriodKind,
    pub meta: SeriesMeta,
    pub level: Vec<ObservationPoint>,
    pub period_change: Vec<ObservationPoint>,
    pub yoy_change: Vec<ObservationPoint>,
    /// Date strings that were passed through unparsed.
    #[serde(default)]
    pub malformed_timestamps: Vec<String>,
}

impl SeriesBundle {
    pub fn points(&self, view: ChartView) -> &[ObservationPoint] {
        match view {
            ChartView::Level => &self.level,
            ChartView::PeriodChange => &self.period_change,
            ChartView::YoYChange => &self.yoy_change,
        }
    }

    /// Number of level observations.
    pub fn observation_count(&self) -> usize {
        self.level.len()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartView {
    Level,
    PeriodChange,
    YoYChange,
}

impl ChartView {
    pub const ALL: [ChartView; 3] = [ChartView::Level, ChartView::PeriodChange, ChartView::YoYChange];

    pub fn title(&self) -> &'static str {
        match self {
            ChartView::Level => "Level",
            ChartView::PeriodChange => "change",
            ChartView::YoYChange => "YoY",
        }
    }

    pub fn is_percent(&self) -> bool {
        !matches!(self, ChartView::Level)
    }
}

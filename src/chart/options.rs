use crate::core::format::{month_year_label, year_label, ValueFormat};
use crate::models::{ObservationPoint, Timestamp};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendOptions {
    pub display: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleOptions {
    pub display: bool,
    pub text: String,
}

/// Panel-level renderer options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    /// Series chips act as the legend, so the renderer's own is hidden.
    pub legend: LegendOptions,
    pub title: TitleOptions,
}

impl ChartOptions {
    pub fn titled(text: &str) -> Self {
        ChartOptions {
            responsive: true,
            maintain_aspect_ratio: false,
            legend: LegendOptions { display: false },
            title: TitleOptions { display: true, text: text.to_string() },
        }
    }
}

/// Tooltip text callbacks. Values go through the same [`ValueFormat`] as the axis ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tooltip {
    pub format: ValueFormat,
}

impl Tooltip {
    pub fn new(format: ValueFormat) -> Self {
        Self { format }
    }

    /// Month and year of the hovered point, e.g. "April 2020".
    pub fn title(&self, point: &ObservationPoint) -> String {
        month_year_label(&point.timestamp)
    }

    /// `"<label>: <value>"`; a gap renders as an empty value.
    pub fn label(&self, dataset_label: &str, point: &ObservationPoint) -> String {
        format!("{}: {}", dataset_label, self.format.format(point.value))
    }
}

/// Tick label for the shared time axis.
pub fn time_tick_label(ts: &Timestamp) -> String {
    year_label(ts)
}

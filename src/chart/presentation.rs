use super::options::{ChartOptions, Tooltip};
use crate::core::format::ValueFormat;
use crate::core::range::RangeSelector;
use crate::models::{ChartView, ObservationPoint, SeriesBundle};
use serde::Serialize;
use std::collections::HashMap;

/// Series colors, assigned by position in active order and wrapping after the last.
pub const PALETTE: [&str; 5] = [
    "rgba(54,162,235,0.95)",
    "rgba(255,99,132,0.95)",
    "rgba(75,192,192,0.95)",
    "rgba(255,206,86,0.95)",
    "rgba(153,102,255,0.95)",
];

pub fn color_for(position: usize) -> &'static str {
    PALETTE[position % PALETTE.len()]
}

/// `y-1`, `y-2`, ... for positions 0, 1, ...
pub fn axis_id_for(position: usize) -> String {
    format!("y-{}", position + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Left,
    Right,
}

impl AxisPosition {
    pub fn for_position(position: usize) -> Self {
        if position % 2 == 0 { AxisPosition::Left } else { AxisPosition::Right }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub code: String,
    pub label: String,
    pub color: &'static str,
    pub axis_id: String,
    pub tension: f64,
    pub point_radius: u32,
    pub border_width: u32,
    pub points: Vec<ObservationPoint>,
}

/// One independently scaled numeric axis per series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueAxis {
    pub id: String,
    pub position: AxisPosition,
    /// Only the first axis draws gridlines; the rest overlay it.
    pub draw_grid: bool,
    pub format: ValueFormat,
}

impl ValueAxis {
    pub fn format_tick(&self, value: f64) -> String {
        self.format.format(Some(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Year,
}

/// Shared continuous time axis, ticked at whole years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeAxis {
    pub unit: TimeUnit,
    pub display_format: &'static str,
    pub tooltip_format: &'static str,
    pub auto_skip: bool,
    pub max_rotation: u32,
}

impl Default for TimeAxis {
    fn default() -> Self {
        TimeAxis {
            unit: TimeUnit::Year,
            display_format: "yyyy",
            tooltip_format: "yyyy",
            auto_skip: true,
            max_rotation: 0,
        }
    }
}

/// Everything the renderer needs for one chart panel. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPresentation {
    pub view: ChartView,
    pub datasets: Vec<Dataset>,
    pub axes: Vec<ValueAxis>,
    pub shared_time_axis: TimeAxis,
    pub options: ChartOptions,
    pub tooltip: Tooltip,
}

impl ChartPresentation {
    pub fn dataset(&self, code: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.code == code)
    }

    pub fn axis(&self, id: &str) -> Option<&ValueAxis> {
        self.axes.iter().find(|a| a.id == id)
    }
}

pub struct ChartPresentationBuilder<'a> {
    active: &'a [String],
    bundles: &'a HashMap<String, SeriesBundle>,
    range: &'a RangeSelector,
}

impl<'a> ChartPresentationBuilder<'a> {
    pub fn new(active: &'a [String], bundles: &'a HashMap<String, SeriesBundle>, range: &'a RangeSelector) -> Self {
        Self { active, bundles, range }
    }

    pub fn build(&self, view: ChartView) -> ChartPresentation {
        let format = ValueFormat::for_view(view);
        let mut datasets = Vec::new();
        let mut axes = Vec::new();

        // Position in active order drives color, axis id and side, even if
        // earlier codes are still pending.
        for (position, code) in self.active.iter().enumerate() {
            let bundle = match self.bundles.get(code) {
                Some(bundle) => bundle,
                None => continue,
            };

            let axis_id = axis_id_for(position);
            datasets.push(Dataset {
                code: code.clone(),
                label: code.clone(),
                color: color_for(position),
                axis_id: axis_id.clone(),
                tension: 0.12,
                point_radius: 0,
                border_width: 1,
                points: self.range.slice_from_start(bundle.points(view)),
            });
            axes.push(ValueAxis {
                id: axis_id,
                position: AxisPosition::for_position(position),
                draw_grid: position == 0,
                format,
            });
        }

        ChartPresentation {
            view,
            datasets,
            axes,
            shared_time_axis: TimeAxis::default(),
            options: ChartOptions::titled(view.title()),
            tooltip: Tooltip::new(format),
        }
    }

    pub fn build_all(&self) -> Vec<ChartPresentation> {
        ChartView::ALL.iter().map(|view| self.build(*view)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timeseries::build_shared_timeline;
    use crate::models::{PeriodKind, SeriesMeta};
    use chrono::{TimeZone, Utc};

    fn point(y: i32, m: u32, value: Option<f64>) -> ObservationPoint {
        ObservationPoint::new(Utc.with_ymd_and_hms(y, m, 1, 0, 0, 0).unwrap(), value)
    }

    fn bundle(code: &str, level: Vec<ObservationPoint>) -> SeriesBundle {
        let change = level.iter().map(|p| ObservationPoint { timestamp: p.timestamp.clone(), value: Some(0.0456) }).collect();
        SeriesBundle {
            code: code.to_string(),
            frequency: "Monthly".to_string(),
            period_kind: PeriodKind::MonthOverMonth,
            meta: SeriesMeta::default(),
            period_change: change,
            yoy_change: Vec::new(),
            level,
            malformed_timestamps: Vec::new(),
        }
    }

    fn fixture(codes: &[&str]) -> (Vec<String>, HashMap<String, SeriesBundle>) {
        let active = codes.iter().map(|c| c.to_string()).collect();
        let mut bundles = HashMap::new();
        for (i, code) in codes.iter().enumerate() {
            bundles.insert(code.to_string(), bundle(code, vec![point(2020, 1, Some(i as f64)), point(2021, 1, Some(1.0))]));
        }
        (active, bundles)
    }

    #[test]
    fn test_axes_alternate_and_only_first_draws_grid() {
        let (active, bundles) = fixture(&["A", "B", "C"]);
        let range = RangeSelector::new(build_shared_timeline(bundles.values()));
        let chart = ChartPresentationBuilder::new(&active, &bundles, &range).build(ChartView::Level);

        let sides: Vec<AxisPosition> = chart.axes.iter().map(|a| a.position).collect();
        assert_eq!(sides, vec![AxisPosition::Left, AxisPosition::Right, AxisPosition::Left]);
        assert_eq!(chart.axes.iter().filter(|a| a.draw_grid).count(), 1);
        assert!(chart.axes[0].draw_grid);
        assert_eq!(chart.datasets[1].axis_id, "y-2");
        assert_eq!(chart.datasets[1].color, PALETTE[1]);
        assert_eq!(chart.options.title.text, "Level");
        assert_eq!(chart.axes[0].format_tick(1500.0), "1500");
    }

    #[test]
    fn test_palette_wraps() {
        let (active, bundles) = fixture(&["A", "B", "C", "D", "E", "F"]);
        let range = RangeSelector::default();
        let chart = ChartPresentationBuilder::new(&active, &bundles, &range).build(ChartView::Level);
        assert_eq!(chart.datasets[5].color, chart.datasets[0].color);
        assert_eq!(chart.datasets[5].axis_id, "y-6");
    }

    #[test]
    fn test_pending_code_keeps_positions_of_others() {
        let (active, mut bundles) = fixture(&["GDP", "UNRATE"]);
        bundles.remove("GDP");
        let range = RangeSelector::default();
        let chart = ChartPresentationBuilder::new(&active, &bundles, &range).build(ChartView::Level);

        assert_eq!(chart.datasets.len(), 1);
        assert_eq!(chart.datasets[0].code, "UNRATE");
        assert_eq!(chart.datasets[0].axis_id, "y-2");
        assert_eq!(chart.axes[0].position, AxisPosition::Right);
        assert!(!chart.axes[0].draw_grid);
    }

    #[test]
    fn test_change_views_use_percent_and_empty_series_keep_axis() {
        let (active, bundles) = fixture(&["CPI"]);
        let range = RangeSelector::default();
        let builder = ChartPresentationBuilder::new(&active, &bundles, &range);

        let period = builder.build(ChartView::PeriodChange);
        assert_eq!(period.axes[0].format, ValueFormat::Percent);
        assert_eq!(period.axes[0].format_tick(0.0456), "4.56%");
        assert_eq!(period.options.title.text, "change");

        // yoy_change is empty in the fixture
        let yoy = builder.build(ChartView::YoYChange);
        assert_eq!(yoy.datasets.len(), 1);
        assert!(yoy.datasets[0].points.is_empty());
        assert_eq!(yoy.axes.len(), 1);
    }

    #[test]
    fn test_datasets_are_sliced_to_range() {
        let (active, bundles) = fixture(&["A"]);
        let mut range = RangeSelector::new(build_shared_timeline(bundles.values()));
        range.set_start(1);
        let chart = ChartPresentationBuilder::new(&active, &bundles, &range).build(ChartView::Level);
        assert_eq!(chart.datasets[0].points, vec![point(2021, 1, Some(1.0))]);
        assert_eq!(chart.shared_time_axis.unit, TimeUnit::Year);
    }
}

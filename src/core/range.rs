use super::timeseries::SharedTimeline;
use crate::models::ObservationPoint;
use chrono::{DateTime, Utc};

/// Start-index selection over the shared timeline. The visible range always runs
/// from `timeline[start_index]` to the latest point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeSelector {
    timeline: SharedTimeline,
    start_index: usize,
}

impl RangeSelector {
    pub fn new(timeline: SharedTimeline) -> Self {
        Self { timeline, start_index: 0 }
    }

    pub fn timeline(&self) -> &SharedTimeline {
        &self.timeline
    }

    /// Install a rebuilt timeline and re-clamp the current index to it.
    pub fn set_timeline(&mut self, timeline: SharedTimeline) {
        self.timeline = timeline;
        self.start_index = self.clamp(self.start_index);
    }

    /// Out-of-range indices clamp rather than error; returns the effective index.
    pub fn set_start(&mut self, index: usize) -> usize {
        self.start_index = self.clamp(index);
        self.start_index
    }

    pub fn reset(&mut self) {
        self.start_index = 0;
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Largest index the slider may take.
    pub fn max_index(&self) -> usize {
        self.timeline.len().saturating_sub(1)
    }

    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.timeline.get(self.start_index)
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.timeline.last()
    }

    /// Points dated on or after the selected start instant.
    ///
    /// Comparison is by instant, so a series with gaps against the union still
    /// slices correctly. Points with unparsed timestamps are kept.
    pub fn slice_from_start(&self, points: &[ObservationPoint]) -> Vec<ObservationPoint> {
        let start = match self.start_date() {
            Some(start) if self.start_index > 0 => start,
            _ => return points.to_vec(),
        };

        points
            .iter()
            .filter(|p| p.timestamp.instant().map_or(true, |ts| ts >= start))
            .cloned()
            .collect()
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.max_index())
    }
}

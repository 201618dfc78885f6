use crate::chart::presentation::{color_for, ChartPresentation, ChartPresentationBuilder};
use crate::core::format::input_date;
use crate::core::range::RangeSelector;
use crate::core::store::{AddOutcome, SeriesStatus, SeriesStore, StoreChange};
use crate::core::timeseries::{build_shared_timeline, SharedTimeline};
use crate::fetcher::IndicatorSource;
use crate::models::ChartView;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// One removable chip per active code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesChip {
    pub code: String,
    pub color: &'static str,
    pub status: SeriesStatus,
}

/// Serializable state of the whole widget, for hosts that render it elsewhere.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub chips: Vec<SeriesChip>,
    pub loading: bool,
    pub error: Option<String>,
    pub start_index: usize,
    pub max_index: usize,
    /// `YYYY-MM-DD` labels of the visible range ends.
    pub from: Option<String>,
    pub to: Option<String>,
    pub charts: Vec<Arc<ChartPresentation>>,
}

/// Store, timeline, range and the three chart models, kept consistent after every
/// mutation. Subscribers see a revision bump each time the models are rebuilt.
pub struct Dashboard {
    store: SeriesStore,
    range: RangeSelector,
    presentations: Vec<Arc<ChartPresentation>>,
    revision: watch::Sender<u64>,
}

impl Dashboard {
    pub fn new(source: Arc<dyn IndicatorSource>) -> Self {
        let (revision, _) = watch::channel(0);
        let mut dashboard = Self {
            store: SeriesStore::new(source),
            range: RangeSelector::default(),
            presentations: Vec::new(),
            revision,
        };
        dashboard.rebuild_presentations();
        dashboard
    }

    pub fn add(&mut self, code: &str) -> AddOutcome {
        let outcome = self.store.add(code);
        if outcome == AddOutcome::Requested {
            // Active order changed; positions of resolved series may shift.
            self.rebuild_presentations();
        }
        outcome
    }

    pub fn add_all<I, S>(&mut self, codes: I) -> Vec<AddOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes.into_iter().map(|code| self.add(code.as_ref())).collect()
    }

    pub fn remove(&mut self, code: &str) {
        self.store.remove(code);
        self.on_store_changed();
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.range.reset();
        self.on_store_changed();
    }

    /// Wait for the next fetch completion and recompute. `None` when idle.
    pub async fn next_event(&mut self) -> Option<StoreChange> {
        let change = self.store.next_event().await?;
        self.after_completion(&change);
        Some(change)
    }

    /// Apply every completion that has already arrived, without waiting.
    pub fn poll_events(&mut self) -> Vec<StoreChange> {
        let mut changes = Vec::new();
        while let Some(change) = self.store.poll_event() {
            self.after_completion(&change);
            changes.push(change);
        }
        changes
    }

    /// Drive the in-flight fetches to completion.
    pub async fn settle(&mut self) -> Vec<StoreChange> {
        let mut changes = Vec::new();
        while let Some(change) = self.next_event().await {
            changes.push(change);
        }
        changes
    }

    pub fn set_start(&mut self, index: usize) -> usize {
        let effective = self.range.set_start(index);
        self.rebuild_presentations();
        effective
    }

    pub fn reset_range(&mut self) {
        self.range.reset();
        self.rebuild_presentations();
    }

    pub fn presentation(&self, view: ChartView) -> Arc<ChartPresentation> {
        let index = ChartView::ALL.iter().position(|v| *v == view).unwrap_or(0);
        Arc::clone(&self.presentations[index])
    }

    pub fn presentations(&self) -> &[Arc<ChartPresentation>] {
        &self.presentations
    }

    pub fn chips(&self) -> Vec<SeriesChip> {
        self.store
            .active_codes()
            .iter()
            .enumerate()
            .map(|(position, code)| SeriesChip {
                code: code.clone(),
                color: color_for(position),
                status: self.store.status(code).unwrap_or(SeriesStatus::Pending),
            })
            .collect()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            chips: self.chips(),
            loading: self.is_loading(),
            error: self.last_error().map(str::to_string),
            start_index: self.range.start_index(),
            max_index: self.range.max_index(),
            from: self.range.start_date().as_ref().map(input_date),
            to: self.range.end_date().as_ref().map(input_date),
            charts: self.presentations.clone(),
        }
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn range(&self) -> &RangeSelector {
        &self.range
    }

    pub fn timeline(&self) -> &SharedTimeline {
        self.range.timeline()
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.store.last_error()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn after_completion(&mut self, change: &StoreChange) {
        match change {
            StoreChange::Resolved { .. } => self.on_store_changed(),
            // Chip status changed, data did not
            StoreChange::Failed { .. } => self.rebuild_presentations(),
            StoreChange::Discarded { .. } => {}
        }
    }

    fn on_store_changed(&mut self) {
        let timeline = build_shared_timeline(self.store.bundles().values());
        debug!("Dashboard: timeline rebuilt with {} dates", timeline.len());
        self.range.set_timeline(timeline);
        self.rebuild_presentations();
    }

    fn rebuild_presentations(&mut self) {
        let builder = ChartPresentationBuilder::new(self.store.active_codes(), self.store.bundles(), &self.range);
        self.presentations = builder.build_all().into_iter().map(Arc::new).collect();
        self.revision.send_modify(|r| *r += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::memory::MemorySource;
    use crate::models::{ObservationPoint, PeriodKind, SeriesBundle, SeriesMeta};
    use chrono::{TimeZone, Utc};

    fn monthly(code: &str, months: &[u32]) -> SeriesBundle {
        let level: Vec<ObservationPoint> = months
            .iter()
            .map(|m| ObservationPoint::new(Utc.with_ymd_and_hms(2020, *m, 1, 0, 0, 0).unwrap(), Some(*m as f64)))
            .collect();
        SeriesBundle {
            code: code.to_string(),
            frequency: "Monthly".to_string(),
            period_kind: PeriodKind::MonthOverMonth,
            meta: SeriesMeta::default(),
            period_change: level.clone(),
            yoy_change: level.clone(),
            level,
            malformed_timestamps: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_range_reclamps_when_timeline_shrinks() {
        let source = MemorySource::new()
            .with_bundle(monthly("LONG", &[1, 2, 3, 4, 5, 6]))
            .with_bundle(monthly("SHORT", &[1, 2]));
        let mut dashboard = Dashboard::new(Arc::new(source));

        dashboard.add_all(["LONG", "SHORT"]);
        dashboard.settle().await;
        assert_eq!(dashboard.timeline().len(), 6);
        assert_eq!(dashboard.set_start(5), 5);

        dashboard.remove("LONG");
        assert_eq!(dashboard.timeline().len(), 2);
        assert_eq!(dashboard.range().start_index(), 1);
        assert_eq!(dashboard.presentation(ChartView::Level).datasets[0].points.len(), 1);
    }

    #[tokio::test]
    async fn test_revision_bumps_on_every_recompute() {
        let source = MemorySource::new().with_bundle(monthly("GDP", &[1, 2, 3]));
        let mut dashboard = Dashboard::new(Arc::new(source));
        let mut rx = dashboard.subscribe();
        let start = dashboard.revision();

        dashboard.add("GDP");
        dashboard.settle().await;
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(dashboard.revision() >= start + 2);

        dashboard.set_start(2);
        assert!(rx.has_changed().unwrap());
        assert_eq!(dashboard.presentation(ChartView::YoYChange).datasets[0].points.len(), 1);
    }

    #[tokio::test]
    async fn test_chips_follow_active_order_and_status() {
        let source = MemorySource::new()
            .with_bundle(monthly("GDP", &[1]))
            .with_status("DOWN", 500);
        let mut dashboard = Dashboard::new(Arc::new(source));

        dashboard.add_all(["gdp", "down", "GDP"]);
        dashboard.settle().await;

        let chips = dashboard.chips();
        assert_eq!(chips.len(), 2);
        assert_eq!(chips[0].status, SeriesStatus::Ready);
        assert_eq!(chips[1].status, SeriesStatus::Failed);
        assert_eq!(chips[1].color, color_for(1));
        assert_eq!(dashboard.last_error(), Some("Server returned 500"));

        dashboard.clear();
        assert!(dashboard.chips().is_empty());
        assert!(dashboard.timeline().is_empty());
        assert!(dashboard.presentation(ChartView::Level).datasets.is_empty());
    }

    #[tokio::test]
    async fn test_poll_events_drains_stale_and_fresh_completions() {
        let source = MemorySource::new()
            .with_bundle(monthly("GDP", &[1, 2]))
            .with_bundle(monthly("UNRATE", &[1, 2, 3]));
        let mut dashboard = Dashboard::new(Arc::new(source));

        dashboard.add("GDP");
        dashboard.remove("GDP");
        dashboard.add("UNRATE");
        assert!(dashboard.poll_events().is_empty());

        for _ in 0..8 {
            tokio::task::yield_now().await;
        }

        let changes = dashboard.poll_events();
        assert_eq!(
            changes,
            vec![
                StoreChange::Discarded { code: "GDP".to_string() },
                StoreChange::Resolved { code: "UNRATE".to_string() },
            ]
        );
        assert!(!dashboard.is_loading());
        assert!(dashboard.store().bundle("GDP").is_none());
        assert_eq!(dashboard.timeline().len(), 3);
        assert_eq!(dashboard.chips().len(), 1);
        assert!(dashboard.poll_events().is_empty());
    }
}

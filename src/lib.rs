pub mod models;
pub mod error;
pub mod config;
pub mod telemetry;
pub mod fetcher;
pub mod core;
pub mod chart;
pub mod dashboard;

use std::sync::Arc;
use crate::config::Settings;
use crate::dashboard::{Dashboard, DashboardSnapshot};
use crate::fetcher::IndicatorSource;

/// Mount a dashboard on `source`, add `codes`, wait for every fetch and apply
/// the requested start index. Failed codes stay in the snapshot as failed chips.
pub async fn load_snapshot(
    source: Arc<dyn IndicatorSource>,
    codes: &[String],
    start_index: Option<usize>,
) -> DashboardSnapshot {
    let mut dashboard = Dashboard::new(source);
    dashboard.add_all(codes);

    for change in dashboard.settle().await {
        tracing::debug!("Completion: {:?}", change);
    }

    if let Some(index) = start_index {
        dashboard.set_start(index);
    }

    dashboard.snapshot()
}

/// Same as [`load_snapshot`] against the configured backend, seeded with the
/// configured default series when `codes` is empty.
pub async fn load_from_settings(settings: &Settings, codes: &[String], start_index: Option<usize>) -> DashboardSnapshot {
    let codes = if codes.is_empty() { settings.default_series.clone() } else { codes.to_vec() };
    let source = Arc::new(fetcher::econdata::EconDataClient::new(settings));
    load_snapshot(source, &codes, start_index).await
}

use crate::models::SeriesBundle;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Sorted, deduplicated union of every level timestamp across the stored series.
/// Bounds the range selector; charts still plot each series on its own dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedTimeline {
    dates: Vec<DateTime<Utc>>,
}

impl SharedTimeline {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<DateTime<Utc>> {
        self.dates.get(index).copied()
    }

    pub fn last(&self) -> Option<DateTime<Utc>> {
        self.dates.last().copied()
    }

    pub fn as_slice(&self) -> &[DateTime<Utc>] {
        &self.dates
    }
}

impl From<Vec<DateTime<Utc>>> for SharedTimeline {
    fn from(dates: Vec<DateTime<Utc>>) -> Self {
        let set: BTreeSet<DateTime<Utc>> = dates.into_iter().collect();
        Self { dates: set.into_iter().collect() }
    }
}

/// Rebuild the shared timeline from scratch.
/// Raw (unparsed) timestamps have no instant and are left out.
pub fn build_shared_timeline<'a, I>(bundles: I) -> SharedTimeline
where
    I: IntoIterator<Item = &'a SeriesBundle>,
{
    // 1. Collect all unique timestamps
    let mut all_timestamps: BTreeSet<DateTime<Utc>> = BTreeSet::new();
    for bundle in bundles {
        for point in &bundle.level {
            if let Some(ts) = point.timestamp.instant() {
                all_timestamps.insert(ts);
            }
        }
    }

    // 2. BTreeSet iteration is already ascending
    SharedTimeline { dates: all_timestamps.into_iter().collect() }
}

use chrono::{DateTime, TimeZone, Utc};
use econ_dashboard_lib::core::range::RangeSelector;
use econ_dashboard_lib::core::timeseries::build_shared_timeline;
use econ_dashboard_lib::models::{ObservationPoint, PeriodKind, SeriesBundle, SeriesMeta};
use proptest::prelude::*;

fn day(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(offset)
}

fn bundle(code: String, offsets: Vec<i64>) -> SeriesBundle {
    let level: Vec<ObservationPoint> = offsets.into_iter().map(|o| ObservationPoint::new(day(o), Some(o as f64))).collect();
    SeriesBundle {
        code,
        frequency: "Monthly".to_string(),
        period_kind: PeriodKind::MonthOverMonth,
        meta: SeriesMeta::default(),
        period_change: level.clone(),
        yoy_change: level.clone(),
        level,
        malformed_timestamps: Vec::new(),
    }
}

fn bundles_strategy() -> impl Strategy<Value = Vec<SeriesBundle>> {
    prop::collection::vec(prop::collection::vec(0i64..400, 0..40), 0..5).prop_map(|series| {
        series
            .into_iter()
            .enumerate()
            .map(|(i, offsets)| bundle(format!("S{}", i), offsets))
            .collect()
    })
}

proptest! {
    #[test]
    fn timeline_is_sorted_unique_superset(bundles in bundles_strategy()) {
        let timeline = build_shared_timeline(bundles.iter());
        let dates = timeline.as_slice();

        prop_assert!(dates.windows(2).all(|w| w[0] < w[1]));
        for b in &bundles {
            for p in &b.level {
                let ts = p.timestamp.instant().unwrap();
                prop_assert!(dates.binary_search(&ts).is_ok());
            }
        }
    }

    #[test]
    fn start_index_always_clamped(bundles in bundles_strategy(), index in 0usize..1000) {
        let timeline = build_shared_timeline(bundles.iter());
        let len = timeline.len();
        let mut range = RangeSelector::new(timeline);

        let effective = range.set_start(index);
        prop_assert!(effective <= len.saturating_sub(1));
        prop_assert_eq!(effective, range.start_index());
    }

    #[test]
    fn slice_never_returns_earlier_points(bundles in bundles_strategy(), index in 0usize..100) {
        let timeline = build_shared_timeline(bundles.iter());
        let mut range = RangeSelector::new(timeline);
        range.set_start(index);

        for b in &bundles {
            let sliced = range.slice_from_start(&b.level);
            if range.start_index() == 0 {
                prop_assert_eq!(&sliced, &b.level);
            }
            if let Some(start) = range.start_date() {
                prop_assert!(sliced.iter().all(|p| p.timestamp.instant().unwrap() >= start));
            }
        }
    }
}

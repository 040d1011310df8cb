//! Per-location retreat summaries.

use std::collections::BTreeMap;

use practice_core::config::CenterLookup;
use practice_core::models::{LocationKey, LocationSummary, RetreatEvent, RetreatKind};
use tracing::warn;

/// Groups retreat events by quantized coordinate.
pub struct LocationAggregator;

#[derive(Default)]
struct LocationGroup {
    lat: f64,
    lon: f64,
    total_days: u64,
    retreat_count: u32,
    by_name_kind: BTreeMap<(String, RetreatKind), u32>,
}

impl LocationAggregator {
    /// One [`LocationSummary`] per distinct location, ordered by total days
    /// (descending), center label, then coordinate.
    ///
    /// Operates on the original events, not on expanded days. The summary's
    /// coordinate is that of the first event seen at the location. Locations
    /// the lookup cannot name are labelled with their coordinate.
    pub fn aggregate(retreats: &[RetreatEvent], centers: &dyn CenterLookup) -> Vec<LocationSummary> {
        // Coordinate order; the stable sort below keeps it for full ties.
        let mut groups: BTreeMap<LocationKey, LocationGroup> = BTreeMap::new();

        for retreat in retreats {
            let group = groups
                .entry(retreat.location_key())
                .or_insert_with(|| LocationGroup {
                    lat: retreat.lat,
                    lon: retreat.lon,
                    ..Default::default()
                });
            group.total_days += u64::from(retreat.duration_days);
            group.retreat_count += 1;
            *group
                .by_name_kind
                .entry((retreat.name.clone(), retreat.kind))
                .or_insert(0) += 1;
        }

        let mut summaries: Vec<LocationSummary> = groups
            .into_iter()
            .map(|(key, group)| {
                let center_label = centers.center_label(&key).unwrap_or_else(|| {
                    let label = format!("{:.4}, {:.4}", group.lat, group.lon);
                    warn!("No retreat center known at {}; using coordinates", label);
                    label
                });
                let mut breakdown: Vec<String> = group
                    .by_name_kind
                    .iter()
                    .map(|((name, kind), count)| format!("{}: {} {}", name, count, kind))
                    .collect();
                breakdown.sort();

                LocationSummary {
                    lat: group.lat,
                    lon: group.lon,
                    center_label,
                    total_days: group.total_days,
                    retreat_count: group.retreat_count,
                    breakdown,
                }
            })
            .collect();

        summaries.sort_by(|a, b| {
            b.total_days
                .cmp(&a.total_days)
                .then_with(|| a.center_label.cmp(&b.center_label))
        });
        summaries
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use practice_core::config::{CenterDirectory, RetreatCenter};
    use practice_core::time_utils::parse_date;

    const DIPA: (f64, f64) = (51.93717047288657, -2.7183688422482426);
    const MAHAVANA: (f64, f64) = (34.13290739801991, -116.16958440882196);
    const KUNJA: (f64, f64) = (46.551094113518346, -122.68237978383321);

    fn retreat(name: &str, days: u32, at: (f64, f64), kind: RetreatKind) -> RetreatEvent {
        RetreatEvent {
            name: name.to_string(),
            start: parse_date("2012-03-01").unwrap(),
            duration_days: days,
            lat: at.0,
            lon: at.1,
            kind,
        }
    }

    fn directory() -> CenterDirectory {
        CenterDirectory::new(&[
            RetreatCenter {
                name: "Dhamma Dipa".into(),
                lat: DIPA.0,
                lon: DIPA.1,
            },
            RetreatCenter {
                name: "Dhamma Mahavana".into(),
                lat: MAHAVANA.0,
                lon: MAHAVANA.1,
            },
        ])
    }

    #[test]
    fn test_groups_and_counts() {
        let retreats = vec![
            retreat("10-day", 10, MAHAVANA, RetreatKind::Sat),
            retreat("Satipatthana", 8, MAHAVANA, RetreatKind::Sat),
            retreat("10-day", 10, MAHAVANA, RetreatKind::Sat),
            retreat("3-day", 3, MAHAVANA, RetreatKind::Served),
            retreat("10-day", 10, DIPA, RetreatKind::Sat),
        ];
        let summaries = LocationAggregator::aggregate(&retreats, &directory());

        assert_eq!(summaries.len(), 2);
        let mahavana = &summaries[0];
        assert_eq!(mahavana.center_label, "Dhamma Mahavana");
        assert_eq!(mahavana.total_days, 31);
        assert_eq!(mahavana.retreat_count, 4);
        assert_eq!(
            mahavana.breakdown,
            vec!["10-day: 2 Sat", "3-day: 1 Served", "Satipatthana: 1 Sat"]
        );
        assert_eq!(summaries[1].center_label, "Dhamma Dipa");
        assert_eq!(summaries[1].total_days, 10);
    }

    #[test]
    fn test_breakdown_counts_sum_to_retreat_count() {
        let retreats = vec![
            retreat("10-day", 10, KUNJA, RetreatKind::Sat),
            retreat("10-day", 10, KUNJA, RetreatKind::Served),
            retreat("3-day", 3, KUNJA, RetreatKind::Served),
            retreat("3-day", 3, KUNJA, RetreatKind::Sat),
            retreat("10-day", 5, KUNJA, RetreatKind::Sat),
        ];
        let summaries = LocationAggregator::aggregate(&retreats, &directory());
        assert_eq!(summaries.len(), 1);

        let summary = &summaries[0];
        let mut sorted = summary.breakdown.clone();
        sorted.sort();
        assert_eq!(summary.breakdown, sorted);

        let counted: u32 = summary
            .breakdown
            .iter()
            .map(|line| {
                let after_colon = line.split(": ").nth(1).unwrap();
                after_colon.split(' ').next().unwrap().parse::<u32>().unwrap()
            })
            .sum();
        assert_eq!(counted, summary.retreat_count);
        assert_eq!(summary.retreat_count, 5);
    }

    #[test]
    fn test_unknown_center_falls_back_to_coordinates() {
        let retreats = vec![retreat("10-day", 10, KUNJA, RetreatKind::Sat)];
        let summaries = LocationAggregator::aggregate(&retreats, &directory());
        assert_eq!(summaries[0].center_label, "46.5511, -122.6824");
    }

    #[test]
    fn test_nearly_equal_coordinates_share_a_location() {
        let retreats = vec![
            retreat("10-day", 10, (34.13290739801991, -116.16958440882196), RetreatKind::Sat),
            retreat("10-day", 10, (34.132907398019915, -116.169584408822), RetreatKind::Sat),
        ];
        let summaries = LocationAggregator::aggregate(&retreats, &directory());
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].breakdown, vec!["10-day: 2 Sat"]);
        assert_eq!(summaries[0].lat, 34.13290739801991);
    }

    #[test]
    fn test_tied_locations_order_by_coordinate() {
        let retreats: Vec<RetreatEvent> = (0..8)
            .map(|i| retreat("10-day", 10, (40.0 - f64::from(i), 10.0 + f64::from(i)), RetreatKind::Sat))
            .collect();
        let same_name = CenterDirectory::new(
            &retreats
                .iter()
                .map(|r| RetreatCenter {
                    name: "Same".into(),
                    lat: r.lat,
                    lon: r.lon,
                })
                .collect::<Vec<_>>(),
        );

        let first = LocationAggregator::aggregate(&retreats, &same_name);
        let lats: Vec<f64> = first.iter().map(|s| s.lat).collect();
        assert_eq!(lats, vec![33.0, 34.0, 35.0, 36.0, 37.0, 38.0, 39.0, 40.0]);
        for _ in 0..20 {
            assert_eq!(LocationAggregator::aggregate(&retreats, &same_name), first);
        }
    }

    #[test]
    fn test_total_days_do_not_overflow() {
        let retreats = vec![
            retreat("Long", u32::MAX, KUNJA, RetreatKind::Served),
            retreat("Long", u32::MAX, KUNJA, RetreatKind::Served),
        ];
        let summaries = LocationAggregator::aggregate(&retreats, &directory());
        assert_eq!(summaries[0].total_days, 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_empty_retreats() {
        assert!(LocationAggregator::aggregate(&[], &directory()).is_empty());
    }
}

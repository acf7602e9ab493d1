use crate::types::{IncidentRecord, OffenseStat, ReportData, RouteStat};
use std::collections::HashMap;

const TOP_GROUPS: usize = 5;

/// Reduce raw incident rows into the aggregates the report is built from.
///
/// Pure and deterministic: the same input slice always yields the same
/// `ReportData`. Groups keep first-encounter order, so the stable sort below
/// breaks count ties in favor of earlier-seen routes and offenses.
pub fn aggregate(records: &[IncidentRecord]) -> ReportData {
    let mut route_index: HashMap<&str, usize> = HashMap::new();
    let mut routes: Vec<RouteStat> = Vec::new();
    let mut offense_index: HashMap<&str, usize> = HashMap::new();
    let mut offenses: Vec<OffenseStat> = Vec::new();

    for r in records {
        match route_index.get(r.route_id.as_str()) {
            Some(&i) => {
                routes[i].count += 1;
                routes[i].fines += r.fine;
            }
            None => {
                route_index.insert(r.route_id.as_str(), routes.len());
                routes.push(RouteStat {
                    route: r.route_id.clone(),
                    count: 1,
                    fines: r.fine,
                });
            }
        }
        match offense_index.get(r.offense.as_str()) {
            Some(&i) => offenses[i].count += 1,
            None => {
                offense_index.insert(r.offense.as_str(), offenses.len());
                offenses.push(OffenseStat {
                    offense: r.offense.clone(),
                    count: 1,
                });
            }
        }
    }

    let offense_counts: Vec<(String, u64)> = offenses
        .iter()
        .map(|o| (o.offense.clone(), o.count))
        .collect();

    let mut top_routes = routes;
    top_routes.sort_by(|a, b| b.count.cmp(&a.count));
    top_routes.truncate(TOP_GROUPS);

    let mut top_offenses = offenses;
    top_offenses.sort_by(|a, b| b.count.cmp(&a.count));
    top_offenses.truncate(TOP_GROUPS);

    let total_fines: f64 = records.iter().map(|r| r.fine).sum();

    ReportData {
        total_incidents: records.len() as u64,
        total_fines,
        top_routes,
        top_offenses,
        offense_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(route: &str, fine: f64, offense: &str) -> IncidentRecord {
        IncidentRecord {
            route_id: route.to_string(),
            bus_no: "-".to_string(),
            start_time: "-".to_string(),
            offense: offense.to_string(),
            fine,
            fine_display: format!("{}", fine),
        }
    }

    #[test]
    fn totals_match_a_known_dataset() {
        let rows = vec![
            record("5", 100.0, "Speeding"),
            record("5", 50.0, "Speeding"),
            record("3", 0.0, "Overcrowding"),
        ];
        let data = aggregate(&rows);
        assert_eq!(data.total_incidents, 3);
        assert_eq!(data.total_fines, 150.0);
        assert_eq!(data.top_routes[0].route, "5");
        assert_eq!(data.top_routes[0].count, 2);
        assert_eq!(data.top_routes[0].fines, 150.0);
        assert_eq!(data.top_offenses[0].offense, "Speeding");
        assert_eq!(data.top_offenses[0].count, 2);
    }

    #[test]
    fn empty_input_yields_zero_aggregates() {
        let data = aggregate(&[]);
        assert_eq!(data.total_incidents, 0);
        assert_eq!(data.total_fines, 0.0);
        assert!(data.top_routes.is_empty());
        assert!(data.top_offenses.is_empty());
        assert_eq!(data.total_offense_count(), 0);
    }

    #[test]
    fn route_counts_sum_to_row_count() {
        let rows: Vec<_> = (0..37)
            .map(|i| record(&format!("{}", i % 4), 10.0, "Speeding"))
            .collect();
        let data = aggregate(&rows);
        let sum: u64 = data.top_routes.iter().map(|r| r.count).sum();
        // 4 distinct routes, all within the top 5.
        assert_eq!(sum, 37);
    }

    #[test]
    fn top_lists_are_truncated_and_sorted() {
        let rows: Vec<_> = (0..8usize)
            .flat_map(|i| {
                let reps = 8 - i;
                std::iter::repeat_with(move || {
                    record(&format!("r{}", i), 0.0, &format!("o{}", i))
                })
                .take(reps)
            })
            .collect();
        let data = aggregate(&rows);
        assert_eq!(data.top_routes.len(), 5);
        assert_eq!(data.top_offenses.len(), 5);
        for pair in data.top_routes.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }
        assert_eq!(data.top_routes[0].route, "r0");
        // The full mapping keeps every category.
        assert_eq!(data.offense_counts.len(), 8);
    }

    #[test]
    fn ties_break_by_first_seen_order() {
        let rows = vec![
            record("9", 0.0, "Obstruction"),
            record("2", 0.0, "Speeding"),
            record("9", 0.0, "Speeding"),
            record("2", 0.0, "Obstruction"),
        ];
        let data = aggregate(&rows);
        assert_eq!(data.top_routes[0].route, "9");
        assert_eq!(data.top_routes[1].route, "2");
        assert_eq!(data.top_offenses[0].offense, "Obstruction");
        assert_eq!(data.top_offenses[1].offense, "Speeding");
    }

    #[test]
    fn aggregation_is_deterministic() {
        let rows = vec![
            record("5", 100.0, "Speeding"),
            record("3", 25.0, "Overcrowding"),
            record("5", 75.0, "No permit"),
        ];
        assert_eq!(aggregate(&rows), aggregate(&rows));
    }
}

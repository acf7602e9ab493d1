use crate::types::{
    AnalysisSummary, ChartBlock, KpiBlock, OffensePreviewRow, ReportData, RoutePreviewRow, Series,
};
use crate::util;
use serde::Serialize;
use std::error::Error;
use tabled::{settings::Style, Table, Tabled};

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// JSON sidecar payload: KPI block plus label/value series for each chart.
pub fn build_summary(data: &ReportData) -> AnalysisSummary {
    AnalysisSummary {
        kpi: KpiBlock {
            incidents: data.total_incidents,
            fines: data.total_fines,
        },
        charts: ChartBlock {
            routes: Series {
                labels: data
                    .top_routes
                    .iter()
                    .map(|r| format!("Route {}", r.route))
                    .collect(),
                data: data.top_routes.iter().map(|r| r.count).collect(),
            },
            offenses: Series {
                labels: data.top_offenses.iter().map(|o| o.offense.clone()).collect(),
                data: data.top_offenses.iter().map(|o| o.count).collect(),
            },
        },
    }
}

pub fn route_preview(data: &ReportData) -> Vec<RoutePreviewRow> {
    data.top_routes
        .iter()
        .map(|r| RoutePreviewRow {
            route: r.route.clone(),
            count: r.count,
            fines: util::format_amount(r.fines),
        })
        .collect()
}

pub fn offense_preview(data: &ReportData) -> Vec<OffensePreviewRow> {
    let total = data.total_offense_count().max(1);
    data.top_offenses
        .iter()
        .map(|o| OffensePreviewRow {
            offense: o.offense.clone(),
            count: o.count,
            share: format!("{}%", (o.count as f64 / total as f64 * 100.0).round()),
        })
        .collect()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate;
    use crate::types::IncidentRecord;

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
    fn summary_mirrors_the_chart_series() {
        let rows = vec![
            record("5", 100.0, "Speeding"),
            record("5", 50.0, "Speeding"),
            record("3", 0.0, "Overcrowding"),
        ];
        let summary = build_summary(&aggregate(&rows));
        assert_eq!(summary.kpi.incidents, 3);
        assert_eq!(summary.kpi.fines, 150.0);
        assert_eq!(summary.charts.routes.labels, vec!["Route 5", "Route 3"]);
        assert_eq!(summary.charts.routes.data, vec![2, 1]);
        assert_eq!(summary.charts.offenses.labels[0], "Speeding");
    }

    #[test]
    fn offense_preview_shows_whole_shares() {
        let rows = vec![
            record("1", 0.0, "Speeding"),
            record("1", 0.0, "Speeding"),
            record("2", 0.0, "Overcrowding"),
        ];
        let preview = offense_preview(&aggregate(&rows));
        assert_eq!(preview[0].share, "67%");
        assert_eq!(preview[1].share, "33%");
    }

    #[test]
    fn empty_previews_do_not_divide_by_zero() {
        let preview = offense_preview(&aggregate(&[]));
        assert!(preview.is_empty());
    }
}

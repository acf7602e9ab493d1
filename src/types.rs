use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One row as it appears in the source CSV export. Every field is optional;
/// downstream code substitutes documented defaults instead of failing.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Route Id")]
    pub route_id: Option<String>,
    #[serde(rename = "Fine (LKR)")]
    pub fine: Option<String>,
    #[serde(rename = "Offenses")]
    pub offenses: Option<String>,
    #[serde(rename = "Bus No.")]
    pub bus_no: Option<String>,
    #[serde(rename = "Expected Start Time")]
    pub start_time: Option<String>,
}

/// A cleaned incident row. Immutable once produced by the loader.
///
/// `fine` is the parsed amount used for aggregation; `fine_display` keeps the
/// source cell text so the detail table prints what the spreadsheet said.
#[derive(Debug, Clone)]
pub struct IncidentRecord {
    pub route_id: String,
    pub bus_no: String,
    pub start_time: String,
    pub offense: String,
    pub fine: f64,
    pub fine_display: String,
}

/// Per-route aggregate: incident count and cumulative fines.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStat {
    pub route: String,
    pub count: u64,
    pub fines: f64,
}

/// Per-offense-category aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct OffenseStat {
    pub offense: String,
    pub count: u64,
}

/// Everything the report composer needs, computed once per generation run.
///
/// `top_routes` and `top_offenses` hold at most five entries, ordered by
/// count descending with first-seen order breaking ties. `offense_counts` is
/// the full category mapping (first-seen order) because pie percentages are
/// shares of the whole dataset, not of the top five.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportData {
    pub total_incidents: u64,
    pub total_fines: f64,
    pub top_routes: Vec<RouteStat>,
    pub top_offenses: Vec<OffenseStat>,
    pub offense_counts: Vec<(String, u64)>,
}

impl ReportData {
    /// Sum over every offense category, i.e. the pie denominator.
    pub fn total_offense_count(&self) -> u64 {
        self.offense_counts.iter().map(|(_, c)| *c).sum()
    }
}

// ---- Analysis summary sidecar (JSON) ----

#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub kpi: KpiBlock,
    pub charts: ChartBlock,
}

#[derive(Debug, Serialize)]
pub struct KpiBlock {
    pub incidents: u64,
    pub fines: f64,
}

#[derive(Debug, Serialize)]
pub struct ChartBlock {
    pub routes: Series,
    pub offenses: Series,
}

/// Label/value pairs in chart order.
#[derive(Debug, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub data: Vec<u64>,
}

// ---- Terminal preview rows ----

#[derive(Debug, Clone, Tabled)]
pub struct RoutePreviewRow {
    #[tabled(rename = "Route")]
    pub route: String,
    #[tabled(rename = "Incidents")]
    pub count: u64,
    #[tabled(rename = "TotalFines")]
    pub fines: String,
}

#[derive(Debug, Clone, Tabled)]
pub struct OffensePreviewRow {
    #[tabled(rename = "Offense")]
    pub offense: String,
    #[tabled(rename = "Incidents")]
    pub count: u64,
    #[tabled(rename = "Share")]
    pub share: String,
}

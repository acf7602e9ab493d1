use crate::types::{IncidentRecord, RawRow};
use crate::util::{field_or, parse_fine};
use csv::ReaderBuilder;
use std::error::Error;
use std::io::Read;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
    pub headers: Vec<String>,
}

/// Load incident rows from a CSV file on disk.
pub fn load_records(path: &str) -> Result<(Vec<IncidentRecord>, LoadReport), Box<dyn Error>> {
    let file = std::fs::File::open(path)?;
    read_records(file)
}

/// Read incident rows from any CSV source.
///
/// Individual cells never fail: missing or blank fields degrade to their
/// documented defaults (`"Unknown"` route, `"Unspecified"` offense, zero
/// fine). Only rows the CSV reader cannot structurally decode are skipped,
/// and those are counted in the `LoadReport`.
pub fn read_records<R: Read>(source: R) -> Result<(Vec<IncidentRecord>, LoadReport), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(source);
    let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();

    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records: Vec<IncidentRecord> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };

        let fine = parse_fine(row.fine.as_deref());
        records.push(IncidentRecord {
            route_id: field_or(row.route_id.as_deref(), "Unknown"),
            bus_no: field_or(row.bus_no.as_deref(), "-"),
            start_time: field_or(row.start_time.as_deref(), "-"),
            offense: field_or(row.offenses.as_deref(), "Unspecified"),
            fine,
            fine_display: field_or(row.fine.as_deref(), "0"),
        });
    }

    let report = LoadReport {
        total_rows,
        parse_errors,
        headers,
    };
    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Bus No.,Route Id,Expected Start Time,Offenses,Fine (LKR)
NB-1234,5,06:30,Speeding,100
NB-9876,5,07:15,Speeding,50
ND-4455,3,08:00,Overcrowding,0
";

    #[test]
    fn reads_all_rows_with_headers() {
        let (records, report) = read_records(CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.parse_errors, 0);
        assert_eq!(
            report.headers,
            vec!["Bus No.", "Route Id", "Expected Start Time", "Offenses", "Fine (LKR)"]
        );
        assert_eq!(records[0].route_id, "5");
        assert_eq!(records[0].fine, 100.0);
        assert_eq!(records[2].offense, "Overcrowding");
    }

    #[test]
    fn missing_fields_degrade_to_defaults() {
        let csv = "\
Bus No.,Route Id,Expected Start Time,Offenses,Fine (LKR)
,,,,
NB-1,8,,Signal violation,not a number
";
        let (records, report) = read_records(csv.as_bytes()).unwrap();
        assert_eq!(report.parse_errors, 0);
        assert_eq!(records[0].route_id, "Unknown");
        assert_eq!(records[0].offense, "Unspecified");
        assert_eq!(records[0].bus_no, "-");
        assert_eq!(records[0].fine, 0.0);
        assert_eq!(records[0].fine_display, "0");
        assert_eq!(records[1].fine, 0.0);
        assert_eq!(records[1].fine_display, "not a number");
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let csv = "\
Bus No.,Route Id,Depot,Offenses,Fine (LKR)
NB-1,2,Matara,Speeding,75
";
        let (records, _) = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].start_time, "-");
        assert_eq!(records[0].fine, 75.0);
    }
}

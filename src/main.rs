// Entry point and high-level CLI flow.
//
// - Option [1] loads the incident CSV, printing diagnostics.
// - Option [2] runs the analysis, previews the top tables, writes the JSON
//   summary, and generates the PDF report.
// - After generating a report, the user can choose to go back to the
//   selection menu or exit.
mod analysis;
mod canvas;
mod compose;
mod emit;
mod fonts;
mod geometry;
mod loader;
mod output;
mod types;
mod util;

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use types::IncidentRecord;

const DEFAULT_DATA_PATH: &str = "bus_route_incidents.csv";
const LOGO_PATH: &str = "assets/logo.jpg";
const REPORTS_DIR: &str = "reports";
const SUMMARY_PATH: &str = "analysis_summary.json";

// Simple in-memory app state so we only load the CSV once but can generate
// reports multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Vec<IncidentRecord>>,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the menu after generating a report.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the incident CSV.
///
/// On success we store the rows in `APP_STATE` and print what the loader
/// saw, including the column headers for a quick sanity check of the export.
fn handle_load(path: &str) {
    match loader::load_records(path) {
        Ok((records, report)) => {
            println!(
                "Processing dataset... ({} rows loaded)",
                util::format_count(report.total_rows as u64)
            );
            if report.parse_errors > 0 {
                println!(
                    "Note: {} rows skipped due to malformed CSV lines.",
                    util::format_count(report.parse_errors as u64)
                );
            }
            println!("Columns: {}", report.headers.join(", "));
            println!();
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some(records);
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: analyze the loaded rows and generate the PDF report.
fn handle_generate_report() {
    let records = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some(records) = records else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };

    println!(
        "Analyzing {} incidents...\n",
        util::format_count(records.len() as u64)
    );
    let data = analysis::aggregate(&records);

    println!("Top Routes by Incident Count\n");
    output::preview_table_rows(&output::route_preview(&data), 5);
    println!("Top Offense Categories\n");
    output::preview_table_rows(&output::offense_preview(&data), 5);

    if let Err(e) = output::write_json(SUMMARY_PATH, &output::build_summary(&data)) {
        eprintln!("Write error: {}", e);
    } else {
        println!("Summary stats exported to {}\n", SUMMARY_PATH);
    }

    match emit::generate_report(&records, Path::new(REPORTS_DIR), Some(Path::new(LOGO_PATH))) {
        Ok(path) => println!("Analysis report saved to {}\n", path.display()),
        Err(e) => eprintln!("Failed to generate analysis report: {}\n", e),
    }
}

fn main() {
    env_logger::init();
    let data_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
    loop {
        println!("Bus Route Incident Reporting");
        println!("[1] Load incident data");
        println!("[2] Generate analysis report\n");
        match read_choice().as_str() {
            "1" => {
                handle_load(&data_path);
            }
            "2" => {
                println!();
                handle_generate_report();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}

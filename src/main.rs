// Entry point and high-level interactive flow.
//
// - Option [1] loads a delivery export (xlsx/xls/ods/csv) and builds the
//   per-island dataset. A failed load leaves the previous dataset in place.
// - Option [2] sets the island and record filter used by the reports.
// - Option [3] prints the dashboard, analytical, performance and financial
//   reports for the current dataset and filter.
mod aggregate;
mod config;
mod dates;
mod error;
mod filter;
mod finance;
mod geo;
mod loader;
mod output;
mod reports;
mod status;
mod types;
mod util;

use config::SETTINGS;
use filter::{Filter, FilterKind, FilterSpec};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use types::ProcessedDataset;

// The current upload and filter. A new upload replaces the dataset wholesale;
// reports only ever read it.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        data: None,
        filter: Filter::default(),
        filter_spec: FilterSpec::default(),
    })
});

struct AppState {
    data: Option<Arc<ProcessedDataset>>,
    filter: Filter,
    filter_spec: FilterSpec,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Print `prompt` and read one trimmed line from stdin.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    read_line("Enter choice: ")
}

/// Ask the user whether to go back to the menu after the reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_line("Back to Report Selection (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: read the file and build the dataset.
fn handle_load() {
    let default = SETTINGS.default_input.display().to_string();
    let answer = read_line(&format!("File path [{}]: ", default));
    let path = if answer.is_empty() { PathBuf::from(default) } else { PathBuf::from(answer) };

    let matrix = match loader::load_matrix(&path) {
        Ok(m) => m,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "load failed");
            eprintln!("Failed to load file: {}\n", e);
            return;
        }
    };
    let (dataset, build_report) = aggregate::build(&matrix);

    println!(
        "Processing dataset... ({} rows read, {} parcels in scope)",
        util::format_int(build_report.total_rows),
        util::format_int(dataset.all.total)
    );
    println!(
        "Luzon: {} | Visayas: {} | Mindanao: {}\n",
        util::format_int(dataset.luzon.total),
        util::format_int(dataset.visayas.total),
        util::format_int(dataset.mindanao.total)
    );
    info!(file = %path.display(), parcels = dataset.all.total, "dataset installed");
    state().data = Some(Arc::new(dataset));
}

/// Build the filter for a "Filter by" menu choice, asking for the value with
/// `ask`. Returns `None` for a choice that is not on the menu.
fn spec_for_choice<F>(choice: &str, mut ask: F) -> Option<FilterSpec>
where
    F: FnMut(&str) -> String,
{
    let spec = match choice {
        "1" => FilterSpec::single(FilterKind::All, ""),
        "2" => FilterSpec::single(FilterKind::Province, &ask("Province name: ")),
        "3" => FilterSpec::single(FilterKind::Month, &ask("Month (01-12): ")),
        "4" => FilterSpec::single(FilterKind::Year, &ask("Year: ")),
        "5" => FilterSpec::single(FilterKind::Status, &ask("Status (e.g. DELIVERED): ")),
        "6" => FilterSpec {
            date_from: Some(ask("Date from (YYYY-MM-DD): ")),
            date_to: Some(ask("Date to (YYYY-MM-DD): ")),
            ..Default::default()
        },
        _ => return None,
    };
    Some(spec)
}

fn prompt_filter_spec() -> Option<FilterSpec> {
    let island = read_line("Island (all/luzon/visayas/mindanao) [all]: ");
    let island = if island.is_empty() { "all".to_string() } else { island };

    println!("Filter by:");
    println!("[1] Nothing");
    println!("[2] Province");
    println!("[3] Month");
    println!("[4] Year");
    println!("[5] Status");
    println!("[6] Date range");
    spec_for_choice(&read_choice(), read_line).map(|spec| spec.with_island(&island))
}

/// Handle option [2]: set the filter. An invalid filter or menu choice is
/// rejected and the previous filter stays active.
fn handle_filter() {
    let Some(spec) = prompt_filter_spec() else {
        println!("Invalid choice. Please enter a number from 1 to 6.\n");
        return;
    };
    match spec.validate() {
        Ok(filter) => {
            println!("Filter applied: {}\n", filter.scope.label());
            let mut st = state();
            st.filter = filter;
            st.filter_spec = spec;
        }
        Err(e) => {
            warn!(error = %e, "filter rejected");
            println!("Invalid filter: {}\n", e);
        }
    }
}

/// Handle option [3]: all four reports for the current dataset and filter.
fn handle_generate_reports() {
    let (data, filter, spec) = {
        let st = state();
        (st.data.clone(), st.filter.clone(), st.filter_spec.clone())
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load a file first (option 1).\n");
        return;
    };

    let rows = SETTINGS.preview_rows;
    println!("Generating reports... (filter: {:?})\n", spec);

    output::print_dashboard(&reports::dashboard(&data, &filter), rows);
    output::print_analytical(&reports::analytical(&data, &filter), rows);
    output::print_performance(&reports::performance(&data, &filter), rows);

    let summary = reports::financial(&data, &filter);
    output::print_financial(&summary);
    output::print_json("Financial Summary", &summary);
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&SETTINGS.log_filter))
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();
    loop {
        println!("Parcel Delivery Reports");
        println!("[1] Load the file");
        println!("[2] Set filter");
        println!("[3] Generate Reports");
        println!("[4] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(),
            "2" => handle_filter(),
            "3" => {
                println!();
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "4" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1, 2, 3 or 4.\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_menu_rejects_unlisted_choices() {
        assert_eq!(spec_for_choice("7", |_| String::new()), None);
        assert_eq!(spec_for_choice("", |_| String::new()), None);
        assert_eq!(spec_for_choice("1", |_| String::new()), Some(FilterSpec::default()));
    }

    #[test]
    fn filter_menu_asks_for_the_chosen_value() {
        let spec = spec_for_choice("3", |_| "04".to_string());
        assert_eq!(spec, Some(FilterSpec::single(FilterKind::Month, "04")));

        let mut prompts = Vec::new();
        let spec = spec_for_choice("6", |p| {
            prompts.push(p.to_string());
            "2024-01-01".to_string()
        });
        assert_eq!(prompts.len(), 2);
        assert_eq!(spec.and_then(|s| s.date_to), Some("2024-01-01".to_string()));
    }
}

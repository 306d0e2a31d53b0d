// Process-wide settings read once from the environment.
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_INPUT: &str = "parcels.xlsx";
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// File offered by the load prompt when the user just presses Enter.
    pub default_input: PathBuf,
    /// `tracing` filter directive, e.g. `info` or `parcel_report=debug`.
    pub log_filter: String,
    /// Upper bound on rows printed per console table.
    pub preview_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_input: PathBuf::from(DEFAULT_INPUT),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Settings {
            default_input: non_empty("PARCEL_REPORT_INPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.default_input),
            log_filter: non_empty("PARCEL_REPORT_LOG").unwrap_or(defaults.log_filter),
            preview_rows: non_empty("PARCEL_REPORT_PREVIEW_ROWS")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.preview_rows),
        }
    }
}

pub static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

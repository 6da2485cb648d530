use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Rishui";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Claude model used for requirements extraction (large output budget).
pub const EXTRACTION_MODEL: &str = "claude-sonnet-4-20250514";
/// Claude model used for report narrative generation.
pub const NARRATIVE_MODEL: &str = "claude-3-5-sonnet-20240620";

pub const EXTRACTION_MAX_TOKENS: u32 = 10_000;
pub const NARRATIVE_MAX_TOKENS: u32 = 3_000;

/// Claude Sonnet pricing, USD per million tokens.
pub const INPUT_COST_PER_MTOK: f64 = 3.0;
pub const OUTPUT_COST_PER_MTOK: f64 = 15.0;

/// Get the data directory.
/// Project-relative ./data by default, overridable with RISHUI_DATA_DIR.
pub fn data_dir() -> PathBuf {
    std::env::var("RISHUI_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Get the path of the processed requirements database.
pub fn database_path() -> PathBuf {
    data_dir().join("processed").join("requirements.json")
}

/// Get the directory where survey submissions are archived.
pub fn responses_dir() -> PathBuf {
    data_dir().join("responses")
}

/// Get the directory for diagnostic dumps (failed model replies).
/// Overridable with RISHUI_DEBUG_DIR.
pub fn debug_dir() -> PathBuf {
    std::env::var("RISHUI_DEBUG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir().join("debug"))
}

/// Get the API bind address, overridable with RISHUI_BIND.
pub fn bind_addr() -> String {
    std::env::var("RISHUI_BIND").unwrap_or_else(|_| "127.0.0.1:8000".to_string())
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "rishui=info,tower_http=warn"
}

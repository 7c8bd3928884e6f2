use crate::status::Status;
use thiserror::Error;

/// Ingestion failures. Every variant aborts the load; the session keeps
/// whatever dataset it had before.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("sheet '{sheet}' not found (available: {})", .available.join(", "))]
    SheetNotFound { sheet: String, available: Vec<String> },
    #[error("sheet '{sheet}' has no header row")]
    EmptySheet { sheet: String },
    #[error("missing required column(s): {}", .columns.join(", "))]
    MissingColumn { columns: Vec<String> },
}

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("KPI '{kpi}' is not listed under status {status}")]
    InvalidSelection { kpi: String, status: Status },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("load #{ticket} was superseded or cancelled")]
    StaleLoad { ticket: u64 },
    #[error(transparent)]
    Load(#[from] LoadError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown status '{0}' (expected red, yellow, green or unknown)")]
pub struct ParseStatusError(pub String);

/// Top-level error for the binary.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

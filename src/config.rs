// Command-line flags and the optional JSON config file.
//
// The file supplies sheet name, column headers and period labels; flags given
// on the command line win over the file.
use crate::error::ConfigError;
use crate::status::Status;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Traffic-light KPI dashboard comparing two reporting periods", long_about = None)]
pub struct Cli {
    /// Workbook to load at startup (.xlsx, .xls, .ods or .csv).
    pub file: Option<PathBuf>,
    /// Sheet to read from the workbook.
    #[arg(long)]
    pub sheet: Option<String>,
    /// JSON file with sheet, column and period-label overrides.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Initial status filter (red, yellow, green, unknown).
    #[arg(long)]
    pub status: Option<Status>,
    /// Initial KPI. One not listed under the chosen status is reported and ignored.
    #[arg(long)]
    pub kpi: Option<String>,
    /// Print a JSON snapshot of the dashboard and exit.
    #[arg(long)]
    pub json: bool,
}

/// Header names for the nine fields of a KPI row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub perspective: String,
    pub kpi: String,
    pub owner: String,
    pub target_period1: String,
    pub actual_period1: String,
    pub achv_period1: String,
    pub target_period2: String,
    pub actual_period2: String,
    pub achv_period2: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            perspective: "Perspective".to_string(),
            kpi: "KPI".to_string(),
            owner: "PIC".to_string(),
            target_period1: "Target Jan".to_string(),
            actual_period1: "Actual Jan".to_string(),
            achv_period1: "Achv Jan".to_string(),
            target_period2: "Target Feb".to_string(),
            actual_period2: "Actual Feb".to_string(),
            achv_period2: "Achv Feb".to_string(),
        }
    }
}

impl ColumnMap {
    /// Header names in the fixed field order used by the loader.
    pub fn headers(&self) -> [&str; 9] {
        [
            self.perspective.as_str(),
            self.kpi.as_str(),
            self.owner.as_str(),
            self.target_period1.as_str(),
            self.actual_period1.as_str(),
            self.achv_period1.as_str(),
            self.target_period2.as_str(),
            self.actual_period2.as_str(),
            self.achv_period2.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub sheet: String,
    pub columns: ColumnMap,
    pub period_labels: [String; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sheet: "Dulu".to_string(),
            columns: ColumnMap::default(),
            period_labels: ["January".to_string(), "February".to_string()],
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text, path)
    }
}

impl Cli {
    /// Defaults, then the config file, then individual flags.
    pub fn dashboard_config(&self) -> Result<DashboardConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(sheet) = &self.sheet {
            config.sheet = sheet.clone();
        }
        Ok(config)
    }
}

// Application state for one user: the active dataset and the selection on it.
//
// Loads are ticketed. Only the most recent ticket may install its result, so
// a cancelled or superseded parse is dropped without touching what is shown.
use crate::comparison::view_for_selection;
use crate::config::DashboardConfig;
use crate::error::{LoadError, SelectionError, SessionError};
use crate::loader::{self, LoadReport, LoadedWorkbook};
use crate::selection::SelectionState;
use crate::status::Status;
use crate::summary::{summarize_classified, Summary};
use crate::types::{ClassifiedKpi, ComparisonView};
use chrono::{DateTime, Local};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: String,
    pub loaded_at: DateTime<Local>,
    pub report: LoadReport,
    pub records: Vec<ClassifiedKpi>,
    pub summary: Summary,
}

impl Dataset {
    pub fn new(loaded: LoadedWorkbook) -> Self {
        let records: Vec<ClassifiedKpi> = loaded.records.into_iter().map(ClassifiedKpi::new).collect();
        let summary = summarize_classified(&records);
        Dataset {
            source: loaded.source,
            loaded_at: Local::now(),
            report: loaded.report,
            records,
            summary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Default)]
pub struct Session {
    dataset: Option<Dataset>,
    selection: SelectionState,
    issued: u64,
    pending: Option<u64>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Start a load. Any ticket handed out earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        self.pending = Some(self.issued);
        LoadTicket(self.issued)
    }

    pub fn cancel_load(&mut self) {
        if let Some(ticket) = self.pending.take() {
            info!(ticket, "load cancelled");
        }
    }

    /// Install a finished load. On success the dataset is replaced and the
    /// selection restarts; on any error the previous dataset stays.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<LoadedWorkbook, LoadError>,
    ) -> Result<&Dataset, SessionError> {
        if self.pending != Some(ticket.0) {
            warn!(ticket = ticket.0, "discarding result of a stale load");
            return Err(SessionError::StaleLoad { ticket: ticket.0 });
        }
        self.pending = None;
        let dataset = Dataset::new(result?);
        self.selection = SelectionState::initial(&dataset.records);
        Ok(&*self.dataset.insert(dataset))
    }

    pub fn load_path(&mut self, path: &Path, config: &DashboardConfig) -> Result<&Dataset, SessionError> {
        let ticket = self.begin_load();
        let result = loader::load_workbook_path(path, config);
        self.finish_load(ticket, result)
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn records(&self) -> &[ClassifiedKpi] {
        self.dataset.as_ref().map(|d| d.records.as_slice()).unwrap_or(&[])
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.dataset.as_ref().map(|d| &d.summary)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn kpi_choices(&self) -> Vec<&str> {
        self.selection.kpi_choices(self.records())
    }

    pub fn select_status(&mut self, status: Status) {
        let records = self.dataset.as_ref().map(|d| d.records.as_slice()).unwrap_or(&[]);
        self.selection.select_status(records, status);
    }

    pub fn select_kpi(&mut self, name: &str) -> Result<(), SelectionError> {
        let records = self.dataset.as_ref().map(|d| d.records.as_slice()).unwrap_or(&[]);
        self.selection.select_kpi(records, name)
    }

    pub fn comparison(&self) -> Option<ComparisonView> {
        view_for_selection(self.records(), &self.selection)
    }
}

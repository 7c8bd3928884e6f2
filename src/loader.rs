use crate::config::{ColumnMap, DashboardConfig};
use crate::error::LoadError;
use crate::types::{KpiRecord, RawCell};
use crate::util::{number_to_text, parse_f64_safe};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// Perspective used when the cell is blank, so every row lands in a group.
pub const UNSPECIFIED_PERSPECTIVE: &str = "Unspecified";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub blank_rows: usize,
    pub malformed_cells: usize,
    /// Rows with data but no KPI name; skipped since nothing can select them.
    pub unnamed_rows: usize,
    /// KPI names seen more than once, in first-seen order.
    pub duplicate_kpis: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LoadedWorkbook {
    pub source: String,
    pub records: Vec<KpiRecord>,
    pub report: LoadReport,
}

struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<RawCell>>,
}

/// Header position of each field, in `ColumnMap::headers` order.
struct ColumnIndex([usize; 9]);

impl ColumnIndex {
    fn resolve(headers: &[String], columns: &ColumnMap) -> Result<Self, LoadError> {
        let mut positions = [0usize; 9];
        let mut missing = Vec::new();
        for (slot, wanted) in columns.headers().iter().enumerate() {
            match headers.iter().position(|h| h.trim() == wanted.trim()) {
                Some(pos) => positions[slot] = pos,
                None => missing.push(wanted.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(LoadError::MissingColumn { columns: missing });
        }
        Ok(ColumnIndex(positions))
    }
}

pub fn load_workbook_path(path: &Path, config: &DashboardConfig) -> Result<LoadedWorkbook, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    load_workbook_bytes(bytes, &source, config)
}

/// Parse an uploaded workbook. `source_name` picks the format: `.csv` goes
/// through the CSV reader, anything else through calamine.
pub fn load_workbook_bytes(
    bytes: Vec<u8>,
    source_name: &str,
    config: &DashboardConfig,
) -> Result<LoadedWorkbook, LoadError> {
    let table = if is_csv(source_name) {
        read_csv_table(&bytes)?
    } else {
        read_sheet_table(bytes, &config.sheet)?
    };
    let (records, report) = build_records(table, &config.columns)?;
    info!(
        source = source_name,
        rows = report.loaded_rows,
        blank = report.blank_rows,
        malformed = report.malformed_cells,
        "workbook loaded"
    );
    Ok(LoadedWorkbook {
        source: source_name.to_string(),
        records,
        report,
    })
}

fn is_csv(source_name: &str) -> bool {
    Path::new(source_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

fn read_sheet_table(bytes: Vec<u8>, sheet: &str) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let available = workbook.sheet_names().to_vec();
    if !available.iter().any(|name| name == sheet) {
        return Err(LoadError::SheetNotFound {
            sheet: sheet.to_string(),
            available,
        });
    }
    let range = workbook.worksheet_range(sheet)?;
    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header) => header.iter().map(header_text).collect(),
        None => {
            return Err(LoadError::EmptySheet {
                sheet: sheet.to_string(),
            })
        }
    };
    let rows = rows.map(|row| row.iter().map(raw_cell).collect()).collect();
    Ok(RawTable { headers, rows })
}

fn read_csv_table(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::EmptySheet {
            sheet: "csv".to_string(),
        });
    }
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(RawTable { headers, rows })
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(v) => number_to_text(*v),
        Data::Int(v) => v.to_string(),
        Data::Empty => String::new(),
        other => format!("{:?}", other),
    }
}

fn raw_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::Float(v) => RawCell::Number(*v),
        Data::Int(v) => RawCell::Number(*v as f64),
        Data::String(s) if s.trim().is_empty() => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        other => RawCell::Unreadable(format!("{:?}", other)),
    }
}

fn text_cell(cell: &RawCell) -> String {
    match cell {
        RawCell::Empty => String::new(),
        RawCell::Number(v) => number_to_text(*v),
        RawCell::Text(s) | RawCell::Unreadable(s) => s.trim().to_string(),
    }
}

/// Unparseable numeric cells become missing and are counted, never fatal.
fn numeric_cell(cell: &RawCell, source_row: usize, column: &str, malformed: &mut usize) -> Option<f64> {
    let parsed = match cell {
        RawCell::Empty => return None,
        RawCell::Number(v) if v.is_finite() => return Some(*v),
        RawCell::Number(_) => None,
        RawCell::Text(s) => parse_f64_safe(Some(s)),
        RawCell::Unreadable(_) => None,
    };
    if parsed.is_none() {
        *malformed += 1;
        debug!(row = source_row, column, value = ?cell, "unparseable numeric cell treated as missing");
    }
    parsed
}

fn build_records(table: RawTable, columns: &ColumnMap) -> Result<(Vec<KpiRecord>, LoadReport), LoadError> {
    let ColumnIndex(pos) = ColumnIndex::resolve(&table.headers, columns)?;
    let names = columns.headers();
    let empty = RawCell::Empty;
    let mut report = LoadReport::default();
    let mut records = Vec::with_capacity(table.rows.len());
    let mut seen: HashSet<String> = HashSet::new();

    for (i, row) in table.rows.iter().enumerate() {
        report.total_rows += 1;
        // Header occupies row 1.
        let source_row = i + 2;
        let cell = |slot: usize| row.get(pos[slot]).unwrap_or(&empty);
        if (0..9).all(|slot| cell(slot).is_empty()) {
            report.blank_rows += 1;
            continue;
        }
        let kpi_name = text_cell(cell(1));
        if kpi_name.is_empty() {
            report.unnamed_rows += 1;
            warn!(row = source_row, "row has data but no KPI name; skipped");
            continue;
        }

        let mut number =
            |slot: usize| numeric_cell(cell(slot), source_row, names[slot], &mut report.malformed_cells);
        let target_period1 = number(3);
        let actual_period1 = number(4);
        let achv_period1 = number(5);
        let target_period2 = number(6);
        let actual_period2 = number(7);
        let achv_period2 = number(8);

        let mut perspective = text_cell(cell(0));
        if perspective.is_empty() {
            perspective = UNSPECIFIED_PERSPECTIVE.to_string();
        }
        if !seen.insert(kpi_name.clone()) && !report.duplicate_kpis.contains(&kpi_name) {
            warn!(kpi = %kpi_name, row = source_row, "duplicate KPI name; first row wins in detail views");
            report.duplicate_kpis.push(kpi_name.clone());
        }

        records.push(KpiRecord {
            source_row,
            perspective,
            kpi_name,
            owner: text_cell(cell(2)),
            target_period1,
            actual_period1,
            achv_period1,
            target_period2,
            actual_period2,
            achv_period2,
        });
    }

    report.loaded_rows = records.len();
    Ok((records, report))
}

use crate::status::{classify, Status};
use serde::Serialize;
use tabled::Tabled;

/// One cell as handed over by a workbook or CSV reader, before typing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Number(f64),
    Text(String),
    /// Booleans, dates, error cells: anything that is neither text nor a number.
    Unreadable(String),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// One KPI row. Numeric fields keep "missing" distinct from zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiRecord {
    /// 1-based row number in the source sheet, header included.
    pub source_row: usize,
    pub perspective: String,
    pub kpi_name: String,
    pub owner: String,
    pub target_period1: Option<f64>,
    pub actual_period1: Option<f64>,
    pub achv_period1: Option<f64>,
    pub target_period2: Option<f64>,
    pub actual_period2: Option<f64>,
    pub achv_period2: Option<f64>,
}

/// A record paired with the status derived from its period-1 figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedKpi {
    pub record: KpiRecord,
    pub status: Status,
}

impl ClassifiedKpi {
    /// Status comes from period 1 only; period 2 never affects it.
    pub fn new(record: KpiRecord) -> Self {
        let status = classify(record.achv_period1, record.target_period1);
        ClassifiedKpi { record, status }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodFigures {
    pub target: Option<f64>,
    pub actual: Option<f64>,
    /// Stored fraction (0.85 means 85%), never pre-multiplied.
    pub achievement_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonView {
    pub kpi_name: String,
    pub perspective: String,
    pub owner: String,
    pub status: Status,
    pub period1: PeriodFigures,
    pub period2: PeriodFigures,
    /// Rows sharing this name under the status; above 1 the first is shown.
    pub matching_rows: usize,
}

#[derive(Debug, Tabled, Clone)]
pub struct PerspectiveRow {
    #[tabled(rename = "Perspective")]
    pub perspective: String,
    #[tabled(rename = "Red")]
    pub red: usize,
    #[tabled(rename = "Yellow")]
    pub yellow: usize,
    #[tabled(rename = "Green")]
    pub green: usize,
    #[tabled(rename = "Unknown")]
    pub unknown: usize,
    #[tabled(rename = "Total")]
    pub total: usize,
}

#[derive(Debug, Tabled, Clone)]
pub struct KpiChoiceRow {
    #[tabled(rename = "#")]
    pub position: usize,
    #[tabled(rename = "KPI")]
    pub kpi: String,
    #[tabled(rename = "PIC")]
    pub owner: String,
    #[tabled(rename = "Perspective")]
    pub perspective: String,
}

#[cfg(test)]
impl KpiRecord {
    pub fn sample(perspective: &str, kpi: &str) -> Self {
        KpiRecord {
            source_row: 0,
            perspective: perspective.to_string(),
            kpi_name: kpi.to_string(),
            owner: String::new(),
            target_period1: None,
            actual_period1: None,
            achv_period1: None,
            target_period2: None,
            actual_period2: None,
            achv_period2: None,
        }
    }

    pub fn with_period1(mut self, target: f64, actual: f64, achv: f64) -> Self {
        self.target_period1 = Some(target);
        self.actual_period1 = Some(actual);
        self.achv_period1 = Some(achv);
        self
    }

    pub fn with_period2(mut self, target: f64, actual: f64, achv: f64) -> Self {
        self.target_period2 = Some(target);
        self.actual_period2 = Some(actual);
        self.achv_period2 = Some(achv);
        self
    }
}

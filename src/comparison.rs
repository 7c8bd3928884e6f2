use crate::selection::SelectionState;
use crate::status::Status;
use crate::types::{ClassifiedKpi, ComparisonView, KpiRecord, PeriodFigures};
use tracing::warn;

fn period1(record: &KpiRecord) -> PeriodFigures {
    PeriodFigures {
        target: record.target_period1,
        actual: record.actual_period1,
        achievement_ratio: record.achv_period1,
    }
}

fn period2(record: &KpiRecord) -> PeriodFigures {
    PeriodFigures {
        target: record.target_period2,
        actual: record.actual_period2,
        achievement_ratio: record.achv_period2,
    }
}

/// Two-period figures for `kpi` among the records carrying `status`.
///
/// Returns `None` when nothing matches. When several rows share the name,
/// the first in row order wins and the clash is logged as a data-quality
/// warning.
pub fn build_view(records: &[ClassifiedKpi], status: Status, kpi: &str) -> Option<ComparisonView> {
    let mut matches = records
        .iter()
        .filter(|c| c.status == status && c.record.kpi_name == kpi);
    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        warn!(
            kpi,
            status = %status,
            matches = extra + 1,
            row = first.record.source_row,
            "ambiguous KPI name; showing the first matching row"
        );
    }
    Some(ComparisonView {
        kpi_name: first.record.kpi_name.clone(),
        perspective: first.record.perspective.clone(),
        owner: first.record.owner.clone(),
        status: first.status,
        period1: period1(&first.record),
        period2: period2(&first.record),
        matching_rows: extra + 1,
    })
}

pub fn view_for_selection(records: &[ClassifiedKpi], selection: &SelectionState) -> Option<ComparisonView> {
    let kpi = selection.chosen_kpi()?;
    build_view(records, selection.chosen_status(), kpi)
}

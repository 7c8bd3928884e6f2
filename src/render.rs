// Terminal presentation. Everything here turns finished values into text;
// no decisions about the data are made in this module.
use crate::loader::LoadReport;
use crate::selection::SelectionState;
use crate::session::Session;
use crate::status::Status;
use crate::summary::{StatusSummary, Summary};
use crate::types::{ClassifiedKpi, ComparisonView, KpiChoiceRow};
use crate::util::{format_int, format_optional, format_percent};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

const BAR_WIDTH: usize = 40;
const ACTUAL_BAR: char = '█';
const TARGET_BAR: char = '░';

pub fn status_glyph(status: Status) -> &'static str {
    match status {
        Status::Red => "🔴",
        Status::Yellow => "🟡",
        Status::Green => "🟢",
        Status::Unknown => "⚫",
    }
}

fn markdown_table<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)\n".to_string();
    }
    let table = Table::new(rows.to_vec()).with(Style::markdown()).to_string();
    format!("{}\n", table)
}

/// Bar length for `value` against `max`; non-positive values draw nothing,
/// any positive value draws at least one cell.
fn bar_len(value: f64, max: f64) -> usize {
    if value.is_nan() || value <= 0.0 || max <= 0.0 {
        return 0;
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    len.clamp(1, BAR_WIDTH)
}

pub fn load_banner(source: &str, report: &LoadReport) -> String {
    let mut out = format!(
        "Loaded {} KPI rows from {}",
        format_int(report.loaded_rows),
        source
    );
    if report.blank_rows > 0 {
        out.push_str(&format!(", skipped {} blank", format_int(report.blank_rows)));
    }
    if report.unnamed_rows > 0 {
        out.push_str(&format!(
            ", skipped {} without a KPI name",
            format_int(report.unnamed_rows)
        ));
    }
    out.push('\n');
    if report.malformed_cells > 0 {
        out.push_str(&format!(
            "Note: {} unreadable numeric cells treated as missing.\n",
            format_int(report.malformed_cells)
        ));
    }
    if !report.duplicate_kpis.is_empty() {
        out.push_str(&format!(
            "Warning: duplicate KPI names ({}); the first row is used in detail views.\n",
            report.duplicate_kpis.join(", ")
        ));
    }
    out
}

/// Overall counts as a horizontal bar chart, display order top to bottom.
pub fn overall_chart(counts: &StatusSummary) -> String {
    let max = counts.iter().map(|(_, n)| n).max().unwrap_or(0) as f64;
    let mut out = String::from("Total KPI per traffic light\n");
    for (status, n) in counts.iter() {
        out.push_str(&format!(
            "{} {:<8}│{:<width$} {}\n",
            status_glyph(status),
            status.label(),
            ACTUAL_BAR.to_string().repeat(bar_len(n as f64, max)),
            format_int(n),
            width = BAR_WIDTH
        ));
    }
    out
}

pub fn perspective_table(summary: &Summary) -> String {
    format!(
        "KPI per perspective and status\n\n{}",
        markdown_table(&summary.perspective_rows())
    )
}

pub fn kpi_picker(records: &[ClassifiedKpi], selection: &SelectionState) -> String {
    let status = selection.chosen_status();
    let rows: Vec<KpiChoiceRow> = selection
        .kpi_choices(records)
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            // kpi_choices only lists names present under `status`.
            let first = records
                .iter()
                .find(|c| c.status == status && c.record.kpi_name == name);
            KpiChoiceRow {
                position: i + 1,
                kpi: name.to_string(),
                owner: first.map(|c| c.record.owner.clone()).unwrap_or_default(),
                perspective: first.map(|c| c.record.perspective.clone()).unwrap_or_default(),
            }
        })
        .collect();
    let mut out = format!("KPIs with status {} {}\n\n", status_glyph(status), status);
    if rows.is_empty() {
        out.push_str("(no KPIs with this status)\n");
    } else {
        out.push_str(&markdown_table(&rows));
    }
    out
}

/// Grouped bars: actual and target side by side for each period.
pub fn comparison_chart(view: &ComparisonView, period_labels: &[String; 2]) -> String {
    let periods = [&view.period1, &view.period2];
    let max = periods
        .iter()
        .flat_map(|p| [p.actual, p.target])
        .flatten()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let label_width = period_labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut out = format!(
        "Actual vs Target for KPI: {} ({} {}, PIC: {})\n",
        view.kpi_name,
        status_glyph(view.status),
        view.perspective,
        if view.owner.is_empty() { "-" } else { view.owner.as_str() }
    );
    for (label, figures) in period_labels.iter().zip(periods) {
        for (i, (series, value, fill)) in [
            ("Actual", figures.actual, ACTUAL_BAR),
            ("Target", figures.target, TARGET_BAR),
        ]
        .into_iter()
        .enumerate()
        {
            let shown_label = if i == 0 { label.as_str() } else { "" };
            let bar = fill.to_string().repeat(value.map(|v| bar_len(v, max)).unwrap_or(0));
            out.push_str(&format!(
                "{:<lw$}  {} │{:<bw$} {}\n",
                shown_label,
                series,
                bar,
                format_optional(value, 2),
                lw = label_width,
                bw = BAR_WIDTH
            ));
        }
    }
    out
}

pub fn achievement_readouts(view: &ComparisonView, period_labels: &[String; 2]) -> String {
    format!(
        "Achievement (%)\nAchievement {}: {}\nAchievement {}: {}\n",
        period_labels[0],
        format_percent(view.period1.achievement_ratio),
        period_labels[1],
        format_percent(view.period2.achievement_ratio)
    )
}

/// Everything the dashboard shows, in one pass. `None` session data renders
/// the awaiting-input placeholder.
pub fn dashboard(session: &Session, period_labels: &[String; 2]) -> String {
    let Some(dataset) = session.dataset() else {
        return "No workbook loaded yet. Choose [1] to load one.\n".to_string();
    };
    let mut out = String::new();
    out.push_str(&format!(
        "Source: {} (loaded {})\n\n",
        dataset.source,
        dataset.loaded_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&overall_chart(&dataset.summary.overall));
    out.push('\n');
    out.push_str(&perspective_table(&dataset.summary));
    out.push('\n');
    out.push_str(&kpi_picker(&dataset.records, session.selection()));
    out.push('\n');
    out.push_str(&detail(session, period_labels));
    out
}

pub fn detail(session: &Session, period_labels: &[String; 2]) -> String {
    match session.comparison() {
        Some(view) => {
            let mut out = format!(
                "{}\n{}",
                comparison_chart(&view, period_labels),
                achievement_readouts(&view, period_labels)
            );
            if view.matching_rows > 1 {
                out.push_str(&format!(
                    "Note: {} rows are named {}; showing the first.\n",
                    view.matching_rows, view.kpi_name
                ));
            }
            out
        }
        None => "No KPI selected for this status.\n".to_string(),
    }
}

#[derive(Serialize)]
struct Snapshot<'a> {
    source: Option<&'a str>,
    loaded_at: Option<String>,
    report: Option<&'a LoadReport>,
    summary: Option<&'a Summary>,
    selection: &'a SelectionState,
    kpi_choices: Vec<&'a str>,
    view: Option<ComparisonView>,
}

pub fn snapshot_json(session: &Session) -> Result<String, serde_json::Error> {
    let dataset = session.dataset();
    let snapshot = Snapshot {
        source: dataset.map(|d| d.source.as_str()),
        loaded_at: dataset.map(|d| d.loaded_at.to_rfc3339()),
        report: dataset.map(|d| &d.report),
        summary: session.summary(),
        selection: session.selection(),
        kpi_choices: session.kpi_choices(),
        view: session.comparison(),
    };
    serde_json::to_string_pretty(&snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::types::{KpiRecord, PeriodFigures};

    fn write_csv(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("kpi.csv");
        std::fs::write(&path, body).unwrap();
        path
    }

    fn labels() -> [String; 2] {
        DashboardConfig::default().period_labels
    }

    fn view() -> ComparisonView {
        ComparisonView {
            kpi_name: "X".to_string(),
            perspective: "Financial".to_string(),
            owner: String::new(),
            status: Status::Yellow,
            period1: PeriodFigures { target: Some(10.0), actual: Some(8.0), achievement_ratio: Some(0.8) },
            period2: PeriodFigures { target: Some(12.0), actual: None, achievement_ratio: None },
            matching_rows: 1,
        }
    }

    #[test]
    fn bar_len_scales_and_clamps() {
        assert_eq!(bar_len(10.0, 10.0), BAR_WIDTH);
        assert_eq!(bar_len(5.0, 10.0), BAR_WIDTH / 2);
        assert_eq!(bar_len(0.001, 10.0), 1);
        assert_eq!(bar_len(0.0, 10.0), 0);
        assert_eq!(bar_len(-4.0, 10.0), 0);
        assert_eq!(bar_len(3.0, 0.0), 0);
        assert_eq!(bar_len(f64::NAN, 10.0), 0);
    }

    #[test]
    fn overall_chart_lists_every_status_in_order() {
        let chart = overall_chart(&StatusSummary { red: 3, yellow: 0, green: 1, unknown: 0 });
        let lines: Vec<&str> = chart.lines().skip(1).collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Red") && lines[0].ends_with(" 3"));
        assert!(lines[1].contains("Yellow") && lines[1].ends_with(" 0"));
        assert!(lines[2].contains("Green"));
        assert!(lines[3].contains("Unknown"));
    }

    #[test]
    fn readouts_multiply_only_here() {
        let text = achievement_readouts(&view(), &labels());
        assert!(text.contains("Achievement January: 80.00%"));
        assert!(text.contains("Achievement February: n/a"));
    }

    #[test]
    fn comparison_chart_marks_missing_values() {
        let chart = comparison_chart(&view(), &labels());
        assert!(chart.starts_with("Actual vs Target for KPI: X"));
        assert!(chart.contains("PIC: -"));
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("January") && lines[1].ends_with("8.00"));
        assert!(lines[3].starts_with("February") && lines[3].ends_with("n/a"));
        assert!(lines[4].ends_with("12.00"));
    }

    #[test]
    fn picker_and_placeholder() {
        let records = vec![ClassifiedKpi::new(
            KpiRecord::sample("Financial", "Revenue").with_period1(10.0, 1.0, 1.0),
        )];
        let selection = SelectionState::initial(&records);
        let picker = kpi_picker(&records, &selection);
        assert!(picker.contains("Revenue"));
        assert!(picker.starts_with("KPIs with status 🔴 Red"));

        let mut empty = selection.clone();
        empty.select_status(&records, Status::Green);
        assert!(kpi_picker(&records, &empty).contains("(no KPIs with this status)"));

        let session = Session::new();
        assert!(dashboard(&session, &labels()).starts_with("No workbook loaded"));
    }

    #[test]
    fn snapshot_of_loaded_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new();
        let csv = "Perspective,KPI,PIC,Target Jan,Actual Jan,Achv Jan,Target Feb,Actual Feb,Achv Feb\n\
                   Financial,Revenue,Ana,10,2,2,10,4,0.4\n";
        session
            .load_path(&write_csv(&dir, csv), &DashboardConfig::default())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&snapshot_json(&session).unwrap()).unwrap();
        assert_eq!(value["source"], "kpi.csv");
        assert_eq!(value["summary"]["overall"]["red"], 1);
        assert_eq!(value["summary"]["by_perspective"]["Financial"]["red"], 1);
        assert_eq!(value["selection"]["chosen_status"], "red");
        assert_eq!(value["selection"]["chosen_kpi"], "Revenue");
        assert_eq!(value["view"]["period2"]["achievement_ratio"], 0.4);

        let text = dashboard(&session, &labels());
        assert!(text.contains("Source: kpi.csv"));
        assert!(text.contains("| Financial "));
        assert!(text.contains("Achievement February: 40.00%"));
    }

    #[test]
    fn detail_notes_shared_kpi_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new();
        let csv = "Perspective,KPI,PIC,Target Jan,Actual Jan,Achv Jan,Target Feb,Actual Feb,Achv Feb\n\
                   Financial,Rev,Ana,10,2,2,,,\n\
                   Customer,Rev,Budi,10,3,3,,,\n";
        session
            .load_path(&write_csv(&dir, csv), &DashboardConfig::default())
            .unwrap();
        let text = detail(&session, &labels());
        assert!(text.contains("PIC: Ana"));
        assert!(text.contains("Note: 2 rows are named Rev; showing the first."));
    }

    #[test]
    fn load_banner_mentions_problems() {
        let report = LoadReport {
            total_rows: 4,
            loaded_rows: 3,
            blank_rows: 1,
            malformed_cells: 2,
            unnamed_rows: 0,
            duplicate_kpis: vec!["Rev".to_string()],
        };
        let banner = load_banner("kpi.xlsx", &report);
        assert!(banner.starts_with("Loaded 3 KPI rows from kpi.xlsx, skipped 1 blank"));
        assert!(banner.contains("2 unreadable numeric cells"));
        assert!(banner.contains("duplicate KPI names (Rev)"));
        assert!(!banner.contains("without a KPI name"));

        let unnamed = LoadReport { unnamed_rows: 2, ..report };
        assert!(load_banner("kpi.xlsx", &unnamed).starts_with(
            "Loaded 3 KPI rows from kpi.xlsx, skipped 1 blank, skipped 2 without a KPI name"
        ));
    }
}

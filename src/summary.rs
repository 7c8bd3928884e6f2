use crate::status::Status;
use crate::types::{ClassifiedKpi, KpiRecord, PerspectiveRow};
use serde::Serialize;
use std::collections::BTreeMap;

/// Count of KPIs per status. Every status is always present, zero or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub red: usize,
    pub yellow: usize,
    pub green: usize,
    pub unknown: usize,
}

impl StatusSummary {
    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Red => self.red,
            Status::Yellow => self.yellow,
            Status::Green => self.green,
            Status::Unknown => self.unknown,
        }
    }

    fn increment(&mut self, status: Status) {
        let slot = match status {
            Status::Red => &mut self.red,
            Status::Yellow => &mut self.yellow,
            Status::Green => &mut self.green,
            Status::Unknown => &mut self.unknown,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.red + self.yellow + self.green + self.unknown
    }

    /// Counts in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Status, usize)> + '_ {
        Status::DISPLAY_ORDER.into_iter().map(move |s| (s, self.get(s)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub overall: StatusSummary,
    /// Only perspectives that occur in the data, sorted by name.
    pub by_perspective: BTreeMap<String, StatusSummary>,
}

impl Summary {
    pub fn perspective_rows(&self) -> Vec<PerspectiveRow> {
        self.by_perspective
            .iter()
            .map(|(perspective, counts)| PerspectiveRow {
                perspective: perspective.clone(),
                red: counts.red,
                yellow: counts.yellow,
                green: counts.green,
                unknown: counts.unknown,
                total: counts.total(),
            })
            .collect()
    }
}

/// Single pass over (record, status) pairs.
pub fn summarize<'a, I>(pairs: I) -> Summary
where
    I: IntoIterator<Item = (&'a KpiRecord, Status)>,
{
    let mut summary = Summary::default();
    for (record, status) in pairs {
        summary.overall.increment(status);
        summary
            .by_perspective
            .entry(record.perspective.clone())
            .or_default()
            .increment(status);
    }
    summary
}

pub fn summarize_classified(records: &[ClassifiedKpi]) -> Summary {
    summarize(records.iter().map(|c| (&c.record, c.status)))
}

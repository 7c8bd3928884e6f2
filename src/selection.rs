// Status filter + KPI picker state.
//
// `select_status` and `select_kpi` are the only ways to change the selection;
// both take the current records so the chosen KPI can never point outside the
// filtered set.
use crate::error::SelectionError;
use crate::status::Status;
use crate::types::ClassifiedKpi;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    chosen_status: Status,
    chosen_kpi: Option<String>,
}

impl Default for SelectionState {
    fn default() -> Self {
        SelectionState {
            chosen_status: Status::DISPLAY_ORDER[0],
            chosen_kpi: None,
        }
    }
}

/// Distinct KPI names carrying `status`, in row order.
pub fn kpi_names(records: &[ClassifiedKpi], status: Status) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for c in records.iter().filter(|c| c.status == status) {
        if !names.contains(&c.record.kpi_name.as_str()) {
            names.push(&c.record.kpi_name);
        }
    }
    names
}

impl SelectionState {
    /// First status in display order, first KPI under it (if any).
    pub fn initial(records: &[ClassifiedKpi]) -> Self {
        let mut state = SelectionState::default();
        state.select_status(records, state.chosen_status);
        state
    }

    pub fn chosen_status(&self) -> Status {
        self.chosen_status
    }

    pub fn chosen_kpi(&self) -> Option<&str> {
        self.chosen_kpi.as_deref()
    }

    pub fn kpi_choices<'a>(&self, records: &'a [ClassifiedKpi]) -> Vec<&'a str> {
        kpi_names(records, self.chosen_status)
    }

    /// Keeps the current KPI when it is still listed under `status`,
    /// otherwise falls back to the first listed one.
    pub fn select_status(&mut self, records: &[ClassifiedKpi], status: Status) {
        self.chosen_status = status;
        let names = kpi_names(records, status);
        let still_valid = self
            .chosen_kpi
            .as_deref()
            .map(|kpi| names.contains(&kpi))
            .unwrap_or(false);
        if !still_valid {
            self.chosen_kpi = names.first().map(|name| name.to_string());
        }
    }

    /// Out-of-set names are rejected and leave the state unchanged.
    pub fn select_kpi(&mut self, records: &[ClassifiedKpi], name: &str) -> Result<(), SelectionError> {
        if kpi_names(records, self.chosen_status).contains(&name) {
            self.chosen_kpi = Some(name.to_string());
            Ok(())
        } else {
            Err(SelectionError::InvalidSelection {
                kpi: name.to_string(),
                status: self.chosen_status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KpiRecord;

    fn dataset() -> Vec<ClassifiedKpi> {
        vec![
            ClassifiedKpi::new(KpiRecord::sample("F", "Revenue").with_period1(10.0, 4.0, 4.0)),
            ClassifiedKpi::new(KpiRecord::sample("F", "Margin").with_period1(10.0, 8.0, 8.0)),
            ClassifiedKpi::new(KpiRecord::sample("C", "Churn").with_period1(10.0, 2.0, 2.0)),
            ClassifiedKpi::new(KpiRecord::sample("C", "NPS")),
            ClassifiedKpi::new(KpiRecord::sample("C", "Revenue").with_period1(10.0, 9.0, 9.0)),
        ]
    }

    #[test]
    fn initial_state_is_first_red_kpi() {
        let records = dataset();
        let state = SelectionState::initial(&records);
        assert_eq!(state.chosen_status(), Status::Red);
        assert_eq!(state.chosen_kpi(), Some("Revenue"));
    }

    #[test]
    fn initial_state_without_red_kpis_has_no_kpi() {
        let records = vec![ClassifiedKpi::new(KpiRecord::sample("F", "NPS"))];
        let state = SelectionState::initial(&records);
        assert_eq!(state.chosen_status(), Status::Red);
        assert_eq!(state.chosen_kpi(), None);
        assert_eq!(SelectionState::initial(&[]), SelectionState::default());
    }

    #[test]
    fn kpi_names_are_distinct_in_row_order() {
        let mut records = dataset();
        records.push(ClassifiedKpi::new(KpiRecord::sample("P", "Churn").with_period1(1.0, 0.0, 0.0)));
        assert_eq!(kpi_names(&records, Status::Red), vec!["Revenue", "Churn"]);
        assert_eq!(kpi_names(&records, Status::Green), Vec::<&str>::new());
    }

    #[test]
    fn select_status_keeps_kpi_only_while_valid() {
        let records = dataset();
        let mut state = SelectionState::initial(&records);

        // "Revenue" is also yellow via the second perspective.
        state.select_status(&records, Status::Yellow);
        assert_eq!(state.chosen_kpi(), Some("Revenue"));

        state.select_kpi(&records, "Margin").unwrap();
        state.select_status(&records, Status::Red);
        assert_eq!(state.chosen_kpi(), Some("Revenue"));

        state.select_status(&records, Status::Green);
        assert_eq!(state.chosen_status(), Status::Green);
        assert_eq!(state.chosen_kpi(), None);
    }

    #[test]
    fn chosen_kpi_always_carries_chosen_status() {
        let records = dataset();
        let mut state = SelectionState::initial(&records);
        for status in Status::DISPLAY_ORDER {
            state.select_status(&records, status);
            if let Some(kpi) = state.chosen_kpi() {
                assert!(records
                    .iter()
                    .any(|c| c.status == status && c.record.kpi_name == kpi));
            }
        }
    }

    #[test]
    fn out_of_set_kpi_is_rejected() {
        let records = dataset();
        let mut state = SelectionState::initial(&records);
        let before = state.clone();
        let err = state.select_kpi(&records, "NPS").unwrap_err();
        assert_eq!(
            err,
            SelectionError::InvalidSelection {
                kpi: "NPS".to_string(),
                status: Status::Red
            }
        );
        assert_eq!(state, before);

        state.select_status(&records, Status::Unknown);
        state.select_kpi(&records, "NPS").unwrap();
        assert_eq!(state.chosen_kpi(), Some("NPS"));
    }
}

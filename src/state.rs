use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::data::aggregate::ChartSet;
use crate::data::filter::{filtered_indices, Choice, Selection};
use crate::data::model::{columns, EmployeeTable};
use crate::data::remote::{load_source, DataSource, LoadOptions};
use crate::data::search::{search_employee_id, SearchOutcome};
use crate::data::stats::{describe, ColumnSummary};
use crate::settings::Settings;

type LoadResult = Result<EmployeeTable, String>;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Table as loaded, before the drop-missing step.
    raw_table: Option<EmployeeTable>,

    /// Table the dashboard works on (None until loaded).
    pub table: Option<EmployeeTable>,

    /// Department / education dropdown selection.
    pub selection: Selection,

    /// Indices of records passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// Employee-ID search box contents.
    pub search_query: String,

    /// Result of the last search (cached).
    pub search: SearchOutcome,

    /// Chart series for the Visualizations section (cached).
    pub charts: ChartSet,

    /// Descriptive statistics (cached).
    pub statistics: Vec<ColumnSummary>,

    /// Charts and statistics follow the selection instead of the whole table.
    pub charts_follow_filters: bool,

    /// Keep only rows without missing cells.
    pub drop_missing: bool,

    /// Where the current table came from.
    pub source: DataSource,

    pub load_options: LoadOptions,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a load operation is in progress.
    pub loading: bool,

    pending: Option<Receiver<LoadResult>>,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            raw_table: None,
            table: None,
            selection: Selection::default(),
            visible_indices: Vec::new(),
            search_query: String::new(),
            search: SearchOutcome::Idle,
            charts: ChartSet::default(),
            statistics: Vec::new(),
            charts_follow_filters: settings.charts_follow_filters,
            drop_missing: settings.drop_missing,
            source: settings.source(),
            load_options: settings.load_options(),
            status_message: None,
            loading: false,
            pending: None,
        }
    }

    // -- Loading --

    /// Start loading `source` on a background thread.
    pub fn start_load(&mut self, source: DataSource) {
        let (tx, rx) = mpsc::channel();
        // The drop-missing step is applied here so it can be toggled later.
        let options = LoadOptions {
            drop_missing: false,
            ..self.load_options
        };
        let job_source = source.clone();
        thread::spawn(move || {
            let result = load_source(&job_source, &options).map_err(|e| format!("{e:#}"));
            // The receiver is gone if a newer load replaced this one.
            let _ = tx.send(result);
        });

        log::info!("Loading employee data from {source}");
        self.source = source;
        self.pending = Some(rx);
        self.loading = true;
        self.status_message = None;
    }

    /// Reload from the current source.
    pub fn reload(&mut self) {
        self.start_load(self.source.clone());
    }

    /// Check the background load. Returns true when it finished this call.
    pub fn poll_load(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err("loader thread stopped unexpectedly".to_string()),
        };
        self.pending = None;
        self.finish_load(result);
        true
    }

    fn finish_load(&mut self, result: LoadResult) {
        match result {
            Ok(table) => {
                log::info!(
                    "Loaded {} employees with columns {:?}",
                    table.len(),
                    table.column_names
                );
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load employee data: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.loading = false;
            }
        }
    }

    /// Ingest a newly loaded table, reset the selection and derived views.
    pub fn set_table(&mut self, table: EmployeeTable) {
        self.raw_table = Some(table);
        self.selection = Selection::default();
        self.loading = false;
        self.status_message = None;
        self.apply_drop_missing();
    }

    fn apply_drop_missing(&mut self) {
        let Some(raw) = &self.raw_table else {
            return;
        };
        let table = if self.drop_missing {
            let clean = raw.without_missing();
            let dropped = raw.len() - clean.len();
            if dropped > 0 {
                log::warn!("Dropped {dropped} rows with missing values");
            }
            clean
        } else {
            raw.clone()
        };
        // A picked value can vanish with the dropped rows.
        let selection = &mut self.selection;
        selection.department = keep_if_present(&table, columns::DEPARTMENT, &selection.department);
        selection.education = keep_if_present(&table, columns::EDUCATION, &selection.education);
        self.table = Some(table);
        self.refresh();
    }

    // -- Interaction --

    pub fn set_drop_missing(&mut self, drop_missing: bool) {
        if self.drop_missing != drop_missing {
            self.drop_missing = drop_missing;
            self.apply_drop_missing();
        }
    }

    pub fn set_department(&mut self, choice: Choice) {
        self.selection.department = choice;
        self.refresh();
    }

    pub fn set_education(&mut self, choice: Choice) {
        self.selection.education = choice;
        self.refresh();
    }

    pub fn set_search_query(&mut self, query: String) {
        self.search_query = query;
        self.refresh_search();
    }

    pub fn set_charts_follow_filters(&mut self, follow: bool) {
        self.charts_follow_filters = follow;
        self.refresh();
    }

    // -- Derived views --

    /// Recompute every cached view after a change.
    pub fn refresh(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        self.visible_indices = filtered_indices(table, &self.selection);

        let all_rows: Vec<usize>;
        let chart_rows: &[usize] = if self.charts_follow_filters {
            &self.visible_indices
        } else {
            all_rows = (0..table.len()).collect();
            &all_rows
        };
        self.charts = ChartSet::build(table, chart_rows);
        self.statistics = describe(table, chart_rows);
        self.refresh_search();
    }

    fn refresh_search(&mut self) {
        self.search = match &self.table {
            Some(table) => search_employee_id(table, &self.search_query),
            None => SearchOutcome::Idle,
        };
    }
}

/// `choice` if its value still occurs in `column`, otherwise `All`.
fn keep_if_present(table: &EmployeeTable, column: &str, choice: &Choice) -> Choice {
    match choice {
        Choice::Only(value) if !table.categories(column).contains(value) => {
            log::info!("{column} '{value}' no longer present, showing all");
            Choice::All
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::data::model::tests::sample_table;
    use crate::data::model::CellValue;

    fn loaded_state() -> AppState {
        let mut state = AppState::new(&Settings::default());
        state.set_table(sample_table());
        state
    }

    #[test]
    fn new_table_shows_everything() {
        let state = loaded_state();
        assert_eq!(state.visible_indices.len(), 6);
        assert_eq!(state.charts.gender_counts.entries.len(), 2);
        assert!(!state.statistics.is_empty());
    }

    #[test]
    fn selection_narrows_rows_and_charts() {
        let mut state = loaded_state();
        state.set_department(Choice::Only(CellValue::String("Sales & Marketing".into())));
        assert_eq!(state.visible_indices, vec![0, 2, 3]);
        assert_eq!(state.charts.department_counts.entries, vec![("Sales & Marketing".to_string(), 3)]);

        state.set_charts_follow_filters(false);
        assert_eq!(state.visible_indices, vec![0, 2, 3]);
        assert_eq!(state.charts.department_counts.entries.len(), 4);
    }

    #[test]
    fn drop_missing_toggle_rebuilds_table() {
        let mut state = loaded_state();
        state.set_drop_missing(true);
        assert_eq!(state.table.as_ref().map(EmployeeTable::len), Some(5));
        state.set_drop_missing(false);
        assert_eq!(state.table.as_ref().map(EmployeeTable::len), Some(6));
    }

    #[test]
    fn dropping_rows_resets_vanished_selection() {
        let mut state = loaded_state();
        let analytics = Choice::Only(CellValue::String("Analytics".into()));
        let masters = Choice::Only(CellValue::String("Master's & above".into()));
        state.set_department(analytics);
        state.set_education(masters.clone());
        assert_eq!(state.visible_indices, vec![5]);

        // The only Analytics row has a missing rating.
        state.set_drop_missing(true);
        assert_eq!(state.selection.department, Choice::All);
        assert_eq!(state.selection.education, masters);
        assert_eq!(state.visible_indices, vec![0]);
    }

    #[test]
    fn search_reports_not_found() {
        let mut state = loaded_state();
        state.set_search_query("12345".into());
        assert_eq!(state.search, SearchOutcome::NotFound("12345".into()));
        state.set_search_query("7513".into());
        assert_eq!(state.search, SearchOutcome::Found(vec![2]));
    }

    #[test]
    fn failed_load_becomes_error_message() {
        let mut state = AppState::new(&Settings::default());
        state.start_load(DataSource::File("/nonexistent/employees.csv".into()));

        let deadline = Instant::now() + Duration::from_secs(5);
        while !state.poll_load() {
            assert!(Instant::now() < deadline, "load did not finish");
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!state.loading);
        assert!(state.table.is_none());
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Error:")));
    }
}

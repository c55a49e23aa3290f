use std::fmt;

use super::model::{columns, CellValue, EmployeeTable, Record};

// ---------------------------------------------------------------------------
// Filter predicate: one dropdown choice per filtered column
// ---------------------------------------------------------------------------

/// A dropdown choice: everything, or exactly one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Choice {
    #[default]
    All,
    Only(CellValue),
}

impl Choice {
    /// Whether `value` passes this choice (plain equality for `Only`).
    pub fn matches(&self, value: &CellValue) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => write!(f, "All"),
            Choice::Only(v) => write!(f, "{v}"),
        }
    }
}

/// The department / education selection made in the side panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub department: Choice,
    pub education: Choice,
}

impl Selection {
    pub fn matches(&self, record: &Record) -> bool {
        self.department.matches(record.value(columns::DEPARTMENT))
            && self.education.matches(record.value(columns::EDUCATION))
    }
}

/// Dropdown entries for `column`: `All` first, then every value in
/// first-appearance order.
pub fn options(table: &EmployeeTable, column: &str) -> Vec<Choice> {
    std::iter::once(Choice::All)
        .chain(table.categories(column).into_iter().map(Choice::Only))
        .collect()
}

/// Return indices of records that pass both predicates, in table order.
pub fn filtered_indices(table: &EmployeeTable, selection: &Selection) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sample_table;

    fn only(s: &str) -> Choice {
        Choice::Only(CellValue::String(s.to_string()))
    }

    #[test]
    fn department_and_education_both_apply() {
        let table = sample_table();
        let selection = Selection {
            department: only("Sales & Marketing"),
            education: only("Bachelor's"),
        };
        let rows = filtered_indices(&table, &selection);
        assert_eq!(rows, vec![2, 3]);
        for &i in &rows {
            let rec = &table.records[i];
            assert_eq!(rec.value("department").to_string(), "Sales & Marketing");
            assert_eq!(rec.value("education").to_string(), "Bachelor's");
        }
    }

    #[test]
    fn all_departments_keeps_every_matching_education() {
        let table = sample_table();
        let selection = Selection {
            department: Choice::All,
            education: only("Master's & above"),
        };
        assert_eq!(filtered_indices(&table, &selection), vec![0, 5]);
    }

    #[test]
    fn default_selection_keeps_everything() {
        let table = sample_table();
        assert_eq!(
            filtered_indices(&table, &Selection::default()),
            (0..table.len()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn unknown_value_matches_nothing() {
        let table = sample_table();
        let selection = Selection {
            department: only("Finance"),
            education: Choice::All,
        };
        assert!(filtered_indices(&table, &selection).is_empty());
    }

    #[test]
    fn options_start_with_all() {
        let table = sample_table();
        let opts = options(&table, columns::EDUCATION);
        assert_eq!(opts, vec![Choice::All, only("Master's & above"), only("Bachelor's")]);
        assert_eq!(opts[0].to_string(), "All");
    }
}

use super::model::{columns, EmployeeTable};

/// Result of an employee-ID lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Nothing typed yet.
    Idle,
    /// Indices of matching rows, in table order.
    Found(Vec<usize>),
    /// The (trimmed) query that matched nothing.
    NotFound(String),
}

impl SearchOutcome {
    /// User-facing message for an empty result.
    pub fn message(&self) -> Option<String> {
        match self {
            SearchOutcome::NotFound(q) => Some(format!("No employees found with ID '{q}'.")),
            _ => None,
        }
    }
}

/// Substring match of `query` against the textual form of `employee_id`.
pub fn search_employee_id(table: &EmployeeTable, query: &str) -> SearchOutcome {
    let query = query.trim();
    if query.is_empty() {
        return SearchOutcome::Idle;
    }

    let hits: Vec<usize> = table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| match rec.get(columns::EMPLOYEE_ID) {
            Some(id) if !id.is_null() => id.to_string().contains(query),
            _ => false,
        })
        .map(|(i, _)| i)
        .collect();

    if hits.is_empty() {
        SearchOutcome::NotFound(query.to_string())
    } else {
        SearchOutcome::Found(hits)
    }
}

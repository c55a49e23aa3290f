use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the employee table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common dataframe dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text; sorts chronologically.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell, used by statistics and charts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Well-known columns
// ---------------------------------------------------------------------------

pub mod columns {
    pub const EMPLOYEE_ID: &str = "employee_id";
    pub const DEPARTMENT: &str = "department";
    pub const EDUCATION: &str = "education";
    pub const GENDER: &str = "gender";
    pub const REGION: &str = "region";
    pub const AGE: &str = "age";
    pub const NO_OF_TRAININGS: &str = "no_of_trainings";
    pub const LENGTH_OF_SERVICE: &str = "length_of_service";
    pub const PREVIOUS_YEAR_RATING: &str = "previous_year_rating";
    pub const DATE: &str = "date";
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// One employee (one row of the source table): column_name → value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub cells: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Cell value, treating an absent column as `Null`.
    pub fn value(&self, column: &str) -> &CellValue {
        static NULL: CellValue = CellValue::Null;
        self.cells.get(column).unwrap_or(&NULL)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(CellValue::as_f64)
    }
}

impl FromIterator<(String, CellValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        Record {
            cells: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// EmployeeTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed column indices.
#[derive(Debug, Clone, Default)]
pub struct EmployeeTable {
    /// All employees (rows).
    pub records: Vec<Record>,
    /// Column names in source order.
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl EmployeeTable {
    /// Build column indices from the loaded records.
    ///
    /// `column_order` is the header order of the source; columns found in the
    /// records but not listed there are appended in sorted order.
    pub fn from_records(records: Vec<Record>, column_order: &[String]) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();
        for rec in &records {
            for (col, val) in &rec.cells {
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }

        let mut column_names: Vec<String> = Vec::with_capacity(unique_values.len());
        for col in column_order {
            if !column_names.contains(col) {
                column_names.push(col.clone());
            }
        }
        for col in unique_values.keys() {
            if !column_names.contains(col) {
                column_names.push(col.clone());
            }
        }

        EmployeeTable {
            records,
            column_names,
            unique_values,
        }
    }

    /// Number of employees.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    /// Unique non-null values of `column` in the order they first appear.
    ///
    /// This is the category order used by the dropdowns and the charts.
    pub fn categories(&self, column: &str) -> Vec<CellValue> {
        self.categories_in(column, 0..self.len())
    }

    /// Like [`categories`](Self::categories), restricted to the given rows.
    pub fn categories_in(
        &self,
        column: &str,
        rows: impl IntoIterator<Item = usize>,
    ) -> Vec<CellValue> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for idx in rows {
            let Some(val) = self.records.get(idx).and_then(|r| r.get(column)) else {
                continue;
            };
            if !val.is_null() && seen.insert(val.clone()) {
                out.push(val.clone());
            }
        }
        out
    }

    /// Copy of the table keeping only rows with no missing cell.
    pub fn without_missing(&self) -> EmployeeTable {
        let records: Vec<Record> = self
            .records
            .iter()
            .filter(|rec| {
                self.column_names
                    .iter()
                    .all(|col| !rec.value(col).is_null())
            })
            .cloned()
            .collect();
        EmployeeTable::from_records(records, &self.column_names)
    }
}

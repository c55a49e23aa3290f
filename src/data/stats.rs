//! Descriptive statistics over numeric columns (count, mean, std, quartiles).

use super::model::{CellValue, EmployeeTable};

/// Summary of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Row labels of the statistics table, in display order.
    pub const LABELS: [&'static str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    /// Values in the same order as [`LABELS`](Self::LABELS).
    pub fn values(&self) -> [Option<f64>; 8] {
        [
            Some(self.count as f64),
            Some(self.mean),
            self.std,
            Some(self.min),
            Some(self.q25),
            Some(self.median),
            Some(self.q75),
            Some(self.max),
        ]
    }

    /// Summarise a set of values. Returns `None` when `values` is empty.
    pub fn from_values(column: &str, mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = (n > 1).then(|| {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        });

        Some(ColumnSummary {
            column: column.to_string(),
            count: n,
            mean,
            std,
            min: values[0],
            q25: quantile_sorted(&values, 0.25),
            median: quantile_sorted(&values, 0.5),
            q75: quantile_sorted(&values, 0.75),
            max: values[n - 1],
        })
    }
}

/// Quantile with linear interpolation between closest ranks.
/// `sorted` must be ascending and non-empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Describe every numeric column of `table` over the given rows.
///
/// A column is numeric when all of its non-null cells are integers or floats.
/// Nulls are skipped, so `count` can differ between columns.
pub fn describe(table: &EmployeeTable, rows: &[usize]) -> Vec<ColumnSummary> {
    table
        .column_names
        .iter()
        .filter(|col| is_numeric_column(table, col))
        .filter_map(|col| {
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|&i| table.records.get(i)?.number(col))
                .collect();
            ColumnSummary::from_values(col, values)
        })
        .collect()
}

fn is_numeric_column(table: &EmployeeTable, column: &str) -> bool {
    let Some(values) = table.unique_values.get(column) else {
        return false;
    };
    let mut any_number = false;
    for v in values {
        match v {
            CellValue::Null => {}
            CellValue::Integer(_) | CellValue::Float(_) => any_number = true,
            _ => return false,
        }
    }
    any_number
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sample_table;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!(close(quantile_sorted(&v, 0.25), 1.75));
        assert!(close(quantile_sorted(&v, 0.5), 2.5));
        assert!(close(quantile_sorted(&v, 0.75), 3.25));
        assert!(close(quantile_sorted(&v, 1.0), 4.0));
        assert!(close(quantile_sorted(&[7.0], 0.5), 7.0));
    }

    #[test]
    fn summary_uses_sample_std() {
        let s = ColumnSummary::from_values("x", vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.count, 8);
        assert!(close(s.mean, 5.0));
        assert!(close(s.std.unwrap(), (32.0_f64 / 7.0).sqrt()));
        assert!(close(s.min, 2.0));
        assert!(close(s.max, 9.0));
        assert!(close(s.median, 4.5));
    }

    #[test]
    fn single_value_has_no_std() {
        let s = ColumnSummary::from_values("x", vec![3.0]).unwrap();
        assert_eq!(s.std, None);
        assert!(ColumnSummary::from_values("x", Vec::new()).is_none());
    }

    #[test]
    fn describe_covers_numeric_columns_only() {
        let table = sample_table();
        let rows: Vec<usize> = (0..table.len()).collect();
        let summary = describe(&table, &rows);
        let names: Vec<&str> = summary.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(
            names,
            ["employee_id", "age", "no_of_trainings", "length_of_service", "previous_year_rating"]
        );

        let rating = summary.iter().find(|s| s.column == "previous_year_rating").unwrap();
        // One rating is missing.
        assert_eq!(rating.count, 5);
        assert!(close(rating.mean, 17.0 / 5.0));
    }

    #[test]
    fn describe_respects_row_subset() {
        let table = sample_table();
        let summary = describe(&table, &[0, 5]);
        let age = summary.iter().find(|s| s.column == "age").unwrap();
        assert_eq!(age.count, 2);
        assert!(close(age.mean, 33.0));
    }
}

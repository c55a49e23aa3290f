use std::collections::BTreeMap;

use super::model::{columns, CellValue, EmployeeTable};
use super::stats::quantile_sorted;

// ---------------------------------------------------------------------------
// Series types
// ---------------------------------------------------------------------------

/// Number of rows per category, categories in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryCounts {
    pub entries: Vec<(String, usize)>,
}

/// Mean of a value per category with a 95% confidence interval.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub category: String,
    pub mean: f64,
    pub ci_low: f64,
    pub ci_high: f64,
    pub n: usize,
}

/// Five-number summary plus outliers for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub category: String,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Scatter points for one hue category.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub category: String,
    pub points: Vec<[f64; 2]>,
}

/// Mean value per date, dates ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    pub points: Vec<(String, f64)>,
}

// ---------------------------------------------------------------------------
// ChartSet – everything the Visualizations section draws
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSet {
    pub gender_counts: CategoryCounts,
    pub department_counts: CategoryCounts,
    pub region_counts: CategoryCounts,
    pub trainings_by_department: Vec<GroupMean>,
    pub service_by_gender: Vec<BoxStats>,
    pub rating_vs_age: Vec<ScatterSeries>,
    /// `None` when the table has no `date` column.
    pub rating_over_time: Option<TimeSeries>,
}

impl ChartSet {
    /// Build every chart series over `rows` of `table`.
    pub fn build(table: &EmployeeTable, rows: &[usize]) -> Self {
        ChartSet {
            gender_counts: count_by(table, rows, columns::GENDER),
            department_counts: count_by(table, rows, columns::DEPARTMENT),
            region_counts: count_by(table, rows, columns::REGION),
            trainings_by_department: mean_by(
                table,
                rows,
                columns::DEPARTMENT,
                columns::NO_OF_TRAININGS,
            ),
            service_by_gender: box_by(table, rows, columns::GENDER, columns::LENGTH_OF_SERVICE),
            rating_vs_age: scatter_by(
                table,
                rows,
                columns::AGE,
                columns::PREVIOUS_YEAR_RATING,
                columns::GENDER,
            ),
            rating_over_time: table
                .has_column(columns::DATE)
                .then(|| mean_over_time(table, rows, columns::DATE, columns::PREVIOUS_YEAR_RATING)),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// Group `rows` by the category in `column`, skipping nulls, keeping
/// first-appearance order of categories.
fn group_rows(table: &EmployeeTable, rows: &[usize], column: &str) -> Vec<(CellValue, Vec<usize>)> {
    let mut groups: Vec<(CellValue, Vec<usize>)> = Vec::new();
    let mut position: BTreeMap<CellValue, usize> = BTreeMap::new();
    for &i in rows {
        let Some(val) = table.records.get(i).and_then(|r| r.get(column)) else {
            continue;
        };
        if val.is_null() {
            continue;
        }
        let slot = *position.entry(val.clone()).or_insert_with(|| {
            groups.push((val.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(i);
    }
    groups
}

fn numbers(table: &EmployeeTable, rows: &[usize], column: &str) -> Vec<f64> {
    rows.iter()
        .filter_map(|&i| table.records.get(i)?.number(column))
        .collect()
}

pub fn count_by(table: &EmployeeTable, rows: &[usize], column: &str) -> CategoryCounts {
    CategoryCounts {
        entries: group_rows(table, rows, column)
            .into_iter()
            .map(|(cat, members)| (cat.to_string(), members.len()))
            .collect(),
    }
}

/// Mean of `value` per `group` with a normal-approximation 95% interval.
pub fn mean_by(table: &EmployeeTable, rows: &[usize], group: &str, value: &str) -> Vec<GroupMean> {
    group_rows(table, rows, group)
        .into_iter()
        .filter_map(|(cat, members)| {
            let vals = numbers(table, &members, value);
            if vals.is_empty() {
                return None;
            }
            let n = vals.len();
            let mean = vals.iter().sum::<f64>() / n as f64;
            let half_width = if n > 1 {
                let var = vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
                1.96 * (var / n as f64).sqrt()
            } else {
                0.0
            };
            Some(GroupMean {
                category: cat.to_string(),
                mean,
                ci_low: mean - half_width,
                ci_high: mean + half_width,
                n,
            })
        })
        .collect()
}

/// Box statistics of `value` per `group`, whiskers at 1.5 × IQR.
pub fn box_by(table: &EmployeeTable, rows: &[usize], group: &str, value: &str) -> Vec<BoxStats> {
    group_rows(table, rows, group)
        .into_iter()
        .filter_map(|(cat, members)| {
            let mut vals = numbers(table, &members, value);
            if vals.is_empty() {
                return None;
            }
            vals.sort_by(f64::total_cmp);
            let q1 = quantile_sorted(&vals, 0.25);
            let median = quantile_sorted(&vals, 0.5);
            let q3 = quantile_sorted(&vals, 0.75);
            let iqr = q3 - q1;
            let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

            let (inside, outliers): (Vec<f64>, Vec<f64>) = vals
                .iter()
                .partition(|v| **v >= lo_fence && **v <= hi_fence);
            let lower_whisker = inside.first().copied().unwrap_or(median);
            let upper_whisker = inside.last().copied().unwrap_or(median);

            Some(BoxStats {
                category: cat.to_string(),
                lower_whisker,
                q1,
                median,
                q3,
                upper_whisker,
                outliers,
            })
        })
        .collect()
}

/// (`x`, `y`) points split by `hue`; rows missing either coordinate are skipped.
pub fn scatter_by(
    table: &EmployeeTable,
    rows: &[usize],
    x: &str,
    y: &str,
    hue: &str,
) -> Vec<ScatterSeries> {
    group_rows(table, rows, hue)
        .into_iter()
        .map(|(cat, members)| ScatterSeries {
            category: cat.to_string(),
            points: members
                .iter()
                .filter_map(|&i| {
                    let rec = table.records.get(i)?;
                    Some([rec.number(x)?, rec.number(y)?])
                })
                .collect(),
        })
        .filter(|s| !s.points.is_empty())
        .collect()
}

/// Mean of `value` per distinct `date` cell, ascending by date.
pub fn mean_over_time(table: &EmployeeTable, rows: &[usize], date: &str, value: &str) -> TimeSeries {
    let mut buckets: BTreeMap<CellValue, (f64, usize)> = BTreeMap::new();
    for &i in rows {
        let Some(rec) = table.records.get(i) else {
            continue;
        };
        let key = rec.value(date);
        if key.is_null() {
            continue;
        }
        if let Some(v) = rec.number(value) {
            let slot = buckets.entry(key.clone()).or_insert((0.0, 0));
            slot.0 += v;
            slot.1 += 1;
        }
    }
    TimeSeries {
        points: buckets
            .into_iter()
            .map(|(day, (sum, n))| (day.to_string(), sum / n as f64))
            .collect(),
    }
}

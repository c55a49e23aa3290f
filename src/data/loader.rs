use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{columns, CellValue, EmployeeTable, Record};

/// Column order used when the source carries no header order of its own.
const KNOWN_COLUMNS: [&str; 10] = [
    columns::EMPLOYEE_ID,
    columns::DEPARTMENT,
    columns::EDUCATION,
    columns::GENDER,
    columns::REGION,
    columns::AGE,
    columns::NO_OF_TRAININGS,
    columns::LENGTH_OF_SERVICE,
    columns::PREVIOUS_YEAR_RATING,
    columns::DATE,
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an employee table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by one employee per line
/// * `.json`    – `[{ "employee_id": 1, "department": "...", ... }, ...]`
/// * `.parquet` – flat scalar columns, as written by `df.to_parquet()`
pub fn load_file(path: &Path) -> Result<EmployeeTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<EmployeeTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    load_csv_reader(file)
}

/// Parse a CSV byte stream (header row required) into an [`EmployeeTable`].
///
/// Every column is kept; cell types are inferred per value.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<EmployeeTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has no header row");
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(col, value)| (col.clone(), guess_cell_type(value)))
            .collect();
        records.push(record);
    }

    Ok(EmployeeTable::from_records(records, &headers))
}

/// Spellings read as a missing value, the same set pandas' `read_csv` uses.
const NA_VALUES: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() || NA_VALUES.contains(&s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        // Other NaN spellings (`NAN`, `+nan`) parse too.
        return float_cell(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    if looks_like_date(s) {
        return CellValue::Date(s.to_string());
    }
    CellValue::String(s.to_string())
}

/// `YYYY-MM-DD`, optionally followed by a time part.
fn looks_like_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 10
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b'-'
        && b[8..10].iter().all(u8::is_ascii_digit)
        && (b.len() == 10 || matches!(b[10], b'T' | b' '))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "employee_id": 65438, "department": "Sales & Marketing", "age": 35 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<EmployeeTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        records.push(
            obj.iter()
                .map(|(key, val)| (key.clone(), json_to_cell(val)))
                .collect(),
        );
    }

    let order: Vec<String> = KNOWN_COLUMNS.iter().map(|c| c.to_string()).collect();
    Ok(EmployeeTable::from_records(records, &order))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) if looks_like_date(s) => CellValue::Date(s.clone()),
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing one employee per row.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nested columns are shown as their type
/// name.
fn load_parquet(path: &Path) -> Result<EmployeeTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let column_order: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for row in 0..batch.num_rows() {
            let record: Record = schema
                .fields()
                .iter()
                .zip(batch.columns())
                .map(|(field, col)| (field.name().clone(), extract_cell(col, row)))
                .collect();
            records.push(record);
        }
    }

    Ok(EmployeeTable::from_records(records, &column_order))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => string_cell(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => string_cell(col.as_string::<i64>().value(row)),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => {
            float_cell(col.as_primitive::<Float32Type>().value(row) as f64)
        }
        DataType::Float64 => float_cell(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map(|d| CellValue::Date(d.to_string()))
            .unwrap_or(CellValue::Null),
        other => CellValue::String(format!("{other:?}")),
    }
}

fn string_cell(s: &str) -> CellValue {
    if looks_like_date(s) {
        CellValue::Date(s.to_string())
    } else {
        CellValue::String(s.to_string())
    }
}

/// Pandas stores missing numbers as NaN rather than null.
fn float_cell(v: f64) -> CellValue {
    if v.is_nan() {
        CellValue::Null
    } else {
        CellValue::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const CSV: &str = "\
employee_id,department,region,education,gender,recruitment_channel,no_of_trainings,age,previous_year_rating,length_of_service
65438,Sales & Marketing,region_7,Master's & above,f,sourcing,1,35,5,8
65141,Operations,region_22,Bachelor's,m,other,1,30,5,4
7513,Sales & Marketing,region_19,Bachelor's,m,sourcing,1,34,3,7
2542,Sales & Marketing,region_23,Bachelor's,m,other,2,39,1,10
49017,Sales & Marketing,region_7,,m,sourcing,1,24,,2
";

    #[test]
    fn csv_keeps_header_order_and_infers_types() {
        let table = load_csv_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.column_names[0], "employee_id");
        assert_eq!(table.column_names[5], "recruitment_channel");

        let first = &table.records[0];
        assert_eq!(first.value("employee_id"), &CellValue::Integer(65438));
        assert_eq!(
            first.value("department"),
            &CellValue::String("Sales & Marketing".into())
        );
        assert_eq!(first.number("previous_year_rating"), Some(5.0));

        let last = &table.records[4];
        assert!(last.value("education").is_null());
        assert!(last.value("previous_year_rating").is_null());
    }

    #[test]
    fn csv_with_ragged_row_is_an_error() {
        let bad = "employee_id,department\n1,Sales,extra\n";
        let err = load_csv_reader(bad.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("CSV row 0"));
    }

    #[test]
    fn cell_type_inference() {
        assert_eq!(guess_cell_type(""), CellValue::Null);
        assert_eq!(guess_cell_type("NaN"), CellValue::Null);
        assert_eq!(guess_cell_type("42"), CellValue::Integer(42));
        assert_eq!(guess_cell_type("3.5"), CellValue::Float(3.5));
        assert_eq!(guess_cell_type("true"), CellValue::Bool(true));
        assert_eq!(
            guess_cell_type("2021-03-01"),
            CellValue::Date("2021-03-01".into())
        );
        assert_eq!(
            guess_cell_type("2021-03-01 08:00:00"),
            CellValue::Date("2021-03-01 08:00:00".into())
        );
        assert_eq!(
            guess_cell_type("region_7"),
            CellValue::String("region_7".into())
        );
    }

    #[test]
    fn pandas_missing_spellings_are_null() {
        for s in ["NULL", "None", "n/a", "<NA>", "#N/A", "-nan", "-NaN", "NAN", "1.#QNAN"] {
            assert_eq!(guess_cell_type(s), CellValue::Null, "{s}");
        }
        // Only exact tokens count.
        assert_eq!(guess_cell_type("Nonet"), CellValue::String("Nonet".into()));
    }

    #[test]
    fn missing_spellings_keep_numeric_columns_and_drop_rows() {
        let csv = "employee_id,previous_year_rating\n1,3\n2,None\n3,-nan\n4,NULL\n5,4\n";
        let table = load_csv_reader(csv.as_bytes()).unwrap();

        let rows: Vec<usize> = (0..table.len()).collect();
        let summary = crate::data::stats::describe(&table, &rows);
        let rating = summary
            .iter()
            .find(|s| s.column == "previous_year_rating")
            .unwrap();
        assert_eq!(rating.count, 2);

        let clean = table.without_missing();
        assert_eq!(clean.len(), 2);
        assert_eq!(clean.records[1].number("employee_id"), Some(5.0));
    }

    #[test]
    fn load_file_rejects_unknown_extension() {
        let err = load_file(Path::new("employees.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn load_file_reads_json_records() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"employee_id": 1, "department": "Technology", "date": "2020-01-05", "previous_year_rating": null}},
               {{"employee_id": 2, "department": "Analytics", "date": "2020-02-05", "previous_year_rating": 4.0}}]"#
        )
        .unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_names[0], "employee_id");
        assert_eq!(
            table.records[0].value("date"),
            &CellValue::Date("2020-01-05".into())
        );
        assert!(table.records[0].value("previous_year_rating").is_null());
        assert_eq!(table.records[1].number("previous_year_rating"), Some(4.0));
    }

    #[test]
    fn load_file_reads_parquet_columns() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("employee_id", DataType::Int64, false),
            Field::new("department", DataType::Utf8, false),
            Field::new("previous_year_rating", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![10, 11])),
                Arc::new(StringArray::from(vec!["HR", "Legal"])),
                Arc::new(Float64Array::from(vec![Some(3.0), Some(f64::NAN)])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.column_names, ["employee_id", "department", "previous_year_rating"]);
        assert_eq!(table.records[1].value("department"), &CellValue::String("Legal".into()));
        assert!(table.records[1].value("previous_year_rating").is_null());
    }
}

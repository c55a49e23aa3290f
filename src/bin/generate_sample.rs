use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

const ROWS: usize = 500;

const DEPARTMENTS: [&str; 9] = [
    "Sales & Marketing",
    "Operations",
    "Technology",
    "Analytics",
    "R&D",
    "Procurement",
    "Finance",
    "HR",
    "Legal",
];
const EDUCATION: [&str; 3] = ["Bachelor's", "Master's & above", "Below Secondary"];
const GENDERS: [&str; 2] = ["m", "f"];

struct Employee {
    employee_id: i64,
    department: String,
    region: String,
    education: Option<String>,
    gender: String,
    no_of_trainings: i64,
    age: i64,
    previous_year_rating: Option<f64>,
    length_of_service: i64,
    date: String,
}

fn generate(rng: &mut StdRng) -> Vec<Employee> {
    (0..ROWS)
        .map(|_| {
            let age: i64 = rng.random_range(20..=60);
            let max_service = (age - 18).clamp(1, 37);
            let year = rng.random_range(2015..=2023);
            let month = rng.random_range(1..=12);

            Employee {
                employee_id: rng.random_range(1..=78_298),
                department: DEPARTMENTS.choose(rng).copied().unwrap_or("HR").to_string(),
                region: format!("region_{}", rng.random_range(1..=34)),
                // Roughly 4% of education and 7% of ratings are missing.
                education: (!rng.random_bool(0.04))
                    .then(|| EDUCATION.choose(rng).copied().unwrap_or("Bachelor's").to_string()),
                gender: if rng.random_bool(0.3) { GENDERS[1] } else { GENDERS[0] }.to_string(),
                no_of_trainings: 1 + (rng.random::<f64>().powi(4) * 9.0) as i64,
                age,
                previous_year_rating: (!rng.random_bool(0.07))
                    .then(|| rng.random_range(1..=5) as f64),
                length_of_service: rng.random_range(1..=max_service),
                date: format!("{year}-{month:02}-01"),
            }
        })
        .collect()
}

fn write_csv(path: &str, employees: &[Employee]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "employee_id",
        "department",
        "region",
        "education",
        "gender",
        "no_of_trainings",
        "age",
        "previous_year_rating",
        "length_of_service",
        "date",
    ])?;
    for e in employees {
        writer.write_record([
            e.employee_id.to_string(),
            e.department.clone(),
            e.region.clone(),
            e.education.clone().unwrap_or_default(),
            e.gender.clone(),
            e.no_of_trainings.to_string(),
            e.age.to_string(),
            e.previous_year_rating.map(|r| r.to_string()).unwrap_or_default(),
            e.length_of_service.to_string(),
            e.date.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, employees: &[Employee]) -> anyhow::Result<()> {
    let ints = |f: fn(&Employee) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(employees.iter().map(f).collect::<Vec<_>>()))
    };
    let strings = |f: fn(&Employee) -> Option<&str>| -> ArrayRef {
        Arc::new(StringArray::from(employees.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("employee_id", DataType::Int64, false),
        Field::new("department", DataType::Utf8, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("education", DataType::Utf8, true),
        Field::new("gender", DataType::Utf8, false),
        Field::new("no_of_trainings", DataType::Int64, false),
        Field::new("age", DataType::Int64, false),
        Field::new("previous_year_rating", DataType::Float64, true),
        Field::new("length_of_service", DataType::Int64, false),
        Field::new("date", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            ints(|e| e.employee_id),
            strings(|e| Some(e.department.as_str())),
            strings(|e| Some(e.region.as_str())),
            strings(|e| e.education.as_deref()),
            strings(|e| Some(e.gender.as_str())),
            ints(|e| e.no_of_trainings),
            ints(|e| e.age),
            Arc::new(Float64Array::from(
                employees
                    .iter()
                    .map(|e| e.previous_year_rating)
                    .collect::<Vec<_>>(),
            )),
            ints(|e| e.length_of_service),
            strings(|e| Some(e.date.as_str())),
        ],
    )?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let employees = generate(&mut rng);

    write_csv("employee_performance.csv", &employees)?;
    write_parquet("employee_performance.parquet", &employees)?;

    println!(
        "Wrote {} employees to employee_performance.csv and employee_performance.parquet",
        employees.len()
    );
    Ok(())
}

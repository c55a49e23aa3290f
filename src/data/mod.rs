/// Data layer: core types, loading, filtering and the derived views.
///
/// Architecture:
/// ```text
///  drive id / URL ──► remote ──┐
///                              ▼
///  .csv / .json / .parquet ──► loader   parse → EmployeeTable
///                              │
///                              ▼
///                    ┌────────────────┐
///                    │ EmployeeTable  │  Vec<Record>, column index
///                    └────────────────┘
///          ┌──────────┬────────┴───┬────────────┐
///          ▼          ▼            ▼            ▼
///       filter     search      aggregate      stats
///  (dept × edu)  (id substr)  (chart series) (describe)
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod remote;
pub mod search;
pub mod stats;

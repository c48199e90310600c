/// Data layer: table model, loading, and the analysis stages.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Dataset (typed, nullable columns)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Column>
///   └──────────┘
///        │
///        ├──▶ profile     shape, dtypes, nulls, duplicates, describe
///        ├──▶ relational  correlation, pairplot, z-score outliers
///        └──▶ inspect     one column: histogram + box, or counts
/// ```

pub mod inspect;
pub mod loader;
pub mod model;
pub mod profile;
pub mod relational;
pub mod stats;

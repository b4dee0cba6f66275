/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, zero-fill missing cells → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Row>, column schema, unique values
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  cascading year/format predicates → filtered indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;

/// Pivot layer: configuration, cross-tabulation, and the result grid.
///
/// `spec` describes WHAT to pivot (row/column/value fields, aggregation),
/// `builder` turns a filtered view of the Dataset into a `table::PivotTable`
/// or an explicit empty/error outcome.

pub mod builder;
pub mod spec;
pub mod table;

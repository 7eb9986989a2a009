pub mod fields;
pub mod set;
pub mod table;

pub use fields::{
    default_fields, descriptors_for, ComparableField, FieldDescriptor, OrderingPolicy,
    NOT_AVAILABLE,
};
pub use set::{AddOutcome, CompareError, ComparisonSet, ToggleOutcome, MAX_COMPARE};
pub use table::{
    build_comparison_table, ColumnHeader, ComparisonCell, ComparisonRow, ComparisonTable,
};

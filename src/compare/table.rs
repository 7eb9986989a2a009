use super::fields::{ComparableField, FieldDescriptor, OrderingPolicy};
use crate::college::CollegeRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnHeader {
    pub index_label: String, // "College 1", "College 2", ...
    pub id: u64,
    pub display_name: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonCell {
    pub display_text: String,
    pub is_best: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub field: ComparableField,
    pub label: String,
    pub cells: Vec<ComparisonCell>,
}

impl ComparisonRow {
    /// Column index of the best cell, if any
    pub fn best_index(&self) -> Option<usize> {
        self.cells.iter().position(|c| c.is_best)
    }
}

/// Pivoted comparison: one column per college, one row per field
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    /// Number of fields each column holds the best value for
    pub fn best_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.columns.len()];
        for row in &self.rows {
            if let Some(idx) = row.best_index() {
                counts[idx] += 1;
            }
        }
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Build the comparison table for the given colleges, in their given order.
///
/// Each field is evaluated independently: values that fail coercion are
/// skipped when looking for the best value, but every cell is still
/// formatted. When several colleges share the extreme value the first one
/// wins.
pub fn build_comparison_table(
    colleges: &[CollegeRecord],
    fields: &[FieldDescriptor],
) -> ComparisonTable {
    let columns = colleges
        .iter()
        .enumerate()
        .map(|(idx, college)| ColumnHeader {
            index_label: format!("College {}", idx + 1),
            id: college.id,
            display_name: college.display_name().to_string(),
            location: college.location.clone(),
        })
        .collect();

    let rows = fields
        .iter()
        .map(|descriptor| build_row(colleges, descriptor))
        .collect();

    ComparisonTable { columns, rows }
}

fn build_row(colleges: &[CollegeRecord], descriptor: &FieldDescriptor) -> ComparisonRow {
    let best = best_index(colleges, descriptor);

    let cells = colleges
        .iter()
        .enumerate()
        .map(|(idx, college)| ComparisonCell {
            display_text: (descriptor.format)(college),
            is_best: best == Some(idx),
        })
        .collect();

    ComparisonRow {
        field: descriptor.field,
        label: descriptor.label.to_string(),
        cells,
    }
}

/// Linear scan for the extreme coercible value; ties keep the earliest index
fn best_index(colleges: &[CollegeRecord], descriptor: &FieldDescriptor) -> Option<usize> {
    if descriptor.policy == OrderingPolicy::Unordered {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for (idx, college) in colleges.iter().enumerate() {
        let Some(value) = (descriptor.coerce)(college) else {
            continue;
        };
        match best {
            Some((_, current)) if !descriptor.policy.is_better(value, current) => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

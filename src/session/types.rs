use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::compare::ComparisonSet;

/// Persisted comparison selection, restored when the TUI starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    pub version: u32,
    #[serde(default)]
    pub college_ids: Vec<u64>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionState {
    /// Create a new empty selection with version 1
    pub fn new() -> Self {
        Self {
            version: 1,
            college_ids: Vec::new(),
            updated_at: None,
        }
    }

    /// Snapshot the ids of a comparison set, keeping insertion order
    pub fn from_set(set: &ComparisonSet) -> Self {
        Self {
            version: 1,
            college_ids: set.ids(),
            updated_at: Some(Utc::now()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.college_ids.is_empty()
    }

    /// Ids with duplicates dropped, first occurrence wins
    pub fn unique_ids(&self) -> Vec<u64> {
        let mut seen = Vec::with_capacity(self.college_ids.len());
        for id in &self.college_ids {
            if !seen.contains(id) {
                seen.push(*id);
            }
        }
        seen
    }
}

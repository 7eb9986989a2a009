use crate::college::CollegeRecord;

/// Upper bound on how many colleges can be compared side by side
pub const MAX_COMPARE: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompareError {
    #[error("Limit reached: at most {max} colleges can be compared at once")]
    LimitReached { max: usize },
}

/// Result of a successful `add`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// A college with the same id is already selected; nothing changed
    AlreadyPresent,
}

/// Result of `toggle`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// Ordered selection of colleges to compare.
///
/// Insertion order is significant: it is the left-to-right column order of
/// the comparison table and the tie-break order for best values.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSet {
    members: Vec<CollegeRecord>,
    max: usize,
}

impl Default for ComparisonSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonSet {
    pub fn new() -> Self {
        Self::with_max(MAX_COMPARE)
    }

    /// Create a set with a lower limit. Clamped to `1..=MAX_COMPARE`.
    pub fn with_max(max: usize) -> Self {
        let max = max.clamp(1, MAX_COMPARE);
        Self {
            members: Vec::with_capacity(max),
            max,
        }
    }

    /// Append a college unless it is already selected or the set is full
    pub fn add(&mut self, college: CollegeRecord) -> Result<AddOutcome, CompareError> {
        if self.contains(college.id) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        if self.is_full() {
            return Err(CompareError::LimitReached { max: self.max });
        }
        self.members.push(college);
        Ok(AddOutcome::Added)
    }

    /// Remove a college by id. Returns true if it was selected.
    pub fn remove(&mut self, id: u64) -> bool {
        match self.members.iter().position(|c| c.id == id) {
            Some(pos) => {
                self.members.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Remove the college if selected, otherwise add it
    pub fn toggle(&mut self, college: CollegeRecord) -> Result<ToggleOutcome, CompareError> {
        if self.remove(college.id) {
            return Ok(ToggleOutcome::Removed);
        }
        self.add(college).map(|_| ToggleOutcome::Added)
    }

    /// Re-insert a college at a given position (used to undo a removal).
    /// Falls back to appending when the position is past the end.
    pub fn insert_at(&mut self, index: usize, college: CollegeRecord) -> Result<AddOutcome, CompareError> {
        if self.contains(college.id) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        if self.is_full() {
            return Err(CompareError::LimitReached { max: self.max });
        }
        let index = index.min(self.members.len());
        self.members.insert(index, college);
        Ok(AddOutcome::Added)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.members.iter().any(|c| c.id == id)
    }

    pub fn position(&self, id: u64) -> Option<usize> {
        self.members.iter().position(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn members(&self) -> &[CollegeRecord] {
        &self.members
    }

    pub fn ids(&self) -> Vec<u64> {
        self.members.iter().map(|c| c.id).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CollegeRecord> {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn college(id: u64) -> CollegeRecord {
        CollegeRecord::new(id, &format!("College {}", id), "Somewhere")
    }

    fn full_set() -> ComparisonSet {
        let mut set = ComparisonSet::new();
        for id in 1..=4 {
            set.add(college(id)).unwrap();
        }
        set
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut set = ComparisonSet::new();
        set.add(college(3)).unwrap();
        set.add(college(1)).unwrap();
        set.add(college(2)).unwrap();
        assert_eq!(set.ids(), vec![3, 1, 2]);
    }

    #[test]
    fn test_fifth_add_reports_limit_and_leaves_set_unchanged() {
        let mut set = full_set();
        let before = set.clone();

        let result = set.add(college(5));

        assert_eq!(result, Err(CompareError::LimitReached { max: 4 }));
        assert_eq!(set, before);
        assert_eq!(set.ids(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_never_grows_past_max() {
        let mut set = ComparisonSet::new();
        for id in 1..=10 {
            let _ = set.add(college(id));
            assert!(set.len() <= MAX_COMPARE);
        }
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let mut once = ComparisonSet::new();
        once.add(college(1)).unwrap();

        let mut twice = ComparisonSet::new();
        assert_eq!(twice.add(college(1)), Ok(AddOutcome::Added));
        assert_eq!(twice.add(college(1)), Ok(AddOutcome::AlreadyPresent));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_duplicate_add_on_full_set_is_not_an_error() {
        let mut set = full_set();
        assert_eq!(set.add(college(2)), Ok(AddOutcome::AlreadyPresent));
    }

    #[test]
    fn test_remove_member() {
        let mut set = full_set();
        assert!(set.remove(2));
        assert_eq!(set.ids(), vec![1, 3, 4]);
    }

    #[test]
    fn test_remove_non_member_is_noop() {
        let mut set = full_set();
        let before = set.clone();
        assert!(!set.remove(42));
        assert_eq!(set, before);
    }

    #[test]
    fn test_clear() {
        let mut set = full_set();
        set.clear();
        assert!(set.is_empty());
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_room_after_remove() {
        let mut set = full_set();
        set.remove(1);
        assert_eq!(set.add(college(5)), Ok(AddOutcome::Added));
        assert_eq!(set.ids(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_toggle() {
        let mut set = ComparisonSet::new();
        assert_eq!(set.toggle(college(1)), Ok(ToggleOutcome::Added));
        assert_eq!(set.toggle(college(1)), Ok(ToggleOutcome::Removed));
        assert!(set.is_empty());
    }

    #[test]
    fn test_toggle_on_full_set() {
        let mut set = full_set();
        assert_eq!(set.toggle(college(4)), Ok(ToggleOutcome::Removed));
        set.add(college(4)).unwrap();
        assert_eq!(set.toggle(college(9)), Err(CompareError::LimitReached { max: 4 }));
    }

    #[test]
    fn test_with_max_clamps() {
        assert_eq!(ComparisonSet::with_max(10).max(), 4);
        assert_eq!(ComparisonSet::with_max(0).max(), 1);

        let mut set = ComparisonSet::with_max(2);
        set.add(college(1)).unwrap();
        set.add(college(2)).unwrap();
        assert!(set.add(college(3)).is_err());
    }

    #[test]
    fn test_insert_at_restores_position() {
        let mut set = full_set();
        set.remove(2);
        set.insert_at(1, college(2)).unwrap();
        assert_eq!(set.ids(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_limit_message() {
        let err = CompareError::LimitReached { max: 4 };
        assert_eq!(
            err.to_string(),
            "Limit reached: at most 4 colleges can be compared at once"
        );
    }
}

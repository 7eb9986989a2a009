use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;

use crate::college::CollegeRecord;
use crate::compare::{AddOutcome, CompareError, ComparisonSet};
use crate::source::CollegeSource;

const MAX_CONCURRENT_LOOKUPS: usize = 4;

/// Colleges resolved from a list of ids
#[derive(Debug, Default)]
pub struct Resolved {
    /// Found colleges, in the order their ids were requested
    pub colleges: Vec<CollegeRecord>,
    /// Ids the source does not know
    pub missing: Vec<u64>,
}

/// Look up several colleges concurrently, keeping request order.
///
/// Duplicate ids are looked up once. Any source error aborts the whole lookup.
pub async fn fetch_colleges_by_id(source: &dyn CollegeSource, ids: &[u64]) -> Result<Resolved> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }

    let mut found: HashMap<u64, Option<CollegeRecord>> = HashMap::new();
    let mut futures = FuturesUnordered::new();
    let mut pending = unique.iter().copied();
    let lookup = |id: u64| async move { (id, source.get_college(id).await) };

    // Fill initial batch
    for id in pending.by_ref().take(MAX_CONCURRENT_LOOKUPS) {
        futures.push(lookup(id));
    }

    // Process results and feed new lookups
    while let Some((id, result)) = futures.next().await {
        found.insert(id, result?);
        if let Some(next) = pending.next() {
            futures.push(lookup(next));
        }
    }

    let mut resolved = Resolved::default();
    for id in unique {
        match found.remove(&id).flatten() {
            Some(college) => resolved.colleges.push(college),
            None => resolved.missing.push(id),
        }
    }

    tracing::debug!(
        found = resolved.colleges.len(),
        missing = resolved.missing.len(),
        "resolved college ids"
    );
    Ok(resolved)
}

/// Outcome of filling a comparison set from a list of colleges
#[derive(Debug, Default, PartialEq)]
pub struct FillReport {
    pub added: Vec<u64>,
    /// Colleges that did not fit because the set was full
    pub rejected: Vec<u64>,
}

/// Add colleges in order. Overflow is reported rather than treated as an error.
pub fn fill_set(set: &mut ComparisonSet, colleges: Vec<CollegeRecord>) -> FillReport {
    let mut report = FillReport::default();
    for college in colleges {
        let id = college.id;
        match set.add(college) {
            Ok(AddOutcome::Added) => report.added.push(id),
            Ok(AddOutcome::AlreadyPresent) => {}
            Err(CompareError::LimitReached { max }) => {
                tracing::debug!(id, max, "comparison set full, college ignored");
                report.rejected.push(id);
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryStore;

    #[tokio::test]
    async fn test_fetch_keeps_request_order() {
        let store = InMemoryStore::seeded().unwrap();
        let resolved = fetch_colleges_by_id(&store, &[7, 1, 300, 12, 3, 5, 1])
            .await
            .unwrap();

        let ids: Vec<u64> = resolved.colleges.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![7, 1, 12, 3, 5]);
        assert_eq!(resolved.missing, vec![300]);
    }

    #[tokio::test]
    async fn test_fetch_empty() {
        let store = InMemoryStore::seeded().unwrap();
        let resolved = fetch_colleges_by_id(&store, &[]).await.unwrap();
        assert!(resolved.colleges.is_empty());
        assert!(resolved.missing.is_empty());
    }

    #[test]
    fn test_fill_set_reports_overflow() {
        let colleges: Vec<_> = (1..=6)
            .map(|id| CollegeRecord::new(id, &format!("C{}", id), "X"))
            .collect();
        let mut set = ComparisonSet::new();

        let report = fill_set(&mut set, colleges);
        assert_eq!(report.added, vec![1, 2, 3, 4]);
        assert_eq!(report.rejected, vec![5, 6]);
        assert_eq!(set.ids(), vec![1, 2, 3, 4]);
    }
}

use serde::{Deserialize, Serialize};

use crate::college::CollegeRecord;

/// Rank used for ordering when a college has none
const UNRANKED: i64 = 999;

pub const DEFAULT_PREDICTION_LIMIT: usize = 10;

/// Query over the college directory.
///
/// All criteria are optional and combine with AND. `limit` and `offset`
/// of zero mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeFilter {
    /// Case-insensitive match on name, short name or location
    pub search: Option<String>,
    /// Case-insensitive substring of location
    pub location: Option<String>,
    /// Exact state name
    pub state: Option<String>,
    pub min_fees: Option<f64>,
    pub max_fees: Option<f64>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl CollegeFilter {
    pub fn search(term: &str) -> Self {
        Self {
            search: Some(term.to_string()),
            ..Default::default()
        }
    }

    /// Query string pairs using the API's parameter names
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref s) = self.search {
            pairs.push(("search", s.clone()));
        }
        if let Some(ref s) = self.state {
            pairs.push(("state", s.clone()));
        }
        if let Some(ref s) = self.location {
            pairs.push(("location", s.clone()));
        }
        if let Some(v) = self.min_fees {
            pairs.push(("minFees", trim_float(v)));
        }
        if let Some(v) = self.max_fees {
            pairs.push(("maxFees", trim_float(v)));
        }
        if let Some(v) = self.limit.filter(|v| *v > 0) {
            pairs.push(("limit", v.to_string()));
        }
        if let Some(v) = self.offset.filter(|v| *v > 0) {
            pairs.push(("offset", v.to_string()));
        }
        pairs
    }

    fn matches(&self, college: &CollegeRecord) -> bool {
        if let Some(ref term) = self.search {
            let term = term.to_lowercase();
            let hit = college.name.to_lowercase().contains(&term)
                || college
                    .short_name
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&term))
                || college.location.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        if let Some(ref state) = self.state {
            if &college.state != state {
                return false;
            }
        }

        if let Some(ref location) = self.location {
            if !college
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }

        if self.min_fees.is_some() || self.max_fees.is_some() {
            // Absent fees count as free; unparseable fees never match a bound
            let fee = match college.fees {
                None => Some(0.0),
                Some(ref raw) => raw.as_f64(),
            };
            let Some(fee) = fee else {
                return false;
            };
            if self.min_fees.is_some_and(|min| fee < min) {
                return false;
            }
            if self.max_fees.is_some_and(|max| fee > max) {
                return false;
            }
        }

        true
    }
}

fn trim_float(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

/// Ordering key: rank ascending, missing or zero ranks last
fn rank_key(college: &CollegeRecord) -> i64 {
    college
        .rank_value()
        .filter(|r| *r != 0)
        .unwrap_or(UNRANKED)
}

/// Filter, sort by rank (stable), then page
pub fn apply_filter<I>(colleges: I, filter: &CollegeFilter) -> Vec<CollegeRecord>
where
    I: IntoIterator<Item = CollegeRecord>,
{
    let mut results: Vec<CollegeRecord> = colleges
        .into_iter()
        .filter(|c| filter.matches(c))
        .collect();

    results.sort_by_key(rank_key);

    let offset = filter.offset.unwrap_or(0);
    let iter = results.into_iter().skip(offset);
    match filter.limit.filter(|l| *l > 0) {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}

/// Colleges within 10% of their cutoff score, in rank order
pub fn predict<I>(colleges: I, score: f64, limit: usize) -> Vec<CollegeRecord>
where
    I: IntoIterator<Item = CollegeRecord>,
{
    let ranked = apply_filter(colleges, &CollegeFilter::default());
    ranked
        .into_iter()
        .filter(|c| score >= c.cutoff_score.unwrap_or(0) as f64 * 0.9)
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::college::RawNumber;

    fn college(id: u64, name: &str, location: &str, state: &str, rank: Option<i64>) -> CollegeRecord {
        let mut c = CollegeRecord::new(id, name, location);
        c.state = state.to_string();
        c.overall_rank = rank.map(RawNumber::Int);
        c
    }

    fn sample() -> Vec<CollegeRecord> {
        let mut a = college(1, "Alpha Institute", "Pune, Maharashtra", "Maharashtra", Some(3));
        a.fees = Some(RawNumber::from("120000"));
        a.cutoff_score = Some(90);
        let mut b = college(2, "Beta University", "New Delhi, Delhi", "Delhi", None);
        b.short_name = Some("BU".to_string());
        b.fees = None;
        b.cutoff_score = Some(50);
        let mut c = college(3, "Gamma College", "Delhi Cantt, Delhi", "Delhi", Some(1));
        c.fees = Some(RawNumber::from("45000"));
        let mut d = college(4, "Delta School", "Mumbai, Maharashtra", "Maharashtra", Some(3));
        d.fees = Some(RawNumber::from("ask office"));
        d.cutoff_score = Some(99);
        vec![a, b, c, d]
    }

    fn ids(colleges: &[CollegeRecord]) -> Vec<u64> {
        colleges.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_no_filter_sorts_by_rank_stably() {
        let results = apply_filter(sample(), &CollegeFilter::default());
        assert_eq!(ids(&results), vec![3, 1, 4, 2]);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        assert_eq!(ids(&apply_filter(sample(), &CollegeFilter::search("ALPHA"))), vec![1]);
        assert_eq!(ids(&apply_filter(sample(), &CollegeFilter::search("bu"))), vec![2]);
        assert_eq!(ids(&apply_filter(sample(), &CollegeFilter::search("delhi"))), vec![3, 2]);
    }

    #[test]
    fn test_state_is_exact() {
        let filter = CollegeFilter {
            state: Some("delhi".to_string()),
            ..Default::default()
        };
        assert!(apply_filter(sample(), &filter).is_empty());

        let filter = CollegeFilter {
            state: Some("Delhi".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filter(sample(), &filter)), vec![3, 2]);
    }

    #[test]
    fn test_location_substring() {
        let filter = CollegeFilter {
            location: Some("mumbai".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filter(sample(), &filter)), vec![4]);
    }

    #[test]
    fn test_fee_bounds() {
        let filter = CollegeFilter {
            max_fees: Some(100000.0),
            ..Default::default()
        };
        // missing fees count as zero, unparseable fees are dropped
        assert_eq!(ids(&apply_filter(sample(), &filter)), vec![3, 2]);

        let filter = CollegeFilter {
            min_fees: Some(50000.0),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filter(sample(), &filter)), vec![1]);
    }

    #[test]
    fn test_offset_and_limit() {
        let filter = CollegeFilter {
            offset: Some(1),
            limit: Some(2),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filter(sample(), &filter)), vec![1, 4]);

        let filter = CollegeFilter {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(apply_filter(sample(), &filter).len(), 4);
    }

    #[test]
    fn test_predict() {
        // cutoffs: 1 -> 90, 2 -> 50, 3 -> none (0), 4 -> 99
        let results = predict(sample(), 81.0, 10);
        assert_eq!(ids(&results), vec![3, 1, 2]);

        let results = predict(sample(), 40.0, 10);
        assert_eq!(ids(&results), vec![3]);

        let results = predict(sample(), 100.0, 2);
        assert_eq!(ids(&results), vec![3, 1]);
    }

    #[test]
    fn test_query_pairs() {
        let filter = CollegeFilter {
            search: Some("iit".to_string()),
            state: Some("Delhi".to_string()),
            min_fees: Some(1000.0),
            max_fees: Some(2500.5),
            limit: Some(20),
            offset: Some(0),
            ..Default::default()
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("search", "iit".to_string()),
                ("state", "Delhi".to_string()),
                ("minFees", "1000".to_string()),
                ("maxFees", "2500.5".to_string()),
                ("limit", "20".to_string()),
            ]
        );
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::filter::{apply_filter, predict, CollegeFilter};
use super::CollegeSource;
use crate::college::{CollegeRecord, Comparison, Exam, NewComparison, NewReview, Review};

const SEED_DATA: &str = include_str!("../../data/seed.json");

/// Fixture layout: colleges are required, everything else optional
#[derive(Debug, Deserialize)]
struct Fixture {
    colleges: Vec<CollegeRecord>,
    #[serde(default)]
    exams: Vec<Exam>,
    #[serde(default)]
    reviews: Vec<Review>,
}

#[derive(Debug, Default)]
struct StoreData {
    colleges: BTreeMap<u64, CollegeRecord>,
    exams: BTreeMap<u64, Exam>,
    reviews: BTreeMap<u64, Review>,
    comparisons: BTreeMap<u64, Comparison>,
    next_college_id: u64,
    next_review_id: u64,
    next_comparison_id: u64,
}

fn next_id<V>(map: &BTreeMap<u64, V>) -> u64 {
    map.keys().next_back().map_or(1, |max| max + 1)
}

/// In-process data source backed by ordered maps.
///
/// Nothing is written back to disk; created records live as long as the store.
#[derive(Debug)]
pub struct InMemoryStore {
    inner: RwLock<StoreData>,
    origin: Option<PathBuf>,
}

impl InMemoryStore {
    /// Store with the bundled sample directory
    pub fn seeded() -> Result<Self> {
        Self::from_json(SEED_DATA, None).context("Bundled seed data is invalid")
    }

    /// Store loaded from a JSON fixture file
    pub fn from_fixture(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture at {}", path.display()))?;
        Self::from_json(&content, Some(path.to_path_buf()))
            .with_context(|| format!("Failed to load fixture at {}", path.display()))
    }

    /// Empty store
    pub fn empty() -> Self {
        Self::from_records(Vec::new(), Vec::new())
    }

    pub fn from_records(colleges: Vec<CollegeRecord>, exams: Vec<Exam>) -> Self {
        let mut data = StoreData::default();
        for college in colleges {
            data.colleges.insert(college.id, college);
        }
        for exam in exams {
            data.exams.insert(exam.id, exam);
        }
        data.next_college_id = next_id(&data.colleges);
        data.next_review_id = 1;
        data.next_comparison_id = 1;
        Self {
            inner: RwLock::new(data),
            origin: None,
        }
    }

    fn from_json(content: &str, origin: Option<PathBuf>) -> Result<Self> {
        let fixture: Fixture = serde_json::from_str(content).context("Invalid fixture JSON")?;

        let college_count = fixture.colleges.len();
        let mut store = Self::from_records(fixture.colleges, fixture.exams);
        let data = store.inner.get_mut().map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        if data.colleges.len() != college_count {
            anyhow::bail!(
                "Fixture contains duplicate college ids ({} records, {} unique)",
                college_count,
                data.colleges.len()
            );
        }
        for review in fixture.reviews {
            data.reviews.insert(review.id, review);
        }
        data.next_review_id = next_id(&data.reviews);
        store.origin = origin;
        Ok(store)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreData>> {
        self.inner
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreData>> {
        self.inner
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))
    }
}

#[async_trait]
impl CollegeSource for InMemoryStore {
    async fn list_colleges(&self, filter: &CollegeFilter) -> Result<Vec<CollegeRecord>> {
        let data = self.read()?;
        Ok(apply_filter(data.colleges.values().cloned(), filter))
    }

    async fn get_college(&self, id: u64) -> Result<Option<CollegeRecord>> {
        Ok(self.read()?.colleges.get(&id).cloned())
    }

    async fn create_college(&self, mut college: CollegeRecord) -> Result<CollegeRecord> {
        let mut data = self.write()?;
        college.id = data.next_college_id;
        college.created_at = Some(Utc::now());
        data.next_college_id += 1;
        data.colleges.insert(college.id, college.clone());
        Ok(college)
    }

    async fn list_exams(&self) -> Result<Vec<Exam>> {
        Ok(self.read()?.exams.values().cloned().collect())
    }

    async fn get_exam(&self, id: u64) -> Result<Option<Exam>> {
        Ok(self.read()?.exams.get(&id).cloned())
    }

    async fn reviews_for(&self, college_id: u64) -> Result<Vec<Review>> {
        let data = self.read()?;
        Ok(data
            .reviews
            .values()
            .filter(|r| r.college_id == Some(college_id))
            .cloned()
            .collect())
    }

    async fn create_review(&self, college_id: u64, review: NewReview) -> Result<Review> {
        let mut data = self.write()?;
        let id = data.next_review_id;
        data.next_review_id += 1;
        let review = Review {
            id,
            college_id: Some(college_id),
            student_name: review.student_name,
            course: review.course,
            graduation_year: review.graduation_year,
            rating: review.rating,
            title: review.title,
            content: review.content,
            likes: 0,
            verified: false,
            created_at: Some(Utc::now()),
        };
        data.reviews.insert(id, review.clone());
        Ok(review)
    }

    async fn create_comparison(&self, comparison: NewComparison) -> Result<Comparison> {
        let mut data = self.write()?;
        let id = data.next_comparison_id;
        data.next_comparison_id += 1;
        let comparison = Comparison {
            id,
            name: comparison.name,
            college_ids: Some(comparison.college_ids),
            user_id: comparison.user_id,
            created_at: Some(Utc::now()),
        };
        data.comparisons.insert(id, comparison.clone());
        Ok(comparison)
    }

    async fn get_comparison(&self, id: u64) -> Result<Option<Comparison>> {
        Ok(self.read()?.comparisons.get(&id).cloned())
    }

    async fn predict_colleges(&self, score: f64, limit: usize) -> Result<Vec<CollegeRecord>> {
        let data = self.read()?;
        Ok(predict(data.colleges.values().cloned(), score, limit))
    }

    fn describe(&self) -> String {
        match self.origin {
            Some(ref path) => format!("fixture {}", path.display()),
            None => "bundled sample data".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::college::RawNumber;

    fn ids(colleges: &[CollegeRecord]) -> Vec<u64> {
        colleges.iter().map(|c| c.id).collect()
    }

    #[tokio::test]
    async fn test_seeded_store() {
        let store = InMemoryStore::seeded().unwrap();
        let all = store.list_colleges(&CollegeFilter::default()).await.unwrap();
        assert_eq!(all.len(), 21);
        assert_eq!(store.list_exams().await.unwrap().len(), 17);

        let iitd = store.get_college(1).await.unwrap().unwrap();
        assert_eq!(iitd.display_name(), "IIT Delhi");
        assert_eq!(iitd.fee_amount(), Some(250000.0));
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let store = InMemoryStore::seeded().unwrap();
        assert!(store.get_college(999).await.unwrap().is_none());
        assert!(store.get_exam(999).await.unwrap().is_none());
        assert!(store.get_comparison(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filter_by_state_orders_by_rank() {
        let store = InMemoryStore::seeded().unwrap();
        let filter = CollegeFilter {
            state: Some("Delhi".to_string()),
            ..Default::default()
        };
        let results = store.list_colleges(&filter).await.unwrap();
        assert_eq!(ids(&results), vec![1, 2, 18, 19, 20, 21, 17, 15, 8]);
    }

    #[tokio::test]
    async fn test_search_short_name() {
        let store = InMemoryStore::seeded().unwrap();
        let results = store
            .list_colleges(&CollegeFilter::search("iim"))
            .await
            .unwrap();
        assert_eq!(ids(&results), vec![2, 3, 12]);
    }

    #[tokio::test]
    async fn test_create_college_assigns_next_id() {
        let store = InMemoryStore::seeded().unwrap();
        let mut college = CollegeRecord::new(500, "New Campus", "Goa");
        college.overall_rank = Some(RawNumber::Int(7));

        let created = store.create_college(college).await.unwrap();
        assert_eq!(created.id, 22);
        assert!(created.created_at.is_some());
        assert_eq!(store.get_college(22).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_reviews_roundtrip() {
        let store = InMemoryStore::seeded().unwrap();
        assert!(store.reviews_for(4).await.unwrap().is_empty());

        let review = NewReview {
            student_name: Some("Meera".to_string()),
            rating: Some(RawNumber::from("4.0")),
            title: Some("Great labs".to_string()),
            ..Default::default()
        };
        let created = store.create_review(4, review).await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.college_id, Some(4));
        assert_eq!(created.likes, 0);

        let reviews = store.reviews_for(4).await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].title.as_deref(), Some("Great labs"));
        assert!(store.reviews_for(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comparisons() {
        let store = InMemoryStore::empty();
        let saved = store
            .create_comparison(NewComparison {
                name: Some("IITs".to_string()),
                college_ids: vec![1, 5, 6],
                user_id: None,
            })
            .await
            .unwrap();
        assert_eq!(saved.id, 1);

        let loaded = store.get_comparison(1).await.unwrap().unwrap();
        assert_eq!(loaded.college_ids, Some(vec![1, 5, 6]));
        assert_eq!(loaded.name.as_deref(), Some("IITs"));
    }

    #[tokio::test]
    async fn test_predict_colleges() {
        let store = InMemoryStore::seeded().unwrap();

        // 70 reaches only cutoffs up to 77
        let results = store.predict_colleges(70.0, 10).await.unwrap();
        assert_eq!(ids(&results), vec![15, 9, 8]);

        let results = store.predict_colleges(100.0, 10).await.unwrap();
        assert_eq!(results.len(), 10);
    }

    #[tokio::test]
    async fn test_fixture_file() {
        let path = std::env::temp_dir().join("college_compare_test_fixture.json");
        std::fs::write(
            &path,
            r#"{"colleges": [
                {"id": 10, "name": "Ten", "location": "X", "overallRank": 2},
                {"id": 3, "name": "Three", "location": "Y", "overallRank": "1"}
            ]}"#,
        )
        .unwrap();

        let store = InMemoryStore::from_fixture(&path).unwrap();
        let all = store.list_colleges(&CollegeFilter::default()).await.unwrap();
        assert_eq!(ids(&all), vec![3, 10]);
        assert!(store.describe().contains("fixture"));

        let created = store
            .create_college(CollegeRecord::new(0, "Eleven", "Z"))
            .await
            .unwrap();
        assert_eq!(created.id, 11);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_fixture_duplicate_ids_rejected() {
        let path = std::env::temp_dir().join("college_compare_test_fixture_dupes.json");
        std::fs::write(
            &path,
            r#"{"colleges": [
                {"id": 1, "name": "A", "location": "X"},
                {"id": 1, "name": "B", "location": "Y"}
            ]}"#,
        )
        .unwrap();

        let err = InMemoryStore::from_fixture(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("duplicate college ids"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_fixture() {
        let err = InMemoryStore::from_fixture(Path::new("/no/such/fixture.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read fixture"));
    }
}

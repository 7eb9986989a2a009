use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric field as it arrives from a fixture or the API.
///
/// The backend stores decimals as strings (`"250000"`, `"4.5"`), while
/// hand-written fixtures tend to use plain numbers. Both are accepted and
/// coerced on demand; nothing is parsed at deserialization time so the
/// original text is kept for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawNumber {
    /// Parse as a finite floating point value
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            RawNumber::Int(n) => *n as f64,
            RawNumber::Float(f) => *f,
            RawNumber::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Parse as an integer. Fractional values are rejected rather than truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawNumber::Int(n) => Some(*n),
            RawNumber::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            RawNumber::Float(_) => None,
            RawNumber::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

impl fmt::Display for RawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawNumber::Int(n) => write!(f, "{}", n),
            RawNumber::Float(v) => write!(f, "{}", v),
            RawNumber::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

impl From<i64> for RawNumber {
    fn from(value: i64) -> Self {
        RawNumber::Int(value)
    }
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Float(value)
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeesPeriod {
    #[default]
    Yearly,
    Total,
    Semester,
}

impl FeesPeriod {
    /// Suffix appended to a formatted fee amount.
    /// Only `total` is distinguished; semester fees render as yearly.
    pub fn suffix(&self) -> &'static str {
        match self {
            FeesPeriod::Total => " total",
            FeesPeriod::Yearly | FeesPeriod::Semester => "/year",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeRecord {
    pub id: u64,
    pub name: String,
    pub short_name: Option<String>,
    pub location: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    pub established_year: Option<i32>,
    #[serde(rename = "type")]
    pub college_type: Option<String>,
    pub affiliation: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub overall_rank: Option<RawNumber>,
    #[serde(rename = "nirf_rank")]
    pub nirf_rank: Option<i64>,
    pub fees: Option<RawNumber>,
    #[serde(default)]
    pub fees_period: FeesPeriod,
    pub rating: Option<RawNumber>,
    #[serde(default)]
    pub review_count: u32,
    pub admission_process: Option<String>,
    pub cutoff_score: Option<i64>,
    pub placement_rate: Option<RawNumber>,
    pub average_package: Option<RawNumber>,
    pub highest_package: Option<RawNumber>,
    pub hostel_fees: Option<RawNumber>,
    #[serde(default)]
    pub has_hostel: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl CollegeRecord {
    /// Minimal record with only the required fields set
    pub fn new(id: u64, name: &str, location: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            short_name: None,
            location: location.to_string(),
            state: String::new(),
            city: String::new(),
            established_year: None,
            college_type: None,
            affiliation: None,
            description: None,
            website: None,
            overall_rank: None,
            nirf_rank: None,
            fees: None,
            fees_period: FeesPeriod::Yearly,
            rating: None,
            review_count: 0,
            admission_process: None,
            cutoff_score: None,
            placement_rate: None,
            average_package: None,
            highest_package: None,
            hostel_fees: None,
            has_hostel: false,
            created_at: None,
        }
    }

    /// Short name when available, full name otherwise
    pub fn display_name(&self) -> &str {
        self.short_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.name)
    }

    pub fn rank_value(&self) -> Option<i64> {
        self.overall_rank.as_ref().and_then(RawNumber::as_i64)
    }

    pub fn fee_amount(&self) -> Option<f64> {
        self.fees.as_ref().and_then(RawNumber::as_f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: u64,
    pub name: String,
    pub full_name: Option<String>,
    #[serde(rename = "type")]
    pub exam_type: String,
    pub conducting_body: Option<String>,
    pub frequency: Option<String>,
    pub application_start_date: Option<DateTime<Utc>>,
    pub application_end_date: Option<DateTime<Utc>>,
    pub exam_date: Option<DateTime<Utc>>,
    pub result_date: Option<DateTime<Utc>>,
    pub eligibility: Option<String>,
    pub syllabus: Option<String>,
    pub exam_pattern: Option<String>,
    pub total_marks: Option<u32>,
    pub duration: Option<String>,
    pub website: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: u64,
    pub college_id: Option<u64>,
    pub student_name: Option<String>,
    pub course: Option<String>,
    pub graduation_year: Option<i32>,
    pub rating: Option<RawNumber>,
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub verified: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Review payload submitted by a user; the store assigns id and timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub student_name: Option<String>,
    pub course: Option<String>,
    pub graduation_year: Option<i32>,
    pub rating: Option<RawNumber>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// A named, stored set of college ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub id: u64,
    pub name: Option<String>,
    pub college_ids: Option<Vec<u64>>,
    pub user_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComparison {
    pub name: Option<String>,
    pub college_ids: Vec<u64>,
    pub user_id: Option<String>,
}

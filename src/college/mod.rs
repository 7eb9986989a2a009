pub mod types;

pub use types::{
    CollegeRecord, Comparison, Exam, FeesPeriod, NewComparison, NewReview, RawNumber, Review,
};

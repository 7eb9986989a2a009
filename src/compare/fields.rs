use serde::{Deserialize, Serialize};

use crate::college::{CollegeRecord, FeesPeriod, RawNumber};

/// Placeholder for values that are absent or fail to parse
pub const NOT_AVAILABLE: &str = "N/A";
const FEES_NOT_SPECIFIED: &str = "Not specified";
const LAKH: f64 = 100_000.0;

/// Attributes that can appear as a row of the comparison table.
///
/// Config files name these in snake_case, e.g. `fields: [overall_rank, fees]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparableField {
    OverallRank,
    Type,
    EstablishedYear,
    Fees,
    Rating,
    PlacementRate,
    AveragePackage,
    HasHostel,
}

impl ComparableField {
    /// Every field, in default display order
    pub const ALL: [ComparableField; 8] = [
        ComparableField::OverallRank,
        ComparableField::Type,
        ComparableField::EstablishedYear,
        ComparableField::Fees,
        ComparableField::Rating,
        ComparableField::PlacementRate,
        ComparableField::AveragePackage,
        ComparableField::HasHostel,
    ];

    pub fn descriptor(self) -> FieldDescriptor {
        match self {
            ComparableField::OverallRank => FieldDescriptor {
                field: self,
                label: "Overall Rank",
                policy: OrderingPolicy::LowerIsBetter,
                coerce: coerce_rank,
                format: |c| format_rank(c.overall_rank.as_ref()),
            },
            ComparableField::Type => FieldDescriptor {
                field: self,
                label: "Type",
                policy: OrderingPolicy::Unordered,
                coerce: |_| None,
                format: |c| text_or_placeholder(c.college_type.as_deref()),
            },
            ComparableField::EstablishedYear => FieldDescriptor {
                field: self,
                label: "Established",
                policy: OrderingPolicy::Unordered,
                coerce: |_| None,
                format: |c| {
                    c.established_year
                        .map(|y| y.to_string())
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
                },
            },
            ComparableField::Fees => FieldDescriptor {
                field: self,
                label: "Fees",
                policy: OrderingPolicy::LowerIsBetter,
                coerce: coerce_fees,
                format: |c| format_fees(c.fees.as_ref(), c.fees_period),
            },
            ComparableField::Rating => FieldDescriptor {
                field: self,
                label: "Rating",
                policy: OrderingPolicy::HigherIsBetter,
                coerce: coerce_rating,
                format: |c| format_rating(c.rating.as_ref()),
            },
            ComparableField::PlacementRate => FieldDescriptor {
                field: self,
                label: "Placement Rate",
                policy: OrderingPolicy::HigherIsBetter,
                coerce: |c| c.placement_rate.as_ref().and_then(RawNumber::as_f64),
                format: |c| format_percentage(c.placement_rate.as_ref()),
            },
            ComparableField::AveragePackage => FieldDescriptor {
                field: self,
                label: "Avg Package",
                policy: OrderingPolicy::HigherIsBetter,
                coerce: |c| c.average_package.as_ref().and_then(RawNumber::as_f64),
                format: |c| format_package(c.average_package.as_ref()),
            },
            ComparableField::HasHostel => FieldDescriptor {
                field: self,
                label: "Hostel",
                policy: OrderingPolicy::Unordered,
                coerce: |_| None,
                format: |c| format_hostel(c.has_hostel),
            },
        }
    }
}

/// Which direction wins when comparing a field across colleges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingPolicy {
    LowerIsBetter,
    HigherIsBetter,
    Unordered,
}

impl OrderingPolicy {
    /// Strictly better, so that on ties the earlier candidate is kept
    pub fn is_better(self, candidate: f64, current: f64) -> bool {
        match self {
            OrderingPolicy::LowerIsBetter => candidate < current,
            OrderingPolicy::HigherIsBetter => candidate > current,
            OrderingPolicy::Unordered => false,
        }
    }
}

/// How to read, coerce and render one comparable attribute
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub field: ComparableField,
    pub label: &'static str,
    pub policy: OrderingPolicy,
    /// Numeric form used for best-value selection; `None` means not comparable
    pub coerce: fn(&CollegeRecord) -> Option<f64>,
    /// Display text; receives the whole record for cross-field formatting
    pub format: fn(&CollegeRecord) -> String,
}

/// Descriptors for every field in default order
pub fn default_fields() -> Vec<FieldDescriptor> {
    descriptors_for(&ComparableField::ALL)
}

pub fn descriptors_for(fields: &[ComparableField]) -> Vec<FieldDescriptor> {
    fields.iter().map(|f| f.descriptor()).collect()
}

fn coerce_rank(college: &CollegeRecord) -> Option<f64> {
    college
        .rank_value()
        .filter(|rank| *rank > 0)
        .map(|rank| rank as f64)
}

fn coerce_fees(college: &CollegeRecord) -> Option<f64> {
    college.fee_amount().filter(|amount| *amount >= 0.0)
}

fn coerce_rating(college: &CollegeRecord) -> Option<f64> {
    college
        .rating
        .as_ref()
        .and_then(RawNumber::as_f64)
        .filter(|r| (0.0..=5.0).contains(r))
}

fn text_or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// "#3", or "#N/A" when the rank is absent or not an integer
pub fn format_rank(rank: Option<&RawNumber>) -> String {
    match rank.and_then(RawNumber::as_i64) {
        Some(r) => format!("#{}", r),
        None => format!("#{}", NOT_AVAILABLE),
    }
}

/// Format a fee in lakhs above 1L, with thousands separators below
///
/// 2500000 yearly -> "₹25.0L/year", 2500000 total -> "₹25.0L total",
/// 50000 yearly -> "₹50,000/year"
pub fn format_fees(fees: Option<&RawNumber>, period: FeesPeriod) -> String {
    let Some(amount) = fees.and_then(RawNumber::as_f64) else {
        return FEES_NOT_SPECIFIED.to_string();
    };
    format_fee_amount(amount, period)
}

pub fn format_fee_amount(amount: f64, period: FeesPeriod) -> String {
    if amount >= LAKH {
        format!("₹{:.1}L{}", amount / LAKH, period.suffix())
    } else {
        format!("₹{}{}", group_thousands(amount), period.suffix())
    }
}

pub fn format_rating(rating: Option<&RawNumber>) -> String {
    match rating {
        Some(r) if r.as_f64().is_some() => format!("{}/5", r),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_percentage(rate: Option<&RawNumber>) -> String {
    match rate {
        Some(r) if r.as_f64().is_some() => format!("{}%", r),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Monetary amount in lakhs, e.g. "₹18.0L"
pub fn format_package(package: Option<&RawNumber>) -> String {
    match package.and_then(RawNumber::as_f64) {
        Some(amount) => format!("₹{:.1}L", amount / LAKH),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_hostel(has_hostel: bool) -> String {
    if has_hostel {
        "Available".to_string()
    } else {
        "Not Available".to_string()
    }
}

/// Western digit grouping with up to three fractional digits ("50,000", "1,234.5")
fn group_thousands(amount: f64) -> String {
    let rounded = (amount * 1000.0).round() / 1000.0;
    let negative = rounded < 0.0;
    let abs = rounded.abs();
    let whole = abs.trunc() as u64;
    let frac = abs - whole as f64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if frac > 0.0 {
        let frac_str = format!("{:.3}", frac);
        let trimmed = frac_str.trim_end_matches('0');
        // "0.500" -> ".5"
        if let Some(decimals) = trimmed.strip_prefix('0') {
            if decimals.len() > 1 {
                grouped.push_str(decimals);
            }
        }
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn college_with_fees(fees: &str, period: FeesPeriod) -> CollegeRecord {
        let mut c = CollegeRecord::new(1, "Test College", "Delhi");
        c.fees = Some(RawNumber::from(fees));
        c.fees_period = period;
        c
    }

    #[test]
    fn test_format_fees_lakh_yearly() {
        assert_eq!(
            format_fees(Some(&RawNumber::from("2500000")), FeesPeriod::Yearly),
            "₹25.0L/year"
        );
    }

    #[test]
    fn test_format_fees_lakh_total() {
        assert_eq!(
            format_fees(Some(&RawNumber::from("2500000")), FeesPeriod::Total),
            "₹25.0L total"
        );
    }

    #[test]
    fn test_format_fees_below_lakh() {
        assert_eq!(
            format_fees(Some(&RawNumber::from("50000")), FeesPeriod::Yearly),
            "₹50,000/year"
        );
        assert_eq!(
            format_fees(Some(&RawNumber::Int(950)), FeesPeriod::Total),
            "₹950 total"
        );
    }

    #[test]
    fn test_format_fees_boundary_is_lakh() {
        assert_eq!(
            format_fees(Some(&RawNumber::Int(100_000)), FeesPeriod::Yearly),
            "₹1.0L/year"
        );
        assert_eq!(
            format_fees(Some(&RawNumber::Int(99_999)), FeesPeriod::Yearly),
            "₹99,999/year"
        );
    }

    #[test]
    fn test_format_fees_semester_uses_year_suffix() {
        assert_eq!(
            format_fees(Some(&RawNumber::from("130000")), FeesPeriod::Semester),
            "₹1.3L/year"
        );
    }

    #[test]
    fn test_format_fees_missing_or_garbage() {
        assert_eq!(format_fees(None, FeesPeriod::Yearly), "Not specified");
        assert_eq!(
            format_fees(Some(&RawNumber::from("call us")), FeesPeriod::Yearly),
            "Not specified"
        );
    }

    #[test]
    fn test_format_fees_free() {
        assert_eq!(format_fees(Some(&RawNumber::from("0")), FeesPeriod::Yearly), "₹0/year");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(45000.0), "45,000");
        assert_eq!(group_thousands(1234.5), "1,234.5");
    }

    #[test]
    fn test_format_rank() {
        assert_eq!(format_rank(Some(&RawNumber::Int(3))), "#3");
        assert_eq!(format_rank(None), "#N/A");
        assert_eq!(format_rank(Some(&RawNumber::from("top"))), "#N/A");
    }

    #[test]
    fn test_format_rating_and_percentage() {
        assert_eq!(format_rating(Some(&RawNumber::from("4.5"))), "4.5/5");
        assert_eq!(format_rating(None), "N/A");
        assert_eq!(format_percentage(Some(&RawNumber::from("95.5"))), "95.5%");
        assert_eq!(format_percentage(Some(&RawNumber::from(""))), "N/A");
    }

    #[test]
    fn test_format_package() {
        assert_eq!(format_package(Some(&RawNumber::from("1800000"))), "₹18.0L");
        assert_eq!(format_package(Some(&RawNumber::Int(450000))), "₹4.5L");
        assert_eq!(format_package(None), "N/A");
    }

    #[test]
    fn test_format_hostel() {
        assert_eq!(format_hostel(true), "Available");
        assert_eq!(format_hostel(false), "Not Available");
    }

    #[test]
    fn test_fees_descriptor_uses_period() {
        let desc = ComparableField::Fees.descriptor();
        let c = college_with_fees("2400000", FeesPeriod::Total);
        assert_eq!((desc.format)(&c), "₹24.0L total");
        assert_eq!((desc.coerce)(&c), Some(2400000.0));
    }

    #[test]
    fn test_rank_coercion_rejects_non_positive() {
        let desc = ComparableField::OverallRank.descriptor();
        let mut c = CollegeRecord::new(1, "A", "X");
        c.overall_rank = Some(RawNumber::Int(0));
        assert_eq!((desc.coerce)(&c), None);
        c.overall_rank = Some(RawNumber::from("12"));
        assert_eq!((desc.coerce)(&c), Some(12.0));
    }

    #[test]
    fn test_rating_coercion_range() {
        let desc = ComparableField::Rating.descriptor();
        let mut c = CollegeRecord::new(1, "A", "X");
        c.rating = Some(RawNumber::from("5.0"));
        assert_eq!((desc.coerce)(&c), Some(5.0));
        c.rating = Some(RawNumber::from("7"));
        assert_eq!((desc.coerce)(&c), None);
    }

    #[test]
    fn test_unordered_fields_never_coerce() {
        let mut c = CollegeRecord::new(1, "A", "X");
        c.has_hostel = true;
        c.established_year = Some(1961);
        c.college_type = Some("Government".to_string());
        for field in [
            ComparableField::Type,
            ComparableField::EstablishedYear,
            ComparableField::HasHostel,
        ] {
            let desc = field.descriptor();
            assert_eq!(desc.policy, OrderingPolicy::Unordered);
            assert_eq!((desc.coerce)(&c), None);
        }
    }

    #[test]
    fn test_default_fields_order() {
        let labels: Vec<_> = default_fields().iter().map(|d| d.label).collect();
        assert_eq!(
            labels,
            vec![
                "Overall Rank",
                "Type",
                "Established",
                "Fees",
                "Rating",
                "Placement Rate",
                "Avg Package",
                "Hostel"
            ]
        );
    }

    #[test]
    fn test_policy_is_strict() {
        assert!(OrderingPolicy::LowerIsBetter.is_better(1.0, 2.0));
        assert!(!OrderingPolicy::LowerIsBetter.is_better(2.0, 2.0));
        assert!(OrderingPolicy::HigherIsBetter.is_better(3.0, 2.0));
        assert!(!OrderingPolicy::HigherIsBetter.is_better(2.0, 2.0));
        assert!(!OrderingPolicy::Unordered.is_better(1.0, 2.0));
    }

    #[test]
    fn test_field_names_in_yaml() {
        let fields: Vec<ComparableField> =
            serde_saphyr::from_str("[overall_rank, placement_rate, has_hostel]").unwrap();
        assert_eq!(
            fields,
            vec![
                ComparableField::OverallRank,
                ComparableField::PlacementRate,
                ComparableField::HasHostel
            ]
        );
    }
}

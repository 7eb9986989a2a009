pub mod formatter;

pub use formatter::{
    format_age, format_best_summary, format_college_detail, format_college_list,
    format_college_tsv, format_comparison_table, format_comparison_tsv, format_exam_list,
    format_reviews, should_use_colors, truncate_text,
};

use chrono::{DateTime, Duration, Utc};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::college::{CollegeRecord, Exam, Review};
use crate::compare::fields::{
    format_fees, format_package, format_percentage, format_rank, format_rating, NOT_AVAILABLE,
};
use crate::compare::ComparisonTable;

const BEST_MARK: &str = "✓";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, counting chars rather than bytes
pub fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn pad_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

fn pad_left(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", " ".repeat(width.saturating_sub(len)), text)
}

/// Format colleges as one line each: id, rank, name, location, fees, rating
pub fn format_college_list(colleges: &[CollegeRecord], use_colors: bool) -> String {
    if colleges.is_empty() {
        return "No colleges found.".to_string();
    }

    let term_width = get_terminal_width();
    let id_width = colleges
        .iter()
        .map(|c| c.id.to_string().len())
        .max()
        .unwrap_or(1);

    colleges
        .iter()
        .map(|college| {
            let id = pad_left(&college.id.to_string(), id_width);
            let rank = pad_left(&format_rank(college.overall_rank.as_ref()), 5);
            let fees = format_fees(college.fees.as_ref(), college.fees_period);
            let rating = format_rating(college.rating.as_ref());

            // id, rank, fees, rating and separators; the rest goes to the name
            let fixed = id_width + 1 + 5 + 2 + fees.chars().count() + 2 + rating.chars().count() + 4;
            let name = format!("{} ({})", college.name, college.location);
            let name = match term_width {
                Some(width) if width > fixed + 20 => truncate_text(&name, width - fixed),
                Some(_) => truncate_text(&name, 20),
                None => name,
            };

            if use_colors {
                format!(
                    "{}. {}  {}  {}  {}",
                    id.dimmed(),
                    rank.bold(),
                    name,
                    fees.cyan(),
                    rating.yellow()
                )
            } else {
                format!("{}. {}  {}  {}  {}", id, rank, name, fees, rating)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format colleges as tab-separated values for scripting
/// Columns: id, rank, name, location, fees, rating (no headers, no colors)
pub fn format_college_tsv(colleges: &[CollegeRecord]) -> String {
    colleges
        .iter()
        .map(|c| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                c.id,
                c.rank_value().map(|r| r.to_string()).unwrap_or_default(),
                c.name,
                c.location,
                c.fee_amount().map(|f| f.to_string()).unwrap_or_default(),
                c.rating.as_ref().map(|r| r.to_string()).unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn or_na(value: Option<&str>) -> &str {
    value.filter(|s| !s.trim().is_empty()).unwrap_or(NOT_AVAILABLE)
}

/// Multi-line description of one college
pub fn format_college_detail(college: &CollegeRecord, use_colors: bool) -> String {
    let title = match college.short_name.as_deref() {
        Some(short) if short != college.name => format!("{} ({})", college.name, short),
        _ => college.name.clone(),
    };

    let mut lines = vec![if use_colors {
        title.bold().to_string()
    } else {
        title
    }];

    let rows: Vec<(&str, String)> = vec![
        ("Id", college.id.to_string()),
        ("Location", college.location.clone()),
        ("Type", or_na(college.college_type.as_deref()).to_string()),
        (
            "Established",
            college
                .established_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        ("Affiliation", or_na(college.affiliation.as_deref()).to_string()),
        ("Overall Rank", format_rank(college.overall_rank.as_ref())),
        (
            "NIRF Rank",
            college
                .nirf_rank
                .map(|r| format!("#{}", r))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        ("Fees", format_fees(college.fees.as_ref(), college.fees_period)),
        (
            "Rating",
            format!(
                "{} ({} reviews)",
                format_rating(college.rating.as_ref()),
                college.review_count
            ),
        ),
        ("Placement Rate", format_percentage(college.placement_rate.as_ref())),
        ("Avg Package", format_package(college.average_package.as_ref())),
        ("Highest Package", format_package(college.highest_package.as_ref())),
        (
            "Hostel",
            if college.has_hostel {
                match college.hostel_fees.as_ref().and_then(|f| f.as_f64()) {
                    Some(_) => format!(
                        "Available ({})",
                        format_fees(college.hostel_fees.as_ref(), college.fees_period)
                    ),
                    None => "Available".to_string(),
                }
            } else {
                "Not Available".to_string()
            },
        ),
        ("Admission", or_na(college.admission_process.as_deref()).to_string()),
        (
            "Cutoff",
            college
                .cutoff_score
                .map(|c| c.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        ("Website", or_na(college.website.as_deref()).to_string()),
    ];

    for (label, value) in rows {
        let label = format!("{}:", label);
        if use_colors {
            lines.push(format!("  {} {}", pad_right(&label, 16).dimmed(), value));
        } else {
            lines.push(format!("  {} {}", pad_right(&label, 16), value));
        }
    }

    if let Some(description) = college.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(String::new());
        lines.push(format!("  {}", description));
    }

    lines.join("\n")
}

/// Render a comparison table as aligned text.
///
/// Best cells carry a check mark so the winner is visible without colors.
pub fn format_comparison_table(table: &ComparisonTable, use_colors: bool) -> String {
    if table.is_empty() {
        return "No colleges selected for comparison.".to_string();
    }

    let label_width = table
        .rows
        .iter()
        .map(|r| r.label.chars().count())
        .chain(std::iter::once("Field".len()))
        .max()
        .unwrap_or(0);

    let cell_text = |text: &str, best: bool| {
        if best {
            format!("{} {}", text, BEST_MARK)
        } else {
            text.to_string()
        }
    };

    let col_widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let header = col.index_label.chars().count().max(col.display_name.chars().count());
            table
                .rows
                .iter()
                .map(|r| cell_text(&r.cells[i].display_text, r.cells[i].is_best).chars().count())
                .fold(header, usize::max)
        })
        .collect();

    let mut lines = Vec::new();

    // Two header lines: "College N" then the display name
    let mut index_line = pad_right("", label_width);
    let mut name_line = pad_right("Field", label_width);
    for (col, width) in table.columns.iter().zip(&col_widths) {
        index_line.push_str("  ");
        name_line.push_str("  ");
        let index = pad_right(&col.index_label, *width);
        let name = pad_right(&col.display_name, *width);
        if use_colors {
            index_line.push_str(&index.dimmed().to_string());
            name_line.push_str(&name.bold().to_string());
        } else {
            index_line.push_str(&index);
            name_line.push_str(&name);
        }
    }
    lines.push(index_line.trim_end().to_string());
    lines.push(name_line.trim_end().to_string());

    let rule_len = label_width + col_widths.iter().map(|w| w + 2).sum::<usize>();
    lines.push("-".repeat(rule_len));

    for row in &table.rows {
        let mut line = pad_right(&row.label, label_width);
        for (cell, width) in row.cells.iter().zip(&col_widths) {
            line.push_str("  ");
            let text = pad_right(&cell_text(&cell.display_text, cell.is_best), *width);
            if use_colors && cell.is_best {
                line.push_str(&text.green().bold().to_string());
            } else {
                line.push_str(&text);
            }
        }
        lines.push(line.trim_end().to_string());
    }

    lines.join("\n")
}

/// One line naming how many fields each college wins
pub fn format_best_summary(table: &ComparisonTable) -> String {
    let counts = table.best_counts();
    table
        .columns
        .iter()
        .zip(counts)
        .map(|(col, count)| {
            let noun = if count == 1 { "field" } else { "fields" };
            format!("{} best in {} {}", col.display_name, count, noun)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Comparison as TSV: a header row of college names, then one row per field
pub fn format_comparison_tsv(table: &ComparisonTable) -> String {
    let mut lines = Vec::with_capacity(table.rows.len() + 1);
    let header: Vec<&str> = std::iter::once("field")
        .chain(table.columns.iter().map(|c| c.display_name.as_str()))
        .collect();
    lines.push(header.join("\t"));
    for row in &table.rows {
        let cells: Vec<String> = std::iter::once(row.label.clone())
            .chain(row.cells.iter().map(|c| {
                if c.is_best {
                    format!("{}*", c.display_text)
                } else {
                    c.display_text.clone()
                }
            }))
            .collect();
        lines.push(cells.join("\t"));
    }
    lines.join("\n")
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_else(|| "TBA".to_string())
}

/// Format exams as one line each with the key dates
pub fn format_exam_list(exams: &[Exam], use_colors: bool) -> String {
    if exams.is_empty() {
        return "No exams found.".to_string();
    }

    let name_width = exams.iter().map(|e| e.name.chars().count()).max().unwrap_or(0);

    exams
        .iter()
        .map(|exam| {
            let name = pad_right(&exam.name, name_width);
            let full_name = exam.full_name.as_deref().unwrap_or("");
            let line = format!(
                "{}  {} | exam {} | apply by {}",
                exam.exam_type,
                full_name,
                format_date(exam.exam_date),
                format_date(exam.application_end_date)
            );
            if use_colors {
                format!("{}  {}", name.bold(), line)
            } else {
                format!("{}  {}", name, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format reviews with rating, title, author and age
pub fn format_reviews(reviews: &[Review], use_colors: bool) -> String {
    if reviews.is_empty() {
        return "No reviews yet.".to_string();
    }

    reviews
        .iter()
        .map(|review| {
            let rating = format_rating(review.rating.as_ref());
            let title = review.title.as_deref().unwrap_or("(untitled)");
            let mut byline = review
                .student_name
                .clone()
                .unwrap_or_else(|| "Anonymous".to_string());
            if let Some(ref course) = review.course {
                byline.push_str(&format!(", {}", course));
            }
            if let Some(year) = review.graduation_year {
                byline.push_str(&format!(" '{:02}", year.rem_euclid(100)));
            }
            if let Some(created) = review.created_at {
                byline.push_str(&format!(" - {} ago", format_age(Utc::now() - created)));
            }
            if review.verified {
                byline.push_str(" (verified)");
            }

            let head = if use_colors {
                format!("{}  {}", rating.yellow(), title.bold())
            } else {
                format!("{}  {}", rating, title)
            };
            let mut block = format!("{}\n  {}", head, byline);
            if let Some(content) = review.content.as_deref().filter(|c| !c.is_empty()) {
                block.push_str(&format!("\n  {}", content));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

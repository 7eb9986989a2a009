use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use college_compare::college::{NewComparison, NewReview, RawNumber};
use college_compare::compare::{descriptors_for, CompareError, ComparisonSet};
use college_compare::config::Config;
use college_compare::output;
use college_compare::source::{CacheConfig, CollegeFilter, CollegeSource, DEFAULT_PREDICTION_LIMIT};

const EXIT_SUCCESS: i32 = 0;
const EXIT_NOT_FOUND: i32 = 1;
const EXIT_SOURCE: i32 = 2;
const EXIT_LIMIT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Aligned columns, colored when stdout is a terminal
    #[default]
    Table,
    /// Tab-separated values for scripting
    Tsv,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive browser and comparison view (default if no subcommand)
    Tui,
    /// List colleges, best ranked first
    List {
        /// Match name, short name or location
        #[arg(short, long)]
        search: Option<String>,
        /// Exact state name
        #[arg(long)]
        state: Option<String>,
        /// Substring of the location
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        min_fees: Option<f64>,
        #[arg(long)]
        max_fees: Option<f64>,
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long)]
        offset: Option<usize>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Show one college in detail
    Show { id: u64 },
    /// List reviews of a college
    Reviews { id: u64 },
    /// Write a review for a college
    Review {
        id: u64,
        /// Rating from 0 to 5
        #[arg(short, long, value_parser = parse_rating)]
        rating: f64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// List entrance exams, or show one by id
    Exams { id: Option<u64> },
    /// Compare colleges side by side (uses the saved selection when no ids are given)
    Compare {
        ids: Vec<u64>,
        /// Load the colleges of a stored comparison
        #[arg(long, conflicts_with = "ids")]
        load: Option<u64>,
        /// Store this comparison under a name
        #[arg(long)]
        save: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Colleges reachable with an entrance exam score
    Predict {
        score: f64,
        #[arg(short, long, default_value_t = DEFAULT_PREDICTION_LIMIT)]
        limit: usize,
    },
    /// Open a college's website in the browser
    Open { id: u64 },
    /// Create a config file
    Init {
        /// Write the defaults without prompting
        #[arg(long)]
        defaults: bool,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "college-compare")]
#[command(about = "Browse, filter and compare colleges side by side", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/college-compare/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bypass the HTTP response cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Delete cached responses before running
    #[arg(long, global = true)]
    clear_cache: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn parse_rating(s: &str) -> Result<f64, String> {
    let rating: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if (0.0..=5.0).contains(&rating) {
        Ok(rating)
    } else {
        Err("rating must be between 0 and 5".to_string())
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    college_compare::logging::init(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Tui);

    if let Commands::Init { defaults, force } = command {
        let result = if defaults {
            college_compare::config::init::write_default_config(cli.config, force)
                .map(|path| println!("Wrote default config to {}", path.display()))
        } else {
            college_compare::config::init::run_init_wizard(cli.config)
        };
        if let Err(e) = result {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = match college_compare::config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = college_compare::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if cli.clear_cache {
        if let Err(e) = college_compare::source::cache::clear_cache() {
            eprintln!("Warning: failed to clear cache: {:#}", e);
        }
    }

    let cache_config = CacheConfig {
        enabled: !cli.no_cache,
    };
    let source = match college_compare::source::build_source(&config, &cache_config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Data source error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    tracing::debug!(source = %source.describe(), "data source ready");

    let code = match command {
        Commands::Tui => run_tui(&config, source).await,
        Commands::List {
            search,
            state,
            location,
            min_fees,
            max_fees,
            limit,
            offset,
            format,
        } => {
            let filter = CollegeFilter {
                search,
                location,
                state,
                min_fees,
                max_fees,
                limit: limit.or(Some(config.page_size)),
                offset,
            };
            match source.list_colleges(&filter).await {
                Ok(colleges) => {
                    match format {
                        OutputFormat::Table => println!(
                            "{}",
                            output::format_college_list(&colleges, output::should_use_colors())
                        ),
                        OutputFormat::Tsv if colleges.is_empty() => {}
                        OutputFormat::Tsv => println!("{}", output::format_college_tsv(&colleges)),
                    }
                    EXIT_SUCCESS
                }
                Err(e) => source_failure(e),
            }
        }
        Commands::Show { id } => match source.get_college(id).await {
            Ok(Some(college)) => {
                println!(
                    "{}",
                    output::format_college_detail(&college, output::should_use_colors())
                );
                EXIT_SUCCESS
            }
            Ok(None) => not_found("College", id),
            Err(e) => source_failure(e),
        },
        Commands::Reviews { id } => match source.get_college(id).await {
            Ok(Some(college)) => match source.reviews_for(id).await {
                Ok(reviews) => {
                    println!("Reviews of {}\n", college.display_name());
                    println!(
                        "{}",
                        output::format_reviews(&reviews, output::should_use_colors())
                    );
                    EXIT_SUCCESS
                }
                Err(e) => source_failure(e),
            },
            Ok(None) => not_found("College", id),
            Err(e) => source_failure(e),
        },
        Commands::Review {
            id,
            rating,
            title,
            content,
            name,
            course,
            year,
        } => {
            let review = NewReview {
                student_name: name,
                course,
                graduation_year: year,
                rating: Some(RawNumber::from(rating)),
                title,
                content,
            };
            match source.get_college(id).await {
                Ok(Some(college)) => match source.create_review(id, review).await {
                    Ok(created) => {
                        println!(
                            "Review #{} added to {}",
                            created.id,
                            college.display_name()
                        );
                        EXIT_SUCCESS
                    }
                    Err(e) => source_failure(e),
                },
                Ok(None) => not_found("College", id),
                Err(e) => source_failure(e),
            }
        }
        Commands::Exams { id: Some(id) } => match source.get_exam(id).await {
            Ok(Some(exam)) => {
                println!(
                    "{}",
                    output::format_exam_list(&[exam], output::should_use_colors())
                );
                EXIT_SUCCESS
            }
            Ok(None) => not_found("Exam", id),
            Err(e) => source_failure(e),
        },
        Commands::Exams { id: None } => match source.list_exams().await {
            Ok(exams) => {
                println!(
                    "{}",
                    output::format_exam_list(&exams, output::should_use_colors())
                );
                EXIT_SUCCESS
            }
            Err(e) => source_failure(e),
        },
        Commands::Compare {
            ids,
            load,
            save,
            format,
        } => run_compare(&config, source.as_ref(), ids, load, save, format).await,
        Commands::Predict { score, limit } => match source.predict_colleges(score, limit).await {
            Ok(colleges) if colleges.is_empty() => {
                println!("No colleges found for a score of {}", score);
                EXIT_SUCCESS
            }
            Ok(colleges) => {
                println!(
                    "{}",
                    output::format_college_list(&colleges, output::should_use_colors())
                );
                EXIT_SUCCESS
            }
            Err(e) => source_failure(e),
        },
        Commands::Open { id } => match source.get_college(id).await {
            Ok(Some(college)) => match college_compare::browser::open_website(&college) {
                Ok(url) => {
                    println!("Opened {}", url);
                    EXIT_SUCCESS
                }
                Err(e) => {
                    eprintln!("{:#}", e);
                    EXIT_NOT_FOUND
                }
            },
            Ok(None) => not_found("College", id),
            Err(e) => source_failure(e),
        },
        Commands::Init { .. } => EXIT_SUCCESS,
    };

    std::process::exit(code);
}

fn not_found(kind: &str, id: u64) -> i32 {
    eprintln!("{} {} not found", kind, id);
    EXIT_NOT_FOUND
}

fn source_failure(e: anyhow::Error) -> i32 {
    eprintln!("Error: {:#}", e);
    EXIT_SOURCE
}

async fn run_compare(
    config: &Config,
    source: &dyn CollegeSource,
    ids: Vec<u64>,
    load: Option<u64>,
    save: Option<String>,
    format: OutputFormat,
) -> i32 {
    let ids = if let Some(comparison_id) = load {
        match source.get_comparison(comparison_id).await {
            Ok(Some(comparison)) => comparison.college_ids.unwrap_or_default(),
            Ok(None) => return not_found("Comparison", comparison_id),
            Err(e) => return source_failure(e),
        }
    } else if ids.is_empty() {
        let path = college_compare::session::get_selection_path();
        match college_compare::session::load_selection(&path) {
            Ok(state) => state.unique_ids(),
            Err(e) => {
                eprintln!("Failed to load saved selection: {:#}", e);
                return EXIT_CONFIG;
            }
        }
    } else {
        ids
    };

    let resolved = match college_compare::fetch::fetch_colleges_by_id(source, &ids).await {
        Ok(r) => r,
        Err(e) => return source_failure(e),
    };
    for id in &resolved.missing {
        eprintln!("College {} not found", id);
    }

    let mut set = ComparisonSet::with_max(config.compare.max_colleges);
    let report = college_compare::fetch::fill_set(&mut set, resolved.colleges);
    if !report.rejected.is_empty() {
        let ignored: Vec<String> = report.rejected.iter().map(u64::to_string).collect();
        eprintln!(
            "Warning: {} (ignored: {})",
            CompareError::LimitReached { max: set.max() },
            ignored.join(", ")
        );
    }

    if set.len() < 2 {
        println!("Select at least 2 colleges to compare, e.g. `college-compare compare 1 2`");
        return if resolved.missing.is_empty() {
            EXIT_SUCCESS
        } else {
            EXIT_NOT_FOUND
        };
    }

    let table = college_compare::compare::build_comparison_table(
        set.members(),
        &descriptors_for(&config.compare.fields),
    );
    match format {
        OutputFormat::Table => {
            let use_colors = output::should_use_colors();
            println!("{}", output::format_comparison_table(&table, use_colors));
            println!("\n{}", output::format_best_summary(&table));
        }
        OutputFormat::Tsv => println!("{}", output::format_comparison_tsv(&table)),
    }

    if let Some(name) = save {
        let comparison = NewComparison {
            name: Some(name),
            college_ids: set.ids(),
            user_id: None,
        };
        match source.create_comparison(comparison).await {
            Ok(saved) => eprintln!("Saved comparison #{}", saved.id),
            Err(e) => return source_failure(e),
        }
    }

    if !report.rejected.is_empty() {
        EXIT_LIMIT
    } else if !resolved.missing.is_empty() {
        EXIT_NOT_FOUND
    } else {
        EXIT_SUCCESS
    }
}

async fn run_tui(config: &Config, source: Arc<dyn CollegeSource>) -> i32 {
    let selection_path = college_compare::session::get_selection_path();
    let saved = match college_compare::session::load_selection(&selection_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring saved selection");
            college_compare::session::SelectionState::new()
        }
    };

    let mut set = ComparisonSet::with_max(config.compare.max_colleges);
    if !saved.is_empty() {
        match college_compare::fetch::fetch_colleges_by_id(source.as_ref(), &saved.unique_ids())
            .await
        {
            Ok(resolved) => {
                if !resolved.missing.is_empty() {
                    tracing::warn!(missing = ?resolved.missing, "saved colleges no longer exist");
                }
                college_compare::fetch::fill_set(&mut set, resolved.colleges);
            }
            Err(e) => tracing::warn!(error = %e, "could not restore saved selection"),
        }
    }

    // Detect before the TUI takes over the terminal
    let theme = college_compare::tui::resolve_theme(config.theme).colors();

    let app = college_compare::tui::App::new(
        set,
        descriptors_for(&config.compare.fields),
        Some(selection_path),
        config.page_size,
        theme,
        source.describe(),
    );

    match college_compare::tui::run_tui(app, source).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("TUI error: {:#}", e);
            EXIT_SOURCE
        }
    }
}

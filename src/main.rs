use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use city_atlas::metrics::{MetricSource, SnapshotDir, SourceError};

const EXIT_SUCCESS: i32 = 0;
const EXIT_UNAVAILABLE: i32 = 2;
const EXIT_VALIDATION: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_NOT_FOUND: i32 = 5;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ListFormat {
    Table,
    Json,
    Tsv,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List cities ranked by overall score (default if no subcommand)
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
        /// Score each city's latest snapshot on this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show every score for one city with explanations
    Show {
        /// City slug, e.g. new-york
        slug: String,
        /// Use the latest snapshot taken on this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Print the feature set as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write all feature sets as a JSON array
    Export {
        /// Destination file
        path: PathBuf,
        /// Score each city's latest snapshot on this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "city-atlas")]
#[command(about = "City economy, livability, sustainability and growth scores", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/city-atlas/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory with city snapshot files (overrides data_dir from config)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Map a data source error to its process exit code
fn exit_code_for(error: &SourceError) -> i32 {
    match error {
        SourceError::NotFound(_) => EXIT_NOT_FOUND,
        SourceError::UpstreamUnavailable(_) => EXIT_UNAVAILABLE,
        SourceError::Validation(_) => EXIT_VALIDATION,
    }
}

fn exit_code_for_anyhow(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<SourceError>()
        .map(exit_code_for)
        .unwrap_or(EXIT_UNAVAILABLE)
}

fn print_buffered_warnings() {
    let warnings = city_atlas::stderr_buffer::drain();
    if !warnings.is_empty() {
        eprintln!();
        for warning in warnings {
            eprintln!("{}", warning);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::List {
        format: ListFormat::Table,
        date: None,
    });
    let start_time = Instant::now();
    let config_path = cli.config.map(PathBuf::from);

    // Init runs before loading, so a broken config can be replaced
    if let Commands::Init { force } = command {
        let path = config_path.unwrap_or_else(city_atlas::config::get_config_path);
        let data_dir = cli
            .data_dir
            .unwrap_or_else(|| city_atlas::config::get_config_dir().join("data"));
        if let Err(e) = city_atlas::config::write_default_config(&path, &data_dir, force) {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        println!("Wrote config to {}", path.display());
        println!("Put city snapshot files in {}", data_dir.display());
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let mut config = match city_atlas::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }

    // Validate scoring config at startup
    let effective_scoring = config.effective_scoring();
    if let Err(errors) = city_atlas::scoring::validate_scoring(&effective_scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let source = SnapshotDir::new(config.data_dir(), config.include.clone());
    if cli.verbose {
        eprintln!("Reading snapshots from {}", source.root().display());
    }

    let now = Utc::now();
    let use_colors = city_atlas::output::should_use_colors();

    match command {
        Commands::List { format, date } => {
            city_atlas::stderr_buffer::activate();
            let result = city_atlas::fetch::load_and_score_cities(
                &source,
                &effective_scoring,
                date,
                now,
                cli.verbose,
            );
            let feature_sets = match result {
                Ok(f) => f,
                Err(e) => {
                    print_buffered_warnings();
                    eprintln!("Error: {}", e);
                    std::process::exit(exit_code_for_anyhow(&e));
                }
            };

            let output = match format {
                ListFormat::Table => {
                    city_atlas::output::format_ranked_table(&feature_sets, use_colors)
                }
                ListFormat::Tsv => city_atlas::output::format_tsv(&feature_sets),
                ListFormat::Json => match city_atlas::output::format_json(&feature_sets) {
                    Ok(json) => json,
                    Err(e) => {
                        eprintln!("Failed to serialize feature sets: {}", e);
                        std::process::exit(EXIT_VALIDATION);
                    }
                },
            };
            if !output.is_empty() {
                println!("{}", output);
            }
            print_buffered_warnings();

            if cli.verbose {
                eprintln!();
                eprintln!(
                    "Total: {} cities in {:?}",
                    feature_sets.len(),
                    start_time.elapsed()
                );
            }
        }
        Commands::Show { slug, date, json } => {
            let snapshot = match source.load_metric_input(&slug, date) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(exit_code_for(&e));
                }
            };
            let features = city_atlas::scoring::score_snapshot(&snapshot, now, &effective_scoring);

            if json {
                match serde_json::to_string_pretty(&features) {
                    Ok(out) => println!("{}", out),
                    Err(e) => {
                        eprintln!("Failed to serialize feature set: {}", e);
                        std::process::exit(EXIT_VALIDATION);
                    }
                }
            } else {
                println!(
                    "{}",
                    city_atlas::output::format_city_detail(&features, now, use_colors)
                );
            }
        }
        Commands::Export { path, date } => {
            city_atlas::stderr_buffer::activate();
            let result = city_atlas::fetch::load_and_score_cities(
                &source,
                &effective_scoring,
                date,
                now,
                cli.verbose,
            );
            let feature_sets = match result {
                Ok(f) => f,
                Err(e) => {
                    print_buffered_warnings();
                    eprintln!("Error: {}", e);
                    std::process::exit(exit_code_for_anyhow(&e));
                }
            };

            if let Err(e) = city_atlas::output::export_feature_sets(&path, &feature_sets) {
                print_buffered_warnings();
                eprintln!("Export failed: {:#}", e);
                std::process::exit(EXIT_UNAVAILABLE);
            }
            println!(
                "Exported {} cities to {}",
                feature_sets.len(),
                path.display()
            );
            print_buffered_warnings();
        }
        // Handled before config load
        Commands::Init { .. } => {}
    }

    std::process::exit(EXIT_SUCCESS);
}

//! pdfstruct CLI - batch PDF structural extraction driver.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfstruct::{BatchOptions, BatchProcessor, JsonFormat, OutcomeStatus, ParseOptions};

#[derive(Parser)]
#[command(name = "pdfstruct")]
#[command(version)]
#[command(about = "Extract PDF structure (sections, sentences) to JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one PDF or a directory of PDFs to JSON files
    Extract {
        /// Input PDF file or directory of .pdf files
        input: PathBuf,

        /// Output directory for JSON files (named by input stem)
        #[arg(short, long, default_value = "out")]
        output: PathBuf,

        /// Number of worker threads (default: CPU count)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Per-document timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Font sizes mapped to heading levels
        #[arg(long, default_value_t = 3)]
        heading_levels: usize,

        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,

        /// Record page-level failures and continue
        #[arg(long)]
        lenient: bool,

        /// Disable sentence segmentation
        #[arg(long)]
        no_segmentation: bool,
    },

    /// Display a summary of an emitted JSON document
    Show {
        /// Path to a JSON file produced by `extract`
        json: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let code = match cli.command {
        Commands::Extract {
            input,
            output,
            jobs,
            timeout,
            heading_levels,
            compact,
            lenient,
            no_segmentation,
        } => run_extract(
            input,
            output,
            jobs,
            timeout,
            heading_levels,
            compact,
            lenient,
            no_segmentation,
        ),
        Commands::Show { json } => run_show(json),
    };
    std::process::exit(code);
}

#[allow(clippy::too_many_arguments)]
fn run_extract(
    input: PathBuf,
    output: PathBuf,
    jobs: Option<usize>,
    timeout: Option<u64>,
    heading_levels: usize,
    compact: bool,
    lenient: bool,
    no_segmentation: bool,
) -> i32 {
    let inputs = match collect_inputs(&input) {
        Ok(inputs) => inputs,
        Err(message) => {
            eprintln!("{} {}", "error:".red().bold(), message);
            return 1;
        }
    };
    if inputs.is_empty() {
        eprintln!("{} no .pdf files found in {}", "error:".red().bold(), input.display());
        return 1;
    }

    let mut parse = ParseOptions::new().with_heading_levels(heading_levels);
    if lenient {
        parse = parse.lenient();
    }
    if no_segmentation {
        parse = parse.without_segmentation();
    }
    if let Some(secs) = timeout {
        parse = parse.with_timeout(Duration::from_secs(secs));
    }

    let mut options = BatchOptions::new()
        .with_parse_options(parse)
        .with_format(if compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        });
    if let Some(jobs) = jobs {
        options = options.with_jobs(jobs);
    }

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .expect("valid progress template"),
    );
    bar.set_message(format!("processing {} document(s)...", inputs.len()));
    bar.enable_steady_tick(Duration::from_millis(100));

    let summary = match BatchProcessor::new(options).run(&inputs, &output) {
        Ok(summary) => summary,
        Err(e) => {
            bar.finish_and_clear();
            eprintln!("{} {}", "error:".red().bold(), e);
            return 1;
        }
    };
    bar.finish_and_clear();

    for outcome in &summary.outcomes {
        let name = outcome.input.display();
        match &outcome.status {
            OutcomeStatus::Succeeded { output } => {
                println!(
                    "{} {} -> {} ({:.1}s)",
                    "ok".green().bold(),
                    name,
                    output.display(),
                    outcome.elapsed.as_secs_f32()
                );
                for warning in &outcome.warnings {
                    println!("   {} {}", "warning:".yellow(), warning);
                }
                if !outcome.skipped_pages.is_empty() {
                    println!(
                        "   {} pages without text: {:?}",
                        "warning:".yellow(),
                        outcome.skipped_pages
                    );
                }
            }
            OutcomeStatus::Failed { error } => {
                println!("{} {}: {}", "failed".red().bold(), name, error);
            }
        }
    }

    println!(
        "\n{} {} succeeded, {} failed, {} total",
        "Done:".green().bold(),
        summary.succeeded(),
        summary.failed(),
        summary.outcomes.len()
    );

    if summary.failed() > 0 {
        2
    } else {
        0
    }
}

fn run_show(json: PathBuf) -> i32 {
    let raw = match std::fs::read_to_string(&json) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("{} {}: {}", "error:".red().bold(), json.display(), e);
            return 1;
        }
    };
    let document: pdfstruct::Document = match serde_json::from_str(&raw) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("{} invalid document JSON: {}", "error:".red().bold(), e);
            return 1;
        }
    };
    print!("{}", pdfstruct::render::render_summary(&document));
    0
}

/// A single file, or every .pdf directly inside a directory (sorted).
fn collect_inputs(input: &std::path::Path) -> Result<Vec<PathBuf>, String> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if input.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(input)
            .map_err(|e| format!("{}: {}", input.display(), e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        return Ok(files);
    }
    Err(format!("{}: not a file or directory", input.display()))
}

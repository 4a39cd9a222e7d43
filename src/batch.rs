//! Cross-document batch processing.
//!
//! Documents are independent: no shared mutable state, so the batch fans out
//! over a worker pool bounded by the CPU count. Each document runs its
//! pipeline sequentially; a per-document deadline aborts that document
//! without affecting the rest. JSON is written atomically — a temp file in
//! the output directory persisted into place only after full assembly — and
//! exactly one outcome record is produced per input path, in input order.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::error::{Error, Result, Warning};
use crate::parser::{ParseOptions, PdfParser};
use crate::render::{to_json, JsonFormat};

/// Options for a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Per-document parse options (including the optional deadline)
    pub parse: ParseOptions,

    /// JSON output format
    pub format: JsonFormat,

    /// Worker pool size; `None` uses the available CPU count
    pub jobs: Option<usize>,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set per-document parse options.
    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// Set the JSON output format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Bound the worker pool.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs.max(1));
        self
    }
}

/// Terminal state of one document.
#[derive(Debug)]
pub enum OutcomeStatus {
    /// JSON written to `output`
    Succeeded {
        /// Path of the emitted JSON file
        output: PathBuf,
    },
    /// Document aborted; the batch continued
    Failed {
        /// Rendered error message
        error: String,
    },
}

/// One outcome record per input path — the contract with the driver.
#[derive(Debug)]
pub struct DocumentOutcome {
    /// The input path this record describes
    pub input: PathBuf,
    /// Success or failure
    pub status: OutcomeStatus,
    /// Non-fatal degradations recorded during extraction
    pub warnings: Vec<Warning>,
    /// Pages that contributed no content
    pub skipped_pages: Vec<u32>,
    /// Wall-clock processing time
    pub elapsed: Duration,
}

impl DocumentOutcome {
    /// Whether the document succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Succeeded { .. })
    }
}

/// Aggregated results of a batch run.
#[derive(Debug)]
pub struct RunSummary {
    /// Outcome records in input order
    pub outcomes: Vec<DocumentOutcome>,
}

impl RunSummary {
    /// Number of documents that produced output.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of documents that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Runs the extraction pipeline over many documents in parallel.
pub struct BatchProcessor {
    options: BatchOptions,
}

impl BatchProcessor {
    pub fn new(options: BatchOptions) -> Self {
        Self { options }
    }

    /// Process every input, writing one JSON file per document into
    /// `output_dir` (named by input stem). Returns one outcome per input,
    /// in input order. Only output-directory creation can fail the run as a
    /// whole; per-document errors land in the outcome records.
    pub fn run(&self, inputs: &[PathBuf], output_dir: &Path) -> Result<RunSummary> {
        std::fs::create_dir_all(output_dir)?;

        let process = || {
            inputs
                .par_iter()
                .map(|input| self.process_one(input, output_dir))
                .collect::<Vec<_>>()
        };

        let outcomes = match self.options.jobs {
            Some(jobs) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .build()
                    .map_err(|e| Error::Other(format!("worker pool: {}", e)))?;
                pool.install(process)
            }
            None => process(),
        };

        Ok(RunSummary { outcomes })
    }

    /// Process a single document end-to-end.
    fn process_one(&self, input: &Path, output_dir: &Path) -> DocumentOutcome {
        let started = Instant::now();
        log::debug!("processing {}", input.display());

        let extraction = match self.options.parse.timeout {
            Some(deadline) => parse_with_deadline(input, self.options.parse.clone(), deadline),
            None => parse_document(input, self.options.parse.clone()),
        };

        match extraction {
            Ok(extraction) => {
                let skipped_pages: Vec<u32> =
                    extraction.page_failures.iter().map(|f| f.page).collect();
                match self.write_output(input, output_dir, &extraction.document) {
                    Ok(output) => DocumentOutcome {
                        input: input.to_path_buf(),
                        status: OutcomeStatus::Succeeded { output },
                        warnings: extraction.warnings,
                        skipped_pages,
                        elapsed: started.elapsed(),
                    },
                    Err(e) => DocumentOutcome {
                        input: input.to_path_buf(),
                        status: OutcomeStatus::Failed {
                            error: e.to_string(),
                        },
                        warnings: extraction.warnings,
                        skipped_pages,
                        elapsed: started.elapsed(),
                    },
                }
            }
            Err(e) => {
                log::warn!("{}: {}", input.display(), e);
                DocumentOutcome {
                    input: input.to_path_buf(),
                    status: OutcomeStatus::Failed {
                        error: e.to_string(),
                    },
                    warnings: Vec::new(),
                    skipped_pages: Vec::new(),
                    elapsed: started.elapsed(),
                }
            }
        }
    }

    /// Write JSON atomically: temp file in the target directory, persisted
    /// into place after a full serialization.
    fn write_output(
        &self,
        input: &Path,
        output_dir: &Path,
        document: &crate::model::Document,
    ) -> Result<PathBuf> {
        let json = to_json(document, self.options.format)?;
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());
        let target = output_dir.join(format!("{}.json", stem));

        let mut tmp = tempfile::NamedTempFile::new_in(output_dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&target)
            .map_err(|e| Error::Io(e.error))?;
        Ok(target)
    }
}

/// Open and parse one document.
fn parse_document(input: &Path, options: ParseOptions) -> Result<crate::parser::Extraction> {
    let parser = PdfParser::open_with_options(input, options)?;
    parser.parse()
}

/// Run the parse on a supervised worker thread, abandoning it if the
/// deadline passes. Coarse-grained cancellation: the stalled document
/// reports a timeout while the rest of the batch proceeds.
fn parse_with_deadline(
    input: &Path,
    options: ParseOptions,
    deadline: Duration,
) -> Result<crate::parser::Extraction> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let path = input.to_path_buf();

    std::thread::spawn(move || {
        let result = parse_document(&path, options);
        // Receiver may be gone after a timeout; nothing left to do then.
        let _ = tx.send(result);
    });

    match rx.recv_timeout(deadline) {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            seconds: deadline.as_secs(),
        }),
    }
}

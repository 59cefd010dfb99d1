//! Batch validation
//!
//! A batch is a list of input files. Each file is validated independently into its own trace
//! file; a document that cannot be read or whose trace cannot be created is reported and
//! skipped, and the batch carries on.

use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use wingram_config::OutputConfig;
use wingram_parser::{open_sink, Document, Validation, ValidationError, Verdict};

/// One input and where its trace goes.
#[derive(Debug, Clone)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Job {
    pub fn new(input: PathBuf, output: &OutputConfig) -> Self {
        let name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = output.trace_path(&name);
        Job { input, output }
    }
}

/// Collect the jobs for every regular file in `directory`, in name order.
///
/// Files that look like earlier trace output are left out.
pub fn discover(directory: &Path, output: &OutputConfig) -> io::Result<Vec<Job>> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if output.is_trace_name(&name.to_string_lossy()) {
            tracing::debug!(file = ?name, "skipping trace output");
            continue;
        }
        inputs.push(entry.path());
    }
    inputs.sort();
    Ok(inputs.into_iter().map(|input| Job::new(input, output)).collect())
}

/// Where echoed trace lines go, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    Off,
    Stdout,
    /// Used when stdout is reserved for a machine-readable report.
    Stderr,
}

impl Echo {
    fn writer(self) -> Option<Box<dyn Write>> {
        match self {
            Echo::Off => None,
            Echo::Stdout => Some(Box::new(io::stdout())),
            Echo::Stderr => Some(Box::new(io::stderr())),
        }
    }
}

/// Writes to the trace file and mirrors everything to the echo target.
struct Tee<W: Write> {
    file: W,
    echo: Option<Box<dyn Write>>,
}

impl<W: Write> Write for Tee<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        if let Some(stdout) = self.echo.as_mut() {
            stdout.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if let Some(stdout) = self.echo.as_mut() {
            stdout.flush()?;
        }
        Ok(())
    }
}

/// What happened to one job.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub result: JobResult,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobResult {
    Validated(Validation),
    Skipped { reason: String },
}

/// Validate one job, echoing the trace if asked to.
pub fn run_job(job: &Job, echo: Echo) -> Outcome {
    if let Some(mut out) = echo.writer() {
        let banner = writeln!(
            out,
            "\n\n*******************************************************\nPARSING: {}\n*******************************************************\n\n",
            job.input.display()
        );
        if let Err(err) = banner {
            tracing::warn!(error = %err, "cannot echo banner");
        }
    }

    let result = match validate(job, echo) {
        Ok(validation) => {
            tracing::info!(
                input = %job.input.display(),
                verdict = %validation.verdict,
                "validated"
            );
            JobResult::Validated(validation)
        }
        Err(err) => {
            tracing::warn!(input = %job.input.display(), error = %err, "skipped");
            JobResult::Skipped {
                reason: err.to_string(),
            }
        }
    };

    Outcome {
        input: job.input.clone(),
        output: job.output.clone(),
        result,
    }
}

fn validate(job: &Job, echo: Echo) -> Result<Validation, ValidationError> {
    let document = Document::from_path(&job.input)?;
    let file = open_sink(&job.output)?;
    let sink = Tee {
        file,
        echo: echo.writer(),
    };
    document.validate(sink)
}

/// Aggregated results of a batch.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub accepted: usize,
    pub lexical_errors: usize,
    pub syntax_errors: usize,
    pub skipped: usize,
    pub documents: Vec<Outcome>,
}

impl Report {
    pub fn record(&mut self, outcome: Outcome) {
        match &outcome.result {
            JobResult::Validated(validation) => match validation.verdict {
                Verdict::Accepted => self.accepted += 1,
                Verdict::LexicalError => self.lexical_errors += 1,
                Verdict::SyntaxError => self.syntax_errors += 1,
            },
            JobResult::Skipped { .. } => self.skipped += 1,
        }
        self.documents.push(outcome);
    }

    /// Whether every document could be processed, regardless of verdict.
    pub fn is_complete(&self) -> bool {
        self.skipped == 0
    }

    pub fn render_text(&self) -> String {
        let mut text = String::new();
        for outcome in &self.documents {
            let status = match &outcome.result {
                JobResult::Validated(validation) => match &validation.offending {
                    None => validation.verdict.to_string(),
                    Some(offending) if offending.lexeme.is_empty() => {
                        format!("{} at {}", validation.verdict, offending.kind)
                    }
                    Some(offending) => {
                        format!("{} at '{}'", validation.verdict, offending.lexeme)
                    }
                },
                JobResult::Skipped { reason } => format!("skipped ({})", reason),
            };
            text.push_str(&format!("{}: {}\n", outcome.input.display(), status));
        }
        text.push_str(&format!(
            "{} accepted, {} lexical errors, {} syntax errors, {} skipped\n",
            self.accepted, self.lexical_errors, self.syntax_errors, self.skipped
        ));
        text
    }
}

/// Run every job in order.
pub fn run(jobs: &[Job], echo: Echo) -> Report {
    let mut report = Report::default();
    for job in jobs {
        report.record(run_job(job, echo));
    }
    report
}

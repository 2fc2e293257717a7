//! CLI command definitions and argument parsing.

use crate::error::{CliError, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Factcheck CLI - Extract and verify claims in campaign text.
#[derive(Debug, Parser)]
#[command(name = "factcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "FACTCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log pipeline decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (minimal)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract classified claims from text
    Extract(TextInput),

    /// Show the comparative structure of one claim
    Detect(DetectArgs),

    /// Build the evidence query for a metric
    Query(QueryArgs),

    /// Extract and verify every claim in a document
    Verify(VerifyArgs),

    /// Flag hedged sentences, one JSON line per flagged sentence
    Deniability(DeniabilityArgs),

    /// Collapse several scores into one figure
    Aggregate(AggregateArgs),
}

/// Where to read document text from.
#[derive(Debug, Clone, Args)]
pub struct TextInput {
    /// Text to process
    pub text: Option<String>,

    /// Read text from a file
    #[arg(long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Read text from stdin
    #[arg(long, conflicts_with_all = ["text", "file"])]
    pub stdin: bool,
}

impl TextInput {
    /// Read the selected input.
    pub fn read(&self) -> Result<String> {
        if self.stdin {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        } else if let Some(path) = &self.file {
            Ok(fs::read_to_string(path)?)
        } else if let Some(text) = &self.text {
            Ok(text.clone())
        } else {
            Err(CliError::InvalidInput(
                "Must provide TEXT, --file or --stdin".to_string(),
            ))
        }
    }
}

/// Arguments for the detect command.
#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Claim text
    pub text: String,
}

/// Arguments for the query command.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Metric name, e.g. "federal deficit"
    pub metric: String,

    /// Time reference appended verbatim, e.g. "since 2023"
    #[arg(short, long)]
    pub time: Option<String>,
}

/// Arguments for the verify command.
#[derive(Debug, Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub input: TextInput,

    /// JSON evidence file mapping query to text or {text, source, url}
    #[arg(short, long)]
    pub evidence: Option<PathBuf>,

    /// JSON fact table for structured claims
    #[arg(long)]
    pub facts: Option<PathBuf>,

    /// Actor substituted for pronouns in structured claims
    #[arg(short, long)]
    pub actor: Option<String>,

    /// Fact-check identifier attached to every result
    #[arg(long)]
    pub fact_check_id: Option<String>,
}

/// Arguments for the deniability command.
#[derive(Debug, Args)]
pub struct DeniabilityArgs {
    /// Input file path or '-' for stdin (text or JSONL)
    #[arg(long = "in", default_value = "-")]
    pub input: String,

    /// Output path or '-' for stdout (JSONL)
    #[arg(long = "out", default_value = "-")]
    pub output: String,

    /// Pattern table JSON replacing the configured one
    #[arg(long)]
    pub patterns: Option<PathBuf>,

    /// Input format
    #[arg(long, value_enum, default_value = "auto")]
    pub input_format: InputFormat,

    /// JSONL field holding the text
    #[arg(long, default_value = "text")]
    pub text_field: String,

    /// JSONL field holding the document id
    #[arg(long, default_value = "doc_id")]
    pub id_field: String,

    /// Score threshold (defaults to the custom pattern table, then the config)
    #[arg(long)]
    pub threshold: Option<f64>,
}

/// Input format of the deniability command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// JSONL when the first line parses as JSON, text otherwise
    Auto,
    /// Plain text
    Text,
    /// One JSON object per line
    Jsonl,
}

/// Arguments for the aggregate command.
#[derive(Debug, Args)]
pub struct AggregateArgs {
    /// Scores to aggregate
    #[arg(required = true, allow_negative_numbers = true)]
    pub scores: Vec<f64>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

//! Deniability command implementation.
//!
//! Scans plain text or JSONL documents and writes one JSON record per
//! flagged sentence.

use crate::cli::{DeniabilityArgs, InputFormat};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use factcheck_domain::Span;
use factcheck_extractor::{DeniabilityScanner, PatternHit};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{debug, info};

const STDIO: &str = "-";
const SNIFF_CHARS: usize = 2000;

/// One flagged sentence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeniabilityRecord {
    /// Document identifier
    pub doc_id: String,
    /// One-based position among the document's flagged sentences
    pub sentence_id: usize,
    /// Character span of the sentence in the document text
    pub span: Span,
    /// Sentence text
    pub sentence: String,
    /// Score after the multi-label bonus, capped at 1.0
    pub score: f64,
    /// Labels of the patterns that matched
    pub labels: Vec<String>,
    /// Pattern hits behind the score
    pub matched_patterns: Vec<PatternHit>,
    /// Scan parameters
    pub meta: RecordMeta,
}

/// Scan parameters attached to every record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordMeta {
    /// Score threshold the scan used
    pub threshold: f64,
    /// Input path, or `-` for stdin
    pub source: String,
    /// One-based record number for JSONL documents, blank lines not counted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonl_line: Option<usize>,
}

/// Field names used to read JSONL documents
#[derive(Debug, Clone, Copy)]
pub struct JsonlFields<'a> {
    /// Field holding the document text
    pub text: &'a str,
    /// Field holding the document id
    pub id: &'a str,
}

/// Execute the deniability command.
pub fn execute_deniability(
    args: DeniabilityArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    if let Some(threshold) = args.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CliError::InvalidInput(format!(
                "threshold must be between 0.0 and 1.0, got {}",
                threshold
            )));
        }
    }

    let scanner = config.scanner(args.patterns.as_deref())?;
    let custom_table = args.patterns.is_some() || config.patterns.is_some();
    let threshold = match args.threshold {
        Some(threshold) => threshold,
        None if custom_table => scanner.default_threshold(),
        None => config.extractor.deniability_threshold,
    };
    let raw = read_input(&args.input)?;
    let fields = JsonlFields {
        text: &args.text_field,
        id: &args.id_field,
    };

    let records = scan_input(&raw, &args.input, args.input_format, &scanner, threshold, fields)?;
    write_records(&args.output, &records)?;

    info!("Wrote {} deniability records", records.len());
    if args.output != STDIO {
        println!(
            "{}",
            formatter.success(&format!(
                "Flagged {} sentences, written to {}",
                records.len(),
                args.output
            ))
        );
    }
    Ok(())
}

/// Scan `raw` and collect flagged sentences in input order
///
/// # Errors
///
/// Returns an error when a JSONL line is not a JSON object.
pub fn scan_input(
    raw: &str,
    source: &str,
    format: InputFormat,
    scanner: &DeniabilityScanner,
    threshold: f64,
    fields: JsonlFields<'_>,
) -> Result<Vec<DeniabilityRecord>> {
    let base = base_id(source);
    let jsonl = match format {
        InputFormat::Jsonl => true,
        InputFormat::Text => false,
        InputFormat::Auto => looks_like_jsonl(raw),
    };
    debug!("Scanning {} as {}", source, if jsonl { "JSONL" } else { "text" });

    if !jsonl {
        return Ok(scan_document(scanner, raw, &base, source, threshold, None));
    }

    let mut records = Vec::new();
    let mut record_no = 0;
    for (offset, line) in raw.lines().enumerate() {
        let line_no = offset + 1;
        if line.trim().is_empty() {
            continue;
        }
        record_no += 1;
        let value: Value = serde_json::from_str(line)?;
        let object = value.as_object().ok_or_else(|| {
            CliError::InvalidInput(format!("line {} is not a JSON object", line_no))
        })?;

        let text = object
            .get(fields.text)
            .and_then(Value::as_str)
            .unwrap_or_default();
        if text.trim().is_empty() {
            continue;
        }
        let doc_id = match object.get(fields.id) {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Null) | None => format!("{}#{}", base, record_no),
            Some(other) => other.to_string(),
        };
        records.extend(scan_document(
            scanner,
            text,
            &doc_id,
            source,
            threshold,
            Some(record_no),
        ));
    }
    Ok(records)
}

fn scan_document(
    scanner: &DeniabilityScanner,
    text: &str,
    doc_id: &str,
    source: &str,
    threshold: f64,
    jsonl_line: Option<usize>,
) -> Vec<DeniabilityRecord> {
    scanner
        .scan(text, threshold)
        .into_iter()
        .enumerate()
        .map(|(i, flag)| DeniabilityRecord {
            doc_id: doc_id.to_string(),
            sentence_id: i + 1,
            span: flag.span,
            sentence: flag.sentence,
            score: flag.score,
            labels: flag.labels,
            matched_patterns: flag.matched_patterns,
            meta: RecordMeta {
                threshold,
                source: source.to_string(),
                jsonl_line,
            },
        })
        .collect()
}

/// JSONL when the first non-blank line of the head parses as a JSON object
fn looks_like_jsonl(raw: &str) -> bool {
    let head: String = raw.chars().take(SNIFF_CHARS).collect();
    head.lines()
        .find(|line| !line.trim().is_empty())
        .and_then(|line| serde_json::from_str::<Value>(line).ok())
        .is_some_and(|value| value.is_object())
}

fn base_id(source: &str) -> String {
    if source == STDIO {
        return "STDIN".to_string();
    }
    Path::new(source)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string())
}

fn read_input(input: &str) -> Result<String> {
    if input == STDIO {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_records(output: &str, records: &[DeniabilityRecord]) -> Result<()> {
    let mut lines = String::new();
    for record in records {
        lines.push_str(&serde_json::to_string(record)?);
        lines.push('\n');
    }

    if output == STDIO {
        io::stdout().lock().write_all(lines.as_bytes())?;
    } else {
        fs::write(output, lines)?;
    }
    Ok(())
}

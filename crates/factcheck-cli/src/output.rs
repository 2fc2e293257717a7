//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use factcheck_domain::{Claim, ComparativeDetection, Verdict};
use factcheck_verifier::{DocumentReport, RouteOutcome, RouteResult};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const TEXT_WIDTH: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format extracted claims.
    pub fn format_claims(&self, claims: &[Claim]) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(claims),
            OutputFormat::Table => Ok(self.format_claims_table(claims)),
            OutputFormat::Quiet => Ok(claims
                .iter()
                .map(|c| format!("{}\t{}", c.sentence_index, c.claim_type))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_claims_table(&self, claims: &[Claim]) -> String {
        if claims.is_empty() {
            return self.colorize("No claims found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Type", "Confidence", "Deniability", "Verifiable", "Claim"]);

        for claim in claims {
            builder.push_record([
                claim.sentence_index.to_string(),
                claim.claim_type.to_string(),
                format!("{:.2}", claim.confidence_score),
                format!("{:.2}", claim.deniability_score),
                if claim.verifiable { "yes" } else { "no" }.to_string(),
                truncate(&claim.text, TEXT_WIDTH),
            ]);
        }

        self.table(builder)
    }

    /// Format a comparative detection.
    pub fn format_detection(&self, detection: &ComparativeDetection) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(detection),
            OutputFormat::Quiet => Ok(detection
                .comparison_type
                .map_or_else(|| "none".to_string(), |t| t.to_string())),
            OutputFormat::Table => {
                if !detection.is_comparative {
                    return Ok(self.info("Not a comparative claim."));
                }
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                builder.push_record([
                    "Type".to_string(),
                    detection
                        .comparison_type
                        .map_or_else(String::new, |t| t.to_string()),
                ]);
                builder.push_record(["Metrics".to_string(), detection.metrics.join(", ")]);
                builder.push_record([
                    "Time reference".to_string(),
                    detection.time_reference.clone().unwrap_or_default(),
                ]);
                for (i, step) in detection.verification_steps.iter().enumerate() {
                    builder.push_record([
                        format!("Step {}", i + 1),
                        match &step.right_metric {
                            Some(right) => format!("{} vs {}", step.left_metric, right),
                            None => step.left_metric.clone(),
                        },
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format a document report.
    pub fn format_report(&self, report: &DocumentReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(report),
            OutputFormat::Quiet => Ok(report
                .results
                .iter()
                .map(|r| format!("{}\t{}", r.claim_id.sentence_index, status(r)))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => Ok(self.format_report_table(report)),
        }
    }

    fn format_report_table(&self, report: &DocumentReport) -> String {
        if report.results.is_empty() {
            return self.colorize("No claims found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Method", "Verdict", "Confidence", "Claim"]);
        for result in &report.results {
            let text = report
                .claims
                .iter()
                .find(|c| c.sentence_index == result.claim_id.sentence_index)
                .map_or_else(String::new, |c| truncate(&c.text, TEXT_WIDTH));
            builder.push_record([
                result.claim_id.sentence_index.to_string(),
                result
                    .verification_method
                    .map_or_else(|| "-".to_string(), |m| m.to_string()),
                self.colorize_status(result),
                result
                    .confidence()
                    .map_or_else(|| "-".to_string(), |c| format!("{:.2}", c)),
                text,
            ]);
        }

        let mut lines = vec![self.table(builder)];
        lines.push(format!(
            "Document confidence: {:.0}  Deniability risk: {:.0}",
            report.document_confidence, report.deniability_risk
        ));
        let queries = report.queries_needed();
        if !queries.is_empty() {
            lines.push(self.warning("Evidence needed for these queries:"));
            lines.extend(queries.iter().map(|q| format!("  {}", q)));
        }
        lines.join("\n")
    }

    /// Format a single value, e.g. a query or an aggregate.
    pub fn format_value<T: Serialize + std::fmt::Display>(&self, value: &T) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(value),
            _ => Ok(value.to_string()),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn colorize_status(&self, result: &RouteResult) -> String {
        let label = status(result);
        let color = match result.verdict() {
            Some(Verdict::True) => "green",
            Some(Verdict::False) => "red",
            Some(Verdict::Misleading) => "magenta",
            Some(Verdict::Unsupported) => "yellow",
            None if result.success => "cyan",
            None => "red",
        };
        self.colorize(&label, color)
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Short status label for a routing result.
pub fn status(result: &RouteResult) -> String {
    match (&result.outcome, result.verdict()) {
        (_, Some(verdict)) => verdict.to_string(),
        (Some(RouteOutcome::QueriesNeeded(_)), None) => "NEEDS EVIDENCE".to_string(),
        _ => "ERROR".to_string(),
    }
}

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", cut)
}

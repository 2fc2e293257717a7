//! Verify command implementation.

use crate::cli::VerifyArgs;
use crate::commands::extract::build_extractor;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use factcheck_verifier::{
    FactCheckPipeline, RouterOptions, StaticFactTable, StaticResolver, VerificationRouter,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Execute the verify command.
pub async fn execute_verify(
    args: VerifyArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let text = args.input.read()?;
    let pipeline = build_pipeline(config, args.evidence.as_deref(), args.facts.as_deref())?;
    let options = RouterOptions {
        fallback_actor: args.actor,
        fact_check_id: args.fact_check_id,
        ..RouterOptions::default()
    };

    let report = pipeline.check_document(&text, &options).await;
    println!("{}", formatter.format_report(&report)?);

    if formatter.format() == OutputFormat::Table && !pipeline.router().has_resolver() {
        println!(
            "{}",
            formatter.info("Supply answers with --evidence FILE to verify comparative claims.")
        );
    }
    Ok(())
}

/// Pipeline for the configured settings, evidence file and fact table.
pub fn build_pipeline(
    config: &Config,
    evidence: Option<&Path>,
    facts: Option<&Path>,
) -> Result<FactCheckPipeline> {
    let mut router = VerificationRouter::new(config.verifier.clone())?;

    if let Some(path) = evidence {
        let resolver = StaticResolver::from_json(&fs::read_to_string(path)?)?;
        info!("Loaded evidence for {} queries from {}", resolver.len(), path.display());
        router = router.with_resolver(Arc::new(resolver));
    }
    if let Some(path) = facts {
        let table = StaticFactTable::from_json(&fs::read_to_string(path)?)?;
        info!("Loaded {} facts from {}", table.len(), path.display());
        router = router.with_fact_lookup(Arc::new(table));
    }

    Ok(FactCheckPipeline::new(build_extractor(config)?, router))
}

//! Query command implementation.

use crate::cli::QueryArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use factcheck_verifier::generate_query;

/// Execute the query command.
pub fn execute_query(args: QueryArgs, formatter: &Formatter) -> Result<()> {
    if args.metric.trim().is_empty() {
        return Err(CliError::InvalidInput("Metric must not be empty".to_string()));
    }
    let query = generate_query(&args.metric, args.time.as_deref());
    println!("{}", formatter.format_value(&query)?);
    Ok(())
}

//! Aggregate command implementation.

use crate::cli::AggregateArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use factcheck_domain::aggregate;

/// Execute the aggregate command.
pub fn execute_aggregate(args: AggregateArgs, formatter: &Formatter) -> Result<()> {
    if let Some(bad) = args.scores.iter().find(|s| !s.is_finite()) {
        return Err(CliError::InvalidInput(format!("Score {} is not a finite number", bad)));
    }
    println!("{}", formatter.format_value(&aggregate(&args.scores))?);
    Ok(())
}

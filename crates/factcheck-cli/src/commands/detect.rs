//! Detect command implementation.

use crate::cli::DetectArgs;
use crate::error::Result;
use crate::output::Formatter;
use factcheck_extractor::detect;

/// Execute the detect command.
pub fn execute_detect(args: DetectArgs, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.format_detection(&detect(&args.text))?);
    Ok(())
}

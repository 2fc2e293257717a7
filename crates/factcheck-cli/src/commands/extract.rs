//! Extract command implementation.

use crate::cli::TextInput;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use factcheck_extractor::Extractor;

/// Execute the extract command.
pub fn execute_extract(args: TextInput, config: &Config, formatter: &Formatter) -> Result<()> {
    let text = args.read()?;
    let extractor = build_extractor(config)?;
    let claims = extractor.extract(&text);
    println!("{}", formatter.format_claims(&claims)?);
    Ok(())
}

/// Extractor for the configured settings and pattern table.
pub fn build_extractor(config: &Config) -> Result<Extractor> {
    Ok(Extractor::new(config.extractor.clone())?.with_scanner(config.scanner(None)?))
}

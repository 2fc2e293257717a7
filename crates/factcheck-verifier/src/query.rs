//! Search Query Generator

/// Historical anchor used for trends that name no past point
pub const PREVIOUS_PERIOD: &str = "previous year";

/// Build the evidence query for a metric
///
/// Pure: the same pair always gives the same string. The metric is
/// lowercased with its whitespace collapsed; the time reference is appended
/// verbatim. Without a time reference the query asks for the current value.
///
/// ```
/// use factcheck_verifier::generate_query;
///
/// assert_eq!(generate_query("federal deficit", None), "current federal deficit");
/// assert_eq!(
///     generate_query("Federal  Deficit", Some("since 2023")),
///     "federal deficit since 2023"
/// );
/// ```
pub fn generate_query(metric: &str, time_reference: Option<&str>) -> String {
    let metric = metric
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");

    match time_reference.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reference) => format!("{} {}", metric, reference),
        None => format!("current {}", metric),
    }
}

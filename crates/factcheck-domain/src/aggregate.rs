//! Risk/confidence aggregation
//!
//! Collapses several independent scores into one figure. The strongest
//! signal counts in full; the remaining signals add a fraction of their
//! average on top:
//!
//! ```text
//! aggregate([])  = 0
//! aggregate([x]) = x
//! aggregate(xs)  = round(max(xs) + 0.3 * mean(xs where x != max(xs)))
//! ```
//!
//! Every entry equal to the maximum is excluded from the mean, so when all
//! scores tie at the maximum the corroboration term is zero.

/// Weight given to the mean of the non-maximal scores
pub const CORROBORATION_WEIGHT: f64 = 0.3;

/// Aggregate several scores into one
///
/// NaN entries are ignored.
///
/// # Examples
///
/// ```
/// use factcheck_domain::aggregate;
///
/// assert_eq!(aggregate(&[]), 0.0);
/// assert_eq!(aggregate(&[42.5]), 42.5);
/// assert_eq!(aggregate(&[80.0, 80.0]), 80.0);
/// assert_eq!(aggregate(&[80.0, 40.0, 20.0]), 89.0);
/// ```
pub fn aggregate(scores: &[f64]) -> f64 {
    let scores: Vec<f64> = scores.iter().copied().filter(|s| !s.is_nan()).collect();

    match scores.as_slice() {
        [] => 0.0,
        [only] => *only,
        _ => {
            let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let others: Vec<f64> = scores.iter().copied().filter(|s| *s != max).collect();
            let corroboration = if others.is_empty() {
                0.0
            } else {
                others.iter().sum::<f64>() / others.len() as f64
            };
            (max + CORROBORATION_WEIGHT * corroboration).round()
        }
    }
}

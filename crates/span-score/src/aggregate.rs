//! Probability aggregation in the log domain.
//!
//! A route with a dozen bridges at small open probabilities underflows
//! quickly if probabilities are multiplied directly; summing natural logs
//! keeps the computation stable.  The network formula runs on *failure*
//! probabilities through `ln_1p`, which avoids catastrophic cancellation
//! when individual route probabilities are small.
//!
//! Both functions assume bridge-open (and route-success) events are
//! independent conditional on the features.

/// Combine per-bridge probabilities: `(Σ ln pᵢ, exp Σ ln pᵢ)`.
///
/// Empty input is the bridge-free route: `(0.0, 1.0)`.  Inputs are assumed
/// already clamped into the configured `[min, max]` probability band.
pub fn aggregate_log_domain(probabilities: &[f64]) -> (f64, f64) {
    let log_probability: f64 = probabilities.iter().map(|p| p.ln()).sum();
    (log_probability, log_probability.exp())
}

/// Probability that at least one of the routes is traversable:
/// `1 − Π (1 − pᵢ)`, computed as `1 − exp(Σ ln(1 − pᵢ))`.
///
/// Empty input yields 0.  The result is clamped to `[0, 1]`.
pub fn network_probability(path_probabilities: &[f64]) -> f64 {
    if path_probabilities.is_empty() {
        return 0.0;
    }
    let log_all_fail: f64 = path_probabilities.iter().map(|p| (-p).ln_1p()).sum();
    (1.0 - log_all_fail.exp()).clamp(0.0, 1.0)
}

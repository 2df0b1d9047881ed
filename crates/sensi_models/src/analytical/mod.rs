//! Analytical helpers shared by the reference instruments.

pub mod distributions;

pub use distributions::{norm_cdf, norm_pdf};

/// Linear-interpolation weights of each pillar at time `t`, with flat
/// extrapolation.
///
/// This is the derivative of a linearly interpolated value at `t` with
/// respect to each pillar value, so `d value(t) / d pillar_k = weights[k]`.
pub fn interpolation_weights(times: &[f64], t: f64) -> Vec<f64> {
    let n = times.len();
    let mut weights = vec![0.0; n];
    if n == 0 {
        return weights;
    }
    if n == 1 || t <= times[0] {
        weights[0] = 1.0;
        return weights;
    }
    if t >= times[n - 1] {
        weights[n - 1] = 1.0;
        return weights;
    }
    let i = times.partition_point(|&ti| ti <= t);
    let (t0, t1) = (times[i - 1], times[i]);
    let alpha = (t - t0) / (t1 - t0);
    weights[i - 1] = 1.0 - alpha;
    weights[i] = alpha;
    weights
}

/// Annual payment times `start + 1, …, start + years`.
pub fn annual_schedule(start: f64, years: u32) -> Vec<f64> {
    (1..=years).map(|i| start + i as f64).collect()
}

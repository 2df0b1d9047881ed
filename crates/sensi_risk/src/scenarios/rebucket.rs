//! Triangular rebucketing of bucket shifts onto native market nodes.
//!
//! A sensitivity bucket grid `b_0 < … < b_{m-1}` rarely coincides with the
//! pillars of the market object being shifted. A shift at bucket `k` is
//! spread over the native nodes with a triangular weight: 1 at `b_k`,
//! decaying linearly to 0 at the neighbouring buckets. The outermost buckets
//! extrapolate flat, so every coordinate is fully covered:
//!
//! ```text
//! weight
//!  1 ─┐      /\      /\      ┌─
//!     │\    /  \    /  \    /│
//!  0  │ \__/    \__/    \__/ │
//!     b0   b1     b2     b3
//! ```
//!
//! Weights across buckets sum to one at every coordinate, and a native node
//! lying on a bucket (within [`BUCKET_TOLERANCE`]) receives weight exactly 1
//! from that bucket and exactly 0 from all others.

/// Distance within which a native coordinate is treated as lying on a bucket.
pub const BUCKET_TOLERANCE: f64 = 1e-10;

/// Weight of bucket `k` at coordinate `x`.
///
/// Returns 0 for an out-of-range `k` or an empty grid.
///
/// # Examples
///
/// ```
/// use sensi_risk::scenarios::triangular_weight;
///
/// let buckets = [1.0, 2.0, 5.0];
/// assert_eq!(triangular_weight(&buckets, 1, 2.0), 1.0);
/// assert_eq!(triangular_weight(&buckets, 1, 3.5), 0.5);
/// assert_eq!(triangular_weight(&buckets, 0, 0.25), 1.0); // flat below b_0
/// assert_eq!(triangular_weight(&buckets, 2, 30.0), 1.0); // flat above b_2
/// ```
pub fn triangular_weight(buckets: &[f64], k: usize, x: f64) -> f64 {
    let m = buckets.len();
    if k >= m {
        return 0.0;
    }
    if m == 1 {
        return 1.0;
    }
    // Snap coordinates that sit on a bucket
    if let Some(j) = buckets.iter().position(|b| (x - b).abs() <= BUCKET_TOLERANCE) {
        return if j == k { 1.0 } else { 0.0 };
    }

    let b = buckets[k];
    if x < b {
        if k == 0 {
            return 1.0;
        }
        let lo = buckets[k - 1];
        if x <= lo {
            0.0
        } else {
            (x - lo) / (b - lo)
        }
    } else {
        if k == m - 1 {
            return 1.0;
        }
        let hi = buckets[k + 1];
        if x >= hi {
            0.0
        } else {
            (hi - x) / (hi - b)
        }
    }
}

/// Weights of every bucket at coordinate `x`.
pub fn triangular_weights(buckets: &[f64], x: f64) -> Vec<f64> {
    (0..buckets.len())
        .map(|k| triangular_weight(buckets, k, x))
        .collect()
}

/// Weight of a surface bucket on a native node.
///
/// The product of the expiry and strike triangles. An empty strike grid
/// shifts the whole smile, giving strike weight 1.
pub fn surface_weight(
    expiry_buckets: &[f64],
    strike_buckets: &[f64],
    expiry_index: usize,
    strike_index: Option<usize>,
    expiry: f64,
    strike: f64,
) -> f64 {
    let w_expiry = triangular_weight(expiry_buckets, expiry_index, expiry);
    if w_expiry == 0.0 {
        return 0.0;
    }
    let w_strike = match strike_index {
        Some(s) => triangular_weight(strike_buckets, s, strike),
        None => 1.0,
    };
    w_expiry * w_strike
}

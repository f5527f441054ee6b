/// Largest `f64` below 1.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Logistic function `1 / (1 + e^-x)`.
///
/// Only results that underflow to 0 or round up to 1 are pulled back to the
/// nearest normal value inside (0, 1); everything else is the exact formula.
pub fn sigmoid(x: f64) -> f64 {
    (1.0 / (1.0 + (-x).exp())).clamp(f64::MIN_POSITIVE, BELOW_ONE)
}

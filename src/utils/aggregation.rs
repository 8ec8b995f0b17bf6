/// Round `value` to `decimals` places, halves away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Trailing-window mean: element `i` averages `values[max(0, i-window+1)..=i]`.
///
/// Windows at the start are partial and average over the values available.
/// A `window` of 0 is treated as 1.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut result = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        let count = (i + 1).min(window);
        result.push(sum / count as f64);
    }

    result
}

/// `round(part / max(1, whole) * 100)`; never divides by zero.
pub fn ratio_percent(part: f64, whole: f64) -> f64 {
    (part / whole.max(1.0) * 100.0).round()
}

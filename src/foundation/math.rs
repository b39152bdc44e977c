/// Logistic function `1 / (1 + e^-x)`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Linear interpolation through `(x1, y1)` and `(x2, y2)`, evaluated at `x`.
///
/// Returns `None` when `x1 == x2` (the line is undefined).
pub fn interpole(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> Option<f64> {
    if x1 == x2 {
        return None;
    }
    Some(y1 + (y2 - y1) * (x - x1) / (x2 - x1))
}

/// Symmetric Hann window of length `n`.
///
/// `hanning(1)` is `[1.0]`; `hanning(0)` is empty.
pub fn hanning(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (n - 1) as f64;
            (0..n)
                .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / denom).cos()))
                .collect()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;

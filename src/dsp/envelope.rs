use crate::foundation::math::sigmoid;

/// Number of envelope values produced for a signal of `len` samples.
///
/// Windows start at offsets `0, stride, 2·stride, …` strictly below `len − window`; a signal no
/// longer than one window yields nothing.
pub fn envelope_len(len: usize, window: usize, stride: usize) -> usize {
    if stride == 0 {
        return 0;
    }
    len.saturating_sub(window).div_ceil(stride)
}

/// Smoothed, bounded loudness curve of one channel.
///
/// The signal is zero-padded by `⌊window/2⌋` samples on each side. For every window position the
/// rectified samples (`max(x, 0)`) are averaged and compressed with
/// `1.9 · (sigmoid(2.5 · v) − 0.5)`, which maps non-negative input into `[0, 0.95)`.
pub fn envelope(signal: &[f32], window: usize, stride: usize) -> Vec<f64> {
    let count = envelope_len(signal.len(), window, stride);
    if count == 0 || window == 0 {
        return Vec::new();
    }
    let half = window / 2;

    // Prefix sums over the zero-padded rectified signal; only the leading pad is ever read.
    let read_len = (count - 1) * stride + window;
    let mut prefix = Vec::with_capacity(read_len + 1);
    prefix.push(0.0f64);
    let mut acc = 0.0f64;
    for i in 0..read_len {
        let x = if i < half {
            0.0
        } else {
            signal.get(i - half).copied().unwrap_or(0.0)
        };
        acc += f64::from(x.max(0.0));
        prefix.push(acc);
    }

    let inv_window = 1.0 / window as f64;
    (0..count)
        .map(|k| {
            let off = k * stride;
            let mean = (prefix[off + window] - prefix[off]) * inv_window;
            1.9 * (sigmoid(2.5 * mean) - 0.5)
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/dsp/envelope.rs"]
mod tests;

use crate::foundation::core::FrameIndex;
use crate::foundation::math::{hanning, interpole, sigmoid};

/// Bar heights of one channel for one output frame, `bars` values long.
pub type FrameBarValues = Vec<f64>;

const SPEEDUP_MIN: f64 = 0.5;
const SPEEDUP_MAX: f64 = 2.0;

/// Prepend `⌊bars/2⌋` and append `2·bars` zeros to every channel's envelope.
pub fn pad_envelopes(envs: &[Vec<f64>], bars: usize) -> Vec<Vec<f64>> {
    let pre = bars / 2;
    let post = 2 * bars;
    envs.iter()
        .map(|env| {
            let mut out = Vec::with_capacity(pre + env.len() + post);
            out.resize(pre, 0.0);
            out.extend_from_slice(env);
            out.resize(pre + env.len() + post, 0.0);
            out
        })
        .collect()
}

/// Number of output frames for `samples` samples: `⌊rate · samples / sampleRate⌋`.
pub fn frame_count(rate: f64, samples: usize, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    let frames = (rate * samples as f64 / f64::from(sample_rate)).floor();
    if frames.is_finite() && frames > 0.0 {
        frames as u64
    } else {
        0
    }
}

/// Crossfade sharpness multiplier from the loudness of the upcoming window.
///
/// Loud sections (peak near 0 dB) blend up to 2× faster, quiet ones down to 0.5×.
pub fn speedup(upcoming: &[f64]) -> f64 {
    let peak = upcoming.iter().copied().fold(0.0f64, f64::max);
    let peak_db = 10.0 * (1e-4 + peak).log10();
    interpole(-6.0, SPEEDUP_MIN, 0.0, SPEEDUP_MAX, peak_db)
        .map_or(SPEEDUP_MIN, |s| s.clamp(SPEEDUP_MIN, SPEEDUP_MAX))
}

/// Timing that maps output frames onto envelope samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTiming {
    /// Output frames per second.
    pub rate: f64,
    /// Sample rate of the analysed signal.
    pub sample_rate: u32,
    /// Envelope stride in samples.
    pub stride: usize,
    /// Bars per channel.
    pub bars: usize,
}

impl FrameTiming {
    /// Fractional envelope segment shown at frame `idx`, split into `(segment, frac)`.
    pub fn position(&self, idx: FrameIndex) -> (usize, f64) {
        let pos = (idx.0 as f64 / self.rate) * f64::from(self.sample_rate)
            / self.stride as f64
            / self.bars as f64;
        let segment = pos.floor();
        (segment.max(0.0) as usize, pos - segment)
    }
}

/// Frame-indexed view over padded envelopes.
///
/// Each frame is a pure function of its index, so frames can be computed in any order.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    padded: Vec<Vec<f64>>,
    timing: FrameTiming,
    speed: f64,
    taper: Vec<f64>,
    frames: u64,
}

impl FrameSequence {
    /// Build a sequence of `frames` frames over already padded envelopes.
    pub fn new(padded: Vec<Vec<f64>>, timing: FrameTiming, speed: f64, frames: u64) -> Self {
        let taper = hanning(timing.bars);
        Self {
            padded,
            timing,
            speed,
            taper,
            frames,
        }
    }

    /// Number of output frames.
    pub fn len(&self) -> u64 {
        self.frames
    }

    /// Return `true` when no frame can be produced.
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.padded.len()
    }

    /// Frame timing.
    pub fn timing(&self) -> FrameTiming {
        self.timing
    }

    /// Bar values of every channel at frame `idx`.
    pub fn bar_values(&self, idx: FrameIndex) -> Vec<FrameBarValues> {
        let (segment, frac) = self.timing.position(idx);
        self.padded
            .iter()
            .map(|env| blend_windows(env, segment, frac, self.speed, &self.taper))
            .collect()
    }
}

/// Crossfade the envelope windows starting at `segment·bars` and `(segment+1)·bars`.
///
/// Reads past the end of `env` count as silence. `taper.len()` is the bar count.
pub fn blend_windows(
    env: &[f64],
    segment: usize,
    frac: f64,
    speed: f64,
    taper: &[f64],
) -> FrameBarValues {
    let bars = taper.len();
    let window = |start: usize| -> Vec<f64> {
        (start..start + bars)
            .map(|i| env.get(i).copied().unwrap_or(0.0))
            .collect()
    };
    let first = window(segment * bars);
    let second = window((segment + 1) * bars);

    let w = sigmoid(speed * speedup(&second) * (frac - 0.5));
    first
        .iter()
        .zip(&second)
        .zip(taper)
        .map(|((a, b), t)| ((1.0 - w) * a + w * b) * t)
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/frames/sequence.rs"]
mod tests;

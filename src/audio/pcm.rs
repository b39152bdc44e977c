use crate::foundation::error::{SeewavError, SeewavResult};

/// Decoded interleaved floating-point PCM owned by one run.
///
/// Only constructible through [`PcmSignal::new`], so the rate and channel count are non-zero and
/// the samples divide evenly into frames.
#[derive(Clone, Debug, PartialEq)]
pub struct PcmSignal {
    sample_rate: u32,
    channels: u16,
    interleaved: Vec<f32>,
}

impl PcmSignal {
    /// Wrap interleaved samples, checking that they divide evenly into frames.
    pub fn new(sample_rate: u32, channels: u16, interleaved: Vec<f32>) -> SeewavResult<Self> {
        if sample_rate == 0 {
            return Err(SeewavError::decode("pcm sample rate must be non-zero"));
        }
        if channels == 0 {
            return Err(SeewavError::decode("pcm channel count must be non-zero"));
        }
        if !interleaved.len().is_multiple_of(usize::from(channels)) {
            return Err(SeewavError::decode(format!(
                "pcm sample count {} is not a multiple of {channels} channels",
                interleaved.len()
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
            interleaved,
        })
    }

    /// Parse raw little-endian `f32` bytes as produced by `-f f32le`.
    pub fn from_f32le_bytes(sample_rate: u32, channels: u16, bytes: &[u8]) -> SeewavResult<Self> {
        if !bytes.len().is_multiple_of(4) {
            return Err(SeewavError::decode(
                "decoded audio byte length is not aligned to f32 samples",
            ));
        }
        let samples = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Self::new(sample_rate, channels, samples)
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Interleaved `f32` samples, nominally in `[-1, 1]`.
    pub fn samples(&self) -> &[f32] {
        &self.interleaved
    }

    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.interleaved.len() / usize::from(self.channels)
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// De-interleave one channel. Channels past the last one repeat the last channel.
    pub fn channel(&self, index: usize) -> Vec<f32> {
        let channels = usize::from(self.channels);
        let c = index.min(channels - 1);
        self.interleaved
            .iter()
            .skip(c)
            .step_by(channels)
            .copied()
            .collect()
    }

    /// Average of the first two channels, `(l + r) / 2`.
    pub fn mixdown(&self) -> Vec<f32> {
        let left = self.channel(0);
        let right = self.channel(1);
        left.iter().zip(&right).map(|(l, r)| (l + r) / 2.0).collect()
    }

    /// Channels fed to envelope extraction: both channels for stereo, a mix-down otherwise.
    pub fn analysis_channels(&self, stereo: bool) -> Vec<Vec<f32>> {
        if stereo {
            vec![self.channel(0), self.channel(1)]
        } else {
            vec![self.mixdown()]
        }
    }
}

/// Population standard deviation `sqrt(E[x²] − E[x]²)`.
pub fn std_dev(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let (sum, sum2) = samples.iter().fold((0.0f64, 0.0f64), |(s, s2), &x| {
        let x = f64::from(x);
        (s + x, s2 + x * x)
    });
    let n = samples.len() as f64;
    let mean = sum / n;
    (sum2 / n - mean * mean).sqrt()
}

/// Scale a channel to unit variance in place.
///
/// Returns `false` (leaving the samples untouched) when the deviation is zero or not finite.
pub fn normalize_unit_variance(samples: &mut [f32]) -> bool {
    let std = std_dev(samples);
    if !(std.is_finite() && std > 0.0) {
        return false;
    }
    for s in samples.iter_mut() {
        *s = (f64::from(*s) / std) as f32;
    }
    true
}

#[cfg(test)]
#[path = "../../tests/unit/audio/pcm.rs"]
mod tests;

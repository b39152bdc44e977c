use crate::foundation::core::Rgb;
use crate::foundation::error::{SeewavError, SeewavResult};

/// Sample rate every input is decoded to before analysis.
pub const SAMPLE_RATE: u32 = 44_100;

/// Immutable configuration for one generation run.
///
/// Field names serialize in camelCase (`fgColor`, `includeAudio`, ...) so option files written for
/// the browser front-end load unchanged.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct GenerationOptions {
    /// Bar color of the first channel.
    pub fg_color: Rgb,
    /// Bar color of the second channel (stereo only).
    pub fg_color2: Rgb,
    /// Background color.
    pub bg_color: Rgb,
    /// Bars per channel.
    pub bars: usize,
    /// Crossfade sharpness between consecutive envelope windows.
    pub speed: f64,
    /// Envelope window length in seconds (one frame's worth of bars).
    pub time: f64,
    /// Envelope sampling density multiplier.
    pub oversample: u32,
    /// Render two independent channels instead of one mixed-down channel.
    pub stereo: bool,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames per second.
    pub rate: f64,
    /// Start offset into the source, in seconds.
    pub seek: Option<f64>,
    /// Maximum source duration to use, in seconds.
    pub duration: Option<f64>,
    /// Mux the (trimmed) source audio into the output.
    pub include_audio: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            fg_color: Rgb::new(0.03, 0.6, 0.3),
            fg_color2: Rgb::new(0.5, 0.3, 0.6),
            bg_color: Rgb::BLACK,
            bars: 50,
            speed: 4.0,
            time: 0.4,
            oversample: 4,
            stereo: false,
            width: 480,
            height: 300,
            rate: 60.0,
            seek: None,
            duration: None,
            include_audio: true,
        }
    }
}

impl GenerationOptions {
    /// Validate every numeric field and the envelope geometry derived from them.
    pub fn validate(&self) -> SeewavResult<()> {
        self.fg_color.validate("fgColor")?;
        self.fg_color2.validate("fgColor2")?;
        self.bg_color.validate("bgColor")?;

        if self.bars == 0 {
            return Err(SeewavError::invalid_options("bars must be >= 1"));
        }
        positive_finite("speed", self.speed)?;
        positive_finite("time", self.time)?;
        if self.oversample == 0 {
            return Err(SeewavError::invalid_options("oversample must be >= 1"));
        }
        positive_finite("rate", self.rate)?;

        // The rasterizer addresses surfaces with 16-bit dimensions.
        for (name, v) in [("width", self.width), ("height", self.height)] {
            if v == 0 || v > u32::from(u16::MAX) {
                return Err(SeewavError::invalid_options(format!(
                    "{name} must be within 1..={}, got {v}",
                    u16::MAX
                )));
            }
        }

        if let Some(seek) = self.seek
            && !(seek.is_finite() && seek >= 0.0)
        {
            return Err(SeewavError::invalid_options(format!(
                "seek must be finite and >= 0, got {seek}"
            )));
        }
        if let Some(duration) = self.duration {
            positive_finite("duration", duration)?;
        }

        if self.window_samples() == 0 {
            return Err(SeewavError::invalid_options(format!(
                "time ({}) is too short for {} bars: envelope window is empty",
                self.time, self.bars
            )));
        }
        if self.stride() == 0 {
            return Err(SeewavError::invalid_options(format!(
                "oversample ({}) exceeds the envelope window of {} samples",
                self.oversample,
                self.window_samples()
            )));
        }
        Ok(())
    }

    /// Number of channels rendered: 2 for stereo, 1 for a mixed-down signal.
    pub fn channel_count(&self) -> usize {
        if self.stereo { 2 } else { 1 }
    }

    /// Envelope window length in samples: `⌊sampleRate · time / bars⌋`.
    pub fn window_samples(&self) -> usize {
        if self.bars == 0 {
            return 0;
        }
        (f64::from(SAMPLE_RATE) * self.time / self.bars as f64).floor() as usize
    }

    /// Envelope stride in samples: `⌊windowSamples / oversample⌋`.
    pub fn stride(&self) -> usize {
        if self.oversample == 0 {
            return 0;
        }
        self.window_samples() / self.oversample as usize
    }

    /// Foreground colors indexed by channel.
    pub fn fg_colors(&self) -> [Rgb; 2] {
        [self.fg_color, self.fg_color2]
    }
}

fn positive_finite(name: &str, v: f64) -> SeewavResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(SeewavError::invalid_options(format!(
            "{name} must be finite and > 0, got {v}"
        )))
    }
}

#[cfg(test)]
#[path = "../tests/unit/options.rs"]
mod tests;

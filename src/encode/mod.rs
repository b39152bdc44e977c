//! Video encoding strategies behind one [`Encoder`] interface.
//!
//! Two implementations exist, both driving the system `ffmpeg` binary:
//! - [`HardwareEncoder`]: pipes raw frames into a hardware H.264 encoder, then muxes audio by
//!   copying the video bitstream.
//! - [`GeneralEncoder`]: writes PNG frames to disk and runs `libx264`. Always available when
//!   `ffmpeg` is installed.
//!
//! The strategy is chosen once from a [`Capabilities`] probe and injected into every run as an
//! [`EncoderFactory`].

/// `ffmpeg` subprocess plumbing.
pub mod ffmpeg;
/// `libx264` fallback strategy.
pub mod general;
/// Hardware-accelerated strategy.
pub mod hardware;
/// Host capability probe.
pub mod probe;

pub use general::GeneralEncoder;
pub use hardware::HardwareEncoder;
pub use probe::{Capabilities, HwCodec};

use crate::foundation::error::{SeewavError, SeewavResult};
use crate::render::RenderedFrame;
use crate::session::control::RunControl;
use std::sync::Arc;

/// Source audio to mux into the output, trimmed like the analysed signal.
#[derive(Clone, Copy, Debug)]
pub struct AudioTrack<'a> {
    /// The original input file bytes.
    pub source: &'a [u8],
    /// Start offset into the source, in seconds.
    pub seek: Option<f64>,
    /// Maximum duration, in seconds.
    pub duration: Option<f64>,
}

/// Parameters of one encode call.
#[derive(Clone, Copy, Debug)]
pub struct EncodeJob<'a> {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub rate: f64,
    /// Audio to mux, if any.
    pub audio: Option<AudioTrack<'a>>,
}

impl EncodeJob<'_> {
    /// Check that the job can be encoded to a 4:2:0 H.264 stream.
    pub fn validate(&self) -> SeewavResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SeewavError::encode("width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(SeewavError::encode(format!(
                "width/height must be even for yuv420p output, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.rate.is_finite() && self.rate > 0.0) {
            return Err(SeewavError::encode(format!(
                "frame rate must be finite and > 0, got {}",
                self.rate
            )));
        }
        Ok(())
    }

    pub(crate) fn check_frames(&self, frames: &[RenderedFrame]) -> SeewavResult<()> {
        if frames.is_empty() {
            return Err(SeewavError::encode("no frames to encode"));
        }
        if let Some((i, f)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.width != self.width || f.height != self.height)
        {
            return Err(SeewavError::encode(format!(
                "frame {i} is {}x{}, expected {}x{}",
                f.width, f.height, self.width, self.height
            )));
        }
        Ok(())
    }

    pub(crate) fn size_arg(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    pub(crate) fn rate_arg(&self) -> String {
        format!("{}", self.rate)
    }
}

/// Which strategy an encoder implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncoderKind {
    /// Hardware-accelerated H.264 through the given codec.
    Hardware(HwCodec),
    /// `libx264` fallback.
    General,
}

/// Encodes an ordered frame sequence (plus optional audio) into an MP4 buffer.
///
/// Frames arrive in timestamp order. Implementations must poll `ctl` so a cancelled run stops
/// promptly, and must release every subprocess and temporary file on all exit paths.
pub trait Encoder: Send {
    /// Strategy implemented by this encoder.
    fn kind(&self) -> EncoderKind;

    /// Encode `frames` at `job.rate` and return the complete container bytes.
    fn encode_frames(
        &mut self,
        frames: &[RenderedFrame],
        job: &EncodeJob<'_>,
        ctl: &RunControl,
    ) -> SeewavResult<Vec<u8>>;
}

/// Creates a fresh encoder for each run.
pub type EncoderFactory = Arc<dyn Fn() -> Box<dyn Encoder> + Send + Sync>;

/// Caller preference for the encoding strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderPreference {
    /// Hardware when probed available, otherwise general.
    #[default]
    Auto,
    /// Require a hardware codec.
    Hardware,
    /// Always use `libx264`.
    General,
}

/// Pick the encoder strategy for `caps` and `preference`.
pub fn select_encoder(
    caps: &Capabilities,
    preference: EncoderPreference,
) -> SeewavResult<EncoderFactory> {
    let hardware = match preference {
        EncoderPreference::General => None,
        EncoderPreference::Auto => caps.hardware,
        EncoderPreference::Hardware => Some(caps.hardware.ok_or_else(|| {
            SeewavError::invalid_options("hardware encoding requested but no codec is available")
        })?),
    };
    if !caps.ffmpeg {
        tracing::warn!("ffmpeg was not found on PATH; encoding will fail");
    }
    Ok(match hardware {
        Some(codec) => {
            tracing::info!(codec = codec.ffmpeg_name(), "using hardware encoder");
            Arc::new(move || Box::new(HardwareEncoder::new(codec)) as Box<dyn Encoder>)
        }
        None => {
            tracing::info!("using libx264 encoder");
            Arc::new(|| Box::new(GeneralEncoder::new()) as Box<dyn Encoder>)
        }
    })
}

/// Return `true` when `bytes` starts like an ISO-BMFF file (`ftyp` box at offset 4).
pub fn is_mp4(bytes: &[u8]) -> bool {
    bytes.get(4..8) == Some(b"ftyp".as_slice())
}

pub(crate) fn check_container(bytes: Vec<u8>) -> SeewavResult<Vec<u8>> {
    if is_mp4(&bytes) {
        Ok(bytes)
    } else {
        Err(SeewavError::encode(format!(
            "encoder produced {} bytes without an ftyp header",
            bytes.len()
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mod.rs"]
mod tests;

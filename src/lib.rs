//! seewav turns an audio clip into an MP4 of animated waveform bars.
//!
//! A run decodes the input to PCM, extracts a smoothed loudness envelope, crossfades envelope
//! windows into per-frame bar values, rasterizes each frame on the CPU and encodes the sequence
//! (optionally with the source audio) through the system `ffmpeg`:
//!
//! - Describe the video with [`GenerationOptions`]
//! - Create a [`Generator`] (probes encoder capabilities once)
//! - Call [`Generator::generate`] and consume the [`RunHandle`]'s messages
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Audio decoding and PCM preparation.
pub mod audio;
/// Loudness envelope extraction.
pub mod dsp;
/// Video encoding strategies.
pub mod encode;
/// Per-frame bar values.
pub mod frames;
/// Generation options.
pub mod options;
/// Bar rasterization.
pub mod render;
/// Run orchestration.
pub mod session;

pub use crate::foundation::core::{FrameIndex, Rgb};
pub use crate::foundation::error::{SeewavError, SeewavResult};
pub use crate::foundation::math::{hanning, interpole, sigmoid};

pub use crate::audio::decode::{DecodeRequest, Decoder, FfmpegDecoder};
pub use crate::audio::pcm::PcmSignal;
pub use crate::dsp::envelope;
pub use crate::encode::ffmpeg::is_ffmpeg_on_path;
pub use crate::encode::{
    AudioTrack, Capabilities, EncodeJob, Encoder, EncoderFactory, EncoderKind,
    EncoderPreference, HwCodec, is_mp4,
};
pub use crate::frames::{FrameBarValues, FrameSequence, pad_envelopes};
pub use crate::options::{GenerationOptions, SAMPLE_RATE};
pub use crate::render::{BarRenderer, FrameRGBA, RenderedFrame};
pub use crate::session::{
    CancelToken, Generator, GeneratorOpts, Message, Phase, RunControl, RunHandle, RunOutcome,
    RunState,
};

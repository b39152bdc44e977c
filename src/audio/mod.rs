//! Audio intake: decoding input bytes to PCM and preparing analysis channels.

/// Decoder collaborator interface and the `ffmpeg`-backed implementation.
pub mod decode;
/// Decoded PCM and per-channel preparation (mix-down, normalization).
pub mod pcm;

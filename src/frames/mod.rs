//! Per-frame bar values: envelope padding and adaptive crossfading between windows.

/// Padded envelopes and the frame sequence built from them.
pub mod sequence;

pub use sequence::{FrameBarValues, FrameSequence, FrameTiming, pad_envelopes};

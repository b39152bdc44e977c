//! Rasterization of per-frame bar values into opaque RGB frames.
//!
//! [`BarRenderer`] draws one frame at a time on the CPU with `vello_cpu`. Frames handed to the
//! encoders are [`RenderedFrame`]s: PNG images that can be decoded back to raw RGB when an encoder
//! wants pixels instead of files.

/// Bar layout and the CPU rasterizer.
pub mod bars;
/// Frame pixel buffers and PNG encoding.
pub mod frame;

pub use bars::BarRenderer;
pub use frame::{FrameRGBA, RenderedFrame};

//! Signal processing: loudness envelopes.

/// Sliding-window rectified loudness envelope.
pub mod envelope;

pub use envelope::envelope;

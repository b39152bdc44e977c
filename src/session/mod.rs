//! Run orchestration: the background worker, its message protocol and cancellation.

/// Cancellation, progress messages and run state.
pub mod control;
/// The orchestrator and the caller's run handle.
pub mod generator;
/// Decode, render and encode stages of one run.
pub mod pipeline;

pub use control::{CancelToken, Message, Phase, RunControl, RunState};
pub use generator::{Generator, GeneratorOpts, RunHandle, RunOutcome};

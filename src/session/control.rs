use crate::foundation::error::{SeewavError, SeewavResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, TrySendError};
use std::time::Duration;

/// How often a blocked terminal delivery rechecks the cancellation flag.
const DELIVERY_POLL: Duration = Duration::from_millis(15);

/// Cooperative cancellation flag shared between a caller and a run's worker.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Return `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Pipeline phase a progress message refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Frame building and rasterization (0..80%).
    Frames,
    /// Video encoding and muxing (80..100%).
    Encode,
}

/// Messages a run sends to its caller: zero or more `Progress`, then at most one terminal message.
///
/// Serializes to `{"type":"progress","phase":"frames","pct":10}`, `{"type":"done"}` and
/// `{"type":"error","message":"..."}`. The `done` buffer is not serialized.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// Overall progress in percent.
    Progress {
        /// Phase the run is in.
        phase: Phase,
        /// Percent complete, `0..=100`.
        pct: u8,
    },
    /// The run finished; `buffer` holds the complete video container.
    Done {
        /// Encoded video bytes.
        #[serde(skip)]
        buffer: Vec<u8>,
    },
    /// The run failed.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl Message {
    /// Return `true` for `Done` and `Error`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

/// Lifecycle state of a run. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum RunState {
    /// Created, not started.
    Idle = 0,
    /// Decoding input audio to PCM.
    Decoding = 1,
    /// Extracting envelopes and rasterizing frames.
    Rendering = 2,
    /// Encoding frames (and audio) into a container.
    Encoding = 3,
    /// Finished with a buffer.
    Done = 4,
    /// Finished with an error.
    Failed = 5,
    /// Stopped by the caller without a terminal message.
    Cancelled = 6,
}

impl RunState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Idle,
            1 => Self::Decoding,
            2 => Self::Rendering,
            3 => Self::Encoding,
            4 => Self::Done,
            5 => Self::Failed,
            _ => Self::Cancelled,
        }
    }

    /// Return `true` for `Done`, `Failed` and `Cancelled`.
    pub fn is_finished(self) -> bool {
        self >= Self::Done
    }
}

/// Shared, observable run state.
#[derive(Clone, Debug)]
pub(crate) struct StateCell(Arc<AtomicU8>);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicU8::new(RunState::Idle as u8)))
    }

    pub(crate) fn get(&self) -> RunState {
        RunState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move forward to `next`. Backward or repeated transitions are ignored.
    fn advance(&self, next: RunState) -> bool {
        let next_u8 = next as u8;
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                let cur_state = RunState::from_u8(cur);
                (next_u8 > cur && !cur_state.is_finished()).then_some(next_u8)
            })
            .is_ok()
    }

    /// Mark a finished run whose terminal message was never delivered as `Cancelled`.
    fn abandon(&self) {
        self.0.store(RunState::Cancelled as u8, Ordering::Release);
    }
}

/// Worker-side handle to a run's cancellation flag, progress channel and state.
///
/// Progress is lossy: when the bounded channel is full, progress messages are dropped rather than
/// blocking the worker. The terminal message waits for room in the channel, but gives up when the
/// receiver is gone or the run is cancelled while waiting; the run then ends `Cancelled`.
#[derive(Debug)]
pub struct RunControl {
    cancel: CancelToken,
    events: SyncSender<Message>,
    state: StateCell,
}

impl RunControl {
    /// Create a control block and the receiving end of its message channel.
    pub fn new(cancel: CancelToken, capacity: usize) -> (Self, Receiver<Message>) {
        let (tx, rx) = std::sync::mpsc::sync_channel(capacity.max(1));
        (
            Self {
                cancel,
                events: tx,
                state: StateCell::new(),
            },
            rx,
        )
    }

    pub(crate) fn state_cell(&self) -> StateCell {
        self.state.clone()
    }

    /// Return `true` once the caller asked to cancel.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancellation point: `Err(Cancelled)` when the run should stop.
    pub fn checkpoint(&self) -> SeewavResult<()> {
        if self.is_cancelled() {
            Err(SeewavError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Report progress. Values above 100 are clamped.
    pub fn progress(&self, phase: Phase, pct: u8) {
        if self.is_cancelled() {
            return;
        }
        let msg = Message::Progress {
            phase,
            pct: pct.min(100),
        };
        match self.events.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => tracing::trace!(?phase, pct, "progress dropped"),
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.state.get()
    }

    pub(crate) fn enter(&self, next: RunState) {
        let prev = self.state.get();
        if self.state.advance(next) {
            tracing::debug!(from = ?prev, to = ?next, "run state");
        }
    }

    /// Deliver the terminal outcome of the run, consuming the control block.
    ///
    /// A cancelled run never emits `Done` or `Error`. Blocks while the channel is full until the
    /// caller drains it or cancels.
    pub(crate) fn finish(self, result: SeewavResult<Vec<u8>>) {
        let msg = match result {
            _ if self.is_cancelled() => None,
            Err(SeewavError::Cancelled) => None,
            Ok(buffer) => Some(Message::Done { buffer }),
            Err(e) => Some(Message::Error {
                message: e.to_string(),
            }),
        };
        match msg {
            None => {
                self.enter(RunState::Cancelled);
                tracing::info!("run cancelled");
            }
            Some(msg) => {
                self.enter(if matches!(msg, Message::Done { .. }) {
                    RunState::Done
                } else {
                    RunState::Failed
                });
                if let Message::Error { message } = &msg {
                    tracing::warn!(%message, "run failed");
                }
                self.deliver(msg);
            }
        }
    }

    fn deliver(&self, msg: Message) {
        let mut pending = msg;
        loop {
            match self.events.try_send(pending) {
                // Nothing else to report to once the receiver is gone.
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(msg)) => {
                    if self.is_cancelled() {
                        self.state.abandon();
                        tracing::info!("run cancelled before its outcome was received");
                        return;
                    }
                    pending = msg;
                    std::thread::sleep(DELIVERY_POLL);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/control.rs"]
mod tests;

use crate::audio::decode::{Decoder, FfmpegDecoder};
use crate::encode::{Capabilities, EncoderFactory, EncoderPreference, select_encoder};
use crate::foundation::error::SeewavResult;
use crate::options::GenerationOptions;
use crate::session::control::{CancelToken, Message, Phase, RunControl, RunState, StateCell};
use crate::session::pipeline;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread::JoinHandle;

/// Runtime knobs of a [`Generator`]. None of them change the produced video.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct GeneratorOpts {
    /// Rasterize frames on a rayon pool.
    pub parallel: bool,
    /// Pool size; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Frames per parallel batch. Cancellation is checked between batches.
    pub chunk_size: usize,
    /// Capacity of the progress channel. Progress beyond it is dropped.
    pub channel_capacity: usize,
    /// Encoding strategy preference.
    pub encoder: EncoderPreference,
}

impl Default for GeneratorOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            chunk_size: 64,
            channel_capacity: 64,
            encoder: EncoderPreference::Auto,
        }
    }
}

/// Final outcome of a run as seen by its caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Complete video container bytes.
    Done(Vec<u8>),
    /// The run failed with this message.
    Failed(String),
    /// The run was cancelled and sent no terminal message.
    Cancelled,
}

/// Caller side of one run.
///
/// Messages arrive as zero or more `Progress` followed by at most one `Done`/`Error`. A cancelled
/// run ends without a terminal message and its channel simply closes.
#[derive(Debug)]
pub struct RunHandle {
    rx: Receiver<Message>,
    cancel: CancelToken,
    state: StateCell,
    worker: Option<JoinHandle<()>>,
}

impl RunHandle {
    /// Block for the next message. `None` once the run has ended and the channel is drained.
    pub fn recv(&self) -> Option<Message> {
        self.rx.recv().ok()
    }

    /// Next message if one is queued.
    pub fn try_recv(&self) -> Option<Message> {
        match self.rx.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Request cancellation of this run.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this run.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Current state of the run.
    pub fn state(&self) -> RunState {
        self.state.get()
    }

    /// Block until the run ends, passing every progress message to `on_progress`.
    pub fn wait(mut self, mut on_progress: impl FnMut(Phase, u8)) -> RunOutcome {
        while let Ok(msg) = self.rx.recv() {
            match msg {
                Message::Progress { phase, pct } => on_progress(phase, pct),
                Message::Done { buffer } => return RunOutcome::Done(buffer),
                Message::Error { message } => return RunOutcome::Failed(message),
            }
        }
        // The channel closed without a terminal message: cancelled, or the worker died.
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            return RunOutcome::Failed("run worker panicked".to_owned());
        }
        if self.cancel.is_cancelled() || self.state.get() == RunState::Cancelled {
            RunOutcome::Cancelled
        } else {
            RunOutcome::Failed("run ended without a result".to_owned())
        }
    }
}

/// Orchestrator owning at most one active run.
///
/// Each [`Generator::generate`] call cancels the previous run and starts a fresh worker thread;
/// nothing is shared between runs except the injected decoder and encoder factory.
pub struct Generator {
    decoder: Arc<dyn Decoder>,
    encoder: EncoderFactory,
    opts: GeneratorOpts,
    capabilities: Option<Capabilities>,
    active: Option<CancelToken>,
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("opts", &self.opts)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl Generator {
    /// Probe the host once and build a generator using `ffmpeg` for decoding and encoding.
    pub fn new(opts: GeneratorOpts) -> SeewavResult<Self> {
        let caps = Capabilities::probe();
        let encoder = select_encoder(&caps, opts.encoder)?;
        Ok(Self {
            decoder: Arc::new(FfmpegDecoder),
            encoder,
            opts,
            capabilities: Some(caps),
            active: None,
        })
    }

    /// Generator with injected collaborators. No capability probe is run.
    pub fn with_backends(
        decoder: Arc<dyn Decoder>,
        encoder: EncoderFactory,
        opts: GeneratorOpts,
    ) -> Self {
        Self {
            decoder,
            encoder,
            opts,
            capabilities: None,
            active: None,
        }
    }

    /// Capabilities probed by [`Generator::new`].
    pub fn capabilities(&self) -> Option<Capabilities> {
        self.capabilities
    }

    /// Runtime options.
    pub fn opts(&self) -> &GeneratorOpts {
        &self.opts
    }

    /// Start a run and return its handle without blocking.
    ///
    /// Any run still in flight is cancelled first. Invalid `options` produce a handle whose only
    /// message is `Error`.
    pub fn generate(
        &mut self,
        file: impl Into<Arc<[u8]>>,
        options: GenerationOptions,
    ) -> RunHandle {
        self.cancel();

        let cancel = CancelToken::new();
        let (ctl, rx) = RunControl::new(cancel.clone(), self.opts.channel_capacity);
        let state = ctl.state_cell();

        if let Err(e) = options.validate() {
            ctl.finish(Err(e));
            return RunHandle {
                rx,
                cancel,
                state,
                worker: None,
            };
        }

        let file: Arc<[u8]> = file.into();
        let decoder = Arc::clone(&self.decoder);
        let encoder = Arc::clone(&self.encoder);
        let opts = self.opts.clone();
        let spawned = std::thread::Builder::new()
            .name("seewav-run".to_owned())
            .spawn(move || {
                let result = pipeline::run(&file, &options, decoder.as_ref(), &encoder, &opts, &ctl);
                ctl.finish(result);
            });

        let worker = match spawned {
            Ok(handle) => {
                self.active = Some(cancel.clone());
                Some(handle)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn run worker");
                None
            }
        };
        RunHandle {
            rx,
            cancel,
            state,
            worker,
        }
    }

    /// Cancel the active run, if any. Its worker is detached, not joined.
    pub fn cancel(&mut self) {
        if let Some(prev) = self.active.take()
            && !prev.is_cancelled()
        {
            tracing::debug!("cancelling previous run");
            prev.cancel();
        }
    }
}

impl Drop for Generator {
    fn drop(&mut self) {
        self.cancel();
    }
}

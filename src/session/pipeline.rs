use crate::audio::decode::{DecodeRequest, Decoder};
use crate::audio::pcm::{PcmSignal, normalize_unit_variance};
use crate::dsp::envelope;
use crate::encode::{AudioTrack, EncodeJob, EncoderFactory};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{SeewavError, SeewavResult};
use crate::frames::sequence::frame_count;
use crate::frames::{FrameSequence, FrameTiming, pad_envelopes};
use crate::options::{GenerationOptions, SAMPLE_RATE};
use crate::render::{BarRenderer, RenderedFrame};
use crate::session::control::{Phase, RunControl, RunState};
use crate::session::generator::GeneratorOpts;
use rayon::prelude::*;

/// Share of total progress covered by frame rendering.
const FRAMES_PCT: f64 = 80.0;

/// Run one generation: decode, render every frame, encode.
///
/// `options` must already be validated. Returns `Err(Cancelled)` as soon as a cancellation point
/// observes the flag.
#[tracing::instrument(skip_all, fields(bytes = file.len(), bars = options.bars, stereo = options.stereo))]
pub(crate) fn run(
    file: &[u8],
    options: &GenerationOptions,
    decoder: &dyn Decoder,
    encoder: &EncoderFactory,
    opts: &GeneratorOpts,
    ctl: &RunControl,
) -> SeewavResult<Vec<u8>> {
    ctl.checkpoint()?;
    ctl.enter(RunState::Decoding);
    let req = DecodeRequest {
        sample_rate: SAMPLE_RATE,
        seek: options.seek,
        duration: options.duration,
    };
    let pcm = decoder.decode(file, &req, ctl)?;
    if pcm.sample_rate() != req.sample_rate {
        return Err(SeewavError::decode(format!(
            "decoder returned {} Hz audio, expected {} Hz",
            pcm.sample_rate(),
            req.sample_rate
        )));
    }

    ctl.checkpoint()?;
    ctl.enter(RunState::Rendering);
    let sequence = build_sequence(&pcm, options)?;
    let frames = render_frames(&sequence, options, opts, ctl)?;

    ctl.checkpoint()?;
    ctl.enter(RunState::Encoding);
    let job = EncodeJob {
        width: options.width,
        height: options.height,
        rate: options.rate,
        audio: options.include_audio.then_some(AudioTrack {
            source: file,
            seek: options.seek,
            duration: options.duration,
        }),
    };
    let mut encoder = encoder();
    tracing::info!(kind = ?encoder.kind(), frames = frames.len(), "encoding");
    let buffer = encoder.encode_frames(&frames, &job, ctl)?;
    tracing::info!(bytes = buffer.len(), "encoded");
    Ok(buffer)
}

/// Normalize, extract envelopes and pad them into a frame sequence.
///
/// Fails with a decode error when the signal is shorter than one output frame.
pub fn build_sequence(pcm: &PcmSignal, options: &GenerationOptions) -> SeewavResult<FrameSequence> {
    let mut channels = pcm.analysis_channels(options.stereo);
    for (i, channel) in channels.iter_mut().enumerate() {
        if !normalize_unit_variance(channel) {
            tracing::debug!(channel = i, "zero-variance channel left unscaled");
        }
    }

    let window = options.window_samples();
    let stride = options.stride();
    let envs: Vec<Vec<f64>> = channels
        .iter()
        .map(|c| envelope(c, window, stride))
        .collect();

    let frames = frame_count(options.rate, pcm.frames(), pcm.sample_rate());
    if frames == 0 {
        return Err(SeewavError::decode(format!(
            "decoded audio ({:.3}s) is shorter than one video frame",
            pcm.duration_secs()
        )));
    }
    tracing::debug!(
        window,
        stride,
        envelope_len = envs.first().map_or(0, Vec::len),
        frames,
        "frame sequence"
    );

    let timing = FrameTiming {
        rate: options.rate,
        sample_rate: pcm.sample_rate(),
        stride,
        bars: options.bars,
    };
    Ok(FrameSequence::new(
        pad_envelopes(&envs, options.bars),
        timing,
        options.speed,
        frames,
    ))
}

fn render_frames(
    sequence: &FrameSequence,
    options: &GenerationOptions,
    opts: &GeneratorOpts,
    ctl: &RunControl,
) -> SeewavResult<Vec<RenderedFrame>> {
    let total = sequence.len();
    let report = |idx: u64| {
        if idx % 10 == 0 {
            let pct = (idx as f64 / total as f64 * FRAMES_PCT).round();
            ctl.progress(Phase::Frames, pct as u8);
        }
    };

    let mut out = Vec::with_capacity(total.min(1 << 16) as usize);
    if !opts.parallel {
        let mut renderer = BarRenderer::from_options(options)?;
        for idx in 0..total {
            ctl.checkpoint()?;
            let values = sequence.bar_values(FrameIndex(idx));
            out.push(RenderedFrame::from_rgba(&renderer.draw(&values)?)?);
            report(idx);
        }
        return Ok(out);
    }

    let pool = build_thread_pool(opts.threads)?;
    let chunk_size = opts.chunk_size.max(1) as u64;
    let mut chunk_start = 0;
    while chunk_start < total {
        ctl.checkpoint()?;
        let chunk_end = (chunk_start + chunk_size).min(total);
        let rendered = pool.install(|| {
            (chunk_start..chunk_end)
                .into_par_iter()
                .map_init(
                    || BarRenderer::from_options(options),
                    |renderer, idx| -> SeewavResult<RenderedFrame> {
                        let renderer = renderer.as_mut().map_err(|e| {
                            SeewavError::invalid_options(format!("renderer setup failed: {e}"))
                        })?;
                        let values = sequence.bar_values(FrameIndex(idx));
                        RenderedFrame::from_rgba(&renderer.draw(&values)?)
                    },
                )
                .collect::<Vec<_>>()
        });
        // Results come back in index order; progress is reported in the same order.
        for (idx, frame) in (chunk_start..chunk_end).zip(rendered) {
            out.push(frame?);
            report(idx);
        }
        chunk_start = chunk_end;
    }
    Ok(out)
}

fn build_thread_pool(threads: Option<usize>) -> SeewavResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(SeewavError::invalid_options(
            "threads must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SeewavError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/pipeline.rs"]
mod tests;

use crate::audio::pcm::PcmSignal;
use crate::encode::ffmpeg::{Stage, ffmpeg_command, run_ffmpeg, secs_arg};
use crate::foundation::error::{SeewavError, SeewavResult};
use crate::foundation::workdir::WorkDir;
use crate::session::control::RunControl;

/// Parameters for decoding one input file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodeRequest {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Start offset into the source, in seconds.
    pub seek: Option<f64>,
    /// Maximum decoded duration, in seconds.
    pub duration: Option<f64>,
}

/// Turns an opaque audio file into interleaved stereo `f32` PCM.
///
/// Implementations should return [`SeewavError::Decode`] for unreadable input and may poll
/// `ctl` to stop early when the run is cancelled.
pub trait Decoder: Send + Sync {
    /// Decode `file` according to `req`.
    fn decode(&self, file: &[u8], req: &DecodeRequest, ctl: &RunControl)
    -> SeewavResult<PcmSignal>;
}

/// Decoder backed by the system `ffmpeg` binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegDecoder;

impl Decoder for FfmpegDecoder {
    #[tracing::instrument(skip(self, file, ctl), fields(bytes = file.len()))]
    fn decode(
        &self,
        file: &[u8],
        req: &DecodeRequest,
        ctl: &RunControl,
    ) -> SeewavResult<PcmSignal> {
        if file.is_empty() {
            return Err(SeewavError::decode("input file is empty"));
        }
        if req.sample_rate == 0 {
            return Err(SeewavError::decode("sample rate must be non-zero"));
        }

        // Containers such as MP4/M4A need a seekable input, so the bytes go through a file.
        let dir = WorkDir::create("decode")?;
        let input = dir.write("input", file)?;

        let mut cmd = ffmpeg_command();
        cmd.arg("-i").arg(&input);
        push_trim_args(&mut cmd, req.seek, req.duration);
        cmd.args([
            "-vn",
            "-ac",
            "2",
            "-ar",
            &req.sample_rate.to_string(),
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "pipe:1",
        ]);

        let bytes = run_ffmpeg(cmd, Stage::Decode, true, ctl)?;
        let pcm = PcmSignal::from_f32le_bytes(req.sample_rate, 2, &bytes)?;
        tracing::debug!(
            frames = pcm.frames(),
            secs = pcm.duration_secs(),
            "decoded audio"
        );
        Ok(pcm)
    }
}

/// Append `-ss`/`-t` trim arguments when set.
pub(crate) fn push_trim_args(
    cmd: &mut std::process::Command,
    seek: Option<f64>,
    duration: Option<f64>,
) {
    if let Some(seek) = seek {
        cmd.args(["-ss", &secs_arg(seek)]);
    }
    if let Some(duration) = duration {
        cmd.args(["-t", &secs_arg(duration)]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/decode.rs"]
mod tests;

use crate::audio::decode::push_trim_args;
use crate::encode::ffmpeg::{Stage, ffmpeg_command, run_ffmpeg};
use crate::encode::{EncodeJob, Encoder, EncoderKind, check_container};
use crate::foundation::error::{SeewavError, SeewavResult};
use crate::foundation::workdir::WorkDir;
use crate::render::RenderedFrame;
use crate::session::control::{Phase, RunControl};

/// `libx264` encoder fed with PNG frames from a temporary directory.
#[derive(Debug, Default)]
pub struct GeneralEncoder;

impl GeneralEncoder {
    /// Create the encoder.
    pub fn new() -> Self {
        Self
    }
}

impl Encoder for GeneralEncoder {
    fn kind(&self) -> EncoderKind {
        EncoderKind::General
    }

    #[tracing::instrument(skip_all, fields(frames = frames.len()))]
    fn encode_frames(
        &mut self,
        frames: &[RenderedFrame],
        job: &EncodeJob<'_>,
        ctl: &RunControl,
    ) -> SeewavResult<Vec<u8>> {
        job.validate()?;
        job.check_frames(frames)?;

        let dir = WorkDir::create("encode")?;
        for (i, frame) in frames.iter().enumerate() {
            ctl.checkpoint()?;
            dir.write(&format!("frame{i:06}.png"), &frame.png)?;
        }
        let audio_in = match job.audio {
            Some(audio) => Some((dir.write("audio_in", audio.source)?, audio)),
            None => None,
        };
        let out = dir.join("out.mp4");
        tracing::debug!(dir = %dir.path().display(), frames = frames.len(), "frames written");

        ctl.checkpoint()?;
        ctl.progress(Phase::Encode, 85);

        let mut cmd = ffmpeg_command();
        cmd.args(["-r", &job.rate_arg(), "-f", "image2", "-i"])
            .arg(dir.join("frame%06d.png"));
        if let Some((path, audio)) = &audio_in {
            push_trim_args(&mut cmd, audio.seek, audio.duration);
            cmd.arg("-i").arg(path);
            cmd.args(["-c:a", "aac"]);
        }
        cmd.args([
            "-vcodec",
            "libx264",
            "-crf",
            "10",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&out);
        run_ffmpeg(cmd, Stage::Encode, false, ctl)?;

        let bytes = std::fs::read(&out)
            .map_err(|e| SeewavError::encode(format!("failed to read encoded output: {e}")))?;
        tracing::debug!(bytes = bytes.len(), "libx264 output ready");
        check_container(bytes)
    }
}

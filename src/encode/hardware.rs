use crate::audio::decode::push_trim_args;
use crate::encode::ffmpeg::{FfmpegProcess, Stage, ffmpeg_command, run_ffmpeg};
use crate::encode::probe::HwCodec;
use crate::encode::{EncodeJob, Encoder, EncoderKind, check_container};
use crate::foundation::error::{SeewavError, SeewavResult};
use crate::foundation::workdir::WorkDir;
use crate::render::RenderedFrame;
use crate::session::control::{Phase, RunControl};

const VIDEO_BITRATE: &str = "2M";

/// Two-stage hardware encoder.
///
/// Stage one streams raw RGB frames through the hardware codec into a fragmented MP4 held in
/// memory. With audio, stage two muxes that stream with AAC audio, copying the video bitstream
/// unmodified.
#[derive(Debug)]
pub struct HardwareEncoder {
    codec: HwCodec,
}

impl HardwareEncoder {
    /// Encoder using `codec`.
    pub fn new(codec: HwCodec) -> Self {
        Self { codec }
    }

    fn encode_video(
        &self,
        frames: &[RenderedFrame],
        job: &EncodeJob<'_>,
        ctl: &RunControl,
    ) -> SeewavResult<Vec<u8>> {
        let keyframe_interval = ((2.0 * job.rate).round() as u64).max(1).to_string();
        let mut cmd = ffmpeg_command();
        cmd.args([
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &job.size_arg(),
            "-r",
            &job.rate_arg(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            self.codec.ffmpeg_name(),
            "-b:v",
            VIDEO_BITRATE,
            "-g",
            &keyframe_interval,
            "-pix_fmt",
            self.codec.pix_fmt(),
            "-movflags",
            "frag_keyframe+empty_moov+default_base_moof",
            "-f",
            "mp4",
            "pipe:1",
        ]);

        let mut process = FfmpegProcess::spawn(cmd, Stage::Encode, true, true)?;
        let n = frames.len();
        for (i, frame) in frames.iter().enumerate() {
            ctl.checkpoint()?;
            let rgb = frame.decode_rgb()?;
            process.write_stdin(&rgb, ctl)?;
            if i % 10 == 0 {
                let pct = 80.0 + (i as f64 / n as f64 * 15.0).round();
                ctl.progress(Phase::Encode, pct as u8);
            }
        }
        process.finish(ctl)
    }

    fn mux_audio(
        &self,
        video: &[u8],
        source: &[u8],
        seek: Option<f64>,
        duration: Option<f64>,
        ctl: &RunControl,
    ) -> SeewavResult<Vec<u8>> {
        let dir = WorkDir::create("mux")?;
        let video_in = dir.write("video_only.mp4", video)?;
        let audio_in = dir.write("audio_in", source)?;
        let out = dir.join("out_final.mp4");

        let mut cmd = ffmpeg_command();
        cmd.arg("-i").arg(&video_in);
        push_trim_args(&mut cmd, seek, duration);
        cmd.arg("-i").arg(&audio_in);
        cmd.args([
            "-map",
            "0:v:0",
            "-map",
            "1:a:0",
            "-c:v",
            "copy",
            "-c:a",
            "aac",
            "-shortest",
            "-movflags",
            "+faststart",
        ])
        .arg(&out);
        run_ffmpeg(cmd, Stage::Encode, false, ctl)?;

        std::fs::read(&out)
            .map_err(|e| SeewavError::encode(format!("failed to read muxed output: {e}")))
    }
}

impl Encoder for HardwareEncoder {
    fn kind(&self) -> EncoderKind {
        EncoderKind::Hardware(self.codec)
    }

    #[tracing::instrument(skip_all, fields(codec = self.codec.ffmpeg_name(), frames = frames.len()))]
    fn encode_frames(
        &mut self,
        frames: &[RenderedFrame],
        job: &EncodeJob<'_>,
        ctl: &RunControl,
    ) -> SeewavResult<Vec<u8>> {
        job.validate()?;
        job.check_frames(frames)?;

        let video = self.encode_video(frames, job, ctl)?;
        tracing::debug!(bytes = video.len(), "video stream encoded");

        let Some(audio) = job.audio else {
            return check_container(video);
        };
        ctl.checkpoint()?;
        ctl.progress(Phase::Encode, 96);
        let muxed = self.mux_audio(&video, audio.source, audio.seek, audio.duration, ctl)?;
        check_container(muxed)
    }
}

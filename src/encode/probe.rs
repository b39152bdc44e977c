use crate::encode::ffmpeg::{ffmpeg_command, is_ffmpeg_on_path};
use std::process::Stdio;

/// Hardware H.264 encoders known to `ffmpeg`, in probe order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HwCodec {
    /// Apple VideoToolbox.
    VideoToolbox,
    /// NVIDIA NVENC.
    Nvenc,
    /// Intel Quick Sync.
    Qsv,
    /// AMD AMF.
    Amf,
}

impl HwCodec {
    /// Probe order.
    pub const ALL: [Self; 4] = [Self::VideoToolbox, Self::Nvenc, Self::Qsv, Self::Amf];

    /// Encoder name as passed to `-c:v`.
    pub fn ffmpeg_name(self) -> &'static str {
        match self {
            Self::VideoToolbox => "h264_videotoolbox",
            Self::Nvenc => "h264_nvenc",
            Self::Qsv => "h264_qsv",
            Self::Amf => "h264_amf",
        }
    }

    /// Pixel format the encoder accepts.
    pub fn pix_fmt(self) -> &'static str {
        match self {
            Self::Qsv => "nv12",
            _ => "yuv420p",
        }
    }
}

/// Encoding capabilities of the host, probed once per orchestrator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// `ffmpeg` is on `PATH`.
    pub ffmpeg: bool,
    /// First hardware codec that passed a test encode.
    pub hardware: Option<HwCodec>,
}

impl Capabilities {
    /// Probe the system `ffmpeg` for a working hardware encoder.
    ///
    /// A codec counts as available only when `ffmpeg -encoders` lists it and a tiny test encode
    /// succeeds; listed codecs often lack the driver or device they need.
    #[tracing::instrument]
    pub fn probe() -> Self {
        if !is_ffmpeg_on_path() {
            tracing::warn!("ffmpeg not found on PATH");
            return Self::default();
        }
        let listed = match list_encoders() {
            Some(listing) => listed_hw_codecs(&listing),
            None => Vec::new(),
        };
        let hardware = listed.into_iter().find(|&codec| {
            let ok = test_encode(codec);
            tracing::debug!(codec = codec.ffmpeg_name(), ok, "hardware codec test encode");
            ok
        });
        match hardware {
            Some(codec) => tracing::info!(codec = codec.ffmpeg_name(), "hardware encoder available"),
            None => tracing::info!("no hardware encoder available"),
        }
        Self {
            ffmpeg: true,
            hardware,
        }
    }

    /// Capabilities that only allow the `libx264` path.
    pub fn general_only() -> Self {
        Self {
            ffmpeg: true,
            hardware: None,
        }
    }

    /// Return `true` when a hardware codec can be used.
    pub fn supports_hardware_codec(&self) -> bool {
        self.ffmpeg && self.hardware.is_some()
    }
}

fn list_encoders() -> Option<String> {
    let out = ffmpeg_command()
        .arg("-encoders")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).into_owned())
}

/// Hardware codecs named in an `ffmpeg -encoders` listing, in probe order.
pub(crate) fn listed_hw_codecs(listing: &str) -> Vec<HwCodec> {
    let names: Vec<&str> = listing
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .collect();
    HwCodec::ALL
        .into_iter()
        .filter(|codec| names.contains(&codec.ffmpeg_name()))
        .collect()
}

fn test_encode(codec: HwCodec) -> bool {
    ffmpeg_command()
        .args([
            "-f",
            "lavfi",
            "-i",
            "color=c=black:s=256x256:d=0.1",
            "-c:v",
            codec.ffmpeg_name(),
            "-pix_fmt",
            codec.pix_fmt(),
            "-f",
            "null",
            "-",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use seewav::{
    EncoderPreference, GenerationOptions, Generator, GeneratorOpts, Message, Phase, Rgb,
    RunOutcome,
};
use tracing_subscriber::EnvFilter;

/// Render an animated waveform video from an audio file (requires `ffmpeg` on PATH).
///
/// Option flags override values loaded with `--options`; anything unset keeps its default.
#[derive(Parser, Debug)]
#[command(name = "seewav", version)]
struct Cli {
    /// Input audio file (any format ffmpeg can read).
    input: PathBuf,

    /// Output MP4 path.
    #[arg(long, short)]
    out: PathBuf,

    /// Load generation options from a JSON file (camelCase keys).
    #[arg(long)]
    options: Option<PathBuf>,

    /// Bar color as `r,g,b` with components in [0, 1].
    #[arg(long, value_parser = parse_rgb)]
    fg_color: Option<Rgb>,

    /// Second channel bar color (stereo only).
    #[arg(long, value_parser = parse_rgb)]
    fg_color2: Option<Rgb>,

    /// Background color.
    #[arg(long, value_parser = parse_rgb)]
    bg_color: Option<Rgb>,

    /// Bars per channel.
    #[arg(long)]
    bars: Option<usize>,

    /// Crossfade sharpness.
    #[arg(long)]
    speed: Option<f64>,

    /// Seconds of audio shown per frame.
    #[arg(long)]
    time: Option<f64>,

    /// Envelope oversampling.
    #[arg(long)]
    oversample: Option<u32>,

    /// Render left and right channels separately.
    #[arg(long, default_value_t = false)]
    stereo: bool,

    /// Output width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Frames per second.
    #[arg(long)]
    rate: Option<f64>,

    /// Start offset into the input, in seconds.
    #[arg(long)]
    seek: Option<f64>,

    /// Maximum duration, in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Do not mux the input audio into the video.
    #[arg(long, default_value_t = false)]
    no_audio: bool,

    /// Encoding strategy.
    #[arg(long, value_enum, default_value_t = EncoderArg::Auto)]
    encoder: EncoderArg,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size (parallel mode only).
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Print progress messages as JSON lines on stdout.
    #[arg(long, default_value_t = false)]
    json_progress: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EncoderArg {
    Auto,
    Hardware,
    General,
}

impl From<EncoderArg> for EncoderPreference {
    fn from(v: EncoderArg) -> Self {
        match v {
            EncoderArg::Auto => Self::Auto,
            EncoderArg::Hardware => Self::Hardware,
            EncoderArg::General => Self::General,
        }
    }
}

fn parse_rgb(s: &str) -> Result<Rgb, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [r, g, b] => Ok(Rgb::new(*r, *g, *b)),
        _ => Err(format!("expected three comma-separated components, got '{s}'")),
    }
}

impl Cli {
    fn generation_options(&self) -> anyhow::Result<GenerationOptions> {
        let mut opts = match &self.options {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("read options '{}'", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parse options '{}'", path.display()))?
            }
            None => GenerationOptions::default(),
        };

        if let Some(v) = self.fg_color {
            opts.fg_color = v;
        }
        if let Some(v) = self.fg_color2 {
            opts.fg_color2 = v;
        }
        if let Some(v) = self.bg_color {
            opts.bg_color = v;
        }
        if let Some(v) = self.bars {
            opts.bars = v;
        }
        if let Some(v) = self.speed {
            opts.speed = v;
        }
        if let Some(v) = self.time {
            opts.time = v;
        }
        if let Some(v) = self.oversample {
            opts.oversample = v;
        }
        if let Some(v) = self.width {
            opts.width = v;
        }
        if let Some(v) = self.height {
            opts.height = v;
        }
        if let Some(v) = self.rate {
            opts.rate = v;
        }
        if self.seek.is_some() {
            opts.seek = self.seek;
        }
        if self.duration.is_some() {
            opts.duration = self.duration;
        }
        opts.stereo |= self.stereo;
        if self.no_audio {
            opts.include_audio = false;
        }
        Ok(opts)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.generation_options()?;
    let file = std::fs::read(&cli.input)
        .with_context(|| format!("read input '{}'", cli.input.display()))?;

    let mut generator = Generator::new(GeneratorOpts {
        parallel: cli.parallel,
        threads: cli.threads,
        chunk_size: cli.chunk_size,
        channel_capacity: 64,
        encoder: cli.encoder.into(),
    })?;

    let handle = generator.generate(file, options);
    let json_progress = cli.json_progress;
    let outcome = handle.wait(|phase, pct| {
        if json_progress {
            match serde_json::to_string(&Message::Progress { phase, pct }) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "failed to serialize progress"),
            }
        } else {
            let phase = match phase {
                Phase::Frames => "frames",
                Phase::Encode => "encode",
            };
            tracing::info!(phase, pct, "progress");
        }
    });

    match outcome {
        RunOutcome::Done(buffer) => {
            if let Some(parent) = cli.out.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(&cli.out, &buffer)
                .with_context(|| format!("write video '{}'", cli.out.display()))?;
            if json_progress {
                println!(r#"{{"type":"done","bytes":{}}}"#, buffer.len());
            }
            tracing::info!(path = %cli.out.display(), bytes = buffer.len(), "wrote video");
            Ok(())
        }
        RunOutcome::Failed(message) => {
            if json_progress
                && let Ok(line) = serde_json::to_string(&Message::Error {
                    message: message.clone(),
                })
            {
                println!("{line}");
            }
            anyhow::bail!("generation failed: {message}")
        }
        RunOutcome::Cancelled => anyhow::bail!("generation was cancelled"),
    }
}

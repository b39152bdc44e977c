use crate::foundation::core::Rgb;
use crate::foundation::error::{SeewavError, SeewavResult};
use crate::frames::FrameBarValues;
use crate::options::GenerationOptions;
use crate::render::frame::FrameRGBA;
use vello_cpu::kurbo::Rect;
use vello_cpu::peniko::Color;

const PAD_RATIO: f64 = 0.1;
/// Opacity of the mirrored lower half of each bar (80%).
const MIRROR_ALPHA: u8 = 204;
const MIRROR_SCALE: f64 = 0.9;

/// Horizontal bar layout shared by every channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarGeometry {
    /// Width of one bar.
    pub bar_width: f64,
    /// Gap on each side of a bar.
    pub pad: f64,
    /// Distance between the left edges of consecutive bars.
    pub delta: f64,
}

impl BarGeometry {
    /// Layout for `steps` bars across `width` pixels.
    pub fn new(width: f64, steps: usize) -> Self {
        let bar_width = width / (steps.max(1) as f64 * (1.0 + 2.0 * PAD_RATIO));
        let pad = PAD_RATIO * bar_width;
        Self {
            bar_width,
            pad,
            delta: 2.0 * pad + bar_width,
        }
    }

    /// Horizontal center of bar `step`.
    pub fn center_x(&self, step: usize) -> f64 {
        self.pad + step as f64 * self.delta + self.bar_width / 2.0
    }
}

/// CPU rasterizer for mirrored waveform bars.
///
/// The renderer owns its pixel surface and reuses it across frames; it never mutates its inputs,
/// so identical bar values always produce identical pixels.
pub struct BarRenderer {
    width: u16,
    height: u16,
    fg: Vec<Rgb>,
    bg: Rgb,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for BarRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarRenderer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("fg", &self.fg)
            .field("bg", &self.bg)
            .finish_non_exhaustive()
    }
}

impl BarRenderer {
    /// Create a renderer for a `width × height` surface with one foreground color per channel.
    pub fn new(width: u32, height: u32, fg: Vec<Rgb>, bg: Rgb) -> SeewavResult<Self> {
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| SeewavError::invalid_options("surface width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| SeewavError::invalid_options("surface height exceeds u16"))?;
        if width_u16 == 0 || height_u16 == 0 {
            return Err(SeewavError::invalid_options("surface must be non-empty"));
        }
        if fg.is_empty() {
            return Err(SeewavError::invalid_options(
                "at least one foreground color is required",
            ));
        }
        Ok(Self {
            width: width_u16,
            height: height_u16,
            fg,
            bg,
            pixmap: vello_cpu::Pixmap::new(width_u16, height_u16),
        })
    }

    /// Renderer configured with the size and colors of `opts`.
    pub fn from_options(opts: &GenerationOptions) -> SeewavResult<Self> {
        let fg = opts.fg_colors()[..opts.channel_count()].to_vec();
        Self::new(opts.width, opts.height, fg, opts.bg_color)
    }

    /// Draw one frame. `frames` holds one bar sequence per channel.
    ///
    /// Channels beyond the configured colors reuse the last color.
    pub fn draw(&mut self, frames: &[FrameBarValues]) -> SeewavResult<FrameRGBA> {
        let w = f64::from(self.width);
        let h = f64::from(self.height);

        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_paint(color(self.bg, 255));
        ctx.fill_rect(&Rect::new(0.0, 0.0, w, h));

        let k = frames.len();
        let steps = frames.first().map_or(0, Vec::len);
        if frames.iter().any(|f| f.len() != steps) {
            return Err(SeewavError::encode(
                "all channels must have the same number of bars",
            ));
        }

        if steps > 0 {
            let geom = BarGeometry::new(w, steps);
            let k_f = k as f64;
            for step in 0..steps {
                let x = geom.center_x(step);
                let (left, right) = (x - geom.bar_width / 2.0, x + geom.bar_width / 2.0);
                for (i, channel) in frames.iter().enumerate() {
                    let value = channel[step];
                    if !value.is_finite() {
                        return Err(SeewavError::encode(format!(
                            "bar value {value} at step {step} is not finite"
                        )));
                    }
                    let half = 0.5 * value / k_f * h;
                    if half <= 0.0 {
                        continue;
                    }
                    let midrule = (1.0 + 2.0 * i as f64) / (2.0 * k_f) * h;
                    let fg = self.fg[i.min(self.fg.len() - 1)];

                    ctx.set_paint(color(fg, 255));
                    ctx.fill_rect(&Rect::new(left, midrule - half, right, midrule));
                    ctx.set_paint(color(fg, MIRROR_ALPHA));
                    ctx.fill_rect(&Rect::new(
                        left,
                        midrule,
                        right,
                        midrule + MIRROR_SCALE * half,
                    ));
                }
            }
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);

        Ok(FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn color(c: Rgb, alpha: u8) -> Color {
    let [r, g, b, a] = c.to_rgba8(alpha);
    Color::from_rgba8(r, g, b, a)
}

#[cfg(test)]
#[path = "../../tests/unit/render/bars.rs"]
mod tests;

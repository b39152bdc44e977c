use crate::foundation::error::{SeewavError, SeewavResult};
use image::ImageEncoder as _;

/// Raw RGBA8 pixels of one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 bytes, `width * height * 4` long.
    pub data: Vec<u8>,
    /// Whether `data` carries premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA value at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Drop the alpha channel.
    ///
    /// Frames are opaque (the background covers every pixel), so premultiplied and straight
    /// color agree and alpha can be discarded as-is.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() / 4 * 3);
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(&px[..3]);
        }
        out
    }
}

/// One encoded output frame: a PNG image of the requested size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// PNG file bytes.
    pub png: Vec<u8>,
}

impl RenderedFrame {
    /// Encode an opaque RGBA frame as an RGB PNG.
    pub fn from_rgba(frame: &FrameRGBA) -> SeewavResult<Self> {
        let expected = (frame.width as usize) * (frame.height as usize) * 4;
        if frame.data.len() != expected {
            return Err(SeewavError::encode(format!(
                "frame buffer has {} bytes, expected {expected} for {}x{}",
                frame.data.len(),
                frame.width,
                frame.height
            )));
        }

        let rgb = frame.to_rgb8();
        let mut png = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png)
            .write_image(
                &rgb,
                frame.width,
                frame.height,
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| SeewavError::encode(format!("png encode failed: {e}")))?;

        Ok(Self {
            width: frame.width,
            height: frame.height,
            png,
        })
    }

    /// Decode the PNG back to tightly packed RGB8 pixels.
    pub fn decode_rgb(&self) -> SeewavResult<Vec<u8>> {
        let img = image::load_from_memory_with_format(&self.png, image::ImageFormat::Png)
            .map_err(|e| SeewavError::encode(format!("png decode failed: {e}")))?
            .to_rgb8();
        if img.width() != self.width || img.height() != self.height {
            return Err(SeewavError::encode(format!(
                "png is {}x{}, expected {}x{}",
                img.width(),
                img.height(),
                self.width,
                self.height
            )));
        }
        Ok(img.into_raw())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;

use crate::foundation::error::{SeewavError, SeewavResult};

/// Absolute 0-based output video frame index.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// RGB color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [f64; 3]);

impl Rgb {
    /// Black.
    pub const BLACK: Self = Self([0.0, 0.0, 0.0]);

    /// Create a color from its three components.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self([r, g, b])
    }

    /// Check that every component is finite and within `[0, 1]`.
    pub fn validate(self, what: &str) -> SeewavResult<()> {
        if self.0.iter().all(|c| c.is_finite() && (0.0..=1.0).contains(c)) {
            Ok(())
        } else {
            Err(SeewavError::invalid_options(format!(
                "{what} components must be finite and within [0, 1], got {:?}",
                self.0
            )))
        }
    }

    /// Quantize to straight-alpha RGBA8 with the given alpha byte.
    pub fn to_rgba8(self, alpha: u8) -> [u8; 4] {
        let q = |c: f64| -> u8 { (c.clamp(0.0, 1.0) * 255.0).round() as u8 };
        [q(self.0[0]), q(self.0[1]), q(self.0[2]), alpha]
    }
}

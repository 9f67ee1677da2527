use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Composite, prepare_pair};
use crate::prelude::*;

/// Alpha never drops below this, so the color solve always has a divisor.
const MIN_ALPHA: f64 = 1.0;
const MAX_ALPHA: f64 = 255.0;

/// Color mirage parameters.
///
/// Per pixel: `alpha = clamp(255 - luma(front) + a * luma(back) + b, 1, 255)`,
/// `base = (1 - w) * front + w * back` and
/// `color = (base - (255 - alpha)) / (alpha / 255)`.
/// Over white the result shows `base`; over black it shows the scaled back luma
/// plus the chroma left in `base`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorMirage {
    /// Back luma scale.
    pub a: f64,
    /// Back luma offset.
    pub b: f64,
    /// Weight of the back colors in the blended base, in `[0, 1]`.
    pub w: f64,
}

impl Default for ColorMirage {
    fn default() -> Self {
        Self {
            a: 0.5,
            b: 0.0,
            w: 0.2,
        }
    }
}

impl ColorMirage {
    pub fn new(a: f64, b: f64, w: f64) -> Self {
        Self { a, b, w }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("a", self.a), ("b", self.b), ("w", self.w)] {
            if !value.is_finite() {
                return Err(Error::InvalidParameter(format!(
                    "color {name} must be finite, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.w) {
            return Err(Error::InvalidParameter(format!(
                "color w must be within [0, 1], got {}",
                self.w
            )));
        }
        Ok(())
    }

    /// Composites one RGB pair into an RGBA pixel.
    #[inline]
    pub fn pixel(&self, front: [u8; 3], back: [u8; 3]) -> [u8; 4] {
        let front = front.map(f64::from);
        let back = back.map(f64::from);

        let front_luma = luma(front[0], front[1], front[2]);
        let back_luma = self.a * luma(back[0], back[1], back[2]) + self.b;

        let alpha = (255.0 - front_luma + back_luma).clamp(MIN_ALPHA, MAX_ALPHA);
        let coverage = alpha / 255.0;

        let mut out = [0u8; 4];
        for c in 0..3 {
            let base = (1.0 - self.w) * front[c] + self.w * back[c];
            out[c] = ((base - (255.0 - alpha)) / coverage).clamp(0.0, 255.0) as u8;
        }
        out[3] = alpha as u8;

        out
    }
}

impl Composite for ColorMirage {
    fn composite(&self, front: &Image, back: &Image) -> Result<Image> {
        self.validate()?;

        let (front, back) = prepare_pair(front, back, ColorFormat::Rgb, FilterMode::CatmullRom)?;

        let desc = ImageDesc::new(front.desc().width, front.desc().height, ColorFormat::Rgba);
        let mut output = Image::new_empty(desc)?;

        let in_row_bytes = front.desc().row_bytes();
        let out_row_bytes = desc.row_bytes();

        output
            .bytes_mut()
            .par_chunks_mut(out_row_bytes)
            .zip(front.bytes().par_chunks(in_row_bytes))
            .zip(back.bytes().par_chunks(in_row_bytes))
            .for_each(|((out_row, front_row), back_row)| {
                let pixels = out_row
                    .chunks_exact_mut(4)
                    .zip(front_row.chunks_exact(3))
                    .zip(back_row.chunks_exact(3));
                for ((out, f), b) in pixels {
                    out.copy_from_slice(&self.pixel([f[0], f[1], f[2]], [b[0], b[1], b[2]]));
                }
            });

        Ok(output)
    }
}

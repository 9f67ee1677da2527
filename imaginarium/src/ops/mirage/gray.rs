use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Composite, prepare_pair};
use crate::prelude::*;

/// Alphas at or below this magnitude are treated as zero.
const DEGENERATE_ALPHA: f64 = 1e-6;

/// Color written where alpha is degenerate.
const DEGENERATE_COLOR: f64 = 255.0;

/// Grayscale mirage parameters.
///
/// Per pixel, with `wf = front * a/10 + offset` and `wb = back * b/10`:
/// `alpha = 1 - wf/255 + wb/255` and `color = wb / alpha`.
/// Over white the result shows `wf`, over black it shows `wb`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrayMirage {
    /// Front brightness scale, in tenths.
    pub a: f64,
    /// Back brightness scale, in tenths.
    pub b: f64,
    /// Added to the scaled front.
    pub offset: f64,
}

impl Default for GrayMirage {
    fn default() -> Self {
        Self {
            a: 5.0,
            b: 5.0,
            offset: 128.0,
        }
    }
}

impl GrayMirage {
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            a,
            b,
            ..Self::default()
        }
    }

    /// Builder method to set the front offset.
    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("a", self.a), ("b", self.b), ("offset", self.offset)] {
            if !value.is_finite() {
                return Err(Error::InvalidParameter(format!(
                    "gray {name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Composites one luminance pair into `[color, color, color, alpha]`.
    #[inline]
    pub fn pixel(&self, front: u8, back: u8) -> [u8; 4] {
        let wf = front as f64 * (self.a / 10.0) + self.offset;
        let wb = back as f64 * (self.b / 10.0);

        let alpha = 1.0 - wf / 255.0 + wb / 255.0;
        let color = if alpha.abs() > DEGENERATE_ALPHA {
            wb / alpha
        } else {
            DEGENERATE_COLOR
        };

        let color = color.clamp(0.0, 255.0) as u8;
        let alpha = (alpha * 255.0).clamp(0.0, 255.0) as u8;

        [color, color, color, alpha]
    }
}

impl Composite for GrayMirage {
    fn composite(&self, front: &Image, back: &Image) -> Result<Image> {
        self.validate()?;

        let (front, back) = prepare_pair(front, back, ColorFormat::L, FilterMode::Bilinear)?;

        let desc = ImageDesc::new(front.desc().width, front.desc().height, ColorFormat::Rgba);
        let mut output = Image::new_empty(desc)?;

        let width = desc.width as usize;
        let out_row_bytes = desc.row_bytes();

        output
            .bytes_mut()
            .par_chunks_mut(out_row_bytes)
            .zip(front.bytes().par_chunks(width))
            .zip(back.bytes().par_chunks(width))
            .for_each(|((out_row, front_row), back_row)| {
                for (x, (&f, &b)) in front_row.iter().zip(back_row).enumerate() {
                    out_row[x * 4..x * 4 + 4].copy_from_slice(&self.pixel(f, b));
                }
            });

        Ok(output)
    }
}

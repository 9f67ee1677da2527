
use rayon::prelude::*;

use crate::image::Image;

// =============================================================================
// Luma
// =============================================================================

/// Rec. 601 luma weights, the broadcast-television weighting.
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

// Fixed-point versions of LUMA_WEIGHTS, scaled by 65536.
// R: 0.299 * 65536 = 19595
// G: 0.587 * 65536 = 38470
// B: 0.114 * 65536 = 7471
// Total: 65536 (allows shift by 16 instead of divide)
const LUMA_R: u32 = 19595;
const LUMA_G: u32 = 38470;
const LUMA_B: u32 = 7471;

/// Perceptual luma of an RGB triple, in the same range as the inputs.
#[inline]
pub fn luma(r: f64, g: f64, b: f64) -> f64 {
    LUMA_WEIGHTS[0] * r + LUMA_WEIGHTS[1] * g + LUMA_WEIGHTS[2] * b
}

/// Integer luma, rounded to nearest.
#[inline]
pub(crate) fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B + 0x8000) >> 16) as u8
}

// =============================================================================
// Image conversion
// =============================================================================

const OPAQUE: u8 = u8::MAX;

/// Converts pixel data from `from`'s layout into `to`'s layout.
/// Alpha is dropped when the target has none and set opaque when the source has none.
pub(crate) fn convert_image(from: &Image, to: &mut Image) {
    debug_assert_eq!(from.desc().width, to.desc().width);
    debug_assert_eq!(from.desc().height, to.desc().height);

    if from.desc().color_format == to.desc().color_format {
        to.bytes_mut().copy_from_slice(from.bytes());
        return;
    }

    let width = from.desc().width as usize;
    let from_channels = from.desc().color_format.channel_count() as usize;
    let to_channels = to.desc().color_format.channel_count() as usize;
    let from_row_bytes = from.desc().row_bytes();
    let to_row_bytes = to.desc().row_bytes();

    to.bytes_mut()
        .par_chunks_mut(to_row_bytes)
        .zip(from.bytes().par_chunks(from_row_bytes))
        .for_each(|(to_row, from_row)| {
            for x in 0..width {
                let src = &from_row[x * from_channels..(x + 1) * from_channels];
                let dst = &mut to_row[x * to_channels..(x + 1) * to_channels];

                match (to_channels, from_channels) {
                    (1, 1) | (1, 2) => dst[0] = src[0],
                    (1, 3) | (1, 4) => dst[0] = luma_u8(src[0], src[1], src[2]),

                    (2, 1) => {
                        dst[0] = src[0];
                        dst[1] = OPAQUE;
                    }
                    (2, 2) => dst.copy_from_slice(src),
                    (2, 3) => {
                        dst[0] = luma_u8(src[0], src[1], src[2]);
                        dst[1] = OPAQUE;
                    }
                    (2, 4) => {
                        dst[0] = luma_u8(src[0], src[1], src[2]);
                        dst[1] = src[3];
                    }

                    (3, 1) | (3, 2) => dst.fill(src[0]),
                    (3, 3) | (3, 4) => dst.copy_from_slice(&src[..3]),

                    (4, 1) => {
                        dst[..3].fill(src[0]);
                        dst[3] = OPAQUE;
                    }
                    (4, 2) => {
                        dst[..3].fill(src[0]);
                        dst[3] = src[1];
                    }
                    (4, 3) => {
                        dst[..3].copy_from_slice(src);
                        dst[3] = OPAQUE;
                    }
                    (4, 4) => dst.copy_from_slice(src),

                    _ => unreachable!(),
                }
            }
        });
}

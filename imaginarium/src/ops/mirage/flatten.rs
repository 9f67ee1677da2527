use rayon::prelude::*;

use crate::prelude::*;

/// Renders an image over an opaque solid background, returning RGB.
///
/// This is what a viewer sees when the composite is shown on a page of that color.
pub fn flatten_over(image: &Image, background: [u8; 3]) -> Result<Image> {
    let rgba = image.clone().convert(ColorFormat::Rgba)?;

    let desc = ImageDesc::new(rgba.desc().width, rgba.desc().height, ColorFormat::Rgb);
    let mut output = Image::new_empty(desc)?;
    let background = background.map(f64::from);

    output
        .bytes_mut()
        .par_chunks_mut(desc.row_bytes())
        .zip(rgba.bytes().par_chunks(rgba.desc().row_bytes()))
        .for_each(|(out_row, in_row)| {
            for (out, px) in out_row.chunks_exact_mut(3).zip(in_row.chunks_exact(4)) {
                let coverage = px[3] as f64 / 255.0;
                for c in 0..3 {
                    let shown = px[c] as f64 * coverage + background[c] * (1.0 - coverage);
                    out[c] = shown.round().clamp(0.0, 255.0) as u8;
                }
            }
        });

    Ok(output)
}

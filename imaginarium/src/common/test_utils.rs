use crate::prelude::*;

/// Image where every pixel holds `pixel`; the format follows the pixel length.
pub fn solid(width: u32, height: u32, pixel: &[u8]) -> Image {
    let format = ColorFormat::from_channel_count(pixel.len() as u8).expect("1 to 4 channels");
    let desc = ImageDesc::new(width, height, format);
    let bytes = pixel.repeat((width * height) as usize);
    Image::new_with_data(desc, bytes).unwrap()
}

/// Single-channel image whose values ramp from `from` to `to` left to right.
pub fn horizontal_ramp(width: u32, height: u32, from: u8, to: u8) -> Image {
    let desc = ImageDesc::new(width, height, ColorFormat::L);
    let mut bytes = Vec::with_capacity((width * height) as usize);
    for _ in 0..height {
        for x in 0..width {
            let t = if width > 1 {
                x as f64 / (width - 1) as f64
            } else {
                0.0
            };
            bytes.push((from as f64 + (to as f64 - from as f64) * t).round() as u8);
        }
    }
    Image::new_with_data(desc, bytes).unwrap()
}

/// RGB image with a deterministic pattern in every channel.
pub fn rgb_pattern(width: u32, height: u32) -> Image {
    let desc = ImageDesc::new(width, height, ColorFormat::Rgb);
    let mut bytes = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            bytes.push((x * 255 / width.max(1)) as u8);
            bytes.push((y * 255 / height.max(1)) as u8);
            bytes.push(((x + y) * 7 % 256) as u8);
        }
    }
    Image::new_with_data(desc, bytes).unwrap()
}

pub fn mean_abs_diff(a: &[u8], b: &[u8]) -> f64 {
    assert_eq!(a.len(), b.len());
    let total: u64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| (x as i32 - y as i32).unsigned_abs() as u64)
        .sum();
    total as f64 / a.len() as f64
}

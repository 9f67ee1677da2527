use image_lib::imageops::FilterType;
use image_lib::{ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};

use crate::prelude::*;

/// Filter used when resampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Nearest neighbor sampling - fast but can produce aliasing.
    Nearest,
    /// Bilinear interpolation - smoother results.
    #[default]
    Bilinear,
    /// Catmull-Rom cubic interpolation - sharper than bilinear.
    CatmullRom,
}

impl FilterMode {
    fn filter_type(self) -> FilterType {
        match self {
            FilterMode::Nearest => FilterType::Nearest,
            FilterMode::Bilinear => FilterType::Triangle,
            FilterMode::CatmullRom => FilterType::CatmullRom,
        }
    }
}

pub(super) fn resize(image: &Image, target: ImageDesc, filter: FilterMode) -> Result<Image> {
    debug_assert_eq!(image.desc().color_format, target.color_format);

    let bytes = match image.desc().color_format {
        ColorFormat::L => resize_typed::<Luma<u8>>(image, target, filter)?,
        ColorFormat::LA => resize_typed::<LumaA<u8>>(image, target, filter)?,
        ColorFormat::Rgb => resize_typed::<Rgb<u8>>(image, target, filter)?,
        ColorFormat::Rgba => resize_typed::<Rgba<u8>>(image, target, filter)?,
    };

    Image::new_with_data(target, bytes)
}

fn resize_typed<P>(image: &Image, target: ImageDesc, filter: FilterMode) -> Result<Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let desc = image.desc();
    let source: ImageBuffer<P, &[u8]> =
        ImageBuffer::from_raw(desc.width, desc.height, image.bytes()).ok_or_else(|| {
            Error::InvalidDimensions(format!("buffer too small for {}", desc))
        })?;

    let resized = image_lib::imageops::resize(
        &source,
        target.width,
        target.height,
        filter.filter_type(),
    );

    Ok(resized.into_raw())
}

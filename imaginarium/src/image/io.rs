use std::io::Cursor;
use std::path::Path;

use crate::prelude::*;

pub(crate) fn decode(encoded: &[u8]) -> Result<Image> {
    let img = image_lib::load_from_memory(encoded)?;

    // Everything is brought down to 8 bits per channel; the channel layout is kept.
    let (width, height, color_format, bytes) = match img.color() {
        image_lib::ColorType::L8 | image_lib::ColorType::L16 => {
            let buf = img.into_luma8();
            (buf.width(), buf.height(), ColorFormat::L, buf.into_raw())
        }
        image_lib::ColorType::La8 | image_lib::ColorType::La16 => {
            let buf = img.into_luma_alpha8();
            (buf.width(), buf.height(), ColorFormat::LA, buf.into_raw())
        }
        image_lib::ColorType::Rgb8 | image_lib::ColorType::Rgb16 | image_lib::ColorType::Rgb32F => {
            let buf = img.into_rgb8();
            (buf.width(), buf.height(), ColorFormat::Rgb, buf.into_raw())
        }
        _ => {
            let buf = img.into_rgba8();
            (buf.width(), buf.height(), ColorFormat::Rgba, buf.into_raw())
        }
    };

    Image::new_with_data(ImageDesc::new(width, height, color_format), bytes)
}

pub(crate) fn encode_png(image: &Image) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());

    image_lib::write_buffer_with_format(
        &mut cursor,
        image.bytes(),
        image.desc().width,
        image.desc().height,
        color_type(image.desc().color_format),
        image_lib::ImageFormat::Png,
    )?;

    Ok(cursor.into_inner())
}

pub(crate) fn save_png<P: AsRef<Path>>(image: &Image, filename: P) -> Result<()> {
    image_lib::save_buffer_with_format(
        filename,
        image.bytes(),
        image.desc().width,
        image.desc().height,
        color_type(image.desc().color_format),
        image_lib::ImageFormat::Png,
    )?;

    Ok(())
}

fn color_type(color_format: ColorFormat) -> image_lib::ColorType {
    match color_format {
        ColorFormat::L => image_lib::ColorType::L8,
        ColorFormat::LA => image_lib::ColorType::La8,
        ColorFormat::Rgb => image_lib::ColorType::Rgb8,
        ColorFormat::Rgba => image_lib::ColorType::Rgba8,
    }
}

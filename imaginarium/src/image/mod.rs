mod io;
mod resize;


use std::path::Path;

pub use resize::FilterMode;

/// Supported image file extensions for reading and writing.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

use crate::common::conversion::convert_image;
use crate::common::{ColorFormat, Error, Result};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
    pub color_format: ColorFormat,
}

/// Tightly packed 8-bit pixel buffer, rows top to bottom, channels interleaved.
#[derive(Clone, Debug)]
pub struct Image {
    desc: ImageDesc,
    bytes: Vec<u8>,
}

impl Image {
    /// Returns the image descriptor.
    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    /// Returns the image bytes as a slice.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the image bytes as a mutable slice.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn new_empty(desc: ImageDesc) -> Result<Image> {
        desc.validate()?;

        let bytes = vec![0; desc.size_in_bytes()];

        Ok(Image { desc, bytes })
    }

    pub fn new_with_data(desc: ImageDesc, bytes: Vec<u8>) -> Result<Image> {
        desc.validate()?;

        if bytes.len() != desc.size_in_bytes() {
            return Err(Error::InvalidDimensions(format!(
                "bytes length {} does not match expected size {}",
                bytes.len(),
                desc.size_in_bytes()
            )));
        }

        Ok(Image { desc, bytes })
    }

    /// Decodes an encoded image (PNG, JPEG, GIF, BMP, WebP) held in memory.
    /// The format is sniffed from the content, not from any file name.
    pub fn decode(encoded: &[u8]) -> Result<Image> {
        io::decode(encoded)
    }

    /// Encodes the image as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        io::encode_png(self)
    }

    pub fn read_file<P: AsRef<Path>>(filename: P) -> Result<Image> {
        let extension = file_extension(filename.as_ref())?;
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::InvalidExtension(extension));
        }

        let encoded = std::fs::read(filename)?;
        io::decode(&encoded)
    }

    /// Writes the image as PNG. Other extensions are rejected.
    pub fn save_file<P: AsRef<Path>>(&self, filename: P) -> Result<()> {
        let extension = file_extension(filename.as_ref())?;

        match extension.as_str() {
            "png" => io::save_png(self, filename)?,
            _ => return Err(Error::InvalidExtension(extension)),
        };

        Ok(())
    }

    pub fn convert(self, color_format: ColorFormat) -> Result<Image> {
        if self.desc.color_format == color_format {
            return Ok(self);
        }

        let desc = ImageDesc::new(self.desc.width, self.desc.height, color_format);

        let mut result = Image::new_empty(desc)?;

        convert_image(&self, &mut result);

        Ok(result)
    }

    /// Resamples to `width` x `height`. Returns the image unchanged when the size already matches.
    pub fn resize(self, width: u32, height: u32, filter: FilterMode) -> Result<Image> {
        if self.desc.width == width && self.desc.height == height {
            return Ok(self);
        }

        let desc = ImageDesc::new(width, height, self.desc.color_format);
        desc.validate()?;

        resize::resize(&self, desc, filter)
    }

    pub fn bytes_per_pixel(&self) -> u8 {
        self.desc.color_format.byte_count()
    }

    /// Channels of the pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let bpp = self.bytes_per_pixel() as usize;
        let offset = y as usize * self.desc.row_bytes() + x as usize * bpp;
        &self.bytes[offset..offset + bpp]
    }
}

impl ImageDesc {
    pub fn new(width: u32, height: u32, color_format: ColorFormat) -> Self {
        Self {
            width,
            height,
            color_format,
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        self.height as usize * self.row_bytes()
    }

    /// Returns the number of bytes per row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.color_format.byte_count() as usize
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn same_size(&self, other: &ImageDesc) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDimensions(format!(
                "{}x{} has no pixels",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for ImageDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.color_format)
    }
}

fn file_extension(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|os_str| os_str.to_str())
        .ok_or_else(|| Error::InvalidExtension("missing extension".to_string()))?
        .to_ascii_lowercase();
    Ok(extension)
}

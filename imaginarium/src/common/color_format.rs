/// Channel layout of an 8-bit image.
#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Default)]
#[repr(u8)]
pub enum ColorFormat {
    L = 1,
    LA = 2,
    Rgb = 3,
    #[default]
    Rgba = 4,
}

impl ColorFormat {
    pub fn channel_count(&self) -> u8 {
        *self as u8
    }

    /// Bytes per pixel. Every channel is one byte.
    pub fn byte_count(&self) -> u8 {
        self.channel_count()
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, ColorFormat::LA | ColorFormat::Rgba)
    }

    pub(crate) fn from_channel_count(channels: u8) -> Option<ColorFormat> {
        match channels {
            1 => Some(ColorFormat::L),
            2 => Some(ColorFormat::LA),
            3 => Some(ColorFormat::Rgb),
            4 => Some(ColorFormat::Rgba),
            _ => None,
        }
    }
}

impl std::fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorFormat::L => write!(f, "L"),
            ColorFormat::LA => write!(f, "LA"),
            ColorFormat::Rgb => write!(f, "RGB"),
            ColorFormat::Rgba => write!(f, "RGBA"),
        }
    }
}

/// All supported color formats.
pub const ALL_FORMATS: &[ColorFormat] = &[
    ColorFormat::L,
    ColorFormat::LA,
    ColorFormat::Rgb,
    ColorFormat::Rgba,
];

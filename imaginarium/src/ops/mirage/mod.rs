//! Mirage tank compositing.
//!
//! A mirage composite is one RGBA image that shows the front picture when
//! displayed over a light background and the back picture over a dark one.
//! The alpha channel carries the brightness difference between the two.

mod color;
mod flatten;
mod gray;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub use color::ColorMirage;
pub use flatten::flatten_over;
pub use gray::GrayMirage;

/// Which compositor to run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MirageMode {
    #[default]
    Gray,
    Color,
}

/// Builds a mirage composite from a front and a back image.
pub trait Composite {
    /// Returns an RGBA image at the front image's resolution.
    /// The back image is resampled to match when the sizes differ.
    fn composite(&self, front: &Image, back: &Image) -> Result<Image>;
}

/// A compositor with its parameters, chosen by [`MirageMode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mirage {
    Gray(GrayMirage),
    Color(ColorMirage),
}

impl Mirage {
    /// Compositor for `mode` with default parameters.
    pub fn with_defaults(mode: MirageMode) -> Self {
        match mode {
            MirageMode::Gray => Mirage::Gray(GrayMirage::default()),
            MirageMode::Color => Mirage::Color(ColorMirage::default()),
        }
    }

    pub fn mode(&self) -> MirageMode {
        match self {
            Mirage::Gray(_) => MirageMode::Gray,
            Mirage::Color(_) => MirageMode::Color,
        }
    }
}

impl From<GrayMirage> for Mirage {
    fn from(value: GrayMirage) -> Self {
        Mirage::Gray(value)
    }
}

impl From<ColorMirage> for Mirage {
    fn from(value: ColorMirage) -> Self {
        Mirage::Color(value)
    }
}

impl Composite for Mirage {
    fn composite(&self, front: &Image, back: &Image) -> Result<Image> {
        match self {
            Mirage::Gray(params) => params.composite(front, back),
            Mirage::Color(params) => params.composite(front, back),
        }
    }
}

/// Converts both images to `color_format` and resamples `back` to `front`'s size.
fn prepare_pair(
    front: &Image,
    back: &Image,
    color_format: ColorFormat,
    filter: FilterMode,
) -> Result<(Image, Image)> {
    let front = front.clone().convert(color_format)?;
    let (width, height) = (front.desc().width, front.desc().height);
    let back = back
        .clone()
        .convert(color_format)?
        .resize(width, height, filter)?;

    if !front.desc().same_size(back.desc()) {
        return Err(Error::DimensionMismatch(format!(
            "front {} vs back {}",
            front.desc(),
            back.desc()
        )));
    }

    Ok((front, back))
}

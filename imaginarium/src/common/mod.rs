pub(crate) mod color_format;
pub(crate) mod conversion;
pub(crate) mod error;
#[cfg(test)]
pub(crate) mod test_utils;

// Public API
pub use color_format::ColorFormat;
pub use conversion::luma;
pub use error::{Error, Result};

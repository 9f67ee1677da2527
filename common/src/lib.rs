#[macro_use]
pub mod macros;
pub mod file_format;
pub mod file_utils;
pub mod log_setup;
pub mod output_stream;
pub mod serde;

pub use file_format::{FileExtensionError, SerdeFormat};

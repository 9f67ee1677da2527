use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    InvalidExtension(String),
    InvalidDimensions(String),
    DimensionMismatch(String),
    InvalidParameter(String),
    Decoding(String),
    Encoding(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::InvalidExtension(ext) => write!(f, "Invalid file extension: {}", ext),
            Error::InvalidDimensions(msg) => write!(f, "Invalid dimensions: {}", msg),
            Error::DimensionMismatch(msg) => write!(f, "Dimension mismatch: {}", msg),
            Error::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            Error::Decoding(msg) => write!(f, "Decoding error: {}", msg),
            Error::Encoding(msg) => write!(f, "Encoding error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<image_lib::ImageError> for Error {
    fn from(e: image_lib::ImageError) -> Self {
        match e {
            image_lib::ImageError::IoError(e) => Error::Io(e),
            image_lib::ImageError::Decoding(_) | image_lib::ImageError::Unsupported(_) => {
                Error::Decoding(e.to_string())
            }
            image_lib::ImageError::Limits(_) => Error::Decoding(e.to_string()),
            _ => Error::Encoding(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

mod common;
mod image;
mod ops;

pub mod prelude;

pub use prelude::*;

// Color formats
pub use crate::common::{ColorFormat, luma};

// Error handling
pub use crate::common::{Error, Result};

// Image types
pub use crate::image::{FilterMode, Image, ImageDesc, SUPPORTED_EXTENSIONS};

// Operations
pub use crate::ops::{ColorMirage, Composite, GrayMirage, Mirage, MirageMode, flatten_over};

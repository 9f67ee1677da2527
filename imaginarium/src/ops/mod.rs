mod mirage;

pub use mirage::{ColorMirage, Composite, GrayMirage, Mirage, MirageMode, flatten_over};

pub mod normalizer;

pub use normalizer::{clean, normalize, read_lines, MarkerConfig, NormalizedText};

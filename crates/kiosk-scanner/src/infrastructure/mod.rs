//! Infrastructure layer: frame files, QR decoding, navigation output.

pub mod decoder;
pub mod frames;
pub mod navigator;

pub use decoder::RqrrDecoder;
pub use frames::{DirectoryCamera, DirectoryFrames};
pub use navigator::ConsoleNavigator;

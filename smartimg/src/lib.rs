pub mod analysis;
pub mod error;
pub mod image;

// Re-export commonly used types
pub use crate::analysis::{Analysis, QualityMetrics, QualityRating};
pub use crate::error::{Error, Result};
pub use crate::image::{
    auto_enhance, decode, encode_jpeg, FilterKind, FlipDirection, PixelGrid, Transform,
};

/// The image crate as seen by this library, for callers that build fixtures.
pub use imageproc::image as codec;

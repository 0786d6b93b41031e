//! Image decoding, enhancement, transformations and encoding

mod decode;
mod encode;
mod enhance;
mod transform;

// Re-export public API
pub use decode::decode;
pub use encode::{compress_to_jpeg, encode_jpeg};
pub use enhance::auto_enhance;
pub use transform::{apply_filter, crop, flip, resize, resize_by_percentage, rotate};

use imageproc::image::RgbImage;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{Error, Result};

/// Decoded 8-bit, 3-channel pixel grid shared by every metric and transform.
pub type PixelGrid = RgbImage;

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FilterKind {
    Blur,
    Sharpen,
    Edge,
    Smooth,
    Grayscale,
    Sepia,
}

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

impl FilterKind {
    /// Parse a filter name, rejecting anything outside the supported set.
    pub fn parse(name: &str) -> Result<Self> {
        name.trim().parse().map_err(|_| {
            Error::invalid(format!(
                "Unknown filter '{name}'. Use one of: {}",
                names::<Self>()
            ))
        })
    }
}

impl FlipDirection {
    pub fn parse(name: &str) -> Result<Self> {
        name.trim().parse().map_err(|_| {
            Error::invalid(format!(
                "Unknown flip direction '{name}'. Use one of: {}",
                names::<Self>()
            ))
        })
    }
}

fn names<E: IntoEnumIterator + std::fmt::Display>() -> String {
    E::iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")
}

/// A single requested transformation with its raw, unvalidated parameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Transform {
    Resize { width: i64, height: i64 },
    ResizeByPercentage { percentage: f64 },
    Crop { x: i64, y: i64, width: i64, height: i64 },
    Filter { kind: FilterKind },
    Rotate { angle: f64 },
    Flip { direction: FlipDirection },
    Enhance,
}

impl Transform {
    /// Suffix used when naming the persisted output of this transform.
    pub fn output_suffix(&self) -> &'static str {
        match self {
            Transform::Resize { .. } | Transform::ResizeByPercentage { .. } => "resized",
            Transform::Crop { .. } => "cropped",
            Transform::Filter { .. } => "filtered",
            Transform::Rotate { .. } => "rotated",
            Transform::Flip { .. } => "flipped",
            Transform::Enhance => "enhanced",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transform::Resize { .. } | Transform::ResizeByPercentage { .. } => "resize",
            Transform::Crop { .. } => "crop",
            Transform::Filter { .. } => "filter",
            Transform::Rotate { .. } => "rotate",
            Transform::Flip { .. } => "flip",
            Transform::Enhance => "enhance",
        }
    }

    /// Check the parameters against an image of the given dimensions without touching pixels.
    pub fn validate(&self, dimensions: (u32, u32)) -> Result<()> {
        match *self {
            Transform::Resize { width, height } => {
                transform::check_resize(width, height).map(|_| ())
            }
            Transform::ResizeByPercentage { percentage } => {
                transform::scaled_dimensions(dimensions, percentage).map(|_| ())
            }
            Transform::Crop { x, y, width, height } => {
                transform::check_crop(dimensions, x, y, width, height).map(|_| ())
            }
            Transform::Rotate { angle } if !angle.is_finite() => {
                Err(Error::invalid("Rotation angle must be a finite number"))
            }
            Transform::Filter { .. }
            | Transform::Rotate { .. }
            | Transform::Flip { .. }
            | Transform::Enhance => Ok(()),
        }
    }

    /// Validate, then produce the transformed grid.
    pub fn apply(&self, grid: &PixelGrid) -> Result<PixelGrid> {
        self.validate(grid.dimensions())?;

        log::debug!("Applying {self:?} to {}x{} image", grid.width(), grid.height());

        match *self {
            Transform::Resize { width, height } => resize(grid, width, height),
            Transform::ResizeByPercentage { percentage } => resize_by_percentage(grid, percentage),
            Transform::Crop { x, y, width, height } => crop(grid, x, y, width, height),
            Transform::Filter { kind } => Ok(apply_filter(grid, kind)),
            Transform::Rotate { angle } => Ok(rotate(grid, angle)),
            Transform::Flip { direction } => Ok(flip(grid, direction)),
            Transform::Enhance => Ok(auto_enhance(grid)),
        }
    }
}

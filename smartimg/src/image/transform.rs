//! Image transformations: resizing, cropping, filters, rotation and flipping

use fast_image_resize as fr;
use fr::images::Image as FrImage;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::image::{imageops, Rgb};

use super::{FilterKind, FlipDirection, PixelGrid};
use crate::analysis::luminance;
use crate::error::{Error, Result};

// Upper bound for percentage-based resizing
const MAX_PERCENTAGE: f64 = 500.0;
// Largest output buffer a resize may allocate, matching the decoder's default allocation limit
const MAX_OUTPUT_BYTES: u64 = 512 * 1024 * 1024;
// Sigma for the "blur" filter
const BLUR_SIGMA: f32 = 2.0;
// Brightness factor applied after desaturating for sepia
const SEPIA_DARKEN: f32 = 0.8;

const SHARPEN_KERNEL: [f32; 9] = [-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0];
const EDGE_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];
pub(super) const SMOOTH_KERNEL: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];

pub(super) fn check_resize(width: i64, height: i64) -> Result<(u32, u32)> {
    if width <= 0 || height <= 0 {
        return Err(Error::invalid("Width and height must be positive"));
    }
    let width = u32::try_from(width).map_err(|_| Error::invalid("Width is too large"))?;
    let height = u32::try_from(height).map_err(|_| Error::invalid("Height is too large"))?;
    check_output_size(width, height)?;
    Ok((width, height))
}

fn check_output_size(width: u32, height: u32) -> Result<()> {
    let bytes = u64::from(width) * u64::from(height) * 3;
    if bytes > MAX_OUTPUT_BYTES {
        return Err(Error::invalid(format!(
            "Target size {width}x{height} exceeds the {} MiB output limit",
            MAX_OUTPUT_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Dimensions after scaling by `percentage`, floored
pub(super) fn scaled_dimensions(
    (width, height): (u32, u32),
    percentage: f64,
) -> Result<(u32, u32)> {
    if !(percentage > 0.0 && percentage <= MAX_PERCENTAGE) {
        return Err(Error::invalid("Percentage must be between 0 and 500"));
    }

    let new_width = (width as f64 * percentage / 100.0).floor() as u32;
    let new_height = (height as f64 * percentage / 100.0).floor() as u32;

    if new_width == 0 || new_height == 0 {
        return Err(Error::invalid(format!(
            "Scaling {width}x{height} by {percentage}% leaves an empty image"
        )));
    }
    check_output_size(new_width, new_height)?;

    Ok((new_width, new_height))
}

pub(super) fn check_crop(
    (img_width, img_height): (u32, u32),
    x: i64,
    y: i64,
    width: i64,
    height: i64,
) -> Result<(u32, u32, u32, u32)> {
    if x < 0 || y < 0 {
        return Err(Error::invalid("Crop origin must not be negative"));
    }
    if width <= 0 || height <= 0 {
        return Err(Error::invalid("Crop width and height must be positive"));
    }
    if x.saturating_add(width) > i64::from(img_width)
        || y.saturating_add(height) > i64::from(img_height)
    {
        return Err(Error::invalid(format!(
            "Crop region exceeds image bounds ({img_width}x{img_height})"
        )));
    }

    // all four fit inside the image, so they fit in u32
    Ok((x as u32, y as u32, width as u32, height as u32))
}

/// Resize to exactly `width` x `height`
pub fn resize(img: &PixelGrid, width: i64, height: i64) -> Result<PixelGrid> {
    let target = check_resize(width, height)?;
    resize_image(img, target)
}

/// Resize both sides by `percentage` (0, 500]
pub fn resize_by_percentage(img: &PixelGrid, percentage: f64) -> Result<PixelGrid> {
    let target = scaled_dimensions(img.dimensions(), percentage)?;
    resize_image(img, target)
}

fn resize_image(img: &PixelGrid, (new_width, new_height): (u32, u32)) -> Result<PixelGrid> {
    let (width, height) = img.dimensions();
    if (width, height) == (new_width, new_height) {
        return Ok(img.clone());
    }

    let algorithm = fr::ResizeAlg::Convolution(fr::FilterType::Bilinear);

    // fast_image_resize wants an owned source buffer
    let src_image = FrImage::from_vec_u8(width, height, img.as_raw().clone(), fr::PixelType::U8x3)?;

    let mut dst_buffer = vec![0u8; new_width as usize * new_height as usize * 3];
    {
        let mut dst_image =
            FrImage::from_slice_u8(new_width, new_height, &mut dst_buffer, fr::PixelType::U8x3)?;

        let mut resizer = fr::Resizer::new();
        resizer.resize(
            &src_image,
            &mut dst_image,
            Some(&fr::ResizeOptions::new().resize_alg(algorithm)),
        )?;
    }

    log::debug!("Resized {width}x{height} -> {new_width}x{new_height}");

    Ok(PixelGrid::from_raw(new_width, new_height, dst_buffer)
        .expect("destination buffer is sized for the target dimensions"))
}

/// Cut out the `width` x `height` region whose top-left corner is at (`x`, `y`)
pub fn crop(img: &PixelGrid, x: i64, y: i64, width: i64, height: i64) -> Result<PixelGrid> {
    let (x, y, width, height) = check_crop(img.dimensions(), x, y, width, height)?;
    Ok(imageops::crop_imm(img, x, y, width, height).to_image())
}

pub fn apply_filter(img: &PixelGrid, kind: FilterKind) -> PixelGrid {
    match kind {
        FilterKind::Blur => imageproc::filter::gaussian_blur_f32(img, BLUR_SIGMA),
        FilterKind::Sharpen => convolve3x3(img, &SHARPEN_KERNEL),
        FilterKind::Edge => convolve3x3(img, &EDGE_KERNEL),
        FilterKind::Smooth => convolve3x3(img, &SMOOTH_KERNEL),
        FilterKind::Grayscale => grayscale(img, 1.0),
        FilterKind::Sepia => grayscale(img, SEPIA_DARKEN),
    }
}

/// Desaturate to luminance, scale by `factor`, and spread back over three channels
fn grayscale(img: &PixelGrid, factor: f32) -> PixelGrid {
    let luma = luminance(img);
    PixelGrid::from_fn(img.width(), img.height(), |x, y| {
        let value = (luma.get_pixel(x, y)[0] as f32 * factor).round().clamp(0.0, 255.0) as u8;
        Rgb([value; 3])
    })
}

/// 3x3 convolution, normalized by the kernel sum (when non-zero), edges clamped
pub(super) fn convolve3x3(img: &PixelGrid, kernel: &[f32; 9]) -> PixelGrid {
    let (width, height) = img.dimensions();
    let sum: f32 = kernel.iter().sum();
    let scale = if sum == 0.0 { 1.0 } else { 1.0 / sum };

    PixelGrid::from_fn(width, height, |x, y| {
        let mut acc = [0f32; 3];
        for (i, weight) in kernel.iter().enumerate() {
            let dx = (i % 3) as i64 - 1;
            let dy = (i / 3) as i64 - 1;
            let nx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
            let ny = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
            let pixel = img.get_pixel(nx, ny);
            for (c, value) in acc.iter_mut().enumerate() {
                *value += pixel[c] as f32 * weight;
            }
        }
        Rgb(acc.map(|v| (v * scale).round().clamp(0.0, 255.0) as u8))
    })
}

/// Rotate about the center by `angle` degrees, counter-clockwise for positive angles
///
/// The canvas keeps its size; corners that rotate in from outside are black.
pub fn rotate(img: &PixelGrid, angle: f64) -> PixelGrid {
    // rotate_about_center turns clockwise for positive theta
    let theta = -(angle.to_radians() as f32);
    rotate_about_center(img, theta, Interpolation::Bilinear, Rgb([0, 0, 0]))
}

pub fn flip(img: &PixelGrid, direction: FlipDirection) -> PixelGrid {
    match direction {
        FlipDirection::Horizontal => imageops::flip_horizontal(img),
        FlipDirection::Vertical => imageops::flip_vertical(img),
    }
}

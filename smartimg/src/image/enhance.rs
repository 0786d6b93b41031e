//! One-shot automatic enhancement: contrast, then brightness, then sharpness

use imageproc::image::Rgb;
use imageproc::map::map_colors_mut;

use super::transform::{convolve3x3, SMOOTH_KERNEL};
use super::PixelGrid;
use crate::analysis::luminance_stats;

const CONTRAST_FACTOR: f32 = 1.3;
const BRIGHTNESS_FACTOR: f32 = 1.1;
const SHARPNESS_FACTOR: f32 = 1.2;

/// Auto-enhance image quality. Dimensions and channel depth are preserved.
pub fn auto_enhance(img: &PixelGrid) -> PixelGrid {
    let mut img = img.clone();
    enhance_contrast(&mut img, CONTRAST_FACTOR);
    enhance_brightness(&mut img, BRIGHTNESS_FACTOR);
    enhance_sharpness(&mut img, SHARPNESS_FACTOR);
    img
}

/// Interpolate `value` away from `base` by `factor` (1.0 = unchanged)
#[inline]
fn blend(base: f32, value: f32, factor: f32) -> u8 {
    (base + factor * (value - base)).round().clamp(0.0, 255.0) as u8
}

/// Push every channel away from the mean luminance
fn enhance_contrast(img: &mut PixelGrid, factor: f32) {
    let (mean, _) = luminance_stats(img);
    let mean = mean.round() as f32;
    map_colors_mut(img, |Rgb(channels)| Rgb(channels.map(|c| blend(mean, c as f32, factor))));
}

/// Scale every channel away from black
fn enhance_brightness(img: &mut PixelGrid, factor: f32) {
    map_colors_mut(img, |Rgb(channels)| Rgb(channels.map(|c| blend(0.0, c as f32, factor))));
}

/// Push every pixel away from a smoothed copy of the image
fn enhance_sharpness(img: &mut PixelGrid, factor: f32) {
    let smooth = convolve3x3(img, &SMOOTH_KERNEL);
    for (pixel, base) in img.pixels_mut().zip(smooth.pixels()) {
        for (c, b) in pixel.0.iter_mut().zip(base.0) {
            *c = blend(b as f32, *c as f32, factor);
        }
    }
}

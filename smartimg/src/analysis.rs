//! Quality metrics: sharpness, brightness, contrast and object count, plus the
//! rating and recommendations derived from them.
//!
//! Every metric works on the luminance of the image. Blur, brightness and
//! contrast are rescaled onto 0-100 and rounded to two decimals. Only blur is
//! clamped; contrast is a plain ratio against a standard deviation of 128.

use imageproc::contours::{find_contours, BorderType};
use imageproc::image::{GrayImage, Luma, Rgb};
use imageproc::stats::histogram;

use crate::image::PixelGrid;

// Laplacian variance treated as "fully sharp"
const SHARP_VARIANCE: f64 = 500.0;
// Standard deviation treated as "full contrast"
const FULL_CONTRAST_STDDEV: f64 = 128.0;
// Luminance at or above this counts as foreground when counting objects
const OBJECT_THRESHOLD: u8 = 127;

const BLUR_LIMIT: f64 = 40.0;
const DARK_LIMIT: f64 = 30.0;
const BRIGHT_LIMIT: f64 = 80.0;
const CONTRAST_LIMIT: f64 = 20.0;

pub const TOO_BLURRY: &str = "Image is too blurry. Consider retaking the photo.";
pub const TOO_DARK: &str = "Image is too dark. Increase lighting.";
pub const TOO_BRIGHT: &str = "Image is too bright. Reduce exposure.";
pub const LOW_CONTRAST: &str = "Low contrast. Enhance details for better clarity.";
pub const LOOKS_GOOD: &str = "Image quality is good!";

#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum::Display)]
pub enum QualityRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QualityMetrics {
    pub blur_score: f64,
    pub brightness: f64,
    pub contrast: f64,
    pub object_count: usize,
    pub quality_rating: QualityRating,
}

/// Everything reported about a single image
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Analysis {
    pub width: u32,
    pub height: u32,
    pub metrics: QualityMetrics,
    pub recommendations: Vec<String>,
}

pub fn analyze(img: &PixelGrid) -> Analysis {
    let metrics = metrics(img);
    let recommendations = recommendations(metrics.blur_score, metrics.brightness, metrics.contrast);

    Analysis {
        width: img.width(),
        height: img.height(),
        metrics,
        recommendations,
    }
}

/// Compute all four metrics and the rating, sharing one luminance conversion
pub fn metrics(img: &PixelGrid) -> QualityMetrics {
    let gray = luminance(img);

    let (blur_score, ((brightness, contrast), object_count)) = rayon::join(
        || blur_from_luma(&gray),
        || {
            let (mean, stddev) = gray_stats(&gray);
            (
                (brightness_from_mean(mean), contrast_from_stddev(stddev)),
                objects_from_luma(&gray),
            )
        },
    );

    let quality_rating = quality_rating(blur_score, brightness, contrast);

    log::debug!(
        "blur={blur_score} brightness={brightness} contrast={contrast} \
         objects={object_count} rating={quality_rating}"
    );

    QualityMetrics {
        blur_score,
        brightness,
        contrast,
        object_count,
        quality_rating,
    }
}

/// Sharpness from the variance of the Laplacian; higher is sharper
pub fn blur_score(img: &PixelGrid) -> f64 {
    blur_from_luma(&luminance(img))
}

/// Mean luminance on 0-100
pub fn brightness(img: &PixelGrid) -> f64 {
    let (mean, _) = luminance_stats(img);
    brightness_from_mean(mean)
}

/// Luminance standard deviation relative to 128; not clamped
pub fn contrast(img: &PixelGrid) -> f64 {
    let (_, stddev) = luminance_stats(img);
    contrast_from_stddev(stddev)
}

/// Number of outermost foreground regions after thresholding
pub fn object_count(img: &PixelGrid) -> usize {
    objects_from_luma(&luminance(img))
}

pub fn quality_rating(blur: f64, brightness: f64, contrast: f64) -> QualityRating {
    let score = (blur + brightness + contrast) / 3.0;
    if score >= 70.0 {
        QualityRating::Excellent
    } else if score >= 50.0 {
        QualityRating::Good
    } else if score >= 30.0 {
        QualityRating::Fair
    } else {
        QualityRating::Poor
    }
}

pub fn recommendations(blur: f64, brightness: f64, contrast: f64) -> Vec<String> {
    let mut advice = Vec::new();

    if blur < BLUR_LIMIT {
        advice.push(TOO_BLURRY.to_string());
    }
    if brightness < DARK_LIMIT {
        advice.push(TOO_DARK.to_string());
    } else if brightness > BRIGHT_LIMIT {
        advice.push(TOO_BRIGHT.to_string());
    }
    if contrast < CONTRAST_LIMIT {
        advice.push(LOW_CONTRAST.to_string());
    }

    if advice.is_empty() {
        advice.push(LOOKS_GOOD.to_string());
    }
    advice
}

/// Mean and population standard deviation of the luminance
pub(crate) fn luminance_stats(img: &PixelGrid) -> (f64, f64) {
    gray_stats(&luminance(img))
}

/// BT.601 luma, rounded half up: `(299 r + 587 g + 114 b) / 1000`
pub(crate) fn luminance(img: &PixelGrid) -> GrayImage {
    imageproc::map::map_colors(img, |Rgb([r, g, b])| {
        let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
        Luma([((weighted + 500) / 1000) as u8])
    })
}

fn gray_stats(gray: &GrayImage) -> (f64, f64) {
    let hist = histogram(gray);
    let channel_hist = &hist.channels[0];

    let count: f64 = channel_hist.iter().map(|&n| n as f64).sum();
    if count == 0.0 {
        return (0.0, 0.0);
    }

    let mean = channel_hist
        .iter()
        .enumerate()
        .map(|(value, &n)| value as f64 * n as f64)
        .sum::<f64>()
        / count;

    let variance = channel_hist
        .iter()
        .enumerate()
        .map(|(value, &n)| (value as f64 - mean).powi(2) * n as f64)
        .sum::<f64>()
        / count;

    (mean, variance.sqrt())
}

fn blur_from_luma(gray: &GrayImage) -> f64 {
    let laplacian = imageproc::filter::laplacian_filter(gray);

    let count = laplacian.width() as f64 * laplacian.height() as f64;
    if count == 0.0 {
        return 0.0;
    }

    let mean = laplacian.pixels().map(|p| p[0] as f64).sum::<f64>() / count;
    let variance = laplacian
        .pixels()
        .map(|p| (p[0] as f64 - mean).powi(2))
        .sum::<f64>()
        / count;

    round2((variance / SHARP_VARIANCE * 100.0).min(100.0))
}

fn brightness_from_mean(mean: f64) -> f64 {
    round2(mean / 255.0 * 100.0)
}

fn contrast_from_stddev(stddev: f64) -> f64 {
    round2(stddev / FULL_CONTRAST_STDDEV * 100.0)
}

fn objects_from_luma(gray: &GrayImage) -> usize {
    let binary = imageproc::map::map_colors(gray, |Luma([v])| {
        Luma([if v >= OBJECT_THRESHOLD { 255u8 } else { 0 }])
    });

    find_contours::<i32>(&binary)
        .iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .count()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

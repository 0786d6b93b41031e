//! Image encoding for persisted transform outputs

use imageproc::image::codecs::jpeg::JpegEncoder;

use super::PixelGrid;
use crate::error::{Error, Result};

/// Compress an image to JPEG format with the specified quality
pub fn compress_to_jpeg<W>(img: &PixelGrid, writer: &mut W, quality: u8) -> Result<()>
where
    W: std::io::Write,
{
    let mut encoder = JpegEncoder::new_with_quality(writer, quality);

    encoder.encode_image(img).map_err(Error::Encode)?;

    Ok(())
}

/// Encode into an owned JPEG buffer
pub fn encode_jpeg(img: &PixelGrid, quality: u8) -> Result<Vec<u8>> {
    let (width, height) = img.dimensions();
    let mut buffer = Vec::with_capacity(width as usize * height as usize);

    compress_to_jpeg(img, &mut buffer, quality)?;

    log::trace!("Encoded {width}x{height} JPEG, {} bytes", buffer.len());
    Ok(buffer)
}

//! Image decoding

use imageproc::image::load_from_memory;

use super::PixelGrid;
use crate::error::{Error, Result};

/// Decode an uploaded image into an 8-bit RGB grid
///
/// Format is sniffed from the magic bytes; alpha and higher bit depths are dropped.
pub fn decode(data: &[u8]) -> Result<PixelGrid> {
    let img = load_from_memory(data).map_err(Error::InvalidImageFormat)?;
    log::trace!("Decoded {}x{} {:?} image", img.width(), img.height(), img.color());
    Ok(img.into_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::encode_jpeg;

    #[test]
    fn decodes_jpeg_into_rgb_grid() {
        let gray = PixelGrid::from_pixel(100, 80, imageproc::image::Rgb([128, 128, 128]));
        let bytes = encode_jpeg(&gray, 90).unwrap();

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (100, 80));
    }

    #[test]
    fn rejects_bytes_that_are_not_an_image() {
        assert!(matches!(
            decode(b"invalid image data"),
            Err(Error::InvalidImageFormat(_))
        ));
    }

    #[test]
    fn rejects_empty_and_truncated_input() {
        assert!(matches!(decode(&[]), Err(Error::InvalidImageFormat(_))));

        let gray = PixelGrid::from_pixel(32, 32, imageproc::image::Rgb([10, 20, 30]));
        let bytes = encode_jpeg(&gray, 90).unwrap();
        assert!(matches!(decode(&bytes[..8]), Err(Error::InvalidImageFormat(_))));
    }
}

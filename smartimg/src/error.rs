use imageproc::image::ImageError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The bytes could not be parsed as a supported raster image.
    #[error("Invalid image format")]
    InvalidImageFormat(#[source] ImageError),

    /// A caller-supplied parameter is out of range or unrecognized.
    #[error("{0}")]
    InvalidParameter(String),

    #[error("failed to encode image")]
    Encode(#[source] ImageError),

    #[error("failed to prepare resize buffer")]
    ResizeBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("resize failed")]
    Resize(#[from] fast_image_resize::ResizeError),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidParameter(message.into())
    }

    /// Whether the error was caused by bad input rather than an internal failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidImageFormat(_) | Error::InvalidParameter(_))
    }
}

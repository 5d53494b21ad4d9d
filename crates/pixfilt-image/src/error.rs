/// Broad classification of an [`ImageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller handed in something the operation cannot work with.
    InvalidArgument,
    /// A buffer could not be allocated.
    OutOfMemory,
}

/// An error type for the image module.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the number of channels is not one of 1, 3 or 4.
    #[error("Unsupported number of channels: {0}, expected 1, 3 or 4")]
    UnsupportedChannelCount(usize),

    /// Error when the pixel index is out of bounds.
    #[error("Pixel index out of bounds. The index is ({0}, {1}) and the image size is ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index out of bounds. The index is {0} and the number of channels is {1}")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when the image holds no pixels.
    #[error("Image has no pixel data")]
    EmptyImage,

    /// Error when the gaussian sigma is negative or not a number.
    #[error("Invalid sigma {0}, must be a non negative number")]
    InvalidSigma(f32),

    /// Error when a buffer allocation fails.
    #[error("Failed to allocate {0} bytes")]
    OutOfMemory(usize),
}

impl ImageError {
    /// Returns the broad kind of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImageError::OutOfMemory(_) => ErrorKind::OutOfMemory,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

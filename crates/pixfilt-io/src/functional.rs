use std::path::Path;

use pixfilt_image::Image;

use crate::{
    error::IoError,
    jpeg::{read_image_jpeg, write_image_jpeg, DEFAULT_JPEG_QUALITY},
    png::{read_image_png, write_image_png},
};

/// The file formats understood by [`read_image`] and [`write_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Portable Network Graphics.
    Png,
    /// JPEG, lossy.
    Jpeg,
}

impl ImageFormat {
    /// Infer the format from the extension of `path`, ignoring case.
    ///
    /// # Example
    ///
    /// ```
    /// use pixfilt_io::functional::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::from_path("dog.JPG")?, ImageFormat::Jpeg);
    /// assert_eq!(ImageFormat::from_path("dog.png")?, ImageFormat::Png);
    /// assert!(ImageFormat::from_path("dog.tiff").is_err());
    /// # Ok::<(), pixfilt_io::error::IoError>(())
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("png") => Ok(ImageFormat::Png),
            Some("jpg") | Some("jpeg") => Ok(ImageFormat::Jpeg),
            _ => Err(IoError::InvalidFileExtension(path.to_path_buf())),
        }
    }

    /// The canonical file extension of the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

/// Reads a PNG or JPEG image, picking the decoder from the file extension.
///
/// # Arguments
///
/// * `file_path` - The path to a `png`, `jpg` or `jpeg` file.
///
/// # Returns
///
/// An image with 1, 3 or 4 channels.
pub fn read_image(file_path: impl AsRef<Path>) -> Result<Image, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let image = match ImageFormat::from_path(file_path)? {
        ImageFormat::Png => read_image_png(file_path)?,
        ImageFormat::Jpeg => read_image_jpeg(file_path)?,
    };

    log::debug!(
        "read {} {} image from {}",
        image.size(),
        image.channels(),
        file_path.display()
    );

    Ok(image)
}

/// Writes an image in the given format, JPEGs at [`DEFAULT_JPEG_QUALITY`].
pub fn write_image(
    file_path: impl AsRef<Path>,
    image: &Image,
    format: ImageFormat,
) -> Result<(), IoError> {
    write_image_with_quality(file_path, image, format, DEFAULT_JPEG_QUALITY)
}

/// Writes an image in the given format.
///
/// # Arguments
///
/// * `file_path` - The destination path.
/// * `image` - The image to write, gray, rgb or rgba.
/// * `format` - The output format.
/// * `quality` - JPEG quality in `[1, 100]`, ignored for PNG.
pub fn write_image_with_quality(
    file_path: impl AsRef<Path>,
    image: &Image,
    format: ImageFormat,
    quality: u8,
) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    log::debug!(
        "writing {} {} image to {} as {format:?}",
        image.size(),
        image.channels(),
        file_path.display()
    );

    match format {
        ImageFormat::Png => write_image_png(file_path, image),
        ImageFormat::Jpeg => write_image_jpeg(file_path, image, quality),
    }
}

/// Removes what an encoder left behind after failing half way.
pub(crate) fn remove_partial_file(file_path: &Path) {
    if file_path.exists() {
        if let Err(err) = std::fs::remove_file(file_path) {
            log::warn!(
                "failed to remove partial file {}: {err}",
                file_path.display()
            );
        }
    }
}

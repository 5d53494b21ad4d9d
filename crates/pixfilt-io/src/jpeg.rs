use std::{fs, path::Path};

use jpeg_encoder::{ColorType, Encoder};
use pixfilt_image::{ColorChannels, Image, ImageSize};

use crate::{error::IoError, functional::remove_partial_file};

/// Quality used when none is given, matching a lossless-as-possible export.
pub const DEFAULT_JPEG_QUALITY: u8 = 100;

/// Writes the given image to a JPEG file.
///
/// Gray images are stored as luma JPEGs and the alpha channel of rgba images
/// is dropped by the encoder. A partially written file is removed on failure.
///
/// # Arguments
///
/// * `file_path` - The path to the JPEG image.
/// * `image` - The image to encode.
/// * `quality` - The quality of the JPEG encoding, clamped to `[1, 100]`.
pub fn write_image_jpeg(
    file_path: impl AsRef<Path>,
    image: &Image,
    quality: u8,
) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    let res = write_image_jpeg_impl(file_path, image, quality);
    if res.is_err() {
        remove_partial_file(file_path);
    }
    res
}

fn write_image_jpeg_impl(file_path: &Path, image: &Image, quality: u8) -> Result<(), IoError> {
    let (width, height) = jpeg_dims(image.size())?;
    let color_type = match image.channels() {
        ColorChannels::Gray => ColorType::Luma,
        ColorChannels::Rgb => ColorType::Rgb,
        ColorChannels::Rgba => ColorType::Rgba,
    };

    let encoder = Encoder::new_file(file_path, quality.clamp(1, 100))?;
    encoder.encode(image.as_slice(), width, height, color_type)?;
    Ok(())
}

fn jpeg_dims(size: ImageSize) -> Result<(u16, u16), IoError> {
    match (u16::try_from(size.width), u16::try_from(size.height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(IoError::ImageTooLarge(size.width, size.height)),
    }
}

/// Reads a JPEG image from the given file path.
///
/// # Arguments
///
/// * `file_path` - The path to the JPEG image, with a `jpg` or `jpeg` extension.
///
/// # Returns
///
/// A gray or rgb image depending on the file.
pub fn read_image_jpeg(file_path: impl AsRef<Path>) -> Result<Image, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    if file_path.extension().map_or(true, |ext| {
        !ext.eq_ignore_ascii_case("jpg") && !ext.eq_ignore_ascii_case("jpeg")
    }) {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let jpeg_data = fs::read(file_path)?;
    decode_image_jpeg(&jpeg_data)
}

/// Decodes a JPEG image from raw bytes.
///
/// # Arguments
///
/// * `src` - Raw bytes of the jpeg file.
pub fn decode_image_jpeg(src: &[u8]) -> Result<Image, IoError> {
    let mut decoder = zune_jpeg::JpegDecoder::new(src);
    decoder.decode_headers()?;

    let image_info = decoder.info().ok_or_else(|| {
        IoError::JpegDecodingError(zune_jpeg::errors::DecodeErrors::Format(String::from(
            "Failed to find image info from its metadata",
        )))
    })?;

    let image_size = ImageSize {
        width: image_info.width as usize,
        height: image_info.height as usize,
    };

    let img_data = decoder.decode()?;

    let num_pixels = image_size.num_pixels();
    if num_pixels == 0 || img_data.len() % num_pixels != 0 {
        return Err(IoError::JpegDecodingError(
            zune_jpeg::errors::DecodeErrors::Format(format!(
                "decoded {} bytes for {image_size}",
                img_data.len()
            )),
        ));
    }

    let channels = ColorChannels::try_from(img_data.len() / num_pixels)
        .map_err(|_| IoError::UnsupportedChannels(img_data.len() / num_pixels))?;

    Ok(Image::new(image_size, channels, img_data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_jpeg_rgb8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("flat.jpg");

        let size = ImageSize {
            width: 16,
            height: 8,
        };
        let image = Image::from_size_val(size, ColorChannels::Rgb, 120)?;
        write_image_jpeg(&file_path, &image, DEFAULT_JPEG_QUALITY)?;
        assert!(file_path.exists(), "File does not exist: {:?}", file_path);

        let image_back = read_image_jpeg(&file_path)?;
        assert_eq!(image_back.size(), size);
        assert_eq!(image_back.channels(), ColorChannels::Rgb);
        assert!(image_back
            .as_slice()
            .iter()
            .all(|&v| (v as i32 - 120).abs() <= 3));

        Ok(())
    }

    #[test]
    fn write_jpeg_gray8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gray.jpeg");

        let size = ImageSize {
            width: 9,
            height: 7,
        };
        let image = Image::from_size_val(size, ColorChannels::Gray, 60)?;
        write_image_jpeg(&file_path, &image, 90)?;

        let image_back = read_image_jpeg(&file_path)?;
        assert_eq!(image_back.size(), size);
        assert_ne!(image_back.channels(), ColorChannels::Rgba);
        Ok(())
    }

    #[test]
    fn decode_jpeg_from_memory() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("mem.jpg");
        let image = Image::from_size_val(
            ImageSize {
                width: 8,
                height: 8,
            },
            ColorChannels::Rgba,
            200,
        )?;
        write_image_jpeg(&file_path, &image, 100)?;

        let decoded = decode_image_jpeg(&fs::read(&file_path)?)?;
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 8);
        Ok(())
    }

    #[test]
    fn decode_jpeg_garbage() {
        assert!(decode_image_jpeg(b"definitely not a jpeg").is_err());
    }

    #[test]
    fn write_jpeg_too_large() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("wide.jpg");
        let image = Image::from_size_val(
            ImageSize {
                width: u16::MAX as usize + 1,
                height: 1,
            },
            ColorChannels::Gray,
            0,
        )?;

        assert!(matches!(
            write_image_jpeg(&file_path, &image, 100),
            Err(IoError::ImageTooLarge(65536, 1))
        ));
        assert!(!file_path.exists());
        Ok(())
    }
}

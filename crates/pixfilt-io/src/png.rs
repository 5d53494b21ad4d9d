use std::{fs, fs::File, io::BufWriter, path::Path};

use pixfilt_image::{ColorChannels, Image, ImageSize};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};

use crate::{error::IoError, functional::remove_partial_file};

/// Read a PNG image.
///
/// Palette and low bit depth images are expanded and 16 bit samples are
/// stripped to 8 bits. Gray with alpha is rejected.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A gray, rgb or rgba image depending on the file.
pub fn read_image_png(file_path: impl AsRef<Path>) -> Result<Image, IoError> {
    // verify the file exists
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    // verify the file extension
    if file_path
        .extension()
        .map_or(true, |ext| !ext.eq_ignore_ascii_case("png"))
    {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let bytes = fs::read(file_path)?;
    decode_image_png(&bytes)
}

/// Decodes a PNG image from raw bytes.
///
/// # Arguments
///
/// - `bytes` - Raw bytes of the png file
pub fn decode_image_png(bytes: &[u8]) -> Result<Image, IoError> {
    let mut decoder = Decoder::new(bytes);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);

    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;
    buf.truncate(info.buffer_size());

    if info.bit_depth != BitDepth::Eight {
        return Err(IoError::PngDecodeError(format!(
            "unexpected bit depth {:?} after expansion",
            info.bit_depth
        )));
    }

    let channels = match info.color_type {
        ColorType::Grayscale => ColorChannels::Gray,
        ColorType::Rgb => ColorChannels::Rgb,
        ColorType::Rgba => ColorChannels::Rgba,
        other => return Err(IoError::UnsupportedChannels(other.samples())),
    };

    let size = ImageSize {
        width: info.width as usize,
        height: info.height as usize,
    };

    // rows are tightly packed once expanded to 8 bits
    Ok(Image::new(size, channels, buf)?)
}

/// Write an image to a PNG file.
///
/// The color type follows the channel layout of the image. A partially
/// written file is removed on failure.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
/// * `image` - The image to write.
pub fn write_image_png(file_path: impl AsRef<Path>, image: &Image) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    let color_type = match image.channels() {
        ColorChannels::Gray => ColorType::Grayscale,
        ColorChannels::Rgb => ColorType::Rgb,
        ColorChannels::Rgba => ColorType::Rgba,
    };

    let res = write_png_impl(file_path, image.as_slice(), image.size(), color_type);
    if res.is_err() {
        remove_partial_file(file_path);
    }
    res
}

/// Encode an image as PNG into memory.
pub fn encode_image_png(image: &Image) -> Result<Vec<u8>, IoError> {
    let color_type = match image.channels() {
        ColorChannels::Gray => ColorType::Grayscale,
        ColorChannels::Rgb => ColorType::Rgb,
        ColorChannels::Rgba => ColorType::Rgba,
    };
    let mut bytes = Vec::new();
    encode_png_impl(&mut bytes, image.as_slice(), image.size(), color_type)?;
    Ok(bytes)
}

fn write_png_impl(
    file_path: &Path,
    image_data: &[u8],
    image_size: ImageSize,
    color_type: ColorType,
) -> Result<(), IoError> {
    let file = File::create(file_path)?;
    encode_png_impl(BufWriter::new(file), image_data, image_size, color_type)
}

fn encode_png_impl<W: std::io::Write>(
    writer: W,
    image_data: &[u8],
    image_size: ImageSize,
    color_type: ColorType,
) -> Result<(), IoError> {
    let (width, height) = image_dims_u32(image_size)?;

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .write_image_data(image_data)
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .finish()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    Ok(())
}

fn image_dims_u32(size: ImageSize) -> Result<(u32, u32), IoError> {
    match (u32::try_from(size.width), u32::try_from(size.height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(IoError::PngEncodingError(format!(
            "image of {size} exceeds the png size limits"
        ))),
    }
}

use pixfilt_image::{
    allocator::ImageAllocator, ColorChannels, CpuAllocator, Image, ImageError,
};

use crate::{
    core::saturate_u8,
    parallel::{self, ExecutionStrategy},
};

/// Define the RGB weights for the grayscale conversion.
const RW: f32 = 0.299;
const GW: f32 = 0.587;
const BW: f32 = 0.114;

/// Convert an image to a single channel luma image using the formula:
///
/// Y = 0.299 * R + 0.587 * G + 0.114 * B
///
/// The result is rounded to the nearest integer and saturated. Alpha is
/// ignored and a grayscale input is copied verbatim.
///
/// # Arguments
///
/// * `src` - The input image with 1, 3 or 4 channels.
///
/// # Returns
///
/// A new grayscale image of the same size.
///
/// # Example
///
/// ```
/// use pixfilt_image::{ColorChannels, Image, ImageSize};
/// use pixfilt_imgproc::color::gray_from_image;
///
/// let image = Image::new(
///     ImageSize {
///         width: 2,
///         height: 1,
///     },
///     ColorChannels::Rgb,
///     vec![255, 0, 0, 0, 0, 255],
/// )?;
///
/// let gray = gray_from_image(&image)?;
/// assert_eq!(gray.num_channels(), 1);
/// assert_eq!(gray.as_slice(), &[76, 29]);
/// # Ok::<(), pixfilt_image::ImageError>(())
/// ```
pub fn gray_from_image(src: &Image) -> Result<Image, ImageError> {
    gray_from_image_with(src, ExecutionStrategy::default(), &CpuAllocator)
}

/// Same as [`gray_from_image`] with an explicit execution strategy and allocator.
///
/// # Errors
///
/// [`ImageError::EmptyImage`] for an image without pixels and
/// [`ImageError::OutOfMemory`] when the output cannot be allocated.
pub fn gray_from_image_with<A: ImageAllocator>(
    src: &Image,
    strategy: ExecutionStrategy,
    alloc: &A,
) -> Result<Image, ImageError> {
    if src.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    let channels = src.num_channels();
    let data = match src.channels() {
        ColorChannels::Gray => alloc.try_alloc_from_slice(src.as_slice())?,
        ColorChannels::Rgb | ColorChannels::Rgba => {
            let mut dst = alloc.try_alloc(src.size().num_pixels(), 0u8)?;
            let src_data = src.as_slice();
            let src_stride = src.row_stride();

            // parallelize the grayscale conversion by rows
            parallel::for_each_row(
                strategy,
                src.size().num_pixels(),
                &mut dst,
                src.width(),
                |r, dst_row| {
                    let src_row = &src_data[r * src_stride..(r + 1) * src_stride];
                    for (src_pixel, dst_pixel) in
                        src_row.chunks_exact(channels).zip(dst_row.iter_mut())
                    {
                        let r = src_pixel[0] as f32;
                        let g = src_pixel[1] as f32;
                        let b = src_pixel[2] as f32;
                        *dst_pixel = saturate_u8(RW * r + GW * g + BW * b);
                    }
                },
            );

            dst
        }
    };

    Image::new(src.size(), ColorChannels::Gray, data)
}

/// Reduce an image to grayscale in place.
///
/// On success the image has a single channel and `width * height` bytes. On
/// failure it is left exactly as it was.
pub fn grayscale(image: &mut Image) -> Result<(), ImageError> {
    grayscale_with(image, ExecutionStrategy::default(), &CpuAllocator)
}

/// Same as [`grayscale`] with an explicit execution strategy and allocator.
pub fn grayscale_with<A: ImageAllocator>(
    image: &mut Image,
    strategy: ExecutionStrategy,
    alloc: &A,
) -> Result<(), ImageError> {
    let gray = gray_from_image_with(image, strategy, alloc)?;
    log::debug!("grayscale {} from {} channels", gray.size(), image.channels());
    image.replace(ColorChannels::Gray, gray.into_vec())
}

use pixfilt_image::{allocator::ImageAllocator, CpuAllocator, Image, ImageError};

use crate::{
    histogram::WindowHistogram,
    padding::ReplicatePadded,
    parallel::{self, ExecutionStrategy},
};

/// Denoise an image in place with a median filter.
///
/// Every output sample is the median of the `(2 * radius + 1)²` window around
/// it, taken independently per channel. Pixels outside the image replicate
/// the nearest edge pixel. A `radius` of zero leaves the image untouched.
///
/// # Arguments
///
/// * `image` - The image to filter, any channel layout.
/// * `radius` - The half size of the square window.
///
/// # Example
///
/// ```
/// use pixfilt_image::{ColorChannels, Image, ImageSize};
/// use pixfilt_imgproc::filter::median_blur;
///
/// let mut image = Image::new(
///     ImageSize {
///         width: 3,
///         height: 3,
///     },
///     ColorChannels::Gray,
///     vec![0, 0, 0, 0, 255, 0, 0, 0, 0],
/// )?;
///
/// median_blur(&mut image, 1)?;
/// assert!(image.as_slice().iter().all(|&v| v == 0));
/// # Ok::<(), pixfilt_image::ImageError>(())
/// ```
pub fn median_blur(image: &mut Image, radius: usize) -> Result<(), ImageError> {
    median_blur_with(image, radius, ExecutionStrategy::default(), &CpuAllocator)
}

/// Same as [`median_blur`] with an explicit execution strategy and allocator.
///
/// Each output row starts from a fresh histogram of its leftmost window, then
/// slides one column at a time by removing the departing column and adding the
/// entering one.
///
/// # Errors
///
/// [`ImageError::EmptyImage`] for an image without pixels and
/// [`ImageError::OutOfMemory`] when the padded canvas cannot be allocated,
/// including radii too large to address. The image is not modified on error.
pub fn median_blur_with<A: ImageAllocator>(
    image: &mut Image,
    radius: usize,
    strategy: ExecutionStrategy,
    alloc: &A,
) -> Result<(), ImageError> {
    if image.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    if radius == 0 {
        return Ok(());
    }

    let canvas = ReplicatePadded::new(image, radius, strategy, alloc)?;

    let size = image.size();
    let channels = image.num_channels();
    let row_len = image.row_stride();
    // the canvas exists, so the window fits in memory too
    let diameter = 2 * radius + 1;

    log::debug!("median blur {size} radius {radius}");

    parallel::for_each_row(
        strategy,
        size.num_pixels(),
        image.as_slice_mut(),
        row_len,
        |y, dst_row| {
            let mut hist = WindowHistogram::new();
            for ch in 0..channels {
                hist.clear();
                for wy in y..y + diameter {
                    for wx in 0..diameter {
                        hist.add(canvas.get(wx, wy, ch));
                    }
                }

                for x in 0..size.width {
                    if x > 0 {
                        for wy in y..y + diameter {
                            hist.remove(canvas.get(x - 1, wy, ch));
                            hist.add(canvas.get(x - 1 + diameter, wy, ch));
                        }
                    }
                    dst_row[x * channels + ch] = hist.median();
                }
            }
        },
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixfilt_image::{ColorChannels, ImageSize};

    #[test]
    fn test_median_blur_salt_and_pepper() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let data = vec![
            10u8, 10, 10, 10, 10,
            10, 255, 10, 10, 10,
            10, 10, 10, 0, 10,
            10, 10, 10, 10, 10,
            10, 10, 255, 10, 10,
        ];
        let size = ImageSize {
            width: 5,
            height: 5,
        };

        for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::Parallel] {
            let mut img = Image::new(size, ColorChannels::Gray, data.clone())?;
            median_blur_with(&mut img, 1, strategy, &CpuAllocator)?;
            assert!(img.as_slice().iter().all(|&v| v == 10));
        }
        Ok(())
    }

    #[test]
    fn test_median_blur_per_channel() -> Result<(), ImageError> {
        // the red channel has an outlier, green and blue are ramps along x
        let size = ImageSize {
            width: 3,
            height: 1,
        };
        let mut img = Image::new(
            size,
            ColorChannels::Rgb,
            vec![5, 0, 90, 200, 10, 80, 5, 20, 70],
        )?;

        median_blur(&mut img, 1)?;

        // clamped window of x = 0 is columns [0, 0, 1]
        assert_eq!(img.as_slice(), &[5, 0, 90, 5, 10, 80, 5, 20, 70]);
        Ok(())
    }

    fn median_reference(image: &Image, radius: usize) -> Vec<u8> {
        let (w, h, c) = (image.width(), image.height(), image.num_channels());
        let r = radius as isize;
        let mut out = Vec::with_capacity(w * h * c);
        for y in 0..h {
            for x in 0..w {
                for ch in 0..c {
                    let mut window = Vec::new();
                    for dy in -r..=r {
                        for dx in -r..=r {
                            let sx = (x as isize + dx).clamp(0, w as isize - 1) as usize;
                            let sy = (y as isize + dy).clamp(0, h as isize - 1) as usize;
                            window.push(image.as_slice()[(sy * w + sx) * c + ch]);
                        }
                    }
                    window.sort_unstable();
                    out.push(window[window.len() / 2]);
                }
            }
        }
        out
    }

    #[test]
    fn test_median_blur_matches_sorted_window() -> Result<(), ImageError> {
        for (width, height, radius) in [(7, 5, 2), (9, 8, 3), (4, 6, 5), (12, 3, 1)] {
            for channels in [ColorChannels::Gray, ColorChannels::Rgb] {
                let len = width * height * channels.count();
                let data = (0..len).map(|i| ((i * 37 + i / 5 * 11) % 256) as u8).collect();
                let image = Image::new(ImageSize { width, height }, channels, data)?;
                let expected = median_reference(&image, radius);

                for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::Parallel] {
                    let mut filtered = image.clone();
                    median_blur_with(&mut filtered, radius, strategy, &CpuAllocator)?;
                    assert_eq!(
                        filtered.as_slice(),
                        &expected[..],
                        "{width}x{height} {channels} radius {radius}"
                    );
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_median_blur_huge_radius() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            ColorChannels::Gray,
            vec![1, 2, 3, 4],
        )?;
        let res = median_blur(&mut img, usize::MAX / 2);
        assert_eq!(res.map_err(|e| e.kind()), Err(pixfilt_image::ErrorKind::OutOfMemory));
        assert_eq!(img.as_slice(), &[1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn test_median_blur_radius_zero() -> Result<(), ImageError> {
        let data: Vec<u8> = (0..12).map(|v| v * 17).collect();
        let mut img = Image::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            ColorChannels::Rgb,
            data.clone(),
        )?;
        median_blur(&mut img, 0)?;
        assert_eq!(img.as_slice(), &data[..]);
        Ok(())
    }

    #[test]
    fn test_median_blur_empty() -> Result<(), ImageError> {
        let mut img = Image::new(ImageSize::default(), ColorChannels::Rgba, vec![])?;
        assert_eq!(median_blur(&mut img, 2), Err(ImageError::EmptyImage));
        Ok(())
    }
}

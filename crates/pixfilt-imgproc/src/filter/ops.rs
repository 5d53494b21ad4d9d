use pixfilt_image::{allocator::ImageAllocator, ColorChannels, CpuAllocator, Image, ImageError};

use super::{
    kernels::{self, SOBEL_DERIVATIVE_KERNEL, SOBEL_SMOOTHING_KERNEL},
    separable_filter,
};
use crate::{
    color::gray_from_image_with,
    core::saturate_u8,
    padding::clamp_to_edge,
    parallel::{self, ExecutionStrategy},
};

/// Sigmas at or below this value leave the image untouched.
pub const MIN_SIGMA: f32 = 1e-6;

/// Blur an image in place using a gaussian blur filter.
///
/// # Arguments
///
/// * `image` - The image to blur, any channel layout.
/// * `sigma` - The sigma of the gaussian kernel, the kernel radius is `ceil(3 * sigma)`.
///
/// Sigmas up to [`MIN_SIGMA`] are a no-op.
///
/// # Example
///
/// ```
/// use pixfilt_image::{ColorChannels, Image, ImageSize};
/// use pixfilt_imgproc::filter::gaussian_blur;
///
/// let mut image = Image::from_size_val(
///     ImageSize {
///         width: 4,
///         height: 4,
///     },
///     ColorChannels::Rgb,
///     42,
/// )?;
///
/// gaussian_blur(&mut image, 1.5)?;
/// assert!(image.as_slice().iter().all(|&v| v == 42));
/// # Ok::<(), pixfilt_image::ImageError>(())
/// ```
pub fn gaussian_blur(image: &mut Image, sigma: f32) -> Result<(), ImageError> {
    gaussian_blur_with(image, sigma, ExecutionStrategy::default(), &CpuAllocator)
}

/// Same as [`gaussian_blur`] with an explicit execution strategy and allocator.
///
/// # Errors
///
/// * [`ImageError::EmptyImage`] for an image without pixels.
/// * [`ImageError::InvalidSigma`] for a negative or non finite sigma.
/// * [`ImageError::OutOfMemory`] when the kernel or the scratch buffer cannot
///   be allocated. The image is not modified.
pub fn gaussian_blur_with<A: ImageAllocator>(
    image: &mut Image,
    sigma: f32,
    strategy: ExecutionStrategy,
    alloc: &A,
) -> Result<(), ImageError> {
    if image.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    if !sigma.is_finite() || sigma < 0.0 {
        return Err(ImageError::InvalidSigma(sigma));
    }

    if sigma <= MIN_SIGMA {
        return Ok(());
    }

    let kernel = kernels::gaussian_kernel_1d(sigma, alloc)?;
    log::debug!(
        "gaussian blur {} sigma {sigma} radius {}",
        image.size(),
        kernel.radius()
    );

    separable_filter(image, kernel.values(), kernel.values(), strategy, alloc)
}

/// The last three rows of first order derivatives, row `i` lives in slot `i % 3`.
struct DerivativeRows {
    dx: Vec<i32>,
    dy: Vec<i32>,
    width: usize,
}

impl DerivativeRows {
    fn new<A: ImageAllocator>(width: usize, alloc: &A) -> Result<Self, ImageError> {
        Ok(Self {
            dx: alloc.try_alloc(3 * width, 0)?,
            dy: alloc.try_alloc(3 * width, 0)?,
            width,
        })
    }

    fn slot(&self, row: usize) -> std::ops::Range<usize> {
        let start = (row % 3) * self.width;
        start..start + self.width
    }

    /// Compute the derivatives of `row` of the `height` rows tall `gray` image.
    fn compute(&mut self, gray: &[u8], height: usize, row: usize) {
        let w = self.width;
        let [dk0, dk1, dk2] = SOBEL_DERIVATIVE_KERNEL;
        let px = |r: usize, c: usize| gray[r * w + c] as i32;

        let above = clamp_to_edge(row as isize - 1, height);
        let below = clamp_to_edge(row as isize + 1, height);

        let slot = self.slot(row);
        let dx = &mut self.dx[slot.clone()];
        let dy = &mut self.dy[slot];

        for c in 0..w {
            let left = clamp_to_edge(c as isize - 1, w);
            let right = clamp_to_edge(c as isize + 1, w);
            dx[c] = dk0 * px(row, left) + dk1 * px(row, c) + dk2 * px(row, right);
            dy[c] = dk0 * px(above, c) + dk1 * px(row, c) + dk2 * px(below, c);
        }
    }

    /// Write the gradient magnitude of output `row` into `dst`.
    ///
    /// The derivative rows `row - 1`, `row` and `row + 1`, clamped to the
    /// image, must be in the buffer.
    fn emit(&self, height: usize, row: usize, dst: &mut [u8]) {
        let w = self.width;
        let [sk0, sk1, sk2] = SOBEL_SMOOTHING_KERNEL;

        let dx_above = &self.dx[self.slot(clamp_to_edge(row as isize - 1, height))];
        let dx_mid = &self.dx[self.slot(row)];
        let dx_below = &self.dx[self.slot(clamp_to_edge(row as isize + 1, height))];
        let dy_mid = &self.dy[self.slot(row)];

        for (c, out) in dst.iter_mut().enumerate() {
            let left = clamp_to_edge(c as isize - 1, w);
            let right = clamp_to_edge(c as isize + 1, w);

            let gx = sk0 * dx_above[c] + sk1 * dx_mid[c] + sk2 * dx_below[c];
            let gy = sk0 * dy_mid[left] + sk1 * dy_mid[c] + sk2 * dy_mid[right];

            *out = saturate_u8(((gx * gx + gy * gy) as f32).sqrt());
        }
    }
}

/// Replace an image by the magnitude of its sobel gradient.
///
/// The image is reduced to grayscale first, then the horizontal and vertical
/// 3x3 sobel responses are combined as `sqrt(gx² + gy²)` and saturated to a
/// byte. Borders are clamped to the edge.
///
/// On success the image has a single channel.
pub fn sobel_edges(image: &mut Image) -> Result<(), ImageError> {
    sobel_edges_with(image, ExecutionStrategy::default(), &CpuAllocator)
}

/// Same as [`sobel_edges`] with an explicit execution strategy and allocator.
///
/// Derivatives are swept row by row through a three row cyclic buffer so that
/// each one is computed once. In parallel the output is cut into bands of
/// rows, each band owning its own buffer primed with the row above it.
///
/// # Errors
///
/// [`ImageError::EmptyImage`] for an image without pixels and
/// [`ImageError::OutOfMemory`] when a scratch buffer cannot be allocated. The
/// image is not modified on error.
pub fn sobel_edges_with<A: ImageAllocator>(
    image: &mut Image,
    strategy: ExecutionStrategy,
    alloc: &A,
) -> Result<(), ImageError> {
    let gray = gray_from_image_with(image, strategy, alloc)?;

    let size = gray.size();
    let (width, height) = (size.width, size.height);
    let gray_data = gray.as_slice();

    log::debug!("sobel edges {size}");

    let mut magnitude = alloc.try_alloc(size.num_pixels(), 0u8)?;

    parallel::try_for_each_band(
        strategy,
        size.num_pixels(),
        &mut magnitude,
        width,
        |first_row, band| {
            let end_row = first_row + band.len() / width;
            let mut rows = DerivativeRows::new(width, alloc)?;

            let mut emit = |rows: &DerivativeRows, row: usize| {
                let offset = (row - first_row) * width;
                rows.emit(height, row, &mut band[offset..offset + width]);
            };

            // the row above the band primes the buffer
            let start = first_row.saturating_sub(1);
            let last = end_row.min(height - 1);
            for i in start..=last {
                rows.compute(gray_data, height, i);
                if i >= 1 && (first_row..end_row).contains(&(i - 1)) {
                    emit(&rows, i - 1);
                }
            }

            // the bottom row is its own lower neighbour
            if (first_row..end_row).contains(&(height - 1)) {
                emit(&rows, height - 1);
            }

            Ok::<_, ImageError>(())
        },
    )?;

    image.replace(ColorChannels::Gray, magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixfilt_image::ImageSize;

    #[test]
    fn test_gaussian_blur_spreads_impulse() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 5,
            height: 5,
        };
        let mut data = vec![0u8; 25];
        data[12] = 255;

        let mut img = Image::new(size, ColorChannels::Gray, data)?;
        gaussian_blur_with(&mut img, 1.0, ExecutionStrategy::Serial, &CpuAllocator)?;

        let center = img.get_pixel(2, 2, 0)?;
        assert!(center < 255);
        assert!(img.get_pixel(1, 2, 0)? > 0);
        assert!(img.get_pixel(2, 1, 0)? > 0);
        assert_eq!(img.get_pixel(1, 2, 0)?, img.get_pixel(3, 2, 0)?);
        assert_eq!(img.get_pixel(2, 1, 0)?, img.get_pixel(2, 3, 0)?);
        assert!(img.get_pixel(1, 2, 0)? < center);
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_small_sigma_is_noop() -> Result<(), ImageError> {
        let data: Vec<u8> = (0..48).collect();
        let size = ImageSize {
            width: 4,
            height: 4,
        };
        let mut img = Image::new(size, ColorChannels::Rgb, data.clone())?;
        for sigma in [0.0, 1e-7, MIN_SIGMA] {
            gaussian_blur(&mut img, sigma)?;
            assert_eq!(img.as_slice(), &data[..]);
        }
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_invalid_sigma() -> Result<(), ImageError> {
        let mut img = Image::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            ColorChannels::Gray,
            7,
        )?;
        assert_eq!(gaussian_blur(&mut img, -1.0), Err(ImageError::InvalidSigma(-1.0)));
        assert!(matches!(
            gaussian_blur(&mut img, f32::NAN),
            Err(ImageError::InvalidSigma(_))
        ));
        assert_eq!(img.as_slice(), &[7, 7, 7, 7]);
        Ok(())
    }

    #[test]
    fn test_sobel_edges_uniform() -> Result<(), ImageError> {
        let mut img = Image::from_size_val(
            ImageSize {
                width: 6,
                height: 4,
            },
            ColorChannels::Rgb,
            99,
        )?;
        sobel_edges(&mut img)?;
        assert_eq!(img.channels(), ColorChannels::Gray);
        assert!(img.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }

    #[test]
    fn test_sobel_edges_ramp() -> Result<(), ImageError> {
        // horizontal ramp with step 10: dx = 20 inside, 10 on the border columns
        // gx = 4 * dx and gy = 0
        #[rustfmt::skip]
        let data = vec![
            0u8, 10, 20, 30,
            0, 10, 20, 30,
            0, 10, 20, 30,
        ];
        let size = ImageSize {
            width: 4,
            height: 3,
        };

        for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::Parallel] {
            let mut img = Image::new(size, ColorChannels::Gray, data.clone())?;
            sobel_edges_with(&mut img, strategy, &CpuAllocator)?;

            #[rustfmt::skip]
            assert_eq!(
                img.as_slice(),
                &[
                    40u8, 80, 80, 40,
                    40, 80, 80, 40,
                    40, 80, 80, 40,
                ]
            );
        }
        Ok(())
    }

    #[test]
    fn test_sobel_edges_horizontal_line() -> Result<(), ImageError> {
        // a bright row in the middle, dy = +-50 above and below, zero on the line
        #[rustfmt::skip]
        let data = vec![
            0u8, 0, 0,
            0, 0, 0,
            50, 50, 50,
            0, 0, 0,
            0, 0, 0,
        ];
        let size = ImageSize {
            width: 3,
            height: 5,
        };

        let mut img = Image::new(size, ColorChannels::Gray, data)?;
        sobel_edges_with(&mut img, ExecutionStrategy::Serial, &CpuAllocator)?;

        #[rustfmt::skip]
        assert_eq!(
            img.as_slice(),
            &[
                0u8, 0, 0,
                200, 200, 200,
                0, 0, 0,
                200, 200, 200,
                0, 0, 0,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_sobel_edges_empty() -> Result<(), ImageError> {
        let mut img = Image::new(ImageSize::default(), ColorChannels::Gray, vec![])?;
        assert_eq!(sobel_edges(&mut img), Err(ImageError::EmptyImage));
        Ok(())
    }
}

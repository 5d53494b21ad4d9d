use pixfilt_image::{allocator::ImageAllocator, ImageError};

/// First order derivative taps of the 3x3 sobel operator.
pub const SOBEL_DERIVATIVE_KERNEL: [i32; 3] = [-1, 0, 1];

/// Smoothing taps of the 3x3 sobel operator.
pub const SOBEL_SMOOTHING_KERNEL: [i32; 3] = [1, 2, 1];

/// A normalized, symmetric 1D gaussian kernel.
///
/// The weight for offset `i` in `[-radius, radius]` lives at `values[i + radius]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    values: Vec<f32>,
    radius: usize,
}

impl GaussianKernel {
    /// Number of taps on each side of the center.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// The kernel weights, `2 * radius + 1` of them.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Weight for a signed offset from the center, `None` outside the kernel.
    pub fn weight(&self, offset: isize) -> Option<f32> {
        let idx = offset + self.radius as isize;
        if idx < 0 {
            return None;
        }
        self.values.get(idx as usize).copied()
    }
}

/// Create a gaussian blur kernel.
///
/// The radius is `ceil(3 * sigma)` and the weights `exp(-i² / (2 sigma²))`
/// are divided by their sum so that they add up to one.
///
/// PRECONDITION: `sigma > 0`. Callers treat tiny sigmas as a no-op and never
/// get here with them.
///
/// # Arguments
///
/// * `sigma` - The sigma of the gaussian kernel.
/// * `alloc` - Allocator for the weights.
///
/// # Errors
///
/// [`ImageError::OutOfMemory`] if the weights cannot be allocated or their
/// count overflows.
pub fn gaussian_kernel_1d<A: ImageAllocator>(
    sigma: f32,
    alloc: &A,
) -> Result<GaussianKernel, ImageError> {
    let radius = (3.0 * sigma).ceil() as usize;
    let kernel_size = radius
        .checked_mul(2)
        .and_then(|n| n.checked_add(1))
        .ok_or(ImageError::OutOfMemory(usize::MAX))?;

    let mut values = alloc.try_with_capacity(kernel_size)?;

    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - radius as f32;
        values.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = values.iter().sum::<f32>();
    values.iter_mut().for_each(|k| *k /= norm);

    Ok(GaussianKernel { values, radius })
}

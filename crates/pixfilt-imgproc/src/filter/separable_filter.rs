use pixfilt_image::{allocator::ImageAllocator, Image, ImageError};

use crate::{
    core::saturate_u8,
    padding::clamp_to_edge,
    parallel::{self, ExecutionStrategy},
};

/// A separable 2D filter that applies horizontal and vertical 1D convolutions sequentially.
///
/// This struct caches the kernel data and precomputed offsets for efficient filtering.
struct SeparableFilter<'a> {
    kernel_x: &'a [f32],
    kernel_y: &'a [f32],
    offsets_x: Vec<isize>,
    offsets_y: Vec<isize>,
}

impl<'a> SeparableFilter<'a> {
    fn new<A: ImageAllocator>(
        kernel_x: &'a [f32],
        kernel_y: &'a [f32],
        alloc: &A,
    ) -> Result<Self, ImageError> {
        Ok(Self {
            kernel_x,
            kernel_y,
            offsets_x: Self::offsets(kernel_x.len(), alloc)?,
            offsets_y: Self::offsets(kernel_y.len(), alloc)?,
        })
    }

    fn offsets<A: ImageAllocator>(len: usize, alloc: &A) -> Result<Vec<isize>, ImageError> {
        let half = (len / 2) as isize;
        let mut offsets = alloc.try_with_capacity(len)?;
        offsets.extend((0..len as isize).map(|i| i - half));
        Ok(offsets)
    }

    /// Filter `image` in place.
    ///
    /// The horizontal pass reads the image and writes `temp`, the vertical pass
    /// reads `temp` and writes the image back, so neither pass ever reads a
    /// value it already overwrote.
    fn apply(&self, image: &mut Image, temp: &mut [u8], strategy: ExecutionStrategy) {
        let rows = image.rows();
        let cols = image.cols();
        let channels = image.num_channels();
        let row_len = image.row_stride();
        let num_pixels = rows * cols;

        // Horizontal
        let src = image.as_slice();
        parallel::for_each_row(strategy, num_pixels, temp, row_len, |r, dst_row| {
            let src_row = &src[r * row_len..(r + 1) * row_len];
            for c in 0..cols {
                let mut acc = [0.0f32; 4];
                for (&k, &off) in self.kernel_x.iter().zip(self.offsets_x.iter()) {
                    let x = clamp_to_edge(c as isize + off, cols);
                    let px = &src_row[x * channels..(x + 1) * channels];
                    for (a, &v) in acc.iter_mut().zip(px) {
                        *a += v as f32 * k;
                    }
                }
                let out = &mut dst_row[c * channels..(c + 1) * channels];
                for (o, &a) in out.iter_mut().zip(acc.iter()) {
                    *o = saturate_u8(a);
                }
            }
        });

        // Vertical
        let temp = &*temp;
        parallel::for_each_row(
            strategy,
            num_pixels,
            image.as_slice_mut(),
            row_len,
            |r, dst_row| {
                let mut acc = [0.0f32; 4];
                for c in 0..cols {
                    acc.iter_mut().for_each(|a| *a = 0.0);
                    for (&k, &off) in self.kernel_y.iter().zip(self.offsets_y.iter()) {
                        let y = clamp_to_edge(r as isize + off, rows);
                        let idx = y * row_len + c * channels;
                        for (a, &v) in acc.iter_mut().zip(&temp[idx..idx + channels]) {
                            *a += v as f32 * k;
                        }
                    }
                    let out = &mut dst_row[c * channels..(c + 1) * channels];
                    for (o, &a) in out.iter_mut().zip(acc.iter()) {
                        *o = saturate_u8(a);
                    }
                }
            },
        );
    }
}

/// Apply a separable filter to an image in place.
///
/// Samples outside the image are clamped to the nearest edge pixel and every
/// intermediate result is rounded and saturated to a byte. Kernels are
/// expected to have an odd length, the center tap sits at `len / 2`.
///
/// # Arguments
///
/// * `image` - The image to filter, any channel layout.
/// * `kernel_x` - The horizontal kernel.
/// * `kernel_y` - The vertical kernel.
/// * `strategy` - The execution strategy.
/// * `alloc` - Allocator for the scratch buffer.
///
/// # Errors
///
/// [`ImageError::OutOfMemory`] when the scratch buffer cannot be allocated, in
/// which case the image is left untouched.
pub fn separable_filter<A: ImageAllocator>(
    image: &mut Image,
    kernel_x: &[f32],
    kernel_y: &[f32],
    strategy: ExecutionStrategy,
    alloc: &A,
) -> Result<(), ImageError> {
    if image.is_empty() {
        return Ok(());
    }

    let filter = SeparableFilter::new(kernel_x, kernel_y, alloc)?;
    let mut temp = alloc.try_alloc(image.as_slice().len(), 0u8)?;

    filter.apply(image, &mut temp, strategy);

    Ok(())
}

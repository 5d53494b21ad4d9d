use pixfilt_image::{allocator::ImageAllocator, Image, ImageError, ImageSize};

use crate::parallel::{self, ExecutionStrategy};

/// Maps a possibly out of range coordinate to `[0, len)` by clamping to the edge.
///
/// Example: ...d c b a | a a a a...
///
/// # Arguments
/// - `i`: The (possibly out-of-range) coordinate index.
/// - `len`: The valid length of the dimension, must be non zero.
#[inline]
pub fn clamp_to_edge(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// A copy of an image surrounded by a border of replicated edge pixels.
///
/// The canvas is `width + 2 * border` wide and `height + 2 * border` tall and
/// keeps the channel interleaving of the source.
pub struct ReplicatePadded {
    data: Vec<u8>,
    size: ImageSize,
    channels: usize,
    border: usize,
}

impl ReplicatePadded {
    /// Build the padded canvas for `src` with `border` pixels on every side.
    ///
    /// # Errors
    ///
    /// [`ImageError::EmptyImage`] for an image without pixels and
    /// [`ImageError::OutOfMemory`] when the canvas cannot be allocated or its
    /// size overflows.
    pub fn new<A: ImageAllocator>(
        src: &Image,
        border: usize,
        strategy: ExecutionStrategy,
        alloc: &A,
    ) -> Result<Self, ImageError> {
        if src.is_empty() {
            return Err(ImageError::EmptyImage);
        }

        // a canvas that does not fit in memory is an allocation failure
        let overflow = || ImageError::OutOfMemory(usize::MAX);
        let pad = border.checked_mul(2).ok_or_else(overflow)?;
        let size = ImageSize {
            width: src.width().checked_add(pad).ok_or_else(overflow)?,
            height: src.height().checked_add(pad).ok_or_else(overflow)?,
        };
        let channels = src.num_channels();
        let len = size.checked_len(channels).ok_or_else(overflow)?;
        let row_len = size.width * channels;
        let mut data = alloc.try_alloc(len, 0u8)?;

        let src_data = src.as_slice();
        let (src_w, src_h) = (src.width(), src.height());

        parallel::for_each_row(strategy, size.num_pixels(), &mut data, row_len, |y, row| {
            let src_y = clamp_to_edge(y as isize - border as isize, src_h);
            let src_row = &src_data[src_y * src_w * channels..(src_y + 1) * src_w * channels];
            for (x, px) in row.chunks_exact_mut(channels).enumerate() {
                let src_x = clamp_to_edge(x as isize - border as isize, src_w);
                px.copy_from_slice(&src_row[src_x * channels..(src_x + 1) * channels]);
            }
        });

        Ok(Self {
            data,
            size,
            channels,
            border,
        })
    }

    /// Size of the padded canvas.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Width of the border on each side.
    pub fn border(&self) -> usize {
        self.border
    }

    /// The value at padded coordinates `(x, y)` for channel `ch`.
    #[inline]
    pub fn get(&self, x: usize, y: usize, ch: usize) -> u8 {
        self.data[(y * self.size.width + x) * self.channels + ch]
    }

    /// Raw interleaved canvas data.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

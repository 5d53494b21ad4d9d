use crate::{
    allocator::{CpuAllocator, ImageAllocator},
    color_spaces::ColorChannels,
    error::ImageError,
};

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use pixfilt_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by the size.
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    /// Number of values needed to hold the size with `channels` channels,
    /// `None` when it does not fit in a `usize`.
    pub fn checked_len(&self, channels: usize) -> Option<usize> {
        self.width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(channels))
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Represents an 8-bit image with interleaved channels.
///
/// The pixel data is stored row-major with the channels of a pixel next to
/// each other, e.g. `R,G,B,R,G,B,...`. The length of the data always equals
/// `width * height * channels`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    size: ImageSize,
    channels: ColorChannels,
    data: Vec<u8>,
}

impl Image {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `channels` - The channel layout of the pixel data.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixfilt_image::{ColorChannels, Image, ImageSize};
    ///
    /// let image = Image::new(
    ///    ImageSize {
    ///       width: 10,
    ///       height: 20,
    ///    },
    ///    ColorChannels::Rgb,
    ///    vec![0u8; 10 * 20 * 3],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, channels: ColorChannels, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = size.checked_len(channels.count()).unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }

        Ok(Self {
            size,
            channels,
            data,
        })
    }

    /// Create a new image with the given size and every value set to `val`.
    pub fn from_size_val(
        size: ImageSize,
        channels: ColorChannels,
        val: u8,
    ) -> Result<Self, ImageError> {
        Self::from_size_val_in(size, channels, val, &CpuAllocator)
    }

    /// Same as [`Image::from_size_val`] but allocating through `alloc`.
    pub fn from_size_val_in<A: ImageAllocator>(
        size: ImageSize,
        channels: ColorChannels,
        val: u8,
        alloc: &A,
    ) -> Result<Self, ImageError> {
        let len = size
            .checked_len(channels.count())
            .ok_or(ImageError::OutOfMemory(usize::MAX))?;
        let data = alloc.try_alloc(len, val)?;
        Self::new(size, channels, data)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the channel layout of the image.
    pub fn channels(&self) -> ColorChannels {
        self.channels
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        self.channels.count()
    }

    /// Number of bytes in one row of the image.
    pub fn row_stride(&self) -> usize {
        self.size.width * self.channels.count()
    }

    /// Whether the image holds no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the pixel data of the image.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get the mutable pixel data of the image.
    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the image and return its pixel data.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Linear offset of the value at `[row, col, ch]`, `None` when out of bounds.
    #[inline]
    pub fn offset(&self, index: [usize; 3]) -> Option<usize> {
        let [row, col, ch] = index;
        if row >= self.size.height || col >= self.size.width || ch >= self.channels.count() {
            return None;
        }
        Some((row * self.size.width + col) * self.channels.count() + ch)
    }

    /// Get the value at `[row, col, ch]`.
    pub fn get(&self, index: [usize; 3]) -> Option<&u8> {
        self.offset(index).map(|i| &self.data[i])
    }


    /// Get the pixel data of the image.
    ///
    /// # Arguments
    ///
    /// * `x` - The x-coordinate of the pixel.
    /// * `y` - The y-coordinate of the pixel.
    /// * `ch` - The channel index of the pixel.
    ///
    /// # Returns
    ///
    /// The pixel value at the given coordinates.
    pub fn get_pixel(&self, x: usize, y: usize, ch: usize) -> Result<u8, ImageError> {
        let idx = self.pixel_offset(x, y, ch)?;
        Ok(self.data[idx])
    }

    /// Set the pixel value at the given coordinates.
    pub fn set_pixel(&mut self, x: usize, y: usize, ch: usize, val: u8) -> Result<(), ImageError> {
        let idx = self.pixel_offset(x, y, ch)?;
        self.data[idx] = val;
        Ok(())
    }

    fn pixel_offset(&self, x: usize, y: usize, ch: usize) -> Result<usize, ImageError> {
        self.offset([y, x, ch]).ok_or_else(|| {
            if x >= self.width() || y >= self.height() {
                ImageError::PixelIndexOutOfBounds(x, y, self.width(), self.height())
            } else {
                ImageError::ChannelIndexOutOfBounds(ch, self.num_channels())
            }
        })
    }

    /// Swap in new pixel data with a possibly different channel layout.
    ///
    /// The geometry stays the same. Both the channel layout and the data are
    /// replaced together, or nothing is changed when the data length does not
    /// match.
    pub fn replace(&mut self, channels: ColorChannels, data: Vec<u8>) -> Result<(), ImageError> {
        let expected = self.size.checked_len(channels.count()).unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }
        self.channels = channels;
        self.data = data;
        Ok(())
    }
}

use crate::error::ImageError;

/// The channel layouts an [`Image`](crate::Image) can hold.
///
/// The discriminant is the number of interleaved channels per pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorChannels {
    /// Single channel intensity.
    Gray = 1,
    /// Red, green and blue.
    Rgb = 3,
    /// Red, green, blue and alpha.
    Rgba = 4,
}

impl ColorChannels {
    /// Number of interleaved values per pixel.
    pub const fn count(self) -> usize {
        self as usize
    }

    /// Whether the last channel is an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(self, ColorChannels::Rgba)
    }
}

impl TryFrom<usize> for ColorChannels {
    type Error = ImageError;

    fn try_from(channels: usize) -> Result<Self, Self::Error> {
        match channels {
            1 => Ok(ColorChannels::Gray),
            3 => Ok(ColorChannels::Rgb),
            4 => Ok(ColorChannels::Rgba),
            n => Err(ImageError::UnsupportedChannelCount(n)),
        }
    }
}

impl std::fmt::Display for ColorChannels {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            ColorChannels::Gray => "gray",
            ColorChannels::Rgb => "rgb",
            ColorChannels::Rgba => "rgba",
        };
        write!(f, "{name}")
    }
}

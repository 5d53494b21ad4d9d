use std::{fmt, str::FromStr};

use pixfilt_image::{allocator::ImageAllocator, CpuAllocator, Image, ImageError};

use crate::{
    color,
    filter,
    parallel::ExecutionStrategy,
};

/// Tool names accepted by [`FilterOp::from_tool`].
pub const TOOL_NAMES: [&str; 4] = ["gauss", "median", "edge_detection", "grayscale"];

/// One filter invocation, with its parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    /// Gaussian blur with the given sigma.
    GaussianBlur {
        /// Standard deviation of the kernel.
        sigma: f32,
    },
    /// Sobel gradient magnitude, single channel output.
    SobelEdges,
    /// Median denoising with a square window.
    MedianBlur {
        /// Half size of the window.
        radius: usize,
    },
    /// Luma reduction, single channel output.
    Grayscale,
}

/// Error for an unknown tool name or a bad parameter.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FilterOpError {
    /// The tool name is not known.
    #[error("Unknown tool '{0}', available tools: gauss, median, edge_detection, grayscale")]
    UnknownTool(String),

    /// The numeric parameter does not fit the tool.
    #[error("Invalid parameter {1} for tool '{0}'")]
    InvalidParameter(String, f32),
}

impl FilterOp {
    /// Build an operation from a tool name and its numeric parameter.
    ///
    /// `gauss` (alias `blur`) takes the sigma and `median` the radius,
    /// truncated toward zero. The
    /// parameter is ignored by `edge_detection` (alias `edges`) and `grayscale`
    /// (alias `gray`).
    ///
    /// # Example
    ///
    /// ```
    /// use pixfilt_imgproc::op::FilterOp;
    ///
    /// let op = FilterOp::from_tool("median", 3.0)?;
    /// assert_eq!(op, FilterOp::MedianBlur { radius: 3 });
    /// # Ok::<(), pixfilt_imgproc::op::FilterOpError>(())
    /// ```
    pub fn from_tool(name: &str, param: f32) -> Result<Self, FilterOpError> {
        let op = match name.to_ascii_lowercase().as_str() {
            "gauss" | "blur" => {
                if !param.is_finite() || param < 0.0 {
                    return Err(FilterOpError::InvalidParameter(name.to_string(), param));
                }
                FilterOp::GaussianBlur { sigma: param }
            }
            "median" => {
                if !param.is_finite() || param < 0.0 {
                    return Err(FilterOpError::InvalidParameter(name.to_string(), param));
                }
                // fractional radii are truncated, huge ones saturate
                FilterOp::MedianBlur {
                    radius: param.trunc() as usize,
                }
            }
            "edge_detection" | "edges" => FilterOp::SobelEdges,
            "grayscale" | "gray" => FilterOp::Grayscale,
            _ => return Err(FilterOpError::UnknownTool(name.to_string())),
        };
        Ok(op)
    }

    /// Whether the operation ends with a single channel image.
    pub fn outputs_gray(&self) -> bool {
        matches!(self, FilterOp::SobelEdges | FilterOp::Grayscale)
    }
}

impl FromStr for FilterOp {
    type Err = FilterOpError;

    /// Parse `tool` or `tool:param`, the parameter defaulting to
    /// [`DEFAULT_PARAM`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((name, param)) => {
                let param = param
                    .trim()
                    .parse::<f32>()
                    .map_err(|_| FilterOpError::InvalidParameter(name.to_string(), f32::NAN))?;
                FilterOp::from_tool(name.trim(), param)
            }
            None => FilterOp::from_tool(s.trim(), DEFAULT_PARAM),
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::GaussianBlur { sigma } => write!(f, "gauss:{sigma}"),
            FilterOp::SobelEdges => write!(f, "edge_detection"),
            FilterOp::MedianBlur { radius } => write!(f, "median:{radius}"),
            FilterOp::Grayscale => write!(f, "grayscale"),
        }
    }
}

/// Parameter used when a tool is given without one.
pub const DEFAULT_PARAM: f32 = 5.0;

/// Apply one filter to an image in place.
///
/// # Example
///
/// ```
/// use pixfilt_image::{ColorChannels, Image, ImageSize};
/// use pixfilt_imgproc::op::{apply_filter, FilterOp};
///
/// let mut image = Image::from_size_val(
///     ImageSize {
///         width: 8,
///         height: 8,
///     },
///     ColorChannels::Rgb,
///     128,
/// )?;
///
/// apply_filter(&mut image, &FilterOp::SobelEdges)?;
/// assert_eq!(image.num_channels(), 1);
/// # Ok::<(), pixfilt_image::ImageError>(())
/// ```
pub fn apply_filter(image: &mut Image, op: &FilterOp) -> Result<(), ImageError> {
    apply_filter_with(image, op, ExecutionStrategy::default(), &CpuAllocator)
}

/// Same as [`apply_filter`] with an explicit execution strategy and allocator.
pub fn apply_filter_with<A: ImageAllocator>(
    image: &mut Image,
    op: &FilterOp,
    strategy: ExecutionStrategy,
    alloc: &A,
) -> Result<(), ImageError> {
    log::debug!("applying {op} on {} {}", image.size(), image.channels());
    match *op {
        FilterOp::GaussianBlur { sigma } => {
            filter::gaussian_blur_with(image, sigma, strategy, alloc)
        }
        FilterOp::SobelEdges => filter::sobel_edges_with(image, strategy, alloc),
        FilterOp::MedianBlur { radius } => filter::median_blur_with(image, radius, strategy, alloc),
        FilterOp::Grayscale => color::grayscale_with(image, strategy, alloc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixfilt_image::{ColorChannels, ImageSize};

    #[test]
    fn test_from_tool() -> Result<(), FilterOpError> {
        assert_eq!(
            FilterOp::from_tool("gauss", 1.5)?,
            FilterOp::GaussianBlur { sigma: 1.5 }
        );
        assert_eq!(
            FilterOp::from_tool("blur", 0.0)?,
            FilterOp::GaussianBlur { sigma: 0.0 }
        );
        assert_eq!(
            FilterOp::from_tool("median", 2.0)?,
            FilterOp::MedianBlur { radius: 2 }
        );
        assert_eq!(
            FilterOp::from_tool("median", 2.5)?,
            FilterOp::MedianBlur { radius: 2 }
        );
        assert_eq!(FilterOp::from_tool("edge_detection", 5.0)?, FilterOp::SobelEdges);
        assert_eq!(FilterOp::from_tool("Edges", 5.0)?, FilterOp::SobelEdges);
        assert_eq!(FilterOp::from_tool("grayscale", 0.0)?, FilterOp::Grayscale);
        assert_eq!(FilterOp::from_tool("gray", 0.0)?, FilterOp::Grayscale);
        for name in TOOL_NAMES {
            assert!(FilterOp::from_tool(name, 1.0).is_ok());
        }
        Ok(())
    }

    #[test]
    fn test_from_tool_errors() {
        assert_eq!(
            FilterOp::from_tool("sharpen", 1.0),
            Err(FilterOpError::UnknownTool("sharpen".to_string()))
        );
        assert!(matches!(
            FilterOp::from_tool("gauss", -0.5),
            Err(FilterOpError::InvalidParameter(..))
        ));
        assert!(matches!(
            FilterOp::from_tool("median", -1.0),
            Err(FilterOpError::InvalidParameter(..))
        ));
    }

    #[test]
    fn test_from_str() -> Result<(), FilterOpError> {
        assert_eq!(
            "gauss".parse::<FilterOp>()?,
            FilterOp::GaussianBlur { sigma: 5.0 }
        );
        assert_eq!(
            "median:3".parse::<FilterOp>()?,
            FilterOp::MedianBlur { radius: 3 }
        );
        assert!("median:abc".parse::<FilterOp>().is_err());

        let op = FilterOp::GaussianBlur { sigma: 0.5 };
        assert_eq!(op.to_string().parse::<FilterOp>()?, op);
        Ok(())
    }

    #[test]
    fn test_apply_filter_huge_median_radius() -> Result<(), Box<dyn std::error::Error>> {
        let op = FilterOp::from_tool("median", 1e30)?;
        assert_eq!(op, FilterOp::MedianBlur { radius: usize::MAX });

        let mut image = Image::from_size_val(
            ImageSize {
                width: 3,
                height: 3,
            },
            ColorChannels::Rgb,
            9,
        )?;
        let res = apply_filter(&mut image, &op);
        assert!(matches!(res, Err(ImageError::OutOfMemory(_))));
        assert!(image.as_slice().iter().all(|&v| v == 9));
        Ok(())
    }

    #[test]
    fn test_apply_filter_channels() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        for op in [
            FilterOp::GaussianBlur { sigma: 1.0 },
            FilterOp::SobelEdges,
            FilterOp::MedianBlur { radius: 1 },
            FilterOp::Grayscale,
        ] {
            let mut image = Image::from_size_val(size, ColorChannels::Rgba, 60)?;
            apply_filter(&mut image, &op)?;
            let expected = if op.outputs_gray() { 1 } else { 4 };
            assert_eq!(image.num_channels(), expected);
            assert_eq!(image.as_slice().len(), size.num_pixels() * expected);
        }
        Ok(())
    }
}

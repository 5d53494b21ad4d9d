#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Fallible allocation of pixel and scratch buffers.
pub mod allocator;

/// Supported channel layouts.
pub mod color_spaces;

/// Error types for the image module.
pub mod error;

/// image representation for filtering purposes.
pub mod image;

pub use crate::allocator::{CpuAllocator, ImageAllocator};
pub use crate::color_spaces::ColorChannels;
pub use crate::error::{ErrorKind, ImageError};
pub use crate::image::{Image, ImageSize};

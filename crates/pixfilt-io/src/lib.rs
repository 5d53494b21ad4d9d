#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access, encoding/decoding
/// failures and unsupported layouts.
pub mod error;

/// High-level image reading and writing functions.
///
/// See [`functional::read_image`] for format detection from the extension.
pub mod functional;

/// PNG image encoding and decoding.
pub mod png;

/// JPEG image encoding and decoding.
///
/// Pure Rust JPEG codec for reading and writing JPEG images.
pub mod jpeg;

pub use functional::{read_image, write_image, write_image_with_quality, ImageFormat};

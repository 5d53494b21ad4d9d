//! Filter operations
//!
//! This module provides the spatial filters: gaussian blur, sobel edges and
//! median denoising.

/// Filter kernels
pub mod kernels;

/// Median filter
mod median;
pub use median::*;

/// Filter operations
mod ops;
pub use ops::*;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::*;

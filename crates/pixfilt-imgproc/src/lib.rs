#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// pixel value helpers.
pub mod core;

/// image filtering module.
pub mod filter;

/// sliding window histogram module.
pub mod histogram;

/// filter selection and dispatch.
pub mod op;

/// edge replicated padding utilities.
pub mod padding;

/// module containing parallization utilities.
pub mod parallel;

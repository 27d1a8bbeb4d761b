//! Filter operations
//!
//! This module provides the 1-D kernels and the separable convolution used by
//! the corner detector.

/// Filter kernels
pub mod kernels;
pub use kernels::Kernel1d;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::*;

#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// feature detection module.
pub mod features;

/// image filtering module.
pub mod filter;

/// border handling for spatial filters.
pub mod padding;

/// module containing parallelization utilities.
pub mod parallel;

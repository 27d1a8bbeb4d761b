//! Feature detection and keypoint extraction.
//!
//! This module provides the Harris/Plessey corner detector, built from the
//! following stages:
//!
//! - **Structure tensor**: smoothed products of the image gradients.
//! - **Response**: `det(M) - alpha * trace(M)^2` per pixel.
//! - **Candidates**: thresholded 8-neighbour local maxima away from the border.
//! - **Cleanup**: greedy suppression of weaker corners that are too close.
//!
//! # Examples
//!
//! Detecting the four corners of a bright square.
//!
//! ```
//! use plessey_image::Image;
//! use plessey_imgproc::features::{detect_corners, HarrisParams};
//!
//! let mut data = vec![0u8; 40 * 40];
//! for y in 10..30 {
//!     for x in 10..30 {
//!         data[y * 40 + x] = 255;
//!     }
//! }
//! let image = Image::new([40, 40].into(), data).unwrap();
//!
//! let params = HarrisParams::default()
//!     .with_threshold(1000.0)
//!     .with_border(5)
//!     .with_min_distance(3.0);
//!
//! let corners = detect_corners(&image, &params).unwrap();
//! assert_eq!(corners.len(), 4);
//! ```

mod structure_tensor;
pub use structure_tensor::*;

mod responses;
pub use responses::*;

mod harris;
pub use harris::*;

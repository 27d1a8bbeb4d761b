//! Harris/Plessey corner detection on single channel images.

#[doc(inline)]
pub use plessey_image as image;

#[doc(inline)]
pub use plessey_imgproc as imgproc;

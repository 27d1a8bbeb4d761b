use plessey_image::{ImageError, ScalarField};

use super::Kernel1d;
use crate::padding::PaddingMode;
use crate::parallel::{for_each_row, ExecutionStrategy};

fn check_same_size(src: &ScalarField, dst: &ScalarField) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

/// Convolve every row of an image with a 1-D kernel.
///
/// `dst[x, y] = Σ_k kernel[k] · src[x + center - k, y]`, with out of range
/// columns resolved by `padding`.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image, must have the same size as `src`.
/// * `kernel` - The 1-D kernel.
/// * `padding` - The border handling mode.
/// * `strategy` - The execution strategy.
pub fn filter_horizontal(
    src: &ScalarField,
    dst: &mut ScalarField,
    kernel: &Kernel1d,
    padding: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;

    let cols = src.cols();
    let src_data = src.as_slice();
    let offsets = kernel.convolution_offsets();

    for_each_row(dst.as_slice_mut(), cols, strategy, |r, dst_row| {
        let src_row = &src_data[r * cols..(r + 1) * cols];
        for (c, dst_pixel) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for &(off, k) in offsets.iter() {
                if let Some(x) = padding.map_index(c as isize + off, cols) {
                    acc += src_row[x] * k;
                }
            }
            *dst_pixel = acc;
        }
    });

    Ok(())
}

/// Convolve every column of an image with a 1-D kernel.
///
/// `dst[x, y] = Σ_k kernel[k] · src[x, y + center - k]`, with out of range
/// rows resolved by `padding`.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image, must have the same size as `src`.
/// * `kernel` - The 1-D kernel.
/// * `padding` - The border handling mode.
/// * `strategy` - The execution strategy.
pub fn filter_vertical(
    src: &ScalarField,
    dst: &mut ScalarField,
    kernel: &Kernel1d,
    padding: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;

    let (cols, rows) = (src.cols(), src.rows());
    let src_data = src.as_slice();
    let offsets = kernel.convolution_offsets();

    for_each_row(dst.as_slice_mut(), cols, strategy, |r, dst_row| {
        for (c, dst_pixel) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for &(off, k) in offsets.iter() {
                if let Some(y) = padding.map_index(r as isize + off, rows) {
                    acc += src_data[y * cols + c] * k;
                }
            }
            *dst_pixel = acc;
        }
    });

    Ok(())
}

/// Apply a separable filter to an image.
///
/// Performs horizontal filtering followed by vertical filtering using a
/// temporary buffer. Both passes share the same padding mode.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image, must have the same size as `src`.
/// * `kernel_x` - The horizontal kernel.
/// * `kernel_y` - The vertical kernel.
/// * `padding` - The border handling mode.
/// * `strategy` - The execution strategy.
pub fn separable_filter(
    src: &ScalarField,
    dst: &mut ScalarField,
    kernel_x: &Kernel1d,
    kernel_y: &Kernel1d,
    padding: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;

    let mut temp = ScalarField::from_size_val(src.size(), 0.0)?;
    filter_horizontal(src, &mut temp, kernel_x, padding, strategy)?;
    filter_vertical(&temp, dst, kernel_y, padding, strategy)?;

    Ok(())
}

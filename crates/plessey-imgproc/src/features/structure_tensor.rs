use plessey_image::{ImageError, ScalarField};

use crate::filter::{filter_horizontal, filter_vertical, separable_filter, Kernel1d};
use crate::padding::PaddingMode;
use crate::parallel::{for_each_row, ExecutionStrategy};

/// The three independent entries of the smoothed 2x2 second moment matrix.
///
/// At every pixel the matrix is `[[a, c], [c, b]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureTensor {
    /// Smoothed `Ix * Ix`.
    pub a: ScalarField,
    /// Smoothed `Iy * Iy`.
    pub b: ScalarField,
    /// Smoothed `Ix * Iy`.
    pub c: ScalarField,
}

/// Compute the horizontal and vertical derivatives of an image.
///
/// Each derivative pre-smooths along its own axis and then applies the
/// centered difference kernel along the same axis:
///
/// - `Ix = conv_h(conv_h(I, P), D)`
/// - `Iy = conv_v(conv_v(I, P), D)`
///
/// # Arguments
///
/// * `src` - The source image.
/// * `padding` - The border handling mode of every convolution.
/// * `strategy` - The execution strategy.
///
/// # Returns
///
/// The pair `(Ix, Iy)`, both of the same size as `src`.
pub fn gradients(
    src: &ScalarField,
    padding: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<(ScalarField, ScalarField), ImageError> {
    let presmooth = Kernel1d::presmooth();
    let derivative = Kernel1d::derivative();

    let mut smoothed = ScalarField::from_size_val(src.size(), 0.0)?;

    let mut ix = ScalarField::from_size_val(src.size(), 0.0)?;
    filter_horizontal(src, &mut smoothed, &presmooth, padding, strategy)?;
    filter_horizontal(&smoothed, &mut ix, &derivative, padding, strategy)?;

    let mut iy = ScalarField::from_size_val(src.size(), 0.0)?;
    filter_vertical(src, &mut smoothed, &presmooth, padding, strategy)?;
    filter_vertical(&smoothed, &mut iy, &derivative, padding, strategy)?;

    Ok((ix, iy))
}

/// Compute the smoothed structure tensor of an image.
///
/// The gradient products `Ix²`, `Iy²` and `Ix·Iy` are averaged with the
/// 7-tap binomial kernel along both axes.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `padding` - The border handling mode of every convolution.
/// * `strategy` - The execution strategy.
pub fn structure_tensor(
    src: &ScalarField,
    padding: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<StructureTensor, ImageError> {
    let (ix, iy) = gradients(src, padding, strategy)?;

    let cols = src.cols();
    let (ix_data, iy_data) = (ix.as_slice(), iy.as_slice());

    let mut ix2 = ScalarField::from_size_val(src.size(), 0.0)?;
    let mut iy2 = ScalarField::from_size_val(src.size(), 0.0)?;
    let mut ixiy = ScalarField::from_size_val(src.size(), 0.0)?;

    for_each_row(ix2.as_slice_mut(), cols, strategy, |r, row| {
        let gx = &ix_data[r * cols..(r + 1) * cols];
        row.iter_mut().zip(gx).for_each(|(dst, &gx)| *dst = gx * gx);
    });
    for_each_row(iy2.as_slice_mut(), cols, strategy, |r, row| {
        let gy = &iy_data[r * cols..(r + 1) * cols];
        row.iter_mut().zip(gy).for_each(|(dst, &gy)| *dst = gy * gy);
    });
    for_each_row(ixiy.as_slice_mut(), cols, strategy, |r, row| {
        let gx = &ix_data[r * cols..(r + 1) * cols];
        let gy = &iy_data[r * cols..(r + 1) * cols];
        row.iter_mut()
            .zip(gx.iter().zip(gy))
            .for_each(|(dst, (&gx, &gy))| *dst = gx * gy);
    });

    let binomial = Kernel1d::binomial7();
    let smooth = |src: &ScalarField| -> Result<ScalarField, ImageError> {
        let mut dst = ScalarField::from_size_val(src.size(), 0.0)?;
        separable_filter(src, &mut dst, &binomial, &binomial, padding, strategy)?;
        Ok(dst)
    };

    Ok(StructureTensor {
        a: smooth(&ix2)?,
        b: smooth(&iy2)?,
        c: smooth(&ixiy)?,
    })
}

use plessey_image::{ImageError, ScalarField};

use super::StructureTensor;
use crate::parallel::{for_each_row, ExecutionStrategy};

/// Computes the harris response from a structure tensor.
///
/// Per pixel `Q = (a * b - c^2) - alpha * (a + b)^2`. Positive values hint at a
/// corner, negative values at an edge and values close to zero at a flat region.
/// The response is not clamped.
///
/// # Arguments
///
/// * `tensor` - The smoothed structure tensor.
/// * `dst` - The destination image, must have the size of the tensor fields.
/// * `alpha` - The trace weight, usually in `[0.04, 0.06]`.
/// * `strategy` - The execution strategy.
pub fn harris_response(
    tensor: &StructureTensor,
    dst: &mut ScalarField,
    alpha: f32,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    for field in [&tensor.b, &tensor.c, &*dst] {
        if field.size() != tensor.a.size() {
            return Err(ImageError::InvalidImageSize(
                tensor.a.cols(),
                tensor.a.rows(),
                field.cols(),
                field.rows(),
            ));
        }
    }

    let cols = tensor.a.cols();
    let (a_data, b_data, c_data) = (
        tensor.a.as_slice(),
        tensor.b.as_slice(),
        tensor.c.as_slice(),
    );

    for_each_row(dst.as_slice_mut(), cols, strategy, |r, dst_row| {
        let row = r * cols..(r + 1) * cols;
        dst_row
            .iter_mut()
            .zip(&a_data[row.clone()])
            .zip(&b_data[row.clone()])
            .zip(&c_data[row])
            .for_each(|(((q, &a), &b), &c)| {
                let det = a * b - c * c;
                let trace = a + b;
                *q = det - alpha * trace * trace;
            });
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tensor_from(a: f32, b: f32, c: f32) -> Result<StructureTensor, ImageError> {
        Ok(StructureTensor {
            a: ScalarField::from_size_val([2, 2].into(), a)?,
            b: ScalarField::from_size_val([2, 2].into(), b)?,
            c: ScalarField::from_size_val([2, 2].into(), c)?,
        })
    }

    #[test]
    fn test_harris_response_formula() -> Result<(), ImageError> {
        let tensor = tensor_from(2.0, 3.0, 1.0)?;
        let mut dst = ScalarField::from_size_val([2, 2].into(), 0.0)?;
        harris_response(&tensor, &mut dst, 0.05, ExecutionStrategy::Serial)?;

        // det = 5, trace = 5
        for &q in dst.as_slice() {
            assert_relative_eq!(q, 5.0 - 0.05 * 25.0, epsilon = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_harris_response_classifies_regions() -> Result<(), ImageError> {
        let mut dst = ScalarField::from_size_val([2, 2].into(), 0.0)?;
        let strategy = ExecutionStrategy::Serial;

        // flat
        harris_response(&tensor_from(0.0, 0.0, 0.0)?, &mut dst, 0.04, strategy)?;
        assert!(dst.as_slice().iter().all(|&q| q == 0.0));

        // edge: a single dominant direction
        harris_response(&tensor_from(100.0, 0.0, 0.0)?, &mut dst, 0.04, strategy)?;
        assert!(dst.as_slice().iter().all(|&q| q < 0.0));

        // corner: two strong orthogonal directions
        harris_response(&tensor_from(100.0, 100.0, 0.0)?, &mut dst, 0.04, strategy)?;
        assert!(dst.as_slice().iter().all(|&q| q > 0.0));
        Ok(())
    }

    #[test]
    fn test_harris_response_size_mismatch() -> Result<(), ImageError> {
        let tensor = tensor_from(1.0, 1.0, 0.0)?;
        let mut dst = ScalarField::from_size_val([3, 2].into(), 0.0)?;
        assert_eq!(
            harris_response(&tensor, &mut dst, 0.05, ExecutionStrategy::Serial),
            Err(ImageError::InvalidImageSize(2, 2, 3, 2))
        );
        Ok(())
    }
}

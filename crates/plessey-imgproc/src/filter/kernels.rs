use plessey_image::ImageError;

/// Taps of the 3-tap smoothing kernel applied before differentiation.
pub const PRESMOOTH_TAPS: [f32; 3] = [0.223755, 0.552490, 0.223755];

/// Taps of the 3-tap centered difference kernel.
pub const DERIVATIVE_TAPS: [f32; 3] = [0.453014, 0.0, -0.453014];

/// Taps of the 7-tap binomial kernel used to average the structure tensor.
pub const BINOMIAL7_TAPS: [f32; 7] = [
    1.0 / 64.0,
    6.0 / 64.0,
    15.0 / 64.0,
    20.0 / 64.0,
    15.0 / 64.0,
    6.0 / 64.0,
    1.0 / 64.0,
];

/// A 1-D convolution kernel with an odd number of taps.
///
/// The center tap sits at index `len / 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel1d {
    taps: Vec<f32>,
}

impl Kernel1d {
    /// Create a new kernel from its taps.
    ///
    /// # Arguments
    ///
    /// * `taps` - The kernel taps, ordered from the most negative offset.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidKernelLength`] if the number of taps is zero or even.
    ///
    /// # Examples
    ///
    /// ```
    /// use plessey_imgproc::filter::Kernel1d;
    ///
    /// let kernel = Kernel1d::new(vec![1.0, 2.0, 1.0]).unwrap();
    /// assert_eq!(kernel.center(), 1);
    ///
    /// assert!(Kernel1d::new(vec![1.0, 1.0]).is_err());
    /// ```
    pub fn new(taps: Vec<f32>) -> Result<Self, ImageError> {
        if taps.len() % 2 == 0 {
            return Err(ImageError::InvalidKernelLength(taps.len()));
        }
        Ok(Self { taps })
    }

    /// The pre-smoothing kernel `{0.223755, 0.552490, 0.223755}`.
    pub fn presmooth() -> Self {
        Self {
            taps: PRESMOOTH_TAPS.to_vec(),
        }
    }

    /// The centered difference kernel `{0.453014, 0, -0.453014}`.
    pub fn derivative() -> Self {
        Self {
            taps: DERIVATIVE_TAPS.to_vec(),
        }
    }

    /// The binomial kernel `{1, 6, 15, 20, 15, 6, 1} / 64`.
    pub fn binomial7() -> Self {
        Self {
            taps: BINOMIAL7_TAPS.to_vec(),
        }
    }

    /// The kernel taps.
    pub fn taps(&self) -> &[f32] {
        &self.taps
    }

    /// The number of taps.
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    /// Whether the kernel has no taps.
    ///
    /// Always false since [`Kernel1d::new`] rejects an empty tap list.
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Index of the center tap.
    pub fn center(&self) -> usize {
        self.taps.len() / 2
    }

    /// Pairs of `(source offset, tap)` for a convolution.
    ///
    /// The kernel is flipped, so tap `k` reads the sample at offset `center - k`.
    pub(crate) fn convolution_offsets(&self) -> Vec<(isize, f32)> {
        let center = self.center() as isize;
        self.taps
            .iter()
            .enumerate()
            .map(|(k, &tap)| (center - k as isize, tap))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kernel_length_must_be_odd() {
        assert_eq!(
            Kernel1d::new(vec![]),
            Err(ImageError::InvalidKernelLength(0))
        );
        assert_eq!(
            Kernel1d::new(vec![0.5, 0.5]),
            Err(ImageError::InvalidKernelLength(2))
        );
        assert!(Kernel1d::new(vec![1.0]).is_ok());
    }

    #[test]
    fn test_kernels_are_never_empty() -> Result<(), ImageError> {
        let single = Kernel1d::new(vec![1.0])?;
        assert_eq!(single.len(), 1);
        assert!(!single.is_empty());

        for kernel in [
            Kernel1d::presmooth(),
            Kernel1d::derivative(),
            Kernel1d::binomial7(),
        ] {
            assert!(!kernel.is_empty());
        }
        Ok(())
    }

    #[test]
    fn test_kernel_bank() {
        let presmooth = Kernel1d::presmooth();
        assert_eq!(presmooth.len(), 3);
        assert_eq!(presmooth.center(), 1);
        assert_relative_eq!(presmooth.taps().iter().sum::<f32>(), 1.0, epsilon = 1e-6);

        let derivative = Kernel1d::derivative();
        assert_eq!(derivative.taps(), &[0.453014, 0.0, -0.453014]);
        assert_relative_eq!(derivative.taps().iter().sum::<f32>(), 0.0);

        let binomial = Kernel1d::binomial7();
        assert_eq!(binomial.len(), 7);
        assert_eq!(binomial.center(), 3);
        assert_relative_eq!(binomial.taps().iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert_eq!(binomial.taps()[3], 20.0 / 64.0);
    }

    #[test]
    fn test_convolution_offsets_are_flipped() {
        let offsets = Kernel1d::derivative().convolution_offsets();
        assert_eq!(offsets, vec![(1, 0.453014), (0, 0.0), (-1, -0.453014)]);
    }
}

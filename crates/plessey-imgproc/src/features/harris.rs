use log::{debug, trace};
use plessey_image::{Image, ImageDtype, ImageError, ScalarField};

use super::{harris_response, structure_tensor};
use crate::padding::PaddingMode;
use crate::parallel::ExecutionStrategy;

/// Errors raised by the Harris corner detector.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum HarrisError {
    /// The trace weight is NaN or infinite.
    #[error("alpha must be finite, got {0}")]
    NonFiniteAlpha(f32),

    /// The response threshold is NaN or infinite.
    #[error("threshold must be finite, got {0}")]
    NonFiniteThreshold(f32),

    /// The minimum corner distance is negative, NaN or infinite.
    #[error("minimum corner distance must be finite and non-negative, got {0}")]
    InvalidMinDistance(f32),

    /// An image operation failed.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// A detected corner.
///
/// `u` is the column and `v` the row of the pixel, `score` its Harris response.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Corner {
    /// Horizontal position in pixels.
    pub u: f32,
    /// Vertical position in pixels.
    pub v: f32,
    /// Corner response at the position.
    pub score: f32,
}

impl Corner {
    /// Creates a new corner.
    pub fn new(u: f32, v: f32, score: f32) -> Self {
        Self { u, v, score }
    }

    /// Squared euclidean distance to another corner.
    pub fn dist2(&self, other: &Corner) -> f32 {
        let du = self.u - other.u;
        let dv = self.v - other.v;
        du * du + dv * dv
    }
}

/// Parameters of the Harris corner detector.
///
/// # Examples
///
/// ```
/// use plessey_imgproc::features::HarrisParams;
///
/// let params = HarrisParams::default().with_alpha(0.04).with_border(8);
/// assert_eq!(params.border, 8);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HarrisParams {
    /// Weight of the squared trace in the response, usually in `[0.04, 0.06]`.
    pub alpha: f32,
    /// Minimum response of a corner. The scale depends on the intensity range.
    pub threshold: f32,
    /// Margin in pixels where no corner is reported.
    pub border: usize,
    /// Minimum distance between two reported corners.
    pub min_distance: f32,
    /// Whether to suppress weaker corners closer than `min_distance`.
    pub do_cleanup: bool,
    /// Keep only the strongest corners after cleanup.
    pub max_corners: Option<usize>,
    /// Border handling of every convolution.
    pub padding: PaddingMode,
    /// Execution strategy of the filters.
    pub strategy: ExecutionStrategy,
}

impl Default for HarrisParams {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            threshold: 20000.0,
            border: 20,
            min_distance: 10.0,
            do_cleanup: true,
            max_corners: None,
            padding: PaddingMode::Replicate,
            strategy: ExecutionStrategy::Serial,
        }
    }
}

impl HarrisParams {
    /// Set the trace weight.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the response threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the border margin.
    pub fn with_border(mut self, border: usize) -> Self {
        self.border = border;
        self
    }

    /// Set the minimum corner distance.
    pub fn with_min_distance(mut self, min_distance: f32) -> Self {
        self.min_distance = min_distance;
        self
    }

    /// Enable or disable the cleanup stage.
    pub fn with_cleanup(mut self, do_cleanup: bool) -> Self {
        self.do_cleanup = do_cleanup;
        self
    }

    /// Limit the number of returned corners.
    pub fn with_max_corners(mut self, max_corners: Option<usize>) -> Self {
        self.max_corners = max_corners;
        self
    }

    /// Set the border handling of the convolutions.
    pub fn with_padding(mut self, padding: PaddingMode) -> Self {
        self.padding = padding;
        self
    }

    /// Set the execution strategy of the filters.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Check that the parameters can be used for a detection.
    ///
    /// # Errors
    ///
    /// Returns an error if `alpha` or `threshold` is not finite, or if
    /// `min_distance` is negative or not finite.
    pub fn validate(&self) -> Result<(), HarrisError> {
        if !self.alpha.is_finite() {
            return Err(HarrisError::NonFiniteAlpha(self.alpha));
        }
        if !self.threshold.is_finite() {
            return Err(HarrisError::NonFiniteThreshold(self.threshold));
        }
        if !self.min_distance.is_finite() || self.min_distance < 0.0 {
            return Err(HarrisError::InvalidMinDistance(self.min_distance));
        }
        Ok(())
    }
}

/// Find corner candidates in a response map.
///
/// A pixel at least `border` pixels away from every image edge is a candidate if
/// its response is strictly above `threshold` and not smaller than any of its
/// 8 neighbours. Equal neighbours all pass, so plateaus yield several candidates.
///
/// # Arguments
///
/// * `response` - The corner response map.
/// * `threshold` - The minimum response.
/// * `border` - The margin without candidates.
///
/// # Returns
///
/// The candidates sorted by descending score. Ties keep their row-major scan order.
pub fn find_corner_candidates(
    response: &ScalarField,
    threshold: f32,
    border: usize,
) -> Vec<Corner> {
    let (cols, rows) = (response.cols(), response.rows());
    let mut corners = Vec::new();

    if border >= cols.saturating_sub(border) || border >= rows.saturating_sub(border) {
        return corners;
    }

    let data = response.as_slice();

    for v in border..rows - border {
        for u in border..cols - border {
            let q = data[v * cols + u];
            if q > threshold && is_local_max(data, cols, rows, u, v, q) {
                corners.push(Corner::new(u as f32, v as f32, q));
            }
        }
    }

    corners.sort_by(|a, b| b.score.total_cmp(&a.score));

    corners
}

fn is_local_max(data: &[f32], cols: usize, rows: usize, u: usize, v: usize, q: f32) -> bool {
    for dv in -1isize..=1 {
        for du in -1isize..=1 {
            if du == 0 && dv == 0 {
                continue;
            }
            let (nu, nv) = (u as isize + du, v as isize + dv);
            // neighbours outside the image are absent
            if nu < 0 || nv < 0 || nu >= cols as isize || nv >= rows as isize {
                continue;
            }
            if data[nv as usize * cols + nu as usize] > q {
                return false;
            }
        }
    }
    true
}

/// Suppress corners that are too close to a stronger corner.
///
/// Walks the score sorted list once; every corner that survives removes all
/// later corners whose squared distance to it is below `min_distance²`. Removed
/// corners never remove others, so every survivor is at least `min_distance`
/// away from every other survivor.
///
/// # Arguments
///
/// * `corners` - Corners sorted by descending score.
/// * `min_distance` - The minimum distance between two survivors.
pub fn cleanup_corners(corners: &[Corner], min_distance: f32) -> Vec<Corner> {
    let dmin2 = min_distance * min_distance;
    let mut removed = vec![false; corners.len()];
    let mut good = Vec::new();

    for (i, c) in corners.iter().enumerate() {
        if removed[i] {
            continue;
        }
        good.push(*c);
        for (j, other) in corners.iter().enumerate().skip(i + 1) {
            if !removed[j] && c.dist2(other) < dmin2 {
                removed[j] = true;
            }
        }
    }

    good
}

/// Harris/Plessey corner detector.
///
/// Runs the full pipeline: gradients, structure tensor, response, candidate
/// extraction and, when enabled, the cleanup.
#[derive(Debug, Clone)]
pub struct HarrisCornerDetector {
    params: HarrisParams,
}

impl HarrisCornerDetector {
    /// Create a new detector.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid, see [`HarrisParams::validate`].
    pub fn new(params: HarrisParams) -> Result<Self, HarrisError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// The parameters of the detector.
    pub fn params(&self) -> &HarrisParams {
        &self.params
    }

    /// Compute the corner response map of an image.
    ///
    /// The image is converted once to `f32`. The returned map has the same
    /// size as the input.
    pub fn response<T: ImageDtype>(&self, src: &Image<T>) -> Result<ScalarField, HarrisError> {
        let src = src.to_scalar_field();
        let params = &self.params;

        let tensor = structure_tensor(&src, params.padding, params.strategy)?;
        trace!("structure tensor computed for {}", src.size());

        let mut response = ScalarField::from_size_val(src.size(), 0.0)?;
        harris_response(&tensor, &mut response, params.alpha, params.strategy)?;

        Ok(response)
    }

    /// Detect corners in an image.
    ///
    /// # Returns
    ///
    /// The corners sorted by descending score. An empty list is a valid result.
    pub fn detect<T: ImageDtype>(&self, src: &Image<T>) -> Result<Vec<Corner>, HarrisError> {
        let params = &self.params;
        let response = self.response(src)?;

        let mut corners = find_corner_candidates(&response, params.threshold, params.border);
        debug!(
            "found {} corner candidates in {} (threshold {}, border {})",
            corners.len(),
            src.size(),
            params.threshold,
            params.border
        );

        if params.do_cleanup {
            corners = cleanup_corners(&corners, params.min_distance);
            debug!(
                "{} corners left after cleanup (min distance {})",
                corners.len(),
                params.min_distance
            );
        }

        if let Some(max_corners) = params.max_corners {
            corners.truncate(max_corners);
        }

        Ok(corners)
    }
}

/// Detect Harris corners in an image.
///
/// Shorthand for [`HarrisCornerDetector::new`] followed by [`HarrisCornerDetector::detect`].
///
/// # Arguments
///
/// * `src` - The source image.
/// * `params` - The detector parameters.
///
/// # Errors
///
/// Returns an error if the parameters are invalid. No stage runs in that case.
pub fn detect_corners<T: ImageDtype>(
    src: &Image<T>,
    params: &HarrisParams,
) -> Result<Vec<Corner>, HarrisError> {
    HarrisCornerDetector::new(*params)?.detect(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_from(cols: usize, rows: usize, data: Vec<f32>) -> Result<ScalarField, ImageError> {
        ScalarField::new([cols, rows].into(), data)
    }

    #[test]
    fn test_validate_params() {
        assert!(HarrisParams::default().validate().is_ok());
        assert!(HarrisParams::default().with_min_distance(0.0).validate().is_ok());

        assert_eq!(
            HarrisParams::default().with_min_distance(-1.0).validate(),
            Err(HarrisError::InvalidMinDistance(-1.0))
        );
        assert_eq!(
            HarrisParams::default().with_alpha(f32::INFINITY).validate(),
            Err(HarrisError::NonFiniteAlpha(f32::INFINITY))
        );
        assert!(matches!(
            HarrisParams::default().with_alpha(f32::NAN).validate(),
            Err(HarrisError::NonFiniteAlpha(_))
        ));
        assert!(matches!(
            HarrisParams::default().with_threshold(f32::NAN).validate(),
            Err(HarrisError::NonFiniteThreshold(_))
        ));
        assert!(matches!(
            HarrisParams::default().with_min_distance(f32::NAN).validate(),
            Err(HarrisError::InvalidMinDistance(_))
        ));
    }

    #[test]
    fn test_detector_rejects_invalid_params() {
        let res = HarrisCornerDetector::new(HarrisParams::default().with_min_distance(-3.0));
        assert!(matches!(res, Err(HarrisError::InvalidMinDistance(_))));
    }

    #[test]
    fn test_candidates_threshold_is_strict() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let response = response_from(3, 3, vec![
            0.0, 0.0, 0.0,
            0.0, 5.0, 0.0,
            0.0, 0.0, 0.0,
        ])?;

        assert_eq!(
            find_corner_candidates(&response, 4.9, 1),
            vec![Corner::new(1.0, 1.0, 5.0)]
        );
        assert!(find_corner_candidates(&response, 5.0, 1).is_empty());
        Ok(())
    }

    #[test]
    fn test_candidates_plateau_all_pass() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let response = response_from(6, 4, vec![
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 7.0, 7.0, 0.0, 9.0, 0.0,
            0.0, 7.0, 6.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        ])?;

        let corners = find_corner_candidates(&response, 1.0, 1);
        assert_eq!(
            corners,
            vec![
                Corner::new(4.0, 1.0, 9.0),
                Corner::new(1.0, 1.0, 7.0),
                Corner::new(2.0, 1.0, 7.0),
                Corner::new(1.0, 2.0, 7.0),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_candidates_skip_border() -> Result<(), ImageError> {
        let mut response = ScalarField::from_size_val([10, 8].into(), 0.0)?;
        response.set_pixel(1, 1, 100.0)?;
        response.set_pixel(8, 4, 100.0)?;
        response.set_pixel(4, 4, 50.0)?;

        let corners = find_corner_candidates(&response, 10.0, 2);
        assert_eq!(corners, vec![Corner::new(4.0, 4.0, 50.0)]);

        // the interior vanishes once the border covers half of the image
        assert!(find_corner_candidates(&response, 10.0, 4).is_empty());
        assert!(find_corner_candidates(&response, 10.0, usize::MAX / 2 + 1).is_empty());
        assert!(find_corner_candidates(&response, 10.0, usize::MAX).is_empty());
        Ok(())
    }

    #[test]
    fn test_candidates_without_border_reach_the_edge() -> Result<(), ImageError> {
        let mut response = ScalarField::from_size_val([4, 3].into(), 0.0)?;
        response.set_pixel(0, 0, 3.0)?;
        response.set_pixel(3, 2, 2.0)?;

        let corners = find_corner_candidates(&response, 1.0, 0);
        assert_eq!(
            corners,
            vec![Corner::new(0.0, 0.0, 3.0), Corner::new(3.0, 2.0, 2.0)]
        );
        Ok(())
    }

    #[test]
    fn test_cleanup_keeps_strongest() {
        let corners = vec![
            Corner::new(50.0, 50.0, 30000.0),
            Corner::new(52.0, 51.0, 25000.0),
        ];
        assert_eq!(
            cleanup_corners(&corners, 10.0),
            vec![Corner::new(50.0, 50.0, 30000.0)]
        );
    }

    #[test]
    fn test_cleanup_removed_corners_do_not_suppress() {
        // b is removed by a, so c survives although it is close to b
        let a = Corner::new(0.0, 0.0, 3.0);
        let b = Corner::new(4.0, 0.0, 2.0);
        let c = Corner::new(8.0, 0.0, 1.0);

        assert_eq!(cleanup_corners(&[a, b, c], 5.0), vec![a, c]);
    }

    #[test]
    fn test_cleanup_distance_is_exclusive() {
        let a = Corner::new(0.0, 0.0, 2.0);
        let b = Corner::new(3.0, 4.0, 1.0);

        assert_eq!(cleanup_corners(&[a, b], 5.0), vec![a, b]);
        assert_eq!(cleanup_corners(&[a, b], 5.1), vec![a]);
        assert_eq!(cleanup_corners(&[a, b], 0.0), vec![a, b]);
        assert!(cleanup_corners(&[], 5.0).is_empty());
    }

    #[test]
    fn test_corner_dist2() {
        let a = Corner::new(1.0, 2.0, 0.0);
        let b = Corner::new(4.0, 6.0, 0.0);
        assert_eq!(a.dist2(&b), 25.0);
        assert_eq!(b.dist2(&a), 25.0);
    }
}

/// A border type used when a filter reads outside the image.
///
/// Every convolution of one detection run must use the same mode, otherwise the
/// responses close to the image edges are shifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaddingMode {
    /// Out of range reads contribute zero.
    ///
    /// Example: ...d c b a | 0 0 0 0...
    Constant,

    /// Takes the outermost row or column of pixels and repeats it into the padded region.
    ///
    /// Example: ...d c b a | a a a a...
    #[default]
    Replicate,

    /// Reflects the pixel values at the boundary, starting with the pixel 'next' to the edge.
    ///
    /// Example: ...d c b a | b c d e...
    Reflect101,

    /// Reflects the pixel values at the boundary, starting with the edge pixel itself.
    ///
    /// Example: ...d c b a | a b c d...
    Reflect,

    /// Wraps the content from the opposite side.
    ///
    /// Example: ...d c b a | w x y z...
    Wrap,
}

impl PaddingMode {
    // fold `i` into one reflection period, then mirror its second half; `len >= 2`
    #[inline]
    fn mirror(i: isize, len: usize, include_edge: bool) -> usize {
        let len = len as isize;
        let period = if include_edge { 2 * len } else { 2 * len - 2 };
        let folded = i.rem_euclid(period);
        let mirrored = if folded < len {
            folded
        } else if include_edge {
            period - 1 - folded
        } else {
            period - folded
        };
        mirrored as usize
    }

    /// Maps index `i` to a valid index within `[0, len)` according to the padding mode.
    ///
    /// - `Replicate`: clamp to edge
    /// - `Reflect`: mirror including edge
    /// - `Reflect101`: mirror excluding edge
    /// - `Wrap`: circular wrap
    /// - `Constant`: `None`, the read contributes zero
    ///
    /// In-range indices are always returned unchanged. `len == 0` yields `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use plessey_imgproc::padding::PaddingMode;
    ///
    /// assert_eq!(PaddingMode::Replicate.map_index(-2, 5), Some(0));
    /// assert_eq!(PaddingMode::Replicate.map_index(7, 5), Some(4));
    /// assert_eq!(PaddingMode::Constant.map_index(-1, 5), None);
    /// ```
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }

        if i >= 0 && (i as usize) < len {
            return Some(i as usize);
        }

        match self {
            PaddingMode::Constant => None,
            PaddingMode::Replicate => Some(i.clamp(0, len as isize - 1) as usize),
            _ if len == 1 => Some(0),
            PaddingMode::Reflect => Some(Self::mirror(i, len, true)),
            PaddingMode::Reflect101 => Some(Self::mirror(i, len, false)),
            PaddingMode::Wrap => Some(i.rem_euclid(len as isize) as usize),
        }
    }
}

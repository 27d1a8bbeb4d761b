use rayon::prelude::*;

/// Controls how row-wise image operations are executed.
///
/// Every output pixel is computed with the same arithmetic in the same order
/// under both strategies, so the results are bit-identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    #[default]
    Serial,

    /// Use the global Rayon thread pool to process rows in parallel.
    ParallelRows,
}

/// Apply a function to every row of a row-major buffer.
///
/// The closure receives the row index and the mutable row slice.
///
/// # Arguments
///
/// * `data` - The row-major buffer to fill.
/// * `row_len` - The number of elements per row, must be non-zero.
/// * `strategy` - The execution strategy.
/// * `f` - The function computing one row.
pub fn for_each_row<T>(
    data: &mut [T],
    row_len: usize,
    strategy: ExecutionStrategy,
    f: impl Fn(usize, &mut [T]) + Send + Sync,
) where
    T: Send,
{
    match strategy {
        ExecutionStrategy::Serial => data
            .chunks_mut(row_len)
            .enumerate()
            .for_each(|(r, row)| f(r, row)),
        ExecutionStrategy::ParallelRows => data
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(r, row)| f(r, row)),
    }
}

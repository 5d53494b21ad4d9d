use rayon::prelude::*;

/// Number of pixels from which [`ExecutionStrategy::Auto`] goes parallel.
pub const AUTO_PARALLEL_MIN_PIXELS: usize = 100_000;

/// Controls how the filters spread their work.
///
/// Parallel work always runs on the global rayon thread pool and splits the
/// output into disjoint rows or bands of rows, so no two workers ever write
/// the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Split rows across the global rayon thread pool.
    Parallel,

    /// Parallel for images of at least [`AUTO_PARALLEL_MIN_PIXELS`] pixels, serial otherwise.
    #[default]
    Auto,
}

impl ExecutionStrategy {
    /// Whether an image with `num_pixels` pixels should be processed in parallel.
    pub fn is_parallel(&self, num_pixels: usize) -> bool {
        match self {
            ExecutionStrategy::Serial => false,
            ExecutionStrategy::Parallel => true,
            ExecutionStrategy::Auto => num_pixels >= AUTO_PARALLEL_MIN_PIXELS,
        }
    }
}

/// Apply `f` to every row of `dst` with its row index.
///
/// # Arguments
///
/// * `strategy` - The execution strategy.
/// * `num_pixels` - Pixel count used to resolve [`ExecutionStrategy::Auto`].
/// * `dst` - The destination buffer, a whole number of rows.
/// * `row_len` - Number of elements in one row.
/// * `f` - Called with `(row_index, row)`.
pub fn for_each_row<T, F>(
    strategy: ExecutionStrategy,
    num_pixels: usize,
    dst: &mut [T],
    row_len: usize,
    f: F,
) where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if row_len == 0 {
        return;
    }

    if strategy.is_parallel(num_pixels) {
        log::trace!("processing {} rows in parallel", dst.len() / row_len);
        dst.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(r, row)| f(r, row));
    } else {
        dst.chunks_mut(row_len)
            .enumerate()
            .for_each(|(r, row)| f(r, row));
    }
}

/// Apply a fallible `f` to contiguous bands of rows of `dst`.
///
/// Serial execution hands the whole buffer over as a single band. Parallel
/// execution cuts it into about one band per rayon worker. `f` receives the
/// index of the first row of the band and the band itself. The first error
/// returned by any band is propagated.
pub fn try_for_each_band<T, E, F>(
    strategy: ExecutionStrategy,
    num_pixels: usize,
    dst: &mut [T],
    row_len: usize,
    f: F,
) -> Result<(), E>
where
    T: Send,
    E: Send,
    F: Fn(usize, &mut [T]) -> Result<(), E> + Send + Sync,
{
    if row_len == 0 || dst.is_empty() {
        return Ok(());
    }

    let rows = dst.len() / row_len;
    if strategy.is_parallel(num_pixels) {
        let rows_per_band = rows.div_ceil(rayon::current_num_threads()).max(1);
        log::trace!("processing {rows} rows in bands of {rows_per_band}");
        dst.par_chunks_mut(rows_per_band * row_len)
            .enumerate()
            .try_for_each(|(b, band)| f(b * rows_per_band, band))
    } else {
        f(0, dst)
    }
}

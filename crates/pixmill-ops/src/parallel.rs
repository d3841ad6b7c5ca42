//! Row sharding for separable passes.
//!
//! Resampling and blur passes write each output row independently of the
//! others, so rows can be handed to rayon workers. Without the `parallel`
//! feature the same closure runs sequentially. Either way the call returns
//! only after every row is written.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Calls `f(row_index, row)` for each `row_len`-sized chunk of `buf`.
pub(crate) fn for_each_row<T, F>(buf: &mut [T], row_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if row_len == 0 {
        return;
    }

    #[cfg(feature = "parallel")]
    buf.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));

    #[cfg(not(feature = "parallel"))]
    buf.chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Transposes interleaved pixel data: pixel `(x, y)` moves to `(y, x)`.
///
/// Lets a vertical pass reuse the horizontal pass code.
pub(crate) fn transpose<T: Copy + Default + Send + Sync>(
    src: &[T],
    width: usize,
    height: usize,
    channels: usize,
) -> Vec<T> {
    let mut dst = vec![T::default(); src.len()];
    for_each_row(&mut dst, height * channels, |x, col| {
        for y in 0..height {
            let s = (y * width + x) * channels;
            col[y * channels..(y + 1) * channels].copy_from_slice(&src[s..s + channels]);
        }
    });
    dst
}

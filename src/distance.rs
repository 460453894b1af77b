//! Squared Euclidean distance.
//!
//! The index only ever compares distances, so it never takes the square root. When the
//! `innr` feature is enabled (default), the SIMD kernel from the `innr` crate is used.
//! Otherwise a portable kernel accumulates into eight independent lanes, which LLVM can
//! still vectorize on any target.

#[cfg(feature = "innr")]
pub use innr::l2_distance_squared;

#[cfg(not(feature = "innr"))]
pub use fallback::l2_distance_squared;

#[cfg(not(feature = "innr"))]
mod fallback {
    //! Portable kernel when innr is not available.

    const LANES: usize = 8;

    /// Squared L2 distance between two vectors of equal length.
    #[inline]
    #[must_use]
    pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len(), "vector length mismatch");

        let mut acc = [0.0f32; LANES];
        let chunks_a = a.chunks_exact(LANES);
        let chunks_b = b.chunks_exact(LANES);
        let tail_a = chunks_a.remainder();
        let tail_b = chunks_b.remainder();

        for (ca, cb) in chunks_a.zip(chunks_b) {
            for i in 0..LANES {
                let d = ca[i] - cb[i];
                acc[i] += d * d;
            }
        }

        let mut sum: f32 = acc.iter().sum();
        for (x, y) in tail_a.iter().zip(tail_b) {
            let d = x - y;
            sum += d * d;
        }
        sum
    }
}

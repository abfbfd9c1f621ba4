//! SSE3 implementations of the vector kernels (x86_64).

use std::arch::x86_64::*;

/// Horizontal sum: `_mm_hadd_ps` twice collapses `[a, b, c, d]` into
/// `a + b + c + d` in every lane.
#[inline]
#[target_feature(enable = "sse3")]
unsafe fn horizontal_sum(v: __m128) -> f32 {
    let pairs = _mm_hadd_ps(v, v); // [a+b, c+d, a+b, c+d]
    let total = _mm_hadd_ps(pairs, pairs); // [a+b+c+d, ...]
    _mm_cvtss_f32(total)
}

/// Sum f32 values using SSE3.
///
/// # Safety
/// Caller must ensure SSE3 is available.
#[target_feature(enable = "sse3")]
pub unsafe fn sum_f32(values: &[f32]) -> f32 {
    unsafe {
        let mut sum_vec = _mm_setzero_ps();
        for chunk in values.chunks_exact(4) {
            let v = _mm_loadu_ps(chunk.as_ptr());
            sum_vec = _mm_add_ps(sum_vec, v);
        }
        horizontal_sum(sum_vec)
    }
}

/// Calculate sum of squared differences from mean using SSE3.
///
/// # Safety
/// Caller must ensure SSE3 is available.
#[target_feature(enable = "sse3")]
pub unsafe fn sum_squared_diff(values: &[f32], mean: f32) -> f32 {
    unsafe {
        let mean_vec = _mm_set1_ps(mean);
        let mut sum_vec = _mm_setzero_ps();
        for chunk in values.chunks_exact(4) {
            let v = _mm_loadu_ps(chunk.as_ptr());
            let diff = _mm_sub_ps(v, mean_vec); // xi - mean
            let sq = _mm_mul_ps(diff, diff); // (xi - mean)^2
            sum_vec = _mm_add_ps(sum_vec, sq);
        }
        horizontal_sum(sum_vec)
    }
}

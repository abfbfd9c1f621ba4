//! NEON implementations of the vector kernels (aarch64).

use std::arch::aarch64::*;

/// Horizontal sum: two rounds of pairwise add across lanes.
#[inline]
#[target_feature(enable = "neon")]
unsafe fn horizontal_sum(v: float32x4_t) -> f32 {
    let pairs = vpaddq_f32(v, v);
    let total = vpaddq_f32(pairs, pairs);
    vgetq_lane_f32::<0>(total)
}

/// Sum f32 values using NEON SIMD.
///
/// # Safety
/// Caller must ensure NEON is available (always true on aarch64).
#[target_feature(enable = "neon")]
pub unsafe fn sum_f32(values: &[f32]) -> f32 {
    unsafe {
        let mut sum_vec = vdupq_n_f32(0.0);
        for chunk in values.chunks_exact(4) {
            let v = vld1q_f32(chunk.as_ptr());
            sum_vec = vaddq_f32(sum_vec, v);
        }
        horizontal_sum(sum_vec)
    }
}

/// Calculate sum of squared differences from mean using NEON SIMD.
///
/// # Safety
/// Caller must ensure NEON is available (always true on aarch64).
#[target_feature(enable = "neon")]
pub unsafe fn sum_squared_diff(values: &[f32], mean: f32) -> f32 {
    unsafe {
        let mean_vec = vdupq_n_f32(mean);
        let mut sum_vec = vdupq_n_f32(0.0);
        for chunk in values.chunks_exact(4) {
            let v = vld1q_f32(chunk.as_ptr());
            let diff = vsubq_f32(v, mean_vec);
            let sq = vmulq_f32(diff, diff);
            sum_vec = vaddq_f32(sum_vec, sq);
        }
        horizontal_sum(sum_vec)
    }
}

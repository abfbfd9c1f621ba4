//! Portable 4-lane emulation of the vector kernels.
//!
//! Lanes are combined in the same order as the hardware paths, so results
//! match them bit for bit.

use super::LANE_WIDTH;

type Lanes = [f32; LANE_WIDTH];

/// Pairwise add across lanes: `[a0+a1, a2+a3, b0+b1, b2+b3]`.
#[inline]
fn hadd(a: Lanes, b: Lanes) -> Lanes {
    [a[0] + a[1], a[2] + a[3], b[0] + b[1], b[2] + b[3]]
}

/// Collapse all lanes into lane 0 with two pairwise rounds.
#[inline]
pub fn horizontal_sum(v: Lanes) -> f32 {
    let pairs = hadd(v, v);
    let total = hadd(pairs, pairs);
    total[0]
}

/// Sum f32 values four lanes at a time.
#[inline]
pub fn sum_f32(values: &[f32]) -> f32 {
    let mut acc: Lanes = [0.0; LANE_WIDTH];
    for chunk in values.chunks_exact(LANE_WIDTH) {
        for (lane, &v) in acc.iter_mut().zip(chunk) {
            *lane += v;
        }
    }
    horizontal_sum(acc)
}

/// Calculate sum of squared differences from mean four lanes at a time.
#[inline]
pub fn sum_squared_diff(values: &[f32], mean: f32) -> f32 {
    let mut acc: Lanes = [0.0; LANE_WIDTH];
    for chunk in values.chunks_exact(LANE_WIDTH) {
        for (lane, &v) in acc.iter_mut().zip(chunk) {
            let diff = v - mean;
            *lane += diff * diff;
        }
    }
    horizontal_sum(acc)
}

//! CPU feature detection for runtime SIMD dispatch.
//!
//! Detection runs once and is cached; use these functions instead of calling
//! `is_x86_feature_detected!` on every reduction.

use std::sync::OnceLock;

/// CPU feature flags detected once at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct X86Features {
    pub sse3: bool,
}

static FEATURES: OnceLock<X86Features> = OnceLock::new();

/// Get cached CPU features (detected once on first call).
#[cfg(target_arch = "x86_64")]
#[inline]
pub fn get() -> X86Features {
    *FEATURES.get_or_init(|| X86Features {
        sse3: is_x86_feature_detected!("sse3"),
    })
}

/// Get cached CPU features - stub for non-x86 platforms.
#[cfg(not(target_arch = "x86_64"))]
#[inline]
pub fn get() -> X86Features {
    *FEATURES.get_or_init(X86Features::default)
}

/// Check if SSE3 (horizontal add) is available.
#[inline]
pub fn has_sse3() -> bool {
    get().sse3
}

/// Name of the widest 4-lane f32 instruction set usable on this machine.
pub fn simd_level() -> &'static str {
    if cfg!(target_arch = "aarch64") {
        "neon"
    } else if has_sse3() {
        "sse3"
    } else {
        "scalar"
    }
}

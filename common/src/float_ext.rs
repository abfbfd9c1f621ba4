pub trait FloatExt {
    fn approximately_eq(self, other: Self) -> bool;

    /// Equality within `rel_tol` of the larger magnitude.
    fn relative_eq(self, other: Self, rel_tol: Self) -> bool;
}

impl FloatExt for f32 {
    fn approximately_eq(self, other: Self) -> bool {
        (self - other).abs() < crate::EPSILON as f32
    }

    fn relative_eq(self, other: Self, rel_tol: Self) -> bool {
        let scale = self.abs().max(other.abs()).max(f32::MIN_POSITIVE);
        (self - other).abs() <= rel_tol * scale
    }
}

impl FloatExt for f64 {
    fn approximately_eq(self, other: Self) -> bool {
        (self - other).abs() < crate::EPSILON
    }

    fn relative_eq(self, other: Self, rel_tol: Self) -> bool {
        let scale = self.abs().max(other.abs()).max(f64::MIN_POSITIVE);
        (self - other).abs() <= rel_tol * scale
    }
}

use nalgebra as na;

/// A point in 3-space.
pub type Point = na::Point3<f64>;
/// A direction or plane normal.
pub type Vector = na::Vector3<f64>;

/// Machine precision for `f64`.
pub const DOUBLE_PREC: f64 = f64::EPSILON;

/// Rescales `v` to unit length unless it is already within `2 * DOUBLE_PREC`
/// of it.
pub(crate) fn normalize_in_place(v: &mut Vector) {
    let err = v.norm_squared() - 1.0;
    if err > 2.0 * DOUBLE_PREC || err < -(2.0 * DOUBLE_PREC) {
        *v /= v.norm();
    }
}

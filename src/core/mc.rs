//! Float type, tolerances and the small root-finding helpers shared by the
//! region intersection code.

/// All transport arithmetic is carried out in double precision; the
/// virtual boundary plane tests rely on tolerances around 1e-15.
pub type Float = f64;

pub mod consts {
    use super::Float;
    pub use std::f64::consts::*;
    /// Speed of light in vacuum in mm/ns.
    pub const SPEED_OF_LIGHT: Float = 299.792458;
    /// Distance within which a position is considered to lie on a planar boundary.
    pub const PLANE_TOLERANCE: Float = 1e-15;
    /// Roots of boundary intersections closer than this to the ray origin are
    /// treated as the boundary the photon is currently sitting on.
    pub const INTERSECTION_EPSILON: Float = 1e-10;
    /// Tolerance used by `on_boundary` checks of curved regions.
    pub const ON_BOUNDARY_TOLERANCE: Float = 1e-9;
}

/// Solve `a t^2 + b t + c = 0`, returning the roots in ascending order.
/// Returns None when there is no real solution or the equation is degenerate.
#[inline]
pub fn quadratic(a: Float, b: Float, c: Float) -> Option<(Float, Float)> {
    if a == 0.0 {
        return None;
    }
    let discrim = b * b - 4.0 * a * c;
    if discrim < 0.0 {
        return None;
    }
    let root_discrim = discrim.sqrt();

    let q = if b < 0.0 {
        -0.5 * (b - root_discrim)
    } else {
        -0.5 * (b + root_discrim)
    };
    let mut t0 = q / a;
    let mut t1 = if q != 0.0 { c / q } else { t0 };
    if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
    }
    Some((t0, t1))
}

/// Pick the forward boundary distance from an ascending root pair.
/// Roots within `INTERSECTION_EPSILON` of the origin belong to the surface
/// the ray starts on and are skipped.
#[inline]
pub fn nearest_forward_root(t0: Float, t1: Float) -> Float {
    if t0 > consts::INTERSECTION_EPSILON {
        t0
    } else if t1 > consts::INTERSECTION_EPSILON {
        t1
    } else {
        Float::INFINITY
    }
}

/// Distance along one axis to a plane at `target`, or infinity when the
/// direction component is zero or points away from the plane.
#[inline]
pub fn distance_to_plane(origin: Float, direction: Float, target: Float) -> Float {
    if direction == 0.0 {
        return Float::INFINITY;
    }
    let d = (target - origin) / direction;
    if d >= 0.0 { d } else { Float::INFINITY }
}

use super::mc::Float;
use super::geometry::{Point3f, Vector3f, Ray};
use super::optical_properties::OpticalProperties;
use super::error::ConfigurationError;
use std::fmt;

/// Interface for the geometric subdivisions of a tissue. Every region has
/// uniform optical properties.
pub trait TissueRegion: Send + Sync + fmt::Debug {
    /// Short human readable name used in diagnostics.
    fn name(&self) -> &'static str;

    /// A representative center. For semi-infinite layers the finite limit is used.
    fn center(&self) -> Point3f;

    fn optical_properties(&self) -> &OpticalProperties;

    /// Does the region contain the given position. Positions on the surface of
    /// a layer interface belong to the deeper layer, positions on the surface of
    /// an embedded primitive belong to the primitive.
    fn contains_position(&self, p: &Point3f) -> bool;

    /// Is the position on the surface of the region, within tolerance.
    fn on_boundary(&self, p: &Point3f) -> bool;

    /// Distance along the ray to the first forward crossing of the region
    /// surface, or infinity if there is none.
    fn ray_intersect_boundary(&self, ray: &Ray) -> Float;

    /// Outward unit normal of the surface at (or nearest to) `p`.
    fn surface_normal(&self, p: &Point3f) -> Vector3f;

    /// Lowest and highest z reached by the region.
    fn z_extent(&self) -> (Float, Float);

    /// Check that the defining dimensions are strictly positive.
    fn validate_dimensions(&self) -> Result<(), ConfigurationError>;
}

/// Range of ray parameters for which a ray lies between two parallel planes
/// along one axis. A ray parallel to the planes either always or never lies
/// between them.
#[inline]
pub fn slab_interval(origin: Float, direction: Float, lo: Float, hi: Float) -> Option<(Float, Float)> {
    if direction == 0.0 {
        if origin >= lo && origin <= hi {
            Some((Float::NEG_INFINITY, Float::INFINITY))
        } else {
            None
        }
    } else {
        let t0 = (lo - origin) / direction;
        let t1 = (hi - origin) / direction;
        Some(if t0 < t1 { (t0, t1) } else { (t1, t0) })
    }
}

/// Intersection of two parameter intervals.
#[inline]
pub fn overlap(a: Option<(Float, Float)>, b: Option<(Float, Float)>) -> Option<(Float, Float)> {
    match (a, b) {
        (Some((a0, a1)), Some((b0, b1))) => {
            let lo = a0.max(b0);
            let hi = a1.min(b1);
            if lo <= hi { Some((lo, hi)) } else { None }
        }
        _ => None
    }
}

pub(crate) fn positive_dimension(region: &str, dimension: &'static str, value: Float) -> Result<(), ConfigurationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositiveDimension {
            region: region.to_string(),
            dimension,
            value
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slab_interval() {
        assert_eq!(slab_interval(0.0, 1.0, 1.0, 2.0), Some((1.0, 2.0)));
        assert_eq!(slab_interval(0.0, -1.0, 1.0, 2.0), Some((-2.0, -1.0)));
        assert_eq!(slab_interval(1.5, 0.0, 1.0, 2.0), Some((Float::NEG_INFINITY, Float::INFINITY)));
        assert_eq!(slab_interval(0.0, 0.0, 1.0, 2.0), None);
    }

    #[test]
    fn test_overlap() {
        assert_eq!(overlap(Some((0.0, 2.0)), Some((1.0, 3.0))), Some((1.0, 2.0)));
        assert_eq!(overlap(Some((0.0, 1.0)), Some((2.0, 3.0))), None);
        assert_eq!(overlap(None, Some((2.0, 3.0))), None);
    }
}

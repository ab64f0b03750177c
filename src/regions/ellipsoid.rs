use crate::core::mc::{Float, quadratic, nearest_forward_root, consts::ON_BOUNDARY_TOLERANCE};
use crate::core::region::{TissueRegion, positive_dimension};
use crate::core::geometry::{Point3f, Vector3f, Ray};
use crate::core::optical_properties::OpticalProperties;
use crate::core::error::ConfigurationError;

/// Axis aligned ellipsoid with semi-axes `dx`, `dy` and `dz`.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipsoidTissueRegion {
    pub center: Point3f,
    pub dx: Float,
    pub dy: Float,
    pub dz: Float,
    pub ops: OpticalProperties
}

impl EllipsoidTissueRegion {
    pub fn new(center: Point3f, dx: Float, dy: Float, dz: Float, ops: OpticalProperties) -> EllipsoidTissueRegion {
        EllipsoidTissueRegion { center, dx, dy, dz, ops }
    }

    pub fn sphere(center: Point3f, radius: Float, ops: OpticalProperties) -> EllipsoidTissueRegion {
        EllipsoidTissueRegion::new(center, radius, radius, radius, ops)
    }

    /// Map into the frame where the ellipsoid is the unit sphere.
    #[inline]
    fn to_unit(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.x / self.dx, v.y / self.dy, v.z / self.dz)
    }

    /// Implicit surface value, 1 on the surface.
    #[inline]
    fn level(&self, p: &Point3f) -> Float {
        self.to_unit(&(*p - self.center)).length_squared()
    }
}

impl TissueRegion for EllipsoidTissueRegion {
    fn name(&self) -> &'static str {
        "ellipsoid"
    }

    fn center(&self) -> Point3f {
        self.center
    }

    fn optical_properties(&self) -> &OpticalProperties {
        &self.ops
    }

    fn contains_position(&self, p: &Point3f) -> bool {
        self.level(p) <= 1.0
    }

    fn on_boundary(&self, p: &Point3f) -> bool {
        (self.level(p) - 1.0).abs() < ON_BOUNDARY_TOLERANCE
    }

    fn ray_intersect_boundary(&self, ray: &Ray) -> Float {
        let o = self.to_unit(&(ray.o - self.center));
        let d = self.to_unit(&ray.d);
        let a = d.length_squared();
        let b = 2.0 * o.dot(&d);
        let c = o.length_squared() - 1.0;
        match quadratic(a, b, c) {
            Some((t0, t1)) => nearest_forward_root(t0, t1),
            None => Float::INFINITY
        }
    }

    fn surface_normal(&self, p: &Point3f) -> Vector3f {
        let v = *p - self.center;
        Vector3f::new(
            v.x / (self.dx * self.dx),
            v.y / (self.dy * self.dy),
            v.z / (self.dz * self.dz)
        ).normalize()
    }

    fn z_extent(&self) -> (Float, Float) {
        (self.center.z - self.dz, self.center.z + self.dz)
    }

    fn validate_dimensions(&self) -> Result<(), ConfigurationError> {
        positive_dimension(self.name(), "dx", self.dx)?;
        positive_dimension(self.name(), "dy", self.dy)?;
        positive_dimension(self.name(), "dz", self.dz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let e = EllipsoidTissueRegion::new(Point3f::new(0.0, 0.0, 5.0), 2.0, 1.0, 0.5, OpticalProperties::default());
        assert!(e.contains_position(&Point3f::new(1.9, 0.0, 5.0)));
        assert!(e.contains_position(&Point3f::new(0.0, 0.0, 5.5)));
        assert!(!e.contains_position(&Point3f::new(0.0, 1.1, 5.0)));
    }

    #[test]
    fn test_intersect_sphere() {
        let s = EllipsoidTissueRegion::sphere(Point3f::new(0.0, 0.0, 5.0), 1.0, OpticalProperties::default());
        let down = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!((s.ray_intersect_boundary(&down) - 4.0).abs() < 1e-12);
        let out = Ray::new(Point3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!((s.ray_intersect_boundary(&out) - 1.0).abs() < 1e-12);
        let miss = Ray::new(Point3f::new(2.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(s.ray_intersect_boundary(&miss).is_infinite());
    }

    #[test]
    fn test_normal() {
        let e = EllipsoidTissueRegion::new(Point3f::new(0.0, 0.0, 5.0), 2.0, 1.0, 0.5, OpticalProperties::default());
        assert_eq!(e.surface_normal(&Point3f::new(2.0, 0.0, 5.0)), Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(e.surface_normal(&Point3f::new(0.0, 0.0, 4.5)), Vector3f::new(0.0, 0.0, -1.0));
    }
}

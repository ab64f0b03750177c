use crate::core::mc::{Float, quadratic, nearest_forward_root, consts::ON_BOUNDARY_TOLERANCE};
use crate::core::region::{TissueRegion, positive_dimension};
use crate::core::geometry::{Point3f, Vector3f, Ray};
use crate::core::optical_properties::OpticalProperties;
use crate::core::error::ConfigurationError;

/// A cylinder of infinite length through `center` along `axis`.
#[derive(Debug, Clone, PartialEq)]
pub struct InfiniteCylinderTissueRegion {
    pub center: Point3f,
    pub radius: Float,
    /// Unit vector along the cylinder axis.
    pub axis: Vector3f,
    pub ops: OpticalProperties
}

impl InfiniteCylinderTissueRegion {
    /// Axis is normalised on construction.
    pub fn new(center: Point3f, radius: Float, axis: Vector3f, ops: OpticalProperties) -> InfiniteCylinderTissueRegion {
        let axis = if axis.length_squared() > 0.0 { axis.normalize() } else { axis };
        InfiniteCylinderTissueRegion { center, radius, axis, ops }
    }

    /// Cylinder running along the y axis, the usual orientation for a vessel
    /// lying parallel to the tissue surface.
    pub fn along_y(center: Point3f, radius: Float, ops: OpticalProperties) -> InfiniteCylinderTissueRegion {
        InfiniteCylinderTissueRegion::new(center, radius, Vector3f::new(0.0, 1.0, 0.0), ops)
    }

    /// Component of `v` perpendicular to the axis.
    #[inline]
    fn perpendicular(&self, v: &Vector3f) -> Vector3f {
        *v - self.axis * v.dot(&self.axis)
    }

    /// Distance of `p` from the axis.
    #[inline]
    pub fn axial_distance(&self, p: &Point3f) -> Float {
        self.perpendicular(&(*p - self.center)).length()
    }

    pub fn is_horizontal(&self) -> bool {
        self.axis.z.abs() < ON_BOUNDARY_TOLERANCE
    }
}

impl TissueRegion for InfiniteCylinderTissueRegion {
    fn name(&self) -> &'static str {
        "infinite cylinder"
    }

    fn center(&self) -> Point3f {
        self.center
    }

    fn optical_properties(&self) -> &OpticalProperties {
        &self.ops
    }

    fn contains_position(&self, p: &Point3f) -> bool {
        self.axial_distance(p) <= self.radius
    }

    fn on_boundary(&self, p: &Point3f) -> bool {
        (self.axial_distance(p) - self.radius).abs() < ON_BOUNDARY_TOLERANCE
    }

    fn ray_intersect_boundary(&self, ray: &Ray) -> Float {
        let op = self.perpendicular(&(ray.o - self.center));
        let dp = self.perpendicular(&ray.d);
        let a = dp.length_squared();
        if a == 0.0 {
            // travelling along the axis never reaches the wall
            return Float::INFINITY;
        }
        let b = 2.0 * op.dot(&dp);
        let c = op.length_squared() - self.radius * self.radius;
        match quadratic(a, b, c) {
            Some((t0, t1)) => nearest_forward_root(t0, t1),
            None => Float::INFINITY
        }
    }

    fn surface_normal(&self, p: &Point3f) -> Vector3f {
        self.perpendicular(&(*p - self.center)).normalize()
    }

    fn z_extent(&self) -> (Float, Float) {
        if self.is_horizontal() {
            (self.center.z - self.radius, self.center.z + self.radius)
        } else {
            (Float::NEG_INFINITY, Float::INFINITY)
        }
    }

    fn validate_dimensions(&self) -> Result<(), ConfigurationError> {
        positive_dimension(self.name(), "radius", self.radius)?;
        positive_dimension(self.name(), "axis length", self.axis.length())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vessel() -> InfiniteCylinderTissueRegion {
        InfiniteCylinderTissueRegion::along_y(Point3f::new(0.0, 0.0, 10.0), 2.0, OpticalProperties::default())
    }

    #[test]
    fn test_contains() {
        let c = vessel();
        assert!(c.contains_position(&Point3f::new(0.0, 500.0, 10.0)));
        assert!(c.contains_position(&Point3f::new(0.0, -3.0, 12.0)));
        assert!(!c.contains_position(&Point3f::new(1.5, 0.0, 11.5)));
    }

    #[test]
    fn test_intersect() {
        let c = vessel();
        let down = Ray::new(Point3f::new(0.0, 4.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!((c.ray_intersect_boundary(&down) - 8.0).abs() < 1e-12);
        let inside = Ray::new(Point3f::new(0.0, 0.0, 10.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!((c.ray_intersect_boundary(&inside) - 2.0).abs() < 1e-12);
        let along = Ray::new(Point3f::new(0.0, 0.0, 10.0), Vector3f::new(0.0, 1.0, 0.0));
        assert!(c.ray_intersect_boundary(&along).is_infinite());
    }

    #[test]
    fn test_normal_and_extent() {
        let c = vessel();
        let n = c.surface_normal(&Point3f::new(0.0, 7.0, 8.0));
        assert!((n.z + 1.0).abs() < 1e-12);
        assert_eq!(c.z_extent(), (8.0, 12.0));
    }
}

use crate::core::mc::{Float, quadratic, nearest_forward_root, consts::ON_BOUNDARY_TOLERANCE};
use crate::core::region::{TissueRegion, slab_interval, overlap, positive_dimension};
use crate::core::geometry::{Point3f, Vector3f, Ray};
use crate::core::optical_properties::OpticalProperties;
use crate::core::error::ConfigurationError;

/// A finite cylinder with its axis parallel to z.
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderTissueRegion {
    pub center: Point3f,
    pub radius: Float,
    pub height: Float,
    pub ops: OpticalProperties
}

impl CylinderTissueRegion {
    pub fn new(center: Point3f, radius: Float, height: Float, ops: OpticalProperties) -> CylinderTissueRegion {
        CylinderTissueRegion { center, radius, height, ops }
    }

    #[inline]
    pub fn z_min(&self) -> Float {
        self.center.z - 0.5 * self.height
    }

    #[inline]
    pub fn z_max(&self) -> Float {
        self.center.z + 0.5 * self.height
    }

    /// Radial distance of `p` from the cylinder axis.
    #[inline]
    pub fn radial_distance(&self, p: &Point3f) -> Float {
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Is `p` on the lateral wall, excluding the caps.
    pub fn on_lateral_wall(&self, p: &Point3f) -> bool {
        (self.radial_distance(p) - self.radius).abs() < ON_BOUNDARY_TOLERANCE
            && p.z >= self.z_min() - ON_BOUNDARY_TOLERANCE
            && p.z <= self.z_max() + ON_BOUNDARY_TOLERANCE
    }

    /// Ray parameter range during which the ray is within the lateral wall.
    fn lateral_interval(&self, ray: &Ray) -> Option<(Float, Float)> {
        let ox = ray.o.x - self.center.x;
        let oy = ray.o.y - self.center.y;
        let a = ray.d.x * ray.d.x + ray.d.y * ray.d.y;
        let c = ox * ox + oy * oy - self.radius * self.radius;
        if a == 0.0 {
            // moving parallel to the axis
            return if c <= 0.0 { Some((Float::NEG_INFINITY, Float::INFINITY)) } else { None };
        }
        let b = 2.0 * (ray.d.x * ox + ray.d.y * oy);
        quadratic(a, b, c)
    }
}

impl TissueRegion for CylinderTissueRegion {
    fn name(&self) -> &'static str {
        "cylinder"
    }

    fn center(&self) -> Point3f {
        self.center
    }

    fn optical_properties(&self) -> &OpticalProperties {
        &self.ops
    }

    fn contains_position(&self, p: &Point3f) -> bool {
        self.radial_distance(p) <= self.radius && p.z >= self.z_min() && p.z <= self.z_max()
    }

    fn on_boundary(&self, p: &Point3f) -> bool {
        let r = self.radial_distance(p);
        let on_caps = r <= self.radius + ON_BOUNDARY_TOLERANCE
            && ((p.z - self.z_min()).abs() < ON_BOUNDARY_TOLERANCE
                || (p.z - self.z_max()).abs() < ON_BOUNDARY_TOLERANCE);
        on_caps || self.on_lateral_wall(p)
    }

    fn ray_intersect_boundary(&self, ray: &Ray) -> Float {
        let vertical = slab_interval(ray.o.z, ray.d.z, self.z_min(), self.z_max());
        match overlap(self.lateral_interval(ray), vertical) {
            Some((t0, t1)) => nearest_forward_root(t0, t1),
            None => Float::INFINITY
        }
    }

    fn surface_normal(&self, p: &Point3f) -> Vector3f {
        let to_bottom = (p.z - self.z_min()).abs();
        let to_top = (p.z - self.z_max()).abs();
        let to_wall = (self.radial_distance(p) - self.radius).abs();
        if to_top < to_wall && to_top <= to_bottom {
            Vector3f::new(0.0, 0.0, 1.0)
        } else if to_bottom < to_wall {
            Vector3f::new(0.0, 0.0, -1.0)
        } else {
            Vector3f::new(p.x - self.center.x, p.y - self.center.y, 0.0).normalize()
        }
    }

    fn z_extent(&self) -> (Float, Float) {
        (self.z_min(), self.z_max())
    }

    fn validate_dimensions(&self) -> Result<(), ConfigurationError> {
        positive_dimension(self.name(), "radius", self.radius)?;
        positive_dimension(self.name(), "height", self.height)
    }
}

impl Default for CylinderTissueRegion {
    fn default() -> CylinderTissueRegion {
        CylinderTissueRegion {
            center: Point3f::new(0.0, 0.0, 1.0),
            radius: 1.0,
            height: 2.0,
            ops: OpticalProperties::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let c = CylinderTissueRegion::default();
        assert!(c.contains_position(&Point3f::new(0.5, 0.5, 1.0)));
        assert!(c.contains_position(&Point3f::new(1.0, 0.0, 1.0)));
        assert!(!c.contains_position(&Point3f::new(0.9, 0.9, 1.0)));
        assert!(!c.contains_position(&Point3f::new(0.0, 0.0, 2.5)));
    }

    #[test]
    fn test_intersect_from_outside_and_inside() {
        let c = CylinderTissueRegion::default();
        let outside = Ray::new(Point3f::new(-3.0, 0.0, 1.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!((c.ray_intersect_boundary(&outside) - 2.0).abs() < 1e-12);
        let inside = Ray::new(Point3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!((c.ray_intersect_boundary(&inside) - 1.0).abs() < 1e-12);
        let miss = Ray::new(Point3f::new(-3.0, 2.0, 1.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!(c.ray_intersect_boundary(&miss).is_infinite());
        let leaving = Ray::new(Point3f::new(1.0, 0.0, 1.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!(c.ray_intersect_boundary(&leaving).is_infinite());
    }

    #[test]
    fn test_normals() {
        let c = CylinderTissueRegion::default();
        assert_eq!(c.surface_normal(&Point3f::new(0.0, 0.0, 2.0)), Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(c.surface_normal(&Point3f::new(0.0, 0.0, 0.0)), Vector3f::new(0.0, 0.0, -1.0));
        assert_eq!(c.surface_normal(&Point3f::new(0.0, 1.0, 1.0)), Vector3f::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_validate() {
        assert!(CylinderTissueRegion::default().validate_dimensions().is_ok());
        let mut c = CylinderTissueRegion::default();
        c.radius = 0.0;
        assert!(c.validate_dimensions().is_err());
    }
}

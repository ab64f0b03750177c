use crate::core::mc::{Float, distance_to_plane, consts::PLANE_TOLERANCE};
use crate::core::region::TissueRegion;
use crate::core::geometry::{Point3f, Vector3f, Ray};
use crate::core::optical_properties::OpticalProperties;
use crate::core::error::ConfigurationError;

/// A slab bounded by two planes of constant z, `[z_start, z_stop)`.
/// Either limit may be infinite.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerTissueRegion {
    pub z_start: Float,
    pub z_stop: Float,
    pub ops: OpticalProperties
}

impl LayerTissueRegion {
    pub fn new(z_start: Float, z_stop: Float, ops: OpticalProperties) -> LayerTissueRegion {
        LayerTissueRegion { z_start, z_stop, ops }
    }

    /// Semi-infinite ambient layer above `z_stop`.
    pub fn ambient_above(z_stop: Float, ops: OpticalProperties) -> LayerTissueRegion {
        LayerTissueRegion::new(Float::NEG_INFINITY, z_stop, ops)
    }

    /// Semi-infinite ambient layer below `z_start`.
    pub fn ambient_below(z_start: Float, ops: OpticalProperties) -> LayerTissueRegion {
        LayerTissueRegion::new(z_start, Float::INFINITY, ops)
    }

    #[inline]
    pub fn thickness(&self) -> Float {
        self.z_stop - self.z_start
    }

    /// Does the layer's z range contain `[z_min, z_max]`.
    #[inline]
    pub fn contains_z_extent(&self, z_min: Float, z_max: Float) -> bool {
        z_min >= self.z_start && z_max <= self.z_stop
    }
}

impl TissueRegion for LayerTissueRegion {
    fn name(&self) -> &'static str {
        "layer"
    }

    fn center(&self) -> Point3f {
        let z = match (self.z_start.is_finite(), self.z_stop.is_finite()) {
            (true, true) => 0.5 * (self.z_start + self.z_stop),
            (true, false) => self.z_start,
            (false, true) => self.z_stop,
            (false, false) => 0.0
        };
        Point3f::new(0.0, 0.0, z)
    }

    fn optical_properties(&self) -> &OpticalProperties {
        &self.ops
    }

    fn contains_position(&self, p: &Point3f) -> bool {
        p.z >= self.z_start && p.z < self.z_stop
    }

    fn on_boundary(&self, p: &Point3f) -> bool {
        (p.z - self.z_start).abs() < PLANE_TOLERANCE || (p.z - self.z_stop).abs() < PLANE_TOLERANCE
    }

    fn ray_intersect_boundary(&self, ray: &Ray) -> Float {
        if ray.d.z > 0.0 {
            distance_to_plane(ray.o.z, ray.d.z, self.z_stop)
        } else if ray.d.z < 0.0 {
            distance_to_plane(ray.o.z, ray.d.z, self.z_start)
        } else {
            Float::INFINITY
        }
    }

    fn surface_normal(&self, p: &Point3f) -> Vector3f {
        if (p.z - self.z_stop).abs() < (p.z - self.z_start).abs() {
            Vector3f::new(0.0, 0.0, 1.0)
        } else {
            Vector3f::new(0.0, 0.0, -1.0)
        }
    }

    fn z_extent(&self) -> (Float, Float) {
        (self.z_start, self.z_stop)
    }

    fn validate_dimensions(&self) -> Result<(), ConfigurationError> {
        Ok(())
    }
}

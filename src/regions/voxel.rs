use crate::core::mc::{Float, nearest_forward_root, consts::ON_BOUNDARY_TOLERANCE};
use crate::core::region::{TissueRegion, slab_interval, overlap, positive_dimension};
use crate::core::geometry::{Point3f, Vector3f, Ray};
use crate::core::optical_properties::OpticalProperties;
use crate::core::error::ConfigurationError;

/// Axis aligned box given by its x, y and z ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelTissueRegion {
    pub x: (Float, Float),
    pub y: (Float, Float),
    pub z: (Float, Float),
    pub ops: OpticalProperties
}

impl VoxelTissueRegion {
    pub fn new(x: (Float, Float), y: (Float, Float), z: (Float, Float), ops: OpticalProperties) -> VoxelTissueRegion {
        VoxelTissueRegion { x, y, z, ops }
    }

    #[inline]
    fn range(&self, axis: usize) -> (Float, Float) {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z
        }
    }
}

impl TissueRegion for VoxelTissueRegion {
    fn name(&self) -> &'static str {
        "voxel"
    }

    fn center(&self) -> Point3f {
        Point3f::new(
            0.5 * (self.x.0 + self.x.1),
            0.5 * (self.y.0 + self.y.1),
            0.5 * (self.z.0 + self.z.1)
        )
    }

    fn optical_properties(&self) -> &OpticalProperties {
        &self.ops
    }

    fn contains_position(&self, p: &Point3f) -> bool {
        (0..3).all(|i| {
            let (lo, hi) = self.range(i);
            p[i] >= lo && p[i] <= hi
        })
    }

    fn on_boundary(&self, p: &Point3f) -> bool {
        let within = (0..3).all(|i| {
            let (lo, hi) = self.range(i);
            p[i] >= lo - ON_BOUNDARY_TOLERANCE && p[i] <= hi + ON_BOUNDARY_TOLERANCE
        });
        within && (0..3).any(|i| {
            let (lo, hi) = self.range(i);
            (p[i] - lo).abs() < ON_BOUNDARY_TOLERANCE || (p[i] - hi).abs() < ON_BOUNDARY_TOLERANCE
        })
    }

    fn ray_intersect_boundary(&self, ray: &Ray) -> Float {
        let mut interval = Some((Float::NEG_INFINITY, Float::INFINITY));
        for i in 0..3 {
            let (lo, hi) = self.range(i);
            interval = overlap(interval, slab_interval(ray.o[i], ray.d[i], lo, hi));
        }
        match interval {
            Some((t0, t1)) => nearest_forward_root(t0, t1),
            None => Float::INFINITY
        }
    }

    fn surface_normal(&self, p: &Point3f) -> Vector3f {
        let mut best = (Float::INFINITY, Vector3f::new(0.0, 0.0, 1.0));
        for i in 0..3 {
            let (lo, hi) = self.range(i);
            for &(face, sign) in &[(lo, -1.0), (hi, 1.0)] {
                let d = (p[i] - face).abs();
                if d < best.0 {
                    let mut n = Vector3f::zero();
                    n[i] = sign;
                    best = (d, n);
                }
            }
        }
        best.1
    }

    fn z_extent(&self) -> (Float, Float) {
        self.z
    }

    fn validate_dimensions(&self) -> Result<(), ConfigurationError> {
        positive_dimension(self.name(), "x extent", self.x.1 - self.x.0)?;
        positive_dimension(self.name(), "y extent", self.y.1 - self.y.0)?;
        positive_dimension(self.name(), "z extent", self.z.1 - self.z.0)
    }
}

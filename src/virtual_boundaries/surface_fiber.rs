use crate::core::mc::{Float, consts::PLANE_TOLERANCE};
use crate::core::geometry::Point3f;
use crate::core::photon::{PhotonDataPoint, BoundaryProbe};
use crate::core::virtual_boundary::{VirtualBoundary, VirtualBoundaryType, DetectorController};

/// The disk footprint of a fiber lying on the top surface.
#[derive(Debug)]
pub struct SurfaceFiberVirtualBoundary {
    pub center: Point3f,
    pub radius: Float,
    pub z_plane: Float,
    controller: DetectorController
}

impl SurfaceFiberVirtualBoundary {
    pub fn new(center: Point3f, radius: Float, z_plane: Float) -> SurfaceFiberVirtualBoundary {
        SurfaceFiberVirtualBoundary { center, radius, z_plane, controller: DetectorController::new() }
    }

    fn in_footprint(&self, p: &Point3f) -> bool {
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

impl VirtualBoundary for SurfaceFiberVirtualBoundary {
    fn vb_type(&self) -> VirtualBoundaryType {
        VirtualBoundaryType::SurfaceFiber
    }

    fn will_hit_boundary(&self, dp: &PhotonDataPoint, probe: BoundaryProbe) -> bool {
        probe == BoundaryProbe::ReflectedTissueBoundary
            && dp.direction.z < 0.0
            && (dp.position.z - self.z_plane).abs() < PLANE_TOLERANCE
            && self.in_footprint(&dp.position)
    }

    fn get_distance_to_virtual_boundary(&self, dp: &PhotonDataPoint, probe: BoundaryProbe) -> Float {
        if !self.will_hit_boundary(dp, probe) {
            return Float::INFINITY;
        }
        (dp.position.z - self.z_plane).abs() / dp.direction.z.abs()
    }

    fn detector_controller(&self) -> &DetectorController {
        &self.controller
    }

    fn detector_controller_mut(&mut self) -> &mut DetectorController {
        &mut self.controller
    }

    fn fork(&self) -> Box<dyn VirtualBoundary> {
        Box::new(SurfaceFiberVirtualBoundary {
            center: self.center,
            radius: self.radius,
            z_plane: self.z_plane,
            controller: self.controller.fork()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vector3f;

    #[test]
    fn test_footprint() {
        let vb = SurfaceFiberVirtualBoundary::new(Point3f::new(3.0, 0.0, 0.0), 0.5, 0.0);
        let up = Vector3f::new(0.0, 0.0, -1.0);
        let inside = PhotonDataPoint::new(Point3f::new(3.2, 0.3, 0.0), up, 1.0, 3);
        let outside = PhotonDataPoint::new(Point3f::new(0.0, 0.0, 0.0), up, 1.0, 3);
        assert!(vb.will_hit_boundary(&inside, BoundaryProbe::ReflectedTissueBoundary));
        assert!(!vb.will_hit_boundary(&outside, BoundaryProbe::ReflectedTissueBoundary));
        assert!(vb.get_distance_to_virtual_boundary(&outside, BoundaryProbe::ReflectedTissueBoundary).is_infinite());
    }
}

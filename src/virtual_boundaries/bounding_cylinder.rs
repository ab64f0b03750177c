use crate::core::mc::{Float, consts::ON_BOUNDARY_TOLERANCE};
use crate::core::geometry::Vector3f;
use crate::core::photon::{PhotonDataPoint, BoundaryProbe};
use crate::core::virtual_boundary::{VirtualBoundary, VirtualBoundaryType, DetectorController};
use crate::regions::CylinderTissueRegion;

/// The lateral wall of a bounding cylinder tissue.
#[derive(Debug)]
pub struct BoundingCylinderVirtualBoundary {
    cylinder: CylinderTissueRegion,
    controller: DetectorController
}

impl BoundingCylinderVirtualBoundary {
    pub fn new(cylinder: &CylinderTissueRegion) -> BoundingCylinderVirtualBoundary {
        BoundingCylinderVirtualBoundary { cylinder: cylinder.clone(), controller: DetectorController::new() }
    }
}

impl VirtualBoundary for BoundingCylinderVirtualBoundary {
    fn vb_type(&self) -> VirtualBoundaryType {
        VirtualBoundaryType::BoundingCylinder
    }

    fn will_hit_boundary(&self, dp: &PhotonDataPoint, probe: BoundaryProbe) -> bool {
        if probe != BoundaryProbe::BoundingVolumeTissueBoundary {
            return false;
        }
        let c = &self.cylinder;
        let outward = Vector3f::new(dp.position.x - c.center.x, dp.position.y - c.center.y, 0.0);
        (c.radial_distance(&dp.position) - c.radius).abs() < ON_BOUNDARY_TOLERANCE
            && outward.dot(&dp.direction) > 0.0
    }

    fn get_distance_to_virtual_boundary(&self, dp: &PhotonDataPoint, probe: BoundaryProbe) -> Float {
        if self.will_hit_boundary(dp, probe) { 0.0 } else { Float::INFINITY }
    }

    fn detector_controller(&self) -> &DetectorController {
        &self.controller
    }

    fn detector_controller_mut(&mut self) -> &mut DetectorController {
        &mut self.controller
    }

    fn fork(&self) -> Box<dyn VirtualBoundary> {
        Box::new(BoundingCylinderVirtualBoundary { cylinder: self.cylinder.clone(), controller: self.controller.fork() })
    }
}

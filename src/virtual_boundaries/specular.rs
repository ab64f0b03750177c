use crate::core::mc::Float;
use crate::core::photon::{PhotonDataPoint, BoundaryProbe};
use crate::core::virtual_boundary::{VirtualBoundary, VirtualBoundaryType, DetectorController};

/// Receives the specularly reflected part of a photon at launch.
#[derive(Debug)]
pub struct SpecularVirtualBoundary {
    controller: DetectorController
}

impl SpecularVirtualBoundary {
    pub fn new() -> SpecularVirtualBoundary {
        SpecularVirtualBoundary { controller: DetectorController::new() }
    }
}

impl VirtualBoundary for SpecularVirtualBoundary {
    fn vb_type(&self) -> VirtualBoundaryType {
        VirtualBoundaryType::SpecularReflectance
    }

    fn will_hit_boundary(&self, _dp: &PhotonDataPoint, probe: BoundaryProbe) -> bool {
        probe == BoundaryProbe::SpecularTissueBoundary
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
        Box::new(SpecularVirtualBoundary { controller: self.controller.fork() })
    }
}

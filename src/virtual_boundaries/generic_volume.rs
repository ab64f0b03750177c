use crate::core::mc::Float;
use crate::core::photon::{PhotonDataPoint, BoundaryProbe};
use crate::core::virtual_boundary::{VirtualBoundary, VirtualBoundaryType, DetectorController};

/// The whole tissue volume. Never crossed; its detectors read complete
/// photon histories.
#[derive(Debug)]
pub struct GenericVolumeVirtualBoundary {
    controller: DetectorController
}

impl GenericVolumeVirtualBoundary {
    pub fn new() -> GenericVolumeVirtualBoundary {
        GenericVolumeVirtualBoundary { controller: DetectorController::new() }
    }
}

impl VirtualBoundary for GenericVolumeVirtualBoundary {
    fn vb_type(&self) -> VirtualBoundaryType {
        VirtualBoundaryType::GenericVolume
    }

    fn will_hit_boundary(&self, _dp: &PhotonDataPoint, _probe: BoundaryProbe) -> bool {
        false
    }

    fn get_distance_to_virtual_boundary(&self, _dp: &PhotonDataPoint, _probe: BoundaryProbe) -> Float {
        Float::INFINITY
    }

    fn detector_controller(&self) -> &DetectorController {
        &self.controller
    }

    fn detector_controller_mut(&mut self) -> &mut DetectorController {
        &mut self.controller
    }

    fn fork(&self) -> Box<dyn VirtualBoundary> {
        Box::new(GenericVolumeVirtualBoundary { controller: self.controller.fork() })
    }
}

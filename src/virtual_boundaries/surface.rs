use crate::core::mc::{Float, consts::PLANE_TOLERANCE};
use crate::core::photon::{PhotonDataPoint, BoundaryProbe};
use crate::core::virtual_boundary::{VirtualBoundary, VirtualBoundaryType, DetectorController};

/// A plane of constant z that photons leave the tissue through.
#[derive(Debug)]
pub struct PlanarVirtualBoundary {
    vb_type: VirtualBoundaryType,
    pub z_plane: Float,
    expected_probe: BoundaryProbe,
    /// Sign of the z direction of photons crossing the plane.
    direction_sign: Float,
    controller: DetectorController
}

impl PlanarVirtualBoundary {
    /// The top surface, crossed upwards.
    pub fn diffuse_reflectance(z_top: Float) -> PlanarVirtualBoundary {
        PlanarVirtualBoundary {
            vb_type: VirtualBoundaryType::DiffuseReflectance,
            z_plane: z_top,
            expected_probe: BoundaryProbe::ReflectedTissueBoundary,
            direction_sign: -1.0,
            controller: DetectorController::new()
        }
    }

    /// The bottom surface, crossed downwards.
    pub fn diffuse_transmittance(z_bottom: Float) -> PlanarVirtualBoundary {
        PlanarVirtualBoundary {
            vb_type: VirtualBoundaryType::DiffuseTransmittance,
            z_plane: z_bottom,
            expected_probe: BoundaryProbe::TransmittedTissueBoundary,
            direction_sign: 1.0,
            controller: DetectorController::new()
        }
    }
}

impl VirtualBoundary for PlanarVirtualBoundary {
    fn vb_type(&self) -> VirtualBoundaryType {
        self.vb_type
    }

    fn will_hit_boundary(&self, dp: &PhotonDataPoint, probe: BoundaryProbe) -> bool {
        probe == self.expected_probe
            && dp.direction.z * self.direction_sign > 0.0
            && (dp.position.z - self.z_plane).abs() < PLANE_TOLERANCE
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
        Box::new(PlanarVirtualBoundary {
            vb_type: self.vb_type,
            z_plane: self.z_plane,
            expected_probe: self.expected_probe,
            direction_sign: self.direction_sign,
            controller: self.controller.fork()
        })
    }
}

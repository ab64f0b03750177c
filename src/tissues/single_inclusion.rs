use crate::core::mc::{Float, consts::ON_BOUNDARY_TOLERANCE};
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::region::TissueRegion;
use crate::core::tissue::{Tissue, InclusionRegion};
use crate::core::photon::{PhotonDataPoint, BoundaryProbe};
use crate::core::error::ConfigurationError;
use crate::regions::LayerTissueRegion;
use super::multi_layer::{LayerStack, plane_normal};

/// Layers with one embedded primitive. The inclusion takes the region index
/// after the last layer.
#[derive(Debug, Clone)]
pub struct SingleInclusionTissue {
    pub stack: LayerStack,
    pub inclusion: InclusionRegion,
    /// Layer the inclusion lies in.
    pub host_index: usize
}

impl SingleInclusionTissue {
    pub fn new(layers: Vec<LayerTissueRegion>, inclusion: InclusionRegion) -> Result<SingleInclusionTissue, ConfigurationError> {
        let host_index = SingleInclusionTissue::validate(&layers, &inclusion)?;
        let stack = LayerStack { layers };
        info!("Created single inclusion tissue: {} in layer {}", inclusion.as_region().name(), host_index);
        Ok(SingleInclusionTissue { stack, inclusion, host_index })
    }

    /// Validate and return the index of the host layer.
    pub fn validate(layers: &[LayerTissueRegion], inclusion: &InclusionRegion) -> Result<usize, ConfigurationError> {
        LayerStack::validate(layers)?;
        if let InclusionRegion::InfiniteCylinder(c) = inclusion {
            if !c.is_horizontal() {
                return Err(ConfigurationError::InclusionAxisNotHorizontal { region: c.name().to_string() });
            }
        }
        host_layer_of(layers, inclusion.as_region(), layers.len())
    }

    #[inline]
    fn inclusion_index(&self) -> usize {
        self.stack.len()
    }

    /// Layer entered when a photon inside an inclusion that touches a host
    /// interface leaves through that interface.
    fn leaving_host(&self, dp: &PhotonDataPoint) -> Option<usize> {
        let host = &self.stack.layers[self.host_index];
        let through_top = dp.direction.z < 0.0 && (dp.position.z - host.z_start).abs() < ON_BOUNDARY_TOLERANCE;
        let through_bottom = dp.direction.z > 0.0 && (dp.position.z - host.z_stop).abs() < ON_BOUNDARY_TOLERANCE;
        if through_top || through_bottom {
            Some(self.stack.neighbor(dp, self.host_index))
        } else {
            None
        }
    }

    /// A photon crossing a layer interface into the host lands inside the
    /// inclusion when the inclusion sits on that interface.
    fn entering_through_interface(&self, dp: &PhotonDataPoint, region: usize, neighbor: usize) -> bool {
        if neighbor != self.host_index || self.stack.interface(region, neighbor).is_none() {
            return false;
        }
        let mut p = dp.position;
        self.stack.snap(&mut p, region, neighbor);
        self.inclusion.as_region().contains_position(&p)
    }

    fn inclusion_distance(&self, dp: &PhotonDataPoint) -> Float {
        self.inclusion.as_region().ray_intersect_boundary(&dp.ray())
    }
}

/// Check an embedded primitive against the layers and return its host layer.
pub(crate) fn host_layer_of(layers: &[LayerTissueRegion], region: &dyn TissueRegion, index: usize) -> Result<usize, ConfigurationError> {
    region.validate_dimensions()?;
    region.optical_properties().validate(index)?;
    let (z_min, z_max) = region.z_extent();
    let stack = LayerStack { layers: layers.to_vec() };
    let host = stack.host_layer(z_min, z_max).ok_or_else(|| ConfigurationError::InclusionNotContained {
        region: region.name().to_string(),
        z_min,
        z_max
    })?;
    let host_n = layers[host].ops.n;
    let inclusion_n = region.optical_properties().n;
    if host_n != inclusion_n {
        return Err(ConfigurationError::RefractiveIndexMismatch {
            region: region.name().to_string(),
            inclusion_n,
            host_n
        });
    }
    Ok(host)
}

impl Tissue for SingleInclusionTissue {
    fn name(&self) -> &'static str {
        "single inclusion"
    }

    fn region_count(&self) -> usize {
        self.stack.len() + 1
    }

    fn region(&self, index: usize) -> &dyn TissueRegion {
        if index == self.inclusion_index() {
            self.inclusion.as_region()
        } else {
            &self.stack.layers[index]
        }
    }

    fn get_region_index(&self, p: &Point3f) -> usize {
        if self.inclusion.as_region().contains_position(p) {
            self.inclusion_index()
        } else {
            self.stack.index_of(p)
        }
    }

    fn get_distance_to_boundary(&self, dp: &PhotonDataPoint, region: usize) -> Float {
        let to_inclusion = self.inclusion_distance(dp);
        if region == self.inclusion_index() {
            to_inclusion
        } else if region == self.host_index {
            self.stack.distance_to_boundary(dp, region).min(to_inclusion)
        } else {
            self.stack.distance_to_boundary(dp, region)
        }
    }

    fn get_neighbor_region_index(&self, dp: &PhotonDataPoint, region: usize) -> usize {
        if region == self.inclusion_index() {
            return self.leaving_host(dp).unwrap_or(self.host_index);
        }
        if region == self.host_index && self.inclusion.as_region().on_boundary(&dp.position) {
            return self.inclusion_index();
        }
        let neighbor = self.stack.neighbor(dp, region);
        if self.entering_through_interface(dp, region, neighbor) {
            self.inclusion_index()
        } else {
            neighbor
        }
    }

    fn get_boundary_normal(&self, dp: &PhotonDataPoint, region: usize, neighbor: usize) -> Vector3f {
        let crosses_layer = (region == self.inclusion_index() && self.stack.interface(self.host_index, neighbor).is_some())
            || (neighbor == self.inclusion_index() && self.stack.interface(region, self.host_index).is_some());
        if crosses_layer {
            plane_normal()
        } else if region == self.inclusion_index() || neighbor == self.inclusion_index() {
            self.inclusion.as_region().surface_normal(&dp.position)
        } else {
            plane_normal()
        }
    }

    fn snap_to_boundary(&self, p: &mut Point3f, region: usize, neighbor: usize) {
        let region = if region == self.inclusion_index() { self.host_index } else { region };
        let neighbor = if neighbor == self.inclusion_index() { self.host_index } else { neighbor };
        self.stack.snap(p, region, neighbor);
    }

    fn exit_probe(&self, neighbor: usize) -> BoundaryProbe {
        if neighbor == self.inclusion_index() {
            BoundaryProbe::None
        } else {
            self.stack.exit_probe(neighbor)
        }
    }

    fn z_top(&self) -> Float {
        self.stack.z_top()
    }

    fn z_bottom(&self) -> Float {
        self.stack.z_bottom()
    }
}

use crate::core::mc::Float;
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::region::TissueRegion;
use crate::core::tissue::Tissue;
use crate::core::photon::{PhotonDataPoint, BoundaryProbe};
use crate::core::error::ConfigurationError;
use crate::regions::{LayerTissueRegion, InfiniteCylinderTissueRegion};
use super::multi_layer::{LayerStack, plane_normal};
use super::single_inclusion::host_layer_of;

/// Layers with a nest of infinite cylinders sharing one axis, e.g. a vessel
/// wall around its lumen. Cylinders follow the layers in the region indices,
/// outermost first.
#[derive(Debug, Clone)]
pub struct MultiConcentricInfiniteCylinderTissue {
    pub stack: LayerStack,
    pub cylinders: Vec<InfiniteCylinderTissueRegion>,
    pub host_index: usize
}

impl MultiConcentricInfiniteCylinderTissue {
    pub fn new(layers: Vec<LayerTissueRegion>, cylinders: Vec<InfiniteCylinderTissueRegion>)
        -> Result<MultiConcentricInfiniteCylinderTissue, ConfigurationError>
    {
        let host_index = MultiConcentricInfiniteCylinderTissue::validate(&layers, &cylinders)?;
        info!("Created {} concentric infinite cylinders in layer {}", cylinders.len(), host_index);
        Ok(MultiConcentricInfiniteCylinderTissue { stack: LayerStack { layers }, cylinders, host_index })
    }

    /// Validate and return the index of the host layer.
    pub fn validate(layers: &[LayerTissueRegion], cylinders: &[InfiniteCylinderTissueRegion]) -> Result<usize, ConfigurationError> {
        LayerStack::validate(layers)?;
        let outer = match cylinders.first() {
            Some(c) => c,
            None => return Err(ConfigurationError::NoConcentricCylinders)
        };
        if !outer.is_horizontal() {
            return Err(ConfigurationError::InclusionAxisNotHorizontal { region: outer.name().to_string() });
        }
        let host = host_layer_of(layers, outer, layers.len())?;
        for (i, pair) in cylinders.windows(2).enumerate() {
            let index = i + 1;
            let inner = &pair[1];
            if inner.center != outer.center || inner.axis != outer.axis {
                return Err(ConfigurationError::ConcentricCenterMismatch { index });
            }
            if !(inner.radius < pair[0].radius) {
                return Err(ConfigurationError::ConcentricRadiusOrder { index, radius: inner.radius, outer_radius: pair[0].radius });
            }
            host_layer_of(layers, inner, layers.len() + index)?;
        }
        Ok(host)
    }

    /// Region index of cylinder `k`.
    #[inline]
    fn cylinder_index(&self, k: usize) -> usize {
        self.stack.len() + k
    }

    /// Position in the nest of a region index, if it is a cylinder.
    #[inline]
    fn nest_level(&self, region: usize) -> Option<usize> {
        if region >= self.stack.len() { Some(region - self.stack.len()) } else { None }
    }

    fn cylinder_distance(&self, dp: &PhotonDataPoint, k: usize) -> Float {
        match self.cylinders.get(k) {
            Some(c) => c.ray_intersect_boundary(&dp.ray()),
            None => Float::INFINITY
        }
    }
}

impl Tissue for MultiConcentricInfiniteCylinderTissue {
    fn name(&self) -> &'static str {
        "multi concentric infinite cylinder"
    }

    fn region_count(&self) -> usize {
        self.stack.len() + self.cylinders.len()
    }

    fn region(&self, index: usize) -> &dyn TissueRegion {
        match self.nest_level(index) {
            Some(k) => &self.cylinders[k],
            None => &self.stack.layers[index]
        }
    }

    fn get_region_index(&self, p: &Point3f) -> usize {
        // innermost containing cylinder wins
        match self.cylinders.iter().rposition(|c| c.contains_position(p)) {
            Some(k) => self.cylinder_index(k),
            None => self.stack.index_of(p)
        }
    }

    fn get_distance_to_boundary(&self, dp: &PhotonDataPoint, region: usize) -> Float {
        match self.nest_level(region) {
            Some(k) => self.cylinder_distance(dp, k).min(self.cylinder_distance(dp, k + 1)),
            None if region == self.host_index => {
                self.stack.distance_to_boundary(dp, region).min(self.cylinder_distance(dp, 0))
            }
            None => self.stack.distance_to_boundary(dp, region)
        }
    }

    fn get_neighbor_region_index(&self, dp: &PhotonDataPoint, region: usize) -> usize {
        match self.nest_level(region) {
            Some(k) => {
                let into_inner = self.cylinders.get(k + 1).map_or(false, |c| c.on_boundary(&dp.position));
                if into_inner {
                    self.cylinder_index(k + 1)
                } else if k == 0 {
                    self.host_index
                } else {
                    self.cylinder_index(k - 1)
                }
            }
            None if region == self.host_index && self.cylinders[0].on_boundary(&dp.position) => self.cylinder_index(0),
            None => self.stack.neighbor(dp, region)
        }
    }

    fn get_boundary_normal(&self, dp: &PhotonDataPoint, region: usize, neighbor: usize) -> Vector3f {
        // the crossed wall is the one of the more deeply nested side
        let level = match (self.nest_level(region), self.nest_level(neighbor)) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None
        };
        match level {
            Some(k) => self.cylinders[k].surface_normal(&dp.position),
            None => plane_normal()
        }
    }

    fn snap_to_boundary(&self, p: &mut Point3f, region: usize, neighbor: usize) {
        self.stack.snap(p, region, neighbor);
    }

    fn exit_probe(&self, neighbor: usize) -> BoundaryProbe {
        match self.nest_level(neighbor) {
            Some(_) => BoundaryProbe::None,
            None => self.stack.exit_probe(neighbor)
        }
    }

    fn z_top(&self) -> Float {
        self.stack.z_top()
    }

    fn z_bottom(&self) -> Float {
        self.stack.z_bottom()
    }
}

use crate::core::mc::{Float, consts::ON_BOUNDARY_TOLERANCE};
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::region::TissueRegion;
use crate::core::tissue::Tissue;
use crate::core::photon::{PhotonDataPoint, BoundaryProbe};
use crate::core::error::ConfigurationError;
use crate::regions::{LayerTissueRegion, CylinderTissueRegion};
use super::multi_layer::{LayerStack, plane_normal};

/// Layers cut laterally by a vertical cylinder. The medium outside the wall
/// takes the region index after the last layer and carries the cylinder's
/// optical properties; photons reaching it leave the tissue.
#[derive(Debug, Clone)]
pub struct BoundingCylinderTissue {
    pub stack: LayerStack,
    pub cylinder: CylinderTissueRegion
}

impl BoundingCylinderTissue {
    pub fn new(layers: Vec<LayerTissueRegion>, cylinder: CylinderTissueRegion) -> Result<BoundingCylinderTissue, ConfigurationError> {
        BoundingCylinderTissue::validate(&layers, &cylinder)?;
        info!("Created bounding cylinder tissue, radius {}", cylinder.radius);
        Ok(BoundingCylinderTissue { stack: LayerStack { layers }, cylinder })
    }

    /// The cylinder must span the tissue layers exactly.
    pub fn validate(layers: &[LayerTissueRegion], cylinder: &CylinderTissueRegion) -> Result<(), ConfigurationError> {
        LayerStack::validate(layers)?;
        cylinder.validate_dimensions()?;
        cylinder.ops.validate(layers.len())?;
        let stack = LayerStack { layers: layers.to_vec() };
        if cylinder.z_min() != stack.z_top() || cylinder.z_max() != stack.z_bottom() {
            return Err(ConfigurationError::BoundingCylinderMismatch {
                reason: format!("cylinder spans [{}, {}], tissue spans [{}, {}]",
                    cylinder.z_min(), cylinder.z_max(), stack.z_top(), stack.z_bottom())
            });
        }
        Ok(())
    }

    #[inline]
    fn outside_index(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    fn is_inner_layer(&self, region: usize) -> bool {
        region > 0 && region < self.stack.last_index()
    }

    fn on_wall(&self, p: &Point3f) -> bool {
        (self.cylinder.radial_distance(p) - self.cylinder.radius).abs() < ON_BOUNDARY_TOLERANCE
    }
}

impl Tissue for BoundingCylinderTissue {
    fn name(&self) -> &'static str {
        "bounding cylinder"
    }

    fn region_count(&self) -> usize {
        self.stack.len() + 1
    }

    fn region(&self, index: usize) -> &dyn TissueRegion {
        if index == self.outside_index() {
            &self.cylinder
        } else {
            &self.stack.layers[index]
        }
    }

    fn get_region_index(&self, p: &Point3f) -> usize {
        let layer = self.stack.index_of(p);
        if self.is_inner_layer(layer) && self.cylinder.radial_distance(p) > self.cylinder.radius {
            self.outside_index()
        } else {
            layer
        }
    }

    fn get_distance_to_boundary(&self, dp: &PhotonDataPoint, region: usize) -> Float {
        let to_layer = self.stack.distance_to_boundary(dp, region);
        if self.is_inner_layer(region) {
            let to_wall = self.cylinder.ray_intersect_boundary(&dp.ray());
            to_layer.min(to_wall)
        } else {
            to_layer
        }
    }

    fn get_neighbor_region_index(&self, dp: &PhotonDataPoint, region: usize) -> usize {
        if self.is_inner_layer(region) && self.on_wall(&dp.position) {
            let outward = Vector3f::new(
                dp.position.x - self.cylinder.center.x,
                dp.position.y - self.cylinder.center.y,
                0.0
            );
            if outward.dot(&dp.direction) > 0.0 {
                return self.outside_index();
            }
        }
        self.stack.neighbor(dp, region)
    }

    fn get_boundary_normal(&self, dp: &PhotonDataPoint, _region: usize, neighbor: usize) -> Vector3f {
        if neighbor == self.outside_index() {
            Vector3f::new(
                dp.position.x - self.cylinder.center.x,
                dp.position.y - self.cylinder.center.y,
                0.0
            ).normalize()
        } else {
            plane_normal()
        }
    }

    fn snap_to_boundary(&self, p: &mut Point3f, region: usize, neighbor: usize) {
        self.stack.snap(p, region, neighbor);
    }

    fn exit_probe(&self, neighbor: usize) -> BoundaryProbe {
        if neighbor == self.outside_index() {
            BoundaryProbe::BoundingVolumeTissueBoundary
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

    fn bounding_cylinder(&self) -> Option<&CylinderTissueRegion> {
        Some(&self.cylinder)
    }
}

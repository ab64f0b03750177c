use crate::core::mc::Float;
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::region::TissueRegion;
use crate::core::tissue::Tissue;
use crate::core::photon::{PhotonDataPoint, BoundaryProbe};
use crate::core::error::ConfigurationError;
use crate::regions::LayerTissueRegion;

/// Layers ordered by depth, shared by every tissue kind. The first and last
/// layers are the semi-infinite ambient media around the tissue.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStack {
    pub layers: Vec<LayerTissueRegion>
}

impl LayerStack {
    /// Ambient above, at least one tissue layer, ambient below.
    pub const MIN_LAYERS: usize = 3;

    pub fn new(layers: Vec<LayerTissueRegion>) -> Result<LayerStack, ConfigurationError> {
        LayerStack::validate(&layers)?;
        Ok(LayerStack { layers })
    }

    pub fn validate(layers: &[LayerTissueRegion]) -> Result<(), ConfigurationError> {
        if layers.len() < LayerStack::MIN_LAYERS {
            return Err(ConfigurationError::TooFewLayers { required: LayerStack::MIN_LAYERS, found: layers.len() });
        }
        for (index, layer) in layers.iter().enumerate() {
            if !(layer.z_stop > layer.z_start) {
                return Err(ConfigurationError::InvalidLayerRange { index, start: layer.z_start, stop: layer.z_stop });
            }
            layer.ops.validate(index)?;
        }
        for (upper, pair) in layers.windows(2).enumerate() {
            if pair[0].z_stop != pair[1].z_start {
                return Err(ConfigurationError::LayersNotContiguous {
                    upper,
                    lower: upper + 1,
                    upper_stop: pair[0].z_stop,
                    lower_start: pair[1].z_start
                });
            }
        }
        let last = layers.len() - 1;
        if layers[0].z_start != Float::NEG_INFINITY || layers[last].z_stop != Float::INFINITY {
            return Err(ConfigurationError::LayersNotCovering { start: layers[0].z_start, stop: layers[last].z_stop });
        }
        for &index in &[0, last] {
            if !layers[index].ops.is_ambient() {
                return Err(ConfigurationError::OuterLayerNotAmbient { index });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn last_index(&self) -> usize {
        self.layers.len() - 1
    }

    #[inline]
    pub fn is_layer(&self, index: usize) -> bool {
        index < self.layers.len()
    }

    pub fn z_top(&self) -> Float {
        self.layers[0].z_stop
    }

    pub fn z_bottom(&self) -> Float {
        self.layers[self.last_index()].z_start
    }

    /// Layer containing the depth of `p`. Interfaces belong to the deeper layer.
    pub fn index_of(&self, p: &Point3f) -> usize {
        self.layers.iter()
            .position(|l| l.contains_position(p))
            .unwrap_or_else(|| if p.z < self.z_top() { 0 } else { self.last_index() })
    }

    /// The single tissue layer holding a z range, if any. Ambient layers
    /// never host anything.
    pub fn host_layer(&self, z_min: Float, z_max: Float) -> Option<usize> {
        (1..self.last_index()).find(|&i| self.layers[i].contains_z_extent(z_min, z_max))
    }

    pub fn distance_to_boundary(&self, dp: &PhotonDataPoint, layer: usize) -> Float {
        self.layers[layer].ray_intersect_boundary(&dp.ray())
    }

    /// Next layer in the direction of travel.
    pub fn neighbor(&self, dp: &PhotonDataPoint, layer: usize) -> usize {
        if dp.direction.z < 0.0 {
            layer.saturating_sub(1)
        } else {
            (layer + 1).min(self.last_index())
        }
    }

    /// Depth of the interface shared by two adjacent layers.
    pub fn interface(&self, a: usize, b: usize) -> Option<Float> {
        if !self.is_layer(a) || !self.is_layer(b) {
            return None;
        }
        if b == a + 1 {
            Some(self.layers[a].z_stop)
        } else if a == b + 1 {
            Some(self.layers[a].z_start)
        } else {
            None
        }
    }

    pub fn snap(&self, p: &mut Point3f, a: usize, b: usize) {
        if let Some(z) = self.interface(a, b) {
            p.z = z;
        }
    }

    pub fn exit_probe(&self, neighbor: usize) -> BoundaryProbe {
        if neighbor == 0 {
            BoundaryProbe::ReflectedTissueBoundary
        } else if neighbor == self.last_index() {
            BoundaryProbe::TransmittedTissueBoundary
        } else {
            BoundaryProbe::None
        }
    }
}

/// Normal of a horizontal interface.
#[inline]
pub fn plane_normal() -> Vector3f {
    Vector3f::new(0.0, 0.0, 1.0)
}

/// Laterally infinite stack of layers.
#[derive(Debug, Clone)]
pub struct MultiLayerTissue {
    pub stack: LayerStack
}

impl MultiLayerTissue {
    pub fn new(layers: Vec<LayerTissueRegion>) -> Result<MultiLayerTissue, ConfigurationError> {
        let stack = LayerStack::new(layers)?;
        info!("Created multi-layer tissue with {} layers, top {} bottom {}",
            stack.len(), stack.z_top(), stack.z_bottom());
        Ok(MultiLayerTissue { stack })
    }

    pub fn validate(layers: &[LayerTissueRegion]) -> Result<(), ConfigurationError> {
        LayerStack::validate(layers)
    }
}

impl Tissue for MultiLayerTissue {
    fn name(&self) -> &'static str {
        "multi-layer"
    }

    fn region_count(&self) -> usize {
        self.stack.len()
    }

    fn region(&self, index: usize) -> &dyn TissueRegion {
        &self.stack.layers[index]
    }

    fn get_region_index(&self, p: &Point3f) -> usize {
        self.stack.index_of(p)
    }

    fn get_distance_to_boundary(&self, dp: &PhotonDataPoint, region: usize) -> Float {
        self.stack.distance_to_boundary(dp, region)
    }

    fn get_neighbor_region_index(&self, dp: &PhotonDataPoint, region: usize) -> usize {
        self.stack.neighbor(dp, region)
    }

    fn get_boundary_normal(&self, _dp: &PhotonDataPoint, _region: usize, _neighbor: usize) -> Vector3f {
        plane_normal()
    }

    fn snap_to_boundary(&self, p: &mut Point3f, region: usize, neighbor: usize) {
        self.stack.snap(p, region, neighbor);
    }

    fn exit_probe(&self, neighbor: usize) -> BoundaryProbe {
        self.stack.exit_probe(neighbor)
    }

    fn z_top(&self) -> Float {
        self.stack.z_top()
    }

    fn z_bottom(&self) -> Float {
        self.stack.z_bottom()
    }
}

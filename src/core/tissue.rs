//! The tissue model: an ordered set of regions with containment and boundary
//! queries, plus the input description a tissue is validated and built from.
use std::fmt;
use super::mc::Float;
use super::geometry::{Point3f, Vector3f};
use super::optical_properties::OpticalProperties;
use super::region::TissueRegion;
use super::photon::{PhotonDataPoint, BoundaryProbe};
use super::error::ConfigurationError;
use crate::regions::{LayerTissueRegion, CylinderTissueRegion, InfiniteCylinderTissueRegion,
    EllipsoidTissueRegion, VoxelTissueRegion};
use crate::tissues::{MultiLayerTissue, SingleInclusionTissue, MultiConcentricInfiniteCylinderTissue,
    BoundingCylinderTissue};

/// Interface the transport stepper uses to query a tissue. Region indices are
/// stable for the lifetime of the tissue and index the collision info of
/// every photon.
pub trait Tissue: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn region_count(&self) -> usize;

    fn region(&self, index: usize) -> &dyn TissueRegion;

    /// Optical properties of every region, by index.
    fn optical_properties(&self) -> Vec<OpticalProperties> {
        (0..self.region_count()).map(|i| *self.region(i).optical_properties()).collect()
    }

    /// Index of the region containing `p`.
    fn get_region_index(&self, p: &Point3f) -> usize;

    /// Distance along the photon direction to the boundary of `region`.
    fn get_distance_to_boundary(&self, dp: &PhotonDataPoint, region: usize) -> Float;

    /// Region on the other side of the boundary the photon sits on.
    fn get_neighbor_region_index(&self, dp: &PhotonDataPoint, region: usize) -> usize;

    /// A unit normal of the boundary between `region` and `neighbor` at the
    /// photon position. Orientation is not significant.
    fn get_boundary_normal(&self, dp: &PhotonDataPoint, region: usize, neighbor: usize) -> Vector3f;

    /// Move a position that has reached a boundary exactly onto it.
    fn snap_to_boundary(&self, _p: &mut Point3f, _region: usize, _neighbor: usize) {}

    /// Probe raised when a photon is transmitted into `neighbor`.
    fn exit_probe(&self, neighbor: usize) -> BoundaryProbe;

    /// Depth of the top tissue surface.
    fn z_top(&self) -> Float;

    /// Depth of the bottom tissue surface.
    fn z_bottom(&self) -> Float;

    /// The lateral bounding volume, if the tissue has one.
    fn bounding_cylinder(&self) -> Option<&CylinderTissueRegion> {
        None
    }
}

/// An embedded primitive of a single inclusion tissue.
#[derive(Debug, Clone, PartialEq)]
pub enum InclusionRegion {
    Cylinder(CylinderTissueRegion),
    InfiniteCylinder(InfiniteCylinderTissueRegion),
    Ellipsoid(EllipsoidTissueRegion),
    Voxel(VoxelTissueRegion)
}

impl InclusionRegion {
    pub fn as_region(&self) -> &dyn TissueRegion {
        match self {
            InclusionRegion::Cylinder(r) => r,
            InclusionRegion::InfiniteCylinder(r) => r,
            InclusionRegion::Ellipsoid(r) => r,
            InclusionRegion::Voxel(r) => r
        }
    }
}

/// Description of a tissue, validated once before a run.
#[derive(Debug, Clone, PartialEq)]
pub enum TissueInput {
    MultiLayer {
        layers: Vec<LayerTissueRegion>
    },
    SingleInclusion {
        layers: Vec<LayerTissueRegion>,
        inclusion: InclusionRegion
    },
    MultiConcentricInfiniteCylinder {
        layers: Vec<LayerTissueRegion>,
        /// Outermost first.
        cylinders: Vec<InfiniteCylinderTissueRegion>
    },
    BoundingCylinder {
        layers: Vec<LayerTissueRegion>,
        cylinder: CylinderTissueRegion
    }
}

impl TissueInput {
    /// Air above and below a single slab `[0, thickness)`.
    pub fn slab(thickness: Float, ops: OpticalProperties) -> TissueInput {
        TissueInput::MultiLayer {
            layers: vec![
                LayerTissueRegion::ambient_above(0.0, OpticalProperties::air()),
                LayerTissueRegion::new(0.0, thickness, ops),
                LayerTissueRegion::ambient_below(thickness, OpticalProperties::air())
            ]
        }
    }

    pub fn layers(&self) -> &[LayerTissueRegion] {
        match self {
            TissueInput::MultiLayer { layers }
            | TissueInput::SingleInclusion { layers, .. }
            | TissueInput::MultiConcentricInfiniteCylinder { layers, .. }
            | TissueInput::BoundingCylinder { layers, .. } => layers
        }
    }

    /// Check every geometric and optical invariant of the tissue.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            TissueInput::MultiLayer { layers } => MultiLayerTissue::validate(layers),
            TissueInput::SingleInclusion { layers, inclusion } => {
                SingleInclusionTissue::validate(layers, inclusion).map(|_| ())
            }
            TissueInput::MultiConcentricInfiniteCylinder { layers, cylinders } => {
                MultiConcentricInfiniteCylinderTissue::validate(layers, cylinders).map(|_| ())
            }
            TissueInput::BoundingCylinder { layers, cylinder } => BoundingCylinderTissue::validate(layers, cylinder)
        }
    }

    pub fn create_tissue(&self) -> Result<Box<dyn Tissue>, ConfigurationError> {
        let tissue: Box<dyn Tissue> = match self {
            TissueInput::MultiLayer { layers } => Box::new(MultiLayerTissue::new(layers.clone())?),
            TissueInput::SingleInclusion { layers, inclusion } => {
                Box::new(SingleInclusionTissue::new(layers.clone(), inclusion.clone())?)
            }
            TissueInput::MultiConcentricInfiniteCylinder { layers, cylinders } => {
                Box::new(MultiConcentricInfiniteCylinderTissue::new(layers.clone(), cylinders.clone())?)
            }
            TissueInput::BoundingCylinder { layers, cylinder } => {
                Box::new(BoundingCylinderTissue::new(layers.clone(), cylinder.clone())?)
            }
        };
        Ok(tissue)
    }
}

impl Default for TissueInput {
    fn default() -> TissueInput {
        TissueInput::slab(100.0, OpticalProperties::default())
    }
}

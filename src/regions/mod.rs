//! Geometric primitives a tissue is assembled from.
pub mod layer;
pub mod cylinder;
pub mod infinite_cylinder;
pub mod ellipsoid;
pub mod voxel;

pub use self::layer::LayerTissueRegion;
pub use self::cylinder::CylinderTissueRegion;
pub use self::infinite_cylinder::InfiniteCylinderTissueRegion;
pub use self::ellipsoid::EllipsoidTissueRegion;
pub use self::voxel::VoxelTissueRegion;

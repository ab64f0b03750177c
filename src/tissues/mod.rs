//! Tissue kinds assembled from layers and embedded regions.
pub mod multi_layer;
pub mod single_inclusion;
pub mod multi_concentric_infinite_cylinder;
pub mod bounding_cylinder;

pub use self::multi_layer::{LayerStack, MultiLayerTissue};
pub use self::single_inclusion::SingleInclusionTissue;
pub use self::multi_concentric_infinite_cylinder::MultiConcentricInfiniteCylinderTissue;
pub use self::bounding_cylinder::BoundingCylinderTissue;

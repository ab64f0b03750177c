pub mod surface;
pub mod specular;
pub mod surface_fiber;
pub mod bounding_cylinder;
pub mod generic_volume;

pub use self::surface::PlanarVirtualBoundary;
pub use self::specular::SpecularVirtualBoundary;
pub use self::surface_fiber::SurfaceFiberVirtualBoundary;
pub use self::bounding_cylinder::BoundingCylinderVirtualBoundary;
pub use self::generic_volume::GenericVolumeVirtualBoundary;

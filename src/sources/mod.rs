pub mod directional_point;
pub mod isotropic_point;
pub mod directional_circular;

pub use self::directional_point::DirectionalPointSource;
pub use self::isotropic_point::IsotropicPointSource;
pub use self::directional_circular::DirectionalCircularSource;

pub mod vector3;
pub use vector3::*;
pub mod point3;
pub use point3::*;
pub mod ray;
pub use ray::*;

pub mod total;
pub mod of_rho;
pub mod r_of_rho_and_time;
pub mod of_angle;
pub mod r_of_x_and_y;
pub mod frequency;
pub mod surface_fiber;
pub mod volume;
pub mod pmc;
pub mod dmc;

#[cfg(test)]
mod tests;

pub use self::total::TotalDetector;
pub use self::of_rho::OfRhoDetector;
pub use self::r_of_rho_and_time::ROfRhoAndTimeDetector;
pub use self::of_angle::OfAngleDetector;
pub use self::r_of_x_and_y::ROfXAndYDetector;
pub use self::frequency::{ROfFxDetector, ROfRhoAndOmegaDetector};
pub use self::surface_fiber::SurfaceFiberDetector;
pub use self::volume::{VolumeQuantity, ATotalDetector, RhoAndZDetector, XAndYAndZDetector};
pub use self::pmc::{PMCROfRhoDetector, PMCROfRhoAndTimeDetector};
pub use self::dmc::{DMCROfRhoDetector, DifferentialParameter};

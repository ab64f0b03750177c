#[macro_use]
extern crate log;

extern crate rayon;

#[macro_use]
pub mod core;
pub mod regions;
pub mod tissues;
pub mod sources;
pub mod virtual_boundaries;
pub mod detectors;

pub use crate::core::simulation::{MonteCarloSimulation, SimulationInput, SimulationOutput, RngMode};
pub use crate::core::error::{ConfigurationError, DetectorError, SimulationError};

#[cfg(test)]
mod tests;

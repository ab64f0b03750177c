#[macro_use]
pub mod vlog;
pub mod mc;
pub mod error;
pub mod geometry;
pub mod rng;
pub mod sampling;
pub mod optics;
pub mod binning;
pub mod optical_properties;
pub mod region;
pub mod tissue;
pub mod source;
pub mod photon;
pub mod absorption;
pub mod detector;
pub mod perturbation;
pub mod virtual_boundary;
pub mod database;
pub mod options;
pub mod transport;
pub mod stats_accumulator;
pub mod progress_reporter;
pub mod simulation;

//! Typed failures surfaced by configuration, detector setup and the run driver.
use thiserror::Error;
use super::mc::Float;
use super::absorption::AbsorptionWeightingType;

/// An invalid simulation input, detected once before any photon is launched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("tissue must contain at least {required} layers, found {found}")]
    TooFewLayers { required: usize, found: usize },

    #[error("layer {index} has a zero-thickness or inverted z range [{start}, {stop}]")]
    InvalidLayerRange { index: usize, start: Float, stop: Float },

    #[error("layers {upper} and {lower} are not contiguous: {upper_stop} != {lower_start}")]
    LayersNotContiguous { upper: usize, lower: usize, upper_stop: Float, lower_start: Float },

    #[error("layers must cover the whole z axis, found [{start}, {stop}]")]
    LayersNotCovering { start: Float, stop: Float },

    #[error("outer layer {index} must be an ambient medium (mua = mus = 0)")]
    OuterLayerNotAmbient { index: usize },

    #[error("region {index} has invalid optical properties: {reason}")]
    InvalidOpticalProperties { index: usize, reason: String },

    #[error("{region} has a non-positive dimension `{dimension}` = {value}")]
    NonPositiveDimension { region: String, dimension: &'static str, value: Float },

    #[error("{region} refractive index {inclusion_n} does not match its host layer {host_n}")]
    RefractiveIndexMismatch { region: String, inclusion_n: Float, host_n: Float },

    #[error("{region} z extent [{z_min}, {z_max}] does not lie inside a single tissue layer")]
    InclusionNotContained { region: String, z_min: Float, z_max: Float },

    #[error("{region} axis must be horizontal to be contained in a layer")]
    InclusionAxisNotHorizontal { region: String },

    #[error("at least one concentric cylinder is required")]
    NoConcentricCylinders,

    #[error("concentric cylinder {index} does not share the center and axis of cylinder 0")]
    ConcentricCenterMismatch { index: usize },

    #[error("concentric cylinder {index} radius {radius} must be smaller than the enclosing radius {outer_radius}")]
    ConcentricRadiusOrder { index: usize, radius: Float, outer_radius: Float },

    #[error("bounding cylinder must span the tissue layers exactly: {reason}")]
    BoundingCylinderMismatch { reason: String },

    #[error("source is invalid: {reason}")]
    InvalidSource { reason: String },

    #[error("photon count must be positive")]
    NoPhotons,

    #[error("parallel run requires at least one worker")]
    NoWorkers,

    #[error(transparent)]
    Detector(#[from] DetectorError),
}

/// Failures raised by the tally/detector engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectorError {
    #[error("detector `{name}` has already been normalized")]
    AlreadyNormalized { name: String },

    #[error("detector `{name}` does not support {weighting:?} absorption weighting")]
    UnsupportedAbsorptionWeighting { name: String, weighting: AbsorptionWeightingType },

    #[error("detector `{name}` has an invalid `{axis}` axis: {reason}")]
    InvalidBinning { name: String, axis: &'static str, reason: String },

    #[error("detector `{name}` perturbation refers to region {index} but the tissue has {region_count} regions")]
    InvalidPerturbedRegion { name: String, index: usize, region_count: usize },

    #[error("detector `{name}` perturbation needs {expected} optical properties, found {found}")]
    PerturbationSizeMismatch { name: String, expected: usize, found: usize },

    #[error("detector `{name}` cannot be merged with `{other}`")]
    IncompatibleMerge { name: String, other: String },

    #[error("detector `{name}` requires a tissue with a bounding cylinder")]
    MissingBoundingVolume { name: String },
}

/// Failures of a complete run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("detector failure: {0}")]
    Detector(#[from] DetectorError),

    #[error("photon database holds no records for {0}")]
    EmptyDatabase(String),

    #[error("detector {0} cannot be replayed from a photon database")]
    NotReplayable(String),
}

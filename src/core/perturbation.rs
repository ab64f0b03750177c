//! Perturbation Monte Carlo: re-weighting recorded path lengths and
//! collision counts to estimate observables under other optical properties.
use super::mc::Float;
use super::optical_properties::OpticalProperties;
use super::absorption::AbsorptionWeightingType;
use super::photon::CollisionInfo;
use super::detector::PerturbationInput;
use super::error::DetectorError;

/// Half width of the bin a single radial value is turned into, in mm.
pub const SINGLE_RHO_BIN_HALF_WIDTH: Float = 0.05;
/// Half width of the bin a single time value is turned into, in ns.
pub const SINGLE_TIME_BIN_HALF_WIDTH: Float = 0.005;

/// Reference and perturbed optical properties for every region.
#[derive(Debug, Clone, PartialEq)]
pub struct PerturbationSpec {
    pub reference_ops: Vec<OpticalProperties>,
    pub perturbed_ops: Vec<OpticalProperties>,
    pub perturbed_regions: Vec<usize>,
    pub weighting: AbsorptionWeightingType
}

impl PerturbationSpec {
    /// Analog weighting has no likelihood ratio to re-weight with.
    pub fn new(name: &str, reference_ops: &[OpticalProperties], input: &PerturbationInput, weighting: AbsorptionWeightingType)
        -> Result<PerturbationSpec, DetectorError>
    {
        if weighting == AbsorptionWeightingType::Analog {
            return Err(DetectorError::UnsupportedAbsorptionWeighting { name: name.to_string(), weighting });
        }
        if input.perturbed_ops.len() != reference_ops.len() {
            return Err(DetectorError::PerturbationSizeMismatch {
                name: name.to_string(),
                expected: reference_ops.len(),
                found: input.perturbed_ops.len()
            });
        }
        if let Some(&index) = input.perturbed_regions.iter().find(|&&i| i >= reference_ops.len()) {
            return Err(DetectorError::InvalidPerturbedRegion {
                name: name.to_string(),
                index,
                region_count: reference_ops.len()
            });
        }
        Ok(PerturbationSpec {
            reference_ops: reference_ops.to_vec(),
            perturbed_ops: input.perturbed_ops.clone(),
            perturbed_regions: input.perturbed_regions.clone(),
            weighting
        })
    }

    /// Change of the attenuation coefficient that applies along the path.
    /// Under continuous weighting absorption is already in the recorded
    /// weight, so only the scattering change applies.
    #[inline]
    fn attenuation_change(&self, region: usize) -> Float {
        let reference = &self.reference_ops[region];
        let perturbed = &self.perturbed_ops[region];
        match self.weighting {
            AbsorptionWeightingType::Continuous => perturbed.mus - reference.mus,
            _ => perturbed.mut_total() - reference.mut_total()
        }
    }

    /// `(mus'/mus)^c` for one region.
    #[inline]
    fn scattering_ratio(&self, region: usize, collisions: u64) -> Float {
        if collisions == 0 {
            return 1.0;
        }
        let ratio = self.perturbed_ops[region].mus / self.reference_ops[region].mus;
        ratio.powf(collisions as Float)
    }

    /// Likelihood ratio of a recorded photon under the perturbed properties.
    pub fn weight_factor(&self, info: &CollisionInfo) -> Float {
        self.perturbed_regions.iter().fold(1.0, |factor, &region| {
            let c = &info[region];
            factor * self.scattering_ratio(region, c.collisions) * (-self.attenuation_change(region) * c.path_length).exp()
        })
    }

    /// Derivative of the log weight factor with respect to mua, summed over
    /// the perturbed regions.
    pub fn dlog_weight_dmua(&self, info: &CollisionInfo) -> Float {
        self.perturbed_regions.iter().map(|&region| -info[region].path_length).sum()
    }

    /// Derivative of the log weight factor with respect to mus, summed over
    /// the perturbed regions.
    pub fn dlog_weight_dmus(&self, info: &CollisionInfo) -> Float {
        self.perturbed_regions.iter().map(|&region| {
            let c = &info[region];
            c.collisions as Float / self.perturbed_ops[region].mus - c.path_length
        }).sum()
    }
}

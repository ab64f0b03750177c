//! Differential Monte Carlo: derivatives of the radial reflectance with
//! respect to the optical properties of the perturbed regions.
use crate::core::mc::Float;
use crate::core::binning::{DoubleRange, annulus_area};
use crate::core::absorption::AbsorptionWeightingType;
use crate::core::detector::{Detector, SurfaceDetector, DetectorContext, PerturbationInput, TallyType, Tally, Axis,
    DetectorValues, DetectorValuesMut};
use crate::core::perturbation::{PerturbationSpec, SINGLE_RHO_BIN_HALF_WIDTH};
use crate::core::error::DetectorError;
use crate::core::photon::PhotonDataPoint;

/// Coefficient the derivative is taken with respect to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DifferentialParameter {
    Mua,
    Mus
}

#[derive(Debug, Clone)]
pub struct DMCROfRhoDetector {
    parameter: DifferentialParameter,
    rho: DoubleRange,
    perturbation: PerturbationSpec,
    tally: Tally<Float>
}

impl DMCROfRhoDetector {
    /// Only discrete absorption weighting is supported.
    pub fn new(parameter: DifferentialParameter, rho: DoubleRange, input: &PerturbationInput, context: &DetectorContext)
        -> Result<DMCROfRhoDetector, DetectorError>
    {
        let tally_type = match parameter {
            DifferentialParameter::Mua => TallyType::DMCdROfRhodMua,
            DifferentialParameter::Mus => TallyType::DMCdROfRhodMus
        };
        let name = tally_type.to_string();
        if context.weighting == AbsorptionWeightingType::Continuous {
            return Err(DetectorError::UnsupportedAbsorptionWeighting { name, weighting: context.weighting });
        }
        let rho = rho.recenter_single_value(SINGLE_RHO_BIN_HALF_WIDTH, 0.0);
        rho.validate(&name, "rho")?;
        let perturbation = PerturbationSpec::new(&name, &context.ops, input, context.weighting)?;
        Ok(DMCROfRhoDetector { parameter, rho, perturbation, tally: Tally::new(vec![rho.bin_count()]) })
    }
}

impl Detector for DMCROfRhoDetector {
    fn tally_type(&self) -> TallyType {
        match self.parameter {
            DifferentialParameter::Mua => TallyType::DMCdROfRhodMua,
            DifferentialParameter::Mus => TallyType::DMCdROfRhodMus
        }
    }

    fn axes(&self) -> Vec<Axis> {
        vec![Axis::new("rho", self.rho)]
    }

    fn values(&self) -> DetectorValues<'_> {
        DetectorValues::Real(&self.tally)
    }

    fn values_mut(&mut self) -> DetectorValuesMut<'_> {
        DetectorValuesMut::Real(&mut self.tally)
    }

    fn bin_jacobian(&self, index: usize) -> Float {
        annulus_area(&self.rho, index)
    }
}

impl SurfaceDetector for DMCROfRhoDetector {
    fn tally(&mut self, dp: &PhotonDataPoint) {
        let ir = match self.rho.which_bin(dp.position.rho()) {
            Some(ir) => ir,
            None => return
        };
        let info = &dp.collision_info;
        let dlog = match self.parameter {
            DifferentialParameter::Mua => self.perturbation.dlog_weight_dmua(info),
            DifferentialParameter::Mus => self.perturbation.dlog_weight_dmus(info)
        };
        self.tally.add(ir, dp.weight * self.perturbation.weight_factor(info) * dlog);
    }

    fn fork(&self) -> Box<dyn SurfaceDetector> {
        let mut d = self.clone();
        d.tally.reset();
        Box::new(d)
    }
}

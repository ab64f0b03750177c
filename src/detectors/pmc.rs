//! Perturbation Monte Carlo reflectance. Each exiting photon is scored with
//! its weight times the likelihood ratio of its recorded path under the
//! perturbed optical properties.
use crate::core::mc::Float;
use crate::core::binning::{DoubleRange, annulus_area};
use crate::core::detector::{Detector, SurfaceDetector, DetectorContext, PerturbationInput, TallyType, Tally, Axis,
    DetectorValues, DetectorValuesMut};
use crate::core::perturbation::{PerturbationSpec, SINGLE_RHO_BIN_HALF_WIDTH, SINGLE_TIME_BIN_HALF_WIDTH};
use crate::core::error::DetectorError;
use crate::core::photon::PhotonDataPoint;

#[derive(Debug, Clone)]
pub struct PMCROfRhoDetector {
    rho: DoubleRange,
    perturbation: PerturbationSpec,
    tally: Tally<Float>
}

impl PMCROfRhoDetector {
    pub fn new(rho: DoubleRange, input: &PerturbationInput, context: &DetectorContext)
        -> Result<PMCROfRhoDetector, DetectorError>
    {
        let name = TallyType::PMCROfRho.to_string();
        let rho = rho.recenter_single_value(SINGLE_RHO_BIN_HALF_WIDTH, 0.0);
        rho.validate(&name, "rho")?;
        let perturbation = PerturbationSpec::new(&name, &context.ops, input, context.weighting)?;
        Ok(PMCROfRhoDetector { rho, perturbation, tally: Tally::new(vec![rho.bin_count()]) })
    }
}

impl Detector for PMCROfRhoDetector {
    fn tally_type(&self) -> TallyType {
        TallyType::PMCROfRho
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

impl SurfaceDetector for PMCROfRhoDetector {
    fn tally(&mut self, dp: &PhotonDataPoint) {
        if let Some(ir) = self.rho.which_bin(dp.position.rho()) {
            let factor = self.perturbation.weight_factor(&dp.collision_info);
            self.tally.add(ir, dp.weight * factor);
        }
    }

    fn fork(&self) -> Box<dyn SurfaceDetector> {
        let mut d = self.clone();
        d.tally.reset();
        Box::new(d)
    }
}

#[derive(Debug, Clone)]
pub struct PMCROfRhoAndTimeDetector {
    rho: DoubleRange,
    time: DoubleRange,
    perturbation: PerturbationSpec,
    tally: Tally<Float>
}

impl PMCROfRhoAndTimeDetector {
    pub fn new(rho: DoubleRange, time: DoubleRange, input: &PerturbationInput, context: &DetectorContext)
        -> Result<PMCROfRhoAndTimeDetector, DetectorError>
    {
        let name = TallyType::PMCROfRhoAndTime.to_string();
        let rho = rho.recenter_single_value(SINGLE_RHO_BIN_HALF_WIDTH, 0.0);
        let time = time.recenter_single_value(SINGLE_TIME_BIN_HALF_WIDTH, 0.0);
        rho.validate(&name, "rho")?;
        time.validate(&name, "time")?;
        let perturbation = PerturbationSpec::new(&name, &context.ops, input, context.weighting)?;
        Ok(PMCROfRhoAndTimeDetector {
            rho,
            time,
            perturbation,
            tally: Tally::new(vec![rho.bin_count(), time.bin_count()])
        })
    }
}

impl Detector for PMCROfRhoAndTimeDetector {
    fn tally_type(&self) -> TallyType {
        TallyType::PMCROfRhoAndTime
    }

    fn axes(&self) -> Vec<Axis> {
        vec![Axis::new("rho", self.rho), Axis::new("time", self.time)]
    }

    fn values(&self) -> DetectorValues<'_> {
        DetectorValues::Real(&self.tally)
    }

    fn values_mut(&mut self) -> DetectorValuesMut<'_> {
        DetectorValuesMut::Real(&mut self.tally)
    }

    fn bin_jacobian(&self, index: usize) -> Float {
        annulus_area(&self.rho, index / self.time.bin_count()) * self.time.delta()
    }
}

impl SurfaceDetector for PMCROfRhoAndTimeDetector {
    fn tally(&mut self, dp: &PhotonDataPoint) {
        // TODO: time of flight should be rescaled for perturbations that change n
        let bins = (self.rho.which_bin(dp.position.rho()), self.time.which_bin(dp.total_time));
        if let (Some(ir), Some(it)) = bins {
            let factor = self.perturbation.weight_factor(&dp.collision_info);
            let index = self.tally.flat_index(&[ir, it]);
            self.tally.add(index, dp.weight * factor);
        }
    }

    fn fork(&self) -> Box<dyn SurfaceDetector> {
        let mut d = self.clone();
        d.tally.reset();
        Box::new(d)
    }
}

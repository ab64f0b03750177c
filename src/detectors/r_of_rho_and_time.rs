use crate::core::mc::Float;
use crate::core::binning::{DoubleRange, annulus_area};
use crate::core::detector::{Detector, SurfaceDetector, TallyType, Tally, Axis, DetectorValues, DetectorValuesMut};
use crate::core::error::DetectorError;
use crate::core::photon::PhotonDataPoint;

/// Time resolved reflectance, binned by radius then time of flight in ns.
#[derive(Debug, Clone)]
pub struct ROfRhoAndTimeDetector {
    rho: DoubleRange,
    time: DoubleRange,
    tally: Tally<Float>
}

impl ROfRhoAndTimeDetector {
    pub fn new(rho: DoubleRange, time: DoubleRange) -> Result<ROfRhoAndTimeDetector, DetectorError> {
        let name = TallyType::ROfRhoAndTime.to_string();
        rho.validate(&name, "rho")?;
        time.validate(&name, "time")?;
        Ok(ROfRhoAndTimeDetector { rho, time, tally: Tally::new(vec![rho.bin_count(), time.bin_count()]) })
    }
}

impl Detector for ROfRhoAndTimeDetector {
    fn tally_type(&self) -> TallyType {
        TallyType::ROfRhoAndTime
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
        let nt = self.time.bin_count();
        annulus_area(&self.rho, index / nt) * self.time.delta()
    }
}

impl SurfaceDetector for ROfRhoAndTimeDetector {
    fn tally(&mut self, dp: &PhotonDataPoint) {
        let bins = (self.rho.which_bin(dp.position.rho()), self.time.which_bin(dp.total_time));
        if let (Some(ir), Some(it)) = bins {
            let index = self.tally.flat_index(&[ir, it]);
            self.tally.add(index, dp.weight);
        }
    }

    fn fork(&self) -> Box<dyn SurfaceDetector> {
        let mut d = self.clone();
        d.tally.reset();
        Box::new(d)
    }
}

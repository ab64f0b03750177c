use crate::core::mc::Float;
use crate::core::binning::{DoubleRange, annulus_area};
use crate::core::detector::{Detector, SurfaceDetector, TallyType, Tally, Axis, DetectorValues, DetectorValuesMut};
use crate::core::error::DetectorError;
use crate::core::photon::PhotonDataPoint;

/// Weight leaving the tissue binned by radial distance from the z axis.
/// Used for both reflectance and transmittance.
#[derive(Debug, Clone)]
pub struct OfRhoDetector {
    tally_type: TallyType,
    rho: DoubleRange,
    tally: Tally<Float>
}

impl OfRhoDetector {
    pub fn new(tally_type: TallyType, rho: DoubleRange) -> Result<OfRhoDetector, DetectorError> {
        rho.validate(&tally_type.to_string(), "rho")?;
        Ok(OfRhoDetector { tally_type, rho, tally: Tally::new(vec![rho.bin_count()]) })
    }
}

impl Detector for OfRhoDetector {
    fn tally_type(&self) -> TallyType {
        self.tally_type
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

impl SurfaceDetector for OfRhoDetector {
    fn tally(&mut self, dp: &PhotonDataPoint) {
        if let Some(ir) = self.rho.which_bin(dp.position.rho()) {
            self.tally.add(ir, dp.weight);
        }
    }

    fn fork(&self) -> Box<dyn SurfaceDetector> {
        let mut d = self.clone();
        d.tally.reset();
        Box::new(d)
    }
}

use crate::core::mc::Float;
use crate::core::detector::{Detector, SurfaceDetector, TallyType, Tally, Axis, DetectorValues, DetectorValuesMut};
use crate::core::photon::PhotonDataPoint;

/// Total weight crossing a virtual boundary. Serves diffuse reflectance,
/// diffuse transmittance, specular reflectance and the weight leaving the
/// wall of a bounding volume.
#[derive(Debug, Clone)]
pub struct TotalDetector {
    tally_type: TallyType,
    tally: Tally<Float>
}

impl TotalDetector {
    pub fn new(tally_type: TallyType) -> TotalDetector {
        TotalDetector { tally_type, tally: Tally::new(vec![1]) }
    }
}

impl Detector for TotalDetector {
    fn tally_type(&self) -> TallyType {
        self.tally_type
    }

    fn axes(&self) -> Vec<Axis> {
        Vec::new()
    }

    fn values(&self) -> DetectorValues<'_> {
        DetectorValues::Real(&self.tally)
    }

    fn values_mut(&mut self) -> DetectorValuesMut<'_> {
        DetectorValuesMut::Real(&mut self.tally)
    }
}

impl SurfaceDetector for TotalDetector {
    fn tally(&mut self, dp: &PhotonDataPoint) {
        self.tally.add(0, dp.weight);
    }

    fn fork(&self) -> Box<dyn SurfaceDetector> {
        let mut d = self.clone();
        d.tally.reset();
        Box::new(d)
    }
}

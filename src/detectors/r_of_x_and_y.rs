use crate::core::mc::Float;
use crate::core::binning::DoubleRange;
use crate::core::detector::{Detector, SurfaceDetector, TallyType, Tally, Axis, DetectorValues, DetectorValuesMut};
use crate::core::error::DetectorError;
use crate::core::photon::PhotonDataPoint;

/// Reflectance on a cartesian grid of the top surface.
#[derive(Debug, Clone)]
pub struct ROfXAndYDetector {
    x: DoubleRange,
    y: DoubleRange,
    tally: Tally<Float>
}

impl ROfXAndYDetector {
    pub fn new(x: DoubleRange, y: DoubleRange) -> Result<ROfXAndYDetector, DetectorError> {
        let name = TallyType::ROfXAndY.to_string();
        x.validate(&name, "x")?;
        y.validate(&name, "y")?;
        Ok(ROfXAndYDetector { x, y, tally: Tally::new(vec![x.bin_count(), y.bin_count()]) })
    }
}

impl Detector for ROfXAndYDetector {
    fn tally_type(&self) -> TallyType {
        TallyType::ROfXAndY
    }

    fn axes(&self) -> Vec<Axis> {
        vec![Axis::new("x", self.x), Axis::new("y", self.y)]
    }

    fn values(&self) -> DetectorValues<'_> {
        DetectorValues::Real(&self.tally)
    }

    fn values_mut(&mut self) -> DetectorValuesMut<'_> {
        DetectorValuesMut::Real(&mut self.tally)
    }

    fn bin_jacobian(&self, _index: usize) -> Float {
        self.x.delta() * self.y.delta()
    }
}

impl SurfaceDetector for ROfXAndYDetector {
    fn tally(&mut self, dp: &PhotonDataPoint) {
        if let (Some(ix), Some(iy)) = (self.x.which_bin(dp.position.x), self.y.which_bin(dp.position.y)) {
            let index = self.tally.flat_index(&[ix, iy]);
            self.tally.add(index, dp.weight);
        }
    }

    fn fork(&self) -> Box<dyn SurfaceDetector> {
        let mut d = self.clone();
        d.tally.reset();
        Box::new(d)
    }
}

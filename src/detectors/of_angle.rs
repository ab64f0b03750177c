use crate::core::mc::Float;
use crate::core::binning::{DoubleRange, polar_solid_angle};
use crate::core::detector::{Detector, SurfaceDetector, TallyType, Tally, Axis, DetectorValues, DetectorValuesMut};
use crate::core::error::DetectorError;
use crate::core::photon::PhotonDataPoint;

/// Exiting weight binned by the polar angle to the surface normal, in
/// radians within [0, pi/2].
#[derive(Debug, Clone)]
pub struct OfAngleDetector {
    tally_type: TallyType,
    angle: DoubleRange,
    tally: Tally<Float>
}

impl OfAngleDetector {
    pub fn new(tally_type: TallyType, angle: DoubleRange) -> Result<OfAngleDetector, DetectorError> {
        angle.validate(&tally_type.to_string(), "angle")?;
        Ok(OfAngleDetector { tally_type, angle, tally: Tally::new(vec![angle.bin_count()]) })
    }
}

impl Detector for OfAngleDetector {
    fn tally_type(&self) -> TallyType {
        self.tally_type
    }

    fn axes(&self) -> Vec<Axis> {
        vec![Axis::new("angle", self.angle)]
    }

    fn values(&self) -> DetectorValues<'_> {
        DetectorValues::Real(&self.tally)
    }

    fn values_mut(&mut self) -> DetectorValuesMut<'_> {
        DetectorValuesMut::Real(&mut self.tally)
    }

    fn bin_jacobian(&self, index: usize) -> Float {
        polar_solid_angle(&self.angle, index)
    }
}

impl SurfaceDetector for OfAngleDetector {
    fn tally(&mut self, dp: &PhotonDataPoint) {
        let theta = num::clamp(dp.direction.z.abs(), 0.0, 1.0).acos();
        if let Some(ia) = self.angle.which_bin(theta) {
            self.tally.add(ia, dp.weight);
        }
    }

    fn fork(&self) -> Box<dyn SurfaceDetector> {
        let mut d = self.clone();
        d.tally.reset();
        Box::new(d)
    }
}

use crate::core::mc::Float;
use crate::core::geometry::Point3f;
use crate::core::detector::{Detector, SurfaceDetector, TallyType, Tally, Axis, DetectorValues, DetectorValuesMut};
use crate::core::error::DetectorError;
use crate::core::photon::PhotonDataPoint;
use crate::core::region::positive_dimension;

/// Weight collected by a fiber on the top surface. The footprint is checked
/// by the fiber's virtual boundary; the detector applies the acceptance cone.
#[derive(Debug, Clone)]
pub struct SurfaceFiberDetector {
    pub center: Point3f,
    pub radius: Float,
    pub numerical_aperture: Float,
    /// Index of the medium the light exits into.
    ambient_n: Float,
    tally: Tally<Float>
}

impl SurfaceFiberDetector {
    pub fn new(center: Point3f, radius: Float, numerical_aperture: Float, ambient_n: Float)
        -> Result<SurfaceFiberDetector, DetectorError>
    {
        let name = TallyType::SurfaceFiber.to_string();
        if positive_dimension(&name, "radius", radius).is_err() {
            return Err(DetectorError::InvalidBinning {
                name,
                axis: "radius",
                reason: format!("radius {} must be positive", radius)
            });
        }
        if !(numerical_aperture > 0.0) || numerical_aperture > ambient_n {
            return Err(DetectorError::InvalidBinning {
                name,
                axis: "numerical_aperture",
                reason: format!("{} must lie in (0, {}]", numerical_aperture, ambient_n)
            });
        }
        Ok(SurfaceFiberDetector { center, radius, numerical_aperture, ambient_n, tally: Tally::new(vec![1]) })
    }

    /// Is the exit direction inside the acceptance cone, n sin(theta) <= NA.
    pub fn accepts(&self, dp: &PhotonDataPoint) -> bool {
        let cos_theta = dp.direction.z.abs().min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
        self.ambient_n * sin_theta <= self.numerical_aperture
    }
}

impl Detector for SurfaceFiberDetector {
    fn tally_type(&self) -> TallyType {
        TallyType::SurfaceFiber
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

impl SurfaceDetector for SurfaceFiberDetector {
    fn tally(&mut self, dp: &PhotonDataPoint) {
        if self.accepts(dp) {
            self.tally.add(0, dp.weight);
        }
    }

    fn fork(&self) -> Box<dyn SurfaceDetector> {
        let mut d = self.clone();
        d.tally.reset();
        Box::new(d)
    }
}

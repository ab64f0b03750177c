//! Frequency domain reflectance. Both detectors accumulate the Fourier
//! kernel of every exiting photon, so their tallies are complex.
use num::complex::Complex;
use crate::core::mc::{Float, consts::PI};
use crate::core::binning::{DoubleRange, annulus_area};
use crate::core::detector::{Detector, SurfaceDetector, TallyType, Tally, Axis, ComplexFloat, DetectorValues,
    DetectorValuesMut};
use crate::core::error::DetectorError;
use crate::core::photon::PhotonDataPoint;

/// `w exp(-i 2 pi f s)`.
#[inline]
fn kernel(weight: Float, frequency: Float, s: Float) -> ComplexFloat {
    Complex::from_polar(&weight, &(-2.0 * PI * frequency * s))
}

/// Reflectance at spatial frequencies `fx` (1/mm) along x.
#[derive(Debug, Clone)]
pub struct ROfFxDetector {
    fx: DoubleRange,
    frequencies: Vec<Float>,
    tally: Tally<ComplexFloat>
}

impl ROfFxDetector {
    pub fn new(fx: DoubleRange) -> Result<ROfFxDetector, DetectorError> {
        fx.validate_points(&TallyType::ROfFx.to_string(), "fx")?;
        let frequencies = fx.values();
        Ok(ROfFxDetector { fx, tally: Tally::new(vec![frequencies.len()]), frequencies })
    }
}

impl Detector for ROfFxDetector {
    fn tally_type(&self) -> TallyType {
        TallyType::ROfFx
    }

    fn axes(&self) -> Vec<Axis> {
        vec![Axis::new("fx", self.fx)]
    }

    fn values(&self) -> DetectorValues<'_> {
        DetectorValues::Complex(&self.tally)
    }

    fn values_mut(&mut self) -> DetectorValuesMut<'_> {
        DetectorValuesMut::Complex(&mut self.tally)
    }
}

impl SurfaceDetector for ROfFxDetector {
    fn tally(&mut self, dp: &PhotonDataPoint) {
        let x = dp.position.x;
        for (i, &f) in self.frequencies.iter().enumerate() {
            self.tally.add(i, kernel(dp.weight, f, x));
        }
    }

    fn fork(&self) -> Box<dyn SurfaceDetector> {
        let mut d = self.clone();
        d.tally.reset();
        Box::new(d)
    }
}

/// Reflectance by radius at temporal modulation frequencies `omega` (GHz).
#[derive(Debug, Clone)]
pub struct ROfRhoAndOmegaDetector {
    rho: DoubleRange,
    omega: DoubleRange,
    frequencies: Vec<Float>,
    tally: Tally<ComplexFloat>
}

impl ROfRhoAndOmegaDetector {
    pub fn new(rho: DoubleRange, omega: DoubleRange) -> Result<ROfRhoAndOmegaDetector, DetectorError> {
        let name = TallyType::ROfRhoAndOmega.to_string();
        rho.validate(&name, "rho")?;
        omega.validate_points(&name, "omega")?;
        let frequencies = omega.values();
        Ok(ROfRhoAndOmegaDetector {
            rho,
            omega,
            tally: Tally::new(vec![rho.bin_count(), frequencies.len()]),
            frequencies
        })
    }
}

impl Detector for ROfRhoAndOmegaDetector {
    fn tally_type(&self) -> TallyType {
        TallyType::ROfRhoAndOmega
    }

    fn axes(&self) -> Vec<Axis> {
        vec![Axis::new("rho", self.rho), Axis::new("omega", self.omega)]
    }

    fn values(&self) -> DetectorValues<'_> {
        DetectorValues::Complex(&self.tally)
    }

    fn values_mut(&mut self) -> DetectorValuesMut<'_> {
        DetectorValuesMut::Complex(&mut self.tally)
    }

    fn bin_jacobian(&self, index: usize) -> Float {
        annulus_area(&self.rho, index / self.frequencies.len())
    }
}

impl SurfaceDetector for ROfRhoAndOmegaDetector {
    fn tally(&mut self, dp: &PhotonDataPoint) {
        let ir = match self.rho.which_bin(dp.position.rho()) {
            Some(ir) => ir,
            None => return
        };
        for (iw, &f) in self.frequencies.iter().enumerate() {
            let index = self.tally.flat_index(&[ir, iw]);
            self.tally.add(index, kernel(dp.weight, f, dp.total_time));
        }
    }

    fn fork(&self) -> Box<dyn SurfaceDetector> {
        let mut d = self.clone();
        d.tally.reset();
        Box::new(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Point3f, Vector3f};

    #[test]
    fn test_zero_frequency_is_total_reflectance() {
        let mut d = ROfFxDetector::new(DoubleRange::new(0.0, 0.5, 3)).unwrap();
        let dp = PhotonDataPoint::new(Point3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0), 0.5, 3);
        d.tally(&dp);
        assert_eq!(d.tally.mean[0], Complex::new(0.5, 0.0));
        // fx = 0.5 /mm at x = 1 mm is half a period
        assert!((d.tally.mean[2].re + 0.5).abs() < 1e-12);
        assert!(d.tally.mean[2].im.abs() < 1e-12);
    }

    #[test]
    fn test_results_are_complex() {
        let mut d = ROfFxDetector::new(DoubleRange::new(0.0, 0.5, 3)).unwrap();
        d.tally(&PhotonDataPoint::new(Point3f::zero(), Vector3f::new(0.0, 0.0, -1.0), 0.5, 3));
        d.normalize(2).unwrap();
        assert!(d.tally.is_normalized());
        let results = d.results();
        assert!(results.mean().is_none());
        assert_eq!(results.complex_mean().map(|m| m[0]), Some(Complex::new(0.25, 0.0)));
    }

    #[test]
    fn test_omega_phase_follows_time() {
        let mut d = ROfRhoAndOmegaDetector::new(DoubleRange::new(0.0, 2.0, 3), DoubleRange::new(0.25, 0.25, 1)).unwrap();
        let mut dp = PhotonDataPoint::new(Point3f::new(0.5, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0), 1.0, 3);
        dp.total_time = 1.0;
        d.tally(&dp);
        // a quarter period gives -i
        assert!(d.tally.mean[0].re.abs() < 1e-12);
        assert!((d.tally.mean[0].im + 1.0).abs() < 1e-12);
        assert_eq!(d.tally.mean[1], Complex::new(0.0, 0.0));
    }
}

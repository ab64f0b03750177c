use crate::core::mc::{Float, consts::PI};
use crate::core::rng::Rng;
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::sampling::{uniform_sample_annulus_radius, gaussian_sample_radius};
use crate::core::source::{Source, Emission, BeamProfile, unit_direction, check_inside};
use crate::core::tissue::Tissue;
use crate::core::error::ConfigurationError;

/// A collimated beam whose launch points cover an annulus
/// `inner_radius <= r <= outer_radius` around `center` in the plane z = center.z.
#[derive(Debug, Clone)]
pub struct DirectionalCircularSource {
    pub center: Point3f,
    pub direction: Vector3f,
    pub inner_radius: Float,
    pub outer_radius: Float,
    pub profile: BeamProfile
}

impl DirectionalCircularSource {
    pub fn new(center: Point3f, direction: Vector3f, inner_radius: Float, outer_radius: Float, profile: BeamProfile)
        -> Result<DirectionalCircularSource, ConfigurationError>
    {
        if !(inner_radius >= 0.0) || !(outer_radius >= inner_radius) || outer_radius.is_infinite() {
            return Err(ConfigurationError::InvalidSource {
                reason: format!("radii must satisfy 0 <= {} <= {} < inf", inner_radius, outer_radius)
            });
        }
        if let BeamProfile::Gaussian { fwhm } = profile {
            if !(fwhm > 0.0) {
                return Err(ConfigurationError::InvalidSource { reason: format!("beam FWHM {} must be positive", fwhm) });
            }
        }
        Ok(DirectionalCircularSource {
            center,
            direction: unit_direction(direction)?,
            inner_radius,
            outer_radius,
            profile
        })
    }
}

impl Source for DirectionalCircularSource {
    fn name(&self) -> &'static str {
        "directional circular"
    }

    fn emit(&self, rng: &mut Rng) -> Emission {
        let r = match self.profile {
            BeamProfile::Flat => uniform_sample_annulus_radius(self.inner_radius, self.outer_radius, rng),
            BeamProfile::Gaussian { fwhm } => gaussian_sample_radius(fwhm, self.inner_radius, self.outer_radius, rng)
        };
        let phi = 2.0 * PI * rng.uniform_float();
        let position = Point3f::new(self.center.x + r * phi.cos(), self.center.y + r * phi.sin(), self.center.z);
        Emission { position, direction: self.direction }
    }

    fn validate(&self, tissue: &dyn Tissue) -> Result<(), ConfigurationError> {
        check_inside(self.name(), &self.center, tissue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_points_inside_annulus() {
        let s = DirectionalCircularSource::new(
            Point3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0), 0.5, 2.0, BeamProfile::Flat).unwrap();
        let mut rng = Rng::new(3);
        for _ in 0..500 {
            let e = s.emit(&mut rng);
            let r = ((e.position.x - 1.0).powi(2) + e.position.y.powi(2)).sqrt();
            assert!(r >= 0.5 - 1e-12 && r <= 2.0 + 1e-12);
            assert_eq!(e.position.z, 0.0);
        }
    }

    #[test]
    fn test_invalid_radii() {
        let d = Vector3f::new(0.0, 0.0, 1.0);
        assert!(DirectionalCircularSource::new(Point3f::zero(), d, 2.0, 1.0, BeamProfile::Flat).is_err());
        assert!(DirectionalCircularSource::new(Point3f::zero(), d, 0.0, 1.0, BeamProfile::Gaussian { fwhm: 0.0 }).is_err());
    }
}

use crate::core::rng::Rng;
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::source::{Source, Emission, unit_direction, check_inside};
use crate::core::tissue::Tissue;
use crate::core::error::ConfigurationError;

/// Every photon starts at the same point with the same direction.
#[derive(Debug, Clone)]
pub struct DirectionalPointSource {
    pub position: Point3f,
    pub direction: Vector3f
}

impl DirectionalPointSource {
    pub fn new(position: Point3f, direction: Vector3f) -> Result<DirectionalPointSource, ConfigurationError> {
        Ok(DirectionalPointSource { position, direction: unit_direction(direction)? })
    }
}

impl Source for DirectionalPointSource {
    fn name(&self) -> &'static str {
        "directional point"
    }

    fn emit(&self, _rng: &mut Rng) -> Emission {
        Emission { position: self.position, direction: self.direction }
    }

    fn validate(&self, tissue: &dyn Tissue) -> Result<(), ConfigurationError> {
        check_inside(self.name(), &self.position, tissue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_normalised() {
        let s = DirectionalPointSource::new(Point3f::zero(), Vector3f::new(0.0, 0.0, 2.0)).unwrap();
        let e = s.emit(&mut Rng::new(0));
        assert_eq!(e.direction, Vector3f::new(0.0, 0.0, 1.0));
        assert!(DirectionalPointSource::new(Point3f::zero(), Vector3f::zero()).is_err());
    }
}

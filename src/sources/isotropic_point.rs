use crate::core::rng::Rng;
use crate::core::geometry::Point3f;
use crate::core::sampling::uniform_sample_sphere;
use crate::core::source::{Source, Emission, check_inside};
use crate::core::tissue::Tissue;
use crate::core::error::ConfigurationError;

/// Emits uniformly over the sphere from a point, normally buried in tissue.
#[derive(Debug, Clone)]
pub struct IsotropicPointSource {
    pub position: Point3f
}

impl IsotropicPointSource {
    pub fn new(position: Point3f) -> IsotropicPointSource {
        IsotropicPointSource { position }
    }
}

impl Source for IsotropicPointSource {
    fn name(&self) -> &'static str {
        "isotropic point"
    }

    fn emit(&self, rng: &mut Rng) -> Emission {
        Emission { position: self.position, direction: uniform_sample_sphere(rng) }
    }

    fn validate(&self, tissue: &dyn Tissue) -> Result<(), ConfigurationError> {
        check_inside(self.name(), &self.position, tissue)
    }
}

//! Photon emitters.
use std::fmt;
use super::mc::Float;
use super::rng::Rng;
use super::geometry::{Point3f, Vector3f};
use super::tissue::Tissue;
use super::error::ConfigurationError;
use crate::sources::{DirectionalPointSource, IsotropicPointSource, DirectionalCircularSource};

/// Initial position and direction of a photon.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Emission {
    pub position: Point3f,
    pub direction: Vector3f
}

pub trait Source: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Sample one photon. All randomness comes from `rng`.
    fn emit(&self, rng: &mut Rng) -> Emission;

    /// Extra source specific checks against the tissue.
    fn validate(&self, tissue: &dyn Tissue) -> Result<(), ConfigurationError>;
}

/// Radial intensity profile of a beam.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BeamProfile {
    Flat,
    /// Gaussian with the given full width at half maximum, in mm.
    Gaussian { fwhm: Float }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceInput {
    DirectionalPoint {
        position: Point3f,
        direction: Vector3f
    },
    IsotropicPoint {
        position: Point3f
    },
    /// A beam over a disk or annulus on a plane of constant z.
    DirectionalCircular {
        center: Point3f,
        direction: Vector3f,
        inner_radius: Float,
        outer_radius: Float,
        profile: BeamProfile
    }
}

impl SourceInput {
    /// A pencil beam normal to the tissue surface at the origin.
    pub fn pencil_beam() -> SourceInput {
        SourceInput::DirectionalPoint {
            position: Point3f::zero(),
            direction: Vector3f::new(0.0, 0.0, 1.0)
        }
    }

    pub fn create_source(&self, tissue: &dyn Tissue) -> Result<Box<dyn Source>, ConfigurationError> {
        let source: Box<dyn Source> = match self {
            SourceInput::DirectionalPoint { position, direction } => {
                Box::new(DirectionalPointSource::new(*position, *direction)?)
            }
            SourceInput::IsotropicPoint { position } => Box::new(IsotropicPointSource::new(*position)),
            SourceInput::DirectionalCircular { center, direction, inner_radius, outer_radius, profile } => {
                Box::new(DirectionalCircularSource::new(*center, *direction, *inner_radius, *outer_radius, *profile)?)
            }
        };
        source.validate(tissue)?;
        Ok(source)
    }
}

impl Default for SourceInput {
    fn default() -> SourceInput {
        SourceInput::pencil_beam()
    }
}

/// Directions are normalised and must not be zero or contain NaNs.
pub(crate) fn unit_direction(direction: Vector3f) -> Result<Vector3f, ConfigurationError> {
    let length = direction.length();
    if !(length > 0.0) || direction.has_nans() {
        return Err(ConfigurationError::InvalidSource { reason: format!("direction {} has no length", direction) });
    }
    Ok(direction / length)
}

/// Sources must start inside the tissue or on its surface.
pub(crate) fn check_inside(name: &str, p: &Point3f, tissue: &dyn Tissue) -> Result<(), ConfigurationError> {
    if p.has_nans() || p.z < tissue.z_top() || p.z > tissue.z_bottom() {
        return Err(ConfigurationError::InvalidSource {
            reason: format!("{} position {} lies outside the tissue [{}, {}]", name, p, tissue.z_top(), tissue.z_bottom())
        });
    }
    Ok(())
}

use super::mc::Float;
use super::error::ConfigurationError;
use std::fmt;

/// Optical properties of a homogeneous region.
/// Coefficients are in 1/mm.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OpticalProperties {
    /// Absorption coefficient.
    pub mua: Float,
    /// Scattering coefficient.
    pub mus: Float,
    /// Anisotropy factor, the mean cosine of the scattering angle.
    pub g: Float,
    /// Refractive index.
    pub n: Float
}

impl OpticalProperties {
    pub fn new(mua: Float, mus: Float, g: Float, n: Float) -> OpticalProperties {
        OpticalProperties { mua, mus, g, n }
    }

    /// Non-scattering, non-absorbing ambient medium with index 1.
    pub fn air() -> OpticalProperties {
        OpticalProperties::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Copy with a different absorption coefficient.
    pub fn with_mua(&self, mua: Float) -> OpticalProperties {
        OpticalProperties { mua, ..*self }
    }

    /// Copy with a different scattering coefficient.
    pub fn with_mus(&self, mus: Float) -> OpticalProperties {
        OpticalProperties { mus, ..*self }
    }

    /// Total interaction coefficient.
    #[inline]
    pub fn mut_total(&self) -> Float {
        self.mua + self.mus
    }

    /// Single scattering albedo mus/(mua+mus), 0 for a non-interacting medium.
    #[inline]
    pub fn albedo(&self) -> Float {
        let mut_total = self.mut_total();
        if mut_total > 0.0 { self.mus / mut_total } else { 0.0 }
    }

    /// True for media that never absorb or scatter.
    #[inline]
    pub fn is_ambient(&self) -> bool {
        self.mua == 0.0 && self.mus == 0.0
    }

    pub fn validate(&self, index: usize) -> Result<(), ConfigurationError> {
        let reason = if !(self.mua >= 0.0) || self.mua.is_infinite() {
            Some(format!("mua = {} must be a finite value >= 0", self.mua))
        } else if !(self.mus >= 0.0) || self.mus.is_infinite() {
            Some(format!("mus = {} must be a finite value >= 0", self.mus))
        } else if !(self.g >= -1.0 && self.g <= 1.0) {
            Some(format!("g = {} must lie in [-1, 1]", self.g))
        } else if !(self.n > 0.0) || self.n.is_infinite() {
            Some(format!("n = {} must be a finite value > 0", self.n))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(ConfigurationError::InvalidOpticalProperties { index, reason }),
            None => Ok(())
        }
    }
}

impl Default for OpticalProperties {
    fn default() -> OpticalProperties {
        OpticalProperties::new(0.01, 1.0, 0.8, 1.4)
    }
}

impl fmt::Display for OpticalProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[mua={}, mus={}, g={}, n={}]", self.mua, self.mus, self.g, self.n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_albedo() {
        let op = OpticalProperties::new(0.01, 0.99, 0.8, 1.4);
        assert!((op.albedo() - 0.99).abs() < 1e-15);
        assert_eq!(OpticalProperties::air().albedo(), 0.0);
        assert!(OpticalProperties::air().is_ambient());
    }

    #[test]
    fn test_validate() {
        assert!(OpticalProperties::default().validate(0).is_ok());
        assert!(OpticalProperties::new(-0.1, 1.0, 0.8, 1.4).validate(1).is_err());
        assert!(OpticalProperties::new(0.1, -1.0, 0.8, 1.4).validate(1).is_err());
        assert!(OpticalProperties::new(0.1, 1.0, 1.5, 1.4).validate(1).is_err());
        assert!(OpticalProperties::new(0.1, 1.0, 0.8, 0.0).validate(1).is_err());
        assert!(OpticalProperties::new(Float::NAN, 1.0, 0.8, 1.4).validate(1).is_err());
    }
}

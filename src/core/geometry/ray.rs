use crate::core::mc::Float;
use super::{Vector3f, Point3f};
use std::fmt;

/// A photon step in flight: the origin and unit direction that region
/// boundary queries are made against.
#[derive(Debug, Default, Copy, Clone)]
pub struct Ray {
    pub o: Point3f,
    pub d: Vector3f
}

impl Ray {
    pub fn new(o: Point3f, d: Vector3f) -> Ray {
        Ray{ o, d }
    }

    /// Position after travelling `s` mm.
    pub fn at(&self, s: Float) -> Point3f {
        self.o + self.d * s
    }
}

impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[o={}, d={}]", self.o, self.d)
    }
}

/// Unit direction from polar sine/cosine and azimuth.
pub fn spherical_direction(sin_theta: Float, cos_theta: Float, phi: Float) -> Vector3f {
    Vector3f {
        x: sin_theta * phi.cos(),
        y: sin_theta * phi.sin(),
        z: cos_theta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_along_ray() {
        let ray = Ray::new(Point3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 0.6, 0.8));
        assert_eq!(ray.at(5.0), Point3f::new(1.0, 3.0, 4.0));
        let straight_down = spherical_direction(0.0, 1.0, 0.3);
        assert_eq!(straight_down, Vector3f::new(0.0, 0.0, 1.0));
    }
}

//! Reflection and refraction at refractive index interfaces.
use super::mc::Float;
use super::geometry::Vector3f;

/// Unpolarised Fresnel reflectance for light travelling from index `n1` into
/// `n2`, with `cos_i` the cosine of the angle of incidence. Returns the
/// reflectance and the cosine of the refracted angle (0 on total internal
/// reflection).
pub fn fresnel(n1: Float, n2: Float, cos_i: Float) -> (Float, Float) {
    let cos_i = cos_i.abs().min(1.0);
    if n1 == n2 {
        return (0.0, cos_i);
    }
    if cos_i > 1.0 - 1e-12 {
        let r = (n1 - n2) / (n1 + n2);
        return (r * r, cos_i);
    }
    if cos_i < 1e-6 {
        return (1.0, 0.0);
    }
    let sin_i = (1.0 - cos_i * cos_i).sqrt();
    let sin_t = n1 / n2 * sin_i;
    if sin_t >= 1.0 {
        return (1.0, 0.0);
    }
    let cos_t = (1.0 - sin_t * sin_t).sqrt();

    let cap = cos_i * cos_t - sin_i * sin_t;
    let cam = cos_i * cos_t + sin_i * sin_t;
    let sap = sin_i * cos_t + cos_i * sin_t;
    let sam = sin_i * cos_t - cos_i * sin_t;
    let r = 0.5 * sam * sam * (cam * cam + cap * cap) / (sap * sap * cam * cam);
    (r.min(1.0), cos_t)
}

/// Refract unit direction `d` through an interface with unit normal `normal`,
/// where `normal` points to the side the photon is travelling into.
pub fn refract(d: &Vector3f, normal: &Vector3f, n1: Float, n2: Float, cos_t: Float) -> Vector3f {
    let eta = n1 / n2;
    let cos_i = d.dot(normal).abs();
    (*d * eta + *normal * (cos_t - eta * cos_i)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_incidence() {
        let (r, cos_t) = fresnel(1.0, 1.4, 1.0);
        assert!((r - (0.4 / 2.4) * (0.4 / 2.4)).abs() < 1e-15);
        assert_eq!(cos_t, 1.0);
    }

    #[test]
    fn test_matched_index() {
        assert_eq!(fresnel(1.4, 1.4, 0.3), (0.0, 0.3));
    }

    #[test]
    fn test_total_internal_reflection() {
        let (r, cos_t) = fresnel(1.4, 1.0, 0.5);
        assert_eq!(r, 1.0);
        assert_eq!(cos_t, 0.0);
    }

    #[test]
    fn test_refract_obeys_snell() {
        let d = Vector3f::new(0.6, 0.0, 0.8);
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let (_, cos_t) = fresnel(1.0, 1.4, 0.8);
        let t = refract(&d, &n, 1.0, 1.4, cos_t);
        assert!((t.x * 1.4 - 0.6).abs() < 1e-12);
        assert!((t.z - cos_t).abs() < 1e-12);
    }
}

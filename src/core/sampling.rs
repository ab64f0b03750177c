//! Sampling routines for the photon random walk.

use super::rng::Rng;
use super::mc::{Float, consts::PI};
use super::geometry::{Vector3f, spherical_direction};

/// Sample a free path length for an exponential attenuation coefficient.
/// Returns infinity for a non-interacting medium.
#[inline]
pub fn sample_free_path(coefficient: Float, rng: &mut Rng) -> Float {
    if coefficient <= 0.0 {
        return Float::INFINITY;
    }
    // 1 - u lies in (0, 1] so the logarithm is always finite
    -(1.0 - rng.uniform_float()).ln() / coefficient
}

/// Sample the cosine of the polar scattering angle from the
/// Henyey-Greenstein phase function with anisotropy g.
pub fn sample_henyey_greenstein(g: Float, rng: &mut Rng) -> Float {
    let u = rng.uniform_float();
    if g.abs() < 1e-6 {
        return 2.0 * u - 1.0;
    }
    let g2 = g * g;
    let temp = (1.0 - g2) / (1.0 - g + 2.0 * g * u);
    num::clamp((1.0 + g2 - temp * temp) / (2.0 * g), -1.0, 1.0)
}

/// Rotate direction `d` by polar angle (given by its cosine) and azimuthal angle phi.
pub fn rotate_direction(d: &Vector3f, cos_theta: Float, phi: Float) -> Vector3f {
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let cos_phi = phi.cos();
    let sin_phi = phi.sin();
    if d.z.abs() > 1.0 - 1e-12 {
        // Close to normal: use the fixed frame to avoid dividing by zero
        Vector3f::new(
            sin_theta * cos_phi,
            sin_theta * sin_phi,
            cos_theta * d.z.signum()
        )
    } else {
        let temp = (1.0 - d.z * d.z).sqrt();
        Vector3f::new(
            sin_theta * (d.x * d.z * cos_phi - d.y * sin_phi) / temp + d.x * cos_theta,
            sin_theta * (d.y * d.z * cos_phi + d.x * sin_phi) / temp + d.y * cos_theta,
            -sin_theta * cos_phi * temp + d.z * cos_theta
        ).normalize()
    }
}

/// Uniformly sample a direction over the unit sphere.
pub fn uniform_sample_sphere(rng: &mut Rng) -> Vector3f {
    let cos_theta = 1.0 - 2.0 * rng.uniform_float();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * PI * rng.uniform_float();
    spherical_direction(sin_theta, cos_theta, phi)
}

/// Sample a radius with density proportional to r on [inner, outer], i.e.
/// uniformly by area over an annulus.
pub fn uniform_sample_annulus_radius(inner: Float, outer: Float, rng: &mut Rng) -> Float {
    let u = rng.uniform_float();
    (inner * inner + u * (outer * outer - inner * inner)).sqrt()
}

/// Sample a radius from a Gaussian beam profile with the given full width at
/// half maximum, truncated to [inner, outer].
pub fn gaussian_sample_radius(fwhm: Float, inner: Float, outer: Float, rng: &mut Rng) -> Float {
    let scale = fwhm * fwhm / (4.0 * (2.0 as Float).ln());
    // invert the cumulative distribution of r exp(-r^2/scale) between the limits
    let lo = 1.0 - (-inner * inner / scale).exp();
    let hi = 1.0 - (-outer * outer / scale).exp();
    let u = lo + rng.uniform_float() * (hi - lo);
    (-scale * (1.0 - u).ln()).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_henyey_greenstein_mean_cosine() {
        let mut rng = Rng::new(1);
        let g = 0.8;
        let n = 200_000;
        let mean: Float = (0..n).map(|_| sample_henyey_greenstein(g, &mut rng)).sum::<Float>() / n as Float;
        assert!((mean - g).abs() < 0.01, "mean cosine {}", mean);
    }

    #[test]
    fn test_rotate_direction_keeps_unit_length() {
        let mut rng = Rng::new(5);
        let mut d = Vector3f::new(0.0, 0.0, 1.0);
        for _ in 0..1000 {
            let cos_theta = sample_henyey_greenstein(0.9, &mut rng);
            d = rotate_direction(&d, cos_theta, 2.0 * PI * rng.uniform_float());
            assert!((d.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rotate_direction_angle() {
        let d = Vector3f::new(0.6, 0.0, 0.8);
        let r = rotate_direction(&d, 0.5, 1.0);
        assert!((r.dot(&d) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_free_path_non_interacting() {
        let mut rng = Rng::new(1);
        assert!(sample_free_path(0.0, &mut rng).is_infinite());
        assert!(sample_free_path(1.0, &mut rng) >= 0.0);
    }

    #[test]
    fn test_sampled_radii_within_limits() {
        let mut rng = Rng::new(9);
        for _ in 0..1000 {
            let r = uniform_sample_annulus_radius(0.5, 1.0, &mut rng);
            assert!(r >= 0.5 && r <= 1.0);
            let r = gaussian_sample_radius(1.0, 0.0, 2.0, &mut rng);
            assert!(r >= 0.0 && r <= 2.0 + 1e-12);
        }
    }
}

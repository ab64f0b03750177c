//! Bin axes used by detectors to map continuous values onto tally indices.
use super::mc::{Float, consts::PI};
use super::error::DetectorError;
use std::fmt;

/// Evenly spaced points `start..=stop`. An axis of `count` points defines
/// `count - 1` bins.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DoubleRange {
    pub start: Float,
    pub stop: Float,
    pub count: usize,
    /// Send values above `stop` into the last bin instead of dropping them.
    pub overflow: bool
}

impl DoubleRange {
    pub fn new(start: Float, stop: Float, count: usize) -> DoubleRange {
        DoubleRange { start, stop, count, overflow: false }
    }

    /// Make the last bin semi-infinite.
    pub fn with_overflow(self) -> DoubleRange {
        DoubleRange { overflow: true, ..self }
    }

    /// Spacing between consecutive points.
    #[inline]
    pub fn delta(&self) -> Float {
        if self.count > 1 {
            (self.stop - self.start) / (self.count - 1) as Float
        } else {
            0.0
        }
    }

    #[inline]
    pub fn bin_count(&self) -> usize {
        self.count.saturating_sub(1)
    }

    /// The `count` points of the axis.
    pub fn values(&self) -> Vec<Float> {
        let delta = self.delta();
        (0..self.count).map(|i| self.start + i as Float * delta).collect()
    }

    /// Midpoint of bin `i`.
    #[inline]
    pub fn bin_center(&self, i: usize) -> Float {
        self.start + (i as Float + 0.5) * self.delta()
    }

    /// Map a value onto its bin. A value lying exactly on an interior edge
    /// belongs to the lower bin and `start` belongs to bin 0. Values outside
    /// the range are dropped unless the axis overflows into its last bin.
    pub fn which_bin(&self, value: Float) -> Option<usize> {
        let n = self.bin_count();
        if n == 0 || value.is_nan() || value < self.start {
            return None;
        }
        if value > self.stop {
            return if self.overflow { Some(n - 1) } else { None };
        }
        // compare against the edges exactly as `values` produces them
        let delta = self.delta();
        let edge = |k: usize| self.start + k as Float * delta;
        let mut k = (((value - self.start) / delta).floor() as usize).min(n - 1);
        if k > 0 && value <= edge(k) {
            k -= 1;
        } else if k + 1 < n && value > edge(k + 1) {
            k += 1;
        }
        Some(k)
    }

    /// Check that the axis describes at least one bin of positive width.
    pub fn validate(&self, name: &str, axis: &'static str) -> Result<(), DetectorError> {
        let reason = if !self.start.is_finite() || !self.stop.is_finite() {
            Some(format!("limits [{}, {}] must be finite", self.start, self.stop))
        } else if self.count < 2 {
            Some(format!("{} points define no bins", self.count))
        } else if !(self.stop > self.start) {
            Some(format!("stop {} must be greater than start {}", self.stop, self.start))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(DetectorError::InvalidBinning { name: name.to_string(), axis, reason }),
            None => Ok(())
        }
    }

    /// Check a list of evaluation points (frequencies) rather than bins.
    pub fn validate_points(&self, name: &str, axis: &'static str) -> Result<(), DetectorError> {
        if self.count == 0 || !self.start.is_finite() || !self.stop.is_finite() {
            return Err(DetectorError::InvalidBinning {
                name: name.to_string(),
                axis,
                reason: format!("{} points over [{}, {}]", self.count, self.start, self.stop)
            });
        }
        Ok(())
    }

    /// Turn a single-value axis into one bin of half width `half_width`
    /// centred on that value, with the lower edge clamped at `floor`.
    /// Axes that already describe bins are returned unchanged.
    ///
    /// Only perturbation detectors accept single-value axes; a caller asking
    /// for R at one source-detector separation passes the separation itself
    /// rather than a bin.
    pub fn recenter_single_value(&self, half_width: Float, floor: Float) -> DoubleRange {
        if self.count != 1 {
            return *self;
        }
        DoubleRange {
            start: (self.start - half_width).max(floor),
            stop: self.start + half_width,
            count: 2,
            overflow: false
        }
    }
}

impl fmt::Display for DoubleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}; {}]", self.start, self.stop, self.count)
    }
}

/// Area of the annulus covered by radial bin `i`, 2 pi rho_mid d_rho.
#[inline]
pub fn annulus_area(rho: &DoubleRange, i: usize) -> Float {
    2.0 * PI * rho.bin_center(i) * rho.delta()
}

/// Solid angle covered by polar angle bin `i`, 2 pi sin(theta_mid) d_theta.
#[inline]
pub fn polar_solid_angle(angle: &DoubleRange, i: usize) -> Float {
    2.0 * PI * angle.bin_center(i).sin() * angle.delta()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_which_bin_edges_go_low() {
        let r = DoubleRange::new(0.0, 2.0, 5);
        assert_eq!(r.bin_count(), 4);
        assert_eq!(r.delta(), 0.5);
        assert_eq!(r.which_bin(0.0), Some(0));
        assert_eq!(r.which_bin(0.25), Some(0));
        assert_eq!(r.which_bin(0.5), Some(0));
        assert_eq!(r.which_bin(0.75), Some(1));
        assert_eq!(r.which_bin(1.0), Some(1));
        assert_eq!(r.which_bin(2.0), Some(3));
    }

    #[test]
    fn test_generated_edges_go_low() {
        for &(start, stop, count) in &[(0.0, 10.0, 101), (0.0, 1.0, 11), (-3.0, 7.3, 37)] {
            let r = DoubleRange::new(start, stop, count);
            let edges = r.values();
            for i in 1..count - 1 {
                assert_eq!(r.which_bin(edges[i]), Some(i - 1), "edge {} of {:?}", i, r);
                let mid = 0.5 * (edges[i] + edges[i + 1]);
                assert_eq!(r.which_bin(mid), Some(i), "midpoint {} of {:?}", i, r);
            }
        }
    }

    #[test]
    fn test_which_bin_out_of_range() {
        let r = DoubleRange::new(0.0, 2.0, 5);
        assert_eq!(r.which_bin(-0.1), None);
        assert_eq!(r.which_bin(2.1), None);
        assert_eq!(r.which_bin(Float::NAN), None);
        assert_eq!(r.with_overflow().which_bin(100.0), Some(3));
        assert_eq!(r.with_overflow().which_bin(-0.1), None);
    }

    #[test]
    fn test_negative_axis() {
        let r = DoubleRange::new(-1.0, 1.0, 5);
        assert_eq!(r.which_bin(-1.0), Some(0));
        assert_eq!(r.which_bin(-0.25), Some(1));
        assert_eq!(r.which_bin(0.0), Some(1));
        assert_eq!(r.which_bin(0.25), Some(2));
    }

    #[test]
    fn test_validate() {
        assert!(DoubleRange::new(0.0, 1.0, 2).validate("d", "rho").is_ok());
        assert!(DoubleRange::new(0.0, 1.0, 1).validate("d", "rho").is_err());
        assert!(DoubleRange::new(1.0, 1.0, 3).validate("d", "rho").is_err());
        assert!(DoubleRange::new(0.0, Float::INFINITY, 3).validate("d", "rho").is_err());
    }

    #[test]
    fn test_recenter_single_value() {
        let r = DoubleRange::new(1.0, 1.0, 1).recenter_single_value(0.25, 0.0);
        assert_eq!(r, DoubleRange::new(0.75, 1.25, 2));
        let r = DoubleRange::new(0.1, 0.1, 1).recenter_single_value(0.25, 0.0);
        assert_eq!(r.start, 0.0);
        let untouched = DoubleRange::new(0.0, 1.0, 11);
        assert_eq!(untouched.recenter_single_value(0.25, 0.0), untouched);
    }

    #[test]
    fn test_annulus_area_matches_ring_area() {
        let r = DoubleRange::new(0.0, 2.0, 5);
        for i in 0..r.bin_count() {
            let lo = i as Float * 0.5;
            let hi = lo + 0.5;
            assert!((annulus_area(&r, i) - PI * (hi * hi - lo * lo)).abs() < 1e-12);
        }
    }
}

//! Absorption weighting schemes and the weight each one attributes to
//! absorption along a photon path.
use std::fmt;
use super::mc::Float;
use super::optical_properties::OpticalProperties;
use super::photon::{HistoryPoint, HistoryEvent, PhotonStatus};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AbsorptionWeightingType {
    /// Absorption is a binary event sampled at each collision.
    Analog,
    /// The weight is reduced by the albedo at each collision.
    Discrete,
    /// The weight decays continuously along the path, steps use mus only.
    Continuous
}

impl AbsorptionWeightingType {
    /// Coefficient the free path between collisions is sampled from.
    #[inline]
    pub fn free_path_coefficient(self, ops: &OpticalProperties) -> Float {
        match self {
            AbsorptionWeightingType::Continuous => ops.mus,
            _ => ops.mut_total()
        }
    }

    /// Weight absorbed between two consecutive history points, attributed to
    /// `current`. `ops` is indexed by region.
    pub fn absorbed_weight(self, previous: &HistoryPoint, current: &HistoryPoint, ops: &[OpticalProperties]) -> Float {
        match self {
            AbsorptionWeightingType::Analog => {
                if current.status == PhotonStatus::Absorbed {
                    previous.weight
                } else {
                    0.0
                }
            }
            AbsorptionWeightingType::Discrete => {
                if current.event != HistoryEvent::Collision {
                    return 0.0;
                }
                let op = &ops[current.region_index];
                let mut_total = op.mut_total();
                if mut_total > 0.0 { previous.weight * op.mua / mut_total } else { 0.0 }
            }
            AbsorptionWeightingType::Continuous => {
                // the segment lies in the region the previous point left into
                let mua = ops[previous.region_index].mua;
                let ds = previous.position.distance(&current.position);
                previous.weight * (1.0 - (-mua * ds).exp())
            }
        }
    }

    /// Fluence contribution for an absorbed weight in a region. Dividing by
    /// mua is unstable for weakly absorbing regions under continuous
    /// weighting; zero deposits never reach this point.
    #[inline]
    pub fn fluence(self, absorbed: Float, op: &OpticalProperties) -> Float {
        absorbed / op.mua
    }
}

impl fmt::Display for AbsorptionWeightingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Default for AbsorptionWeightingType {
    fn default() -> AbsorptionWeightingType {
        AbsorptionWeightingType::Discrete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Point3f, Vector3f};

    fn point(z: Float, weight: Float, event: HistoryEvent, status: PhotonStatus) -> HistoryPoint {
        HistoryPoint {
            position: Point3f::new(0.0, 0.0, z),
            direction: Vector3f::new(0.0, 0.0, 1.0),
            weight,
            region_index: 1,
            event,
            status
        }
    }

    fn ops() -> Vec<OpticalProperties> {
        vec![OpticalProperties::air(), OpticalProperties::new(0.1, 0.9, 0.8, 1.4), OpticalProperties::air()]
    }

    #[test]
    fn test_discrete_pseudo_collisions_deposit_nothing() {
        let a = point(0.0, 1.0, HistoryEvent::Launch, PhotonStatus::Alive);
        let b = point(1.0, 1.0, HistoryEvent::TissueBoundary, PhotonStatus::Alive);
        let c = point(1.5, 0.9, HistoryEvent::Collision, PhotonStatus::Alive);
        let w = AbsorptionWeightingType::Discrete;
        assert_eq!(w.absorbed_weight(&a, &b, &ops()), 0.0);
        assert!((w.absorbed_weight(&b, &c, &ops()) - 0.1).abs() < 1e-15);
    }

    #[test]
    fn test_analog_only_absorption_events() {
        let a = point(0.0, 1.0, HistoryEvent::Launch, PhotonStatus::Alive);
        let b = point(1.0, 1.0, HistoryEvent::Collision, PhotonStatus::Alive);
        let c = point(1.5, 1.0, HistoryEvent::Collision, PhotonStatus::Absorbed);
        let w = AbsorptionWeightingType::Analog;
        assert_eq!(w.absorbed_weight(&a, &b, &ops()), 0.0);
        assert_eq!(w.absorbed_weight(&b, &c, &ops()), 1.0);
    }

    #[test]
    fn test_continuous_matches_weight_decay() {
        let a = point(0.0, 1.0, HistoryEvent::Launch, PhotonStatus::Alive);
        let b = point(2.0, (-0.2 as Float).exp(), HistoryEvent::Collision, PhotonStatus::Alive);
        let w = AbsorptionWeightingType::Continuous;
        assert!((w.absorbed_weight(&a, &b, &ops()) - (1.0 - b.weight)).abs() < 1e-15);
        assert_eq!(w.free_path_coefficient(&ops()[1]), 0.9);
        assert_eq!(AbsorptionWeightingType::Discrete.free_path_coefficient(&ops()[1]), 1.0);
    }
}

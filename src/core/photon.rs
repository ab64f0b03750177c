//! Photon state shared by the transport stepper, the virtual boundaries and
//! the detectors.
use smallvec::SmallVec;
use std::fmt;
use super::mc::Float;
use super::geometry::{Point3f, Vector3f, Ray};

/// Condition of a photon. Everything except `Alive` terminates the history.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PhotonStatus {
    Alive,
    ExitedTop,
    ExitedBottom,
    ExitedLateral,
    Absorbed,
    KilledRussianRoulette,
    KilledOverMaximumPathLength,
    KilledOverMaximumCollisions
}

impl PhotonStatus {
    #[inline]
    pub fn is_alive(self) -> bool {
        self == PhotonStatus::Alive
    }

    /// Did the photon leave the tissue through one of its outer surfaces.
    #[inline]
    pub fn is_exit(self) -> bool {
        match self {
            PhotonStatus::ExitedTop | PhotonStatus::ExitedBottom | PhotonStatus::ExitedLateral => true,
            _ => false
        }
    }

    /// Terminated by a run limit rather than by physics.
    #[inline]
    pub fn is_killed(self) -> bool {
        match self {
            PhotonStatus::KilledRussianRoulette
            | PhotonStatus::KilledOverMaximumPathLength
            | PhotonStatus::KilledOverMaximumCollisions => true,
            _ => false
        }
    }
}

impl fmt::Display for PhotonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The boundary event the stepper is about to resolve. Virtual boundaries
/// only respond to the probe they expect.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BoundaryProbe {
    None,
    /// Transmitted out through the top of the tissue.
    ReflectedTissueBoundary,
    /// Transmitted out through the bottom of the tissue.
    TransmittedTissueBoundary,
    /// Specularly reflected at launch.
    SpecularTissueBoundary,
    /// Left through the lateral wall of a bounding volume.
    BoundingVolumeTissueBoundary
}

impl BoundaryProbe {
    /// Probes that end the photon history once resolved.
    #[inline]
    pub fn is_exit(self) -> bool {
        match self {
            BoundaryProbe::ReflectedTissueBoundary
            | BoundaryProbe::TransmittedTissueBoundary
            | BoundaryProbe::BoundingVolumeTissueBoundary => true,
            _ => false
        }
    }

    /// Status a photon takes on when the probe is resolved.
    pub fn exit_status(self) -> Option<PhotonStatus> {
        match self {
            BoundaryProbe::ReflectedTissueBoundary => Some(PhotonStatus::ExitedTop),
            BoundaryProbe::TransmittedTissueBoundary => Some(PhotonStatus::ExitedBottom),
            BoundaryProbe::BoundingVolumeTissueBoundary => Some(PhotonStatus::ExitedLateral),
            _ => None
        }
    }
}

/// Per photon, per step relation to one virtual boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VirtualBoundaryCrossing {
    NotYetTested,
    Missed,
    Crossed
}

/// Path length travelled and collisions suffered in one region.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RegionCollisionInfo {
    pub path_length: Float,
    pub collisions: u64
}

/// Collision info for every region of the tissue, indexed by region.
pub type CollisionInfo = SmallVec<[RegionCollisionInfo; 8]>;

/// Allocate zeroed collision info for `region_count` regions.
pub fn new_collision_info(region_count: usize) -> CollisionInfo {
    SmallVec::from_elem(RegionCollisionInfo::default(), region_count)
}

/// A snapshot of a photon, as handed to detectors.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotonDataPoint {
    pub position: Point3f,
    pub direction: Vector3f,
    /// Starts at 1 and only decreases, except that a Russian roulette
    /// survivor is scaled by 1/chance and may exceed 1.
    pub weight: Float,
    /// Time of flight in ns.
    pub total_time: Float,
    pub status: PhotonStatus,
    pub collision_info: CollisionInfo
}

impl PhotonDataPoint {
    pub fn new(position: Point3f, direction: Vector3f, weight: Float, region_count: usize) -> PhotonDataPoint {
        PhotonDataPoint {
            position,
            direction,
            weight,
            total_time: 0.0,
            status: PhotonStatus::Alive,
            collision_info: new_collision_info(region_count)
        }
    }

    /// The photon's current position and direction as a ray.
    pub fn ray(&self) -> Ray {
        Ray::new(self.position, self.direction)
    }

    /// Total path length over all regions.
    pub fn total_path_length(&self) -> Float {
        self.collision_info.iter().map(|c| c.path_length).sum()
    }

    pub fn total_collisions(&self) -> u64 {
        self.collision_info.iter().map(|c| c.collisions).sum()
    }
}

impl fmt::Display for PhotonDataPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[p={}, d={}, w={}, t={}, {}]",
            self.position, self.direction, self.weight, self.total_time, self.status)
    }
}

/// What produced a history point.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    Launch,
    /// A real interaction: absorption and/or scattering.
    Collision,
    /// A stop on a refractive boundary between regions.
    TissueBoundary,
    /// A stop on a virtual boundary.
    VirtualBoundary
}

/// One vertex of a photon path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HistoryPoint {
    pub position: Point3f,
    pub direction: Vector3f,
    /// Weight after the event.
    pub weight: Float,
    /// Region the photon is in after the event.
    pub region_index: usize,
    pub event: HistoryEvent,
    pub status: PhotonStatus
}

/// The complete path of one photon, consumed by volume detectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotonHistory {
    pub points: Vec<HistoryPoint>
}

impl PhotonHistory {
    pub fn new() -> PhotonHistory {
        PhotonHistory { points: Vec::new() }
    }

    pub fn push(&mut self, point: HistoryPoint) {
        self.points.push(point);
    }

    /// Consecutive pairs of points, each describing one path segment.
    pub fn segments(&self) -> impl Iterator<Item = (&HistoryPoint, &HistoryPoint)> {
        self.points.iter().zip(self.points.iter().skip(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_exit_status() {
        assert_eq!(BoundaryProbe::ReflectedTissueBoundary.exit_status(), Some(PhotonStatus::ExitedTop));
        assert_eq!(BoundaryProbe::TransmittedTissueBoundary.exit_status(), Some(PhotonStatus::ExitedBottom));
        assert_eq!(BoundaryProbe::BoundingVolumeTissueBoundary.exit_status(), Some(PhotonStatus::ExitedLateral));
        assert!(!BoundaryProbe::SpecularTissueBoundary.is_exit());
        assert!(BoundaryProbe::SpecularTissueBoundary.exit_status().is_none());
    }

    #[test]
    fn test_collision_totals() {
        let mut dp = PhotonDataPoint::new(Point3f::zero(), Vector3f::new(0.0, 0.0, 1.0), 1.0, 3);
        dp.collision_info[1].path_length = 2.0;
        dp.collision_info[1].collisions = 4;
        dp.collision_info[2].path_length = 0.5;
        dp.collision_info[2].collisions = 1;
        assert_eq!(dp.total_path_length(), 2.5);
        assert_eq!(dp.total_collisions(), 5);
        assert!(dp.status.is_alive());
    }

    #[test]
    fn test_segments() {
        let p = HistoryPoint {
            position: Point3f::zero(),
            direction: Vector3f::new(0.0, 0.0, 1.0),
            weight: 1.0,
            region_index: 1,
            event: HistoryEvent::Launch,
            status: PhotonStatus::Alive
        };
        let mut h = PhotonHistory::new();
        h.push(p);
        assert_eq!(h.segments().count(), 0);
        h.push(HistoryPoint { event: HistoryEvent::Collision, ..p });
        h.push(HistoryPoint { event: HistoryEvent::Collision, ..p });
        assert_eq!(h.segments().count(), 2);
    }
}

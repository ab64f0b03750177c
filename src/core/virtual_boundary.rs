//! Virtual boundaries: detection surfaces that intercept photons and route
//! their data points to detectors.
use std::fmt;
use smallvec::SmallVec;
use super::mc::Float;
use super::photon::{PhotonDataPoint, PhotonHistory, BoundaryProbe, VirtualBoundaryCrossing};
use super::detector::{CreatedDetector, SurfaceDetector, HistoryDetector, DetectorInput, DetectorContext, DetectorResults};
use super::database::{DatabaseType, DatabaseWriter};
use super::error::DetectorError;
use crate::virtual_boundaries::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VirtualBoundaryType {
    DiffuseReflectance,
    DiffuseTransmittance,
    SpecularReflectance,
    SurfaceFiber,
    BoundingCylinder,
    GenericVolume
}

impl fmt::Display for VirtualBoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub trait VirtualBoundary: Send + Sync + fmt::Debug {
    fn vb_type(&self) -> VirtualBoundaryType;

    /// Will the photon, with the given pending probe, cross this boundary.
    fn will_hit_boundary(&self, dp: &PhotonDataPoint, probe: BoundaryProbe) -> bool;

    /// Distance to the boundary, or infinity when it does not apply.
    fn get_distance_to_virtual_boundary(&self, dp: &PhotonDataPoint, probe: BoundaryProbe) -> Float;

    fn detector_controller(&self) -> &DetectorController;

    fn detector_controller_mut(&mut self) -> &mut DetectorController;

    /// Copy of the boundary with empty detectors, for a parallel worker.
    fn fork(&self) -> Box<dyn VirtualBoundary>;
}

/// Detectors attached to one virtual boundary. Each detector keeps the
/// position of its input so results come back in input order.
#[derive(Debug, Default)]
pub struct DetectorController {
    surface: Vec<(usize, Box<dyn SurfaceDetector>)>,
    history: Vec<(usize, Box<dyn HistoryDetector>)>
}

impl DetectorController {
    pub fn new() -> DetectorController {
        DetectorController::default()
    }

    pub fn add(&mut self, order: usize, detector: CreatedDetector) {
        match detector {
            CreatedDetector::Surface(d) => self.surface.push((order, d)),
            CreatedDetector::History(d) => self.history.push((order, d))
        }
    }

    pub fn len(&self) -> usize {
        self.surface.len() + self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_history_detectors(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn tally(&mut self, dp: &PhotonDataPoint) {
        for (_, d) in self.surface.iter_mut() {
            d.tally(dp);
        }
    }

    pub fn tally_history(&mut self, history: &PhotonHistory) {
        for (_, d) in self.history.iter_mut() {
            d.tally(history);
        }
    }

    pub fn fork(&self) -> DetectorController {
        DetectorController {
            surface: self.surface.iter().map(|(i, d)| (*i, d.fork())).collect(),
            history: self.history.iter().map(|(i, d)| (*i, d.fork())).collect()
        }
    }

    /// Add the accumulators of a controller forked from this one.
    pub fn merge(&mut self, other: &DetectorController) -> Result<(), DetectorError> {
        for ((_, a), (_, b)) in self.surface.iter_mut().zip(other.surface.iter()) {
            a.merge(b.tally_type(), b.values())?;
        }
        for ((_, a), (_, b)) in self.history.iter_mut().zip(other.history.iter()) {
            a.merge(b.tally_type(), b.values())?;
        }
        Ok(())
    }

    pub fn normalize(&mut self, num_photons: u64) -> Result<(), DetectorError> {
        for (_, d) in self.surface.iter_mut() {
            d.normalize(num_photons)?;
        }
        for (_, d) in self.history.iter_mut() {
            d.normalize(num_photons)?;
        }
        Ok(())
    }

    pub fn results(&self) -> Vec<(usize, DetectorResults)> {
        self.surface.iter().map(|(i, d)| (*i, d.results()))
            .chain(self.history.iter().map(|(i, d)| (*i, d.results())))
            .collect()
    }
}

/// Boundaries within this distance of the nearest one are crossed together,
/// e.g. a fiber lying on the reflectance plane.
const COINCIDENT_DISTANCE: Float = 1e-12;

/// Every virtual boundary of a run, with the per step crossing state of the
/// current photon.
#[derive(Debug)]
pub struct VirtualBoundarySet {
    boundaries: Vec<Box<dyn VirtualBoundary>>,
    crossings: Vec<VirtualBoundaryCrossing>,
    database: Option<DatabaseWriter>
}

impl VirtualBoundarySet {
    /// Build the detectors and attach each to the boundary that feeds it.
    /// Reflectance and transmittance planes are also created when only the
    /// photon database needs them.
    pub fn new(detectors: &[DetectorInput], context: &DetectorContext, database_types: &[DatabaseType])
        -> Result<VirtualBoundarySet, DetectorError>
    {
        let mut boundaries: Vec<Box<dyn VirtualBoundary>> = Vec::new();
        for (order, input) in detectors.iter().enumerate() {
            let detector = input.create(context)?;
            let vb_type = input.tally_type().virtual_boundary_type();
            let existing = if vb_type == VirtualBoundaryType::SurfaceFiber {
                None
            } else {
                boundaries.iter().position(|vb| vb.vb_type() == vb_type)
            };
            let index = match existing {
                Some(i) => i,
                None => {
                    boundaries.push(create_virtual_boundary(input, context)?);
                    boundaries.len() - 1
                }
            };
            boundaries[index].detector_controller_mut().add(order, detector);
        }
        for kind in database_types {
            if !boundaries.iter().any(|vb| vb.vb_type() == kind.virtual_boundary_type()) {
                let plane = match kind {
                    DatabaseType::DiffuseReflectance => PlanarVirtualBoundary::diffuse_reflectance(context.z_top),
                    DatabaseType::DiffuseTransmittance => PlanarVirtualBoundary::diffuse_transmittance(context.z_bottom)
                };
                boundaries.push(Box::new(plane));
            }
        }
        let database = if database_types.is_empty() { None } else { Some(DatabaseWriter::new(database_types.to_vec())) };
        let crossings = vec![VirtualBoundaryCrossing::NotYetTested; boundaries.len()];
        Ok(VirtualBoundarySet { boundaries, crossings, database })
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn boundaries(&self) -> &[Box<dyn VirtualBoundary>] {
        &self.boundaries
    }

    pub fn crossings(&self) -> &[VirtualBoundaryCrossing] {
        &self.crossings
    }

    /// Do any detectors need complete photon histories.
    pub fn needs_history(&self) -> bool {
        self.boundaries.iter().any(|vb| vb.detector_controller().has_history_detectors())
    }

    /// Test every boundary for the current step and return the distance to
    /// the nearest crossing. Boundaries at that distance are marked crossed.
    pub fn nearest_crossing(&mut self, dp: &PhotonDataPoint, probe: BoundaryProbe) -> Float {
        let distances: SmallVec<[Float; 8]> = self.boundaries.iter()
            .map(|vb| vb.get_distance_to_virtual_boundary(dp, probe))
            .collect();
        let nearest = distances.iter().cloned().fold(Float::INFINITY, Float::min);
        for (state, d) in self.crossings.iter_mut().zip(distances.iter()) {
            *state = if d.is_finite() && *d <= nearest + COINCIDENT_DISTANCE {
                VirtualBoundaryCrossing::Crossed
            } else {
                VirtualBoundaryCrossing::Missed
            };
        }
        nearest
    }

    /// Hand the data point to the detectors of every crossed boundary and
    /// reset the crossing states.
    pub fn tally_crossed(&mut self, dp: &PhotonDataPoint) {
        for (vb, state) in self.boundaries.iter_mut().zip(self.crossings.iter_mut()) {
            if *state == VirtualBoundaryCrossing::Crossed {
                vb.detector_controller_mut().tally(dp);
                if let Some(db) = self.database.as_mut() {
                    db.record(vb.vb_type(), dp);
                }
            }
            *state = VirtualBoundaryCrossing::NotYetTested;
        }
    }

    /// Hand a finished photon history to the volume detectors.
    pub fn tally_history(&mut self, history: &PhotonHistory) {
        for vb in self.boundaries.iter_mut() {
            vb.detector_controller_mut().tally_history(history);
        }
    }

    /// Copy with empty detectors and database, for a parallel worker.
    pub fn fork(&self) -> VirtualBoundarySet {
        VirtualBoundarySet {
            boundaries: self.boundaries.iter().map(|vb| vb.fork()).collect(),
            crossings: vec![VirtualBoundaryCrossing::NotYetTested; self.boundaries.len()],
            database: self.database.as_ref().map(|db| db.fork())
        }
    }

    /// Add the accumulators and database records of a forked set.
    pub fn merge(&mut self, other: VirtualBoundarySet) -> Result<(), DetectorError> {
        for (a, b) in self.boundaries.iter_mut().zip(other.boundaries.iter()) {
            a.detector_controller_mut().merge(b.detector_controller())?;
        }
        if let (Some(a), Some(b)) = (self.database.as_mut(), other.database) {
            a.append(b);
        }
        Ok(())
    }

    pub fn normalize(&mut self, num_photons: u64) -> Result<(), DetectorError> {
        for vb in self.boundaries.iter_mut() {
            vb.detector_controller_mut().normalize(num_photons)?;
        }
        Ok(())
    }

    /// Results of every detector, in input order.
    pub fn results(&self) -> Vec<DetectorResults> {
        let mut results: Vec<(usize, DetectorResults)> = self.boundaries.iter()
            .flat_map(|vb| vb.detector_controller().results())
            .collect();
        results.sort_by_key(|(order, _)| *order);
        results.into_iter().map(|(_, r)| r).collect()
    }

    pub fn take_database(&mut self) -> Option<DatabaseWriter> {
        self.database.take()
    }
}

/// The boundary feeding detectors built from `input`.
fn create_virtual_boundary(input: &DetectorInput, context: &DetectorContext) -> Result<Box<dyn VirtualBoundary>, DetectorError> {
    let vb: Box<dyn VirtualBoundary> = match input.tally_type().virtual_boundary_type() {
        VirtualBoundaryType::DiffuseReflectance => Box::new(PlanarVirtualBoundary::diffuse_reflectance(context.z_top)),
        VirtualBoundaryType::DiffuseTransmittance => Box::new(PlanarVirtualBoundary::diffuse_transmittance(context.z_bottom)),
        VirtualBoundaryType::SpecularReflectance => Box::new(SpecularVirtualBoundary::new()),
        VirtualBoundaryType::SurfaceFiber => {
            let (center, radius) = match input {
                DetectorInput::SurfaceFiber { center, radius, .. } => (*center, *radius),
                _ => unreachable!("only fiber detectors use a fiber boundary")
            };
            Box::new(SurfaceFiberVirtualBoundary::new(center, radius, context.z_top))
        }
        VirtualBoundaryType::BoundingCylinder => match &context.bounding_cylinder {
            Some(cylinder) => Box::new(BoundingCylinderVirtualBoundary::new(cylinder)),
            None => return Err(DetectorError::MissingBoundingVolume { name: input.tally_type().to_string() })
        },
        VirtualBoundaryType::GenericVolume => Box::new(GenericVolumeVirtualBoundary::new())
    };
    Ok(vb)
}

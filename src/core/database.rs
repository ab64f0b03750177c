//! The photon database: data points recorded at the tissue surfaces during a
//! run, and the post-processor that replays detectors over them.
use super::mc::Float;
use super::photon::PhotonDataPoint;
use super::detector::{DetectorInput, DetectorContext, DetectorResults, CreatedDetector, SurfaceDetector};
use super::virtual_boundary::VirtualBoundaryType;
use super::error::SimulationError;

/// Surface a database records photons leaving through.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    DiffuseReflectance,
    DiffuseTransmittance
}

impl DatabaseType {
    pub fn virtual_boundary_type(self) -> VirtualBoundaryType {
        match self {
            DatabaseType::DiffuseReflectance => VirtualBoundaryType::DiffuseReflectance,
            DatabaseType::DiffuseTransmittance => VirtualBoundaryType::DiffuseTransmittance
        }
    }

    fn from_virtual_boundary_type(vb_type: VirtualBoundaryType) -> Option<DatabaseType> {
        match vb_type {
            VirtualBoundaryType::DiffuseReflectance => Some(DatabaseType::DiffuseReflectance),
            VirtualBoundaryType::DiffuseTransmittance => Some(DatabaseType::DiffuseTransmittance),
            _ => None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseRecord {
    pub kind: DatabaseType,
    pub dp: PhotonDataPoint
}

/// Collects records while photons are traced.
#[derive(Debug, Clone)]
pub struct DatabaseWriter {
    kinds: Vec<DatabaseType>,
    records: Vec<DatabaseRecord>
}

impl DatabaseWriter {
    pub fn new(kinds: Vec<DatabaseType>) -> DatabaseWriter {
        DatabaseWriter { kinds, records: Vec::new() }
    }

    /// Record a crossing of a boundary of type `vb_type` if it is wanted.
    pub fn record(&mut self, vb_type: VirtualBoundaryType, dp: &PhotonDataPoint) {
        if let Some(kind) = DatabaseType::from_virtual_boundary_type(vb_type) {
            if self.kinds.contains(&kind) {
                self.records.push(DatabaseRecord { kind, dp: dp.clone() });
            }
        }
    }

    pub fn fork(&self) -> DatabaseWriter {
        DatabaseWriter::new(self.kinds.clone())
    }

    pub fn append(&mut self, other: DatabaseWriter) {
        self.records.extend(other.records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finish(self, context: DetectorContext, num_photons: u64) -> PhotonDatabase {
        PhotonDatabase { records: self.records, context, num_photons }
    }
}

/// Read-only log of the photons that left a run through its surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotonDatabase {
    pub records: Vec<DatabaseRecord>,
    /// Reference optical properties and weighting of the run.
    pub context: DetectorContext,
    pub num_photons: u64
}

impl PhotonDatabase {
    pub fn records_of(&self, kind: DatabaseType) -> impl Iterator<Item = &DatabaseRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    /// Total weight recorded for a surface.
    pub fn total_weight(&self, kind: DatabaseType) -> Float {
        self.records_of(kind).map(|r| r.dp.weight).sum()
    }
}

/// Replays surface detectors, perturbation detectors in particular, over a
/// photon database without tracing photons again.
#[derive(Debug)]
pub struct PostProcessor<'a> {
    database: &'a PhotonDatabase
}

impl<'a> PostProcessor<'a> {
    pub fn new(database: &'a PhotonDatabase) -> PostProcessor<'a> {
        PostProcessor { database }
    }

    /// Build, tally and normalize each detector. Only detectors fed by the
    /// recorded surfaces can be replayed.
    pub fn run(&self, detectors: &[DetectorInput]) -> Result<Vec<DetectorResults>, SimulationError> {
        detectors.iter().map(|input| self.replay(input)).collect()
    }

    fn replay(&self, input: &DetectorInput) -> Result<DetectorResults, SimulationError> {
        let name = input.tally_type().to_string();
        let kind = DatabaseType::from_virtual_boundary_type(input.tally_type().virtual_boundary_type())
            .ok_or_else(|| SimulationError::NotReplayable(name.clone()))?;
        let mut records = self.database.records_of(kind).peekable();
        if records.peek().is_none() {
            return Err(SimulationError::EmptyDatabase(name));
        }
        let mut detector: Box<dyn SurfaceDetector> = match input.create(&self.database.context)? {
            CreatedDetector::Surface(d) => d,
            CreatedDetector::History(_) => return Err(SimulationError::NotReplayable(name))
        };
        for record in records {
            detector.tally(&record.dp);
        }
        detector.normalize(self.database.num_photons)?;
        vlog!(1, "Replayed {} over {} records", name, self.database.records.len());
        Ok(detector.results())
    }
}

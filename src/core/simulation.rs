//! The run driver: validates the input once, traces photons sequentially or
//! on a rayon worker pool, then merges and normalizes the detectors.
use parking_lot::Mutex;
use rayon::prelude::*;
use super::rng::Rng;
use super::optical_properties::OpticalProperties;
use super::tissue::{Tissue, TissueInput};
use super::source::{Source, SourceInput};
use super::detector::{DetectorInput, DetectorContext, DetectorResults};
use super::virtual_boundary::VirtualBoundarySet;
use super::database::PhotonDatabase;
use super::options::SimulationOptions;
use super::photon::PhotonStatus;
use super::transport::Photon;
use super::stats_accumulator::{StatsAccumulator, StatsReporter, RunStatistics};
use super::progress_reporter::ProgressReporter;
use super::error::{ConfigurationError, SimulationError};
use super::vlog;

/// Photons between progress bar updates.
const PROGRESS_CHUNK: u64 = 1000;

/// How random numbers are drawn.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RngMode {
    /// One stream consumed in photon order.
    Sequential,
    /// Photons split into `workers` contiguous blocks, each with its own stream.
    Parallel { workers: usize }
}

impl Default for RngMode {
    fn default() -> RngMode {
        RngMode::Sequential
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationInput {
    pub n_photons: u64,
    pub seed: u64,
    pub rng_mode: RngMode,
    pub tissue: TissueInput,
    pub source: SourceInput,
    pub detectors: Vec<DetectorInput>,
    pub options: SimulationOptions
}

impl Default for SimulationInput {
    fn default() -> SimulationInput {
        SimulationInput {
            n_photons: 100,
            seed: 0,
            rng_mode: RngMode::Sequential,
            tissue: TissueInput::default(),
            source: SourceInput::default(),
            detectors: vec![DetectorInput::RDiffuse],
            options: SimulationOptions::default()
        }
    }
}

#[derive(Debug)]
pub struct SimulationOutput {
    /// One entry per detector, in input order.
    pub results: Vec<DetectorResults>,
    pub database: Option<PhotonDatabase>,
    pub statistics: RunStatistics
}

impl SimulationOutput {
    /// Results of the first detector named `name`.
    pub fn result(&self, name: &str) -> Option<&DetectorResults> {
        self.results.iter().find(|r| r.name == name)
    }
}

pub struct MonteCarloSimulation {
    input: SimulationInput,
    tissue: Box<dyn Tissue>,
    source: Box<dyn Source>,
    ops: Vec<OpticalProperties>,
    context: DetectorContext,
    /// Virtual boundaries with empty detectors. Every run works on forks.
    boundaries: VirtualBoundarySet
}

impl MonteCarloSimulation {
    /// Validate the input and build the tissue, source and detectors.
    pub fn new(input: SimulationInput) -> Result<MonteCarloSimulation, SimulationError> {
        if input.n_photons == 0 {
            return Err(ConfigurationError::NoPhotons.into());
        }
        if input.rng_mode == (RngMode::Parallel { workers: 0 }) {
            return Err(ConfigurationError::NoWorkers.into());
        }
        let tissue = input.tissue.create_tissue()?;
        let source = input.source.create_source(tissue.as_ref())?;
        let ops = tissue.optical_properties();
        let context = DetectorContext::new(tissue.as_ref(), input.options.absorption_weighting);
        let boundaries = VirtualBoundarySet::new(&input.detectors, &context, &input.options.database_types)?;
        vlog::set_log_level(input.options.verbosity);
        info!("{} with {} regions, {} source, {} detectors, {} weighting",
            tissue.name(), ops.len(), source.name(), input.detectors.len(), input.options.absorption_weighting);
        Ok(MonteCarloSimulation { input, tissue, source, ops, context, boundaries })
    }

    pub fn tissue(&self) -> &dyn Tissue {
        self.tissue.as_ref()
    }

    /// Trace every photon. Repeated runs give identical results.
    pub fn run(&self) -> Result<SimulationOutput, SimulationError> {
        let n = self.input.n_photons;
        let seed = self.input.seed;
        let progress = ProgressReporter::new(n, "Simulating", self.input.options.progress);
        let accumulator = StatsAccumulator::new();

        let mut boundaries = match self.input.rng_mode {
            RngMode::Sequential => {
                let mut boundaries = self.boundaries.fork();
                let mut rng = Rng::new(seed);
                let mut stats = accumulator.reporter();
                self.trace_block(0, n, &mut rng, &mut boundaries, &mut stats, &progress);
                boundaries
            }
            RngMode::Parallel { workers } => {
                let slots: Mutex<Vec<Option<VirtualBoundarySet>>> = Mutex::new((0..workers).map(|_| None).collect());
                (0..workers).into_par_iter().for_each(|w| {
                    let (start, end) = block(n, workers, w);
                    let mut boundaries = self.boundaries.fork();
                    let mut rng = Rng::with_stream(seed, w as u64 + 1);
                    let mut stats = accumulator.reporter();
                    self.trace_block(start, end, &mut rng, &mut boundaries, &mut stats, &progress);
                    slots.lock()[w] = Some(boundaries);
                });
                // merge in worker order so sums do not depend on scheduling
                let mut merged = self.boundaries.fork();
                for boundaries in slots.into_inner().into_iter().flatten() {
                    merged.merge(boundaries)?;
                }
                merged
            }
        };
        progress.done();

        boundaries.normalize(n)?;
        let database = boundaries.take_database().map(|db| db.finish(self.context.clone(), n));
        let statistics = accumulator.accumulate();
        info!("Traced {} photons in {} ms", n, progress.elapsed_ms());
        Ok(SimulationOutput { results: boundaries.results(), database, statistics })
    }

    /// Trace photons `start..end` with one random stream.
    fn trace_block(
        &self,
        start: u64,
        end: u64,
        rng: &mut Rng,
        boundaries: &mut VirtualBoundarySet,
        stats: &mut StatsReporter,
        progress: &ProgressReporter
    ) {
        let record_history = boundaries.needs_history();
        for i in start..end {
            let emission = self.source.emit(rng);
            let mut photon = Photon::launch(
                &emission, self.tissue.as_ref(), &self.ops, &self.input.options, boundaries, record_history);
            let status = photon.trace(rng, boundaries);
            report_photon(stats, status, &photon);
            if (i + 1 - start) % PROGRESS_CHUNK == 0 {
                progress.update(PROGRESS_CHUNK);
            }
        }
        progress.update((end - start) % PROGRESS_CHUNK);
        stats.finish();
    }
}

/// Contiguous block of photons handled by worker `w`. Earlier workers take
/// the remainder.
fn block(n: u64, workers: usize, w: usize) -> (u64, u64) {
    let workers = workers as u64;
    let w = w as u64;
    let base = n / workers;
    let extra = n % workers;
    let start = w * base + w.min(extra);
    let len = base + if w < extra { 1 } else { 0 };
    (start, start + len)
}

fn report_photon(stats: &mut StatsReporter, status: PhotonStatus, photon: &Photon<'_>) {
    let name = match status {
        PhotonStatus::ExitedTop => "Photons/Exited top",
        PhotonStatus::ExitedBottom => "Photons/Exited bottom",
        PhotonStatus::ExitedLateral => "Photons/Exited lateral",
        PhotonStatus::Absorbed => "Photons/Absorbed",
        PhotonStatus::KilledRussianRoulette => "Photons/Killed by roulette",
        PhotonStatus::KilledOverMaximumPathLength => "Photons/Killed over path length",
        PhotonStatus::KilledOverMaximumCollisions => "Photons/Killed over collisions",
        PhotonStatus::Alive => "Photons/Unfinished"
    };
    stats.report_counter(name, 1);
    stats.report_int_distribution("Photons/Collisions", photon.dp.total_collisions() as i64);
    stats.report_float_distribution("Photons/Path length", photon.dp.total_path_length());
    stats.report_percentage("Photons/Killed", status.is_killed() as i64, 1);
}

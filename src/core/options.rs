use super::mc::Float;
use super::absorption::AbsorptionWeightingType;
use super::database::DatabaseType;

/// Run wide settings of the photon random walk.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOptions {
    pub absorption_weighting: AbsorptionWeightingType,
    /// Photons whose weight falls below this play Russian roulette. 0 turns
    /// roulette off.
    pub russian_roulette_threshold: Float,
    /// Probability a photon survives a round of roulette.
    pub russian_roulette_chance: Float,
    pub max_collisions: u64,
    /// Total path length in mm after which a photon is killed.
    pub max_path_length: Float,
    /// Surfaces whose crossings are written to the photon database.
    pub database_types: Vec<DatabaseType>,
    /// Draw a progress bar on the terminal.
    pub progress: bool,
    /// Level of the verbosity log.
    pub verbosity: usize
}

impl Default for SimulationOptions {
    fn default() -> SimulationOptions {
        SimulationOptions {
            absorption_weighting: AbsorptionWeightingType::Discrete,
            russian_roulette_threshold: 0.0,
            russian_roulette_chance: 0.1,
            max_collisions: 100_000_000,
            max_path_length: 2000.0,
            database_types: Vec::new(),
            progress: false,
            verbosity: 0
        }
    }
}

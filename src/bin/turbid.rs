#[macro_use]
extern crate log;

use std::process;
use turbid::{MonteCarloSimulation, SimulationInput, RngMode};
use turbid::core::binning::DoubleRange;
use turbid::core::detector::{DetectorInput, TallyType};
use turbid::core::optical_properties::OpticalProperties;
use turbid::core::options::SimulationOptions;
use turbid::core::source::SourceInput;
use turbid::core::tissue::TissueInput;

fn main() {
    env_logger::init();

    let workers = rayon::current_num_threads();
    let input = SimulationInput {
        n_photons: 100_000,
        seed: 0,
        rng_mode: RngMode::Parallel { workers },
        tissue: TissueInput::slab(100.0, OpticalProperties::new(0.01, 1.0, 0.8, 1.4)),
        source: SourceInput::pencil_beam(),
        detectors: vec![
            DetectorInput::RSpecular,
            DetectorInput::RDiffuse,
            DetectorInput::TDiffuse,
            DetectorInput::ATotal,
            DetectorInput::ROfRho { rho: DoubleRange::new(0.0, 10.0, 101) }
        ],
        options: SimulationOptions { progress: true, ..Default::default() }
    };

    let output = match MonteCarloSimulation::new(input).and_then(|simulation| simulation.run()) {
        Ok(output) => output,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    for result in output.results.iter() {
        match (result.tally_type, result.mean()) {
            (TallyType::ROfRho, Some(mean)) => {
                let axis = result.axes[0].range;
                for (i, m) in mean.iter().enumerate().take(10) {
                    info!("R(rho = {:.2} mm) = {:.6e} /mm^2", axis.bin_center(i), m);
                }
            }
            (_, Some(mean)) => info!("{} = {:.6}", result.name, mean[0]),
            (_, None) => {}
        }
    }
    let stdout = std::io::stdout();
    if let Err(e) = output.statistics.print(&mut stdout.lock()) {
        error!("Unable to print statistics: {}", e);
    }
}

use approx::assert_relative_eq;
use crate::core::mc::Float;
use crate::core::binning::DoubleRange;
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::optical_properties::OpticalProperties;
use crate::core::absorption::AbsorptionWeightingType;
use crate::core::detector::{DetectorInput, PerturbationInput, TallyType};
use crate::core::database::{DatabaseType, PostProcessor};
use crate::core::options::SimulationOptions;
use crate::core::tissue::{TissueInput, InclusionRegion};
use crate::core::source::SourceInput;
use crate::regions::{LayerTissueRegion, CylinderTissueRegion, InfiniteCylinderTissueRegion, VoxelTissueRegion};
use super::*;

fn scattering_layer() -> OpticalProperties {
    OpticalProperties::new(0.01, 1.0, 0.8, 1.4)
}

fn rho_axis() -> DoubleRange {
    DoubleRange::new(0.0, 10.0, 101)
}

fn two_layer_input(n_photons: u64) -> SimulationInput {
    SimulationInput {
        n_photons,
        seed: 0,
        rng_mode: RngMode::Sequential,
        tissue: TissueInput::slab(100.0, scattering_layer()),
        source: SourceInput::pencil_beam(),
        detectors: vec![DetectorInput::ROfRho { rho: rho_axis() }],
        options: SimulationOptions::default()
    }
}

fn run(input: SimulationInput) -> SimulationOutput {
    MonteCarloSimulation::new(input).unwrap().run().unwrap()
}

fn mean_of(output: &SimulationOutput, tally_type: TallyType) -> Vec<Float> {
    output.results.iter()
        .find(|r| r.tally_type == tally_type)
        .and_then(|r| r.mean())
        .map(|m| m.to_vec())
        .unwrap_or_default()
}

fn conservation_detectors() -> Vec<DetectorInput> {
    vec![DetectorInput::RSpecular, DetectorInput::RDiffuse, DetectorInput::TDiffuse, DetectorInput::ATotal]
}

fn total_weight(output: &SimulationOutput, extra: &[TallyType]) -> Float {
    [TallyType::RSpecular, TallyType::RDiffuse, TallyType::TDiffuse, TallyType::ATotal].iter()
        .chain(extra.iter())
        .map(|t| mean_of(output, *t)[0])
        .sum()
}

#[test]
fn test_two_layer_reflectance_is_reproducible() {
    let a = run(two_layer_input(10));
    let b = run(two_layer_input(10));
    let mean = mean_of(&a, TallyType::ROfRho);
    assert_eq!(mean.len(), 100);
    assert_eq!(mean, mean_of(&b, TallyType::ROfRho));
    assert!(mean.iter().all(|m| m.is_finite() && *m >= 0.0));
    assert_eq!(a.results[0].axes[0].range, rho_axis());
    assert_eq!(a.statistics.int_distributions.get("Photons/Collisions").map(|d| d.1), Some(10));

    let other_seed = run(SimulationInput { seed: 7, ..two_layer_input(10) });
    assert_ne!(mean, mean_of(&other_seed, TallyType::ROfRho));
}

#[test]
fn test_parallel_runs_are_reproducible() {
    let input = SimulationInput {
        rng_mode: RngMode::Parallel { workers: 4 },
        detectors: vec![DetectorInput::ROfRho { rho: rho_axis() }, DetectorInput::RDiffuse, DetectorInput::ATotal],
        ..two_layer_input(203)
    };
    let a = run(input.clone());
    let b = run(input);
    assert_eq!(a.results, b.results);
    let photons: i64 = a.statistics.counters.values().sum();
    assert_eq!(photons, 203);
}

#[test]
fn test_discrete_weighting_conserves_energy() {
    let input = SimulationInput {
        tissue: TissueInput::slab(10.0, scattering_layer()),
        detectors: conservation_detectors(),
        ..two_layer_input(500)
    };
    let output = run(input);
    assert_relative_eq!(total_weight(&output, &[]), 1.0, max_relative = 1e-6);
    assert_relative_eq!(mean_of(&output, TallyType::RSpecular)[0], (0.4 / 2.4) * (0.4 / 2.4), max_relative = 1e-9);
}

#[test]
fn test_analog_weighting_conserves_energy() {
    let mut options = SimulationOptions::default();
    options.absorption_weighting = AbsorptionWeightingType::Analog;
    let input = SimulationInput {
        tissue: TissueInput::slab(10.0, OpticalProperties::new(0.1, 1.0, 0.8, 1.4)),
        detectors: conservation_detectors(),
        options,
        ..two_layer_input(500)
    };
    let output = run(input);
    assert_relative_eq!(total_weight(&output, &[]), 1.0, max_relative = 1e-6);
    assert!(output.statistics.counter("Photons/Absorbed") > 0);
}

#[test]
fn test_continuous_weighting_conserves_energy() {
    let mut options = SimulationOptions::default();
    options.absorption_weighting = AbsorptionWeightingType::Continuous;
    let input = SimulationInput {
        tissue: TissueInput::slab(10.0, OpticalProperties::new(0.1, 1.0, 0.8, 1.4)),
        detectors: conservation_detectors(),
        options,
        ..two_layer_input(500)
    };
    let output = run(input);
    assert_relative_eq!(total_weight(&output, &[]), 1.0, max_relative = 1e-6);
}

#[test]
fn test_bounding_cylinder_conserves_energy() {
    let layers = vec![
        LayerTissueRegion::ambient_above(0.0, OpticalProperties::air()),
        LayerTissueRegion::new(0.0, 10.0, scattering_layer()),
        LayerTissueRegion::ambient_below(10.0, OpticalProperties::air())
    ];
    let cylinder = CylinderTissueRegion::new(Point3f::new(0.0, 0.0, 5.0), 3.0, 10.0, OpticalProperties::air());
    let mut detectors = conservation_detectors();
    detectors.push(DetectorInput::ATotalBoundingVolume);
    let input = SimulationInput {
        tissue: TissueInput::BoundingCylinder { layers, cylinder },
        detectors,
        ..two_layer_input(300)
    };
    let output = run(input);
    assert!(mean_of(&output, TallyType::ATotalBoundingVolume)[0] > 0.0);
    assert_relative_eq!(total_weight(&output, &[TallyType::ATotalBoundingVolume]), 1.0, max_relative = 1e-6);
    assert!(output.statistics.counter("Photons/Exited lateral") > 0);
}

#[test]
fn test_inclusion_tissue_conserves_energy() {
    let layers = vec![
        LayerTissueRegion::ambient_above(0.0, OpticalProperties::air()),
        LayerTissueRegion::new(0.0, 20.0, scattering_layer()),
        LayerTissueRegion::ambient_below(20.0, OpticalProperties::air())
    ];
    let inclusion = InfiniteCylinderTissueRegion::new(Point3f::new(0.0, 0.0, 3.0), 1.0, Vector3f::new(0.0, 1.0, 0.0),
        OpticalProperties::new(0.5, 2.0, 0.9, 1.4));
    let input = SimulationInput {
        tissue: TissueInput::SingleInclusion { layers, inclusion: InclusionRegion::InfiniteCylinder(inclusion) },
        detectors: conservation_detectors(),
        ..two_layer_input(300)
    };
    let output = run(input);
    assert_relative_eq!(total_weight(&output, &[]), 1.0, max_relative = 1e-6);
}

#[test]
fn test_inclusion_touching_layer_interface_conserves_energy() {
    let layers = vec![
        LayerTissueRegion::ambient_above(0.0, OpticalProperties::air()),
        LayerTissueRegion::new(0.0, 1.0, scattering_layer()),
        LayerTissueRegion::new(1.0, 20.0, scattering_layer()),
        LayerTissueRegion::ambient_below(20.0, OpticalProperties::air())
    ];
    let voxel = VoxelTissueRegion::new((-2.0, 2.0), (-2.0, 2.0), (1.0, 5.0), OpticalProperties::new(0.05, 0.5, 0.8, 1.4));
    let input = SimulationInput {
        tissue: TissueInput::SingleInclusion { layers, inclusion: InclusionRegion::Voxel(voxel) },
        detectors: conservation_detectors(),
        ..two_layer_input(300)
    };
    let output = run(input);
    assert_eq!(output.statistics.counter("Photons/Killed over path length"), 0);
    assert_eq!(output.statistics.counter("Photons/Exited top") + output.statistics.counter("Photons/Exited bottom"), 300);
    assert_relative_eq!(total_weight(&output, &[]), 1.0, max_relative = 1e-6);
}

#[test]
fn test_concentric_cylinders_conserve_energy() {
    let layers = vec![
        LayerTissueRegion::ambient_above(0.0, OpticalProperties::air()),
        LayerTissueRegion::new(0.0, 20.0, scattering_layer()),
        LayerTissueRegion::ambient_below(20.0, OpticalProperties::air())
    ];
    let center = Point3f::new(0.0, 0.0, 4.0);
    let cylinders = vec![
        InfiniteCylinderTissueRegion::along_y(center, 3.0, OpticalProperties::new(0.05, 2.0, 0.9, 1.4)),
        InfiniteCylinderTissueRegion::along_y(center, 1.0, OpticalProperties::new(0.2, 0.5, 0.9, 1.4))
    ];
    let input = SimulationInput {
        tissue: TissueInput::MultiConcentricInfiniteCylinder { layers, cylinders },
        detectors: conservation_detectors(),
        ..two_layer_input(300)
    };
    let output = run(input);
    assert_eq!(output.statistics.counter("Photons/Killed over path length"), 0);
    assert!(output.statistics.counter("Photons/Exited top") > 0);
    assert_relative_eq!(total_weight(&output, &[]), 1.0, max_relative = 1e-6);
}

#[test]
fn test_pmc_replay_with_reference_properties_matches_reference() {
    let mut options = SimulationOptions::default();
    options.database_types = vec![DatabaseType::DiffuseReflectance];
    let input = SimulationInput { options, ..two_layer_input(200) };
    let simulation = MonteCarloSimulation::new(input).unwrap();
    let output = simulation.run().unwrap();
    let database = output.database.as_ref().unwrap();
    assert!(database.total_weight(DatabaseType::DiffuseReflectance) > 0.0);

    let reference_ops = simulation.tissue().optical_properties();
    let perturbation = PerturbationInput { perturbed_ops: reference_ops, perturbed_regions: vec![1] };
    let replayed = PostProcessor::new(database)
        .run(&[DetectorInput::PMCROfRho { rho: rho_axis(), perturbation }])
        .unwrap();
    let reference = mean_of(&output, TallyType::ROfRho);
    let pmc = replayed[0].mean().unwrap();
    for (r, p) in reference.iter().zip(pmc.iter()) {
        assert_relative_eq!(*r, *p, max_relative = 1e-12);
    }
}

#[test]
fn test_pmc_follows_absorption_change() {
    let mut options = SimulationOptions::default();
    options.database_types = vec![DatabaseType::DiffuseReflectance];
    let input = SimulationInput { options, ..two_layer_input(200) };
    let simulation = MonteCarloSimulation::new(input).unwrap();
    let output = simulation.run().unwrap();
    let database = output.database.as_ref().unwrap();

    let mut perturbed_ops = simulation.tissue().optical_properties();
    perturbed_ops[1] = perturbed_ops[1].with_mua(0.1);
    let perturbation = PerturbationInput { perturbed_ops, perturbed_regions: vec![1] };
    let rho = DoubleRange::new(0.0, 10.0, 2);
    let replayed = PostProcessor::new(database)
        .run(&[DetectorInput::PMCROfRho { rho, perturbation: perturbation.clone() },
            DetectorInput::DMCdROfRhodMua { rho, perturbation }])
        .unwrap();
    assert!(replayed[0].mean().unwrap()[0] > 0.0);
    // more absorption can only lower the reflectance
    assert!(replayed[1].mean().unwrap()[0] < 0.0);
}

#[test]
fn test_invalid_detector_fails_before_run() {
    let input = SimulationInput {
        detectors: vec![DetectorInput::ROfRho { rho: DoubleRange::new(0.0, 10.0, 1) }],
        ..two_layer_input(10)
    };
    assert!(matches!(MonteCarloSimulation::new(input), Err(SimulationError::Detector(DetectorError::InvalidBinning { .. }))));
}

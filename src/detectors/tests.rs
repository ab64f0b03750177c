use approx::assert_relative_eq;
use crate::core::mc::{Float, consts::PI};
use crate::core::binning::DoubleRange;
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::optical_properties::OpticalProperties;
use crate::core::absorption::AbsorptionWeightingType;
use crate::core::detector::*;
use crate::core::error::DetectorError;
use crate::core::photon::*;
use super::*;

fn context(weighting: AbsorptionWeightingType) -> DetectorContext {
    DetectorContext {
        ops: vec![OpticalProperties::air(), OpticalProperties::new(0.1, 0.9, 0.8, 1.4), OpticalProperties::air()],
        weighting,
        z_top: 0.0,
        z_bottom: 10.0,
        bounding_cylinder: None
    }
}

fn exiting(x: Float, y: Float, weight: Float) -> PhotonDataPoint {
    PhotonDataPoint::new(Point3f::new(x, y, 0.0), Vector3f::new(0.0, 0.0, -1.0), weight, 3)
}

fn real_mean<D: Detector + ?Sized>(d: &D) -> Vec<Float> {
    match d.values() {
        DetectorValues::Real(t) => t.mean.clone(),
        DetectorValues::Complex(_) => panic!("complex tally")
    }
}

#[test]
fn test_of_rho_binning_and_jacobian() {
    let mut d = OfRhoDetector::new(TallyType::ROfRho, DoubleRange::new(0.0, 10.0, 101)).unwrap();
    d.tally(&exiting(0.05, 0.0, 1.0));
    d.tally(&exiting(0.0, 0.1, 1.0));
    d.tally(&exiting(0.0, 5.05, 0.5));
    d.tally(&exiting(11.0, 0.0, 1.0));
    let mean = real_mean(&d);
    // 0.1 sits on the edge between bins 0 and 1 and goes low
    assert_eq!(mean[0], 2.0);
    assert_eq!(mean[50], 0.5);
    assert_eq!(mean.iter().sum::<Float>(), 2.5);
    for i in [0usize, 7, 99].iter() {
        let expected = 2.0 * PI * (*i as Float + 0.5) * 0.1 * 0.1;
        assert_relative_eq!(d.bin_jacobian(*i), expected, max_relative = 1e-12);
    }
}

#[test]
fn test_normalize_twice_is_an_error() {
    let mut d = TotalDetector::new(TallyType::RDiffuse);
    d.tally(&exiting(0.0, 0.0, 0.5));
    d.normalize(10).unwrap();
    assert_eq!(real_mean(&d), vec![0.05]);
    assert_eq!(d.normalize(10), Err(DetectorError::AlreadyNormalized { name: "RDiffuse".to_string() }));
}

#[test]
fn test_normalize_applies_jacobian_to_both_moments() {
    let mut d = OfRhoDetector::new(TallyType::ROfRho, DoubleRange::new(0.0, 1.0, 2)).unwrap();
    d.tally(&exiting(0.5, 0.0, 1.0));
    d.normalize(4).unwrap();
    let area = PI;
    match d.values() {
        DetectorValues::Real(t) => {
            assert_relative_eq!(t.mean[0], 1.0 / (4.0 * area), max_relative = 1e-12);
            assert_relative_eq!(t.second_moment[0], 1.0 / (area * area), max_relative = 1e-12);
        }
        _ => unreachable!()
    }
}

#[test]
fn test_fork_starts_empty() {
    let mut d = OfRhoDetector::new(TallyType::ROfRho, DoubleRange::new(0.0, 1.0, 2)).unwrap();
    d.tally(&exiting(0.5, 0.0, 1.0));
    let forked = SurfaceDetector::fork(&d);
    assert_eq!(real_mean(&*forked), vec![0.0]);
    assert_eq!(forked.axes(), d.axes());
}

#[test]
fn test_merge_rejects_other_type() {
    let mut a = TotalDetector::new(TallyType::RDiffuse);
    let b = TotalDetector::new(TallyType::TDiffuse);
    assert!(a.merge(b.tally_type(), b.values()).is_err());
    let c = TotalDetector::new(TallyType::RDiffuse);
    assert!(a.merge(c.tally_type(), c.values()).is_ok());
}

#[test]
fn test_invalid_binning_rejected() {
    let result = OfRhoDetector::new(TallyType::ROfRho, DoubleRange::new(0.0, 10.0, 1));
    assert!(matches!(result, Err(DetectorError::InvalidBinning { axis: "rho", .. })));
}

#[test]
fn test_angle_of_normal_exit_is_zero() {
    let mut d = OfAngleDetector::new(TallyType::ROfAngle, DoubleRange::new(0.0, PI / 2.0, 3)).unwrap();
    d.tally(&exiting(1.0, 1.0, 1.0));
    let mut grazing = exiting(0.0, 0.0, 1.0);
    grazing.direction = Vector3f::new(0.9, 0.0, -(0.19 as Float).sqrt());
    d.tally(&grazing);
    assert_eq!(real_mean(&d), vec![1.0, 1.0]);
}

#[test]
fn test_fiber_acceptance_cone() {
    let mut d = SurfaceFiberDetector::new(Point3f::zero(), 0.3, 0.22, 1.0).unwrap();
    d.tally(&exiting(0.0, 0.0, 1.0));
    let mut oblique = exiting(0.0, 0.0, 1.0);
    oblique.direction = Vector3f::new(0.6, 0.0, -0.8);
    d.tally(&oblique);
    assert_eq!(real_mean(&d), vec![1.0]);
    assert!(SurfaceFiberDetector::new(Point3f::zero(), 0.3, 1.5, 1.0).is_err());
    assert!(SurfaceFiberDetector::new(Point3f::zero(), 0.0, 0.22, 1.0).is_err());
}

fn point(z: Float, weight: Float, event: HistoryEvent, status: PhotonStatus) -> HistoryPoint {
    HistoryPoint {
        position: Point3f::new(0.5, 0.0, z),
        direction: Vector3f::new(0.0, 0.0, 1.0),
        weight,
        region_index: 1,
        event,
        status
    }
}

#[test]
fn test_discrete_absorption_deposits_weight_decrements() {
    let ctx = context(AbsorptionWeightingType::Discrete);
    let mut history = PhotonHistory::new();
    history.push(point(0.0, 1.0, HistoryEvent::Launch, PhotonStatus::Alive));
    history.push(point(1.0, 0.9, HistoryEvent::Collision, PhotonStatus::Alive));
    history.push(point(1.5, 0.9, HistoryEvent::VirtualBoundary, PhotonStatus::Alive));
    history.push(point(2.5, 0.81, HistoryEvent::Collision, PhotonStatus::Alive));

    let mut total = ATotalDetector::new(&ctx);
    total.tally(&history);
    assert_relative_eq!(real_mean(&total)[0], 0.19, max_relative = 1e-12);

    let mut grid = RhoAndZDetector::new(VolumeQuantity::Absorption, DoubleRange::new(0.0, 1.0, 2),
        DoubleRange::new(0.0, 4.0, 3), &ctx).unwrap();
    grid.tally(&history);
    let mean = real_mean(&grid);
    assert_relative_eq!(mean[0], 0.1, max_relative = 1e-12);
    assert_relative_eq!(mean[1], 0.09, max_relative = 1e-12);

    let mut fluence = RhoAndZDetector::new(VolumeQuantity::Fluence, DoubleRange::new(0.0, 1.0, 2),
        DoubleRange::new(0.0, 4.0, 3), &ctx).unwrap();
    fluence.tally(&history);
    assert_relative_eq!(real_mean(&fluence)[0], 1.0, max_relative = 1e-12);
    assert_eq!(fluence.tally_type(), TallyType::FluenceOfRhoAndZ);
}

#[test]
fn test_analog_absorption_scores_only_the_absorbing_event() {
    let ctx = context(AbsorptionWeightingType::Analog);
    let mut history = PhotonHistory::new();
    history.push(point(0.0, 1.0, HistoryEvent::Launch, PhotonStatus::Alive));
    history.push(point(1.0, 1.0, HistoryEvent::Collision, PhotonStatus::Alive));
    history.push(point(2.0, 1.0, HistoryEvent::Collision, PhotonStatus::Absorbed));
    let mut grid = XAndYAndZDetector::new(VolumeQuantity::Absorption, DoubleRange::new(-1.0, 1.0, 2),
        DoubleRange::new(-1.0, 1.0, 2), DoubleRange::new(0.0, 4.0, 3), &ctx).unwrap();
    grid.tally(&history);
    assert_eq!(real_mean(&grid), vec![1.0, 0.0]);
    assert_eq!(grid.bin_jacobian(0), 2.0 * 2.0 * 2.0);
}

#[test]
fn test_history_second_moment_squares_photon_total() {
    let ctx = context(AbsorptionWeightingType::Discrete);
    let mut history = PhotonHistory::new();
    history.push(point(0.0, 1.0, HistoryEvent::Launch, PhotonStatus::Alive));
    history.push(point(0.5, 0.9, HistoryEvent::Collision, PhotonStatus::Alive));
    history.push(point(1.0, 0.81, HistoryEvent::Collision, PhotonStatus::Alive));
    let mut grid = RhoAndZDetector::new(VolumeQuantity::Absorption, DoubleRange::new(0.0, 1.0, 2),
        DoubleRange::new(0.0, 4.0, 3), &ctx).unwrap();
    grid.tally(&history);
    match grid.values() {
        DetectorValues::Real(t) => assert_relative_eq!(t.second_moment[0], 0.19 * 0.19, max_relative = 1e-12),
        _ => unreachable!()
    }
}

fn perturbation(ops: OpticalProperties) -> PerturbationInput {
    PerturbationInput {
        perturbed_ops: vec![OpticalProperties::air(), ops, OpticalProperties::air()],
        perturbed_regions: vec![1]
    }
}

#[test]
fn test_pmc_unperturbed_matches_reference() {
    let ctx = context(AbsorptionWeightingType::Discrete);
    let rho = DoubleRange::new(0.0, 2.0, 5);
    let mut reference = OfRhoDetector::new(TallyType::ROfRho, rho).unwrap();
    let mut pmc = PMCROfRhoDetector::new(rho, &perturbation(ctx.ops[1]), &ctx).unwrap();
    let mut dp = exiting(0.7, 0.0, 0.6);
    dp.collision_info[1].path_length = 4.0;
    dp.collision_info[1].collisions = 5;
    reference.tally(&dp);
    pmc.tally(&dp);
    assert_eq!(real_mean(&reference), real_mean(&pmc));
}

#[test]
fn test_pmc_single_rho_is_recentered() {
    let ctx = context(AbsorptionWeightingType::Discrete);
    let pmc = PMCROfRhoDetector::new(DoubleRange::new(1.0, 1.0, 1), &perturbation(ctx.ops[1]), &ctx).unwrap();
    let axis = pmc.axes()[0].range;
    assert_relative_eq!(axis.start, 0.95, max_relative = 1e-12);
    assert_relative_eq!(axis.stop, 1.05, max_relative = 1e-12);
    assert_eq!(axis.bin_count(), 1);
}

#[test]
fn test_pmc_rejects_analog() {
    let ctx = context(AbsorptionWeightingType::Analog);
    let result = PMCROfRhoAndTimeDetector::new(DoubleRange::new(0.0, 2.0, 5), DoubleRange::new(0.0, 1.0, 11),
        &perturbation(ctx.ops[1]), &ctx);
    assert!(matches!(result, Err(DetectorError::UnsupportedAbsorptionWeighting { .. })));
}

#[test]
fn test_dmc_is_discrete_only() {
    let ctx = context(AbsorptionWeightingType::Continuous);
    let result = DMCROfRhoDetector::new(DifferentialParameter::Mua, DoubleRange::new(0.0, 2.0, 5),
        &perturbation(ctx.ops[1]), &ctx);
    assert!(matches!(result, Err(DetectorError::UnsupportedAbsorptionWeighting { .. })));
}

#[test]
fn test_dmc_dmua_scores_minus_path_length() {
    let ctx = context(AbsorptionWeightingType::Discrete);
    let mut d = DMCROfRhoDetector::new(DifferentialParameter::Mua, DoubleRange::new(0.0, 2.0, 5),
        &perturbation(ctx.ops[1]), &ctx).unwrap();
    let mut dp = exiting(0.7, 0.0, 0.5);
    dp.collision_info[1].path_length = 3.0;
    dp.collision_info[1].collisions = 2;
    d.tally(&dp);
    assert_relative_eq!(real_mean(&d)[1], -1.5, max_relative = 1e-12);
    assert_eq!(d.tally_type(), TallyType::DMCdROfRhodMua);
}

#[test]
fn test_dmc_dmus_scores_at_perturbed_scattering() {
    let ctx = context(AbsorptionWeightingType::Discrete);
    let perturbed = ctx.ops[1].with_mus(1.8);
    let mut d = DMCROfRhoDetector::new(DifferentialParameter::Mus, DoubleRange::new(0.0, 2.0, 5),
        &perturbation(perturbed), &ctx).unwrap();
    let mut dp = exiting(0.7, 0.0, 0.5);
    dp.collision_info[1].path_length = 3.0;
    dp.collision_info[1].collisions = 2;
    d.tally(&dp);
    // (mus'/mus)^c * exp(-(mut' - mut) L) * (c/mus' - L)
    let expected = 0.5 * 4.0 * (-0.9 * 3.0 as Float).exp() * (2.0 / 1.8 - 3.0);
    assert_relative_eq!(real_mean(&d)[1], expected, max_relative = 1e-12);
    assert!(d.tally_type().is_perturbation());
}

#[test]
fn test_input_creates_matching_detector() {
    let ctx = context(AbsorptionWeightingType::Discrete);
    let inputs = vec![
        DetectorInput::RDiffuse,
        DetectorInput::ROfRho { rho: DoubleRange::new(0.0, 10.0, 101) },
        DetectorInput::TOfAngle { angle: DoubleRange::new(0.0, PI / 2.0, 5) },
        DetectorInput::ROfFx { fx: DoubleRange::new(0.0, 0.5, 11) },
        DetectorInput::FluenceOfXAndYAndZ {
            x: DoubleRange::new(-1.0, 1.0, 3),
            y: DoubleRange::new(-1.0, 1.0, 3),
            z: DoubleRange::new(0.0, 1.0, 3)
        }
    ];
    for input in inputs.iter() {
        let created = input.create(&ctx).unwrap();
        let tally_type = match &created {
            CreatedDetector::Surface(d) => d.tally_type(),
            CreatedDetector::History(d) => d.tally_type()
        };
        assert_eq!(tally_type, input.tally_type());
    }
    assert!(matches!(DetectorInput::ATotalBoundingVolume.create(&ctx),
        Err(DetectorError::MissingBoundingVolume { .. })));
}

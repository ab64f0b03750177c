//! The photon random walk: step sampling, boundary handling, absorption
//! weighting and the hand-off to virtual boundaries.
use super::mc::{Float, consts::{PI, PLANE_TOLERANCE, SPEED_OF_LIGHT}};
use super::rng::Rng;
use super::geometry::Vector3f;
use super::optical_properties::OpticalProperties;
use super::optics::{fresnel, refract};
use super::sampling::{sample_free_path, sample_henyey_greenstein, rotate_direction};
use super::absorption::AbsorptionWeightingType;
use super::photon::{PhotonDataPoint, PhotonStatus, BoundaryProbe, PhotonHistory, HistoryPoint, HistoryEvent};
use super::source::Emission;
use super::tissue::Tissue;
use super::options::SimulationOptions;
use super::virtual_boundary::VirtualBoundarySet;

/// One photon and the environment it walks through.
#[derive(Debug)]
pub struct Photon<'a> {
    pub dp: PhotonDataPoint,
    pub current_region_index: usize,
    /// Boundary event pending resolution by the virtual boundaries.
    pub probe: BoundaryProbe,
    pub history: PhotonHistory,
    record_history: bool,
    /// Length of the current step in mm.
    s: Float,
    /// Remaining dimensionless optical depth of the current step, carried
    /// across region boundaries. 0 requests a new sample.
    s_left: Float,
    tissue: &'a dyn Tissue,
    ops: &'a [OpticalProperties],
    options: &'a SimulationOptions
}

impl<'a> Photon<'a> {
    /// Place the photon at its emission point. A photon entering through the
    /// top surface loses its specular part here, which is handed to the
    /// specular boundary straight away.
    pub fn launch(
        emission: &Emission,
        tissue: &'a dyn Tissue,
        ops: &'a [OpticalProperties],
        options: &'a SimulationOptions,
        vbs: &mut VirtualBoundarySet,
        record_history: bool
    ) -> Photon<'a> {
        let region = tissue.get_region_index(&emission.position);
        let mut dp = PhotonDataPoint::new(emission.position, emission.direction, 1.0, ops.len());

        let on_top = (dp.position.z - tissue.z_top()).abs() < PLANE_TOLERANCE;
        let n0 = ops[0].n;
        let n1 = ops[region].n;
        if on_top && dp.direction.z > 0.0 && n0 != n1 {
            let (rsp, cos_t) = fresnel(n0, n1, dp.direction.z);
            let normal = Vector3f::new(0.0, 0.0, 1.0);
            let mut specular = dp.clone();
            specular.weight = rsp;
            specular.direction = dp.direction.reflect(&normal);
            dp.weight = 1.0 - rsp;
            dp.direction = refract(&dp.direction, &normal, n0, n1, cos_t);
            if rsp > 0.0 {
                vbs.nearest_crossing(&specular, BoundaryProbe::SpecularTissueBoundary);
                vbs.tally_crossed(&specular);
            }
        }

        let mut photon = Photon {
            dp,
            current_region_index: region,
            probe: BoundaryProbe::None,
            history: PhotonHistory::new(),
            record_history,
            s: 0.0,
            s_left: 0.0,
            tissue,
            ops,
            options
        };
        photon.record(HistoryEvent::Launch);
        photon
    }

    #[inline]
    fn weighting(&self) -> AbsorptionWeightingType {
        self.options.absorption_weighting
    }

    #[inline]
    fn op(&self) -> &'a OpticalProperties {
        let ops: &'a [OpticalProperties] = self.ops;
        &ops[self.current_region_index]
    }

    fn record(&mut self, event: HistoryEvent) {
        if self.record_history {
            self.history.push(HistoryPoint {
                position: self.dp.position,
                direction: self.dp.direction,
                weight: self.dp.weight,
                region_index: self.current_region_index,
                event,
                status: self.dp.status
            });
        }
    }

    /// Walk until the photon exits or dies, then hand its history to the
    /// volume detectors.
    pub fn trace(&mut self, rng: &mut Rng, vbs: &mut VirtualBoundarySet) -> PhotonStatus {
        while self.dp.status.is_alive() {
            if self.probe.is_exit() {
                self.exit(vbs);
                break;
            }
            self.set_step_size(rng);
            let coefficient = self.weighting().free_path_coefficient(self.op());
            let tissue_distance = self.tissue.get_distance_to_boundary(&self.dp, self.current_region_index);

            // every virtual boundary lies on an outer surface and is resolved
            // by `exit` once the boundary probe says the photon left
            if self.s.is_infinite() && tissue_distance.is_infinite() {
                warn!("Photon at {} in region {} can reach neither a collision nor a boundary",
                    self.dp.position, self.current_region_index);
                self.dp.status = PhotonStatus::KilledOverMaximumPathLength;
                self.record(HistoryEvent::VirtualBoundary);
                break;
            } else if tissue_distance < self.s {
                self.advance(tissue_distance);
                self.s_left = if coefficient > 0.0 { (self.s - tissue_distance) * coefficient } else { 0.0 };
                self.cross_region_or_reflect(rng);
                self.record(HistoryEvent::TissueBoundary);
            } else {
                self.advance(self.s);
                self.s_left = 0.0;
                self.collide(rng);
            }
            self.test_death();
        }
        if self.record_history {
            vbs.tally_history(&self.history);
        }
        vlog!(3, "Photon finished {} after {} collisions", self.dp, self.dp.total_collisions());
        self.dp.status
    }

    /// Turn the remaining optical depth into a step length in the current
    /// region, sampling a new depth when the last one was used up.
    pub fn set_step_size(&mut self, rng: &mut Rng) {
        if self.s_left == 0.0 {
            self.s_left = sample_free_path(1.0, rng);
        }
        let coefficient = self.weighting().free_path_coefficient(self.op());
        self.s = if coefficient > 0.0 { self.s_left / coefficient } else { Float::INFINITY };
    }

    /// Move along the current direction, accumulating path length, time of
    /// flight and, under continuous weighting, absorption.
    fn advance(&mut self, distance: Float) {
        let op = self.op();
        self.dp.position = self.dp.ray().at(distance);
        self.dp.collision_info[self.current_region_index].path_length += distance;
        self.dp.total_time += distance * op.n / SPEED_OF_LIGHT;
        if self.weighting() == AbsorptionWeightingType::Continuous {
            self.dp.weight *= (-op.mua * distance).exp();
        }
    }

    /// Resolve a stop on a tissue boundary by Fresnel reflection or
    /// transmission into the neighbouring region.
    fn cross_region_or_reflect(&mut self, rng: &mut Rng) {
        let region = self.current_region_index;
        let neighbor = self.tissue.get_neighbor_region_index(&self.dp, region);
        self.tissue.snap_to_boundary(&mut self.dp.position, region, neighbor);

        let n1 = self.ops[region].n;
        let n2 = self.ops[neighbor].n;
        let mut normal = self.tissue.get_boundary_normal(&self.dp, region, neighbor);
        let mut cos_i = self.dp.direction.dot(&normal);
        if cos_i < 0.0 {
            normal = -normal;
            cos_i = -cos_i;
        }
        let (reflectance, cos_t) = fresnel(n1, n2, cos_i);
        if rng.uniform_float() >= reflectance {
            if n1 != n2 {
                self.dp.direction = refract(&self.dp.direction, &normal, n1, n2, cos_t);
            }
            self.current_region_index = neighbor;
            self.probe = self.tissue.exit_probe(neighbor);
        } else {
            self.dp.direction = self.dp.direction.reflect(&normal);
        }
    }

    /// A real interaction: absorption according to the weighting scheme,
    /// roulette, then Henyey-Greenstein scattering.
    fn collide(&mut self, rng: &mut Rng) {
        let op = *self.op();
        self.dp.collision_info[self.current_region_index].collisions += 1;
        match self.weighting() {
            AbsorptionWeightingType::Analog => {
                if rng.uniform_float() < op.mua / op.mut_total() {
                    self.dp.status = PhotonStatus::Absorbed;
                    self.record(HistoryEvent::Collision);
                    return;
                }
            }
            AbsorptionWeightingType::Discrete => self.dp.weight *= op.albedo(),
            AbsorptionWeightingType::Continuous => {}
        }
        self.russian_roulette(rng);
        if self.dp.status.is_alive() {
            let cos_theta = sample_henyey_greenstein(op.g, rng);
            let phi = 2.0 * PI * rng.uniform_float();
            self.dp.direction = rotate_direction(&self.dp.direction, cos_theta, phi);
        }
        self.record(HistoryEvent::Collision);
    }

    /// Below the threshold a photon survives with probability `chance` and
    /// its weight is divided by it, keeping the estimate unbiased. The
    /// survivor's weight is not clamped to 1.
    fn russian_roulette(&mut self, rng: &mut Rng) {
        let threshold = self.options.russian_roulette_threshold;
        if threshold <= 0.0 || self.dp.weight >= threshold || self.dp.weight <= 0.0 {
            return;
        }
        let chance = self.options.russian_roulette_chance;
        if rng.uniform_float() < chance {
            self.dp.weight /= chance;
        } else {
            self.dp.status = PhotonStatus::KilledRussianRoulette;
        }
    }

    /// Enforce the run limits on path length and collisions.
    fn test_death(&mut self) {
        if !self.dp.status.is_alive() {
            return;
        }
        let status = if self.dp.total_path_length() >= self.options.max_path_length {
            PhotonStatus::KilledOverMaximumPathLength
        } else if self.dp.total_collisions() >= self.options.max_collisions {
            PhotonStatus::KilledOverMaximumCollisions
        } else {
            return;
        };
        self.dp.status = status;
        if let Some(last) = self.history.points.last_mut() {
            last.status = status;
        }
    }

    /// The photon sits on an outer surface heading out: resolve the pending
    /// probe against the virtual boundaries.
    fn exit(&mut self, vbs: &mut VirtualBoundarySet) {
        if let Some(status) = self.probe.exit_status() {
            self.dp.status = status;
        }
        vbs.nearest_crossing(&self.dp, self.probe);
        vbs.tally_crossed(&self.dp);
        self.record(HistoryEvent::VirtualBoundary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::core::binning::DoubleRange;
    use crate::core::detector::{DetectorContext, DetectorInput};
    use crate::core::geometry::Point3f;
    use crate::core::tissue::TissueInput;

    fn setup(ops: OpticalProperties, detectors: &[DetectorInput], options: &SimulationOptions)
        -> (Box<dyn Tissue>, Vec<OpticalProperties>, VirtualBoundarySet)
    {
        let tissue = TissueInput::slab(10.0, ops).create_tissue().unwrap();
        let region_ops = tissue.optical_properties();
        let context = DetectorContext::new(tissue.as_ref(), options.absorption_weighting);
        let vbs = VirtualBoundarySet::new(detectors, &context, &options.database_types).unwrap();
        (tissue, region_ops, vbs)
    }

    fn pencil() -> Emission {
        Emission { position: Point3f::zero(), direction: Vector3f::new(0.0, 0.0, 1.0) }
    }

    #[test]
    fn test_launch_removes_specular_reflection() {
        let options = SimulationOptions::default();
        let (tissue, ops, mut vbs) = setup(OpticalProperties::new(0.01, 1.0, 0.8, 1.4), &[DetectorInput::RSpecular], &options);
        let photon = Photon::launch(&pencil(), tissue.as_ref(), &ops, &options, &mut vbs, false);
        let rsp = (0.4 / 2.4) * (0.4 / 2.4);
        assert_relative_eq!(photon.dp.weight, 1.0 - rsp, max_relative = 1e-12);
        assert_eq!(photon.current_region_index, 1);
        assert_eq!(vbs.results()[0].mean(), Some(&[rsp][..]));
    }

    #[test]
    fn test_matched_index_has_no_specular() {
        let options = SimulationOptions::default();
        let (tissue, ops, mut vbs) = setup(OpticalProperties::new(0.01, 1.0, 0.8, 1.0), &[DetectorInput::RSpecular], &options);
        let photon = Photon::launch(&pencil(), tissue.as_ref(), &ops, &options, &mut vbs, false);
        assert_eq!(photon.dp.weight, 1.0);
        assert_eq!(vbs.results()[0].mean(), Some(&[0.0][..]));
    }

    #[test]
    fn test_non_scattering_slab_transmits_ballistically() {
        let options = SimulationOptions { absorption_weighting: AbsorptionWeightingType::Continuous, ..Default::default() };
        let detectors = [DetectorInput::TDiffuse, DetectorInput::TOfRho { rho: DoubleRange::new(0.0, 1.0, 11) }];
        let (tissue, ops, mut vbs) = setup(OpticalProperties::new(0.1, 0.0, 0.8, 1.0), &detectors, &options);
        let mut rng = Rng::new(0);
        let mut photon = Photon::launch(&pencil(), tissue.as_ref(), &ops, &options, &mut vbs, false);
        let status = photon.trace(&mut rng, &mut vbs);
        assert_eq!(status, PhotonStatus::ExitedBottom);
        assert_eq!(photon.dp.position.z, 10.0);
        assert_relative_eq!(photon.dp.weight, (-1.0 as Float).exp(), max_relative = 1e-12);
        assert_relative_eq!(photon.dp.total_time, 10.0 / SPEED_OF_LIGHT, max_relative = 1e-12);
        assert_eq!(photon.dp.total_collisions(), 0);
        let results = vbs.results();
        assert_relative_eq!(results[0].mean().unwrap()[0], (-1.0 as Float).exp(), max_relative = 1e-12);
        assert_relative_eq!(results[1].mean().unwrap()[0], (-1.0 as Float).exp(), max_relative = 1e-12);
    }

    #[test]
    fn test_discrete_weight_is_albedo_power() {
        let options = SimulationOptions::default();
        let op = OpticalProperties::new(0.1, 0.9, 0.8, 1.0);
        let (tissue, ops, mut vbs) = setup(op, &[DetectorInput::RDiffuse, DetectorInput::TDiffuse], &options);
        let mut rng = Rng::new(3);
        for _ in 0..50 {
            let mut photon = Photon::launch(&pencil(), tissue.as_ref(), &ops, &options, &mut vbs, false);
            let status = photon.trace(&mut rng, &mut vbs);
            assert!(status.is_exit());
            let expected = op.albedo().powi(photon.dp.total_collisions() as i32);
            assert_relative_eq!(photon.dp.weight, expected, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_history_follows_photon() {
        let options = SimulationOptions::default();
        let (tissue, ops, mut vbs) = setup(OpticalProperties::new(0.1, 0.9, 0.8, 1.4), &[DetectorInput::ATotal], &options);
        let mut rng = Rng::new(11);
        let record_history = vbs.needs_history();
        let mut photon = Photon::launch(&pencil(), tissue.as_ref(), &ops, &options, &mut vbs, record_history);
        photon.trace(&mut rng, &mut vbs);
        let points = &photon.history.points;
        assert_eq!(points[0].event, HistoryEvent::Launch);
        let collisions = points.iter().filter(|p| p.event == HistoryEvent::Collision).count() as u64;
        assert_eq!(collisions, photon.dp.total_collisions());
        assert_eq!(points[points.len() - 1].status, photon.dp.status);
        // virtual boundaries are only met on the way out
        let last = points.len() - 1;
        assert!(points.iter().enumerate().all(|(i, p)| p.event != HistoryEvent::VirtualBoundary || i == last));
    }

    #[test]
    fn test_collision_limit_kills() {
        let options = SimulationOptions { max_collisions: 3, ..Default::default() };
        let (tissue, ops, mut vbs) = setup(OpticalProperties::new(0.0, 100.0, 0.0, 1.0), &[], &options);
        let mut rng = Rng::new(1);
        let mut photon = Photon::launch(&pencil(), tissue.as_ref(), &ops, &options, &mut vbs, false);
        let status = photon.trace(&mut rng, &mut vbs);
        assert!(status == PhotonStatus::KilledOverMaximumCollisions || status.is_exit());
        assert!(photon.dp.total_collisions() <= 3);
    }

    #[test]
    fn test_russian_roulette_only_below_threshold() {
        let options = SimulationOptions { russian_roulette_threshold: 0.5, ..Default::default() };
        let (tissue, ops, mut vbs) = setup(OpticalProperties::default(), &[], &options);
        let mut photon = Photon::launch(&pencil(), tissue.as_ref(), &ops, &options, &mut vbs, false);
        let mut rng = Rng::new(2);
        photon.dp.weight = 0.9;
        photon.russian_roulette(&mut rng);
        assert_eq!(photon.dp.weight, 0.9);
        assert!(photon.dp.status.is_alive());
        let mut survived = 0;
        for _ in 0..1000 {
            photon.dp.weight = 0.25;
            photon.dp.status = PhotonStatus::Alive;
            photon.russian_roulette(&mut rng);
            if photon.dp.status.is_alive() {
                // unclamped, above the launch weight
                assert_relative_eq!(photon.dp.weight, 2.5, max_relative = 1e-12);
                survived += 1;
            } else {
                assert_eq!(photon.dp.status, PhotonStatus::KilledRussianRoulette);
            }
        }
        assert!(survived > 50 && survived < 150, "survived {}", survived);
    }
}

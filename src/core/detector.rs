//! The tally engine: accumulator storage shared by every detector, the
//! detector interfaces, and the input description detectors are built from.
use num::{Zero, complex::Complex};
use std::fmt;
use std::ops::AddAssign;
use super::mc::Float;
use super::binning::DoubleRange;
use super::geometry::Point3f;
use super::optical_properties::OpticalProperties;
use super::absorption::AbsorptionWeightingType;
use super::photon::{PhotonDataPoint, PhotonHistory};
use super::tissue::Tissue;
use super::error::DetectorError;
use super::virtual_boundary::VirtualBoundaryType;
use crate::regions::CylinderTissueRegion;
use crate::detectors::*;

pub type ComplexFloat = Complex<Float>;

/// Observable a detector estimates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TallyType {
    RDiffuse,
    ROfRho,
    ROfRhoAndTime,
    ROfAngle,
    ROfXAndY,
    ROfFx,
    ROfRhoAndOmega,
    RSpecular,
    TDiffuse,
    TOfRho,
    TOfAngle,
    SurfaceFiber,
    ATotalBoundingVolume,
    ATotal,
    AOfRhoAndZ,
    AOfXAndYAndZ,
    FluenceOfRhoAndZ,
    FluenceOfXAndYAndZ,
    PMCROfRho,
    PMCROfRhoAndTime,
    DMCdROfRhodMua,
    DMCdROfRhodMus
}

impl TallyType {
    /// The virtual boundary whose crossings feed detectors of this type.
    pub fn virtual_boundary_type(self) -> VirtualBoundaryType {
        match self {
            TallyType::RSpecular => VirtualBoundaryType::SpecularReflectance,
            TallyType::TDiffuse | TallyType::TOfRho | TallyType::TOfAngle => VirtualBoundaryType::DiffuseTransmittance,
            TallyType::SurfaceFiber => VirtualBoundaryType::SurfaceFiber,
            TallyType::ATotalBoundingVolume => VirtualBoundaryType::BoundingCylinder,
            TallyType::ATotal | TallyType::AOfRhoAndZ | TallyType::AOfXAndYAndZ
            | TallyType::FluenceOfRhoAndZ | TallyType::FluenceOfXAndYAndZ => VirtualBoundaryType::GenericVolume,
            _ => VirtualBoundaryType::DiffuseReflectance
        }
    }

    /// Detectors that re-weight recorded histories under perturbed optical properties.
    pub fn is_perturbation(self) -> bool {
        match self {
            TallyType::PMCROfRho | TallyType::PMCROfRhoAndTime
            | TallyType::DMCdROfRhodMua | TallyType::DMCdROfRhodMus => true,
            _ => false
        }
    }
}

impl fmt::Display for TallyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TallyType::PMCROfRho => "pMCROfRho",
            TallyType::PMCROfRhoAndTime => "pMCROfRhoAndTime",
            TallyType::DMCdROfRhodMua => "dMCdROfRhodMua",
            TallyType::DMCdROfRhodMus => "dMCdROfRhodMus",
            _ => return fmt::Debug::fmt(self, f)
        };
        f.write_str(name)
    }
}

/// Values a tally can accumulate.
pub trait TallyValue: Copy + Zero + AddAssign + PartialEq + fmt::Debug + Send + Sync {
    /// Contribution to the second moment. Complex values square each
    /// component separately.
    fn squared(self) -> Self;

    fn scale(self, s: Float) -> Self;
}

impl TallyValue for Float {
    #[inline]
    fn squared(self) -> Float {
        self * self
    }

    #[inline]
    fn scale(self, s: Float) -> Float {
        self * s
    }
}

impl TallyValue for ComplexFloat {
    #[inline]
    fn squared(self) -> ComplexFloat {
        Complex::new(self.re * self.re, self.im * self.im)
    }

    #[inline]
    fn scale(self, s: Float) -> ComplexFloat {
        self * s
    }
}

/// First and second moment arrays of one detector, flattened in row-major
/// order over `dims`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally<T> {
    pub dims: Vec<usize>,
    pub mean: Vec<T>,
    pub second_moment: Vec<T>,
    normalized: bool
}

impl<T: TallyValue> Tally<T> {
    pub fn new(dims: Vec<usize>) -> Tally<T> {
        let len = dims.iter().product();
        Tally {
            dims,
            mean: vec![T::zero(); len],
            second_moment: vec![T::zero(); len],
            normalized: false
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    #[inline]
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Add one contribution to flattened bin `index`.
    #[inline]
    pub fn add(&mut self, index: usize, value: T) {
        self.mean[index] += value;
        self.second_moment[index] += value.squared();
    }

    /// Flattened index of a multi-dimensional bin.
    #[inline]
    pub fn flat_index(&self, bins: &[usize]) -> usize {
        bins.iter().zip(self.dims.iter()).fold(0, |acc, (b, d)| acc * d + b)
    }

    /// Zero both moments.
    pub fn reset(&mut self) {
        for v in self.mean.iter_mut().chain(self.second_moment.iter_mut()) {
            *v = T::zero();
        }
        self.normalized = false;
    }

    /// Add the accumulators of another partial run.
    pub fn merge(&mut self, name: &str, other_name: &str, other: &Tally<T>) -> Result<(), DetectorError> {
        if self.dims != other.dims || self.normalized || other.normalized {
            return Err(DetectorError::IncompatibleMerge { name: name.to_string(), other: other_name.to_string() });
        }
        for (a, b) in self.mean.iter_mut().zip(other.mean.iter()) {
            *a += *b;
        }
        for (a, b) in self.second_moment.iter_mut().zip(other.second_moment.iter()) {
            *a += *b;
        }
        Ok(())
    }

    /// Divide the mean by `n` times the bin Jacobian and the second moment
    /// by the Jacobian squared. Allowed once.
    pub fn normalize(&mut self, name: &str, n: u64, jacobians: &[Float]) -> Result<(), DetectorError> {
        if self.normalized {
            return Err(DetectorError::AlreadyNormalized { name: name.to_string() });
        }
        let n = n as Float;
        for (i, j) in jacobians.iter().enumerate().take(self.len()) {
            self.mean[i] = self.mean[i].scale(1.0 / (n * j));
            self.second_moment[i] = self.second_moment[i].scale(1.0 / (j * j));
        }
        self.normalized = true;
        Ok(())
    }
}

/// Borrowed accumulators of a detector.
#[derive(Debug, Copy, Clone)]
pub enum DetectorValues<'a> {
    Real(&'a Tally<Float>),
    Complex(&'a Tally<ComplexFloat>)
}

#[derive(Debug)]
pub enum DetectorValuesMut<'a> {
    Real(&'a mut Tally<Float>),
    Complex(&'a mut Tally<ComplexFloat>)
}

/// Owned accumulators, as returned from a run.
#[derive(Debug, Clone, PartialEq)]
pub enum TallyData {
    Real(Tally<Float>),
    Complex(Tally<ComplexFloat>)
}

impl<'a> From<DetectorValues<'a>> for TallyData {
    fn from(values: DetectorValues<'a>) -> TallyData {
        match values {
            DetectorValues::Real(t) => TallyData::Real(t.clone()),
            DetectorValues::Complex(t) => TallyData::Complex(t.clone())
        }
    }
}

/// A named bin axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Axis {
    pub name: &'static str,
    pub range: DoubleRange
}

impl Axis {
    pub fn new(name: &'static str, range: DoubleRange) -> Axis {
        Axis { name, range }
    }
}

/// Behaviour common to every detector.
pub trait Detector: Send + Sync + fmt::Debug {
    fn tally_type(&self) -> TallyType;

    fn name(&self) -> String {
        self.tally_type().to_string()
    }

    /// Bin axes in the order of the flattened dimensions.
    fn axes(&self) -> Vec<Axis>;

    fn values(&self) -> DetectorValues<'_>;

    fn values_mut(&mut self) -> DetectorValuesMut<'_>;

    /// Area, solid angle or volume element of flattened bin `index`.
    fn bin_jacobian(&self, _index: usize) -> Float {
        1.0
    }

    /// Turn accumulated sums into estimates for `num_photons` launched photons.
    fn normalize(&mut self, num_photons: u64) -> Result<(), DetectorError> {
        let len = match self.values() {
            DetectorValues::Real(t) => t.len(),
            DetectorValues::Complex(t) => t.len()
        };
        let jacobians: Vec<Float> = (0..len).map(|i| self.bin_jacobian(i)).collect();
        let name = self.name();
        match self.values_mut() {
            DetectorValuesMut::Real(t) => t.normalize(&name, num_photons, &jacobians),
            DetectorValuesMut::Complex(t) => t.normalize(&name, num_photons, &jacobians)
        }
    }

    /// Add the accumulators of the same detector from another worker.
    fn merge(&mut self, other_type: TallyType, other: DetectorValues<'_>) -> Result<(), DetectorError> {
        let name = self.name();
        let other_name = other_type.to_string();
        if other_type != self.tally_type() {
            return Err(DetectorError::IncompatibleMerge { name, other: other_name });
        }
        match (self.values_mut(), other) {
            (DetectorValuesMut::Real(a), DetectorValues::Real(b)) => a.merge(&name, &other_name, b),
            (DetectorValuesMut::Complex(a), DetectorValues::Complex(b)) => a.merge(&name, &other_name, b),
            _ => Err(DetectorError::IncompatibleMerge { name, other: other_name })
        }
    }

    fn results(&self) -> DetectorResults {
        let data = TallyData::from(self.values());
        let dims = match &data {
            TallyData::Real(t) => t.dims.clone(),
            TallyData::Complex(t) => t.dims.clone()
        };
        DetectorResults { name: self.name(), tally_type: self.tally_type(), axes: self.axes(), dims, data }
    }
}

/// Detectors fed with the data point of a photon crossing a virtual boundary.
pub trait SurfaceDetector: Detector {
    fn tally(&mut self, dp: &PhotonDataPoint);

    /// Copy of the detector with empty accumulators.
    fn fork(&self) -> Box<dyn SurfaceDetector>;
}

/// Detectors fed with the complete history of a photon.
pub trait HistoryDetector: Detector {
    fn tally(&mut self, history: &PhotonHistory);

    fn fork(&self) -> Box<dyn HistoryDetector>;
}

/// Per photon totals of a history detector. The second moment of a history
/// detector is the square of a photon's total contribution to a bin.
#[derive(Debug, Clone)]
pub struct HistoryScratch {
    totals: Vec<Float>,
    touched: Vec<usize>,
    seen: Vec<bool>
}

impl HistoryScratch {
    pub fn new(len: usize) -> HistoryScratch {
        HistoryScratch { totals: vec![0.0; len], touched: Vec::new(), seen: vec![false; len] }
    }

    #[inline]
    pub fn add(&mut self, index: usize, value: Float) {
        if !self.seen[index] {
            self.seen[index] = true;
            self.touched.push(index);
        }
        self.totals[index] += value;
    }

    /// Move the totals of the finished photon into the tally.
    pub fn flush(&mut self, tally: &mut Tally<Float>) {
        for index in self.touched.drain(..) {
            tally.add(index, self.totals[index]);
            self.totals[index] = 0.0;
            self.seen[index] = false;
        }
    }
}

/// The part of a run a detector needs to know about.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorContext {
    /// Reference optical properties by region.
    pub ops: Vec<OpticalProperties>,
    pub weighting: AbsorptionWeightingType,
    pub z_top: Float,
    pub z_bottom: Float,
    pub bounding_cylinder: Option<CylinderTissueRegion>
}

impl DetectorContext {
    pub fn new(tissue: &dyn Tissue, weighting: AbsorptionWeightingType) -> DetectorContext {
        DetectorContext {
            ops: tissue.optical_properties(),
            weighting,
            z_top: tissue.z_top(),
            z_bottom: tissue.z_bottom(),
            bounding_cylinder: tissue.bounding_cylinder().cloned()
        }
    }

    /// Refractive index of the medium above the tissue.
    pub fn ambient_n(&self) -> Float {
        self.ops.first().map_or(1.0, |op| op.n)
    }
}

/// Final estimate of one detector.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorResults {
    pub name: String,
    pub tally_type: TallyType,
    pub axes: Vec<Axis>,
    pub dims: Vec<usize>,
    pub data: TallyData
}

impl DetectorResults {
    pub fn mean(&self) -> Option<&[Float]> {
        match &self.data {
            TallyData::Real(t) => Some(&t.mean),
            TallyData::Complex(_) => None
        }
    }

    pub fn second_moment(&self) -> Option<&[Float]> {
        match &self.data {
            TallyData::Real(t) => Some(&t.second_moment),
            TallyData::Complex(_) => None
        }
    }

    pub fn complex_mean(&self) -> Option<&[ComplexFloat]> {
        match &self.data {
            TallyData::Complex(t) => Some(&t.mean),
            TallyData::Real(_) => None
        }
    }

    /// Sample variance of the mean of every bin, `second_moment/n - mean^2`.
    pub fn variance(&self, num_photons: u64) -> Option<Vec<Float>> {
        let n = num_photons as Float;
        match &self.data {
            TallyData::Real(t) => Some(t.mean.iter().zip(t.second_moment.iter())
                .map(|(m, sm)| sm / n - m * m)
                .collect()),
            TallyData::Complex(_) => None
        }
    }
}

/// Optical properties a perturbation detector re-weights to.
#[derive(Debug, Clone, PartialEq)]
pub struct PerturbationInput {
    /// Perturbed optical properties for every region of the tissue.
    pub perturbed_ops: Vec<OpticalProperties>,
    /// Regions whose properties differ from the reference.
    pub perturbed_regions: Vec<usize>
}

/// Description of one detector.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorInput {
    RDiffuse,
    ROfRho { rho: DoubleRange },
    ROfRhoAndTime { rho: DoubleRange, time: DoubleRange },
    ROfAngle { angle: DoubleRange },
    ROfXAndY { x: DoubleRange, y: DoubleRange },
    /// Spatial frequencies in 1/mm, evaluated at each point of `fx`.
    ROfFx { fx: DoubleRange },
    /// Temporal frequencies in GHz, evaluated at each point of `omega`.
    ROfRhoAndOmega { rho: DoubleRange, omega: DoubleRange },
    RSpecular,
    TDiffuse,
    TOfRho { rho: DoubleRange },
    TOfAngle { angle: DoubleRange },
    SurfaceFiber { center: Point3f, radius: Float, numerical_aperture: Float },
    ATotalBoundingVolume,
    ATotal,
    AOfRhoAndZ { rho: DoubleRange, z: DoubleRange },
    AOfXAndYAndZ { x: DoubleRange, y: DoubleRange, z: DoubleRange },
    FluenceOfRhoAndZ { rho: DoubleRange, z: DoubleRange },
    FluenceOfXAndYAndZ { x: DoubleRange, y: DoubleRange, z: DoubleRange },
    PMCROfRho { rho: DoubleRange, perturbation: PerturbationInput },
    PMCROfRhoAndTime { rho: DoubleRange, time: DoubleRange, perturbation: PerturbationInput },
    DMCdROfRhodMua { rho: DoubleRange, perturbation: PerturbationInput },
    DMCdROfRhodMus { rho: DoubleRange, perturbation: PerturbationInput }
}

/// A built detector, ready to be attached to its virtual boundary.
#[derive(Debug)]
pub enum CreatedDetector {
    Surface(Box<dyn SurfaceDetector>),
    History(Box<dyn HistoryDetector>)
}

impl DetectorInput {
    pub fn tally_type(&self) -> TallyType {
        match self {
            DetectorInput::RDiffuse => TallyType::RDiffuse,
            DetectorInput::ROfRho { .. } => TallyType::ROfRho,
            DetectorInput::ROfRhoAndTime { .. } => TallyType::ROfRhoAndTime,
            DetectorInput::ROfAngle { .. } => TallyType::ROfAngle,
            DetectorInput::ROfXAndY { .. } => TallyType::ROfXAndY,
            DetectorInput::ROfFx { .. } => TallyType::ROfFx,
            DetectorInput::ROfRhoAndOmega { .. } => TallyType::ROfRhoAndOmega,
            DetectorInput::RSpecular => TallyType::RSpecular,
            DetectorInput::TDiffuse => TallyType::TDiffuse,
            DetectorInput::TOfRho { .. } => TallyType::TOfRho,
            DetectorInput::TOfAngle { .. } => TallyType::TOfAngle,
            DetectorInput::SurfaceFiber { .. } => TallyType::SurfaceFiber,
            DetectorInput::ATotalBoundingVolume => TallyType::ATotalBoundingVolume,
            DetectorInput::ATotal => TallyType::ATotal,
            DetectorInput::AOfRhoAndZ { .. } => TallyType::AOfRhoAndZ,
            DetectorInput::AOfXAndYAndZ { .. } => TallyType::AOfXAndYAndZ,
            DetectorInput::FluenceOfRhoAndZ { .. } => TallyType::FluenceOfRhoAndZ,
            DetectorInput::FluenceOfXAndYAndZ { .. } => TallyType::FluenceOfXAndYAndZ,
            DetectorInput::PMCROfRho { .. } => TallyType::PMCROfRho,
            DetectorInput::PMCROfRhoAndTime { .. } => TallyType::PMCROfRhoAndTime,
            DetectorInput::DMCdROfRhodMua { .. } => TallyType::DMCdROfRhodMua,
            DetectorInput::DMCdROfRhodMus { .. } => TallyType::DMCdROfRhodMus
        }
    }

    /// Build the detector, checking its axes and its compatibility with the
    /// run's absorption weighting.
    pub fn create(&self, context: &DetectorContext) -> Result<CreatedDetector, DetectorError> {
        let tally_type = self.tally_type();
        let detector = match self {
            DetectorInput::RDiffuse | DetectorInput::RSpecular | DetectorInput::TDiffuse => {
                CreatedDetector::Surface(Box::new(TotalDetector::new(tally_type)))
            }
            DetectorInput::ATotalBoundingVolume => {
                if context.bounding_cylinder.is_none() {
                    return Err(DetectorError::MissingBoundingVolume { name: tally_type.to_string() });
                }
                CreatedDetector::Surface(Box::new(TotalDetector::new(tally_type)))
            }
            DetectorInput::ROfRho { rho } | DetectorInput::TOfRho { rho } => {
                CreatedDetector::Surface(Box::new(OfRhoDetector::new(tally_type, *rho)?))
            }
            DetectorInput::ROfRhoAndTime { rho, time } => {
                CreatedDetector::Surface(Box::new(ROfRhoAndTimeDetector::new(*rho, *time)?))
            }
            DetectorInput::ROfAngle { angle } | DetectorInput::TOfAngle { angle } => {
                CreatedDetector::Surface(Box::new(OfAngleDetector::new(tally_type, *angle)?))
            }
            DetectorInput::ROfXAndY { x, y } => CreatedDetector::Surface(Box::new(ROfXAndYDetector::new(*x, *y)?)),
            DetectorInput::ROfFx { fx } => CreatedDetector::Surface(Box::new(ROfFxDetector::new(*fx)?)),
            DetectorInput::ROfRhoAndOmega { rho, omega } => {
                CreatedDetector::Surface(Box::new(ROfRhoAndOmegaDetector::new(*rho, *omega)?))
            }
            DetectorInput::SurfaceFiber { center, radius, numerical_aperture } => {
                CreatedDetector::Surface(Box::new(
                    SurfaceFiberDetector::new(*center, *radius, *numerical_aperture, context.ambient_n())?))
            }
            DetectorInput::ATotal => CreatedDetector::History(Box::new(ATotalDetector::new(context))),
            DetectorInput::AOfRhoAndZ { rho, z } => CreatedDetector::History(Box::new(
                RhoAndZDetector::new(VolumeQuantity::Absorption, *rho, *z, context)?)),
            DetectorInput::FluenceOfRhoAndZ { rho, z } => CreatedDetector::History(Box::new(
                RhoAndZDetector::new(VolumeQuantity::Fluence, *rho, *z, context)?)),
            DetectorInput::AOfXAndYAndZ { x, y, z } => CreatedDetector::History(Box::new(
                XAndYAndZDetector::new(VolumeQuantity::Absorption, *x, *y, *z, context)?)),
            DetectorInput::FluenceOfXAndYAndZ { x, y, z } => CreatedDetector::History(Box::new(
                XAndYAndZDetector::new(VolumeQuantity::Fluence, *x, *y, *z, context)?)),
            DetectorInput::PMCROfRho { rho, perturbation } => CreatedDetector::Surface(Box::new(
                PMCROfRhoDetector::new(*rho, perturbation, context)?)),
            DetectorInput::PMCROfRhoAndTime { rho, time, perturbation } => CreatedDetector::Surface(Box::new(
                PMCROfRhoAndTimeDetector::new(*rho, *time, perturbation, context)?)),
            DetectorInput::DMCdROfRhodMua { rho, perturbation } => CreatedDetector::Surface(Box::new(
                DMCROfRhoDetector::new(DifferentialParameter::Mua, *rho, perturbation, context)?)),
            DetectorInput::DMCdROfRhodMus { rho, perturbation } => CreatedDetector::Surface(Box::new(
                DMCROfRhoDetector::new(DifferentialParameter::Mus, *rho, perturbation, context)?))
        };
        Ok(detector)
    }
}
